//! Accept headers end to end.

use super::{call, started};
use crate::common::MockExchange;
use interpose_core::{Invocation, Result, StatusCode};

fn answer(inv: &mut Invocation) -> Result<()> {
    inv.output.insert("id", 42);
    Ok(())
}

fn negotiated_content_type(accept: Option<&str>) -> String {
    let (rest, dispatcher) = started();
    let exchange = match accept {
        Some(accept) => MockExchange::accepting(accept),
        None => MockExchange::new(),
    };
    call(&rest, &dispatcher, &exchange, "orders.Get", answer).unwrap();
    let response = exchange.only_response();
    assert_eq!(response.status, StatusCode::OK);
    response.content_type
}

#[test]
fn highest_weight_wins() {
    assert_eq!(
        negotiated_content_type(Some("application/json;q=0.9, text/xml;q=1.0")),
        "text/xml"
    );
}

#[test]
fn no_overlap_falls_back_to_first_supported() {
    assert_eq!(negotiated_content_type(Some("image/png")), "application/json");
}

#[test]
fn missing_header_uses_first_supported() {
    assert_eq!(negotiated_content_type(None), "application/json");
}

#[test]
fn wildcards_and_zero_weights() {
    assert_eq!(
        negotiated_content_type(Some("application/json;q=0, application/*;q=0.5")),
        "application/xml"
    );
    assert_eq!(
        negotiated_content_type(Some("*/*;q=0.1, text/yaml")),
        "text/yaml"
    );
}

#[test]
fn output_bag_is_the_body() {
    let (rest, dispatcher) = started();
    let exchange = MockExchange::accepting("application/json");
    call(&rest, &dispatcher, &exchange, "orders.Get", answer).unwrap();

    assert_eq!(exchange.body_json()["id"], 42);
    assert!(rest.registry().is_empty());
}
