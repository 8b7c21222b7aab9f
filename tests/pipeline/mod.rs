//! Full-stack tests.
//!
//! Test organization:
//! - settings.rs: building from JSON documents
//! - composition.rs: every processor on one invocation

mod composition;

use crate::common::json_codec;
use interpose::{Interpose, Settings};
use interpose_core::Dispatcher;
use std::sync::Arc;

pub(crate) fn assemble(json: serde_json::Value) -> (Interpose, Arc<Dispatcher>) {
    let settings: Settings = serde_json::from_value(json).unwrap();
    let interpose = Interpose::from_settings(&settings, json_codec).unwrap();
    let dispatcher = Arc::new(Dispatcher::new());
    interpose.start(&dispatcher);
    (interpose, dispatcher)
}
