//! Error to HTTP status mapping.

use http::StatusCode;
use interpose_core::{FaultKind, InvocationError, Origin};

/// Field carrying the message in error bodies.
pub const ERROR_MESSAGE_KEY: &str = "errorMessage";

/// Maps an invocation error to the status sent to the client.
///
/// Only faults raised by service code are mapped by kind; faults raised by
/// the interception machinery are always a server error.
pub fn status_for(error: &InvocationError) -> StatusCode {
    let fault = error.fault();
    if fault.origin() == Origin::Chain {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    match fault.kind() {
        FaultKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        FaultKind::Malformed => StatusCode::BAD_REQUEST,
        FaultKind::Duplicate => StatusCode::CONFLICT,
        FaultKind::Unsupported => StatusCode::NOT_ACCEPTABLE,
        FaultKind::Security => StatusCode::FORBIDDEN,
        FaultKind::General => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
