//! REST response negotiation for interpose.
//!
//! [`RestNegotiator`] answers REST-style invocations on behalf of the
//! service: it picks a response media type from the client's `Accept`
//! header, encodes the output through a host-supplied [`Codec`], and turns
//! errors into a status code plus an `{"errorMessage": ...}` body.
//!
//! | Fault kind    | Status |
//! |---------------|--------|
//! | Validation    | 422    |
//! | Malformed     | 400    |
//! | Duplicate     | 409    |
//! | Unsupported   | 406    |
//! | Security      | 403    |
//! | anything else | 500    |
//!
//! Faults raised by the interception machinery rather than the service
//! always map to 500.
//!
//! # Example
//!
//! ```rust
//! use interpose_core::{DataBag, Dispatcher, Invocation, ManagedProcessor, Result};
//! use interpose_rest::{CodecError, MediaType, RestNegotiator};
//! use std::sync::Arc;
//!
//! let codec = |_: &MediaType, bag: &DataBag| -> std::result::Result<Vec<u8>, CodecError> {
//!     Ok(format!("{} fields", bag.len()).into_bytes())
//! };
//! let dispatcher = Dispatcher::new();
//! let rest = Arc::new(RestNegotiator::builder(codec).build());
//! rest.start(&dispatcher);
//!
//! let r = Arc::clone(&rest);
//! let service = move |inv: &mut Invocation| -> Result<()> {
//!     r.register(inv);
//!     inv.output.insert("id", 42);
//!     Ok(())
//! };
//! // Without an exchange there is no client to answer; the registration
//! // is still released.
//! dispatcher
//!     .dispatch(&service, &mut Invocation::new("api.Create", DataBag::new()))
//!     .unwrap();
//! assert!(rest.registry().is_empty());
//! ```

pub mod codec;
pub mod config;
pub mod events;
pub mod media;
pub mod processor;
pub mod registry;
pub mod status;

pub use codec::{Codec, CodecError};
pub use config::{RestConfig, RestConfigBuilder};
pub use events::RestEvent;
pub use media::{negotiate, parse_accept, MediaRange, MediaType, Negotiated};
pub use processor::{RestNegotiator, REST_PRIORITY};
pub use registry::{RestRegistration, RestRegistry};
pub use status::{status_for, ERROR_MESSAGE_KEY};
