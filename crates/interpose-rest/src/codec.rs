//! Body encoding supplied by the host.

use crate::media::MediaType;
use interpose_core::DataBag;
use std::error::Error as StdError;

/// Errors raised while encoding a response body.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The codec cannot produce this media type.
    #[error("unsupported media type: {0}")]
    Unsupported(String),

    /// Encoding failed.
    #[error("encoding failed: {0}")]
    Encode(#[source] Box<dyn StdError + Send + Sync>),
}

impl CodecError {
    /// Wraps an encoder's error.
    pub fn encode<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        CodecError::Encode(Box::new(error))
    }
}

/// Encodes a data bag for a media type. Format-specific serializers live
/// in the host.
pub trait Codec: Send + Sync {
    /// Encodes `bag` as `media_type`.
    fn encode(&self, media_type: &MediaType, bag: &DataBag) -> Result<Vec<u8>, CodecError>;
}

impl<F> Codec for F
where
    F: Fn(&MediaType, &DataBag) -> Result<Vec<u8>, CodecError> + Send + Sync,
{
    fn encode(&self, media_type: &MediaType, bag: &DataBag) -> Result<Vec<u8>, CodecError> {
        self(media_type, bag)
    }
}
