//! Configuration for the REST negotiator.

use crate::codec::Codec;
use crate::events::RestEvent;
use crate::media::MediaType;
use crate::processor::RestNegotiator;
use http::StatusCode;
use interpose_core::EventListeners;
use std::sync::Arc;
use tracing::Level;

/// Configuration for [`RestNegotiator`].
#[derive(Clone)]
pub struct RestConfig {
    pub(crate) codec: Arc<dyn Codec>,
    pub(crate) supported: Vec<MediaType>,
    pub(crate) logging_level: Level,
    pub(crate) name: String,
    pub(crate) event_listeners: EventListeners<RestEvent>,
}

impl RestConfig {
    /// Creates a configuration builder encoding bodies with `codec`.
    pub fn builder<C>(codec: C) -> RestConfigBuilder
    where
        C: Codec + 'static,
    {
        RestConfigBuilder::new(Arc::new(codec))
    }
}

/// Builder for [`RestConfig`].
pub struct RestConfigBuilder {
    codec: Arc<dyn Codec>,
    supported: Vec<MediaType>,
    logging_level: Level,
    name: String,
    event_listeners: EventListeners<RestEvent>,
}

impl RestConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new(codec: Arc<dyn Codec>) -> Self {
        Self {
            codec,
            supported: MediaType::defaults(),
            logging_level: Level::DEBUG,
            name: "rest".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Supported media types in preference order. An empty list keeps the
    /// defaults.
    ///
    /// Default: JSON, XML, YAML
    pub fn supported(mut self, supported: Vec<MediaType>) -> Self {
        if !supported.is_empty() {
            self.supported = supported;
        }
        self
    }

    /// Level of the per-response audit log.
    ///
    /// Default: DEBUG
    pub fn logging_level(mut self, level: Level) -> Self {
        self.logging_level = level;
        self
    }

    /// Sets the name of this processor instance.
    ///
    /// Default: "rest"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked after a negotiated response is written.
    ///
    /// # Callback Signature
    /// `Fn(StatusCode, &str)` - status and content type of the response.
    pub fn on_responded<F>(mut self, f: F) -> Self
    where
        F: Fn(StatusCode, &str) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let RestEvent::Responded {
                status,
                content_type,
                ..
            } = event
            {
                f(*status, content_type);
            }
        });
        self
    }

    /// Registers a callback invoked when writing a response fails.
    ///
    /// # Callback Signature
    /// `Fn(&str)` - the transport's error message.
    pub fn on_response_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let RestEvent::ResponseFailed { error, .. } = event {
                f(error);
            }
        });
        self
    }

    /// Builds the processor.
    pub fn build(self) -> RestNegotiator {
        RestNegotiator::new(RestConfig {
            codec: self.codec,
            supported: self.supported,
            logging_level: self.logging_level,
            name: self.name,
            event_listeners: self.event_listeners,
        })
    }
}
