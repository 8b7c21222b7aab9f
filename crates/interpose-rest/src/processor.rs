use crate::codec::Codec;
use crate::config::{RestConfig, RestConfigBuilder};
use crate::events::RestEvent;
use crate::media::{negotiate, Negotiated};
use crate::registry::{RestRegistration, RestRegistry};
use crate::status::{status_for, ERROR_MESSAGE_KEY};
use http::StatusCode;
use interpose_core::{
    log_at, BasicProcessor, Chain, DataBag, Exchange, ExchangeError, Fault, Invocation,
    InvocationError, Lifecycle, ManagedProcessor, Processor, Response, Result,
};
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::counter;

/// Dispatch priority of [`RestNegotiator`].
pub const REST_PRIORITY: i32 = -300;

const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

/// Writes negotiated responses for invocations that registered as REST
/// calls.
///
/// A service calls [`RestNegotiator::register`] with its own invocation.
/// When that invocation completes:
/// - on success, unless the service already committed a response, the
///   output bag is encoded in the media type negotiated from the client's
///   `Accept` header and sent with status 200;
/// - on error, a body `{"errorMessage": ...}` is sent with the status from
///   [`status_for`], and the error still propagates.
pub struct RestNegotiator {
    config: RestConfig,
    registry: Arc<RestRegistry>,
    lifecycle: Lifecycle,
}

impl RestNegotiator {
    pub(crate) fn new(config: RestConfig) -> Self {
        Self {
            config,
            registry: Arc::new(RestRegistry::new()),
            lifecycle: Lifecycle::new(),
        }
    }

    /// Creates a configuration builder encoding bodies with `codec`.
    pub fn builder<C>(codec: C) -> RestConfigBuilder
    where
        C: Codec + 'static,
    {
        RestConfig::builder(codec)
    }

    /// Marks `invocation` as a REST call answered by this negotiator.
    pub fn register(&self, invocation: &Invocation) {
        self.registry.register(invocation);
    }

    /// Pending registrations.
    pub fn registry(&self) -> &Arc<RestRegistry> {
        &self.registry
    }

    fn select_media(&self, exchange: &dyn Exchange) -> Result<Negotiated<'_>> {
        let accept = exchange.accept();
        negotiate(accept.as_deref(), &self.config.supported)
            .ok_or_else(|| Fault::internal("no supported media types configured").into())
    }

    fn respond_success(
        &self,
        exchange: &dyn Exchange,
        invocation: &Invocation,
        registration: &RestRegistration,
    ) -> Result<()> {
        let negotiated = self.select_media(exchange)?;
        let body = match self
            .config
            .codec
            .encode(negotiated.media_type, &invocation.output)
        {
            Ok(body) => body,
            Err(e) => {
                let error: InvocationError = Fault::internal("response encoding failed")
                    .with_source(e)
                    .into();
                self.respond_error(exchange, invocation, registration, &error);
                return Err(error);
            }
        };

        let response = Response::new(StatusCode::OK, negotiated.content_type, body);
        self.write(exchange, invocation, registration, response)
            .map_err(|e| Fault::internal("response could not be written").with_source(e).into())
    }

    fn respond_error(
        &self,
        exchange: &dyn Exchange,
        invocation: &Invocation,
        registration: &RestRegistration,
        error: &InvocationError,
    ) {
        let status = status_for(error);
        let message = error.fault().message();
        let body = DataBag::new().with(ERROR_MESSAGE_KEY, message);

        let response = match self.select_media(exchange) {
            Ok(negotiated) => match self.config.codec.encode(negotiated.media_type, &body) {
                Ok(encoded) => Response::new(status, negotiated.content_type, encoded),
                Err(e) => {
                    tracing::warn!(error = %e, "error body encoding failed, sending plain text");
                    Response::new(status, PLAIN_TEXT, message.as_bytes().to_vec())
                }
            },
            Err(_) => Response::new(status, PLAIN_TEXT, message.as_bytes().to_vec()),
        };

        // The original error propagates either way.
        let _ = self.write(exchange, invocation, registration, response);
    }

    fn write(
        &self,
        exchange: &dyn Exchange,
        invocation: &Invocation,
        registration: &RestRegistration,
        response: Response,
    ) -> std::result::Result<(), ExchangeError> {
        let status = response.status;
        let content_type = response.content_type.clone();

        if let Err(e) = exchange.respond(response) {
            tracing::warn!(
                signature = invocation.signature(),
                status = status.as_u16(),
                error = %e,
                "failed to write rest response"
            );
            self.config
                .event_listeners
                .emit(&RestEvent::ResponseFailed {
                    processor_name: self.config.name.clone(),
                    timestamp: Instant::now(),
                    signature: invocation.signature().to_string(),
                    error: e.to_string(),
                });
            return Err(e);
        }

        let elapsed = invocation.started().elapsed();
        log_at!(
            self.config.logging_level,
            signature = invocation.signature(),
            status = status.as_u16(),
            content_type = content_type.as_str(),
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            input = ?registration.input,
            "rest response"
        );

        #[cfg(feature = "metrics")]
        counter!("rest_responses_total", "status" => status.as_str().to_string()).increment(1);

        self.config.event_listeners.emit(&RestEvent::Responded {
            processor_name: self.config.name.clone(),
            timestamp: Instant::now(),
            signature: invocation.signature().to_string(),
            status,
            content_type,
            elapsed,
        });
        Ok(())
    }

    fn pass_through(&self, invocation: &Invocation) {
        tracing::debug!(
            signature = invocation.signature(),
            "response already committed by service"
        );
        self.config
            .event_listeners
            .emit(&RestEvent::PassedThrough {
                processor_name: self.config.name.clone(),
                timestamp: Instant::now(),
                signature: invocation.signature().to_string(),
            });
    }
}

impl BasicProcessor for RestNegotiator {
    type Frame = ();

    fn after(&self, _frame: &mut (), invocation: &mut Invocation) -> Result<()> {
        let Some(registration) = self.registry.take(invocation) else {
            return Ok(());
        };
        let Some(exchange) = invocation.exchange().cloned() else {
            tracing::debug!(
                signature = invocation.signature(),
                "rest registration without an exchange"
            );
            return Ok(());
        };

        if exchange.is_committed() {
            self.pass_through(invocation);
            return Ok(());
        }
        self.respond_success(exchange.as_ref(), invocation, &registration)
    }

    fn catch(
        &self,
        _frame: &mut (),
        invocation: &mut Invocation,
        error: InvocationError,
    ) -> InvocationError {
        let Some(registration) = self.registry.take(invocation) else {
            return error;
        };
        match invocation.exchange().cloned() {
            Some(exchange) if exchange.is_committed() => self.pass_through(invocation),
            Some(exchange) => {
                self.respond_error(exchange.as_ref(), invocation, &registration, &error)
            }
            None => {}
        }
        error
    }

    fn finally(&self, _frame: (), invocation: &mut Invocation) {
        self.registry.take(invocation);
    }
}

impl Processor for RestNegotiator {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn priority(&self) -> i32 {
        REST_PRIORITY
    }

    fn process(&self, chain: Chain<'_>, invocation: &mut Invocation) -> Result<()> {
        self.run(chain, invocation)
    }
}

impl ManagedProcessor for RestNegotiator {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn on_stop(&self) {
        self.registry.clear();
    }
}
