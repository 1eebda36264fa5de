// self
use crate::{_prelude::*, error::TransportError, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by client flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("mendeley_client.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a GET attempt that failed at the transport layer and will be retried.
pub(crate) fn note_get_retry(attempt: u8, url: &Url, error: &TransportError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(attempt, %url, %error, "GET failed at the transport layer; retrying");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (attempt, url, error);
	}
}

/// Logs a refresh failure that is swallowed so the dependent call can still run.
pub(crate) fn note_refresh_failure(error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(%error, "Token refresh failed; continuing with the stored credentials");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}

/// Logs a 401 "Token has expired" answer that triggers a reactive refresh.
pub(crate) fn note_token_expired(url: &Url) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(%url, "Access token expired server-side; refreshing and retrying once");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = url;
	}
}
