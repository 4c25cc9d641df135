// self
use crate::{_prelude::*, obs::CallKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by carrier calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the call kind and carrier name.
	pub fn new(kind: CallKind, carrier: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("carrier_rates.call", kind = kind.as_str(), carrier);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, carrier);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
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

/// Emits a `warn` event before the transport sleeps ahead of a retry.
pub fn trace_retry(kind: ErrorKind, attempt: u32, delay: StdDuration) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			error_kind = kind.as_str(),
			attempt = attempt + 1,
			delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
			"retrying carrier request"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, attempt, delay);
	}
}

/// Emits a `debug` event describing a per-carrier failure that was isolated by the shopper.
pub fn trace_isolated_failure(carrier: &str, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(carrier, error = %error, "carrier failed during rate shopping");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (carrier, error);
	}
}
