// self
use crate::{
	_prelude::*,
	obs::{CallKind, CallOutcome},
};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"carrier_rates_call_total",
			"kind" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a scheduled retry and forwards it to the tracing layer.
pub fn record_retry(kind: ErrorKind, attempt: u32, delay: StdDuration) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("carrier_rates_retry_total", "error_kind" => kind.as_str()).increment(1);
	}

	super::trace_retry(kind, attempt, delay);
}
