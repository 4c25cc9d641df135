//! Optional observability helpers for carrier calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `carrier_rates.call` with the `kind` and
//!   `carrier` fields, plus `warn` events for every scheduled retry.
//! - Enable `metrics` to increment `carrier_rates_call_total` (labeled by `kind` + `outcome`)
//!   and `carrier_rates_retry_total` (labeled by `error_kind`).

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// OAuth token acquisition.
	Token,
	/// Single-carrier rate request.
	Rates,
	/// Carrier health probe.
	Health,
	/// Multi-carrier rate shopping.
	Shop,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Token => "token",
			CallKind::Rates => "rates",
			CallKind::Health => "health",
			CallKind::Shop => "shop",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to an instrumented operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}

	/// Maps a result into success/failure.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { Self::Success } else { Self::Failure }
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
