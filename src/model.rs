//! Carrier-neutral domain model: requests, packages, quotes, and request validation.
//!
//! Requests and responses are request-scoped values; nothing here holds carrier
//! state. Adapters validate a [`RateRequest`] with [`RateRequest::validate`] before
//! any network call and build a [`RateResponse`] at mapping time.

pub mod address;
pub mod package;
pub mod rate;
pub mod validation;

pub use address::*;
pub use package::*;
pub use rate::*;
pub use validation::*;

// self
use crate::_prelude::*;

/// Monetary amount with an ISO-4217 currency code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
	/// Decimal amount, serialized as a string to avoid float rounding.
	pub amount: Decimal,
	/// Three-letter currency code.
	pub currency: String,
}
impl Money {
	/// Creates a new amount; the currency is upper-cased.
	pub fn new(amount: Decimal, currency: impl AsRef<str>) -> Self {
		Self { amount, currency: currency.as_ref().to_ascii_uppercase() }
	}
}
impl Display for Money {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{} {}", self.amount, self.currency)
	}
}

pub(crate) fn is_alpha_code(value: &str, len: usize) -> bool {
	value.len() == len && value.bytes().all(|b| b.is_ascii_alphabetic())
}
