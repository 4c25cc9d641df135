//! Rate requests, quotes, and normalized responses.

// crates.io
use time::Date;
// self
use crate::{
	_prelude::*,
	model::{Address, Money, Package, ValidationIssues},
};

/// Optional service flags a caller may request on top of the base rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestedServices {
	/// Saturday delivery.
	pub saturday_delivery: bool,
	/// Adult or direct signature on delivery.
	pub signature_required: bool,
}

/// Normalized rate request shared by every carrier adapter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRequest {
	/// Ship-from address.
	pub origin: Address,
	/// Ship-to address.
	pub destination: Address,
	/// Ordered packages; at least one is required.
	pub packages: Vec<Package>,
	/// Optional carrier service code hint; rates every service when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub service_level: Option<String>,
	/// Optional planned ship date, enables transit-time estimates.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub shipment_date: Option<Date>,
	/// Optional accessorial service flags.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub requested_services: Option<RequestedServices>,
}
impl RateRequest {
	/// Creates a request for the provided route and packages.
	pub fn new<I>(origin: Address, destination: Address, packages: I) -> Self
	where
		I: IntoIterator<Item = Package>,
	{
		Self {
			origin,
			destination,
			packages: packages.into_iter().collect(),
			service_level: None,
			shipment_date: None,
			requested_services: None,
		}
	}

	/// Restricts rating to one carrier service code.
	pub fn with_service_level(mut self, code: impl Into<String>) -> Self {
		self.service_level = Some(code.into());

		self
	}

	/// Sets the planned ship date.
	pub fn with_shipment_date(mut self, date: Date) -> Self {
		self.shipment_date = Some(date);

		self
	}

	/// Sets accessorial service flags.
	pub fn with_requested_services(mut self, services: RequestedServices) -> Self {
		self.requested_services = Some(services);

		self
	}

	/// Checks every schema invariant, reporting all violations at once.
	pub fn validate(&self) -> Result<(), CarrierError> {
		let mut issues = ValidationIssues::default();

		self.origin.collect_issues("origin", &mut issues);
		self.destination.collect_issues("destination", &mut issues);

		if self.packages.is_empty() {
			issues.push("packages", "at least one package is required");
		}

		for (idx, package) in self.packages.iter().enumerate() {
			package.collect_issues(&format!("packages[{idx}]"), &mut issues);
		}

		if self.service_level.as_deref().is_some_and(|code| code.trim().is_empty()) {
			issues.push("service_level", "service level must not be blank");
		}

		issues.into_result()
	}
}

/// Single itemized surcharge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedCharge {
	/// Carrier charge code.
	pub code: String,
	/// Optional human-readable label.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Charge amount.
	pub amount: Money,
}

/// Breakdown of a quote's total charge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeBreakdown {
	/// Transportation (base) charge.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub base: Option<Money>,
	/// Accessorial service-option charges.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub service_options: Option<Money>,
	/// Itemized surcharges (fuel, residential, ...).
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub itemized: Vec<ItemizedCharge>,
}
impl ChargeBreakdown {
	/// Returns true when the carrier supplied nothing to break down.
	pub fn is_empty(&self) -> bool {
		self.base.is_none() && self.service_options.is_none() && self.itemized.is_empty()
	}
}

/// One priced service offered by a carrier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateQuote {
	/// Carrier name (e.g. `ups`).
	pub carrier: String,
	/// Carrier service code.
	pub service_code: String,
	/// Human-readable service name.
	pub service_name: String,
	/// Total charge for the shipment.
	pub total_charge: Money,
	/// Optional charge breakdown.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub breakdown: Option<ChargeBreakdown>,
	/// Business days in transit, when the carrier reports them.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub transit_days: Option<u32>,
	/// Whether delivery is guaranteed.
	#[serde(default)]
	pub guaranteed_delivery: bool,
	/// Estimated delivery date.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub delivery_date: Option<Date>,
	/// Opaque carrier-specific extras.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub metadata: BTreeMap<String, JsonValue>,
}

/// Normalized carrier response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateResponse {
	/// Quotes in carrier order; may be empty.
	pub quotes: Vec<RateQuote>,
	/// Carrier-side request or transaction identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub request_id: Option<String>,
	/// Mapping instant (not carrier time).
	#[serde(with = "time::serde::rfc3339")]
	pub timestamp: OffsetDateTime,
}
impl RateResponse {
	/// Builds a response stamped with the current UTC instant.
	pub fn new(quotes: Vec<RateQuote>, request_id: Option<String>) -> Self {
		Self { quotes, request_id, timestamp: OffsetDateTime::now_utc() }
	}

	/// Returns the lowest-priced quote. Amounts are compared as-is; callers mixing
	/// currencies should convert first.
	pub fn cheapest(&self) -> Option<&RateQuote> {
		self.quotes.iter().min_by(|a, b| a.total_charge.amount.cmp(&b.total_charge.amount))
	}

	/// Returns true when the carrier offered no service.
	pub fn is_empty(&self) -> bool {
		self.quotes.is_empty()
	}
}
