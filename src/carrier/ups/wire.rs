//! UPS Rating API JSON shapes.
//!
//! Field names follow the UPS schema (PascalCase). UPS returns several fields either
//! as a single object or as an array; those are typed as [`OneOrMany`] and flattened
//! with [`OneOrMany::into_vec`] before any mapping logic reads them.

// self
use crate::_prelude::*;

/// A field UPS sends as either one object or an array of objects.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
	/// Array of objects.
	Many(Vec<T>),
	/// Single object.
	One(T),
}
impl<T> OneOrMany<T> {
	/// Flattens both shapes into an ordered sequence.
	pub fn into_vec(self) -> Vec<T> {
		match self {
			Self::One(value) => vec![value],
			Self::Many(values) => values,
		}
	}
}
impl<T> Default for OneOrMany<T> {
	fn default() -> Self {
		Self::Many(Vec::new())
	}
}

/// `{ "Code": .., "Description": .. }` pair used throughout the schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CodeDescription {
	/// Code value.
	pub code: String,
	/// Optional label.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}
impl CodeDescription {
	/// Code without a description.
	pub fn code(code: impl Into<String>) -> Self {
		Self { code: code.into(), description: None }
	}
}

/// Amount plus currency as UPS encodes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireMoney {
	/// ISO currency code.
	pub currency_code: String,
	/// Decimal amount encoded as a string.
	pub monetary_value: Decimal,
}

/// Request/response correlation block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionReference {
	/// Caller-supplied context echoed back.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub customer_context: Option<String>,
	/// UPS-assigned transaction id.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub transaction_identifier: Option<String>,
}

/// Top-level rating request.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpsRateEnvelope {
	/// Request body.
	pub rate_request: UpsRateRequest,
}

/// `RateRequest` body.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpsRateRequest {
	/// Request option block.
	pub request: RequestInfo,
	/// Shipment description.
	pub shipment: Shipment,
}

/// Request option and correlation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestInfo {
	/// `Rate`, `Shop`, `Ratetimeintransit`, or `Shoptimeintransit`.
	pub request_option: String,
	/// Correlation data.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub transaction_reference: Option<TransactionReference>,
}

/// Shipment description.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Shipment {
	/// Billing shipper.
	pub shipper: Party,
	/// Destination.
	pub ship_to: Party,
	/// Origin.
	pub ship_from: Party,
	/// Who pays.
	pub payment_details: PaymentDetails,
	/// Requested service; absent when shopping all services.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub service: Option<CodeDescription>,
	/// Package count as a string.
	pub num_of_pieces: String,
	/// Packages in request order.
	pub package: Vec<WirePackage>,
	/// Requests negotiated rates.
	pub shipment_rating_options: ShipmentRatingOptions,
	/// Shipment-level accessorials.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub shipment_service_options: Option<ShipmentServiceOptions>,
	/// Pickup date enabling time-in-transit.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_time_information: Option<DeliveryTimeInformation>,
}

/// Shipper, ship-to, or ship-from party.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Party {
	/// Account number (shipper only).
	#[serde(skip_serializing_if = "Option::is_none")]
	pub shipper_number: Option<String>,
	/// Postal address.
	pub address: WireAddress,
}

/// Postal address.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireAddress {
	/// Up to three street lines.
	pub address_line: Vec<String>,
	/// City.
	pub city: String,
	/// State or province.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub state_province_code: Option<String>,
	/// Postal code.
	pub postal_code: String,
	/// Country code.
	pub country_code: String,
	/// Present (as an empty string) only for residential addresses.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub residential_address_indicator: Option<String>,
}

/// Payment block.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentDetails {
	/// Charges billed to the shipper.
	pub shipment_charge: Vec<ShipmentCharge>,
}

/// Single shipment charge assignment.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShipmentCharge {
	/// `01` transportation.
	#[serde(rename = "Type")]
	pub charge_type: String,
	/// Bill the shipper account.
	pub bill_shipper: BillShipper,
}

/// Shipper account billed for a charge.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BillShipper {
	/// Account number.
	pub account_number: String,
}

/// Package description.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WirePackage {
	/// Packaging type code (`02` customer supplied).
	pub packaging_type: CodeDescription,
	/// Dimensions.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub dimensions: Option<WireDimensions>,
	/// Weight.
	pub package_weight: PackageWeight,
	/// Package-level accessorials.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub package_service_options: Option<PackageServiceOptions>,
}

/// Package dimensions.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireDimensions {
	/// `IN` or `CM`.
	pub unit_of_measurement: CodeDescription,
	/// Length.
	pub length: Decimal,
	/// Width.
	pub width: Decimal,
	/// Height.
	pub height: Decimal,
}

/// Package or billing weight.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageWeight {
	/// `LBS` or `KGS`.
	pub unit_of_measurement: CodeDescription,
	/// Weight value.
	pub weight: Decimal,
}

/// Package-level accessorials.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageServiceOptions {
	/// Declared value.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub declared_value: Option<WireMoney>,
	/// Signature confirmation.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_confirmation: Option<DeliveryConfirmation>,
}

/// Delivery confirmation type.
#[derive(Clone, Debug, Serialize)]
pub struct DeliveryConfirmation {
	/// `2` signature required.
	#[serde(rename = "DCISType")]
	pub dcis_type: String,
}

/// Rating options.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShipmentRatingOptions {
	/// Empty-string indicator requesting negotiated rates.
	pub negotiated_rates_indicator: String,
}

/// Shipment-level accessorials.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShipmentServiceOptions {
	/// Empty-string indicator requesting Saturday delivery.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub saturday_delivery_indicator: Option<String>,
}

/// Pickup information for time-in-transit.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeliveryTimeInformation {
	/// `03` non-document.
	pub package_bill_type: String,
	/// Pickup date.
	pub pickup: Pickup,
}

/// Pickup date block.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Pickup {
	/// `YYYYMMDD`.
	pub date: String,
}

/// Top-level rating response.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpsRateReply {
	/// Response body.
	pub rate_response: UpsRateResponse,
}

/// `RateResponse` body.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpsRateResponse {
	/// Status block.
	pub response: ResponseInfo,
	/// Rated shipments, one object or an array.
	#[serde(default)]
	pub rated_shipment: OneOrMany<RatedShipment>,
}

/// Response status block.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseInfo {
	/// Business status.
	pub response_status: CodeDescription,
	/// Warnings.
	#[serde(default)]
	pub alert: OneOrMany<CodeDescription>,
	/// Correlation data.
	#[serde(default)]
	pub transaction_reference: Option<TransactionReference>,
}

/// One priced service.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RatedShipment {
	/// Service code.
	pub service: CodeDescription,
	/// Per-shipment warnings.
	#[serde(default)]
	pub rated_shipment_alert: OneOrMany<CodeDescription>,
	/// Billable weight.
	#[serde(default)]
	pub billing_weight: Option<PackageWeight>,
	/// Transportation charge.
	#[serde(default)]
	pub transportation_charges: Option<WireMoney>,
	/// Base service charge.
	#[serde(default)]
	pub base_service_charge: Option<WireMoney>,
	/// Accessorial charges.
	#[serde(default)]
	pub service_options_charges: Option<WireMoney>,
	/// Itemized surcharges.
	#[serde(default)]
	pub itemized_charges: OneOrMany<ItemizedWireCharge>,
	/// Published total.
	pub total_charges: WireMoney,
	/// Account-specific rates.
	#[serde(default)]
	pub negotiated_rate_charges: Option<NegotiatedRateCharges>,
	/// Guarantee details.
	#[serde(default)]
	pub guaranteed_delivery: Option<GuaranteedDelivery>,
	/// Time-in-transit estimate.
	#[serde(default)]
	pub time_in_transit: Option<TimeInTransit>,
}

/// Itemized surcharge.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemizedWireCharge {
	/// Charge code.
	pub code: String,
	/// Optional label.
	#[serde(default)]
	pub description: Option<String>,
	/// Currency.
	pub currency_code: String,
	/// Amount.
	pub monetary_value: Decimal,
}

/// Negotiated totals.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NegotiatedRateCharges {
	/// Negotiated total.
	#[serde(default)]
	pub total_charge: Option<WireMoney>,
}

/// Guarantee details.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GuaranteedDelivery {
	/// Business days in transit as a string.
	#[serde(default)]
	pub business_days_in_transit: Option<String>,
	/// Committed delivery time.
	#[serde(default)]
	pub delivery_by_time: Option<String>,
}

/// Time-in-transit block.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeInTransit {
	/// Summary for the rated service.
	#[serde(default)]
	pub service_summary: Option<ServiceSummary>,
}

/// Service summary.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceSummary {
	/// Arrival estimate.
	#[serde(default)]
	pub estimated_arrival: Option<EstimatedArrival>,
}

/// Arrival estimate.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EstimatedArrival {
	/// Arrival date and time.
	#[serde(default)]
	pub arrival: Option<Arrival>,
	/// Business days in transit as a string.
	#[serde(default)]
	pub business_days_in_transit: Option<String>,
}

/// Arrival date and time.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Arrival {
	/// `YYYYMMDD`.
	#[serde(default)]
	pub date: Option<String>,
	/// `HHMMSS`.
	#[serde(default)]
	pub time: Option<String>,
}

/// Error envelope returned with 4xx statuses.
#[derive(Clone, Debug, Deserialize)]
pub struct UpsErrorEnvelope {
	/// Error body.
	pub response: UpsErrorBody,
}

/// Error list.
#[derive(Clone, Debug, Deserialize)]
pub struct UpsErrorBody {
	/// Errors in UPS order.
	#[serde(default)]
	pub errors: Vec<UpsErrorEntry>,
}

/// Single UPS error.
#[derive(Clone, Debug, Deserialize)]
pub struct UpsErrorEntry {
	/// UPS error code.
	pub code: String,
	/// UPS error message.
	pub message: String,
}
