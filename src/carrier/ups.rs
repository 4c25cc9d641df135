//! UPS Rating API protocol.
//!
//! Requests go to `{base}/api/rating/{version}/{option}` where the option is `Rate`
//! when the caller names a service and `Shop` otherwise (with the `timeintransit`
//! variants when a shipment date is supplied). Tokens come from the UPS OAuth
//! endpoint with the shipper account as `x-merchant-id`.

pub mod wire;

// crates.io
use rand::Rng;
use serde_json::json;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
// self
use crate::{
	_prelude::*,
	auth::TokenCache,
	carrier::{BusinessStatus, RateProtocol, RatingAdapter},
	config::UpsConfig,
	model::{Address, ChargeBreakdown, ItemizedCharge, Money, RateQuote, RateRequest, RateResponse},
	transport::Transport,
};
use wire::*;

/// UPS adapter: the shared rating pipeline over [`UpsProtocol`].
pub type UpsAdapter = RatingAdapter<UpsProtocol>;

const UPS_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year][month][day]");

/// Translation between the normalized model and the UPS Rating API.
#[derive(Clone, Debug)]
pub struct UpsProtocol {
	config: UpsConfig,
}
impl UpsProtocol {
	/// Registry name.
	pub const CARRIER: &'static str = "ups";

	/// Creates the protocol for a resolved config.
	pub fn new(config: UpsConfig) -> Self {
		Self { config }
	}

	/// Builds a complete adapter with a dedicated token cache.
	pub fn adapter(config: UpsConfig, transport: Transport) -> UpsAdapter {
		let tokens = TokenCache::new(
			Self::CARRIER,
			transport.clone(),
			config.oauth_url.clone(),
			config.credentials(),
		)
		.with_header("x-merchant-id", config.account_number.clone());

		RatingAdapter::new(Self::new(config), transport, tokens)
	}

	/// Active configuration.
	pub fn config(&self) -> &UpsConfig {
		&self.config
	}

	/// Rating request option for the request.
	pub fn request_option(request: &RateRequest) -> &'static str {
		match (request.service_level.is_some(), request.shipment_date.is_some()) {
			(true, false) => "Rate",
			(true, true) => "Ratetimeintransit",
			(false, false) => "Shop",
			(false, true) => "Shoptimeintransit",
		}
	}

	fn party(address: &Address, shipper_number: Option<&str>) -> Party {
		Party {
			shipper_number: shipper_number.map(str::to_owned),
			address: WireAddress {
				address_line: address.street_lines.iter().take(3).cloned().collect(),
				city: address.city.clone(),
				state_province_code: address.state.clone(),
				postal_code: address.postal_code.clone(),
				country_code: address.country_code.clone(),
				residential_address_indicator: address.residential.then(String::new),
			},
		}
	}

	fn quote(&self, shipment: RatedShipment) -> RateQuote {
		let service_code = shipment.service.code;
		let service_name = service_name(&service_code)
			.map(str::to_owned)
			.or(shipment.service.description.filter(|d| !d.trim().is_empty()))
			.unwrap_or_else(|| format!("UPS Service {service_code}"));
		let published = money(shipment.total_charges);
		let negotiated =
			shipment.negotiated_rate_charges.and_then(|charges| charges.total_charge).map(money);
		let breakdown = ChargeBreakdown {
			base: shipment.base_service_charge.or(shipment.transportation_charges).map(money),
			service_options: shipment.service_options_charges.map(money),
			itemized: shipment
				.itemized_charges
				.into_vec()
				.into_iter()
				.map(|charge| ItemizedCharge {
					code: charge.code,
					description: charge.description,
					amount: Money::new(charge.monetary_value, charge.currency_code),
				})
				.collect(),
		};
		let arrival = shipment
			.time_in_transit
			.and_then(|tit| tit.service_summary)
			.and_then(|summary| summary.estimated_arrival);
		let transit_days = shipment
			.guaranteed_delivery
			.as_ref()
			.and_then(|g| parse_days(g.business_days_in_transit.as_deref()))
			.or_else(|| {
				arrival.as_ref().and_then(|a| parse_days(a.business_days_in_transit.as_deref()))
			});
		let delivery_date = arrival
			.as_ref()
			.and_then(|a| a.arrival.as_ref())
			.and_then(|a| a.date.as_deref())
			.and_then(|raw| Date::parse(raw.trim(), UPS_DATE).ok());
		let mut metadata = BTreeMap::new();

		metadata.insert("published_charge".into(), money_json(&published));

		if let Some(negotiated) = negotiated.as_ref() {
			metadata.insert("negotiated_charge".into(), money_json(negotiated));
		}
		if let Some(weight) = shipment.billing_weight {
			metadata.insert(
				"billing_weight".into(),
				json!({
					"value": weight.weight.to_string(),
					"unit": weight.unit_of_measurement.code,
				}),
			);
		}
		if let Some(by) = shipment.guaranteed_delivery.as_ref().and_then(|g| g.delivery_by_time.clone())
		{
			metadata.insert("delivery_by_time".into(), JsonValue::String(by));
		}

		let alerts = shipment
			.rated_shipment_alert
			.into_vec()
			.into_iter()
			.map(|alert| json!({ "code": alert.code, "description": alert.description }))
			.collect::<Vec<_>>();

		if !alerts.is_empty() {
			metadata.insert("alerts".into(), JsonValue::Array(alerts));
		}

		RateQuote {
			carrier: Self::CARRIER.into(),
			service_code,
			service_name,
			total_charge: negotiated.unwrap_or(published),
			breakdown: (!breakdown.is_empty()).then_some(breakdown),
			transit_days,
			guaranteed_delivery: shipment.guaranteed_delivery.is_some(),
			delivery_date,
			metadata,
		}
	}
}
impl RateProtocol for UpsProtocol {
	type WireRequest = UpsRateEnvelope;
	type WireResponse = UpsRateReply;

	fn carrier(&self) -> &str {
		Self::CARRIER
	}

	fn rate_url(&self, request: &RateRequest) -> Result<Url, CarrierError> {
		let mut url = self.config.base_url.clone();

		url.path_segments_mut()
			.map_err(|_| CarrierError::unknown("UPS base URL cannot carry a path."))?
			.pop_if_empty()
			.extend(["api", "rating", self.config.api_version.as_str(), Self::request_option(request)]);

		Ok(url)
	}

	fn rate_headers(&self) -> BTreeMap<String, String> {
		let trans_id = format!("{:032x}", rand::rng().random::<u128>());

		BTreeMap::from([
			("transId".into(), trans_id),
			("transactionSrc".into(), self.config.transaction_source.clone()),
		])
	}

	fn to_wire(&self, request: &RateRequest) -> Self::WireRequest {
		let account = self.config.account_number.as_str();
		let services = request.requested_services.unwrap_or_default();
		let package = request
			.packages
			.iter()
			.map(|package| {
				let mut options = PackageServiceOptions {
					declared_value: package.declared_value.as_ref().map(|value| WireMoney {
						currency_code: value.currency.clone(),
						monetary_value: value.amount,
					}),
					delivery_confirmation: None,
				};

				if services.signature_required {
					options.delivery_confirmation =
						Some(DeliveryConfirmation { dcis_type: "2".into() });
				}

				let has_options =
					options.declared_value.is_some() || options.delivery_confirmation.is_some();

				WirePackage {
					packaging_type: CodeDescription::code(
						package.packaging_type.as_deref().unwrap_or("02"),
					),
					dimensions: package.dimensions.as_ref().map(|d| WireDimensions {
						unit_of_measurement: CodeDescription::code(d.unit.as_str()),
						length: d.length,
						width: d.width,
						height: d.height,
					}),
					package_weight: PackageWeight {
						unit_of_measurement: CodeDescription::code(package.weight.unit.as_str()),
						weight: package.weight.value,
					},
					package_service_options: has_options.then_some(options),
				}
			})
			.collect::<Vec<_>>();
		let shipment = Shipment {
			shipper: Self::party(&request.origin, Some(account)),
			ship_to: Self::party(&request.destination, None),
			ship_from: Self::party(&request.origin, None),
			payment_details: PaymentDetails {
				shipment_charge: vec![ShipmentCharge {
					charge_type: "01".into(),
					bill_shipper: BillShipper { account_number: account.into() },
				}],
			},
			service: request.service_level.as_deref().map(|code| CodeDescription {
				code: code.into(),
				description: service_name(code).map(str::to_owned),
			}),
			num_of_pieces: request.packages.len().to_string(),
			package,
			shipment_rating_options: ShipmentRatingOptions { negotiated_rates_indicator: String::new() },
			shipment_service_options: services.saturday_delivery.then(|| ShipmentServiceOptions {
				saturday_delivery_indicator: Some(String::new()),
			}),
			delivery_time_information: request.shipment_date.and_then(|date| {
				date.format(UPS_DATE).ok().map(|date| DeliveryTimeInformation {
					package_bill_type: "03".into(),
					pickup: Pickup { date },
				})
			}),
		};

		UpsRateEnvelope {
			rate_request: UpsRateRequest {
				request: RequestInfo {
					request_option: Self::request_option(request).into(),
					transaction_reference: None,
				},
				shipment,
			},
		}
	}

	fn business_status(&self, response: &Self::WireResponse) -> BusinessStatus {
		let info = &response.rate_response.response;
		let status = &info.response_status;

		if status.code.trim() == "1" {
			return BusinessStatus::Success;
		}

		let first_alert = match &info.alert {
			OneOrMany::One(alert) => Some(alert),
			OneOrMany::Many(alerts) => alerts.first(),
		};
		let code = first_alert.map(|a| a.code.clone()).unwrap_or_else(|| status.code.clone());
		let message = first_alert
			.and_then(|a| a.description.clone())
			.or_else(|| status.description.clone())
			.filter(|m| !m.trim().is_empty())
			.unwrap_or_else(|| format!("UPS rejected the rate request with status {}.", status.code));

		BusinessStatus::Failure { code: Some(code), message }
	}

	fn to_domain(&self, response: Self::WireResponse) -> Result<RateResponse, CarrierError> {
		let body = response.rate_response;
		let request_id =
			body.response.transaction_reference.and_then(|reference| reference.transaction_identifier);
		let quotes =
			body.rated_shipment.into_vec().into_iter().map(|shipment| self.quote(shipment)).collect();

		Ok(RateResponse::new(quotes, request_id))
	}

	fn refine_error(&self, error: CarrierError) -> CarrierError {
		if !error.http_status().is_some_and(|status| (400..500).contains(&status)) {
			return error;
		}

		let entry = error
			.details()
			.get("body")
			.and_then(JsonValue::as_str)
			.and_then(|body| serde_json::from_str::<UpsErrorEnvelope>(body).ok())
			.and_then(|envelope| envelope.response.errors.into_iter().next());

		match entry {
			Some(entry) => error
				.with_message(format!("UPS rejected the request: {}", entry.message))
				.with_carrier_code(entry.code),
			None => error,
		}
	}
}

/// Human-readable name for a UPS service code.
pub fn service_name(code: &str) -> Option<&'static str> {
	let name = match code {
		"01" => "UPS Next Day Air",
		"02" => "UPS 2nd Day Air",
		"03" => "UPS Ground",
		"07" => "UPS Worldwide Express",
		"08" => "UPS Worldwide Expedited",
		"11" => "UPS Standard",
		"12" => "UPS 3 Day Select",
		"13" => "UPS Next Day Air Saver",
		"14" => "UPS Next Day Air Early",
		"17" => "UPS Worldwide Economy DDU",
		"54" => "UPS Worldwide Express Plus",
		"59" => "UPS 2nd Day Air A.M.",
		"65" => "UPS Worldwide Saver",
		"71" => "UPS Worldwide Express Freight Midday",
		"72" => "UPS Worldwide Economy DDP",
		"74" => "UPS Express 12:00",
		"75" => "UPS Heavy Goods",
		"96" => "UPS Worldwide Express Freight",
		_ => return None,
	};

	Some(name)
}

fn money(value: WireMoney) -> Money {
	Money::new(value.monetary_value, value.currency_code)
}

fn money_json(value: &Money) -> JsonValue {
	json!({ "amount": value.amount.to_string(), "currency": value.currency })
}

fn parse_days(raw: Option<&str>) -> Option<u32> {
	raw?.trim().parse().ok()
}
