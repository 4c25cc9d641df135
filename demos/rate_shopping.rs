//! Shops a domestic shipment against a mocked UPS sandbox and an unconfigured carrier,
//! then picks the cheapest quote.

// std
use std::{sync::Arc, time::Duration};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use carrier_rates::{
	config::{Environment, RatesConfig, TransportSettings, UpsConfig},
	http::ReqwestHttpClient,
	reqwest::Client,
	model::{Address, Package, RateRequest, Weight, WeightUnit},
	rust_decimal::Decimal,
	service::RateService,
};

const RATE_REPLY: &str = r#"{
	"RateResponse": {
		"Response": {
			"ResponseStatus": { "Code": "1", "Description": "Success" },
			"TransactionReference": { "TransactionIdentifier": "demo-txn" }
		},
		"RatedShipment": [
			{
				"Service": { "Code": "03", "Description": "" },
				"TotalCharges": { "CurrencyCode": "USD", "MonetaryValue": "14.85" },
				"GuaranteedDelivery": { "BusinessDaysInTransit": "4" }
			},
			{
				"Service": { "Code": "02", "Description": "" },
				"TotalCharges": { "CurrencyCode": "USD", "MonetaryValue": "32.10" },
				"GuaranteedDelivery": { "BusinessDaysInTransit": "2" }
			}
		]
	}
}"#;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(UpsConfig::OAUTH_PATH);
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":\"14399\"}",
			);
		})
		.await;
	let rate_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/rating/v2403/Shop")
				.header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body(RATE_REPLY);
		})
		.await;
	let ups = UpsConfig::builder(Environment::Sandbox)
		.client_id("demo-client")
		.client_secret("demo-secret")
		.account_number("A1B2C3")
		.base_url(server.base_url())
		.build()?;
	let config = RatesConfig::new(Environment::Sandbox)
		.with_transport(TransportSettings { timeout_ms: 5_000, max_retries: 1 })
		.with_ups(ups);
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.timeout(Duration::from_millis(5_000))
			.build()?,
	);
	let service = RateService::from_config_with_sender(&config, Arc::new(http_client))?;
	let origin = Address::new(["100 Main St"], "Atlanta", "30301", "US").with_state("GA");
	let destination = Address::new(["1 Market St"], "San Francisco", "94105", "US").with_state("CA");
	let request = RateRequest::new(origin, destination, [Package::new(Weight::new(
		Decimal::new(55, 1),
		WeightUnit::Lbs,
	))]);

	println!("Supported carriers: {:?}.", service.list_supported_carriers());

	for (carrier, outcome) in service.shop_rates(["UPS", "fedex"], &request).await {
		match outcome {
			Ok(response) =>
				for quote in &response.quotes {
					println!("{carrier}: {} at {}.", quote.service_name, quote.total_charge);
				},
			Err(e) => println!("{carrier}: {e}."),
		}
	}

	let best = service.best_rate(["ups"], &request).await?;

	println!("Cheapest: {} {} at {}.", best.carrier, best.service_name, best.total_charge);

	// Both shop calls reuse the token acquired by the first one.
	token_mock.assert_calls_async(1).await;
	rate_mock.assert_calls_async(2).await;

	Ok(())
}
