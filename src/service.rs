//! Caller-facing facade over the registry and the shopper.

// self
use crate::{
	_prelude::*,
	config::RatesConfig,
	error::ConfigError,
	http::HttpSender,
	model::{RateQuote, RateRequest, RateResponse},
	registry::CarrierRegistry,
	shop::{RateShopper, ShopResults},
};

/// Entry point for single-carrier rating, rate shopping, and health probes.
#[derive(Clone, Debug)]
pub struct RateService {
	registry: Arc<CarrierRegistry>,
	shopper: RateShopper,
}
impl RateService {
	/// Wraps an already-populated registry.
	pub fn new(registry: Arc<CarrierRegistry>) -> Self {
		let shopper = RateShopper::new(registry.clone());

		Self { registry, shopper }
	}

	/// Validates `config`, builds one reqwest-backed transport, and registers every
	/// configured carrier against it.
	#[cfg(feature = "reqwest")]
	pub fn from_config(config: &RatesConfig) -> Result<Self, ConfigError> {
		let transport = config.transport.build_transport()?;
		let registry = CarrierRegistry::from_config(config, transport)?;

		Ok(Self::new(Arc::new(registry)))
	}

	/// Same as [`RateService::from_config`] but sends every request through `sender`,
	/// for callers that bring their own HTTP stack or TLS settings.
	pub fn from_config_with_sender(
		config: &RatesConfig,
		sender: Arc<dyn HttpSender>,
	) -> Result<Self, ConfigError> {
		let transport = config.transport.build_transport_with(sender)?;
		let registry = CarrierRegistry::from_config(config, transport)?;

		Ok(Self::new(Arc::new(registry)))
	}

	/// Bounds every shop operation by `deadline`.
	pub fn with_deadline(mut self, deadline: StdDuration) -> Self {
		self.shopper = self.shopper.with_deadline(deadline);

		self
	}

	/// Underlying registry.
	pub fn registry(&self) -> &CarrierRegistry {
		&self.registry
	}

	/// Rates `request` with a single carrier; the carrier's typed error surfaces unchanged.
	pub async fn get_rates(&self, carrier: &str, request: &RateRequest) -> Result<RateResponse> {
		let adapter = self.registry.create(carrier)?;

		Ok(adapter.get_rates(request).await?)
	}

	/// Rates `request` with every named carrier concurrently.
	pub async fn shop_rates<I, S>(&self, carriers: I, request: &RateRequest) -> ShopResults
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.shopper.shop(carriers, request).await
	}

	/// Cheapest quote across every carrier that answered.
	///
	/// Fails with `NO_RATES_AVAILABLE` when no carrier produced a quote; the details
	/// list the per-carrier failures.
	pub async fn best_rate<I, S>(&self, carriers: I, request: &RateRequest) -> Result<RateQuote>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let results = self.shop_rates(carriers, request).await;
		let mut failures = serde_json::Map::new();
		let mut best: Option<RateQuote> = None;

		for (carrier, outcome) in results {
			match outcome {
				Ok(response) =>
					if let Some(quote) = response.cheapest().filter(|q| {
						best.as_ref()
							.is_none_or(|b| q.total_charge.amount < b.total_charge.amount)
					}) {
						best = Some(quote.clone());
					},
				Err(e) => {
					failures.insert(carrier, JsonValue::String(e.to_string()));
				},
			}
		}

		best.ok_or_else(|| {
			CarrierError::new(ErrorKind::NoRatesAvailable, "No carrier returned a rate.")
				.with_detail("failures", JsonValue::Object(failures))
				.into()
		})
	}

	/// Returns true when the carrier is registered and can reach its API.
	pub async fn check_carrier_health(&self, carrier: &str) -> bool {
		match self.registry.create(carrier) {
			Ok(adapter) => adapter.health_check().await,
			Err(_) => false,
		}
	}

	/// Registered carrier names.
	pub fn list_supported_carriers(&self) -> BTreeSet<String> {
		self.registry.list_supported()
	}
}
