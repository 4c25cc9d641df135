//! Explicit configuration values constructed once at startup and passed into
//! constructors.
//!
//! Nothing here reads files or environment variables; callers deserialize or build
//! a [`RatesConfig`], call [`RatesConfig::validate`], and hand it to
//! [`RateService::from_config`](crate::service::RateService::from_config) or
//! [`CarrierRegistry::from_config`](crate::registry::CarrierRegistry::from_config).

pub mod ups;

pub use ups::*;

// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*,
	error::ConfigError,
	http::HttpSender,
	transport::{RetryPolicy, Transport},
};

/// Deployment target selecting default carrier hosts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
	/// Carrier test hosts.
	#[default]
	Sandbox,
	/// Carrier production hosts.
	Production,
}
impl Environment {
	/// Default UPS API host.
	pub const fn ups_base_url(self) -> &'static str {
		match self {
			Self::Sandbox => "https://wwwcie.ups.com",
			Self::Production => "https://onlinetools.ups.com",
		}
	}
}

/// HTTP timeout and retry budget shared by every carrier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
	/// Per-attempt timeout in milliseconds.
	pub timeout_ms: u64,
	/// Retries after the first attempt for retryable failures.
	pub max_retries: u32,
}
impl TransportSettings {
	/// Default per-attempt timeout.
	pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
	/// Default retry budget.
	pub const DEFAULT_MAX_RETRIES: u32 = 3;

	/// Per-attempt timeout.
	pub fn timeout(&self) -> StdDuration {
		StdDuration::from_millis(self.timeout_ms)
	}

	/// Retry policy with the default backoff schedule and this retry budget.
	pub fn retry_policy(&self) -> RetryPolicy {
		RetryPolicy::new(self.max_retries)
	}

	/// Rejects a zero timeout.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.timeout_ms == 0 {
			return Err(ConfigError::InvalidValue {
				section: "transport",
				field: "timeout_ms",
				reason: "timeout must be greater than zero",
			});
		}

		Ok(())
	}

	/// Builds a reqwest-backed [`Transport`] honoring the timeout and retry budget.
	#[cfg(feature = "reqwest")]
	pub fn build_transport(&self) -> Result<Transport, ConfigError> {
		self.validate()?;

		let sender: Arc<dyn HttpSender> = Arc::new(ReqwestHttpClient::with_timeout(self.timeout())?);

		self.build_transport_with(sender)
	}

	/// Builds a [`Transport`] over a caller-supplied sender with this retry budget.
	///
	/// The sender owns its own timeout; `timeout_ms` is only validated here.
	pub fn build_transport_with(&self, sender: Arc<dyn HttpSender>) -> Result<Transport, ConfigError> {
		self.validate()?;

		Ok(Transport::new(sender, self.retry_policy()))
	}
}
impl Default for TransportSettings {
	fn default() -> Self {
		Self { timeout_ms: Self::DEFAULT_TIMEOUT_MS, max_retries: Self::DEFAULT_MAX_RETRIES }
	}
}

/// Top-level configuration for the rating core.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RatesConfig {
	/// Deployment target.
	#[serde(default)]
	pub environment: Environment,
	/// Transport settings.
	#[serde(default)]
	pub transport: TransportSettings,
	/// UPS credentials and endpoints; UPS is unavailable when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ups: Option<UpsConfig>,
}
impl RatesConfig {
	/// Creates a config with default transport settings and no carriers.
	pub fn new(environment: Environment) -> Self {
		Self { environment, ..Default::default() }
	}

	/// Overrides the transport settings.
	pub fn with_transport(mut self, transport: TransportSettings) -> Self {
		self.transport = transport;

		self
	}

	/// Enables UPS.
	pub fn with_ups(mut self, ups: UpsConfig) -> Self {
		self.ups = Some(ups);

		self
	}

	/// Validates every section.
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.transport.validate()?;

		if let Some(ups) = self.ups.as_ref() {
			ups.validate()?;
		}

		Ok(())
	}
}

pub(crate) fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { field, source })?;

	validate_url(field, &url)?;

	Ok(url)
}

pub(crate) fn validate_url(field: &'static str, url: &Url) -> Result<(), ConfigError> {
	if matches!(url.scheme(), "http" | "https") {
		Ok(())
	} else {
		Err(ConfigError::UnsupportedScheme { field, url: url.to_string() })
	}
}

pub(crate) fn require(
	section: &'static str,
	field: &'static str,
	value: &str,
) -> Result<(), ConfigError> {
	if value.trim().is_empty() { Err(ConfigError::MissingField { section, field }) } else { Ok(()) }
}
