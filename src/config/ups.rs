//! UPS credentials, endpoints, and the validating builder.

// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, TokenSecret},
	config::{self, Environment},
	error::ConfigError,
};

const SECTION: &str = "ups";

/// Resolved UPS settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpsConfig {
	/// OAuth client id.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: TokenSecret,
	/// Shipper account number billed for the shipment.
	pub account_number: String,
	/// API host, e.g. `https://wwwcie.ups.com`.
	pub base_url: Url,
	/// OAuth token endpoint.
	pub oauth_url: Url,
	/// Rating API version path segment.
	#[serde(default = "UpsConfig::default_api_version")]
	pub api_version: String,
	/// Value sent in the `transactionSrc` header.
	#[serde(default = "UpsConfig::default_transaction_source")]
	pub transaction_source: String,
}
impl UpsConfig {
	/// Default Rating API version.
	pub const DEFAULT_API_VERSION: &'static str = "v2403";
	/// Default `transactionSrc` header value.
	pub const DEFAULT_TRANSACTION_SOURCE: &'static str = "carrier-rates";
	/// Token endpoint path relative to the API host.
	pub const OAUTH_PATH: &'static str = "/security/v1/oauth/token";

	/// Returns a builder seeded with the environment's default hosts.
	pub fn builder(environment: Environment) -> UpsConfigBuilder {
		UpsConfigBuilder::new(environment)
	}

	/// Credential pair for the token cache.
	pub fn credentials(&self) -> ClientCredentials {
		ClientCredentials::new(&self.client_id, self.client_secret.expose())
	}

	/// Rejects blank required fields and non-http(s) URLs.
	pub fn validate(&self) -> Result<(), ConfigError> {
		config::require(SECTION, "client_id", &self.client_id)?;
		config::require(SECTION, "client_secret", self.client_secret.expose())?;
		config::require(SECTION, "account_number", &self.account_number)?;
		config::require(SECTION, "api_version", &self.api_version)?;
		config::require(SECTION, "transaction_source", &self.transaction_source)?;
		config::validate_url("base_url", &self.base_url)?;
		config::validate_url("oauth_url", &self.oauth_url)?;

		Ok(())
	}

	fn default_api_version() -> String {
		Self::DEFAULT_API_VERSION.into()
	}

	fn default_transaction_source() -> String {
		Self::DEFAULT_TRANSACTION_SOURCE.into()
	}
}

/// Builder for [`UpsConfig`] values.
#[derive(Debug)]
pub struct UpsConfigBuilder {
	environment: Environment,
	client_id: Option<String>,
	client_secret: Option<TokenSecret>,
	account_number: Option<String>,
	base_url: Option<String>,
	oauth_url: Option<String>,
	api_version: String,
	transaction_source: String,
}
impl UpsConfigBuilder {
	fn new(environment: Environment) -> Self {
		Self {
			environment,
			client_id: None,
			client_secret: None,
			account_number: None,
			base_url: None,
			oauth_url: None,
			api_version: UpsConfig::DEFAULT_API_VERSION.into(),
			transaction_source: UpsConfig::DEFAULT_TRANSACTION_SOURCE.into(),
		}
	}

	/// Sets the OAuth client id.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the OAuth client secret.
	pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
		self.client_secret = Some(TokenSecret::new(client_secret));

		self
	}

	/// Sets the shipper account number.
	pub fn account_number(mut self, account_number: impl Into<String>) -> Self {
		self.account_number = Some(account_number.into());

		self
	}

	/// Overrides the API host. The token endpoint follows it unless set explicitly.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());

		self
	}

	/// Overrides the token endpoint.
	pub fn oauth_url(mut self, url: impl Into<String>) -> Self {
		self.oauth_url = Some(url.into());

		self
	}

	/// Overrides the Rating API version.
	pub fn api_version(mut self, version: impl Into<String>) -> Self {
		self.api_version = version.into();

		self
	}

	/// Overrides the `transactionSrc` header value.
	pub fn transaction_source(mut self, source: impl Into<String>) -> Self {
		self.transaction_source = source.into();

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<UpsConfig, ConfigError> {
		let client_id =
			self.client_id.ok_or(ConfigError::MissingField { section: SECTION, field: "client_id" })?;
		let client_secret = self
			.client_secret
			.ok_or(ConfigError::MissingField { section: SECTION, field: "client_secret" })?;
		let account_number = self
			.account_number
			.ok_or(ConfigError::MissingField { section: SECTION, field: "account_number" })?;
		let base_raw = self.base_url.unwrap_or_else(|| self.environment.ups_base_url().into());
		let base_url = config::parse_url("base_url", &base_raw)?;
		let oauth_url = match self.oauth_url {
			Some(raw) => config::parse_url("oauth_url", &raw)?,
			None => config::parse_url(
				"oauth_url",
				&format!("{}{}", base_raw.trim().trim_end_matches('/'), UpsConfig::OAUTH_PATH),
			)?,
		};
		let config = UpsConfig {
			client_id,
			client_secret,
			account_number,
			base_url,
			oauth_url,
			api_version: self.api_version,
			transaction_source: self.transaction_source,
		};

		config.validate()?;

		Ok(config)
	}
}
