//! Error taxonomy shared by the transport, token cache, carrier adapters, and registry.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Classified runtime failure raised while talking to a carrier.
	#[error(transparent)]
	Carrier(#[from] CarrierError),
	/// Local configuration problem detected at construction time.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller asked for a carrier the registry does not know.
	#[error(transparent)]
	Registry(#[from] RegistryError),
}
impl Error {
	/// Returns the classified carrier error, if this is one.
	pub fn as_carrier(&self) -> Option<&CarrierError> {
		match self {
			Self::Carrier(e) => Some(e),
			_ => None,
		}
	}

	/// Returns the [`ErrorKind`] for carrier failures.
	pub fn kind(&self) -> Option<ErrorKind> {
		self.as_carrier().map(CarrierError::kind)
	}
}

/// Flat failure taxonomy; every kind carries a fixed retryability default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
	/// Token acquisition or bearer authentication failed.
	AuthFailed,
	/// Bearer token was rejected as expired.
	AuthTokenExpired,
	/// Credentials were rejected outright.
	AuthInvalidCredentials,
	/// Normalized request failed validation before any network call.
	ValidationError,
	/// Carrier rejected an address.
	InvalidAddress,
	/// Carrier rejected a package description.
	InvalidPackage,
	/// Carrier API returned a client error or an unexpected payload shape.
	ApiError,
	/// Carrier throttled the caller.
	RateLimitExceeded,
	/// Carrier returned a server error.
	ServiceUnavailable,
	/// No response was received (DNS, connection reset, TLS).
	NetworkError,
	/// Request timed out.
	Timeout,
	/// Carrier accepted the call but reported a business failure.
	CarrierError,
	/// No carrier produced a usable quote.
	NoRatesAvailable,
	/// Anything not covered above.
	UnknownError,
}
impl ErrorKind {
	/// Returns the stable wire label (e.g. `RATE_LIMIT_EXCEEDED`).
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::AuthFailed => "AUTH_FAILED",
			Self::AuthTokenExpired => "AUTH_TOKEN_EXPIRED",
			Self::AuthInvalidCredentials => "AUTH_INVALID_CREDENTIALS",
			Self::ValidationError => "VALIDATION_ERROR",
			Self::InvalidAddress => "INVALID_ADDRESS",
			Self::InvalidPackage => "INVALID_PACKAGE",
			Self::ApiError => "API_ERROR",
			Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
			Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
			Self::NetworkError => "NETWORK_ERROR",
			Self::Timeout => "TIMEOUT",
			Self::CarrierError => "CARRIER_ERROR",
			Self::NoRatesAvailable => "NO_RATES_AVAILABLE",
			Self::UnknownError => "UNKNOWN_ERROR",
		}
	}

	/// Retryability applied when an error of this kind is constructed.
	pub const fn default_retryable(self) -> bool {
		matches!(
			self,
			Self::RateLimitExceeded | Self::ServiceUnavailable | Self::NetworkError | Self::Timeout
		)
	}

	/// Maps a non-2xx HTTP status onto the taxonomy.
	pub const fn from_status(status: u16) -> Self {
		match status {
			429 => Self::RateLimitExceeded,
			401 => Self::AuthFailed,
			403 => Self::AuthInvalidCredentials,
			500.. => Self::ServiceUnavailable,
			400..=499 => Self::ApiError,
			_ => Self::UnknownError,
		}
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Classified carrier failure carrying retryability and diagnostic context.
#[derive(Debug, ThisError)]
#[error("{kind}: {message}")]
pub struct CarrierError {
	kind: ErrorKind,
	message: String,
	details: BTreeMap<String, JsonValue>,
	retryable: bool,
	carrier_code: Option<String>,
	carrier: Option<String>,
	timestamp: OffsetDateTime,
	#[source]
	source: Option<BoxError>,
}
impl CarrierError {
	/// Creates an error stamped with the current UTC instant and the kind's default
	/// retryability.
	pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
		Self {
			kind,
			message: message.into(),
			details: BTreeMap::new(),
			retryable: kind.default_retryable(),
			carrier_code: None,
			carrier: None,
			timestamp: OffsetDateTime::now_utc(),
			source: None,
		}
	}

	/// Shorthand for [`ErrorKind::ValidationError`].
	pub fn validation(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::ValidationError, message)
	}

	/// Shorthand for [`ErrorKind::ApiError`].
	pub fn api(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::ApiError, message)
	}

	/// Shorthand for [`ErrorKind::UnknownError`].
	pub fn unknown(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::UnknownError, message)
	}

	/// Replaces the human-readable summary.
	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = message.into();

		self
	}

	/// Overrides the retryability flag.
	pub fn with_retryable(mut self, retryable: bool) -> Self {
		self.retryable = retryable;

		self
	}

	/// Adds a single diagnostic detail.
	pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
		self.details.insert(key.into(), value.into());

		self
	}

	/// Merges a set of diagnostic details.
	pub fn with_details<I, K>(mut self, details: I) -> Self
	where
		I: IntoIterator<Item = (K, JsonValue)>,
		K: Into<String>,
	{
		self.details.extend(details.into_iter().map(|(k, v)| (k.into(), v)));

		self
	}

	/// Attaches the carrier's native error code.
	pub fn with_carrier_code(mut self, code: impl Into<String>) -> Self {
		self.carrier_code = Some(code.into());

		self
	}

	/// Tags the error with the carrier that produced it.
	pub fn with_carrier(mut self, carrier: impl Into<String>) -> Self {
		self.carrier = Some(carrier.into());

		self
	}

	/// Attaches an underlying cause.
	pub fn with_source(mut self, source: impl 'static + Send + Sync + StdError) -> Self {
		self.source = Some(Box::new(source));

		self
	}

	/// Failure classification.
	pub fn kind(&self) -> ErrorKind {
		self.kind
	}

	/// Human-readable summary.
	pub fn message(&self) -> &str {
		&self.message
	}

	/// Diagnostic details (HTTP status, body preview, validation issues, ...).
	pub fn details(&self) -> &BTreeMap<String, JsonValue> {
		&self.details
	}

	/// Whether the same request may succeed if reattempted after a delay.
	pub fn is_retryable(&self) -> bool {
		self.retryable
	}

	/// Carrier-native error code, when the carrier supplied one.
	pub fn carrier_code(&self) -> Option<&str> {
		self.carrier_code.as_deref()
	}

	/// Carrier that produced the error, when known.
	pub fn carrier(&self) -> Option<&str> {
		self.carrier.as_deref()
	}

	/// UTC instant captured at classification time.
	pub fn timestamp(&self) -> OffsetDateTime {
		self.timestamp
	}

	/// HTTP status recorded by the transport, if any.
	pub fn http_status(&self) -> Option<u16> {
		self.details.get("status").and_then(JsonValue::as_u64).and_then(|s| u16::try_from(s).ok())
	}
}
/// Configuration and construction failures raised before any carrier call.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A required field is absent or blank.
	#[error("Configuration for `{section}` is missing the required `{field}` field.")]
	MissingField {
		/// Config section (carrier name or `transport`).
		section: &'static str,
		/// Missing field name.
		field: &'static str,
	},
	/// A field is present but holds an unusable value.
	#[error("Configuration field `{section}.{field}` is invalid: {reason}.")]
	InvalidValue {
		/// Config section (carrier name or `transport`).
		section: &'static str,
		/// Offending field name.
		field: &'static str,
		/// Why the value was rejected.
		reason: &'static str,
	},
	/// A URL field failed to parse.
	#[error("Configuration field `{field}` is not a valid URL.")]
	InvalidUrl {
		/// Offending field name.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A URL uses a scheme other than http/https.
	#[error("Configuration field `{field}` must use http or https: {url}.")]
	UnsupportedScheme {
		/// Offending field name.
		field: &'static str,
		/// URL that failed validation.
		url: String,
	},
	/// A carrier factory failed while building an adapter.
	#[error("Carrier `{carrier}` could not be constructed: {reason}.")]
	AdapterBuild {
		/// Carrier name.
		carrier: String,
		/// Failure description.
		reason: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Lookup failures raised by the carrier registry.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RegistryError {
	/// Carrier name is not registered.
	#[error("Carrier `{name}` is not supported. Supported carriers: {}.", supported.join(", "))]
	UnknownCarrier {
		/// Name the caller asked for.
		name: String,
		/// Registered carrier names, sorted.
		supported: Vec<String>,
	},
}
