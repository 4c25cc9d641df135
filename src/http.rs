//! Raw HTTP primitives used by the [`Transport`](crate::transport::Transport).
//!
//! [`HttpSender`] is the crate's only dependency on an HTTP stack. Implementations
//! perform exactly one attempt and report either a response (any status) or a
//! [`TransportFault`] describing why no response arrived. Classification into the
//! error taxonomy and retries live one layer up, so custom senders never need to
//! know about carrier semantics.

// std
use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::BoxError};

/// Boxed future returned by [`HttpSender::send`].
pub type SendFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportFault>> + 'a + Send>>;

/// Single-attempt HTTP client abstraction.
///
/// Implementors must be `Send + Sync + 'static` so one sender can be shared by every
/// carrier adapter and token cache in the process.
pub trait HttpSender
where
	Self: 'static + Send + Sync,
{
	/// Dispatches the request once.
	fn send(&self, request: HttpRequest) -> SendFuture<'_>;
}

/// HTTP verbs used by carrier integrations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// `GET`
	Get,
	/// `POST`
	Post,
}
impl HttpMethod {
	/// Returns the method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Request payload encodings.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
	/// `application/json`
	Json(JsonValue),
	/// `application/x-www-form-urlencoded`
	Form(Vec<(String, String)>),
}
impl RequestBody {
	/// Returns the content type and encoded bytes.
	pub fn encode(&self) -> (&'static str, Vec<u8>) {
		match self {
			Self::Json(value) => ("application/json", value.to_string().into_bytes()),
			Self::Form(pairs) => {
				let encoded = url::form_urlencoded::Serializer::new(String::new())
					.extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
					.finish();

				("application/x-www-form-urlencoded", encoded.into_bytes())
			},
		}
	}
}

/// Fully described outbound request.
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// HTTP method.
	pub method: HttpMethod,
	/// Absolute target URL.
	pub url: Url,
	/// Header names are stored lower-case.
	pub headers: BTreeMap<String, String>,
	/// Optional payload.
	pub body: Option<RequestBody>,
	/// Optional per-request timeout overriding the client default.
	pub timeout: Option<StdDuration>,
}
impl HttpRequest {
	/// Creates a request without headers or body.
	pub fn new(method: HttpMethod, url: Url) -> Self {
		Self { method, url, headers: BTreeMap::new(), body: None, timeout: None }
	}

	/// Adds or replaces a header.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Sets the payload.
	pub fn with_body(mut self, body: RequestBody) -> Self {
		self.body = Some(body);

		self
	}

	/// Sets the per-request timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}
}

/// Response captured by a sender, regardless of status.
#[derive(Clone, Debug, Default)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Header names are stored lower-case.
	pub headers: BTreeMap<String, String>,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl HttpResponse {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates a response with the provided status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: BTreeMap::new(), body: body.into() }
	}

	/// Adds a header (name stored lower-case).
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Returns true for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Looks up a header case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Body decoded as lossy UTF-8.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Body preview truncated to a log-friendly length.
	pub fn body_preview(&self) -> String {
		let text = self.text();

		if text.chars().count() <= Self::BODY_PREVIEW_LIMIT {
			return text;
		}

		let mut buf = text.chars().take(Self::BODY_PREVIEW_LIMIT).collect::<String>();

		buf.push('…');

		buf
	}

	/// Decodes the JSON body, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: DeserializeOwned,
	{
		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de)
	}

	/// Parses the `Retry-After` header (delta-seconds or RFC 2822 date).
	pub fn retry_after(&self) -> Option<Duration> {
		let raw = self.header("retry-after")?.trim();

		if let Ok(secs) = raw.parse::<u32>() {
			return Some(Duration::seconds(i64::from(secs)));
		}
		if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
			let delta = moment - OffsetDateTime::now_utc();

			if delta.is_positive() {
				return Some(delta);
			}
		}

		None
	}
}

/// Why a sender produced no response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultKind {
	/// Connect or read timeout elapsed.
	Timeout,
	/// No response was received (DNS failure, connection refused or reset, TLS).
	NoResponse,
	/// Any other client-side failure (request building, body decoding).
	Other,
}

/// Transport-level failure reported by an [`HttpSender`].
#[derive(Debug, ThisError)]
#[error("HTTP transport fault ({kind:?}): {source}")]
pub struct TransportFault {
	/// Fault category used by the classifier.
	pub kind: FaultKind,
	/// Underlying client failure.
	#[source]
	pub source: BoxError,
}
impl TransportFault {
	/// Wraps a client error under the given category.
	pub fn new(kind: FaultKind, source: impl 'static + Send + Sync + StdError) -> Self {
		Self { kind, source: Box::new(source) }
	}

	/// Shorthand for a timeout fault.
	pub fn timeout(source: impl 'static + Send + Sync + StdError) -> Self {
		Self::new(FaultKind::Timeout, source)
	}

	/// Shorthand for a no-response fault.
	pub fn no_response(source: impl 'static + Send + Sync + StdError) -> Self {
		Self::new(FaultKind::NoResponse, source)
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportFault {
	fn from(e: ReqwestError) -> Self {
		let kind = if e.is_timeout() {
			FaultKind::Timeout
		} else if e.is_connect() || e.is_request() {
			FaultKind::NoResponse
		} else {
			FaultKind::Other
		};

		Self::new(kind, e)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose requests time out after `timeout`.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().timeout(timeout).build()?;

		Ok(Self(client))
	}

	fn build(&self, request: HttpRequest) -> Result<reqwest::Request, TransportFault> {
		let method = match request.method {
			HttpMethod::Get => reqwest::Method::GET,
			HttpMethod::Post => reqwest::Method::POST,
		};
		let mut builder = self.0.request(method, request.url);

		for (name, value) in &request.headers {
			let name = HeaderName::from_bytes(name.as_bytes())
				.map_err(|e| TransportFault::new(FaultKind::Other, e))?;
			let value =
				HeaderValue::from_str(value).map_err(|e| TransportFault::new(FaultKind::Other, e))?;

			builder = builder.header(name, value);
		}
		if let Some(body) = &request.body {
			let (content_type, bytes) = body.encode();

			builder = builder.header(CONTENT_TYPE, content_type).body(bytes);
		}
		if let Some(timeout) = request.timeout {
			builder = builder.timeout(timeout);
		}

		builder.build().map_err(|e| TransportFault::new(FaultKind::Other, e))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpSender for ReqwestHttpClient {
	fn send(&self, request: HttpRequest) -> SendFuture<'_> {
		Box::pin(async move {
			let request = self.build(request)?;
			let response = self.0.execute(request).await?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|v| (name.as_str().to_owned(), v.to_owned()))
				})
				.collect();
			let body = response.bytes().await?.to_vec();

			Ok(HttpResponse { status, headers, body })
		})
	}
}
