//! Carrier abstraction: the adapter contract every carrier satisfies plus a generic
//! rating pipeline that carriers plug their wire protocol into.
//!
//! [`CarrierAdapter`] is the object-safe seam the registry and shopper work with.
//! Most carriers do not implement it by hand; they implement [`RateProtocol`] (pure
//! translation between the normalized model and the carrier's JSON) and wrap it in
//! [`RatingAdapter`], which owns the transport and token cache and runs the shared
//! pipeline:
//!
//! 1. validate the [`RateRequest`] (no network call on failure),
//! 2. obtain a bearer token,
//! 3. translate and POST the carrier request,
//! 4. decode the carrier response (`API_ERROR` on shape mismatch),
//! 5. inspect the embedded business status (`CARRIER_ERROR` on rejection),
//! 6. translate into a [`RateResponse`],
//! 7. convert anything unclassified (including panics) into `UNKNOWN_ERROR`.

pub mod ups;

// std
use std::panic::AssertUnwindSafe;
// crates.io
use futures::FutureExt;
// self
use crate::{
	_prelude::*,
	auth::TokenCache,
	http::{HttpMethod, RequestBody},
	model::{RateRequest, RateResponse},
	obs::{self, CallKind, CallOutcome, CallSpan},
	transport::{RequestOptions, Transport},
};

/// Boxed future returned by carrier rating calls.
pub type CarrierFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CarrierError>> + 'a + Send>>;

/// Boxed future returned by [`CarrierAdapter::health_check`].
pub type HealthFuture<'a> = Pin<Box<dyn Future<Output = bool> + 'a + Send>>;

/// Contract every carrier integration satisfies.
///
/// Implementations must be shareable across tasks; the registry hands out
/// `Arc<dyn CarrierAdapter>` and the shopper calls several adapters concurrently.
pub trait CarrierAdapter
where
	Self: 'static + Send + Sync,
{
	/// Lower-case carrier name (e.g. `ups`).
	fn name(&self) -> &str;

	/// Rates the request, returning normalized quotes or a classified error.
	fn get_rates<'a>(&'a self, request: &'a RateRequest) -> CarrierFuture<'a, RateResponse>;

	/// Returns true iff the carrier's token endpoint issues a token. Never fails.
	fn health_check(&self) -> HealthFuture<'_>;
}

/// Business outcome embedded in an otherwise well-formed carrier response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BusinessStatus {
	/// The carrier accepted the request.
	Success,
	/// The carrier rejected the request inside a 2xx response.
	Failure {
		/// Carrier-native error code, if supplied.
		code: Option<String>,
		/// Carrier-supplied message.
		message: String,
	},
}

/// Pure translation layer between the normalized model and one carrier's wire format.
pub trait RateProtocol
where
	Self: 'static + Send + Sync,
{
	/// Serialized request body.
	type WireRequest: Serialize + Send;
	/// Decoded response body.
	type WireResponse: DeserializeOwned + Send;

	/// Lower-case carrier name.
	fn carrier(&self) -> &str;

	/// Rating endpoint for the request.
	fn rate_url(&self, request: &RateRequest) -> Result<Url, CarrierError>;

	/// Extra headers sent with each rating call (the bearer token is added separately).
	fn rate_headers(&self) -> BTreeMap<String, String> {
		BTreeMap::new()
	}

	/// Translates the normalized request into the carrier request.
	fn to_wire(&self, request: &RateRequest) -> Self::WireRequest;

	/// Reads the business status embedded in a decoded response.
	fn business_status(&self, response: &Self::WireResponse) -> BusinessStatus;

	/// Translates a successful carrier response into the normalized model.
	fn to_domain(&self, response: Self::WireResponse) -> Result<RateResponse, CarrierError>;

	/// Refines a transport-classified failure using the carrier's error envelope.
	fn refine_error(&self, error: CarrierError) -> CarrierError {
		error
	}
}

/// [`CarrierAdapter`] that runs the shared rating pipeline over a [`RateProtocol`].
pub struct RatingAdapter<P> {
	protocol: P,
	transport: Transport,
	tokens: TokenCache,
}
impl<P> RatingAdapter<P>
where
	P: RateProtocol,
{
	/// Creates an adapter owning its own token cache.
	pub fn new(protocol: P, transport: Transport, tokens: TokenCache) -> Self {
		Self { protocol, transport, tokens }
	}

	/// Wire protocol.
	pub fn protocol(&self) -> &P {
		&self.protocol
	}

	/// Token cache dedicated to this adapter's credentials.
	pub fn tokens(&self) -> &TokenCache {
		&self.tokens
	}

	async fn rate(&self, request: &RateRequest) -> Result<RateResponse, CarrierError> {
		request.validate()?;

		let token = self.tokens.get_token().await?;
		let url = self.protocol.rate_url(request)?;
		let body = serde_json::to_value(self.protocol.to_wire(request)).map_err(|e| {
			CarrierError::unknown("Carrier request could not be serialized.").with_source(e)
		})?;
		let mut options = RequestOptions::default()
			.with_bearer(token.expose())
			.with_header("accept", "application/json");

		for (name, value) in self.protocol.rate_headers() {
			options = options.with_header(name, value);
		}

		let response = match self
			.transport
			.execute(HttpMethod::Post, &url, Some(RequestBody::Json(body)), &options)
			.await
		{
			Ok(response) => response,
			Err(e) => {
				if e.kind() == ErrorKind::AuthFailed {
					self.tokens.clear();
				}

				return Err(self.protocol.refine_error(e));
			},
		};
		let wire = response.json::<P::WireResponse>().map_err(|e| {
			CarrierError::api(format!("Carrier response has an unexpected shape at `{}`.", e.path()))
				.with_detail("status", response.status)
				.with_detail("body", response.body_preview())
				.with_source(e)
		})?;

		if let BusinessStatus::Failure { code, message } = self.protocol.business_status(&wire) {
			let mut err = CarrierError::new(ErrorKind::CarrierError, message);

			if let Some(code) = code {
				err = err.with_carrier_code(code);
			}

			return Err(err);
		}

		self.protocol.to_domain(wire)
	}
}
impl<P> CarrierAdapter for RatingAdapter<P>
where
	P: RateProtocol,
{
	fn name(&self) -> &str {
		self.protocol.carrier()
	}

	fn get_rates<'a>(&'a self, request: &'a RateRequest) -> CarrierFuture<'a, RateResponse> {
		Box::pin(async move {
			const KIND: CallKind = CallKind::Rates;

			let carrier = self.protocol.carrier();
			let span = CallSpan::new(KIND, carrier);

			obs::record_call_outcome(KIND, CallOutcome::Attempt);

			let result = span
				.instrument(AssertUnwindSafe(self.rate(request)).catch_unwind())
				.await
				.unwrap_or_else(|panic| Err(panic_error(panic.as_ref())))
				.map_err(|e| e.with_carrier(carrier));

			obs::record_call_outcome(KIND, CallOutcome::of(&result));

			result
		})
	}

	fn health_check(&self) -> HealthFuture<'_> {
		Box::pin(async move {
			const KIND: CallKind = CallKind::Health;

			let span = CallSpan::new(KIND, self.protocol.carrier());

			obs::record_call_outcome(KIND, CallOutcome::Attempt);

			let healthy = span
				.instrument(AssertUnwindSafe(self.tokens.get_token()).catch_unwind())
				.await
				.is_ok_and(|token| token.is_ok());
			let outcome = if healthy { CallOutcome::Success } else { CallOutcome::Failure };

			obs::record_call_outcome(KIND, outcome);

			healthy
		})
	}
}
impl<P> Debug for RatingAdapter<P>
where
	P: RateProtocol,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RatingAdapter")
			.field("carrier", &self.protocol.carrier())
			.field("transport", &self.transport)
			.field("tokens", &self.tokens)
			.finish()
	}
}

/// Converts a caught panic payload into an `UNKNOWN_ERROR`.
pub(crate) fn panic_error(payload: &(dyn std::any::Any + Send)) -> CarrierError {
	let detail = payload
		.downcast_ref::<&str>()
		.map(|s| (*s).to_owned())
		.or_else(|| payload.downcast_ref::<String>().cloned())
		.unwrap_or_else(|| "non-string panic payload".into());

	CarrierError::unknown("Carrier call panicked.").with_detail("panic", detail)
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::{
		_preludet::*,
		auth::ClientCredentials,
		http::{HttpRequest, HttpResponse, HttpSender, SendFuture},
		transport::RetryPolicy,
	};

	/// Toy protocol: `{"status":"ok","prices":[..]}`.
	struct EchoProtocol {
		panic_on_map: bool,
	}
	#[derive(Serialize)]
	struct EchoRequest {
		packages: usize,
	}
	#[derive(Deserialize)]
	struct EchoResponse {
		status: String,
		prices: Vec<Decimal>,
	}
	impl RateProtocol for EchoProtocol {
		type WireRequest = EchoRequest;
		type WireResponse = EchoResponse;

		fn carrier(&self) -> &str {
			"echo"
		}

		fn rate_url(&self, _request: &RateRequest) -> Result<Url, CarrierError> {
			Url::parse("https://echo.test/rate").map_err(|e| CarrierError::unknown("bad url").with_source(e))
		}

		fn to_wire(&self, request: &RateRequest) -> Self::WireRequest {
			EchoRequest { packages: request.packages.len() }
		}

		fn business_status(&self, response: &Self::WireResponse) -> BusinessStatus {
			if response.status == "ok" {
				BusinessStatus::Success
			} else {
				BusinessStatus::Failure { code: Some("E1".into()), message: response.status.clone() }
			}
		}

		fn to_domain(&self, response: Self::WireResponse) -> Result<RateResponse, CarrierError> {
			if self.panic_on_map {
				panic!("mapping exploded");
			}

			let quotes = response
				.prices
				.into_iter()
				.map(|price| crate::model::RateQuote {
					carrier: "echo".into(),
					service_code: "STD".into(),
					service_name: "Standard".into(),
					total_charge: crate::model::Money::new(price, "usd"),
					breakdown: None,
					transit_days: None,
					guaranteed_delivery: false,
					delivery_date: None,
					metadata: BTreeMap::new(),
				})
				.collect();

			Ok(RateResponse::new(quotes, None))
		}
	}

	struct Endpoints {
		rate_status: u16,
		rate_body: &'static str,
		token_body: &'static str,
		token_calls: AtomicUsize,
		rate_calls: AtomicUsize,
	}
	impl Endpoints {
		fn new(rate_status: u16, rate_body: &'static str) -> Arc<Self> {
			Arc::new(Self {
				rate_status,
				rate_body,
				token_body: r#"{"access_token":"abc","expires_in":3600}"#,
				token_calls: AtomicUsize::new(0),
				rate_calls: AtomicUsize::new(0),
			})
		}
	}
	impl HttpSender for Endpoints {
		fn send(&self, request: HttpRequest) -> SendFuture<'_> {
			let response = if request.url.path() == "/token" {
				self.token_calls.fetch_add(1, Ordering::SeqCst);

				HttpResponse::new(200, self.token_body)
			} else {
				self.rate_calls.fetch_add(1, Ordering::SeqCst);

				assert_eq!(request.headers["authorization"], "Bearer abc");

				HttpResponse::new(self.rate_status, self.rate_body)
			};

			Box::pin(async move { Ok(response) })
		}
	}

	fn adapter(endpoints: Arc<Endpoints>, panic_on_map: bool) -> RatingAdapter<EchoProtocol> {
		let transport = Transport::new(endpoints, RetryPolicy::none());
		let token_url = Url::parse("https://echo.test/token").expect("Fixture URL should parse.");
		let tokens = TokenCache::new(
			"echo",
			transport.clone(),
			token_url,
			ClientCredentials::new("id", "secret"),
		);

		RatingAdapter::new(EchoProtocol { panic_on_map }, transport, tokens)
	}

	#[tokio::test]
	async fn happy_path_maps_quotes_in_order() {
		let endpoints = Endpoints::new(200, r#"{"status":"ok","prices":["12.50","9.99"]}"#);
		let adapter = adapter(endpoints.clone(), false);
		let response = adapter.get_rates(&sample_rate_request()).await.expect("Rates should map.");
		let totals = response.quotes.iter().map(|q| q.total_charge.to_string()).collect::<Vec<_>>();

		assert_eq!(totals, ["12.50 USD", "9.99 USD"]);
		assert_eq!(endpoints.token_calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn invalid_requests_never_touch_the_network() {
		let endpoints = Endpoints::new(200, "{}");
		let adapter = adapter(endpoints.clone(), false);
		let mut request = sample_rate_request();

		request.packages.clear();

		let err = adapter.get_rates(&request).await.expect_err("Zero packages must fail.");

		assert_eq!(err.kind(), ErrorKind::ValidationError);
		assert_eq!(err.carrier(), Some("echo"));
		assert_eq!(endpoints.token_calls.load(Ordering::SeqCst), 0);
		assert_eq!(endpoints.rate_calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn shape_mismatch_is_an_api_error() {
		let adapter = adapter(Endpoints::new(200, r#"{"status":"ok","prices":"none"}"#), false);
		let err = adapter.get_rates(&sample_rate_request()).await.expect_err("Shape must fail.");

		assert_eq!(err.kind(), ErrorKind::ApiError);
		assert!(err.message().contains("prices"));
	}

	#[tokio::test]
	async fn business_rejection_is_a_carrier_error() {
		let adapter = adapter(Endpoints::new(200, r#"{"status":"rejected","prices":[]}"#), false);
		let err = adapter.get_rates(&sample_rate_request()).await.expect_err("Rejection must fail.");

		assert_eq!(err.kind(), ErrorKind::CarrierError);
		assert_eq!(err.message(), "rejected");
		assert_eq!(err.carrier_code(), Some("E1"));
	}

	#[tokio::test]
	async fn unauthorized_rating_clears_the_token_cache() {
		let endpoints = Endpoints::new(401, "{}");
		let adapter = adapter(endpoints.clone(), false);
		let err = adapter.get_rates(&sample_rate_request()).await.expect_err("401 must fail.");

		assert_eq!(err.kind(), ErrorKind::AuthFailed);
		assert!(adapter.tokens().cached().is_none());

		let _ = adapter.get_rates(&sample_rate_request()).await;

		assert_eq!(endpoints.token_calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn panics_become_unknown_errors() {
		let adapter = adapter(Endpoints::new(200, r#"{"status":"ok","prices":[]}"#), true);
		let err = adapter.get_rates(&sample_rate_request()).await.expect_err("Panic must surface.");

		assert_eq!(err.kind(), ErrorKind::UnknownError);
		assert_eq!(err.details()["panic"], "mapping exploded");
	}

	#[tokio::test]
	async fn health_reflects_token_acquisition() {
		let healthy = adapter(Endpoints::new(200, "{}"), false);

		assert!(healthy.health_check().await);
	}

	#[tokio::test]
	async fn unrepresentable_token_lifetime_is_unhealthy_not_a_panic() {
		let endpoints = Arc::new(Endpoints {
			token_body: r#"{"access_token":"abc","token_type":"Bearer","expires_in":100000000000000}"#,
			..Arc::into_inner(Endpoints::new(200, "{}")).expect("Fresh endpoints are unshared.")
		});
		let adapter = adapter(endpoints, false);

		assert!(!adapter.health_check().await);

		let err = adapter.get_rates(&sample_rate_request()).await.expect_err("Token must fail.");

		assert_eq!(err.kind(), ErrorKind::ApiError);
	}
}
