//! Resilient request execution: classification into the error taxonomy plus
//! exponential backoff with jitter for retryable failures.
//!
//! Classification priority is fixed: timeouts, then missing responses, then HTTP
//! status (429, 401, 403, 5xx, remaining 4xx), then everything else. Retries reissue
//! the same logical request, so callers must only pass idempotent operations.

// crates.io
use rand::Rng;
// self
use crate::{
	_prelude::*,
	http::{FaultKind, HttpMethod, HttpRequest, HttpResponse, HttpSender, RequestBody, TransportFault},
	obs,
};

/// Backoff schedule: `min(base * 2^n, max) + uniform(0, jitter)` before retry `n`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	max_retries: u32,
	base_delay: StdDuration,
	max_delay: StdDuration,
	jitter_max: StdDuration,
}
impl RetryPolicy {
	/// Default base delay (1 s).
	pub const DEFAULT_BASE_DELAY: StdDuration = StdDuration::from_millis(1_000);
	/// Default delay ceiling before jitter (10 s).
	pub const DEFAULT_MAX_DELAY: StdDuration = StdDuration::from_millis(10_000);
	/// Default jitter upper bound (1 s).
	pub const DEFAULT_JITTER_MAX: StdDuration = StdDuration::from_millis(1_000);

	/// Creates a policy with the default delays and the provided retry budget.
	pub fn new(max_retries: u32) -> Self {
		Self {
			max_retries,
			base_delay: Self::DEFAULT_BASE_DELAY,
			max_delay: Self::DEFAULT_MAX_DELAY,
			jitter_max: Self::DEFAULT_JITTER_MAX,
		}
	}

	/// Policy that never retries.
	pub fn none() -> Self {
		Self::new(0)
	}

	/// Overrides the base delay.
	pub fn with_base_delay(mut self, delay: StdDuration) -> Self {
		self.base_delay = delay;

		self
	}

	/// Overrides the delay ceiling applied before jitter.
	pub fn with_max_delay(mut self, delay: StdDuration) -> Self {
		self.max_delay = delay;

		self
	}

	/// Overrides the jitter upper bound.
	pub fn with_jitter_max(mut self, jitter: StdDuration) -> Self {
		self.jitter_max = jitter;

		self
	}

	/// Maximum number of retries after the first attempt.
	pub fn max_retries(&self) -> u32 {
		self.max_retries
	}

	/// Upper bound of any single delay (`max_delay + jitter_max`).
	pub fn delay_ceiling(&self) -> StdDuration {
		self.max_delay.saturating_add(self.jitter_max)
	}

	/// Deterministic part of the delay before retry `attempt` (0-indexed).
	pub fn base_delay_for(&self, attempt: u32) -> StdDuration {
		let factor = 1_u32.checked_shl(attempt).unwrap_or(u32::MAX);

		self.base_delay.checked_mul(factor).unwrap_or(self.max_delay).min(self.max_delay)
	}

	/// Full delay before retry `attempt`, including random jitter.
	pub fn delay_for(&self, attempt: u32) -> StdDuration {
		self.base_delay_for(attempt).saturating_add(self.jitter())
	}

	/// Returns true when `err` is retryable and retry number `attempt` fits the budget.
	pub fn should_retry(&self, err: &CarrierError, attempt: u32) -> bool {
		err.is_retryable() && attempt < self.max_retries
	}

	fn jitter(&self) -> StdDuration {
		let max = u64::try_from(self.jitter_max.as_micros()).unwrap_or(u64::MAX);

		if max == 0 {
			return StdDuration::ZERO;
		}

		StdDuration::from_micros(rand::rng().random_range(0..=max))
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(3)
	}
}

/// Per-call overrides for [`Transport::execute`].
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
	/// Extra headers (names are lower-cased when applied).
	pub headers: BTreeMap<String, String>,
	/// Per-request timeout.
	pub timeout: Option<StdDuration>,
	/// Retry budget override.
	pub max_retries: Option<u32>,
}
impl RequestOptions {
	/// Adds a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Adds a bearer `Authorization` header.
	pub fn with_bearer(self, token: &str) -> Self {
		self.with_header("authorization", format!("Bearer {token}"))
	}

	/// Sets a per-request timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Overrides the retry budget.
	pub fn with_max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = Some(max_retries);

		self
	}
}

/// Classifying, retrying HTTP executor shared by token caches and carrier adapters.
#[derive(Clone)]
pub struct Transport {
	sender: Arc<dyn HttpSender>,
	retry: RetryPolicy,
}
impl Transport {
	/// Creates a transport over the provided sender.
	pub fn new(sender: Arc<dyn HttpSender>, retry: RetryPolicy) -> Self {
		Self { sender, retry }
	}

	/// Active retry policy.
	pub fn retry_policy(&self) -> &RetryPolicy {
		&self.retry
	}

	/// Issues the request, succeeding only with a 2xx response.
	pub async fn execute(
		&self,
		method: HttpMethod,
		url: &Url,
		body: Option<RequestBody>,
		options: &RequestOptions,
	) -> Result<HttpResponse, CarrierError> {
		let mut request = HttpRequest::new(method, url.clone());

		for (name, value) in &options.headers {
			request = request.with_header(name, value.clone());
		}
		if let Some(body) = body {
			request = request.with_body(body);
		}
		if let Some(timeout) = options.timeout {
			request = request.with_timeout(timeout);
		}

		self.send(request, options.max_retries).await
	}

	/// Issues a prepared request with the retry loop.
	pub async fn send(
		&self,
		request: HttpRequest,
		max_retries: Option<u32>,
	) -> Result<HttpResponse, CarrierError> {
		let policy = match max_retries {
			Some(max) => RetryPolicy { max_retries: max, ..self.retry.clone() },
			None => self.retry.clone(),
		};
		let mut attempt = 0;

		loop {
			let err = match self.attempt(request.clone()).await {
				Ok(response) => return Ok(response),
				Err(err) => err,
			};

			if !policy.should_retry(&err, attempt) {
				return Err(err.with_detail("attempts", attempt + 1));
			}

			let delay = policy.delay_for(attempt);

			obs::record_retry(err.kind(), attempt, delay);
			tokio::time::sleep(delay).await;

			attempt += 1;
		}
	}

	async fn attempt(&self, request: HttpRequest) -> Result<HttpResponse, CarrierError> {
		let method = request.method;
		let path = request.url.path().to_owned();
		let response = self.sender.send(request).await.map_err(classify_fault)?;

		if response.is_success() {
			Ok(response)
		} else {
			Err(classify_response(method, &path, &response))
		}
	}
}
impl Debug for Transport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Transport").field("retry", &self.retry).finish()
	}
}

/// Maps a sender fault into the taxonomy (`TIMEOUT`, `NETWORK_ERROR`, `UNKNOWN_ERROR`).
pub fn classify_fault(fault: TransportFault) -> CarrierError {
	let (kind, message) = match fault.kind {
		FaultKind::Timeout => (ErrorKind::Timeout, "Request timed out before a response arrived."),
		FaultKind::NoResponse =>
			(ErrorKind::NetworkError, "No response was received from the carrier."),
		FaultKind::Other => (ErrorKind::UnknownError, "HTTP client failed to complete the request."),
	};

	CarrierError::new(kind, message).with_source(fault)
}

/// Maps a non-2xx response into the taxonomy, capturing status, body preview, and
/// `Retry-After`.
pub fn classify_response(method: HttpMethod, path: &str, response: &HttpResponse) -> CarrierError {
	let status = response.status;
	let kind = ErrorKind::from_status(status);
	let mut err = CarrierError::new(kind, format!("{method} {path} returned HTTP {status}."))
		.with_detail("status", status)
		.with_detail("body", response.body_preview());

	if let Some(retry_after) = response.retry_after() {
		err = err.with_detail("retry_after_secs", retry_after.whole_seconds());
	}

	err
}
