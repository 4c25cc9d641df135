//! Concurrent multi-carrier rate shopping.
//!
//! Every carrier runs in its own Tokio task so a slow, failing, or panicking carrier
//! cannot delay or cancel the others. The shopper waits for every task to settle and
//! returns one entry per requested (case-insensitively deduplicated) carrier name.
//! With a deadline configured, carriers still running when it elapses are aborted and
//! reported as `TIMEOUT` entries.

// std
use std::panic::AssertUnwindSafe;
// crates.io
use futures::FutureExt;
use tokio::{
	task::JoinSet,
	time::{self, Instant},
};
// self
use crate::{
	_prelude::*,
	carrier::{self, CarrierAdapter},
	model::{RateRequest, RateResponse},
	obs::{self, CallKind, CallOutcome, CallSpan},
	registry::{self, CarrierRegistry},
};

/// Per-carrier outcomes keyed by lower-case carrier name.
pub type ShopResults = BTreeMap<String, Result<RateResponse>>;

/// Fans a single request out to several carriers.
#[derive(Clone, Debug)]
pub struct RateShopper {
	registry: Arc<CarrierRegistry>,
	deadline: Option<StdDuration>,
}
impl RateShopper {
	/// Creates a shopper without a deadline.
	pub fn new(registry: Arc<CarrierRegistry>) -> Self {
		Self { registry, deadline: None }
	}

	/// Bounds the whole shop operation; unfinished carriers become `TIMEOUT` entries.
	pub fn with_deadline(mut self, deadline: StdDuration) -> Self {
		self.deadline = Some(deadline);

		self
	}

	/// Configured deadline.
	pub fn deadline(&self) -> Option<StdDuration> {
		self.deadline
	}

	/// Queries every named carrier concurrently. Never fails as a whole.
	///
	/// Unknown names yield their registry error as the entry. Must be called from
	/// within a Tokio runtime. Dropping the returned future aborts every carrier call
	/// still in flight.
	pub async fn shop<I, S>(&self, names: I, request: &RateRequest) -> ShopResults
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		const KIND: CallKind = CallKind::Shop;

		let names = names.into_iter().map(|n| registry::normalize(n.as_ref())).collect::<BTreeSet<_>>();
		let span = CallSpan::new(KIND, &names.iter().cloned().collect::<Vec<_>>().join(","));

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let results = span.instrument(self.fan_out(names, request)).await;
		let outcome = if !results.is_empty() && results.values().all(|r| r.is_err()) {
			CallOutcome::Failure
		} else {
			CallOutcome::Success
		};

		obs::record_call_outcome(KIND, outcome);

		results
	}

	async fn fan_out(&self, names: BTreeSet<String>, request: &RateRequest) -> ShopResults {
		let request = Arc::new(request.clone());
		let deadline = self.deadline.map(|d| (Instant::now() + d, d));
		let mut results = ShopResults::new();
		let mut pending = BTreeSet::new();
		let mut tasks = JoinSet::new();

		for name in names {
			match self.registry.create(&name) {
				Ok(adapter) => {
					pending.insert(name.clone());
					tasks.spawn(rate_isolated(name, adapter, request.clone()));
				},
				Err(e) => {
					results.insert(name, Err(e));
				},
			}
		}

		let mut elapsed = false;

		loop {
			let next = match deadline {
				Some((at, _)) => match time::timeout_at(at, tasks.join_next()).await {
					Ok(next) => next,
					Err(_) => {
						elapsed = true;

						break;
					},
				},
				None => tasks.join_next().await,
			};
			let Some(joined) = next else { break };

			// Tasks catch their own panics, so a join error is only ever a cancellation;
			// its carrier stays pending and is reported below.
			if let Ok((name, outcome)) = joined {
				pending.remove(&name);
				results.insert(name, outcome);
			}
		}

		tasks.abort_all();

		for name in pending {
			let err = match deadline {
				Some((_, budget)) if elapsed => deadline_error(&name, budget),
				_ => CarrierError::unknown("Carrier task was cancelled before it finished.")
					.with_carrier(name.as_str()),
			};

			results.insert(name, Err(err.into()));
		}
		for (name, outcome) in &results {
			if let Err(e) = outcome {
				obs::trace_isolated_failure(name, e);
			}
		}

		results
	}
}

async fn rate_isolated(
	name: String,
	adapter: Arc<dyn CarrierAdapter>,
	request: Arc<RateRequest>,
) -> (String, Result<RateResponse>) {
	let outcome = match AssertUnwindSafe(async { adapter.get_rates(&request).await })
		.catch_unwind()
		.await
	{
		Ok(result) => result.map_err(Error::from),
		Err(panic) =>
			Err(carrier::panic_error(panic.as_ref()).with_carrier(name.as_str()).into()),
	};

	(name, outcome)
}

fn deadline_error(name: &str, budget: StdDuration) -> CarrierError {
	let ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX);

	CarrierError::new(
		ErrorKind::Timeout,
		format!("Carrier did not answer within the {ms} ms shop deadline."),
	)
	.with_detail("deadline_ms", ms)
	.with_carrier(name)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	fn registry(adapters: Vec<StubAdapter>) -> Arc<CarrierRegistry> {
		let mut registry = CarrierRegistry::new();

		for adapter in adapters {
			registry.register_adapter(Arc::new(adapter));
		}

		Arc::new(registry)
	}

	#[tokio::test]
	async fn failures_are_isolated_per_carrier() {
		let shopper = RateShopper::new(registry(vec![
			StubAdapter::failing("x", ErrorKind::ServiceUnavailable),
			StubAdapter::quoting("y", ["12.00"]),
		]));
		let results = shopper.shop(["x", "y"], &sample_rate_request()).await;

		let err = results["x"].as_ref().map(|_| ()).expect_err("Carrier x must fail.");

		assert_eq!(results.len(), 2);
		assert_eq!(err.kind(), Some(ErrorKind::ServiceUnavailable));
		assert_eq!(results["y"].as_ref().expect("Carrier y must quote.").quotes.len(), 1);
	}

	#[tokio::test]
	async fn duplicates_run_once_and_unknown_names_become_entries() {
		let ups = Arc::new(StubAdapter::quoting("ups", ["9.00"]));
		let mut registry = CarrierRegistry::new();

		registry.register_adapter(ups.clone());

		let shopper = RateShopper::new(Arc::new(registry));
		let results = shopper.shop(["UPS", "dhl", " ups "], &sample_rate_request()).await;

		assert_eq!(results.keys().map(String::as_str).collect::<Vec<_>>(), ["dhl", "ups"]);
		assert!(matches!(results["dhl"], Err(Error::Registry(_))));
		assert!(results["ups"].is_ok());
		assert_eq!(ups.calls(), 1);
	}

	#[tokio::test]
	async fn empty_name_list_yields_empty_map() {
		let shopper = RateShopper::new(registry(Vec::new()));

		assert!(shopper.shop(Vec::<String>::new(), &sample_rate_request()).await.is_empty());
	}

	#[tokio::test]
	async fn panics_are_captured_as_unknown_errors() {
		let shopper = RateShopper::new(registry(vec![
			StubAdapter::panicking("boom"),
			StubAdapter::quoting("calm", ["5.00"]),
		]));
		let results = shopper.shop(["boom", "calm"], &sample_rate_request()).await;
		let err = results["boom"].as_ref().map(|_| ()).expect_err("Panicking carrier must fail.");

		assert_eq!(err.kind(), Some(ErrorKind::UnknownError));
		assert!(results["calm"].is_ok());
	}

	#[tokio::test]
	async fn deadline_turns_slow_carriers_into_timeouts() {
		let shopper = RateShopper::new(registry(vec![
			StubAdapter::quoting("slow", ["5.00"]).with_delay(StdDuration::from_secs(30)),
			StubAdapter::quoting("fast", ["7.00"]),
		]))
		.with_deadline(StdDuration::from_millis(50));
		let started = std::time::Instant::now();
		let results = shopper.shop(["slow", "fast"], &sample_rate_request()).await;
		let err = results["slow"].as_ref().map(|_| ()).expect_err("Slow carrier must time out.");

		assert!(started.elapsed() < StdDuration::from_secs(5));
		assert_eq!(err.kind(), Some(ErrorKind::Timeout));
		assert!(err.as_carrier().is_some_and(CarrierError::is_retryable));
		assert!(results["fast"].is_ok());
	}

	#[tokio::test]
	async fn carriers_run_concurrently() {
		let delay = StdDuration::from_millis(200);
		let shopper = RateShopper::new(registry(vec![
			StubAdapter::quoting("a", ["1.00"]).with_delay(delay),
			StubAdapter::quoting("b", ["2.00"]).with_delay(delay),
			StubAdapter::quoting("c", ["3.00"]).with_delay(delay),
		]));
		let started = std::time::Instant::now();
		let results = shopper.shop(["a", "b", "c"], &sample_rate_request()).await;

		assert!(results.values().all(Result::is_ok));
		assert!(started.elapsed() < delay * 3);
	}

	#[tokio::test]
	async fn dropping_the_shop_future_aborts_carrier_calls() {
		let late = StubAdapter::quoting("late", ["4.00"]).with_delay(StdDuration::from_millis(200));
		let completions = late.completions();
		let shopper = RateShopper::new(registry(vec![late]));
		let request = sample_rate_request();
		let dropped =
			tokio::time::timeout(StdDuration::from_millis(20), shopper.shop(["late"], &request)).await;

		assert!(dropped.is_err());

		tokio::time::sleep(StdDuration::from_millis(400)).await;

		assert_eq!(completions.load(Ordering::SeqCst), 0);
	}
}
