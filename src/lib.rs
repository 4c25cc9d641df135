//! Normalized shipping rates across carriers: resilient transport, cached OAuth tokens,
//! pluggable carrier adapters, and concurrent rate shopping in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod carrier;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod obs;
pub mod registry;
pub mod service;
pub mod shop;
pub mod transport;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	pub use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use crate::{
		carrier::{CarrierAdapter, CarrierFuture, HealthFuture},
		http::{HttpSender, ReqwestHttpClient},
		model::{Address, Money, Package, RateQuote, RateRequest, RateResponse, Weight, WeightUnit},
		transport::{RetryPolicy, Transport},
	};

	/// Scripted behavior of a [`StubAdapter`].
	#[derive(Clone, Debug)]
	pub enum StubOutcome {
		/// Return one USD quote per amount, in order.
		Quotes(Vec<Decimal>),
		/// Fail with a classified error of this kind.
		Fail(ErrorKind),
		/// Panic inside the rating future.
		Panic,
	}

	/// In-memory [`CarrierAdapter`] for registry, shopper, and service tests.
	#[derive(Debug)]
	pub struct StubAdapter {
		name: String,
		outcome: StubOutcome,
		delay: StdDuration,
		healthy: bool,
		calls: AtomicUsize,
		completions: Arc<AtomicUsize>,
	}
	impl StubAdapter {
		/// Adapter that quotes the given decimal amounts.
		pub fn quoting<'a>(name: &str, totals: impl IntoIterator<Item = &'a str>) -> Self {
			let totals = totals
				.into_iter()
				.map(|raw| raw.parse::<Decimal>().expect("Stub totals must be decimal strings."))
				.collect();

			Self::new(name, StubOutcome::Quotes(totals))
		}

		/// Adapter that always fails with `kind`.
		pub fn failing(name: &str, kind: ErrorKind) -> Self {
			Self::new(name, StubOutcome::Fail(kind)).with_health(false)
		}

		/// Adapter whose rating future panics.
		pub fn panicking(name: &str) -> Self {
			Self::new(name, StubOutcome::Panic)
		}

		fn new(name: &str, outcome: StubOutcome) -> Self {
			Self {
				name: name.to_owned(),
				outcome,
				delay: StdDuration::ZERO,
				healthy: true,
				calls: AtomicUsize::new(0),
				completions: Arc::default(),
			}
		}

		/// Sleeps for `delay` before answering.
		pub fn with_delay(mut self, delay: StdDuration) -> Self {
			self.delay = delay;

			self
		}

		/// Overrides the health probe answer.
		pub fn with_health(mut self, healthy: bool) -> Self {
			self.healthy = healthy;

			self
		}

		/// Number of rating calls received.
		pub fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}

		/// Shared counter of rating calls that ran past their delay.
		pub fn completions(&self) -> Arc<AtomicUsize> {
			self.completions.clone()
		}
	}
	impl CarrierAdapter for StubAdapter {
		fn name(&self) -> &str {
			&self.name
		}

		fn get_rates<'a>(&'a self, _request: &'a RateRequest) -> CarrierFuture<'a, RateResponse> {
			Box::pin(async move {
				self.calls.fetch_add(1, Ordering::SeqCst);

				if !self.delay.is_zero() {
					tokio::time::sleep(self.delay).await;
				}

				self.completions.fetch_add(1, Ordering::SeqCst);

				match &self.outcome {
					StubOutcome::Quotes(totals) => {
						let quotes = totals
							.iter()
							.enumerate()
							.map(|(idx, total)| RateQuote {
								carrier: self.name.clone(),
								service_code: format!("S{idx}"),
								service_name: format!("Stub service {idx}"),
								total_charge: Money::new(*total, "USD"),
								breakdown: None,
								transit_days: None,
								guaranteed_delivery: false,
								delivery_date: None,
								metadata: BTreeMap::new(),
							})
							.collect();

						Ok(RateResponse::new(quotes, None))
					},
					StubOutcome::Fail(kind) => Err(CarrierError::new(*kind, "stubbed failure")
						.with_carrier(self.name.as_str())),
					StubOutcome::Panic => panic!("stub adapter `{}` panicked", self.name),
				}
			})
		}

		fn health_check(&self) -> HealthFuture<'_> {
			let healthy = self.healthy;

			Box::pin(async move { healthy })
		}
	}

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		insecure_client(ReqwestClient::builder())
	}

	/// Same as [`test_reqwest_http_client`] with a per-request timeout.
	pub fn test_reqwest_http_client_with_timeout(timeout: StdDuration) -> ReqwestHttpClient {
		insecure_client(ReqwestClient::builder().timeout(timeout))
	}

	fn insecure_client(builder: reqwest::ClientBuilder) -> ReqwestHttpClient {
		let client = builder
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Retry policy with millisecond delays so retry tests stay fast.
	pub fn fast_retry_policy(max_retries: u32) -> RetryPolicy {
		RetryPolicy::new(max_retries)
			.with_base_delay(StdDuration::from_millis(1))
			.with_max_delay(StdDuration::from_millis(4))
			.with_jitter_max(StdDuration::from_millis(1))
	}

	/// Transport over the test reqwest client with a fast retry policy.
	pub fn build_test_transport(max_retries: u32) -> Transport {
		let sender: Arc<dyn HttpSender> = Arc::new(test_reqwest_http_client());

		Transport::new(sender, fast_retry_policy(max_retries))
	}

	/// Minimal valid domestic rate request used across integration tests.
	pub fn sample_rate_request() -> RateRequest {
		let origin = Address::new(["100 Main St"], "Atlanta", "30301", "US").with_state("GA");
		let destination =
			Address::new(["1 Market St"], "San Francisco", "94105", "US").with_state("CA");

		RateRequest::new(origin, destination, [Package::new(Weight::new(
			Decimal::new(55, 1),
			WeightUnit::Lbs,
		))])
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, BTreeSet, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use rust_decimal::Decimal;
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{CarrierError, Error, ErrorKind, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use rust_decimal;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
