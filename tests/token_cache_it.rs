#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use carrier_rates::{
	_preludet::*,
	auth::{ClientCredentials, TokenCache},
};

const CLIENT_ID: &str = "rates-client";
const CLIENT_SECRET: &str = "rates-secret";
// base64("rates-client:rates-secret")
const BASIC: &str = "Basic cmF0ZXMtY2xpZW50OnJhdGVzLXNlY3JldA==";

fn build_cache(server: &MockServer, max_retries: u32) -> TokenCache {
	TokenCache::new(
		"ups",
		build_test_transport(max_retries),
		Url::parse(&server.url("/oauth/token")).expect("Token URL should parse."),
		ClientCredentials::new(CLIENT_ID, CLIENT_SECRET),
	)
	.with_header("x-merchant-id", "A1B2C3")
}

#[tokio::test]
async fn token_is_fetched_once_and_reused() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.header("authorization", BASIC)
				.header("x-merchant-id", "A1B2C3")
				.header("content-type", "application/x-www-form-urlencoded")
				.body("grant_type=client_credentials");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"cached-token\",\"token_type\":\"Bearer\",\"expires_in\":\"14399\"}",
			);
		})
		.await;
	let cache = build_cache(&server, 0);
	let first = cache.get_token().await.expect("First acquisition should succeed.");
	let second = cache.get_token().await.expect("Cached token should be returned.");

	assert_eq!(first.expose(), "cached-token");
	assert_eq!(second.expose(), "cached-token");
	assert!(cache.cached().is_some());

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn short_lived_tokens_are_refetched_every_call() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"short\",\"token_type\":\"bearer\",\"expires_in\":120}");
		})
		.await;
	let cache = build_cache(&server, 0);

	cache.get_token().await.expect("First acquisition should succeed.");
	cache.get_token().await.expect("Second acquisition should succeed.");

	// 120s of lifetime never clears the 300s buffer.
	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn clear_forces_a_new_exchange() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"again\",\"token_type\":\"bearer\",\"expires_in\":3600}");
		})
		.await;
	let cache = build_cache(&server, 0);

	cache.get_token().await.expect("First acquisition should succeed.");
	cache.clear();

	assert!(cache.cached().is_none());

	cache.get_token().await.expect("Acquisition after clear should succeed.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn rejected_credentials_surface_as_auth_failed() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"response\":{\"errors\":[{\"code\":\"250003\",\"message\":\"Invalid Authentication Information.\"}]}}");
		})
		.await;
	let cache = build_cache(&server, 2);
	let err = cache.get_token().await.expect_err("401 must fail.");

	assert_eq!(err.kind(), ErrorKind::AuthFailed);
	assert!(!err.is_retryable());
	assert_eq!(err.carrier(), Some("ups"));
	assert_eq!(err.http_status(), Some(401));
	assert!(cache.cached().is_none());

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn unavailable_token_endpoint_is_retried_then_reported() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(503).body("try later");
		})
		.await;
	let cache = build_cache(&server, 2);
	let err = cache.get_token().await.expect_err("503 must fail.");

	assert_eq!(err.kind(), ErrorKind::AuthFailed);
	assert_eq!(err.details()["upstream_kind"], "SERVICE_UNAVAILABLE");

	mock.assert_calls_async(3).await;
}

#[tokio::test]
async fn concurrent_callers_share_one_exchange() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.delay(StdDuration::from_millis(100))
				.header("content-type", "application/json")
				.body("{\"access_token\":\"shared\",\"token_type\":\"bearer\",\"expires_in\":3600}");
		})
		.await;
	let cache = Arc::new(build_cache(&server, 0));
	let tasks = (0..4)
		.map(|_| {
			let cache = cache.clone();

			tokio::spawn(async move { cache.get_token().await })
		})
		.collect::<Vec<_>>();

	for task in tasks {
		let token = task.await.expect("Task should join.").expect("Token should resolve.");

		assert_eq!(token.expose(), "shared");
	}

	mock.assert_calls_async(1).await;
}
