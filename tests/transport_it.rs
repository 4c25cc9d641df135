#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use carrier_rates::{
	_preludet::*,
	http::{HttpMethod, HttpSender, RequestBody},
	transport::{RequestOptions, Transport},
};

fn url(server: &MockServer, path: &str) -> Url {
	Url::parse(&server.url(path)).expect("Mock URL should parse.")
}

#[tokio::test]
async fn server_errors_retry_until_the_budget_is_spent() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/rates");
			then.status(503).body("upstream maintenance");
		})
		.await;
	let transport = build_test_transport(2);
	let err = transport
		.execute(
			HttpMethod::Post,
			&url(&server, "/rates"),
			Some(RequestBody::Json(serde_json::json!({ "ping": true }))),
			&RequestOptions::default(),
		)
		.await
		.expect_err("Persistent 503 must fail.");

	assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
	assert!(err.is_retryable());
	assert_eq!(err.http_status(), Some(503));
	assert_eq!(err.details()["attempts"], 3);
	assert_eq!(err.details()["body"], "upstream maintenance");

	mock.assert_calls_async(3).await;
}

#[tokio::test]
async fn client_errors_are_not_retried() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/rates");
			then.status(400).header("content-type", "application/json").body("{\"error\":\"bad\"}");
		})
		.await;
	let err = build_test_transport(3)
		.execute(HttpMethod::Post, &url(&server, "/rates"), None, &RequestOptions::default())
		.await
		.expect_err("400 must fail.");

	assert_eq!(err.kind(), ErrorKind::ApiError);
	assert!(!err.is_retryable());
	assert_eq!(err.details()["attempts"], 1);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn rate_limits_capture_retry_after_and_honor_per_call_budget() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/limited");
			then.status(429).header("retry-after", "7").body("slow down");
		})
		.await;
	let err = build_test_transport(5)
		.execute(
			HttpMethod::Get,
			&url(&server, "/limited"),
			None,
			&RequestOptions::default().with_max_retries(1),
		)
		.await
		.expect_err("429 must fail.");

	assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
	assert_eq!(err.details()["retry_after_secs"], 7);

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn headers_and_json_bodies_reach_the_wire() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/echo")
				.header("authorization", "Bearer wire-token")
				.header("content-type", "application/json")
				.body_includes("\"weight\":\"5.5\"");
			then.status(200).header("content-type", "application/json").body("{\"ok\":true}");
		})
		.await;
	let response = build_test_transport(0)
		.execute(
			HttpMethod::Post,
			&url(&server, "/echo"),
			Some(RequestBody::Json(serde_json::json!({ "weight": "5.5" }))),
			&RequestOptions::default().with_bearer("wire-token"),
		)
		.await
		.expect("Matching request should succeed.");
	let body: JsonValue = response.json().expect("Response should decode.");

	assert_eq!(body["ok"], true);

	mock.assert_async().await;
}

#[tokio::test]
async fn slow_responses_time_out() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/slow");
			then.status(200).delay(StdDuration::from_millis(1_500)).body("late");
		})
		.await;
	let sender: Arc<dyn HttpSender> =
		Arc::new(test_reqwest_http_client_with_timeout(StdDuration::from_millis(100)));
	let err = Transport::new(sender, fast_retry_policy(0))
		.execute(HttpMethod::Get, &url(&server, "/slow"), None, &RequestOptions::default())
		.await
		.expect_err("Slow response must time out.");

	assert_eq!(err.kind(), ErrorKind::Timeout);
	assert!(err.is_retryable());
}

#[tokio::test]
async fn unreachable_hosts_are_network_errors() {
	let err = build_test_transport(0)
		.execute(
			HttpMethod::Get,
			&Url::parse("http://127.0.0.1:9/unreachable").expect("URL should parse."),
			None,
			&RequestOptions::default(),
		)
		.await
		.expect_err("Closed port must fail.");

	assert_eq!(err.kind(), ErrorKind::NetworkError);
	assert!(err.is_retryable());
}
