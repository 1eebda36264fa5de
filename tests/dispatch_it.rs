mod common;

// self
use common::*;
use mendeley_client::{codec, procedure::RequestDescriptor};

fn profile_request(client: &Client) -> RequestDescriptor {
	RequestDescriptor::get(client.api_url("profiles/me").expect("Path should resolve."))
}

#[tokio::test]
async fn calls_require_a_signed_in_user() {
	let transport = MockTransport::default();
	let client = client(&transport, &MemoryStore::default());
	let err = client
		.call(profile_request(&client), codec::json::<serde_json::Value>)
		.await
		.expect_err("Signed-out calls should fail.");

	assert!(matches!(err, Error::NotSignedIn));
	assert_eq!(err.kind(), ErrorKind::CallerMisuse);
	assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn fresh_tokens_skip_the_token_endpoint() {
	let transport = MockTransport::default();
	let store = MemoryStore::with_record(record("access-1", Some("refresh-1"), Duration::hours(1)));
	let client = client(&transport, &store);

	transport.on(Method::GET, "/profiles/me", Reply::json(200, json!({ "id": "p1" })));

	client
		.call(profile_request(&client), codec::json::<serde_json::Value>)
		.await
		.expect("Call should succeed.");

	assert_eq!(transport.calls(Method::POST, TOKEN_PATH), 0);
	assert_eq!(
		transport.last(Method::GET, "/profiles/me").header("authorization"),
		Some("Bearer access-1")
	);
}

#[tokio::test]
async fn expiring_tokens_are_refreshed_before_the_call() {
	let transport = MockTransport::default();
	let store = MemoryStore::with_record(record("old", Some("refresh-1"), Duration::seconds(60)));
	let client = client(&transport, &store);

	transport
		.on(Method::POST, TOKEN_PATH, Reply::token("new", Some("refresh-2"), 3600))
		.on(Method::GET, "/profiles/me", Reply::json(200, json!({ "id": "p1" })));

	client
		.call(profile_request(&client), codec::json::<serde_json::Value>)
		.await
		.expect("Call should succeed after the refresh.");

	let order: Vec<_> =
		transport.requests().iter().map(|request| request.url.path().to_owned()).collect();

	assert_eq!(order, vec![TOKEN_PATH.to_owned(), "/profiles/me".to_owned()]);
	assert_eq!(
		transport.last(Method::GET, "/profiles/me").header("authorization"),
		Some("Bearer new")
	);
	assert_eq!(store.snapshot().and_then(|record| record.refresh_token).as_deref(), Some("refresh-2"));
}

#[tokio::test]
async fn failed_proactive_refresh_still_runs_the_call() {
	let transport = MockTransport::default();
	let store = MemoryStore::with_record(record("old", Some("refresh-1"), Duration::seconds(60)));
	let client = client(&transport, &store);

	transport
		.on(Method::POST, TOKEN_PATH, Reply::Fail(io::ErrorKind::ConnectionReset))
		.on(Method::GET, "/profiles/me", Reply::json(200, json!({ "id": "p1" })));

	client
		.call(profile_request(&client), codec::json::<serde_json::Value>)
		.await
		.expect("Call should run with the stored token.");

	assert_eq!(
		transport.last(Method::GET, "/profiles/me").header("authorization"),
		Some("Bearer old")
	);
	assert_eq!(client.authority().metrics().failures(), 1);
}

#[tokio::test]
async fn expired_token_answer_refreshes_and_retries_once() {
	let transport = MockTransport::default();
	let store = MemoryStore::with_record(record("old", Some("refresh-1"), Duration::hours(1)));
	let client = client(&transport, &store);

	transport
		.on(Method::GET, "/profiles/me", Reply::token_expired())
		.on(Method::POST, TOKEN_PATH, Reply::token("new", Some("refresh-2"), 3600))
		.on(Method::GET, "/profiles/me", Reply::json(200, json!({ "id": "p1" })));

	let response = client
		.call(profile_request(&client), codec::json::<serde_json::Value>)
		.await
		.expect("Retried call should succeed.");

	assert_eq!(response.payload["id"], "p1");
	assert_eq!(transport.calls(Method::GET, "/profiles/me"), 2);
	assert_eq!(transport.calls(Method::POST, TOKEN_PATH), 1);
	assert_eq!(
		transport.last(Method::GET, "/profiles/me").header("authorization"),
		Some("Bearer new")
	);
}

#[tokio::test]
async fn second_expired_answer_is_surfaced() {
	let transport = MockTransport::default();
	let store = MemoryStore::with_record(record("old", Some("refresh-1"), Duration::hours(1)));
	let client = client(&transport, &store);

	transport
		.on(Method::GET, "/profiles/me", Reply::token_expired())
		.on(Method::POST, TOKEN_PATH, Reply::token("new", Some("refresh-2"), 3600))
		.on(Method::GET, "/profiles/me", Reply::token_expired());

	let err = client
		.call(profile_request(&client), codec::json::<serde_json::Value>)
		.await
		.expect_err("A second expiry answer should not loop.");

	assert!(err.is_token_expired());
	assert_eq!(transport.calls(Method::GET, "/profiles/me"), 2);
	assert_eq!(transport.calls(Method::POST, TOKEN_PATH), 1);
}

#[tokio::test]
async fn other_unauthorized_answers_do_not_refresh() {
	let transport = MockTransport::default();
	let store = MemoryStore::with_record(record("old", Some("refresh-1"), Duration::hours(1)));
	let client = client(&transport, &store);

	transport.on(Method::GET, "/profiles/me", Reply::json(401, json!({ "message": "Bad token" })));

	let err = client
		.call(profile_request(&client), codec::json::<serde_json::Value>)
		.await
		.expect_err("Unauthorized answers should surface.");

	assert!(matches!(&err, Error::Http(http) if http.status == 401));
	assert_eq!(transport.calls(Method::POST, TOKEN_PATH), 0);
}

#[tokio::test]
async fn concurrent_calls_share_one_refresh() {
	let transport = MockTransport::default();
	let store = MemoryStore::with_record(record("old", Some("refresh-1"), Duration::seconds(30)));
	let client = client(&transport, &store);
	let gate = Arc::new(Notify::new());

	transport.on(
		Method::POST,
		TOKEN_PATH,
		Reply::token("new", Some("refresh-2"), 3600).gated(&gate),
	);

	for _ in 0..3 {
		transport.on(Method::GET, "/profiles/me", Reply::json(200, json!({ "id": "p1" })));
	}

	let handles: Vec<_> = (0..3)
		.map(|_| client.call(profile_request(&client), codec::json::<serde_json::Value>))
		.collect();

	wait_until(|| transport.calls(Method::POST, TOKEN_PATH) == 1).await;
	gate.notify_one();

	for handle in handles {
		handle.await.expect("Every call should succeed.");
	}

	assert_eq!(transport.calls(Method::POST, TOKEN_PATH), 1);
	assert!(
		transport
			.requests()
			.iter()
			.filter(|request| request.url.path() == "/profiles/me")
			.all(|request| request.header("authorization") == Some("Bearer new"))
	);
	assert_eq!(client.authority().metrics().exchanges(), 1);
	assert_eq!(client.authority().metrics().coalesced(), 2);
}

#[tokio::test]
async fn cancelling_during_refresh_skips_the_call_but_keeps_new_tokens() {
	let transport = MockTransport::default();
	let store = MemoryStore::with_record(record("old", Some("refresh-1"), Duration::seconds(30)));
	let client = client(&transport, &store);
	let gate = Arc::new(Notify::new());

	transport
		.on(Method::POST, TOKEN_PATH, Reply::token("new", Some("refresh-2"), 3600).gated(&gate))
		.on(Method::GET, "/profiles/me", Reply::json(200, json!({ "id": "p1" })));

	let handle = client.call(profile_request(&client), codec::json::<serde_json::Value>);

	wait_until(|| transport.calls(Method::POST, TOKEN_PATH) == 1).await;
	handle.cancel();

	let err = handle.await.expect_err("Cancelled call should not succeed.");

	assert!(err.is_cancelled());
	assert_eq!(err.kind(), ErrorKind::UserCancelled);

	gate.notify_one();
	wait_until(|| store.snapshot().and_then(|record| record.access_token).as_deref() == Some("new"))
		.await;
	tokio::task::yield_now().await;

	assert_eq!(transport.calls(Method::GET, "/profiles/me"), 0);
}

#[tokio::test]
async fn cancelling_an_in_flight_request_reports_cancellation() {
	let transport = MockTransport::default();
	let store = MemoryStore::with_record(record("access", Some("refresh"), Duration::hours(1)));
	let client = client(&transport, &store);
	let gate = Arc::new(Notify::new());

	transport.on(Method::GET, "/profiles/me", Reply::json(200, json!({ "id": "p1" })).gated(&gate));

	let handle = client.call(profile_request(&client), codec::json::<serde_json::Value>);

	wait_until(|| transport.calls(Method::GET, "/profiles/me") == 1).await;
	handle.cancel();

	assert!(matches!(handle.await, Err(Error::Cancelled)));
}

#[tokio::test]
async fn on_complete_delivers_results_to_a_callback() {
	let transport = MockTransport::default();
	let store = MemoryStore::with_record(record("access", Some("refresh"), Duration::hours(1)));
	let client = client(&transport, &store);
	let (tx, rx) = tokio::sync::oneshot::channel();

	transport.on(Method::GET, "/profiles/me", Reply::json(200, json!({ "id": "p1" })));
	client.call(profile_request(&client), codec::json::<serde_json::Value>).on_complete(
		move |result| {
			let _ = tx.send(result.map(|response| response.payload));
		},
	);

	let payload = rx.await.expect("Callback should fire.").expect("Call should succeed.");

	assert_eq!(payload["id"], "p1");
}

#[tokio::test]
async fn token_grants_and_api_calls_use_their_own_transports() {
	let api = MockTransport::default();
	let token = MockTransport::default();
	let store = MemoryStore::with_record(record("old", Some("refresh-1"), Duration::seconds(60)));
	let client = Client::with_transports(
		config(),
		Arc::new(store.clone()),
		Arc::new(api.clone()),
		Arc::new(token.clone()),
	)
	.expect("Client with split transports should build.");

	token.on(Method::POST, TOKEN_PATH, Reply::token("new", Some("refresh-2"), 3600));
	api.on(Method::GET, "/profiles/me", Reply::json(200, json!({ "id": "p1" })));

	client
		.call(profile_request(&client), codec::json::<serde_json::Value>)
		.await
		.expect("Call should succeed after the refresh.");

	assert_eq!(token.calls(Method::POST, TOKEN_PATH), 1);
	assert_eq!(api.calls(Method::POST, TOKEN_PATH), 0);
	assert_eq!(token.calls(Method::GET, "/profiles/me"), 0);
	assert_eq!(api.last(Method::GET, "/profiles/me").header("authorization"), Some("Bearer new"));
}
