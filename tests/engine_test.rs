use apichain::chain::Chain;
use apichain::error::StepError;
use apichain::runtime::context::StepOutcome;
use apichain::runtime::engine::ChainRunner;
use apichain::runtime::transport::{HttpRequest, HttpResponse, Method, Transport};
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Scripted transport: pops one canned reply per request and records
/// everything that was sent.
struct MockTransport {
    replies: Mutex<VecDeque<(u16, String)>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    fn replying(replies: &[(u16, &str)]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|(s, b)| (*s, b.to_string())).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, StepError> {
        self.requests.lock().unwrap().push(request);
        let (status, body) = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((200, "{}".to_string()));
        Ok(HttpResponse { status, body })
    }
}

#[tokio::test]
async fn empty_chain_issues_no_requests() {
    let transport = MockTransport::replying(&[]);
    let runner = ChainRunner::new(transport.clone());

    let report = runner.execute(&Chain::default()).await;

    assert!(report.trace.is_empty());
    assert!(report.first_error.is_none());
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn successful_chain_collects_every_decoded_body() {
    let chain = Chain::builder()
        .get("users", "http://api.test/users")
        .build()
        .get("posts", "http://api.test/posts")
        .build()
        .build();

    let transport = MockTransport::replying(&[(200, r#"{"id": 7}"#), (200, r#"{"ok": true}"#)]);
    let runner = ChainRunner::new(transport.clone());

    let report = runner.execute(&chain).await;

    assert!(report.is_success());
    assert_eq!(
        report.trace,
        vec![
            StepOutcome::Success(json!({"id": 7})),
            StepOutcome::Success(json!({"ok": true})),
        ]
    );
    assert_eq!(transport.sent().len(), 2);
}

#[tokio::test]
async fn failing_step_short_circuits_the_rest() {
    let chain = Chain::builder()
        .get("first", "http://api.test/a")
        .build()
        .get("second", "http://api.test/b")
        .build()
        .get("third", "http://api.test/c")
        .build()
        .build();

    let transport = MockTransport::replying(&[(200, r#"{"id": 1}"#), (500, "boom")]);
    let runner = ChainRunner::new(transport.clone());

    let report = runner.execute(&chain).await;

    assert_eq!(report.trace.len(), 2);
    assert_eq!(
        report.trace[1],
        StepOutcome::Failure {
            error: "HTTP error! status: 500".to_string()
        }
    );
    assert_eq!(
        report.first_error.as_deref(),
        Some("error in step 'second': HTTP error! status: 500")
    );
    // The third step was never dispatched.
    assert_eq!(transport.sent().len(), 2);
}

#[tokio::test]
async fn get_injection_appends_the_query_parameter() {
    let chain = Chain::builder()
        .get("users", "http://api.test/users")
        .build()
        .get("orders", "http://api.test/orders")
        .inject("userId", "id")
        .build()
        .build();

    let transport = MockTransport::replying(&[(200, r#"{"id": 7}"#), (200, "{}")]);
    let runner = ChainRunner::new(transport.clone());

    let report = runner.execute(&chain).await;

    assert!(report.is_success());
    let sent = transport.sent();
    assert_eq!(sent[0].url, "http://api.test/users");
    assert_eq!(sent[1].url, "http://api.test/orders?userId=7");
    assert_eq!(sent[1].method, Method::Get);
}

#[tokio::test]
async fn post_injection_merges_into_the_configured_body() {
    let chain = Chain::builder()
        .get("users", "http://api.test/users")
        .build()
        .post("create post", "http://api.test/posts")
        .body_field("title", "t")
        .inject("userId", "id")
        .build()
        .build();

    let transport = MockTransport::replying(&[(200, r#"{"id": 7}"#), (201, r#"{"created": true}"#)]);
    let runner = ChainRunner::new(transport.clone());

    let report = runner.execute(&chain).await;

    assert!(report.is_success());
    let sent = transport.sent();
    assert_eq!(sent[1].body, Some(json!({"title": "t", "userId": 7})));
    assert_eq!(
        report.trace,
        vec![
            StepOutcome::Success(json!({"id": 7})),
            StepOutcome::Success(json!({"created": true})),
        ]
    );
}

#[tokio::test]
async fn missing_source_key_renders_an_empty_query_value() {
    let chain = Chain::builder()
        .get("users", "http://api.test/users")
        .build()
        .get("orders", "http://api.test/orders")
        .inject("userId", "id")
        .build()
        .build();

    let transport = MockTransport::replying(&[(200, r#"{"name": "ada"}"#), (200, "{}")]);
    let runner = ChainRunner::new(transport.clone());

    runner.execute(&chain).await;

    assert_eq!(transport.sent()[1].url, "http://api.test/orders?userId=");
}

#[tokio::test]
async fn first_step_with_binding_skips_injection() {
    let chain = Chain::builder()
        .get("users", "http://api.test/users")
        .inject("userId", "id")
        .build()
        .build();

    let transport = MockTransport::replying(&[(200, "{}")]);
    let runner = ChainRunner::new(transport.clone());

    runner.execute(&chain).await;

    // No carry value yet, so the url is used verbatim.
    assert_eq!(transport.sent()[0].url, "http://api.test/users");
}

#[tokio::test]
async fn undecodable_body_is_a_request_failure() {
    let chain = Chain::builder()
        .get("users", "http://api.test/users")
        .build()
        .build();

    let transport = MockTransport::replying(&[(200, "definitely not json")]);
    let runner = ChainRunner::new(transport.clone());

    let report = runner.execute(&chain).await;

    assert_eq!(report.trace.len(), 1);
    match &report.trace[0] {
        StepOutcome::Failure { error } => {
            assert!(error.contains("invalid JSON in response body"), "got: {error}")
        }
        other => panic!("expected a failure entry, got {other:?}"),
    }
    assert!(report.first_error.is_some());
}

#[tokio::test]
async fn broken_transformation_keeps_the_previous_result() {
    let chain = Chain::builder()
        .get("users", "http://api.test/users")
        .build()
        .get("orders", "http://api.test/orders")
        .transform("this is ((( not an expression")
        .inject("userId", "id")
        .build()
        .build();

    let transport = MockTransport::replying(&[(200, r#"{"id": 7}"#), (200, "{}")]);
    let runner = ChainRunner::new(transport.clone());

    let report = runner.execute(&chain).await;

    // The run neither aborts nor records the evaluation error; resolution
    // still sees the untransformed previous result.
    assert!(report.is_success());
    assert_eq!(report.trace.len(), 2);
    assert_eq!(transport.sent()[1].url, "http://api.test/orders?userId=7");
}

#[tokio::test]
async fn transformation_output_feeds_parameter_resolution() {
    let chain = Chain::builder()
        .get("users", "http://api.test/users")
        .build()
        .get("orders", "http://api.test/orders")
        .transform("ids")
        .inject("userId", "1")
        .build()
        .build();

    let transport = MockTransport::replying(&[(200, r#"{"ids": [4, 9]}"#), (200, "{}")]);
    let runner = ChainRunner::new(transport.clone());

    runner.execute(&chain).await;

    // `ids` evaluates to [4, 9]; index 1 of the transformed carry is 9.
    assert_eq!(transport.sent()[1].url, "http://api.test/orders?userId=9");
}

#[tokio::test]
async fn reruns_start_from_a_fresh_context() {
    let chain = Chain::builder()
        .get("users", "http://api.test/users")
        .build()
        .build();

    let transport = MockTransport::replying(&[(200, r#"{"a": 1}"#), (200, r#"{"a": 2}"#)]);
    let runner = ChainRunner::new(transport.clone());

    let first = runner.execute(&chain).await;
    let second = runner.execute(&chain).await;

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.trace, vec![StepOutcome::Success(json!({"a": 1}))]);
    assert_eq!(second.trace, vec![StepOutcome::Success(json!({"a": 2}))]);
}
