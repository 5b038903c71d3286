use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use isirt_client::{ApiError, ApiRequest, AuthRedirect, ClientOptions, IsirtClient, RetryPolicy};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

#[derive(Default)]
struct CountingNavigator {
    route: RwLock<String>,
    redirects: AtomicUsize,
}

impl CountingNavigator {
    fn at(route: &str) -> Arc<Self> {
        Arc::new(Self {
            route: RwLock::new(route.to_string()),
            redirects: AtomicUsize::new(0),
        })
    }

    fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl AuthRedirect for CountingNavigator {
    fn current_route(&self) -> String {
        self.route.read().unwrap().clone()
    }

    fn redirect_to_login(&self, login_route: &str) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
        *self.route.write().unwrap() = login_route.to_string();
    }
}

fn fast_options(server: &MockServer) -> ClientOptions {
    ClientOptions::new(server.uri()).with_retry(RetryPolicy {
        max_attempts: 3,
        base_delay_ms: 10,
    })
}

fn client(server: &MockServer) -> IsirtClient {
    IsirtClient::new(fast_options(server)).unwrap()
}

#[tokio::test]
async fn server_errors_are_retried_three_times() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/incidents/"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({"detail": "db down"})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let err = client(&server).list_incidents().await.unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 500, ref message } if message == "db down"));
}

#[tokio::test]
async fn server_error_then_success_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/groups/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/groups/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "name": "IRT"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let groups = client(&server).list_groups().await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "IRT");
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/groups/"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"detail": "Group already exists"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .create_group(&isirt_schema::GroupCreate {
            name: "IRT".into(),
            description: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.message(), "Group already exists");
}

#[tokio::test]
async fn no_retry_call_makes_single_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/audit/users/7/cross-reference"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).user_cross_reference(7).await.unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 502, .. }));
}

#[tokio::test]
async fn unauthorized_redirects_to_login_exactly_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/incidents/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"detail": "Not authenticated"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let navigator = CountingNavigator::at("/incidents");
    let client = client(&server).with_redirect(navigator.clone());

    let err = client.list_incidents().await.unwrap_err();

    assert!(err.is_auth());
    assert_eq!(navigator.redirects(), 1);
    assert_eq!(navigator.current_route(), "/login");
}

#[tokio::test]
async fn unauthorized_on_login_route_does_not_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/login/token"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"detail": "Incorrect email or password"})),
        )
        .mount(&server)
        .await;

    let navigator = CountingNavigator::at("/login");
    let client = client(&server).with_redirect(navigator.clone());

    let err = client.login("a@b.com", "wrong").await.unwrap_err();

    assert!(err.is_auth());
    assert_eq!(err.message(), "Incorrect email or password");
    assert_eq!(navigator.redirects(), 0);
}

#[tokio::test]
async fn session_probe_never_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/me/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let navigator = CountingNavigator::at("/dashboard");
    let client = client(&server).with_redirect(navigator.clone());

    assert!(client.current_user().await.unwrap_err().is_auth());
    assert_eq!(navigator.redirects(), 0);
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(800)))
        .mount(&server)
        .await;

    let client = client(&server);
    let request = ApiRequest::get("/slow")
        .timeout(Duration::from_millis(100))
        .no_retry();

    let err = client.http().send_value(request).await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout { timeout_ms: 100 }));
}

#[tokio::test]
async fn empty_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/groups/3"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client(&server);
    let value = client
        .http()
        .send_value(ApiRequest::delete("/groups/3"))
        .await
        .unwrap();
    assert!(value.is_none());
    client.delete_group(3).await.unwrap();
}

#[tokio::test]
async fn html_success_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/groups/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captive portal</html>"))
        .mount(&server)
        .await;

    let err = client(&server).list_groups().await.unwrap_err();
    assert!(matches!(err, ApiError::Malformed { status: 200, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let options = ClientOptions::new(format!("http://127.0.0.1:{port}"));

    let client = IsirtClient::new(options).unwrap();
    let err = client
        .http()
        .send_value(ApiRequest::get("/groups/").no_retry())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_) | ApiError::Timeout { .. }), "{err:?}");
    assert!(err.is_retryable());
}

struct StampedFailure {
    seen: Arc<Mutex<Vec<Instant>>>,
}

impl Respond for StampedFailure {
    fn respond(&self, _: &Request) -> ResponseTemplate {
        self.seen.lock().unwrap().push(Instant::now());
        ResponseTemplate::new(502)
    }
}

#[tokio::test]
async fn default_policy_backs_off_one_then_two_seconds() {
    let server = MockServer::start().await;
    let seen = Arc::new(Mutex::new(Vec::new()));
    Mock::given(method("GET"))
        .and(path("/api/v1/groups/"))
        .respond_with(StampedFailure { seen: seen.clone() })
        .expect(3)
        .mount(&server)
        .await;

    let client = IsirtClient::new(ClientOptions::new(server.uri())).unwrap();
    let err = client.list_groups().await.unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 502, .. }));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    let first_gap = seen[1] - seen[0];
    let second_gap = seen[2] - seen[1];
    assert!(first_gap >= Duration::from_millis(1000), "{first_gap:?}");
    assert!(first_gap < Duration::from_millis(1800), "{first_gap:?}");
    assert!(second_gap >= Duration::from_millis(2000), "{second_gap:?}");
    assert!(second_gap < Duration::from_millis(2800), "{second_gap:?}");
}
