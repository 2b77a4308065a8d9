use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Form;
use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::time::sleep;
use wikitree_api::render::{render_html, render_reference_box};
use wikitree_api::{
    ApiError, DEFAULT_POLL_INTERVAL, ProfileQuery, RestErrorKind, WikiTreeClient, wait_for,
};

const PERSON: &str = r#"[{"page_name":"Shoshone-1","person":{"Id":1,"Name":"Shoshone-1","FirstName":"Shoshone","BirthDate":"0000-00-00","DeathDate":"1900-01-01"},"status":0}]"#;
const PRIVATE: &str = r#"[{"page_name":"Private-1","person":{"Id":2,"Name":"Private-1","FirstName":"Pat"},"status":0}]"#;

#[tokio::test]
async fn e2e_get_person_roundtrip() {
    let server = TestServer::start().await;
    let client = server.client();

    let json = client
        .get_person(&ProfileQuery::new("Shoshone-1"), None)
        .await
        .expect("person reply");
    let html = render_reference_box(&json);
    assert!(html.contains("(? - 1900)"));
}

#[tokio::test]
async fn e2e_status_error_is_rendered_verbatim() {
    let server = TestServer::start().await;
    let client = server.client();

    let json = client
        .get_person(&ProfileQuery::new("Nobody-1"), None)
        .await
        .expect("service still answers 200");
    assert_eq!(render_html(&json), "WikiTree API Error: Invalid key");
}

#[tokio::test]
async fn e2e_login_then_private_profile() {
    let server = TestServer::start().await;
    let client = server.client();

    let anonymous = client
        .get_person(&ProfileQuery::new("Private-1"), None)
        .await
        .expect("reply");
    assert_eq!(render_html(&anonymous), "WikiTree API Error: Permission denied");

    let session = client
        .authenticate("me@example.com", "secret")
        .await
        .expect("login");
    assert_eq!(session.user_name, "Doe-1");
    assert_eq!(session.user_id, 27351134);

    let json = client
        .get_person(&ProfileQuery::new("Private-1"), Some(&session))
        .await
        .expect("reply");
    assert!(render_html(&json).contains("<tr><td>FirstName</td><td>Pat</td></tr>"));
}

#[tokio::test]
async fn e2e_wrong_password_fails_login() {
    let server = TestServer::start().await;
    let err = server
        .client()
        .authenticate("me@example.com", "wrong")
        .await
        .expect_err("bad credentials");
    assert!(matches!(err, ApiError::Login(_)));
}

#[tokio::test]
async fn e2e_timeout_is_a_transport_error() {
    let server = TestServer::start().await;
    let client = server.client().with_timeout(Duration::from_millis(200));

    let err = client
        .get_person(&ProfileQuery::new("Slow-1"), None)
        .await
        .expect_err("timeout");
    match err {
        ApiError::Transport(rest) => assert_eq!(rest.kind(), RestErrorKind::Timeout),
        other => panic!("expected transport timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn e2e_unreachable_endpoint_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = WikiTreeClient::new()
        .expect("client")
        .with_endpoint(format!("http://{addr}/api.php"));
    let err = client
        .get_person(&ProfileQuery::new("Shoshone-1"), None)
        .await
        .expect_err("nothing listening");
    assert!(err.is_transport());
}

struct TestServer {
    addr: SocketAddr,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let app = Router::new().route("/api.php", post(api_handler));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        wait_for(
            || std::net::TcpStream::connect(addr).ok(),
            DEFAULT_POLL_INTERVAL,
            Duration::from_secs(2),
        )
        .await
        .expect("test server accepts connections");

        Self { addr, task }
    }

    fn client(&self) -> WikiTreeClient {
        WikiTreeClient::new()
            .expect("reqwest client")
            .with_endpoint(format!("http://{}/api.php", self.addr))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn json(body: &'static str) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn api_handler(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
    let field = |name: &str| form.get(name).map(String::as_str).unwrap_or("");
    let logged_in = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|cookie| cookie.contains("wikitree_wtb_Token=t1"));

    match (field("action"), field("key")) {
        ("clientLogin", _) if field("doLogin") == "1" => {
            if field("wpEmail") == "me@example.com" && field("wpPassword") == "secret" {
                (
                    StatusCode::FOUND,
                    [
                        (header::LOCATION, "https://apps.example.com/back?authcode=abc"),
                        (header::SET_COOKIE, "wikitree_wtb__session=s1; path=/"),
                    ],
                    "",
                )
                    .into_response()
            } else {
                (StatusCode::OK, "<html>login form</html>").into_response()
            }
        }
        ("clientLogin", _) if field("authcode") == "abc" => (
            StatusCode::OK,
            [(header::SET_COOKIE, "wikitree_wtb_Token=t1; path=/")],
            r#"{"clientLogin":{"result":"Success","userid":27351134,"username":"Doe-1"}}"#,
        )
            .into_response(),
        ("clientLogin", _) => json(r#"{"clientLogin":{"result":"Error"}}"#),
        ("getPerson", "Shoshone-1") => json(PERSON),
        ("getPerson", "Private-1") if logged_in => json(PRIVATE),
        ("getPerson", "Private-1") => json(r#"[{"status":"Permission denied"}]"#),
        ("getPerson", "Slow-1") => {
            sleep(Duration::from_millis(1500)).await;
            json(PERSON)
        }
        _ => json(r#"[{"status":"Invalid key"}]"#),
    }
}
