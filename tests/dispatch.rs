mod common;
use common::client;

use lfsapi::{decode_response, ErrorClass, LfsError};
use reqwest::{Method, Request, StatusCode, Url};
use serde::Deserialize;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Default, PartialEq, Deserialize)]
struct Status {
    ok: bool,
}

fn get(server: &MockServer, route: &str) -> Request {
    let url = Url::parse(&format!("{}{}", server.uri(), route)).expect("url");
    Request::new(Method::GET, url)
}

async fn mount(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn json_body_decodes_into_target() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/status",
        ResponseTemplate::new(200)
            .set_body_raw(r#"{"ok":true}"#, "application/json; charset=utf-8"),
    )
    .await;

    let client = client(&[], &[]);
    let mut res = client.execute(get(&server, "/status")).await.expect("response");
    assert_eq!(res.status(), StatusCode::OK);
    assert!(!res.is_body_closed());

    let mut status = Status::default();
    decode_response(&mut res, &mut status).await.expect("decode");
    assert_eq!(status, Status { ok: true });
    assert!(res.is_body_closed());
}

#[tokio::test]
async fn non_json_content_type_is_left_alone() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/plain",
        ResponseTemplate::new(200).set_body_raw(r#"{"ok":true}"#, "text/plain"),
    )
    .await;

    let client = client(&[], &[]);
    let mut res = client.execute(get(&server, "/plain")).await.expect("response");

    let mut status = Status::default();
    decode_response(&mut res, &mut status).await.expect("no-op");
    assert_eq!(status, Status { ok: false });
    assert!(!res.is_body_closed());
    assert_eq!(res.content_type(), Some("text/plain"));
}

#[tokio::test]
async fn malformed_lfs_json_reports_method_and_url() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/batch",
        ResponseTemplate::new(200).set_body_raw("{not json", "application/vnd.git-lfs+json"),
    )
    .await;

    let client = client(&[], &[]);
    let mut res = client.execute(get(&server, "/batch")).await.expect("response");

    let mut status = Status::default();
    let err = decode_response(&mut res, &mut status).await.unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, LfsError::Decode { .. }), "{message}");
    assert!(message.contains("GET"), "{message}");
    assert!(message.contains(&format!("{}/batch", server.uri())), "{message}");
    assert!(res.is_body_closed());

    let again = decode_response(&mut res, &mut status).await.unwrap_err();
    assert!(matches!(again, LfsError::BodyConsumed { .. }));
    assert_eq!(status, Status::default());
}

#[tokio::test]
async fn error_status_uses_server_message_and_keeps_response() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/missing",
        ResponseTemplate::new(404).set_body_raw(
            r#"{"message":"object not found","request_id":"req-1"}"#,
            "application/vnd.git-lfs+json",
        ),
    )
    .await;

    let client = client(&[], &[]);
    let err = client.execute(get(&server, "/missing")).await.unwrap_err();
    assert_eq!(err.error().class(), ErrorClass::Other);
    assert_eq!(err.to_string(), "object not found\nRequest ID: req-1");

    let (_, response) = err.into_parts();
    let response = response.expect("response kept");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.is_body_closed());
}

#[tokio::test]
async fn unauthorized_without_payload_is_auth_error() {
    let server = MockServer::start().await;
    mount(&server, "/locked", ResponseTemplate::new(401).set_body_string("nope")).await;

    let client = client(&[], &[]);
    let err = client.execute(get(&server, "/locked")).await.unwrap_err();
    assert!(err.error().is_auth());
    assert!(err.to_string().starts_with("Authorization error: "));
    assert!(err.response().is_some());
}

#[tokio::test]
async fn server_errors_are_fatal_except_listed_codes() {
    let server = MockServer::start().await;
    mount(&server, "/boom", ResponseTemplate::new(503)).await;
    mount(&server, "/unimplemented", ResponseTemplate::new(501)).await;

    let client = client(&[], &[]);
    let boom = client.execute(get(&server, "/boom")).await.unwrap_err();
    assert!(boom.error().is_fatal());
    assert!(boom.to_string().contains("from HTTP 503"));

    let unimplemented = client.execute(get(&server, "/unimplemented")).await.unwrap_err();
    assert!(!unimplemented.error().is_fatal());
    assert!(unimplemented.to_string().starts_with("Not Implemented: "));
}

#[tokio::test]
async fn undecodable_error_body_keeps_status_class() {
    let server = MockServer::start().await;
    for (route, status) in [("/broken", 500), ("/denied", 401), ("/down", 503), ("/nope", 404)] {
        mount(
            &server,
            route,
            ResponseTemplate::new(status).set_body_raw("<html>", "application/json"),
        )
        .await;
    }

    let client = client(&[], &[]);
    let broken = client.execute(get(&server, "/broken")).await.unwrap_err();
    match broken.error() {
        LfsError::Status { status, source, .. } => {
            assert_eq!(*status, 500);
            assert!(matches!(source.as_ref(), LfsError::Decode { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(broken.error().is_fatal());
    assert!(broken.to_string().contains("Unable to parse HTTP response"));
    let response = broken.response().expect("response kept");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.is_body_closed());

    let denied = client.execute(get(&server, "/denied")).await.unwrap_err();
    assert!(denied.error().is_auth());
    assert!(!denied.error().is_fatal());

    let down = client.execute(get(&server, "/down")).await.unwrap_err();
    assert!(down.error().is_fatal());
    assert_eq!(down.error().class(), ErrorClass::Fatal);

    let nope = client.execute(get(&server, "/nope")).await.unwrap_err();
    assert_eq!(nope.error().class(), ErrorClass::Other);
}

#[tokio::test]
async fn trailing_bytes_after_json_value_are_ignored() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/trailing",
        ResponseTemplate::new(200)
            .set_body_raw("{\"ok\":true}\n{\"ok\":false}", "application/json"),
    )
    .await;

    let client = client(&[], &[]);
    let mut res = client.execute(get(&server, "/trailing")).await.expect("response");
    let mut status = Status::default();
    decode_response(&mut res, &mut status).await.expect("decode");
    assert_eq!(status, Status { ok: true });
    assert!(res.is_body_closed());
}

#[tokio::test]
async fn requests_reuse_the_host_client() {
    let server = MockServer::start().await;
    mount(&server, "/one", ResponseTemplate::new(200)).await;
    mount(&server, "/two", ResponseTemplate::new(204)).await;

    let client = client(&[], &[]);
    client.execute(get(&server, "/one")).await.expect("one");
    client.execute(get(&server, "/two")).await.expect("two");

    let port = server.address().port();
    assert_eq!(client.cached_hosts(), vec![format!("127.0.0.1:{}", port)]);
}

fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("addr").port()
}

#[tokio::test]
async fn transport_failure_has_no_response() {
    let port = closed_port();
    let url = Url::parse(&format!("http://127.0.0.1:{}/objects", port)).expect("url");

    let client = client(&[], &[]);
    let err = client.execute(Request::new(Method::GET, url)).await.unwrap_err();
    assert!(matches!(err.error(), LfsError::Transport(_)));
    assert!(err.response().is_none());
}

#[tokio::test]
async fn proxy_is_applied_unless_host_is_bypassed() {
    let server = MockServer::start().await;
    mount(&server, "/via", ResponseTemplate::new(200)).await;
    let dead_proxy = format!("http://127.0.0.1:{}", closed_port());

    let proxied = client(&[("HTTP_PROXY", dead_proxy.as_str())], &[]);
    let err = proxied.execute(get(&server, "/via")).await.unwrap_err();
    assert!(matches!(err.error(), LfsError::Transport(_)));

    let bypassed = client(
        &[("HTTP_PROXY", dead_proxy.as_str()), ("NO_PROXY", "127.0.0.1")],
        &[],
    );
    let res = bypassed.execute(get(&server, "/via")).await.expect("direct");
    assert_eq!(res.status(), StatusCode::OK);
}
