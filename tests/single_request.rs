//! Integration tests for the blocking single-request clients.

mod common;

use batch_http::{
    ClientConfig, ClientOptions, ContentType, Error, FailureKind, HttpClient, LazyClient,
    RequestSpec,
};
use common::{closed_port_url, init_tracing, TestServer};
use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;

#[test]
fn test_get_sends_query_and_no_body() {
    init_tracing();
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::UrlEncoded("q".into(), "test".into()))
        .match_header("content-type", Matcher::Missing)
        .match_body("")
        .with_status(200)
        .with_body("found")
        .create();

    let client = HttpClient::with_defaults().unwrap();
    let spec = RequestSpec::get(format!("{}/search", server.url())).with_param("q", "test");
    assert_eq!(client.execute(&spec).unwrap(), "found");
    mock.assert();
}

#[test]
fn test_post_json_body() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/items")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"name": "widget", "qty": 3})))
        .with_status(201)
        .with_body(r#"{"id":7}"#)
        .create();

    let client = HttpClient::with_defaults().unwrap();
    let spec = RequestSpec::post(format!("{}/items", server.url()))
        .with_content_type(ContentType::parse("JSON"))
        .with_param("name", "widget")
        .with_param("qty", 3);
    assert_eq!(client.request(&spec).as_deref(), Some(r#"{"id":7}"#));
    mock.assert();
}

#[test]
fn test_post_defaults_to_form_body() {
    let mut server = Server::new();
    let mock = server
        .mock("PUT", "/items/1")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("name".into(), "a b".into()),
            Matcher::UrlEncoded("active".into(), "1".into()),
        ]))
        .with_body("ok")
        .create();

    let client = HttpClient::with_defaults().unwrap();
    let spec: RequestSpec = serde_json::from_value(json!({
        "method": "put",
        "url": format!("{}/items/1", server.url()),
        "data": {"name": "a b", "active": true}
    }))
    .unwrap();
    assert_eq!(client.execute(&spec).unwrap(), "ok");
    mock.assert();
}

#[test]
fn test_error_status_collapses_to_none() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/broken")
        .with_status(500)
        .with_body("internal error")
        .expect(2)
        .create();

    let client = HttpClient::with_defaults().unwrap();
    let spec = RequestSpec::get(format!("{}/broken", server.url()));
    assert_eq!(client.request(&spec), None);

    match client.execute(&spec) {
        Err(Error::Status { status, message }) => {
            assert_eq!(status, 500);
            assert!(message.starts_with("Server error: `GET "));
            assert!(message.ends_with("internal error"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
    mock.assert();
}

#[test]
fn test_timeout_is_classified() {
    let server = TestServer::start();
    let client =
        HttpClient::new(ClientConfig::default().with_timeout(Some(Duration::from_millis(200))))
            .unwrap();
    let spec = RequestSpec::get(server.url("/delay")).with_param("ms", 2000);

    let err = client.execute(&spec).unwrap_err();
    assert_eq!(err.failure_kind(), FailureKind::Timeout);
    assert_eq!(err.code(), -1);
}

#[test]
fn test_connection_refused_is_classified() {
    let client = HttpClient::with_defaults().unwrap();
    let err = client.execute(&RequestSpec::get(closed_port_url())).unwrap_err();
    assert_eq!(err.failure_kind(), FailureKind::Connect);
}

#[test]
fn test_tls_to_plain_http_server_is_classified() {
    let server = TestServer::start();
    let url = server.url("/delay").replacen("http://", "https://", 1);
    let client = HttpClient::with_defaults().unwrap();

    let err = client.execute(&RequestSpec::get(url)).unwrap_err();
    assert_eq!(err.failure_kind(), FailureKind::Tls);
    assert_eq!(err.code(), -3);
}

#[test]
fn test_tls_words_in_url_do_not_change_connect_kind() {
    let client = HttpClient::with_defaults().unwrap();
    let url = format!("{}ssl-tls-handshake-certificate", closed_port_url());

    let err = client.execute(&RequestSpec::get(url)).unwrap_err();
    assert_eq!(err.failure_kind(), FailureKind::Connect);
}

#[test]
fn test_get_params_are_appended_to_existing_query() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("lang".into(), "en".into()),
            Matcher::UrlEncoded("q".into(), "test".into()),
        ]))
        .with_body("found")
        .create();

    let client = HttpClient::with_defaults().unwrap();
    let spec = RequestSpec::get(format!("{}/search?lang=en", server.url())).with_param("q", "test");
    assert_eq!(client.execute(&spec).unwrap(), "found");
    mock.assert();
}

#[test]
fn test_base_uri_resolves_relative_urls() {
    let mut server = Server::new();
    let mock = server.mock("GET", "/api/items").with_body("[]").create();

    let opts = ClientOptions::new().with_extra("base_uri", format!("{}/api/", server.url()));
    let client = HttpClient::from_options(&opts).unwrap();
    assert_eq!(client.execute(&RequestSpec::get("items")).unwrap(), "[]");
    mock.assert();
}

#[test]
fn test_lazy_client_honors_only_first_options() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/ping")
        .match_header("x-client", "first")
        .with_body("pong")
        .expect(2)
        .create();

    let lazy = LazyClient::new();
    let spec = RequestSpec::get(format!("{}/ping", server.url()));
    let first = ClientOptions::new().with_extra("headers", json!({"x-client": "first"}));
    let second = ClientOptions::new()
        .with_timeout(30.0)
        .with_extra("headers", json!({"x-client": "second"}));

    assert_eq!(lazy.http_request(&spec, Some(&first)).as_deref(), Some("pong"));
    assert_eq!(lazy.http_request(&spec, Some(&second)).as_deref(), Some("pong"));
    assert_eq!(lazy.config().unwrap().timeout, Some(Duration::from_secs(2)));
    mock.assert();
}

#[test]
fn test_separate_clients_do_not_share_configuration() {
    let mut server = Server::new();
    let first_mock = server
        .mock("GET", "/who")
        .match_header("x-client", "a")
        .with_body("a")
        .create();
    let second_mock = server
        .mock("GET", "/who")
        .match_header("x-client", "b")
        .with_body("b")
        .create();

    let spec = RequestSpec::get(format!("{}/who", server.url()));
    let a = HttpClient::from_options(&ClientOptions::new().with_extra("headers", json!({"x-client": "a"})))
        .unwrap();
    let b = HttpClient::from_options(&ClientOptions::new().with_extra("headers", json!({"x-client": "b"})))
        .unwrap();

    assert_eq!(a.execute(&spec).unwrap(), "a");
    assert_eq!(b.execute(&spec).unwrap(), "b");
    first_mock.assert();
    second_mock.assert();
}
