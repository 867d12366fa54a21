//! End-to-end tests of the reqwest-backed client against a mock HTTP server.

use std::sync::Arc;

use mockito::{Matcher, Server};
use serde_json::{json, Value};

use clinic_client::api::{auth, ApiResponse, RequestOptions};
use clinic_client::storage::{CredentialStore, MemoryStore, StoreKey};
use clinic_client::{ApiClient, ApiError, AuthEvent, AuthEvents, ClientConfig, Session};

const ENVELOPE_BODY: &str = r#"^\{"payload":"[A-Za-z0-9+/=]+"\}$"#;

fn client_for(server: &Server, store: Arc<MemoryStore>) -> ApiClient {
    let config = ClientConfig {
        api_url: server.url(),
        ..ClientConfig::default()
    };
    let session = Arc::new(Session::restore(store, &config.locale, AuthEvents::new()));
    ApiClient::new(&config, session)
}

fn authed_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_entries([
        (StoreKey::AccessToken, "access-1"),
        (StoreKey::RefreshToken, "refresh-1"),
    ]))
}

#[tokio::test]
async fn test_post_is_enveloped_over_the_wire() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/appointments")
        .match_header("authorization", "Bearer access-1")
        .match_header("content-type", "application/json")
        .match_header("x-locale", "en")
        .match_header("accept-language", "en")
        .match_body(Matcher::Regex(ENVELOPE_BODY.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"a1"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, authed_store());
    let created: Value = client
        .post("/appointments", &json!({"symptoms": "fever"}))
        .await
        .unwrap();

    assert_eq!(created, json!({"id": "a1"}));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_retried() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", "/auth/me")
        .match_header("authorization", "Bearer access-1")
        .with_status(401)
        .with_body(r#"{"message":"jwt expired"}"#)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::Json(json!({"refresh_token": "refresh-1"})))
        .with_status(200)
        .with_body(r#"{"token":"access-2","refresh_token":"refresh-2"}"#)
        .expect(1)
        .create_async()
        .await;
    let retry = server
        .mock("GET", "/auth/me")
        .match_header("authorization", "Bearer access-2")
        .with_status(200)
        .with_body(r#"{"id":"u1"}"#)
        .expect(1)
        .create_async()
        .await;

    let store = authed_store();
    let client = client_for(&server, store.clone());
    let me: Value = client.get("/auth/me").await.unwrap();

    assert_eq!(me, json!({"id": "u1"}));
    first.assert_async().await;
    refresh.assert_async().await;
    retry.assert_async().await;
    assert_eq!(store.load(StoreKey::RefreshToken).unwrap().as_deref(), Some("refresh-2"));
}

#[tokio::test]
async fn test_login_rejection_skips_refresh() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/auth/login")
        .with_status(401)
        .with_body(r#"{"message":"Invalid credentials"}"#)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server, Arc::new(MemoryStore::new()));
    let mut events = client.session().events().subscribe();
    let err = auth::login(&client, "a@clinic.test", "nope").await.unwrap_err();

    assert!(matches!(err, ApiError::LoginRejected { .. }));
    assert!(events.try_recv().is_err());
    login.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn test_unrecoverable_401_emits_expired_once() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/users")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("POST", "/auth/refresh")
        .with_status(403)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, authed_store());
    let mut events = client.session().events().subscribe();
    let err = client.fetch("/users", RequestOptions::get()).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(
        err.data(),
        Some(&json!({"message": "Request failed with status 401"}))
    );
    assert_eq!(events.try_recv().ok(), Some(AuthEvent::Expired));
    assert!(events.try_recv().is_err());
    assert!(!client.session().is_authenticated().await);
}

#[tokio::test]
async fn test_no_content_responses() {
    let mut server = Server::new_async().await;
    server
        .mock("DELETE", "/appointments/a1")
        .with_status(204)
        .create_async()
        .await;
    server
        .mock("POST", "/notifications/read")
        .with_status(200)
        .create_async()
        .await;

    let client = client_for(&server, authed_store());

    assert_eq!(
        client.delete("/appointments/a1").await.unwrap(),
        ApiResponse::NoContent
    );
    let resp = client
        .fetch(
            "/notifications/read",
            RequestOptions::new(reqwest::Method::POST).with_body("{}"),
        )
        .await
        .unwrap();
    assert_eq!(resp, ApiResponse::NoContent);
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let config = ClientConfig {
        api_url: "http://127.0.0.1:9".to_string(),
        ..ClientConfig::default()
    };
    let session = Arc::new(Session::restore(authed_store(), "en", AuthEvents::new()));
    let client = ApiClient::new(&config, session);

    let err = client.fetch("/auth/me", RequestOptions::get()).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
