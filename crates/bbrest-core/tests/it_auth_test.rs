//! Integration tests for token acquisition and refresh

use std::time::Instant;

use bbrest_core::auth::{
    authenticate_client_credentials, authenticate_jwt_bearer, AuthError, AuthScheme,
    TokenProvider, EXPIRY_SETTLE_DELAY,
};
use bbrest_core::Credentials;
use chrono::Utc;
use mockito::{Matcher, Server};
use reqwest::Client;

const LEARN_TOKEN_PATH: &str = "/learn/api/public/v1/oauth2/token";

#[tokio::test]
async fn client_credentials_success() {
    //* Given
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", LEARN_TOKEN_PATH)
        .match_header("authorization", Matcher::Regex("^Basic ".into()))
        .match_header(
            "content-type",
            Matcher::Regex("application/x-www-form-urlencoded".into()),
        )
        .match_body(Matcher::Regex("grant_type=client_credentials".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "learn-token", "token_type": "bearer", "expires_in": 3599}"#)
        .expect(1)
        .create_async()
        .await;

    //* When
    let token = authenticate_client_credentials(&Client::new(), &server.url(), "key", "secret")
        .await
        .expect("Authentication should succeed");

    //* Then
    mock.assert_async().await;
    assert_eq!(token.access_token, "learn-token");
    let left = token.expires_at.expect("Token should track expiry") - Utc::now();
    assert!(left > chrono::Duration::seconds(3590));
}

#[tokio::test]
async fn client_credentials_rejected() {
    //* Given
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", LEARN_TOKEN_PATH)
        .with_status(401)
        .with_body(r#"{"error": "invalid_client", "error_description": "Invalid client credentials"}"#)
        .expect(1)
        .create_async()
        .await;

    //* When
    let result =
        authenticate_client_credentials(&Client::new(), &server.url(), "key", "wrong").await;

    //* Then
    mock.assert_async().await;
    match result {
        Err(AuthError::Rejected {
            status,
            description,
        }) => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(description, "Invalid client credentials");
        }
        other => panic!("Expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn client_credentials_server_error_yields_no_token() {
    //* Given
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", LEARN_TOKEN_PATH)
        .with_status(503)
        .with_body("Service Unavailable")
        .create_async()
        .await;
    let creds = Credentials::new(server.url(), "key", "secret");
    let mut provider = TokenProvider::new(Client::new(), creds, AuthScheme::ClientCredentials);

    //* When
    let result = provider.get_token().await;

    //* Then
    assert!(matches!(result, Err(AuthError::Rejected { .. })));
    assert!(provider.current().is_none());
}

#[tokio::test]
async fn client_credentials_out_of_range_expiry_is_invalid_response() {
    //* Given
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", LEARN_TOKEN_PATH)
        .with_status(200)
        .with_body(r#"{"access_token": "t", "expires_in": 9223372036854775}"#)
        .expect(1)
        .create_async()
        .await;

    //* When
    let result = authenticate_client_credentials(&Client::new(), &server.url(), "key", "secret").await;

    //* Then
    mock.assert_async().await;
    assert!(matches!(result, Err(AuthError::InvalidResponse(ref m)) if m.contains("expires_in")));
}

#[tokio::test]
async fn jwt_bearer_posts_assertion() {
    //* Given
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(
                "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer".into(),
            ),
            Matcher::Regex("assertion=[A-Za-z0-9_-]+\\.[A-Za-z0-9_-]+\\.[A-Za-z0-9_-]+".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"access_token": "collab-token", "expires_in": 299}"#)
        .expect(1)
        .create_async()
        .await;

    //* When
    let token = authenticate_jwt_bearer(&Client::new(), &server.url(), "collab-key", "collab-secret")
        .await
        .expect("Authentication should succeed");

    //* Then
    mock.assert_async().await;
    assert_eq!(token.access_token, "collab-token");
    assert!(token.expires_at.is_some());
}

#[tokio::test]
async fn provider_reuses_live_token() {
    //* Given
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", LEARN_TOKEN_PATH)
        .with_status(200)
        .with_body(r#"{"access_token": "learn-token", "expires_in": 3600}"#)
        .expect(1)
        .create_async()
        .await;
    let creds = Credentials::new(server.url(), "key", "secret");
    let mut provider = TokenProvider::new(Client::new(), creds, AuthScheme::ClientCredentials);

    //* When
    let first = provider.get_token().await.expect("First token");
    let second = provider.get_token().await.expect("Second token");

    //* Then
    mock.assert_async().await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn provider_refreshes_expired_token() {
    //* Given
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", LEARN_TOKEN_PATH)
        .with_status(200)
        .with_body(r#"{"access_token": "short-lived", "expires_in": 0}"#)
        .expect(2)
        .create_async()
        .await;
    let creds = Credentials::new(server.url(), "key", "secret");
    let mut provider = TokenProvider::new(Client::new(), creds, AuthScheme::ClientCredentials);

    //* When
    let first = provider.get_token().await.expect("First token");
    let started = Instant::now();
    let refreshed = provider.get_token().await.expect("Refreshed token");

    //* Then
    mock.assert_async().await;
    assert!(started.elapsed() >= EXPIRY_SETTLE_DELAY);
    assert!(refreshed.expires_at > first.expires_at);
    assert_eq!(provider.current(), Some(&refreshed));
}
