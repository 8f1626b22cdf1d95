//! Integration tests for the session facade and course lookups

use std::io::Write;

use bbrest_core::{AuthScheme, ConfigError, Error, RequestOptions, Session};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use tempfile::NamedTempFile;

fn write_config(server: &ServerGuard) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "{}",
        json!({"url": server.url(), "key": "key", "secret": "secret"})
    )
    .unwrap();
    file
}

async fn mock_learn_token(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/learn/api/public/v1/oauth2/token")
        .with_status(200)
        .with_body(r#"{"access_token": "learn-token", "expires_in": 3600}"#)
        .expect(1)
        .create_async()
        .await
}

#[tokio::test]
async fn quick_auth_then_get() {
    //* Given
    let mut server = Server::new_async().await;
    let token_mock = mock_learn_token(&mut server).await;
    let get_mock = server
        .mock("GET", "/learn/api/public/v1/announcements")
        .match_query(Matcher::UrlEncoded("fields".into(), "id,title".into()))
        .match_header("authorization", "Bearer learn-token")
        .with_status(200)
        .with_body(r#"{"results": [{"id": "_1_1", "title": "Welcome"}]}"#)
        .expect(1)
        .create_async()
        .await;
    let config = write_config(&server);

    //* When
    let mut session =
        Session::quick_auth(config.path(), AuthScheme::ClientCredentials, &RequestOptions::default())
            .await
            .expect("quick_auth should succeed");
    let announcements = session
        .get("/learn/api/public/v1/announcements", &[("fields", "id,title")])
        .await
        .expect("GET should succeed");

    //* Then
    token_mock.assert_async().await;
    get_mock.assert_async().await;
    assert_eq!(session.base_url(), server.url());
    assert_eq!(announcements, vec![json!({"id": "_1_1", "title": "Welcome"})]);
}

#[tokio::test]
async fn quick_auth_missing_config() {
    //* Given
    let dir = tempfile::tempdir().unwrap();

    //* When
    let result = Session::quick_auth(
        dir.path().join("config.json"),
        AuthScheme::ClientCredentials,
        &RequestOptions::default(),
    )
    .await;

    //* Then
    assert!(matches!(result, Err(Error::Config(ConfigError::NotFound(_)))));
}

#[tokio::test]
async fn auth_failure_surfaces_as_auth_error() {
    //* Given
    let mut server = Server::new_async().await;
    let _token = server
        .mock("POST", "/learn/api/public/v1/oauth2/token")
        .with_status(400)
        .with_body(r#"{"error": "invalid_request", "error_description": "Bad key"}"#)
        .create_async()
        .await;
    let config = write_config(&server);

    //* When
    let result =
        Session::quick_auth(config.path(), AuthScheme::ClientCredentials, &RequestOptions::default())
            .await;

    //* Then
    assert!(matches!(result, Err(Error::Auth(_))));
}

#[tokio::test]
async fn check_course_id_found_and_missing() {
    //* Given
    let mut server = Server::new_async().await;
    let _token = mock_learn_token(&mut server).await;
    let found = server
        .mock("GET", "/learn/api/public/v3/courses")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("externalId".into(), "HIST-101".into()),
            Matcher::UrlEncoded("fields".into(), "id".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"results": [{"id": "_10_1"}]}"#)
        .expect(1)
        .create_async()
        .await;
    let missing = server
        .mock("GET", "/learn/api/public/v3/courses")
        .match_query(Matcher::UrlEncoded("externalId".into(), "NOPE".into()))
        .with_status(200)
        .with_body(r#"{"results": []}"#)
        .expect(1)
        .create_async()
        .await;
    let config = write_config(&server);
    let mut session =
        Session::quick_auth(config.path(), AuthScheme::ClientCredentials, &RequestOptions::default())
            .await
            .unwrap();

    //* When
    let exists = session.check_course_id("HIST-101").await.unwrap();
    let absent = session.check_course_id("NOPE").await.unwrap();

    //* Then
    found.assert_async().await;
    missing.assert_async().await;
    assert!(exists);
    assert!(!absent);
}

#[tokio::test]
async fn convert_external_id_requires_single_match() {
    //* Given
    let mut server = Server::new_async().await;
    let _token = mock_learn_token(&mut server).await;
    let _single = server
        .mock("GET", "/learn/api/public/v3/courses")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("externalId".into(), "HIST-101".into()),
            Matcher::UrlEncoded("fields".into(), "courseId".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"results": [{"courseId": "HIST-101-2021"}]}"#)
        .create_async()
        .await;
    let _several = server
        .mock("GET", "/learn/api/public/v3/courses")
        .match_query(Matcher::UrlEncoded("externalId".into(), "HIST".into()))
        .with_status(200)
        .with_body(r#"{"results": [{"courseId": "A"}, {"courseId": "B"}]}"#)
        .create_async()
        .await;
    let config = write_config(&server);
    let mut session =
        Session::quick_auth(config.path(), AuthScheme::ClientCredentials, &RequestOptions::default())
            .await
            .unwrap();

    //* When
    let converted = session.convert_external_id("HIST-101", "courseId").await.unwrap();
    let ambiguous = session.convert_external_id("HIST", "courseId").await.unwrap();

    //* Then
    assert_eq!(converted.as_deref(), Some("HIST-101-2021"));
    assert_eq!(ambiguous, None);
}
