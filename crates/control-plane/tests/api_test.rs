// In-process API tests
//
// Drive the full router with tower's oneshot against the in-memory backend;
// no database or network listener is needed.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use confhub_control_plane::{auth::JwtConfig, build_app, storage::StorageBackend};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "api-test-secret";

fn app() -> Router {
    app_with_prefix("")
}

fn app_with_prefix(prefix: &str) -> Router {
    let db = Arc::new(StorageBackend::in_memory());
    build_app(db, JwtConfig::new(SECRET), prefix)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, value)
}

/// Create a user and log in, returning a bearer token
async fn login_as(app: &Router, username: &str, password: &str) -> String {
    let (status, _, _) = send(
        app,
        Method::POST,
        "/users/",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = send(
        app,
        Method::POST,
        "/users/auth/login",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

async fn create_environment(app: &Router, token: &str, name: &str) {
    let (status, _, _) = send(
        app,
        Method::POST,
        "/environments/",
        Some(token),
        Some(json!({"name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_status() {
    let app = app();
    let (status, _, body) = send(&app, Method::GET, "/status/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "pong"}));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = app();
    login_as(&app, "alice", "wonderland").await;

    let (wrong_status, wrong_headers, wrong_body) = send(
        &app,
        Method::POST,
        "/users/auth/login",
        None,
        Some(json!({"username": "alice", "password": "nope"})),
    )
    .await;
    let (unknown_status, unknown_headers, unknown_body) = send(
        &app,
        Method::POST,
        "/users/auth/login",
        None,
        Some(json!({"username": "mallory", "password": "nope"})),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    assert_eq!(unknown_headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["error"], "Incorrect username or password");
}

#[tokio::test]
async fn test_protected_routes_require_valid_token() {
    let app = app();

    let (status, headers, body) = send(&app, Method::GET, "/environments/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    assert_eq!(body["error"], "Could not validate credentials");

    let (status, _, garbage_body) =
        send(&app, Method::GET, "/environments/", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage_body, body);

    // Token signed with another secret
    let foreign = confhub_control_plane::auth::JwtService::new(JwtConfig::new("other"))
        .issue("alice")
        .unwrap();
    let (status, _, foreign_body) =
        send(&app, Method::GET, "/environments/", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(foreign_body, body);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = app();
    login_as(&app, "alice", "wonderland").await;

    let expired = confhub_control_plane::auth::JwtService::new(JwtConfig::new(SECRET))
        .issue_with_ttl("alice", chrono::Duration::seconds(-10))
        .unwrap();
    let (status, headers, body) =
        send(&app, Method::GET, "/environments/", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    assert_eq!(body["error"], "Could not validate credentials");
}

#[tokio::test]
async fn test_user_crud_hides_password() {
    let app = app();

    let (status, _, created) = send(
        &app,
        Method::POST,
        "/users/",
        None,
        Some(json!({"username": "alice", "password": "pw", "is_admin": true})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created.get("password_hash").is_none());
    assert!(created.get("password").is_none());
    assert_eq!(created["is_admin"], true);

    let id = created["id"].as_i64().unwrap();
    let (status, _, fetched) = send(&app, Method::GET, &format!("/users/{}/", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["username"], "alice");

    let (status, _, updated) = send(
        &app,
        Method::PUT,
        &format!("/users/{}/", id),
        None,
        Some(json!({"username": "alicia", "password_hash": "new-pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["username"], "alicia");
    assert_eq!(updated["is_admin"], false);

    // The new password works for login
    let (status, _, _) = send(
        &app,
        Method::POST,
        "/users/auth/login",
        None,
        Some(json!({"username": "alicia", "password": "new-pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(&app, Method::GET, "/users/999/", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, _, list) = send(&app, Method::GET, "/users/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], 1);
    assert!(list["results"][0].get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_username_is_400() {
    let app = app();
    login_as(&app, "alice", "a").await;

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/users/",
        None,
        Some(json!({"username": "alice", "password": "b"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User with this username already exists");
}

#[tokio::test]
async fn test_concurrent_duplicate_signup_has_one_winner() {
    let app = app();

    let attempts = (0..8).map(|i| {
        let app = app.clone();
        tokio::spawn(async move {
            send(
                &app,
                Method::POST,
                "/users/",
                None,
                Some(json!({"username": "alice", "password": format!("pw{}", i)})),
            )
            .await
            .0
        })
    });

    let mut created = 0;
    let mut rejected = 0;
    for attempt in attempts.collect::<Vec<_>>() {
        match attempt.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::BAD_REQUEST => rejected += 1,
            other => panic!("unexpected status {}", other),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(rejected, 7);
}

#[tokio::test]
async fn test_environment_crud() {
    let app = app();
    let token = login_as(&app, "alice", "pw").await;

    let (status, _, created) = send(
        &app,
        Method::POST,
        "/environments/",
        Some(&token),
        Some(json!({"name": "prod", "description": "Production"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["created_at"], created["updated_at"]);

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/environments/",
        Some(&token),
        Some(json!({"name": "prod"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Environment with this name already exists");

    // PATCH without description leaves it unchanged
    let (status, _, patched) = send(
        &app,
        Method::PATCH,
        "/environments/prod/",
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["description"], "Production");

    // PUT behaves the same way; explicit null clears
    let (status, _, put) = send(
        &app,
        Method::PUT,
        "/environments/prod/",
        Some(&token),
        Some(json!({"description": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(put["description"], Value::Null);
    assert_eq!(put["name"], "prod");

    let (status, _, body) =
        send(&app, Method::GET, "/environments/missing/", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Environment not found");
}

#[tokio::test]
async fn test_environment_pagination() {
    let app = app();
    let token = login_as(&app, "alice", "pw").await;
    for i in 0..25 {
        create_environment(&app, &token, &format!("env-{:02}", i)).await;
    }

    let (status, _, page1) = send(
        &app,
        Method::GET,
        "/environments/?page=1&page_size=10",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page1["count"], 25);
    assert_eq!(page1["results"].as_array().unwrap().len(), 10);
    assert_eq!(page1["results"][0]["name"], "env-00");
    assert_eq!(page1["next"], "/environments/?page=2&page_size=10");
    assert_eq!(page1["previous"], Value::Null);

    let (_, _, page3) = send(
        &app,
        Method::GET,
        "/environments/?page=3&page_size=10",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(page3["results"].as_array().unwrap().len(), 5);
    assert_eq!(page3["results"][4]["name"], "env-24");
    assert_eq!(page3["next"], Value::Null);
    assert_eq!(page3["previous"], "/environments/?page=2&page_size=10");

    // Defaults
    let (_, _, default_page) =
        send(&app, Method::GET, "/environments/", Some(&token), None).await;
    assert_eq!(default_page["results"].as_array().unwrap().len(), 10);

    for query in ["page=0", "page_size=0", "page_size=101", "page=abc"] {
        let (status, _, body) = send(
            &app,
            Method::GET,
            &format!("/environments/?{}", query),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "query {}", query);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_pagination_links_include_prefix() {
    let app = app_with_prefix("/api");

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/users/",
        None,
        Some(json!({"username": "a", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    send(
        &app,
        Method::POST,
        "/api/users/",
        None,
        Some(json!({"username": "b", "password": "pw"})),
    )
    .await;

    let (_, _, page) = send(&app, Method::GET, "/api/users/?page_size=1", None, None).await;
    assert_eq!(page["count"], 2);
    assert_eq!(page["next"], "/api/users/?page=2&page_size=1");
}

#[tokio::test]
async fn test_variables_are_scoped_per_environment() {
    let app = app();
    let token = login_as(&app, "alice", "pw").await;
    create_environment(&app, &token, "prod").await;
    create_environment(&app, &token, "stage").await;

    for env in ["prod", "stage"] {
        let (status, _, body) = send(
            &app,
            Method::POST,
            &format!("/environments/{}/variables/", env),
            Some(&token),
            Some(json!({"name": "PORT", "value": "80"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["is_sensitive"], false);
        assert_eq!(body["description"], Value::Null);
    }

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/environments/prod/variables/",
        Some(&token),
        Some(json!({"name": "PORT", "value": "81"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Variable 'PORT' already exists in this environment.");

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/environments/missing/variables/",
        Some(&token),
        Some(json!({"name": "PORT", "value": "80"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Environment not found");

    let (status, _, list) = send(
        &app,
        Method::GET,
        "/environments/prod/variables/",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_patch_versus_replace() {
    let app = app();
    let token = login_as(&app, "alice", "pw").await;
    create_environment(&app, &token, "prod").await;

    for name in ["A", "B"] {
        let (status, _, _) = send(
            &app,
            Method::POST,
            "/environments/prod/variables/",
            Some(&token),
            Some(json!({
                "name": name,
                "value": "80",
                "description": "listen port",
                "is_sensitive": true
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _, patched) = send(
        &app,
        Method::PATCH,
        "/environments/prod/variables/A",
        Some(&token),
        Some(json!({"value": "9090"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["value"], "9090");
    assert_eq!(patched["description"], "listen port");
    assert_eq!(patched["is_sensitive"], true);

    let (status, _, replaced) = send(
        &app,
        Method::PUT,
        "/environments/prod/variables/B",
        Some(&token),
        Some(json!({"value": "9090"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["value"], "9090");
    assert_eq!(replaced["description"], Value::Null);
    assert_eq!(replaced["is_sensitive"], false);

    let (status, _, _) = send(
        &app,
        Method::PATCH,
        "/environments/prod/variables/MISSING",
        Some(&token),
        Some(json!({"value": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_environment_cascades() {
    let app = app();
    let token = login_as(&app, "alice", "pw").await;
    create_environment(&app, &token, "prod").await;

    for name in ["PORT", "HOST"] {
        send(
            &app,
            Method::POST,
            "/environments/prod/variables/",
            Some(&token),
            Some(json!({"name": name, "value": "x"})),
        )
        .await;
    }

    let (status, _, body) =
        send(&app, Method::DELETE, "/environments/prod/", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _, _) =
        send(&app, Method::DELETE, "/environments/prod/", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    create_environment(&app, &token, "prod").await;
    for name in ["PORT", "HOST"] {
        let (status, _, body) = send(
            &app,
            Method::GET,
            &format!("/environments/prod/variables/{}", name),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Variable not found");
    }
}

#[tokio::test]
async fn test_delete_variable() {
    let app = app();
    let token = login_as(&app, "alice", "pw").await;
    create_environment(&app, &token, "prod").await;
    send(
        &app,
        Method::POST,
        "/environments/prod/variables/",
        Some(&token),
        Some(json!({"name": "PORT", "value": "80"})),
    )
    .await;

    let (status, _, _) = send(
        &app,
        Method::DELETE,
        "/environments/prod/variables/PORT",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(
        &app,
        Method::DELETE,
        "/environments/prod/variables/PORT",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_token_for_renamed_user_is_rejected() {
    let app = app();
    let token = login_as(&app, "alice", "pw").await;

    // Renaming the user orphans the token's subject
    let (_, _, list) = send(&app, Method::GET, "/users/", None, None).await;
    let id = list["results"][0]["id"].as_i64().unwrap();
    send(
        &app,
        Method::PUT,
        &format!("/users/{}/", id),
        None,
        Some(json!({"username": "alicia", "password": "pw"})),
    )
    .await;

    let (status, headers, body) =
        send(&app, Method::GET, "/environments/", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    assert_eq!(body["error"], "Could not validate credentials");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = app();
    let (status, _, doc) = send(&app, Method::GET, "/api-doc/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/environments/"].is_object());
}

/// Send a raw body with an optional content type
async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    token: &str,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_malformed_payloads_answer_422_with_error_body() {
    let app = app();
    let token = login_as(&app, "alice", "wonderland").await;

    let cases = [
        (Some("application/json"), "{}"),
        (Some("application/json"), "{not json"),
        (Some("application/json"), r#"{"name": 42}"#),
        (None, r#"{"name": "prod"}"#),
    ];
    for (content_type, body) in cases {
        let (status, headers, value) = send_raw(
            &app,
            Method::POST,
            "/environments/",
            &token,
            content_type,
            body,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body: {}", body);
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert!(value["error"].is_string(), "body: {}", body);
    }

    // Nothing was created by the rejected requests
    let (_, _, page) = send(&app, Method::GET, "/environments/", Some(&token), None).await;
    assert_eq!(page["count"], 0);
}

#[tokio::test]
async fn test_malformed_login_body_is_422() {
    let app = app();
    let (status, _, body) = send(
        &app,
        Method::POST,
        "/users/auth/login",
        None,
        Some(json!({"username": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn test_non_integer_user_id_is_422() {
    let app = app();
    let (status, _, body) = send(&app, Method::GET, "/users/abc/", None, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}
