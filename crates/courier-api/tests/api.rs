use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use courier_api::auth::AppStateInner;
use courier_api::router;
use courier_api::token::TokenIssuer;
use courier_db::Database;

fn app() -> Router {
    let state = Arc::new(AppStateInner {
        db: Database::open_in_memory().expect("in-memory db"),
        tokens: TokenIssuer::new(b"integration-secret", chrono::Duration::minutes(300)),
    });
    router(state)
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

/// Registers and logs in, returning `(id, token)`.
async fn signup(app: &Router, username: &str) -> (i64, String) {
    let creds = json!({ "username": username, "password": "pa55word" });
    let (status, body) = call(app, Method::POST, "/users", None, Some(creds.clone())).await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    let id = body["id"].as_i64().expect("id");

    let (status, body) = call(app, Method::POST, "/login", None, Some(creds)).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    assert_eq!(body["id"].as_i64(), Some(id));
    (id, body["token"].as_str().expect("token").to_string())
}

async fn send(app: &Router, token: &str, sender: i64, recipient: i64, content: Value) -> (StatusCode, Value) {
    call(
        app,
        Method::POST,
        "/messages",
        Some(token),
        Some(json!({ "sender": sender, "recipient": recipient, "content": content })),
    )
    .await
}

async fn inbox(app: &Router, token: &str, query: &str) -> (StatusCode, Value) {
    call(app, Method::GET, &format!("/messages?{query}"), Some(token), None).await
}

#[tokio::test]
async fn health_check_reports_ok() {
    let app = app();
    let (status, body) = call(&app, Method::POST, "/check", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "health": "ok" }));
}

#[tokio::test]
async fn user_registration_rules() {
    let app = app();
    let (status, body) = call(&app, Method::POST, "/users", None, Some(json!({ "username": "solo" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "error missing argument");

    let long = "x".repeat(51);
    let (status, body) = call(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({ "username": long, "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "error username exceed size limit");

    let (status, body) = call(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({ "username": "extra", "password": "pw", "nickname": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["id"].as_i64().is_some());

    signup(&app, "taken").await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({ "username": "taken", "password": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username taken");
}

#[tokio::test]
async fn login_failures_are_bad_requests() {
    let app = app();
    signup(&app, "ivy").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "ivy", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Wrong password");

    let (status, body) = call(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "ghost", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User does not exist");
}

#[tokio::test]
async fn inboxes_reconstruct_every_message_type() {
    let app = app();
    let (a, token_a) = signup(&app, "alice").await;
    let (b, token_b) = signup(&app, "bob").await;

    let contents = [
        json!({ "type": "text", "text": "hello bob" }),
        json!({ "type": "image", "width": 640, "height": 480, "url": "https://img.example/cat.png" }),
        json!({ "type": "video", "source": "youtube", "url": "https://youtu.be/abc" }),
    ];
    let mut sent_ids = Vec::new();
    for content in &contents {
        let (status, body) = send(&app, &token_a, a, b, content.clone()).await;
        assert_eq!(status, StatusCode::OK, "send failed: {body}");
        assert!(body["Timestamp"].as_str().is_some_and(|t| !t.is_empty()));
        sent_ids.push(body["Id"].as_i64().expect("Id"));
    }
    let (status, _) = send(&app, &token_b, b, a, json!({ "type": "text", "text": "hi alice" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = inbox(&app, &token_b, &format!("recipient={b}&start=1")).await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().expect("messages");
    assert_eq!(messages.len(), 3);
    for ((msg, content), id) in messages.iter().zip(&contents).zip(&sent_ids) {
        assert_eq!(msg["id"].as_i64(), Some(*id));
        assert_eq!(msg["sender"].as_i64(), Some(a));
        assert_eq!(msg["recipient"].as_i64(), Some(b));
        assert_eq!(&msg["content"], content);
    }

    let (status, body) = inbox(&app, &token_a, &format!("recipient={a}&start=1")).await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().expect("messages");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], json!({ "type": "text", "text": "hi alice" }));
}

#[tokio::test]
async fn cursor_pagination_pages_forward() {
    let app = app();
    let (a, token_a) = signup(&app, "alice").await;
    let (b, token_b) = signup(&app, "bob").await;
    for i in 0..5 {
        let (status, _) = send(&app, &token_a, a, b, json!({ "type": "text", "text": format!("m{i}") })).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, first) = inbox(&app, &token_b, &format!("recipient={b}&start=1&limit=2")).await;
    let first = first["messages"].as_array().expect("messages").clone();
    assert_eq!(first.len(), 2);

    let next = first[1]["id"].as_i64().expect("id") + 1;
    let (_, rest) = inbox(&app, &token_b, &format!("recipient={b}&start={next}&limit=junk")).await;
    let rest = rest["messages"].as_array().expect("messages").clone();
    assert_eq!(rest.len(), 3);
    assert_eq!(rest[0]["content"]["text"], "m2");
    assert!(rest.iter().all(|m| m["id"].as_i64().unwrap() >= next));

    let (status, body) = inbox(&app, &token_b, &format!("recipient={b}&start=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "error missing argument");
}

#[tokio::test]
async fn token_for_another_user_writes_nothing() {
    let app = app();
    let (a, token_a) = signup(&app, "mallory").await;
    let (b, token_b) = signup(&app, "victim").await;

    // Mallory's token, claiming to be the victim.
    let (status, body) = send(&app, &token_a, b, a, json!({ "type": "text", "text": "spoof" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("ID in token doesn't match"));

    let (_, body) = inbox(&app, &token_a, &format!("recipient={a}&start=1")).await;
    assert_eq!(body["messages"], json!([]));

    // Reading someone else's inbox is refused as well.
    let (status, _) = inbox(&app, &token_a, &format!("recipient={b}&start=1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = inbox(&app, &token_b, &format!("recipient={b}&start=1")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = app();
    let (a, _) = signup(&app, "nina").await;

    let (status, body) = call(&app, Method::GET, &format!("/messages?recipient={a}&start=1"), None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing bearer token");

    let (status, body) = inbox(&app, "not.a.jwt", &format!("recipient={a}&start=1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn rejected_content_is_reported() {
    let app = app();
    let (a, token_a) = signup(&app, "otto").await;
    let (b, _) = signup(&app, "pia").await;

    let (status, body) = send(
        &app,
        &token_a,
        a,
        b,
        json!({ "type": "video", "source": "dailymotion", "url": "https://dm/x" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "error video source not supported");

    let (status, body) = send(&app, &token_a, a, b, json!({ "type": "text", "text": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "error missing argument");

    let (status, body) = send(&app, &token_a, a, b, json!({ "type": "sticker" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "error type of message not supported");

    let (status, body) = send(&app, &token_a, a, 9999, json!({ "type": "text", "text": "?" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Sender or recipient does not exist");

    let (status, body) = call(
        &app,
        Method::POST,
        "/messages",
        Some(&token_a),
        Some(json!("not an object")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("error malformed request"));
}
