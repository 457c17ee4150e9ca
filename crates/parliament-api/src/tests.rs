//! Router tests driving `api_router` over an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Method, Request, StatusCode, header},
};
use parliament_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  api_router(Arc::new(store))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  let resp = app
    .clone()
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();

  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
  };
  (status, value)
}

fn author() -> Value { json!({ "uid": "uid-1", "name": "Ms. Rivera" }) }

async fn create_session(app: &Router, title: &str, open: bool) -> Value {
  let (status, session) = send(
    app,
    Method::POST,
    "/sessions",
    Some(json!({
      "title":     title,
      "date":      "2025-05-12T10:00:00Z",
      "isOpen":    open,
      "createdBy": author(),
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{session}");
  session
}

async fn create_subject(app: &Router, date_id: &Value, title: &str) -> (StatusCode, Value) {
  send(
    app,
    Method::POST,
    "/subjects",
    Some(json!({ "title": title, "dateId": date_id, "createdBy": author() })),
  )
  .await
}

// ── Sessions and subjects ────────────────────────────────────────────────────

#[tokio::test]
async fn session_lifecycle_over_http() {
  let app = app().await;
  let session = create_session(&app, "May", false).await;
  let id = session["id"].as_str().unwrap().to_owned();
  assert_eq!(session["isOpen"], false);

  let (status, body) = create_subject(&app, &session["id"], "Too early").await;
  assert_eq!(status, StatusCode::CONFLICT, "{body}");
  assert!(body["error"].as_str().unwrap().contains("closed"));

  let (status, opened) = send(&app, Method::POST, &format!("/sessions/{id}/open"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(opened["isOpen"], true);

  let (_, open_list) = send(&app, Method::GET, "/sessions?open=true", None).await;
  assert_eq!(open_list.as_array().unwrap().len(), 1);

  let (status, subject) = create_subject(&app, &session["id"], "Bike racks").await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(subject["status"], "pending");
  assert_eq!(subject["statusReason"], "");
  assert_eq!(subject["dateTitle"], "May");
  assert_eq!(subject["notesCount"], 0);

  let (status, renamed) = send(
    &app,
    Method::PUT,
    &format!("/sessions/{id}/title"),
    Some(json!({ "title": "Late May" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(renamed["title"], "Late May");

  let subject_id = subject["id"].as_str().unwrap();
  let (_, subject) = send(&app, Method::GET, &format!("/subjects/{subject_id}"), None).await;
  assert_eq!(subject["dateTitle"], "Late May");

  let (status, _) = send(&app, Method::DELETE, &format!("/sessions/{id}"), None).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_ids_return_404() {
  let app = app().await;
  let missing = uuid::Uuid::new_v4();
  for uri in [
    format!("/sessions/{missing}"),
    format!("/subjects/{missing}"),
    format!("/subjects/{missing}/notes"),
    format!("/users/{missing}"),
  ] {
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    assert!(body["error"].is_string());
  }
}

#[tokio::test]
async fn status_outside_enumeration_is_rejected() {
  let app = app().await;
  let session = create_session(&app, "May", true).await;
  let (_, subject) = create_subject(&app, &session["id"], "Uniforms").await;
  let id = subject["id"].as_str().unwrap();

  let (status, _) = send(
    &app,
    Method::PUT,
    &format!("/subjects/{id}/status"),
    Some(json!({ "status": "archived" })),
  )
  .await;
  assert!(status.is_client_error(), "{status}");

  let (status, updated) = send(
    &app,
    Method::PUT,
    &format!("/subjects/{id}/status"),
    Some(json!({ "status": "rejected", "statusReason": "Dress code is fixed" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["status"], "rejected");
  assert_eq!(updated["statusReason"], "Dress code is fixed");

  let (_, rejected) = send(&app, Method::GET, "/subjects?status=rejected", None).await;
  assert_eq!(rejected.as_array().unwrap().len(), 1);
  let (_, approved) = send(&app, Method::GET, "/subjects?status=approved", None).await;
  assert!(approved.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn pending_status_drops_reason() {
  let app = app().await;
  let session = create_session(&app, "May", true).await;
  let (_, subject) = create_subject(&app, &session["id"], "Uniforms").await;
  let uri = format!("/subjects/{}/status", subject["id"].as_str().unwrap());

  send(
    &app,
    Method::PUT,
    &uri,
    Some(json!({ "status": "rejected", "statusReason": "Budget" })),
  )
  .await;
  let (status, updated) = send(
    &app,
    Method::PUT,
    &uri,
    Some(json!({ "status": "pending", "statusReason": "still here" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["status"], "pending");
  assert_eq!(updated["statusReason"], "");
}

#[tokio::test]
async fn far_future_session_date_is_bad_request() {
  let app = app().await;
  create_session(&app, "May", true).await;

  let (status, body) = send(
    &app,
    Method::POST,
    "/sessions",
    Some(json!({
      "title":     "Far",
      "date":      "+10000-01-01T00:00:00Z",
      "createdBy": author(),
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

  let (status, sessions) = send(&app, Method::GET, "/sessions", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(sessions.as_array().unwrap().len(), 1);
  let (status, _) = send(&app, Method::GET, "/integrity", None).await;
  assert_eq!(status, StatusCode::OK);
}

// ── Notes ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn notes_keep_count_and_integrity() {
  let app = app().await;
  let session = create_session(&app, "May", true).await;
  let (_, subject) = create_subject(&app, &session["id"], "Library hours").await;
  let id = subject["id"].as_str().unwrap();

  let mut note_ids = Vec::new();
  for text in ["Agree", "Disagree"] {
    let (status, note) = send(
      &app,
      Method::POST,
      &format!("/subjects/{id}/notes"),
      Some(json!({ "text": text, "createdBy": author() })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(note["subjectId"], id);
    note_ids.push(note["id"].as_str().unwrap().to_owned());
  }

  let (_, subject) = send(&app, Method::GET, &format!("/subjects/{id}"), None).await;
  assert_eq!(subject["notesCount"], 2);

  let (status, _) = send(&app, Method::DELETE, &format!("/notes/{}", note_ids[0]), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, notes) = send(&app, Method::GET, &format!("/subjects/{id}/notes"), None).await;
  assert_eq!(notes.as_array().unwrap().len(), 1);

  let (status, report) = send(&app, Method::GET, "/integrity", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(report["violations"], json!([]));
}

// ── Users ────────────────────────────────────────────────────────────────────

fn user_body(username: &str) -> Value {
  json!({
    "username":  username,
    "firstName": "Jane",
    "lastName":  "Doe",
    "role":      "student",
    "birthday":  "2011-04-09",
    "classId":   "6a",
    "password":  "correct horse",
  })
}

#[tokio::test]
async fn created_user_hides_hash_and_derives_lower() {
  let app = app().await;
  let (status, user) = send(&app, Method::POST, "/users", Some(user_body("JaneDoe"))).await;
  assert_eq!(status, StatusCode::CREATED, "{user}");
  assert_eq!(user["usernameLower"], "janedoe");
  assert_eq!(user["birthday"], "2011-04-09");
  assert!(user.get("passwordHash").is_none());
  assert!(user.get("password").is_none());

  let (status, found) = send(&app, Method::GET, "/users/by-username/JANEDOE", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(found["id"], user["id"]);

  let (status, _) = send(&app, Method::POST, "/users", Some(user_body("janedoe"))).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_role_is_rejected() {
  let app = app().await;
  let mut body = user_body("jane");
  body["role"] = json!("janitor");
  let (status, _) = send(&app, Method::POST, "/users", Some(body)).await;
  assert!(status.is_client_error(), "{status}");

  let (_, users) = send(&app, Method::GET, "/users", None).await;
  assert!(users.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn rename_and_change_role() {
  let app = app().await;
  let (_, user) = send(&app, Method::POST, "/users", Some(user_body("jane"))).await;
  let id = user["id"].as_str().unwrap();

  let (status, renamed) = send(
    &app,
    Method::PUT,
    &format!("/users/{id}/username"),
    Some(json!({ "username": "JaneD" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(renamed["usernameLower"], "janed");

  let (status, promoted) = send(
    &app,
    Method::PUT,
    &format!("/users/{id}/role"),
    Some(json!({ "role": "teacher" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(promoted["role"], "teacher");

  let (_, teachers) = send(&app, Method::GET, "/users?role=teacher", None).await;
  assert_eq!(teachers.as_array().unwrap().len(), 1);

  let (status, _) = send(&app, Method::DELETE, &format!("/users/{id}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(&app, Method::GET, &format!("/users/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}
