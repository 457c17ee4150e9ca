//! Handlers for `/sessions` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/sessions` | Optional `?open=true` |
//! | `POST`   | `/sessions` | Body: [`NewSession`]; returns 201 |
//! | `GET`    | `/sessions/:id` | 404 if not found |
//! | `DELETE` | `/sessions/:id` | 409 while subjects reference it |
//! | `POST`   | `/sessions/:id/open`, `/sessions/:id/close` | Toggle `isOpen` |
//! | `PUT`    | `/sessions/:id/title` | Body: `{"title":"..."}`; also retitles subjects |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use parliament_core::{
  session::{NewSession, Session},
  store::ParliamentStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// If `true`, only sessions currently accepting subjects.
  #[serde(default)]
  pub open: bool,
}

/// `GET /sessions[?open=true]`
pub async fn list<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Session>>, ApiError> {
  let sessions = store
    .list_sessions(params.open)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(sessions))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /sessions`
pub async fn create<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewSession>,
) -> Result<impl IntoResponse, ApiError> {
  let session = store.create_session(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(session)))
}

// ─── Get / delete ─────────────────────────────────────────────────────────────

/// `GET /sessions/:id`
pub async fn get_one<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
  let session = store
    .get_session(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("session {id} not found")))?;
  Ok(Json(session))
}

/// `DELETE /sessions/:id`
pub async fn delete_one<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_session(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Open / close ─────────────────────────────────────────────────────────────

/// `POST /sessions/:id/open`
pub async fn open<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
  let session = store
    .set_session_open(id, true)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(session))
}

/// `POST /sessions/:id/close`
pub async fn close<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
  let session = store
    .set_session_open(id, false)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(session))
}

// ─── Rename ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TitleBody {
  pub title: String,
}

/// `PUT /sessions/:id/title` — body: `{"title":"..."}`
pub async fn rename<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<TitleBody>,
) -> Result<Json<Session>, ApiError> {
  let session = store
    .rename_session(id, body.title)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(session))
}
