//! Handlers for `/subjects` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/subjects` | Optional `?date_id=&status=&created_by_uid=` |
//! | `POST`   | `/subjects` | Body: [`NewSubject`]; 409 if the session is closed |
//! | `GET`    | `/subjects/:id` | 404 if not found |
//! | `DELETE` | `/subjects/:id` | Also deletes its notes |
//! | `PUT`    | `/subjects/:id/status` | Body: `{"status":"approved","statusReason":"..."}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use parliament_core::{
  store::{ParliamentStore, SubjectQuery},
  subject::{NewSubject, Subject, SubjectStatus},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /subjects[?date_id=...][&status=...][&created_by_uid=...]`
pub async fn list<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Query(query): Query<SubjectQuery>,
) -> Result<Json<Vec<Subject>>, ApiError> {
  let subjects = store.list_subjects(&query).await.map_err(ApiError::store)?;
  Ok(Json(subjects))
}

/// `POST /subjects` — returns 201 + the stored pending [`Subject`].
pub async fn create<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewSubject>,
) -> Result<impl IntoResponse, ApiError> {
  let subject = store.submit_subject(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(subject)))
}

/// `GET /subjects/:id`
pub async fn get_one<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Subject>, ApiError> {
  let subject = store
    .get_subject(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("subject {id} not found")))?;
  Ok(Json(subject))
}

/// `DELETE /subjects/:id`
pub async fn delete_one<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_subject(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
  pub status:        SubjectStatus,
  #[serde(default)]
  pub status_reason: String,
}

/// `PUT /subjects/:id/status`
pub async fn set_status<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Subject>, ApiError> {
  let subject = store
    .set_subject_status(id, body.status, body.status_reason)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(subject))
}
