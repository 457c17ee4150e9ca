//! Handlers for notes.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/subjects/:id/notes` | 404 if the subject does not exist |
//! | `POST`   | `/subjects/:id/notes` | Body: [`NoteBody`]; returns 201 |
//! | `DELETE` | `/notes/:id` | Decrements the subject's `notesCount` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use parliament_core::{
  CreatedBy,
  note::{NewNote, Note},
  store::ParliamentStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /subjects/:id/notes`
pub async fn list<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Path(subject_id): Path<Uuid>,
) -> Result<Json<Vec<Note>>, ApiError> {
  store
    .get_subject(subject_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("subject {subject_id} not found")))?;

  let notes = store.list_notes(subject_id).await.map_err(ApiError::store)?;
  Ok(Json(notes))
}

/// JSON body accepted by `POST /subjects/:id/notes`; the subject comes from
/// the path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteBody {
  pub text:       String,
  pub created_by: CreatedBy,
}

/// `POST /subjects/:id/notes`
pub async fn create<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Path(subject_id): Path<Uuid>,
  Json(body): Json<NoteBody>,
) -> Result<impl IntoResponse, ApiError> {
  let note = store
    .add_note(NewNote::new(subject_id, body.text, body.created_by))
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(note)))
}

/// `DELETE /notes/:id`
pub async fn delete_one<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_note(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
