//! Handler for `GET /integrity`.

use std::sync::Arc;

use axum::{Json, extract::State};
use parliament_core::{
  integrity::{self, IntegrityReport},
  store::ParliamentStore,
};

use crate::error::ApiError;

/// `GET /integrity` — check every cross-record invariant over a snapshot.
pub async fn handler<S: ParliamentStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<IntegrityReport>, ApiError> {
  let snapshot = store.snapshot().await.map_err(ApiError::store)?;
  let report = integrity::check(&snapshot);
  if !report.is_clean() {
    tracing::warn!(violations = report.violations.len(), "integrity check failed");
  }
  Ok(Json(report))
}
