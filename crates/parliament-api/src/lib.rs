//! JSON REST API for the parliament store.
//!
//! Exposes an axum [`Router`] backed by any
//! [`parliament_core::store::ParliamentStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", parliament_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod integrity;
pub mod notes;
pub mod password;
pub mod sessions;
pub mod subjects;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use parliament_core::store::ParliamentStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ParliamentStore + 'static,
{
  Router::new()
    // Sessions
    .route("/sessions", get(sessions::list::<S>).post(sessions::create::<S>))
    .route(
      "/sessions/{id}",
      get(sessions::get_one::<S>).delete(sessions::delete_one::<S>),
    )
    .route("/sessions/{id}/open", post(sessions::open::<S>))
    .route("/sessions/{id}/close", post(sessions::close::<S>))
    .route("/sessions/{id}/title", put(sessions::rename::<S>))
    // Subjects
    .route("/subjects", get(subjects::list::<S>).post(subjects::create::<S>))
    .route(
      "/subjects/{id}",
      get(subjects::get_one::<S>).delete(subjects::delete_one::<S>),
    )
    .route("/subjects/{id}/status", put(subjects::set_status::<S>))
    // Notes
    .route("/subjects/{id}/notes", get(notes::list::<S>).post(notes::create::<S>))
    .route("/notes/{id}", delete(notes::delete_one::<S>))
    // Users
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route("/users/by-username/{username}", get(users::by_username::<S>))
    .route("/users/{id}", get(users::get_one::<S>).delete(users::delete_one::<S>))
    .route("/users/{id}/username", put(users::rename::<S>))
    .route("/users/{id}/role", put(users::set_role::<S>))
    // Integrity
    .route("/integrity", get(integrity::handler::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests;
