//! Record schemas and trait definitions for the parliament store.
//!
//! Sessions, subjects, notes and users are plain serde records whose field
//! names match the document shape consumed by the web client. This crate has
//! no HTTP or database dependencies; backends implement
//! [`store::ParliamentStore`] and keep the denormalized fields in sync.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod integrity;
pub mod note;
pub mod session;
pub mod store;
pub mod subject;
pub mod user;
pub mod validate;

pub use error::{Classify, Error, ErrorKind, Result};

use serde::{Deserialize, Serialize};

/// The denormalized author reference carried by sessions, subjects and notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBy {
  /// External auth-provider identity of the author.
  pub uid:  String,
  /// Display name at the time of writing; not refreshed afterwards.
  pub name: String,
}

impl CreatedBy {
  pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
    Self { uid: uid.into(), name: name.into() }
  }
}
