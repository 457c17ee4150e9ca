//! Handlers for `/users` endpoints.
//!
//! Responses use [`UserView`], which never includes `passwordHash`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/users` | Optional `?role=admin\|teacher\|student\|kiosk` |
//! | `POST`   | `/users` | Body: [`CreateUserBody`]; plaintext password is hashed here |
//! | `GET`    | `/users/:id` | 404 if not found |
//! | `DELETE` | `/users/:id` | |
//! | `GET`    | `/users/by-username/:username` | Case-insensitive |
//! | `PUT`    | `/users/:id/username` | Body: `{"username":"..."}`; 409 if taken |
//! | `PUT`    | `/users/:id/role` | Body: `{"role":"teacher"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use parliament_core::{
  store::ParliamentStore,
  user::{AppUser, NewUser, Role},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, password::hash_password_blocking};

// ─── Public view ──────────────────────────────────────────────────────────────

/// An [`AppUser`] without its password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
  pub id:             Uuid,
  pub username:       String,
  pub username_lower: String,
  pub first_name:     String,
  pub last_name:      String,
  pub role:           Role,
  pub birthday:       Option<NaiveDate>,
  pub class_id:       Option<String>,
  pub created_at:     DateTime<Utc>,
  pub email:          Option<String>,
  pub uid:            Option<String>,
}

impl From<AppUser> for UserView {
  fn from(u: AppUser) -> Self {
    UserView {
      id:             u.id,
      username:       u.username,
      username_lower: u.username_lower,
      first_name:     u.first_name,
      last_name:      u.last_name,
      role:           u.role,
      birthday:       u.birthday,
      class_id:       u.class_id,
      created_at:     u.created_at,
      email:          u.email,
      uid:            u.uid,
    }
  }
}

fn not_found(what: impl std::fmt::Display) -> ApiError {
  ApiError::NotFound(format!("user {what} not found"))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub role: Option<Role>,
}

/// `GET /users[?role=<role>]`
pub async fn list<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<UserView>>, ApiError> {
  let users = store.list_users(params.role).await.map_err(ApiError::store)?;
  Ok(Json(users.into_iter().map(UserView::from).collect()))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /users`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
  pub username:   String,
  pub first_name: String,
  pub last_name:  String,
  pub role:       Role,
  pub birthday:   Option<NaiveDate>,
  pub class_id:   Option<String>,
  /// Plaintext; hashed with argon2 before it reaches the store.
  pub password:   String,
  pub email:      Option<String>,
  pub uid:        Option<String>,
}

/// `POST /users` — returns 201 + the stored user.
pub async fn create<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateUserBody>,
) -> Result<impl IntoResponse, ApiError> {
  let password_hash = hash_password_blocking(body.password).await?;

  let input = NewUser {
    username: body.username,
    first_name: body.first_name,
    last_name: body.last_name,
    role: body.role,
    birthday: body.birthday,
    class_id: body.class_id,
    password_hash,
    email: body.email,
    uid: body.uid,
  };

  let user = store.create_user(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(UserView::from(user))))
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /users/:id`
pub async fn get_one<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<UserView>, ApiError> {
  let user = store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(user.into()))
}

/// `GET /users/by-username/:username`
pub async fn by_username<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Path(username): Path<String>,
) -> Result<Json<UserView>, ApiError> {
  let user = store
    .find_user_by_username(&username)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(format!("{username:?}")))?;
  Ok(Json(user.into()))
}

// ─── Updates ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UsernameBody {
  pub username: String,
}

/// `PUT /users/:id/username`
pub async fn rename<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UsernameBody>,
) -> Result<Json<UserView>, ApiError> {
  let user = store
    .rename_user(id, body.username)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
pub struct RoleBody {
  pub role: Role,
}

/// `PUT /users/:id/role`
pub async fn set_role<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RoleBody>,
) -> Result<Json<UserView>, ApiError> {
  let user = store
    .set_user_role(id, body.role)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(user.into()))
}

/// `DELETE /users/:id`
pub async fn delete_one<S: ParliamentStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_user(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
