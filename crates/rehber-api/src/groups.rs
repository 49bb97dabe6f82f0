//! Handlers for `/groups` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/groups` | All groups, creation order |
//! | `POST`   | `/groups` | Body: [`NewGroup`]; returns 201 |
//! | `GET`    | `/groups/:id` | 404 if not found |
//! | `PATCH`  | `/groups/:id` | Body: [`GroupPatch`] |
//! | `DELETE` | `/groups/:id` | Cascades membership pruning |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use rehber_core::{
  contact::{Group, NewGroup},
  patch::GroupPatch,
  store::DirectoryStore,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /groups`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Group>>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let groups = store
    .list_groups()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(groups))
}

/// `POST /groups` — body: `{"name":"...","color":"#...","description":"..."}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(draft): Json<NewGroup>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if draft.name.trim().is_empty() {
    return Err(ApiError::BadRequest("group name is required".to_string()));
  }

  let group = store
    .add_group(draft)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(group)))
}

/// `GET /groups/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Group>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let group = store
    .get_group(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("group {id} not found")))?;
  Ok(Json(group))
}

/// `PATCH /groups/:id`
pub async fn update_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<GroupPatch>,
) -> Result<Json<Group>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let group = store
    .update_group(id, patch)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("group {id} not found")))?;
  Ok(Json(group))
}

/// `DELETE /groups/:id` — removes the group and every membership referencing
/// it in one logical step.
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let deleted = store
    .delete_group(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(json!({ "deleted": deleted })))
}
