//! Handlers for `/tags` endpoints — mirror of the group handlers.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use rehber_core::{
  contact::{NewTag, Tag},
  patch::TagPatch,
  store::DirectoryStore,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /tags`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Tag>>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let tags = store
    .list_tags()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(tags))
}

/// `POST /tags` — body: `{"name":"...","color":"#..."}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(draft): Json<NewTag>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if draft.name.trim().is_empty() {
    return Err(ApiError::BadRequest("tag name is required".to_string()));
  }

  let tag = store
    .add_tag(draft)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(tag)))
}

/// `GET /tags/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Tag>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let tag = store
    .get_tag(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("tag {id} not found")))?;
  Ok(Json(tag))
}

/// `PATCH /tags/:id`
pub async fn update_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<TagPatch>,
) -> Result<Json<Tag>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let tag = store
    .update_tag(id, patch)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("tag {id} not found")))?;
  Ok(Json(tag))
}

/// `DELETE /tags/:id` — removes the tag and every membership referencing it
/// in one logical step.
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let deleted = store
    .delete_tag(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(json!({ "deleted": deleted })))
}
