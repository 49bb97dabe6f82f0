//! Handlers for `/contacts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/contacts` | Optional `?text=`, `?groups=a,b`, `?tags=`, `?source=`, `?limit=`, `?offset=` |
//! | `POST`   | `/contacts` | Body: [`CreateContactBody`]; returns 201 |
//! | `GET`    | `/contacts/:id` | 404 if not found |
//! | `PATCH`  | `/contacts/:id` | Body: [`ContactPatch`]; absent = keep, `null` = clear |
//! | `DELETE` | `/contacts/:id` | Always 200; body reports whether a record was removed |
//! | `POST`   | `/contacts/delete` | Body: `{"ids":[...]}`; bulk delete |
//! | `POST`   | `/contacts/:id/interaction` | Body: `{"at":"..."}`, `at` optional |
//! | `POST`   | `/contacts/assign-group` etc. | Body: [`AssignGroupBody`] / [`AssignTagBody`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rehber_core::{
  contact::{Contact, ContactSource, NewContact},
  patch::ContactPatch,
  store::{ContactQuery, DirectoryStore},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Case-insensitive substring over name, phone, and email.
  pub text:   Option<String>,
  /// Comma-separated group ids; contact must be in at least one.
  pub groups: Option<String>,
  /// Comma-separated tag ids; contact must carry at least one.
  pub tags:   Option<String>,
  pub source: Option<ContactSource>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

fn parse_id_list(raw: Option<String>) -> Result<Vec<Uuid>, ApiError> {
  let Some(raw) = raw else { return Ok(Vec::new()) };
  raw
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(|s| {
      Uuid::parse_str(s).map_err(|_| ApiError::BadRequest(format!("invalid id: {s:?}")))
    })
    .collect()
}

/// `GET /contacts[?text=...][&groups=a,b][&tags=...][&source=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Contact>>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let query = ContactQuery {
    text:   params.text,
    groups: parse_id_list(params.groups)?,
    tags:   parse_id_list(params.tags)?,
    source: params.source,
    limit:  params.limit,
    offset: params.offset,
  };

  let contacts = store
    .list_contacts(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(contacts))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /contacts`.
#[derive(Debug, Deserialize)]
pub struct CreateContactBody {
  pub name:    String,
  pub phone:   String,
  pub email:   Option<String>,
  pub company: Option<String>,
  pub notes:   Option<String>,
  #[serde(default)]
  pub groups:  std::collections::BTreeSet<Uuid>,
  #[serde(default)]
  pub tags:    std::collections::BTreeSet<Uuid>,
  /// Defaults to `manual` — the API's callers are interactive surfaces.
  pub source:  Option<ContactSource>,
}

impl From<CreateContactBody> for NewContact {
  fn from(b: CreateContactBody) -> Self {
    NewContact {
      name:    b.name,
      phone:   b.phone,
      email:   b.email,
      company: b.company,
      notes:   b.notes,
      groups:  b.groups,
      tags:    b.tags,
      source:  b.source.unwrap_or(ContactSource::Manual),
    }
  }
}

/// `POST /contacts` — returns 201 + the stored [`Contact`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateContactBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.name.trim().is_empty() || body.phone.trim().is_empty() {
    return Err(ApiError::BadRequest(
      "name and phone are required".to_string(),
    ));
  }

  let contact = store
    .add_contact(NewContact::from(body))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(contact)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /contacts/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Contact>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let contact = store
    .get_contact(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))?;
  Ok(Json(contact))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /contacts/:id` — body is a [`ContactPatch`]: absent fields are
/// kept, `null` clears, values replace.
pub async fn update_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<ContactPatch>,
) -> Result<Json<Contact>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let contact = store
    .update_contact(id, patch)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))?;
  Ok(Json(contact))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /contacts/:id` — deleting an absent contact is a soft no-op.
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let deleted = store
    .delete_contact(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(json!({ "deleted": deleted })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteManyBody {
  pub ids: Vec<Uuid>,
}

/// `POST /contacts/delete` — bulk delete; absent ids are ignored.
pub async fn delete_many<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<DeleteManyBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let deleted = store
    .delete_contacts(&body.ids)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(json!({ "deleted": deleted })))
}

// ─── Interaction ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct InteractionBody {
  /// Defaults to the server's current time.
  pub at: Option<DateTime<Utc>>,
}

/// `POST /contacts/:id/interaction` — messaging collaborators call this
/// after a send to stamp `last_interaction`.
pub async fn record_interaction<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<InteractionBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let at = body.at.unwrap_or_else(Utc::now);
  let recorded = store
    .record_interaction(id, at)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !recorded {
    return Err(ApiError::NotFound(format!("contact {id} not found")));
  }
  Ok(Json(json!({ "recorded_at": at })))
}

// ─── Bulk membership ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AssignGroupBody {
  pub contact_ids: Vec<Uuid>,
  pub group_id:    Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AssignTagBody {
  pub contact_ids: Vec<Uuid>,
  pub tag_id:      Uuid,
}

/// `POST /contacts/assign-group`
pub async fn assign_group<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<AssignGroupBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let affected = store
    .assign_group(&body.contact_ids, body.group_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(json!({ "affected": affected })))
}

/// `POST /contacts/unassign-group`
pub async fn unassign_group<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<AssignGroupBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let affected = store
    .unassign_group(&body.contact_ids, body.group_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(json!({ "affected": affected })))
}

/// `POST /contacts/assign-tag`
pub async fn assign_tag<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<AssignTagBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let affected = store
    .assign_tag(&body.contact_ids, body.tag_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(json!({ "affected": affected })))
}

/// `POST /contacts/unassign-tag`
pub async fn unassign_tag<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<AssignTagBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let affected = store
    .unassign_tag(&body.contact_ids, body.tag_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(json!({ "affected": affected })))
}
