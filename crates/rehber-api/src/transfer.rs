//! Handlers for `/import` and `/export`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/import` | Raw CSV body; returns an [`ImportSummary`] |
//! | `GET`  | `/export` | `?format=csv\|json`, default CSV; never mutates |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::header,
  response::{IntoResponse, Response},
};
use rehber_core::store::{ContactQuery, DirectoryStore};
use rehber_import::{ImportError, ImportSummary, import_csv};
use serde::Deserialize;

use crate::error::ApiError;

// ─── Import ──────────────────────────────────────────────────────────────────

/// `POST /import` — the request body is the CSV file contents.
///
/// Per-row rejections ride inside the 200 summary; a batch that commits
/// nothing (parse failure or zero valid rows) is a 400.
pub async fn import<S>(
  State(store): State<Arc<S>>,
  body: String,
) -> Result<Json<ImportSummary>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  match import_csv(store.as_ref(), &body).await {
    Ok(summary) => Ok(Json(summary)),
    Err(ImportError::Csv(e)) => {
      Err(ApiError::BadRequest(format!("csv parse error: {e}")))
    }
    Err(ImportError::NoValidRecords { rejected }) => {
      Err(ApiError::NoValidRecords { rejected })
    }
    Err(ImportError::Store(e)) => Err(ApiError::Store(Box::new(e))),
  }
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
  #[default]
  Csv,
  Json,
}

#[derive(Debug, Deserialize, Default)]
pub struct ExportParams {
  #[serde(default)]
  pub format: ExportFormat,
}

/// `GET /export?format=csv|json` — serialises the full contact collection.
pub async fn export<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ExportParams>,
) -> Result<Response, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let contacts = store
    .list_contacts(&ContactQuery::default())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let response = match params.format {
    ExportFormat::Csv => (
      [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
      rehber_csv::to_csv(&contacts),
    )
      .into_response(),
    ExportFormat::Json => (
      [(header::CONTENT_TYPE, "application/json")],
      rehber_csv::to_json(&contacts)?,
    )
      .into_response(),
  };

  Ok(response)
}
