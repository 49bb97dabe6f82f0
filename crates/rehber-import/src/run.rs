//! The batch pipeline: parse → normalise → resolve → commit, row by row.

use rehber_core::store::DirectoryStore;
use rehber_csv::RejectReason;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resolve::{Resolution, resolve};

// ─── Reporting types ─────────────────────────────────────────────────────────

/// One rejected row: its 1-based ordinal among the file's data rows, and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowRejection {
  pub row:    usize,
  pub reason: RejectReason,
}

/// What a committed batch did.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ImportSummary {
  /// Rows that created a new contact.
  pub imported: usize,
  /// Rows that merged into an existing contact (phone match).
  pub merged:   usize,
  pub rejected: Vec<RowRejection>,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A batch-level failure. Per-row problems are collected in
/// [`ImportSummary::rejected`] instead; only a batch that cannot produce a
/// single contact surfaces as an error.
#[derive(Debug, Error)]
pub enum ImportError<E>
where
  E: std::error::Error + Send + Sync + 'static,
{
  #[error("csv parse error: {0}")]
  Csv(#[from] rehber_csv::Error),

  #[error("no valid contact records found in input")]
  NoValidRecords { rejected: Vec<RowRejection> },

  #[error("store error: {0}")]
  Store(E),
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Import a CSV payload into `store`.
///
/// Rows commit sequentially, so a phone number appearing twice in one file
/// resolves to one insert followed by merges, and running the same file
/// again merges every row (idempotence). Rejected rows never abort the
/// batch; a batch in which *no* row commits is an error.
pub async fn import_csv<S>(
  store: &S,
  input: &str,
) -> Result<ImportSummary, ImportError<S::Error>>
where
  S: DirectoryStore,
{
  let rows = rehber_csv::parse_rows(input)?;
  let mut summary = ImportSummary::default();

  for row in &rows {
    let draft = match rehber_csv::normalize(row) {
      Ok(draft) => draft,
      Err(reason) => {
        tracing::debug!(row = row.record, %reason, "row rejected");
        summary.rejected.push(RowRejection {
          row: row.record,
          reason,
        });
        continue;
      }
    };

    let existing = store
      .find_by_phone(&draft.phone)
      .await
      .map_err(ImportError::Store)?;

    match resolve(draft, existing.as_ref()) {
      Resolution::Insert(draft) => {
        store.add_contact(draft).await.map_err(ImportError::Store)?;
        summary.imported += 1;
      }
      Resolution::Merge { contact_id, patch } => {
        let updated = store
          .update_contact(contact_id, patch)
          .await
          .map_err(ImportError::Store)?;
        if updated.is_some() {
          summary.merged += 1;
        } else {
          // The matched contact disappeared between lookup and commit;
          // nothing sensible to write.
          tracing::warn!(row = row.record, %contact_id, "merge target vanished");
        }
      }
    }
  }

  if summary.imported + summary.merged == 0 {
    return Err(ImportError::NoValidRecords {
      rejected: summary.rejected,
    });
  }

  tracing::info!(
    imported = summary.imported,
    merged = summary.merged,
    rejected = summary.rejected.len(),
    "import batch committed"
  );
  Ok(summary)
}
