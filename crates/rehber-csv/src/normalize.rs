//! Record normalisation — one raw CSV row in, one contact draft (or a
//! rejection reason) out.
//!
//! The column names are the Turkish labels of the published import template.
//! Phone numbers are carried through trimmed but otherwise untouched; the
//! directory's dedup key is the exact string.

use rehber_core::contact::{ContactSource, NewContact};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parse::Row;

// ─── Columns ─────────────────────────────────────────────────────────────────

/// Header names recognised by the importer.
pub mod columns {
  pub const NAME: &str = "Ad Soyad";
  pub const PHONE: &str = "Telefon";
  pub const EMAIL: &str = "E-posta";
  pub const COMPANY: &str = "Şirket";
  pub const NOTES: &str = "Notlar";
}

// ─── Rejection ───────────────────────────────────────────────────────────────

/// Why a row was rejected. Recorded per row; never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum RejectReason {
  #[error("missing_required_field: {column}")]
  MissingRequiredField { column: String },
}

// ─── Normaliser ──────────────────────────────────────────────────────────────

/// Shape a raw row into a contact draft with `source = Import`.
///
/// Required cells (name, phone) must be present and non-blank after
/// trimming. Optional cells pass through trimmed when non-blank and are
/// omitted otherwise — an empty optional cell never clears anything
/// downstream.
pub fn normalize(row: &Row) -> Result<NewContact, RejectReason> {
  let name = required(row, columns::NAME)?;
  let phone = required(row, columns::PHONE)?;

  let mut draft = NewContact::new(name, phone, ContactSource::Import);
  draft.email = optional(row, columns::EMAIL);
  draft.company = optional(row, columns::COMPANY);
  draft.notes = optional(row, columns::NOTES);
  Ok(draft)
}

fn required(row: &Row, column: &str) -> Result<String, RejectReason> {
  match row.get(column).map(str::trim) {
    Some(v) if !v.is_empty() => Ok(v.to_string()),
    _ => Err(RejectReason::MissingRequiredField {
      column: column.to_string(),
    }),
  }
}

fn optional(row: &Row, column: &str) -> Option<String> {
  row
    .get(column)
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(str::to_string)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse::parse_rows;

  fn single_row(csv: &str) -> Row {
    parse_rows(csv).unwrap().into_iter().next().unwrap()
  }

  #[test]
  fn full_row_normalises() {
    let row = single_row(
      "Ad Soyad,Telefon,E-posta,Şirket,Notlar\n\
       John Doe,+905321234567,john@example.com,ABC Şirketi,VIP Müşteri\n",
    );
    let draft = normalize(&row).expect("should normalise");
    assert_eq!(draft.name, "John Doe");
    assert_eq!(draft.phone, "+905321234567");
    assert_eq!(draft.email.as_deref(), Some("john@example.com"));
    assert_eq!(draft.company.as_deref(), Some("ABC Şirketi"));
    assert_eq!(draft.notes.as_deref(), Some("VIP Müşteri"));
    assert_eq!(draft.source, ContactSource::Import);
    assert!(draft.groups.is_empty());
    assert!(draft.tags.is_empty());
  }

  #[test]
  fn cells_are_trimmed() {
    let row =
      single_row("Ad Soyad,Telefon\n  Jane Doe , +90 532 000 00 00 \n");
    let draft = normalize(&row).unwrap();
    assert_eq!(draft.name, "Jane Doe");
    assert_eq!(draft.phone, "+90 532 000 00 00");
  }

  #[test]
  fn blank_optionals_are_omitted() {
    let row =
      single_row("Ad Soyad,Telefon,E-posta,Şirket\nJane,+9055,  ,\n");
    let draft = normalize(&row).unwrap();
    assert_eq!(draft.email, None);
    assert_eq!(draft.company, None);
    assert_eq!(draft.notes, None);
  }

  #[test]
  fn missing_phone_rejects() {
    let row = single_row("Ad Soyad,Telefon\nJane,\n");
    let err = normalize(&row).unwrap_err();
    assert_eq!(
      err,
      RejectReason::MissingRequiredField {
        column: columns::PHONE.to_string()
      }
    );
  }

  #[test]
  fn missing_name_column_rejects() {
    let row = single_row("Telefon\n+905321234567\n");
    let err = normalize(&row).unwrap_err();
    assert_eq!(
      err,
      RejectReason::MissingRequiredField {
        column: columns::NAME.to_string()
      }
    );
  }
}
