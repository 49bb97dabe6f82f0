//! Export serialisation — contacts out to CSV or JSON.
//!
//! CSV uses the same fixed column order as the import template; ids,
//! memberships, and timestamps are deliberately not part of the CSV shape
//! (re-import assigns fresh ids). JSON carries the full entities.

use std::borrow::Cow;

use rehber_core::contact::Contact;

use crate::{error::Result, normalize::columns};

/// Column order of the CSV export, matching the import template.
pub const EXPORT_COLUMNS: [&str; 5] = [
  columns::NAME,
  columns::PHONE,
  columns::EMAIL,
  columns::COMPANY,
  columns::NOTES,
];

// ─── CSV ─────────────────────────────────────────────────────────────────────

/// Serialise contacts as CSV. Absent optional fields render as empty cells.
pub fn to_csv(contacts: &[Contact]) -> String {
  let mut out = String::new();
  out.push_str(&EXPORT_COLUMNS.join(","));
  out.push_str("\r\n");

  for contact in contacts {
    let cells = [
      contact.name.as_str(),
      contact.phone.as_str(),
      contact.email.as_deref().unwrap_or(""),
      contact.company.as_deref().unwrap_or(""),
      contact.notes.as_deref().unwrap_or(""),
    ];
    let line: Vec<Cow<'_, str>> = cells.iter().map(|c| escape(c)).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
  }

  out
}

/// Quote a field when it contains a separator, quote, or line break.
fn escape(field: &str) -> Cow<'_, str> {
  if field.contains(['"', ',', '\n', '\r']) {
    Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
  } else {
    Cow::Borrowed(field)
  }
}

// ─── JSON ────────────────────────────────────────────────────────────────────

/// Serialise the full contact entities (ids, memberships, RFC 3339
/// timestamps included) as a pretty-printed JSON array.
pub fn to_json(contacts: &[Contact]) -> Result<String> {
  Ok(serde_json::to_string_pretty(contacts)?)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use crate::test_helpers::make_contact as contact;

  use super::*;

  #[test]
  fn header_and_empty_cells() {
    let csv = to_csv(&[contact("Jane", "+9055")]);
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Ad Soyad,Telefon,E-posta,Şirket,Notlar"));
    assert_eq!(lines.next(), Some("Jane,+9055,,,"));
  }

  #[test]
  fn fields_needing_quotes_are_escaped() {
    let mut c = contact("Doe, John", "+9055");
    c.notes = Some("said \"hi\"\nthen left".to_string());
    let csv = to_csv(&[c]);
    assert!(csv.contains("\"Doe, John\""));
    assert!(csv.contains("\"said \"\"hi\"\"\nthen left\""));
  }

  #[test]
  fn json_is_an_array_with_iso_timestamps() {
    let json = to_json(&[contact("Jane", "+9055")]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let first = &value.as_array().unwrap()[0];
    assert_eq!(first["name"], "Jane");
    assert_eq!(first["source"], "manual");
    assert!(
      first["created_at"]
        .as_str()
        .unwrap()
        .starts_with("2024-06-01T00:00:00")
    );
  }
}
