//! CSV import/export codec for rehber.
//!
//! Converts between tabular text and [`rehber_core`] domain types. Pure
//! synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use rehber_csv::{normalize, parse_rows};
//!
//! let csv = "Ad Soyad,Telefon\r\nJohn Doe,+905321234567\r\n";
//! for row in parse_rows(csv).unwrap() {
//!   match normalize(&row) {
//!     Ok(draft) => println!("{} <{}>", draft.name, draft.phone),
//!     Err(reason) => println!("row {} rejected: {reason}", row.record),
//!   }
//! }
//! ```

pub mod error;
mod normalize;
mod parse;
mod serialize;

pub use error::{Error, Result};
pub use normalize::{RejectReason, columns, normalize};
pub use parse::{Row, parse_rows};
pub use serialize::{EXPORT_COLUMNS, to_csv, to_json};

/// The two-row sample file offered to users as an import template.
pub const IMPORT_TEMPLATE: &str = "\
Ad Soyad,Telefon,E-posta,Şirket,Notlar
John Doe,+905321234567,john@example.com,ABC Şirketi,VIP Müşteri
Jane Smith,+905551234567,jane@example.com,XYZ Ltd,Potansiyel Müşteri
";

// ─── Round-trip test ─────────────────────────────────────────────────────────

#[cfg(test)]
mod roundtrip_tests {
  use super::{test_helpers::make_contact, *};

  #[test]
  fn export_then_import_preserves_fields() {
    let mut a = make_contact("Alice Smith", "+905321111111");
    a.email = Some("alice@example.com".to_string());
    a.company = Some("Acme, Inc.".to_string());
    let mut b = make_contact("Bob \"Bobby\" Jones", "+905322222222");
    b.notes = Some("met at\nthe fair".to_string());

    let csv = to_csv(&[a.clone(), b.clone()]);
    let rows = parse_rows(&csv).expect("parse failed");
    assert_eq!(rows.len(), 2);

    let drafts: Vec<_> = rows
      .iter()
      .map(|r| normalize(r).expect("normalize failed"))
      .collect();

    assert_eq!(drafts[0].name, a.name);
    assert_eq!(drafts[0].phone, a.phone);
    assert_eq!(drafts[0].email, a.email);
    assert_eq!(drafts[0].company, a.company);
    assert_eq!(drafts[1].name, b.name);
    assert_eq!(drafts[1].notes, b.notes);
  }

  #[test]
  fn template_parses_and_normalises() {
    let rows = parse_rows(IMPORT_TEMPLATE).unwrap();
    assert_eq!(rows.len(), 2);
    for row in &rows {
      normalize(row).expect("template rows must be valid");
    }
  }
}

// ─── Shared test helpers ──────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod test_helpers {
  use chrono::{TimeZone, Utc};
  use rehber_core::contact::{Contact, ContactSource};
  use uuid::Uuid;

  /// Build a minimal [`Contact`] for serialisation tests.
  pub(crate) fn make_contact(name: &str, phone: &str) -> Contact {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    Contact {
      contact_id: Uuid::new_v4(),
      name: name.to_string(),
      phone: phone.to_string(),
      email: None,
      company: None,
      notes: None,
      groups: Default::default(),
      tags: Default::default(),
      source: ContactSource::Manual,
      created_at: at,
      updated_at: at,
      last_interaction: None,
    }
  }
}
