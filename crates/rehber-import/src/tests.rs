//! Pipeline tests: CSV batches against an in-memory SQLite store.

use chrono::{TimeZone, Utc};
use rehber_core::{
  contact::{Contact, ContactSource, NewContact, NewGroup},
  store::{ContactQuery, DirectoryStore},
};
use rehber_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::{ImportError, import_csv};

/// Build a detached [`Contact`] for resolver unit tests.
pub(crate) fn existing_contact(name: &str, phone: &str) -> Contact {
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

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn all_contacts(s: &SqliteStore) -> Vec<Contact> {
  s.list_contacts(&ContactQuery::default()).await.unwrap()
}

const HEADER: &str = "Ad Soyad,Telefon,E-posta,Şirket,Notlar";

// ─── Batch shape ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn three_rows_one_missing_phone() {
  let s = store().await;
  let csv = format!(
    "{HEADER}\n\
     John Doe,+905321234567,john@example.com,ABC Şirketi,VIP Müşteri\n\
     Jane Doe,,jane@example.com,,\n\
     Ali Veli,+905551234567,,,\n"
  );

  let summary = import_csv(&s, &csv).await.unwrap();
  assert_eq!(summary.imported, 2);
  assert_eq!(summary.merged, 0);
  assert_eq!(summary.rejected.len(), 1);
  assert_eq!(summary.rejected[0].row, 2);
  assert_eq!(
    summary.rejected[0].reason.to_string(),
    "missing_required_field: Telefon"
  );

  let contacts = all_contacts(&s).await;
  assert_eq!(contacts.len(), 2);
  assert!(contacts.iter().all(|c| c.source == ContactSource::Import));
}

#[tokio::test]
async fn importing_twice_is_idempotent() {
  let s = store().await;
  let csv = format!(
    "{HEADER}\n\
     John Doe,+905321234567,john@example.com,ABC,note\n\
     Jane Smith,+905551234567,jane@example.com,XYZ,\n"
  );

  let first = import_csv(&s, &csv).await.unwrap();
  assert_eq!((first.imported, first.merged), (2, 0));
  let after_first = all_contacts(&s).await;

  let second = import_csv(&s, &csv).await.unwrap();
  assert_eq!((second.imported, second.merged), (0, 2));

  let after_second = all_contacts(&s).await;
  assert_eq!(after_first.len(), after_second.len());
  for (a, b) in after_first.iter().zip(&after_second) {
    assert_eq!(a.contact_id, b.contact_id);
    assert_eq!(a.name, b.name);
    assert_eq!(a.email, b.email);
    assert_eq!(a.company, b.company);
    assert_eq!(a.notes, b.notes);
    assert_eq!(a.created_at, b.created_at);
  }
}

#[tokio::test]
async fn duplicate_phone_within_batch_collapses() {
  let s = store().await;
  let csv = format!(
    "{HEADER}\n\
     john doe,+905321234567,,,\n\
     JOHN DOE,+905321234567,john@example.com,,\n"
  );

  let summary = import_csv(&s, &csv).await.unwrap();
  assert_eq!((summary.imported, summary.merged), (1, 1));

  let contacts = all_contacts(&s).await;
  assert_eq!(contacts.len(), 1);
  // Later row wins for fields it carries.
  assert_eq!(contacts[0].name, "JOHN DOE");
  assert_eq!(contacts[0].email.as_deref(), Some("john@example.com"));
}

// ─── Merge semantics ─────────────────────────────────────────────────────────

#[tokio::test]
async fn merge_never_clears_existing_fields() {
  let s = store().await;
  let mut existing = NewContact::new("John", "+905321234567", ContactSource::Manual);
  existing.email = Some("kept@example.com".into());
  s.add_contact(existing).await.unwrap();

  // Same phone, empty email cell, new company.
  let csv = format!("{HEADER}\nJohn Doe,+905321234567,,Acme,\n");
  let summary = import_csv(&s, &csv).await.unwrap();
  assert_eq!((summary.imported, summary.merged), (0, 1));

  let contacts = all_contacts(&s).await;
  assert_eq!(contacts.len(), 1);
  assert_eq!(contacts[0].name, "John Doe");
  assert_eq!(contacts[0].email.as_deref(), Some("kept@example.com"));
  assert_eq!(contacts[0].company.as_deref(), Some("Acme"));
}

#[tokio::test]
async fn merge_preserves_identity_source_and_memberships() {
  let s = store().await;
  let g = s
    .add_group(NewGroup {
      name:        "Customers".into(),
      color:       "#3b82f6".into(),
      description: None,
    })
    .await
    .unwrap();

  let mut existing = NewContact::new("John", "+905321234567", ContactSource::Manual);
  existing.groups.insert(g.group_id);
  let added = s.add_contact(existing).await.unwrap();

  let csv = format!("{HEADER}\nJohn Doe,+905321234567,john@example.com,,\n");
  import_csv(&s, &csv).await.unwrap();

  let merged = s.get_contact(added.contact_id).await.unwrap().unwrap();
  assert_eq!(merged.contact_id, added.contact_id);
  assert_eq!(merged.created_at, added.created_at);
  assert_eq!(merged.source, ContactSource::Manual);
  assert!(merged.groups.contains(&g.group_id));
  assert_eq!(merged.email.as_deref(), Some("john@example.com"));
}

// ─── Batch errors ────────────────────────────────────────────────────────────

#[tokio::test]
async fn header_only_file_is_no_valid_records() {
  let s = store().await;
  let err = import_csv(&s, &format!("{HEADER}\n")).await.unwrap_err();
  assert!(matches!(
    err,
    ImportError::NoValidRecords { ref rejected } if rejected.is_empty()
  ));
  assert!(all_contacts(&s).await.is_empty());
}

#[tokio::test]
async fn all_rows_rejected_is_no_valid_records_with_details() {
  let s = store().await;
  let csv = format!("{HEADER}\n,missing-name-here,,,\nNo Phone,,,,\n");
  let err = import_csv(&s, &csv).await.unwrap_err();

  let ImportError::NoValidRecords { rejected } = err else {
    panic!("expected NoValidRecords")
  };
  assert_eq!(rejected.len(), 2);
  assert_eq!(rejected[0].row, 1);
  assert_eq!(rejected[1].row, 2);
  assert!(all_contacts(&s).await.is_empty());
}

#[tokio::test]
async fn malformed_csv_is_a_parse_error() {
  let s = store().await;
  let err = import_csv(&s, "Ad Soyad,Telefon\n\"broken,+9051\n")
    .await
    .unwrap_err();
  assert!(matches!(err, ImportError::Csv(_)));
}

// ─── Round trip ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn export_then_import_rebuilds_the_directory() {
  let source = store().await;
  let mut a = NewContact::new("Alice", "+905321111111", ContactSource::Manual);
  a.email = Some("alice@example.com".into());
  a.notes = Some("met at\nthe fair, twice".into());
  source.add_contact(a).await.unwrap();
  let mut b = NewContact::new("Bob", "+905322222222", ContactSource::Whatsapp);
  b.company = Some("Acme, Inc.".into());
  source.add_contact(b).await.unwrap();

  let csv = rehber_csv::to_csv(&all_contacts(&source).await);

  let target = store().await;
  let summary = import_csv(&target, &csv).await.unwrap();
  assert_eq!((summary.imported, summary.merged), (2, 0));

  let rebuilt = all_contacts(&target).await;
  assert_eq!(rebuilt.len(), 2);
  let alice = rebuilt.iter().find(|c| c.name == "Alice").unwrap();
  assert_eq!(alice.phone, "+905321111111");
  assert_eq!(alice.email.as_deref(), Some("alice@example.com"));
  assert_eq!(alice.notes.as_deref(), Some("met at\nthe fair, twice"));
  // Ids are reassigned and the source becomes Import by design.
  assert_eq!(alice.source, ContactSource::Import);
}
