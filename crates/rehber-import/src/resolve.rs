//! Deduplication — decide what an incoming draft means for the directory.
//!
//! The dedup key is the contact's exact phone string. A hit becomes a merge
//! patch with last-import-wins semantics: fields present in the draft
//! overwrite, fields the draft omits are kept, and nothing is ever cleared.
//! The existing contact's id, `created_at`, `source`, and memberships are
//! untouched.

use rehber_core::{
  contact::{Contact, NewContact},
  patch::{ContactPatch, FieldUpdate},
};
use uuid::Uuid;

/// What to do with one normalised draft.
#[derive(Debug)]
pub enum Resolution {
  /// No contact shares this phone — create a new record.
  Insert(NewContact),
  /// A contact with this phone exists — update it in place.
  Merge {
    contact_id: Uuid,
    patch:      ContactPatch,
  },
}

/// Resolve `draft` against the contact currently holding its phone number
/// (the caller looks that up via `find_by_phone`).
pub fn resolve(draft: NewContact, existing: Option<&Contact>) -> Resolution {
  match existing {
    None => Resolution::Insert(draft),
    Some(current) => Resolution::Merge {
      contact_id: current.contact_id,
      patch:      merge_patch(draft),
    },
  }
}

/// Build the merge patch for a dedup hit.
///
/// `name` is always overwritten — normalisation guarantees it is non-empty.
/// `phone` is the match key and stays as stored. Optional fields map to
/// `Set` when the draft carries them and `Keep` otherwise; `Clear` never
/// appears here.
fn merge_patch(draft: NewContact) -> ContactPatch {
  ContactPatch {
    name: Some(draft.name),
    email: FieldUpdate::set_if_present(draft.email),
    company: FieldUpdate::set_if_present(draft.company),
    notes: FieldUpdate::set_if_present(draft.notes),
    ..Default::default()
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use rehber_core::contact::ContactSource;

  use super::*;
  use crate::tests::existing_contact;

  #[test]
  fn no_existing_contact_inserts() {
    let draft = NewContact::new("Alice", "+9051", ContactSource::Import);
    match resolve(draft, None) {
      Resolution::Insert(d) => assert_eq!(d.phone, "+9051"),
      other => panic!("expected insert, got {other:?}"),
    }
  }

  #[test]
  fn existing_contact_merges_without_clearing() {
    let current = existing_contact("Old Name", "+9051");
    let mut draft = NewContact::new("New Name", "+9051", ContactSource::Import);
    draft.company = Some("Acme".into());
    // draft.email deliberately absent

    let Resolution::Merge { contact_id, patch } =
      resolve(draft, Some(&current))
    else {
      panic!("expected merge")
    };

    assert_eq!(contact_id, current.contact_id);
    assert_eq!(patch.name.as_deref(), Some("New Name"));
    assert_eq!(patch.phone, None);
    assert_eq!(patch.company, FieldUpdate::Set("Acme".into()));
    // Omitted in the draft: kept, never cleared.
    assert_eq!(patch.email, FieldUpdate::Keep);
    assert_eq!(patch.notes, FieldUpdate::Keep);
    // Memberships are not part of a merge.
    assert!(patch.groups.is_none());
    assert!(patch.tags.is_none());
  }
}
