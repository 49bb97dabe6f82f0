//! Directory entities — contacts, groups, and tags.
//!
//! A contact's `groups` and `tags` sets hold identifiers only; the referenced
//! [`Group`]/[`Tag`] records live in their own collections. The store is
//! responsible for never letting those sets reference a deleted record.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Source ──────────────────────────────────────────────────────────────────

/// How a contact entered the directory. Set once at creation, never changed;
/// no patch type carries a source field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactSource {
  Manual,
  Import,
  Whatsapp,
}

impl ContactSource {
  /// The string stored in the `source` database column.
  /// Must match the `rename_all = "lowercase"` serde tags above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Manual => "manual",
      Self::Import => "import",
      Self::Whatsapp => "whatsapp",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "manual" => Some(Self::Manual),
      "import" => Some(Self::Import),
      "whatsapp" => Some(Self::Whatsapp),
      _ => None,
    }
  }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A person reachable by phone and optionally email.
///
/// `phone` is the natural key used for import deduplication; it is stored
/// exactly as provided (trimmed), with no format canonicalisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
  pub contact_id:       Uuid,
  pub name:             String,
  pub phone:            String,
  pub email:            Option<String>,
  pub company:          Option<String>,
  pub notes:            Option<String>,
  /// Identifiers of the groups this contact belongs to.
  pub groups:           BTreeSet<Uuid>,
  /// Identifiers of the tags applied to this contact.
  pub tags:             BTreeSet<Uuid>,
  pub source:           ContactSource,
  /// Store-assigned at creation; never changes.
  pub created_at:       DateTime<Utc>,
  /// Bumped by the store on every mutation, membership changes included.
  pub updated_at:       DateTime<Utc>,
  /// Stamped by messaging collaborators via the store's interaction seam.
  pub last_interaction: Option<DateTime<Utc>>,
}

// ─── Group ───────────────────────────────────────────────────────────────────

/// A named, coloured bucket for contacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
  pub group_id:    Uuid,
  pub name:        String,
  /// Hex colour string, e.g. `#3b82f6`.
  pub color:       String,
  pub description: Option<String>,
  pub created_at:  DateTime<Utc>,
}

// ─── Tag ─────────────────────────────────────────────────────────────────────

/// A named, coloured label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
  pub tag_id: Uuid,
  pub name:   String,
  pub color:  String,
}

// ─── Drafts ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::DirectoryStore::add_contact`].
/// The id and both timestamps are always assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContact {
  pub name:    String,
  pub phone:   String,
  pub email:   Option<String>,
  pub company: Option<String>,
  pub notes:   Option<String>,
  /// Initial group memberships; ids not present in the store are dropped.
  #[serde(default)]
  pub groups:  BTreeSet<Uuid>,
  /// Initial tag memberships; ids not present in the store are dropped.
  #[serde(default)]
  pub tags:    BTreeSet<Uuid>,
  pub source:  ContactSource,
}

impl NewContact {
  /// Convenience constructor with all optional fields empty.
  pub fn new(
    name: impl Into<String>,
    phone: impl Into<String>,
    source: ContactSource,
  ) -> Self {
    Self {
      name: name.into(),
      phone: phone.into(),
      email: None,
      company: None,
      notes: None,
      groups: BTreeSet::new(),
      tags: BTreeSet::new(),
      source,
    }
  }
}

/// Input to [`crate::store::DirectoryStore::add_group`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGroup {
  pub name:        String,
  pub color:       String,
  pub description: Option<String>,
}

/// Input to [`crate::store::DirectoryStore::add_tag`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTag {
  pub name:  String,
  pub color: String,
}
