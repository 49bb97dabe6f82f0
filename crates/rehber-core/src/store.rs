//! The `DirectoryStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `rehber-store-sqlite`).
//! Higher layers (`rehber-import`, `rehber-api`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  contact::{Contact, ContactSource, Group, NewContact, NewGroup, NewTag, Tag},
  patch::{ContactPatch, GroupPatch, TagPatch},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`DirectoryStore::list_contacts`].
///
/// All filters combine with AND; the `groups`/`tags` lists are any-of within
/// themselves. An empty query matches everything.
#[derive(Debug, Clone, Default)]
pub struct ContactQuery {
  /// Case-insensitive substring match over name, phone, and email.
  pub text:   Option<String>,
  /// Contact must belong to at least one of these groups.
  pub groups: Vec<Uuid>,
  /// Contact must carry at least one of these tags.
  pub tags:   Vec<Uuid>,
  pub source: Option<ContactSource>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

impl ContactQuery {
  /// Whether `contact` satisfies every filter (limit/offset excluded —
  /// those are applied by the backend after matching).
  pub fn matches(&self, contact: &Contact) -> bool {
    if let Some(text) = &self.text {
      let needle = text.to_lowercase();
      let hit = contact.name.to_lowercase().contains(&needle)
        || contact.phone.to_lowercase().contains(&needle)
        || contact
          .email
          .as_deref()
          .is_some_and(|e| e.to_lowercase().contains(&needle));
      if !hit {
        return false;
      }
    }

    if let Some(source) = self.source
      && contact.source != source
    {
      return false;
    }

    if !self.groups.is_empty()
      && !self.groups.iter().any(|g| contact.groups.contains(g))
    {
      return false;
    }

    if !self.tags.is_empty()
      && !self.tags.iter().any(|t| contact.tags.contains(t))
    {
      return false;
    }

    true
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a rehber directory backend.
///
/// The store is the sole owner of the three collections; every mutation goes
/// through it. Mutations referencing an absent id are soft no-ops — they
/// signal through `Option`/`bool`/count returns, never through errors. The
/// backend must apply each cascade delete and each bulk assignment as one
/// logical step (a single transaction or an equivalent single-writer step).
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DirectoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Contacts ──────────────────────────────────────────────────────────

  /// Create a contact: fresh id, `created_at = updated_at = now`. No
  /// duplicate check is performed — deduplication is the import pipeline's
  /// responsibility.
  fn add_contact(
    &self,
    draft: NewContact,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// Retrieve a contact by id. Returns `None` if not found.
  fn get_contact(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Look up a contact by exact phone string — the import dedup key.
  /// If several contacts share the phone, the oldest is returned.
  fn find_by_phone<'a>(
    &'a self,
    phone: &'a str,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + 'a;

  /// List contacts matching `query`, ordered by creation time.
  fn list_contacts<'a>(
    &'a self,
    query: &'a ContactQuery,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + 'a;

  /// Merge `patch` into the contact and bump `updated_at`.
  /// Returns the updated contact, or `None` if the id is absent.
  fn update_contact(
    &self,
    id: Uuid,
    patch: ContactPatch,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Delete one contact. Returns whether a record was removed.
  fn delete_contact(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete a batch of contacts in one transaction; absent ids are ignored.
  /// Returns the number of records removed.
  fn delete_contacts<'a>(
    &'a self,
    ids: &'a [Uuid],
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Stamp `last_interaction` (and `updated_at`). This is the seam the
  /// messaging collaborators call after a send; the directory does not
  /// interpret delivery status.
  fn record_interaction(
    &self,
    id: Uuid,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Groups ────────────────────────────────────────────────────────────

  fn add_group(
    &self,
    draft: NewGroup,
  ) -> impl Future<Output = Result<Group, Self::Error>> + Send + '_;

  fn get_group(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + '_;

  fn list_groups(
    &self,
  ) -> impl Future<Output = Result<Vec<Group>, Self::Error>> + Send + '_;

  fn update_group(
    &self,
    id: Uuid,
    patch: GroupPatch,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + '_;

  /// Delete a group and prune it from every contact's `groups` set in the
  /// same logical step. Returns whether a record was removed.
  fn delete_group(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Tags ──────────────────────────────────────────────────────────────

  fn add_tag(
    &self,
    draft: NewTag,
  ) -> impl Future<Output = Result<Tag, Self::Error>> + Send + '_;

  fn get_tag(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Tag>, Self::Error>> + Send + '_;

  fn list_tags(
    &self,
  ) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + '_;

  fn update_tag(
    &self,
    id: Uuid,
    patch: TagPatch,
  ) -> impl Future<Output = Result<Option<Tag>, Self::Error>> + Send + '_;

  /// Delete a tag and prune it from every contact's `tags` set in the same
  /// logical step. Returns whether a record was removed.
  fn delete_tag(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Bulk membership ───────────────────────────────────────────────────

  /// Add `group_id` to each listed contact's `groups` set (set union) and
  /// bump `updated_at` for every contact that exists, in one transaction.
  /// Unknown contact ids are skipped; an unknown group id makes the whole
  /// call a no-op. Returns the number of contacts touched.
  fn assign_group<'a>(
    &'a self,
    contact_ids: &'a [Uuid],
    group_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Remove `group_id` from each listed contact's `groups` set (set
  /// difference); otherwise symmetric to [`Self::assign_group`].
  fn unassign_group<'a>(
    &'a self,
    contact_ids: &'a [Uuid],
    group_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  fn assign_tag<'a>(
    &'a self,
    contact_ids: &'a [Uuid],
    tag_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  fn unassign_tag<'a>(
    &'a self,
    contact_ids: &'a [Uuid],
    tag_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;
}
