//! Partial-update types.
//!
//! A patch distinguishes "leave this field alone" from "clear this field":
//! required fields use plain `Option<T>` (set or keep — they cannot be
//! cleared), optional fields use [`FieldUpdate`], whose deserialisation maps
//! an absent key to `Keep` and an explicit JSON `null` to `Clear`.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

// ─── FieldUpdate ─────────────────────────────────────────────────────────────

/// A three-state update for an optional field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
  /// Leave the current value untouched.
  Keep,
  /// Remove the current value.
  Clear,
  /// Replace the current value.
  Set(T),
}

impl<T> FieldUpdate<T> {
  pub fn is_keep(&self) -> bool { matches!(self, Self::Keep) }

  /// Resolve against the current value.
  pub fn apply(self, current: Option<T>) -> Option<T> {
    match self {
      Self::Keep => current,
      Self::Clear => None,
      Self::Set(v) => Some(v),
    }
  }

  /// `Set` for `Some(v)`, `Keep` for `None`. Used by merge paths that must
  /// never clear an existing value.
  pub fn set_if_present(value: Option<T>) -> Self {
    match value {
      Some(v) => Self::Set(v),
      None => Self::Keep,
    }
  }

  /// Transform the carried value, preserving `Keep`/`Clear`.
  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldUpdate<U> {
    match self {
      Self::Keep => FieldUpdate::Keep,
      Self::Clear => FieldUpdate::Clear,
      Self::Set(v) => FieldUpdate::Set(f(v)),
    }
  }
}

// Manual impl: the derive would bound `T: Default` for no reason.
impl<T> Default for FieldUpdate<T> {
  fn default() -> Self { Self::Keep }
}

// An absent key never reaches this impl — `#[serde(default)]` on the field
// yields `Keep`. A present key deserialises `null` to `Clear`.
impl<'de, T> Deserialize<'de> for FieldUpdate<T>
where
  T: Deserialize<'de>,
{
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Option::<T>::deserialize(deserializer)? {
      Some(v) => Self::Set(v),
      None => Self::Clear,
    })
  }
}

// ─── Contact patch ───────────────────────────────────────────────────────────

/// Partial update for a [`crate::contact::Contact`].
///
/// `source`, `created_at`, and the contact id are immutable and have no
/// patch fields. Whole-set replacement of `groups`/`tags` drops any id that
/// does not reference an existing group/tag at commit time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactPatch {
  pub name:             Option<String>,
  pub phone:            Option<String>,
  #[serde(default)]
  pub email:            FieldUpdate<String>,
  #[serde(default)]
  pub company:          FieldUpdate<String>,
  #[serde(default)]
  pub notes:            FieldUpdate<String>,
  pub groups:           Option<BTreeSet<Uuid>>,
  pub tags:             Option<BTreeSet<Uuid>>,
  #[serde(default)]
  pub last_interaction: FieldUpdate<DateTime<Utc>>,
}

impl ContactPatch {
  /// True if applying the patch would change nothing.
  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.phone.is_none()
      && self.email.is_keep()
      && self.company.is_keep()
      && self.notes.is_keep()
      && self.groups.is_none()
      && self.tags.is_none()
      && self.last_interaction.is_keep()
  }
}

// ─── Group / tag patches ─────────────────────────────────────────────────────

/// Partial update for a [`crate::contact::Group`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupPatch {
  pub name:        Option<String>,
  pub color:       Option<String>,
  #[serde(default)]
  pub description: FieldUpdate<String>,
}

/// Partial update for a [`crate::contact::Tag`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagPatch {
  pub name:  Option<String>,
  pub color: Option<String>,
}
