//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Membership sets live in their own tables
//! and are attached to the raw row before decoding.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rehber_core::contact::{Contact, ContactSource, Group, Tag};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ContactSource ───────────────────────────────────────────────────────────

pub fn encode_source(s: ContactSource) -> &'static str { s.as_str() }

pub fn decode_source(s: &str) -> Result<ContactSource> {
  ContactSource::parse(s).ok_or_else(|| Error::UnknownSource(s.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `contacts` row, with the membership ids
/// attached by the caller.
pub struct RawContact {
  pub contact_id:       String,
  pub name:             String,
  pub phone:            String,
  pub email:            Option<String>,
  pub company:          Option<String>,
  pub notes:            Option<String>,
  pub source:           String,
  pub created_at:       String,
  pub updated_at:       String,
  pub last_interaction: Option<String>,
  pub groups:           Vec<String>,
  pub tags:             Vec<String>,
}

impl RawContact {
  pub fn into_contact(self) -> Result<Contact> {
    let groups: BTreeSet<Uuid> = self
      .groups
      .iter()
      .map(|s| decode_uuid(s))
      .collect::<Result<_>>()?;
    let tags: BTreeSet<Uuid> = self
      .tags
      .iter()
      .map(|s| decode_uuid(s))
      .collect::<Result<_>>()?;

    Ok(Contact {
      contact_id: decode_uuid(&self.contact_id)?,
      name: self.name,
      phone: self.phone,
      email: self.email,
      company: self.company,
      notes: self.notes,
      groups,
      tags,
      source: decode_source(&self.source)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      last_interaction: self
        .last_interaction
        .as_deref()
        .map(decode_dt)
        .transpose()?,
    })
  }
}

/// Raw strings read directly from a `groups` row.
pub struct RawGroup {
  pub group_id:    String,
  pub name:        String,
  pub color:       String,
  pub description: Option<String>,
  pub created_at:  String,
}

impl RawGroup {
  pub fn into_group(self) -> Result<Group> {
    Ok(Group {
      group_id:    decode_uuid(&self.group_id)?,
      name:        self.name,
      color:       self.color,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `tags` row.
pub struct RawTag {
  pub tag_id: String,
  pub name:   String,
  pub color:  String,
}

impl RawTag {
  pub fn into_tag(self) -> Result<Tag> {
    Ok(Tag {
      tag_id: decode_uuid(&self.tag_id)?,
      name:   self.name,
      color:  self.color,
    })
  }
}
