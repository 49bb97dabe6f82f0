//! [`SqliteStore`] — the SQLite implementation of [`DirectoryStore`].

use std::{
  collections::{BTreeSet, HashMap},
  path::Path,
};

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use rehber_core::{
  contact::{Contact, Group, NewContact, NewGroup, NewTag, Tag},
  patch::{ContactPatch, GroupPatch, TagPatch},
  store::{ContactQuery, DirectoryStore},
};

use crate::{
  Error, Result,
  encode::{
    RawContact, RawGroup, RawTag, decode_uuid, encode_dt, encode_source,
    encode_uuid,
  },
  schema::SCHEMA,
};

const CONTACT_COLUMNS: &str = "contact_id, name, phone, email, company, \
   notes, source, created_at, updated_at, last_interaction";

// ─── Row helpers ─────────────────────────────────────────────────────────────

/// Map a `contacts` row (selected with [`CONTACT_COLUMNS`]) into a
/// [`RawContact`] with empty membership sets.
fn contact_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawContact> {
  Ok(RawContact {
    contact_id:       row.get(0)?,
    name:             row.get(1)?,
    phone:            row.get(2)?,
    email:            row.get(3)?,
    company:          row.get(4)?,
    notes:            row.get(5)?,
    source:           row.get(6)?,
    created_at:       row.get(7)?,
    updated_at:       row.get(8)?,
    last_interaction: row.get(9)?,
    groups:           Vec::new(),
    tags:             Vec::new(),
  })
}

/// Read one contact's membership ids.
fn load_memberships(
  conn: &rusqlite::Connection,
  contact_id: &str,
) -> rusqlite::Result<(Vec<String>, Vec<String>)> {
  let mut stmt = conn
    .prepare("SELECT group_id FROM contact_groups WHERE contact_id = ?1")?;
  let groups = stmt
    .query_map([contact_id], |r| r.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()?;

  let mut stmt =
    conn.prepare("SELECT tag_id FROM contact_tags WHERE contact_id = ?1")?;
  let tags = stmt
    .query_map([contact_id], |r| r.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()?;

  Ok((groups, tags))
}

/// Does a row with this id exist in `table`?
fn row_exists(
  conn: &rusqlite::Connection,
  table: &str,
  id_column: &str,
  id: &str,
) -> rusqlite::Result<bool> {
  let sql = format!("SELECT 1 FROM {table} WHERE {id_column} = ?1");
  Ok(
    conn
      .query_row(&sql, [id], |_| Ok(true))
      .optional()?
      .unwrap_or(false),
  )
}

/// Insert membership rows for `member_ids`, skipping ids that do not exist
/// in the referenced table. Keeps the referential invariant without
/// failing the whole write.
fn insert_memberships(
  conn: &rusqlite::Connection,
  membership_table: &str,
  ref_table: &str,
  ref_column: &str,
  contact_id: &str,
  member_ids: &[String],
) -> rusqlite::Result<()> {
  let sql = format!(
    "INSERT OR IGNORE INTO {membership_table} (contact_id, {ref_column})
     SELECT ?1, {ref_column} FROM {ref_table} WHERE {ref_column} = ?2"
  );
  for member in member_ids {
    conn.execute(&sql, [contact_id, member])?;
  }
  Ok(())
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A rehber directory backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — the directory is then purely transient,
  /// which is what tests (and throwaway sessions) want.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── DirectoryStore impl ─────────────────────────────────────────────────────

impl DirectoryStore for SqliteStore {
  type Error = Error;

  // ── Contacts ──────────────────────────────────────────────────────────────

  async fn add_contact(&self, draft: NewContact) -> Result<Contact> {
    let contact_id = Uuid::new_v4();
    let now = Utc::now();

    let id_str     = encode_uuid(contact_id);
    let now_str    = encode_dt(now);
    let source_str = encode_source(draft.source).to_owned();
    let name       = draft.name.clone();
    let phone      = draft.phone.clone();
    let email      = draft.email.clone();
    let company    = draft.company.clone();
    let notes      = draft.notes.clone();
    let group_ids: Vec<String> =
      draft.groups.iter().copied().map(encode_uuid).collect();
    let tag_ids: Vec<String> =
      draft.tags.iter().copied().map(encode_uuid).collect();

    let (kept_groups, kept_tags): (Vec<String>, Vec<String>) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO contacts (
             contact_id, name, phone, email, company, notes,
             source, created_at, updated_at, last_interaction
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, NULL)",
          rusqlite::params![
            id_str, name, phone, email, company, notes, source_str, now_str,
          ],
        )?;

        insert_memberships(
          &tx, "contact_groups", "groups", "group_id", &id_str, &group_ids,
        )?;
        insert_memberships(
          &tx, "contact_tags", "tags", "tag_id", &id_str, &tag_ids,
        )?;

        let kept = load_memberships(&tx, &id_str)?;
        tx.commit()?;
        Ok(kept)
      })
      .await?;

    let groups: BTreeSet<Uuid> = kept_groups
      .iter()
      .map(|s| decode_uuid(s))
      .collect::<Result<_>>()?;
    let tags: BTreeSet<Uuid> = kept_tags
      .iter()
      .map(|s| decode_uuid(s))
      .collect::<Result<_>>()?;

    Ok(Contact {
      contact_id,
      name: draft.name,
      phone: draft.phone,
      email: draft.email,
      company: draft.company,
      notes: draft.notes,
      groups,
      tags,
      source: draft.source,
      created_at: now,
      updated_at: now,
      last_interaction: None,
    })
  }

  async fn get_contact(&self, id: Uuid) -> Result<Option<Contact>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        let sql =
          format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE contact_id = ?1");
        let row = conn
          .query_row(&sql, rusqlite::params![id_str], contact_from_row)
          .optional()?;

        let Some(mut raw) = row else { return Ok(None) };
        let (groups, tags) = load_memberships(conn, &raw.contact_id)?;
        raw.groups = groups;
        raw.tags = tags;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  async fn find_by_phone(&self, phone: &str) -> Result<Option<Contact>> {
    let phone = phone.to_owned();

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {CONTACT_COLUMNS} FROM contacts
           WHERE phone = ?1
           ORDER BY created_at, contact_id
           LIMIT 1"
        );
        let row = conn
          .query_row(&sql, rusqlite::params![phone], contact_from_row)
          .optional()?;

        let Some(mut raw) = row else { return Ok(None) };
        let (groups, tags) = load_memberships(conn, &raw.contact_id)?;
        raw.groups = groups;
        raw.tags = tags;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  async fn list_contacts(&self, query: &ContactQuery) -> Result<Vec<Contact>> {
    let raws: Vec<RawContact> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY created_at, contact_id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut raws = stmt
          .query_map([], contact_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        // Attach memberships with two whole-table reads rather than a
        // query per contact.
        let mut stmt =
          conn.prepare("SELECT contact_id, group_id FROM contact_groups")?;
        let group_pairs = stmt
          .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt =
          conn.prepare("SELECT contact_id, tag_id FROM contact_tags")?;
        let tag_pairs = stmt
          .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut groups_by_contact: HashMap<String, Vec<String>> = HashMap::new();
        for (cid, gid) in group_pairs {
          groups_by_contact.entry(cid).or_default().push(gid);
        }
        let mut tags_by_contact: HashMap<String, Vec<String>> = HashMap::new();
        for (cid, tid) in tag_pairs {
          tags_by_contact.entry(cid).or_default().push(tid);
        }

        for raw in &mut raws {
          if let Some(groups) = groups_by_contact.remove(&raw.contact_id) {
            raw.groups = groups;
          }
          if let Some(tags) = tags_by_contact.remove(&raw.contact_id) {
            raw.tags = tags;
          }
        }

        Ok(raws)
      })
      .await?;

    let contacts = raws
      .into_iter()
      .map(RawContact::into_contact)
      .collect::<Result<Vec<_>>>()?;

    // Filtering happens here rather than in SQL: directory-scale data, and
    // the any-of group/tag rules live in one tested place
    // (`ContactQuery::matches`).
    let filtered = contacts
      .into_iter()
      .filter(|c| query.matches(c))
      .skip(query.offset.unwrap_or(0))
      .take(query.limit.unwrap_or(usize::MAX))
      .collect();

    Ok(filtered)
  }

  async fn update_contact(
    &self,
    id: Uuid,
    patch: ContactPatch,
  ) -> Result<Option<Contact>> {
    let ContactPatch {
      name,
      phone,
      email,
      company,
      notes,
      groups,
      tags,
      last_interaction,
    } = patch;

    let id_str  = encode_uuid(id);
    let now_str = encode_dt(Utc::now());
    let last_interaction = last_interaction.map(encode_dt);
    let groups: Option<Vec<String>> =
      groups.map(|s| s.into_iter().map(encode_uuid).collect());
    let tags: Option<Vec<String>> =
      tags.map(|s| s.into_iter().map(encode_uuid).collect());

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let sql =
          format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE contact_id = ?1");
        let row = tx
          .query_row(&sql, rusqlite::params![id_str], contact_from_row)
          .optional()?;
        let Some(mut raw) = row else { return Ok(None) };

        raw.name = name.unwrap_or(raw.name);
        raw.phone = phone.unwrap_or(raw.phone);
        raw.email = email.apply(raw.email);
        raw.company = company.apply(raw.company);
        raw.notes = notes.apply(raw.notes);
        raw.last_interaction = last_interaction.apply(raw.last_interaction);
        raw.updated_at = now_str;

        tx.execute(
          "UPDATE contacts
           SET name = ?2, phone = ?3, email = ?4, company = ?5, notes = ?6,
               updated_at = ?7, last_interaction = ?8
           WHERE contact_id = ?1",
          rusqlite::params![
            raw.contact_id,
            raw.name,
            raw.phone,
            raw.email,
            raw.company,
            raw.notes,
            raw.updated_at,
            raw.last_interaction,
          ],
        )?;

        if let Some(group_ids) = groups {
          tx.execute(
            "DELETE FROM contact_groups WHERE contact_id = ?1",
            rusqlite::params![raw.contact_id],
          )?;
          insert_memberships(
            &tx, "contact_groups", "groups", "group_id", &raw.contact_id,
            &group_ids,
          )?;
        }
        if let Some(tag_ids) = tags {
          tx.execute(
            "DELETE FROM contact_tags WHERE contact_id = ?1",
            rusqlite::params![raw.contact_id],
          )?;
          insert_memberships(
            &tx, "contact_tags", "tags", "tag_id", &raw.contact_id, &tag_ids,
          )?;
        }

        let (kept_groups, kept_tags) = load_memberships(&tx, &raw.contact_id)?;
        raw.groups = kept_groups;
        raw.tags = kept_tags;

        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  async fn delete_contact(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM contacts WHERE contact_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(n > 0)
  }

  async fn delete_contacts(&self, ids: &[Uuid]) -> Result<usize> {
    let id_strs: Vec<String> = ids.iter().copied().map(encode_uuid).collect();

    let n = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut removed = 0usize;
        for id in &id_strs {
          removed += tx.execute(
            "DELETE FROM contacts WHERE contact_id = ?1",
            rusqlite::params![id],
          )?;
        }
        tx.commit()?;
        Ok(removed)
      })
      .await?;

    Ok(n)
  }

  async fn record_interaction(
    &self,
    id: Uuid,
    at: DateTime<Utc>,
  ) -> Result<bool> {
    let id_str  = encode_uuid(id);
    let at_str  = encode_dt(at);
    let now_str = encode_dt(Utc::now());

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE contacts SET last_interaction = ?2, updated_at = ?3
           WHERE contact_id = ?1",
          rusqlite::params![id_str, at_str, now_str],
        )?)
      })
      .await?;

    Ok(n > 0)
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  async fn add_group(&self, draft: NewGroup) -> Result<Group> {
    let group = Group {
      group_id:    Uuid::new_v4(),
      name:        draft.name,
      color:       draft.color,
      description: draft.description,
      created_at:  Utc::now(),
    };

    let id_str      = encode_uuid(group.group_id);
    let name        = group.name.clone();
    let color       = group.color.clone();
    let description = group.description.clone();
    let at_str      = encode_dt(group.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO groups (group_id, name, color, description, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, color, description, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(group)
  }

  async fn get_group(&self, id: Uuid) -> Result<Option<Group>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawGroup> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT group_id, name, color, description, created_at
               FROM groups WHERE group_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawGroup {
                  group_id:    row.get(0)?,
                  name:        row.get(1)?,
                  color:       row.get(2)?,
                  description: row.get(3)?,
                  created_at:  row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawGroup::into_group).transpose()
  }

  async fn list_groups(&self) -> Result<Vec<Group>> {
    let raws: Vec<RawGroup> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT group_id, name, color, description, created_at
           FROM groups ORDER BY created_at, group_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawGroup {
              group_id:    row.get(0)?,
              name:        row.get(1)?,
              color:       row.get(2)?,
              description: row.get(3)?,
              created_at:  row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGroup::into_group).collect()
  }

  async fn update_group(
    &self,
    id: Uuid,
    patch: GroupPatch,
  ) -> Result<Option<Group>> {
    let GroupPatch {
      name,
      color,
      description,
    } = patch;
    let id_str = encode_uuid(id);

    let raw: Option<RawGroup> = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            "SELECT group_id, name, color, description, created_at
             FROM groups WHERE group_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawGroup {
                group_id:    row.get(0)?,
                name:        row.get(1)?,
                color:       row.get(2)?,
                description: row.get(3)?,
                created_at:  row.get(4)?,
              })
            },
          )
          .optional()?;
        let Some(mut raw) = row else { return Ok(None) };

        raw.name = name.unwrap_or(raw.name);
        raw.color = color.unwrap_or(raw.color);
        raw.description = description.apply(raw.description);

        conn.execute(
          "UPDATE groups SET name = ?2, color = ?3, description = ?4
           WHERE group_id = ?1",
          rusqlite::params![raw.group_id, raw.name, raw.color, raw.description],
        )?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawGroup::into_group).transpose()
  }

  async fn delete_group(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    // Membership pruning rides on ON DELETE CASCADE, so the whole cascade
    // is this one statement.
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM groups WHERE group_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(n > 0)
  }

  // ── Tags ──────────────────────────────────────────────────────────────────

  async fn add_tag(&self, draft: NewTag) -> Result<Tag> {
    let tag = Tag {
      tag_id: Uuid::new_v4(),
      name:   draft.name,
      color:  draft.color,
    };

    let id_str = encode_uuid(tag.tag_id);
    let name   = tag.name.clone();
    let color  = tag.color.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO tags (tag_id, name, color) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name, color],
        )?;
        Ok(())
      })
      .await?;

    Ok(tag)
  }

  async fn get_tag(&self, id: Uuid) -> Result<Option<Tag>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawTag> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT tag_id, name, color FROM tags WHERE tag_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawTag {
                  tag_id: row.get(0)?,
                  name:   row.get(1)?,
                  color:  row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTag::into_tag).transpose()
  }

  async fn list_tags(&self) -> Result<Vec<Tag>> {
    let raws: Vec<RawTag> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT tag_id, name, color FROM tags ORDER BY name, tag_id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawTag {
              tag_id: row.get(0)?,
              name:   row.get(1)?,
              color:  row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTag::into_tag).collect()
  }

  async fn update_tag(&self, id: Uuid, patch: TagPatch) -> Result<Option<Tag>> {
    let TagPatch { name, color } = patch;
    let id_str = encode_uuid(id);

    let raw: Option<RawTag> = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            "SELECT tag_id, name, color FROM tags WHERE tag_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawTag {
                tag_id: row.get(0)?,
                name:   row.get(1)?,
                color:  row.get(2)?,
              })
            },
          )
          .optional()?;
        let Some(mut raw) = row else { return Ok(None) };

        raw.name = name.unwrap_or(raw.name);
        raw.color = color.unwrap_or(raw.color);

        conn.execute(
          "UPDATE tags SET name = ?2, color = ?3 WHERE tag_id = ?1",
          rusqlite::params![raw.tag_id, raw.name, raw.color],
        )?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawTag::into_tag).transpose()
  }

  async fn delete_tag(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM tags WHERE tag_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(n > 0)
  }

  // ── Bulk membership ───────────────────────────────────────────────────────

  async fn assign_group(
    &self,
    contact_ids: &[Uuid],
    group_id: Uuid,
  ) -> Result<usize> {
    self
      .apply_membership(contact_ids, group_id, MembershipOp::Assign {
        membership_table: "contact_groups",
        ref_table:        "groups",
        ref_column:       "group_id",
      })
      .await
  }

  async fn unassign_group(
    &self,
    contact_ids: &[Uuid],
    group_id: Uuid,
  ) -> Result<usize> {
    self
      .apply_membership(contact_ids, group_id, MembershipOp::Unassign {
        membership_table: "contact_groups",
        ref_table:        "groups",
        ref_column:       "group_id",
      })
      .await
  }

  async fn assign_tag(&self, contact_ids: &[Uuid], tag_id: Uuid) -> Result<usize> {
    self
      .apply_membership(contact_ids, tag_id, MembershipOp::Assign {
        membership_table: "contact_tags",
        ref_table:        "tags",
        ref_column:       "tag_id",
      })
      .await
  }

  async fn unassign_tag(
    &self,
    contact_ids: &[Uuid],
    tag_id: Uuid,
  ) -> Result<usize> {
    self
      .apply_membership(contact_ids, tag_id, MembershipOp::Unassign {
        membership_table: "contact_tags",
        ref_table:        "tags",
        ref_column:       "tag_id",
      })
      .await
  }
}

// ─── Bulk membership internals ───────────────────────────────────────────────

/// Which way a bulk membership call moves, plus the tables it touches.
enum MembershipOp {
  Assign {
    membership_table: &'static str,
    ref_table:        &'static str,
    ref_column:       &'static str,
  },
  Unassign {
    membership_table: &'static str,
    ref_table:        &'static str,
    ref_column:       &'static str,
  },
}

impl SqliteStore {
  /// Shared implementation of the four bulk membership operations.
  ///
  /// One transaction covers the whole batch. The call is a no-op returning 0
  /// when the referenced group/tag does not exist; unknown contact ids are
  /// skipped; every existing contact in the (de-duplicated) batch gets its
  /// `updated_at` bumped, membership change or not.
  async fn apply_membership(
    &self,
    contact_ids: &[Uuid],
    member_id: Uuid,
    op: MembershipOp,
  ) -> Result<usize> {
    let ids: Vec<String> = contact_ids
      .iter()
      .copied()
      .collect::<BTreeSet<_>>()
      .into_iter()
      .map(encode_uuid)
      .collect();
    let member_str = encode_uuid(member_id);
    let now_str = encode_dt(Utc::now());

    let affected = self
      .conn
      .call(move |conn| {
        let (membership_table, ref_table, ref_column, assign) = match op {
          MembershipOp::Assign {
            membership_table,
            ref_table,
            ref_column,
          } => (membership_table, ref_table, ref_column, true),
          MembershipOp::Unassign {
            membership_table,
            ref_table,
            ref_column,
          } => (membership_table, ref_table, ref_column, false),
        };

        let tx = conn.transaction()?;

        if !row_exists(&tx, ref_table, ref_column, &member_str)? {
          return Ok(0);
        }

        let change_sql = if assign {
          format!(
            "INSERT OR IGNORE INTO {membership_table} (contact_id, {ref_column})
             VALUES (?1, ?2)"
          )
        } else {
          format!(
            "DELETE FROM {membership_table}
             WHERE contact_id = ?1 AND {ref_column} = ?2"
          )
        };

        let mut affected = 0usize;
        for contact_id in &ids {
          if !row_exists(&tx, "contacts", "contact_id", contact_id)? {
            continue;
          }
          tx.execute(&change_sql, rusqlite::params![contact_id, member_str])?;
          tx.execute(
            "UPDATE contacts SET updated_at = ?2 WHERE contact_id = ?1",
            rusqlite::params![contact_id, now_str],
          )?;
          affected += 1;
        }

        tx.commit()?;
        Ok(affected)
      })
      .await?;

    Ok(affected)
  }
}
