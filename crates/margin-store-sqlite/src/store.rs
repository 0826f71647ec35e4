//! [`SqliteStore`] — the SQLite implementation of [`AnnotationStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use margin_core::{
  annotation::{Annotation, NewAnnotation},
  group::{Group, NewGroup},
  organization::{NewOrganization, Organization},
  store::AnnotationStore,
};

use crate::{
  encode::{encode_dt, encode_readable_by, encode_uuid, RawAnnotation, RawGroup, RawOrganization},
  schema::SCHEMA,
  Error, Result,
};

const SELECT_ANNOTATION: &str = "
  SELECT a.id, a.userid, a.groupid, a.shared, a.deleted, a.target_uri,
         a.text, a.created_at, a.updated_at, m.hidden_at
  FROM annotations a
  LEFT JOIN annotation_moderation m ON m.annotation_id = a.id
  WHERE a.id = ?1";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Margin store backed by a single SQLite file.
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

  /// Open an in-memory store — useful for testing.
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

  /// Toggle the moderation row of an annotation inside one transaction.
  ///
  /// Returns whether a row was inserted (`hidden == true`) or removed
  /// (`hidden == false`).
  async fn set_hidden(&self, id: Uuid, hidden: bool) -> Result<bool> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let changed: Option<bool> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists = tx
          .query_row("SELECT 1 FROM annotations WHERE id = ?1", rusqlite::params![id_str], |_| {
            Ok(())
          })
          .optional()?
          .is_some();
        if !exists {
          return Ok(None);
        }

        let rows = if hidden {
          tx.execute(
            "INSERT OR IGNORE INTO annotation_moderation (annotation_id, hidden_at)
             VALUES (?1, ?2)",
            rusqlite::params![id_str, at_str],
          )?
        } else {
          tx.execute(
            "DELETE FROM annotation_moderation WHERE annotation_id = ?1",
            rusqlite::params![id_str],
          )?
        };

        tx.commit()?;
        Ok(Some(rows > 0))
      })
      .await?;

    changed.ok_or_else(|| margin_core::Error::AnnotationNotFound(id).into())
  }
}

/// A short random pubid for a new group or organization.
fn new_pubid() -> String {
  let mut id = Uuid::new_v4().simple().to_string();
  id.truncate(8);
  id
}

// ─── AnnotationStore impl ────────────────────────────────────────────────────

impl AnnotationStore for SqliteStore {
  type Error = Error;

  // ── Organizations ─────────────────────────────────────────────────────────

  async fn add_organization(&self, input: NewOrganization) -> Result<Organization> {
    let organization = Organization {
      pubid:      new_pubid(),
      name:       input.name,
      authority:  input.authority,
      logo:       input.logo,
      created_at: Utc::now(),
    };

    let pubid = organization.pubid.clone();
    let name = organization.name.clone();
    let authority = organization.authority.clone();
    let logo = organization.logo.clone();
    let at_str = encode_dt(organization.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO organizations (pubid, name, authority, logo, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![pubid, name, authority, logo, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(organization)
  }

  async fn get_organization(&self, pubid: &str) -> Result<Option<Organization>> {
    let pubid = pubid.to_owned();

    let raw: Option<RawOrganization> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM organizations WHERE pubid = ?1", RawOrganization::COLUMNS),
            rusqlite::params![pubid],
            RawOrganization::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawOrganization::into_organization).transpose()
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  async fn add_group(&self, input: NewGroup) -> Result<Group> {
    let group = Group {
      pubid:        new_pubid(),
      name:         input.name,
      authority:    input.authority,
      creator:      input.creator,
      organization: input.organization,
      readable_by:  input.readable_by,
      created_at:   Utc::now(),
    };

    let pubid = group.pubid.clone();
    let name = group.name.clone();
    let authority = group.authority.clone();
    let creator = group.creator.clone();
    let organization = group.organization.clone();
    let readable_by = encode_readable_by(group.readable_by);
    let at_str = encode_dt(group.created_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO groups (pubid, name, authority, creator, organization, readable_by, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![pubid, name, authority, creator, organization, readable_by, at_str],
        )?;
        if let Some(creator) = &creator {
          tx.execute(
            "INSERT INTO group_members (pubid, userid) VALUES (?1, ?2)",
            rusqlite::params![pubid, creator],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(group)
  }

  async fn get_group(&self, pubid: &str) -> Result<Option<Group>> {
    let pubid = pubid.to_owned();

    let raw: Option<RawGroup> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM groups WHERE pubid = ?1", RawGroup::COLUMNS),
            rusqlite::params![pubid],
            RawGroup::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawGroup::into_group).transpose()
  }

  async fn add_member(&self, pubid: &str, userid: &str) -> Result<()> {
    if self.get_group(pubid).await?.is_none() {
      return Err(margin_core::Error::GroupNotFound(pubid.to_owned()).into());
    }

    let pubid = pubid.to_owned();
    let userid = userid.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO group_members (pubid, userid) VALUES (?1, ?2)",
          rusqlite::params![pubid, userid],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn memberships(&self, userid: &str) -> Result<Vec<String>> {
    let userid = userid.to_owned();

    let pubids: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT pubid FROM group_members WHERE userid = ?1 ORDER BY pubid")?;
        let rows = stmt
          .query_map(rusqlite::params![userid], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(pubids)
  }

  // ── Annotations ───────────────────────────────────────────────────────────

  async fn add_annotation(&self, input: NewAnnotation) -> Result<Annotation> {
    let now = Utc::now();
    let annotation = Annotation {
      id:         Uuid::new_v4(),
      userid:     input.userid,
      groupid:    input.groupid,
      shared:     input.shared,
      deleted:    false,
      target_uri: input.target_uri,
      text:       input.text,
      created_at: now,
      updated_at: now,
      moderation: None,
    };

    let id_str = encode_uuid(annotation.id);
    let userid = annotation.userid.clone();
    let groupid = annotation.groupid.clone();
    let shared = annotation.shared;
    let target_uri = annotation.target_uri.clone();
    let text = annotation.text.clone();
    let at_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO annotations (
             id, userid, groupid, shared, deleted, target_uri, text, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?7)",
          rusqlite::params![id_str, userid, groupid, shared, target_uri, text, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(annotation)
  }

  async fn get_annotation(&self, id: Uuid) -> Result<Option<Annotation>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAnnotation> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(SELECT_ANNOTATION, rusqlite::params![id_str], RawAnnotation::from_row)
          .optional()?)
      })
      .await?;

    raw.map(RawAnnotation::into_annotation).transpose()
  }

  async fn delete_annotation(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let changed: Option<bool> = self
      .conn
      .call(move |conn| {
        let deleted: Option<bool> = conn
          .query_row(
            "SELECT deleted FROM annotations WHERE id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?;

        match deleted {
          None => Ok(None),
          Some(true) => Ok(Some(false)),
          Some(false) => {
            conn.execute(
              "UPDATE annotations SET deleted = 1, updated_at = ?2 WHERE id = ?1",
              rusqlite::params![id_str, at_str],
            )?;
            Ok(Some(true))
          }
        }
      })
      .await?;

    changed.ok_or_else(|| margin_core::Error::AnnotationNotFound(id).into())
  }

  // ── Moderation ────────────────────────────────────────────────────────────

  async fn hide(&self, id: Uuid) -> Result<bool> { self.set_hidden(id, true).await }

  async fn unhide(&self, id: Uuid) -> Result<bool> { self.set_hidden(id, false).await }

  // ── Tokens ────────────────────────────────────────────────────────────────

  async fn add_token(&self, userid: &str, token_hash: &str) -> Result<()> {
    let userid = userid.to_owned();
    let token_hash = token_hash.to_owned();
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO tokens (token_hash, userid, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![token_hash, userid, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn user_for_token(&self, token_hash: &str) -> Result<Option<String>> {
    let token_hash = token_hash.to_owned();

    let userid: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT userid FROM tokens WHERE token_hash = ?1",
            rusqlite::params![token_hash],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    Ok(userid)
  }
}
