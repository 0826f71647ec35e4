//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Booleans are stored as `0` / `1`.

use chrono::{DateTime, Utc};
use margin_core::{
  annotation::{Annotation, Moderation},
  group::{Group, ReadableBy},
  organization::Organization,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ReadableBy
// ───────────────────────────────────────────────────────────────

pub fn encode_readable_by(r: ReadableBy) -> &'static str {
  match r {
    ReadableBy::World => "world",
    ReadableBy::Members => "members",
  }
}

pub fn decode_readable_by(s: &str) -> Result<ReadableBy> {
  match s {
    "world" => Ok(ReadableBy::World),
    "members" => Ok(ReadableBy::Members),
    other => Err(margin_core::Error::UnknownReadableBy(other.to_owned()).into()),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from an `organizations` row.
pub struct RawOrganization {
  pub pubid:      String,
  pub name:       String,
  pub authority:  String,
  pub logo:       Option<String>,
  pub created_at: String,
}

impl RawOrganization {
  pub const COLUMNS: &'static str = "pubid, name, authority, logo, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      pubid:      row.get(0)?,
      name:       row.get(1)?,
      authority:  row.get(2)?,
      logo:       row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_organization(self) -> Result<Organization> {
    Ok(Organization {
      pubid:      self.pubid,
      name:       self.name,
      authority:  self.authority,
      logo:       self.logo,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from a `groups` row.
pub struct RawGroup {
  pub pubid:        String,
  pub name:         String,
  pub authority:    String,
  pub creator:      Option<String>,
  pub organization: Option<String>,
  pub readable_by:  String,
  pub created_at:   String,
}

impl RawGroup {
  pub const COLUMNS: &'static str =
    "pubid, name, authority, creator, organization, readable_by, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      pubid:        row.get(0)?,
      name:         row.get(1)?,
      authority:    row.get(2)?,
      creator:      row.get(3)?,
      organization: row.get(4)?,
      readable_by:  row.get(5)?,
      created_at:   row.get(6)?,
    })
  }

  pub fn into_group(self) -> Result<Group> {
    Ok(Group {
      pubid:        self.pubid,
      name:         self.name,
      authority:    self.authority,
      creator:      self.creator,
      organization: self.organization,
      readable_by:  decode_readable_by(&self.readable_by)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from an `annotations` row left-joined with
/// `annotation_moderation`.
pub struct RawAnnotation {
  pub id:         String,
  pub userid:     String,
  pub groupid:    String,
  pub shared:     bool,
  pub deleted:    bool,
  pub target_uri: String,
  pub text:       String,
  pub created_at: String,
  pub updated_at: String,
  pub hidden_at:  Option<String>,
}

impl RawAnnotation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      userid:     row.get(1)?,
      groupid:    row.get(2)?,
      shared:     row.get(3)?,
      deleted:    row.get(4)?,
      target_uri: row.get(5)?,
      text:       row.get(6)?,
      created_at: row.get(7)?,
      updated_at: row.get(8)?,
      hidden_at:  row.get(9)?,
    })
  }

  pub fn into_annotation(self) -> Result<Annotation> {
    let moderation = self
      .hidden_at
      .as_deref()
      .map(decode_dt)
      .transpose()?
      .map(|hidden_at| Moderation { hidden_at });

    Ok(Annotation {
      id: decode_uuid(&self.id)?,
      userid: self.userid,
      groupid: self.groupid,
      shared: self.shared,
      deleted: self.deleted,
      target_uri: self.target_uri,
      text: self.text,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      moderation,
    })
  }
}
