//! Annotations and their moderation state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::acl::{AccessSubject, Principal};

/// Records that a moderator hid an annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moderation {
  pub hidden_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
  pub id:         Uuid,
  /// Userid of the creator.
  pub userid:     String,
  /// Pubid of the group the annotation was made in.
  pub groupid:    String,
  /// `false` for annotations visible only to their creator.
  pub shared:     bool,
  /// Soft-deletion flag. Deleted annotations are kept but inaccessible.
  pub deleted:    bool,
  pub target_uri: String,
  pub text:       String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub moderation: Option<Moderation>,
}

impl Annotation {
  pub fn is_hidden(&self) -> bool { self.moderation.is_some() }
}

impl AccessSubject for Annotation {
  fn owner(&self) -> Principal { Principal::user(&self.userid) }

  fn is_shared(&self) -> bool { self.shared }

  fn is_deleted(&self) -> bool { self.deleted }

  fn group_id(&self) -> &str { &self.groupid }
}

/// Input for [`AnnotationStore::add_annotation`](crate::store::AnnotationStore::add_annotation).
#[derive(Debug, Clone)]
pub struct NewAnnotation {
  pub userid:     String,
  pub groupid:    String,
  pub shared:     bool,
  pub target_uri: String,
  pub text:       String,
}

impl NewAnnotation {
  /// A shared annotation in `groupid`.
  pub fn shared(userid: &str, groupid: &str, target_uri: &str) -> Self {
    Self {
      userid:     userid.to_owned(),
      groupid:    groupid.to_owned(),
      shared:     true,
      target_uri: target_uri.to_owned(),
      text:       String::new(),
    }
  }

  /// A private annotation in `groupid`.
  pub fn private(userid: &str, groupid: &str, target_uri: &str) -> Self {
    Self { shared: false, ..Self::shared(userid, groupid, target_uri) }
  }

  pub fn with_text(mut self, text: impl Into<String>) -> Self {
    self.text = text.into();
    self
  }
}
