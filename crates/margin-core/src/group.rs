//! Groups — the containers shared annotations delegate their permissions to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::acl::{Action, GroupRoleResolver, Principal, Rule, principals_allowed};

/// Pubid of the public group every authority starts with.
pub const WORLD_GROUP_PUBID: &str = "__world__";

/// Who may read annotations shared into a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadableBy {
  World,
  Members,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
  /// Web-facing unique id.
  pub pubid:        String,
  pub name:         String,
  pub authority:    String,
  /// Userid of the creator, who moderates the group. The world group has none.
  pub creator:      Option<String>,
  /// Pubid of the owning organization.
  pub organization: Option<String>,
  pub readable_by:  ReadableBy,
  pub created_at:   DateTime<Utc>,
}

impl Group {
  /// The group's own rule list.
  ///
  /// Members (or everybody, for world-readable groups) may read; members (or
  /// any authenticated user) may flag; the creator moderates and
  /// administers.
  pub fn rules(&self) -> Vec<Rule> {
    let members = Principal::group(&self.pubid);
    let (reader, flagger) = match self.readable_by {
      ReadableBy::World => (Principal::everyone(), Principal::authenticated()),
      ReadableBy::Members => (members.clone(), members),
    };

    let mut rules = vec![
      Rule::allow(reader, Action::Read),
      Rule::allow(flagger, Action::Flag),
    ];
    if let Some(creator) = &self.creator {
      rules.push(Rule::allow(Principal::user(creator), Action::Moderate));
      rules.push(Rule::allow(Principal::user(creator), Action::Admin));
    }
    rules.push(Rule::deny_all());
    rules
  }
}

impl GroupRoleResolver for Group {
  fn principals_for(&self, group_id: &str, action: Action) -> Vec<Principal> {
    if group_id != self.pubid {
      return Vec::new();
    }
    principals_allowed(&self.rules(), action)
  }
}

/// Input for [`AnnotationStore::add_group`](crate::store::AnnotationStore::add_group).
#[derive(Debug, Clone)]
pub struct NewGroup {
  pub name:         String,
  pub authority:    String,
  pub creator:      Option<String>,
  pub organization: Option<String>,
  pub readable_by:  ReadableBy,
}

impl NewGroup {
  /// A members-only group created by `creator`.
  pub fn private(name: impl Into<String>, authority: impl Into<String>, creator: &str) -> Self {
    Self {
      name:         name.into(),
      authority:    authority.into(),
      creator:      Some(creator.to_owned()),
      organization: None,
      readable_by:  ReadableBy::Members,
    }
  }

  /// A world-readable group created by `creator`.
  pub fn open(name: impl Into<String>, authority: impl Into<String>, creator: &str) -> Self {
    Self { readable_by: ReadableBy::World, ..Self::private(name, authority, creator) }
  }
}
