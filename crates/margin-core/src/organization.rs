//! Organizations — the owners of groups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pubid of the organization groups belong to when none is given.
pub const DEFAULT_ORGANIZATION_PUBID: &str = "__default__";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
  pub pubid:      String,
  pub name:       String,
  pub authority:  String,
  /// Raw SVG markup; served from the organization's logo route.
  pub logo:       Option<String>,
  pub created_at: DateTime<Utc>,
}

impl Organization {
  pub fn is_default(&self) -> bool { self.pubid == DEFAULT_ORGANIZATION_PUBID }
}

/// Input for [`AnnotationStore::add_organization`](crate::store::AnnotationStore::add_organization).
#[derive(Debug, Clone)]
pub struct NewOrganization {
  pub name:      String,
  pub authority: String,
  pub logo:      Option<String>,
}
