//! Events published after an annotation change has been committed.

use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventAction {
  Create,
  Update,
  Delete,
}

/// Announces that an annotation changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationEvent {
  pub annotation_id: Uuid,
  pub action:        EventAction,
}

impl AnnotationEvent {
  pub fn update(annotation_id: Uuid) -> Self {
    Self { annotation_id, action: EventAction::Update }
  }

  pub fn delete(annotation_id: Uuid) -> Self {
    Self { annotation_id, action: EventAction::Delete }
  }
}
