//! Error types for `margin-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("annotation not found: {0}")]
  AnnotationNotFound(Uuid),

  #[error("group not found: {0}")]
  GroupNotFound(String),

  #[error("organization not found: {0}")]
  OrganizationNotFound(String),

  #[error("unknown readable_by value: {0:?}")]
  UnknownReadableBy(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
