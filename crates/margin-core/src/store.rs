//! The `AnnotationStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `margin-store-sqlite`).
//! Higher layers (`margin-api`, `margin-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  annotation::{Annotation, NewAnnotation},
  group::{Group, NewGroup},
  organization::{NewOrganization, Organization},
};

/// Abstraction over a Margin storage backend.
///
/// Each write is committed before the returned future resolves, so callers
/// may publish events for it as soon as it returns `Ok`.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait AnnotationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Organizations ─────────────────────────────────────────────────────

  fn add_organization(
    &self,
    input: NewOrganization,
  ) -> impl Future<Output = Result<Organization, Self::Error>> + Send + '_;

  /// Retrieve an organization by pubid. Returns `None` if not found.
  fn get_organization<'a>(
    &'a self,
    pubid: &'a str,
  ) -> impl Future<Output = Result<Option<Organization>, Self::Error>> + Send + 'a;

  // ── Groups ────────────────────────────────────────────────────────────

  /// Create a group with a fresh pubid. The creator, if any, becomes its
  /// first member.
  fn add_group(&self, input: NewGroup) -> impl Future<Output = Result<Group, Self::Error>> + Send + '_;

  /// Retrieve a group by pubid. Returns `None` if not found.
  fn get_group<'a>(
    &'a self,
    pubid: &'a str,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + 'a;

  /// Add `userid` to a group. Adding an existing member is a no-op.
  fn add_member<'a>(
    &'a self,
    pubid: &'a str,
    userid: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Pubids of every group `userid` belongs to.
  fn memberships<'a>(
    &'a self,
    userid: &'a str,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'a;

  // ── Annotations ───────────────────────────────────────────────────────

  fn add_annotation(
    &self,
    input: NewAnnotation,
  ) -> impl Future<Output = Result<Annotation, Self::Error>> + Send + '_;

  /// Retrieve an annotation by id, including soft-deleted ones. Returns
  /// `None` if not found.
  fn get_annotation(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Annotation>, Self::Error>> + Send + '_;

  /// Mark an annotation deleted. Returns `true` if it was not already.
  fn delete_annotation(&self, id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Moderation ────────────────────────────────────────────────────────

  /// Hide an annotation. Returns `true` if it was visible before; hiding a
  /// hidden annotation changes nothing.
  fn hide(&self, id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Unhide an annotation. Returns `true` if it was hidden before.
  fn unhide(&self, id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Tokens ────────────────────────────────────────────────────────────

  /// Record a bearer token for `userid` by the hex SHA-256 of its value.
  fn add_token<'a>(
    &'a self,
    userid: &'a str,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// The userid a token hash was issued to, if any.
  fn user_for_token<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;
}
