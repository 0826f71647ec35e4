//! Integration tests for `SqliteStore` against an in-memory database.

use margin_core::{
  annotation::NewAnnotation,
  group::{NewGroup, ReadableBy, WORLD_GROUP_PUBID},
  organization::{DEFAULT_ORGANIZATION_PUBID, NewOrganization},
  store::AnnotationStore,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

const ALICE: &str = "acct:alice@example.com";
const BOB: &str = "acct:bob@example.com";

// ─── Seed data ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn world_group_and_default_organization_exist() {
  let s = store().await;

  let world = s.get_group(WORLD_GROUP_PUBID).await.unwrap().expect("world group");
  assert_eq!(world.readable_by, ReadableBy::World);
  assert!(world.creator.is_none());
  assert_eq!(world.organization.as_deref(), Some(DEFAULT_ORGANIZATION_PUBID));

  let org = s.get_organization(DEFAULT_ORGANIZATION_PUBID).await.unwrap().expect("default org");
  assert!(org.is_default());
}

// ─── Organizations ───────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_organization() {
  let s = store().await;
  let org = s
    .add_organization(NewOrganization {
      name:      "ACME".into(),
      authority: "example.com".into(),
      logo:      Some("<svg/>".into()),
    })
    .await
    .unwrap();

  let fetched = s.get_organization(&org.pubid).await.unwrap().unwrap();
  assert_eq!(fetched.name, "ACME");
  assert_eq!(fetched.logo.as_deref(), Some("<svg/>"));
  assert!(!fetched.is_default());
}

#[tokio::test]
async fn get_organization_missing_returns_none() {
  let s = store().await;
  assert!(s.get_organization("nope").await.unwrap().is_none());
}

// ─── Groups ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_group_makes_creator_a_member() {
  let s = store().await;
  let group = s.add_group(NewGroup::private("Book Club", "example.com", ALICE)).await.unwrap();
  assert_eq!(group.pubid.len(), 8);

  let fetched = s.get_group(&group.pubid).await.unwrap().unwrap();
  assert_eq!(fetched, group);

  assert_eq!(s.memberships(ALICE).await.unwrap(), vec![group.pubid.clone()]);
  assert!(s.memberships(BOB).await.unwrap().is_empty());
}

#[tokio::test]
async fn add_member_is_idempotent() {
  let s = store().await;
  let group = s.add_group(NewGroup::open("Open", "example.com", ALICE)).await.unwrap();

  s.add_member(&group.pubid, BOB).await.unwrap();
  s.add_member(&group.pubid, BOB).await.unwrap();
  assert_eq!(s.memberships(BOB).await.unwrap(), vec![group.pubid]);
}

#[tokio::test]
async fn add_member_to_missing_group_fails() {
  let s = store().await;
  let err = s.add_member("missing", BOB).await.unwrap_err();
  assert!(matches!(err, Error::Core(margin_core::Error::GroupNotFound(_))), "{err}");
}

// ─── Annotations ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_annotation() {
  let s = store().await;
  let added = s
    .add_annotation(
      NewAnnotation::shared(ALICE, WORLD_GROUP_PUBID, "https://example.org").with_text("hello"),
    )
    .await
    .unwrap();

  let fetched = s.get_annotation(added.id).await.unwrap().unwrap();
  assert_eq!(fetched.userid, ALICE);
  assert_eq!(fetched.text, "hello");
  assert!(fetched.shared);
  assert!(!fetched.deleted);
  assert!(!fetched.is_hidden());
}

#[tokio::test]
async fn get_annotation_missing_returns_none() {
  let s = store().await;
  assert!(s.get_annotation(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_annotation_is_soft_and_reports_changes() {
  let s = store().await;
  let a = s
    .add_annotation(NewAnnotation::private(ALICE, WORLD_GROUP_PUBID, "https://example.org"))
    .await
    .unwrap();

  assert!(s.delete_annotation(a.id).await.unwrap());
  assert!(!s.delete_annotation(a.id).await.unwrap());

  let fetched = s.get_annotation(a.id).await.unwrap().expect("still stored");
  assert!(fetched.deleted);
}

#[tokio::test]
async fn delete_missing_annotation_fails() {
  let s = store().await;
  let err = s.delete_annotation(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::Core(margin_core::Error::AnnotationNotFound(_))), "{err}");
}

// ─── Moderation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn hide_and_unhide_are_idempotent() {
  let s = store().await;
  let a = s
    .add_annotation(NewAnnotation::shared(ALICE, WORLD_GROUP_PUBID, "https://example.org"))
    .await
    .unwrap();

  assert!(s.hide(a.id).await.unwrap());
  assert!(!s.hide(a.id).await.unwrap());
  let hidden = s.get_annotation(a.id).await.unwrap().unwrap();
  assert!(hidden.is_hidden());

  assert!(s.unhide(a.id).await.unwrap());
  assert!(!s.unhide(a.id).await.unwrap());
  let visible = s.get_annotation(a.id).await.unwrap().unwrap();
  assert!(visible.moderation.is_none());
}

#[tokio::test]
async fn hide_missing_annotation_fails() {
  let s = store().await;
  let err = s.hide(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::Core(margin_core::Error::AnnotationNotFound(_))), "{err}");
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn tokens_resolve_to_their_user() {
  let s = store().await;
  s.add_token(ALICE, "deadbeef").await.unwrap();

  assert_eq!(s.user_for_token("deadbeef").await.unwrap().as_deref(), Some(ALICE));
  assert!(s.user_for_token("cafebabe").await.unwrap().is_none());
}
