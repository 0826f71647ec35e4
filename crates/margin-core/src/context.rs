//! Context objects: a resource bundled with whatever is needed to compute
//! its permissions and links.
//!
//! Handlers load the context for the resource named in the request and then
//! check permissions against [`AnnotationContext::rules`] or
//! [`GroupContext::rules`]. Everything here is computed on demand; nothing
//! is cached.

use crate::{
  acl::{Rule, build_rules},
  annotation::Annotation,
  group::Group,
  links::{LinkBuilder, Links},
  organization::Organization,
};

// ─── Annotation ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AnnotationContext {
  pub annotation: Annotation,
  /// The annotation's group, `None` if it no longer exists.
  group:          Option<Group>,
}

impl AnnotationContext {
  pub fn new(annotation: Annotation, group: Option<Group>) -> Self { Self { annotation, group } }

  pub fn group(&self) -> Option<&Group> { self.group.as_ref() }

  pub fn rules(&self) -> Vec<Rule> { build_rules(&self.annotation, &self.group) }

  pub fn links(&self, links: &LinkBuilder) -> Links { links.annotation(&self.annotation) }
}

// ─── Group ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GroupContext {
  pub group:    Group,
  organization: Option<Organization>,
}

impl GroupContext {
  pub fn new(group: Group, organization: Option<Organization>) -> Self {
    Self { group, organization }
  }

  pub fn id(&self) -> &str { &self.group.pubid }

  pub fn links(&self, links: &LinkBuilder) -> Links { links.group(&self.group) }

  pub fn organization(&self) -> Option<OrganizationContext<'_>> {
    self.organization.as_ref().map(OrganizationContext::new)
  }

  pub fn rules(&self) -> Vec<Rule> { self.group.rules() }
}

// ─── Organization ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct OrganizationContext<'a> {
  pub organization: &'a Organization,
}

impl<'a> OrganizationContext<'a> {
  pub fn new(organization: &'a Organization) -> Self { Self { organization } }

  pub fn id(&self) -> &str { &self.organization.pubid }

  pub fn is_default(&self) -> bool { self.organization.is_default() }

  pub fn logo(&self, links: &LinkBuilder) -> Option<String> {
    links.organization_logo(self.organization)
  }

  // Organizations expose no links yet.
  pub fn links(&self) -> Links { Links::new() }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::{
    acl::{Action, Principal, permits},
    group::ReadableBy,
    organization::DEFAULT_ORGANIZATION_PUBID,
  };

  fn annotation(shared: bool) -> Annotation {
    Annotation {
      id: Uuid::new_v4(),
      userid: "acct:alice@example.com".into(),
      groupid: "abc123".into(),
      shared,
      deleted: false,
      target_uri: "https://example.org/page".into(),
      text: "nice".into(),
      created_at: Utc::now(),
      updated_at: Utc::now(),
      moderation: None,
    }
  }

  fn group() -> Group {
    Group {
      pubid: "abc123".into(),
      name: "Book Club".into(),
      authority: "example.com".into(),
      creator: Some("acct:bob@example.com".into()),
      organization: Some(DEFAULT_ORGANIZATION_PUBID.into()),
      readable_by: ReadableBy::Members,
      created_at: Utc::now(),
    }
  }

  fn organization(logo: Option<&str>) -> Organization {
    Organization {
      pubid: DEFAULT_ORGANIZATION_PUBID.into(),
      name: "Margin".into(),
      authority: "example.com".into(),
      logo: logo.map(str::to_owned),
      created_at: Utc::now(),
    }
  }

  #[test]
  fn shared_annotation_moderated_by_group_creator() {
    let ctx = AnnotationContext::new(annotation(true), Some(group()));
    let rules = ctx.rules();
    assert!(permits(&rules, &[Principal::user("acct:bob@example.com")], Action::Moderate));
    assert!(!permits(&rules, &[Principal::user("acct:alice@example.com")], Action::Moderate));
    assert!(permits(&rules, &[Principal::user("acct:alice@example.com")], Action::Delete));
  }

  #[test]
  fn annotation_in_missing_group_is_owner_admin_only() {
    let ctx = AnnotationContext::new(annotation(true), None);
    assert!(ctx.group().is_none());
    let rules = ctx.rules();
    assert!(!permits(&rules, &[Principal::group("abc123")], Action::Read));
    assert!(permits(&rules, &[Principal::user("acct:alice@example.com")], Action::Update));
  }

  #[test]
  fn deleted_annotation_is_closed_to_everybody() {
    let mut a = annotation(false);
    a.deleted = true;
    let ctx = AnnotationContext::new(a, Some(group()));
    assert_eq!(ctx.rules(), vec![Rule::deny_all()]);
  }

  #[test]
  fn annotation_links_use_base_url() {
    let ctx = AnnotationContext::new(annotation(true), None);
    let links = ctx.links(&LinkBuilder::new("https://margin.test"));
    let id = ctx.annotation.id;
    assert_eq!(links["json"], format!("https://margin.test/api/annotations/{id}"));
    assert_eq!(links["html"], format!("https://margin.test/a/{id}"));
  }

  #[test]
  fn group_context_exposes_organization() {
    let ctx = GroupContext::new(group(), Some(organization(Some("<svg/>"))));
    assert_eq!(ctx.id(), "abc123");
    assert_eq!(
      ctx.links(&LinkBuilder::new("https://margin.test"))["html"],
      "https://margin.test/groups/abc123/book-club"
    );

    let org = ctx.organization().expect("organization");
    assert!(org.is_default());
    assert!(org.links().is_empty());
    assert_eq!(
      org.logo(&LinkBuilder::new("https://margin.test")).as_deref(),
      Some("https://margin.test/api/organizations/__default__/logo")
    );
  }

  #[test]
  fn organization_without_logo_has_no_logo_url() {
    let org = organization(None);
    let ctx = OrganizationContext::new(&org);
    assert_eq!(ctx.logo(&LinkBuilder::new("https://margin.test")), None);
  }

  #[test]
  fn group_without_organization() {
    let mut g = group();
    g.organization = None;
    assert!(GroupContext::new(g, None).organization().is_none());
  }
}
