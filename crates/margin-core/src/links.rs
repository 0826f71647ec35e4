//! URL generation for API responses.

use std::collections::BTreeMap;

use crate::{annotation::Annotation, group::Group, organization::Organization};

/// Named links of a resource, e.g. `{"html": "https://…"}`.
pub type Links = BTreeMap<String, String>;

/// Builds absolute URLs for resources from the service's public base URL.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
  base_url: String,
}

impl LinkBuilder {
  pub fn new(base_url: impl Into<String>) -> Self {
    let base_url = base_url.into().trim_end_matches('/').to_owned();
    Self { base_url }
  }

  pub fn annotation(&self, annotation: &Annotation) -> Links {
    let id = annotation.id;
    let base = &self.base_url;
    Links::from([
      ("html".to_owned(), format!("{base}/a/{id}")),
      ("incontext".to_owned(), format!("{base}/go/{id}/{}", annotation.target_uri)),
      ("json".to_owned(), format!("{base}/api/annotations/{id}")),
    ])
  }

  pub fn group(&self, group: &Group) -> Links {
    Links::from([(
      "html".to_owned(),
      format!("{}/groups/{}/{}", self.base_url, group.pubid, slugify(&group.name)),
    )])
  }

  /// The logo route of `organization`, or `None` if it has no logo.
  pub fn organization_logo(&self, organization: &Organization) -> Option<String> {
    organization
      .logo
      .as_ref()
      .map(|_| format!("{}/api/organizations/{}/logo", self.base_url, organization.pubid))
  }
}

/// Lowercase `name`, collapsing every run of non-alphanumerics into `-`.
fn slugify(name: &str) -> String {
  let mut slug = String::with_capacity(name.len());
  for c in name.chars() {
    if c.is_alphanumeric() {
      slug.extend(c.to_lowercase());
    } else if !slug.is_empty() && !slug.ends_with('-') {
      slug.push('-');
    }
  }
  slug.trim_end_matches('-').to_owned()
}
