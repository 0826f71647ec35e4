//! Handlers for `/groups` and `/organizations`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/groups/:pubid` | Requires `read` on the group |
//! | `GET`  | `/organizations/:pubid/logo` | SVG; 404 if the organization has none |

use axum::{
  Json,
  extract::{Path, State},
  http::header,
  response::IntoResponse,
};
use margin_core::{
  acl::Action,
  context::{GroupContext, OrganizationContext},
  links::{LinkBuilder, Links},
  store::AnnotationStore,
};
use serde::Serialize;

use crate::{AppState, error::ApiError, requester::Requester, resources};

#[derive(Debug, Serialize)]
pub struct OrganizationJson {
  pub id:      String,
  pub name:    String,
  pub default: bool,
  pub logo:    Option<String>,
}

impl OrganizationJson {
  pub fn new(context: OrganizationContext<'_>, links: &LinkBuilder) -> Self {
    Self {
      id:      context.id().to_owned(),
      name:    context.organization.name.clone(),
      default: context.is_default(),
      logo:    context.logo(links),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct GroupJson {
  pub id:           String,
  pub name:         String,
  pub links:        Links,
  pub organization: Option<OrganizationJson>,
}

impl GroupJson {
  pub fn new(context: &GroupContext, links: &LinkBuilder) -> Self {
    Self {
      id:           context.id().to_owned(),
      name:         context.group.name.clone(),
      links:        context.links(links),
      organization: context.organization().map(|org| OrganizationJson::new(org, links)),
    }
  }
}

/// `GET /groups/:pubid`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(pubid): Path<String>,
  requester: Requester,
) -> Result<Json<GroupJson>, ApiError>
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let context = resources::group(&state, &pubid).await?;
  requester.require(&context.rules(), Action::Read)?;
  Ok(Json(GroupJson::new(&context, &state.links)))
}

/// `GET /organizations/:pubid/logo`
pub async fn organization_logo<S>(
  State(state): State<AppState<S>>,
  Path(pubid): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let logo = state
    .store
    .get_organization(&pubid)
    .await
    .map_err(ApiError::store)?
    .and_then(|org| org.logo)
    .ok_or(ApiError::NotFound)?;
  Ok(([(header::CONTENT_TYPE, "image/svg+xml")], logo))
}
