//! Loading the context for the resource named in a request path.

use margin_core::{
  context::{AnnotationContext, GroupContext},
  store::AnnotationStore,
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Load an annotation and its group. Unparseable ids are reported exactly
/// like missing annotations.
pub async fn annotation<S>(state: &AppState<S>, id: &str) -> Result<AnnotationContext, ApiError>
where
  S: AnnotationStore,
{
  let id = Uuid::parse_str(id).map_err(|_| ApiError::NotFound)?;
  let annotation = state
    .store
    .get_annotation(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound)?;
  let group = state.store.get_group(&annotation.groupid).await.map_err(ApiError::store)?;
  Ok(AnnotationContext::new(annotation, group))
}

/// Load a group and its organization.
pub async fn group<S>(state: &AppState<S>, pubid: &str) -> Result<GroupContext, ApiError>
where
  S: AnnotationStore,
{
  let group = state
    .store
    .get_group(pubid)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound)?;
  let organization = match &group.organization {
    Some(org) => state.store.get_organization(org).await.map_err(ApiError::store)?,
    None => None,
  };
  Ok(GroupContext::new(group, organization))
}
