//! Handlers for `/annotations/:id`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/annotations/:id` | Requires `read` |
//! | `DELETE` | `/annotations/:id` | Requires `delete`; soft delete |

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::{DateTime, Utc};
use margin_core::{
  acl::Action,
  context::AnnotationContext,
  event::AnnotationEvent,
  links::{LinkBuilder, Links},
  store::AnnotationStore,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, requester::Requester, resources};

// ─── Presentation ─────────────────────────────────────────────────────────────

/// JSON form of an annotation.
#[derive(Debug, Serialize)]
pub struct AnnotationJson {
  pub id:         Uuid,
  pub user:       String,
  pub group:      String,
  pub shared:     bool,
  pub hidden:     bool,
  pub target_uri: String,
  pub text:       String,
  pub created:    DateTime<Utc>,
  pub updated:    DateTime<Utc>,
  pub links:      Links,
}

impl AnnotationJson {
  pub fn new(context: &AnnotationContext, links: &LinkBuilder) -> Self {
    let a = &context.annotation;
    Self {
      id:         a.id,
      user:       a.userid.clone(),
      group:      a.groupid.clone(),
      shared:     a.shared,
      hidden:     a.is_hidden(),
      target_uri: a.target_uri.clone(),
      text:       a.text.clone(),
      created:    a.created_at,
      updated:    a.updated_at,
      links:      context.links(links),
    }
  }
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /annotations/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  requester: Requester,
) -> Result<Json<AnnotationJson>, ApiError>
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let context = resources::annotation(&state, &id).await?;
  requester.require(&context.rules(), Action::Read)?;
  Ok(Json(AnnotationJson::new(&context, &state.links)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DeletedJson {
  pub id:      Uuid,
  pub deleted: bool,
}

/// `DELETE /annotations/:id`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  requester: Requester,
) -> Result<Json<DeletedJson>, ApiError>
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let context = resources::annotation(&state, &id).await?;
  requester.require(&context.rules(), Action::Delete)?;

  let id = context.annotation.id;
  if state.store.delete_annotation(id).await.map_err(ApiError::store)? {
    state.publish(AnnotationEvent::delete(id));
  }
  Ok(Json(DeletedJson { id, deleted: true }))
}
