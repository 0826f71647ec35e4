//! Handlers for `/annotations/:id/hide`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `PUT`    | `/annotations/:id/hide` | Hide as a group moderator; 204 |
//! | `DELETE` | `/annotations/:id/hide` | Unhide as a group moderator; 204 |
//!
//! Both require the `moderate` permission and answer 404 without it. Both
//! are idempotent.

use axum::{
  extract::{Path, State},
  http::StatusCode,
};
use margin_core::{acl::Action, event::AnnotationEvent, store::AnnotationStore};

use crate::{AppState, error::ApiError, requester::Requester, resources};

pub const PRIVATE_ANNOTATION_REASON: &str = "Private annotations cannot be moderated";

#[derive(Debug, Clone, Copy)]
enum Toggle {
  Hide,
  Unhide,
}

/// `PUT /annotations/:id/hide`
pub async fn hide<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  requester: Requester,
) -> Result<StatusCode, ApiError>
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  toggle(&state, &requester, &id, Toggle::Hide).await
}

/// `DELETE /annotations/:id/hide`
pub async fn unhide<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  requester: Requester,
) -> Result<StatusCode, ApiError>
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  toggle(&state, &requester, &id, Toggle::Unhide).await
}

async fn toggle<S>(
  state: &AppState<S>,
  requester: &Requester,
  id: &str,
  toggle: Toggle,
) -> Result<StatusCode, ApiError>
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let context = resources::annotation(state, id).await?;
  requester.require(&context.rules(), Action::Moderate)?;

  // A private annotation's owner holds `moderate`, but there is nobody to
  // hide it from.
  if !context.annotation.shared {
    return Err(ApiError::MethodNotAllowed(PRIVATE_ANNOTATION_REASON.to_owned()));
  }

  let id = context.annotation.id;
  let changed = match toggle {
    Toggle::Hide => state.store.hide(id).await,
    Toggle::Unhide => state.store.unhide(id).await,
  }
  .map_err(ApiError::store)?;

  tracing::info!(annotation = %id, ?toggle, changed, userid = ?requester.userid, "moderation");
  if changed {
    state.publish(AnnotationEvent::update(id));
  }

  Ok(StatusCode::NO_CONTENT)
}
