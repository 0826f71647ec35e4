//! JSON REST API for Margin.
//!
//! Exposes an axum [`Router`] backed by any
//! [`margin_core::store::AnnotationStore`]. Every handler loads the context of
//! the resource it acts on, checks the requester's principals against the
//! context's rule list, and answers 404 when the check fails. TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", margin_api::api_router(state.clone()))
//! ```

pub mod annotations;
pub mod error;
pub mod groups;
pub mod moderation;
pub mod requester;
pub mod resources;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, put},
};
use margin_core::{event::AnnotationEvent, links::LinkBuilder, store::AnnotationStore};
use tokio::sync::broadcast;

pub use error::ApiError;
pub use requester::{Requester, hash_token};

/// Events buffered per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 256;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: AnnotationStore> {
  pub store:  Arc<S>,
  pub links:  Arc<LinkBuilder>,
  /// Annotation events, sent only after the change they describe is stored.
  pub events: broadcast::Sender<AnnotationEvent>,
}

impl<S: AnnotationStore> AppState<S> {
  pub fn new(store: Arc<S>, links: LinkBuilder) -> Self {
    let (events, _) = broadcast::channel(EVENT_CAPACITY);
    Self { store, links: Arc::new(links), events }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<AnnotationEvent> { self.events.subscribe() }

  /// Publish a committed change. Having no subscribers is not an error.
  pub fn publish(&self, event: AnnotationEvent) {
    if self.events.send(event).is_err() {
      tracing::debug!("annotation event dropped: no subscribers");
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Annotations
    .route("/annotations/{id}", get(annotations::get_one::<S>).delete(annotations::delete_one::<S>))
    .route("/annotations/{id}/hide", put(moderation::hide::<S>).delete(moderation::unhide::<S>))
    // Groups
    .route("/groups/{pubid}", get(groups::get_one::<S>))
    .route("/organizations/{pubid}/logo", get(groups::organization_logo::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
