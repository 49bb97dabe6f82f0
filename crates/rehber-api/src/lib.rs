//! JSON/CSV REST API for the rehber directory.
//!
//! Exposes an axum [`Router`] backed by any
//! [`rehber_core::store::DirectoryStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rehber_api::api_router(store.clone()))
//! ```

pub mod contacts;
pub mod error;
pub mod groups;
pub mod tags;
pub mod transfer;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use rehber_core::store::DirectoryStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: DirectoryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Contacts
    .route(
      "/contacts",
      get(contacts::list::<S>).post(contacts::create::<S>),
    )
    .route("/contacts/delete", post(contacts::delete_many::<S>))
    .route("/contacts/assign-group", post(contacts::assign_group::<S>))
    .route(
      "/contacts/unassign-group",
      post(contacts::unassign_group::<S>),
    )
    .route("/contacts/assign-tag", post(contacts::assign_tag::<S>))
    .route("/contacts/unassign-tag", post(contacts::unassign_tag::<S>))
    .route(
      "/contacts/{id}",
      get(contacts::get_one::<S>)
        .patch(contacts::update_one::<S>)
        .delete(contacts::delete_one::<S>),
    )
    .route(
      "/contacts/{id}/interaction",
      post(contacts::record_interaction::<S>),
    )
    // Groups
    .route("/groups", get(groups::list::<S>).post(groups::create::<S>))
    .route(
      "/groups/{id}",
      get(groups::get_one::<S>)
        .patch(groups::update_one::<S>)
        .delete(groups::delete_one::<S>),
    )
    // Tags
    .route("/tags", get(tags::list::<S>).post(tags::create::<S>))
    .route(
      "/tags/{id}",
      get(tags::get_one::<S>)
        .patch(tags::update_one::<S>)
        .delete(tags::delete_one::<S>),
    )
    // Import / export
    .route("/import", post(transfer::import::<S>))
    .route("/export", get(transfer::export::<S>))
    .with_state(store)
}
