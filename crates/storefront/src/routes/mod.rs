//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                              - Health check
//!
//! # Cart entries (base: /{site_id}/users/{user_id}/carts/{cart_id})
//! GET    /entries                   - List entries
//! POST   /entries                   - Add a product
//! GET    /entries/{entry_number}    - Get one entry
//! PUT    /entries/{entry_number}    - Replace quantity and pickup location
//! PATCH  /entries/{entry_number}    - Update quantity and pickup location
//! DELETE /entries/{entry_number}    - Remove an entry
//!
//! # Entry groups
//! POST   /entrygroups/{group}       - Add a product to an entry group
//! DELETE /entrygroups/{group}       - Remove an entry group
//! ```
//!
//! Reads and mutations accept `?fields=` (see [`crate::fields`]).

pub mod dto;
pub mod entries;
pub mod entry_groups;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Base path of a cart.
pub const CART_BASE_PATH: &str = "/{site_id}/users/{user_id}/carts/{cart_id}";

/// Create the cart entry routes router.
pub fn entry_routes() -> Router<AppState> {
    Router::new()
        .route(
            &format!("{CART_BASE_PATH}/entries"),
            get(entries::list).post(entries::create),
        )
        .route(
            &format!("{CART_BASE_PATH}/entries/{{entry_number}}"),
            get(entries::show)
                .put(entries::replace)
                .patch(entries::update)
                .delete(entries::delete),
        )
}

/// Create the entry group routes router.
pub fn entry_group_routes() -> Router<AppState> {
    Router::new().route(
        &format!("{CART_BASE_PATH}/entrygroups/{{group}}"),
        axum::routing::post(entry_groups::add).delete(entry_groups::remove),
    )
}

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(entry_routes())
        .merge(entry_group_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the platform.
async fn health() -> &'static str {
    "ok"
}
