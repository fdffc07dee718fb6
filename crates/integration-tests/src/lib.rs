//! Integration tests for the cart entry API.
//!
//! Tests drive the full router (middleware included) in process through
//! `tower::ServiceExt::oneshot`, backed by the in-memory platform.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cart-entries-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use cart_entries_core::{Cart, CartEntry, CartId, EntryNumber, LocationName, ProductCode, UserId};
use cart_entries_storefront::config::StorefrontConfig;
use cart_entries_storefront::platform::{CartKey, InMemoryCartFacade, InMemoryStockFacade};
use cart_entries_storefront::state::AppState;

/// Site used by all tests.
pub const SITE: &str = "electronics";
/// User owning the test cart.
pub const USER: &str = "anonymous";
/// Test cart identifier.
pub const CART: &str = "cart-1";

/// Key of the test cart.
#[must_use]
pub fn cart_key() -> CartKey {
    CartKey::new(UserId::parse(USER).unwrap(), CartId::parse(CART).unwrap())
}

/// Path of the test cart's entries, with `suffix` appended.
#[must_use]
pub fn entries_path(suffix: &str) -> String {
    format!("/{SITE}/users/{USER}/carts/{CART}/entries{suffix}")
}

/// Path of an entry group of the test cart.
#[must_use]
pub fn entry_group_path(group: &str) -> String {
    format!("/{SITE}/users/{USER}/carts/{CART}/entrygroups/{group}")
}

/// Build a cart entry.
#[must_use]
pub fn entry(number: u32, code: &str, quantity: u64, location: Option<&str>) -> CartEntry {
    CartEntry::new(
        EntryNumber::new(number),
        ProductCode::parse(code).unwrap(),
        quantity,
        location.map(|name| LocationName::parse(name).unwrap()),
    )
}

/// Response status and JSON body (`Value::Null` when empty).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub request_id: Option<String>,
    pub body: Value,
}

/// In-process application with inspectable platform state.
pub struct TestContext {
    pub carts: Arc<InMemoryCartFacade>,
    pub router: Router,
}

impl TestContext {
    /// Create an application around the given platform backends.
    #[must_use]
    pub fn new(carts: InMemoryCartFacade, stock: InMemoryStockFacade) -> Self {
        let carts = Arc::new(carts);
        let state = AppState::new(
            StorefrontConfig::default(),
            carts.clone(),
            Arc::new(stock),
        );
        Self {
            carts,
            router: cart_entries_storefront::app(state),
        }
    }

    /// Create an application whose test cart holds `entries`.
    #[must_use]
    pub fn with_entries(entries: Vec<CartEntry>, stock: InMemoryStockFacade) -> Self {
        let carts = InMemoryCartFacade::new().with_entry_groups().with_cart(
            cart_key(),
            Cart {
                id: cart_key().cart,
                entries,
            },
        );
        Self::new(carts, stock)
    }

    /// Send a request with an optional JSON body.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .map(|value| value.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            request_id,
            body,
        }
    }

    /// Current entries of the test cart.
    pub async fn entries(&self) -> Vec<CartEntry> {
        use cart_entries_storefront::platform::CartFacade;
        self.carts.session_cart(&cart_key()).await.unwrap().entries
    }
}
