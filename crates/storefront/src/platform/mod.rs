//! Facades onto the commerce platform.
//!
//! # Architecture
//!
//! - The platform owns carts, stock levels and entry groups
//! - This service never caches platform state; every request refetches the cart
//! - Facades are object-safe async traits shared through `AppState`
//!
//! # Facades
//!
//! - [`CartFacade`] - Session cart access and entry mutations
//! - [`EntryGroupFacade`] - Optional entry group capability of a cart facade
//! - [`StockFacade`] - Stock system availability and stock levels
//!
//! # Example
//!
//! ```rust,ignore
//! use cart_entries_storefront::platform::{CartFacade, CartKey, InMemoryCartFacade};
//!
//! let carts = InMemoryCartFacade::new().with_entry_groups();
//! let cart = carts.session_cart(&key).await?;
//!
//! if let Some(groups) = carts.entry_groups() {
//!     groups.remove_entry_group(&key, EntryGroupNumber::new(1)).await?;
//! }
//! ```

mod memory;

pub use memory::{FixtureError, InMemoryCartFacade, InMemoryStockFacade, StockFixture};

use async_trait::async_trait;
use thiserror::Error;

use cart_entries_core::{
    Cart, CartId, EntryGroupNumber, EntryNumber, LocationName, ModificationResult, ProductCode,
    SiteId, StockStatus, UserId,
};

/// Errors that can occur when calling the commerce platform.
#[derive(Debug, Error)]
pub enum FacadeError {
    /// The addressed cart does not exist for the user.
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// The platform could not be reached or failed internally.
    #[error("Platform unavailable: {0}")]
    Unavailable(String),

    /// The platform refused the modification.
    #[error("Modification rejected: {0}")]
    Rejected(String),
}

/// Identifies a cart within a user's session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartKey {
    /// Owner of the cart.
    pub user: UserId,
    /// Cart identifier.
    pub cart: CartId,
}

impl CartKey {
    /// Create a new cart key.
    #[must_use]
    pub const fn new(user: UserId, cart: CartId) -> Self {
        Self { user, cart }
    }
}

impl std::fmt::Display for CartKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.user, self.cart)
    }
}

/// Session cart access and entry mutations.
#[async_trait]
pub trait CartFacade: Send + Sync {
    /// Fetch the current state of the cart.
    async fn session_cart(&self, key: &CartKey) -> Result<Cart, FacadeError>;

    /// Set the quantity of an entry. A quantity of zero removes the entry.
    async fn update_entry_quantity(
        &self,
        key: &CartKey,
        entry_number: EntryNumber,
        quantity: u64,
    ) -> Result<ModificationResult, FacadeError>;

    /// Move an entry to a pickup location, or to shipping when `None`.
    async fn update_entry_location(
        &self,
        key: &CartKey,
        entry_number: EntryNumber,
        location: Option<&LocationName>,
    ) -> Result<ModificationResult, FacadeError>;

    /// Add a product to the cart. The platform decides whether the quantity
    /// merges into an existing entry or creates a new one.
    async fn add_entry(
        &self,
        key: &CartKey,
        product_code: &ProductCode,
        quantity: u64,
        location: Option<&LocationName>,
    ) -> Result<ModificationResult, FacadeError>;

    /// Entry group support, if this platform offers it.
    fn entry_groups(&self) -> Option<&dyn EntryGroupFacade> {
        None
    }
}

/// Entry group operations offered by some cart facades.
#[async_trait]
pub trait EntryGroupFacade: Send + Sync {
    /// Add a product to an entry group.
    async fn add_to_entry_group(
        &self,
        key: &CartKey,
        product_code: &ProductCode,
        quantity: u64,
        group: EntryGroupNumber,
    ) -> Result<ModificationResult, FacadeError>;

    /// Remove every entry of an entry group. An unknown group is reported
    /// through the result's status code, not as an error.
    async fn remove_entry_group(
        &self,
        key: &CartKey,
        group: EntryGroupNumber,
    ) -> Result<ModificationResult, FacadeError>;
}

/// Stock system queries.
#[async_trait]
pub trait StockFacade: Send + Sync {
    /// Whether the stock system is enabled for the site.
    async fn is_stock_system_enabled(&self, site: &SiteId) -> Result<bool, FacadeError>;

    /// Online stock level of a product for a site.
    async fn site_stock_status(
        &self,
        product_code: &ProductCode,
        site: &SiteId,
    ) -> Result<StockStatus, FacadeError>;

    /// Stock level of a product at a pickup location.
    async fn location_stock_status(
        &self,
        product_code: &ProductCode,
        location: &LocationName,
    ) -> Result<StockStatus, FacadeError>;
}
