//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `entries` - Cart entry reads and mutations
//! - `stock` - Stock validation guarding entry mutations
//!
//! Services borrow the platform facades from `AppState` for the duration of
//! a request and hold no state of their own.

pub mod entries;
pub mod stock;

pub use entries::{EntryError, EntryRequest, EntryService};
pub use stock::{StockError, StockValidator};
