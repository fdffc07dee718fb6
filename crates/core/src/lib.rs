//! Cart Entries Core - Shared cart types library.
//!
//! This crate provides the domain types used by the cart entries service:
//! - `storefront` - HTTP service reconciling cart entry mutations
//! - `integration-tests` - End-to-end tests against the storefront router
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no platform
//! clients, no HTTP. Everything that talks to the commerce platform lives in
//! the storefront crate behind facade traits.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for entry numbers, codes and statuses
//! - [`cart`] - `Cart` and `CartEntry`, plus the entry locator
//! - [`modification`] - `ModificationResult` and its merge law

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod modification;
pub mod types;

pub use cart::{Cart, CartEntry, EntryNotFound};
pub use modification::ModificationResult;
pub use types::*;
