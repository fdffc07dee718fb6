//! Core types for the cart entries service.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod code;
pub mod id;
pub mod status;

pub use code::{CartId, CodeError, LocationName, MAX_CODE_LENGTH, ProductCode, SiteId, UserId};
pub use id::*;
pub use status::*;
