//! Cart entry error types.

use thiserror::Error;

use cart_entries_core::{EntryGroupNumber, EntryNotFound, EntryNumber};

use crate::platform::FacadeError;
use crate::services::stock::StockError;

/// Errors that can occur while reading or mutating cart entries.
#[derive(Debug, Error)]
pub enum EntryError {
    /// No entry carries the requested number.
    #[error("Entry not found")]
    EntryNotFound(EntryNumber),

    /// The change would give the entry the same (product, location) identity
    /// as another entry.
    #[error(
        "Ambiguous cart entries! Entry number {entry} after change would be the same as entry {conflicting}"
    )]
    AmbiguousEntry {
        /// Entry being modified.
        entry: EntryNumber,
        /// Entry already holding the target identity.
        conflicting: EntryNumber,
    },

    /// The request body names a different product than the entry.
    #[error("Product code does not match the product of entry {0}")]
    ProductCodeMismatch(EntryNumber),

    /// The request is malformed.
    #[error("{field}: {message}")]
    Validation {
        /// Request field that failed validation.
        field: &'static str,
        /// Human readable reason.
        message: String,
    },

    /// Stock validation rejected the change.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// No entry group carries the requested number.
    #[error("Entry group not found")]
    EntryGroupNotFound(EntryGroupNumber),

    /// The cart platform does not support entry groups.
    #[error("Entry groups are not supported by this cart")]
    EntryGroupsUnsupported,

    /// The cart platform failed.
    #[error("cart platform error: {0}")]
    Facade(#[from] FacadeError),
}

impl EntryError {
    /// Create a validation error.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<EntryNotFound> for EntryError {
    fn from(err: EntryNotFound) -> Self {
        Self::EntryNotFound(err.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_not_found_from_locator_error() {
        let err = EntryError::from(EntryNotFound(EntryNumber::new(4)));
        assert!(matches!(err, EntryError::EntryNotFound(n) if n.as_u32() == 4));
    }

    #[test]
    fn test_ambiguous_entry_message() {
        let err = EntryError::AmbiguousEntry {
            entry: EntryNumber::new(0),
            conflicting: EntryNumber::new(1),
        };
        assert_eq!(
            err.to_string(),
            "Ambiguous cart entries! Entry number 0 after change would be the same as entry 1"
        );
    }

    #[test]
    fn test_validation_message() {
        let err = EntryError::validation("quantity", "must be greater than zero");
        assert_eq!(err.to_string(), "quantity: must be greater than zero");
    }
}
