//! Outcome of cart entry modifications.

use serde::{Deserialize, Serialize};

use crate::cart::CartEntry;
use crate::types::ModificationStatus;

/// Result of one modification applied by the platform.
///
/// The default value is the neutral result: nothing changed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationResult {
    /// Outcome code.
    pub status_code: ModificationStatus,
    /// Entry as it stands after the modification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<CartEntry>,
    /// Final quantity of the entry.
    pub quantity: u64,
    /// Quantity actually applied. Negative when the entry shrank or was
    /// removed, and possibly smaller than requested when stock was short.
    pub quantity_added: i64,
    /// Whether the entry's fulfillment location changed.
    pub location_changed: bool,
}

impl ModificationResult {
    /// Merge the results of a location change and a quantity change.
    ///
    /// The quantity change is applied second, so the merged entry, quantity
    /// and status come from it. Deltas add up, saturating at the `i64`
    /// bounds, and the location flag is sticky.
    #[must_use]
    pub fn merge(location: Option<Self>, quantity: Option<Self>) -> Self {
        match (location, quantity) {
            (None, None) => Self::default(),
            (Some(only), None) | (None, Some(only)) => only,
            (Some(first), Some(second)) => Self {
                status_code: second.status_code,
                entry: second.entry,
                quantity: second.quantity,
                quantity_added: first.quantity_added.saturating_add(second.quantity_added),
                location_changed: first.location_changed || second.location_changed,
            },
        }
    }
}
