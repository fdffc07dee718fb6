//! Cart and cart entry types, and the entry locator.
//!
//! A [`Cart`] is owned by the commerce platform: it is fetched once per
//! request and never cached here. The lookups in this module are pure scans
//! over the fetched entries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CartId, EntryGroupNumber, EntryNumber, LocationName, ProductCode};

/// No entry in the cart carries the requested entry number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Entry not found")]
pub struct EntryNotFound(pub EntryNumber);

/// One line item of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    /// Ordinal of the entry, unique within the cart.
    pub entry_number: EntryNumber,
    /// Product on this line. The platform may return an entry whose product
    /// no longer resolves, in which case this is `None`.
    pub product_code: Option<ProductCode>,
    /// Quantity ordered.
    pub quantity: u64,
    /// Pickup location. `None` means ship to address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationName>,
    /// Entry groups this entry belongs to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry_group_numbers: Vec<EntryGroupNumber>,
}

impl CartEntry {
    /// Create an entry with no entry groups.
    #[must_use]
    pub const fn new(
        entry_number: EntryNumber,
        product_code: ProductCode,
        quantity: u64,
        location: Option<LocationName>,
    ) -> Self {
        Self {
            entry_number,
            product_code: Some(product_code),
            quantity,
            location,
            entry_group_numbers: Vec::new(),
        }
    }

    /// Whether this entry has the given (product, location) identity.
    ///
    /// An absent product code on either side never matches. Locations match
    /// when both are absent or both are present and equal.
    #[must_use]
    pub fn has_identity(
        &self,
        product_code: Option<&ProductCode>,
        location: Option<&LocationName>,
    ) -> bool {
        let same_product = matches!(
            (self.product_code.as_ref(), product_code),
            (Some(ours), Some(theirs)) if ours == theirs
        );
        same_product && self.location.as_ref() == location
    }
}

/// A cart as returned by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart identifier.
    pub id: CartId,
    /// Entries ordered by entry number ascending.
    #[serde(default)]
    pub entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new(id: CartId) -> Self {
        Self {
            id,
            entries: Vec::new(),
        }
    }

    /// Find the entry carrying `entry_number`.
    ///
    /// # Errors
    ///
    /// Returns [`EntryNotFound`] if no entry matches, including when the cart
    /// has no entries.
    pub fn find_by_number(&self, entry_number: EntryNumber) -> Result<&CartEntry, EntryNotFound> {
        self.entries
            .iter()
            .find(|entry| entry.entry_number == entry_number)
            .ok_or(EntryNotFound(entry_number))
    }

    /// Find the entry with the given (product, location) identity.
    ///
    /// Returns `None` rather than an error: callers use this as a collision
    /// check, not as a hard lookup.
    #[must_use]
    pub fn find_by_product_and_location(
        &self,
        product_code: Option<&ProductCode>,
        location: Option<&LocationName>,
    ) -> Option<&CartEntry> {
        self.entries
            .iter()
            .find(|entry| entry.has_identity(product_code, location))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PRODUCT_CODE: &str = "12345";
    const PICKUP_STORE: &str = "TestStore";

    fn product(code: &str) -> ProductCode {
        ProductCode::parse(code).unwrap()
    }

    fn store(name: &str) -> LocationName {
        LocationName::parse(name).unwrap()
    }

    fn cart_with(entries: Vec<CartEntry>) -> Cart {
        Cart {
            id: CartId::parse("cart-1").unwrap(),
            entries,
        }
    }

    fn pickup_entry(number: u32) -> CartEntry {
        CartEntry::new(
            EntryNumber::new(number),
            product(PRODUCT_CODE),
            1,
            Some(store(PICKUP_STORE)),
        )
    }

    #[test]
    fn test_find_by_number_empty_cart() {
        let cart = cart_with(Vec::new());
        let err = cart.find_by_number(EntryNumber::new(1)).unwrap_err();
        assert_eq!(err, EntryNotFound(EntryNumber::new(1)));
        assert_eq!(err.to_string(), "Entry not found");
    }

    #[test]
    fn test_find_by_number_no_matching_entry() {
        let cart = cart_with(vec![pickup_entry(2)]);
        assert_eq!(
            cart.find_by_number(EntryNumber::new(1)),
            Err(EntryNotFound(EntryNumber::new(1)))
        );
    }

    #[test]
    fn test_find_by_number_returns_matching_entry() {
        let cart = cart_with(vec![pickup_entry(0), pickup_entry(1)]);
        let entry = cart.find_by_number(EntryNumber::new(1)).unwrap();
        assert_eq!(entry.entry_number, EntryNumber::new(1));
    }

    #[test]
    fn test_find_by_product_and_store() {
        let cart = cart_with(vec![pickup_entry(1)]);
        let entry = cart
            .find_by_product_and_location(Some(&product(PRODUCT_CODE)), Some(&store(PICKUP_STORE)))
            .unwrap();
        assert_eq!(entry.product_code.as_ref().unwrap().as_str(), PRODUCT_CODE);
        assert_eq!(entry.location.as_ref().unwrap().as_str(), PICKUP_STORE);
    }

    #[test]
    fn test_find_by_product_no_stores() {
        let mut entry = pickup_entry(1);
        entry.location = None;
        let cart = cart_with(vec![entry]);

        let found = cart
            .find_by_product_and_location(Some(&product(PRODUCT_CODE)), None)
            .unwrap();
        assert!(found.location.is_none());
    }

    #[test]
    fn test_find_by_product_absent_location_does_not_match_pickup_entry() {
        let cart = cart_with(vec![pickup_entry(1)]);
        assert!(
            cart.find_by_product_and_location(Some(&product(PRODUCT_CODE)), None)
                .is_none()
        );
    }

    #[test]
    fn test_find_by_product_location_does_not_match_shipping_entry() {
        let mut entry = pickup_entry(1);
        entry.location = None;
        let cart = cart_with(vec![entry]);
        assert!(
            cart.find_by_product_and_location(Some(&product(PRODUCT_CODE)), Some(&store(PICKUP_STORE)))
                .is_none()
        );
    }

    #[test]
    fn test_find_by_product_entry_without_product() {
        let mut entry = pickup_entry(1);
        entry.product_code = None;
        let cart = cart_with(vec![entry]);
        assert!(
            cart.find_by_product_and_location(Some(&product(PRODUCT_CODE)), Some(&store(PICKUP_STORE)))
                .is_none()
        );
    }

    #[test]
    fn test_find_by_product_absent_query_product() {
        let cart = cart_with(vec![pickup_entry(1)]);
        assert!(
            cart.find_by_product_and_location(None, Some(&store(PICKUP_STORE)))
                .is_none()
        );
    }

    #[test]
    fn test_find_by_product_unknown_product_or_store() {
        let cart = cart_with(vec![pickup_entry(1)]);
        assert!(
            cart.find_by_product_and_location(Some(&product("UnknownProduct")), Some(&store(PICKUP_STORE)))
                .is_none()
        );
        assert!(
            cart.find_by_product_and_location(Some(&product(PRODUCT_CODE)), Some(&store("UnknownStore")))
                .is_none()
        );
    }

    #[test]
    fn test_cart_without_entries_field_deserializes_empty() {
        let cart: Cart = serde_json::from_str(r#"{"id":"c1"}"#).unwrap();
        assert!(cart.entries.is_empty());
    }
}
