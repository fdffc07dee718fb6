//! Request and response bodies of the cart entry API.

use axum::{Json, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cart_entries_core::{
    CartEntry, CartId, EntryGroupNumber, EntryNumber, LocationName, ModificationResult,
    ModificationStatus, ProductCode, SiteId, UserId,
};

use crate::error::{AppError, Result};
use crate::fields::FieldTree;
use crate::platform::CartKey;
use crate::services::{EntryError, EntryRequest};

// =============================================================================
// Paths
// =============================================================================

/// Path parameters addressing a cart.
#[derive(Debug, Deserialize)]
pub struct CartPath {
    pub site_id: String,
    pub user_id: String,
    pub cart_id: String,
}

impl CartPath {
    /// Parse the site and cart identifiers.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the malformed parameter.
    pub fn resolve(&self) -> Result<(SiteId, CartKey)> {
        let site = SiteId::parse(&self.site_id)
            .map_err(|e| EntryError::validation("siteId", e.to_string()))?;
        let user = UserId::parse(&self.user_id)
            .map_err(|e| EntryError::validation("userId", e.to_string()))?;
        let cart = CartId::parse(&self.cart_id)
            .map_err(|e| EntryError::validation("cartId", e.to_string()))?;
        Ok((site, CartKey::new(user, cart)))
    }
}

/// Path parameters addressing a cart entry.
#[derive(Debug, Deserialize)]
pub struct EntryPath {
    pub site_id: String,
    pub user_id: String,
    pub cart_id: String,
    pub entry_number: String,
}

impl EntryPath {
    /// Parse the site, cart and entry identifiers.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the malformed parameter.
    pub fn resolve(&self) -> Result<(SiteId, CartKey, EntryNumber)> {
        let (site, key) = self.cart().resolve()?;
        let entry_number = self
            .entry_number
            .trim()
            .parse::<u32>()
            .map_err(|_| EntryError::validation("entryNumber", "must be a non-negative integer"))?;
        Ok((site, key, EntryNumber::new(entry_number)))
    }

    fn cart(&self) -> CartPath {
        CartPath {
            site_id: self.site_id.clone(),
            user_id: self.user_id.clone(),
            cart_id: self.cart_id.clone(),
        }
    }
}

/// Path parameters addressing an entry group.
#[derive(Debug, Deserialize)]
pub struct EntryGroupPath {
    pub site_id: String,
    pub user_id: String,
    pub cart_id: String,
    pub group: String,
}

impl EntryGroupPath {
    /// Parse the site, cart and entry group identifiers.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the malformed parameter.
    pub fn resolve(&self) -> Result<(SiteId, CartKey, EntryGroupNumber)> {
        let cart = CartPath {
            site_id: self.site_id.clone(),
            user_id: self.user_id.clone(),
            cart_id: self.cart_id.clone(),
        };
        let (site, key) = cart.resolve()?;
        let group = self
            .group
            .trim()
            .parse::<u32>()
            .map_err(|_| EntryError::validation("entryGroupNumber", "must be a positive integer"))?;
        Ok((site, key, EntryGroupNumber::new(group)))
    }
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Reference to a product by code.
#[derive(Debug, Default, Deserialize)]
pub struct ProductRef {
    #[serde(default)]
    pub code: Option<String>,
}

/// Reference to a point of service by name.
#[derive(Debug, Default, Deserialize)]
pub struct PointOfServiceRef {
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of entry create/replace/update requests.
///
/// ```json
/// { "product": { "code": "1234" }, "quantity": 2, "deliveryPointOfService": { "name": "Nakano" } }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEntryRequest {
    #[serde(default)]
    pub product: Option<ProductRef>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub delivery_point_of_service: Option<PointOfServiceRef>,
}

impl TryFrom<OrderEntryRequest> for EntryRequest {
    type Error = EntryError;

    fn try_from(body: OrderEntryRequest) -> std::result::Result<Self, Self::Error> {
        let product_code = body
            .product
            .and_then(|product| product.code)
            .map(|code| ProductCode::parse(&code))
            .transpose()
            .map_err(|e| EntryError::validation("product.code", e.to_string()))?;

        // A blank point of service name means shipping
        let location = body
            .delivery_point_of_service
            .and_then(|pos| pos.name)
            .filter(|name| !name.trim().is_empty())
            .map(|name| LocationName::parse(&name))
            .transpose()
            .map_err(|e| EntryError::validation("deliveryPointOfService.name", e.to_string()))?;

        Ok(Self {
            product_code,
            quantity: body.quantity,
            location,
        })
    }
}

/// Unwrap a JSON body, turning extractor rejections into JSON errors.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for malformed bodies and a validation
/// error for malformed codes.
pub fn entry_request(
    body: std::result::Result<Json<OrderEntryRequest>, JsonRejection>,
) -> Result<EntryRequest> {
    let Json(body) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    Ok(EntryRequest::try_from(body)?)
}

// =============================================================================
// Response Bodies
// =============================================================================

/// Product as shown in an entry.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub code: String,
}

/// Point of service as shown in an entry.
#[derive(Debug, Serialize)]
pub struct PointOfServiceView {
    pub name: String,
}

/// A cart entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEntryView {
    pub entry_number: EntryNumber,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductView>,
    pub quantity: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_point_of_service: Option<PointOfServiceView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entry_group_numbers: Vec<EntryGroupNumber>,
}

impl From<&CartEntry> for OrderEntryView {
    fn from(entry: &CartEntry) -> Self {
        Self {
            entry_number: entry.entry_number,
            product: entry.product_code.as_ref().map(|code| ProductView {
                code: code.to_string(),
            }),
            quantity: entry.quantity,
            delivery_point_of_service: entry.location.as_ref().map(|location| {
                PointOfServiceView {
                    name: location.to_string(),
                }
            }),
            entry_group_numbers: entry.entry_group_numbers.clone(),
        }
    }
}

/// The entries of a cart.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEntryListView {
    pub order_entries: Vec<OrderEntryView>,
}

impl From<&[CartEntry]> for OrderEntryListView {
    fn from(entries: &[CartEntry]) -> Self {
        Self {
            order_entries: entries.iter().map(OrderEntryView::from).collect(),
        }
    }
}

/// Outcome of a cart modification.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartModificationView {
    pub status_code: ModificationStatus,
    pub quantity: u64,
    pub quantity_added: i64,
    pub delivery_mode_changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<OrderEntryView>,
}

impl From<&ModificationResult> for CartModificationView {
    fn from(result: &ModificationResult) -> Self {
        Self {
            status_code: result.status_code,
            quantity: result.quantity,
            quantity_added: result.quantity_added,
            delivery_mode_changed: result.location_changed,
            entry: result.entry.as_ref().map(OrderEntryView::from),
        }
    }
}

/// Serialize a view and keep only the selected fields.
///
/// # Errors
///
/// Returns `AppError::Internal` if the view cannot be serialized.
pub fn render<T: Serialize>(fields: &FieldTree, view: &T) -> Result<Json<Value>> {
    let value = serde_json::to_value(view).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(fields.project(value)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn body(value: Value) -> OrderEntryRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_body_parsing() {
        let request = EntryRequest::try_from(body(json!({
            "product": { "code": "1234" },
            "quantity": 2,
            "deliveryPointOfService": { "name": "Nakano" }
        })))
        .unwrap();

        assert_eq!(request.product_code.unwrap().as_str(), "1234");
        assert_eq!(request.quantity, Some(2));
        assert_eq!(request.location.unwrap().as_str(), "Nakano");
    }

    #[test]
    fn test_blank_location_means_shipping() {
        let request = EntryRequest::try_from(body(json!({
            "deliveryPointOfService": { "name": "  " }
        })))
        .unwrap();
        assert!(request.location.is_none());

        let request = EntryRequest::try_from(body(json!({ "deliveryPointOfService": {} }))).unwrap();
        assert!(request.location.is_none());
    }

    #[test]
    fn test_empty_product_code_is_invalid() {
        let err = EntryRequest::try_from(body(json!({ "product": { "code": "" } }))).unwrap_err();
        assert!(matches!(err, EntryError::Validation { field: "product.code", .. }));
    }

    #[test]
    fn test_entry_path_rejects_non_numeric_entry() {
        let path = EntryPath {
            site_id: "electronics".to_string(),
            user_id: "anonymous".to_string(),
            cart_id: "c1".to_string(),
            entry_number: "first".to_string(),
        };
        assert!(matches!(
            path.resolve(),
            Err(AppError::Entry(EntryError::Validation { field: "entryNumber", .. }))
        ));
    }

    #[test]
    fn test_modification_view_shape() {
        let entry = CartEntry::new(
            EntryNumber::new(1),
            ProductCode::parse("1234").unwrap(),
            3,
            Some(LocationName::parse("Nakano").unwrap()),
        );
        let result = ModificationResult {
            status_code: ModificationStatus::Success,
            entry: Some(entry),
            quantity: 3,
            quantity_added: 1,
            location_changed: true,
        };

        let json = serde_json::to_value(CartModificationView::from(&result)).unwrap();
        assert_eq!(
            json,
            json!({
                "statusCode": "success",
                "quantity": 3,
                "quantityAdded": 1,
                "deliveryModeChanged": true,
                "entry": {
                    "entryNumber": 1,
                    "product": { "code": "1234" },
                    "quantity": 3,
                    "deliveryPointOfService": { "name": "Nakano" }
                }
            })
        );
    }
}
