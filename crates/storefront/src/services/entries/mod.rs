//! Cart entry service.
//!
//! Interprets create/replace/update/delete requests against cart entries,
//! validates them against stock and applies them through the cart facade.
//!
//! # Update pipeline
//!
//! Replace and update share one pipeline with up to two platform calls:
//!
//! 1. Location change, when the requested pickup location differs from the
//!    entry's current one. Guarded by the ambiguity check and by stock
//!    validation for the new fulfillment mode.
//! 2. Quantity change, when a quantity is known.
//!
//! The two results are merged with [`ModificationResult::merge`]. The calls
//! are independent: if the quantity change fails, the location change stays
//! applied and the caller sees the error.

mod error;

pub use error::EntryError;

use tracing::{debug, info, instrument};

use cart_entries_core::{
    Cart, CartEntry, EntryGroupNumber, EntryNumber, LocationName, ModificationResult,
    ModificationStatus, ProductCode, SiteId,
};

use crate::platform::{CartFacade, CartKey, StockFacade};
use crate::services::stock::StockValidator;

/// Quantity used when a create request does not specify one.
const DEFAULT_PRODUCT_QUANTITY: u64 = 1;

/// Entry fields supplied by a request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryRequest {
    /// Product code. Required on create; must match the entry otherwise.
    pub product_code: Option<ProductCode>,
    /// Requested quantity, unvalidated.
    pub quantity: Option<i64>,
    /// Requested pickup location. `None` means shipping.
    pub location: Option<LocationName>,
}

/// How an absent location in the request is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    /// Absent attributes are reset: no location means switch to shipping.
    Replace,
    /// Absent attributes are left alone.
    Update,
}

/// Fulfillment change requested for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocationChange<'l> {
    ToPickup(&'l LocationName),
    ToShipping,
}

impl<'l> LocationChange<'l> {
    /// Decide whether the request moves the entry.
    fn detect(
        current: Option<&LocationName>,
        requested: Option<&'l LocationName>,
        mode: WriteMode,
    ) -> Option<Self> {
        match (requested, current) {
            (Some(new), current) if current != Some(new) => Some(Self::ToPickup(new)),
            (None, Some(_)) if mode == WriteMode::Replace => Some(Self::ToShipping),
            _ => None,
        }
    }

    const fn target(self) -> Option<&'l LocationName> {
        match self {
            Self::ToPickup(location) => Some(location),
            Self::ToShipping => None,
        }
    }
}

/// Cart entry service.
///
/// Holds no state between calls: the cart is fetched from the platform on
/// every operation.
pub struct EntryService<'a> {
    carts: &'a dyn CartFacade,
    stock: StockValidator<'a>,
}

impl<'a> EntryService<'a> {
    /// Create a new entry service.
    #[must_use]
    pub const fn new(carts: &'a dyn CartFacade, stock: &'a dyn StockFacade) -> Self {
        Self {
            carts,
            stock: StockValidator::new(stock),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// List the entries of a cart.
    ///
    /// # Errors
    ///
    /// Returns `EntryError::Facade` if the cart cannot be fetched.
    #[instrument(skip_all, fields(cart = %key))]
    pub async fn list_entries(&self, key: &CartKey) -> Result<Vec<CartEntry>, EntryError> {
        debug!("listing cart entries");
        let cart = self.carts.session_cart(key).await?;
        Ok(cart.entries)
    }

    /// Get a single entry by number.
    ///
    /// # Errors
    ///
    /// Returns `EntryError::EntryNotFound` if no entry carries the number.
    #[instrument(skip_all, fields(cart = %key, entry = %entry_number))]
    pub async fn get_entry(
        &self,
        key: &CartKey,
        entry_number: EntryNumber,
    ) -> Result<CartEntry, EntryError> {
        debug!("getting cart entry");
        let cart = self.carts.session_cart(key).await?;
        Ok(cart.find_by_number(entry_number)?.clone())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a product to the cart.
    ///
    /// The quantity defaults to one. Stock is validated at the pickup
    /// location when one is given, online otherwise.
    ///
    /// # Errors
    ///
    /// Returns `EntryError::Validation` for a missing product or non-positive
    /// quantity, `EntryError::Stock` if stock validation fails and
    /// `EntryError::Facade` if the platform fails.
    #[instrument(skip_all, fields(site = %site, cart = %key))]
    pub async fn create(
        &self,
        site: &SiteId,
        key: &CartKey,
        request: EntryRequest,
    ) -> Result<ModificationResult, EntryError> {
        let quantity = positive_quantity(request.quantity)?;
        let product_code = required_product(request.product_code.as_ref())?;
        let location = request.location.as_ref();

        if let Some(location) = location {
            self.stock
                .validate_location(site, product_code, location, None)
                .await?;
        } else {
            self.stock.validate_online(site, product_code, None).await?;
        }

        let result = self
            .carts
            .add_entry(key, product_code, quantity, location)
            .await?;
        info!(
            product = %product_code,
            quantity,
            pickup = location.is_some(),
            status = %result.status_code,
            "cart entry added"
        );
        Ok(result)
    }

    /// Replace the quantity and pickup location of an entry.
    ///
    /// Attributes missing from the request are reset: no location means the
    /// entry switches to shipping, no quantity leaves the quantity alone.
    ///
    /// # Errors
    ///
    /// Returns `EntryError::EntryNotFound`, `EntryError::ProductCodeMismatch`,
    /// `EntryError::Validation`, `EntryError::AmbiguousEntry`,
    /// `EntryError::Stock` or `EntryError::Facade`.
    #[instrument(skip_all, fields(site = %site, cart = %key, entry = %entry_number))]
    pub async fn replace(
        &self,
        site: &SiteId,
        key: &CartKey,
        entry_number: EntryNumber,
        request: EntryRequest,
    ) -> Result<ModificationResult, EntryError> {
        let cart = self.carts.session_cart(key).await?;
        let entry = cart.find_by_number(entry_number)?;

        validate_product_code(entry, request.product_code.as_ref())?;
        let quantity = request.quantity.map(non_negative_quantity).transpose()?;

        self.update_internal(
            site,
            key,
            &cart,
            entry,
            quantity,
            request.location.as_ref(),
            WriteMode::Replace,
        )
        .await
    }

    /// Update the quantity and pickup location of an entry.
    ///
    /// Attributes missing from the request are left as they are; a missing
    /// quantity defaults to the entry's current quantity.
    ///
    /// # Errors
    ///
    /// Same as [`EntryService::replace`].
    #[instrument(skip_all, fields(site = %site, cart = %key, entry = %entry_number))]
    pub async fn update(
        &self,
        site: &SiteId,
        key: &CartKey,
        entry_number: EntryNumber,
        request: EntryRequest,
    ) -> Result<ModificationResult, EntryError> {
        let cart = self.carts.session_cart(key).await?;
        let entry = cart.find_by_number(entry_number)?;

        validate_product_code(entry, request.product_code.as_ref())?;
        let quantity = match request.quantity {
            Some(quantity) => non_negative_quantity(quantity)?,
            None => entry.quantity,
        };

        self.update_internal(
            site,
            key,
            &cart,
            entry,
            Some(quantity),
            request.location.as_ref(),
            WriteMode::Update,
        )
        .await
    }

    /// Remove an entry by setting its quantity to zero.
    ///
    /// # Errors
    ///
    /// Returns `EntryError::EntryNotFound` if no entry carries the number.
    #[instrument(skip_all, fields(cart = %key, entry = %entry_number))]
    pub async fn delete(&self, key: &CartKey, entry_number: EntryNumber) -> Result<(), EntryError> {
        let cart = self.carts.session_cart(key).await?;
        cart.find_by_number(entry_number)?;

        self.carts
            .update_entry_quantity(key, entry_number, 0)
            .await?;
        info!("cart entry removed");
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn update_internal(
        &self,
        site: &SiteId,
        key: &CartKey,
        cart: &Cart,
        entry: &CartEntry,
        quantity: Option<u64>,
        location: Option<&LocationName>,
        mode: WriteMode,
    ) -> Result<ModificationResult, EntryError> {
        let entry_number = entry.entry_number;

        let location_result =
            match LocationChange::detect(entry.location.as_ref(), location, mode) {
                Some(change) => {
                    validate_for_ambiguous_positions(cart, entry, change.target())?;
                    let product_code = entry_product(entry)?;
                    match change {
                        LocationChange::ToPickup(new_location) => {
                            self.stock
                                .validate_location(site, product_code, new_location, Some(entry_number))
                                .await?;
                        }
                        LocationChange::ToShipping => {
                            self.stock
                                .validate_online(site, product_code, Some(entry_number))
                                .await?;
                        }
                    }

                    let result = self
                        .carts
                        .update_entry_location(key, entry_number, change.target())
                        .await?;
                    info!(
                        pickup = ?change.target().map(LocationName::as_str),
                        "cart entry fulfillment changed"
                    );
                    Some(result)
                }
                None => None,
            };

        let quantity_result = match quantity {
            Some(quantity) => {
                let result = self
                    .carts
                    .update_entry_quantity(key, entry_number, quantity)
                    .await?;
                info!(
                    quantity,
                    quantity_added = result.quantity_added,
                    status = %result.status_code,
                    "cart entry quantity updated"
                );
                Some(result)
            }
            None => None,
        };

        Ok(ModificationResult::merge(location_result, quantity_result))
    }

    // =========================================================================
    // Entry Groups
    // =========================================================================

    /// Add a product to an entry group.
    ///
    /// # Errors
    ///
    /// Returns `EntryError::EntryGroupsUnsupported` if the cart platform has
    /// no entry group capability, `EntryError::Validation` for a malformed
    /// request, `EntryError::Stock` if the product is out of stock online and
    /// `EntryError::Facade` if the platform fails.
    #[instrument(skip_all, fields(site = %site, cart = %key, group = %group))]
    pub async fn add_to_entry_group(
        &self,
        site: &SiteId,
        key: &CartKey,
        group: EntryGroupNumber,
        request: EntryRequest,
    ) -> Result<ModificationResult, EntryError> {
        let quantity = positive_quantity(request.quantity)?;
        let product_code = required_product(request.product_code.as_ref())?;
        if request.location.is_some() {
            return Err(EntryError::validation(
                "deliveryPointOfService",
                "entry groups cannot be picked up in store",
            ));
        }
        validate_group(group)?;

        let groups = self
            .carts
            .entry_groups()
            .ok_or(EntryError::EntryGroupsUnsupported)?;
        self.stock.validate_online(site, product_code, None).await?;

        let result = groups
            .add_to_entry_group(key, product_code, quantity, group)
            .await?;
        info!(product = %product_code, quantity, "product added to entry group");
        Ok(result)
    }

    /// Remove an entry group and all of its entries.
    ///
    /// # Errors
    ///
    /// Returns `EntryError::Validation` for group number zero,
    /// `EntryError::EntryGroupsUnsupported` if the platform has no entry group
    /// capability and `EntryError::EntryGroupNotFound` if the group does not
    /// exist.
    #[instrument(skip_all, fields(cart = %key, group = %group))]
    pub async fn remove_entry_group(
        &self,
        key: &CartKey,
        group: EntryGroupNumber,
    ) -> Result<(), EntryError> {
        validate_group(group)?;

        let groups = self
            .carts
            .entry_groups()
            .ok_or(EntryError::EntryGroupsUnsupported)?;
        let result = groups.remove_entry_group(key, group).await?;

        if result.status_code == ModificationStatus::InvalidEntryGroupNumber {
            return Err(EntryError::EntryGroupNotFound(group));
        }
        info!("entry group removed");
        Ok(())
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Reject a request body naming a different product than the entry.
///
/// # Errors
///
/// Returns `EntryError::ProductCodeMismatch` if a product code is given and
/// differs from the entry's.
pub fn validate_product_code(
    entry: &CartEntry,
    requested: Option<&ProductCode>,
) -> Result<(), EntryError> {
    match requested {
        Some(code) if entry.product_code.as_ref() != Some(code) => {
            Err(EntryError::ProductCodeMismatch(entry.entry_number))
        }
        _ => Ok(()),
    }
}

/// Reject moving an entry onto the (product, location) identity of another
/// entry.
///
/// # Errors
///
/// Returns `EntryError::AmbiguousEntry` carrying the conflicting entry.
pub fn validate_for_ambiguous_positions(
    cart: &Cart,
    entry: &CartEntry,
    new_location: Option<&LocationName>,
) -> Result<(), EntryError> {
    match cart.find_by_product_and_location(entry.product_code.as_ref(), new_location) {
        Some(other) if other.entry_number != entry.entry_number => {
            Err(EntryError::AmbiguousEntry {
                entry: entry.entry_number,
                conflicting: other.entry_number,
            })
        }
        _ => Ok(()),
    }
}

fn positive_quantity(quantity: Option<i64>) -> Result<u64, EntryError> {
    let Some(quantity) = quantity else {
        return Ok(DEFAULT_PRODUCT_QUANTITY);
    };
    match u64::try_from(quantity) {
        Ok(quantity) if quantity > 0 => Ok(quantity),
        _ => Err(EntryError::validation(
            "quantity",
            "must be greater than zero",
        )),
    }
}

fn non_negative_quantity(quantity: i64) -> Result<u64, EntryError> {
    u64::try_from(quantity).map_err(|_| EntryError::validation("quantity", "must not be negative"))
}

fn required_product(product_code: Option<&ProductCode>) -> Result<&ProductCode, EntryError> {
    product_code.ok_or_else(|| EntryError::validation("product.code", "is required"))
}

fn entry_product(entry: &CartEntry) -> Result<&ProductCode, EntryError> {
    entry.product_code.as_ref().ok_or_else(|| {
        EntryError::validation(
            "product.code",
            format!("entry {} has no product", entry.entry_number),
        )
    })
}

fn validate_group(group: EntryGroupNumber) -> Result<(), EntryError> {
    if group.is_valid() {
        Ok(())
    } else {
        Err(EntryError::validation(
            "entryGroupNumber",
            "must be greater than zero",
        ))
    }
}
