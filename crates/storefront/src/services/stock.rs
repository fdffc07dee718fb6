//! Stock validation for cart entry mutations.
//!
//! Both validators first require the stock system to be enabled for the
//! site, then query a single stock signal:
//!
//! - [`StockValidator::validate_online`] - site-wide stock for shipping.
//!   Only `OUT_OF_STOCK` is rejected; `LOW_STOCK` still ships.
//! - [`StockValidator::validate_location`] - stock at a pickup location.
//!   Both `OUT_OF_STOCK` and `LOW_STOCK` are rejected.
//!
//! Validation only reads; it must run before the mutation it guards.

use thiserror::Error;
use tracing::{debug, instrument};

use cart_entries_core::{EntryNumber, LocationName, ProductCode, SiteId, StockStatus};

use crate::platform::{FacadeError, StockFacade};

/// Reason code for a missing stock system.
pub const REASON_NOT_ENABLED: &str = "notEnabled";
/// Reason code for out-of-stock rejections.
pub const REASON_NO_STOCK: &str = "noStock";
/// Reason code for low-stock rejections.
pub const REASON_LOW_STOCK: &str = "lowStock";

/// Errors raised by stock validation.
#[derive(Debug, Error)]
pub enum StockError {
    /// The stock system is disabled for the site.
    #[error("Stock system is not enabled on this site")]
    SystemUnavailable(SiteId),

    /// The product is out of stock (no cart entry involved).
    #[error("Product [{0}] is currently out of stock")]
    ProductOutOfStock(ProductCode),

    /// The product of an existing entry is out of stock.
    #[error("Product of entry {0} is currently out of stock")]
    EntryOutOfStock(EntryNumber),

    /// The product is low on stock at the pickup location.
    #[error("Not enough product in stock")]
    ProductLowStock(ProductCode),

    /// The product of an existing entry is low on stock at the pickup location.
    #[error("Not enough product in stock for entry {0}")]
    EntryLowStock(EntryNumber),

    /// The stock facade failed.
    #[error("stock lookup failed: {0}")]
    Facade(#[from] FacadeError),
}

impl StockError {
    fn out_of_stock(product_code: &ProductCode, entry_number: Option<EntryNumber>) -> Self {
        entry_number.map_or_else(
            || Self::ProductOutOfStock(product_code.clone()),
            Self::EntryOutOfStock,
        )
    }

    fn low_stock(product_code: &ProductCode, entry_number: Option<EntryNumber>) -> Self {
        entry_number.map_or_else(
            || Self::ProductLowStock(product_code.clone()),
            Self::EntryLowStock,
        )
    }

    /// Machine readable reason code, if this is a business rejection.
    #[must_use]
    pub const fn reason(&self) -> Option<&'static str> {
        match self {
            Self::SystemUnavailable(_) => Some(REASON_NOT_ENABLED),
            Self::ProductOutOfStock(_) | Self::EntryOutOfStock(_) => Some(REASON_NO_STOCK),
            Self::ProductLowStock(_) | Self::EntryLowStock(_) => Some(REASON_LOW_STOCK),
            Self::Facade(_) => None,
        }
    }

    /// Subject of the rejection: site id, product code or entry number.
    #[must_use]
    pub fn subject(&self) -> Option<String> {
        match self {
            Self::SystemUnavailable(site) => Some(site.to_string()),
            Self::ProductOutOfStock(code) | Self::ProductLowStock(code) => Some(code.to_string()),
            Self::EntryOutOfStock(number) | Self::EntryLowStock(number) => {
                Some(number.to_string())
            }
            Self::Facade(_) => None,
        }
    }
}

/// Validates stock before a cart mutation is applied.
#[derive(Clone, Copy)]
pub struct StockValidator<'a> {
    stock: &'a dyn StockFacade,
}

impl<'a> StockValidator<'a> {
    /// Create a new stock validator.
    #[must_use]
    pub const fn new(stock: &'a dyn StockFacade) -> Self {
        Self { stock }
    }

    /// Require the stock system to be enabled for the site.
    ///
    /// # Errors
    ///
    /// Returns `StockError::SystemUnavailable` if the system is disabled.
    pub async fn check_system_available(&self, site: &SiteId) -> Result<(), StockError> {
        if self.stock.is_stock_system_enabled(site).await? {
            Ok(())
        } else {
            debug!(%site, "stock system disabled");
            Err(StockError::SystemUnavailable(site.clone()))
        }
    }

    /// Validate online stock for shipping.
    ///
    /// Pass `entry_number` when the product belongs to an existing entry so the
    /// rejection names the entry instead of the product.
    ///
    /// # Errors
    ///
    /// Returns `StockError::SystemUnavailable` if the stock system is disabled,
    /// `ProductOutOfStock`/`EntryOutOfStock` if the product is out of stock.
    #[instrument(skip_all, fields(site = %site, product = %product_code))]
    pub async fn validate_online(
        &self,
        site: &SiteId,
        product_code: &ProductCode,
        entry_number: Option<EntryNumber>,
    ) -> Result<(), StockError> {
        self.check_system_available(site).await?;

        let status = self.stock.site_stock_status(product_code, site).await?;
        match status {
            StockStatus::OutOfStock => {
                debug!(%status, "rejecting: out of stock online");
                Err(StockError::out_of_stock(product_code, entry_number))
            }
            StockStatus::InStock | StockStatus::LowStock | StockStatus::Unknown => Ok(()),
        }
    }

    /// Validate stock at a pickup location.
    ///
    /// # Errors
    ///
    /// Returns `StockError::SystemUnavailable` if the stock system is disabled,
    /// `ProductOutOfStock`/`EntryOutOfStock` if the location has no stock and
    /// `ProductLowStock`/`EntryLowStock` if the location is low on stock.
    #[instrument(skip_all, fields(site = %site, product = %product_code, location = %location))]
    pub async fn validate_location(
        &self,
        site: &SiteId,
        product_code: &ProductCode,
        location: &LocationName,
        entry_number: Option<EntryNumber>,
    ) -> Result<(), StockError> {
        self.check_system_available(site).await?;

        let status = self
            .stock
            .location_stock_status(product_code, location)
            .await?;
        match status {
            StockStatus::OutOfStock => {
                debug!(%status, "rejecting: out of stock at location");
                Err(StockError::out_of_stock(product_code, entry_number))
            }
            StockStatus::LowStock => {
                debug!(%status, "rejecting: low stock at location");
                Err(StockError::low_stock(product_code, entry_number))
            }
            StockStatus::InStock | StockStatus::Unknown => Ok(()),
        }
    }
}
