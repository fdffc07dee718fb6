//! In-memory platform backend.
//!
//! Used by the development binary and by tests. Carts live in a map keyed by
//! [`CartKey`]; stock levels come from a [`StockFixture`] that can be loaded
//! from a JSON file.
//!
//! Each facade call takes the lock once. A reconcile spanning several calls
//! is therefore not atomic, matching the behaviour of a remote platform.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;

use cart_entries_core::{
    Cart, CartEntry, EntryGroupNumber, EntryNumber, LocationName, ModificationResult,
    ModificationStatus, ProductCode, SiteId, StockStatus,
};

use super::{CartFacade, CartKey, EntryGroupFacade, FacadeError, StockFacade};

// =============================================================================
// Carts
// =============================================================================

/// Cart facade backed by a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryCartFacade {
    carts: RwLock<HashMap<CartKey, Cart>>,
    entry_groups_enabled: bool,
    writes: AtomicUsize,
}

impl InMemoryCartFacade {
    /// Create an empty backend without entry group support.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the entry group capability.
    #[must_use]
    pub fn with_entry_groups(mut self) -> Self {
        self.entry_groups_enabled = true;
        self
    }

    /// Seed a cart.
    #[must_use]
    pub fn with_cart(mut self, key: CartKey, cart: Cart) -> Self {
        self.carts.get_mut().insert(key, cart);
        self
    }

    /// Number of mutations applied so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }
}

fn next_entry_number(cart: &Cart) -> EntryNumber {
    cart.entries
        .iter()
        .map(|entry| entry.entry_number)
        .max()
        .map_or(EntryNumber::new(0), EntryNumber::next)
}

fn signed(quantity: u64) -> i64 {
    i64::try_from(quantity).unwrap_or(i64::MAX)
}

fn entry_mut(cart: &mut Cart, entry_number: EntryNumber) -> Result<&mut CartEntry, FacadeError> {
    cart.entries
        .iter_mut()
        .find(|entry| entry.entry_number == entry_number)
        .ok_or_else(|| FacadeError::Rejected(format!("no entry with number {entry_number}")))
}

/// Add quantity to the entry with the given identity, or append a new entry.
fn add_or_merge(
    cart: &mut Cart,
    product_code: &ProductCode,
    quantity: u64,
    location: Option<&LocationName>,
    group: Option<EntryGroupNumber>,
) -> CartEntry {
    let existing = cart
        .entries
        .iter_mut()
        .find(|entry| entry.has_identity(Some(product_code), location));

    if let Some(entry) = existing {
        entry.quantity = entry.quantity.saturating_add(quantity);
        if let Some(group) = group
            && !entry.entry_group_numbers.contains(&group)
        {
            entry.entry_group_numbers.push(group);
        }
        return entry.clone();
    }

    let mut entry = CartEntry::new(
        next_entry_number(cart),
        product_code.clone(),
        quantity,
        location.cloned(),
    );
    entry.entry_group_numbers.extend(group);
    cart.entries.push(entry.clone());
    entry
}

#[async_trait]
impl CartFacade for InMemoryCartFacade {
    async fn session_cart(&self, key: &CartKey) -> Result<Cart, FacadeError> {
        let carts = self.carts.read().await;
        Ok(carts
            .get(key)
            .cloned()
            .unwrap_or_else(|| Cart::new(key.cart.clone())))
    }

    async fn update_entry_quantity(
        &self,
        key: &CartKey,
        entry_number: EntryNumber,
        quantity: u64,
    ) -> Result<ModificationResult, FacadeError> {
        let mut carts = self.carts.write().await;
        let cart = carts
            .get_mut(key)
            .ok_or_else(|| FacadeError::CartNotFound(key.to_string()))?;
        let entry = entry_mut(cart, entry_number)?;

        let previous = entry.quantity;
        entry.quantity = quantity;
        let updated = entry.clone();

        if quantity == 0 {
            cart.entries.retain(|entry| entry.entry_number != entry_number);
        }
        self.record_write();

        Ok(ModificationResult {
            status_code: ModificationStatus::Success,
            entry: Some(updated),
            quantity,
            quantity_added: signed(quantity) - signed(previous),
            location_changed: false,
        })
    }

    async fn update_entry_location(
        &self,
        key: &CartKey,
        entry_number: EntryNumber,
        location: Option<&LocationName>,
    ) -> Result<ModificationResult, FacadeError> {
        let mut carts = self.carts.write().await;
        let cart = carts
            .get_mut(key)
            .ok_or_else(|| FacadeError::CartNotFound(key.to_string()))?;

        let product_code = entry_mut(cart, entry_number)?.product_code.clone();
        if let Some(other) = cart.find_by_product_and_location(product_code.as_ref(), location)
            && other.entry_number != entry_number
        {
            return Err(FacadeError::Rejected(format!(
                "entry {entry_number} would collide with entry {}",
                other.entry_number
            )));
        }

        let entry = entry_mut(cart, entry_number)?;
        entry.location = location.cloned();
        let updated = entry.clone();
        self.record_write();

        Ok(ModificationResult {
            status_code: ModificationStatus::Success,
            quantity: updated.quantity,
            entry: Some(updated),
            quantity_added: 0,
            location_changed: true,
        })
    }

    async fn add_entry(
        &self,
        key: &CartKey,
        product_code: &ProductCode,
        quantity: u64,
        location: Option<&LocationName>,
    ) -> Result<ModificationResult, FacadeError> {
        let mut carts = self.carts.write().await;
        let cart = carts
            .entry(key.clone())
            .or_insert_with(|| Cart::new(key.cart.clone()));

        let entry = add_or_merge(cart, product_code, quantity, location, None);
        self.record_write();

        Ok(ModificationResult {
            status_code: ModificationStatus::Success,
            quantity: entry.quantity,
            entry: Some(entry),
            quantity_added: signed(quantity),
            location_changed: false,
        })
    }

    fn entry_groups(&self) -> Option<&dyn EntryGroupFacade> {
        if self.entry_groups_enabled {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl EntryGroupFacade for InMemoryCartFacade {
    async fn add_to_entry_group(
        &self,
        key: &CartKey,
        product_code: &ProductCode,
        quantity: u64,
        group: EntryGroupNumber,
    ) -> Result<ModificationResult, FacadeError> {
        let mut carts = self.carts.write().await;
        let cart = carts
            .entry(key.clone())
            .or_insert_with(|| Cart::new(key.cart.clone()));

        let entry = add_or_merge(cart, product_code, quantity, None, Some(group));
        self.record_write();

        Ok(ModificationResult {
            status_code: ModificationStatus::Success,
            quantity: entry.quantity,
            entry: Some(entry),
            quantity_added: signed(quantity),
            location_changed: false,
        })
    }

    async fn remove_entry_group(
        &self,
        key: &CartKey,
        group: EntryGroupNumber,
    ) -> Result<ModificationResult, FacadeError> {
        let mut carts = self.carts.write().await;
        let Some(cart) = carts.get_mut(key) else {
            return Ok(ModificationResult {
                status_code: ModificationStatus::InvalidEntryGroupNumber,
                ..ModificationResult::default()
            });
        };

        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut cart.entries)
            .into_iter()
            .partition(|entry| entry.entry_group_numbers.contains(&group));
        cart.entries = kept;

        if removed.is_empty() {
            return Ok(ModificationResult {
                status_code: ModificationStatus::InvalidEntryGroupNumber,
                ..ModificationResult::default()
            });
        }
        self.record_write();

        let removed_quantity: u64 = removed.iter().map(|entry| entry.quantity).sum();
        Ok(ModificationResult {
            status_code: ModificationStatus::Success,
            entry: None,
            quantity: 0,
            quantity_added: -signed(removed_quantity),
            location_changed: false,
        })
    }
}

// =============================================================================
// Stock
// =============================================================================

/// Error loading a stock fixture file.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read stock fixture: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid stock fixture: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Stock levels served by [`InMemoryStockFacade`].
///
/// ```json
/// {
///   "disabledSites": ["outlet"],
///   "siteStock": { "electronics": { "1234": "LOW_STOCK" } },
///   "locationStock": { "Nakano": { "1234": "OUT_OF_STOCK" } }
/// }
/// ```
///
/// Anything not listed is `UNKNOWN`, and every site not disabled has its
/// stock system enabled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockFixture {
    #[serde(default)]
    pub disabled_sites: Vec<SiteId>,
    #[serde(default)]
    pub site_stock: HashMap<SiteId, HashMap<ProductCode, StockStatus>>,
    #[serde(default)]
    pub location_stock: HashMap<LocationName, HashMap<ProductCode, StockStatus>>,
}

/// Stock facade answering from a fixed [`StockFixture`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryStockFacade {
    fixture: StockFixture,
}

impl InMemoryStockFacade {
    /// Create a facade where every site is enabled and every level unknown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a facade from a fixture.
    #[must_use]
    pub const fn from_fixture(fixture: StockFixture) -> Self {
        Self { fixture }
    }

    /// Load a fixture from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError` if the file cannot be read or parsed.
    pub fn from_fixture_file(path: &Path) -> Result<Self, FixtureError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::from_fixture(serde_json::from_str(&raw)?))
    }

    /// Disable the stock system for a site.
    #[must_use]
    pub fn with_disabled_site(mut self, site: SiteId) -> Self {
        self.fixture.disabled_sites.push(site);
        self
    }

    /// Set the online stock level of a product.
    #[must_use]
    pub fn with_site_stock(mut self, site: SiteId, product: ProductCode, status: StockStatus) -> Self {
        self.fixture
            .site_stock
            .entry(site)
            .or_default()
            .insert(product, status);
        self
    }

    /// Set the stock level of a product at a location.
    #[must_use]
    pub fn with_location_stock(
        mut self,
        location: LocationName,
        product: ProductCode,
        status: StockStatus,
    ) -> Self {
        self.fixture
            .location_stock
            .entry(location)
            .or_default()
            .insert(product, status);
        self
    }
}

#[async_trait]
impl StockFacade for InMemoryStockFacade {
    async fn is_stock_system_enabled(&self, site: &SiteId) -> Result<bool, FacadeError> {
        Ok(!self.fixture.disabled_sites.contains(site))
    }

    async fn site_stock_status(
        &self,
        product_code: &ProductCode,
        site: &SiteId,
    ) -> Result<StockStatus, FacadeError> {
        Ok(self
            .fixture
            .site_stock
            .get(site)
            .and_then(|levels| levels.get(product_code))
            .copied()
            .unwrap_or_default())
    }

    async fn location_stock_status(
        &self,
        product_code: &ProductCode,
        location: &LocationName,
    ) -> Result<StockStatus, FacadeError> {
        Ok(self
            .fixture
            .location_stock
            .get(location)
            .and_then(|levels| levels.get(product_code))
            .copied()
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cart_entries_core::{CartId, UserId};

    fn key() -> CartKey {
        CartKey::new(UserId::parse("anonymous").unwrap(), CartId::parse("c1").unwrap())
    }

    fn product(code: &str) -> ProductCode {
        ProductCode::parse(code).unwrap()
    }

    fn store(name: &str) -> LocationName {
        LocationName::parse(name).unwrap()
    }

    #[tokio::test]
    async fn test_session_cart_defaults_to_empty() {
        let carts = InMemoryCartFacade::new();
        let cart = carts.session_cart(&key()).await.unwrap();
        assert!(cart.entries.is_empty());
        assert_eq!(cart.id.as_str(), "c1");
        assert_eq!(carts.write_count(), 0);
    }

    #[tokio::test]
    async fn test_add_entry_assigns_ascending_numbers_and_merges_identity() {
        let carts = InMemoryCartFacade::new();
        carts.add_entry(&key(), &product("A"), 1, None).await.unwrap();
        carts
            .add_entry(&key(), &product("A"), 1, Some(&store("Store1")))
            .await
            .unwrap();
        let merged = carts.add_entry(&key(), &product("A"), 2, None).await.unwrap();

        assert_eq!(merged.quantity, 3);
        assert_eq!(merged.quantity_added, 2);

        let cart = carts.session_cart(&key()).await.unwrap();
        let numbers: Vec<u32> = cart.entries.iter().map(|e| e.entry_number.as_u32()).collect();
        assert_eq!(numbers, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_update_quantity_zero_removes_entry() {
        let carts = InMemoryCartFacade::new();
        carts.add_entry(&key(), &product("A"), 2, None).await.unwrap();

        let result = carts
            .update_entry_quantity(&key(), EntryNumber::new(0), 0)
            .await
            .unwrap();
        assert_eq!(result.quantity_added, -2);
        assert!(carts.session_cart(&key()).await.unwrap().entries.is_empty());
    }

    #[tokio::test]
    async fn test_update_location_rejects_collision() {
        let carts = InMemoryCartFacade::new();
        carts.add_entry(&key(), &product("A"), 1, None).await.unwrap();
        carts
            .add_entry(&key(), &product("A"), 1, Some(&store("Store1")))
            .await
            .unwrap();

        let result = carts
            .update_entry_location(&key(), EntryNumber::new(0), Some(&store("Store1")))
            .await;
        assert!(matches!(result, Err(FacadeError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_entry_group_capability_is_opt_in() {
        assert!(InMemoryCartFacade::new().entry_groups().is_none());
        assert!(
            InMemoryCartFacade::new()
                .with_entry_groups()
                .entry_groups()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_remove_unknown_entry_group_reports_status() {
        let carts = InMemoryCartFacade::new().with_entry_groups();
        let groups = carts.entry_groups().unwrap();
        groups
            .add_to_entry_group(&key(), &product("A"), 1, EntryGroupNumber::new(1))
            .await
            .unwrap();

        let missing = groups
            .remove_entry_group(&key(), EntryGroupNumber::new(2))
            .await
            .unwrap();
        assert_eq!(missing.status_code, ModificationStatus::InvalidEntryGroupNumber);

        let removed = groups
            .remove_entry_group(&key(), EntryGroupNumber::new(1))
            .await
            .unwrap();
        assert_eq!(removed.status_code, ModificationStatus::Success);
        assert_eq!(removed.quantity_added, -1);
    }

    #[tokio::test]
    async fn test_stock_fixture_defaults_and_overrides() {
        let site = SiteId::parse("electronics").unwrap();
        let stock = InMemoryStockFacade::new()
            .with_site_stock(site.clone(), product("A"), StockStatus::LowStock)
            .with_disabled_site(SiteId::parse("outlet").unwrap());

        assert!(stock.is_stock_system_enabled(&site).await.unwrap());
        assert!(
            !stock
                .is_stock_system_enabled(&SiteId::parse("outlet").unwrap())
                .await
                .unwrap()
        );
        assert_eq!(
            stock.site_stock_status(&product("A"), &site).await.unwrap(),
            StockStatus::LowStock
        );
        assert_eq!(
            stock.site_stock_status(&product("B"), &site).await.unwrap(),
            StockStatus::Unknown
        );
    }

    #[test]
    fn test_stock_fixture_parses_json() {
        let fixture: StockFixture = serde_json::from_str(
            r#"{
                "disabledSites": ["outlet"],
                "locationStock": { "Nakano": { "1234": "OUT_OF_STOCK" } }
            }"#,
        )
        .unwrap();

        assert_eq!(fixture.disabled_sites.len(), 1);
        assert_eq!(
            fixture.location_stock[&store("Nakano")][&product("1234")],
            StockStatus::OutOfStock
        );
        assert!(fixture.site_stock.is_empty());
    }

    #[tokio::test]
    async fn test_stock_fixture_file() {
        let path = std::env::temp_dir().join(format!("stock-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"{ "locationStock": { "Nakano": { "1234": "LOW_STOCK" } } }"#,
        )
        .unwrap();

        let stock = InMemoryStockFacade::from_fixture_file(&path).unwrap();
        std::fs::write(&path, "not json").unwrap();
        let invalid = InMemoryStockFacade::from_fixture_file(&path);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(
            stock
                .location_stock_status(&product("1234"), &store("Nakano"))
                .await
                .unwrap(),
            StockStatus::LowStock
        );
        assert!(matches!(invalid, Err(FixtureError::Parse(_))));
        assert!(matches!(
            InMemoryStockFacade::from_fixture_file(&path),
            Err(FixtureError::Io(_))
        ));
    }
}
