//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::fields::FieldSets;
use crate::platform::{CartFacade, StockFacade};
use crate::services::EntryService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// platform facades and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    carts: Arc<dyn CartFacade>,
    stock: Arc<dyn StockFacade>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `carts` - Cart platform facade
    /// * `stock` - Stock platform facade
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        carts: Arc<dyn CartFacade>,
        stock: Arc<dyn StockFacade>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                carts,
                stock,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the configured response field levels.
    #[must_use]
    pub fn field_sets(&self) -> &FieldSets {
        &self.config().field_sets
    }

    /// Get a reference to the cart facade.
    #[must_use]
    pub fn carts(&self) -> &dyn CartFacade {
        self.inner.carts.as_ref()
    }

    /// Get a reference to the stock facade.
    #[must_use]
    pub fn stock(&self) -> &dyn StockFacade {
        self.inner.stock.as_ref()
    }

    /// Entry service borrowing this state's facades.
    #[must_use]
    pub fn entries(&self) -> EntryService<'_> {
        EntryService::new(self.carts(), self.stock())
    }
}
