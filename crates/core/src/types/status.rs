//! Status enums reported by the commerce platform.

use serde::{Deserialize, Serialize};

/// Stock level of a product, either online for a site or at a pickup location.
///
/// Derived by the platform's stock service on every request; never persisted
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
    /// The stock service has no information for the product.
    #[default]
    Unknown,
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InStock => write!(f, "IN_STOCK"),
            Self::LowStock => write!(f, "LOW_STOCK"),
            Self::OutOfStock => write!(f, "OUT_OF_STOCK"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl std::str::FromStr for StockStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_STOCK" => Ok(Self::InStock),
            "LOW_STOCK" => Ok(Self::LowStock),
            "OUT_OF_STOCK" => Ok(Self::OutOfStock),
            "UNKNOWN" => Ok(Self::Unknown),
            _ => Err(format!("invalid stock status: {s}")),
        }
    }
}

/// Outcome code of a single cart modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ModificationStatus {
    /// The requested change was applied in full.
    #[default]
    Success,
    /// Only part of the requested quantity could be applied.
    LowStock,
    /// Nothing could be applied because the product is out of stock.
    NoStock,
    /// The product cannot be sold.
    Unavailable,
    /// The entry group addressed by the request does not exist.
    InvalidEntryGroupNumber,
}

impl std::fmt::Display for ModificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::LowStock => write!(f, "lowStock"),
            Self::NoStock => write!(f, "noStock"),
            Self::Unavailable => write!(f, "unavailable"),
            Self::InvalidEntryGroupNumber => write!(f, "invalidEntryGroupNumber"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_status_round_trips_through_str() {
        for status in [
            StockStatus::InStock,
            StockStatus::LowStock,
            StockStatus::OutOfStock,
            StockStatus::Unknown,
        ] {
            assert_eq!(status.to_string().parse::<StockStatus>().unwrap(), status);
        }
        assert!("SOMETIMES".parse::<StockStatus>().is_err());
    }

    #[test]
    fn test_stock_status_serde_matches_display() {
        let json = serde_json::to_string(&StockStatus::LowStock).unwrap();
        assert_eq!(json, "\"LOW_STOCK\"");
    }

    #[test]
    fn test_modification_status_serde_matches_display() {
        let status = ModificationStatus::InvalidEntryGroupNumber;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, format!("\"{status}\""));
    }
}
