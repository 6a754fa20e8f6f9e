//! Market price contracts and the static fallback table.
use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::error::StoreError;

/// Commodity name to price per kg.
pub type PriceTable = BTreeMap<String, i64>;

/// Supplier of current commodity prices.
pub trait MarketPriceProvider {
    /// Fetch the current per-kg price of every tracked commodity.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the underlying source is unreachable.
    fn fetch_current(&self) -> Result<PriceTable, StoreError>;
}

/// Reference per-kg prices used when no live provider is reachable.
/// Converted from per-ounce spot values at 35.274 oz/kg.
static FALLBACK_PRICES: Lazy<PriceTable> = Lazy::new(|| {
    let mut prices = PriceTable::new();
    prices.insert("Copper".to_string(), 141);
    prices.insert("Silver".to_string(), 881);
    prices.insert("Palladium".to_string(), 70_548);
    prices.insert("Platinum".to_string(), 35_274);
    prices.insert("Gold".to_string(), 70_548);
    prices
});

/// Provider backed by the built-in static table. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPriceTable;

impl StaticPriceTable {
    /// The static table itself, for callers that want a snapshot directly.
    #[must_use]
    pub fn snapshot() -> PriceTable {
        FALLBACK_PRICES.clone()
    }
}

impl MarketPriceProvider for StaticPriceTable {
    fn fetch_current(&self) -> Result<PriceTable, StoreError> {
        Ok(FALLBACK_PRICES.clone())
    }
}

/// Wraps a live provider and falls back to the static table on failure.
#[derive(Debug, Clone)]
pub struct FallbackProvider<P> {
    inner: P,
}

impl<P: MarketPriceProvider> FallbackProvider<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

impl<P: MarketPriceProvider> MarketPriceProvider for FallbackProvider<P> {
    fn fetch_current(&self) -> Result<PriceTable, StoreError> {
        match self.inner.fetch_current() {
            Ok(prices) => Ok(prices),
            Err(err) => {
                log::warn!("market price fetch failed, using static table: {err}");
                Ok(StaticPriceTable::snapshot())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;

    impl MarketPriceProvider for FailingProvider {
        fn fetch_current(&self) -> Result<PriceTable, StoreError> {
            Err(StoreError::Unavailable {
                reason: "connection refused".to_string(),
            })
        }
    }

    #[test]
    fn static_table_covers_all_commodities() {
        let prices = StaticPriceTable.fetch_current().unwrap();
        for name in crate::constants::COMMODITIES {
            assert!(prices.contains_key(name), "missing price for {name}");
        }
    }

    #[test]
    fn fallback_recovers_from_provider_failure() {
        let provider = FallbackProvider::new(FailingProvider);
        let prices = provider.fetch_current().unwrap();
        assert_eq!(prices["Gold"], 70_548);
    }
}
