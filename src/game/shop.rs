//! The weapon shop.
//!
//! A [`Shop`] sells from a fixed [`PriceCatalog`]. Stock is unlimited and the same
//! item can be bought any number of times.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use super::adventure::{BASIC_SWORD, GOLDEN_SWORD, SILVER_SWORD, XP_SWORD};
use super::barbarian::Barbarian;

/// Reasons a purchase is refused. The display text is shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    #[error("The shop doesn't sell '{0}'.")]
    UnknownItem(String),

    #[error("Not enough gold for a {}: it costs {price}, you have {gold}.", display_name(.item))]
    InsufficientGold { item: String, price: u64, gold: u64 },
}

/// Successful purchase receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub item: String,
    pub price: u64,
    pub message: String,
}

/// `basic_sword` -> `basic sword`
pub fn display_name(item: &str) -> String {
    item.replace('_', " ")
}

/// Item id to price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceCatalog {
    prices: BTreeMap<String, u64>,
}

impl PriceCatalog {
    pub fn new(prices: BTreeMap<String, u64>) -> Self {
        PriceCatalog { prices }
    }

    pub fn price(&self, item: &str) -> Option<u64> {
        self.prices.get(item).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Entries sorted by price, then id.
    pub fn listing(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> =
            self.prices.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
        entries
    }
}

impl Default for PriceCatalog {
    fn default() -> Self {
        let mut prices = BTreeMap::new();
        prices.insert(BASIC_SWORD.to_string(), 100);
        prices.insert(SILVER_SWORD.to_string(), 250);
        prices.insert(GOLDEN_SWORD.to_string(), 500);
        prices.insert(XP_SWORD.to_string(), 200);
        PriceCatalog { prices }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Shop {
    catalog: PriceCatalog,
}

impl Shop {
    pub fn new(catalog: PriceCatalog) -> Self {
        Shop { catalog }
    }

    pub fn catalog(&self) -> &PriceCatalog {
        &self.catalog
    }

    pub fn listing(&self) -> Vec<(&str, u64)> {
        self.catalog.listing()
    }

    /// Trade gold for `item`. On failure the barbarian is left untouched.
    pub fn buy(&self, item: &str, barbarian: &mut Barbarian) -> Result<Purchase, ShopError> {
        let price = self
            .catalog
            .price(item)
            .ok_or_else(|| ShopError::UnknownItem(item.to_string()))?;
        if barbarian.gold < price {
            return Err(ShopError::InsufficientGold {
                item: item.to_string(),
                price,
                gold: barbarian.gold,
            });
        }
        barbarian.gold -= price;
        barbarian.items.push(item.to_string());
        Ok(Purchase {
            item: item.to_string(),
            price,
            message: format!("Bought a {}!", display_name(item)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero(gold: u64) -> Barbarian {
        let mut b = Barbarian::new("shopper".to_string(), Vec::new());
        b.gold = gold;
        b
    }

    #[test]
    fn buy_exact_gold_then_fail() {
        let shop = Shop::default();
        let mut b = hero(100);
        let receipt = shop.buy("basic_sword", &mut b).unwrap();
        assert_eq!(receipt.message, "Bought a basic sword!");
        assert_eq!(receipt.price, 100);
        assert_eq!(b.gold, 0);
        assert_eq!(b.items, vec!["basic_sword".to_string()]);

        let before = b.clone();
        let err = shop.buy("basic_sword", &mut b).unwrap_err();
        assert!(matches!(err, ShopError::InsufficientGold { price: 100, gold: 0, .. }));
        assert_eq!(b, before);
    }

    #[test]
    fn unknown_item_is_refused() {
        let shop = Shop::default();
        let mut b = hero(10_000);
        let err = shop.buy("laser_sword", &mut b).unwrap_err();
        assert_eq!(err, ShopError::UnknownItem("laser_sword".into()));
        assert_eq!(b.gold, 10_000);
        assert!(b.items.is_empty());
    }

    #[test]
    fn duplicates_are_allowed() {
        let shop = Shop::default();
        let mut b = hero(400);
        shop.buy("xp_sword", &mut b).unwrap();
        shop.buy("xp_sword", &mut b).unwrap();
        assert_eq!(b.gold, 0);
        assert_eq!(b.items, vec!["xp_sword", "xp_sword"]);
    }

    #[test]
    fn custom_catalog_substitutes() {
        let mut prices = BTreeMap::new();
        prices.insert("stick".to_string(), 1);
        let shop = Shop::new(PriceCatalog::new(prices));
        let mut b = hero(1);
        assert!(shop.buy("stick", &mut b).is_ok());
        assert!(matches!(
            shop.buy("basic_sword", &mut hero(1000)),
            Err(ShopError::UnknownItem(_))
        ));
    }

    #[test]
    fn listing_is_price_ordered() {
        let shop = Shop::default();
        let names: Vec<&str> = shop.listing().into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec!["basic_sword", "xp_sword", "silver_sword", "golden_sword"]
        );
    }

    #[test]
    fn failure_message_reads_well() {
        let err = ShopError::InsufficientGold {
            item: "golden_sword".into(),
            price: 500,
            gold: 12,
        };
        assert_eq!(
            err.to_string(),
            "Not enough gold for a golden sword: it costs 500, you have 12."
        );
    }
}
