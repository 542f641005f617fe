//! Fixed synthetic catalog served when browser automation cannot run

use tracing::info;

use crate::models::{Offer, Product};

/// (brand, name, quantity, offers as (platform, price))
const CATALOG: &[(&str, &str, &str, &[(&str, &str)])] = &[
    (
        "Fresho",
        "Farm Fresh Eggs 6 pieces",
        "6 pieces",
        &[("BigBasket", "₹48"), ("Blinkit", "₹52"), ("Zepto", "₹45")],
    ),
    (
        "Happy Hens",
        "Brown Eggs 12 pieces",
        "12 pieces",
        &[("Swiggy Instamart", "₹85"), ("JioMart", "₹88"), ("BigBasket", "₹82")],
    ),
    (
        "Country Eggs",
        "Organic White Eggs 10 pieces",
        "10 pieces",
        &[("Blinkit", "₹95"), ("Zepto", "₹92")],
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackDataProvider;

impl FallbackDataProvider {
    pub fn new() -> Self {
        Self
    }

    /// The same products for every query, truncated to `max_cards`
    pub fn generate(&self, query: &str, max_cards: usize) -> Vec<Product> {
        info!("Generating fallback data for '{}'", query);

        CATALOG
            .iter()
            .take(max_cards)
            .filter_map(|(brand, name, quantity, offers)| {
                let offers = offers
                    .iter()
                    .map(|(platform, price)| Offer::new(*platform, *price, *quantity))
                    .collect();
                Product::new(brand, name, offers)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_to_max_cards_deterministically() {
        let provider = FallbackDataProvider::new();

        let first = provider.generate("milk", 2);
        let second = provider.generate("milk", 2);

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn full_catalog_is_well_formed() {
        let products = FallbackDataProvider::new().generate("eggs", 20);

        assert_eq!(products.len(), 3);
        for product in &products {
            assert!(!product.brand.is_empty());
            assert!((2..=3).contains(&product.offers.len()));
            assert!(product.offers.iter().all(Offer::is_priced));
        }
        assert_eq!(products[0].offers[0].quantity, "6 pieces");
    }
}
