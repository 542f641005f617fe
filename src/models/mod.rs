//! Data models for price offers, products and search results

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::price::parse_price;

/// One storefront's price quote for a product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Offer {
    pub platform: String,
    /// Price exactly as displayed, currency symbol included
    #[serde(rename = "price")]
    pub display_price: String,
    /// Empty when no quantity could be resolved
    pub quantity: String,
    #[serde(skip)]
    numeric_price: f64,
}

impl Offer {
    pub fn new(
        platform: impl Into<String>,
        display_price: impl Into<String>,
        quantity: impl Into<String>,
    ) -> Self {
        let display_price = display_price.into();
        let numeric_price = parse_price(&display_price);

        Self {
            platform: platform.into(),
            display_price,
            quantity: quantity.into(),
            numeric_price,
        }
    }

    /// Parsed price, `f64::INFINITY` when the display price holds no number
    pub fn numeric_price(&self) -> f64 {
        self.numeric_price
    }

    pub fn is_priced(&self) -> bool {
        self.numeric_price.is_finite()
    }
}

/// A product card from the aggregator with every offer found on it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub brand: String,
    pub name: String,
    pub offers: Vec<Offer>,
}

impl Product {
    /// Builds a product only when brand, name and offers are all present
    pub fn new(brand: &str, name: &str, offers: Vec<Offer>) -> Option<Self> {
        let brand = brand.trim();
        let name = name.trim();

        if brand.is_empty() || name.is_empty() || offers.is_empty() {
            return None;
        }

        Some(Self {
            brand: brand.to_string(),
            name: name.to_string(),
            offers,
        })
    }
}

/// Where the products of a search came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Live,
    Fallback,
}

/// Outcome of one `search` call. Rendered through `report`, not serialized
/// directly.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub query: String,
    pub products: Vec<Product>,
    pub source: ResultSource,
    pub searched_at: DateTime<Utc>,
}

impl SearchResult {
    pub fn new(query: &str, products: Vec<Product>, source: ResultSource) -> Self {
        Self {
            query: query.to_string(),
            products,
            source,
            searched_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
