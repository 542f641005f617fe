//! # Search Result Rendering
//!
//! Turns a [`SearchResult`] into the two shapes callers consume: a plain-text
//! comparison for conversational replies and a JSON document for tools.
//!
//! ## Text Layout
//!
//! - **Header**: query and number of products
//! - **Best deal**: the single cheapest offer across all products
//! - **Per product**: `brand - name`, then every offer in ascending price
//!   order, tagged with the cheapest and most expensive offers picked by
//!   [`ranking::rank`], followed by a savings line when the gap is positive.
//!   When every priced offer costs the same, ranking picks the same offer for
//!   both ends and only the cheapest tag is shown
//!
//! An empty result renders a single "no results" line.
//!
//! ## JSON Layout
//!
//! Mirrors the text: `success`, `query`, `source`, `searched_at`,
//! `total_products`, `best_deal`, and per product its offers (with
//! `numeric_price`, `null` when unparseable) plus the ranking summary.

use anyhow::Result;
use serde::Serialize;

use crate::models::{Offer, Product, ResultSource, SearchResult};
use crate::ranking;

/// Message shown when a search produced nothing
pub fn no_results_message(query: &str) -> String {
    format!("No results found for '{query}'. Please try a different or more specific search term.")
}

/// Renders the human-readable comparison
pub fn render_text(result: &SearchResult) -> String {
    if result.is_empty() {
        return no_results_message(&result.query);
    }

    let mut lines = vec![format!(
        "QuickCompare results for '{}' ({} products)",
        result.query,
        result.products.len()
    )];
    if result.source == ResultSource::Fallback {
        lines.push("(sample data: live prices are unavailable right now)".to_string());
    }
    lines.push(String::new());

    if let Some((product, offer)) = ranking::best_overall(&result.products) {
        lines.push(format!(
            "Best deal: {} - {} at {} on {}",
            product.brand, product.name, offer.display_price, offer.platform
        ));
        lines.push(String::new());
    }

    for product in &result.products {
        lines.extend(product_lines(product));
        lines.push(String::new());
    }

    lines.join("\n").trim_end().to_string()
}

fn product_lines(product: &Product) -> Vec<String> {
    let ranked = ranking::rank(product);
    let cheapest = ranked.map(|r| r.cheapest);
    let most_expensive = ranked.and_then(|r| r.most_expensive);

    let mut lines = vec![format!("{} - {}", product.brand, product.name)];

    for offer in ranking::sorted_offers(product) {
        let tag = if cheapest.is_some_and(|c| std::ptr::eq(c, offer)) {
            " [cheapest]"
        } else if most_expensive.is_some_and(|m| std::ptr::eq(m, offer)) {
            " [most expensive]"
        } else {
            ""
        };
        lines.push(format!("  - {}{}", offer_line(offer), tag));
    }

    if let Some(ranked) = ranked
        && let Some(savings) = ranked.savings()
    {
        lines.push(format!(
            "  Savings: {:.2} by buying on {}",
            savings, ranked.cheapest.platform
        ));
    }
    lines
}

fn offer_line(offer: &Offer) -> String {
    if offer.quantity.is_empty() {
        format!("{}: {}", offer.platform, offer.display_price)
    } else {
        format!("{}: {} ({})", offer.platform, offer.display_price, offer.quantity)
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    success: bool,
    query: &'a str,
    source: ResultSource,
    searched_at: String,
    total_products: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    best_deal: Option<JsonBestDeal<'a>>,
    products: Vec<JsonProduct<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonBestDeal<'a> {
    brand: &'a str,
    name: &'a str,
    offer: JsonOffer<'a>,
}

#[derive(Debug, Serialize)]
struct JsonProduct<'a> {
    brand: &'a str,
    name: &'a str,
    offers: Vec<JsonOffer<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cheapest: Option<JsonOffer<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    most_expensive: Option<JsonOffer<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    savings: Option<f64>,
}

#[derive(Debug, Serialize)]
struct JsonOffer<'a> {
    platform: &'a str,
    price: &'a str,
    quantity: &'a str,
    numeric_price: Option<f64>,
}

impl<'a> From<&'a Offer> for JsonOffer<'a> {
    fn from(offer: &'a Offer) -> Self {
        Self {
            platform: &offer.platform,
            price: &offer.display_price,
            quantity: &offer.quantity,
            numeric_price: offer.is_priced().then(|| offer.numeric_price()),
        }
    }
}

impl<'a> From<&'a Product> for JsonProduct<'a> {
    fn from(product: &'a Product) -> Self {
        let ranked = ranking::rank(product);

        Self {
            brand: &product.brand,
            name: &product.name,
            offers: product.offers.iter().map(JsonOffer::from).collect(),
            cheapest: ranked.map(|r| JsonOffer::from(r.cheapest)),
            most_expensive: ranked.and_then(|r| r.most_expensive).map(JsonOffer::from),
            savings: ranked.and_then(|r| r.savings()),
        }
    }
}

/// Renders the machine-readable comparison
pub fn render_json(result: &SearchResult) -> Result<String> {
    let best_deal = ranking::best_overall(&result.products).map(|(product, offer)| JsonBestDeal {
        brand: &product.brand,
        name: &product.name,
        offer: JsonOffer::from(offer),
    });

    let report = JsonReport {
        success: !result.is_empty(),
        query: &result.query,
        source: result.source,
        searched_at: result.searched_at.to_rfc3339(),
        total_products: result.products.len(),
        message: result.is_empty().then(|| no_results_message(&result.query)),
        best_deal,
        products: result.products.iter().map(JsonProduct::from).collect(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}
