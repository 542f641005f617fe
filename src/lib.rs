//! Grocery price comparison across Indian quick-commerce storefronts.
//!
//! Drives a headless browser against the QuickCompare aggregator, extracts
//! every storefront's offer for the matching products and ranks them.

pub mod browser;
pub mod config;
pub mod coordinator;
pub mod extractor;
pub mod fallback;
pub mod models;
pub mod platform;
pub mod price;
pub mod quantity;
pub mod ranking;
pub mod report;
pub mod session;
pub mod traits;

pub use config::ScraperConfig;
pub use coordinator::ScrapeCoordinator;
pub use models::{Offer, Product, ResultSource, SearchResult};
