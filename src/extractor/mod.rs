//! Product and offer extraction from a loaded results page
//!
//! Works on a DOM snapshot parsed with `scraper`. Every lookup returns an
//! `Option`; a missing field skips the card or the offer it belongs to and
//! never aborts the batch.

use anyhow::{Result, anyhow};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::config::SiteSelectors;
use crate::models::{Offer, Product};
use crate::platform::PlatformResolver;
use crate::quantity::QuantityResolver;

pub struct ProductExtractor {
    card: Selector,
    brand: Selector,
    name: Selector,
    price: Selector,
    platform_container: Selector,
    platform_logo: Selector,
    platforms: PlatformResolver,
    quantities: QuantityResolver,
}

fn parse_selector(kind: &str, selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| anyhow!("Failed to parse {} selector {:?}: {:?}", kind, selector, e))
}

/// Text of an element with its text nodes separated by spaces
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl ProductExtractor {
    pub fn new(selectors: &SiteSelectors) -> Result<Self> {
        Ok(Self {
            card: parse_selector("product card", &selectors.product_card)?,
            brand: parse_selector("brand", &selectors.brand)?,
            name: parse_selector("name", &selectors.name)?,
            price: parse_selector("price", &selectors.price)?,
            platform_container: parse_selector("platform container", &selectors.platform_container)?,
            platform_logo: parse_selector("platform logo", &selectors.platform_logo)?,
            platforms: PlatformResolver::new(),
            quantities: QuantityResolver::new(),
        })
    }

    /// Parses a page snapshot and extracts up to `max_cards` products
    pub fn extract_html(&self, html: &str, max_cards: usize) -> Vec<Product> {
        let document = Html::parse_document(html);
        self.extract(&document, max_cards)
    }

    /// Extracts products from the first `min(card count, max_cards)` cards.
    /// Incomplete cards are skipped.
    pub fn extract(&self, document: &Html, max_cards: usize) -> Vec<Product> {
        let cards: Vec<ElementRef> = document.select(&self.card).collect();
        let limit = cards.len().min(max_cards);
        info!(
            "Found {} product cards, processing up to {}",
            cards.len(),
            limit
        );

        let products: Vec<Product> = cards
            .into_iter()
            .take(limit)
            .enumerate()
            .filter_map(|(index, card)| self.extract_card(index, card))
            .collect();

        info!("Successfully extracted {} products", products.len());
        products
    }

    fn extract_card(&self, index: usize, card: ElementRef) -> Option<Product> {
        let brand = card.select(&self.brand).next().map(element_text);
        let name = card.select(&self.name).next().map(element_text);

        let (Some(brand), Some(name)) = (brand, name) else {
            warn!("Skipping card {}: missing brand or name", index);
            return None;
        };

        let offers = self.extract_offers(card, &name);
        let offer_count = offers.len();

        let product = Product::new(&brand, &name, offers);
        if product.is_none() {
            warn!(
                "Incomplete product data in card {}: brand='{}', name='{}', offers={}",
                index, brand, name, offer_count
            );
        }
        product
    }

    fn extract_offers(&self, card: ElementRef, name: &str) -> Vec<Offer> {
        card.select(&self.price)
            .enumerate()
            .filter_map(|(index, price)| {
                let offer = self.extract_offer(card, price, name);
                if offer.is_none() {
                    debug!("Skipping offer {} in card", index);
                }
                offer
            })
            .collect()
    }

    fn extract_offer(&self, card: ElementRef, price: ElementRef, name: &str) -> Option<Offer> {
        let display_price = element_text(price);
        let platform = self.platform_for_price(card, price);

        let display_price = display_price.trim();
        let platform = platform.trim();
        if display_price.is_empty() || platform.is_empty() {
            return None;
        }

        let nearby = Self::text_near_price(card, price);
        let quantity = self.quantities.resolve(name, &nearby);

        Some(Offer::new(platform, display_price, quantity))
    }

    /// Resolves the storefront from the logo in the closest platform row
    /// above the price that holds one, stopping at the card boundary
    fn platform_for_price(&self, card: ElementRef, price: ElementRef) -> String {
        let logo = price
            .ancestors()
            .take_while(|node| node.id() != card.id())
            .filter_map(ElementRef::wrap)
            .filter(|ancestor| self.platform_container.matches(ancestor))
            .find_map(|row| row.select(&self.platform_logo).next());

        match logo {
            Some(img) => self
                .platforms
                .resolve(img.value().attr("src"), img.value().attr("alt")),
            None => self.platforms.resolve(None, None),
        }
    }

    /// Text scopes around a price, most specific first: sibling nodes, the
    /// price's direct container, then the whole card
    fn text_near_price(card: ElementRef, price: ElementRef) -> Vec<String> {
        let mut scopes: Vec<String> = price
            .prev_siblings()
            .chain(price.next_siblings())
            .filter_map(|node| match ElementRef::wrap(node) {
                Some(element) => Some(element_text(element)),
                None => node.value().as_text().map(|text| text.trim().to_string()),
            })
            .filter(|text| !text.is_empty())
            .collect();

        if let Some(container) = price.parent().and_then(ElementRef::wrap) {
            scopes.push(element_text(container));
        }
        scopes.push(element_text(card));
        scopes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::UNKNOWN_PLATFORM;
    use crate::ranking;

    fn extractor() -> ProductExtractor {
        ProductExtractor::new(&SiteSelectors::default()).expect("default selectors parse")
    }

    fn offer_row(logo: &str, price: &str, extra: &str) -> String {
        format!(
            r#"<div class="flex w-full items-center justify-between">
                 <img src="{logo}" alt="">
                 <div><span class="text-m font-bold">{price}</span>{extra}</div>
               </div>"#
        )
    }

    fn card(brand: Option<&str>, name: Option<&str>, rows: &[String]) -> String {
        format!(
            r#"<div class="flex flex-col gap-2 rounded-md bg-white">{}{}{}</div>"#,
            brand.map_or(String::new(), |b| format!(r#"<div class="line-clamp-1">{b}</div>"#)),
            name.map_or(String::new(), |n| format!(r#"<div class="line-clamp-2">{n}</div>"#)),
            rows.join("")
        )
    }

    fn page(cards: &[String]) -> String {
        format!("<html><body><main>{}</main></body></html>", cards.join(""))
    }

    #[test]
    fn incomplete_cards_are_discarded() {
        let html = page(&[
            card(
                Some("Fresho"),
                Some("Farm Fresh Eggs 6 pieces"),
                &[
                    offer_row("https://cdn.quickcompare.in/logos/bigbasket.png", "₹48", ""),
                    offer_row("https://cdn.quickcompare.in/logos/Blinkit_logo.png", "₹52", ""),
                ],
            ),
            card(
                Some("Happy Hens"),
                None,
                &[offer_row("https://cdn.quickcompare.in/logos/zepto.png", "₹85", "")],
            ),
        ]);

        let products = extractor().extract_html(&html, 5);

        assert_eq!(products.len(), 1);
        let product = &products[0];
        assert_eq!(product.brand, "Fresho");
        assert_eq!(product.name, "Farm Fresh Eggs 6 pieces");
        assert_eq!(product.offers.len(), 2);
        assert!(product.offers.iter().all(|o| o.quantity == "6 pieces"));

        let ranked = ranking::rank(product).expect("priced offers");
        assert_eq!(ranked.cheapest.platform, "BigBasket");
        assert_eq!(ranked.cheapest.numeric_price(), 48.0);
        assert_eq!(ranked.savings(), Some(4.0));
    }

    #[test]
    fn card_limit_caps_processed_cards() {
        let cards: Vec<String> = (0..4)
            .map(|i| {
                card(
                    Some("Amul"),
                    Some(&format!("Milk variant {i}")),
                    &[offer_row("https://cdn/zepto.png", "₹30", "")],
                )
            })
            .collect();

        assert_eq!(extractor().extract_html(&page(&cards), 2).len(), 2);
        assert_eq!(extractor().extract_html(&page(&cards), 20).len(), 4);
    }

    #[test]
    fn card_without_offers_is_discarded() {
        let html = page(&[card(Some("Amul"), Some("Butter 100 g"), &[])]);
        assert!(extractor().extract_html(&html, 5).is_empty());
    }

    #[test]
    fn empty_prices_are_skipped_individually() {
        let html = page(&[card(
            Some("Amul"),
            Some("Butter 100 g"),
            &[
                offer_row("https://cdn/zepto.png", "  ", ""),
                offer_row("https://cdn/blinkit.png", "₹56", ""),
            ],
        )]);

        let products = extractor().extract_html(&html, 5);

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].offers.len(), 1);
        assert_eq!(products[0].offers[0].platform, "Blinkit");
    }

    #[test]
    fn price_without_logo_row_is_unknown_platform() {
        let html = page(&[card(
            Some("Amul"),
            Some("Butter 100 g"),
            &[r#"<p><span class="text-m font-bold">₹56</span></p>"#.to_string()],
        )]);

        let products = extractor().extract_html(&html, 5);

        assert_eq!(products[0].offers[0].platform, UNKNOWN_PLATFORM);
    }

    #[test]
    fn logo_is_found_past_a_nested_row_without_one() {
        let nested = r#"<div class="flex w-full items-center">
                 <img src="https://cdn.quickcompare.in/logos/bigbasket.png" alt="">
                 <div class="flex w-full items-center"><span class="text-m font-bold">₹48</span></div>
               </div>"#
            .to_string();
        let html = page(&[card(Some("Fresho"), Some("Farm Fresh Eggs 6 pieces"), &[nested])]);

        let products = extractor().extract_html(&html, 5);

        assert_eq!(products[0].offers[0].platform, "BigBasket");
        assert_eq!(products[0].offers[0].numeric_price(), 48.0);
    }

    #[test]
    fn quantity_comes_from_text_next_to_the_price() {
        let html = page(&[card(
            Some("Country Delight"),
            Some("Cow Milk"),
            &[
                offer_row("https://cdn/zepto.png", "₹35", "<span>500 ml</span>"),
                offer_row("https://cdn/instamart.png", "₹68", "<span>1 L</span>"),
            ],
        )]);

        let products = extractor().extract_html(&html, 5);
        let offers = &products[0].offers;

        assert_eq!(offers[0].platform, "Zepto");
        assert_eq!(offers[0].quantity, "500 ml");
        assert_eq!(offers[1].platform, "Swiggy Instamart");
        assert_eq!(offers[1].quantity, "1 L");
    }

    #[test]
    fn no_cards_means_no_products() {
        assert!(extractor().extract_html("<html><body></body></html>", 5).is_empty());
    }

    #[test]
    fn invalid_selector_is_reported() {
        let selectors = SiteSelectors {
            price: "span[".to_string(),
            ..SiteSelectors::default()
        };
        assert!(ProductExtractor::new(&selectors).is_err());
    }
}
