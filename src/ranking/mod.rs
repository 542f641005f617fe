//! Price ranking across the offers of one product and across products
//!
//! Only offers with a parseable price take part in ranking. Ties keep the
//! offer seen first, so results follow extraction order deterministically.
//! Nothing here reorders the stored offers.

use std::cmp::Ordering;

use crate::models::{Offer, Product};

/// Cheapest and most expensive priced offers of a product
#[derive(Debug, Clone, Copy)]
pub struct PriceRanking<'a> {
    pub cheapest: &'a Offer,
    /// Absent unless the product has at least two priced offers
    pub most_expensive: Option<&'a Offer>,
}

impl PriceRanking<'_> {
    /// Price gap between the most expensive and cheapest offer, only when
    /// strictly positive
    pub fn savings(&self) -> Option<f64> {
        let most_expensive = self.most_expensive?;
        let savings = most_expensive.numeric_price() - self.cheapest.numeric_price();
        (savings > 0.0).then_some(savings)
    }
}

/// Ranks a product's offers.
///
/// # Returns
/// * `Option<PriceRanking>` - `None` when no offer carries a usable price
pub fn rank(product: &Product) -> Option<PriceRanking<'_>> {
    let priced: Vec<&Offer> = product.offers.iter().filter(|o| o.is_priced()).collect();

    let cheapest = first_extreme(priced.iter().copied(), Ordering::Less)?;
    let most_expensive = if priced.len() > 1 {
        first_extreme(priced.iter().copied(), Ordering::Greater)
    } else {
        None
    };

    Some(PriceRanking {
        cheapest,
        most_expensive,
    })
}

/// The single cheapest offer across every product
pub fn best_overall(products: &[Product]) -> Option<(&Product, &Offer)> {
    products
        .iter()
        .flat_map(|product| product.offers.iter().map(move |offer| (product, offer)))
        .filter(|(_, offer)| offer.is_priced())
        .fold(None::<(&Product, &Offer)>, |best, candidate| match best {
            Some((_, best_offer))
                if compare_prices(candidate.1, best_offer) != Ordering::Less =>
            {
                best
            }
            _ => Some(candidate),
        })
}

/// Offers in ascending price order, unpriced ones last, ties in
/// extraction order
pub fn sorted_offers(product: &Product) -> Vec<&Offer> {
    let mut offers: Vec<&Offer> = product.offers.iter().collect();
    offers.sort_by(|a, b| compare_prices(a, b));
    offers
}

fn compare_prices(a: &Offer, b: &Offer) -> Ordering {
    a.numeric_price().total_cmp(&b.numeric_price())
}

/// First offer that is strictly beyond every earlier one in `direction`
fn first_extreme<'a>(
    offers: impl Iterator<Item = &'a Offer>,
    direction: Ordering,
) -> Option<&'a Offer> {
    offers.fold(None::<&Offer>, |best, offer| match best {
        Some(current) if compare_prices(offer, current) != direction => Some(current),
        _ => Some(offer),
    })
}
