//! Display price parsing

/// Parses a display price such as `"₹1,299.50"` into a comparable number.
///
/// Everything except digits and `.` is stripped. When nothing numeric is left,
/// or the remainder is not a valid float (`"1.2.3"`), the result is
/// `f64::INFINITY` so the offer sorts last and never ranks as cheapest.
pub fn parse_price(display: &str) -> f64 {
    let numeric: String = display
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if numeric.is_empty() {
        return f64::INFINITY;
    }

    numeric.parse().unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_currency_symbols_and_separators() {
        assert_eq!(parse_price("₹48"), 48.0);
        assert_eq!(parse_price("₹ 1,299.50"), 1299.5);
        assert_eq!(parse_price("85.00 INR"), 85.0);
    }

    #[test]
    fn non_numeric_prices_are_infinite() {
        for display in ["", "   ", "₹", "MRP", "Sold out"] {
            assert!(parse_price(display).is_infinite(), "{display:?}");
        }
    }

    #[test]
    fn malformed_numbers_are_infinite() {
        assert!(parse_price("1.2.3").is_infinite());
        assert!(parse_price("...").is_infinite());
    }
}
