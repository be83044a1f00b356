//! Smuggler discount pricing

pub const SMUGGLER_DISCOUNT_MIN_PERCENT: i64 = 50;
pub const SMUGGLER_DISCOUNT_MAX_PERCENT: i64 = 70;

/// Price at `percent` of catalog, never below 1 gold
pub fn discounted_price(catalog_price: i64, percent: i64) -> i64 {
    (catalog_price.max(0) * percent / 100).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discounted_price() {
        assert_eq!(discounted_price(200, 50), 100);
        assert_eq!(discounted_price(199, 70), 139);
        assert_eq!(discounted_price(1, 50), 1);
    }
}
