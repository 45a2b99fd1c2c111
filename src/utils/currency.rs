/// Currency utility functions for handling Euro conversions
///
/// All monetary values in the database are stored in cents (1 Euro = 100
/// cents) to avoid floating-point precision issues. The payment processor
/// also charges in minor units, so stored amounts go on the wire unchanged.

/// Convert Euros to cents (multiply by 100)
pub fn euros_to_cents(euros: f64) -> i64 {
    (euros * 100.0).round() as i64
}

/// Convert cents to Euros (divide by 100)
pub fn cents_to_euros(cents: i64) -> f64 {
    cents as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euros_to_cents() {
        assert_eq!(euros_to_cents(150.0), 15000);
        assert_eq!(euros_to_cents(0.50), 50);
        assert_eq!(euros_to_cents(123.45), 12345);
        // rounding, not truncation
        assert_eq!(euros_to_cents(19.999), 2000);
    }

    #[test]
    fn test_cents_to_euros() {
        assert_eq!(cents_to_euros(15000), 150.0);
        assert_eq!(cents_to_euros(50), 0.50);
        assert_eq!(cents_to_euros(12345), 123.45);
    }
}
