//! Time-value helpers.
//!
//! `rate` is a per-turn discount factor in `(0, 1]`: a payment one turn from
//! now is worth `rate` times a payment today.

/// Value today of `payment` received `term` turns from now.
pub fn present_value(payment: f64, term: u32, rate: f64) -> f64 {
    payment * rate.powi(term as i32)
}

/// Value of `payment` every turn forever, starting now.
///
/// Diverges at `rate == 1`; parameter validation rules that combination out.
pub fn perpetuity(payment: f64, rate: f64) -> f64 {
    payment / (1.0 - rate)
}

/// Value of `payment` every turn for `term` turns, starting now.
pub fn annuity(payment: f64, term: u32, rate: f64) -> f64 {
    if rate >= 1.0 {
        return payment * f64::from(term);
    }
    perpetuity(payment, rate) * (1.0 - rate.powi(term as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_present_value_at_zero_is_identity() {
        assert_eq!(present_value(42.0, 0, 0.95), 42.0);
    }

    #[test]
    fn test_present_value_discounts() {
        assert!((present_value(100.0, 2, 0.5) - 25.0).abs() < EPS);
    }

    #[test]
    fn test_perpetuity() {
        assert!((perpetuity(5.0, 0.95) - 100.0).abs() < EPS);
    }

    #[test]
    fn test_annuity_single_term_is_one_payment() {
        assert!((annuity(7.0, 1, 0.9) - 7.0).abs() < EPS);
    }

    #[test]
    fn test_annuity_zero_terms_is_worthless() {
        assert_eq!(annuity(7.0, 0, 0.9), 0.0);
    }

    #[test]
    fn test_annuity_without_discount_sums_payments() {
        assert_eq!(annuity(3.0, 10, 1.0), 30.0);
    }
}
