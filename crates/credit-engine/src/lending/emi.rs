//! Equated monthly installment arithmetic.

use super::domain::round_currency;

/// Convert an annual percentage rate into the fractional monthly rate.
pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 12.0 / 100.0
}

/// Unrounded installment for `principal` amortised over `tenure_months`.
///
/// A zero rate falls back to straight division. A zero tenure leaves the whole
/// principal due at once.
pub fn compute_emi(principal: f64, annual_rate_percent: f64, tenure_months: u32) -> f64 {
    if tenure_months == 0 {
        return principal;
    }

    let n = f64::from(tenure_months);
    let r = monthly_rate(annual_rate_percent);
    // (1 + r)^n - 1 without cancellation, so tiny rates stay at or above P/n.
    let growth_minus_one = (n * r.ln_1p()).exp_m1();
    if r == 0.0 || growth_minus_one <= 0.0 {
        return principal / n;
    }

    principal * r * (growth_minus_one + 1.0) / growth_minus_one
}

/// Installment rounded to currency precision; use this wherever an EMI is reported or stored.
pub fn monthly_installment(principal: f64, annual_rate_percent: f64, tenure_months: u32) -> f64 {
    round_currency(compute_emi(principal, annual_rate_percent, tenure_months))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_falls_back_to_simple_division() {
        assert_eq!(compute_emi(100_000.0, 0.0, 12), 100_000.0 / 12.0);
        assert_eq!(monthly_installment(100_000.0, 0.0, 12), 8_333.33);
    }

    #[test]
    fn matches_reference_amortisation() {
        assert_eq!(monthly_installment(150_000.0, 10.0, 12), 13_187.38);
        assert_eq!(monthly_installment(100_000.0, 12.0, 12), 8_884.88);
    }

    #[test]
    fn zero_tenure_returns_principal() {
        assert_eq!(compute_emi(5_000.0, 9.0, 0), 5_000.0);
    }

    #[test]
    fn tiny_rates_stay_just_above_simple_division() {
        let principal = 100_000.0;
        let flat = principal / 12.0;
        for rate in [1e-12, 1e-9, 1e-6] {
            let excess = (compute_emi(principal, rate, 12) - flat) / flat;
            assert!(excess > -1e-12 && excess < 1e-7, "rate {rate}: excess {excess}");
        }

        let installments: Vec<f64> = [1e-6, 1e-3, 1.0, 10.0]
            .into_iter()
            .map(|rate| compute_emi(principal, rate, 12))
            .collect();
        assert!(installments.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn installment_moves_with_each_input() {
        let base = compute_emi(200_000.0, 11.0, 24);
        assert!(compute_emi(250_000.0, 11.0, 24) > base);
        assert!(compute_emi(200_000.0, 13.0, 24) > base);
        assert!(compute_emi(200_000.0, 11.0, 36) < base);
    }
}
