use super::types::{Assumptions, Projection};

/// Fisher relation: nominal return adjusted for inflation.
pub fn real_rate_of_return(nominal_rate: f64, inflation_rate: f64) -> f64 {
    (1.0 + nominal_rate) / (1.0 + inflation_rate) - 1.0
}

/// Inflation-adjusted value of a lump contribution after `years` of compound
/// growth at the real rate implied by the nominal and inflation rates.
pub fn future_value(contribution: f64, nominal_rate: f64, inflation_rate: f64, years: u32) -> f64 {
    let real_rate = real_rate_of_return(nominal_rate, inflation_rate);
    contribution * (1.0 + real_rate).powf(f64::from(years))
}

/// Compares the two account types under the given assumptions.
///
/// TSFA: the deposit goes in as-is, grows tax-free, and is withdrawn
/// untaxed. RRSP: the deposit is grossed up by the current-year tax
/// deduction, grows tax-deferred, and the withdrawal is taxed at the
/// retirement rate. Values are unrounded.
pub fn project(assumptions: &Assumptions) -> Result<Projection, String> {
    check_assumptions(assumptions)?;

    let tsfa_deposit = assumptions.deposit_amount;
    let tsfa_future_value = future_value(
        tsfa_deposit,
        assumptions.return_on_investment,
        assumptions.inflation_rate,
        assumptions.years_of_investment,
    );

    let rrsp_deposit = assumptions.deposit_amount / (1.0 - assumptions.current_tax_rate);
    let rrsp_future_value = future_value(
        rrsp_deposit,
        assumptions.return_on_investment,
        assumptions.inflation_rate,
        assumptions.years_of_investment,
    );
    let rrsp_tax_paid = rrsp_future_value * assumptions.retirement_tax_rate;

    Ok(Projection {
        tsfa_deposit,
        tsfa_future_value,
        tsfa_tax_paid: 0.0,
        tsfa_after_tax_future_value: tsfa_future_value,
        rrsp_deposit,
        rrsp_future_value,
        rrsp_tax_paid,
        rrsp_after_tax_future_value: rrsp_future_value - rrsp_tax_paid,
    })
}

fn check_assumptions(assumptions: &Assumptions) -> Result<(), String> {
    if !assumptions.deposit_amount.is_finite() || assumptions.deposit_amount <= 0.0 {
        return Err("deposit_amount must be > 0".to_string());
    }
    if !(0.0..1.0).contains(&assumptions.current_tax_rate) {
        return Err("current_tax_rate must be at least 0 and below 1".to_string());
    }
    if !(0.0..1.0).contains(&assumptions.retirement_tax_rate) {
        return Err("retirement_tax_rate must be at least 0 and below 1".to_string());
    }
    if assumptions.years_of_investment == 0 {
        return Err("years_of_investment must be > 0".to_string());
    }
    if !assumptions.return_on_investment.is_finite() {
        return Err("return_on_investment must be finite".to_string());
    }
    if !assumptions.inflation_rate.is_finite() || assumptions.inflation_rate <= -1.0 {
        return Err("inflation_rate must be > -1".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assume, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_assumptions() -> Assumptions {
        Assumptions {
            current_tax_rate: 0.30,
            retirement_tax_rate: 0.20,
            deposit_amount: 1_000.0,
            years_of_investment: 10,
            return_on_investment: 0.05,
            inflation_rate: 0.02,
        }
    }

    #[test]
    fn real_rate_matches_fisher_relation() {
        assert_approx(real_rate_of_return(0.05, 0.02), 1.05 / 1.02 - 1.0);
        assert_approx(real_rate_of_return(0.0, 0.0), 0.0);
        assert_approx_tol(real_rate_of_return(0.05, 0.02), 0.029411764705882, 1e-12);
    }

    #[test]
    fn future_value_with_zero_years_is_the_contribution() {
        assert_approx(future_value(1_000.0, 0.05, 0.02, 0), 1_000.0);
    }

    #[test]
    fn future_value_with_equal_nominal_and_inflation_rates_does_not_grow() {
        assert_approx(future_value(1_000.0, 0.05, 0.05, 25), 1_000.0);
        assert_approx(future_value(250.0, -0.01, -0.01, 40), 250.0);
    }

    #[test]
    fn projection_matches_hand_computed_oracle() {
        let projection = project(&sample_assumptions()).expect("valid assumptions");

        // real rate = 1.05 / 1.02 - 1; growth over 10 years = (35/34)^10.
        assert_approx_tol(projection.tsfa_deposit, 1_000.0, 1e-9);
        assert_approx_tol(projection.tsfa_future_value, 1_336.260938, 1e-3);
        assert_approx_tol(projection.tsfa_tax_paid, 0.0, 1e-12);
        assert_approx_tol(projection.tsfa_after_tax_future_value, 1_336.260938, 1e-3);
        assert_approx_tol(projection.rrsp_deposit, 1_428.571428571, 1e-6);
        assert_approx_tol(projection.rrsp_future_value, 1_908.944197, 1e-3);
        assert_approx_tol(projection.rrsp_tax_paid, 381.788839, 1e-3);
        assert_approx_tol(projection.rrsp_after_tax_future_value, 1_527.155357, 1e-3);
    }

    #[test]
    fn projection_is_deterministic() {
        let assumptions = sample_assumptions();
        let first = project(&assumptions).expect("valid assumptions");
        let second = project(&assumptions).expect("valid assumptions");

        assert_eq!(first.tsfa_future_value.to_bits(), second.tsfa_future_value.to_bits());
        assert_eq!(first.rrsp_future_value.to_bits(), second.rrsp_future_value.to_bits());
        assert_eq!(first.rrsp_tax_paid.to_bits(), second.rrsp_tax_paid.to_bits());
        assert_eq!(
            first.rrsp_after_tax_future_value.to_bits(),
            second.rrsp_after_tax_future_value.to_bits()
        );
    }

    #[test]
    fn zero_current_tax_rate_means_equal_deposits() {
        let mut assumptions = sample_assumptions();
        assumptions.current_tax_rate = 0.0;

        let projection = project(&assumptions).expect("valid assumptions");
        assert_approx(projection.rrsp_deposit, projection.tsfa_deposit);
        assert_approx(projection.rrsp_future_value, projection.tsfa_future_value);
    }

    #[test]
    fn equal_return_and_inflation_preserves_the_contribution() {
        let mut assumptions = sample_assumptions();
        assumptions.return_on_investment = 0.03;
        assumptions.inflation_rate = 0.03;

        let projection = project(&assumptions).expect("valid assumptions");
        assert_approx(projection.tsfa_future_value, assumptions.deposit_amount);
        assert_approx(projection.rrsp_future_value, projection.rrsp_deposit);
    }

    #[test]
    fn rejects_non_positive_deposit() {
        let mut assumptions = sample_assumptions();
        assumptions.deposit_amount = 0.0;
        let err = project(&assumptions).expect_err("must reject zero deposit");
        assert!(err.contains("deposit_amount"));

        assumptions.deposit_amount = -10.0;
        let err = project(&assumptions).expect_err("must reject negative deposit");
        assert!(err.contains("deposit_amount"));
    }

    #[test]
    fn rejects_full_current_tax_rate() {
        let mut assumptions = sample_assumptions();
        assumptions.current_tax_rate = 1.0;
        let err = project(&assumptions).expect_err("must reject 100% current tax");
        assert!(err.contains("current_tax_rate"));
    }

    #[test]
    fn rejects_out_of_range_retirement_tax_rate() {
        let mut assumptions = sample_assumptions();
        assumptions.retirement_tax_rate = 1.0;
        let err = project(&assumptions).expect_err("must reject 100% retirement tax");
        assert!(err.contains("retirement_tax_rate"));

        assumptions.retirement_tax_rate = -0.1;
        let err = project(&assumptions).expect_err("must reject negative retirement tax");
        assert!(err.contains("retirement_tax_rate"));
    }

    #[test]
    fn rejects_zero_years() {
        let mut assumptions = sample_assumptions();
        assumptions.years_of_investment = 0;
        let err = project(&assumptions).expect_err("must reject zero years");
        assert!(err.contains("years_of_investment"));
    }

    #[test]
    fn rejects_deflation_at_or_below_minus_one() {
        let mut assumptions = sample_assumptions();
        assumptions.inflation_rate = -1.0;
        let err = project(&assumptions).expect_err("must reject -100% inflation");
        assert!(err.contains("inflation_rate"));

        assumptions.inflation_rate = -1.5;
        let err = project(&assumptions).expect_err("must reject inflation below -100%");
        assert!(err.contains("inflation_rate"));
    }

    #[test]
    fn rejects_non_finite_return() {
        let mut assumptions = sample_assumptions();
        assumptions.return_on_investment = f64::NAN;
        let err = project(&assumptions).expect_err("must reject NaN return");
        assert!(err.contains("return_on_investment"));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_tsfa_branch_is_never_taxed(
            current_tax_bp in 0u32..10_000,
            retirement_tax_bp in 0u32..10_000,
            deposit_cents in 1u64..100_000_000,
            years in 1u32..80,
            roi_bp in -5_000i32..5_000,
            inflation_bp in -5_000i32..5_000
        ) {
            let assumptions = Assumptions {
                current_tax_rate: current_tax_bp as f64 / 10_000.0,
                retirement_tax_rate: retirement_tax_bp as f64 / 10_000.0,
                deposit_amount: deposit_cents as f64 / 100.0,
                years_of_investment: years,
                return_on_investment: roi_bp as f64 / 10_000.0,
                inflation_rate: inflation_bp as f64 / 10_000.0,
            };

            let projection = project(&assumptions).expect("valid assumptions");
            prop_assert!(projection.tsfa_tax_paid == 0.0);
            prop_assert!(
                projection.tsfa_after_tax_future_value == projection.tsfa_future_value
            );
        }

        #[test]
        fn prop_rrsp_after_tax_identity_holds_exactly(
            current_tax_bp in 0u32..10_000,
            retirement_tax_bp in 0u32..10_000,
            deposit_cents in 1u64..100_000_000,
            years in 1u32..80,
            roi_bp in -5_000i32..5_000,
            inflation_bp in -5_000i32..5_000
        ) {
            let assumptions = Assumptions {
                current_tax_rate: current_tax_bp as f64 / 10_000.0,
                retirement_tax_rate: retirement_tax_bp as f64 / 10_000.0,
                deposit_amount: deposit_cents as f64 / 100.0,
                years_of_investment: years,
                return_on_investment: roi_bp as f64 / 10_000.0,
                inflation_rate: inflation_bp as f64 / 10_000.0,
            };

            let projection = project(&assumptions).expect("valid assumptions");
            prop_assert!(
                projection.rrsp_after_tax_future_value
                    == projection.rrsp_future_value - projection.rrsp_tax_paid
            );
        }

        #[test]
        fn prop_outputs_are_finite_and_rrsp_deposit_dominates(
            current_tax_bp in 0u32..10_000,
            retirement_tax_bp in 0u32..10_000,
            deposit_cents in 1u64..100_000_000,
            years in 1u32..80,
            roi_bp in -5_000i32..5_000,
            inflation_bp in -5_000i32..5_000
        ) {
            let assumptions = Assumptions {
                current_tax_rate: current_tax_bp as f64 / 10_000.0,
                retirement_tax_rate: retirement_tax_bp as f64 / 10_000.0,
                deposit_amount: deposit_cents as f64 / 100.0,
                years_of_investment: years,
                return_on_investment: roi_bp as f64 / 10_000.0,
                inflation_rate: inflation_bp as f64 / 10_000.0,
            };

            let projection = project(&assumptions).expect("valid assumptions");
            for value in [
                projection.tsfa_deposit,
                projection.tsfa_future_value,
                projection.tsfa_after_tax_future_value,
                projection.rrsp_deposit,
                projection.rrsp_future_value,
                projection.rrsp_tax_paid,
                projection.rrsp_after_tax_future_value,
            ] {
                prop_assert!(value.is_finite());
                prop_assert!(value >= 0.0);
            }

            // Grossing up never shrinks the deposit while the tax rate is
            // below 100%.
            prop_assert!(projection.rrsp_deposit >= projection.tsfa_deposit);
        }

        #[test]
        fn prop_growth_factor_is_shared_between_branches(
            deposit_cents in 1u64..100_000_000,
            years in 1u32..60,
            roi_bp in -3_000i32..3_000,
            inflation_bp in -3_000i32..3_000
        ) {
            let assumptions = Assumptions {
                current_tax_rate: 0.25,
                retirement_tax_rate: 0.0,
                deposit_amount: deposit_cents as f64 / 100.0,
                years_of_investment: years,
                return_on_investment: roi_bp as f64 / 10_000.0,
                inflation_rate: inflation_bp as f64 / 10_000.0,
            };

            let projection = project(&assumptions).expect("valid assumptions");
            prop_assume!(projection.tsfa_deposit > 0.0 && projection.rrsp_deposit > 0.0);

            let tsfa_growth = projection.tsfa_future_value / projection.tsfa_deposit;
            let rrsp_growth = projection.rrsp_future_value / projection.rrsp_deposit;
            prop_assert!((tsfa_growth - rrsp_growth).abs() <= 1e-9 * tsfa_growth.abs().max(1.0));
        }
    }
}
