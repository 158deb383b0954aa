use proptest::prelude::*;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use ytm_core::analysis::calculate_ytm;
use ytm_core::pricer::bond_price;
use ytm_core::solver::{solve_yield, SolverConfig, INITIAL_GUESS};
use ytm_core::types::BondParameters;
use ytm_core::validation::YtmInput;

fn bond(coupon: Decimal, face_value: Decimal, periods: u32) -> BondParameters {
    BondParameters {
        coupon,
        face_value,
        periods,
    }
}

// ===========================================================================
// Reference scenarios
// ===========================================================================

#[test]
fn test_ten_year_discount_bond() {
    // 950 price, 50 coupon, 1000 face, 10 periods → ~5.67%
    let sol = solve_yield(dec!(950), &bond(dec!(50), dec!(1000), 10), &SolverConfig::default())
        .unwrap();
    assert!(sol.converged);
    assert!(
        (sol.yield_rate - dec!(0.0567)).abs() < dec!(0.0001),
        "Expected ~5.67%, got {}",
        sol.yield_rate
    );
    assert!(sol.iterations < 10, "took {} iterations", sol.iterations);
}

#[test]
fn test_par_bond_needs_at_most_one_step() {
    let sol = solve_yield(dec!(1000), &bond(dec!(50), dec!(1000), 10), &SolverConfig::default())
        .unwrap();
    assert!(sol.history.len() <= 2);
    assert!((sol.yield_rate - dec!(0.05)).abs() < dec!(0.000001));
}

#[test]
fn test_zero_coupon_matches_closed_form() {
    // (1000/600)^(1/5) - 1 ≈ 10.7566%
    let sol = solve_yield(dec!(600), &bond(dec!(0), dec!(1000), 5), &SolverConfig::default())
        .unwrap();
    let closed_form = (dec!(1000) / dec!(600)).powd(dec!(0.2)) - Decimal::ONE;
    assert!(
        (sol.yield_rate - closed_form).abs() < dec!(0.000001),
        "Solver {} vs closed form {}",
        sol.yield_rate,
        closed_form
    );
    assert!((sol.yield_rate - dec!(0.1076)).abs() < dec!(0.0001));
}

#[test]
fn test_single_period_matches_closed_form() {
    // (60 + 1000) / 980 - 1
    let sol = solve_yield(dec!(980), &bond(dec!(60), dec!(1000), 1), &SolverConfig::default())
        .unwrap();
    let closed_form = (dec!(60) + dec!(1000)) / dec!(980) - Decimal::ONE;
    assert!((sol.yield_rate - closed_form).abs() < dec!(0.000001));
}

#[test]
fn test_premium_bond_yields_below_coupon_rate() {
    let sol = solve_yield(dec!(1100), &bond(dec!(50), dec!(1000), 10), &SolverConfig::default())
        .unwrap();
    assert!(sol.yield_rate < dec!(0.05));
    assert!((sol.yield_rate - dec!(0.0378)).abs() < dec!(0.0001));
}

#[test]
fn test_long_bond_at_high_yield() {
    // 360 periods priced at 200: the root is exactly 25%
    let sol = solve_yield(dec!(200), &bond(dec!(50), dec!(1000), 360), &SolverConfig::default())
        .unwrap();
    assert!(sol.converged);
    assert!(sol.iterations <= 10, "took {} iterations", sol.iterations);
    assert!((sol.yield_rate - dec!(0.25)).abs() < dec!(0.000001));
}

#[test]
fn test_hundred_period_zero_coupon_after_overshoot() {
    // (1000/400)^(1/100) - 1 ≈ 0.9205%
    let sol = solve_yield(dec!(400), &bond(dec!(0), dec!(1000), 100), &SolverConfig::default())
        .unwrap();
    assert!(sol.converged);
    assert!(sol.iterations < 100, "took {} iterations", sol.iterations);
    assert!(
        (sol.yield_rate - dec!(0.0092050153)).abs() < dec!(0.000000001),
        "Expected ~0.9205%, got {}",
        sol.yield_rate
    );
}

#[test]
fn test_ytm_envelope_from_json_request() {
    let input: YtmInput = serde_json::from_str(
        r#"{
            "market_price": "950",
            "coupon": "50",
            "face_value": "1000",
            "periods": 10,
            "solver": { "max_iterations": 50, "tolerance": "0.0000001" }
        }"#,
    )
    .unwrap();
    let result = calculate_ytm(&input).unwrap();

    assert_eq!(result.result.ytm_pct, "5.6687%");
    assert_eq!(result.assumptions["max_iterations"], 50);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["result"]["history"][0]["yield_rate"], "0.05");
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #[test]
    fn prop_zero_coupon_price_is_discounted_face(
        face in 1i64..100_000,
        bps in -5_000i64..5_000,
        periods in 1u32..40,
    ) {
        let face = face as f64;
        let y = bps as f64 / 10_000.0;
        let price = bond_price(0.0, face, y, periods).unwrap();
        let expected = face / (1.0 + y).powi(periods as i32);
        prop_assert!((price - expected).abs() <= expected.abs() * 1e-12);
    }

    #[test]
    fn prop_price_strictly_decreasing_in_yield(
        coupon in 0i64..200,
        face in 100i64..10_000,
        periods in 1u32..40,
        bps in -5_000i64..5_000,
        bump in 1i64..500,
    ) {
        let y_low = bps as f64 / 10_000.0;
        let y_high = (bps + bump) as f64 / 10_000.0;
        let low = bond_price(coupon as f64, face as f64, y_low, periods).unwrap();
        let high = bond_price(coupon as f64, face as f64, y_high, periods).unwrap();
        prop_assert!(high < low, "price({}) = {} should be below price({}) = {}", y_high, high, y_low, low);
    }

    #[test]
    fn prop_round_trip_recovers_yield(
        coupon in 0i64..120,
        periods in 1u32..30,
        bps in 100i64..2_000,
    ) {
        let y0 = Decimal::new(bps, 4);
        let terms = bond(Decimal::from(coupon), dec!(1000), periods);
        let price = bond_price(coupon as f64, 1000.0, bps as f64 / 10_000.0, periods).unwrap();
        let price = Decimal::from_f64(price).unwrap();
        let config = SolverConfig::default();

        let sol = solve_yield(price, &terms, &config).unwrap();
        prop_assert!(sol.converged);
        prop_assert!((sol.yield_rate - y0).abs() < config.tolerance);
    }

    #[test]
    fn prop_history_is_bounded_and_seeded(
        price in 300i64..2_000,
        coupon in 0i64..150,
        periods in 1u32..30,
        max_iterations in 1u32..20,
    ) {
        let config = SolverConfig { max_iterations, ..SolverConfig::default() };
        let terms = bond(Decimal::from(coupon), dec!(1000), periods);
        if let Ok(sol) = solve_yield(Decimal::from(price), &terms, &config) {
            prop_assert!(sol.history.len() <= max_iterations as usize + 1);
            prop_assert_eq!(sol.history[0], INITIAL_GUESS);
            prop_assert_eq!(*sol.history.last().unwrap(), sol.yield_rate);
        }
    }
}
