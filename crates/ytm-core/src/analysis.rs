use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::pricer::bond_price;
use crate::solver::{solve_yield, INITIAL_GUESS};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::validation::{PriceInput, YtmInput};
use crate::{YtmError, YtmResult};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One solver step, indexed from 0 (the seed guess).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergencePoint {
    pub iteration: u32,
    pub yield_rate: Rate,
}

/// Output of a yield-to-maturity solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YtmOutput {
    /// Per-period yield to maturity.
    pub ytm: Rate,
    /// `ytm` as a percentage with four decimals, e.g. "5.6687%".
    pub ytm_pct: String,
    /// Coupon / market price.
    pub current_yield: Rate,
    /// Whether the bond trades at premium, discount, or par.
    pub discount_or_premium: String,
    /// False when the iteration budget ran out before the tolerance was met.
    pub converged: bool,
    pub iterations: u32,
    /// Every estimate from the seed to the final yield.
    pub history: Vec<ConvergencePoint>,
}

/// Output of pricing a bond at a given yield.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceOutput {
    pub price: Money,
    pub discount_or_premium: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Solve for yield to maturity and package the convergence history.
pub fn calculate_ytm(input: &YtmInput) -> YtmResult<ComputationOutput<YtmOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (market_price, bond) = input.validate()?;
    let solution = solve_yield(market_price, &bond, &input.solver)?;

    if !solution.converged {
        warnings.push(format!(
            "Newton-Raphson did not reach tolerance {} within {} iterations; \
             reporting the last estimate",
            input.solver.tolerance, input.solver.max_iterations
        ));
    }

    let history = solution
        .history
        .iter()
        .enumerate()
        .map(|(i, y)| ConvergencePoint {
            iteration: i as u32,
            yield_rate: *y,
        })
        .collect();

    let output = YtmOutput {
        ytm: solution.yield_rate,
        ytm_pct: format_percent(solution.yield_rate)?,
        current_yield: bond
            .coupon
            .checked_div(market_price)
            .ok_or_else(|| YtmError::NumericalFault {
                context: "current yield overflow".to_string(),
            })?,
        discount_or_premium: classify(market_price, bond.face_value),
        converged: solution.converged,
        iterations: solution.iterations,
        history,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "ytm_method": "Newton-Raphson",
        "initial_guess": INITIAL_GUESS.to_string(),
        "max_iterations": input.solver.max_iterations,
        "tolerance": input.solver.tolerance.to_string(),
        "compounding": "annual",
    });

    Ok(with_metadata(
        "Yield to Maturity (Newton-Raphson on bond price)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Price a bond at a given per-period yield.
pub fn calculate_price(input: &PriceInput) -> YtmResult<ComputationOutput<PriceOutput>> {
    let start = Instant::now();

    let bond = input.validate()?;
    let price = bond_price(
        as_f64(bond.coupon)?,
        as_f64(bond.face_value)?,
        as_f64(input.yield_rate)?,
        bond.periods,
    )?;
    let price = Decimal::from_f64(price)
        .ok_or_else(|| YtmError::NumericalFault {
            context: format!("bond price {price} is outside the decimal range"),
        })?
        .normalize();

    let output = PriceOutput {
        price,
        discount_or_premium: classify(price, bond.face_value),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "compounding": "annual",
        "coupon_timing": "end of period",
    });

    Ok(with_metadata(
        "Bond Present Value (discounted cash flows)",
        &assumptions,
        Vec::new(),
        elapsed,
        output,
    ))
}

/// Format a decimal rate as a percentage rounded half away from zero to
/// four decimal places, e.g. 0.056687899 -> "5.6688%".
pub fn format_percent(rate: Rate) -> YtmResult<String> {
    let pct = rate
        .checked_mul(dec!(100))
        .ok_or_else(|| YtmError::NumericalFault {
            context: format!("percentage of {rate} overflows"),
        })?;
    Ok(format!(
        "{:.4}%",
        pct.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
    ))
}

fn as_f64(value: Decimal) -> YtmResult<f64> {
    value.to_f64().ok_or_else(|| YtmError::NumericalFault {
        context: format!("{value} has no f64 representation"),
    })
}

fn classify(price: Money, face_value: Money) -> String {
    if price > face_value {
        "premium".to_string()
    } else if price < face_value {
        "discount".to_string()
    } else {
        "par".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolverConfig;

    fn sample_input() -> YtmInput {
        YtmInput {
            market_price: dec!(950),
            coupon: dec!(50),
            face_value: dec!(1000),
            periods: dec!(10),
            solver: SolverConfig::default(),
        }
    }

    #[test]
    fn test_discount_bond_output() {
        let result = calculate_ytm(&sample_input()).unwrap();
        let out = &result.result;

        assert!((out.ytm - dec!(0.0567)).abs() < dec!(0.0001));
        assert_eq!(out.ytm_pct, "5.6687%");
        assert_eq!(out.discount_or_premium, "discount");
        assert!(out.converged);
        assert!(result.warnings.is_empty());
        assert_eq!(out.history.len() as u32, out.iterations + 1);
        assert_eq!(out.history[0].iteration, 0);
        assert_eq!(out.history[0].yield_rate, dec!(0.05));
    }

    #[test]
    fn test_current_yield() {
        let result = calculate_ytm(&sample_input()).unwrap();
        // 50 / 950
        assert_eq!(result.result.current_yield, dec!(50) / dec!(950));
    }

    #[test]
    fn test_par_bond_percent() {
        let mut input = sample_input();
        input.market_price = dec!(1000);
        let result = calculate_ytm(&input).unwrap();
        assert_eq!(result.result.ytm_pct, "5.0000%");
        assert_eq!(result.result.discount_or_premium, "par");
    }

    #[test]
    fn test_non_convergence_adds_warning() {
        let mut input = sample_input();
        input.solver.max_iterations = 1;
        let result = calculate_ytm(&input).unwrap();
        assert!(!result.result.converged);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("did not reach tolerance"));
    }

    #[test]
    fn test_invalid_input_is_reported_before_solving() {
        let mut input = sample_input();
        input.periods = dec!(2.5);
        let err = calculate_ytm(&input).unwrap_err();
        assert!(matches!(err, YtmError::InvalidInput { ref field, .. } if field == "periods"));
    }

    #[test]
    fn test_price_output_premium() {
        let input = PriceInput {
            coupon: dec!(50),
            face_value: dec!(1000),
            yield_rate: dec!(0.04),
            periods: dec!(10),
        };
        let result = calculate_price(&input).unwrap();
        assert!(result.result.price > dec!(1000));
        assert_eq!(result.result.discount_or_premium, "premium");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(0.107566343)).unwrap(), "10.7566%");
        assert_eq!(format_percent(dec!(-0.02)).unwrap(), "-2.0000%");
    }

    #[test]
    fn test_format_percent_rounds_half_away_from_zero() {
        assert_eq!(format_percent(dec!(0.056687899)).unwrap(), "5.6688%");
        assert_eq!(format_percent(dec!(0.99999999)).unwrap(), "100.0000%");
    }

    #[test]
    fn test_format_percent_overflow_is_numerical_fault() {
        let err = format_percent(Decimal::MAX).unwrap_err();
        assert!(matches!(err, YtmError::NumericalFault { .. }));
    }

    #[test]
    fn test_long_bond_at_high_yield_reports_percent() {
        let input = YtmInput {
            market_price: dec!(200),
            coupon: dec!(50),
            face_value: dec!(1000),
            periods: dec!(360),
            solver: SolverConfig::default(),
        };
        let result = calculate_ytm(&input).unwrap();
        assert!(result.result.converged);
        assert_eq!(result.result.ytm_pct, "25.0000%");
    }

    #[test]
    fn test_price_at_zero_yield_is_exact() {
        let input = PriceInput {
            coupon: dec!(50),
            face_value: dec!(1000),
            yield_rate: Decimal::ZERO,
            periods: dec!(10),
        };
        let result = calculate_price(&input).unwrap();
        assert_eq!(result.result.price, dec!(1500));
        assert_eq!(result.result.price.to_string(), "1500");
    }

    #[test]
    fn test_envelope_metadata() {
        let result = calculate_ytm(&sample_input()).unwrap();
        assert_eq!(
            result.metadata.precision,
            "f64 solve, rust_decimal_128bit envelope"
        );
        assert_eq!(result.assumptions["ytm_method"], "Newton-Raphson");
    }
}
