use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::YtmError;
use crate::pricer::{bond_price, bond_price_derivative};
use crate::types::{BondParameters, Money, Rate};
use crate::YtmResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Seed for every solve, independent of the inputs.
pub const INITIAL_GUESS: Rate = dec!(0.05);

/// Default Newton-Raphson iteration budget.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Default absolute price tolerance (1e-6).
pub const DEFAULT_TOLERANCE: Decimal = dec!(0.000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Iteration budget and convergence tolerance for [`solve_yield`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Maximum number of Newton steps.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Convergence is declared when |price(y) - target| < tolerance.
    #[serde(default = "default_tolerance")]
    pub tolerance: Decimal,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

fn default_tolerance() -> Decimal {
    DEFAULT_TOLERANCE
}

/// Result of a yield solve.
///
/// `history[0]` is always [`INITIAL_GUESS`] and the last entry is
/// `yield_rate`. A solve that exhausts its budget still returns its last
/// estimate; `converged` tells the two outcomes apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldSolution {
    pub yield_rate: Rate,
    pub history: Vec<Rate>,
    /// Newton steps taken (`history.len() - 1`).
    pub iterations: u32,
    pub converged: bool,
}

impl YieldSolution {
    /// Treat an exhausted iteration budget as an error.
    pub fn require_converged(self) -> YtmResult<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(YtmError::ConvergenceFailure {
                iterations: self.iterations,
                last_estimate: self.yield_rate,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// Solve for the per-period yield that prices the bond at `target_price`
/// using Newton-Raphson on `f(y) = price(y) - target_price`.
///
/// Iteration runs in f64 like the pricer; inputs are converted on entry and
/// every estimate is recorded as a [`Rate`]. The estimate is never clamped
/// between steps, so a poorly conditioned bond can diverge or oscillate. A
/// zero derivative, `1 + y == 0`, or a non-finite price or step is reported
/// as [`YtmError::NumericalFault`].
pub fn solve_yield(
    target_price: Money,
    bond: &BondParameters,
    config: &SolverConfig,
) -> YtmResult<YieldSolution> {
    let target = to_f64(target_price, "market price")?;
    let coupon = to_f64(bond.coupon, "coupon")?;
    let face_value = to_f64(bond.face_value, "face value")?;
    let tolerance = to_f64(config.tolerance, "tolerance")?;

    let mut y = to_f64(INITIAL_GUESS, "initial guess")?;
    let mut history = vec![INITIAL_GUESS];
    let mut converged = false;

    for _ in 0..config.max_iterations {
        let diff = bond_price(coupon, face_value, y, bond.periods)? - target;
        if !diff.is_finite() {
            return Err(YtmError::NumericalFault {
                context: format!("Newton step: price residual is not finite at yield {y}"),
            });
        }
        if diff.abs() < tolerance {
            converged = true;
            break;
        }

        let slope = bond_price_derivative(coupon, face_value, y, bond.periods)?;
        if slope == 0.0 {
            return Err(YtmError::NumericalFault {
                context: format!("Newton step: price derivative is zero at yield {y}"),
            });
        }

        let next = y - diff / slope;
        if !next.is_finite() {
            return Err(YtmError::NumericalFault {
                context: format!("Newton step overflow at yield {y}"),
            });
        }
        y = next;
        history.push(to_rate(y)?);
    }

    let yield_rate = history.last().copied().unwrap_or(INITIAL_GUESS);
    Ok(YieldSolution {
        yield_rate,
        iterations: (history.len() - 1) as u32,
        history,
        converged,
    })
}

fn to_f64(value: Decimal, what: &str) -> YtmResult<f64> {
    value.to_f64().ok_or_else(|| YtmError::NumericalFault {
        context: format!("{what} {value} has no f64 representation"),
    })
}

fn to_rate(y: f64) -> YtmResult<Rate> {
    Decimal::from_f64(y).ok_or_else(|| YtmError::NumericalFault {
        context: format!("yield estimate {y} is outside the decimal range"),
    })
}
