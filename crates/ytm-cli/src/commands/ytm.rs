use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use ytm_core::analysis;
use ytm_core::solver::SolverConfig;
use ytm_core::validation::{PriceInput, YtmInput};
use ytm_core::YtmError;

use crate::input;

/// Arguments for the yield-to-maturity solve.
///
/// Bond terms default to a 10-period, 5% coupon bond trading at 950.
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SolveArgs {
    /// Observed market price of the bond
    #[arg(long, default_value = "950")]
    pub price: Decimal,

    /// Coupon paid each period (absolute amount)
    #[arg(long, default_value = "50")]
    pub coupon: Decimal,

    /// Face value repaid at maturity
    #[arg(long, default_value = "1000")]
    pub face_value: Decimal,

    /// Number of annual periods to maturity
    #[arg(long, default_value = "10")]
    pub periods: Decimal,

    /// Newton-Raphson iteration budget
    #[arg(long, default_value_t = ytm_core::solver::DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: u32,

    /// Absolute price tolerance for convergence
    #[arg(long, default_value = "0.000001")]
    pub tolerance: Decimal,

    /// Fail instead of reporting the last estimate when the budget runs out
    #[arg(long)]
    pub strict: bool,

    /// Path to a JSON or YAML request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for pricing a bond at a given yield.
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PriceArgs {
    /// Coupon paid each period (absolute amount)
    #[arg(long)]
    pub coupon: Option<Decimal>,

    /// Face value repaid at maturity
    #[arg(long)]
    pub face_value: Option<Decimal>,

    /// Per-period yield as a decimal (e.g. 0.05 for 5%)
    #[arg(long, alias = "yield")]
    pub yield_rate: Option<Decimal>,

    /// Number of annual periods to maturity
    #[arg(long)]
    pub periods: Option<Decimal>,

    /// Path to a JSON or YAML request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_solve(args: SolveArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let strict = args.strict;
    let ytm_input: YtmInput = if let Some(ref path) = args.input {
        input::file::read_request(path)?
    } else if let Some(request) = input::stdin::read_request()? {
        request
    } else {
        YtmInput {
            market_price: args.price,
            coupon: args.coupon,
            face_value: args.face_value,
            periods: args.periods,
            solver: SolverConfig {
                max_iterations: args.max_iterations,
                tolerance: args.tolerance,
            },
        }
    };

    tracing::info!(
        price = %ytm_input.market_price,
        coupon = %ytm_input.coupon,
        face_value = %ytm_input.face_value,
        periods = %ytm_input.periods,
        "solving yield to maturity"
    );

    let result = analysis::calculate_ytm(&ytm_input)?;
    let out = &result.result;
    tracing::debug!(
        ytm = %out.ytm,
        iterations = out.iterations,
        converged = out.converged,
        "solver finished"
    );

    if !out.converged {
        tracing::warn!(
            iterations = out.iterations,
            last_estimate = %out.ytm,
            "iteration budget exhausted before reaching tolerance"
        );
        if strict {
            return Err(YtmError::ConvergenceFailure {
                iterations: out.iterations,
                last_estimate: out.ytm,
            }
            .into());
        }
    }

    Ok(serde_json::to_value(result)?)
}

pub fn run_price(args: PriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let price_input: PriceInput = if let Some(ref path) = args.input {
        input::file::read_request(path)?
    } else if let Some(request) = input::stdin::read_request()? {
        request
    } else {
        PriceInput {
            coupon: args
                .coupon
                .ok_or("--coupon is required (or provide --input)")?,
            face_value: args
                .face_value
                .ok_or("--face-value is required (or provide --input)")?,
            yield_rate: args
                .yield_rate
                .ok_or("--yield-rate is required (or provide --input)")?,
            periods: args
                .periods
                .ok_or("--periods is required (or provide --input)")?,
        }
    };

    tracing::info!(yield_rate = %price_input.yield_rate, "pricing bond");
    let result = analysis::calculate_price(&price_input)?;
    Ok(serde_json::to_value(result)?)
}
