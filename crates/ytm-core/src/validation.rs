use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::YtmError;
use crate::solver::SolverConfig;
use crate::types::{BondParameters, Money, Rate};
use crate::YtmResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Raw request for a yield-to-maturity solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YtmInput {
    /// Observed market price the solved yield must reproduce.
    pub market_price: Money,
    /// Coupon paid each period (absolute amount).
    pub coupon: Money,
    /// Face (par) value repaid at maturity.
    pub face_value: Money,
    /// Number of annual periods. Must be a positive whole number.
    pub periods: Decimal,
    /// Iteration budget and tolerance.
    #[serde(default)]
    pub solver: SolverConfig,
}

/// Raw request for pricing a bond at a given yield.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceInput {
    pub coupon: Money,
    pub face_value: Money,
    /// Per-period yield as a decimal (0.05 = 5%).
    pub yield_rate: Rate,
    pub periods: Decimal,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl YtmInput {
    /// Check the request and split it into the target price and bond terms.
    pub fn validate(&self) -> YtmResult<(Money, BondParameters)> {
        if self.market_price <= Decimal::ZERO {
            return Err(invalid("market_price", "Market price must be positive"));
        }
        let bond = validate_bond(self.coupon, self.face_value, self.periods)?;

        if self.solver.max_iterations == 0 {
            return Err(invalid(
                "solver.max_iterations",
                "Iteration budget must be at least 1",
            ));
        }
        if self.solver.tolerance <= Decimal::ZERO {
            return Err(invalid("solver.tolerance", "Tolerance must be positive"));
        }

        Ok((self.market_price, bond))
    }
}

impl PriceInput {
    pub fn validate(&self) -> YtmResult<BondParameters> {
        if self.yield_rate <= Decimal::NEGATIVE_ONE {
            return Err(invalid("yield_rate", "Yield must be greater than -100%"));
        }
        validate_bond(self.coupon, self.face_value, self.periods)
    }
}

fn validate_bond(coupon: Money, face_value: Money, periods: Decimal) -> YtmResult<BondParameters> {
    if coupon < Decimal::ZERO {
        return Err(invalid("coupon", "Coupon cannot be negative"));
    }
    if face_value <= Decimal::ZERO {
        return Err(invalid("face_value", "Face value must be positive"));
    }
    if periods <= Decimal::ZERO {
        return Err(invalid("periods", "Number of periods must be positive"));
    }
    if !periods.fract().is_zero() {
        return Err(invalid("periods", "Number of periods must be a whole number"));
    }
    let periods = periods
        .to_u32()
        .ok_or_else(|| invalid("periods", "Number of periods is too large"))?;

    Ok(BondParameters {
        coupon,
        face_value,
        periods,
    })
}

fn invalid(field: &str, reason: &str) -> YtmError {
    YtmError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}
