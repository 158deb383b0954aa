use crate::error::YtmError;
use crate::YtmResult;

/// Present value of a fixed-coupon bond under annual compounding:
///
/// `sum_{i=1..n} C * v^i + F * v^n` with `v = 1 / (1+y)`
///
/// The discount factor `v^i` is built by repeated multiplication, so the
/// exponent is always an integer and a negative `1 + y` is still evaluated.
/// Large yields shrink `v^i` toward zero instead of growing `(1+y)^i`.
pub fn bond_price(coupon: f64, face_value: f64, yield_rate: f64, periods: u32) -> YtmResult<f64> {
    let v = discount_base(yield_rate)?;
    let mut discount = 1.0;
    let mut pv = 0.0;

    for _ in 0..periods {
        discount *= v;
        pv += coupon * discount;
    }

    // Principal shares the final period's discount factor
    finite(pv + face_value * discount, "bond price", yield_rate)
}

/// Analytic first derivative of [`bond_price`] with respect to the yield:
///
/// `sum_{i=1..n} -i*C * v^(i+1) - n*F * v^(n+1)`
pub fn bond_price_derivative(
    coupon: f64,
    face_value: f64,
    yield_rate: f64,
    periods: u32,
) -> YtmResult<f64> {
    let v = discount_base(yield_rate)?;
    let mut discount = 1.0;
    let mut slope = 0.0;

    for i in 1..=periods {
        discount *= v;
        slope -= f64::from(i) * coupon * discount * v;
    }

    slope -= f64::from(periods) * face_value * discount * v;
    finite(slope, "price derivative", yield_rate)
}

/// One-period discount factor `1 / (1+y)`.
fn discount_base(yield_rate: f64) -> YtmResult<f64> {
    let one_plus_y = 1.0 + yield_rate;
    if one_plus_y == 0.0 {
        return Err(YtmError::NumericalFault {
            context: format!("discount factor undefined: 1 + yield is zero (yield {yield_rate})"),
        });
    }
    Ok(1.0 / one_plus_y)
}

fn finite(value: f64, what: &str, yield_rate: f64) -> YtmResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(YtmError::NumericalFault {
            context: format!("{what} is not finite at yield {yield_rate}"),
        })
    }
}
