use napi::Result as NapiResult;
use napi_derive::napi;

use ytm_core::analysis;
use ytm_core::validation::{PriceInput, YtmInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Solve for yield to maturity. Takes a JSON `YtmInput`, returns the JSON
/// computation envelope including the convergence history.
#[napi]
pub fn solve_ytm(input_json: String) -> NapiResult<String> {
    let input: YtmInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = analysis::calculate_ytm(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn bond_price(input_json: String) -> NapiResult<String> {
    let input: PriceInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = analysis::calculate_price(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
