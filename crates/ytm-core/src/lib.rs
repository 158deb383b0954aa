pub mod analysis;
pub mod error;
pub mod pricer;
pub mod solver;
pub mod types;
pub mod validation;

pub use error::YtmError;

pub type YtmResult<T> = Result<T, YtmError>;
