use crate::world::CityId;
use thiserror::Error;

/// Reasons an [`OptimizationParameter`](crate::OptimizationParameter) is rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Discount rate must be in (0, 1], got {0}")]
    DiscountOutOfRange(f64),
    #[error("Unbounded horizon with a discount rate of 1 has no finite value")]
    DivergentPerpetuity,
}

/// Contract violations raised by the optimizer.
///
/// A destination that simply is not worth anything is not an error; it comes
/// back as the not-viable [`CaravanResult`](crate::CaravanResult).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaravanError {
    #[error("Caravan has no resolvable home city")]
    MissingHomeCity,
    #[error("Unknown source city {0}")]
    UnknownCity(CityId),
    #[error("Converting trade to uniform units is not supported")]
    TradeConversionUnsupported,
    #[error("Rush cost rose after adding caravan shields: {without} without, {with} with")]
    NegativeRushDelta { without: i32, with: i32 },
    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] ParameterError),
}
