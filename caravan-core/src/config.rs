use crate::parameter::OptimizationParameter;
use crate::world::{Caravan, VisibilityMode};
use serde::{Deserialize, Serialize};

/// Advisor configuration: the base routing policy and how much of the map
/// searches may see.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default)]
    pub parameter: OptimizationParameter,
    #[serde(default)]
    pub visibility: VisibilityMode,
}

impl AdvisorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The configured policy with channels the caravan cannot use switched off.
    pub fn parameter_for(&self, caravan: &Caravan) -> OptimizationParameter {
        let capable = OptimizationParameter::for_caravan(caravan);
        OptimizationParameter {
            consider_trade: self.parameter.consider_trade && capable.consider_trade,
            consider_windfall: self.parameter.consider_windfall && capable.consider_windfall,
            consider_wonders: self.parameter.consider_wonders && capable.consider_wonders,
            ..self.parameter.clone()
        }
    }
}
