//! Optimization policy for a single caravan search.

use crate::error::ParameterError;
use crate::result::CaravanResult;
use crate::world::{Caravan, CaravanAction, PlayerId, WorldView};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Observer invoked once per evaluated candidate, in visitation order.
///
/// Any caller state (the "user data") is captured by the closure.
pub type CandidateCallback = Arc<dyn Fn(&CaravanResult) + Send + Sync>;

/// How many future turns the valuation looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Horizon {
    Unbounded,
    Turns(u32),
}

impl Horizon {
    /// Turns left after `elapsed`, or `None` when unbounded.
    ///
    /// Saturates at zero once the horizon has passed.
    pub fn remaining(self, elapsed: u32) -> Option<u32> {
        match self {
            Horizon::Unbounded => None,
            Horizon::Turns(n) => Some(n.saturating_sub(elapsed)),
        }
    }
}

/// Which foreign cities a caravan may consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForeignTradePolicy {
    NationalOnly,
    AlliedOnly,
    PeacefulOnly,
    NotAtWar,
}

impl ForeignTradePolicy {
    /// Whether cities of `src` and `dest` may be paired under this policy.
    pub fn allows<W: WorldView + ?Sized>(self, world: &W, src: PlayerId, dest: PlayerId) -> bool {
        if src == dest {
            return true;
        }
        let state = world.diplomatic_state(src, dest);
        match self {
            ForeignTradePolicy::NationalOnly => false,
            ForeignTradePolicy::AlliedOnly => state.allied(),
            ForeignTradePolicy::PeacefulOnly => state.at_peace(),
            ForeignTradePolicy::NotAtWar => !state.at_war(),
        }
    }
}

/// Immutable policy steering one destination search.
#[derive(Clone, Serialize, Deserialize)]
pub struct OptimizationParameter {
    pub horizon: Horizon,
    /// Per-turn discount factor in `(0, 1]`.
    pub discount: f64,
    pub consider_windfall: bool,
    pub consider_trade: bool,
    pub consider_wonders: bool,
    /// Also charge for routes our other cities lose when a destination
    /// drops one of its existing routes.
    pub account_for_broken_routes: bool,
    pub foreign_trade: ForeignTradePolicy,
    /// Score every eligible city as if it were reachable right now.
    pub ignore_transit_time: bool,
    /// Not supported; requesting it is rejected.
    pub convert_trade: bool,
    #[serde(skip)]
    pub callback: Option<CandidateCallback>,
}

impl Default for OptimizationParameter {
    fn default() -> Self {
        Self {
            horizon: Horizon::Unbounded,
            discount: 0.95,
            consider_windfall: true,
            consider_trade: true,
            consider_wonders: true,
            account_for_broken_routes: true,
            foreign_trade: ForeignTradePolicy::NationalOnly,
            ignore_transit_time: false,
            convert_trade: false,
            callback: None,
        }
    }
}

impl OptimizationParameter {
    /// Default policy narrowed to what `caravan` is able to do.
    pub fn for_caravan(caravan: &Caravan) -> Self {
        let mut parameter = Self::default();
        let can_trade = caravan.can_do(CaravanAction::EstablishTradeRoute);

        if !can_trade {
            parameter.consider_trade = false;
        }
        if !can_trade && !caravan.can_do(CaravanAction::EnterMarketplace) {
            parameter.consider_windfall = false;
        }
        if !caravan.can_do(CaravanAction::HelpWonder) {
            parameter.consider_wonders = false;
        }

        parameter
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&CaravanResult) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Check the parameter describes a finite, sensible valuation.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(self.discount > 0.0 && self.discount <= 1.0) {
            return Err(ParameterError::DiscountOutOfRange(self.discount));
        }
        if self.horizon == Horizon::Unbounded && self.discount == 1.0 {
            return Err(ParameterError::DivergentPerpetuity);
        }
        Ok(())
    }

    pub fn log_verbose(&self) {
        log::debug!("parameter {{");
        match self.horizon {
            Horizon::Unbounded => log::debug!("  horizon   = unbounded"),
            Horizon::Turns(n) => log::debug!("  horizon   = {}", n),
        }
        log::debug!("  discount  = {}", self.discount);
        log::debug!(
            "  objective = {}{}{}",
            if self.consider_windfall { "windfall, " } else { "" },
            if self.consider_trade { "trade, " } else { "" },
            if self.consider_wonders { "wonders" } else { "" }
        );
        log::debug!(
            "  broken routes accounted = {}",
            self.account_for_broken_routes
        );
        log::debug!("  foreign trade = {:?}", self.foreign_trade);
        log::debug!("  ignore transit = {}", self.ignore_transit_time);
        log::debug!("  convert trade = {}", self.convert_trade);
        log::debug!("  callback = {}", self.callback.is_some());
        log::debug!("}}");
    }
}

impl fmt::Debug for OptimizationParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimizationParameter")
            .field("horizon", &self.horizon)
            .field("discount", &self.discount)
            .field("consider_windfall", &self.consider_windfall)
            .field("consider_trade", &self.consider_trade)
            .field("consider_wonders", &self.consider_wonders)
            .field("account_for_broken_routes", &self.account_for_broken_routes)
            .field("foreign_trade", &self.foreign_trade)
            .field("ignore_transit_time", &self.ignore_transit_time)
            .field("convert_trade", &self.convert_trade)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
