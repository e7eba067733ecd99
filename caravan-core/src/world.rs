//! Read-only view of the game world consumed by the optimizer.
//!
//! The optimizer never owns or mutates cities, players, or the map. Everything
//! it needs is reached through two injected collaborators:
//!
//! - [`WorldView`]: city/player lookups, trade-route accounting, action
//!   feasibility probes, and the rush-buy cost model.
//! - [`PathSearch`]: an ordered stream of reachable tiles for the caravan.
//!
//! Both are plain traits so tests can supply deterministic doubles (see
//! [`crate::testing`]).

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

pub type PlayerId = u16;
pub type CityId = u32;
pub type TileId = u32;
pub type ContinentId = i16;
pub type ImprovementId = u16;
pub type UnitTypeId = u16;

/// What a city is currently building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Production {
    Improvement(ImprovementId),
    Unit(UnitTypeId),
}

/// One end of an established trade route, as seen from the owning city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRoute {
    pub partner: CityId,
    /// Per-turn trade this route yields to the city holding it.
    pub value: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub owner: PlayerId,
    pub tile: TileId,
    pub continent: ContinentId,
    pub shield_stock: i32,
    /// Shield surplus per turn.
    pub shield_surplus: i32,
    pub production: Production,
    pub trade_routes: Vec<TradeRoute>,
    pub max_trade_routes: usize,
}

impl City {
    pub fn num_trade_routes(&self) -> usize {
        self.trade_routes.len()
    }

    pub fn has_free_trade_slot(&self) -> bool {
        self.num_trade_routes() < self.max_trade_routes
    }
}

/// Diplomatic relation between two distinct players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiplomaticState {
    War,
    Ceasefire,
    NoContact,
    Peace,
    Alliance,
}

impl DiplomaticState {
    pub fn allied(self) -> bool {
        matches!(self, Self::Alliance)
    }

    pub fn at_peace(self) -> bool {
        matches!(self, Self::Peace | Self::Alliance)
    }

    pub fn at_war(self) -> bool {
        matches!(self, Self::War)
    }
}

/// Actions a caravan can perform on arrival at a city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaravanAction {
    /// Establish a permanent trade route (also pays the entry bonus).
    EstablishTradeRoute,
    /// Sell goods for the one-time entry bonus only.
    EnterMarketplace,
    /// Disband into shields for the wonder the city is building.
    HelpWonder,
}

/// Odds that an action succeeds, as a percent range.
///
/// Probes are speculative: the caravan is imagined standing next to the
/// target, so `max > 0` only means the action is not ruled out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionProbability {
    pub min: u8,
    pub max: u8,
}

impl ActionProbability {
    pub const IMPOSSIBLE: Self = Self { min: 0, max: 0 };
    pub const CERTAIN: Self = Self { min: 100, max: 100 };

    pub fn is_possible(&self) -> bool {
        self.max > 0
    }
}

/// The trade unit being routed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caravan {
    pub owner: PlayerId,
    pub home_city: Option<CityId>,
    pub tile: TileId,
    pub moves_left: u32,
    pub move_rate: u32,
    /// Shields the unit adds to a wonder when it helps build it.
    pub shield_value: i32,
    /// Actions the unit type is able to perform at all.
    pub actions: FxHashSet<CaravanAction>,
}

impl Caravan {
    pub fn can_do(&self, action: CaravanAction) -> bool {
        self.actions.contains(&action)
    }
}

/// Routes a city would drop to make room for a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovableTrade {
    /// Combined per-turn trade of the dropped routes.
    pub value: i32,
    pub routes: Vec<TradeRoute>,
}

/// Query surface over cities, players, and the rules that govern them.
pub trait WorldView {
    fn city(&self, id: CityId) -> Option<&City>;

    fn city_at(&self, tile: TileId) -> Option<&City>;

    /// All players, in a stable order.
    fn players(&self) -> Vec<PlayerId>;

    /// Cities owned by `player`, in a stable order.
    fn cities_of(&self, player: PlayerId) -> Vec<&City>;

    /// Relation between two distinct players. Never called with `a == b`.
    fn diplomatic_state(&self, a: PlayerId, b: PlayerId) -> DiplomaticState;

    /// Whether the two cities may interact commercially at all.
    fn can_cities_trade(&self, a: &City, b: &City) -> bool;

    /// Whether a permanent route between the two cities is allowed.
    fn can_establish_trade_route(&self, a: &City, b: &City) -> bool;

    /// Per-turn trade a new route between the two cities would yield.
    fn trade_base_between(&self, a: &City, b: &City) -> i32;

    /// One-time bonus for a caravan from `src` entering `dest`.
    fn enter_city_trade_bonus(&self, src: &City, dest: &City, establishing_route: bool) -> i32;

    /// Lowest-value routes `city` would give up for a new route.
    fn removable_trade(&self, city: &City) -> RemovableTrade;

    /// Speculative odds of `caravan`, built in `src`, performing `action` on `dest`.
    fn speculate_action(
        &self,
        caravan: &Caravan,
        action: CaravanAction,
        src: &City,
        dest: &City,
    ) -> ActionProbability;

    fn is_wonder(&self, improvement: ImprovementId) -> bool;

    /// Whether caravan shields can be put toward `production`.
    fn accepts_help_wonder(&self, production: Production) -> bool;

    /// Gold needed to finish `improvement` in `city` with `shields` already stocked.
    fn improvement_buy_gold_cost(&self, city: &City, improvement: ImprovementId, shields: i32)
        -> i32;
}

/// Map knowledge used by the transit-aware search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VisibilityMode {
    /// Only tiles the caravan owner knows about
    #[default]
    Realistic,
    /// The whole map, regardless of fog of war
    Omniscient,
}

/// A tile the caravan can reach, with when and how it gets there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathPosition {
    pub tile: TileId,
    pub turn: u32,
    pub moves_left: u32,
}

/// Ordered reachability search for a caravan.
///
/// Implementations must yield positions in non-decreasing `turn` order and
/// must not share mutable scratch state between calls.
pub trait PathSearch {
    fn search<'a>(
        &'a self,
        caravan: &Caravan,
        start: TileId,
        moves_left: u32,
        visibility: VisibilityMode,
    ) -> Box<dyn Iterator<Item = PathPosition> + 'a>;
}
