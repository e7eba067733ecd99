//! # Caravan Core
//!
//! Trade-route optimizer for caravan units: given a caravan, find the
//! destination city that is worth the most once travel time is discounted.
//!
//! The optimizer is a pure function of a read-only world snapshot. It never
//! mutates cities, players, or the map.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌──────────────┐     ┌────────────┐
//! │  Parameter   │────▶│ CandidateSearch│────▶│  evaluate_   │────▶│ BestResult │
//! │  (policy)    │     │ (all / transit)│     │  destination │     │ (selector) │
//! └──────────────┘     └────────────────┘     └──────┬───────┘     └────────────┘
//!                                                    │
//!                                             ┌──────▼───────┐
//!                                             │   callback   │
//!                                             │  (side fx)   │
//!                                             └──────────────┘
//! ```
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`OptimizationParameter`] | Discounting, horizon, channels, foreign-trade policy |
//! | [`find_best_destination`] | Sole search entry point |
//! | [`CaravanResult`] | Scored destination (or the not-viable sentinel) |
//! | [`compare_results`] | Total order used to pick and rank results |
//! | [`WorldView`] / [`PathSearch`] | Injected collaborators |
//! | [`CaravanAdvisor`] | Binds collaborators; batch advice with rayon |
//!
//! ## Valuation
//!
//! A destination can pay off by windfall (one-time entry bonus), recurring
//! trade (a new route, net of routes it displaces), or wonder aid (rush-buy
//! gold saved). All are discounted to the present at the arrival turn; see
//! [`evaluate`] for the details.

pub mod advisor;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod finance;
pub mod parameter;
pub mod result;
pub mod search;
pub mod testing;
pub mod world;

pub use advisor::CaravanAdvisor;
pub use config::AdvisorConfig;
pub use error::{CaravanError, ParameterError};
pub use evaluate::evaluate_destination;
pub use parameter::{CandidateCallback, ForeignTradePolicy, Horizon, OptimizationParameter};
pub use result::{compare_results, rank_results, BestResult, CaravanResult};
pub use search::{
    find_best_destination, find_best_destination_from, AllCities, CandidateSearch, TransitSearch,
};
pub use world::{
    ActionProbability, Caravan, CaravanAction, City, CityId, DiplomaticState, PathPosition,
    PathSearch, PlayerId, Production, TileId, TradeRoute, VisibilityMode, WorldView,
};
