//! Candidate enumeration and best-destination selection.
//!
//! Two interchangeable strategies feed the same evaluate-and-select loop:
//!
//! - [`AllCities`]: every city of every eligible player, as if reachable now.
//! - [`TransitSearch`]: cities met along an ordered reachability search, cut
//!   off once the arrival turn passes the horizon.
//!
//! `OptimizationParameter::ignore_transit_time` picks between them.

use crate::error::CaravanError;
use crate::evaluate::evaluate_destination;
use crate::parameter::{Horizon, OptimizationParameter};
use crate::result::{BestResult, CaravanResult};
use crate::world::{Caravan, City, CityId, PathSearch, VisibilityMode, WorldView};
use tracing::instrument;

/// Visitor receiving each candidate city and its arrival turn.
pub type CandidateVisitor<'v, 'w> = dyn FnMut(&'w City, u32) -> Result<(), CaravanError> + 'v;

/// A way of producing candidate destinations for a caravan from `src`.
pub trait CandidateSearch<W: WorldView + ?Sized> {
    fn visit_candidates<'w>(
        &self,
        world: &'w W,
        caravan: &Caravan,
        param: &OptimizationParameter,
        src: &'w City,
        visit: &mut CandidateVisitor<'_, 'w>,
    ) -> Result<(), CaravanError>;
}

/// Every city of every player the foreign-trade policy admits, at arrival 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllCities;

impl<W: WorldView + ?Sized> CandidateSearch<W> for AllCities {
    fn visit_candidates<'w>(
        &self,
        world: &'w W,
        _caravan: &Caravan,
        param: &OptimizationParameter,
        src: &'w City,
        visit: &mut CandidateVisitor<'_, 'w>,
    ) -> Result<(), CaravanError> {
        for owner in world.players() {
            if !param.foreign_trade.allows(world, src.owner, owner) {
                continue;
            }
            for dest in world.cities_of(owner) {
                visit(dest, 0)?;
            }
        }
        Ok(())
    }
}

/// Cities reachable by the caravan, nearest first, within the horizon.
pub struct TransitSearch<'m, M: ?Sized> {
    pub map: &'m M,
    /// Turns already spent before the search starts.
    pub turns_before: u32,
    pub moves_left: u32,
    pub visibility: VisibilityMode,
}

impl<W, M> CandidateSearch<W> for TransitSearch<'_, M>
where
    W: WorldView + ?Sized,
    M: PathSearch + ?Sized,
{
    fn visit_candidates<'w>(
        &self,
        world: &'w W,
        caravan: &Caravan,
        param: &OptimizationParameter,
        src: &'w City,
        visit: &mut CandidateVisitor<'_, 'w>,
    ) -> Result<(), CaravanError> {
        let end_time = match param.horizon {
            Horizon::Unbounded => None,
            Horizon::Turns(n) => match n.checked_sub(self.turns_before) {
                Some(end) => Some(end),
                None => return Ok(()),
            },
        };

        let start = if caravan.home_city == Some(src.id) {
            caravan.tile
        } else {
            src.tile
        };

        // Positions come nearest first, so the first one past the horizon
        // ends the search. Finding a city never does: a farther one may be
        // worth more.
        for pos in self
            .map
            .search(caravan, start, self.moves_left, self.visibility)
        {
            if end_time.is_some_and(|end| pos.turn > end) {
                log::trace!("search cut off at turn {}", pos.turn);
                break;
            }
            if let Some(dest) = world.city_at(pos.tile) {
                visit(dest, self.turns_before + pos.turn)?;
            }
        }
        Ok(())
    }
}

/// Evaluate everything `search` yields and keep the best.
pub fn select_best<W, S>(
    world: &W,
    caravan: &Caravan,
    param: &OptimizationParameter,
    src: &City,
    search: &S,
) -> Result<CaravanResult, CaravanError>
where
    W: WorldView + ?Sized,
    S: CandidateSearch<W> + ?Sized,
{
    let mut best = BestResult::new(src.id);
    let mut evaluated = 0usize;

    search.visit_candidates(world, caravan, param, src, &mut |dest, arrival_time| {
        let candidate = evaluate_destination(world, caravan, param, src, dest, arrival_time)?;
        evaluated += 1;
        best.offer(candidate);
        Ok(())
    })?;

    let best = best.into_inner();
    log::debug!(
        "caravan from {}: {} candidates, best {:?} worth {:.2}",
        src.id,
        evaluated,
        best.dest,
        best.value
    );
    Ok(best)
}

fn check_parameter(param: &OptimizationParameter) -> Result<(), CaravanError> {
    param.validate()?;
    if param.convert_trade {
        return Err(CaravanError::TradeConversionUnsupported);
    }
    Ok(())
}

/// Find the most valuable destination for `caravan`, starting from its home city.
///
/// Returns the not-viable sentinel when nothing is worth visiting. The
/// parameter's callback, if any, sees every candidate in visitation order.
#[instrument(skip_all, name = "caravan_search")]
pub fn find_best_destination<W, M>(
    world: &W,
    map: &M,
    caravan: &Caravan,
    param: &OptimizationParameter,
    visibility: VisibilityMode,
) -> Result<CaravanResult, CaravanError>
where
    W: WorldView + ?Sized,
    M: PathSearch + ?Sized,
{
    check_parameter(param)?;
    let src = caravan
        .home_city
        .and_then(|id| world.city(id))
        .ok_or(CaravanError::MissingHomeCity)?;

    if param.ignore_transit_time {
        select_best(world, caravan, param, src, &AllCities)
    } else {
        let search = TransitSearch {
            map,
            turns_before: 0,
            moves_left: caravan.moves_left,
            visibility,
        };
        select_best(world, caravan, param, src, &search)
    }
}

/// Transit-aware search treating `src` as the route's origin, with
/// `turns_before` turns already elapsed.
///
/// Used to plan a leg that starts at a city further along the caravan's
/// route. Arrival times include `turns_before`.
#[allow(clippy::too_many_arguments)]
#[instrument(skip_all, name = "caravan_search_from", fields(src = src))]
pub fn find_best_destination_from<W, M>(
    world: &W,
    map: &M,
    caravan: &Caravan,
    param: &OptimizationParameter,
    src: CityId,
    turns_before: u32,
    moves_left: u32,
    visibility: VisibilityMode,
) -> Result<CaravanResult, CaravanError>
where
    W: WorldView + ?Sized,
    M: PathSearch + ?Sized,
{
    check_parameter(param)?;
    let src = world.city(src).ok_or(CaravanError::UnknownCity(src))?;
    let search = TransitSearch {
        map,
        turns_before,
        moves_left,
        visibility,
    };
    select_best(world, caravan, param, src, &search)
}
