//! Reward evaluation for a single candidate destination.
//!
//! A caravan arriving at a city can pay off through three channels:
//!
//! | Channel  | Kind      | Source                                        |
//! |----------|-----------|-----------------------------------------------|
//! | Windfall | one-time  | entry bonus, counted twice (gold and science) |
//! | Trade    | per turn  | new route trade minus routes it displaces     |
//! | Wonder   | one-time  | rush-buy gold saved by the caravan's shields  |
//!
//! Every channel is discounted to the present at the arrival turn. Trade and
//! windfall go together (a route also pays the entry bonus); wonder aid is
//! the alternative use of the same unit, and wins only when strictly better.

use crate::error::CaravanError;
use crate::finance::{annuity, perpetuity, present_value};
use crate::parameter::OptimizationParameter;
use crate::result::CaravanResult;
use crate::world::{Caravan, CaravanAction, City, PlayerId, Production, WorldView};

/// Wonder aid is weighted double against trade.
const WONDER_WEIGHT: f64 = 2.0;

/// The entry bonus goes to both gold and science.
const WINDFALL_CHANNELS: i32 = 2;

/// Score `dest` as a destination for `caravan` built in `src`, arriving
/// after `arrival_time` turns.
///
/// Always reports the outcome to the parameter's callback, viable or not.
pub fn evaluate_destination<W: WorldView + ?Sized>(
    world: &W,
    caravan: &Caravan,
    param: &OptimizationParameter,
    src: &City,
    dest: &City,
    arrival_time: u32,
) -> Result<CaravanResult, CaravanError> {
    let result = discounted_reward(world, caravan, param, src, dest, arrival_time)?;

    log::debug!(
        "caravan route {} -> {} at t={}: value={:.2} wonder={}",
        src.id,
        dest.id,
        arrival_time,
        result.value,
        result.help_wonder
    );

    if let Some(callback) = &param.callback {
        callback(&result);
    }

    Ok(result)
}

fn discounted_reward<W: WorldView + ?Sized>(
    world: &W,
    caravan: &Caravan,
    param: &OptimizationParameter,
    src: &City,
    dest: &City,
    arrival_time: u32,
) -> Result<CaravanResult, CaravanError> {
    let rate = param.discount;

    if !param.foreign_trade.allows(world, src.owner, dest.owner) {
        log::trace!("city {} excluded by {:?}", dest.id, param.foreign_trade);
        return Ok(CaravanResult::not_viable(src.id));
    }

    let possible = |action| world.speculate_action(caravan, action, src, dest).is_possible();
    let consider_wonder = param.consider_wonders && possible(CaravanAction::HelpWonder);
    let consider_trade = param.consider_trade && possible(CaravanAction::EstablishTradeRoute);
    let consider_windfall = param.consider_windfall && possible(CaravanAction::EnterMarketplace);

    if !consider_wonder && !consider_trade && !consider_windfall {
        log::trace!("no caravan action possible against city {}", dest.id);
        return Ok(CaravanResult::not_viable(src.id));
    }

    let wonder = if consider_wonder {
        let raw = wonder_benefit(world, caravan, arrival_time, dest, param)?;
        present_value(raw * WONDER_WEIGHT, arrival_time, rate)
    } else {
        -1.0
    };

    let trade = if consider_trade {
        let per_turn = trade_benefit(world, src.owner, src, dest, param)?;
        let stream = match param.horizon.remaining(arrival_time) {
            None => perpetuity(per_turn, rate),
            Some(terms) => annuity(per_turn, terms, rate),
        };
        present_value(stream, arrival_time, rate)
    } else {
        0.0
    };

    let windfall = if consider_windfall {
        present_value(windfall_benefit(world, caravan, src, dest, param), arrival_time, rate)
    } else {
        0.0
    };

    let mut result = CaravanResult {
        src: src.id,
        dest: Some(dest.id),
        arrival_time,
        value: 0.0,
        help_wonder: false,
        required_boat: src.continent != dest.continent,
    };

    if (consider_trade || consider_windfall) && trade + windfall >= wonder {
        result.value = trade + windfall;
    } else if consider_wonder {
        result.value = wonder;
        result.help_wonder = true;
    } else {
        return Ok(CaravanResult::not_viable(src.id));
    }

    Ok(result)
}

/// One-time bonus for entering `dest`, undiscounted.
pub fn windfall_benefit<W: WorldView + ?Sized>(
    world: &W,
    caravan: &Caravan,
    src: &City,
    dest: &City,
    param: &OptimizationParameter,
) -> f64 {
    if !param.consider_windfall || !world.can_cities_trade(src, dest) {
        return 0.0;
    }

    let establishing = caravan.can_do(CaravanAction::EstablishTradeRoute)
        && world.can_establish_trade_route(src, dest);
    let bonus = world.enter_city_trade_bonus(src, dest, establishing);

    f64::from(bonus * WINDFALL_CHANNELS)
}

/// Change in per-turn trade for `player` if `src` and `dest` open a route.
pub fn trade_benefit<W: WorldView + ?Sized>(
    world: &W,
    player: PlayerId,
    src: &City,
    dest: &City,
    param: &OptimizationParameter,
) -> Result<f64, CaravanError> {
    if !param.consider_trade {
        return Ok(0.0);
    }
    if !world.can_cities_trade(src, dest) || !world.can_establish_trade_route(src, dest) {
        return Ok(0.0);
    }
    // No slots at all means nothing can be displaced to make room either
    if src.max_trade_routes == 0 || dest.max_trade_routes == 0 {
        return Ok(0.0);
    }
    if param.convert_trade {
        return Err(CaravanError::TradeConversionUnsupported);
    }

    let count_losers = param.account_for_broken_routes;
    let new_trade = world.trade_base_between(src, dest);

    let total = one_city_trade_benefit(world, src, player, count_losers, new_trade)
        + one_city_trade_benefit(world, dest, player, count_losers, new_trade);
    Ok(f64::from(total))
}

/// Net trade change at one endpoint, as credited to `player`.
fn one_city_trade_benefit<W: WorldView + ?Sized>(
    world: &W,
    city: &City,
    player: PlayerId,
    count_losers: bool,
    new_trade: i32,
) -> i32 {
    let ours = city.owner == player;
    // A foreign endpoint's new trade is theirs, but it can still cost us
    // one of our routes.
    let mut gained = if ours { new_trade } else { 0 };

    if city.has_free_trade_slot() {
        return gained;
    }

    let removable = world.removable_trade(city);
    if ours {
        gained -= removable.value;
    }

    let mut lost = 0;
    if count_losers {
        for dropped in &removable.routes {
            let Some(loser) = world.city(dropped.partner) else {
                log::warn!(
                    "city {} has a route to unknown city {}",
                    city.id,
                    dropped.partner
                );
                continue;
            };
            if loser.owner != player {
                continue;
            }
            lost += loser
                .trade_routes
                .iter()
                .filter(|back| back.partner == city.id)
                .map(|back| back.value)
                .sum::<i32>();
        }
    }

    gained - lost
}

/// Rush-buy gold saved by adding the caravan's shields to the wonder `dest`
/// is building, at the shield stock projected for arrival.
pub fn wonder_benefit<W: WorldView + ?Sized>(
    world: &W,
    caravan: &Caravan,
    arrival_time: u32,
    dest: &City,
    param: &OptimizationParameter,
) -> Result<f64, CaravanError> {
    if !param.consider_wonders || caravan.owner != dest.owner {
        return Ok(0.0);
    }
    let Production::Improvement(improvement) = dest.production else {
        return Ok(0.0);
    };
    if !world.is_wonder(improvement) || !world.accepts_help_wonder(dest.production) {
        return Ok(0.0);
    }

    let turns = i32::try_from(arrival_time).unwrap_or(i32::MAX);
    let shields_at_arrival = dest
        .shield_stock
        .saturating_add(turns.saturating_mul(dest.shield_surplus));

    let without = world.improvement_buy_gold_cost(dest, improvement, shields_at_arrival);
    let with = world.improvement_buy_gold_cost(
        dest,
        improvement,
        shields_at_arrival.saturating_add(caravan.shield_value),
    );

    if without < with {
        return Err(CaravanError::NegativeRushDelta { without, with });
    }

    Ok(f64::from(without - with))
}
