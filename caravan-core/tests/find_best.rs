//! End-to-end checks of the public search API against the in-memory world.

use caravan_core::testing::{GridMap, TestWorld, TestWorldBuilder};
use caravan_core::{
    compare_results, find_best_destination, rank_results, CaravanResult, DiplomaticState,
    ForeignTradePolicy, Horizon, OptimizationParameter, VisibilityMode,
};
use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

/// Two players on a 6x2 map.
///
/// ```text
///  y=0: [10] .  [20] .  .  [40]
///  y=1:  .   .   .  [30] .   .
/// ```
///
/// 10, 20, 30 belong to player 1; 40 belongs to player 2.
fn two_player_world(relation: DiplomaticState) -> (TestWorld, GridMap) {
    let world = TestWorldBuilder::new()
        .with_player(1)
        .with_player(2)
        .relation(1, 2, relation)
        .with_city(10, 1, 0)
        .with_city(20, 1, 2)
        .with_city(30, 1, 9)
        .with_city(40, 2, 5)
        .trade_base(10, 20, 2)
        .trade_base(10, 30, 3)
        .trade_base(10, 40, 6)
        .trade_bonus(10, 20, 10)
        .trade_bonus(10, 40, 25)
        .build();
    (world, GridMap::new(6, 2))
}

#[test]
fn test_no_other_city_returns_sentinel() {
    let world = TestWorldBuilder::new()
        .with_player(1)
        .with_city(10, 1, 0)
        .build();
    let map = GridMap::new(3, 3);
    let caravan = world.caravan_at(1, 10, 0);

    for ignore_transit_time in [false, true] {
        let param = OptimizationParameter {
            ignore_transit_time,
            ..Default::default()
        };
        let best =
            find_best_destination(&world, &map, &caravan, &param, VisibilityMode::Omniscient)
                .unwrap();
        assert_eq!(best, CaravanResult::not_viable(10));
    }
}

#[test]
fn test_foreign_city_needs_permissive_policy() {
    let (world, map) = two_player_world(DiplomaticState::Peace);
    let caravan = world.caravan_at(1, 10, 0);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let national = OptimizationParameter::default().with_callback(move |r| {
        sink.lock().unwrap().push(*r);
    });
    let best =
        find_best_destination(&world, &map, &caravan, &national, VisibilityMode::Realistic)
            .unwrap();
    assert_ne!(best.dest, Some(40));
    // The foreign city was visited but reported as the sentinel
    assert!(seen.lock().unwrap().iter().all(|r| r.dest != Some(40)));

    let peaceful = OptimizationParameter {
        foreign_trade: ForeignTradePolicy::PeacefulOnly,
        ..Default::default()
    };
    let best =
        find_best_destination(&world, &map, &caravan, &peaceful, VisibilityMode::Realistic)
            .unwrap();
    assert_eq!(best.dest, Some(40));
}

#[test]
fn test_war_excludes_foreign_city_under_every_policy() {
    let (world, map) = two_player_world(DiplomaticState::War);
    let caravan = world.caravan_at(1, 10, 0);

    for foreign_trade in [
        ForeignTradePolicy::NationalOnly,
        ForeignTradePolicy::AlliedOnly,
        ForeignTradePolicy::PeacefulOnly,
        ForeignTradePolicy::NotAtWar,
    ] {
        let param = OptimizationParameter {
            foreign_trade,
            ignore_transit_time: true,
            ..Default::default()
        };
        let best =
            find_best_destination(&world, &map, &caravan, &param, VisibilityMode::Realistic)
                .unwrap();
        assert_ne!(best.dest, Some(40), "{foreign_trade:?}");
    }
}

#[test]
fn test_repeated_search_is_identical() {
    let (world, map) = two_player_world(DiplomaticState::Alliance);
    let caravan = world.caravan_at(1, 10, 0);
    let param = OptimizationParameter {
        foreign_trade: ForeignTradePolicy::AlliedOnly,
        ..Default::default()
    };

    let a = find_best_destination(&world, &map, &caravan, &param, VisibilityMode::Realistic)
        .unwrap();
    let b = find_best_destination(&world, &map, &caravan, &param, VisibilityMode::Realistic)
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(a.value.to_bits(), b.value.to_bits());
}

#[test]
fn test_collected_results_rank_consistently_with_best() {
    let (world, map) = two_player_world(DiplomaticState::Peace);
    let caravan = world.caravan_at(1, 10, 0);
    let all = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&all);
    let param = OptimizationParameter {
        foreign_trade: ForeignTradePolicy::NotAtWar,
        ..Default::default()
    }
    .with_callback(move |r| sink.lock().unwrap().push(*r));

    let best =
        find_best_destination(&world, &map, &caravan, &param, VisibilityMode::Realistic).unwrap();

    let mut all = all.lock().unwrap().clone();
    assert_eq!(all.len(), 4);
    rank_results(&mut all);
    assert_eq!(compare_results(&all[0], &best), Ordering::Equal);
    assert_eq!(all[0].dest, best.dest);
}

#[test]
fn test_wonder_aid_shrinks_with_distance() {
    let world = TestWorldBuilder::new()
        .with_player(1)
        .with_city(10, 1, 0)
        .with_city(20, 1, 9)
        .building_wonder(20, 50, 5, 3)
        .build();
    let map = GridMap::new(10, 1);
    let param = OptimizationParameter {
        consider_trade: false,
        consider_windfall: false,
        ..Default::default()
    };

    let mut previous = f64::INFINITY;
    for start in [8, 6, 4, 2, 0] {
        let caravan = world.caravan_at(1, 10, start);
        let best =
            find_best_destination(&world, &map, &caravan, &param, VisibilityMode::Realistic)
                .unwrap();
        assert_eq!(best.dest, Some(20));
        assert!(best.help_wonder);
        assert!(best.value < previous, "start {start}: {}", best.value);
        previous = best.value;
    }
}

#[test]
fn test_horizon_zero_value_is_undiscounted_windfall() {
    let (world, map) = two_player_world(DiplomaticState::Peace);
    let caravan = world.caravan_at(1, 10, 0);
    let param = OptimizationParameter {
        horizon: Horizon::Turns(0),
        discount: 0.5,
        ignore_transit_time: true,
        consider_wonders: false,
        ..Default::default()
    };

    let best =
        find_best_destination(&world, &map, &caravan, &param, VisibilityMode::Realistic).unwrap();
    assert_eq!(best.dest, Some(20));
    assert_eq!(best.value, 20.0);
}
