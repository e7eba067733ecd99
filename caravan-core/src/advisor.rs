//! Turn-level entry point tying a world and a map together.

use crate::config::AdvisorConfig;
use crate::error::CaravanError;
use crate::parameter::OptimizationParameter;
use crate::result::CaravanResult;
use crate::search::{find_best_destination, find_best_destination_from};
use crate::world::{Caravan, CityId, PathSearch, VisibilityMode, WorldView};
use rayon::prelude::*;
use tracing::instrument;

/// Answers "where should this caravan go?" against a fixed world snapshot.
///
/// Holds only shared references, so one advisor can serve any number of
/// caravans, including from several threads at once.
pub struct CaravanAdvisor<'a, W: ?Sized, M: ?Sized> {
    world: &'a W,
    map: &'a M,
}

impl<'a, W, M> CaravanAdvisor<'a, W, M>
where
    W: WorldView + ?Sized,
    M: PathSearch + ?Sized,
{
    pub fn new(world: &'a W, map: &'a M) -> Self {
        Self { world, map }
    }

    pub fn find_best_destination(
        &self,
        caravan: &Caravan,
        param: &OptimizationParameter,
        visibility: VisibilityMode,
    ) -> Result<CaravanResult, CaravanError> {
        find_best_destination(self.world, self.map, caravan, param, visibility)
    }

    pub fn find_best_destination_from(
        &self,
        caravan: &Caravan,
        param: &OptimizationParameter,
        src: CityId,
        turns_before: u32,
        moves_left: u32,
        visibility: VisibilityMode,
    ) -> Result<CaravanResult, CaravanError> {
        find_best_destination_from(
            self.world,
            self.map,
            caravan,
            param,
            src,
            turns_before,
            moves_left,
            visibility,
        )
    }

    /// Best destination for `caravan` under its own capabilities and the
    /// configured policy.
    pub fn advise(
        &self,
        caravan: &Caravan,
        config: &AdvisorConfig,
    ) -> Result<CaravanResult, CaravanError> {
        let param = config.parameter_for(caravan);
        self.find_best_destination(caravan, &param, config.visibility)
    }
}

impl<W, M> CaravanAdvisor<'_, W, M>
where
    W: WorldView + Sync + ?Sized,
    M: PathSearch + Sync + ?Sized,
{
    /// Advise every caravan of a turn in parallel. Results keep input order.
    #[instrument(skip_all, name = "caravan_batch", fields(count = caravans.len()))]
    pub fn advise_all(
        &self,
        caravans: &[Caravan],
        config: &AdvisorConfig,
    ) -> Vec<Result<CaravanResult, CaravanError>> {
        caravans
            .par_iter()
            .map(|caravan| self.advise(caravan, config))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{GridMap, TestWorldBuilder};
    use crate::world::CaravanAction;

    #[test]
    fn test_advise_all_matches_sequential() {
        let world = TestWorldBuilder::new()
            .with_player(1)
            .with_city(10, 1, 0)
            .with_city(20, 1, 3)
            .with_city(30, 1, 6)
            .trade_bonus(10, 20, 5)
            .trade_bonus(20, 30, 9)
            .trade_bonus(10, 30, 2)
            .build();
        let map = GridMap::new(7, 1);
        let advisor = CaravanAdvisor::new(&world, &map);
        let config = AdvisorConfig::default();

        let caravans = vec![
            world.caravan_at(1, 10, 0),
            world.caravan_at(1, 20, 3),
            world.caravan_at(1, 30, 6),
        ];

        let parallel = advisor.advise_all(&caravans, &config);
        let sequential: Vec<_> = caravans
            .iter()
            .map(|c| advisor.advise(c, &config))
            .collect();

        assert_eq!(parallel, sequential);
        assert_eq!(parallel[1].as_ref().unwrap().dest, Some(30));
    }

    #[test]
    fn test_advise_narrows_to_caravan_abilities() {
        let world = TestWorldBuilder::new()
            .with_player(1)
            .with_city(10, 1, 0)
            .with_city(20, 1, 1)
            .trade_bonus(10, 20, 5)
            .build();
        let map = GridMap::new(2, 1);
        let advisor = CaravanAdvisor::new(&world, &map);

        let mut caravan = world.caravan_at(1, 10, 0);
        caravan.actions.retain(|a| *a == CaravanAction::HelpWonder);

        let result = advisor.advise(&caravan, &AdvisorConfig::default()).unwrap();
        assert!(!result.is_viable());
    }
}
