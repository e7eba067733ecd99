//! Deterministic in-memory collaborators for tests and tooling.
//!
//! [`TestWorldBuilder`] assembles a [`TestWorld`] implementing [`WorldView`]
//! with simple, predictable rules; [`GridMap`] implements [`PathSearch`] over
//! a rectangular grid using [`game_pathfinding::TurnMap`].

use crate::world::{
    ActionProbability, Caravan, CaravanAction, City, CityId, DiplomaticState, ImprovementId,
    PathPosition, PathSearch, PlayerId, Production, RemovableTrade, TileId, TradeRoute,
    VisibilityMode, WorldView,
};
use game_pathfinding::{Graph, MoveBudget, TurnMap};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;

const DEFAULT_MAX_ROUTES: usize = 4;
const DEFAULT_WONDER_COST: i32 = 600;
const DEFAULT_CARAVAN_SHIELDS: i32 = 50;

/// Caravan owned by player 1 with the given abilities, standing on tile 0.
pub fn caravan_with(actions: &[CaravanAction]) -> Caravan {
    Caravan {
        owner: 1,
        home_city: None,
        tile: 0,
        moves_left: 1,
        move_rate: 1,
        shield_value: DEFAULT_CARAVAN_SHIELDS,
        actions: actions.iter().copied().collect(),
    }
}

fn pair(a: CityId, b: CityId) -> (CityId, CityId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn player_pair(a: PlayerId, b: PlayerId) -> (PlayerId, PlayerId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// In-memory world with fixed trade and rush-buy rules.
///
/// - Distinct cities can always trade; a route can be opened unless the pair
///   already has one.
/// - Route trade and entry bonuses come from per-pair tables (0 if unset).
/// - Full cities give up their single lowest-value route.
/// - Rush cost for `r` missing shields is `2r + r²/20`, doubled from an
///   empty stock.
#[derive(Debug, Clone, Default)]
pub struct TestWorld {
    players: Vec<PlayerId>,
    cities: BTreeMap<CityId, City>,
    relations: FxHashMap<(PlayerId, PlayerId), DiplomaticState>,
    trade_base: FxHashMap<(CityId, CityId), i32>,
    trade_bonus: FxHashMap<(CityId, CityId), i32>,
    wonders: FxHashSet<ImprovementId>,
    wonder_cost: i32,
    inverted_rush_costs: bool,
}

impl TestWorld {
    /// Caravan with every caravan ability, one move per turn.
    pub fn caravan_at(&self, owner: PlayerId, home_city: CityId, tile: TileId) -> Caravan {
        Caravan {
            owner,
            home_city: Some(home_city),
            tile,
            moves_left: 1,
            move_rate: 1,
            shield_value: DEFAULT_CARAVAN_SHIELDS,
            actions: [
                CaravanAction::EstablishTradeRoute,
                CaravanAction::EnterMarketplace,
                CaravanAction::HelpWonder,
            ]
            .into_iter()
            .collect(),
        }
    }

    /// Gold to finish a wonder with `shields` in stock.
    pub fn rush_cost(&self, shields: i32) -> i32 {
        if self.inverted_rush_costs {
            return shields.max(0);
        }
        let remaining = (self.wonder_cost - shields).max(0);
        let cost = 2 * remaining + remaining * remaining / 20;
        if shields <= 0 {
            cost * 2
        } else {
            cost
        }
    }

    fn already_partners(&self, a: &City, b: &City) -> bool {
        a.trade_routes.iter().any(|r| r.partner == b.id)
    }
}

impl WorldView for TestWorld {
    fn city(&self, id: CityId) -> Option<&City> {
        self.cities.get(&id)
    }

    fn city_at(&self, tile: TileId) -> Option<&City> {
        self.cities.values().find(|c| c.tile == tile)
    }

    fn players(&self) -> Vec<PlayerId> {
        self.players.clone()
    }

    fn cities_of(&self, player: PlayerId) -> Vec<&City> {
        self.cities.values().filter(|c| c.owner == player).collect()
    }

    fn diplomatic_state(&self, a: PlayerId, b: PlayerId) -> DiplomaticState {
        self.relations
            .get(&player_pair(a, b))
            .copied()
            .unwrap_or(DiplomaticState::NoContact)
    }

    fn can_cities_trade(&self, a: &City, b: &City) -> bool {
        a.id != b.id
    }

    fn can_establish_trade_route(&self, a: &City, b: &City) -> bool {
        self.can_cities_trade(a, b) && !self.already_partners(a, b)
    }

    fn trade_base_between(&self, a: &City, b: &City) -> i32 {
        self.trade_base.get(&pair(a.id, b.id)).copied().unwrap_or(0)
    }

    fn enter_city_trade_bonus(&self, src: &City, dest: &City, _establishing_route: bool) -> i32 {
        self.trade_bonus
            .get(&pair(src.id, dest.id))
            .copied()
            .unwrap_or(0)
    }

    fn removable_trade(&self, city: &City) -> RemovableTrade {
        match city.trade_routes.iter().min_by_key(|r| r.value) {
            Some(&lowest) => RemovableTrade {
                value: lowest.value,
                routes: vec![lowest],
            },
            None => RemovableTrade::default(),
        }
    }

    fn speculate_action(
        &self,
        caravan: &Caravan,
        action: CaravanAction,
        src: &City,
        dest: &City,
    ) -> ActionProbability {
        if !caravan.can_do(action) {
            return ActionProbability::IMPOSSIBLE;
        }
        let possible = match action {
            CaravanAction::EstablishTradeRoute => self.can_establish_trade_route(src, dest),
            CaravanAction::EnterMarketplace => self.can_cities_trade(src, dest),
            CaravanAction::HelpWonder => {
                caravan.owner == dest.owner && self.accepts_help_wonder(dest.production)
            }
        };
        if possible {
            ActionProbability::CERTAIN
        } else {
            ActionProbability::IMPOSSIBLE
        }
    }

    fn is_wonder(&self, improvement: ImprovementId) -> bool {
        self.wonders.contains(&improvement)
    }

    fn accepts_help_wonder(&self, production: Production) -> bool {
        match production {
            Production::Improvement(id) => self.is_wonder(id),
            Production::Unit(_) => false,
        }
    }

    fn improvement_buy_gold_cost(
        &self,
        _city: &City,
        _improvement: ImprovementId,
        shields: i32,
    ) -> i32 {
        self.rush_cost(shields)
    }
}

pub struct TestWorldBuilder {
    world: TestWorld,
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self {
            world: TestWorld {
                wonder_cost: DEFAULT_WONDER_COST,
                ..Default::default()
            },
        }
    }

    pub fn with_player(mut self, id: PlayerId) -> Self {
        if !self.world.players.contains(&id) {
            self.world.players.push(id);
        }
        self
    }

    pub fn relation(mut self, a: PlayerId, b: PlayerId, state: DiplomaticState) -> Self {
        self.world.relations.insert(player_pair(a, b), state);
        self
    }

    pub fn with_city(mut self, id: CityId, owner: PlayerId, tile: TileId) -> Self {
        self.world.cities.insert(
            id,
            City {
                id,
                owner,
                tile,
                continent: 1,
                shield_stock: 0,
                shield_surplus: 0,
                production: Production::Unit(0),
                trade_routes: Vec::new(),
                max_trade_routes: DEFAULT_MAX_ROUTES,
            },
        );
        self
    }

    pub fn continent(mut self, city: CityId, continent: i16) -> Self {
        if let Some(c) = self.world.cities.get_mut(&city) {
            c.continent = continent;
        }
        self
    }

    pub fn trade_base(mut self, a: CityId, b: CityId, trade: i32) -> Self {
        self.world.trade_base.insert(pair(a, b), trade);
        self
    }

    pub fn trade_bonus(mut self, a: CityId, b: CityId, bonus: i32) -> Self {
        self.world.trade_bonus.insert(pair(a, b), bonus);
        self
    }

    /// Existing route between `a` and `b`, worth `value` at each end.
    pub fn route(mut self, a: CityId, b: CityId, value: i32) -> Self {
        for (from, to) in [(a, b), (b, a)] {
            if let Some(c) = self.world.cities.get_mut(&from) {
                c.trade_routes.push(TradeRoute { partner: to, value });
            }
        }
        self
    }

    pub fn max_routes(mut self, city: CityId, max: usize) -> Self {
        if let Some(c) = self.world.cities.get_mut(&city) {
            c.max_trade_routes = max;
        }
        self
    }

    pub fn building_wonder(
        mut self,
        city: CityId,
        shield_stock: i32,
        shield_surplus: i32,
        wonder: ImprovementId,
    ) -> Self {
        self.world.wonders.insert(wonder);
        if let Some(c) = self.world.cities.get_mut(&city) {
            c.production = Production::Improvement(wonder);
            c.shield_stock = shield_stock;
            c.shield_surplus = shield_surplus;
        }
        self
    }

    pub fn building_improvement(mut self, city: CityId, improvement: ImprovementId) -> Self {
        if let Some(c) = self.world.cities.get_mut(&city) {
            c.production = Production::Improvement(improvement);
        }
        self
    }

    /// Make rush costs grow with the shield stock, breaking the cost model.
    pub fn inverted_rush_costs(mut self) -> Self {
        self.world.inverted_rush_costs = true;
        self
    }

    pub fn build(self) -> TestWorld {
        self.world
    }
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Rectangular 4-connected map. Tile ids are `y * width + x`.
#[derive(Debug, Clone)]
pub struct GridMap {
    width: u32,
    height: u32,
    move_cost: FxHashMap<TileId, u32>,
    impassable: FxHashSet<TileId>,
    /// Tiles hidden from every player unless searching omnisciently.
    unknown: FxHashSet<TileId>,
}

/// Per-search context handed to the graph callbacks.
pub struct GridContext {
    visibility: VisibilityMode,
}

impl GridMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            move_cost: FxHashMap::default(),
            impassable: FxHashSet::default(),
            unknown: FxHashSet::default(),
        }
    }

    pub fn tile(&self, x: u32, y: u32) -> TileId {
        y * self.width + x
    }

    pub fn with_cost(mut self, tile: TileId, cost: u32) -> Self {
        self.move_cost.insert(tile, cost);
        self
    }

    pub fn with_impassable(mut self, tile: TileId) -> Self {
        self.impassable.insert(tile);
        self
    }

    pub fn with_unknown(mut self, tile: TileId) -> Self {
        self.unknown.insert(tile);
        self
    }

    fn enterable(&self, tile: TileId, context: &GridContext) -> bool {
        if self.impassable.contains(&tile) {
            return false;
        }
        context.visibility == VisibilityMode::Omniscient || !self.unknown.contains(&tile)
    }
}

impl Graph<TileId, GridContext> for GridMap {
    fn neighbors(&self, node: TileId, context: &GridContext) -> Vec<TileId> {
        let x = node % self.width;
        let y = node / self.width;
        let mut n = Vec::with_capacity(4);

        if x > 0 {
            n.push(node - 1);
        }
        if x + 1 < self.width {
            n.push(node + 1);
        }
        if y > 0 {
            n.push(node - self.width);
        }
        if y + 1 < self.height {
            n.push(node + self.width);
        }

        n.retain(|&t| self.enterable(t, context));
        n
    }

    fn cost(&self, _from: TileId, to: TileId, _context: &GridContext) -> u32 {
        self.move_cost.get(&to).copied().unwrap_or(1)
    }
}

/// Owns the search context so the returned iterator can borrow only the map.
struct GridSearch<'a> {
    inner: TurnMap<'a, TileId, GridContext, GridMap>,
}

impl Iterator for GridSearch<'_> {
    type Item = PathPosition;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|p| PathPosition {
            tile: p.node,
            turn: p.turn,
            moves_left: p.moves_left,
        })
    }
}

static REALISTIC: GridContext = GridContext {
    visibility: VisibilityMode::Realistic,
};
static OMNISCIENT: GridContext = GridContext {
    visibility: VisibilityMode::Omniscient,
};

impl PathSearch for GridMap {
    fn search<'a>(
        &'a self,
        caravan: &Caravan,
        start: TileId,
        moves_left: u32,
        visibility: VisibilityMode,
    ) -> Box<dyn Iterator<Item = PathPosition> + 'a> {
        let context: &GridContext = match visibility {
            VisibilityMode::Realistic => &REALISTIC,
            VisibilityMode::Omniscient => &OMNISCIENT,
        };
        let budget = MoveBudget::new(caravan.move_rate, moves_left);
        Box::new(GridSearch {
            inner: TurnMap::new(self, start, budget, context),
        })
    }
}
