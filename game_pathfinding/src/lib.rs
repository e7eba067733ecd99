use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::hash::Hash;

/// A trait for graphs that can be searched.
///
/// `Node`: The type of node identifiers (e.g., TileId).
/// `Ctx`: A context object passed to cost calculations (e.g., map knowledge, unit class).
pub trait Graph<Node, Ctx> {
    /// Return the nodes reachable in one step from `node`.
    fn neighbors(&self, node: Node, context: &Ctx) -> Vec<Node>;

    /// Move points spent stepping from `from` to `to`.
    fn cost(&self, from: Node, to: Node, context: &Ctx) -> u32;
}

/// Per-turn movement allowance of the unit being searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveBudget {
    /// Move points restored at the start of every turn.
    pub move_rate: u32,
    /// Move points available on turn 0.
    pub moves_left_initially: u32,
}

impl MoveBudget {
    pub fn new(move_rate: u32, moves_left_initially: u32) -> Self {
        Self {
            move_rate,
            moves_left_initially,
        }
    }

    /// Arrival after paying `cost` move points from `from`.
    ///
    /// A unit that has run out of moves waits for the next turn. A unit with
    /// some moves left may always attempt a step and ends it with zero.
    fn step(&self, from: Arrival, cost: u32) -> Option<Arrival> {
        let (turn, moves_left) = if from.moves_left == 0 {
            if self.move_rate == 0 {
                return None;
            }
            (from.turn + 1, self.move_rate)
        } else {
            (from.turn, from.moves_left)
        };

        Some(Arrival {
            turn,
            moves_left: moves_left.saturating_sub(cost),
        })
    }
}

/// A settled search position: the earliest turn the unit can stand on `node`,
/// with the most moves left it can have on that turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position<Node> {
    pub node: Node,
    pub turn: u32,
    pub moves_left: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Arrival {
    turn: u32,
    moves_left: u32,
}

impl Arrival {
    /// Earlier turns first, then more moves left.
    fn rank(&self, other: &Self) -> Ordering {
        self.turn
            .cmp(&other.turn)
            .then_with(|| other.moves_left.cmp(&self.moves_left))
    }
}

/// Turn-aware uniform-cost expansion from a single start node.
///
/// Iterating yields every reachable node exactly once, in non-decreasing
/// `(turn, -moves_left)` order. Callers that only care about nearby nodes
/// can stop iterating as soon as `turn` passes their cutoff; the remaining
/// frontier is simply dropped.
///
/// All working state lives in the iterator, so independent searches over the
/// same graph can run side by side.
pub struct TurnMap<'a, Node, Ctx, G> {
    graph: &'a G,
    context: &'a Ctx,
    budget: MoveBudget,
    open_set: BinaryHeap<State<Node>>,
    best: HashMap<Node, Arrival>,
    closed_set: HashSet<Node>,
    seq: u64,
}

impl<'a, Node, Ctx, G> TurnMap<'a, Node, Ctx, G>
where
    Node: Copy + Eq + Hash + std::fmt::Debug,
    G: Graph<Node, Ctx>,
{
    pub fn new(graph: &'a G, start: Node, budget: MoveBudget, context: &'a Ctx) -> Self {
        let origin = Arrival {
            turn: 0,
            moves_left: budget.moves_left_initially,
        };
        let mut best = HashMap::new();
        best.insert(start, origin);

        let mut open_set = BinaryHeap::new();
        open_set.push(State {
            node: start,
            arrival: origin,
            seq: 0,
        });

        Self {
            graph,
            context,
            budget,
            open_set,
            best,
            closed_set: HashSet::new(),
            seq: 1,
        }
    }

    fn relax(&mut self, current: Node, arrival: Arrival) {
        for neighbor in self.graph.neighbors(current, self.context) {
            if self.closed_set.contains(&neighbor) {
                continue;
            }

            let cost = self.graph.cost(current, neighbor, self.context);
            let Some(candidate) = self.budget.step(arrival, cost) else {
                continue;
            };

            let improves = self
                .best
                .get(&neighbor)
                .is_none_or(|known| candidate.rank(known) == Ordering::Less);
            if improves {
                self.best.insert(neighbor, candidate);
                self.open_set.push(State {
                    node: neighbor,
                    arrival: candidate,
                    seq: self.seq,
                });
                self.seq += 1;
            }
        }
    }
}

impl<Node, Ctx, G> Iterator for TurnMap<'_, Node, Ctx, G>
where
    Node: Copy + Eq + Hash + std::fmt::Debug,
    G: Graph<Node, Ctx>,
{
    type Item = Position<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(State { node, arrival, .. }) = self.open_set.pop() {
            // Stale heap entry, or already settled via a better arrival
            if !self.closed_set.insert(node) {
                continue;
            }

            self.relax(node, arrival);

            return Some(Position {
                node,
                turn: arrival.turn,
                moves_left: arrival.moves_left,
            });
        }

        None
    }
}

/// Helper struct for the priority queue.
#[derive(Copy, Clone, Eq, PartialEq)]
struct State<Node> {
    node: Node,
    arrival: Arrival,
    seq: u64, // Insertion order, keeps equal arrivals deterministic
}

// The priority queue depends on `Ord`.
// Explicitly implement the trait so the queue becomes a min-heap.
impl<Node: Eq> Ord for State<Node> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Flip the ordering so the best arrival pops first.
        // Ties fall back to insertion order so iteration is reproducible.
        other
            .arrival
            .rank(&self.arrival)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<Node: Eq> PartialOrd for State<Node> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
