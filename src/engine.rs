//! Alignment search over a synchronous product.
//!
//! One expansion loop serves every execution variant. The priority key type
//! (`DijkstraKey` or `AStarKey`) selects the algorithm at compile time; the
//! search mode selects between a single forward search and a pair of
//! forward/backward searches that meet in the middle.
//!
//! In bidirectional mode neither side may take more than
//! [`MAX_TURN_STREAK`] expansions in a row while the other still has open
//! nodes; the next turn then goes to the other side. The reversed net can
//! be unbounded where the forward one is not, and `lowest_g_cost` alone
//! would keep choosing a backward frontier stuck at low `g`.
//!
//! A search run goes `READY -> RUNNING -> SUCCEEDED | EXHAUSTED`. All state
//! (tree, open set, closed set, statistics) is private to one call of
//! [`SearchEngine::run`].

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cost::Cost;
use crate::error::AlignError;
use crate::frontier::OpenSet;
use crate::heuristic::ZeroOracle;
use crate::moves::{Move, MoveKind};
use crate::net::{Marking, PetriNet, TransitionId};
use crate::node::{AStarKey, DijkstraKey, NodeHeuristic, NodeId, PriorityKey, SearchTree};
use crate::product::SynchronousProduct;
use crate::traits::HeuristicOracle;
use crate::variant::{
    AlternatingMethod, Direction, ExecutionVariant, SearchAlgorithm, SearchMode,
    TerminationCriterion,
};

/// Tolerance when reading a fractional witness as "fires at least once".
const WITNESS_EPS: f64 = 1e-9;

/// Longest run of consecutive turns one direction gets in a bidirectional search.
pub const MAX_TURN_STREAK: usize = 64;

static ZERO: ZeroOracle = ZeroOracle;

/// Counters collected during one search run (both directions summed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Nodes popped and expanded.
    pub expanded: usize,
    /// Children pushed onto an open set.
    pub generated: usize,
    /// Popped nodes discarded because their marking was already closed.
    pub stale: usize,
    pub oracle_calls: usize,
    /// Child estimates derived from the parent's witness.
    pub derived_estimates: usize,
    /// Estimates whose relaxation had no solution.
    pub infeasible_estimates: usize,
    /// Improvements of the best forward/backward meeting point.
    pub connections: usize,
}

impl SearchStats {
    fn combine(self, other: SearchStats) -> SearchStats {
        SearchStats {
            expanded: self.expanded + other.expanded,
            generated: self.generated + other.generated,
            stale: self.stale + other.stale,
            oracle_calls: self.oracle_calls + other.oracle_calls,
            derived_estimates: self.derived_estimates + other.derived_estimates,
            infeasible_estimates: self.infeasible_estimates + other.infeasible_estimates,
            connections: self.connections + other.connections,
        }
    }
}

/// A cheapest alignment and how it was found.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    /// Classified moves in firing order.
    pub moves: Vec<Move>,
    /// Product transitions fired from the initial to the final marking.
    pub firing_sequence: Vec<TransitionId>,
    /// Total cost of the alignment.
    pub cost: Cost,
    pub stats: SearchStats,
}

impl AlignmentResult {
    /// Number of moves of the given kind.
    pub fn count(&self, kind: MoveKind) -> usize {
        self.moves.iter().filter(|mv| mv.kind() == kind).count()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// `(log, model)` rendering of every move, e.g. `["(a, a)", "(c, >>)"]`.
    pub fn rendered(&self) -> Vec<String> {
        self.moves.iter().map(Move::to_string).collect()
    }
}

/// Searches one product under one execution variant.
///
/// ```
/// use spn_align::{build_synchronous_product, CostFunction, ExecutionVariant, ProcessModel, SearchEngine};
///
/// let model = ProcessModel::sequence(&["a", "b"]);
/// let product = build_synchronous_product(&["a", "c"], &model, &CostFunction::Standard)?;
/// let result = SearchEngine::new(&product, ExecutionVariant::dijkstra()).run()?;
/// assert_eq!(result.cost, 20);
/// # Ok::<(), spn_align::AlignError>(())
/// ```
pub struct SearchEngine<'a> {
    product: &'a SynchronousProduct,
    variant: ExecutionVariant,
    forward_oracle: &'a dyn HeuristicOracle,
    backward_oracle: &'a dyn HeuristicOracle,
    expansion_limit: Option<usize>,
}

impl<'a> SearchEngine<'a> {
    /// Engine with zero heuristics and no expansion limit.
    pub fn new(product: &'a SynchronousProduct, variant: ExecutionVariant) -> Self {
        Self {
            product,
            variant,
            forward_oracle: &ZERO,
            backward_oracle: &ZERO,
            expansion_limit: None,
        }
    }

    /// Oracle bounding the cost to the final marking. Unused by Dijkstra.
    pub fn with_oracle(mut self, oracle: &'a dyn HeuristicOracle) -> Self {
        self.forward_oracle = oracle;
        self
    }

    /// Oracle bounding the cost back to the initial marking, for
    /// bidirectional A*. Defaults to [`ZeroOracle`].
    pub fn with_backward_oracle(mut self, oracle: &'a dyn HeuristicOracle) -> Self {
        self.backward_oracle = oracle;
        self
    }

    /// Give up with [`AlignError::SearchExhausted`] once this many nodes
    /// were expanded.
    pub fn with_expansion_limit(mut self, limit: usize) -> Self {
        self.expansion_limit = Some(limit);
        self
    }

    pub fn product(&self) -> &SynchronousProduct {
        self.product
    }

    pub fn variant(&self) -> ExecutionVariant {
        self.variant
    }

    /// Search for a cheapest alignment.
    ///
    /// # Errors
    /// - [`AlignError::InvalidConfiguration`] if an oracle is backed by a
    ///   solver other than the variant's split-point solver.
    /// - [`AlignError::SearchExhausted`] if the final marking is unreachable
    ///   or the expansion limit was hit first.
    pub fn run(&self) -> Result<AlignmentResult, AlignError> {
        self.validate()?;

        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "align",
            variant = %self.variant,
            places = self.product.net().num_places(),
            transitions = self.product.net().num_transitions()
        );
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        if self.product.initial_marking() == self.product.final_marking() {
            return Ok(AlignmentResult {
                moves: Vec::new(),
                firing_sequence: Vec::new(),
                cost: 0,
                stats: SearchStats::default(),
            });
        }

        let outcome = match (self.variant.algorithm(), self.variant.mode()) {
            (SearchAlgorithm::Dijkstra, SearchMode::Unidirectional) => {
                self.unidirectional::<DijkstraKey>()
            }
            (SearchAlgorithm::AStar, SearchMode::Unidirectional) => self.unidirectional::<AStarKey>(),
            (
                SearchAlgorithm::Dijkstra,
                SearchMode::Bidirectional {
                    alternating,
                    termination,
                },
            ) => self.bidirectional::<DijkstraKey>(alternating, termination),
            (
                SearchAlgorithm::AStar,
                SearchMode::Bidirectional {
                    alternating,
                    termination,
                },
            ) => self.bidirectional::<AStarKey>(alternating, termination),
        };

        #[cfg(feature = "tracing")]
        match &outcome {
            Ok(result) => tracing::debug!(
                cost = result.cost,
                moves = result.len(),
                expanded = result.stats.expanded,
                "alignment found"
            ),
            Err(err) => tracing::debug!(error = %err, "search ended without alignment"),
        }

        outcome
    }

    fn validate(&self) -> Result<(), AlignError> {
        if !self.variant.is_informed() {
            return Ok(());
        }
        let mut oracles = vec![(Direction::Forward, self.forward_oracle)];
        if self.variant.is_bidirectional() {
            oracles.push((Direction::Backward, self.backward_oracle));
        }
        for (direction, oracle) in oracles {
            if let (Some(backend), Some(configured)) =
                (oracle.backend(), self.variant.split_point_solver())
            {
                if backend != configured {
                    return Err(AlignError::invalid_configuration(format!(
                        "{} oracle runs on {backend} but the variant asks for {configured}",
                        direction.as_str()
                    )));
                }
            }
        }
        Ok(())
    }

    fn may_expand(&self, expanded: usize) -> bool {
        self.expansion_limit.map_or(true, |limit| expanded < limit)
    }

    fn finish(&self, firing_sequence: Vec<TransitionId>, cost: Cost, stats: SearchStats) -> AlignmentResult {
        debug_assert_eq!(self.product.path_cost(&firing_sequence), cost);
        AlignmentResult {
            moves: self.product.decode(&firing_sequence),
            firing_sequence,
            cost,
            stats,
        }
    }

    fn unidirectional<K: PriorityKey>(&self) -> Result<AlignmentResult, AlignError> {
        let product = self.product;
        let mut search = DirectionalSearch::<K>::new(
            Direction::Forward,
            product.net(),
            product.costs(),
            self.forward_oracle,
            product.initial_marking().clone(),
            false,
        );
        let target = product.final_marking();
        let mut generated = Vec::new();
        loop {
            let may_expand = self.may_expand(search.stats.expanded);
            match search.step(Some(target), may_expand, &mut generated) {
                Step::Target(id) => {
                    let g = search.tree[id].g;
                    let sequence = search.tree.firing_sequence(id);
                    return Ok(self.finish(sequence, g, search.stats));
                }
                Step::Exhausted => return Err(exhausted(search.stats.expanded, false)),
                Step::LimitReached => return Err(exhausted(search.stats.expanded, true)),
                Step::Stale | Step::Expanded(_) => {}
            }
        }
    }

    fn bidirectional<K: PriorityKey>(
        &self,
        alternating: AlternatingMethod,
        termination: TerminationCriterion,
    ) -> Result<AlignmentResult, AlignError> {
        let product = self.product;
        let reversed = product.net().reversed();
        let mut fwd = DirectionalSearch::<K>::new(
            Direction::Forward,
            product.net(),
            product.costs(),
            self.forward_oracle,
            product.initial_marking().clone(),
            true,
        );
        let mut bwd = DirectionalSearch::<K>::new(
            Direction::Backward,
            &reversed,
            product.costs(),
            self.backward_oracle,
            product.final_marking().clone(),
            true,
        );

        let mut best: Option<Meeting> = None;
        let mut connections = 0;
        let mut generated = Vec::new();
        let mut turn = Direction::Forward;
        let mut last = Direction::Forward;
        let mut streak = 0usize;

        loop {
            if fwd.open.is_empty() || bwd.open.is_empty() {
                break;
            }
            if let Some(meeting) = &best {
                if termination_reached(termination, &fwd, &bwd, meeting.cost) {
                    break;
                }
            }

            let mut direction = pick_direction(alternating, turn, &fwd, &bwd);
            if direction == last && streak >= MAX_TURN_STREAK {
                direction = direction.opposite();
            }
            if direction == last {
                streak += 1;
            } else {
                last = direction;
                streak = 1;
            }
            turn = direction.opposite();
            let may_expand = self.may_expand(fwd.stats.expanded + bwd.stats.expanded);
            let (active, passive) = match direction {
                Direction::Forward => (&mut fwd, &bwd),
                Direction::Backward => (&mut bwd, &fwd),
            };
            match active.step(None, may_expand, &mut generated) {
                Step::Expanded(id) => {
                    for &node in std::iter::once(&id).chain(&generated) {
                        if connect(active, passive, node, &mut best) {
                            connections += 1;
                        }
                    }
                }
                Step::LimitReached => {
                    return Err(exhausted(fwd.stats.expanded + bwd.stats.expanded, true));
                }
                Step::Stale | Step::Target(_) | Step::Exhausted => {}
            }
        }

        let mut stats = fwd.stats.combine(bwd.stats);
        stats.connections = connections;
        let Some(meeting) = best else {
            return Err(exhausted(stats.expanded, false));
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            cost = meeting.cost,
            forward_expanded = fwd.stats.expanded,
            backward_expanded = bwd.stats.expanded,
            connections,
            "frontiers met"
        );

        let mut sequence = fwd.tree.firing_sequence(meeting.forward);
        sequence.extend(bwd.tree.transitions_to_root(meeting.backward));
        Ok(self.finish(sequence, meeting.cost, stats))
    }
}

fn exhausted(expanded: usize, limit_reached: bool) -> AlignError {
    AlignError::SearchExhausted {
        expanded,
        limit_reached,
    }
}

/// Outcome of one pop from a directional search.
enum Step {
    /// Open set was empty.
    Exhausted,
    /// Popped node's marking was already closed at no higher cost.
    Stale,
    /// Popped node carries the target marking.
    Target(NodeId),
    /// Popped node would need an expansion beyond the limit.
    LimitReached,
    /// Node was closed and its children pushed.
    Expanded(NodeId),
}

/// One direction of a search: its own tree, open set and closed set.
struct DirectionalSearch<'s, K> {
    direction: Direction,
    net: &'s PetriNet,
    costs: &'s [Cost],
    oracle: &'s dyn HeuristicOracle,
    derive: bool,
    tree: SearchTree,
    open: OpenSet<K>,
    closed: FxHashMap<Marking, Cost>,
    /// Cheapest node per marking ever pushed; kept only when meeting
    /// another search.
    seen: Option<FxHashMap<Marking, (Cost, NodeId)>>,
    stats: SearchStats,
}

impl<'s, K: PriorityKey> DirectionalSearch<'s, K> {
    fn new(
        direction: Direction,
        net: &'s PetriNet,
        costs: &'s [Cost],
        oracle: &'s dyn HeuristicOracle,
        root: Marking,
        track_seen: bool,
    ) -> Self {
        let mut stats = SearchStats::default();
        let heuristic = if K::INFORMED {
            Some(consult(oracle, &mut stats, &root))
        } else {
            None
        };
        let tree = SearchTree::with_root(root, heuristic);
        let mut open = OpenSet::new();
        open.push(K::of(&tree[tree.root()]), tree.root());
        let mut search = Self {
            direction,
            net,
            costs,
            oracle,
            derive: K::INFORMED && oracle.witness_is_exact(),
            tree,
            open,
            closed: FxHashMap::default(),
            seen: track_seen.then(FxHashMap::default),
            stats,
        };
        let root = search.tree.root();
        search.remember(root);
        search
    }

    /// Pop the best open node; close and expand it unless it is the target,
    /// stale, or over the expansion budget. Pushed children land in `generated`.
    fn step(&mut self, target: Option<&Marking>, may_expand: bool, generated: &mut Vec<NodeId>) -> Step {
        generated.clear();
        let Some((_, id)) = self.open.pop() else {
            return Step::Exhausted;
        };
        let g = self.tree[id].g;
        let marking = self.tree[id].marking.clone();

        if target == Some(&marking) {
            return Step::Target(id);
        }
        if self.closed.get(&marking).is_some_and(|&closed_g| closed_g <= g) {
            self.stats.stale += 1;
            return Step::Stale;
        }
        if !may_expand {
            return Step::LimitReached;
        }

        #[cfg(feature = "tracing")]
        let _span = tracing::trace_span!("expand", direction = self.direction.as_str(), g).entered();

        self.closed.insert(marking.clone(), g);
        self.stats.expanded += 1;

        let net = self.net;
        for t in net.enabled(&marking) {
            let cost = self.costs[t];
            let child_g = g.saturating_add(cost);
            let child_marking = net.fire(&marking, t);
            if self
                .closed
                .get(&child_marking)
                .is_some_and(|&closed_g| closed_g <= child_g)
            {
                continue;
            }
            let heuristic = if K::INFORMED {
                Some(self.child_heuristic(id, t, cost, &child_marking))
            } else {
                None
            };
            let child = self.tree.add_child(id, t, cost, child_marking, heuristic);
            self.open.push(K::of(&self.tree[child]), child);
            self.stats.generated += 1;
            self.remember(child);
            generated.push(child);
        }
        Step::Expanded(id)
    }

    /// Estimate for the child reached by `t`: derived from the parent's
    /// witness when it fires `t`, else from the oracle.
    fn child_heuristic(
        &mut self,
        parent: NodeId,
        t: TransitionId,
        cost: Cost,
        marking: &Marking,
    ) -> NodeHeuristic {
        if self.derive {
            if let Some(hx) = self.tree[parent].heuristic.as_ref() {
                if hx.feasible && hx.x.get(t).is_some_and(|&v| v >= 1.0 - WITNESS_EPS) {
                    let mut x = hx.x.clone();
                    x[t] -= 1.0;
                    self.stats.derived_estimates += 1;
                    return NodeHeuristic {
                        h: hx.h.saturating_sub(cost),
                        x,
                        feasible: true,
                    };
                }
            }
        }
        consult(self.oracle, &mut self.stats, marking)
    }

    fn remember(&mut self, id: NodeId) {
        let Some(seen) = self.seen.as_mut() else {
            return;
        };
        let node = &self.tree[id];
        match seen.entry(node.marking.clone()) {
            Entry::Occupied(mut slot) => {
                if node.g < slot.get().0 {
                    slot.insert((node.g, id));
                }
            }
            Entry::Vacant(slot) => {
                slot.insert((node.g, id));
            }
        }
    }

    fn seen(&self, marking: &Marking) -> Option<(Cost, NodeId)> {
        self.seen.as_ref()?.get(marking).copied()
    }
}

fn consult(oracle: &dyn HeuristicOracle, stats: &mut SearchStats, marking: &Marking) -> NodeHeuristic {
    stats.oracle_calls += 1;
    let estimate = oracle.estimate(marking);
    if !estimate.feasible {
        stats.infeasible_estimates += 1;
    }
    NodeHeuristic {
        h: estimate.h,
        x: estimate.x,
        feasible: estimate.feasible,
    }
}

/// Best forward/backward meeting point found so far.
#[derive(Clone, Copy, Debug)]
struct Meeting {
    cost: Cost,
    forward: NodeId,
    backward: NodeId,
}

/// Record a meeting if `node` of `active` carries a marking `passive` has
/// reached, and it beats the best one. Returns whether it did.
fn connect<K: PriorityKey>(
    active: &DirectionalSearch<'_, K>,
    passive: &DirectionalSearch<'_, K>,
    node: NodeId,
    best: &mut Option<Meeting>,
) -> bool {
    let here = &active.tree[node];
    let Some((other_g, other)) = passive.seen(&here.marking) else {
        return false;
    };
    let cost = here.g.saturating_add(other_g);
    if best.as_ref().is_some_and(|b| b.cost <= cost) {
        return false;
    }
    let (forward, backward) = match active.direction {
        Direction::Forward => (node, other),
        Direction::Backward => (other, node),
    };
    *best = Some(Meeting {
        cost,
        forward,
        backward,
    });
    true
}

fn pick_direction<K: PriorityKey>(
    method: AlternatingMethod,
    turn: Direction,
    fwd: &DirectionalSearch<'_, K>,
    bwd: &DirectionalSearch<'_, K>,
) -> Direction {
    match method {
        AlternatingMethod::StrictlyAlternate => turn,
        AlternatingMethod::SmallerOpenSet => {
            if fwd.open.len() <= bwd.open.len() {
                Direction::Forward
            } else {
                Direction::Backward
            }
        }
        AlternatingMethod::LowestGCost => match (fwd.open.peek_key(), bwd.open.peek_key()) {
            (Some(f), Some(b)) if b.g() < f.g() => Direction::Backward,
            _ => Direction::Forward,
        },
    }
}

/// Whether no undiscovered path can beat a meeting of cost `best`.
///
/// Lower bounds are read off the open sets' top keys (`g` for Dijkstra, `f`
/// for A*); sums are taken in `u128` so saturated bounds cannot wrap.
fn termination_reached<K: PriorityKey>(
    criterion: TerminationCriterion,
    fwd: &DirectionalSearch<'_, K>,
    bwd: &DirectionalSearch<'_, K>,
    best: Cost,
) -> bool {
    let (Some(top_f), Some(top_b)) = (fwd.open.peek_key(), bwd.open.peek_key()) else {
        return true;
    };
    let lb_f = u128::from(top_f.bound());
    let lb_b = u128::from(top_b.bound());
    let best = u128::from(best);
    match criterion {
        TerminationCriterion::SymmetricLowerBounding => {
            let g_f = u128::from(fwd.open.min_g().unwrap_or(Cost::MAX));
            let g_b = u128::from(bwd.open.min_g().unwrap_or(Cost::MAX));
            g_f + g_b >= best || lb_f >= best || lb_b >= best
        }
        TerminationCriterion::AverageFunction => lb_f + lb_b >= 2 * best,
        TerminationCriterion::HalfAverageFunction => lb_f + lb_b >= 4 * best,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::CostFunction;
    use crate::heuristic::LabelDeficitOracle;
    use crate::product::{build_synchronous_product, ProcessModel};
    use crate::traits::Estimate;
    use crate::variant::SplitPointSolver;

    fn product(trace: &[&str], model: &[&str]) -> SynchronousProduct {
        build_synchronous_product(trace, &ProcessModel::sequence(model), &CostFunction::Standard)
            .unwrap()
    }

    #[test]
    fn dijkstra_aligns_one_deviation_each_side() {
        let sp = product(&["a", "c"], &["a", "b"]);
        let result = SearchEngine::new(&sp, ExecutionVariant::dijkstra()).run().unwrap();
        assert_eq!(result.cost, 20);
        assert_eq!(result.count(MoveKind::Synchronous), 1);
        assert_eq!(result.count(MoveKind::Log), 1);
        assert_eq!(result.count(MoveKind::Model), 1);
        assert_eq!(sp.replay(&result.firing_sequence).as_ref(), Some(sp.final_marking()));
        assert_eq!(result.stats.oracle_calls, 0);
    }

    #[test]
    fn perfect_fit_costs_nothing() {
        let sp = product(&["a", "b"], &["a", "b"]);
        let result = SearchEngine::new(&sp, ExecutionVariant::a_star()).run().unwrap();
        assert_eq!(result.cost, 0);
        assert_eq!(result.rendered(), vec!["(a, a)", "(b, b)"]);
    }

    #[test]
    fn bidirectional_meets_in_the_middle() {
        let sp = product(&["a", "x", "b", "c"], &["a", "b", "c"]);
        for &alternating in AlternatingMethod::ALL {
            for &termination in TerminationCriterion::ALL {
                for base in [ExecutionVariant::dijkstra(), ExecutionVariant::a_star()] {
                    let variant = base.bidirectional(alternating, termination);
                    let result = SearchEngine::new(&sp, variant).run().unwrap();
                    assert_eq!(result.cost, 10, "{variant}");
                    assert_eq!(
                        sp.replay(&result.firing_sequence).as_ref(),
                        Some(sp.final_marking()),
                        "{variant}"
                    );
                }
            }
        }
    }

    #[test]
    fn exact_witness_replaces_oracle_calls() {
        let sp = product(&["x", "y", "a"], &["a"]);
        let oracle = LabelDeficitOracle::forward(&sp).unwrap();
        let result = SearchEngine::new(&sp, ExecutionVariant::a_star())
            .with_oracle(&oracle)
            .run()
            .unwrap();
        assert_eq!(result.cost, 20);
        assert!(result.stats.derived_estimates > 0);
    }

    #[test]
    fn infeasible_estimates_are_counted_not_fatal() {
        let sp = product(&["a"], &["a"]);
        // trace token advanced while the model token has not
        let oracle = |m: &Marking| {
            if m.count(1) > 0 && m.count(2) > 0 {
                Estimate::infeasible()
            } else {
                Estimate::zero()
            }
        };
        let result = SearchEngine::new(&sp, ExecutionVariant::a_star())
            .with_oracle(&oracle)
            .run()
            .unwrap();
        assert_eq!(result.cost, 0);
        assert_eq!(result.stats.infeasible_estimates, 1);
        assert_eq!(result.stats.oracle_calls, 4);
    }

    struct Backed(SplitPointSolver);

    impl HeuristicOracle for Backed {
        fn estimate(&self, _marking: &Marking) -> Estimate {
            Estimate::zero()
        }

        fn backend(&self) -> Option<SplitPointSolver> {
            Some(self.0)
        }
    }

    #[test]
    fn oracle_backend_must_match_variant() {
        let sp = product(&["a"], &["b"]);
        let variant = ExecutionVariant::a_star()
            .with_split_point_solver(SplitPointSolver::Gurobi)
            .unwrap();
        let wrong = Backed(SplitPointSolver::CbcLp);
        let err = SearchEngine::new(&sp, variant).with_oracle(&wrong).run().unwrap_err();
        assert!(matches!(err, AlignError::InvalidConfiguration(_)));
        let right = Backed(SplitPointSolver::Gurobi);
        assert_eq!(
            SearchEngine::new(&sp, variant).with_oracle(&right).run().unwrap().cost,
            20
        );
    }

    #[test]
    fn expansion_limit_reports_exhaustion() {
        let sp = product(&["a", "b", "c"], &["x", "y", "z"]);
        let err = SearchEngine::new(&sp, ExecutionVariant::dijkstra())
            .with_expansion_limit(2)
            .run()
            .unwrap_err();
        assert_eq!(
            err,
            AlignError::SearchExhausted {
                expanded: 2,
                limit_reached: true
            }
        );
        assert!(err.is_no_result());
    }

    #[test]
    fn termination_sums_do_not_overflow() {
        let sp = product(&["a"], &["a"]);
        let hopeless = |_: &Marking| Estimate::infeasible();
        let fwd = DirectionalSearch::<AStarKey>::new(
            Direction::Forward,
            sp.net(),
            sp.costs(),
            &hopeless,
            sp.initial_marking().clone(),
            true,
        );
        let bwd = DirectionalSearch::<AStarKey>::new(
            Direction::Backward,
            sp.net(),
            sp.costs(),
            &ZERO,
            sp.final_marking().clone(),
            true,
        );
        assert!(termination_reached(
            TerminationCriterion::SymmetricLowerBounding,
            &fwd,
            &bwd,
            Cost::MAX
        ));
        assert!(termination_reached(
            TerminationCriterion::AverageFunction,
            &fwd,
            &fwd,
            Cost::MAX
        ));
        assert!(!termination_reached(
            TerminationCriterion::AverageFunction,
            &bwd,
            &bwd,
            1
        ));
    }
}
