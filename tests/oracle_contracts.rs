use std::cell::Cell;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use proptest::prelude::*;
use spn_align::{
    build_synchronous_product, AlternatingMethod, CostFunction, Estimate, ExecutionVariant,
    HeuristicOracle, LabelDeficitOracle, Marking, PetriNet, ProcessModel, SearchEngine,
    SplitPointSolver, SynchronousProduct, TerminationCriterion, ZeroOracle,
};

/// Same estimates as the wrapped oracle, but never vouches for its witness.
struct Opaque<O>(O);

impl<O: HeuristicOracle> HeuristicOracle for Opaque<O> {
    fn estimate(&self, marking: &Marking) -> Estimate {
        self.0.estimate(marking)
    }
}

/// Counts its calls through interior mutability.
#[derive(Default)]
struct Counting {
    calls: Cell<usize>,
}

impl HeuristicOracle for Counting {
    fn estimate(&self, _marking: &Marking) -> Estimate {
        self.calls.set(self.calls.get() + 1);
        Estimate::zero()
    }

    fn backend(&self) -> Option<SplitPointSolver> {
        Some(SplitPointSolver::GlpkLp)
    }
}

/// Table of exact remaining costs. With `zero_on_odd` set, markings of odd
/// weighted parity report 0 instead: still admissible, no longer consistent.
struct Tabled {
    table: HashMap<Marking, u64>,
    zero_on_odd: bool,
}

impl HeuristicOracle for Tabled {
    fn estimate(&self, marking: &Marking) -> Estimate {
        let odd = marking
            .tokens()
            .iter()
            .enumerate()
            .map(|(i, &n)| i * n as usize)
            .sum::<usize>()
            % 2
            == 1;
        match self.table.get(marking) {
            Some(_) if self.zero_on_odd && odd => Estimate::zero(),
            Some(&h) => Estimate::feasible(h, Vec::new()),
            None => Estimate::infeasible(),
        }
    }
}

type Edges = HashMap<Marking, Vec<(Marking, u64)>>;

fn reachable(net: &PetriNet, from: &Marking) -> HashSet<Marking> {
    let mut seen = HashSet::from([from.clone()]);
    let mut stack = vec![from.clone()];
    while let Some(m) = stack.pop() {
        for t in net.enabled(&m) {
            let next = net.fire(&m, t);
            if seen.insert(next.clone()) {
                stack.push(next);
            }
        }
    }
    seen
}

fn shortest(from: &Marking, edges: &Edges) -> HashMap<Marking, u64> {
    let mut dist = HashMap::from([(from.clone(), 0)]);
    let mut heap = BinaryHeap::from([Reverse((0u64, from.clone()))]);
    while let Some(Reverse((d, m))) = heap.pop() {
        if dist.get(&m).is_some_and(|&best| best < d) {
            continue;
        }
        for (next, c) in edges.get(&m).into_iter().flatten() {
            let nd = d + c;
            if dist.get(next).map_or(true, |&best| nd < best) {
                dist.insert(next.clone(), nd);
                heap.push(Reverse((nd, next.clone())));
            }
        }
    }
    dist
}

/// Exact forward (to the final marking) and backward (from the initial
/// marking) distances over every marking either search can visit.
fn exact_tables(sp: &SynchronousProduct) -> (HashMap<Marking, u64>, HashMap<Marking, u64>) {
    let net = sp.net();
    let mut states = reachable(net, sp.initial_marking());
    states.extend(reachable(&net.reversed(), sp.final_marking()));
    let mut forward = Edges::new();
    let mut backward = Edges::new();
    for m in &states {
        for t in net.enabled(m) {
            let next = net.fire(m, t);
            forward.entry(m.clone()).or_default().push((next.clone(), sp.cost(t)));
            backward.entry(next).or_default().push((m.clone(), sp.cost(t)));
        }
    }
    (shortest(sp.final_marking(), &backward), shortest(sp.initial_marking(), &forward))
}

fn assert_strong_oracles_stay_optimal(sp: &SynchronousProduct) -> Result<(), TestCaseError> {
    let baseline = SearchEngine::new(sp, ExecutionVariant::dijkstra()).run().unwrap().cost;
    let (to_final, from_initial) = exact_tables(sp);
    for zero_on_odd in [false, true] {
        let forward = Tabled { table: to_final.clone(), zero_on_odd };
        let backward = Tabled { table: from_initial.clone(), zero_on_odd };
        for &alternating in AlternatingMethod::ALL {
            for &termination in TerminationCriterion::ALL {
                let variant = ExecutionVariant::a_star().bidirectional(alternating, termination);
                let result = SearchEngine::new(sp, variant)
                    .with_oracle(&forward)
                    .with_backward_oracle(&backward)
                    .run()
                    .unwrap();
                prop_assert_eq!(result.cost, baseline, "{} zero_on_odd={}", variant, zero_on_odd);
                prop_assert_eq!(sp.path_cost(&result.firing_sequence), baseline);
            }
        }
    }
    Ok(())
}

/// `a`, then `b` or a silent skip, then `c`.
fn optional_b_model() -> ProcessModel {
    let mut net = PetriNet::new();
    let p: Vec<_> = (0..4).map(|i| net.add_place(format!("p{i}"))).collect();
    for (name, label, from, to) in [
        ("a", Some("a"), 0, 1),
        ("b", Some("b"), 1, 2),
        ("skip_b", None, 1, 2),
        ("c", Some("c"), 2, 3),
    ] {
        let t = net.add_transition(name, label);
        net.add_input(t, p[from], 1).unwrap();
        net.add_output(t, p[to], 1).unwrap();
    }
    ProcessModel::new(net, Marking::from_places(4, &[p[0]]), Marking::from_places(4, &[p[3]])).unwrap()
}

fn labels(s: &str) -> Vec<String> {
    s.chars().map(|c| c.to_string()).collect()
}

fn product(trace: &[String], model: &[String]) -> SynchronousProduct {
    build_synchronous_product(trace, &ProcessModel::sequence(model), &CostFunction::Standard).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn derived_estimates_do_not_change_the_cost(trace in "[abxy]{0,7}", model in "[ab]{0,4}") {
        let sp = product(&labels(&trace), &labels(&model));
        let deficit = LabelDeficitOracle::forward(&sp).unwrap();
        let opaque = Opaque(LabelDeficitOracle::forward(&sp).unwrap());

        let derived = SearchEngine::new(&sp, ExecutionVariant::a_star()).with_oracle(&deficit).run().unwrap();
        let direct = SearchEngine::new(&sp, ExecutionVariant::a_star()).with_oracle(&opaque).run().unwrap();
        let uninformed = SearchEngine::new(&sp, ExecutionVariant::dijkstra()).run().unwrap();

        prop_assert_eq!(derived.cost, direct.cost);
        prop_assert_eq!(derived.cost, uninformed.cost);
        prop_assert_eq!(direct.stats.derived_estimates, 0);
        prop_assert_eq!(
            derived.stats.oracle_calls + derived.stats.derived_estimates,
            direct.stats.oracle_calls
        );
    }

    #[test]
    fn f_never_decreases_along_the_alignment(trace in "[abxy]{0,7}", model in "[abc]{0,4}") {
        let sp = product(&labels(&trace), &labels(&model));
        let oracle = LabelDeficitOracle::forward(&sp).unwrap();
        let result = SearchEngine::new(&sp, ExecutionVariant::a_star()).with_oracle(&oracle).run().unwrap();

        let mut marking = sp.initial_marking().clone();
        let mut g = 0u64;
        let mut f = oracle.estimate(&marking).h;
        for &t in &result.firing_sequence {
            marking = sp.net().fire(&marking, t);
            let child_g = g + sp.cost(t);
            prop_assert!(child_g >= g);
            let child_f = child_g + oracle.estimate(&marking).h;
            prop_assert!(child_f >= f);
            g = child_g;
            f = child_f;
        }
        prop_assert_eq!(g, result.cost);
        prop_assert_eq!(oracle.estimate(&marking).h, 0);
    }

    #[test]
    fn backward_oracles_keep_bidirectional_search_optimal(trace in "[abxy]{0,6}", model in "[ab]{0,4}") {
        let sp = product(&labels(&trace), &labels(&model));
        let forward = LabelDeficitOracle::forward(&sp).unwrap();
        let backward = LabelDeficitOracle::backward(&sp).unwrap();
        let baseline = SearchEngine::new(&sp, ExecutionVariant::dijkstra()).run().unwrap().cost;
        for &termination in TerminationCriterion::ALL {
            let variant = ExecutionVariant::a_star().bidirectional(AlternatingMethod::StrictlyAlternate, termination);
            let result = SearchEngine::new(&sp, variant)
                .with_oracle(&forward)
                .with_backward_oracle(&backward)
                .run()
                .unwrap();
            prop_assert_eq!(result.cost, baseline, "{}", variant);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn exact_and_inconsistent_oracles_keep_bidirectional_search_optimal_on_sequences(
        trace in "[abxy]{0,5}",
        model in "[ab]{0,4}",
    ) {
        let sp = product(&labels(&trace), &labels(&model));
        assert_strong_oracles_stay_optimal(&sp)?;
    }

    #[test]
    fn exact_and_inconsistent_oracles_keep_bidirectional_search_optimal_on_choices(trace in "[abcx]{0,5}") {
        let sp = build_synchronous_product(&labels(&trace), &optional_b_model(), &CostFunction::Standard).unwrap();
        assert_strong_oracles_stay_optimal(&sp)?;
    }
}

#[test]
fn dijkstra_never_consults_the_oracle() {
    let sp = product(&labels("abc"), &labels("acb"));
    let counting = Counting::default();
    let result = SearchEngine::new(&sp, ExecutionVariant::dijkstra())
        .with_oracle(&counting)
        .run()
        .unwrap();
    assert_eq!(result.cost, 20);
    assert_eq!(counting.calls.get(), 0);
    assert_eq!(result.stats.oracle_calls, 0);
}

#[test]
fn a_star_consults_once_per_generated_state() {
    let sp = product(&labels("abc"), &labels("acb"));
    let counting = Counting::default();
    let variant = ExecutionVariant::a_star()
        .with_split_point_solver(SplitPointSolver::GlpkLp)
        .unwrap();
    let result = SearchEngine::new(&sp, variant).with_oracle(&counting).run().unwrap();
    assert_eq!(result.cost, 20);
    // the root plus every pushed child
    assert_eq!(counting.calls.get(), result.stats.generated + 1);
    assert_eq!(result.stats.oracle_calls, counting.calls.get());
}

#[test]
fn mismatched_backward_backend_is_rejected() {
    let sp = product(&labels("ab"), &labels("ab"));
    let counting = Counting::default();
    let variant = ExecutionVariant::a_star()
        .bidirectional(AlternatingMethod::LowestGCost, TerminationCriterion::AverageFunction)
        .with_split_point_solver(SplitPointSolver::CbcMi)
        .unwrap();
    let err = SearchEngine::new(&sp, variant)
        .with_oracle(&ZeroOracle)
        .with_backward_oracle(&counting)
        .run()
        .unwrap_err();
    assert!(matches!(err, spn_align::AlignError::InvalidConfiguration(_)));
    assert_eq!(counting.calls.get(), 0);
}
