use std::collections::HashMap;

use spn_align::{
    build_synchronous_product, AlignError, AlignerBuilder, CostClass, CostFunction, ExecutionVariant,
    Move, MoveDefect, MoveKind, ProcessModel,
};

#[test]
fn default_costs_by_move_kind() {
    let model = ProcessModel::sequence(&["a", "b", "c"]);
    let product = build_synchronous_product(&["a", "x", "c"], &model, &CostFunction::Standard).unwrap();
    for (t, mv) in product.moves().iter().enumerate() {
        let expected = match mv.kind() {
            MoveKind::Synchronous => 0,
            MoveKind::Log | MoveKind::Model => 10,
        };
        assert_eq!(product.cost(t), expected, "{mv}");
    }
}

#[test]
fn class_overrides_reprice_the_alignment() {
    let costs = CostFunction::PerClass(HashMap::from([
        (CostClass::Log, 1),
        (CostClass::Model, 100),
        (CostClass::Synchronous, 0),
        (CostClass::Indecisive, 0),
    ]));
    let model = ProcessModel::sequence(&["a", "b"]);
    let aligner = AlignerBuilder::new()
        .with_variant(ExecutionVariant::dijkstra())
        .with_costs(costs)
        .build();
    let result = aligner.align(&["a", "c"], &model).unwrap();
    assert_eq!(result.cost, 101);

    // nothing matches: two log moves and two model moves
    let result = aligner.align(&["c", "d"], &model).unwrap();
    assert_eq!(result.cost, 202);
}

#[test]
fn incomplete_class_table_is_an_error() {
    let costs = CostFunction::PerClass(HashMap::from([(CostClass::Log, 5)]));
    let model = ProcessModel::sequence(&["a"]);
    let err = build_synchronous_product(&["a"], &model, &costs).unwrap_err();
    assert!(matches!(
        err,
        AlignError::InvalidMove {
            reason: MoveDefect::MissingCost,
            ..
        }
    ));
    assert!(!err.is_no_result());
}

#[test]
fn per_move_table_prices_individual_moves() {
    let costs = CostFunction::PerMove(HashMap::from([
        (Move::log_move("a"), 3),
        (Move::model_move("a"), 4),
        (Move::synchronous("a"), 0),
        (Move::log_move("b"), 1),
    ]));
    let model = ProcessModel::sequence(&["a"]);
    let aligner = AlignerBuilder::new().with_costs(costs).build();
    assert_eq!(aligner.align(&["a", "b"], &model).unwrap().cost, 1);
    assert_eq!(aligner.align(&["b"], &model).unwrap().cost, 5);

    // no entry for a log move on "c"
    let err = aligner.align(&["c"], &model).unwrap_err();
    assert!(matches!(err, AlignError::InvalidMove { .. }));
}

#[test]
fn unit_cost_keeps_synchronous_moves_free() {
    let model = ProcessModel::sequence(&["a", "b"]);
    let aligner = AlignerBuilder::new().with_costs(CostFunction::with_unit(7)).build();
    assert_eq!(aligner.align(&["a", "b"], &model).unwrap().cost, 0);
    assert_eq!(aligner.align(&["a"], &model).unwrap().cost, 7);
    assert_eq!(aligner.align(&["b", "a"], &model).unwrap().cost, 14);
}
