//! Trace nets and the synchronous product.
//!
//! The product juxtaposes a trace net and a process model. Its places are
//! the trace places followed by the model places; its transitions are
//! - one log move per trace event,
//! - one model move per model transition (τ for silent ones),
//! - one synchronous move per (event, visible model transition) with equal labels.
//!
//! Every product transition carries its [`Move`] and its [`Cost`].

use rustc_hash::FxHashSet;

use crate::cost::{Cost, CostFunction};
use crate::error::AlignError;
use crate::moves::{Move, MoveLabel, SKIP};
use crate::net::{Marking, PetriNet, PlaceId, Transition, TransitionId};

/// A net with its initial and final marking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessModel {
    pub net: PetriNet,
    pub initial_marking: Marking,
    pub final_marking: Marking,
}

impl ProcessModel {
    pub fn new(
        net: PetriNet,
        initial_marking: Marking,
        final_marking: Marking,
    ) -> Result<Self, AlignError> {
        net.validate()?;
        net.check_marking(&initial_marking, "initial")?;
        net.check_marking(&final_marking, "final")?;
        Ok(Self {
            net,
            initial_marking,
            final_marking,
        })
    }

    /// Chain model accepting exactly `labels` in order.
    pub fn sequence<S: AsRef<str>>(labels: &[S]) -> Self {
        chain("p", "t", labels)
    }
}

/// Trace net of `trace`: `p0 -t0-> p1 -t1-> ... pn`, initial `[p0]`, final `[pn]`.
pub fn trace_net<S: AsRef<str>>(trace: &[S]) -> ProcessModel {
    chain("trace_p", "trace_t", trace)
}

fn chain<S: AsRef<str>>(place_prefix: &str, transition_prefix: &str, labels: &[S]) -> ProcessModel {
    let mut net = PetriNet::new();
    let mut prev = net.add_place(format!("{place_prefix}0"));
    let first = prev;
    for (i, label) in labels.iter().enumerate() {
        let next = net.add_place(format!("{place_prefix}{}", i + 1));
        net.push_transition(Transition {
            name: format!("{transition_prefix}{i}"),
            label: Some(label.as_ref().to_owned()),
            inputs: vec![(prev, 1)],
            outputs: vec![(next, 1)],
        });
        prev = next;
    }
    let n = net.num_places();
    ProcessModel {
        initial_marking: Marking::from_places(n, &[first]),
        final_marking: Marking::from_places(n, &[prev]),
        net,
    }
}

/// Where the trace lives inside a product built by [`build_synchronous_product`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceLayout {
    /// Trace labels in order.
    pub labels: Vec<String>,
    /// Product transition of the log move for each trace position.
    pub log_transitions: Vec<TransitionId>,
    /// Whether some visible model transition carries the label at each position.
    pub matchable: Vec<bool>,
}

impl TraceLayout {
    /// Trace place `i` holds the token once `i` events are replayed.
    #[inline]
    pub fn place_of_position(&self, position: usize) -> PlaceId {
        position
    }

    /// Replayed prefix length at `marking`, or `None` if no trace place is marked.
    pub fn position(&self, marking: &Marking) -> Option<usize> {
        (0..=self.labels.len()).find(|&i| marking.count(self.place_of_position(i)) > 0)
    }
}

/// A searchable net whose transitions are alignment moves with costs.
#[derive(Clone, Debug)]
pub struct SynchronousProduct {
    net: PetriNet,
    moves: Vec<Move>,
    costs: Vec<Cost>,
    initial_marking: Marking,
    final_marking: Marking,
    trace: Option<TraceLayout>,
}

impl SynchronousProduct {
    /// Assemble a product from hand-built parts, pricing it with `costs`.
    ///
    /// `moves[t]` labels transition `t`. Every move is validated and must be
    /// priced by `costs`.
    pub fn from_parts(
        net: PetriNet,
        moves: Vec<Move>,
        costs: &CostFunction,
        initial_marking: Marking,
        final_marking: Marking,
    ) -> Result<Self, AlignError> {
        net.validate()?;
        net.check_marking(&initial_marking, "initial")?;
        net.check_marking(&final_marking, "final")?;
        if moves.len() != net.num_transitions() {
            return Err(AlignError::invalid_configuration(format!(
                "{} moves for {} transitions",
                moves.len(),
                net.num_transitions()
            )));
        }
        let priced = price(&net, &moves, costs)?;
        Ok(Self {
            net,
            moves,
            costs: priced,
            initial_marking,
            final_marking,
            trace: None,
        })
    }

    pub fn net(&self) -> &PetriNet {
        &self.net
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    #[inline]
    pub fn move_of(&self, t: TransitionId) -> &Move {
        &self.moves[t]
    }

    #[inline]
    pub fn cost(&self, t: TransitionId) -> Cost {
        self.costs[t]
    }

    pub fn costs(&self) -> &[Cost] {
        &self.costs
    }

    pub fn initial_marking(&self) -> &Marking {
        &self.initial_marking
    }

    pub fn final_marking(&self) -> &Marking {
        &self.final_marking
    }

    /// Present only for products built from a trace.
    pub fn trace_layout(&self) -> Option<&TraceLayout> {
        self.trace.as_ref()
    }

    /// Moves labelling a firing sequence.
    pub fn decode(&self, firing_sequence: &[TransitionId]) -> Vec<Move> {
        firing_sequence
            .iter()
            .map(|&t| self.moves[t].clone())
            .collect()
    }

    /// Fire `firing_sequence` from the initial marking; `None` as soon as a
    /// transition is not enabled.
    pub fn replay(&self, firing_sequence: &[TransitionId]) -> Option<Marking> {
        let mut marking = self.initial_marking.clone();
        for &t in firing_sequence {
            if !self.net.is_enabled(&marking, t) {
                return None;
            }
            marking = self.net.fire(&marking, t);
        }
        Some(marking)
    }

    /// Total cost of a firing sequence.
    pub fn path_cost(&self, firing_sequence: &[TransitionId]) -> Cost {
        firing_sequence
            .iter()
            .fold(0, |acc: Cost, &t| acc.saturating_add(self.costs[t]))
    }
}

fn price(net: &PetriNet, moves: &[Move], costs: &CostFunction) -> Result<Vec<Cost>, AlignError> {
    net.transitions()
        .iter()
        .zip(moves)
        .map(|(t, mv)| {
            mv.validate(&t.name)?;
            costs.cost_of(&t.name, mv)
        })
        .collect()
}

/// Build the synchronous product of `trace` and `model`, priced by `costs`.
pub fn build_synchronous_product<S: AsRef<str>>(
    trace: &[S],
    model: &ProcessModel,
    costs: &CostFunction,
) -> Result<SynchronousProduct, AlignError> {
    model.net.validate()?;
    model.net.check_marking(&model.initial_marking, "initial")?;
    model.net.check_marking(&model.final_marking, "final")?;

    let log_side = trace_net(trace);
    let offset = log_side.net.num_places();
    let model_labels: FxHashSet<&str> = model
        .net
        .transitions()
        .iter()
        .filter_map(|t| t.label.as_deref())
        .collect();

    let mut net = PetriNet::new();
    for name in log_side.net.places() {
        net.add_place(name.clone());
    }
    for name in model.net.places() {
        net.add_place(name.clone());
    }

    let shift = |arcs: &[(PlaceId, u32)]| -> Vec<(PlaceId, u32)> {
        arcs.iter().map(|&(p, w)| (p + offset, w)).collect()
    };

    let mut moves = Vec::new();
    let mut layout = TraceLayout {
        labels: Vec::with_capacity(trace.len()),
        log_transitions: Vec::with_capacity(trace.len()),
        matchable: Vec::with_capacity(trace.len()),
    };

    for (i, event) in log_side.net.transitions().iter().enumerate() {
        let label = event.label.clone().unwrap_or_default();
        let t = net.push_transition(Transition {
            name: format!("({}, {})", event.name, SKIP),
            label: Some(label.clone()),
            inputs: event.inputs.clone(),
            outputs: event.outputs.clone(),
        });
        moves.push(Move::log_move(label.clone()));
        debug_assert_eq!(t, moves.len() - 1);
        layout.log_transitions.push(t);
        layout.matchable.push(model_labels.contains(label.as_str()));
        layout.labels.push(label);
        debug_assert_eq!(layout.place_of_position(i), event.inputs[0].0);
    }

    for model_t in model.net.transitions() {
        net.push_transition(Transition {
            name: format!("({}, {})", SKIP, model_t.name),
            label: model_t.label.clone(),
            inputs: shift(&model_t.inputs),
            outputs: shift(&model_t.outputs),
        });
        moves.push(match &model_t.label {
            Some(label) => Move::model_move(label.clone()),
            None => Move::silent_move(),
        });
    }

    for event in log_side.net.transitions() {
        for model_t in model.net.transitions() {
            if model_t.label.is_none() || model_t.label != event.label {
                continue;
            }
            let mut inputs = event.inputs.clone();
            inputs.extend(shift(&model_t.inputs));
            let mut outputs = event.outputs.clone();
            outputs.extend(shift(&model_t.outputs));
            net.push_transition(Transition {
                name: format!("({}, {})", event.name, model_t.name),
                label: model_t.label.clone(),
                inputs,
                outputs,
            });
            moves.push(Move {
                log: MoveLabel::Visible(event.label.clone().unwrap_or_default()),
                model: MoveLabel::Visible(model_t.label.clone().unwrap_or_default()),
            });
        }
    }

    let costs = price(&net, &moves, costs)?;
    Ok(SynchronousProduct {
        initial_marking: log_side.initial_marking.concat(&model.initial_marking),
        final_marking: log_side.final_marking.concat(&model.final_marking),
        net,
        moves,
        costs,
        trace: Some(layout),
    })
}
