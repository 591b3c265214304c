//! Minimal place/transition net primitives.
//!
//! Only what the search needs: weighted arcs, dense markings, enabling,
//! firing and reversal. Markings are token-count vectors indexed by
//! [`PlaceId`], so equality and hashing are by multiset content.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AlignError;

pub type PlaceId = usize;
pub type TransitionId = usize;
pub type Weight = u32;

/// Token distribution over the places of one net.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Marking {
    tokens: Vec<u32>,
}

impl Marking {
    /// All-zero marking over `num_places` places.
    pub fn empty(num_places: usize) -> Self {
        Self {
            tokens: vec![0; num_places],
        }
    }

    /// One token on each listed place (repeats accumulate).
    ///
    /// A place at or past `num_places` widens the marking to cover it, so
    /// [`PetriNet::check_marking`] rejects it against the intended net.
    pub fn from_places(num_places: usize, places: &[PlaceId]) -> Self {
        let mut marking = Self::empty(num_places);
        for &p in places {
            marking.add(p, 1);
        }
        marking
    }

    /// Explicit `(place, count)` pairs. Out-of-range places widen the
    /// marking as in [`Marking::from_places`]; counts saturate.
    pub fn from_counts(num_places: usize, counts: &[(PlaceId, u32)]) -> Self {
        let mut marking = Self::empty(num_places);
        for &(p, n) in counts {
            marking.add(p, n);
        }
        marking
    }

    fn add(&mut self, place: PlaceId, n: u32) {
        if place >= self.tokens.len() {
            self.tokens.resize(place + 1, 0);
        }
        self.tokens[place] = self.tokens[place].saturating_add(n);
    }

    #[inline]
    pub fn count(&self, place: PlaceId) -> u32 {
        self.tokens.get(place).copied().unwrap_or(0)
    }

    /// Number of places this marking is defined over.
    #[inline]
    pub fn num_places(&self) -> usize {
        self.tokens.len()
    }

    pub fn total_tokens(&self) -> u64 {
        self.tokens.iter().map(|&n| u64::from(n)).sum()
    }

    pub fn tokens(&self) -> &[u32] {
        &self.tokens
    }

    /// Places holding at least one token, in index order.
    pub fn marked_places(&self) -> impl Iterator<Item = PlaceId> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter(|&(_, &n)| n > 0)
            .map(|(p, _)| p)
    }

    /// Juxtapose two markings: `self`'s places first, then `other`'s.
    pub fn concat(&self, other: &Marking) -> Marking {
        let mut tokens = Vec::with_capacity(self.tokens.len() + other.tokens.len());
        tokens.extend_from_slice(&self.tokens);
        tokens.extend_from_slice(&other.tokens);
        Marking { tokens }
    }
}

impl fmt::Display for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        let mut first = true;
        for (p, &n) in self.tokens.iter().enumerate() {
            if n == 0 {
                continue;
            }
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            if n == 1 {
                write!(f, "p{p}")?;
            } else {
                write!(f, "p{p}:{n}")?;
            }
        }
        f.write_str("]")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub name: String,
    /// Visible activity label; `None` for a silent (τ) transition.
    pub label: Option<String>,
    /// Consumed tokens: `(place, weight)`.
    pub inputs: Vec<(PlaceId, Weight)>,
    /// Produced tokens: `(place, weight)`.
    pub outputs: Vec<(PlaceId, Weight)>,
}

impl Transition {
    pub fn is_silent(&self) -> bool {
        self.label.is_none()
    }
}

/// A place/transition net without markings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetriNet {
    places: Vec<String>,
    transitions: Vec<Transition>,
}

impl PetriNet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_place(&mut self, name: impl Into<String>) -> PlaceId {
        self.places.push(name.into());
        self.places.len() - 1
    }

    /// Add a transition; `label = None` makes it silent.
    pub fn add_transition(&mut self, name: impl Into<String>, label: Option<&str>) -> TransitionId {
        self.transitions.push(Transition {
            name: name.into(),
            label: label.map(str::to_owned),
            inputs: Vec::new(),
            outputs: Vec::new(),
        });
        self.transitions.len() - 1
    }

    /// Arc `place -> transition` with the given weight.
    ///
    /// # Errors
    /// [`AlignError::InvalidConfiguration`] when `transition` is not in this
    /// net. Unknown places are reported later by [`PetriNet::validate`].
    pub fn add_input(
        &mut self,
        transition: TransitionId,
        place: PlaceId,
        weight: Weight,
    ) -> Result<(), AlignError> {
        self.transition_mut(transition)?.inputs.push((place, weight));
        Ok(())
    }

    /// Arc `transition -> place` with the given weight.
    ///
    /// # Errors
    /// As for [`PetriNet::add_input`].
    pub fn add_output(
        &mut self,
        transition: TransitionId,
        place: PlaceId,
        weight: Weight,
    ) -> Result<(), AlignError> {
        self.transition_mut(transition)?.outputs.push((place, weight));
        Ok(())
    }

    fn transition_mut(&mut self, id: TransitionId) -> Result<&mut Transition, AlignError> {
        let known = self.transitions.len();
        self.transitions.get_mut(id).ok_or_else(|| {
            AlignError::invalid_configuration(format!(
                "arc on unknown transition {id}, net has {known}"
            ))
        })
    }

    pub(crate) fn push_transition(&mut self, transition: Transition) -> TransitionId {
        self.transitions.push(transition);
        self.transitions.len() - 1
    }

    #[inline]
    pub fn num_places(&self) -> usize {
        self.places.len()
    }

    #[inline]
    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    pub fn place_name(&self, place: PlaceId) -> &str {
        &self.places[place]
    }

    pub fn places(&self) -> &[String] {
        &self.places
    }

    /// # Panics
    /// Panics if `id` is not a transition of this net.
    pub fn transition(&self, id: TransitionId) -> &Transition {
        &self.transitions[id]
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// # Panics
    /// Panics if `id` is not a transition of this net.
    pub fn is_enabled(&self, marking: &Marking, id: TransitionId) -> bool {
        self.transitions[id]
            .inputs
            .iter()
            .all(|&(p, w)| marking.count(p) >= w)
    }

    /// Transitions enabled at `marking`, in id order.
    pub fn enabled<'a>(&'a self, marking: &'a Marking) -> impl Iterator<Item = TransitionId> + 'a {
        (0..self.transitions.len()).filter(move |&t| self.is_enabled(marking, t))
    }

    /// Fire `id` at `marking`. The caller guarantees the transition is enabled.
    ///
    /// # Panics
    /// Panics if `id` is not a transition of this net or `marking` was not
    /// checked against it with [`PetriNet::check_marking`].
    pub fn fire(&self, marking: &Marking, id: TransitionId) -> Marking {
        debug_assert!(self.is_enabled(marking, id), "fired a disabled transition");
        let mut next = marking.clone();
        let t = &self.transitions[id];
        for &(p, w) in &t.inputs {
            next.tokens[p] -= w;
        }
        for &(p, w) in &t.outputs {
            next.tokens[p] = next.tokens[p].saturating_add(w);
        }
        next
    }

    /// Same places, every arc flipped. Firing `t` backwards in `self` is
    /// firing `t` forwards in the reversed net.
    pub fn reversed(&self) -> PetriNet {
        PetriNet {
            places: self.places.clone(),
            transitions: self
                .transitions
                .iter()
                .map(|t| Transition {
                    name: t.name.clone(),
                    label: t.label.clone(),
                    inputs: t.outputs.clone(),
                    outputs: t.inputs.clone(),
                })
                .collect(),
        }
    }

    /// Reject arcs that point past the place list.
    pub fn validate(&self) -> Result<(), AlignError> {
        for t in &self.transitions {
            for &(p, _) in t.inputs.iter().chain(&t.outputs) {
                if p >= self.places.len() {
                    return Err(AlignError::invalid_configuration(format!(
                        "transition '{}' has an arc to unknown place {p}",
                        t.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Reject a marking defined over a different number of places.
    pub fn check_marking(&self, marking: &Marking, what: &str) -> Result<(), AlignError> {
        if marking.num_places() != self.places.len() {
            return Err(AlignError::invalid_configuration(format!(
                "{what} marking covers {} places, net has {}",
                marking.num_places(),
                self.places.len()
            )));
        }
        Ok(())
    }
}
