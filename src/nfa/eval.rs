//! Step-by-step evaluation of a string against a [`Nfa`](super::Nfa).
//!
//! Mirrors the evaluator pattern used throughout this crate (see
//! [`crate::dfa::eval`]): an evaluator owns the automaton's current
//! configuration — here, the ε-closed set of active states — and advances
//! it one symbol at a time.

use crate::nfa::{Nfa, NfaState};
use std::collections::{HashMap, HashSet};

/// Tracks the set of states a [`Nfa`] is simultaneously in while consuming
/// a string, including the ε-closure after every step.
#[derive(Clone, Debug)]
pub struct NfaEvaluator<'a> {
    nfa: &'a Nfa,
    rev_map: HashMap<&'a str, usize>,
    current_states: HashSet<usize>,
}

impl<'a> NfaEvaluator<'a> {
    pub(crate) fn new(nfa: &'a Nfa) -> Self {
        let rev_map = nfa
            .alphabet
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.as_ref(), idx))
            .collect();
        let current_states = nfa.eps_closure(&HashSet::from([nfa.initial_state]));
        NfaEvaluator {
            nfa,
            rev_map,
            current_states,
        }
    }

    /// Whether any currently-active state is accepting.
    pub fn is_accepting(&self) -> bool {
        self.current_states
            .iter()
            .any(|&s| self.nfa.states[s].accepting)
    }

    /// The currently-active states (already ε-closed).
    pub fn current_states(&self) -> Vec<&NfaState> {
        self.current_states
            .iter()
            .map(|&i| &self.nfa.states[i])
            .collect()
    }

    /// Advances the evaluator by one symbol. Returns `None` if `elem` is
    /// not a member of the alphabet, leaving the evaluator unchanged.
    pub fn step(&mut self, elem: &str) -> Option<()> {
        let &idx = self.rev_map.get(elem)?;
        let stepped: HashSet<usize> = self
            .current_states
            .iter()
            .flat_map(|&s| self.nfa.states[s].transitions[idx].iter().copied())
            .collect();
        self.current_states = self.nfa.eps_closure(&stepped);
        Some(())
    }

    /// Advances the evaluator through every symbol in `elems`, in order.
    pub fn step_multiple(&mut self, elems: &[&str]) -> Option<()> {
        elems.iter().try_for_each(|e| self.step(e))
    }
}
