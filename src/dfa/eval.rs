//! Step-by-step evaluation of a string against a [`Dfa`](super::Dfa).

use crate::dfa::{Dfa, DfaState};
use std::collections::HashMap;

/// Tracks the current state of a [`Dfa`] while consuming a string.
#[derive(Clone, Debug)]
pub struct DfaEvaluator<'a> {
    dfa: &'a Dfa,
    rev_map: HashMap<&'a str, usize>,
    current_state: Option<usize>,
}

impl<'a> DfaEvaluator<'a> {
    pub(crate) fn new(dfa: &'a Dfa) -> Self {
        let rev_map = dfa
            .alphabet
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_ref(), i))
            .collect();
        DfaEvaluator {
            dfa,
            rev_map,
            current_state: Some(dfa.initial_state),
        }
    }

    pub fn is_accepting(&self) -> bool {
        self.current_state().is_some_and(DfaState::is_accepting)
    }

    pub fn current_state(&self) -> Option<&DfaState> {
        self.current_state.map(|i| &self.dfa.states[i])
    }

    /// Advances by one symbol. Returns `None`, and leaves the evaluator
    /// permanently unknown, if `elem` is outside the alphabet.
    pub fn step(&mut self, elem: &str) -> Option<&DfaState> {
        let idx = self.current_state?;
        let &sym = self.rev_map.get(elem)?;
        let next = self.dfa.states[idx].transitions[sym];
        self.current_state = Some(next);
        Some(&self.dfa.states[next])
    }

    pub fn step_multiple(&mut self, elems: &[&str]) -> Option<&DfaState> {
        for e in elems {
            self.step(e)?;
        }
        self.current_state()
    }
}
