//! Step-by-step evaluation of a [`Fst`](super::Fst), mirroring
//! [`crate::dfa::eval::DfaEvaluator`].

use crate::fst::{Fst, FstState};
use std::collections::HashMap;

/// Tracks the current state of a [`Fst`] while consuming input.
#[derive(Clone, Debug)]
pub struct FstEvaluator<'a> {
    fst: &'a Fst,
    rev_map: HashMap<&'a str, usize>,
    current_state: usize,
}

impl<'a> FstEvaluator<'a> {
    pub(crate) fn new(fst: &'a Fst) -> Self {
        let rev_map = fst
            .input_alphabet
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_ref(), i))
            .collect();
        FstEvaluator {
            fst,
            rev_map,
            current_state: fst.initial_state,
        }
    }

    pub fn current_state(&self) -> &FstState {
        &self.fst.states[self.current_state]
    }

    /// Advances by one symbol, returning the output symbol emitted.
    /// Returns `None`, and leaves the evaluator unchanged, if `elem` is
    /// outside the input alphabet.
    pub fn step(&mut self, elem: &str) -> Option<&'a str> {
        let &sym = self.rev_map.get(elem)?;
        let (next, output) = &self.fst.states[self.current_state].transitions[sym];
        self.current_state = *next;
        Some(output.as_ref())
    }
}
