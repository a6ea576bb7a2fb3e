//! # Finite-state transducers
//!
//! [`Fst`] is a deterministic Mealy machine (§4.5): every state has a
//! total transition function over the input alphabet, and every
//! transition carries one output symbol. There is no accepting-state
//! notion — every input string of the right alphabet produces an output
//! string, via [`Fst::process`].
//!
//! Construction mirrors [`crate::dfa::Dfa::new`]: every `(state, input
//! symbol)` pair must have exactly one entry, naming both the target
//! state and the symbol to emit.

pub mod eval;

use crate::error::BuildError;
use eval::FstEvaluator;
use std::collections::HashMap;
use std::rc::Rc;

/// One state of a [`Fst`]: for every input symbol, which state to move to
/// and which output symbol to emit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FstState {
    pub(crate) name: Rc<str>,
    pub(crate) transitions: Vec<(usize, Rc<str>)>,
}

impl FstState {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A deterministic finite-state transducer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fst {
    pub(crate) input_alphabet: Rc<[Rc<str>]>,
    pub(crate) output_alphabet: Rc<[Rc<str>]>,
    pub(crate) states: Vec<FstState>,
    pub(crate) initial_state: usize,
}

impl Fst {
    /// Validates and constructs a [`Fst`] from a transition/output table.
    ///
    /// `transitions` maps `(state, input symbol)` to `(target state,
    /// output symbol)`. Every state reachable from `start` must have an
    /// entry for every input symbol actually used in the table, and every
    /// target/output named must itself be a known state/output symbol.
    ///
    /// # Errors
    /// See [`BuildError`] for every rejected-construction category.
    pub fn new(
        transitions: &HashMap<(String, String), (String, String)>,
        start: &str,
    ) -> Result<Fst, BuildError> {
        for (_, sym) in transitions.keys() {
            if sym.chars().count() != 1 {
                return Err(BuildError::SymbolArity(sym.clone()));
            }
        }
        for (_, out) in transitions.values() {
            if out.chars().count() != 1 {
                return Err(BuildError::SymbolArity(out.clone()));
            }
        }

        let mut input_alphabet: Vec<String> =
            transitions.keys().map(|(_, sym)| sym.clone()).collect();
        input_alphabet.sort();
        input_alphabet.dedup();

        let mut output_alphabet: Vec<String> = transitions
            .values()
            .map(|(_, out)| out.clone())
            .collect();
        output_alphabet.sort();
        output_alphabet.dedup();

        let mut state_names: Vec<String> = transitions
            .keys()
            .map(|(s, _)| s.clone())
            .chain(transitions.values().map(|(s, _)| s.clone()))
            .chain(std::iter::once(start.to_string()))
            .collect();
        state_names.sort();
        state_names.dedup();

        if !state_names.contains(&start.to_string()) {
            return Err(BuildError::StartNotInStates(start.to_string()));
        }

        let index_of: HashMap<&str, usize> = state_names
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_str(), i))
            .collect();

        let mut states: Vec<FstState> = state_names
            .iter()
            .map(|name| FstState {
                name: Rc::from(name.as_str()),
                transitions: Vec::new(),
            })
            .collect();

        for state in &state_names {
            for symbol in &input_alphabet {
                let key = (state.clone(), symbol.clone());
                let Some((target, output)) = transitions.get(&key) else {
                    return Err(BuildError::MissingCase {
                        state: state.clone(),
                        symbol: symbol.clone(),
                    });
                };
                let &target_idx = index_of.get(target.as_str()).ok_or_else(|| {
                    BuildError::RangeViolation {
                        from: state.clone(),
                        symbol: symbol.clone(),
                        to: target.clone(),
                    }
                })?;
                let idx = *index_of.get(state.as_str()).unwrap();
                let sym_idx = input_alphabet.iter().position(|s| s == symbol).unwrap();
                let row = &mut states[idx].transitions;
                if row.len() <= sym_idx {
                    row.resize(
                        input_alphabet.len(),
                        (0, Rc::from("")),
                    );
                }
                row[sym_idx] = (target_idx, Rc::from(output.as_str()));
            }
        }

        Ok(Fst {
            input_alphabet: input_alphabet.iter().map(|s| Rc::from(s.as_str())).collect(),
            output_alphabet: output_alphabet.iter().map(|s| Rc::from(s.as_str())).collect(),
            states,
            initial_state: *index_of.get(start).unwrap(),
        })
    }

    pub fn input_alphabet(&self) -> &[Rc<str>] {
        &self.input_alphabet
    }

    pub fn output_alphabet(&self) -> &[Rc<str>] {
        &self.output_alphabet
    }

    pub fn states(&self) -> &[FstState] {
        &self.states
    }

    pub fn initial_state(&self) -> &FstState {
        &self.states[self.initial_state]
    }

    pub fn evaluator(&self) -> FstEvaluator<'_> {
        FstEvaluator::new(self)
    }

    /// Runs `w` through the machine from the initial state, concatenating
    /// the output symbol emitted at every step.
    ///
    /// # Errors
    /// Returns [`crate::error::AlphabetError`] the moment a symbol outside
    /// the input alphabet is read; no output has been produced for it.
    pub fn process(&self, w: &[&str]) -> Result<String, crate::error::AlphabetError> {
        let mut ev = self.evaluator();
        let mut out = String::new();
        for &sym in w {
            out.push_str(ev.step(sym).ok_or_else(|| crate::error::AlphabetError::new(sym))?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_complement() -> Fst {
        let mut transitions = HashMap::new();
        transitions.insert(
            ("q0".to_string(), "0".to_string()),
            ("q0".to_string(), "1".to_string()),
        );
        transitions.insert(
            ("q0".to_string(), "1".to_string()),
            ("q0".to_string(), "0".to_string()),
        );
        Fst::new(&transitions, "q0").unwrap()
    }

    #[test]
    fn complements_each_bit() {
        let fst = binary_complement();
        assert_eq!(fst.process(&["0", "0", "1", "0"]).unwrap(), "1101");
    }

    #[test]
    fn missing_case_is_rejected() {
        // q1 is reachable as a target but never given its own "0" entry.
        let mut transitions = HashMap::new();
        transitions.insert(
            ("q0".to_string(), "0".to_string()),
            ("q1".to_string(), "1".to_string()),
        );
        assert!(matches!(
            Fst::new(&transitions, "q0"),
            Err(BuildError::MissingCase { .. })
        ));
    }

    #[test]
    fn multi_character_symbol_is_rejected() {
        let mut transitions = HashMap::new();
        transitions.insert(
            ("q0".to_string(), "ab".to_string()),
            ("q0".to_string(), "1".to_string()),
        );
        assert!(matches!(
            Fst::new(&transitions, "q0"),
            Err(BuildError::SymbolArity(_))
        ));

        let mut transitions = HashMap::new();
        transitions.insert(
            ("q0".to_string(), "0".to_string()),
            ("q0".to_string(), "cd".to_string()),
        );
        assert!(matches!(
            Fst::new(&transitions, "q0"),
            Err(BuildError::SymbolArity(_))
        ));
    }

    #[test]
    fn stray_input_symbol_is_rejected() {
        let fst = binary_complement();
        assert!(fst.process(&["0", "2"]).is_err());
    }
}
