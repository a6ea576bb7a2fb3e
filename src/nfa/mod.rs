//! # Nondeterministic finite automaton (with or without ε-moves)
//!
//! [`Nfa`] is the tuple (Q, Σ, δ, q₀, F) of §3/§4.3 of the specification:
//! δ maps a (state, symbol) pair to a *set* of states, and the empty string
//! is reserved as the key denoting an ε-move. An NFA is validated once, at
//! construction, and is immutable afterwards — every combinator below
//! (`union`, `concat`, `star`, `determinize`) allocates a fresh [`Nfa`]
//! rather than mutating its receiver.
//!
//! ## Example
//! ```
//! use finaut::nfa::Nfa;
//! use std::collections::{HashMap, HashSet};
//!
//! // Accepts every string ending in "b"
//! let mut transitions = HashMap::new();
//! transitions.insert(("s0".to_string(), "a".to_string()), HashSet::from(["s0".to_string()]));
//! transitions.insert(("s0".to_string(), "b".to_string()), HashSet::from(["s0".to_string(), "s1".to_string()]));
//! transitions.insert(("s1".to_string(), "a".to_string()), HashSet::new());
//! transitions.insert(("s1".to_string(), "b".to_string()), HashSet::new());
//!
//! let nfa = Nfa::new(&transitions, "s0", &HashSet::from(["s1".to_string()])).unwrap();
//! assert!(nfa.accepts(&["a", "b"]).unwrap());
//! assert!(!nfa.accepts(&["b", "a"]).unwrap());
//! ```

pub mod eval;

use crate::dfa::{Dfa, DfaState};
use crate::error::{AlphabetError, BuildError};
pub use eval::NfaEvaluator;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// The key used in a transition table to denote an ε-move.
pub const EPSILON: &str = "";

/// A nondeterministic finite automaton, possibly with ε-moves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nfa {
    pub(crate) alphabet: Rc<[Rc<str>]>,
    pub(crate) states: Vec<NfaState>,
    pub(crate) initial_state: usize,
}

/// A state of a [`Nfa`]: its name, whether it accepts, and its outgoing
/// transitions (one set of targets per alphabet symbol, plus a set of
/// ε-targets).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NfaState {
    pub(crate) name: Rc<str>,
    pub(crate) accepting: bool,
    pub(crate) transitions: Vec<HashSet<usize>>,
    pub(crate) epsilon_transitions: HashSet<usize>,
}

impl NfaState {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }
}

impl Nfa {
    /// Validates and constructs a [`Nfa`] from a transition table keyed by
    /// `(state, symbol)`, a start state and a set of accepting states.
    ///
    /// `Q` is inferred as the union of every state mentioned anywhere: as a
    /// key's first component, as a member of a target set, as `start`, or
    /// as a member of `accept`. The alphabet Σ is inferred as every
    /// non-empty key symbol (the empty string denotes ε and is excluded
    /// from Σ, per §3).
    ///
    /// # Errors
    /// - [`BuildError::SymbolArity`] if a non-ε symbol isn't one character.
    /// - [`BuildError::StartNotInStates`] / [`BuildError::AcceptNotSubset`].
    /// - [`BuildError::RangeViolation`] if a transition targets an unknown state.
    /// - [`BuildError::MissingCase`] if some `(q, a)` with `a` non-ε has no entry.
    pub fn new(
        transitions: &HashMap<(String, String), HashSet<String>>,
        start: &str,
        accept: &HashSet<String>,
    ) -> Result<Nfa, BuildError> {
        let mut alphabet_set = HashSet::new();
        for (_, sym) in transitions.keys() {
            if sym != EPSILON {
                if sym.chars().count() != 1 {
                    return Err(BuildError::SymbolArity(sym.clone()));
                }
                alphabet_set.insert(sym.clone());
            }
        }
        let mut alphabet: Vec<String> = alphabet_set.into_iter().collect();
        alphabet.sort();

        let mut state_names: HashSet<String> = HashSet::new();
        for (state, _) in transitions.keys() {
            state_names.insert(state.clone());
        }
        for targets in transitions.values() {
            state_names.extend(targets.iter().cloned());
        }
        state_names.insert(start.to_string());
        state_names.extend(accept.iter().cloned());

        let mut sorted_names: Vec<String> = state_names.into_iter().collect();
        sorted_names.sort();
        let name_idx: HashMap<&str, usize> = sorted_names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();

        if !name_idx.contains_key(start) {
            return Err(BuildError::StartNotInStates(start.to_string()));
        }
        for a in accept {
            if !name_idx.contains_key(a.as_str()) {
                return Err(BuildError::AcceptNotSubset(a.clone()));
            }
        }

        for ((from, sym), targets) in transitions {
            for to in targets {
                if !name_idx.contains_key(to.as_str()) {
                    return Err(BuildError::RangeViolation {
                        from: from.clone(),
                        symbol: sym.clone(),
                        to: to.clone(),
                    });
                }
            }
        }

        for name in &sorted_names {
            for sym in &alphabet {
                if !transitions.contains_key(&(name.clone(), sym.clone())) {
                    return Err(BuildError::MissingCase {
                        state: name.clone(),
                        symbol: sym.clone(),
                    });
                }
            }
        }

        let rc_alphabet: Rc<[Rc<str>]> = alphabet.iter().map(|s| Rc::from(s.as_str())).collect();

        let states = sorted_names
            .iter()
            .map(|name| {
                let mut trans = Vec::with_capacity(alphabet.len());
                for sym in &alphabet {
                    let set = transitions
                        .get(&(name.clone(), sym.clone()))
                        .map(|targets| {
                            targets
                                .iter()
                                .map(|t| name_idx[t.as_str()])
                                .collect::<HashSet<_>>()
                        })
                        .unwrap_or_default();
                    trans.push(set);
                }
                let epsilon_transitions = transitions
                    .get(&(name.clone(), EPSILON.to_string()))
                    .map(|targets| {
                        targets
                            .iter()
                            .map(|t| name_idx[t.as_str()])
                            .collect::<HashSet<_>>()
                    })
                    .unwrap_or_default();
                NfaState {
                    name: Rc::from(name.as_str()),
                    accepting: accept.contains(name),
                    transitions: trans,
                    epsilon_transitions,
                }
            })
            .collect();

        Ok(Nfa {
            alphabet: rc_alphabet,
            states,
            initial_state: name_idx[start],
        })
    }

    /// The alphabet Σ, inferred from the transition table (ε excluded).
    pub fn alphabet(&self) -> Vec<String> {
        self.alphabet.iter().map(|s| s.to_string()).collect()
    }

    /// The states of this NFA.
    pub fn states(&self) -> &[NfaState] {
        &self.states
    }

    /// The initial state q₀.
    pub fn initial_state(&self) -> &NfaState {
        &self.states[self.initial_state]
    }

    /// An evaluator for stepping through a string one symbol at a time.
    pub fn evaluator(&self) -> NfaEvaluator<'_> {
        NfaEvaluator::new(self)
    }

    /// The ε-closure of `states`: the least set containing `states` closed
    /// under ε-moves, computed by breadth-first expansion.
    pub(crate) fn eps_closure(&self, states: &HashSet<usize>) -> HashSet<usize> {
        let mut closure = states.clone();
        let mut frontier: Vec<usize> = states.iter().copied().collect();
        while let Some(s) = frontier.pop() {
            for &t in &self.states[s].epsilon_transitions {
                if closure.insert(t) {
                    frontier.push(t);
                }
            }
        }
        closure
    }

    /// `Cᵢ₊₁ = ε-closure(⋃_{q∈Cᵢ} δ(q,a))`, accepting iff the final
    /// configuration intersects F. Rejects with [`AlphabetError`] if `w`
    /// contains a symbol outside Σ.
    pub fn accepts(&self, w: &[&str]) -> Result<bool, AlphabetError> {
        let idx_of: HashMap<&str, usize> = self
            .alphabet
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_ref(), i))
            .collect();
        let mut config = self.eps_closure(&HashSet::from([self.initial_state]));
        for &sym in w {
            let &a = idx_of
                .get(sym)
                .ok_or_else(|| AlphabetError::new(sym))?;
            let stepped: HashSet<usize> = config
                .iter()
                .flat_map(|&q| self.states[q].transitions[a].iter().copied())
                .collect();
            config = self.eps_closure(&stepped);
        }
        Ok(config.iter().any(|&q| self.states[q].accepting))
    }

    /// Merges the alphabets of `self` and `other` into a single sorted
    /// symbol list, and returns, for each input NFA, the mapping from its
    /// own alphabet index to the merged alphabet index.
    fn merged_alphabet(&self, other: &Self) -> (Vec<Rc<str>>, Vec<usize>, Vec<usize>) {
        let mut merged: Vec<Rc<str>> = self
            .alphabet
            .iter()
            .chain(other.alphabet.iter())
            .cloned()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        merged.sort();
        let idx_of: HashMap<&Rc<str>, usize> =
            merged.iter().enumerate().map(|(i, s)| (s, i)).collect();
        let map_self = self.alphabet.iter().map(|s| idx_of[s]).collect();
        let map_other = other.alphabet.iter().map(|s| idx_of[s]).collect();
        (merged, map_self, map_other)
    }

    /// Renames every state of this NFA by shifting its index by `offset`,
    /// and remaps its transitions onto the `width`-wide merged alphabet
    /// using `sym_map` (old index -> new index).
    fn rename_and_remap(&self, offset: usize, sym_map: &[usize], width: usize) -> Vec<NfaState> {
        self.states
            .iter()
            .map(|s| {
                let mut transitions = vec![HashSet::new(); width];
                for (old_idx, targets) in s.transitions.iter().enumerate() {
                    let new_idx = sym_map[old_idx];
                    transitions[new_idx] = targets.iter().map(|&t| t + offset).collect();
                }
                NfaState {
                    name: s.name.clone(),
                    accepting: s.accepting,
                    transitions,
                    epsilon_transitions: s
                        .epsilon_transitions
                        .iter()
                        .map(|&t| t + offset)
                        .collect(),
                }
            })
            .collect()
    }

    /// Introduces a fresh start state with ε-edges to both (renamed)
    /// original start states. `|Q'| = |Q₁| + |Q₂| + 1`; F' = F₁ ∪ F₂.
    pub fn union(&self, other: &Self) -> Self {
        let (merged, map_self, map_other) = self.merged_alphabet(other);
        let width = merged.len();
        let offset_self = 1;
        let offset_other = 1 + self.states.len();

        let mut states = Vec::with_capacity(1 + self.states.len() + other.states.len());
        states.push(NfaState {
            name: Rc::from("start"),
            accepting: false,
            transitions: vec![HashSet::new(); width],
            epsilon_transitions: HashSet::from([
                self.initial_state + offset_self,
                other.initial_state + offset_other,
            ]),
        });
        states.extend(self.rename_and_remap(offset_self, &map_self, width));
        states.extend(other.rename_and_remap(offset_other, &map_other, width));

        Nfa {
            alphabet: merged.into(),
            states,
            initial_state: 0,
        }
    }

    /// Adds ε-edges from every accepting state of `self` to the (renamed)
    /// start state of `other`. F' = F₂.
    pub fn concat(&self, other: &Self) -> Self {
        let (merged, map_self, map_other) = self.merged_alphabet(other);
        let width = merged.len();
        let offset_other = self.states.len();

        let mut states = self.rename_and_remap(0, &map_self, width);
        for s in states.iter_mut() {
            if s.accepting {
                s.accepting = false;
                s.epsilon_transitions.insert(other.initial_state + offset_other);
            }
        }
        states.extend(other.rename_and_remap(offset_other, &map_other, width));

        Nfa {
            alphabet: merged.into(),
            states,
            initial_state: self.initial_state,
        }
    }

    /// Introduces a fresh, accepting start state `s` with an ε-edge to the
    /// original start state; every original accepting state gets an
    /// ε-edge back to the original start.
    pub fn star(&self) -> Self {
        let width = self.alphabet.len();
        let mut states = self.rename_and_remap(1, &(0..width).collect::<Vec<_>>(), width);
        for s in states.iter_mut() {
            if s.accepting {
                s.epsilon_transitions.insert(self.initial_state + 1);
            }
        }
        let fresh = NfaState {
            name: Rc::from("star"),
            accepting: true,
            transitions: vec![HashSet::new(); width],
            epsilon_transitions: HashSet::from([self.initial_state + 1]),
        };
        let mut all = vec![fresh];
        all.extend(states);

        Nfa {
            alphabet: self.alphabet.clone(),
            states: all,
            initial_state: 0,
        }
    }

    /// Subset construction: DFA states are the non-empty subsets of Q
    /// reachable from `ε-closure({q₀})` by repeated image steps. Only
    /// reachable subsets are materialized (§5's resource caveat) — this
    /// operation is permitted to be exponential on pathological NFAs, but
    /// never precomputes the full power set. Subsets are canonically
    /// named by sorting their member state names and joining them, giving
    /// the value-equality required by §9 ("Hashable composite states").
    pub fn determinize(&self) -> Dfa {
        let initial = self.eps_closure(&HashSet::from([self.initial_state]));
        let canon = |set: &HashSet<usize>| -> String {
            let mut names: Vec<&str> = set.iter().map(|&i| self.states[i].name.as_ref()).collect();
            names.sort();
            format!("{{{}}}", names.join(","))
        };

        let mut seen: HashMap<String, HashSet<usize>> = HashMap::new();
        seen.insert(canon(&initial), initial.clone());
        let mut frontier = vec![initial];

        while let Some(set) = frontier.pop() {
            for a_idx in 0..self.alphabet.len() {
                let image: HashSet<usize> = set
                    .iter()
                    .flat_map(|&q| self.states[q].transitions[a_idx].iter().copied())
                    .collect();
                let closed = self.eps_closure(&image);
                let target_name = canon(&closed);
                if !seen.contains_key(&target_name) {
                    seen.insert(target_name.clone(), closed.clone());
                    frontier.push(closed);
                }
            }
        }

        let mut dfa_transitions: HashMap<(String, String), String> = HashMap::new();
        for (name, set) in &seen {
            for (a_idx, sym) in self.alphabet.iter().enumerate() {
                let image: HashSet<usize> = set
                    .iter()
                    .flat_map(|&q| self.states[q].transitions[a_idx].iter().copied())
                    .collect();
                let closed = self.eps_closure(&image);
                dfa_transitions.insert((name.clone(), sym.to_string()), canon(&closed));
            }
        }

        let accept: HashSet<String> = seen
            .iter()
            .filter(|(_, set)| set.iter().any(|&q| self.states[q].accepting))
            .map(|(name, _)| name.clone())
            .collect();

        Dfa::from_subset_construction(dfa_transitions, canon(&initial), accept)
    }

    /// Compiles a regex surface pattern into a [`Nfa`] (§4.4). Delegates to
    /// [`crate::regex::compile`]; this is the crate's sole static
    /// constructor exposed as `NFA.fit` in the specification.
    pub fn fit(
        pattern: &str,
        alphabet: &HashSet<String>,
    ) -> Result<Nfa, crate::regex::RegexError> {
        crate::regex::compile(pattern, alphabet)
    }

    /// Checks whether this NFA and `other` accept the same language, by
    /// exploring pairs of ε-closed configurations reachable in lock-step,
    /// rejecting as soon as one side accepts and the other doesn't.
    pub fn equivalent_to(&self, other: &Self) -> bool {
        let (merged, map_self, map_other) = self.merged_alphabet(other);
        let canon = |set: &HashSet<usize>, tag: u8| -> (u8, Vec<usize>) {
            let mut v: Vec<usize> = set.iter().copied().collect();
            v.sort();
            (tag, v)
        };

        let init_a = self.eps_closure(&HashSet::from([self.initial_state]));
        let init_b = other.eps_closure(&HashSet::from([other.initial_state]));

        let mut seen = HashSet::new();
        seen.insert((canon(&init_a, 0), canon(&init_b, 1)));
        let mut stack = vec![(init_a, init_b)];

        while let Some((a, b)) = stack.pop() {
            let a_acc = a.iter().any(|&q| self.states[q].accepting);
            let b_acc = b.iter().any(|&q| other.states[q].accepting);
            if a_acc != b_acc {
                return false;
            }
            for sym_idx in 0..merged.len() {
                let step = |states: &HashSet<usize>, nfa: &Nfa, map: &[usize]| -> HashSet<usize> {
                    let local_idx = map.iter().position(|&m| m == sym_idx);
                    match local_idx {
                        None => HashSet::new(),
                        Some(local) => {
                            let image: HashSet<usize> = states
                                .iter()
                                .flat_map(|&q| nfa.states[q].transitions[local].iter().copied())
                                .collect();
                            nfa.eps_closure(&image)
                        }
                    }
                };
                let next_a = step(&a, self, &map_self);
                let next_b = step(&b, other, &map_other);
                let key = (canon(&next_a, 0), canon(&next_b, 1));
                if seen.insert(key) {
                    stack.push((next_a, next_b));
                }
            }
        }
        true
    }
}

impl From<DfaState> for NfaState {
    fn from(value: DfaState) -> Self {
        NfaState {
            name: value.name,
            accepting: value.accepting,
            transitions: value
                .transitions
                .into_iter()
                .map(|t| HashSet::from([t]))
                .collect(),
            epsilon_transitions: HashSet::new(),
        }
    }
}
