//! # Deterministic finite automaton
//!
//! [`Dfa`] is the tuple (Q, Σ, δ, q₀, F) of §3/§4.2: δ is *total* on Q×Σ.
//! Like [`crate::nfa::Nfa`], a [`Dfa`] is validated once at construction
//! and immutable afterwards.
//!
//! ## Example
//! ```
//! use finaut::dfa::Dfa;
//! use std::collections::HashMap;
//!
//! // Accepts binary strings ending in "1"
//! let mut transitions = HashMap::new();
//! transitions.insert(("q0".to_string(), "0".to_string()), "q0".to_string());
//! transitions.insert(("q0".to_string(), "1".to_string()), "q1".to_string());
//! transitions.insert(("q1".to_string(), "0".to_string()), "q0".to_string());
//! transitions.insert(("q1".to_string(), "1".to_string()), "q1".to_string());
//!
//! let dfa = Dfa::new(&transitions, "q0", &["q1".to_string()].into_iter().collect()).unwrap();
//! assert!(dfa.accepts(&["1"]).unwrap());
//! assert!(!dfa.accepts(&["0"]).unwrap());
//! assert!(dfa.accepts(&["2"]).is_err());
//! ```

pub mod eval;

use crate::cfg::{Cfg, Production};
use crate::error::{AlphabetError, BuildError};
use crate::nfa::{Nfa, NfaState};
pub use eval::DfaEvaluator;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// A deterministic finite automaton.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dfa {
    pub(crate) alphabet: Rc<[Rc<str>]>,
    pub(crate) states: Vec<DfaState>,
    pub(crate) initial_state: usize,
}

/// A state of a [`Dfa`]: its name, whether it accepts, and its (total)
/// transition row, one target index per alphabet symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DfaState {
    pub(crate) name: Rc<str>,
    pub(crate) accepting: bool,
    pub(crate) transitions: Vec<usize>,
}

impl DfaState {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }
}

impl Dfa {
    /// Validates and constructs a [`Dfa`] from a total transition table
    /// keyed by `(state, symbol)`, a start state and a set of accepting
    /// states. `Q` is inferred from every state mentioned as a key's first
    /// component, a target, `start`, or a member of `accept`.
    ///
    /// # Errors
    /// - [`BuildError::SymbolArity`] if a symbol isn't one character.
    /// - [`BuildError::StartNotInStates`] / [`BuildError::AcceptNotSubset`].
    /// - [`BuildError::RangeViolation`] if a transition targets an unknown state.
    /// - [`BuildError::MissingCase`] if `dom(δ) != Q×Σ`.
    pub fn new(
        transitions: &HashMap<(String, String), String>,
        start: &str,
        accept: &HashSet<String>,
    ) -> Result<Dfa, BuildError> {
        let mut alphabet_set = HashSet::new();
        for (_, sym) in transitions.keys() {
            if sym.chars().count() != 1 {
                return Err(BuildError::SymbolArity(sym.clone()));
            }
            alphabet_set.insert(sym.clone());
        }
        let mut alphabet: Vec<String> = alphabet_set.into_iter().collect();
        alphabet.sort();

        let mut state_names: HashSet<String> =
            transitions.keys().map(|(s, _)| s.clone()).collect();
        state_names.extend(transitions.values().cloned());
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
        for ((from, sym), to) in transitions {
            if !name_idx.contains_key(to.as_str()) {
                return Err(BuildError::RangeViolation {
                    from: from.clone(),
                    symbol: sym.clone(),
                    to: to.clone(),
                });
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

        let states = sorted_names
            .iter()
            .map(|name| {
                let transitions = alphabet
                    .iter()
                    .map(|sym| name_idx[transitions[&(name.clone(), sym.clone())].as_str()])
                    .collect();
                DfaState {
                    name: Rc::from(name.as_str()),
                    accepting: accept.contains(name),
                    transitions,
                }
            })
            .collect();

        Ok(Dfa {
            alphabet: alphabet.iter().map(|s| Rc::from(s.as_str())).collect(),
            states,
            initial_state: name_idx[start],
        })
    }

    pub(crate) fn from_subset_construction(
        transitions: HashMap<(String, String), String>,
        start: String,
        accept: HashSet<String>,
    ) -> Dfa {
        Dfa::new(&transitions, &start, &accept)
            .expect("subset construction always yields a consistent transition table")
    }

    pub fn alphabet(&self) -> Vec<String> {
        self.alphabet.iter().map(|s| s.to_string()).collect()
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn initial_state(&self) -> &DfaState {
        &self.states[self.initial_state]
    }

    pub fn evaluator(&self) -> DfaEvaluator<'_> {
        DfaEvaluator::new(self)
    }

    /// Total simulation: start at q₀, follow δ on every symbol of `w`,
    /// accept iff the final state is in F. Rejects with [`AlphabetError`]
    /// on the first symbol outside Σ.
    pub fn accepts(&self, w: &[&str]) -> Result<bool, AlphabetError> {
        let mut eval = self.evaluator();
        for &sym in w {
            if eval.step(sym).is_none() {
                return Err(AlphabetError::new(sym));
            }
        }
        Ok(eval.is_accepting())
    }

    /// Lifts δ to δ'(q,a) = {δ(q,a)}, keeping Q, Σ, q₀ and F unchanged.
    /// This is a cheap, allocation-light conversion: every DFA is already
    /// an NFA with singleton transition sets and no ε-moves.
    pub fn non_determinize(self) -> Nfa {
        let Dfa {
            alphabet,
            states,
            initial_state,
        } = self;
        let states: Vec<NfaState> = states.into_iter().map(NfaState::from).collect();
        // Safety of the conversion: Nfa's internals assume one HashSet of
        // targets per alphabet symbol index, which NfaState::from(DfaState)
        // already produces.
        crate::nfa::Nfa {
            alphabet,
            states,
            initial_state,
        }
    }

    /// Union by product construction (§4.2): `Q' = Q₁×Q₂`, lifted so that
    /// symbols outside one automaton's alphabet route to a fresh trap
    /// state in that automaton, and `Σ' = Σ₁∪Σ₂`. Only pairs reachable
    /// from `(q₀₁, q₀₂)` are materialized.
    pub fn union(&self, other: &Self) -> Dfa {
        self.product_construction(other, |a, b| a || b)
    }

    /// Concatenation, defined via NFA: non-determinize both operands,
    /// concatenate, and determinize the result. Potentially exponential,
    /// per §1's non-goals (subset construction is not optimized).
    pub fn concat(&self, other: &Self) -> Dfa {
        self.clone()
            .non_determinize()
            .concat(&other.clone().non_determinize())
            .determinize()
    }

    /// The product construction underlying [`Dfa::union`], parameterized
    /// by how a pair of (possibly-trap) acceptance flags combines into the
    /// new state's acceptance. Each automaton's alphabet is extended with
    /// a trap state absorbing symbols from the other automaton's alphabet
    /// that aren't in its own.
    fn product_construction(&self, other: &Self, combine: impl Fn(bool, bool) -> bool) -> Dfa {
        let mut merged: Vec<String> = self
            .alphabet()
            .into_iter()
            .chain(other.alphabet())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        merged.sort();

        // index -1 (encoded as states.len()) denotes each side's trap state
        let extend = |dfa: &Dfa| -> Vec<Vec<usize>> {
            let trap = dfa.states.len();
            let own_alphabet: HashSet<&str> = dfa.alphabet.iter().map(|s| s.as_ref()).collect();
            let sym_idx: HashMap<&str, usize> = dfa
                .alphabet
                .iter()
                .enumerate()
                .map(|(i, s)| (s.as_ref(), i))
                .collect();
            let mut rows: Vec<Vec<usize>> = dfa
                .states
                .iter()
                .map(|s| {
                    merged
                        .iter()
                        .map(|sym| {
                            if own_alphabet.contains(sym.as_str()) {
                                s.transitions[sym_idx[sym.as_str()]]
                            } else {
                                trap
                            }
                        })
                        .collect()
                })
                .collect();
            rows.push(vec![trap; merged.len()]); // the trap state loops on everything
            rows
        };

        let rows_a = extend(self);
        let rows_b = extend(other);
        let accepting_a = |i: usize| i < self.states.len() && self.states[i].accepting;
        let accepting_b = |i: usize| i < other.states.len() && other.states[i].accepting;

        let start_pair = (self.initial_state, other.initial_state);
        let mut index_of: HashMap<(usize, usize), usize> = HashMap::new();
        index_of.insert(start_pair, 0);
        let mut pairs = vec![start_pair];
        let mut frontier = vec![start_pair];

        while let Some((a, b)) = frontier.pop() {
            for sym_idx in 0..merged.len() {
                let next = (rows_a[a][sym_idx], rows_b[b][sym_idx]);
                if !index_of.contains_key(&next) {
                    index_of.insert(next, pairs.len());
                    pairs.push(next);
                    frontier.push(next);
                }
            }
        }

        let name_for = |(a, b): (usize, usize)| -> String {
            let a_name = if a < self.states.len() {
                self.states[a].name.to_string()
            } else {
                "-".to_string()
            };
            let b_name = if b < other.states.len() {
                other.states[b].name.to_string()
            } else {
                "-".to_string()
            };
            format!("({a_name},{b_name})")
        };

        let mut transitions = HashMap::new();
        let mut accept = HashSet::new();
        for &(a, b) in &pairs {
            let name = name_for((a, b));
            if combine(accepting_a(a), accepting_b(b)) {
                accept.insert(name.clone());
            }
            for (sym_idx, sym) in merged.iter().enumerate() {
                let (na, nb) = (rows_a[a][sym_idx], rows_b[b][sym_idx]);
                transitions.insert((name.clone(), sym.clone()), name_for((na, nb)));
            }
        }

        Dfa::new(&transitions, &name_for(start_pair), &accept)
            .expect("product construction always yields a consistent transition table")
    }

    /// Converts this DFA into a regex string by state elimination: builds
    /// a generalized NFA whose edges carry regex fragments (adding a fresh
    /// start with an ε-edge to q₀, and a fresh accept with ε-edges from
    /// every state in F), then eliminates every original state one at a
    /// time, folding incoming/outgoing edges through the eliminated
    /// state's self-loop (`in • loop* • out`). The returned string uses
    /// only the seven surface operators (`|`, `•`, `*`, `€`, `Ø`) and is
    /// accepted by [`Nfa::fit`]. No minimization of the result is
    /// attempted (§1's non-goals).
    pub fn encode(&self) -> String {
        const EPS: &str = "€";
        let n = self.states.len();
        let start = n;
        let accept = n + 1;

        let mut edges: HashMap<(usize, usize), String> = HashMap::new();
        edges.insert((start, self.initial_state), EPS.to_string());
        for (i, s) in self.states.iter().enumerate() {
            if s.accepting {
                alt_insert(&mut edges, (i, accept), EPS.to_string());
            }
            for (sym_idx, sym) in self.alphabet.iter().enumerate() {
                let target = s.transitions[sym_idx];
                alt_insert(&mut edges, (i, target), sym.to_string());
            }
        }

        let mut active: HashSet<usize> = (0..n).chain([start, accept]).collect();
        for r in 0..n {
            let incoming: Vec<(usize, String)> = active
                .iter()
                .filter(|&&p| p != r)
                .filter_map(|&p| edges.get(&(p, r)).map(|l| (p, l.clone())))
                .collect();
            let outgoing: Vec<(usize, String)> = active
                .iter()
                .filter(|&&q| q != r)
                .filter_map(|&q| edges.get(&(r, q)).map(|l| (q, l.clone())))
                .collect();
            let loop_label = edges.get(&(r, r)).cloned();

            for (p, in_label) in &incoming {
                for (q, out_label) in &outgoing {
                    let addition = compose(in_label, loop_label.as_deref(), out_label);
                    alt_insert(&mut edges, (*p, *q), addition);
                }
            }
            edges.retain(|&(a, b), _| a != r && b != r);
            active.remove(&r);
        }

        edges
            .get(&(start, accept))
            .cloned()
            .unwrap_or_else(|| "Ø".to_string())
    }

    /// Produces a CFG whose variables are the DFA's states, whose
    /// terminals are Σ, whose start variable is q₀, and which has a
    /// production `q → a·q'` for every transition `δ(q,a)=q'`, plus
    /// `q → €` for every `q∈F`.
    ///
    /// # Errors
    /// [`crate::cfg::CfgError::NoTerminals`] if this DFA has an empty
    /// alphabet: every production would then be `€`, leaving the
    /// resulting grammar with no terminal symbols.
    pub fn cf_grammarize(&self) -> Result<Cfg, crate::cfg::CfgError> {
        let mut rules: HashMap<String, HashSet<Production>> = HashMap::new();
        for s in &self.states {
            let mut productions = HashSet::new();
            for (sym_idx, sym) in self.alphabet.iter().enumerate() {
                let target = &self.states[s.transitions[sym_idx]].name;
                productions.insert(Production(vec![sym.to_string(), target.to_string()]));
            }
            if s.accepting {
                productions.insert(Production(vec![]));
            }
            rules.insert(s.name.to_string(), productions);
        }
        Cfg::new(rules, self.initial_state().name().to_string())
    }

    /// Checks language equality by exploring pairs of states reachable in
    /// lock-step from `(q₀₁, q₀₂)`, rejecting as soon as one side accepts
    /// and the other doesn't. Different alphabets are never equivalent.
    pub fn equivalent_to(&self, other: &Dfa) -> bool {
        if self.alphabet() != other.alphabet() {
            let mut a = self.alphabet();
            let mut b = other.alphabet();
            a.sort();
            b.sort();
            if a != b {
                return false;
            }
        }
        self.clone()
            .non_determinize()
            .equivalent_to(&other.clone().non_determinize())
    }
}

fn alt_insert(edges: &mut HashMap<(usize, usize), String>, key: (usize, usize), addition: String) {
    edges
        .entry(key)
        .and_modify(|existing| *existing = format!("{existing}|{addition}"))
        .or_insert(addition);
}

fn paren_if_alt(s: &str) -> String {
    if s.contains('|') {
        format!("({s})")
    } else {
        s.to_string()
    }
}

fn compose(in_label: &str, loop_label: Option<&str>, out_label: &str) -> String {
    let star_part = match loop_label {
        Some(l) => format!("({l})*"),
        None => String::new(),
    };
    format!(
        "{}{}{}",
        paren_if_alt(in_label),
        star_part,
        paren_if_alt(out_label)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ends_in_one() -> Dfa {
        let mut transitions = HashMap::new();
        transitions.insert(("q0".to_string(), "0".to_string()), "q0".to_string());
        transitions.insert(("q0".to_string(), "1".to_string()), "q1".to_string());
        transitions.insert(("q1".to_string(), "0".to_string()), "q0".to_string());
        transitions.insert(("q1".to_string(), "1".to_string()), "q1".to_string());
        Dfa::new(&transitions, "q0", &HashSet::from(["q1".to_string()])).unwrap()
    }

    #[test]
    fn accepts_and_rejects() {
        let dfa = ends_in_one();
        assert!(dfa.accepts(&["1"]).unwrap());
        assert!(!dfa.accepts(&["0"]).unwrap());
        assert!(!dfa.accepts(&[]).unwrap());
        assert!(dfa.accepts(&["2"]).is_err());
    }

    #[test]
    fn containing_ab_encodes_to_an_equivalent_regex() {
        let mut transitions = HashMap::new();
        // q0: nothing seen, q1: just saw 'a', q2: saw "ab"
        transitions.insert(("q0".to_string(), "a".to_string()), "q1".to_string());
        transitions.insert(("q0".to_string(), "b".to_string()), "q0".to_string());
        transitions.insert(("q1".to_string(), "a".to_string()), "q1".to_string());
        transitions.insert(("q1".to_string(), "b".to_string()), "q2".to_string());
        transitions.insert(("q2".to_string(), "a".to_string()), "q2".to_string());
        transitions.insert(("q2".to_string(), "b".to_string()), "q2".to_string());
        let dfa = Dfa::new(
            &transitions,
            "q0",
            &HashSet::from(["q2".to_string()]),
        )
        .unwrap();

        let pattern = dfa.encode();
        let alphabet = HashSet::from(["a".to_string(), "b".to_string()]);
        let refit = crate::regex::compile(&pattern, &alphabet).unwrap().determinize();
        for w in [
            vec![],
            vec!["a"],
            vec!["a", "b"],
            vec!["b", "a", "b"],
            vec!["a", "a", "a"],
        ] {
            assert_eq!(dfa.accepts(&w).unwrap(), refit.accepts(&w).unwrap());
        }
    }

    #[test]
    fn missing_case_is_rejected() {
        let mut transitions = HashMap::new();
        transitions.insert(("q0".to_string(), "0".to_string()), "q0".to_string());
        transitions.insert(("q1".to_string(), "1".to_string()), "q1".to_string());
        assert!(matches!(
            Dfa::new(&transitions, "q0", &HashSet::new()),
            Err(BuildError::MissingCase { .. })
        ));
    }

    #[test]
    fn cf_grammarize_rejects_an_empty_alphabet() {
        let dfa = Dfa::new(&HashMap::new(), "q0", &HashSet::new()).unwrap();
        assert_eq!(dfa.alphabet(), Vec::<String>::new());
        assert_eq!(dfa.cf_grammarize(), Err(crate::cfg::CfgError::NoTerminals));
    }

    #[test]
    fn union_of_mismatched_alphabets_matches_boolean_or_via_trap_states() {
        // ends in 'a', over {a, b}
        let mut t1 = HashMap::new();
        t1.insert(("p0".to_string(), "a".to_string()), "p1".to_string());
        t1.insert(("p0".to_string(), "b".to_string()), "p0".to_string());
        t1.insert(("p1".to_string(), "a".to_string()), "p1".to_string());
        t1.insert(("p1".to_string(), "b".to_string()), "p0".to_string());
        let dfa1 = Dfa::new(&t1, "p0", &HashSet::from(["p1".to_string()])).unwrap();

        // contains 'c', over {b, c}
        let mut t2 = HashMap::new();
        t2.insert(("r0".to_string(), "b".to_string()), "r0".to_string());
        t2.insert(("r0".to_string(), "c".to_string()), "r1".to_string());
        t2.insert(("r1".to_string(), "b".to_string()), "r1".to_string());
        t2.insert(("r1".to_string(), "c".to_string()), "r1".to_string());
        let dfa2 = Dfa::new(&t2, "r0", &HashSet::from(["r1".to_string()])).unwrap();

        let union = dfa1.union(&dfa2);
        assert_eq!(union.alphabet(), vec!["a", "b", "c"]);

        let alphabet1: HashSet<&str> = dfa1.alphabet.iter().map(|s| s.as_ref()).collect();
        let alphabet2: HashSet<&str> = dfa2.alphabet.iter().map(|s| s.as_ref()).collect();

        // A symbol outside an operand's own alphabet routes it to a trap
        // state forever, so its "extended" acceptance of a word drawn from
        // the merged alphabet is: every symbol is its own, and it accepts.
        let extended = |dfa: &Dfa, own: &HashSet<&str>, word: &[&str]| -> bool {
            word.iter().all(|s| own.contains(s)) && dfa.accepts(word).unwrap()
        };

        let symbols = ["a", "b", "c"];
        let mut words: Vec<Vec<&str>> = vec![vec![]];
        for _ in 0..3 {
            words = words
                .iter()
                .flat_map(|w| {
                    symbols.iter().map(move |&s| {
                        let mut next = w.clone();
                        next.push(s);
                        next
                    })
                })
                .chain(words.clone())
                .collect();
        }

        for w in &words {
            let expected = extended(&dfa1, &alphabet1, w) || extended(&dfa2, &alphabet2, w);
            assert_eq!(union.accepts(w).unwrap(), expected, "word {w:?}");
        }
    }
}
