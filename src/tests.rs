//! Property tests spanning the whole crate, in the spirit of the
//! `proptest!` blocks used throughout the automaton modules: random DFAs
//! and NFAs are generated directly (bypassing any one algorithm) and
//! then checked against the quantified invariants that tie the modules
//! together — determinize/non_determinize round-tripping, the
//! union/concat/star accept-language laws, the DFA→regex→NFA round trip,
//! and the Chomsky Normal Form shape invariant.

use crate::dfa::Dfa;
use crate::nfa::{Nfa, EPSILON};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

fn letters(size: usize) -> Vec<String> {
    ('a'..).take(size).map(|c| c.to_string()).collect()
}

fn dfa_strategy(max_states: usize, alphabet_size: usize) -> impl Strategy<Value = (Dfa, Vec<String>)> {
    (2..=max_states).prop_flat_map(move |num_states| {
        let states: Vec<String> = (0..num_states).map(|i| format!("q{i}")).collect();
        let alphabet = letters(alphabet_size);
        let targets = prop::collection::vec(0..num_states, num_states * alphabet_size);
        let accept_flags = prop::collection::vec(any::<bool>(), num_states);
        (Just(states), Just(alphabet), targets, accept_flags).prop_map(
            |(states, alphabet, targets, accept_flags)| {
                let mut transitions = HashMap::new();
                for (i, from) in states.iter().enumerate() {
                    for (j, sym) in alphabet.iter().enumerate() {
                        let target = &states[targets[i * alphabet.len() + j]];
                        transitions.insert((from.clone(), sym.clone()), target.clone());
                    }
                }
                let accept: HashSet<String> = states
                    .iter()
                    .zip(accept_flags)
                    .filter(|(_, b)| *b)
                    .map(|(s, _)| s.clone())
                    .collect();
                let dfa = Dfa::new(&transitions, &states[0], &accept).unwrap();
                (dfa, alphabet)
            },
        )
    })
}

fn nfa_strategy(max_states: usize, alphabet_size: usize) -> impl Strategy<Value = (Nfa, Vec<String>)> {
    (2..=max_states).prop_flat_map(move |num_states| {
        let states: Vec<String> = (0..num_states).map(|i| format!("q{i}")).collect();
        let alphabet = letters(alphabet_size);
        let row = prop::collection::vec(any::<bool>(), num_states);
        let rows = prop::collection::vec(row.clone(), num_states * alphabet_size);
        let epsilon_rows = prop::collection::vec(row, num_states);
        let accept_flags = prop::collection::vec(any::<bool>(), num_states);
        (
            Just(states),
            Just(alphabet),
            rows,
            epsilon_rows,
            accept_flags,
        )
            .prop_map(|(states, alphabet, rows, epsilon_rows, accept_flags)| {
                let mut transitions: HashMap<(String, String), HashSet<String>> = HashMap::new();
                for (i, from) in states.iter().enumerate() {
                    for (j, sym) in alphabet.iter().enumerate() {
                        let targets: HashSet<String> = rows[i * alphabet.len() + j]
                            .iter()
                            .enumerate()
                            .filter(|(_, b)| **b)
                            .map(|(k, _)| states[k].clone())
                            .collect();
                        transitions.insert((from.clone(), sym.clone()), targets);
                    }
                    let eps_targets: HashSet<String> = epsilon_rows[i]
                        .iter()
                        .enumerate()
                        .filter(|(_, b)| **b)
                        .map(|(k, _)| states[k].clone())
                        .collect();
                    if !eps_targets.is_empty() {
                        transitions.insert((from.clone(), EPSILON.to_string()), eps_targets);
                    }
                }
                let accept: HashSet<String> = states
                    .iter()
                    .zip(accept_flags)
                    .filter(|(_, b)| *b)
                    .map(|(s, _)| s.clone())
                    .collect();
                let nfa = Nfa::new(&transitions, &states[0], &accept).unwrap();
                (nfa, alphabet)
            })
    })
}

fn words_over(alphabet_size: usize, count: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0..alphabet_size, 0..6), count)
}

fn accepted_by_star(nfa: &Nfa, word: &[&str]) -> bool {
    let n = word.len();
    let mut dp = vec![false; n + 1];
    dp[0] = true;
    for i in 1..=n {
        for j in 0..i {
            if dp[j] && nfa.accepts(&word[j..i]).unwrap() {
                dp[i] = true;
                break;
            }
        }
    }
    dp[n]
}

proptest! {
    #[test]
    fn determinize_then_non_determinize_preserves_language((nfa, _) in nfa_strategy(6, 3)) {
        let roundtrip = nfa.clone().determinize().non_determinize();
        prop_assert!(nfa.equivalent_to(&roundtrip));
    }

    #[test]
    fn non_determinize_then_determinize_preserves_language((dfa, _) in dfa_strategy(6, 3)) {
        let roundtrip = dfa.clone().non_determinize().determinize();
        prop_assert!(dfa.equivalent_to(&roundtrip));
    }

    #[test]
    fn dfa_union_matches_boolean_or(
        (dfa1, letters) in dfa_strategy(5, 3),
        (dfa2, _) in dfa_strategy(5, 3),
        words in words_over(3, 30),
    ) {
        let union = dfa1.union(&dfa2);
        for idxs in &words {
            let word: Vec<&str> = idxs.iter().map(|&i| letters[i].as_str()).collect();
            let a = dfa1.accepts(&word).unwrap();
            let b = dfa2.accepts(&word).unwrap();
            prop_assert_eq!(union.accepts(&word).unwrap(), a || b);
        }
    }

    #[test]
    fn dfa_concat_matches_some_split(
        (dfa1, letters) in dfa_strategy(4, 2),
        (dfa2, _) in dfa_strategy(4, 2),
        words in words_over(2, 15),
    ) {
        let concat = dfa1.concat(&dfa2);
        for idxs in &words {
            let word: Vec<&str> = idxs.iter().map(|&i| letters[i].as_str()).collect();
            let some_split = (0..=word.len()).any(|split| {
                let (l, r) = word.split_at(split);
                dfa1.accepts(l).unwrap() && dfa2.accepts(r).unwrap()
            });
            prop_assert_eq!(concat.accepts(&word).unwrap(), some_split);
        }
    }

    #[test]
    fn nfa_star_matches_some_partition(
        (nfa, letters) in nfa_strategy(4, 2),
        words in words_over(2, 15),
    ) {
        let star = nfa.star();
        for idxs in &words {
            let word: Vec<&str> = idxs.iter().map(|&i| letters[i].as_str()).collect();
            prop_assert_eq!(star.accepts(&word).unwrap(), accepted_by_star(&nfa, &word));
        }
    }

    #[test]
    fn dfa_encode_then_refit_is_equivalent((dfa, letters) in dfa_strategy(4, 2)) {
        let alphabet: HashSet<String> = letters.into_iter().collect();
        let pattern = dfa.encode();
        let nfa = crate::regex::compile(&pattern, &alphabet).unwrap();
        prop_assert!(dfa.equivalent_to(&nfa.determinize()));
    }

    #[test]
    fn accessors_are_pure((dfa, _) in dfa_strategy(4, 2)) {
        prop_assert_eq!(dfa.alphabet(), dfa.alphabet());
        prop_assert_eq!(dfa.states().len(), dfa.states().len());
    }

    #[test]
    fn chomsky_normal_form_shape_is_respected((dfa, _) in dfa_strategy(4, 2)) {
        let cfg = dfa.cf_grammarize().unwrap().chomsky_normalize();
        let vars: HashSet<String> = cfg.variables().into_iter().collect();
        for var in &vars {
            for p in cfg.productions_of(var).unwrap() {
                match p.0.len() {
                    0 => prop_assert_eq!(var.as_str(), cfg.start()),
                    1 => prop_assert!(!vars.contains(&p.0[0])),
                    2 => prop_assert!(vars.contains(&p.0[0]) && vars.contains(&p.0[1])),
                    n => prop_assert!(false, "production of length {n} survived CNF"),
                }
            }
        }
    }
}
