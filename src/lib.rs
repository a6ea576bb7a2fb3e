//! # finaut
//!
//! `finaut` is a Rust library for finite automata: DFAs, NFAs, finite-state
//! transducers and context-free grammars, with conversions between them
//! and a small regex surface language. It is a pure, synchronous core —
//! there is no file format, no CLI and no I/O; callers construct automata
//! from in-memory transition tables and get `Result`s back.
//!
//! ## Usage
//!
//! ```rust
//! use finaut::dfa::Dfa;
//! use std::collections::{HashMap, HashSet};
//!
//! let mut transitions = HashMap::new();
//! for (from, sym, to) in [
//!     ("s0", "a", "s1"), ("s0", "b", "s0"),
//!     ("s1", "a", "s1"), ("s1", "b", "s0"),
//! ] {
//!     transitions.insert((from.to_string(), sym.to_string()), to.to_string());
//! }
//! let dfa = Dfa::new(&transitions, "s0", &HashSet::from(["s1".to_string()])).unwrap();
//! assert!(dfa.accepts(&["b", "a", "a"]).unwrap());
//! assert!(!dfa.accepts(&["b", "a", "b"]).unwrap());
//! ```
//!
//! Every automaton and grammar is built by a validating constructor that
//! checks the shape of its input (states, alphabet, transitions must line
//! up) and reports a specific [`error::BuildError`] if they don't. Once
//! built, values are immutable; operations like [`dfa::Dfa::union`] or
//! [`nfa::Nfa::determinize`] always produce a new value.
//!
//! ## Modules
//!
//! * [`dfa`] — deterministic finite automata: evaluation, union,
//!   concatenation, conversion to an equivalent NFA, extraction of a
//!   recognizing regex, and generation of an equivalent right-linear
//!   grammar.
//! * [`nfa`] — nondeterministic finite automata with ε-moves: evaluation,
//!   union, concatenation, Kleene star, determinization and compiling a
//!   pattern in the [`regex`] surface language.
//! * [`fst`] — deterministic finite-state transducers.
//! * [`cfg`] — context-free grammars: derivation checking and conversion
//!   to Chomsky Normal Form.
//! * [`regex`] — the pattern syntax compiled by [`nfa::Nfa::fit`].
//! * [`error`] — the shared error types raised by every validating
//!   constructor.

pub mod cfg;
pub mod dfa;
pub mod error;
pub mod fst;
pub mod nfa;
pub mod regex;

#[cfg(test)]
mod tests;
