//! Shared validation error categories.
//!
//! Every engine in this crate validates its input at construction time and
//! fails with a categorized error naming the offending state or symbol,
//! rather than a generic "invalid" message. [`BuildError`] covers the
//! categories common to [`crate::dfa::Dfa`], [`crate::nfa::Nfa`] and
//! [`crate::fst::Fst`]; [`AlphabetError`] is raised at call time when a
//! string outside an automaton's alphabet is processed.

use thiserror::Error;

/// A rejected automaton/transducer construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The declared start state is not among the inferred states.
    #[error("start state '{0}' is not among the states of the transition table")]
    StartNotInStates(String),
    /// An accepting state is not among the inferred states.
    #[error("accepting state '{0}' is not among the states of the transition table")]
    AcceptNotSubset(String),
    /// A transition targets a state that doesn't exist.
    #[error("transition from '{from}' on '{symbol}' targets '{to}', which is not a known state")]
    RangeViolation {
        from: String,
        symbol: String,
        to: String,
    },
    /// A symbol in the transition table is not exactly one character long.
    #[error("'{0}' is not a single-character symbol")]
    SymbolArity(String),
    /// A (state, symbol) pair required by a total transition function is absent.
    #[error("no transition defined for state '{state}' on symbol '{symbol}'")]
    MissingCase { state: String, symbol: String },
}

/// Raised when a string passed to `accepts`/`process` contains a symbol
/// that is not a member of the automaton's alphabet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("'{symbol}' is not a member of the alphabet")]
pub struct AlphabetError {
    pub symbol: String,
}

impl AlphabetError {
    pub(crate) fn new(symbol: impl Into<String>) -> Self {
        AlphabetError {
            symbol: symbol.into(),
        }
    }
}
