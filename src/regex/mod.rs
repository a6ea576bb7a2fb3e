//! # Regex surface language
//!
//! A small regex syntax over a fixed alphabet, compiled directly to an
//! [`Nfa`] (§4.4). There are six reserved characters: `(`, `)`, `|`, `*`,
//! `•` and the two literal-language markers `€` (empty string) and `Ø`
//! (empty language). Everything else is a literal alphabet symbol.
//! Concatenation is usually implicit — writing two operands next to each
//! other is enough — but `•` can always be used to spell it out.
//!
//! ## Syntax
//! * `(` `)` group a subexpression.
//! * `|` is alternation, `•` is concatenation, both left-associative;
//!   `*` is postfix Kleene star. Precedence: `|` < `•` < `*`.
//! * `€` matches only the empty string; `Ø` matches nothing.
//!
//! Unlike a typical regex engine, no syntax tree is ever built: the
//! pattern is tokenized, implicit concatenation is inserted, the result
//! is rewritten to postfix order with the shunting-yard algorithm, and
//! postfix evaluation folds the tokens directly into [`Nfa`] values using
//! [`Nfa::union`], [`Nfa::concat`] and [`Nfa::star`].
//!
//! ## Example
//! ```
//! use finaut::regex;
//! use std::collections::HashSet;
//!
//! let alphabet = HashSet::from(["0".to_string(), "1".to_string()]);
//! let nfa = regex::compile("0*1(0|€)", &alphabet).unwrap();
//! assert!(nfa.accepts(&["1"]).unwrap());
//! assert!(nfa.accepts(&["1", "0"]).unwrap());
//! assert!(nfa.accepts(&["0", "0", "0", "1"]).unwrap());
//! assert!(!nfa.accepts(&["0"]).unwrap());
//! ```

use crate::nfa::{Nfa, NfaState};
use std::collections::HashSet;
use std::rc::Rc;
use thiserror::Error;

const RESERVED: [char; 7] = ['(', ')', '|', '*', '•', '€', 'Ø'];

/// A pattern that could not be compiled to an [`Nfa`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegexError {
    /// An alphabet symbol is itself one of the reserved characters, so no
    /// pattern could ever refer to it unambiguously.
    #[error("alphabet symbol '{0}' collides with a reserved regex character")]
    AlphabetCollision(String),
    /// A character appeared in the pattern that is neither reserved nor a
    /// member of the alphabet.
    #[error("'{0}' is not in the alphabet")]
    StraySymbol(char),
    /// Two operators (or an operator and a missing operand) are adjacent
    /// with nothing between them, e.g. a leading `*` or `||`.
    #[error("{0}")]
    DanglingOperator(String),
    /// Parentheses don't balance.
    #[error("unmatched parentheses")]
    UnmatchedParen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Char(String),
    Epsilon,
    Empty,
    LParen,
    RParen,
    Alt,
    Concat,
    Star,
}

fn ends_operand(t: &Token) -> bool {
    matches!(
        t,
        Token::RParen | Token::Char(_) | Token::Epsilon | Token::Empty | Token::Star
    )
}

fn starts_operand(t: &Token) -> bool {
    matches!(t, Token::LParen | Token::Char(_) | Token::Epsilon | Token::Empty)
}

fn precedence(t: &Token) -> u8 {
    match t {
        Token::Alt => 1,
        Token::Concat => 2,
        Token::Star => 3,
        _ => 0,
    }
}

/// Compiles `pattern` to an [`Nfa`] over `alphabet`.
///
/// # Errors
/// See [`RegexError`] for every rejected-pattern category.
pub fn compile(pattern: &str, alphabet: &HashSet<String>) -> Result<Nfa, RegexError> {
    for sym in alphabet {
        if sym.chars().count() == 1 && RESERVED.contains(&sym.chars().next().unwrap()) {
            return Err(RegexError::AlphabetCollision(sym.clone()));
        }
    }

    let tokens = tokenize(pattern.trim(), alphabet)?;
    let tokens = insert_implicit_concat(tokens);
    let postfix = to_postfix(tokens)?;
    let sorted_alphabet: Vec<Rc<str>> = {
        let mut v: Vec<Rc<str>> = alphabet.iter().map(|s| Rc::from(s.as_str())).collect();
        v.sort();
        v
    };
    Ok(evaluate_postfix(postfix, &sorted_alphabet))
}

fn tokenize(pattern: &str, alphabet: &HashSet<String>) -> Result<Vec<Token>, RegexError> {
    let mut tokens = Vec::new();
    for c in pattern.chars() {
        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '|' => Token::Alt,
            '•' => Token::Concat,
            '*' => Token::Star,
            '€' => Token::Epsilon,
            'Ø' => Token::Empty,
            c if alphabet.contains(&c.to_string()) => Token::Char(c.to_string()),
            c => return Err(RegexError::StraySymbol(c)),
        };

        match &token {
            Token::Star => {
                if !tokens.last().is_some_and(ends_operand) {
                    return Err(RegexError::DanglingOperator(
                        "'*' has no preceding operand".to_string(),
                    ));
                }
            }
            Token::Alt | Token::Concat => {
                if !tokens.last().is_some_and(ends_operand) {
                    return Err(RegexError::DanglingOperator(format!(
                        "'{}' has no preceding operand",
                        if matches!(token, Token::Alt) { "|" } else { "•" }
                    )));
                }
            }
            Token::RParen => {
                if !tokens.last().is_some_and(ends_operand) {
                    return Err(RegexError::DanglingOperator(
                        "')' closes a group with no operand inside".to_string(),
                    ));
                }
            }
            _ => {}
        }
        tokens.push(token);
    }
    if let Some(last @ (Token::Alt | Token::Concat)) = tokens.last() {
        return Err(RegexError::DanglingOperator(format!(
            "'{}' has no following operand",
            if matches!(last, Token::Alt) { "|" } else { "•" }
        )));
    }
    Ok(tokens)
}

fn insert_implicit_concat(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len() * 2);
    let mut iter = tokens.into_iter().peekable();
    while let Some(tok) = iter.next() {
        let needs_concat = ends_operand(&tok)
            && iter.peek().is_some_and(starts_operand);
        out.push(tok);
        if needs_concat {
            out.push(Token::Concat);
        }
    }
    out
}

fn to_postfix(tokens: Vec<Token>) -> Result<Vec<Token>, RegexError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut ops: Vec<Token> = Vec::new();

    for tok in tokens {
        match tok {
            Token::Char(_) | Token::Epsilon | Token::Empty => output.push(tok),
            Token::LParen => ops.push(tok),
            Token::RParen => {
                loop {
                    match ops.pop() {
                        Some(Token::LParen) => break,
                        Some(op) => output.push(op),
                        None => return Err(RegexError::UnmatchedParen),
                    }
                }
            }
            Token::Alt | Token::Concat | Token::Star => {
                while ops
                    .last()
                    .is_some_and(|top| *top != Token::LParen && precedence(top) >= precedence(&tok))
                {
                    output.push(ops.pop().unwrap());
                }
                ops.push(tok);
            }
        }
    }
    while let Some(op) = ops.pop() {
        if op == Token::LParen {
            return Err(RegexError::UnmatchedParen);
        }
        output.push(op);
    }
    Ok(output)
}

fn evaluate_postfix(postfix: Vec<Token>, alphabet: &[Rc<str>]) -> Nfa {
    let mut stack: Vec<Nfa> = Vec::new();
    for tok in postfix {
        match tok {
            Token::Char(c) => stack.push(primitive_symbol(&c, alphabet)),
            Token::Epsilon => stack.push(primitive_epsilon(alphabet)),
            Token::Empty => stack.push(primitive_empty(alphabet)),
            Token::Star => {
                let a = stack.pop().expect("postfix from a valid parse is well-formed");
                stack.push(a.star());
            }
            Token::Concat => {
                let b = stack.pop().expect("postfix from a valid parse is well-formed");
                let a = stack.pop().expect("postfix from a valid parse is well-formed");
                stack.push(a.concat(&b));
            }
            Token::Alt => {
                let b = stack.pop().expect("postfix from a valid parse is well-formed");
                let a = stack.pop().expect("postfix from a valid parse is well-formed");
                stack.push(a.union(&b));
            }
            Token::LParen | Token::RParen => unreachable!("parentheses never reach postfix"),
        }
    }
    stack.pop().unwrap_or_else(|| primitive_empty(alphabet))
}

fn primitive_symbol(sym: &str, alphabet: &[Rc<str>]) -> Nfa {
    let idx = alphabet.iter().position(|s| s.as_ref() == sym).expect(
        "caller validated every literal character is a member of the alphabet",
    );
    let mut transitions = vec![HashSet::new(); alphabet.len()];
    transitions[idx] = HashSet::from([1]);
    Nfa {
        alphabet: alphabet.into(),
        states: vec![
            NfaState {
                name: Rc::from("0"),
                accepting: false,
                transitions,
                epsilon_transitions: HashSet::new(),
            },
            NfaState {
                name: Rc::from("1"),
                accepting: true,
                transitions: vec![HashSet::new(); alphabet.len()],
                epsilon_transitions: HashSet::new(),
            },
        ],
        initial_state: 0,
    }
}

fn primitive_epsilon(alphabet: &[Rc<str>]) -> Nfa {
    Nfa {
        alphabet: alphabet.into(),
        states: vec![NfaState {
            name: Rc::from("0"),
            accepting: true,
            transitions: vec![HashSet::new(); alphabet.len()],
            epsilon_transitions: HashSet::new(),
        }],
        initial_state: 0,
    }
}

fn primitive_empty(alphabet: &[Rc<str>]) -> Nfa {
    Nfa {
        alphabet: alphabet.into(),
        states: vec![NfaState {
            name: Rc::from("0"),
            accepting: false,
            transitions: vec![HashSet::new(); alphabet.len()],
            epsilon_transitions: HashSet::new(),
        }],
        initial_state: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alphabet(syms: &[&str]) -> HashSet<String> {
        syms.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn literal_concatenation() {
        let nfa = compile("ab", &alphabet(&["a", "b"])).unwrap();
        assert!(nfa.accepts(&["a", "b"]).unwrap());
        assert!(!nfa.accepts(&["a"]).unwrap());
        assert!(!nfa.accepts(&["b", "a"]).unwrap());
    }

    #[test]
    fn alternation_and_star() {
        let nfa = compile("(a|b)*", &alphabet(&["a", "b"])).unwrap();
        assert!(nfa.accepts(&[]).unwrap());
        assert!(nfa.accepts(&["a", "b", "a", "a"]).unwrap());
    }

    #[test]
    fn epsilon_and_empty_language() {
        let nfa_eps = compile("€", &alphabet(&["a"])).unwrap();
        assert!(nfa_eps.accepts(&[]).unwrap());
        assert!(!nfa_eps.accepts(&["a"]).unwrap());

        let nfa_empty = compile("Ø", &alphabet(&["a"])).unwrap();
        assert!(!nfa_empty.accepts(&[]).unwrap());
        assert!(!nfa_empty.accepts(&["a"]).unwrap());
    }

    #[test]
    fn alphabet_collision_is_rejected() {
        let err = compile("a", &alphabet(&["a", "("])).unwrap_err();
        assert_eq!(err, RegexError::AlphabetCollision("(".to_string()));
    }

    #[test]
    fn dangling_star_is_rejected() {
        let err = compile("*a", &alphabet(&["a"])).unwrap_err();
        assert!(matches!(err, RegexError::DanglingOperator(_)));
    }

    #[test]
    fn trailing_binary_operator_is_rejected() {
        assert!(matches!(
            compile("a|", &alphabet(&["a"])).unwrap_err(),
            RegexError::DanglingOperator(_)
        ));
        assert!(matches!(
            compile("a•", &alphabet(&["a"])).unwrap_err(),
            RegexError::DanglingOperator(_)
        ));
    }

    #[test]
    fn unmatched_parens_are_rejected() {
        assert_eq!(
            compile("(a", &alphabet(&["a"])).unwrap_err(),
            RegexError::UnmatchedParen
        );
        assert_eq!(
            compile("a)", &alphabet(&["a"])).unwrap_err(),
            RegexError::UnmatchedParen
        );
    }

    #[test]
    fn stray_symbol_is_rejected() {
        assert_eq!(
            compile("ab", &alphabet(&["a"])).unwrap_err(),
            RegexError::StraySymbol('b')
        );
    }
}
