//! # Context-free grammar
//!
//! [`Cfg`] is the tuple (V, T, R, S) of §3/§4.6: `R` maps each variable to
//! a set of productions, each an ordered sequence of symbols. `V` is the
//! key set of `R`; `T` is inferred as every symbol appearing in some
//! production that isn't a variable. Per §9's Open Question, a production
//! is always an explicit [`Production`] (an ordered sequence); a bare
//! `&str` is sugar for a one-element sequence and is never split into
//! characters.
//!
//! ## Example
//! ```
//! use finaut::cfg::{Cfg, Production};
//! use std::collections::{HashMap, HashSet};
//!
//! // S -> a S b | €
//! let mut rules = HashMap::new();
//! rules.insert(
//!     "S".to_string(),
//!     HashSet::from([
//!         Production(vec!["a".to_string(), "S".to_string(), "b".to_string()]),
//!         Production(vec![]),
//!     ]),
//! );
//! let g = Cfg::new(rules, "S".to_string()).unwrap();
//! let derivation = vec![
//!     vec!["S".to_string()],
//!     vec!["a".to_string(), "S".to_string(), "b".to_string()],
//!     vec!["a".to_string(), "a".to_string(), "S".to_string(), "b".to_string(), "b".to_string()],
//!     vec!["a".to_string(), "a".to_string(), "b".to_string(), "b".to_string()],
//! ];
//! assert!(g.is_valid_derivation(&derivation));
//! ```

use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// An ordered sequence of symbol names making up one right-hand side. The
/// empty sequence denotes `€`. A bare `&str` is accepted at construction
/// sites as a one-element sequence (never split into characters).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Production(pub Vec<String>);

impl From<&str> for Production {
    fn from(s: &str) -> Self {
        Production(vec![s.to_string()])
    }
}

impl From<Vec<&str>> for Production {
    fn from(v: Vec<&str>) -> Self {
        Production(v.into_iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<String>> for Production {
    fn from(v: Vec<String>) -> Self {
        Production(v)
    }
}

/// A rejected grammar construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CfgError {
    /// No symbol in any production falls outside the variable set, so the
    /// grammar has no terminals at all.
    #[error("grammar has no terminals")]
    NoTerminals,
    /// `start` isn't a key of `rules`.
    #[error("start symbol '{0}' is not a variable of this grammar")]
    StartNotVariable(String),
}

/// A context-free grammar (V, T, R, S).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cfg {
    rules: HashMap<String, HashSet<Production>>,
    terminals: HashSet<String>,
    start: String,
}

impl Cfg {
    /// Validates and constructs a [`Cfg`]. `V` is `rules.keys()`; `T` is
    /// every symbol used in a production that is not itself a key of
    /// `rules`.
    ///
    /// # Errors
    /// - [`CfgError::StartNotVariable`] if `start` isn't a key of `rules`.
    /// - [`CfgError::NoTerminals`] if no production contains a terminal.
    pub fn new(
        rules: HashMap<String, HashSet<Production>>,
        start: String,
    ) -> Result<Cfg, CfgError> {
        if !rules.contains_key(&start) {
            return Err(CfgError::StartNotVariable(start));
        }
        let terminals: HashSet<String> = rules
            .values()
            .flat_map(|prods| prods.iter())
            .flat_map(|p| p.0.iter())
            .filter(|sym| !rules.contains_key(*sym))
            .cloned()
            .collect();
        if terminals.is_empty() {
            return Err(CfgError::NoTerminals);
        }
        Ok(Cfg {
            rules,
            terminals,
            start,
        })
    }

    pub fn variables(&self) -> Vec<String> {
        self.rules.keys().cloned().collect()
    }

    pub fn terminals(&self) -> Vec<String> {
        self.terminals.iter().cloned().collect()
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn productions_of(&self, variable: &str) -> Option<HashSet<Production>> {
        self.rules.get(variable).cloned()
    }

    /// Checks whether `derivation` — a sequence of sentential forms — is a
    /// valid leftmost-or-otherwise single-step derivation in this grammar:
    /// `s₀ = [S]`, and for every `i<n` there is a split
    /// `sᵢ = α·[v]·β` and a production `v → γ ∈ R` with
    /// `sᵢ₊₁ = α·γ·β`. Exactly one variable is rewritten per step.
    pub fn is_valid_derivation(&self, derivation: &[Vec<String>]) -> bool {
        let Some(first) = derivation.first() else {
            return false;
        };
        if first.as_slice() != [self.start.clone()] {
            return false;
        }
        derivation.windows(2).all(|pair| {
            let (cur, next) = (&pair[0], &pair[1]);
            cur.iter().enumerate().any(|(j, sym)| {
                self.rules.get(sym).is_some_and(|prods| {
                    prods.iter().any(|p| {
                        let mut candidate = Vec::with_capacity(cur.len() - 1 + p.0.len());
                        candidate.extend_from_slice(&cur[..j]);
                        candidate.extend(p.0.iter().cloned());
                        candidate.extend_from_slice(&cur[j + 1..]);
                        &candidate == next
                    })
                })
            })
        })
    }

    /// Transforms this grammar into Chomsky Normal Form: every production
    /// is either a single terminal or exactly two variables, with the
    /// standard exception that the (fresh) start variable may still
    /// produce `€`. Runs START, TERM, BIN, DEL and UNIT in that mandatory
    /// order (§4.6); fresh names are drawn from a counter scoped to this
    /// call so they cannot collide with existing variables or terminals.
    pub fn chomsky_normalize(&self) -> Cfg {
        let mut all_names: HashSet<String> = self.rules.keys().cloned().collect();
        all_names.extend(self.terminals.iter().cloned());

        // START: S' -> S, so S never appears on a right-hand side.
        let mut start_fresh = FreshNames::new(all_names.clone(), "S'");
        let new_start = start_fresh.next();
        let mut rules = self.rules.clone();
        rules.insert(
            new_start.clone(),
            HashSet::from([Production(vec![self.start.clone()])]),
        );

        let rules = Self::term(rules, &all_names);
        let rules = Self::bin(rules, &all_names);
        let rules = Self::del(rules, &new_start);
        let rules = Self::unit(rules);

        Cfg::new(rules, new_start).expect("CNF transformation preserves a valid start variable")
    }

    /// TERM: every terminal inside a production of length ≥ 2 is replaced
    /// by a fresh variable producing just that terminal.
    fn term(
        rules: HashMap<String, HashSet<Production>>,
        all_names: &HashSet<String>,
    ) -> HashMap<String, HashSet<Production>> {
        let mut fresh = FreshNames::new(all_names.clone(), "T");
        let mut term_vars: HashMap<String, String> = HashMap::new();
        let mut new_rules = HashMap::new();

        for (var, prods) in &rules {
            let mut new_prods = HashSet::new();
            for p in prods {
                if p.0.len() >= 2 {
                    let replaced = p
                        .0
                        .iter()
                        .map(|sym| {
                            if rules.contains_key(sym) {
                                sym.clone()
                            } else {
                                term_vars
                                    .entry(sym.clone())
                                    .or_insert_with(|| fresh.next())
                                    .clone()
                            }
                        })
                        .collect();
                    new_prods.insert(Production(replaced));
                } else {
                    new_prods.insert(p.clone());
                }
            }
            new_rules.insert(var.clone(), new_prods);
        }
        for (terminal, var) in term_vars {
            new_rules.insert(var, HashSet::from([Production(vec![terminal])]));
        }
        new_rules
    }

    /// BIN: every production of length `k>2` is replaced by a chain of
    /// `k-2` fresh binary productions.
    fn bin(
        rules: HashMap<String, HashSet<Production>>,
        all_names: &HashSet<String>,
    ) -> HashMap<String, HashSet<Production>> {
        let mut fresh = FreshNames::new(all_names.clone(), "X");
        let mut new_rules: HashMap<String, HashSet<Production>> = HashMap::new();

        for (var, prods) in &rules {
            for p in prods {
                if p.0.len() > 2 {
                    let k = p.0.len();
                    let chain: Vec<String> = (0..k - 2).map(|_| fresh.next()).collect();
                    new_rules
                        .entry(var.clone())
                        .or_default()
                        .insert(Production(vec![p.0[0].clone(), chain[0].clone()]));
                    for i in 0..k - 3 {
                        new_rules.entry(chain[i].clone()).or_default().insert(
                            Production(vec![p.0[i + 1].clone(), chain[i + 1].clone()]),
                        );
                    }
                    new_rules
                        .entry(chain[k - 3].clone())
                        .or_default()
                        .insert(Production(vec![p.0[k - 2].clone(), p.0[k - 1].clone()]));
                } else {
                    new_rules.entry(var.clone()).or_default().insert(p.clone());
                }
            }
            new_rules.entry(var.clone()).or_default();
        }
        new_rules
    }

    /// DEL: nullable variables are computed by fixpoint, then every
    /// production gets a variant for each subset of its nullable symbols
    /// omitted. ε-productions are then dropped everywhere except possibly
    /// from `new_start`.
    fn del(
        rules: HashMap<String, HashSet<Production>>,
        new_start: &str,
    ) -> HashMap<String, HashSet<Production>> {
        let mut nullable: HashSet<String> = HashSet::new();
        loop {
            let mut changed = false;
            for (var, prods) in &rules {
                if nullable.contains(var) {
                    continue;
                }
                if prods
                    .iter()
                    .any(|p| p.0.iter().all(|s| nullable.contains(s)))
                {
                    nullable.insert(var.clone());
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let mut new_rules: HashMap<String, HashSet<Production>> = HashMap::new();
        for (var, prods) in &rules {
            let mut generated = HashSet::new();
            for p in prods {
                let nullable_positions: Vec<usize> = p
                    .0
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| nullable.contains(*s))
                    .map(|(i, _)| i)
                    .collect();
                for omit in power_set(&nullable_positions) {
                    let omit: HashSet<usize> = omit.into_iter().collect();
                    let seq: Vec<String> = p
                        .0
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| !omit.contains(i))
                        .map(|(_, s)| s.clone())
                        .collect();
                    generated.insert(Production(seq));
                }
            }
            if var != new_start {
                generated.retain(|p| !p.0.is_empty());
            }
            new_rules.insert(var.clone(), generated);
        }
        new_rules
    }

    /// UNIT: `A -> B` (for a variable `B`) is replaced by `A`'s non-unit
    /// productions closed over the chain of unit productions reachable
    /// from `A`.
    fn unit(rules: HashMap<String, HashSet<Production>>) -> HashMap<String, HashSet<Production>> {
        let vars: HashSet<String> = rules.keys().cloned().collect();
        let is_unit =
            |p: &Production| -> bool { p.0.len() == 1 && vars.contains(&p.0[0]) };

        let mut new_rules = HashMap::new();
        for var in &vars {
            let mut closure = HashSet::from([var.clone()]);
            let mut frontier = vec![var.clone()];
            while let Some(v) = frontier.pop() {
                if let Some(prods) = rules.get(&v) {
                    for p in prods.iter().filter(|p| is_unit(p)) {
                        if closure.insert(p.0[0].clone()) {
                            frontier.push(p.0[0].clone());
                        }
                    }
                }
            }
            let mut prods = HashSet::new();
            for b in &closure {
                if let Some(bp) = rules.get(b) {
                    prods.extend(bp.iter().filter(|p| !is_unit(p)).cloned());
                }
            }
            new_rules.insert(var.clone(), prods);
        }
        new_rules
    }
}

fn power_set(items: &[usize]) -> Vec<Vec<usize>> {
    let n = items.len();
    (0..(1u32 << n))
        .map(|mask| {
            items
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, &v)| v)
                .collect()
        })
        .collect()
}

/// A counter scoped to one transformation, generating names guaranteed
/// not to collide with a fixed set of names reserved up front.
struct FreshNames {
    used: HashSet<String>,
    counter: usize,
    prefix: &'static str,
}

impl FreshNames {
    fn new(used: HashSet<String>, prefix: &'static str) -> Self {
        FreshNames {
            used,
            counter: 0,
            prefix,
        }
    }

    fn next(&mut self) -> String {
        loop {
            let candidate = format!("{}{}", self.prefix, self.counter);
            self.counter += 1;
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
