//! The canonical FCx operator registry: a static table of symbolic operators
//! plus a byte-trie for greedy longest-match lookup during lexing.
//!
//! The registry is process-wide, read-only state. It is built once (lazily,
//! on first use) via [`Registry::global`] and is never torn down explicitly —
//! process exit is its implicit single teardown.

mod descriptor;
mod trie;

use std::collections::HashMap;
use std::sync::OnceLock;

pub use descriptor::{
    build_table, Arity, Associativity, Directionality, OperatorDescriptor, OperatorFamily, OperatorKind,
};
use trie::Trie;

/// Longest byte-length any registered operator symbol may have. The lexer
/// uses this as its hard scan cap so a malformed run of symbol characters
/// can't make `longest_match` walk arbitrarily far.
pub const MAX_OPERATOR_SCAN_LEN: usize = 20;

pub struct Registry {
    descriptors: Vec<OperatorDescriptor>,
    by_symbol: HashMap<&'static str, usize>,
    trie: Trie,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

impl Registry {
    fn build() -> Self {
        let descriptors = build_table();
        let by_symbol = descriptors.iter().enumerate().map(|(i, d)| (d.symbol, i)).collect();
        let trie = Trie::build(&descriptors);
        let registry = Registry { descriptors, by_symbol, trie };
        if let Err(errors) = registry.validate() {
            // The table is a compile-time constant authored by this crate; a
            // validation failure here is a programming error, not user input.
            panic!("operator registry failed validation: {errors:?}");
        }
        registry
    }

    /// Returns the process-wide registry, building it on first access.
    pub fn global() -> &'static Registry {
        REGISTRY.get_or_init(|| {
            log::debug!("initializing operator registry");
            Self::build()
        })
    }

    pub fn descriptors(&self) -> &[OperatorDescriptor] {
        &self.descriptors
    }

    pub fn lookup(&self, symbol: &str) -> Option<&OperatorDescriptor> {
        self.by_symbol.get(symbol).map(|&i| &self.descriptors[i])
    }

    /// Greedy longest-match scan starting at the beginning of `input`.
    /// Scans at most [`MAX_OPERATOR_SCAN_LEN`] bytes.
    pub fn longest_match(&self, input: &[u8]) -> Option<(&OperatorDescriptor, usize)> {
        self.trie
            .longest_match(input, MAX_OPERATOR_SCAN_LEN)
            .map(|(index, len)| (&self.descriptors[index], len))
    }

    pub fn precedence_of(&self, symbol: &str) -> Option<u8> {
        self.lookup(symbol).map(|d| d.precedence)
    }

    pub fn associativity_of(&self, symbol: &str) -> Option<Associativity> {
        self.lookup(symbol).map(|d| d.associativity)
    }

    pub fn arity_of(&self, symbol: &str) -> Option<Arity> {
        self.lookup(symbol).map(|d| d.arity)
    }

    pub fn family_of(&self, symbol: &str) -> Option<OperatorFamily> {
        self.lookup(symbol).map(|d| d.family)
    }

    pub fn description_of(&self, symbol: &str) -> Option<&'static str> {
        self.lookup(symbol).map(|d| d.description)
    }

    /// Up to three registered symbols close to `attempted`, used for
    /// "did you mean" lex diagnostics. Candidates share the attempted
    /// symbol's first byte and are ranked by length difference.
    pub fn suggest(&self, attempted: &str) -> Vec<&'static str> {
        let Some(first) = attempted.as_bytes().first().copied() else {
            return Vec::new();
        };
        let mut candidates: Vec<&'static str> = self
            .descriptors
            .iter()
            .map(|d| d.symbol)
            .filter(|s| s.as_bytes().first() == Some(&first))
            .collect();
        candidates.sort_by_key(|s| (s.len() as i64 - attempted.len() as i64).abs());
        candidates.truncate(3);
        candidates
    }

    /// Checks the invariants the registry is expected to uphold: at least
    /// 200 distinct symbols, precedence values within 1..=12, no duplicate
    /// symbols, every symbol reachable through the trie, and each family
    /// clearing its minimum population.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.descriptors.len() < 200 {
            errors.push(format!("expected at least 200 operators, found {}", self.descriptors.len()));
        }

        for d in &self.descriptors {
            if !(1..=12).contains(&d.precedence) {
                errors.push(format!("{}: precedence {} out of range 1..=12", d.symbol, d.precedence));
            }
            if !self.trie.contains(d.symbol) {
                errors.push(format!("{}: not reachable through the trie", d.symbol));
            }
        }

        if self.by_symbol.len() != self.descriptors.len() {
            errors.push(format!(
                "duplicate symbols present: {} unique vs {} total",
                self.by_symbol.len(),
                self.descriptors.len()
            ));
        }

        for family in OperatorFamily::ALL {
            let count = self.descriptors.iter().filter(|d| d.family == family).count();
            if count < family.minimum_population() {
                errors.push(format!(
                    "family {family:?} has {count} operators, below its minimum of {}",
                    family.minimum_population()
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_registry_validates() {
        assert!(Registry::global().validate().is_ok());
    }

    #[test]
    fn has_at_least_two_hundred_operators() {
        assert!(Registry::global().descriptors().len() >= 200);
    }

    #[test]
    fn greedy_lookup_prefers_the_longest_registered_prefix() {
        let registry = Registry::global();
        let (descriptor, len) = registry.longest_match(b"<<=rest").unwrap();
        assert_eq!(descriptor.symbol, "<<=");
        assert_eq!(len, 3);
    }

    #[test]
    fn lookup_and_trie_agree_on_every_symbol() {
        let registry = Registry::global();
        for descriptor in registry.descriptors() {
            let (matched, len) = registry.longest_match(descriptor.symbol.as_bytes()).unwrap();
            assert_eq!(len, descriptor.symbol.len());
            assert_eq!(matched.symbol, descriptor.symbol);
        }
    }

    #[test]
    fn scan_cap_is_enforced() {
        let registry = Registry::global();
        let too_long = "a".repeat(MAX_OPERATOR_SCAN_LEN + 5);
        assert!(registry.longest_match(too_long.as_bytes()).is_none());
    }

    #[test]
    fn suggestions_are_bounded_to_three() {
        let registry = Registry::global();
        let suggestions = registry.suggest("<~~~~");
        assert!(suggestions.len() <= 3);
    }

    #[test]
    fn unknown_symbol_is_not_found() {
        assert!(Registry::global().lookup("<~~not-real~~>").is_none());
    }
}
