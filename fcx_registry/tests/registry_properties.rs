//! Property-style checks on the operator table, run against the live
//! global registry rather than a hand-built fixture.

use fcx_registry::Registry;
use proptest::prelude::*;

#[test]
fn every_family_is_represented() {
    let registry = Registry::global();
    for family in fcx_registry::OperatorFamily::ALL {
        let count = registry.descriptors().iter().filter(|d| d.family == family).count();
        assert!(count > 0, "family {family:?} has no operators registered");
    }
}

#[test]
fn no_two_descriptors_share_a_symbol() {
    let registry = Registry::global();
    let mut symbols: Vec<&str> = registry.descriptors().iter().map(|d| d.symbol).collect();
    let before = symbols.len();
    symbols.sort_unstable();
    symbols.dedup();
    assert_eq!(symbols.len(), before, "duplicate symbol found in the operator table");
}

proptest! {
    /// The trie never reports a match longer than the input it was given,
    /// and never matches past the 20-byte scan cap.
    #[test]
    fn longest_match_never_exceeds_input_or_cap(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let registry = Registry::global();
        if let Some((_, len)) = registry.longest_match(&bytes) {
            prop_assert!(len <= bytes.len());
            prop_assert!(len <= fcx_registry::MAX_OPERATOR_SCAN_LEN);
        }
    }

    /// Every registered symbol, scanned in isolation, matches itself exactly.
    #[test]
    fn registered_symbol_index(i in 0usize..213) {
        let registry = Registry::global();
        if let Some(descriptor) = registry.descriptors().get(i) {
            let (matched, len) = registry.longest_match(descriptor.symbol.as_bytes()).unwrap();
            prop_assert_eq!(len, descriptor.symbol.len());
            prop_assert_eq!(matched.symbol, descriptor.symbol);
        }
    }
}
