//! Property-based tests for version parsing and ordering.

#![cfg(test)]

use std::cmp::Ordering;

use proptest::prelude::*;

use crate::version::Version;

// =============================================================================
// Generators
// =============================================================================

/// Generate a random component sequence (1 to 5 components).
fn arb_components() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..1000, 1..6)
}

fn render(components: &[u64]) -> String {
    components
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

fn parse(components: &[u64]) -> Version {
    render(components).parse().expect("rendered version parses")
}

proptest! {
    #[test]
    fn parse_round_trips_components(components in arb_components()) {
        let version = parse(&components);
        prop_assert_eq!(version.components(), components.as_slice());
        prop_assert_eq!(version.to_string(), render(&components));
    }

    #[test]
    fn comparison_is_antisymmetric(a in arb_components(), b in arb_components()) {
        let a = parse(&a);
        let b = parse(&b);
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        prop_assert_eq!(a == b, a.cmp(&b) == Ordering::Equal);
    }

    #[test]
    fn comparison_is_transitive(
        a in arb_components(),
        b in arb_components(),
        c in arb_components(),
    ) {
        let mut versions = [parse(&a), parse(&b), parse(&c)];
        versions.sort();
        prop_assert!(versions[0] <= versions[1]);
        prop_assert!(versions[1] <= versions[2]);
        prop_assert!(versions[0] <= versions[2]);
    }

    #[test]
    fn trailing_zeros_do_not_affect_ordering(
        components in arb_components(),
        extra in 0usize..4,
    ) {
        let mut padded = components.clone();
        padded.extend(std::iter::repeat(0).take(extra));

        let short = parse(&components);
        let long = parse(&padded);
        prop_assert_eq!(short.cmp(&long), Ordering::Equal);
        prop_assert_eq!(&short, &long);
    }

    #[test]
    fn incrementing_any_component_orders_greater(
        components in arb_components(),
        index in 0usize..5,
    ) {
        let index = index % components.len();
        let mut bumped = components.clone();
        bumped[index] += 1;
        prop_assert!(parse(&bumped) > parse(&components));
    }
}
