//! Fault archetype examples from the book

use bugsynth::mutator::{FaultArchetype, FaultInjector, InjectionSite};
use bugsynth::oracle::{ExecutabilityCheck, Verdict};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::book::python_oracle;

const ADD: &str = "def add(a, b):\n    return a + b";

fn injector() -> FaultInjector {
    FaultInjector::new().expect("injector should build")
}

#[test]
fn test_division_by_zero_fallback_example() {
    let fault = injector()
        .apply(ADD, FaultArchetype::DivisionByZero)
        .expect("injection should succeed");
    assert_eq!(fault.mutated, "def add(a, b):\n    return a + b\n1 / 0");
    assert_eq!(fault.site, InjectionSite::Appended);

    let Some(oracle) = python_oracle() else { return };
    match oracle.check(&fault.mutated).expect("oracle should run") {
        Verdict::Buggy { error } => assert!(error.starts_with("ZeroDivisionError")),
        other => panic!("expected Buggy, got {other:?}"),
    }
}

#[test]
fn test_in_place_examples() {
    let injector = injector();
    let cases = [
        (
            FaultArchetype::IdentifierCorruption,
            "def total(xs):\n    s = 0\n    return s",
            "def total(xs):\n    s = 0\n    return s_bug",
        ),
        (
            FaultArchetype::OutOfBounds,
            "def head(xs):\n    return xs[0]",
            "def head(xs):\n    return xs[100]",
        ),
        (
            FaultArchetype::DivisionByZero,
            "def mean(xs):\n    return sum(xs) / len(xs)",
            "def mean(xs):\n    return sum(xs) / 0",
        ),
        (
            FaultArchetype::DivisionByZero,
            "def scale(x, k):\n    x /= k\n    return x",
            "def scale(x, k):\n    x /= 0\n    return x",
        ),
        (
            FaultArchetype::OutOfBounds,
            "def corner(grid):\n    return grid[0][0]",
            "def corner(grid):\n    return grid[100][0]",
        ),
    ];
    for (archetype, code, expected) in cases {
        let fault = injector.apply(code, archetype).expect("injection should succeed");
        assert_eq!(fault.mutated, expected, "{archetype}");
        assert!(matches!(fault.site, InjectionSite::InPlace { .. }));
    }
}

#[test]
fn test_fallback_variants_are_buggy_example() {
    let Some(oracle) = python_oracle() else { return };
    let injector = injector();
    let units = [
        "class Empty:\n    pass",
        "def noop():\n    pass",
        "def greet(name):\n    print(name)",
    ];
    for unit in units {
        for archetype in FaultArchetype::all() {
            let fault = injector.apply(unit, archetype).expect("injection should succeed");
            if fault.site != InjectionSite::Appended {
                continue;
            }
            let verdict = oracle.check(&fault.mutated).expect("oracle should run");
            match verdict {
                Verdict::Buggy { error } => {
                    assert!(
                        error.starts_with(archetype.expected_exception()),
                        "{archetype}: {error}"
                    );
                }
                other => panic!("{archetype} fallback on {unit:?} gave {other:?}"),
            }
        }
    }
}

#[test]
fn test_attribute_misuse_is_always_buggy_example() {
    let Some(oracle) = python_oracle() else { return };
    let injector = FaultInjector::with_archetypes(vec![FaultArchetype::AttributeMisuse])
        .expect("injector should build");
    let mut rng = StdRng::seed_from_u64(5);
    let fault = injector.inject(ADD, &mut rng).expect("injection should succeed");
    assert_eq!(fault.mutated, "def add(a, b):\n    return a + b\n(5).append(3)");
    assert!(!oracle.check(&fault.mutated).expect("oracle should run").is_clean());
}

#[test]
fn test_seeded_selection_example() {
    let injector = injector();
    let run = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..10)
            .map(|_| injector.inject(ADD, &mut rng).expect("injection should succeed").archetype)
            .collect::<Vec<_>>()
    };
    assert_eq!(run(2024), run(2024));
}
