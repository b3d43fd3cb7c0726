//! Oracle examples from the book

use bugsynth::mutator::{FaultArchetype, FaultInjector};
use bugsynth::oracle::{ExecutabilityCheck, SyntaxOracle, Verdict};

use crate::book::python_oracle;

#[test]
fn test_clean_function_example() {
    let Some(oracle) = python_oracle() else { return };
    let verdict = oracle
        .check("def add(a, b):\n    return a + b")
        .expect("oracle should run");
    assert_eq!(verdict, Verdict::Clean);
}

#[test]
fn test_oracle_idempotent_on_clean_example() {
    let Some(oracle) = python_oracle() else { return };
    let units = [
        "def add(a, b):\n    return a + b",
        "class Point:\n    origin = (0, 0)",
        "def spread(*args, **kwargs):\n    return args, kwargs",
    ];
    for unit in units {
        let first = oracle.check(unit).expect("oracle should run");
        assert_eq!(first, Verdict::Clean);
        for _ in 0..3 {
            assert_eq!(oracle.check(unit).expect("oracle should run"), first);
        }
    }
}

#[test]
fn test_definition_only_example() {
    // The body of a function is not run, so an in-place fault stays Clean.
    let Some(oracle) = python_oracle() else { return };
    let injector = FaultInjector::new().expect("injector should build");
    let fault = injector
        .apply("def add(a, b):\n    return a + b", FaultArchetype::TypeMismatch)
        .expect("injection should succeed");
    assert_eq!(fault.mutated, "def add(a, b):\n    return str('bug') + a + b");
    assert_eq!(oracle.check(&fault.mutated).expect("oracle should run"), Verdict::Clean);
}

#[test]
fn test_class_body_error_example() {
    let Some(oracle) = python_oracle() else { return };
    let verdict = oracle
        .check("class Config:\n    path = missing_setting")
        .expect("oracle should run");
    match verdict {
        Verdict::Buggy { error } => assert!(error.starts_with("NameError")),
        other => panic!("expected Buggy, got {other:?}"),
    }
}

#[test]
fn test_syntax_oracle_example() {
    let oracle = SyntaxOracle::new().expect("oracle should build");
    assert!(oracle.check("def ok():\n    pass").expect("check").is_clean());
    assert!(!oracle.check("def bad(:\n    pass").expect("check").is_clean());
}
