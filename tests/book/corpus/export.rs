//! Export examples from the book

use bugsynth::data::export::{export_all, read_json};
use bugsynth::data::{Corpus, Label, LabeledExample};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_export_example() {
    let mut corpus = Corpus::new();
    corpus.push(LabeledExample::new("def add(a, b):\n    return a + b", Label::Clean));
    corpus.push(LabeledExample::new(
        "def add(a, b):\n    return a + b\n1 / 0",
        Label::Buggy,
    ));
    let shuffled = corpus.shuffle(&mut StdRng::seed_from_u64(0));

    let dir = tempfile::tempdir().expect("tempdir");
    let json = dir.path().join("dataset.json");
    let csv = dir.path().join("dataset.csv");
    export_all(&shuffled, &json, &csv).expect("export should succeed");

    let json_text = std::fs::read_to_string(&json).expect("read json");
    assert!(json_text.starts_with("[\n    {\n        \"snippet\": "));
    assert!(!json_text.contains("\"id\""));

    let csv_text = std::fs::read_to_string(&csv).expect("read csv");
    let mut lines = csv_text.lines();
    assert_eq!(lines.next(), Some("id,snippet,label"));
    let first = lines.next().expect("first row");
    assert!(first.starts_with("1,\"def add(a, b):\\n    return a + b"));

    let back = read_json(&json).expect("read back");
    assert_eq!(back.len(), 2);
    assert_eq!(back, shuffled.examples());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// CSV row count is JSON length plus the header
    #[test]
    fn prop_csv_row_count(labels in proptest::collection::vec(any::<bool>(), 0..40), seed in any::<u64>()) {
        let mut corpus = Corpus::new();
        for (i, buggy) in labels.iter().enumerate() {
            let label = if *buggy { Label::Buggy } else { Label::Clean };
            corpus.push(LabeledExample::new(format!("def f{i}(a, b):\n    return a, b"), label));
        }
        let shuffled = corpus.shuffle(&mut StdRng::seed_from_u64(seed));

        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("c.json");
        let csv = dir.path().join("c.csv");
        export_all(&shuffled, &json, &csv).unwrap();

        let json_len = read_json(&json).unwrap().len();
        let csv_rows = std::fs::read_to_string(&csv).unwrap().lines().count();
        prop_assert_eq!(csv_rows, json_len + 1);
        prop_assert_eq!(json_len, labels.len());
    }
}
