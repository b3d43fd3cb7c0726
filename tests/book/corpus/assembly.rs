//! Corpus assembly examples from the book

use std::path::Path;

use bugsynth::data::{CorpusAssembler, DataPipeline, Label};
use bugsynth::mutator::FaultInjector;
use bugsynth::oracle::{ExecutabilityCheck, SyntaxOracle};
use bugsynth::source::LocalMaterializer;

use crate::book::python_oracle;

const MODULE: &str = r#"def add(a, b):
    return a + b

def mean(xs):
    return sum(xs) / len(xs)

class Settings:
    debug = undefined_flag

class Stack:
    def __init__(self):
        self.items = []

    def top(self):
        return self.items[-1]
"#;

#[test]
fn test_every_clean_unit_has_one_variant_example() {
    let Some(oracle) = python_oracle() else { return };
    let mut assembler = CorpusAssembler::new(&oracle, 42).expect("assembler should build");
    assembler.add_source(MODULE, Path::new("module.py"));

    let stats = assembler.stats().clone();
    assert_eq!(stats.units_extracted, 4);
    assert_eq!(stats.clean, 3);
    assert_eq!(stats.buggy_baseline, 1);
    assert_eq!(stats.variants_injected, 3);

    let injector = FaultInjector::new().expect("injector should build");
    let examples = assembler.corpus().examples();
    let mut i = 0;
    while i < examples.len() {
        let example = &examples[i];
        if example.label == Label::Clean {
            let variant = &examples[i + 1];
            assert_eq!(variant.label, Label::Buggy);
            let archetype = variant.archetype.expect("variants record their archetype");
            let replay = injector
                .apply(&example.snippet, archetype)
                .expect("injection should succeed");
            assert_eq!(replay.mutated, variant.snippet);
            i += 2;
        } else {
            assert!(example.archetype.is_none());
            assert!(example.snippet.contains("undefined_flag"));
            i += 1;
        }
    }
}

#[test]
fn test_pipeline_over_local_tree_example() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("module.py"), MODULE).expect("write");
    std::fs::write(dir.path().join("broken.py"), "def (\n").expect("write");

    let oracle = SyntaxOracle::new().expect("oracle should build");
    let pipeline = DataPipeline::new()
        .repositories([dir.path().to_string_lossy().to_string()])
        .seed(7);
    let (corpus, stats) = pipeline
        .run(&LocalMaterializer, &oracle as &dyn ExecutabilityCheck)
        .expect("pipeline should run");

    assert_eq!(stats.files_scanned, 2);
    assert_eq!(stats.parse_failures, 1);
    // Syntax-only labeling calls every parseable unit Clean.
    assert_eq!(corpus.label_counts().clean, 4);
    assert_eq!(corpus.label_counts().buggy, 4);
}

#[test]
fn test_fixed_seed_gives_fixed_corpus_example() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("module.py"), MODULE).expect("write");
    let oracle = SyntaxOracle::new().expect("oracle should build");

    let build = |seed: u64| {
        DataPipeline::new()
            .repositories([dir.path().to_string_lossy().to_string()])
            .seed(seed)
            .run(&LocalMaterializer, &oracle)
            .expect("pipeline should run")
            .0
            .into_examples()
    };
    assert_eq!(build(1), build(1));
}
