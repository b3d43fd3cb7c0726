//! Labeled corpus
//!
//! Examples are collected into an append-only [`Corpus`] in extraction
//! order. Exporters only accept a [`ShuffledCorpus`], which can only be
//! obtained by consuming a `Corpus` through [`Corpus::shuffle`]. The final
//! permutation therefore happens exactly once, before anything is written.
//!
//! # Record format
//!
//! | Field | Type | Exported |
//! |-------|------|----------|
//! | `snippet` | unit or variant text | yes |
//! | `label` | `0` clean, `1` buggy | yes |
//! | `origin` | source file | no |
//! | `archetype` | fault applied, variants only | no |

pub mod export;
pub mod pipeline;

pub use pipeline::{CorpusAssembler, DataPipeline, PipelineConfig, PipelineStats};

use std::fmt;
use std::path::PathBuf;

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::mutator::FaultArchetype;

/// Binary correctness label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    /// Evaluates without raising
    Clean,
    /// Raises, or is a synthesized variant
    Buggy,
}

impl Label {
    /// Numeric form used in exported files
    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Clean => 0,
            Self::Buggy => 1,
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label.as_u8()
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Clean),
            1 => Ok(Self::Buggy),
            other => Err(format!("invalid label {other}, expected 0 or 1")),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// One corpus entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledExample {
    /// Unit or variant source text
    pub snippet: String,
    /// Correctness label
    pub label: Label,
    /// File the snippet came from
    #[serde(skip)]
    pub origin: Option<PathBuf>,
    /// Fault applied, for synthesized variants
    #[serde(skip)]
    pub archetype: Option<FaultArchetype>,
}

impl LabeledExample {
    /// Create an example without provenance
    #[must_use]
    pub fn new(snippet: impl Into<String>, label: Label) -> Self {
        Self {
            snippet: snippet.into(),
            label,
            origin: None,
            archetype: None,
        }
    }

    /// Attach the source file
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Attach the archetype that produced this variant
    #[must_use]
    pub fn with_archetype(mut self, archetype: FaultArchetype) -> Self {
        self.archetype = Some(archetype);
        self
    }
}

/// Number of examples per label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    /// Examples labeled `0`
    pub clean: usize,
    /// Examples labeled `1`
    pub buggy: usize,
}

impl LabelCounts {
    fn tally<'a>(examples: impl IntoIterator<Item = &'a LabeledExample>) -> Self {
        examples
            .into_iter()
            .fold(Self::default(), |mut counts, example| {
                match example.label {
                    Label::Clean => counts.clean += 1,
                    Label::Buggy => counts.buggy += 1,
                }
                counts
            })
    }

    /// Total examples
    #[must_use]
    pub fn total(&self) -> usize {
        self.clean + self.buggy
    }
}

/// Append-only collection of examples in extraction order
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    examples: Vec<LabeledExample>,
}

impl Corpus {
    /// Create an empty corpus
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an example
    pub fn push(&mut self, example: LabeledExample) {
        self.examples.push(example);
    }

    /// Number of examples
    #[must_use]
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Whether the corpus is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Examples in collection order
    #[must_use]
    pub fn examples(&self) -> &[LabeledExample] {
        &self.examples
    }

    /// Count examples per label
    #[must_use]
    pub fn label_counts(&self) -> LabelCounts {
        LabelCounts::tally(&self.examples)
    }

    /// Apply one uniformly random permutation
    #[must_use]
    pub fn shuffle<R: Rng + ?Sized>(mut self, rng: &mut R) -> ShuffledCorpus {
        self.examples.shuffle(rng);
        ShuffledCorpus {
            examples: self.examples,
        }
    }
}

/// Corpus in its final, exportable order
#[derive(Debug, Clone, Default)]
pub struct ShuffledCorpus {
    examples: Vec<LabeledExample>,
}

impl ShuffledCorpus {
    /// Examples in final order
    #[must_use]
    pub fn examples(&self) -> &[LabeledExample] {
        &self.examples
    }

    /// Number of examples
    #[must_use]
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Whether the corpus is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Count examples per label
    #[must_use]
    pub fn label_counts(&self) -> LabelCounts {
        LabelCounts::tally(&self.examples)
    }

    /// Take ownership of the examples
    #[must_use]
    pub fn into_examples(self) -> Vec<LabeledExample> {
        self.examples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    fn corpus(labels: &[Label]) -> Corpus {
        let mut corpus = Corpus::new();
        for (i, label) in labels.iter().enumerate() {
            corpus.push(LabeledExample::new(format!("def f{i}():\n    pass"), *label));
        }
        corpus
    }

    #[test]
    fn test_label_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Label::Clean).unwrap(), "0");
        assert_eq!(serde_json::to_string(&Label::Buggy).unwrap(), "1");
        let label: Label = serde_json::from_str("1").unwrap();
        assert_eq!(label, Label::Buggy);
        assert!(serde_json::from_str::<Label>("2").is_err());
    }

    #[test]
    fn test_label_display() {
        assert_eq!(Label::Clean.to_string(), "0");
        assert_eq!(Label::Buggy.to_string(), "1");
    }

    #[test]
    fn test_example_serializes_snippet_and_label_only() {
        let example = LabeledExample::new("x = 1", Label::Buggy)
            .with_origin("repos/a/m.py")
            .with_archetype(FaultArchetype::DivisionByZero);
        let json = serde_json::to_value(&example).unwrap();
        assert_eq!(json, serde_json::json!({ "snippet": "x = 1", "label": 1 }));
    }

    #[test]
    fn test_example_deserialize_has_no_provenance() {
        let example: LabeledExample =
            serde_json::from_str(r#"{"snippet": "x", "label": 0}"#).unwrap();
        assert_eq!(example.label, Label::Clean);
        assert!(example.origin.is_none());
        assert!(example.archetype.is_none());
    }

    #[test]
    fn test_corpus_push_and_counts() {
        let corpus = corpus(&[Label::Clean, Label::Buggy, Label::Buggy]);
        assert_eq!(corpus.len(), 3);
        assert!(!corpus.is_empty());
        assert_eq!(corpus.label_counts(), LabelCounts { clean: 1, buggy: 2 });
        assert_eq!(corpus.label_counts().total(), 3);
    }

    #[test]
    fn test_empty_corpus_shuffles_to_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        let shuffled = Corpus::new().shuffle(&mut rng);
        assert!(shuffled.is_empty());
        assert_eq!(shuffled.label_counts(), LabelCounts::default());
    }

    #[test]
    fn test_shuffle_is_reproducible() {
        let labels = [Label::Clean, Label::Buggy].repeat(10);
        let order = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            corpus(&labels).shuffle(&mut rng).into_examples()
        };
        assert_eq!(order(99), order(99));
    }

    #[test]
    fn test_corpus_clone_and_debug() {
        let corpus = corpus(&[Label::Clean]);
        let cloned = corpus.clone();
        assert_eq!(cloned.examples(), corpus.examples());
        assert!(format!("{corpus:?}").contains("Corpus"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_labels() -> impl Strategy<Value = Vec<Label>> {
            proptest::collection::vec(
                prop_oneof![Just(Label::Clean), Just(Label::Buggy)],
                0..60,
            )
        }

        proptest! {
            /// Shuffling preserves label counts
            #[test]
            fn prop_shuffle_preserves_counts(labels in arb_labels(), seed in any::<u64>()) {
                let corpus = corpus(&labels);
                let before = corpus.label_counts();
                let mut rng = StdRng::seed_from_u64(seed);
                let shuffled = corpus.shuffle(&mut rng);
                prop_assert_eq!(shuffled.label_counts(), before);
                prop_assert_eq!(shuffled.len(), labels.len());
            }

            /// Shuffling is a permutation
            #[test]
            fn prop_shuffle_is_permutation(labels in arb_labels(), seed in any::<u64>()) {
                let corpus = corpus(&labels);
                let mut expected: Vec<String> =
                    corpus.examples().iter().map(|e| e.snippet.clone()).collect();
                let mut rng = StdRng::seed_from_u64(seed);
                let mut actual: Vec<String> = corpus
                    .shuffle(&mut rng)
                    .into_examples()
                    .into_iter()
                    .map(|e| e.snippet)
                    .collect();
                expected.sort();
                actual.sort();
                prop_assert_eq!(actual, expected);
            }
        }
    }
}
