//! Unit extraction examples from the book

use std::path::Path;

use bugsynth::extractor::{UnitExtractor, UnitKind};
use bugsynth::Error;

use crate::book::python_oracle;

#[test]
fn test_extract_top_level_units_example() {
    let source = r#"import math

RATE = 0.2

def area(r):
    return math.pi * r ** 2

class Circle:
    def __init__(self, r):
        self.r = r

    def area(self):
        return area(self.r)

if __name__ == "__main__":
    print(area(2))
"#;
    let extractor = UnitExtractor::new().expect("extractor should build");
    let units = extractor.extract(source, Path::new("shapes.py"));

    assert_eq!(units.len(), 2);
    assert_eq!(units[0].kind, UnitKind::Function);
    assert_eq!(units[0].text, "def area(r):\n    return math.pi * r ** 2");
    assert_eq!(units[1].kind, UnitKind::Class);
    assert!(units[1].text.starts_with("class Circle:"));
    assert!(units[1].text.ends_with("return area(self.r)"));
}

#[test]
fn test_units_are_exact_substrings_example() {
    let source = "def f(x):\n    # keep me\n    return  x\n\n\nclass  G :\n    pass\n";
    let extractor = UnitExtractor::new().expect("extractor should build");
    for unit in extractor.extract(source, Path::new("exact.py")) {
        assert!(source.contains(&unit.text), "{:?} is not a substring", unit.text);
    }
}

#[test]
fn test_unparseable_file_yields_nothing_example() {
    let extractor = UnitExtractor::new().expect("extractor should build");
    let units = extractor.extract("def f(:\n    return 1\n", Path::new("broken.py"));
    assert!(units.is_empty());
}

#[test]
fn test_extract_file_example() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tool.py");
    std::fs::write(&path, "def run():\n    return 0\n").expect("write");

    let extractor = UnitExtractor::new().expect("extractor should build");
    let units = extractor.extract_file(&path);

    assert_eq!(units.len(), 1);
    assert_eq!(units[0].origin, path);
    assert_eq!(units[0].start_line, 1);
}

#[test]
fn test_python2_file_yields_nothing_example() {
    let Some(oracle) = python_oracle() else { return };
    let extractor = UnitExtractor::new().expect("extractor should build");
    let legacy = [
        ("print.py", "def f():\n    print 'hi'\n"),
        ("octal.py", "def mode():\n    return 0755\n"),
        ("except.py", "def g():\n    try:\n        pass\n    except IOError, e:\n        pass\n"),
        ("tabs.py", "def h():\n        x = 1\n\treturn x\n"),
    ];
    for (name, source) in legacy {
        let result = extractor.try_extract_checked(source, Path::new(name), &oracle);
        assert!(matches!(result, Err(Error::Parse { .. })), "{name} should be rejected");
    }
}
