//! Target locators for the in-place archetypes
//!
//! Each locator walks the unit's syntax tree in source order and returns
//! at most one edit, for the first construct it can use.

use std::collections::HashSet;
use std::ops::Range;

use tree_sitter::{Node, Tree, TreeCursor};

/// Value literal an out-of-bounds edit indexes with
const OUT_OF_RANGE_INDEX: &str = "100";

/// Prefix a type-mismatch edit puts in front of a returned value
const STR_CONCAT_PREFIX: &str = "str('bug') + ";

/// A single textual replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Edit {
    /// Byte range of the unit text being replaced (empty for insertions)
    pub range: Range<usize>,
    /// Replacement text
    pub replacement: String,
    /// 1-based line and column of the edit
    pub position: (usize, usize),
    /// Human-readable summary
    pub description: String,
}

impl Edit {
    fn at(node: Node<'_>, range: Range<usize>, replacement: String, description: String) -> Self {
        let point = node.start_position();
        Self {
            range,
            replacement,
            position: (point.row + 1, point.column + 1),
            description,
        }
    }

    /// Apply the edit to `code`
    pub fn apply(&self, code: &str) -> String {
        let mut out = String::with_capacity(code.len() + self.replacement.len());
        out.push_str(&code[..self.range.start]);
        out.push_str(&self.replacement);
        out.push_str(&code[self.range.end..]);
        out
    }
}

/// Rename the first referenced identifier to a name defined nowhere in the unit
pub(super) fn corrupt_identifier(tree: &Tree, code: &str) -> Option<Edit> {
    let root = tree.root_node();
    let target = preorder(root).find(|n| n.kind() == "identifier" && !is_declaration(*n))?;
    let name = &code[target.byte_range()];

    let taken: HashSet<&str> = preorder(root)
        .filter(|n| n.kind() == "identifier")
        .map(|n| &code[n.byte_range()])
        .collect();
    let mut fresh = format!("{name}_bug");
    while taken.contains(fresh.as_str()) {
        fresh.push_str("_bug");
    }

    let description = format!("Rename `{name}` to `{fresh}`");
    Some(Edit::at(target, target.byte_range(), fresh, description))
}

/// Concatenate a string onto the first returned value
pub(super) fn type_mismatch(tree: &Tree, code: &str) -> Option<Edit> {
    let value = preorder(tree.root_node()).find_map(return_value)?;
    let range = value.byte_range();
    let description = "Prefix returned value with `str('bug') + `".to_string();
    if needs_parentheses(value) {
        let replacement = format!("{STR_CONCAT_PREFIX}({})", &code[range.clone()]);
        Some(Edit::at(value, range, replacement, description))
    } else {
        let insertion = range.start..range.start;
        Some(Edit::at(value, insertion, STR_CONCAT_PREFIX.to_string(), description))
    }
}

/// Replace the index of the first subscript with an out-of-range literal
///
/// "First" is by the position of the opening bracket, so in `xs[0][1]` the
/// inner `[0]` is rewritten even though the outer subscript encloses it.
pub(super) fn out_of_bounds(tree: &Tree, code: &str) -> Option<Edit> {
    let (first, last) = preorder(tree.root_node())
        .filter(|n| n.kind() == "subscript")
        .filter_map(|node| {
            let mut cursor = node.walk();
            let indices: Vec<Node<'_>> = node.children_by_field_name("subscript", &mut cursor).collect();
            Some((*indices.first()?, *indices.last()?))
        })
        .min_by_key(|(first, _)| first.start_byte())?;
    let range = first.start_byte()..last.end_byte();
    let description = format!("Index with {OUT_OF_RANGE_INDEX} instead of `{}`", &code[range.clone()]);
    Some(Edit::at(first, range, OUT_OF_RANGE_INDEX.to_string(), description))
}

/// Replace the divisor of the first `/`, `//`, `/=` or `//=` with zero
///
/// Operators are ordered by where they appear in the text: `a / b / c`
/// becomes `a / 0 / c`.
pub(super) fn division_by_zero(tree: &Tree, code: &str) -> Option<Edit> {
    let (_, right) = preorder(tree.root_node())
        .filter_map(|n| {
            let operator = n.child_by_field_name("operator")?;
            let divides = match n.kind() {
                "binary_operator" => matches!(operator.kind(), "/" | "//"),
                "augmented_assignment" => matches!(operator.kind(), "/=" | "//="),
                _ => false,
            };
            divides.then_some((operator.start_byte(), n.child_by_field_name("right")?))
        })
        .min_by_key(|(offset, _)| *offset)?;
    let description = format!("Divide by 0 instead of `{}`", &code[right.byte_range()]);
    Some(Edit::at(right, right.byte_range(), "0".to_string(), description))
}

/// Append a statement on its own line at module level
pub(super) fn append_statement(code: &str, statement: &str) -> String {
    if code.ends_with('\n') {
        format!("{code}{statement}")
    } else {
        format!("{code}\n{statement}")
    }
}

/// Identifiers that introduce a name or are not a plain name lookup
///
/// Assignment, loop, `with`/`except` and walrus targets bind rather than
/// read, so renaming them would not raise. Augmented assignment targets
/// are read first and stay eligible.
fn is_declaration(node: Node<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    let is_field = |field: &str| parent.child_by_field_name(field) == Some(node);
    match parent.kind() {
        "function_definition" | "class_definition" => is_field("name"),
        "default_parameter" | "typed_default_parameter" | "keyword_argument" => is_field("name"),
        "attribute" => is_field("attribute"),
        "assignment" | "for_statement" | "for_in_clause" => is_field("left"),
        "named_expression" => is_field("name"),
        "except_clause" => is_field("alias"),
        "parameters"
        | "lambda_parameters"
        | "typed_parameter"
        | "list_splat_pattern"
        | "dictionary_splat_pattern"
        | "dotted_name"
        | "aliased_import"
        | "global_statement"
        | "nonlocal_statement"
        | "pattern_list"
        | "tuple_pattern"
        | "list_pattern"
        | "as_pattern_target" => true,
        _ => false,
    }
}

fn return_value(node: Node<'_>) -> Option<Node<'_>> {
    if node.kind() != "return_statement" {
        return None;
    }
    let mut cursor = node.walk();
    let value = node
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    value
}

/// Values that cannot be the right operand of `+` without parentheses
fn needs_parentheses(value: Node<'_>) -> bool {
    match value.kind() {
        "lambda" | "not_operator" | "yield" | "list_splat" => true,
        "expression_list" => value
            .named_child(0)
            .is_some_and(|first| first.kind() == "list_splat"),
        _ => false,
    }
}

/// Pre-order traversal of every node under `root`, in source order
fn preorder(root: Node<'_>) -> Preorder<'_> {
    Preorder {
        cursor: root.walk(),
        done: false,
    }
}

struct Preorder<'t> {
    cursor: TreeCursor<'t>,
    done: bool,
}

impl<'t> Iterator for Preorder<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Node<'t>> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();
        if !self.cursor.goto_first_child() {
            while !self.cursor.goto_next_sibling() {
                if !self.cursor.goto_parent() {
                    self.done = true;
                    break;
                }
            }
        }
        Some(node)
    }
}
