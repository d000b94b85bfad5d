use crate::visitor::{accept, Visitor};
use std::fmt::Write;
use xmledit_tree::{NodeId, NodeRef, Tree};

/// Renders a subtree as indented markup
///
/// Containers open with `<name k='v' >` (or `<name>` without attributes),
/// their children follow one tab deeper, then `</name>` closes them at the
/// container's own depth. Text leaves print on one line as
/// `<name> text </name>`. Attribute values are written verbatim.
pub struct Serializer {
    depth: usize,
    indent_string: String,
    output: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self::with_indent("\t")
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            depth: 0,
            indent_string: indent.to_string(),
            output: String::new(),
        }
    }

    /// Serialize the subtree rooted at `root`
    pub fn serialize(mut self, tree: &Tree, root: NodeId) -> String {
        accept(tree, root, &mut self);
        self.output
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.output.push_str(&self.indent_string);
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Visitor for Serializer {
    fn visit_text(&mut self, node: NodeRef<'_>) {
        self.indent();
        let name = node.name();
        let text = node.text().unwrap_or_default();
        let _ = writeln!(self.output, "<{name}> {text} </{name}>");
    }

    fn visit_entity(&mut self, node: NodeRef<'_>) -> bool {
        self.indent();
        let _ = write!(self.output, "<{}", node.name());
        if node.has_attributes() {
            for attribute in node.attributes() {
                let _ = write!(self.output, " {attribute}");
            }
            self.output.push(' ');
        }
        self.output.push_str(">\n");
        self.depth += 1;
        true
    }

    fn end_visit_entity(&mut self, node: NodeRef<'_>) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        let _ = writeln!(self.output, "</{}>", node.name());
    }
}

/// Serialize the subtree rooted at `root` with tab indentation
pub fn serialize(tree: &Tree, root: NodeId) -> String {
    Serializer::new().serialize(tree, root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_scenario() {
        let mut tree = Tree::new("library");
        let book = tree.add_child_entity(tree.root(), "book").unwrap();
        tree.add_attribute(book, "genre", "fantasy").unwrap();
        tree.add_child_text(book, "chapter1", "Once upon a time").unwrap();

        assert_eq!(
            serialize(&tree, tree.root()),
            "<library>\n\
             \t<book genre='fantasy' >\n\
             \t\t<chapter1> Once upon a time </chapter1>\n\
             \t</book>\n\
             </library>\n"
        );
    }

    #[test]
    fn test_attributes_in_insertion_order() {
        let mut tree = Tree::new("film");
        tree.add_attribute(tree.root(), "year", "2008").unwrap();
        tree.add_attribute(tree.root(), "genre", "action").unwrap();
        assert_eq!(
            serialize(&tree, tree.root()),
            "<film year='2008' genre='action' >\n</film>\n"
        );
    }

    #[test]
    fn test_values_are_not_escaped() {
        let mut tree = Tree::new("root");
        tree.add_attribute(tree.root(), "q", "a<b&'c'").unwrap();
        tree.add_child_text(tree.root(), "t", "x < y").unwrap();
        let out = serialize(&tree, tree.root());
        assert!(out.contains("q='a<b&'c'' >"));
        assert!(out.contains("<t> x < y </t>"));
    }

    #[test]
    fn test_subtree_starts_at_depth_zero() {
        let mut tree = Tree::new("root");
        let outer = tree.add_child_entity(tree.root(), "outer").unwrap();
        tree.add_child_text(outer, "leaf", "v").unwrap();
        assert_eq!(
            serialize(&tree, outer),
            "<outer>\n\t<leaf> v </leaf>\n</outer>\n"
        );
    }

    #[test]
    fn test_custom_indent() {
        let mut tree = Tree::new("root");
        tree.add_child_text(tree.root(), "leaf", "v").unwrap();
        let out = Serializer::with_indent("  ").serialize(&tree, tree.root());
        assert_eq!(out, "<root>\n  <leaf> v </leaf>\n</root>\n");
    }

    #[test]
    fn test_repeated_serialization_is_stable() {
        let mut tree = Tree::new("root");
        let a = tree.add_child_entity(tree.root(), "a").unwrap();
        tree.add_attribute(a, "k", "v").unwrap();
        assert_eq!(serialize(&tree, tree.root()), serialize(&tree, tree.root()));
    }
}
