//! # Generator
//!
//! Builds a [`Tree`] from any value that can describe itself as an ordered
//! table of fields. Each field carries a [`FieldRole`] telling the generator
//! what to do with it:
//!
//! - `Identifier` names the node
//! - `TextContent` makes the node a text leaf when present
//! - `Attribute` becomes a `key='value'` pair on a container
//! - `Children` recurses into nested values, in order
//! - `Ignore` is skipped
//!
//! ```rust
//! use xmledit_common::{generate, serialize, Describe, Field};
//!
//! struct Chapter {
//!     title: String,
//!     body: String,
//! }
//!
//! impl Describe for Chapter {
//!     fn fields(&self) -> Vec<Field<'_>> {
//!         vec![
//!             Field::identifier("title", &self.title),
//!             Field::text("body", Some(&self.body)),
//!         ]
//!     }
//! }
//!
//! struct Book {
//!     title: String,
//!     genre: Option<String>,
//!     chapters: Vec<Chapter>,
//! }
//!
//! impl Describe for Book {
//!     fn fields(&self) -> Vec<Field<'_>> {
//!         vec![
//!             Field::identifier("title", &self.title),
//!             Field::attribute("genre", self.genre.as_ref()),
//!             Field::children("chapters", &self.chapters),
//!         ]
//!     }
//! }
//!
//! let book = Book {
//!     title: "book".into(),
//!     genre: Some("fantasy".into()),
//!     chapters: vec![Chapter { title: "chapter1".into(), body: "Once upon a time".into() }],
//! };
//! let tree = generate(&book).unwrap();
//! assert!(serialize(&tree, tree.root()).contains("<chapter1> Once upon a time </chapter1>"));
//! ```

use crate::error::CommonError;
use crate::result::CommonResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use xmledit_tree::{NodeId, Tree};

/// What a described field contributes to the generated node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    Identifier,
    TextContent,
    Attribute,
    Children,
    Ignore,
}

pub enum FieldValue<'a> {
    /// A null or unset value; contributes nothing
    Absent,
    Scalar(String),
    Nested(Vec<Box<dyn Describe + 'a>>),
}

/// One row of a descriptor table
pub struct Field<'a> {
    pub name: &'a str,
    pub role: FieldRole,
    pub value: FieldValue<'a>,
}

impl<'a> Field<'a> {
    pub fn new(name: &'a str, role: FieldRole, value: FieldValue<'a>) -> Self {
        Self { name, role, value }
    }

    pub fn identifier(name: &'a str, value: impl ToString) -> Self {
        Self::new(name, FieldRole::Identifier, FieldValue::Scalar(value.to_string()))
    }

    pub fn text(name: &'a str, value: Option<impl ToString>) -> Self {
        Self::new(name, FieldRole::TextContent, scalar(value))
    }

    pub fn attribute(name: &'a str, value: Option<impl ToString>) -> Self {
        Self::new(name, FieldRole::Attribute, scalar(value))
    }

    pub fn children<T>(name: &'a str, items: impl IntoIterator<Item = &'a T>) -> Self
    where
        T: Describe + 'a,
    {
        let nested = items
            .into_iter()
            .map(|item| Box::new(item) as Box<dyn Describe + 'a>)
            .collect();
        Self::new(name, FieldRole::Children, FieldValue::Nested(nested))
    }

    pub fn ignore(name: &'a str) -> Self {
        Self::new(name, FieldRole::Ignore, FieldValue::Absent)
    }
}

fn scalar(value: Option<impl ToString>) -> FieldValue<'static> {
    match value {
        Some(value) => FieldValue::Scalar(value.to_string()),
        None => FieldValue::Absent,
    }
}

/// A value that can be turned into document nodes
pub trait Describe {
    /// Fields in declaration order
    fn fields(&self) -> Vec<Field<'_>>;
}

impl<T: Describe + ?Sized> Describe for &T {
    fn fields(&self) -> Vec<Field<'_>> {
        (**self).fields()
    }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn fields(&self) -> Vec<Field<'_>> {
        (**self).fields()
    }
}

/// Build a new tree whose root is generated from `source`.
///
/// The root must describe a container: a value with text content cannot be
/// the document root.
pub fn generate(source: &dyn Describe) -> CommonResult<Tree> {
    let fields = source.fields();
    let name = identifier(&fields)?;
    if is_text(&fields) {
        return Err(CommonError::TextRoot(name.to_string()));
    }

    let mut tree = Tree::new(name);
    let root = tree.root();
    fill_container(&mut tree, root, fields)?;

    debug!(nodes = tree.len(), "generated tree");
    Ok(tree)
}

/// Generate `source` and append it under `parent` in an existing tree
pub fn generate_into(tree: &mut Tree, parent: NodeId, source: &dyn Describe) -> CommonResult<NodeId> {
    let fields = source.fields();
    let name = identifier(&fields)?.to_string();

    if let Some(text) = text_content(&fields) {
        if fields
            .iter()
            .any(|f| f.role == FieldRole::Attribute && matches!(f.value, FieldValue::Scalar(_)))
        {
            warn!(node = %name, "text leaves carry no attributes; dropping them");
        }
        let text = text.to_string();
        return Ok(tree.add_child_text(parent, name, text)?);
    }

    let node = tree.add_child_entity(parent, name)?;
    fill_container(tree, node, fields)?;
    Ok(node)
}

fn fill_container(tree: &mut Tree, node: NodeId, fields: Vec<Field<'_>>) -> CommonResult<()> {
    for field in fields {
        match (field.role, field.value) {
            (FieldRole::Attribute, FieldValue::Scalar(value)) => {
                tree.add_attribute(node, field.name, value)?;
            }
            (FieldRole::Children, FieldValue::Nested(items)) => {
                for item in &items {
                    generate_into(tree, node, item.as_ref())?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn identifier<'f>(fields: &'f [Field<'_>]) -> CommonResult<&'f str> {
    fields
        .iter()
        .find_map(|field| match (&field.role, &field.value) {
            (FieldRole::Identifier, FieldValue::Scalar(value)) => Some(value.as_str()),
            _ => None,
        })
        .ok_or_else(|| CommonError::MissingIdentifier(describe_fields(fields)))
}

fn text_content<'f>(fields: &'f [Field<'_>]) -> Option<&'f str> {
    fields.iter().find_map(|field| match (&field.role, &field.value) {
        (FieldRole::TextContent, FieldValue::Scalar(value)) => Some(value.as_str()),
        _ => None,
    })
}

fn is_text(fields: &[Field<'_>]) -> bool {
    text_content(fields).is_some()
}

fn describe_fields(fields: &[Field<'_>]) -> String {
    let names: Vec<&str> = fields.iter().map(|f| f.name).collect();
    format!("[{}]", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::serialize;

    struct Part {
        title: &'static str,
        text: Option<&'static str>,
        kind: Option<&'static str>,
        children: Vec<Part>,
    }

    impl Part {
        fn leaf(title: &'static str, text: &'static str) -> Self {
            Self {
                title,
                text: Some(text),
                kind: None,
                children: vec![],
            }
        }

        fn node(title: &'static str, children: Vec<Part>) -> Self {
            Self {
                title,
                text: None,
                kind: None,
                children,
            }
        }
    }

    impl Describe for Part {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::identifier("title", self.title),
                Field::text("text", self.text),
                Field::attribute("kind", self.kind),
                Field::children("children", &self.children),
                Field::ignore("cache"),
            ]
        }
    }

    #[test]
    fn test_nested_objects_become_containers_and_leaves() {
        let book = Part::node(
            "harry potter",
            vec![
                Part::node("chapter 1", vec![Part::leaf("paragraph 1", "Once upon a time...")]),
                Part::leaf("chapter 2", "first classes..."),
            ],
        );
        let tree = generate(&book).unwrap();
        assert_eq!(
            serialize(&tree, tree.root()),
            "<harry potter>\n\
             \t<chapter 1>\n\
             \t\t<paragraph 1> Once upon a time... </paragraph 1>\n\
             \t</chapter 1>\n\
             \t<chapter 2> first classes... </chapter 2>\n\
             </harry potter>\n"
        );
    }

    #[test]
    fn test_present_attributes_are_added_absent_skipped() {
        let mut with = Part::node("a", vec![]);
        with.kind = Some("start");
        let tree = generate(&with).unwrap();
        assert_eq!(tree.get(tree.root()).unwrap().attribute("kind"), Some("start"));

        let without = Part::node("a", vec![]);
        let tree = generate(&without).unwrap();
        assert!(!tree.get(tree.root()).unwrap().has_attributes());
    }

    #[test]
    fn test_leaf_attributes_are_dropped() {
        let mut leaf = Part::leaf("p", "text");
        leaf.kind = Some("middle");
        let root = Part::node("root", vec![leaf]);
        let tree = generate(&root).unwrap();
        let child = tree.get(tree.root()).unwrap().children()[0];
        assert!(tree.get(child).unwrap().attributes().is_empty());
    }

    #[test]
    fn test_text_root_is_rejected() {
        let err = generate(&Part::leaf("p", "text")).unwrap_err();
        assert!(matches!(err, CommonError::TextRoot(name) if name == "p"));
    }

    struct Nameless;

    impl Describe for Nameless {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![Field::attribute("kind", Some("x"))]
        }
    }

    #[test]
    fn test_missing_identifier() {
        let err = generate(&Nameless).unwrap_err();
        assert!(matches!(err, CommonError::MissingIdentifier(fields) if fields == "[kind]"));
    }

    #[test]
    fn test_generate_into_existing_tree() {
        let mut tree = Tree::new("shelf");
        let root = tree.root();
        let node = generate_into(&mut tree, root, &Part::leaf("note", "hi")).unwrap();
        assert_eq!(tree.get(node).unwrap().parent(), Some(root));
        assert_eq!(tree.get(node).unwrap().text(), Some("hi"));
    }

    #[test]
    fn test_field_role_serde_names() {
        let role: FieldRole = serde_json::from_str("\"text_content\"").unwrap();
        assert_eq!(role, FieldRole::TextContent);
    }
}
