use crate::commands::run::resolve_path;
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use xmledit_common::{generate, Describe, Field, FieldRole, FieldValue};
use xmledit_editor::Document;

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// JSON file describing the document
    pub input: PathBuf,

    /// Drop every node with this name from the output
    #[arg(long)]
    pub filter: Option<String>,
}

pub fn build(args: BuildArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let input_path = resolve_path(cwd, &args.input);

    let content = fs::read_to_string(&input_path)
        .with_context(|| format!("Cannot read {}", input_path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", input_path.display()))?;

    let document = build_document(&config, &value, args.filter.as_deref())?;
    document.print();
    Ok(())
}

/// Map a JSON object to a document, optionally dropping nodes named `filter`
pub fn build_document(config: &Config, value: &Value, filter: Option<&str>) -> Result<Document> {
    if !value.is_object() {
        return Err(anyhow!("Expected a JSON object at the top level"));
    }

    let tree = generate(&JsonNode { value, config })?;
    let document = Document::from_tree(config.document_name.as_str(), tree);

    match filter {
        Some(name) => document
            .filter(|node| node.name() != name)
            .ok_or_else(|| anyhow!("Nothing left after dropping '{name}'")),
        None => Ok(document),
    }
}

/// A JSON value seen through the configured key roles
struct JsonNode<'a> {
    value: &'a Value,
    config: &'a Config,
}

impl Describe for JsonNode<'_> {
    fn fields(&self) -> Vec<Field<'_>> {
        let Value::Object(map) = self.value else {
            return Vec::new();
        };

        map.iter()
            .map(|(key, value)| {
                let role = self.config.role_for(key);
                let field_value = match role {
                    FieldRole::Children => self.nested(value),
                    FieldRole::Ignore => FieldValue::Absent,
                    _ => scalar(value),
                };
                Field::new(key.as_str(), role, field_value)
            })
            .collect()
    }
}

impl<'a> JsonNode<'a> {
    fn nested(&self, value: &'a Value) -> FieldValue<'a> {
        let items: Vec<&'a Value> = match value {
            Value::Array(items) => items.iter().filter(|v| v.is_object()).collect(),
            Value::Object(_) => vec![value],
            _ => Vec::new(),
        };
        let config = self.config;
        FieldValue::Nested(
            items
                .into_iter()
                .map(|value| Box::new(JsonNode { value, config }) as Box<dyn Describe + 'a>)
                .collect(),
        )
    }
}

/// Strings unquoted, other scalars as JSON text; nulls and containers are absent
fn scalar(value: &Value) -> FieldValue<'static> {
    match value {
        Value::String(s) => FieldValue::Scalar(s.clone()),
        Value::Number(n) => FieldValue::Scalar(n.to_string()),
        Value::Bool(b) => FieldValue::Scalar(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => FieldValue::Absent,
    }
}
