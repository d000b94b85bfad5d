use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use xmledit_common::FieldRole;
use xmledit_editor::{UndoStack, DEFAULT_MAX_LEVELS};

pub const DEFAULT_CONFIG_NAME: &str = "xmledit.config.json";

/// xmledit configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Name given to documents created by `run` and `build`
    #[serde(default = "default_document_name")]
    pub document_name: String,

    /// Root container name for `run` scripts
    #[serde(default = "default_root_name")]
    pub root_name: String,

    /// Undo levels kept (0 = unlimited)
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Keep undone edits around for redo
    #[serde(default = "default_redo")]
    pub redo: bool,

    /// Extra JSON key roles for `build`, on top of the built-in ones
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub build_roles: BTreeMap<String, FieldRole>,
}

fn default_document_name() -> String {
    "document".to_string()
}

fn default_root_name() -> String {
    "root".to_string()
}

fn default_max_history() -> usize {
    DEFAULT_MAX_LEVELS
}

fn default_redo() -> bool {
    true
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Fresh history configured from `maxHistory` and `redo`
    pub fn history(&self) -> UndoStack {
        UndoStack::with_options(self.max_history, self.redo)
    }

    /// Role of a JSON key when building a tree. Unlisted keys become
    /// attributes.
    pub fn role_for(&self, key: &str) -> FieldRole {
        if let Some(role) = self.build_roles.get(key) {
            return *role;
        }
        match key {
            "name" => FieldRole::Identifier,
            "text" => FieldRole::TextContent,
            "children" => FieldRole::Children,
            _ => FieldRole::Attribute,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document_name: default_document_name(),
            root_name: default_root_name(),
            max_history: default_max_history(),
            redo: default_redo(),
            build_roles: BTreeMap::new(),
        }
    }
}
