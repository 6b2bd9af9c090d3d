//! Locally defined project components

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Application,
    Function,
    Card,
}

impl ComponentType {
    /// Label used when naming a component in user-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            ComponentType::Application => "application",
            ComponentType::Function => "function",
            ComponentType::Card => "card",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A card configuration file referenced by an application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    #[serde(default)]
    pub data: Option<CardData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardData {
    #[serde(default)]
    pub title: Option<String>,
}

impl CardConfig {
    /// Non-empty card title, if declared
    pub fn title(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.title.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

/// A deployable unit discovered in the project source tree
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub component_type: ComponentType,

    /// Raw component configuration; carries at least a `name`
    pub config: serde_json::Value,

    /// Directory holding the component configuration
    pub path: PathBuf,

    /// Card configs read from the files the component references
    pub cards: Vec<CardConfig>,

    pub runnable: bool,
}

impl Component {
    /// Declared component name, if present and non-empty
    pub fn name(&self) -> Option<&str> {
        self.config
            .get("name")
            .and_then(|v| v.as_str())
            .filter(|n| !n.trim().is_empty())
    }
}
