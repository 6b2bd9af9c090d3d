//! Discovery of components in a project source tree

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::errors::CliError;
use crate::filesys::file::File;
use crate::models::component::{CardConfig, Component, ComponentType};

pub const APP_CONFIG_FILE: &str = "app.json";
pub const FUNCTION_CONFIG_FILE: &str = "serverless.json";

/// Directories never searched for components
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

/// Find every component defined under `source_dir`, in path order
pub async fn find_project_components(source_dir: &Path) -> Result<Vec<Component>, CliError> {
    let mut components = Vec::new();
    let mut pending = vec![source_dir.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(&dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            entries.push(entry.path());
        }
        entries.sort();

        for path in entries.iter().rev() {
            let skipped = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| SKIPPED_DIRS.contains(&n));
            if path.is_dir() && !skipped {
                pending.push(path.clone());
            }
        }

        for path in &entries {
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            let component = match file_name {
                APP_CONFIG_FILE => load_app(&dir, path).await,
                FUNCTION_CONFIG_FILE => load_function(&dir, path).await,
                _ => continue,
            };
            match component {
                Ok(component) => components.push(component),
                Err(e) => warn!("Skipping component config {}: {}", path.display(), e),
            }
        }
    }

    debug!("Found {} components in {}", components.len(), source_dir.display());
    Ok(components)
}

async fn load_app(dir: &Path, config_path: &Path) -> Result<Component, CliError> {
    let config: serde_json::Value = File::new(config_path).read_json().await?;
    let cards = get_app_card_configs(&config, dir).await;

    Ok(Component {
        component_type: ComponentType::Application,
        config,
        path: dir.to_path_buf(),
        cards,
        runnable: true,
    })
}

async fn load_function(dir: &Path, config_path: &Path) -> Result<Component, CliError> {
    let config: serde_json::Value = File::new(config_path).read_json().await?;

    Ok(Component {
        component_type: ComponentType::Function,
        config,
        path: dir.to_path_buf(),
        cards: Vec::new(),
        runnable: false,
    })
}

/// Card files an application references under `extensions.crm.cards[].file`
pub fn card_config_paths(app_config: &serde_json::Value, app_dir: &Path) -> Vec<PathBuf> {
    app_config
        .pointer("/extensions/crm/cards")
        .and_then(|cards| cards.as_array())
        .map(|cards| {
            cards
                .iter()
                .filter_map(|card| card.get("file").and_then(|f| f.as_str()))
                .map(|file| app_dir.join(file))
                .collect()
        })
        .unwrap_or_default()
}

/// Read the card configs an application references; unreadable ones are skipped
pub async fn get_app_card_configs(app_config: &serde_json::Value, app_dir: &Path) -> Vec<CardConfig> {
    let mut cards = Vec::new();
    for path in card_config_paths(app_config, app_dir) {
        match File::new(&path).read_json::<CardConfig>().await {
            Ok(card) => cards.push(card),
            Err(e) => warn!("Could not read card config {}: {}", path.display(), e),
        }
    }
    cards
}
