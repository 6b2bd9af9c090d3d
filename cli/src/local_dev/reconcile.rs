//! Drift check between local components and the last deployed build

use crate::models::component::{Component, ComponentType};
use crate::status::events::UiEvent;

/// Names of runnable application components (and their card titles) that the
/// deployed build does not contain, labelled with their component type
pub fn find_missing_components(components: &[Component], deployed_names: &[String]) -> Vec<String> {
    let deployed = |name: &str| deployed_names.iter().any(|d| d == name);
    let mut missing = Vec::new();

    for component in components
        .iter()
        .filter(|c| c.component_type == ComponentType::Application)
    {
        if let Some(name) = component.name() {
            if !deployed(name) {
                missing.push(format!("{}: {}", ComponentType::Application.label(), name));
            }
        }

        for title in component.cards.iter().filter_map(|card| card.title()) {
            if !deployed(title) {
                missing.push(format!("{}: {}", ComponentType::Card.label(), title));
            }
        }
    }

    missing
}

/// The aggregated "upload required" warning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadWarning {
    pub header: String,
    pub lines: Vec<String>,
}

impl UploadWarning {
    /// Build the warning for `reason`
    ///
    /// The upload command names the target account only when it is not the
    /// configured default account.
    pub fn new(reason: &str, target_account: u64, default_account: Option<u64>) -> Self {
        let upload = if default_account == Some(target_account) {
            "deckhand project upload".to_string()
        } else {
            format!("deckhand project upload --account={}", target_account)
        };

        Self {
            header: format!("{}. To update your project:", reason),
            lines: vec![
                "1. Stop `deckhand project dev`".to_string(),
                format!("2. Run `{}`", upload),
                "3. Restart `deckhand project dev`".to_string(),
            ],
        }
    }

    pub fn into_event(self) -> UiEvent {
        UiEvent::Warning {
            header: self.header,
            lines: self.lines,
        }
    }
}

/// Compare local runnable components with the deployed build
///
/// Returns a single warning covering every missing component, or `None` when
/// the deployed build is up to date.
pub fn reconcile(
    components: &[Component],
    deployed_names: &[String],
    target_account: u64,
    default_account: Option<u64>,
) -> Option<UploadWarning> {
    let missing = find_missing_components(components, deployed_names);
    if missing.is_empty() {
        return None;
    }

    let reason = format!(
        "Your deployed project is missing the following components: {}",
        missing.join(", ")
    );
    Some(UploadWarning::new(&reason, target_account, default_account))
}
