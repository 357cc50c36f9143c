//! Editor session signals
//!
//! The best-guess resolver prefers whatever the user is looking at in the
//! IDE. An IDE integration publishes that state to a small YAML file next to
//! the solution:
//!
//! ```yaml
//! selectedItem: src/App/Pages/LoginPage.cs
//! activeDocument: src/App/Steps/LoginSteps.cs
//! startupProject: App
//! ```
//!
//! Every field is optional. Hosts without these signals simply fall through
//! to the startup/buildable/first-project steps.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// What the IDE currently has selected/open
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSignals {
    /// Item selected in the solution explorer (a project file or an item in one)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_item: Option<PathBuf>,

    /// Document open in the active editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_document: Option<PathBuf>,

    /// Name of the configured startup project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup_project: Option<String>,
}

impl SessionSignals {
    /// Resolve relative paths against `base`
    pub fn resolved_against(mut self, base: &Path) -> Self {
        self.selected_item = self.selected_item.map(|p| absolutize(base, p));
        self.active_document = self.active_document.map(|p| absolutize(base, p));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.selected_item.is_none() && self.active_document.is_none() && self.startup_project.is_none()
    }
}

fn absolutize(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Load session signals from a YAML file, resolving relative paths against `base`.
///
/// A missing file yields empty signals. A malformed one is logged and also
/// yields empty signals; the resolver can always fall back.
pub fn load_session(path: &Path, base: &Path) -> SessionSignals {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No session file at {}", path.display());
            return SessionSignals::default();
        }
        Err(e) => {
            tracing::warn!("Failed to read session file {}: {}", path.display(), e);
            return SessionSignals::default();
        }
    };

    if content.trim().is_empty() {
        return SessionSignals::default();
    }

    match serde_yaml::from_str::<SessionSignals>(&content) {
        Ok(signals) => signals.resolved_against(base),
        Err(e) => {
            tracing::warn!("Ignoring malformed session file {}: {}", path.display(), e);
            SessionSignals::default()
        }
    }
}
