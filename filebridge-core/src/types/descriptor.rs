//! Descriptors returned to clients

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::node::{ProjectEntry, ProjectKind};
use crate::path_utils::path_to_string;

/// A project as reported by `GET /projects`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    pub name: String,
    /// Directory containing the project file
    pub directory: String,
    /// Absolute path of the project file
    pub full_name: String,
    /// Type tag; not part of the wire format
    #[serde(skip)]
    pub kind: Option<ProjectKind>,
}

impl ProjectDescriptor {
    /// Build a descriptor for a project whose directory exists on disk.
    ///
    /// Returns `None` when the project has no directory or it is missing.
    pub fn from_entry(entry: &ProjectEntry) -> Option<Self> {
        let dir = entry.directory()?;
        if !dir.is_dir() {
            return None;
        }
        Some(Self {
            name: entry.name.clone(),
            directory: dir.to_string_lossy().into_owned(),
            full_name: entry.full_path.to_string_lossy().into_owned(),
            kind: Some(entry.kind.clone()),
        })
    }
}

/// Display name of the project root entry in folder listings
pub const PROJECT_ROOT_NAME: &str = "Project Root";

/// A directory under a project root as reported by `GET /folders`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderDescriptor {
    pub name: String,
    /// Path relative to the project root, forward slashes; empty for the root
    pub path: String,
    #[serde(skip)]
    pub full_path: PathBuf,
}

impl FolderDescriptor {
    pub fn root(project_dir: &Path) -> Self {
        Self {
            name: PROJECT_ROOT_NAME.to_string(),
            path: String::new(),
            full_path: project_dir.to_path_buf(),
        }
    }

    pub fn new(name: impl Into<String>, relative: &Path, full_path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path: path_to_string(relative),
            full_path,
        }
    }
}

/// `{"projects":[...]}` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectList {
    pub projects: Vec<ProjectDescriptor>,
}

/// `{"folders":[...]}` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderList {
    pub folders: Vec<FolderDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CSHARP_KIND;

    #[test]
    fn test_project_descriptor_wire_names() {
        let temp = tempfile::TempDir::new().unwrap();
        let entry = ProjectEntry::new(
            "Web",
            temp.path().join("Web.csproj"),
            ProjectKind::new(CSHARP_KIND),
        );
        let descriptor = ProjectDescriptor::from_entry(&entry).unwrap();
        let json = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(json["name"], "Web");
        assert!(json.get("fullName").is_some());
        assert!(json.get("directory").is_some());
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_project_descriptor_skips_missing_directory() {
        let entry = ProjectEntry::new(
            "Gone",
            "/definitely/not/here/Gone.csproj",
            ProjectKind::new(CSHARP_KIND),
        );
        assert!(ProjectDescriptor::from_entry(&entry).is_none());
    }

    #[test]
    fn test_folder_list_serialization() {
        let list = FolderList {
            folders: vec![
                FolderDescriptor::root(Path::new("/repo/App")),
                FolderDescriptor::new(
                    "Steps",
                    &PathBuf::from("Features").join("Steps"),
                    PathBuf::from("/repo/App/Features/Steps"),
                ),
            ],
        };
        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(
            json,
            r#"{"folders":[{"name":"Project Root","path":""},{"name":"Steps","path":"Features/Steps"}]}"#
        );
    }
}
