//! Solution tree nodes
//!
//! A snapshot of the host's solution: projects and (possibly nested) solution
//! folders. Built once per request and never mutated afterwards.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Solution folder tag as written in `.sln` files
pub const SOLUTION_FOLDER_KIND: &str = "{2150E333-8FDC-42A3-9474-1A3956D46DE8}";

/// Solution folder tag as reported by the IDE automation model
pub const SOLUTION_ITEMS_KIND: &str = "{66A26720-8FB5-11D2-AA7E-00C04F688DDE}";

/// C# project
pub const CSHARP_KIND: &str = "{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}";

/// VB.NET project
pub const VBNET_KIND: &str = "{F184B08F-C81C-45F6-A57F-5ABD9991F28F}";

/// SDK-style .NET project
pub const SDK_PROJECT_KIND: &str = "{9A19103F-16F7-4668-BE54-9A1E7A4F7556}";

/// VSIX extension project
pub const VSIX_KIND: &str = "{82b43b9b-a64c-4715-b499-d71e9ca2bd60}";

/// Kinds considered "buildable" by the best-guess resolver
pub fn default_buildable_kinds() -> Vec<ProjectKind> {
    [CSHARP_KIND, VBNET_KIND, SDK_PROJECT_KIND, VSIX_KIND]
        .iter()
        .map(|k| ProjectKind::new(*k))
        .collect()
}

/// Opaque project type tag (a GUID string in Visual Studio solutions).
///
/// Comparison ignores case and surrounding braces/whitespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectKind(String);

impl ProjectKind {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn key(&self) -> String {
        self.0
            .trim()
            .trim_start_matches('{')
            .trim_end_matches('}')
            .to_ascii_lowercase()
    }

    /// True for grouping containers (never buildable)
    pub fn is_solution_folder(&self) -> bool {
        *self == ProjectKind::new(SOLUTION_FOLDER_KIND) || *self == ProjectKind::new(SOLUTION_ITEMS_KIND)
    }
}

impl PartialEq for ProjectKind {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ProjectKind {}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A buildable project in the solution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub name: String,
    /// Absolute path of the project file
    pub full_path: PathBuf,
    pub kind: ProjectKind,
}

impl ProjectEntry {
    pub fn new(name: impl Into<String>, full_path: impl Into<PathBuf>, kind: ProjectKind) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            kind,
        }
    }

    /// Directory containing the project file
    pub fn directory(&self) -> Option<&Path> {
        self.full_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
    }
}

/// A solution folder: a non-buildable grouping node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionFolder {
    pub name: String,
    pub children: Vec<SolutionNode>,
}

impl SolutionFolder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(name: impl Into<String>, children: Vec<SolutionNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

/// A node of the solution tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionNode {
    Project(ProjectEntry),
    Folder(SolutionFolder),
}

impl SolutionNode {
    pub fn name(&self) -> &str {
        match self {
            SolutionNode::Project(p) => &p.name,
            SolutionNode::Folder(f) => &f.name,
        }
    }

    pub fn as_project(&self) -> Option<&ProjectEntry> {
        match self {
            SolutionNode::Project(p) => Some(p),
            SolutionNode::Folder(_) => None,
        }
    }
}

/// Snapshot of an open solution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    /// Path of the solution file, if it came from disk
    pub path: Option<PathBuf>,
    /// Top-level nodes in declaration order
    pub nodes: Vec<SolutionNode>,
}

impl Solution {
    pub fn new(nodes: Vec<SolutionNode>) -> Self {
        Self { path: None, nodes }
    }

    /// Directory of the solution file
    pub fn directory(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }

    /// Number of top-level nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
