//! Project resolution
//!
//! Maps a requested directory (or "no preference") to a project in the
//! solution tree. Solution folders may nest to any depth, so every search
//! here walks the tree recursively. The host graph is a tree; no cycle
//! handling is needed.

use std::fmt;
use std::path::Path;

use crate::path_utils::{comparison_key, is_within_ignore_case, paths_equal_ignore_case};
use crate::session::SessionSignals;
use crate::types::{ProjectDescriptor, ProjectEntry, ProjectKind, Solution, SolutionNode};

/// Find the project whose directory equals `target` (case-insensitive).
///
/// Containers are searched depth-first in declaration order; the first match wins.
pub fn find_project_by_directory<'a>(nodes: &'a [SolutionNode], target: &Path) -> Option<&'a ProjectEntry> {
    for node in nodes {
        match node {
            SolutionNode::Project(project) => {
                if project
                    .directory()
                    .map(|dir| paths_equal_ignore_case(dir, target))
                    .unwrap_or(false)
                {
                    return Some(project);
                }
            }
            SolutionNode::Folder(folder) => {
                tracing::trace!("Searching solution folder '{}'", folder.name);
                if let Some(found) = find_project_by_directory(&folder.children, target) {
                    return Some(found);
                }
            }
        }
    }
    None
}

/// Find a project by display name anywhere in the tree
pub fn find_project_by_name<'a>(nodes: &'a [SolutionNode], name: &str) -> Option<&'a ProjectEntry> {
    all_projects(nodes).into_iter().find(|p| p.name == name)
}

/// Every project in the tree, depth-first, containers excluded
pub fn all_projects(nodes: &[SolutionNode]) -> Vec<&ProjectEntry> {
    let mut found = Vec::new();
    collect_projects(nodes, &mut found);
    found
}

fn collect_projects<'a>(nodes: &'a [SolutionNode], found: &mut Vec<&'a ProjectEntry>) {
    for node in nodes {
        match node {
            SolutionNode::Project(project) => found.push(project),
            SolutionNode::Folder(folder) => collect_projects(&folder.children, found),
        }
    }
}

/// Describe every project whose directory exists on disk.
///
/// Projects with a missing directory are skipped (and logged), never reported.
pub fn enumerate_projects(nodes: &[SolutionNode]) -> Vec<ProjectDescriptor> {
    let mut descriptors = Vec::new();
    for project in all_projects(nodes) {
        tracing::debug!("Scanning project: {}, Kind: {}", project.name, project.kind);
        match ProjectDescriptor::from_entry(project) {
            Some(descriptor) => {
                tracing::debug!("Added project: {} at {}", descriptor.name, descriptor.directory);
                descriptors.push(descriptor);
            }
            None => {
                tracing::info!("Skipping project {}: Invalid or non-existent directory", project.name);
            }
        }
    }
    tracing::info!("Project detection complete: Found {} projects", descriptors.len());
    descriptors
}

/// The project containing `path`: the one whose directory is the longest prefix
pub fn owning_project<'a>(nodes: &'a [SolutionNode], path: &Path) -> Option<&'a ProjectEntry> {
    all_projects(nodes)
        .into_iter()
        .filter(|p| {
            p.directory()
                .map(|dir| is_within_ignore_case(path, dir))
                .unwrap_or(false)
        })
        .max_by_key(|p| {
            p.directory()
                .map(|dir| comparison_key(&dir.to_string_lossy()).len())
                .unwrap_or(0)
        })
}

/// Which fallback step produced a best-guess project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessSource {
    Selection,
    ActiveDocument,
    StartupProject,
    BuildableKind,
    FirstProject,
}

impl fmt::Display for GuessSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GuessSource::Selection => "selection",
            GuessSource::ActiveDocument => "active document",
            GuessSource::StartupProject => "startup project",
            GuessSource::BuildableKind => "first buildable project",
            GuessSource::FirstProject => "first project",
        };
        f.write_str(label)
    }
}

/// Result of the best-guess search
#[derive(Debug, Clone, Copy)]
pub struct BestGuess<'a> {
    pub project: &'a ProjectEntry,
    pub source: GuessSource,
}

/// Guess the project the user is working in.
///
/// Steps, first success wins:
/// 1. owning project of the selected item
/// 2. owning project of the active document
/// 3. startup project, matched by name
/// 4. first project with a buildable kind and an existing directory
/// 5. first project in the solution
pub fn best_guess_project<'a>(
    solution: &'a Solution,
    session: &SessionSignals,
    buildable_kinds: &[ProjectKind],
) -> Option<BestGuess<'a>> {
    let nodes = &solution.nodes;
    tracing::info!(
        "Attempting to get active project. Top-level items in solution: {}",
        solution.len()
    );

    let guess = |project: &'a ProjectEntry, source: GuessSource| {
        tracing::info!("Found project from {}: {}", source, project.name);
        Some(BestGuess { project, source })
    };

    match session.selected_item.as_deref() {
        Some(item) => match owning_project(nodes, item) {
            Some(project) => return guess(project, GuessSource::Selection),
            None => tracing::info!("Selected item {} does not belong to a project", item.display()),
        },
        None => tracing::debug!("No selected item"),
    }

    match session.active_document.as_deref() {
        Some(doc) => match owning_project(nodes, doc) {
            Some(project) => return guess(project, GuessSource::ActiveDocument),
            None => tracing::info!("Active document {} does not belong to a project", doc.display()),
        },
        None => tracing::debug!("No active document"),
    }

    match session.startup_project.as_deref() {
        Some(name) => {
            tracing::info!("Looking for startup project: {}", name);
            match find_project_by_name(nodes, name) {
                Some(project) => return guess(project, GuessSource::StartupProject),
                None => tracing::info!("Startup project '{}' is not in the solution", name),
            }
        }
        None => tracing::debug!("No startup project configured"),
    }

    let projects = all_projects(nodes);
    for project in &projects {
        tracing::debug!("Checking project: {}, Kind: {}", project.name, project.kind);
        let buildable = buildable_kinds.iter().any(|k| *k == project.kind);
        let exists = project.directory().map(Path::is_dir).unwrap_or(false);
        if buildable && exists {
            return guess(*project, GuessSource::BuildableKind);
        }
    }
    tracing::info!("No project with a buildable kind found");

    if let Some(project) = projects.first().copied() {
        return guess(project, GuessSource::FirstProject);
    }

    tracing::warn!("No active project could be determined");
    None
}
