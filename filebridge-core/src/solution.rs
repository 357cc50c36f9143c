//! Visual Studio solution (`.sln`) parsing
//!
//! Reads the project declarations and the `NestedProjects` section and turns
//! them into a [`SolutionNode`] tree. Only the parts needed to locate projects
//! are understood; build configurations and other sections are skipped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::types::{ProjectEntry, ProjectKind, Solution, SolutionFolder, SolutionNode};

/// Error types for solution parsing
#[derive(Debug, thiserror::Error)]
pub enum SolutionError {
    #[error("Failed to read solution file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Solution file not found in {0}")]
    NotFound(String),

    #[error("Malformed solution file at line {line}: {message}")]
    ParseError { line: usize, message: String },
}

fn project_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^Project\("\{([^}]+)\}"\)\s*=\s*"([^"]*)"\s*,\s*"([^"]*)"\s*,\s*"\{([^}]+)\}""#)
            .expect("valid project pattern")
    })
}

fn nesting_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\{([0-9A-Fa-f-]+)\}\s*=\s*\{([0-9A-Fa-f-]+)\}$").expect("valid nesting pattern")
    })
}

/// One `Project(...)` declaration
#[derive(Debug, Clone)]
struct Declaration {
    id: String,
    kind: ProjectKind,
    name: String,
    path: String,
}

/// Parse `.sln` text into a node tree.
///
/// Relative project paths are resolved against `solution_dir`. Top-level
/// order follows declaration order in the file.
pub fn parse_solution(content: &str, solution_dir: &Path) -> Result<Vec<SolutionNode>, SolutionError> {
    let mut declarations: Vec<Declaration> = Vec::new();
    let mut parents: HashMap<String, String> = HashMap::new();
    let mut in_nested_section = false;

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();

        if in_nested_section {
            if line.starts_with("EndGlobalSection") {
                in_nested_section = false;
                continue;
            }
            if line.is_empty() {
                continue;
            }
            let caps = nesting_line().captures(line).ok_or_else(|| SolutionError::ParseError {
                line: index + 1,
                message: format!("invalid nested project entry '{}'", line),
            })?;
            parents.insert(caps[1].to_ascii_lowercase(), caps[2].to_ascii_lowercase());
            continue;
        }

        if line.starts_with("Project(") {
            let caps = project_line().captures(line).ok_or_else(|| SolutionError::ParseError {
                line: index + 1,
                message: "invalid project declaration".to_string(),
            })?;
            declarations.push(Declaration {
                kind: ProjectKind::new(format!("{{{}}}", &caps[1])),
                name: caps[2].to_string(),
                path: caps[3].to_string(),
                id: caps[4].to_ascii_lowercase(),
            });
        } else if line.starts_with("GlobalSection(NestedProjects)") {
            in_nested_section = true;
        }
    }

    Ok(build_tree(&declarations, &parents, solution_dir))
}

fn build_tree(
    declarations: &[Declaration],
    parents: &HashMap<String, String>,
    solution_dir: &Path,
) -> Vec<SolutionNode> {
    let by_id: HashMap<&str, &Declaration> = declarations.iter().map(|d| (d.id.as_str(), d)).collect();

    // Children per parent id, in declaration order
    let mut children: HashMap<&str, Vec<&Declaration>> = HashMap::new();
    let mut roots: Vec<&Declaration> = Vec::new();

    for decl in declarations {
        match parents.get(&decl.id) {
            Some(parent_id) => match by_id.get(parent_id.as_str()).copied() {
                Some(parent) if parent.kind.is_solution_folder() => {
                    children.entry(parent_id.as_str()).or_default().push(decl);
                }
                Some(parent) => {
                    tracing::warn!(
                        "Project '{}' is nested under '{}', which is not a solution folder",
                        decl.name,
                        parent.name
                    );
                    roots.push(decl);
                }
                None => {
                    tracing::warn!("Project '{}' is nested under unknown id {{{}}}", decl.name, parent_id);
                    roots.push(decl);
                }
            },
            None => roots.push(decl),
        }
    }

    let mut visited = 0usize;
    let nodes: Vec<SolutionNode> = roots
        .into_iter()
        .map(|decl| build_node(decl, &children, solution_dir, &mut visited))
        .collect();

    if visited < declarations.len() {
        tracing::warn!(
            "{} solution entries are unreachable (cyclic nesting) and were skipped",
            declarations.len() - visited
        );
    }

    nodes
}

fn build_node(
    decl: &Declaration,
    children: &HashMap<&str, Vec<&Declaration>>,
    solution_dir: &Path,
    visited: &mut usize,
) -> SolutionNode {
    *visited += 1;

    if decl.kind.is_solution_folder() {
        let kids = children
            .get(decl.id.as_str())
            .map(|list| {
                list.iter()
                    .map(|child| build_node(child, children, solution_dir, visited))
                    .collect()
            })
            .unwrap_or_default();
        SolutionNode::Folder(SolutionFolder::with_children(decl.name.clone(), kids))
    } else {
        SolutionNode::Project(ProjectEntry::new(
            decl.name.clone(),
            resolve_project_path(solution_dir, &decl.path),
            decl.kind.clone(),
        ))
    }
}

/// Join a solution-relative project path (backslash separated) onto the solution directory
fn resolve_project_path(solution_dir: &Path, raw: &str) -> PathBuf {
    let relative: PathBuf = raw
        .split(['\\', '/'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    if Path::new(raw).is_absolute() {
        PathBuf::from(raw)
    } else {
        solution_dir.join(relative)
    }
}

/// Read and parse a solution file
pub fn load_solution(path: &Path) -> Result<Solution, SolutionError> {
    let content = std::fs::read_to_string(path)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let nodes = parse_solution(&content, dir)?;
    Ok(Solution {
        path: Some(path.to_path_buf()),
        nodes,
    })
}

/// Find a solution file in a directory.
///
/// When several `*.sln` files exist the alphabetically first one wins.
pub fn find_solution(dir: &Path) -> Result<PathBuf, SolutionError> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("sln"))
                    .unwrap_or(false)
        })
        .collect();

    candidates.sort();
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| SolutionError::NotFound(dir.display().to_string()))
}
