//! Fixtures shared by the filebridge benchmarks

use std::fs;
use std::path::{Path, PathBuf};

use filebridge_core::types::{CSHARP_KIND, SDK_PROJECT_KIND};
use filebridge_core::{ProjectEntry, ProjectKind, Solution, SolutionFolder, SolutionNode};

/// Solution with `width` projects per folder, nested `depth` folders deep.
///
/// Project directories live under `root` but are not created.
pub fn nested_solution(root: &Path, depth: usize, width: usize) -> Solution {
    fn level(root: &Path, prefix: &str, depth: usize, width: usize) -> Vec<SolutionNode> {
        let mut nodes: Vec<SolutionNode> = (0..width)
            .map(|i| {
                let name = format!("{}P{}", prefix, i);
                let kind = if i % 2 == 0 { CSHARP_KIND } else { SDK_PROJECT_KIND };
                SolutionNode::Project(ProjectEntry::new(
                    name.clone(),
                    root.join(&name).join(format!("{}.csproj", name)),
                    ProjectKind::new(kind),
                ))
            })
            .collect();

        if depth > 0 {
            let folder = format!("{}F{}", prefix, depth);
            let children = level(root, &format!("{}_", folder), depth - 1, width);
            nodes.push(SolutionNode::Folder(SolutionFolder::with_children(folder, children)));
        }
        nodes
    }

    Solution::new(level(root, "", depth, width))
}

/// Directory of the deepest, last project in [`nested_solution`]
pub fn deepest_project_dir(root: &Path, depth: usize, width: usize) -> PathBuf {
    let mut prefix = String::new();
    for d in (1..=depth).rev() {
        prefix = format!("{}F{}_", prefix, d);
    }
    root.join(format!("{}P{}", prefix, width.saturating_sub(1)))
}

/// Create `fanout^levels` nested directories plus a `bin/` and `.git/` per level
pub fn folder_tree(root: &Path, levels: usize, fanout: usize) {
    fn build(dir: &Path, levels: usize, fanout: usize) {
        if levels == 0 {
            return;
        }
        for noise in ["bin", "obj", ".git"] {
            let _ = fs::create_dir_all(dir.join(noise).join("deep"));
        }
        for i in 0..fanout {
            let child = dir.join(format!("Folder{}", i));
            let _ = fs::create_dir_all(&child);
            build(&child, levels - 1, fanout);
        }
    }
    build(root, levels, fanout);
}
