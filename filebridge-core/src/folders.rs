//! Project folder listing
//!
//! Lists the directories under a project root for the client's folder picker.
//! Hidden directories and build/package output are pruned together with
//! everything below them.

use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::path_utils::path_to_string;
use crate::types::FolderDescriptor;

/// Directories excluded from listings by default (case-insensitive)
pub fn default_excluded_dirs() -> Vec<String> {
    ["bin", "obj", "packages", "node_modules"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn is_excluded(entry: &DirEntry, excluded: &[String]) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || excluded.iter().any(|ex| name.eq_ignore_ascii_case(ex))
}

/// List the folders of a project.
///
/// The project root is always the first entry, with an empty path. The rest
/// are sorted by relative path. Unreadable subdirectories are logged and skipped.
pub fn list_project_folders(project_dir: &Path, excluded: &[String]) -> Vec<FolderDescriptor> {
    let mut folders = Vec::new();

    let walker = WalkDir::new(project_dir)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.file_type().is_dir() && !is_excluded(entry, excluded));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Error reading project folders: {}", e);
                continue;
            }
        };

        let relative = match entry.path().strip_prefix(project_dir) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        folders.push(FolderDescriptor::new(
            entry.file_name().to_string_lossy(),
            relative,
            entry.path().to_path_buf(),
        ));
    }

    folders.sort_by(|a, b| a.path.cmp(&b.path));
    folders.insert(0, FolderDescriptor::root(project_dir));

    tracing::debug!(
        "Listed {} folders under {}",
        folders.len(),
        path_to_string(project_dir)
    );
    folders
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lists_nested_folders_with_root_first() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Features").join("Steps")).unwrap();
        fs::create_dir_all(temp.path().join("Pages")).unwrap();
        fs::write(temp.path().join("App.csproj"), "<Project />").unwrap();

        let folders = list_project_folders(temp.path(), &default_excluded_dirs());
        let paths: Vec<_> = folders.iter().map(|f| f.path.as_str()).collect();

        assert_eq!(paths, vec!["", "Features", "Features/Steps", "Pages"]);
        assert_eq!(folders[0].name, "Project Root");
        assert_eq!(folders[2].name, "Steps");
    }

    #[test]
    fn test_prunes_noise_directories() {
        let temp = TempDir::new().unwrap();
        for dir in [".git/objects", ".vs", "bin/Debug", "OBJ/x", "packages/a", "node_modules/b", "src"] {
            fs::create_dir_all(temp.path().join(dir)).unwrap();
        }

        let folders = list_project_folders(temp.path(), &default_excluded_dirs());
        let paths: Vec<_> = folders.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["", "src"]);
    }

    #[test]
    fn test_custom_exclusions() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("dist")).unwrap();
        fs::create_dir_all(temp.path().join("bin")).unwrap();

        let folders = list_project_folders(temp.path(), &["dist".to_string()]);
        let paths: Vec<_> = folders.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["", "bin"]);
    }

    #[test]
    fn test_empty_project_has_only_root() {
        let temp = TempDir::new().unwrap();
        let folders = list_project_folders(temp.path(), &default_excluded_dirs());
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].path, "");
    }
}
