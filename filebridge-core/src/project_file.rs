//! Registering new files with an MSBuild project
//!
//! SDK-style projects pick up files by glob, so nothing needs to change.
//! Legacy projects list every item explicitly and get a new `<ItemGroup>`.

use std::path::Path;

use crate::path_utils::is_within_ignore_case;

/// Error types for project registration
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Failed to update project file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("File {file} is outside project directory {project}")]
    OutsideProject { file: String, project: String },

    #[error("Project file has no closing </Project> tag: {0}")]
    Malformed(String),
}

/// Outcome of registering a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// SDK-style project; the file is included by default globs
    Implicit,
    /// An include was added to the project file
    Added { item_type: String, include: String },
    /// The project already lists the file
    AlreadyPresent,
    /// Not an MSBuild project; the file is left on disk only
    Unsupported,
}

const MSBUILD_EXTENSIONS: [&str; 3] = ["csproj", "vbproj", "fsproj"];

fn is_msbuild_project(path: &Path) -> bool {
    path.extension()
        .map(|ext| MSBUILD_EXTENSIONS.iter().any(|m| ext.eq_ignore_ascii_case(m)))
        .unwrap_or(false)
}

/// Whether a project file uses the SDK-style format
pub fn is_sdk_style(content: &str) -> bool {
    let Some(start) = content.find("<Project") else {
        return false;
    };
    let tag_end = content[start..].find('>').map(|i| start + i).unwrap_or(content.len());
    let tag = &content[start..tag_end];
    tag.contains("Sdk=") || content.contains("<Sdk ")
}

/// MSBuild item type for a file
pub fn item_type_for(file: &Path) -> &'static str {
    match file
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .as_deref()
    {
        Some("cs") | Some("vb") | Some("fs") => "Compile",
        _ => "None",
    }
}

/// Add `file` to the project at `project_file`
pub fn register_item(project_file: &Path, file: &Path) -> Result<Registration, RegistrationError> {
    if !is_msbuild_project(project_file) {
        return Ok(Registration::Unsupported);
    }

    let project_dir = project_file.parent().unwrap_or_else(|| Path::new("."));
    if !is_within_ignore_case(file, project_dir) {
        return Err(RegistrationError::OutsideProject {
            file: file.display().to_string(),
            project: project_dir.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(project_file)?;
    if is_sdk_style(&content) {
        return Ok(Registration::Implicit);
    }

    let relative = file.strip_prefix(project_dir).unwrap_or(file);
    let include = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("\\");

    let escaped = xml_escape(&include);
    let needle = format!("Include=\"{}\"", escaped).to_lowercase();
    if content.to_lowercase().contains(&needle) {
        return Ok(Registration::AlreadyPresent);
    }

    let close = content
        .rfind("</Project>")
        .ok_or_else(|| RegistrationError::Malformed(project_file.display().to_string()))?;

    let item_type = item_type_for(file);
    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let group = format!(
        "  <ItemGroup>{nl}    <{ty} Include=\"{inc}\" />{nl}  </ItemGroup>{nl}",
        nl = newline,
        ty = item_type,
        inc = escaped,
    );

    let mut updated = String::with_capacity(content.len() + group.len());
    updated.push_str(&content[..close]);
    updated.push_str(&group);
    updated.push_str(&content[close..]);
    std::fs::write(project_file, updated)?;

    Ok(Registration::Added {
        item_type: item_type.to_string(),
        include,
    })
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const LEGACY: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<Project ToolsVersion=\"15.0\" xmlns=\"http://schemas.microsoft.com/developer/msbuild/2003\">\n  <ItemGroup>\n    <Compile Include=\"Program.cs\" />\n  </ItemGroup>\n</Project>\n";

    #[test]
    fn test_sdk_style_detection() {
        assert!(is_sdk_style("<Project Sdk=\"Microsoft.NET.Sdk\">\n</Project>"));
        assert!(!is_sdk_style(LEGACY));
        assert!(is_sdk_style("<Project>\n  <Sdk Name=\"Microsoft.NET.Sdk\" />\n</Project>"));
    }

    #[test]
    fn test_item_type_for() {
        assert_eq!(item_type_for(Path::new("LoginSteps.cs")), "Compile");
        assert_eq!(item_type_for(Path::new("Module.VB")), "Compile");
        assert_eq!(item_type_for(Path::new("Login.feature")), "None");
        assert_eq!(item_type_for(Path::new("README")), "None");
    }

    #[test]
    fn test_sdk_project_is_implicit() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("App.csproj");
        fs::write(&project, "<Project Sdk=\"Microsoft.NET.Sdk\">\n</Project>\n").unwrap();

        let result = register_item(&project, &temp.path().join("Steps").join("A.cs")).unwrap();
        assert_eq!(result, Registration::Implicit);
    }

    #[test]
    fn test_legacy_project_gets_item_group() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("App.csproj");
        fs::write(&project, LEGACY).unwrap();

        let file = temp.path().join("Features").join("Login.feature");
        let result = register_item(&project, &file).unwrap();
        assert_eq!(
            result,
            Registration::Added {
                item_type: "None".to_string(),
                include: "Features\\Login.feature".to_string(),
            }
        );

        let updated = fs::read_to_string(&project).unwrap();
        assert!(updated.contains("<None Include=\"Features\\Login.feature\" />"));
        assert!(updated.trim_end().ends_with("</Project>"));

        // Second registration is a no-op
        assert_eq!(register_item(&project, &file).unwrap(), Registration::AlreadyPresent);
    }

    #[test]
    fn test_escaped_include_is_registered_once() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("App.csproj");
        fs::write(&project, LEGACY).unwrap();

        let file = temp.path().join("R&D.txt");
        assert!(matches!(register_item(&project, &file).unwrap(), Registration::Added { .. }));
        assert_eq!(register_item(&project, &file).unwrap(), Registration::AlreadyPresent);

        let updated = fs::read_to_string(&project).unwrap();
        assert_eq!(updated.matches("Include=\"R&amp;D.txt\"").count(), 1);
    }

    #[test]
    fn test_non_msbuild_project_is_unsupported() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("site.njsproj.json");
        assert_eq!(
            register_item(&project, &temp.path().join("a.js")).unwrap(),
            Registration::Unsupported
        );
    }

    #[test]
    fn test_file_outside_project_is_rejected() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("App").join("App.csproj");
        let err = register_item(&project, &temp.path().join("Other").join("a.cs")).unwrap_err();
        assert!(matches!(err, RegistrationError::OutsideProject { .. }));
    }
}
