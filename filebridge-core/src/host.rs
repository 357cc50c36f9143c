//! Host project model
//!
//! [`ProjectHost`] is the seam between the bridge and whatever owns the
//! solution (an IDE, or the filesystem). Hosts are not required to be thread
//! safe: the server only ever calls them from one execution context.

use std::path::{Path, PathBuf};

use crate::config::WorkspaceConfig;
use crate::project_file::{self, Registration, RegistrationError};
use crate::session::{load_session, SessionSignals};
use crate::solution::{find_solution, load_solution, SolutionError};
use crate::types::{ProjectEntry, Solution};

/// Errors surfaced by a host
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Solution(#[from] SolutionError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

/// Live view of the host's solution and editor state
pub trait ProjectHost: Send {
    /// Snapshot of the open solution; `None` when no solution is open
    fn solution(&mut self) -> Result<Option<Solution>, HostError>;

    /// Selection/active-document/startup signals for the best-guess resolver
    fn session(&mut self) -> SessionSignals;

    /// Add a newly written file to a project
    fn register_item(&mut self, project: &ProjectEntry, file: &Path) -> Result<Registration, HostError>;
}

/// Host backed by a `.sln` file on disk.
///
/// The solution is re-read on every call; nothing is cached between requests.
#[derive(Debug, Clone)]
pub struct WorkspaceHost {
    solution: Option<PathBuf>,
    root: PathBuf,
    session_file: PathBuf,
}

impl WorkspaceHost {
    pub fn new(config: &WorkspaceConfig) -> Self {
        Self {
            solution: config.solution.clone(),
            root: config.root.clone(),
            session_file: config.session_file.clone(),
        }
    }

    /// Host for a single solution file
    pub fn for_solution(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let root = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        Self {
            solution: Some(path),
            root,
            session_file: WorkspaceConfig::default().session_file,
        }
    }

    /// Host that searches `root` for a solution file
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            solution: None,
            root: root.into(),
            session_file: WorkspaceConfig::default().session_file,
        }
    }

    fn solution_path(&self) -> Result<Option<PathBuf>, SolutionError> {
        if let Some(path) = &self.solution {
            return Ok(path.is_file().then(|| path.clone()));
        }
        match find_solution(&self.root) {
            Ok(path) => Ok(Some(path)),
            Err(SolutionError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn solution_dir(&self) -> PathBuf {
        match &self.solution {
            Some(path) => path.parent().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone()),
            None => self.root.clone(),
        }
    }
}

impl ProjectHost for WorkspaceHost {
    fn solution(&mut self) -> Result<Option<Solution>, HostError> {
        let Some(path) = self.solution_path()? else {
            tracing::info!("No solution file found under {}", self.root.display());
            return Ok(None);
        };
        let solution = load_solution(&path)?;
        tracing::info!(
            "Solution is open: {} ({} top-level items)",
            path.display(),
            solution.len()
        );
        Ok(Some(solution))
    }

    fn session(&mut self) -> SessionSignals {
        let base = self.solution_dir();
        let file = if self.session_file.is_absolute() {
            self.session_file.clone()
        } else {
            base.join(&self.session_file)
        };
        load_session(&file, &base)
    }

    fn register_item(&mut self, project: &ProjectEntry, file: &Path) -> Result<Registration, HostError> {
        let registration = project_file::register_item(&project.full_path, file)?;
        tracing::info!(
            "Registered {} with project {}: {:?}",
            file.display(),
            project.name,
            registration
        );
        Ok(registration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SLN: &str = "Project(\"{9A19103F-16F7-4668-BE54-9A1E7A4F7556}\") = \"App\", \"App\\App.csproj\", \"{11111111-1111-1111-1111-111111111111}\"\nEndProject\n";

    #[test]
    fn test_root_without_solution() {
        let temp = TempDir::new().unwrap();
        let mut host = WorkspaceHost::for_root(temp.path());
        assert!(host.solution().unwrap().is_none());
    }

    #[test]
    fn test_explicit_missing_solution_is_closed() {
        let temp = TempDir::new().unwrap();
        let mut host = WorkspaceHost::for_solution(temp.path().join("Gone.sln"));
        assert!(host.solution().unwrap().is_none());
    }

    #[test]
    fn test_solution_is_reloaded_on_each_call() {
        let temp = TempDir::new().unwrap();
        let sln = temp.path().join("App.sln");
        fs::write(&sln, "").unwrap();

        let mut host = WorkspaceHost::for_root(temp.path());
        assert!(host.solution().unwrap().unwrap().is_empty());

        fs::write(&sln, SLN).unwrap();
        assert_eq!(host.solution().unwrap().unwrap().len(), 1);
    }

    #[test]
    fn test_session_file_relative_to_solution() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("App.sln"), SLN).unwrap();
        fs::create_dir_all(temp.path().join(".filebridge")).unwrap();
        fs::write(
            temp.path().join(".filebridge").join("session.yaml"),
            "activeDocument: App/Steps.cs\n",
        )
        .unwrap();

        let mut host = WorkspaceHost::for_solution(temp.path().join("App.sln"));
        let session = host.session();
        assert_eq!(session.active_document, Some(temp.path().join("App/Steps.cs")));
    }

    #[test]
    fn test_register_item_in_sdk_project() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("App");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("App.csproj"), "<Project Sdk=\"Microsoft.NET.Sdk\"></Project>").unwrap();

        let mut host = WorkspaceHost::for_root(temp.path());
        let entry = ProjectEntry::new(
            "App",
            dir.join("App.csproj"),
            crate::types::ProjectKind::new(crate::types::SDK_PROJECT_KIND),
        );
        let result = host.register_item(&entry, &dir.join("Foo.txt")).unwrap();
        assert_eq!(result, Registration::Implicit);
    }
}
