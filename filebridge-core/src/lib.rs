//! filebridge Core Library
//!
//! This crate provides the core functionality for filebridge:
//! - Solution tree model and `.sln` parsing
//! - Project resolution (exact directory match and best-guess fallback)
//! - Project folder listing
//! - Upload payload parsing, content decoding and path validation
//! - Registering written files with MSBuild projects
//! - Configuration

pub mod config;
pub mod content;
pub mod folders;
pub mod host;
pub mod path_utils;
pub mod project_file;
pub mod resolver;
pub mod session;
pub mod solution;
pub mod types;

// Re-export commonly used types
pub use config::{BridgeConfig, ConfigError, ListenConfig, LogConfig, CONFIG_FILE_NAME};
pub use content::{decode_content, looks_like_base64, DecodedContent};
pub use folders::{default_excluded_dirs, list_project_folders};
pub use host::{HostError, ProjectHost, WorkspaceHost};
pub use path_utils::{normalize_path, path_to_string, validate_relative_path, PathError};
pub use project_file::{register_item, Registration, RegistrationError};
pub use resolver::{
    all_projects, best_guess_project, enumerate_projects, find_project_by_directory, owning_project,
    BestGuess, GuessSource,
};
pub use session::{load_session, SessionSignals};
pub use solution::{find_solution, load_solution, parse_solution, SolutionError};
pub use types::{
    default_buildable_kinds, FolderDescriptor, FolderList, IncomingFilePayload, PayloadError,
    ProjectDescriptor, ProjectEntry, ProjectKind, ProjectList, Solution, SolutionFolder, SolutionNode,
};
