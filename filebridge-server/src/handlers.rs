//! Route handlers
//!
//! Every host-model call goes through [`HostContext::run`]; folder walks
//! and file writes happen on the async side once the context is released.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    Json,
};
use filebridge_core::{
    best_guess_project, decode_content, enumerate_projects, find_project_by_directory, list_project_folders,
    validate_relative_path, FolderList, GuessSource, HostError, IncomingFilePayload, PayloadError, ProjectEntry,
    ProjectHost, ProjectKind, ProjectList,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::AppState;

/// Outcome of resolving the target project for a request
#[derive(Debug)]
pub enum Resolution {
    NoSolution,
    /// A directory was requested but no project has it
    NotFound(String),
    /// No directory was requested and every best-guess step failed
    NoActiveProject,
    /// The project file has no parent directory
    NoDirectory(String),
    Found(ResolvedProject),
}

#[derive(Debug, Clone)]
pub struct ResolvedProject {
    pub project: ProjectEntry,
    pub directory: PathBuf,
    /// Fallback step used, `None` for an exact directory match
    pub source: Option<GuessSource>,
}

impl ResolvedProject {
    fn log_resolution(&self) {
        match self.source {
            Some(source) => tracing::info!(
                "SUCCESS: Found project: {} at {} (from {})",
                self.project.name,
                self.directory.display(),
                source
            ),
            None => tracing::info!(
                "SUCCESS: Found project: {} at {}",
                self.project.name,
                self.directory.display()
            ),
        }
    }
}

/// Resolve the target project on the host context.
///
/// With `requested` set only an exact directory match is accepted; otherwise
/// the best-guess fallback chain is used.
pub fn resolve_target(
    host: &mut dyn ProjectHost,
    requested: Option<&str>,
    buildable_kinds: &[ProjectKind],
) -> Result<Resolution, HostError> {
    let Some(solution) = host.solution()? else {
        return Ok(Resolution::NoSolution);
    };

    let (project, source) = match requested {
        Some(dir) => {
            tracing::info!("Using specified project directory: {}", dir);
            match find_project_by_directory(&solution.nodes, Path::new(dir)) {
                Some(project) => {
                    tracing::info!("Found matching project: {}", project.name);
                    (project.clone(), None)
                }
                None => {
                    tracing::info!("Could not find project with directory: {}", dir);
                    return Ok(Resolution::NotFound(dir.to_string()));
                }
            }
        }
        None => {
            tracing::info!("No project directory provided, using active project");
            let session = host.session();
            match best_guess_project(&solution, &session, buildable_kinds) {
                Some(guess) => (guess.project.clone(), Some(guess.source)),
                None => return Ok(Resolution::NoActiveProject),
            }
        }
    };

    match project.directory().map(Path::to_path_buf) {
        Some(directory) => Ok(Resolution::Found(ResolvedProject {
            project,
            directory,
            source,
        })),
        None => Ok(Resolution::NoDirectory(project.full_path.display().to_string())),
    }
}

async fn resolve(state: &AppState, requested: Option<String>) -> Result<Result<Resolution, HostError>, ApiError> {
    let kinds = state.buildable_kinds.clone();
    Ok(state
        .host
        .run(move |host| resolve_target(host, requested.as_deref(), &kinds))
        .await?)
}

/// Health check endpoint
pub async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// `GET /projects`
pub async fn handle_projects(State(state): State<Arc<AppState>>) -> Result<Json<ProjectList>, ApiError> {
    tracing::info!("Processing GET request for project list");

    let projects = state
        .host
        .run(|host| -> Result<Option<_>, HostError> {
            let Some(solution) = host.solution()? else {
                return Ok(None);
            };
            Ok(Some(enumerate_projects(&solution.nodes)))
        })
        .await??;

    let Some(projects) = projects else {
        return Err(ApiError::NotFound("No solution is open".to_string()));
    };
    if projects.is_empty() {
        return Err(ApiError::NotFound("No projects found in solution".to_string()));
    }

    tracing::info!("SUCCESS: Sent project list with {} projects", projects.len());
    Ok(Json(ProjectList { projects }))
}

#[derive(Debug, Deserialize)]
pub struct FolderQuery {
    pub project: Option<String>,
}

/// `GET /folders[?project=<dir>]`
pub async fn handle_folders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FolderQuery>,
) -> Result<Json<FolderList>, ApiError> {
    tracing::info!("Processing GET request for folder structure");

    let requested = query.project.filter(|p| !p.is_empty());
    let resolved = match resolve(&state, requested).await?? {
        Resolution::Found(resolved) => resolved,
        Resolution::NoSolution => {
            return Err(ApiError::NotFound("No solution is open".to_string()));
        }
        Resolution::NotFound(_) => {
            return Err(ApiError::NotFound(
                "Project not found with specified directory".to_string(),
            ));
        }
        Resolution::NoActiveProject => {
            tracing::info!("TROUBLESHOOTING: select a project in the solution explorer or open a file from it");
            return Err(ApiError::NotFound(
                "No active project found. Please select a project in Solution Explorer or open a file from your project."
                    .to_string(),
            ));
        }
        Resolution::NoDirectory(full_name) => {
            tracing::error!("Could not determine project directory from: {}", full_name);
            return Err(ApiError::Internal("Could not determine project directory".to_string()));
        }
    };

    resolved.log_resolution();

    if !resolved.directory.is_dir() {
        tracing::error!("Project directory does not exist: {}", resolved.directory.display());
        return Err(ApiError::Internal("Project directory does not exist".to_string()));
    }

    let excluded = state.excluded_dirs.clone();
    let directory = resolved.directory.clone();
    let folders = tokio::task::spawn_blocking(move || list_project_folders(&directory, &excluded))
        .await
        .map_err(|e| ApiError::Internal(format!("Folder listing failed: {}", e)))?;

    tracing::info!(
        "SUCCESS: Sent folder structure with {} folders for project {}",
        folders.len(),
        resolved.project.name
    );
    Ok(Json(FolderList { folders }))
}

/// `POST /`: write a file into a project and register it
pub async fn handle_upload(State(state): State<Arc<AppState>>, body: String) -> Result<&'static str, ApiError> {
    tracing::info!("Received file data, content length: {}", body.len());

    let payload = IncomingFilePayload::parse(&body).map_err(|e| match e {
        PayloadError::Empty => ApiError::BadRequest("Empty request body".to_string()),
        other => {
            tracing::info!("Failed to parse file data from request: {}", other);
            ApiError::BadRequest("Invalid file data format".to_string())
        }
    })?;

    let mut message = format!("Successfully parsed file: {}", payload.file_name);
    if let Some(folder) = payload.folder() {
        message.push_str(&format!(" in folder: {}", folder));
    }
    if let Some(project) = payload.project_dir() {
        message.push_str(&format!(" for project: {}", project));
    }
    tracing::info!("{}", message);

    let written = add_file_to_project(&state, &payload).await?;
    tracing::info!("File '{}' added to project successfully at {}", payload.file_name, written.display());
    Ok("File added successfully")
}

/// Resolve, validate, write, register. Returns the written path.
async fn add_file_to_project(state: &AppState, payload: &IncomingFilePayload) -> Result<PathBuf, ApiError> {
    let requested = payload.project_dir().map(str::to_string);
    let resolution = state
        .host
        .run({
            let kinds = state.buildable_kinds.clone();
            move |host| resolve_target(host, requested.as_deref(), &kinds)
        })
        .await
        .map_err(|e| ApiError::Unexpected(e.to_string()))?
        .map_err(|e| ApiError::UploadFailed(e.to_string()))?;

    let resolved = match resolution {
        Resolution::Found(resolved) => resolved,
        Resolution::NoSolution => return Err(ApiError::UploadFailed("No solution is open".to_string())),
        Resolution::NotFound(dir) => {
            return Err(ApiError::UploadFailed(format!("Could not find project with directory: {}", dir)));
        }
        Resolution::NoActiveProject => return Err(ApiError::UploadFailed("No active project found".to_string())),
        Resolution::NoDirectory(_) => {
            return Err(ApiError::UploadFailed("Could not determine project directory".to_string()));
        }
    };
    resolved.log_resolution();

    let target_dir = match payload.folder() {
        Some(folder) => {
            let relative = validate_relative_path(folder)
                .map_err(|e| ApiError::UploadFailed(format!("Invalid folder path detected: {} ({})", folder, e)))?;
            tracing::info!("Creating file in specified folder: {}", relative.display());
            resolved.directory.join(relative)
        }
        None => {
            tracing::info!("Creating file in project root");
            resolved.directory.clone()
        }
    };

    let file_name = validate_relative_path(&payload.file_name).map_err(|e| {
        ApiError::UploadFailed(format!("Invalid file name detected: {} ({})", payload.file_name, e))
    })?;
    let file_path = target_dir.join(file_name);

    let decoded = decode_content(&payload.content);
    if decoded.was_base64 {
        tracing::info!("Content appears to be base64 encoded, decoded {} bytes", decoded.bytes.len());
    }

    // create_dir_all succeeds when a concurrent request created the directory first
    let parent = file_path.parent().unwrap_or(&target_dir).to_path_buf();
    tokio::fs::create_dir_all(&parent)
        .await
        .map_err(|e| ApiError::UploadFailed(format!("Error creating {}: {}", parent.display(), e)))?;
    tokio::fs::write(&file_path, &decoded.bytes)
        .await
        .map_err(|e| ApiError::UploadFailed(format!("Error writing {}: {}", file_path.display(), e)))?;

    let project = resolved.project.clone();
    let registered_path = file_path.clone();
    state
        .host
        .run(move |host| host.register_item(&project, &registered_path))
        .await
        .map_err(|e| ApiError::Unexpected(e.to_string()))?
        .map_err(|e| ApiError::UploadFailed(format!("Error adding file to project: {}", e)))?;

    Ok(file_path)
}

/// Preflight and unmatched routes.
///
/// `OPTIONS` answers 200 with no body anywhere; everything else is 405.
pub async fn handle_fallback(method: Method) -> StatusCode {
    if method == Method::OPTIONS {
        tracing::info!("Handling CORS preflight request");
        StatusCode::OK
    } else {
        tracing::info!("Method {} not allowed", method);
        StatusCode::METHOD_NOT_ALLOWED
    }
}
