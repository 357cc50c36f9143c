//! filebridge CLI
//!
//! Runs the file receiver and talks to a running instance.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use clap::{Parser, Subcommand};
use filebridge_core::{BridgeConfig, IncomingFilePayload, CONFIG_FILE_NAME};
use filebridge_server::{run_server, OutputPane};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "filebridge")]
#[command(about = "Receive files from the browser and add them to solution projects")]
#[command(version)]
struct Cli {
    /// Config file (default: ./filebridge.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of a running receiver (client commands)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the file receiver
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Solution file to serve
        #[arg(short, long)]
        solution: Option<PathBuf>,

        /// Directory searched for a solution when none is given
        #[arg(short, long)]
        root: Option<PathBuf>,
    },

    /// Write a default config and the .filebridge directory
    Init {
        /// Directory to initialize (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// List the projects of the open solution
    Projects,

    /// List the folders of a project
    Folders {
        /// Project directory (default: the receiver's best guess)
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Upload a local file into a project
    Send {
        /// File to upload
        file: PathBuf,

        /// Name to create the file under (default: the local file name)
        #[arg(short, long)]
        name: Option<String>,

        /// Folder relative to the project root
        #[arg(short, long)]
        folder: Option<String>,

        /// Project directory (default: the receiver's best guess)
        #[arg(short, long)]
        project: Option<String>,

        /// Send the content base64-encoded
        #[arg(long)]
        base64: bool,
    },

    /// Check whether a receiver is running
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let (mut config, config_path) = BridgeConfig::discover(cli.config.as_deref(), &cwd)?;
    config.apply_env_overrides()?;

    let log_dir = config.log_directory();
    let (pane, pane_error) = match &cli.command {
        Commands::Serve { .. } => match OutputPane::create(&config.log.pane, &log_dir) {
            Ok(pane) => (Some(pane), None),
            Err(e) => (None, Some(e)),
        },
        _ => (None, None),
    };
    init_logging(pane);

    if let Some(e) = pane_error {
        tracing::warn!("Failed to create output pane in {}: {}", log_dir.display(), e);
    }

    if let Some(path) = &config_path {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let base_url = cli
        .url
        .clone()
        .unwrap_or_else(|| format!("http://{}:{}", config.server.host, config.server.port));

    match cli.command {
        Commands::Serve {
            port,
            host,
            solution,
            root,
        } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            if solution.is_some() {
                config.workspace.solution = solution;
            }
            if let Some(root) = root {
                config.workspace.root = root;
            }
            cmd_serve(config).await?;
        }
        Commands::Init { path } => {
            cmd_init(path.unwrap_or(cwd))?;
        }
        Commands::Projects => {
            cmd_get(&format!("{}/projects", base_url), &[]).await?;
        }
        Commands::Folders { project } => {
            let query: Vec<(&str, String)> = project.into_iter().map(|p| ("project", p)).collect();
            cmd_get(&format!("{}/folders", base_url), &query).await?;
        }
        Commands::Send {
            file,
            name,
            folder,
            project,
            base64,
        } => {
            cmd_send(&base_url, &file, name, folder, project, base64).await?;
        }
        Commands::Status => {
            cmd_status(&base_url).await?;
        }
    }

    Ok(())
}

fn init_logging(pane: Option<OutputPane>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("filebridge=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(pane)
        .init();
}

/// Run the receiver until Ctrl-C or SIGTERM
async fn cmd_serve(config: BridgeConfig) -> Result<()> {
    println!("Starting file receiver on http://{}:{}...", config.server.host, config.server.port);
    match &config.workspace.solution {
        Some(solution) => println!("Solution: {}", solution.display()),
        None => println!("Looking for a solution under {}", config.workspace.root.display()),
    }
    println!("Stop with Ctrl-C");

    run_server(config, shutdown_signal()).await
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}

/// Write a default config
fn cmd_init(dir: PathBuf) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        bail!("{} already exists", config_path.display());
    }

    let state_dir = dir.join(".filebridge");
    std::fs::create_dir_all(state_dir.join("logs")).context("Failed to create .filebridge directory")?;

    let config = BridgeConfig::default();
    let toml = config.to_toml().context("Failed to serialize default config")?;
    std::fs::write(&config_path, toml).with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Initialized filebridge at {}", dir.display());
    println!("\n  {}   - Receiver configuration", CONFIG_FILE_NAME);
    println!("  .filebridge/      - Session signals and logs");
    println!("\nNext steps:");
    println!("  1. Set [workspace] solution in {} (or keep one .sln here)", CONFIG_FILE_NAME);
    println!("  2. Run: filebridge serve");
    Ok(())
}

/// GET a JSON route and print it
async fn cmd_get(url: &str, query: &[(&str, String)]) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", url))?;
    print_response(response).await
}

/// Upload a local file
async fn cmd_send(
    base_url: &str,
    file: &Path,
    name: Option<String>,
    folder: Option<String>,
    project: Option<String>,
    force_base64: bool,
) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = match name {
        Some(name) => name,
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("File has no name; pass --name")?,
    };

    // Binary content can only travel as base64
    let content = match String::from_utf8(bytes) {
        Ok(text) if !force_base64 => text,
        Ok(text) => STANDARD.encode(text.as_bytes()),
        Err(e) => STANDARD.encode(e.into_bytes()),
    };

    let payload = IncomingFilePayload {
        file_name,
        content,
        folder_path: folder,
        project_directory: project,
    };

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/", base_url.trim_end_matches('/')))
        .json(&payload)
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", base_url))?;
    print_response(response).await
}

/// Check the receiver's health endpoint
async fn cmd_status(base_url: &str) -> Result<()> {
    let client = reqwest::Client::new();
    match client.get(format!("{}/health", base_url)).send().await {
        Ok(response) => print_response(response).await,
        Err(_) => {
            println!("File receiver is not running at {}.", base_url);
            println!("Start it with: filebridge serve");
            bail!("receiver not reachable")
        }
    }
}

async fn print_response(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    let body = response.text().await.context("Failed to read response")?;

    let rendered = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or(body);
    println!("{}", rendered);

    if !status.is_success() {
        bail!("request failed with {}", status);
    }
    Ok(())
}
