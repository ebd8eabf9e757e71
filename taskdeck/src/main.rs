//! Taskdeck — command-line consumer for the project board backend.
//!
//! Renders what the [`ProjectStore`] derives; completion counts always
//! come from the canonical derivation rule, never from ad hoc counting.
//!
//! ```bash
//! # List projects against the default backend
//! cargo run --bin taskdeck -- list
//!
//! # Point at another backend
//! cargo run --bin taskdeck -- --base-url http://10.0.0.2:5000 list
//!
//! # Or via environment variable
//! TASKDECK_BASE_URL=http://10.0.0.2:5000 cargo run --bin taskdeck -- list
//! ```

use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;

use taskdeck::config::{CliArgs, ClientConfig};
use taskdeck::store::ProjectStore;
use taskdeck_api::{
    CreateProjectRequest, Project, ProjectId, UpdateProjectRequest, derive_completion,
};

#[derive(Parser, Debug)]
#[command(version, about = "Taskdeck project board client")]
struct Cli {
    #[command(flatten)]
    args: CliArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all projects with derived completion counts.
    List,
    /// Show one project and its tasks.
    Show {
        /// Project id.
        id: String,
    },
    /// Query the backend status oracle for a project.
    Status {
        /// Project id.
        id: String,
    },
    /// Create a project.
    Create {
        /// Project name.
        name: String,
        /// Longer description.
        #[arg(long)]
        description: Option<String>,
        /// Owner display name.
        #[arg(long)]
        owner: Option<String>,
    },
    /// Update a project's metadata (absent fields unchanged).
    Update {
        /// Project id.
        id: String,
        /// New name.
        #[arg(long)]
        name: Option<String>,
        /// New description.
        #[arg(long)]
        description: Option<String>,
        /// New owner display name.
        #[arg(long)]
        owner: Option<String>,
    },
    /// Delete a project.
    Delete {
        /// Project id.
        id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load and resolve configuration (CLI args > config file > defaults).
    let config = match ClientConfig::load(&cli.args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    let _log_guard = init_logging(&cli.args.log_level, cli.args.log_file.as_deref());

    tracing::info!(base_url = %config.base_url, "taskdeck starting");

    let store = match ProjectStore::from_config(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: could not initialize client: {e}");
            return ExitCode::FAILURE;
        }
    };

    run_command(&store, cli.command).await;

    if let Some(message) = store.take_error() {
        eprintln!("Error: {message}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Initialize logging.
///
/// Logs go to stderr by default; `--log-file` switches to a
/// non-blocking file writer. Returns a [`WorkerGuard`] that must be
/// held until shutdown so buffered entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    if let Some(log_path) = file_path {
        let log_dir = log_path.parent()?;
        let file_name = log_path.file_name()?.to_str()?;
        let file_appender = tracing_appender::rolling::never(log_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        tracing_subscriber::fmt()
            .with_writer(non_blocking)
            .with_env_filter(env_filter)
            .with_ansi(false)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
        None
    }
}

/// Dispatch one subcommand against the store.
///
/// Failures are not handled here: the store records them and `main`
/// reports whatever [`ProjectStore::take_error`] yields.
async fn run_command(store: &ProjectStore, command: Command) {
    match command {
        Command::List => {
            let projects = store.load_projects().await;
            if projects.is_empty() && store.last_error().is_none() {
                println!("no projects");
            }
            for project in &projects {
                println!("{}", render_summary(project));
            }
        }
        Command::Show { id } => {
            if let Some(project) = store.get_project(&ProjectId::new(id)).await {
                print_project(&project);
            }
        }
        Command::Status { id } => {
            let id = ProjectId::new(id);
            if let Some(status) = store.project_status(&id).await {
                let label = if status.is_completed {
                    "completed"
                } else {
                    "active"
                };
                println!(
                    "{id}: {label} ({}/{} tasks done)",
                    status.completed_count, status.total_count
                );
            }
        }
        Command::Create {
            name,
            description,
            owner,
        } => {
            let req = CreateProjectRequest {
                name,
                description,
                owner,
                tasks: Vec::new(),
            };
            if let Some(project) = store.create_project(&req).await {
                println!("created {}", project.id);
            }
        }
        Command::Update {
            id,
            name,
            description,
            owner,
        } => {
            let req = UpdateProjectRequest {
                name,
                description,
                owner,
            };
            if let Some(project) = store.update_project(&ProjectId::new(id), &req).await {
                println!("updated {}", project.id);
            }
        }
        Command::Delete { id } => {
            let id = ProjectId::new(id);
            if store.delete_project(&id).await {
                println!("deleted {id}");
            }
        }
    }
}

/// One-line project summary with derived completion counts.
fn render_summary(project: &Project) -> String {
    let status = derive_completion(&project.tasks);
    let marker = if status.is_completed { 'x' } else { ' ' };
    format!(
        "[{marker}] {}  {} ({}/{})",
        project.id, project.name, status.completed_count, status.total_count
    )
}

/// Multi-line project detail with its task list.
fn print_project(project: &Project) {
    println!("{}", render_summary(project));
    if let Some(description) = &project.description {
        println!("    {description}");
    }
    if let Some(owner) = &project.owner {
        println!("    owner: {owner}");
    }
    for task in &project.tasks {
        let marker = if task.status.is_done() { 'x' } else { ' ' };
        let deadline = task
            .deadline
            .as_deref()
            .map(|d| format!("  due {d}"))
            .unwrap_or_default();
        println!(
            "    [{marker}] {}  {} ({}){deadline}",
            task.id, task.title, task.status
        );
    }
}
