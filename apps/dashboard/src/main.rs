use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    InMemoryProjectStore, NotificationSink, ProjectController, ProjectStore, RemoteProjectStore,
    RemoteStoreConfig, Severity, UploadedFile,
};
use shared::domain::{Project, ProjectId};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Project service root, e.g. `http://127.0.0.1:8080`. Without it the
    /// dashboard keeps projects in memory for this run only.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Start the local store without the gallery fixtures.
    #[arg(long)]
    no_seed: bool,
    /// Print projects as JSON instead of a table.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    Create {
        path: PathBuf,
        #[arg(long)]
        publish: bool,
    },
    Publish {
        project_id: i64,
    },
}

struct TerminalNotificationSink;

impl NotificationSink for TerminalNotificationSink {
    fn notify(&self, title: &str, description: &str, severity: Severity) {
        match severity {
            Severity::Default => println!("{title}: {description}"),
            Severity::Destructive => eprintln!("{title}: {description}"),
        }
    }
}

fn build_store(args: &Args) -> Result<Arc<dyn ProjectStore>> {
    let Some(server_url) = &args.server_url else {
        let store = if args.no_seed {
            InMemoryProjectStore::empty()
        } else {
            InMemoryProjectStore::with_fixtures()
        };
        return Ok(Arc::new(store));
    };

    let mut config = RemoteStoreConfig::for_server(server_url);
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(Arc::new(RemoteProjectStore::new(config)?))
}

fn print_projects(projects: &[Project], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(projects)?);
        return Ok(());
    }
    if projects.is_empty() {
        println!("no projects");
    }
    for project in projects {
        let url = project.published_url.as_deref().unwrap_or("-");
        let state = if project.published { "published" } else { "draft" };
        println!("{:>14}  {:<9}  {}  {}", project.id, state, project.name, url);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let store = build_store(&args)?;
    let remote = args.server_url.is_some();
    let controller = ProjectController::new(store, Arc::new(TerminalNotificationSink));
    if remote {
        controller.load_projects().await?;
    }

    match args.command {
        Command::List => print_projects(&controller.projects().await, args.json)?,
        Command::Create { path, publish } => {
            let file = UploadedFile::from_path(&path).await?;
            controller.select_file(file).await;
            if let Some(project) = controller.create_project().await? {
                if publish {
                    controller.publish(project.id).await?;
                }
            }
            print_projects(&controller.projects().await, args.json)?;
        }
        Command::Publish { project_id } => {
            let project = controller.publish(ProjectId(project_id)).await?;
            print_projects(std::slice::from_ref(&project), args.json)?;
        }
    }

    Ok(())
}
