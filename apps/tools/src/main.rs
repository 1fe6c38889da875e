use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use shared::domain::{Project, ProjectId};
use storage::Storage;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/projects.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    Show {
        project_id: i64,
        /// Also print the stored file content.
        #[arg(long)]
        content: bool,
    },
    Delete {
        project_id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::List => {
            for stored in storage.list_projects().await? {
                let project = Project::from(stored);
                println!(
                    "{}\t{}\t{}\t{}",
                    project.id,
                    if project.published { "published" } else { "draft" },
                    project.name,
                    project.published_url.as_deref().unwrap_or("-"),
                );
            }
        }
        Command::Show {
            project_id,
            content,
        } => {
            let project_id = ProjectId(project_id);
            let Some(stored) = storage.get_project(project_id).await? else {
                bail!("project {project_id} not found");
            };
            println!("{}", serde_json::to_string_pretty(&Project::from(stored))?);
            if content {
                let body = storage.load_file_content(project_id).await?;
                println!("{}", body.unwrap_or_default());
            }
        }
        Command::Delete { project_id } => {
            let project_id = ProjectId(project_id);
            if !storage.delete_project(project_id).await? {
                bail!("project {project_id} not found");
            }
            println!("deleted project_id={project_id}");
        }
    }

    Ok(())
}
