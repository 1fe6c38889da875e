use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::domain::{Project, ProjectId};

const PROJECT_COLUMNS: &str = "id, name, preview_url, published, published_url, file_name, file_size, created_at, updated_at";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredProject {
    pub project_id: ProjectId,
    pub name: String,
    pub preview_url: String,
    pub published: bool,
    pub published_url: Option<String>,
    pub file_name: String,
    pub file_size: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StoredProject> for Project {
    fn from(stored: StoredProject) -> Self {
        Self {
            id: stored.project_id,
            name: stored.name,
            preview: stored.preview_url,
            published: stored.published,
            published_url: stored.published_url,
            file_name: Some(stored.file_name),
            file_size: Some(stored.file_size),
            created_at: Some(stored.created_at),
            updated_at: Some(stored.updated_at),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub preview_url: String,
    pub file_content: String,
    pub file_name: String,
    pub file_size: u64,
}

/// Partial update. `published_url: Some(None)` clears the URL.
#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub published: Option<bool>,
    pub published_url: Option<Option<String>>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Newest first; rows created within the same instant fall back to id order.
    pub async fn list_projects(&self) -> Result<Vec<StoredProject>> {
        let rows = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .context("failed to list projects")?;
        rows.iter().map(project_from_row).collect()
    }

    pub async fn get_project(&self, project_id: ProjectId) -> Result<Option<StoredProject>> {
        let row = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"
        ))
        .bind(project_id.0)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to load project {project_id}"))?;
        row.as_ref().map(project_from_row).transpose()
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<StoredProject> {
        let now = Utc::now();
        let file_size = i64::try_from(project.file_size).context("file size out of range")?;
        let row = sqlx::query(&format!(
            "INSERT INTO projects (name, preview_url, file_content, file_name, file_size, published, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, 0, ?, ?)
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(&project.name)
        .bind(&project.preview_url)
        .bind(&project.file_content)
        .bind(&project.file_name)
        .bind(file_size)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert project")?;
        let stored = project_from_row(&row)?;
        debug!(project_id = stored.project_id.0, "stored new project");
        Ok(stored)
    }

    /// Applies `changes` and bumps `updated_at`. Returns `None` for an unknown id.
    pub async fn update_project(
        &self,
        project_id: ProjectId,
        changes: &ProjectChanges,
    ) -> Result<Option<StoredProject>> {
        let (replace_url, published_url) = match &changes.published_url {
            Some(url) => (true, url.clone()),
            None => (false, None),
        };
        let row = sqlx::query(&format!(
            "UPDATE projects SET
                 name = COALESCE(?1, name),
                 published = COALESCE(?2, published),
                 published_url = CASE WHEN ?3 THEN ?4 ELSE published_url END,
                 updated_at = ?5
             WHERE id = ?6
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(changes.name.as_deref())
        .bind(changes.published)
        .bind(replace_url)
        .bind(published_url)
        .bind(Utc::now())
        .bind(project_id.0)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to update project {project_id}"))?;
        row.as_ref().map(project_from_row).transpose()
    }

    pub async fn delete_project(&self, project_id: ProjectId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(project_id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete project {project_id}"))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn load_file_content(&self, project_id: ProjectId) -> Result<Option<String>> {
        let content = sqlx::query_scalar("SELECT file_content FROM projects WHERE id = ?")
            .bind(project_id.0)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load file content for project {project_id}"))?;
        Ok(content)
    }
}

fn project_from_row(row: &SqliteRow) -> Result<StoredProject> {
    let file_size: i64 = row.try_get("file_size")?;
    Ok(StoredProject {
        project_id: ProjectId(row.try_get("id")?),
        name: row.try_get("name")?,
        preview_url: row.try_get("preview_url")?,
        published: row.try_get("published")?,
        published_url: row.try_get("published_url")?,
        file_name: row.try_get("file_name")?,
        file_size: u64::try_from(file_size).context("negative file size in database")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
