use super::*;

fn new_project(name: &str, file_name: &str) -> NewProject {
    NewProject {
        name: name.to_string(),
        preview_url: shared::domain::PLACEHOLDER_PREVIEW.to_string(),
        file_content: "<html></html>".to_string(),
        file_name: file_name.to_string(),
        file_size: 13,
    }
}

#[tokio::test]
async fn creates_and_lists_projects_newest_first() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let first = storage
        .create_project(&new_project("First", "first.html"))
        .await
        .expect("first");
    let second = storage
        .create_project(&new_project("Second", "second.html"))
        .await
        .expect("second");

    let projects = storage.list_projects().await.expect("list");
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0].project_id, second.project_id);
    assert_eq!(projects[1].project_id, first.project_id);
    assert!(!projects[0].published);
    assert_eq!(projects[0].published_url, None);
    assert_eq!(projects[0].file_size, 13);
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("storage.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[tokio::test]
async fn partial_update_touches_only_given_fields() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let created = storage
        .create_project(&new_project("Landing", "landing.html"))
        .await
        .expect("create");

    let updated = storage
        .update_project(
            created.project_id,
            &ProjectChanges {
                published: Some(true),
                published_url: Some(Some("https://landing.dev".to_string())),
                ..ProjectChanges::default()
            },
        )
        .await
        .expect("update")
        .expect("project exists");

    assert_eq!(updated.name, "Landing");
    assert!(updated.published);
    assert_eq!(updated.published_url.as_deref(), Some("https://landing.dev"));
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    let renamed = storage
        .update_project(
            created.project_id,
            &ProjectChanges {
                name: Some("Renamed".to_string()),
                ..ProjectChanges::default()
            },
        )
        .await
        .expect("rename")
        .expect("project exists");
    assert_eq!(renamed.name, "Renamed");
    assert_eq!(renamed.published_url.as_deref(), Some("https://landing.dev"));
}

#[tokio::test]
async fn clearing_published_url_sets_null() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let created = storage
        .create_project(&new_project("Blog", "blog.html"))
        .await
        .expect("create");
    storage
        .update_project(
            created.project_id,
            &ProjectChanges {
                published: Some(true),
                published_url: Some(Some("https://blog.dev".to_string())),
                ..ProjectChanges::default()
            },
        )
        .await
        .expect("publish");

    let reverted = storage
        .update_project(
            created.project_id,
            &ProjectChanges {
                published: Some(false),
                published_url: Some(None),
                ..ProjectChanges::default()
            },
        )
        .await
        .expect("revert")
        .expect("project exists");
    assert!(!reverted.published);
    assert_eq!(reverted.published_url, None);
}

#[tokio::test]
async fn update_and_delete_report_missing_projects() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let missing = ProjectId(404);

    let updated = storage
        .update_project(missing, &ProjectChanges::default())
        .await
        .expect("update");
    assert!(updated.is_none());
    assert!(!storage.delete_project(missing).await.expect("delete"));
    assert!(storage.get_project(missing).await.expect("get").is_none());
}

#[tokio::test]
async fn stores_file_content_separately_from_listing() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let created = storage
        .create_project(&new_project("Docs", "docs.html"))
        .await
        .expect("create");

    let content = storage
        .load_file_content(created.project_id)
        .await
        .expect("content")
        .expect("row");
    assert_eq!(content, "<html></html>");

    assert!(storage.delete_project(created.project_id).await.expect("delete"));
    assert!(storage.list_projects().await.expect("list").is_empty());
}

#[test]
fn stored_project_converts_to_domain_project() {
    let now = Utc::now();
    let project: Project = StoredProject {
        project_id: ProjectId(3),
        name: "Shop".to_string(),
        preview_url: "/placeholder.svg".to_string(),
        published: false,
        published_url: None,
        file_name: "shop.zip".to_string(),
        file_size: 1024,
        created_at: now,
        updated_at: now,
    }
    .into();

    assert_eq!(project.id, ProjectId(3));
    assert_eq!(project.file_name.as_deref(), Some("shop.zip"));
    assert_eq!(project.created_at, Some(now));
}
