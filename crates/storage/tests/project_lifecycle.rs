use shared::domain::{published_url, PLACEHOLDER_PREVIEW};
use storage::{NewProject, ProjectChanges, Storage};

#[tokio::test]
async fn draft_to_published_lifecycle_survives_reopen() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("projects.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let project_id = {
        let storage = Storage::new(&database_url).await.expect("db");
        let created = storage
            .create_project(&NewProject {
                name: "Корпоративный сайт".to_string(),
                preview_url: PLACEHOLDER_PREVIEW.to_string(),
                file_content: "<html>corp</html>".to_string(),
                file_name: "Корпоративный сайт.html".to_string(),
                file_size: 17,
            })
            .await
            .expect("create");

        storage
            .update_project(
                created.project_id,
                &ProjectChanges {
                    published: Some(true),
                    published_url: Some(Some(published_url(&created.name))),
                    ..ProjectChanges::default()
                },
            )
            .await
            .expect("publish")
            .expect("exists");
        created.project_id
    };

    let reopened = Storage::new(&database_url).await.expect("reopen");
    let project = reopened
        .get_project(project_id)
        .await
        .expect("get")
        .expect("persisted");
    assert!(project.published);
    assert_eq!(
        project.published_url.as_deref(),
        Some("https://корпоративный-сайт.dev")
    );
}
