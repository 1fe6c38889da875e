use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use server_api::{
    create_project, delete_project, get_project, list_projects, update_project, ApiContext,
};
use shared::{
    domain::{Project, ProjectId},
    error::{ApiError, ErrorCode},
    protocol::{project_route, projects_route, CreateProjectRequest, UpdateProjectRequest},
};
use storage::Storage;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, prepare_database_url};

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state), settings.max_upload_bytes);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, max_upload_bytes = settings.max_upload_bytes, "project store listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            projects_route(),
            get(http_list_projects).post(http_create_project),
        )
        .route(
            project_route(),
            get(http_get_project)
                .put(http_update_project)
                .delete(http_delete_project),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(middleware::map_response(payload_too_large_as_api_error))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_response(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(message = %err.message, "project store request failed");
    }
    (status, Json(err))
}

/// The body limit answers with a bare 413; rewrite it into the usual
/// `{code, message}` body.
async fn payload_too_large_as_api_error(response: Response) -> Response {
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response;
    }
    error_response(ApiError::new(
        ErrorCode::PayloadTooLarge,
        "request body exceeds the upload limit",
    ))
    .into_response()
}

async fn healthz(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state.api.storage.health_check().await.map_err(|e| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new(ErrorCode::Internal, e.to_string())),
        )
    })?;
    Ok("ok")
}

async fn http_list_projects(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Project>>> {
    list_projects(&state.api)
        .await
        .map(Json)
        .map_err(error_response)
}

async fn http_get_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i64>,
) -> ApiResult<Json<Project>> {
    get_project(&state.api, ProjectId(project_id))
        .await
        .map(Json)
        .map_err(error_response)
}

async fn http_create_project(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = create_project(&state.api, req)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn http_update_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i64>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    update_project(&state.api, ProjectId(project_id), req)
        .await
        .map(Json)
        .map_err(error_response)
}

async fn http_delete_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i64>,
) -> ApiResult<StatusCode> {
    delete_project(&state.api, ProjectId(project_id))
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
