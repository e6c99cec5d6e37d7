//! REST API for previewing task resets.
//!
//! Lists the task catalog and resets a task on an in-memory tabletop,
//! returning the spawned scene and its goals. Uses Axum as the web
//! framework and supports CORS.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::OnceLock;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::config::{ApiConfig, ResetSettings};
use crate::goal::{Goal, MatchMatrix, Metric, ZoneTarget};
use crate::model::{AssetRef, Category, ObjectId, PlacedObject, Rgba, TemplateParam, Zone};
use crate::placement::{PlacementConfig, ZoneOverlapMode};
use crate::tabletop::Tabletop;
use crate::task::{ResetEvent, TaskDefinition, TaskEpisode, reset_task, reset_task_with_progress};
use crate::tasks;
use crate::types::{Pose, Quat, Vec3};

#[derive(Clone)]
struct ApiState {
    placement: PlacementConfig,
    reset: ResetSettings,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes match https://unpkg.com/swagger-ui-dist@5.17.14/.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>tabletop-tasks API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                });
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Catalog entry.
#[derive(Serialize, ToSchema)]
pub struct TaskSummary {
    pub name: String,
    pub description: String,
    pub max_steps: u32,
    pub lang_template: String,
    pub completed_desc: String,
}

impl From<&TaskDefinition> for TaskSummary {
    fn from(task: &TaskDefinition) -> Self {
        let spec = &task.spec;
        Self {
            name: spec.name.to_string(),
            description: spec.description.to_string(),
            max_steps: spec.max_steps,
            lang_template: spec.lang_template.to_string(),
            completed_desc: spec.completed_desc.to_string(),
        }
    }
}

/// Request body for the reset endpoints.
#[derive(Deserialize, Debug, Default, ToSchema)]
#[schema(example = json!({ "seed": 42, "footprint_overlap": false }))]
pub struct ResetRequest {
    /// Seed of the reset; falls back to the configured default, then to a random seed.
    #[serde(default)]
    #[schema(nullable = true)]
    pub seed: Option<u64>,
    /// Overrides the configured zone overlap test.
    #[serde(default)]
    #[schema(nullable = true)]
    pub footprint_overlap: Option<bool>,
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn unknown_task(name: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "Unknown task",
        format!("no task named '{}'", name),
    )
}

/// Resolved parameters of one reset.
#[derive(Debug)]
struct ResetPlan {
    task: &'static TaskDefinition,
    seed: u64,
    placement: PlacementConfig,
}

/// A missing body is an empty request.
type ResetPayload = Result<Option<Json<ResetRequest>>, JsonRejection>;

fn plan_reset(state: &ApiState, name: &str, payload: ResetPayload) -> Result<ResetPlan, Response> {
    let request = payload
        .map_err(json_deserialize_error)?
        .map(|Json(request)| request)
        .unwrap_or_default();
    let task = tasks::find(name).ok_or_else(|| unknown_task(name))?;

    let seed = request
        .seed
        .or(state.reset.default_seed())
        .unwrap_or_else(rand::random::<u64>);

    let mut placement = state.placement;
    if let Some(footprint) = request.footprint_overlap {
        placement.overlap_mode = if footprint {
            ZoneOverlapMode::Footprint
        } else {
            ZoneOverlapMode::CenterPoint
        };
    }

    Ok(ResetPlan {
        task,
        seed,
        placement,
    })
}

fn run_reset(plan: ResetPlan) -> Result<TaskEpisode, crate::task::TaskError> {
    let mut table = Tabletop::new(plan.seed);
    reset_task(plan.task, &mut table, plan.placement, plan.seed)
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_list_tasks, handle_reset, handle_reset_stream),
    components(
        schemas(
            TaskSummary,
            ResetRequest,
            TaskEpisode,
            ResetEvent,
            ErrorResponse,
            PlacedObject,
            Zone,
            Goal,
            Metric,
            ZoneTarget,
            MatchMatrix,
            AssetRef,
            TemplateParam,
            Category,
            ObjectId,
            Rgba,
            Pose,
            Quat,
            Vec3
        )
    ),
    tags((name = "tasks", description = "Task catalog and scene previews"))
)]
struct ApiDoc;

fn router(state: ApiState, docs_enabled: bool) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/tasks", get(handle_list_tasks))
        .route("/tasks/{name}/reset", post(handle_reset))
        .route("/tasks/{name}/reset_stream", post(handle_reset_stream));

    if docs_enabled {
        app = app
            .route("/docs/openapi.json", get(serve_openapi_json))
            .route("/docs", get(serve_openapi_ui));
    }

    app.layer(cors).with_state(state)
}

/// Starts the API server and blocks until it terminates.
pub async fn start_api_server(
    config: ApiConfig,
    placement: PlacementConfig,
    reset: ResetSettings,
) -> std::io::Result<()> {
    let state = ApiState { placement, reset };
    let app = router(state, config.docs_enabled());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        host = config.display_host(),
        port = config.port(),
        "server running"
    );
    if config.binds_to_all_interfaces() {
        info!("local access: http://localhost:{}", config.port());
    }
    info!(
        endpoints = "GET /tasks, POST /tasks/{name}/reset, POST /tasks/{name}/reset_stream",
        docs = config.docs_enabled(),
        "routes registered"
    );

    axum::serve(listener, app).await
}

/// Handler for GET /tasks.
#[utoipa::path(
    get,
    path = "/tasks",
    responses((status = 200, description = "Available tasks", body = [TaskSummary])),
    tag = "tasks"
)]
async fn handle_list_tasks() -> impl IntoResponse {
    let summaries: Vec<TaskSummary> = tasks::CATALOG
        .iter()
        .map(|task| TaskSummary::from(*task))
        .collect();
    Json(summaries)
}

/// Handler for POST /tasks/{name}/reset.
///
/// Resets the task on a fresh tabletop and returns the scene and goals.
#[utoipa::path(
    post,
    path = "/tasks/{name}/reset",
    params(("name" = String, Path, description = "Task name, e.g. `pack-groceries`")),
    request_body = ResetRequest,
    responses(
        (status = 200, description = "Scene and goals of the reset", body = TaskEpisode),
        (status = NOT_FOUND, description = "Unknown task", body = ErrorResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request body", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "The reset failed", body = ErrorResponse)
    ),
    tag = "tasks"
)]
async fn handle_reset(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    payload: ResetPayload,
) -> Response {
    let plan = match plan_reset(&state, &name, payload) {
        Ok(plan) => plan,
        Err(response) => return response,
    };
    let seed = plan.seed;
    info!(task = %name, seed, "reset requested");

    match tokio::task::spawn_blocking(move || run_reset(plan)).await {
        Ok(Ok(episode)) => (StatusCode::OK, Json(episode)).into_response(),
        Ok(Err(err)) => {
            warn!(task = %name, seed, code = err.code(), error = %err, "reset failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Task reset failed",
                err.to_string(),
            )
        }
        Err(err) => {
            error!(task = %name, error = %err, "reset worker crashed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Task reset failed",
                err.to_string(),
            )
        }
    }
}

/// Handler for POST /tasks/{name}/reset_stream (SSE).
///
/// Streams reset events as they happen. A failed reset ends the stream
/// with a `Failed` event instead of `Finished`.
#[utoipa::path(
    post,
    path = "/tasks/{name}/reset_stream",
    params(("name" = String, Path, description = "Task name")),
    request_body = ResetRequest,
    responses(
        (
            status = 200,
            description = "Streams reset events in real-time",
            content_type = "text/event-stream",
            body = ResetEvent
        ),
        (status = NOT_FOUND, description = "Unknown task", body = ErrorResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request body", body = ErrorResponse)
    ),
    tag = "tasks"
)]
async fn handle_reset_stream(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    payload: ResetPayload,
) -> Response {
    let plan = match plan_reset(&state, &name, payload) {
        Ok(plan) => plan,
        Err(response) => return response,
    };

    let (tx, rx) = mpsc::channel::<String>(32);

    tokio::task::spawn_blocking(move || {
        stream_reset(plan.task, plan.seed, plan.placement, &tx);
    });

    let stream = ReceiverStream::new(rx)
        .map(|msg| Ok::<_, std::convert::Infallible>(Event::default().data(msg)));
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(std::time::Duration::from_secs(10))
                .text("keep-alive"),
        )
        .into_response()
}

/// Runs one reset on a fresh tabletop and sends every event to `tx` as JSON.
///
/// Must run outside the async runtime; sends block while the channel is full.
fn stream_reset(
    task: &TaskDefinition,
    seed: u64,
    placement: PlacementConfig,
    tx: &mpsc::Sender<String>,
) {
    let mut table = Tabletop::new(seed);
    let result = reset_task_with_progress(task, &mut table, placement, seed, |event| {
        if let Ok(json) = serde_json::to_string(event) {
            // A closed receiver only means the client went away.
            let _ = tx.blocking_send(json);
        }
    });
    if let Err(err) = result {
        warn!(
            task = task.spec.name,
            seed,
            code = err.code(),
            error = %err,
            "streamed reset failed"
        );
        let failure = json!({
            "type": "Failed",
            "code": err.code(),
            "details": err.to_string(),
        });
        let _ = tx.blocking_send(failure.to_string());
    }
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::task::{ResetContext, TaskError, TaskSpec};

    fn state() -> ApiState {
        ApiState {
            placement: PlacementConfig::default(),
            reset: ResetSettings::new(Some(7)),
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[test]
    fn openapi_doc_lists_expected_paths() {
        let doc = openapi_doc();
        let paths = &doc.paths.paths;
        for path in ["/tasks", "/tasks/{name}/reset", "/tasks/{name}/reset_stream"] {
            assert!(
                paths.contains_key(path),
                "OpenAPI documentation is missing the {} path",
                path
            );
        }
    }

    #[test]
    fn openapi_doc_contains_key_schemas() {
        let doc = openapi_doc();
        let components = doc
            .components
            .as_ref()
            .expect("OpenAPI documentation contains no components");
        for name in ["ResetRequest", "TaskEpisode", "ResetEvent", "ErrorResponse"] {
            assert!(
                components.schemas.contains_key(name),
                "Expected schema '{}' is missing from OpenAPI spec",
                name
            );
        }
    }

    #[test]
    fn reset_request_fields_are_optional() {
        let request: ResetRequest = serde_json::from_str("{}").expect("Should parse empty object");
        assert_eq!(request.seed, None);
        assert_eq!(request.footprint_overlap, None);

        let request: ResetRequest =
            serde_json::from_str(r#"{"seed": 12, "footprint_overlap": true}"#).unwrap();
        assert_eq!(request.seed, Some(12));
        assert_eq!(request.footprint_overlap, Some(true));
    }

    #[test]
    fn plan_uses_configured_seed_and_request_overrides() {
        let plan = plan_reset(&state(), "pack-groceries", Ok(None)).expect("known task");
        assert_eq!(plan.seed, 7);
        assert_eq!(plan.placement.overlap_mode, ZoneOverlapMode::CenterPoint);

        let request = ResetRequest {
            seed: Some(99),
            footprint_overlap: Some(true),
        };
        let plan = plan_reset(&state(), "pack-groceries", Ok(Some(Json(request))))
            .expect("known task");
        assert_eq!(plan.seed, 99);
        assert_eq!(plan.placement.overlap_mode, ZoneOverlapMode::Footprint);
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
    }

    fn event_types(messages: impl IntoIterator<Item = String>) -> Vec<String> {
        messages
            .into_iter()
            .map(|msg| {
                let event: serde_json::Value = serde_json::from_str(&msg).expect("event is JSON");
                event["type"].as_str().expect("event has a type").to_string()
            })
            .collect()
    }

    fn oversized_zone(ctx: &mut ResetContext<'_>) -> Result<(), TaskError> {
        ctx.place_zones(&["everything"], Vec3::new(2.0, 2.0, 0.0))?;
        Ok(())
    }

    #[tokio::test]
    async fn bodyless_reset_uses_defaults() {
        let response = handle_reset(
            State(state()),
            Path("pack-groceries".to_string()),
            Ok(None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["seed"], 7);
    }

    #[tokio::test]
    async fn reset_stream_emits_events_in_reset_order() {
        let request = ResetRequest {
            seed: Some(3),
            footprint_overlap: None,
        };
        let response = handle_reset_stream(
            State(state()),
            Path("arrange-items-by-category".to_string()),
            Ok(Some(Json(request))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let text = body_text(response).await;
        let data = text
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|data| data.trim_start().to_string());
        let types = event_types(data);

        assert_eq!(types.first().map(String::as_str), Some("Started"));
        assert_eq!(types.last().map(String::as_str), Some("Finished"));
        assert_eq!(types.iter().filter(|t| *t == "ZonePlaced").count(), 3);
        assert_eq!(types.iter().filter(|t| *t == "GoalAdded").count(), 3);
        let last_zone = types.iter().rposition(|t| t == "ZonePlaced");
        let first_goal = types.iter().position(|t| t == "GoalAdded");
        assert!(last_zone < first_goal, "zones come before goals: {:?}", types);
    }

    #[test]
    fn failed_stream_ends_with_failure_event() {
        let task = TaskDefinition {
            spec: TaskSpec {
                name: "cover-the-table",
                description: "place a zone larger than the table",
                max_steps: 1,
                lang_template: "cover the table",
                completed_desc: "done.",
            },
            reset: oversized_zone,
        };
        let (tx, mut rx) = mpsc::channel(16);
        stream_reset(&task, 5, PlacementConfig::default(), &tx);
        drop(tx);

        let mut messages = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            messages.push(msg);
        }
        let last: serde_json::Value =
            serde_json::from_str(messages.last().expect("stream is not empty")).unwrap();

        assert_eq!(event_types(messages), vec!["Started", "Failed"]);
        assert_eq!(last["code"], "placement_exhausted");
        assert!(last["details"].as_str().is_some_and(|d| d.contains("everything")));
    }

    #[tokio::test]
    async fn list_tasks_returns_whole_catalog() {
        let response = handle_list_tasks().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().map(Vec::len), Some(tasks::CATALOG.len()));
        assert_eq!(body[0]["name"], "align-rope");
    }

    #[tokio::test]
    async fn unknown_task_is_not_found() {
        let response = handle_reset(
            State(state()),
            Path("fold-laundry".to_string()),
            Ok(Some(Json(ResetRequest::default()))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Unknown task");
    }

    #[tokio::test]
    async fn reset_returns_episode() {
        let request = ResetRequest {
            seed: Some(3),
            footprint_overlap: None,
        };
        let response = handle_reset(
            State(state()),
            Path("arrange-items-by-category".to_string()),
            Ok(Some(Json(request))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["task"], "arrange-items-by-category");
        assert_eq!(body["seed"], 3);
        assert_eq!(body["zones"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["goals"].as_array().map(Vec::len), Some(3));
    }
}
