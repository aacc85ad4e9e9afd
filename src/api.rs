//! HTTP API server for the web client.
//!
//! JSON endpoints for creating, reading, updating, and listing tasks, a
//! plain-text next-date calculator, and static files for everything else.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use todo_core::config::{shellexpand, ServerConfig};
use todo_core::date::{format_date, parse_date};
use todo_core::error::TodoError;
use todo_core::recurrence::{next_date, RepeatRule};
use todo_core::task::{NewTask, Task};
use todo_core::traits::TaskStore;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

type ApiError = (StatusCode, Json<Value>);

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    store: Arc<dyn TaskStore>,
    default_limit: u32,
    today: fn() -> NaiveDate,
}

impl ApiState {
    pub fn new(store: Arc<dyn TaskStore>, default_limit: u32) -> Self {
        Self {
            store,
            default_limit,
            today: local_today,
        }
    }

    /// Replace the clock used for "today".
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Task body for `POST` and `PUT /api/task`. Every field may be absent or null.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TaskRequest {
    id: Option<Value>,
    date: Option<String>,
    title: Option<String>,
    comment: Option<String>,
    repeat: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NextDateQuery {
    #[serde(default)]
    now: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    repeat: String,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdQuery {
    id: Option<String>,
}

#[derive(Debug, Serialize)]
struct TaskList {
    tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
struct Created {
    id: i64,
}

/// Map a domain error to a JSON error response, logging it on the way out.
fn error_reply(err: TodoError) -> ApiError {
    let status = match &err {
        TodoError::NotFound(_) => StatusCode::NOT_FOUND,
        e if e.is_invalid_input() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("request failed: {err}");
    } else {
        warn!("request rejected: {err}");
    }

    (status, Json(json!({"error": err.to_string()})))
}

fn invalid(message: impl Into<String>) -> ApiError {
    error_reply(TodoError::Validation(message.into()))
}

/// Whether a rule has the strict `<letter> <digits>` shape required on update.
fn has_rule_shape(rule: &str) -> bool {
    let mut chars = rule.chars();
    if !matches!(chars.next(), Some('d' | 'y')) || chars.next() != Some(' ') {
        return false;
    }
    let interval = chars.as_str();
    !interval.is_empty() && interval.bytes().all(|b| b.is_ascii_digit())
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(invalid("task id is required"));
    }
    raw.parse().map_err(|_| invalid(format!("invalid task id: {raw}")))
}

fn parse_body(body: &Bytes) -> Result<TaskRequest, ApiError> {
    serde_json::from_slice(body).map_err(|e| invalid(format!("invalid JSON: {e}")))
}

/// Validate a task request and resolve its stored date.
///
/// A missing date means today. A date before today is moved to the rule's
/// next occurrence, or to today for one-off tasks.
fn prepare_task(
    request: TaskRequest,
    today: NaiveDate,
    strict_repeat: bool,
) -> Result<NewTask, TodoError> {
    let title = request.title.unwrap_or_default();
    if title.trim().is_empty() {
        return Err(TodoError::Validation("title is required".to_string()));
    }

    let mut date = request
        .date
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| format_date(today));
    let parsed = parse_date(&date)?;

    let repeat = request.repeat.unwrap_or_default();
    if !repeat.is_empty() {
        if !repeat.starts_with(['d', 'y']) {
            return Err(TodoError::UnsupportedRepeat(format!(
                "'{repeat}': only daily (d) and yearly (y) repeats are allowed"
            )));
        }
        if strict_repeat && !has_rule_shape(&repeat) {
            return Err(TodoError::InvalidRepeat(format!(
                "'{repeat}': expected '<d|y> <number>'"
            )));
        }
        repeat.parse::<RepeatRule>()?;
    }

    if parsed < today {
        date = match next_date(today, &date, &repeat)? {
            Some(next) => next,
            None => format_date(today),
        };
    }

    Ok(NewTask {
        date,
        title,
        comment: request.comment.unwrap_or_default(),
        repeat,
    })
}

/// `GET /api/nextdate?now=&date=&repeat=`: plain-text next occurrence.
async fn next_date_handler(
    Query(query): Query<NextDateQuery>,
) -> Result<String, (StatusCode, String)> {
    let now = parse_date(&query.now).map_err(|e| {
        warn!("nextdate rejected: {e}");
        (StatusCode::BAD_REQUEST, format!("invalid 'now' date: {e}"))
    })?;

    match next_date(now, &query.date, &query.repeat) {
        Ok(next) => Ok(next.unwrap_or_default()),
        Err(e) => {
            warn!("nextdate rejected: {e}");
            Err((
                StatusCode::BAD_REQUEST,
                format!("error calculating next date: {e}"),
            ))
        }
    }
}

/// `GET /api/tasks?limit=`: upcoming tasks, earliest first.
async fn list_tasks(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<TaskList>, ApiError> {
    let limit = match query.limit.as_deref().map(str::trim) {
        None | Some("") => state.default_limit,
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX),
            _ => return Err(invalid(format!("invalid limit value: {raw}"))),
        },
    };

    let tasks = state.store.list_upcoming(limit).await.map_err(error_reply)?;
    Ok(Json(TaskList { tasks }))
}

/// `POST /api/task`: create a task, respond with its id.
async fn create_task(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<Json<Created>, ApiError> {
    let request = parse_body(&body)?;
    let task = prepare_task(request, (state.today)(), false).map_err(error_reply)?;

    let id = state.store.insert_task(&task).await.map_err(error_reply)?;
    info!("created task {id} for {}", task.date);

    Ok(Json(Created { id }))
}

/// `GET /api/task?id=`: a single task.
async fn get_task(
    State(state): State<ApiState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(query.id.as_deref().unwrap_or_default())?;
    let task = state.store.get_task(id).await.map_err(error_reply)?;
    Ok(Json(task))
}

/// `PUT /api/task`: replace every field of an existing task.
async fn update_task(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let mut request = parse_body(&body)?;

    let id = match request.id.take() {
        None | Some(Value::Null) => return Err(invalid("task id is required")),
        Some(Value::String(raw)) => parse_id(&raw)?,
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| invalid(format!("invalid task id: {n}")))?,
        Some(other) => return Err(invalid(format!("invalid task id: {other}"))),
    };

    let task = prepare_task(request, (state.today)(), true).map_err(error_reply)?;

    if !state.store.task_exists(id).await.map_err(error_reply)? {
        return Err(error_reply(TodoError::NotFound(id)));
    }

    state
        .store
        .update_task(id, &task)
        .await
        .map_err(error_reply)?;
    info!("updated task {id}");

    Ok(Json(json!({})))
}

/// Build the axum router with shared state.
///
/// Anything outside `/api` is served from `web_dir`.
pub fn build_router(state: ApiState, web_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/api/nextdate", get(next_date_handler))
        .route("/api/tasks", get(list_tasks))
        .route("/api/task", get(get_task).post(create_task).put(update_task))
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024)) // 1 MB max request body
        .with_state(state)
        .fallback_service(ServeDir::new(web_dir))
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, state: ApiState) -> anyhow::Result<()> {
    let web_dir = shellexpand(&config.web_dir);
    if !Path::new(&web_dir).is_dir() {
        warn!("web directory {web_dir} does not exist; static files will 404");
    }

    let app = build_router(state, &web_dir);
    let addr = format!("{}:{}", config.host, config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;

    info!("Serving {web_dir} and API on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
