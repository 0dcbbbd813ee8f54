use crate::audit::AuditLog;
use crate::contact::{ContactError, ContactService};
use crate::health;
use crate::mailer::MailDispatcher;
use crate::viewer;
use axum::{
    extract::{FromRequest, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Shared state available to all handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    pub audit: Arc<AuditLog>,
    pub contact: ContactService,
}

impl AppState {
    pub fn new(
        audit: Arc<AuditLog>,
        mailer: Arc<dyn MailDispatcher>,
        recipient: Option<String>,
    ) -> Self {
        let contact = ContactService::new(Arc::clone(&audit), mailer, recipient);
        Self { audit, contact }
    }
}

/// JSON body answered by `POST /send-email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReply {
    pub status: String,
    pub message: String,
}

impl SubmissionReply {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            message: "Thank you! Your message has been sent.".to_string(),
        }
    }

    pub fn error(err: &ContactError) -> Self {
        Self {
            status: "error".to_string(),
            message: format!("Error: {}", err),
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        // Validation and delivery failures both answer 500.
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SubmissionReply::error(&self)),
        )
            .into_response()
    }
}

/// The raw submission payload, JSON or form-encoded.
///
/// Never rejects: an unsupported content type or a malformed body yields an
/// empty map, which the contact pipeline then rejects and audits.
pub struct SubmissionFields(pub Map<String, Value>);

impl<S> FromRequest<S> for SubmissionFields
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let fields = if content_type.starts_with("application/json") {
            match Json::<Value>::from_request(req, state).await {
                Ok(Json(Value::Object(map))) => map,
                Ok(Json(other)) => {
                    tracing::debug!("Submission body is JSON but not an object: {}", other);
                    Map::new()
                }
                Err(rejection) => {
                    tracing::debug!("Unreadable JSON submission body: {}", rejection.body_text());
                    Map::new()
                }
            }
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            match Form::<HashMap<String, String>>::from_request(req, state).await {
                Ok(Form(map)) => map
                    .into_iter()
                    .map(|(key, value)| (key, Value::String(value)))
                    .collect(),
                Err(rejection) => {
                    tracing::debug!("Unreadable form submission body: {}", rejection.body_text());
                    Map::new()
                }
            }
        } else {
            tracing::debug!("Unsupported submission content type: {:?}", content_type);
            Map::new()
        };

        Ok(SubmissionFields(fields))
    }
}

/// POST /send-email
async fn send_email(
    State(state): State<AppState>,
    SubmissionFields(fields): SubmissionFields,
) -> Result<Json<SubmissionReply>, ContactError> {
    state.contact.submit(&fields).await?;
    Ok(Json(SubmissionReply::success()))
}

/// GET /view-logs
async fn view_logs(State(state): State<AppState>) -> Response {
    let dir = state.audit.dir().to_path_buf();
    let rendered = tokio::task::spawn_blocking(move || viewer::render_log_dir(&dir)).await;

    match rendered {
        Ok(Ok(html)) => Html(html).into_response(),
        Ok(Err(e)) => {
            tracing::error!("Failed to load logs from {}: {}", state.audit.dir().display(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error loading logs").into_response()
        }
        Err(e) => {
            tracing::error!("Log viewer task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error loading logs").into_response()
        }
    }
}

/// True when any segment of `path` names a hidden file or directory,
/// percent-encoded dots included.
fn is_hidden_path(path: &str) -> bool {
    path.split('/').any(|segment| {
        segment.starts_with('.') || segment.to_ascii_lowercase().starts_with("%2e")
    })
}

/// Dotfiles (`.env`, `.git/`) under the static directory are never served.
async fn hide_dotfiles(req: Request, next: Next) -> Response {
    if is_hidden_path(req.uri().path()) {
        tracing::debug!("Refusing hidden static path {}", req.uri().path());
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(req).await
}

/// Static files from `static_dir`, with hidden paths answering 404.
fn static_files(static_dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(static_dir))
        .layer(middleware::from_fn(hide_dotfiles))
}

/// Build the full application router. Used by `run` and by integration tests.
///
/// Anything not matched by a route is looked up under `static_dir`.
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/send-email", post(send_email))
        .route("/view-logs", get(view_logs))
        .merge(health::routes::<AppState>())
        .fallback_service(static_files(static_dir.as_ref()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
