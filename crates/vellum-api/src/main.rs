//! vellum-api - HTTP API server for vellum

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use vellum_core::{FolderService, LockService, NoteService, SharingService};
use vellum_db::Database;

use handlers::{
    collaborators::{add_collaborator, list_collaborators, my_collaborations, remove_collaborator},
    folders::{
        create_folder, delete_folder, get_folder, list_folder_notes, list_folders, update_folder,
    },
    notes::{
        create_note, delete_note, get_note, list_notes, lock_note, unlock_note, update_note,
        view_note,
    },
};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub notes: Arc<NoteService>,
    pub sharing: Arc<SharingService>,
    pub lock: Arc<LockService>,
    pub folders: Arc<FolderService>,
}

impl AppState {
    fn from_database(db: &Database) -> Self {
        let note_store: Arc<dyn vellum_core::NoteStore> = db.notes.clone();
        let collab_store: Arc<dyn vellum_core::CollaboratorStore> = db.collaborators.clone();
        let folder_store: Arc<dyn vellum_core::FolderStore> = db.folders.clone();
        let users: Arc<dyn vellum_core::IdentityDirectory> = db.users.clone();

        Self {
            notes: Arc::new(NoteService::new(
                note_store.clone(),
                collab_store.clone(),
                folder_store.clone(),
            )),
            sharing: Arc::new(SharingService::new(
                note_store.clone(),
                collab_store.clone(),
                users,
            )),
            lock: Arc::new(LockService::new(note_store, collab_store)),
            folders: Arc::new(FolderService::new(folder_store)),
        }
    }
}

// =============================================================================
// ACTOR IDENTITY
// =============================================================================

/// The authenticated user on whose behalf a request runs.
///
/// Credential verification happens upstream (reverse proxy / gateway); this
/// server trusts the `x-user-id` header it receives. Requests without a
/// parseable id are rejected with 401.
pub struct Actor(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing x-user-id header".to_string()))?;

        let id = Uuid::parse_str(raw)
            .map_err(|_| ApiError::Unauthorized("invalid x-user-id header".to_string()))?;
        Ok(Actor(id))
    }
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    Core(vellum_core::Error),
    Unauthorized(String),
    BadRequest(String),
}

impl From<vellum_core::Error> for ApiError {
    fn from(err: vellum_core::Error) -> Self {
        ApiError::Core(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use vellum_core::Error;

        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Core(err) => match &err {
                Error::NoteLocked => (StatusCode::LOCKED, err.to_string()),
                Error::InvalidPin => (StatusCode::UNAUTHORIZED, err.to_string()),
                Error::NotAuthorized | Error::OwnerOnly => (StatusCode::FORBIDDEN, err.to_string()),
                Error::NotFound(_)
                | Error::NoteNotFound(_)
                | Error::FolderNotFound(_)
                | Error::UnknownUser(_) => (StatusCode::NOT_FOUND, err.to_string()),
                Error::AlreadyCollaborator | Error::AlreadyLocked => {
                    (StatusCode::CONFLICT, err.to_string())
                }
                Error::CollaboratorLimitExceeded(_)
                | Error::SelfGrantNotAllowed
                | Error::PinTooShort(_)
                | Error::NotLocked
                | Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                Error::Database(_) | Error::Hash(_) | Error::Internal(_) => {
                    error!(error = %err, "Internal error while handling request");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

// =============================================================================
// CORS
// =============================================================================

/// Parse CORS_ALLOWED_ORIGINS (comma-separated) into header values.
/// Defaults to common localhost dev origins.
fn parse_allowed_origins() -> Vec<HeaderValue> {
    let raw = std::env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    raw.split(',')
        .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
        .collect()
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   RUST_LOG    - standard env filter (default: "vellum_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vellum_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Get configuration from environment
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/vellum".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    let state = AppState::from_database(&db);

    let app = Router::new()
        // Health check
        .route("/health", get(health))
        // Notes
        .route("/api/v1/notes", get(list_notes).post(create_note))
        .route(
            "/api/v1/notes/:id",
            get(get_note).patch(update_note).delete(delete_note),
        )
        // Lock lifecycle
        .route("/api/v1/notes/:id/lock", post(lock_note))
        .route("/api/v1/notes/:id/unlock", post(unlock_note))
        .route("/api/v1/notes/:id/view", post(view_note))
        // Collaborators
        .route(
            "/api/v1/notes/:id/collaborators",
            get(list_collaborators).post(add_collaborator),
        )
        .route(
            "/api/v1/notes/:id/collaborators/:user_id",
            delete(remove_collaborator),
        )
        .route("/api/v1/collaborations", get(my_collaborations))
        // Folders
        .route("/api/v1/folders", get(list_folders).post(create_folder))
        .route(
            "/api/v1/folders/:id",
            get(get_folder).patch(update_folder).delete(delete_folder),
        )
        .route("/api/v1/folders/:id/notes", get(list_folder_notes))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer({
            let allowed_origins = parse_allowed_origins();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600))
        })
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
