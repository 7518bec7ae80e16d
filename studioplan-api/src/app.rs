/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use studioplan_api::{app::{build_router, AppState}, config::Config};
/// use studioplan_shared::genai::gemini::GeminiClient;
/// use studioplan_shared::store::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let generator = GeminiClient::new(config.gemini.client_config())?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), Arc::new(generator), config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::{auth::require_session, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use studioplan_shared::genai::ConceptGenerator;
use studioplan_shared::store::Store;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub generator: Arc<dyn ConceptGenerator>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        generator: Arc<dyn ConceptGenerator>,
        config: Config,
    ) -> Self {
        Self {
            store,
            generator,
            config: Arc::new(config),
        }
    }
}

/// Builds the router with all routes and middleware
///
/// ```text
/// /
/// ├── GET  /health                              public
/// └── (session required)
///     ├── /notes                                GET POST
///     ├── /notes/:id                            GET PUT DELETE
///     ├── /tasks                                GET POST
///     ├── /tasks/:id                            GET PUT DELETE
///     ├── /video-projects                       GET POST
///     ├── /video-projects/generate-concept      POST
///     ├── /video-projects/:id                   GET PUT DELETE
///     ├── /video-projects/:id/checklist         GET POST PUT
///     ├── /video-projects/:id/checklist/:item   DELETE
///     └── /settings                             GET PUT
/// ```
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new().route("/health", get(routes::health::health_check));

    let planner_routes = Router::new()
        .route(
            "/notes",
            get(routes::notes::list_notes).post(routes::notes::create_note),
        )
        .route(
            "/notes/:id",
            get(routes::notes::get_note)
                .put(routes::notes::update_note)
                .delete(routes::notes::delete_note),
        )
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route(
            "/video-projects",
            get(routes::video_projects::list_projects)
                .post(routes::video_projects::create_project),
        )
        .route(
            "/video-projects/generate-concept",
            post(routes::concept::generate_concept),
        )
        .route(
            "/video-projects/:id",
            get(routes::video_projects::get_project)
                .put(routes::video_projects::update_project)
                .delete(routes::video_projects::delete_project),
        )
        .route(
            "/video-projects/:id/checklist",
            get(routes::checklist::list_items)
                .post(routes::checklist::create_item)
                .put(routes::checklist::update_item),
        )
        .route(
            "/video-projects/:id/checklist/:item_id",
            delete(routes::checklist::delete_item),
        )
        .route(
            "/settings",
            get(routes::settings::get_settings).put(routes::settings::update_settings),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .merge(public_routes)
        .merge(planner_routes)
        .fallback(unknown_route)
        .layer(axum::middleware::map_response(json_method_not_allowed))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

async fn unknown_route() -> ApiError {
    ApiError::not_found("Route")
}

/// Wrong-method responses get the same `{"error"}` body as everything else
async fn json_method_not_allowed(response: Response) -> Response {
    if response.status() == StatusCode::METHOD_NOT_ALLOWED {
        return ApiError::not_found("Route").into_response();
    }
    response
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
