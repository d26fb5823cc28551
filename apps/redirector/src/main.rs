//! redirector — HTTP server for the link-stepping redirector.
//!
//! Issues short codes for submitted URLs and walks visitors through one or
//! more interstitial waiting pages before redirecting them to the target:
//!
//! `/go/<code>` → `/s/<code>/1` … `/s/<code>/<N>` → `/final/<code>` → target
//!
//! Storage is SQLite (default, `sqlite` feature) or in-memory.
//!
//! Run:
//! ```bash
//! # pretty logs (default); PORT optional
//! cargo run -p redirector
//!
//! # two interstitial pages, 5 seconds each, throwaway storage
//! INTERSTITIAL_STEPS=2 WAIT_SECONDS=5 STORAGE_PROVIDER=memory cargo run -p redirector
//! ```
//!
//! Configuration: See `config.rs` for all environment variables.

mod config;
mod error;
mod pages;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use domain::adapters::memory_repo::InMemoryRepo;
use domain::code::RandomCodeGenerator;
use domain::sequence::{Stage, StepOutcome};
use domain::service::LinkService;
use domain::validate::parse_code;
use domain::{Code, CoreError, Link, LinkRepository, SystemClock};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::AppError;

// Local repo abstraction supporting memory or sqlite (feature-gated).
enum RepoKind {
    Memory(InMemoryRepo),
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite_adapter::SqliteRepo),
}

#[derive(Clone)]
struct AnyRepo {
    kind: Arc<RepoKind>,
}

impl AnyRepo {
    fn memory() -> Self {
        Self {
            kind: Arc::new(RepoKind::Memory(InMemoryRepo::new())),
        }
    }

    #[cfg(feature = "sqlite")]
    fn sqlite(path: &std::path::Path) -> Result<Self, CoreError> {
        let repo = sqlite_adapter::SqliteRepo::open_creating_dirs(path)?;
        info!(links = repo.count()?, "sqlite storage opened");
        Ok(Self {
            kind: Arc::new(RepoKind::Sqlite(repo)),
        })
    }
}

impl LinkRepository for AnyRepo {
    fn get(&self, code: &Code) -> Result<Option<Link>, CoreError> {
        match &*self.kind {
            RepoKind::Memory(r) => r.get(code),
            #[cfg(feature = "sqlite")]
            RepoKind::Sqlite(r) => r.get(code),
        }
    }

    fn insert(&self, link: Link) -> Result<(), CoreError> {
        match &*self.kind {
            RepoKind::Memory(r) => r.insert(link),
            #[cfg(feature = "sqlite")]
            RepoKind::Sqlite(r) => r.insert(link),
        }
    }

    fn increment_clicks(&self, code: &Code) -> Result<(), CoreError> {
        match &*self.kind {
            RepoKind::Memory(r) => r.increment_clicks(code),
            #[cfg(feature = "sqlite")]
            RepoKind::Sqlite(r) => r.increment_clicks(code),
        }
    }
}

type Service = LinkService<AnyRepo, RandomCodeGenerator, SystemClock>;

#[derive(Clone)]
struct AppState {
    svc: Arc<Service>,
    public_origin: Option<String>,
}

#[tokio::main]
async fn main() {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    // Load and validate config first (fail fast on misconfiguration)
    let cfg = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&cfg);
    cfg.warn_if_unusual();

    let repo = match build_repo(&cfg) {
        Ok(r) => r,
        Err(e) => {
            error!(err = %e, "storage init failed");
            std::process::exit(1);
        }
    };
    let state = AppState {
        svc: Arc::new(LinkService::new(
            repo,
            RandomCodeGenerator::new(cfg.code_len),
            SystemClock,
            cfg.policy,
        )),
        public_origin: cfg.public_origin.clone(),
    };

    // Request ID header name
    let x_request_id = axum::http::HeaderName::from_static("x-request-id");

    let mut app = router(state)
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid));

    // CORS - already validated in Config::from_env()
    let cors = if cfg.cors_allow_origin == HeaderValue::from_static("*") {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list([cfg.cors_allow_origin.clone()]))
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([header::CONTENT_TYPE])
    };
    app = app.layer(cors);

    let addr = SocketAddr::new(cfg.host, cfg.port);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(%addr, err = %e, "bind failed");
            std::process::exit(1);
        }
    };
    info!(
        %addr,
        steps = cfg.policy.steps,
        wait_seconds = cfg.policy.wait_seconds,
        "redirector listening"
    );
    if let Err(e) = axum::serve(listener, app).await {
        error!(err = %e, "server error");
        std::process::exit(1);
    }
}

fn init_tracing(cfg: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
    }
}

// Construct a repository instance based on config and feature flags.
fn build_repo(cfg: &config::Config) -> Result<AnyRepo, CoreError> {
    match cfg.storage_provider {
        #[cfg(feature = "sqlite")]
        config::StorageProvider::Sqlite => AnyRepo::sqlite(&cfg.db_path),
        #[cfg(not(feature = "sqlite"))]
        config::StorageProvider::Sqlite => {
            warn!("built without the `sqlite` feature; falling back to memory storage");
            Ok(AnyRepo::memory())
        }
        config::StorageProvider::Memory => Ok(AnyRepo::memory()),
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/create", post(create_link))
        .route("/go/:code", get(go))
        .route("/s/:code/:step", get(interstitial))
        .route("/final/:code", get(final_redirect))
        .route("/privacy", get(privacy))
        .route("/api/info/:code", get(api_info))
        .route("/healthz", get(healthz))
        .fallback(not_found)
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateForm {
    #[serde(default)]
    target: String,
}

#[derive(Serialize)]
struct InfoOut {
    code: String,
    target: String,
    created_at: String,
    clicks: u64,
}

fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

fn code_from_path(raw: &str) -> Result<Code, AppError> {
    parse_code(raw).map_err(|_| {
        warn!(code = %raw, "malformed code in path");
        AppError::NotFound
    })
}

fn not_found_logged(code: &Code, e: CoreError) -> AppError {
    if matches!(e, CoreError::NotFound) {
        warn!(code = %code, "unknown code");
    }
    AppError::from(e)
}

async fn home(State(state): State<AppState>) -> Html<String> {
    Html(pages::home(state.svc.policy().wait_seconds, None))
}

async fn create_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<CreateForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "unreadable create form");
            return invalid_target_page(&state);
        }
    };
    match state.svc.create(&form.target) {
        Ok(link) => {
            let origin = state.public_origin.clone().unwrap_or_else(|| {
                http_common::origin_from_host(
                    headers.get(header::HOST).and_then(|v| v.to_str().ok()),
                    headers.get("x-forwarded-proto").and_then(|v| v.to_str().ok()),
                )
            });
            let short_url = http_common::build_short_url(&origin, link.code.as_str());
            info!(code = %link.code, target = %link.target, "create ok");
            Html(pages::created(&short_url)).into_response()
        }
        Err(CoreError::InvalidUrl(msg)) => {
            warn!(reason = %msg, "rejected target url");
            invalid_target_page(&state)
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

fn invalid_target_page(state: &AppState) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Html(pages::home(
            state.svc.policy().wait_seconds,
            Some("Enter a valid http:// or https:// URL."),
        )),
    )
        .into_response()
}

/// Steps are written as plain decimal numbers starting at 1, so each step has
/// exactly one URL.
fn parse_step(raw: &str) -> Option<u32> {
    if raw.is_empty() || raw.starts_with('0') || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

async fn go(State(state): State<AppState>, Path(code): Path<String>) -> Result<Response, AppError> {
    let code = code_from_path(&code)?;
    let stage = state.svc.enter(&code).map_err(|e| not_found_logged(&code, e))?;
    Ok(found(stage.path(&code)))
}

async fn interstitial(
    State(state): State<AppState>,
    Path((code, step)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let code = code_from_path(&code)?;
    let step = match parse_step(&step) {
        Some(n) => n,
        None => {
            warn!(code = %code, step = %step, "invalid step in path");
            return Err(AppError::NotFound);
        }
    };
    let outcome = state
        .svc
        .interstitial(&code, step)
        .map_err(|e| not_found_logged(&code, e))?;
    match outcome {
        StepOutcome::SkipToFinal => Ok(found(Stage::Final.path(&code))),
        StepOutcome::Wait {
            step,
            next,
            wait_seconds,
        } => Ok(Html(pages::interstitial(
            step,
            state.svc.policy().steps,
            wait_seconds,
            &next.path(&code),
        ))
        .into_response()),
    }
}

async fn final_redirect(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, AppError> {
    let code = code_from_path(&code)?;
    let link = state
        .svc
        .complete(&code)
        .map_err(|e| not_found_logged(&code, e))?;
    info!(code = %code, redirect_to = %link.target, clicks = link.clicks, "final redirect");
    Ok(Html(pages::final_redirect(&link.target, state.svc.policy().final_delay_ms)).into_response())
}

async fn privacy() -> Html<String> {
    Html(pages::privacy())
}

async fn api_info(State(state): State<AppState>, Path(code): Path<String>) -> Response {
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(http_common::json_err("not_found")),
        )
            .into_response()
    };
    let Ok(code) = parse_code(&code) else {
        return not_found();
    };
    match state.svc.resolve(&code) {
        Ok(link) => Json(InfoOut {
            code: link.code.as_str().to_string(),
            target: link.target,
            created_at: http_common::system_time_to_rfc3339(link.created_at),
            clicks: link.clicks,
        })
        .into_response(),
        Err(CoreError::NotFound) => not_found(),
        Err(e) => {
            error!(code = %code, err = ?e, "info lookup error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(http_common::json_err("internal")),
            )
                .into_response()
        }
    }
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn not_found() -> AppError {
    AppError::NotFound
}
