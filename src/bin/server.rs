//! Skilldex API server - directory endpoints, related-skills route, and cache
//! observability.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::json;
use skilldex::cache::{related_key, RelatedCache, SharedCache};
use skilldex::config::Config;
use skilldex::database::{init_pool, migrations, PostgresPool, Skill, SkillStatus, SkillStore};
use skilldex::related::{clamp_limit, RelatedSkillsEngine, DEFAULT_LIMIT};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

const STATS_TTL: Duration = Duration::from_secs(300);
const TOPICS_TTL: Duration = Duration::from_secs(600);
const HEALTH_TTL: Duration = Duration::from_secs(10);

// ---- CLI ----

#[derive(Parser)]
#[command(name = "skilldex-server", about = "Skilldex API server")]
struct Args {
    /// Bind address (overrides SERVER_BIND)
    #[arg(long)]
    bind: Option<String>,

    /// Port (overrides SERVER_PORT)
    #[arg(long, short)]
    port: Option<u16>,
}

// ---- App State ----

#[derive(Clone)]
struct AppState {
    pool: PostgresPool,
    skill_store: SkillStore,
    engine: Arc<RelatedSkillsEngine>,
    related_cache: Arc<RelatedCache>,
    shared_cache: Arc<SharedCache>,
}

// ---- Error Handling ----

struct AppError(skilldex::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            skilldex::Error::NotFound(_) => StatusCode::NOT_FOUND,
            skilldex::Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl From<skilldex::Error> for AppError {
    fn from(err: skilldex::Error) -> Self {
        AppError(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError(skilldex::Error::Database(err))
    }
}

// ---- Related-Skills Endpoint ----

#[derive(Deserialize)]
struct RelatedQuery {
    #[serde(rename = "skillId")]
    skill_id: Option<String>,
    limit: Option<f64>,
}

#[derive(Serialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum CacheStatus {
    Hit,
    Miss,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RelatedResponseMeta {
    source_id: String,
    candidates_scored: usize,
    topics_used: usize,
    cache_key: String,
    cache_status: CacheStatus,
}

#[derive(Serialize)]
struct RelatedResponse {
    related: Vec<Skill>,
    meta: RelatedResponseMeta,
}

/// The related handler carries its own response mapping instead of `AppError`:
/// the route's error bodies are fixed strings and upstream detail must never
/// reach the client.
async fn related_skills(
    State(state): State<AppState>,
    Query(params): Query<RelatedQuery>,
) -> Response {
    let Some(skill_id) = params.skill_id.filter(|s| !s.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "skillId is required" })),
        )
            .into_response();
    };

    let limit = clamp_limit(params.limit.unwrap_or(DEFAULT_LIMIT as f64));
    let key = related_key(&skill_id, limit);

    let (result, cache_status) = match state.related_cache.get(&key) {
        Some(result) => (result, CacheStatus::Hit),
        None => match state.engine.compute(&skill_id, limit).await {
            Ok(Some(result)) => {
                let result = Arc::new(result);
                state.related_cache.insert(key.clone(), result.clone());
                (result, CacheStatus::Miss)
            }
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": "Skill not found" })),
                )
                    .into_response();
            }
            Err(err) => {
                error!("related skills computation failed for {skill_id}: {err}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to fetch related skills" })),
                )
                    .into_response();
            }
        },
    };

    let body = RelatedResponse {
        related: result.related.clone(),
        meta: RelatedResponseMeta {
            source_id: result.meta.source_id.clone(),
            candidates_scored: result.meta.candidates_scored,
            topics_used: result.meta.topics_used,
            cache_key: key,
            cache_status,
        },
    };

    (
        [(
            header::CACHE_CONTROL,
            "public, max-age=60, stale-while-revalidate=300",
        )],
        Json(body),
    )
        .into_response()
}

// ---- Directory Endpoints ----

#[derive(Deserialize)]
struct SkillsQuery {
    status: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

async fn list_skills(
    State(state): State<AppState>,
    Query(params): Query<SkillsQuery>,
) -> Result<Json<Vec<Skill>>, AppError> {
    let limit = params.limit.unwrap_or(50).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);
    let status = match params.status.as_deref() {
        None => Some(SkillStatus::Approved),
        Some("all") => None,
        Some(s) => match s {
            "pending" => Some(SkillStatus::Pending),
            "approved" => Some(SkillStatus::Approved),
            "rejected" => Some(SkillStatus::Rejected),
            _ => Some(SkillStatus::Approved),
        },
    };

    let skills = state.skill_store.list(status, limit, offset).await?;
    Ok(Json(skills))
}

async fn get_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Skill>, AppError> {
    let skill = state
        .skill_store
        .get(&id)
        .await?
        .ok_or_else(|| skilldex::Error::NotFound(format!("skill {id}")))?;
    Ok(Json(skill))
}

async fn directory_stats(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = state.skill_store.clone();
    let stats = state
        .shared_cache
        .with_cache("stats", STATS_TTL, || async move {
            let counts = store.count_by_status().await?;
            let total: i64 = counts.values().sum();
            Ok(json!({ "total": total, "byStatus": counts }))
        })
        .await?;
    Ok(Json(stats))
}

async fn popular_topics(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = state.skill_store.clone();
    let topics = state
        .shared_cache
        .with_cache("topics", TOPICS_TTL, || async move {
            let topics = store.topic_counts(30).await?;
            Ok(serde_json::to_value(topics)?)
        })
        .await?;
    Ok(Json(topics))
}

async fn healthz(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let pool = state.pool.clone();
    let health = state
        .shared_cache
        .with_cache("healthz", HEALTH_TTL, || async move {
            sqlx::query("SELECT 1").execute(&pool).await?;
            Ok(json!({ "status": "ok", "version": skilldex::VERSION }))
        })
        .await?;
    Ok(Json(health))
}

// ---- Cache Observability ----

async fn cache_stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    let shared = state.shared_cache.stats();
    Json(json!({
        "shared": {
            "entries": state.shared_cache.len(),
            "hits": shared.hits,
            "misses": shared.misses,
            "evictions": shared.evictions,
            "oldestEntryAgeSecs": state
                .shared_cache
                .oldest_entry_age()
                .map(|age| age.as_secs()),
        },
        "related": {
            "entries": state.related_cache.len(),
            "maxEntries": state.related_cache.max_entries(),
        },
    }))
}

#[derive(Deserialize)]
struct InvalidateQuery {
    pattern: String,
}

async fn invalidate_cache(
    State(state): State<AppState>,
    Query(params): Query<InvalidateQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let pattern = regex::Regex::new(&params.pattern)
        .map_err(|e| skilldex::Error::InvalidInput(format!("bad pattern: {e}")))?;
    let removed = state.shared_cache.invalidate_matching(&pattern);
    info!("cache invalidation removed {removed} entries");
    Ok(Json(json!({ "removed": removed })))
}

// ---- Router ----

fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/skills", get(list_skills))
        .route("/skills/related", get(related_skills))
        .route("/skills/{id}", get(get_skill))
        .route("/stats", get(directory_stats))
        .route("/topics", get(popular_topics))
        .route("/healthz", get(healthz))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/invalidate", post(invalidate_cache));

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
}

// ---- Main ----

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let args = Args::parse();

    // Load config
    let config = Config::from_env()?;
    config.validate()?;

    // Initialize database pool
    let pool = init_pool(&config.database).await?;
    info!("Database connected");

    // Run migrations
    migrations::run(&pool).await?;
    info!("Migrations complete");

    // Build stores, engine, and caches
    let skill_store = SkillStore::new(pool.clone());
    let engine = Arc::new(RelatedSkillsEngine::new(Arc::new(skill_store.clone())));
    let state = AppState {
        pool: pool.clone(),
        skill_store,
        engine,
        related_cache: Arc::new(RelatedCache::new(
            config.cache.related_ttl,
            config.cache.related_max_entries,
        )),
        shared_cache: Arc::new(SharedCache::new(config.cache.shared_max_entries)),
    };

    // Build router
    let app = build_router(state);

    // Bind and serve
    let bind = args.bind.unwrap_or(config.server.bind);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    info!("Skilldex API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
