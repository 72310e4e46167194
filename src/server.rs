use crate::constants::{
    COMPANY_DESCRIPTION_CUTOFF, DASHBOARD_TOP_N, DEFAULT_SEARCH_LIMIT, LISTING_LIMIT,
    SEARCH_DESCRIPTION_CUTOFF,
};
use crate::db::JobStore;
use crate::error::JobsDbError;
use crate::queries::truncate_for_display;
use axum::{
    extract::{Path, Query},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use hyper::Server;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared handler context. Handlers open a scoped connection per request;
/// all routes are read-only.
#[derive(Clone)]
struct ApiContext {
    db_path: PathBuf,
}

/// A storage failure never crashes the server; it becomes an error payload.
fn storage_error(e: JobsDbError) -> Response {
    error!("Storage access failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
        .into_response()
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "jobsdb",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
    limit: Option<usize>,
}

async fn api_search(
    Extension(ctx): Extension<ApiContext>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = params.q.as_deref().unwrap_or("").trim().to_string();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No search query provided" })),
        )
            .into_response();
    }
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

    match JobStore::open(&ctx.db_path).and_then(|store| store.search(&query, limit)) {
        Ok(hits) => {
            let results: Vec<serde_json::Value> = hits
                .iter()
                .map(|hit| {
                    json!({
                        "title": hit.title,
                        "company": hit.company.as_deref().unwrap_or("Unknown Company"),
                        "location": hit.location.as_deref().unwrap_or("Unknown Location"),
                        "description": hit
                            .description
                            .as_deref()
                            .map(|d| truncate_for_display(d, SEARCH_DESCRIPTION_CUTOFF))
                            .unwrap_or_else(|| "No description available".to_string()),
                        "url": hit.url,
                    })
                })
                .collect();
            Json(json!({ "count": results.len(), "results": results })).into_response()
        }
        Err(e) => storage_error(e),
    }
}

async fn api_company(
    Extension(ctx): Extension<ApiContext>,
    Path(company_name): Path<String>,
) -> Response {
    match JobStore::open(&ctx.db_path).and_then(|store| store.company_jobs(&company_name)) {
        Ok(jobs) => {
            let jobs: Vec<serde_json::Value> = jobs
                .iter()
                .map(|job| {
                    json!({
                        "title": job.title,
                        "location": job.location.as_deref().unwrap_or("Unknown Location"),
                        "description": job
                            .description
                            .as_deref()
                            .map(|d| truncate_for_display(d, COMPANY_DESCRIPTION_CUTOFF))
                            .unwrap_or_else(|| "No description".to_string()),
                        "url": job.url,
                        "created_at": job.created_at,
                    })
                })
                .collect();
            Json(json!({ "jobs": jobs })).into_response()
        }
        Err(e) => storage_error(e),
    }
}

/// Aggregate feed for the dashboard: totals plus the top-5 groupings.
async fn api_overview(Extension(ctx): Extension<ApiContext>) -> Response {
    let result = JobStore::open(&ctx.db_path).and_then(|store| {
        let overview = store.overview()?;
        let top_companies = store.top_companies(DASHBOARD_TOP_N)?;
        let top_locations = store.top_locations(DASHBOARD_TOP_N)?;
        Ok((overview, top_companies, top_locations))
    });
    match result {
        Ok((overview, top_companies, top_locations)) => Json(json!({
            "total_jobs": overview.total_jobs,
            "total_companies": overview.total_companies,
            "total_locations": overview.total_locations,
            "top_companies": top_companies,
            "top_locations": top_locations,
        }))
        .into_response(),
        Err(e) => storage_error(e),
    }
}

async fn api_companies(Extension(ctx): Extension<ApiContext>) -> Response {
    match JobStore::open(&ctx.db_path).and_then(|store| store.company_summaries(LISTING_LIMIT)) {
        Ok(companies) => Json(json!({ "companies": companies })).into_response(),
        Err(e) => storage_error(e),
    }
}

async fn api_locations(Extension(ctx): Extension<ApiContext>) -> Response {
    match JobStore::open(&ctx.db_path).and_then(|store| store.location_summaries(LISTING_LIMIT)) {
        Ok(locations) => Json(json!({ "locations": locations })).into_response(),
        Err(e) => storage_error(e),
    }
}

async fn api_states(Extension(ctx): Extension<ApiContext>) -> Response {
    match JobStore::open(&ctx.db_path).and_then(|store| store.state_distribution()) {
        Ok(states) => Json(json!({ "states": states })).into_response(),
        Err(e) => storage_error(e),
    }
}

/// Create the HTTP server with all routes.
pub fn create_server(db_path: PathBuf) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/search", get(api_search))
        .route("/api/company/:name", get(api_company))
        .route("/api/overview", get(api_overview))
        .route("/api/companies", get(api_companies))
        .route("/api/locations", get(api_locations))
        .route("/api/states", get(api_states))
        .layer(Extension(ApiContext { db_path }))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(
    db_path: PathBuf,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(db_path);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("🚀 HTTP server running on http://localhost:{port}");
    println!("💚 Health check: http://localhost:{port}/health");
    println!("🔎 Search API:   http://localhost:{port}/api/search?q=engineer");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
