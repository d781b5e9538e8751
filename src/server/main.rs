//! HTTP server for the book-exchange proximity search.
//!
//! Thin adapter over the core engine: validation failures map to 400,
//! everything the engine returns is serialized as-is.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use bookswap::{search_nearby, Coordinate, Directory, Hit, Shelf, User};

mod config;
use config::Config;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Book-exchange proximity search server")]
struct Args {
    /// Listen address (overrides config file)
    #[arg(short, long)]
    listen: Option<String>,

    /// Optional TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON fixtures file with users, books, and categories
    #[arg(long)]
    fixtures: Option<PathBuf>,

    /// Plain-text file of predefined category names, one per line
    #[arg(long)]
    categories_file: Option<PathBuf>,
}

/// Application state shared across handlers
struct AppState {
    directory: Directory,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    let listen = args
        .listen
        .or(config.listen)
        .unwrap_or_else(|| "0.0.0.0:3000".to_string());
    let fixtures = args.fixtures.or(config.fixtures);
    let categories_file = args.categories_file.or(config.categories_file);

    info!("Bookswap Server");

    let directory = Directory::new();
    if let Some(path) = &categories_file {
        directory.import_categories(path)?;
    }
    if let Some(path) = &fixtures {
        directory.load_fixtures(path)?;
    }
    info!(
        "Directory ready: {} users, {} books",
        directory.user_count(),
        directory.book_count()
    );

    let state = Arc::new(AppState { directory });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/nearby", get(nearby_handler))
        .route("/v1/nearby/books", get(nearby_books_handler))
        .route("/v1/categories", get(categories_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        users: state.directory.user_count(),
        books: state.directory.book_count(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    users: usize,
    books: usize,
}

/// Users within radius of a point, closest first
async fn nearby_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearbyQueryParams>,
) -> Result<Json<NearbyResponse>, (StatusCode, String)> {
    let reference = Coordinate::new(params.lat, params.lon)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let mut results = search_nearby(reference, params.radius_km, state.directory.users())
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    truncate(&mut results, params.limit);

    Ok(Json(NearbyResponse { results }))
}

/// Book owners within radius, optionally narrowed to a category
async fn nearby_books_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearbyBooksQueryParams>,
) -> Result<Json<NearbyBooksResponse>, (StatusCode, String)> {
    let reference = Coordinate::new(params.lat, params.lon)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    // An unknown category matches no books; that is an empty result, not
    // an error.
    let candidates = state.directory.shelves_named(params.category.as_deref());
    let mut results = search_nearby(reference, params.radius_km, candidates)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    truncate(&mut results, params.limit);

    Ok(Json(NearbyBooksResponse { results }))
}

/// Category names with optional contains filter
async fn categories_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CategoriesQueryParams>,
) -> Json<CategoriesResponse> {
    let categories = state
        .directory
        .categories(params.filter.as_deref())
        .into_iter()
        .map(|c| c.name)
        .collect();
    Json(CategoriesResponse { categories })
}

/// Limits apply after ranking, so a capped response is always the closest
/// prefix of the full one.
fn truncate<T>(results: &mut Vec<T>, limit: Option<usize>) {
    if let Some(limit) = limit {
        results.truncate(limit);
    }
}

#[derive(Deserialize)]
struct NearbyQueryParams {
    /// Reference latitude
    lat: f64,
    /// Reference longitude
    lon: f64,
    /// Search radius in kilometers
    radius_km: f64,
    /// Maximum number of results
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct NearbyBooksQueryParams {
    /// Reference latitude
    lat: f64,
    /// Reference longitude
    lon: f64,
    /// Search radius in kilometers
    radius_km: f64,
    /// Category name filter
    category: Option<String>,
    /// Maximum number of results
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct CategoriesQueryParams {
    /// Substring filter on category names
    filter: Option<String>,
}

#[derive(Serialize)]
struct NearbyResponse {
    results: Vec<Hit<User>>,
}

#[derive(Serialize)]
struct NearbyBooksResponse {
    results: Vec<Hit<Shelf>>,
}

#[derive(Serialize)]
struct CategoriesResponse {
    categories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn test_truncate_keeps_closest_prefix() {
        let mut results = vec![1, 2, 3, 4, 5];
        truncate(&mut results, Some(2));
        assert_eq!(results, vec![1, 2]);
    }

    #[test]
    fn test_truncate_without_limit_keeps_everything() {
        let mut results = vec![1, 2, 3];
        truncate(&mut results, None);
        assert_eq!(results, vec![1, 2, 3]);
    }

    #[test]
    fn test_truncate_limit_beyond_len_is_a_no_op() {
        let mut results = vec![1, 2, 3];
        truncate(&mut results, Some(10));
        assert_eq!(results, vec![1, 2, 3]);
    }
}
