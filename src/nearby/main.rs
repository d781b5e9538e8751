//! Offline proximity search over a fixtures file.
//!
//! Runs the same search the server exposes, without the HTTP layer, and
//! prints the ranked results as JSON to stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use bookswap::{search_nearby, Coordinate, Directory, Hit, Shelf, User};

#[derive(Parser, Debug)]
#[command(name = "nearby")]
#[command(about = "One-shot proximity search over a fixtures file")]
struct Args {
    /// JSON fixtures file with users, books, and categories
    #[arg(short, long)]
    fixtures: PathBuf,

    /// Reference latitude in degrees
    #[arg(long)]
    lat: f64,

    /// Reference longitude in degrees
    #[arg(long)]
    lon: f64,

    /// Search radius in kilometers
    #[arg(long)]
    radius_km: f64,

    /// Search book owners instead of all users
    #[arg(long)]
    books: bool,

    /// Narrow book owners to a category (implies --books)
    #[arg(long)]
    category: Option<String>,

    /// Maximum number of results
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Ranked {
    Users(Vec<Hit<User>>),
    Shelves(Vec<Hit<Shelf>>),
}

fn main() -> Result<()> {
    // Initialize logging to stderr; stdout carries only the result JSON.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let directory = Directory::new();
    directory.load_fixtures(&args.fixtures)?;

    let reference = Coordinate::new(args.lat, args.lon)
        .context("Invalid reference coordinate")?;

    let ranked = if args.books || args.category.is_some() {
        // Same policy as the server: an unknown category matches no books
        // and produces an empty result, not an error.
        let candidates = directory.shelves_named(args.category.as_deref());
        let mut hits = search_nearby(reference, args.radius_km, candidates)?;
        truncate(&mut hits, args.limit);
        info!("{} book owners within {} km", hits.len(), args.radius_km);
        Ranked::Shelves(hits)
    } else {
        let mut hits = search_nearby(reference, args.radius_km, directory.users())?;
        truncate(&mut hits, args.limit);
        info!("{} users within {} km", hits.len(), args.radius_km);
        Ranked::Users(hits)
    };

    println!("{}", serde_json::to_string_pretty(&ranked)?);
    Ok(())
}

fn truncate<T>(hits: &mut Vec<T>, limit: Option<usize>) {
    if let Some(limit) = limit {
        hits.truncate(limit);
    }
}
