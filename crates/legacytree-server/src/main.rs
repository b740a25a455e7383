//! LegacyTree family story enrichment server.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use legacytree_core::LegacyTreeConfig;
use legacytree_server::{build_router, seed, AppState};
use legacytree_store::StoryStore;

fn resolve_data_dir() -> PathBuf {
    std::env::var("LEGACYTREE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

fn print_help() {
    println!("LegacyTree: record, enrich and map family stories");
    println!();
    println!("Usage: legacytree [command]");
    println!();
    println!("Commands:");
    println!("  (none) | serve           Start the server");
    println!("  seed [data-dir]          Insert the demo stories");
    println!("  help                     Show this help message");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("serve") => {}
        Some("seed") => {
            let data_dir = args.get(2).map(PathBuf::from).unwrap_or_else(resolve_data_dir);
            let config = LegacyTreeConfig::new(&data_dir)?;
            let store = StoryStore::open(&config.data_paths.db)
                .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;
            let inserted = seed::seed_demo_stories(&store)
                .map_err(|e| anyhow::anyhow!("Failed to seed stories: {}", e))?;
            println!("Inserted {} demo stories into {}", inserted.len(), store.db_path().display());
            return Ok(());
        }
        Some("--help" | "-h" | "help") => {
            print_help();
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown command: {}. Use 'legacytree help' for usage.", other);
            std::process::exit(1);
        }
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = LegacyTreeConfig::from_env(&data_dir)?;
    let port = config.port;

    let state = AppState::from_config(config)
        .map_err(|e| anyhow::anyhow!("Failed to initialise: {}", e))?;
    let app = build_router(Arc::new(state));

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("LegacyTree server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
