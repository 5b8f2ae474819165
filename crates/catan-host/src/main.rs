//! Catan autoplay host.

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod playout;
mod store;

use config::HostConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = HostConfig::from_env()?;
    info!(
        games = config.games,
        players = config.players,
        seed = ?config.seed,
        "Starting Catan host..."
    );

    let service = playout::service(&config);
    let outcomes = playout::run(Arc::clone(&service), &config).await?;

    for outcome in &outcomes {
        match &outcome.summary {
            Some(summary) => info!(
                game = %outcome.game,
                moves = outcome.moves,
                winner = %summary.winner_name,
                points = summary.winner_points,
                "finished"
            ),
            None => info!(game = %outcome.game, moves = outcome.moves, "abandoned"),
        }
    }
    if let Ok(path) = std::env::var("CATAN_REPORT") {
        std::fs::write(&path, serde_json::to_string_pretty(&outcomes)?)?;
        info!(path = %path, "report written");
    }

    let store = service.repository();
    info!(
        archived = store.archived_count(),
        active = store.active_games(),
        "all games done"
    );
    Ok(())
}
