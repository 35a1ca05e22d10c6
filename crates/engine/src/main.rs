//! Talewright Engine - Main entry point.
//!
//! Hosts the session engine over the in-memory store and runs the
//! stale-session sweep until Ctrl-C.

use std::sync::Arc;

use talewright_engine::infrastructure::memory_store::InMemorySessionRepo;
use talewright_engine::{App, EngineConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may be started from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talewright_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Talewright Engine");

    let config = EngineConfig::from_env();
    tracing::info!(
        total_player_skills = config.rules.total_player_skills,
        gm_skill_cap = config.rules.gm_skill_cap,
        stale_after_hours = config.stale_session_after.num_hours(),
        sweep_interval_secs = config.sweep_interval.as_secs(),
        "Configuration loaded"
    );

    let repo = Arc::new(InMemorySessionRepo::new());
    let app = Arc::new(App::new(repo, &config));

    // Spawn stale-session sweeper
    let sweep_app = app.clone();
    let sweep_interval = config.sweep_interval;
    let sweeper = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            let now = chrono::Utc::now();
            if let Err(e) = sweep_app
                .use_cases
                .maintenance
                .sweep_stale_sessions
                .execute(now)
                .await
            {
                tracing::warn!(error = %e, "Stale-session sweep failed");
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!(
        active_mailboxes = app.mailboxes.active(),
        "Shutdown requested"
    );
    sweeper.abort();

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
