// Checkers server entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr)
// 2. Load config (copies defaults/ into config/ on first run)
// 3. Build the game with the configured rule set
// 4. Bind the HTTP listener
// 5. Serve until Ctrl+C

use checkers_core::Game;
use checkers_server::api::{self, AppState};
use checkers_server::config;
use checkers_server::server;

use anyhow::Context;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Checkers server starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    let addr = config.listen_addr()?;
    info!(
        "Config loaded: listen={}, rules={:?}, cors origins={:?}",
        addr, config.rules.variant, config.cors.allowed_origins
    );

    // 3. Build the game
    let game = Game::new(config.rules.variant.build());
    info!("Game initialized with {} rules", game.rules().name());
    let app = api::router(AppState::new(game), &config.cors);

    // 4. Bind the HTTP listener
    let listener = server::bind(addr).await?;

    // 5. Serve until Ctrl+C
    server::run(listener, app).await?;

    info!("Checkers server shut down cleanly");
    Ok(())
}

/// Initialize tracing to stderr with an env-overridable filter.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("checkers_server=info,checkers_core=info,tower_http=info,warn")
        }))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
