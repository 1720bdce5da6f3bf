// src/main.rs

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use scribe::api::http::build_router;
use scribe::config::CONFIG;
use scribe::llm::GenerationClient;
use scribe::state::AppState;
use scribe::store::{sqlite::create_pool, SessionStore, SqliteSessionStore};
use scribe::workflow::EngineOptions;

#[derive(Parser)]
#[command(name = "scribe", about = "Guided document authoring backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (the default).
    Serve,
    /// Administrative reset: overwrite a session with the default state.
    Reset {
        /// Session code to reset
        code: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level: Level = CONFIG.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Reset { code } => reset(&code).await,
    }
}

async fn serve() -> Result<()> {
    info!("Starting Scribe (model: {})", CONFIG.model);

    let pool = create_pool(&CONFIG.database_url).await?;
    let store = Arc::new(SqliteSessionStore::new(pool).await?);

    let generator = Arc::new(GenerationClient::new(
        &CONFIG.generation_base_url,
        &CONFIG.generation_api_key,
        &CONFIG.model,
        CONFIG.generation_timeout_duration(),
    )?);

    let codes = CONFIG.access_code_list();
    if codes.is_empty() {
        tracing::warn!("SCRIBE_ACCESS_CODES is empty; every turn will be rejected");
    }

    let app_state = Arc::new(AppState::new(
        store,
        generator,
        EngineOptions { target_chapters: CONFIG.target_chapters_override() },
        codes,
    ));

    let app = build_router(app_state, &CONFIG.cors_origin, CONFIG.request_timeout_duration());

    let bind_address = CONFIG.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("listening on http://{}", bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn reset(code: &str) -> Result<()> {
    let pool = create_pool(&CONFIG.database_url).await?;
    let store = SqliteSessionStore::new(pool).await?;
    store.reset(code).await?;
    println!("session {} reset", code);
    Ok(())
}
