//! Harmoni server
//!
//! ```text
//! ┌──────────┐    ┌──────────────┐    ┌───────────────┐
//! │  Config  │───▶│   Gateway    │───▶│  users.db     │
//! │  (YAML)  │    │ (axum /api)  │───▶│  sessions.db  │
//! └──────────┘    └──────┬───────┘    └───────────────┘
//!                        │
//!                        ▼
//!                 call provider (create-web-call)
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use harmoni::account::UserRepository;
use harmoni::call_relay::CallTokenRelay;
use harmoni::config::AppConfig;
use harmoni::db::{Database, ensure_parent_dir, schema};
use harmoni::gateway::{self, state::AppState};
use harmoni::logging::init_logging;
use harmoni::session::{CookieSettings, SqliteSessionStore};
use harmoni::user_auth::{PasswordService, UserAuthService};

#[derive(Parser, Debug)]
#[command(name = "harmoni", version, about = "Auth and voice-call relay server")]
struct Cli {
    /// Config environment; loads config/<env>.yaml
    #[arg(short, long, default_value = "dev")]
    env: String,

    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

// ============================================================
// STORAGE
// ============================================================

async fn open_store(url: &str) -> anyhow::Result<Database> {
    ensure_parent_dir(url).with_context(|| format!("creating directory for {}", url))?;
    Database::connect(url)
        .await
        .with_context(|| format!("connecting to {}", url))
}

// ============================================================
// MAIN
// ============================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.env)
        .with_context(|| format!("loading config/{}.yaml", cli.env))?;
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }

    let _log_guard = init_logging(&config);
    tracing::info!(env = %cli.env, "Starting harmoni");

    // 1. Stores
    let users_db = open_store(&config.database.users_url).await?;
    let sessions_db = open_store(&config.database.sessions_url).await?;
    schema::init_users_schema(&users_db)
        .await
        .context("initializing users schema")?;
    schema::init_sessions_schema(&sessions_db)
        .await
        .context("initializing sessions schema")?;

    // 2. Sessions
    let session_cfg = &config.session;
    let sessions = SqliteSessionStore::new(sessions_db.clone());
    let _sweeper = sessions.spawn_sweeper(Duration::from_secs(session_cfg.sweep_interval_secs));
    let session_cookie = CookieSettings::new(
        &session_cfg.secret,
        session_cfg.cookie_path.clone(),
        session_cfg.ttl_secs,
        session_cfg.cookie_secure,
    );

    // 3. Auth service
    let passwords =
        PasswordService::new(&config.auth.argon2).context("invalid argon2 parameters")?;
    let user_auth = UserAuthService::new(
        UserRepository::new(users_db.clone()),
        passwords,
        config.auth.skip_signup_validation,
    );

    // 4. Call relay
    let call_relay =
        CallTokenRelay::new(&config.call_provider).context("building call provider client")?;

    let state = Arc::new(AppState::new(
        user_auth,
        sessions,
        session_cookie,
        call_relay,
        users_db.clone(),
        sessions_db.clone(),
    ));
    let app = gateway::build_router(state, config.gateway.cors_origin.as_deref());

    let result = gateway::run_server(&config.gateway.host, config.gateway.port, app).await;

    users_db.close().await;
    sessions_db.close().await;
    result.context("gateway server error")
}
