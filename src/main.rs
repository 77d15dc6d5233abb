use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;

mod app;
mod auth;
mod cli;
mod config;
mod db;
mod error;
mod extract;
#[cfg(test)]
mod memory;
mod recipe;
mod state;
mod users;

use crate::cli::{Cli, Commands, CreateSuperuserArgs, ServeArgs};
use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Arc::new(AppConfig::from_env()?);

    match cli.command {
        None => serve(config, cli.serve).await,
        Some(Commands::Serve(args)) => serve(config, args).await,
        Some(Commands::WaitForDb) => {
            db::wait_for_db(&config).await;
            Ok(())
        }
        Some(Commands::CreateSuperuser(args)) => create_superuser(config, args).await,
    }
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "recipe=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

async fn serve(config: Arc<AppConfig>, args: ServeArgs) -> anyhow::Result<()> {
    let pool = db::wait_for_db(&config).await;
    db::migrate(&pool).await?;

    let app = app::build_app(AppState::from_pool(pool, config));
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    app::serve(app, addr).await
}

async fn create_superuser(config: Arc<AppConfig>, args: CreateSuperuserArgs) -> anyhow::Result<()> {
    let pool = db::wait_for_db(&config).await;
    db::migrate(&pool).await?;
    let state = AppState::from_pool(pool, config);

    let user =
        users::services::create_superuser(state.users.as_ref(), &args.email, &args.password).await?;
    tracing::info!(user_id = %user.id, email = %user.email, "superuser created");
    Ok(())
}
