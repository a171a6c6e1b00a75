mod config;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use bulletin_api::auth::{self, AppState, AppStateInner};
use bulletin_db::{Database, migrations};
use bulletin_types::models::Role;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "bulletin", about = "Company updates service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Revert schema migrations down to VERSION
    Rollback { version: i64 },
    /// Create a company and print its id
    CreateCompany { name: String },
    /// Create a user and add them to a company
    AddMember {
        company_id: Uuid,
        username: String,
        password: String,
        #[arg(long, default_value = "worker", value_parser = parse_role)]
        role: Role,
    },
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.parse().map_err(|e: bulletin_types::models::UnknownRole| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "bulletin=debug,bulletin_api=debug,bulletin_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Rollback { version } => {
            let db = Database::open(&config.db_path)?;
            db.with_conn(|conn| migrations::revert_to(conn, version))?;
            info!("Schema reverted to v{}", version);
            Ok(())
        }
        Command::CreateCompany { name } => {
            let db = Database::open(&config.db_path)?;
            let id = Uuid::new_v4();
            db.create_company(&id.to_string(), &name)?;
            info!("Created company {} ({})", name, id);
            println!("{}", id);
            Ok(())
        }
        Command::AddMember { company_id, username, password, role } => {
            let db = Database::open(&config.db_path)?;
            let user_id = auth::register_member(&db, company_id, &username, &password, role)?;
            println!("{}", user_id);
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let jwt_secret = config.jwt_secret()?.to_string();
    let addr = config.addr()?;

    // Init database
    let db = Database::open(&config.db_path)?;

    let state: AppState = Arc::new(AppStateInner { db, jwt_secret });

    let app = bulletin_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Bulletin server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let Ok(mut sigterm) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        else {
            ctrl_c.await.ok();
            info!("Received Ctrl+C, shutting down...");
            return;
        };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
