//! infobytes-web - Blog API service
//!
//! Serves the public blog JSON API and the admin API over either the local
//! SQLite database or a remote backend speaking the same API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use infobytes_common::config::{
    database_path, load_env_files, load_toml_config, resolve_root_folder, BackendMode, TomlConfig,
    DEFAULT_API_URL,
};
use infobytes_common::db::init_database;
use infobytes_common::db::settings::resolve_admin_password;
use infobytes_common::store::{BlogStore, RemoteStore, SqliteStore};
use infobytes_gen::config::GeneratorSettings;
use infobytes_gen::PostGenerator;
use infobytes_web::{build_router, AppState};
use sqlx::SqlitePool;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for infobytes-web
#[derive(Parser, Debug)]
#[command(name = "infobytes-web")]
#[command(about = "Info Bytes blog API service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "INFOBYTES_WEB_PORT")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0", env = "INFOBYTES_WEB_BIND")]
    bind: std::net::IpAddr,

    /// Root folder holding data/blog.db
    #[arg(short, long, env = "INFOBYTES_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Content backend: local or remote
    #[arg(short, long, env = "INFOBYTES_BACKEND")]
    backend: Option<BackendMode>,

    /// Remote backend API base (remote mode)
    #[arg(long, env = "API_URL")]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "infobytes_web=info,infobytes_gen=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Info Bytes web (infobytes-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    load_env_files();
    let args = Args::parse();

    let toml_config = load_toml_config().unwrap_or_else(|e| {
        warn!("{}; using defaults", e);
        TomlConfig::default()
    });

    let backend = args.backend.unwrap_or(toml_config.backend.mode);
    let state = match backend {
        BackendMode::Remote => {
            let api_url = args
                .api_url
                .clone()
                .or_else(|| toml_config.backend.api_url.clone())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string());
            info!("Backend: remote ({})", api_url);

            let admin_password = admin_password(None, &toml_config).await?;
            let store = RemoteStore::new(api_url, admin_password.clone())
                .context("Failed to create remote backend client")?;
            AppState::new(Arc::new(store), admin_password.as_deref())
        }
        BackendMode::Local => {
            let root_folder = resolve_root_folder(args.root_folder.as_deref(), &toml_config);
            let db_path = database_path(&root_folder);
            info!("Backend: local ({})", db_path.display());

            let pool = init_database(&db_path)
                .await
                .context("Failed to initialize database")?;
            let admin_password = admin_password(Some(&pool), &toml_config).await?;
            let store = SqliteStore::new(pool.clone());
            let state = AppState::new(
                Arc::new(store.clone()) as Arc<dyn BlogStore>,
                admin_password.as_deref(),
            );

            let settings = GeneratorSettings::resolve(&pool, &toml_config)
                .await
                .context("Failed to resolve generator settings")?;
            match PostGenerator::from_settings(store, &settings) {
                Ok(generator) => {
                    info!("Generation enabled (model {})", settings.model);
                    state.with_generator(Arc::new(generator), settings.batch_delay)
                }
                Err(e) => {
                    warn!("Generation disabled: {}", e);
                    state
                }
            }
        }
    };

    let app = build_router(state);

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn admin_password(pool: Option<&SqlitePool>, toml: &TomlConfig) -> Result<Option<String>> {
    let password = resolve_admin_password(pool, toml)
        .await
        .context("Failed to read admin password")?;
    if password.is_none() {
        warn!("ADMIN_PASSWORD not set; admin API disabled");
    }
    Ok(password)
}

/// Graceful shutdown on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
