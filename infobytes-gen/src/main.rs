//! Info Bytes generator (infobytes-gen) - command-line entry point
//!
//! Seeds the niche catalogue, generates posts one at a time or in batches,
//! runs the recurring scheduler and performs database housekeeping.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use infobytes_common::config::{database_path, load_env_files, load_toml_config, resolve_root_folder};
use infobytes_common::db::init_database;
use infobytes_common::store::SqliteStore;
use infobytes_gen::batch::run_batch;
use infobytes_gen::config::GeneratorSettings;
use infobytes_gen::scheduler::{run_scheduler, Schedule};
use infobytes_gen::{maintenance, seed, PostGenerator};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Most posts a single batch may request
const MAX_BATCH_COUNT: u32 = 50;

#[derive(Parser, Debug)]
#[command(name = "infobytes-gen")]
#[command(about = "AI post generator for the Info Bytes blog")]
#[command(version)]
struct Args {
    /// Root folder holding data/blog.db
    #[arg(short, long, global = true, env = "INFOBYTES_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert or refresh the default niche catalogue
    Seed,

    /// Generate and publish one post
    Generate {
        /// Niche id; weighted random when omitted
        #[arg(long)]
        niche: Option<String>,
    },

    /// Generate several posts in a row
    Batch {
        #[arg(short, long, default_value_t = 3)]
        count: u32,

        #[arg(long)]
        niche: Option<String>,
    },

    /// Run batches on a cron schedule until interrupted
    Schedule {
        /// Cron expression (default: AUTO_POST_CRON or every 6 hours)
        #[arg(long)]
        cron: Option<String>,

        /// Posts per batch (default: POSTS_PER_BATCH or 3)
        #[arg(short, long)]
        count: Option<u32>,
    },

    /// List every post and the post count per niche
    Report,

    /// Copy each niche's market onto its posts
    SyncMarkets,

    /// Deactivate niches (retired catalogue ids when none given)
    DeactivateNiches { ids: Vec<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "infobytes_gen=info,infobytes_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    load_env_files();
    let args = Args::parse();

    let toml_config = load_toml_config().unwrap_or_else(|e| {
        warn!("{}; using defaults", e);
        Default::default()
    });
    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    let db_path = database_path(&root_folder);
    info!("Database: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;
    let store = SqliteStore::new(pool.clone());

    match args.command {
        Command::Seed => {
            let count = seed::seed_niches(&store).await.context("Seeding failed")?;
            println!("{} niches seeded. Run: infobytes-gen generate", count);
        }

        Command::Generate { niche } => {
            let generator = build_generator(&store, &toml_config).await?;
            if let Err(e) = generator.generate(niche.as_deref()).await {
                bail!("Generation failed: {}", e);
            }
        }

        Command::Batch { count, niche } => {
            let settings = GeneratorSettings::resolve(&pool, &toml_config).await?;
            let generator = PostGenerator::from_settings(store.clone(), &settings)?;
            let count = count.clamp(1, MAX_BATCH_COUNT);
            let report = run_batch(&generator, count, niche.as_deref(), settings.batch_delay).await;
            println!(
                "Done! {} succeeded, {} failed",
                report.succeeded, report.failed
            );
        }

        Command::Schedule { cron, count } => {
            let settings = GeneratorSettings::resolve(&pool, &toml_config).await?;
            let schedule = Schedule::parse(cron.as_deref().unwrap_or(&settings.cron))?;
            let count = count.unwrap_or(settings.posts_per_batch).clamp(1, MAX_BATCH_COUNT);
            let generator = Arc::new(PostGenerator::from_settings(store.clone(), &settings)?);

            info!("Schedule: {}", schedule.expression());
            info!("Posts per batch: {}", count);

            let shutdown = CancellationToken::new();
            tokio::spawn(cancel_on_signal(shutdown.clone()));

            let delay = settings.batch_delay;
            run_scheduler(
                schedule,
                move || {
                    let generator = generator.clone();
                    async move {
                        run_batch(&generator, count, None, delay).await;
                        Ok(())
                    }
                },
                shutdown,
            )
            .await;
        }

        Command::Report => {
            let report = maintenance::report(&store).await?;
            print!("{}", report);
        }

        Command::SyncMarkets => {
            let breakdown = maintenance::sync_markets(&store).await?;
            let total: i64 = breakdown.iter().map(|b| b.count).sum();
            for row in &breakdown {
                println!("  {}: {}", row.market.as_deref().unwrap_or("-"), row.count);
            }
            println!("Total posts: {}", total);
        }

        Command::DeactivateNiches { ids } => {
            let changed = maintenance::deactivate_niches(&store, &ids).await?;
            if changed.is_empty() {
                println!("No active niches matched");
            }
            for id in changed {
                println!("  Deactivated: {}", id);
            }
        }
    }

    pool.close().await;
    Ok(())
}

async fn build_generator(
    store: &SqliteStore,
    toml_config: &infobytes_common::config::TomlConfig,
) -> Result<PostGenerator> {
    let settings = GeneratorSettings::resolve(store.pool(), toml_config).await?;
    Ok(PostGenerator::from_settings(store.clone(), &settings)?)
}

/// Cancel `token` on Ctrl+C or SIGTERM
async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, stopping scheduler"),
        _ = terminate => info!("Received terminate signal, stopping scheduler"),
    }
    token.cancel();
}
