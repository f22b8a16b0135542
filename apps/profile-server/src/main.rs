use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use profile_db::{absolutize_sqlite_dsn, ConnectOpts, DbHandle, RetryPolicy};
use profiles::{ProfilesConfig, ProfilesModule};
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Profile Server - user profiles, skills, experience and bookings over REST
#[derive(Parser)]
#[command(name = "profile-server")]
#[command(about = "Profile Server - user profiles, skills, experience and bookings over REST")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Apply migrations, reconcile reference data and exit
    Seed {
        /// Seed file (defaults to modules.profiles.seed.file)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Profile Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
        Commands::Seed { file } => seed(config, file).await,
    }
}

async fn connect(config: &AppConfig) -> Result<DbHandle> {
    let Some(db_config) = config.database.as_ref() else {
        bail!("Database URL not configured");
    };
    let base_dir = Path::new(&config.server.home_dir);

    let mut dsn = db_config.url.trim().to_owned();
    if dsn.is_empty() {
        bail!("Database URL not configured");
    }
    // Relative sqlite paths hang off home_dir, not the cwd
    if dsn.starts_with("sqlite://") {
        dsn = absolutize_sqlite_dsn(&dsn, base_dir, true)?;
    }

    let db = DbHandle::connect_with_retry(&dsn, connect_opts(db_config), retry_policy(db_config))
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected DB backend: {:?}", db.engine());
    Ok(db)
}

fn connect_opts(db_config: &DatabaseConfig) -> ConnectOpts {
    ConnectOpts {
        max_conns: db_config.max_conns,
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout: db_config
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms))),
        create_sqlite_dirs: true,
    }
}

fn retry_policy(db_config: &DatabaseConfig) -> RetryPolicy {
    let default = RetryPolicy::default();
    RetryPolicy::new(
        db_config.connect_attempts.unwrap_or(default.attempts),
        db_config
            .retry_base_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(default.base_delay),
    )
}

async fn init_profiles(config: &AppConfig) -> Result<ProfilesModule> {
    let profiles_config: ProfilesConfig = config.module_config("profiles")?;
    let db = connect(config).await?;
    let module = ProfilesModule::init(db.sea(), profiles_config);
    module.migrate().await?;
    Ok(module)
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");
    let module = init_profiles(&config).await?;
    module
        .seed_on_startup(Path::new(&config.server.home_dir))
        .await;

    let mut ingress_config: ApiIngressConfig = config.module_config("api_ingress")?;
    if ingress_config.bind_addr.trim().is_empty() {
        ingress_config.bind_addr = format!("{}:{}", config.server.host, config.server.port);
    }
    let ingress = Arc::new(ApiIngress::new(ingress_config));
    ingress.build_router(module.router());

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(cancel.clone()));

    ingress.serve(cancel, None).await?;
    tracing::info!("Profile Server stopped");
    Ok(())
}

async fn seed(config: AppConfig, file: Option<PathBuf>) -> Result<()> {
    let module = init_profiles(&config).await?;
    let path = file.unwrap_or_else(|| module.seed_path(Path::new(&config.server.home_dir)));

    let outcome = module.seed_from_file(&path).await?;
    for (kind, report) in &outcome.reports {
        println!(
            "{kind}: {} inserted, {} updated, {} unchanged",
            report.inserted, report.updated, report.unchanged
        );
    }
    for (kind, error) in &outcome.failures {
        eprintln!("{kind}: {error}");
    }
    if !outcome.is_success() {
        bail!(
            "Reference data seeding failed for {} kind(s)",
            outcome.failures.len()
        );
    }
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    let _: ProfilesConfig = config.module_config("profiles")?;
    let _: ApiIngressConfig = config.module_config("api_ingress")?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn shutdown_on_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
    cancel.cancel();
}
