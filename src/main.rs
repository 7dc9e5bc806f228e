use std::io::{self, IsTerminal, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info, warn};
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;

use nowcast::api::{self, AppState};
use nowcast::playback::Reconciler;
use nowcast::settings::Settings;
use nowcast::spotify::SpotifyClient;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Relay the currently playing track of a music account to connected viewers."
)]
struct Cli {
    /// Override the config file path
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Host address to bind to (overrides config)
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
    /// Reduce output to only errors
    #[arg(short, long)]
    quiet: bool,
    /// Increase logging verbosity (stackable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
    /// Output machine readable JSON logs
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "{err:?}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(host) = cli.host.clone() {
        settings.host = host;
    }
    if let Some(port) = cli.port {
        settings.port = port;
    }
    // configuration problems are the only fatal errors; fail before any
    // timer starts
    settings.validate()?;

    init_logging(&cli);
    serve(settings)
}

#[tokio::main]
async fn serve(settings: Settings) -> Result<()> {
    let state = AppState::new(settings);

    let client = SpotifyClient::new(
        state.settings.api_base_url.clone(),
        state.credentials.clone(),
    );
    let reconciler = Arc::new(Reconciler::new(
        client,
        state.credentials.clone(),
        state.playback.clone(),
        state.hub.clone(),
        state.settings.fallback_name.clone(),
    ));

    // Poll timer: drives the reconciler. Missed ticks are skipped, and the
    // reconciler itself refuses overlapping polls.
    let poll_task = {
        let reconciler = reconciler.clone();
        let every = Duration::from_secs(state.settings.poll_interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                reconciler.tick().await;
            }
        })
    };

    // Credential refresh timer, independent of polling.
    let refresh_task = {
        let credentials = state.credentials.clone();
        let every = Duration::from_secs(state.settings.refresh_interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // the first tick fires immediately, before any login happened
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !credentials.is_authenticated().await {
                    continue;
                }
                if let Err(err) = credentials.refresh().await {
                    warn!("scheduled credential refresh failed: {err}");
                }
            }
        })
    };

    let app = api::create_router(state.clone());

    let addr: SocketAddr = format!("{}:{}", state.settings.host, state.settings.port)
        .parse()
        .context("invalid listen address")?;

    info!("listening on http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .context("binding to address")?;

    // Set up graceful shutdown
    let shutdown_hub = state.hub.clone();
    let shutdown_signal = async move {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }

        info!("shutdown signal received, closing subscriber streams");
        shutdown_hub.shutdown();
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("running server")?;

    poll_task.abort();
    refresh_task.abort();
    info!("shutdown complete");

    Ok(())
}

fn init_logging(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter_level = effective_log_level(cli);
    if filter_level == LevelFilter::Off {
        log::set_max_level(LevelFilter::Off);
        return;
    }

    let level = match filter_level {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nowcast={level},tower_http={level}")));

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_ansi(io::stderr().is_terminal()))
            .try_init()
            .ok();
    }

    // Also init env_logger for compatibility with log crate users
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.filter_level(filter_level);
    builder.try_init().ok();
}

fn effective_log_level(cli: &Cli) -> LevelFilter {
    if cli.quiet {
        LevelFilter::Off
    } else {
        match cli.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
