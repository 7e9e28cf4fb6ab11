//! readygate - main entry point.

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use readygate::{
    cli::Cli,
    config::{Config, DEFAULT_LOG_FILTER, LogFormat, LoggingConfig},
    gate::ReadinessGate,
    handoff::Handoff,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load .env if present; variables already set win
    let _ = dotenvy::dotenv();

    // Fails fast on a missing DATABASE_URL, before any network activity
    let config = Config::from_env(&cli.overrides())?;
    init_tracing(&config.logging);

    let targets = config.targets.parse_targets()?;
    let gate = ReadinessGate::new(config.wait.to_gate_config(targets));

    if cli.check {
        let mut all_ready = true;
        for (target, result) in gate.check().await {
            match result {
                Ok(()) => tracing::info!(%target, "Target is accepting connections"),
                Err(e) => {
                    all_ready = false;
                    tracing::warn!(%target, error = %e, "Target is not reachable");
                }
            }
        }
        std::process::exit(if all_ready { 0 } else { 1 });
    }

    if gate.config().is_unbounded() {
        tracing::debug!("No attempt limit or deadline configured, waiting indefinitely");
    }
    let report = gate.wait().await?;
    tracing::debug!(
        attempts = report.total_attempts(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "All dependencies ready"
    );

    let Some(handoff) = Handoff::from_argv(cli.command) else {
        tracing::warn!("No command given, exiting after readiness gate");
        return Ok(());
    };

    // In exec mode this only returns on failure
    let code = handoff.run(config.handoff).await?;
    std::process::exit(code);
}

fn init_tracing(logging: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_new(&logging.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // stderr only: stdout belongs to the command
    match logging.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
