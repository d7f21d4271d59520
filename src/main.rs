use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::info;

use astroalert::app::App;
use astroalert::cli::{Cli, Command};
use astroalert::config::Config;
use astroalert::delivery::DeliveryOutcome;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    config.init_logging();

    let app = App::from_config(&config)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            info!("astroalert starting");
            tokio::select! {
                result = app.run() => result?,
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                }
            }
            info!("astroalert stopped");
        }
        Command::Once { send } => {
            if send {
                app.tick(Utc::now()).await;
            } else {
                for (instrument, text) in app.preview(Utc::now()).await {
                    println!("=== {instrument} ===\n{text}\n");
                }
            }
        }
        Command::Check => {
            let outcome = app.check().await;
            match &outcome {
                DeliveryOutcome::Success { .. } => {
                    println!(
                        "ok: endpoint reachable ({} attempt(s))",
                        outcome.attempts().len()
                    );
                }
                DeliveryOutcome::Failed { error, .. } => {
                    anyhow::bail!("endpoint check failed: {error}");
                }
            }
        }
    }

    Ok(())
}
