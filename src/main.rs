//! Heart disease prediction - main entry point

use clap::Parser;
use heart_failure_prediction::cli::{cmd_export, cmd_predict, cmd_serve, cmd_train, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heart_failure_prediction=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { config, overrides } => {
            cmd_train(&config, &overrides)?;
        }
        Commands::Serve { host, port, model } => {
            cmd_serve(&host, port, &model).await?;
        }
        Commands::Export { run, output, config } => {
            cmd_export(run.as_deref(), output.as_deref(), &config)?;
        }
        Commands::Predict { model, data, output } => {
            cmd_predict(&model, &data, output.as_deref())?;
        }
    }

    Ok(())
}
