use clap::Parser;
use crop_predict::app::server;
use crop_predict::core::ConfigProvider;
use crop_predict::utils::{logger, validation::Validate};
use crop_predict::{CliConfig, PredictError};

fn exit_on_startup_failure(e: &PredictError) -> ! {
    tracing::error!("❌ Startup failed: {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting crop-predict v{}", env!("CARGO_PKG_VERSION"));
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = cli
        .resolve()
        .unwrap_or_else(|e| exit_on_startup_failure(&e));

    if let Err(e) = config.validate() {
        exit_on_startup_failure(&e);
    }
    tracing::info!("Model artifact: {}", config.model_path());

    // The model is loaded exactly once, before the listener exists.
    let state = server::build_state(&config).unwrap_or_else(|e| exit_on_startup_failure(&e));

    server::run(&config, state).await?;
    Ok(())
}
