//! VoiceRelay CLI entry point

use std::process::ExitCode;

use clap::Parser;

use voice_relay::cli::{
    app::{load_merged_config, run_record, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands, RecordOptions},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use voice_relay::domain::config::AppConfig;
use voice_relay::domain::recording::Duration;
use voice_relay::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let presenter = Presenter::new();

    // Handle subcommands
    if let Some(Commands::Config { action }) = cli.command {
        let store = XdgConfigStore::new();
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    // Build CLI config from args and merge with file config
    let cli_config = AppConfig {
        endpoint: cli.endpoint.clone(),
        max_capture: cli.max_capture.clone(),
    };
    let config = load_merged_config(cli_config).await;

    let max_capture = match config.max_capture.as_ref() {
        Some(s) => match s.parse::<Duration>() {
            Ok(d) => d,
            Err(e) => {
                presenter.error(&format!("Invalid max-capture: {}", e));
                return ExitCode::from(EXIT_USAGE_ERROR);
            }
        },
        None => Duration::default_max_capture(),
    };

    let options = RecordOptions {
        endpoint: config.endpoint_or_default(),
        max_capture,
        json: cli.json,
    };

    run_record(options).await
}
