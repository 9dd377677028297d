//! Main app runner for a capture session

use std::process::ExitCode;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::ports::ConfigStore;
use crate::application::{VoicePipeline, WavTranscoder};
use crate::domain::config::AppConfig;
use crate::domain::recording::Duration;
use crate::domain::session::RecorderStatus;
use crate::infrastructure::{
    CpalChunkRecorder, HttpUploadClient, StdAudioDecoder, XdgConfigStore,
};

use super::args::RecordOptions;
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Run one interactive capture session: listen until the user stops (Enter
/// or Ctrl-C) or the cap elapses, then process and print the result.
pub async fn run_record(options: RecordOptions) -> ExitCode {
    let presenter = Arc::new(StdMutex::new(Presenter::new()));

    let recorder = CpalChunkRecorder::new();
    let transcoder = WavTranscoder::new(StdAudioDecoder::new());
    let uploader = HttpUploadClient::new(&options.endpoint);

    let observer_presenter = Arc::clone(&presenter);
    let pipeline = VoicePipeline::new(recorder, transcoder, uploader).with_observer(Arc::new(
        move |status: &RecorderStatus| {
            observer_presenter.lock().unwrap().show_status(status);
        },
    ));

    presenter
        .lock()
        .unwrap()
        .info(&format!("Press Enter to stop (cap {})", options.max_capture));

    if pipeline.start().await.is_err() {
        // The observer already rendered the error status
        return ExitCode::from(EXIT_ERROR);
    }

    wait_for_stop(options.max_capture).await;

    match pipeline.stop().await {
        Ok(response) => {
            let presenter = presenter.lock().unwrap();
            if options.json {
                match serde_json::to_string_pretty(&response) {
                    Ok(body) => presenter.output(&body),
                    Err(e) => {
                        presenter.error(&format!("Failed to render response: {}", e));
                        return ExitCode::from(EXIT_ERROR);
                    }
                }
            } else {
                presenter.output(&response.result.speech_text);
                render_agent_response(&presenter, &response.result.agent_response);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(_) => ExitCode::from(EXIT_ERROR),
    }
}

/// Block until the user presses Enter, hits Ctrl-C, or the cap elapses
async fn wait_for_stop(max_capture: Duration) {
    let mut line = String::new();
    let mut stdin = BufReader::new(tokio::io::stdin());

    tokio::select! {
        _ = stdin.read_line(&mut line) => {}
        _ = tokio::signal::ctrl_c() => {}
        _ = tokio::time::sleep(max_capture.as_std()) => {
            tracing::debug!(cap = %max_capture, "max capture duration reached");
        }
    }
}

/// Print the agent response: plain strings as-is, structures as JSON
fn render_agent_response(presenter: &Presenter, response: &serde_json::Value) {
    match response {
        serde_json::Value::Null => {}
        serde_json::Value::String(text) => {
            if !text.is_empty() {
                presenter.output(text);
            }
        }
        other => {
            if let Ok(body) = serde_json::to_string_pretty(other) {
                presenter.output(&body);
            }
        }
    }
}

/// Load and merge configuration from file and CLI.
/// Precedence: defaults < file < cli (the endpoint env var arrives through
/// the CLI layer).
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    AppConfig::defaults().merge(file_config).merge(cli_config)
}
