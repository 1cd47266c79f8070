//! snapup: screenshot a region, upload it and copy the link

use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use reqwest::Client;
use snapup::{
    capture::ScreencaptureBackend,
    cli::Cli,
    config::Settings,
    error::{SnapError, SnapResult},
    pipeline::App,
    sink::SystemSink,
    upload,
};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Respects RUST_LOG; otherwise -v/-vv pick the level.
    // Logs go to stderr so stdout only carries URLs.
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_directive())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .init();

    match run(&cli).await {
        Ok(urls) => {
            for url in &urls {
                println!("{}", url);
            }
            ExitCode::SUCCESS
        }
        Err(error) => report(&error),
    }
}

async fn run(cli: &Cli) -> SnapResult<Vec<String>> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!("Settings: {:?}", settings);

    let http = Client::builder()
        .user_agent(concat!("snapup/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let capture = Arc::new(ScreencaptureBackend::new(&settings.capture_command));
    let uploader = upload::from_settings(http.clone(), &settings);
    let sink = Arc::new(SystemSink::from_settings(&settings));

    let app = App::new(settings, http, capture, uploader, sink)?;
    let config = cli.run_config();
    info!("Starting run: {:?}", config.mode());

    app.run(&config).await
}

/// Prints the error once and maps it to the exit status
fn report(error: &SnapError) -> ExitCode {
    eprintln!("{}", error);
    eprintln!("hint: {}", error.remediation_hint());
    ExitCode::from(error.exit_code())
}
