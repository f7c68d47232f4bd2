use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use shadowway_runner::config::RunnerConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("The Way of the Shadow starting");

    let config = RunnerConfig::load();
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    match shadowway_runner::run(&config, shutdown).await {
        Ok(summary) => {
            tracing::info!(exit = ?summary.exit, steps = summary.steps, "Goodbye");
            ExitCode::SUCCESS
        },
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        },
    }
}
