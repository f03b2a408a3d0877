use tracing_subscriber::EnvFilter;

use duelgrid_runner::config::RunnerConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = RunnerConfig::load();
    tracing::info!(game = ?config.game, format = ?config.format, "Duelgrid runner starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(duelgrid_runner::run(&config));
    // A pending stdin read holds a blocking thread; do not wait for it.
    runtime.shutdown_background();

    match result? {
        Some(winner) => match winner.name() {
            Some(name) => tracing::info!(winner = name, "Match finished"),
            None => tracing::info!("Match finished in a draw"),
        },
        None => tracing::info!("Input closed before the match finished"),
    }
    Ok(())
}
