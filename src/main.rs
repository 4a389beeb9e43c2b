use tracing::info;

use tokio_accounts::{app, logging, Config, VERSION};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;
    logging::init(&config.logging)?;

    info!("Starting tokio_accounts {}", VERSION);
    config.log_summary();

    // Single-threaded runtime; hashing and SQLite run on the blocking pool
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let server = app::build_server(&config)?;
    let running = server.listen(config.server.port).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    running.close().await?;

    Ok(())
}
