use chrono::Local;
use probe::{info_time, run, telemetry, Config, Result};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();

    let start_time = Local::now();
    let summary = run(Config::default()).await?;
    tracing::info!(?summary, "run finished");
    info_time!(start_time, "Full program time:");

    Ok(())
}
