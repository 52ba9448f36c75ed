// Extracts the backscatter time series at the Take Building and charts it
use chiyoda_imagery::infrastructure::config::load_imagery_config;
use chiyoda_imagery::presentation::commands::{backscatter_series, earth_engine, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_imagery_config()?;
    let service = earth_engine(&config);

    backscatter_series(&config, service).await?;
    Ok(())
}
