// Writes the SAR change map HTML document and opens it
use chiyoda_imagery::infrastructure::config::load_imagery_config;
use chiyoda_imagery::presentation::commands::{earth_engine, init_tracing, sar_change_map};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_imagery_config()?;
    let service = earth_engine(&config);

    sar_change_map(&config, service).await?;
    Ok(())
}
