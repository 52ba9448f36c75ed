// Writes the true-color map HTML document and opens it
use chiyoda_imagery::infrastructure::config::load_imagery_config;
use chiyoda_imagery::presentation::commands::{earth_engine, init_tracing, true_color_map};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_imagery_config()?;
    let service = earth_engine(&config);

    true_color_map(&config, service).await?;
    Ok(())
}
