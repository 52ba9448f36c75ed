// Entry points shared by the binaries: initialize -> query -> materialize -> render
use crate::application::imagery_service::ImageryService;
use crate::application::map_service::{ChangePeriods, LayerStyle, MapService};
use crate::application::series_service::SeriesService;
use crate::application::session::{Session, SessionInitializer};
use crate::domain::geometry::LonLat;
use crate::domain::map_view::{MapView, VisParams};
use crate::domain::query::{BandSelection, DateRange, Operator, QueryParameters};
use crate::domain::time_series::CleaningReport;
use crate::domain::study_area::{
    CHIYODA_BOUNDS, CHIYODA_POINT, CLOUD_PROPERTY, POINT_SCALE_METRES, SENTINEL1_GRD,
    SENTINEL2_SR, TAKE_BUILDING,
};
use crate::infrastructure::config::ImageryConfig;
use crate::infrastructure::earth_engine::EarthEngineClient;
use crate::infrastructure::token_source::TokenSource;
use crate::presentation::map_page::write_html;
use crate::presentation::series_chart::{write_svg, ChartStyle};
use crate::presentation::viewer::open_in_browser;
use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

pub fn earth_engine(config: &ImageryConfig) -> Arc<dyn ImageryService> {
    Arc::new(EarthEngineClient::new(
        config.api_base.clone(),
        TokenSource::new(
            config.access_token.clone(),
            config.token_command.clone(),
            config.login_command.clone(),
        ),
    ))
}

async fn connect(
    config: &ImageryConfig,
    service: &Arc<dyn ImageryService>,
) -> anyhow::Result<Session> {
    let mut initializer = SessionInitializer::new(service.clone());
    Ok(initializer.initialize(config).await?)
}

fn year(y: i32) -> anyhow::Result<DateRange> {
    DateRange::year(y).with_context(|| format!("Invalid year {}", y))
}

/// Least cloudy Sentinel-2 image of 2023 over central Chiyoda.
pub async fn true_color_map(
    config: &ImageryConfig,
    service: Arc<dyn ImageryService>,
) -> anyhow::Result<PathBuf> {
    let session = connect(config, &service).await?;

    let query = QueryParameters::new(
        SENTINEL2_SR,
        CHIYODA_POINT,
        year(2023)?,
        BandSelection::bands(&["B4", "B3", "B2"]),
        Operator::LeastCloudyFirst {
            property: CLOUD_PROPERTY.to_string(),
        },
    );
    let style = LayerStyle {
        title: "Chiyoda Image".to_string(),
        layer_name: "Chiyoda Image".to_string(),
        vis: VisParams::new(&["B4", "B3", "B2"], 0.0, 3000.0, &[]),
        opacity: 1.0,
        center: CHIYODA_POINT.center(),
        zoom: 14,
    };

    let view = MapService::new(service)
        .single_image_map(&session, &query, &style)
        .await?;
    save_map(config, &view, "map_chiyoda.html")
}

/// Sentinel-1 VV backscatter change, 2024 mean minus 2021 mean.
pub async fn sar_change_map(
    config: &ImageryConfig,
    service: Arc<dyn ImageryService>,
) -> anyhow::Result<PathBuf> {
    let session = connect(config, &service).await?;

    let periods = ChangePeriods {
        earlier: year(2021)?,
        later: year(2024)?,
    };
    let query = QueryParameters::new(
        SENTINEL1_GRD,
        CHIYODA_BOUNDS,
        periods.earlier,
        BandSelection::polarisation("VV"),
        Operator::Mean,
    );
    let style = LayerStyle {
        title: "Chiyoda Risk Map".to_string(),
        layer_name: "Chiyoda Risk Map (Diff)".to_string(),
        vis: VisParams::new(&[], -5.0, 5.0, &["red", "white", "blue"]),
        opacity: 0.7,
        center: LonLat::new(139.76, 35.69),
        zoom: 14,
    };

    let view = MapService::new(service)
        .change_map(&session, &query, &periods, &style)
        .await?;
    save_map(config, &view, "risk_map_chiyoda.html")
}

/// VV backscatter time series at the Take Building, 2021 through 2024.
/// Returns None when no valid records remain and nothing was rendered.
pub async fn backscatter_series(
    config: &ImageryConfig,
    service: Arc<dyn ImageryService>,
) -> anyhow::Result<Option<PathBuf>> {
    let session = connect(config, &service).await?;

    let range = DateRange::from_ymd((2021, 1, 1), (2024, 12, 31)).context("Invalid study period")?;
    let query = QueryParameters::new(
        SENTINEL1_GRD,
        TAKE_BUILDING,
        range,
        BandSelection::polarisation("VV"),
        Operator::RegionMean {
            scale: POINT_SCALE_METRES,
        },
    );

    let (series, report) = SeriesService::new(service).extract(&session, &query).await?;

    if let Some(warning) = drop_warning(&report) {
        println!("{}", warning);
    }
    if series.is_empty() {
        println!(
            "No valid data to display ({} records received). Check the coordinates and period.",
            report.input
        );
        return Ok(None);
    }

    let style = ChartStyle {
        title: "SAR Backscatter Analysis: Take Building (Uchikanda 2-11-6)".to_string(),
        x_label: "Date".to_string(),
        y_label: "Backscatter Intensity (VV dB)".to_string(),
        size: (1200, 600),
    };
    let path = prepare_output(config, "sar_take_building.svg")?;
    write_svg(&series, &style, &path)?;
    println!("Charted {} dates to {}", series.len(), path.display());

    if config.open_in_browser {
        open_in_browser(&path);
    }
    Ok(Some(path))
}

/// User-facing summary of dropped records, printed before the empty check.
fn drop_warning(report: &CleaningReport) -> Option<String> {
    (report.dropped() > 0).then(|| {
        format!(
            "Warning: excluded {} records ({} missing a date or value, {} with a malformed date).",
            report.dropped(),
            report.missing_fields,
            report.malformed_dates
        )
    })
}

fn prepare_output(config: &ImageryConfig, file_name: &str) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;
    Ok(config.output_dir.join(file_name))
}

fn save_map(config: &ImageryConfig, view: &MapView, file_name: &str) -> anyhow::Result<PathBuf> {
    let path = prepare_output(config, file_name)?;
    write_html(view, &path)?;
    println!("Success! Saved {}", path.display());

    if config.open_in_browser {
        open_in_browser(&path);
    }
    Ok(path)
}
