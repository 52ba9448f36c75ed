// Line chart of a cleaned time series (SVG)
use crate::domain::time_series::CleanedTimeSeries;
use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use plotters::prelude::*;
use std::path::Path;

const LINE_COLOR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);

#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub size: (u32, u32),
}

pub fn write_svg(series: &CleanedTimeSeries, style: &ChartStyle, path: &Path) -> Result<()> {
    let (first, last) = series.date_span().context("Cannot chart an empty series")?;
    let (lo, hi) = series.value_span().context("Cannot chart an empty series")?;
    let (x0, x1) = padded_dates(first, last);
    let (y0, y1) = padded_values(lo, hi);

    let root = SVGBackend::new(path, style.size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&style.title, ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc(style.x_label.as_str())
        .y_desc(style.y_label.as_str())
        .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m").to_string())
        .light_line_style(BLACK.mix(0.05))
        .draw()?;

    let points: Vec<(NaiveDate, f64)> = series.points().iter().map(|p| (p.date, p.value)).collect();

    chart.draw_series(LineSeries::new(points.iter().copied(), LINE_COLOR.stroke_width(1)))?;
    chart.draw_series(
        points
            .iter()
            .map(|&(d, v)| Circle::new((d, v), 3, LINE_COLOR.filled())),
    )?;

    root.present()
        .with_context(|| format!("Failed to write chart to {}", path.display()))?;
    Ok(())
}

/// Date axis range; a single date gets a day either side.
fn padded_dates(first: NaiveDate, last: NaiveDate) -> (NaiveDate, NaiveDate) {
    if first < last {
        return (first, last);
    }
    (
        first.checked_sub_days(Days::new(1)).unwrap_or(first),
        last.checked_add_days(Days::new(1)).unwrap_or(last),
    )
}

/// Value axis range with 5% headroom (or ±1 for a flat series).
fn padded_values(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    if span <= f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    (lo - span * 0.05, hi + span * 0.05)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_padded_dates() {
        assert_eq!(
            padded_dates(date("2021-03-01"), date("2021-03-01")),
            (date("2021-02-28"), date("2021-03-02"))
        );
        assert_eq!(
            padded_dates(date("2021-01-01"), date("2024-12-31")),
            (date("2021-01-01"), date("2024-12-31"))
        );
    }

    #[test]
    fn test_padded_values() {
        assert_eq!(padded_values(3.0, 3.0), (2.0, 4.0));
        let (lo, hi) = padded_values(-10.0, 0.0);
        assert!((lo + 10.5).abs() < 1e-9);
        assert!((hi - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_series_is_rejected() {
        let style = ChartStyle {
            title: "t".into(),
            x_label: "x".into(),
            y_label: "y".into(),
            size: (100, 100),
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        assert!(write_svg(&CleanedTimeSeries::default(), &style, &path).is_err());
        assert!(!path.exists());
    }
}
