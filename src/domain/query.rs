// Query parameter domain models
use super::geometry::Geometry;
use chrono::{Days, NaiveDate};

/// Calendar date range, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Build from `(year, month, day)` triples. Returns None for impossible dates.
    pub fn from_ymd(start: (i32, u32, u32), end: (i32, u32, u32)) -> Option<Self> {
        Some(Self::new(
            NaiveDate::from_ymd_opt(start.0, start.1, start.2)?,
            NaiveDate::from_ymd_opt(end.0, end.1, end.2)?,
        ))
    }

    /// Whole calendar year, January 1st through December 31st.
    pub fn year(year: i32) -> Option<Self> {
        Self::from_ymd((year, 1, 1), (year, 12, 31))
    }

    /// The day after `end`; the imagery service treats range ends as exclusive.
    pub fn exclusive_end(&self) -> NaiveDate {
        self.end.checked_add_days(Days::new(1)).unwrap_or(self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BandSelection {
    /// Plain band list, no extra filtering
    Bands(Vec<String>),
    /// Keep images whose polarisation list contains `polarisation`, then select `band`
    Polarisation { polarisation: String, band: String },
}

impl BandSelection {
    pub fn bands(names: &[&str]) -> Self {
        BandSelection::Bands(names.iter().map(|s| s.to_string()).collect())
    }

    pub fn polarisation(polarisation: &str) -> Self {
        BandSelection::Polarisation {
            polarisation: polarisation.to_string(),
            band: polarisation.to_string(),
        }
    }

    pub fn band_names(&self) -> Vec<String> {
        match self {
            BandSelection::Bands(names) => names.clone(),
            BandSelection::Polarisation { band, .. } => vec![band.clone()],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// Sort by ascending `property` and take the first image
    LeastCloudyFirst { property: String },
    /// Per-pixel mean composite of the whole collection
    Mean,
    /// One feature per image: mean over the geometry at `scale` metres
    RegionMean { scale: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameters {
    pub collection: String,
    pub geometry: Geometry,
    pub date_range: DateRange,
    pub bands: BandSelection,
    pub operator: Operator,
}

impl QueryParameters {
    pub fn new(
        collection: &str,
        geometry: Geometry,
        date_range: DateRange,
        bands: BandSelection,
        operator: Operator,
    ) -> Self {
        Self {
            collection: collection.to_string(),
            geometry,
            date_range,
            bands,
            operator,
        }
    }

    /// Same query over a different date range.
    pub fn with_date_range(&self, date_range: DateRange) -> Self {
        Self {
            date_range,
            ..self.clone()
        }
    }
}
