// Time series domain models and record cleaning
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::fmt;

/// One row per source image, as returned by the imagery service.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub date: Option<String>,
    pub value: Option<f64>,
}

impl RawRecord {
    pub fn new(date: Option<&str>, value: Option<f64>) -> Self {
        Self {
            date: date.map(str::to_string),
            value,
        }
    }

    /// Classify this record. Never fails: defects become `Invalid`.
    pub fn classify(&self) -> RecordOutcome {
        let (Some(date_text), Some(value)) = (self.date.as_deref(), self.value) else {
            return RecordOutcome::Invalid(InvalidReason::MissingField);
        };
        if !value.is_finite() {
            return RecordOutcome::Invalid(InvalidReason::MissingField);
        }
        match parse_date_permissive(date_text) {
            Some(date) => RecordOutcome::Valid(SeriesPoint::new(date, value)),
            None => RecordOutcome::Invalid(InvalidReason::MalformedDate(date_text.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InvalidReason {
    /// Date or measurement absent (or not a finite number)
    MissingField,
    MalformedDate(String),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::MissingField => write!(f, "missing date or value"),
            InvalidReason::MalformedDate(s) => write!(f, "malformed date '{}'", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Valid(SeriesPoint),
    Invalid(InvalidReason),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Ascending, one point per date, no missing values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleanedTimeSeries {
    points: Vec<SeriesPoint>,
}

impl CleanedTimeSeries {
    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.points.first()?.date, self.points.last()?.date))
    }

    pub fn value_span(&self) -> Option<(f64, f64)> {
        let mut values = self.points.iter().map(|p| p.value);
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleaningReport {
    pub input: usize,
    pub missing_fields: usize,
    pub malformed_dates: usize,
    pub output: usize,
}

impl CleaningReport {
    pub fn dropped(&self) -> usize {
        self.missing_fields + self.malformed_dates
    }
}

/// Group points by date, averaging values that share a date. Output is sorted
/// ascending. Applying this to its own output returns the same points.
pub fn aggregate_by_date(points: impl IntoIterator<Item = SeriesPoint>) -> CleanedTimeSeries {
    let mut groups: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for p in points {
        let entry = groups.entry(p.date).or_insert((0.0, 0));
        entry.0 += p.value;
        entry.1 += 1;
    }

    let points = groups
        .into_iter()
        .map(|(date, (sum, n))| SeriesPoint::new(date, sum / n as f64))
        .collect();

    CleanedTimeSeries { points }
}

/// Drop invalid records, then group by date and sort.
pub fn clean_records(records: &[RawRecord]) -> (CleanedTimeSeries, CleaningReport) {
    let mut report = CleaningReport {
        input: records.len(),
        ..Default::default()
    };
    let mut valid = Vec::with_capacity(records.len());

    for record in records {
        match record.classify() {
            RecordOutcome::Valid(point) => valid.push(point),
            RecordOutcome::Invalid(InvalidReason::MissingField) => report.missing_fields += 1,
            RecordOutcome::Invalid(reason @ InvalidReason::MalformedDate(_)) => {
                tracing::debug!("Dropping record: {}", reason);
                report.malformed_dates += 1;
            }
        }
    }

    let series = aggregate_by_date(valid);
    report.output = series.len();
    (series, report)
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Lenient calendar date parsing. Returns None for anything that is not a real
/// date (e.g. day 40), never panics.
pub fn parse_date_permissive(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}
