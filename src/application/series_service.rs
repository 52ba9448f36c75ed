// Backscatter series service - Point time series extraction and cleaning
use crate::application::imagery_service::ImageryService;
use crate::application::query_builder;
use crate::application::session::Session;
use crate::domain::query::QueryParameters;
use crate::domain::time_series::{clean_records, CleanedTimeSeries, CleaningReport};
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct SeriesService {
    service: Arc<dyn ImageryService>,
}

impl SeriesService {
    pub fn new(service: Arc<dyn ImageryService>) -> Self {
        Self { service }
    }

    /// Fetch one record per image and clean them into a daily series.
    /// Data-quality drops are reported, never returned as errors.
    pub async fn extract(
        &self,
        _session: &Session,
        query: &QueryParameters,
    ) -> anyhow::Result<(CleanedTimeSeries, CleaningReport)> {
        let features = query_builder::build(query);
        let records = self
            .service
            .fetch_records(&features)
            .await
            .with_context(|| format!("Failed to fetch point series from {}", query.collection))?;

        tracing::debug!("Fetched {} raw records", records.len());

        let (series, report) = clean_records(&records);

        if report.missing_fields > 0 {
            tracing::warn!(
                "Dropped {} records with a missing date or value",
                report.missing_fields
            );
        }
        if report.malformed_dates > 0 {
            tracing::warn!(
                "Dropped {} records with a malformed date",
                report.malformed_dates
            );
        }

        Ok((series, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::session::tests::StubService;
    use crate::domain::query::{BandSelection, DateRange, Operator};
    use crate::domain::study_area::{SENTINEL1_GRD, TAKE_BUILDING};
    use crate::domain::time_series::RawRecord;

    fn query() -> QueryParameters {
        QueryParameters::new(
            SENTINEL1_GRD,
            TAKE_BUILDING,
            DateRange::from_ymd((2021, 1, 1), (2024, 12, 31)).unwrap(),
            BandSelection::polarisation("VV"),
            Operator::RegionMean { scale: 10.0 },
        )
    }

    fn session() -> Session {
        Session {
            project_id: "p".to_string(),
        }
    }

    #[tokio::test]
    async fn test_extract_cleans_fetched_records() {
        let stub = Arc::new(StubService::with_records(vec![
            RawRecord::new(Some("2021-02-40"), Some(1.0)),
            RawRecord::new(Some("2021-03-01"), Some(2.0)),
            RawRecord::new(Some("2021-03-01"), Some(4.0)),
        ]));
        let service = SeriesService::new(stub.clone());

        let (series, report) = service.extract(&session(), &query()).await.unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].value, 3.0);
        assert_eq!(report.malformed_dates, 1);

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen[0].function_name(), Some("Collection.map"));
    }

    #[tokio::test]
    async fn test_extract_all_invalid_is_not_an_error() {
        let stub = Arc::new(StubService::with_records(vec![RawRecord::new(None, Some(1.0))]));
        let service = SeriesService::new(stub);

        let (series, report) = service.extract(&session(), &query()).await.unwrap();
        assert!(series.is_empty());
        assert_eq!(report.missing_fields, 1);
    }
}
