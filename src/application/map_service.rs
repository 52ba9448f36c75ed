// Map service - Use cases producing tile-layer map views
use crate::application::imagery_service::ImageryService;
use crate::application::query_builder;
use crate::application::session::Session;
use crate::domain::expression::Expr;
use crate::domain::geometry::LonLat;
use crate::domain::map_view::{MapView, TileLayer, VisParams};
use crate::domain::query::{DateRange, QueryParameters};
use anyhow::Context;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct LayerStyle {
    pub title: String,
    pub layer_name: String,
    pub vis: VisParams,
    pub opacity: f64,
    pub center: LonLat,
    pub zoom: u8,
}

#[derive(Debug, Clone)]
pub struct ChangePeriods {
    pub earlier: DateRange,
    pub later: DateRange,
}

#[derive(Clone)]
pub struct MapService {
    service: Arc<dyn ImageryService>,
}

impl MapService {
    pub fn new(service: Arc<dyn ImageryService>) -> Self {
        Self { service }
    }

    /// Single image selected by `query` (e.g. least cloudy of a year).
    pub async fn single_image_map(
        &self,
        _session: &Session,
        query: &QueryParameters,
        style: &LayerStyle,
    ) -> anyhow::Result<MapView> {
        let image = query_builder::build(query);
        self.render(&image, style)
            .await
            .with_context(|| format!("Failed to build tile layer for {}", query.collection))
    }

    /// Difference of two mean composites (`later - earlier`), clipped to the query geometry.
    pub async fn change_map(
        &self,
        _session: &Session,
        query: &QueryParameters,
        periods: &ChangePeriods,
        style: &LayerStyle,
    ) -> anyhow::Result<MapView> {
        let diff = query_builder::change_between(query, periods.earlier, periods.later);
        self.render(&diff, style)
            .await
            .with_context(|| format!("Failed to build change layer for {}", query.collection))
    }

    async fn render(&self, image: &Expr, style: &LayerStyle) -> anyhow::Result<MapView> {
        let source = self.service.tile_source(image, &style.vis).await?;
        tracing::debug!("Tile source for {}: {}", style.layer_name, source.url_template);

        Ok(MapView::new(&style.title, style.center, style.zoom)
            .with_overlay(TileLayer::new(&style.layer_name, source, style.opacity)))
    }
}
