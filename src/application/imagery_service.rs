// Service trait for the remote imagery platform
use crate::domain::expression::Expr;
use crate::domain::map_view::{TileSource, VisParams};
use crate::domain::time_series::RawRecord;
use async_trait::async_trait;

#[async_trait]
pub trait ImageryService: Send + Sync {
    /// Open a session for `project_id`
    async fn initialize(&self, project_id: &str) -> anyhow::Result<()>;

    /// Interactive re-authentication (may prompt the user)
    async fn authenticate(&self) -> anyhow::Result<()>;

    /// Register `image` for tile rendering with the given visualization
    async fn tile_source(&self, image: &Expr, vis: &VisParams) -> anyhow::Result<TileSource>;

    /// Evaluate a feature collection whose features carry `date`/`value` properties
    async fn fetch_records(&self, features: &Expr) -> anyhow::Result<Vec<RawRecord>>;
}
