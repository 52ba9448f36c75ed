// Earth Engine REST client implementation
use crate::application::imagery_service::ImageryService;
use crate::domain::expression::Expr;
use crate::domain::map_view::{TileSource, VisParams};
use crate::domain::time_series::RawRecord;
use crate::infrastructure::expression_encoder::encode;
use crate::infrastructure::token_source::TokenSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

const ATTRIBUTION: &str = "Google Earth Engine";

#[derive(Debug, Clone)]
struct ActiveSession {
    project_id: String,
    token: String,
}

pub struct EarthEngineClient {
    api_base: String,
    tokens: TokenSource,
    http: reqwest::Client,
    session: RwLock<Option<ActiveSession>>,
}

#[derive(Debug, Deserialize)]
struct MapResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ComputeValueResponse {
    result: Value,
}

impl EarthEngineClient {
    pub fn new(api_base: String, tokens: TokenSource) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            tokens,
            http: reqwest::Client::new(),
            session: RwLock::new(None),
        }
    }

    fn project_url(&self, project_id: &str, method: &str) -> String {
        format!(
            "{}/v1/projects/{}/{}",
            self.api_base,
            urlencoding::encode(project_id),
            method
        )
    }

    fn tile_url_template(&self, map_name: &str) -> String {
        format!("{}/v1/{}/tiles/{{z}}/{{x}}/{{y}}", self.api_base, map_name)
    }

    async fn active_session(&self) -> Result<ActiveSession> {
        self.session
            .read()
            .await
            .clone()
            .context("Earth Engine session is not initialized")
    }

    async fn execute_post<T: for<'de> Deserialize<'de>>(&self, method: &str, body: Value) -> Result<T> {
        let session = self.active_session().await?;
        let url = self.project_url(&session.project_id, method);

        tracing::debug!("POST {}", url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&session.token)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Earth Engine")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Earth Engine {} failed with status {}: {}", method, status, body);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse Earth Engine {} response", method))
    }
}

#[async_trait]
impl ImageryService for EarthEngineClient {
    async fn initialize(&self, project_id: &str) -> Result<()> {
        let token = self.tokens.access_token().await?;

        let url = self.project_url(project_id, "algorithms");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .context("Failed to reach Earth Engine")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Earth Engine rejected project '{}' ({}): {}", project_id, status, body);
        }

        *self.session.write().await = Some(ActiveSession {
            project_id: project_id.to_string(),
            token,
        });
        Ok(())
    }

    async fn authenticate(&self) -> Result<()> {
        self.tokens.login().await
    }

    async fn tile_source(&self, image: &Expr, vis: &VisParams) -> Result<TileSource> {
        let map: MapResponse = self.execute_post("maps", map_request(image, vis)).await?;
        Ok(TileSource {
            url_template: self.tile_url_template(&map.name),
            attribution: ATTRIBUTION.to_string(),
        })
    }

    async fn fetch_records(&self, features: &Expr) -> Result<Vec<RawRecord>> {
        let body = json!({ "expression": encode(features) });
        let response: ComputeValueResponse = self.execute_post("value:compute", body).await?;
        parse_feature_records(&response.result)
    }
}

fn map_request(image: &Expr, vis: &VisParams) -> Value {
    let mut options = json!({
        "ranges": [{ "min": vis.min, "max": vis.max }],
    });
    if !vis.palette.is_empty() {
        options["paletteColors"] = json!(vis.palette);
    }

    let mut body = json!({
        "expression": encode(image),
        "fileFormat": "AUTO_JPEG_PNG",
        "visualizationOptions": options,
    });
    if !vis.bands.is_empty() {
        body["bandIds"] = json!(vis.bands);
    }
    body
}

/// Read `date`/`value` properties from every feature of a feature collection.
/// Missing or null properties become `None`; numeric strings are accepted.
pub fn parse_feature_records(collection: &Value) -> Result<Vec<RawRecord>> {
    let features = collection
        .get("features")
        .and_then(Value::as_array)
        .context("Response is not a feature collection")?;

    Ok(features
        .iter()
        .map(|f| {
            let props = f.get("properties");
            let date = props.and_then(|p| p.get("date")).and_then(Value::as_str);
            let value = props.and_then(|p| p.get("value")).and_then(as_measurement);
            RawRecord::new(date, value)
        })
        .collect())
}

fn as_measurement(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feature_records() {
        let collection = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": null, "properties": { "date": "2021-01-03", "value": -7.25 } },
                { "type": "Feature", "geometry": null, "properties": { "date": "2021-01-15", "value": null } },
                { "type": "Feature", "geometry": null, "properties": { "date": "2021-02-40", "value": "1.0" } },
                { "type": "Feature", "geometry": null }
            ]
        });
        let records = parse_feature_records(&collection).unwrap();

        assert_eq!(
            records,
            vec![
                RawRecord::new(Some("2021-01-03"), Some(-7.25)),
                RawRecord::new(Some("2021-01-15"), None),
                RawRecord::new(Some("2021-02-40"), Some(1.0)),
                RawRecord::new(None, None),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_non_collection() {
        assert!(parse_feature_records(&json!({ "type": "Image" })).is_err());
    }

    #[test]
    fn test_map_request_options() {
        let image = Expr::call("Collection.first");
        let vis = VisParams::new(&["B4", "B3", "B2"], 0.0, 3000.0, &[]);
        let body = map_request(&image, &vis);

        assert_eq!(body["bandIds"], json!(["B4", "B3", "B2"]));
        assert_eq!(body["visualizationOptions"]["ranges"][0]["max"], json!(3000.0));
        assert!(body["visualizationOptions"].get("paletteColors").is_none());
        assert_eq!(body["expression"]["result"], "0");
    }

    #[test]
    fn test_urls() {
        let client = EarthEngineClient::new(
            "https://ee.test/".to_string(),
            TokenSource::new(Some("t".into()), String::new(), String::new()),
        );
        assert_eq!(
            client.project_url("my project", "maps"),
            "https://ee.test/v1/projects/my%20project/maps"
        );
        assert_eq!(
            client.tile_url_template("projects/p/maps/abc"),
            "https://ee.test/v1/projects/p/maps/abc/tiles/{z}/{x}/{y}"
        );
    }

    #[tokio::test]
    async fn test_requests_need_initialized_session() {
        let client = EarthEngineClient::new(
            "https://ee.test".to_string(),
            TokenSource::new(Some("t".into()), String::new(), String::new()),
        );
        let err = client.fetch_records(&Expr::call("Collection.map")).await.unwrap_err();
        assert!(err.to_string().contains("not initialized"));
    }
}
