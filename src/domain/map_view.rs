// Map view domain model
use super::geometry::LonLat;

/// Visualization applied server-side when the service renders tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct VisParams {
    pub bands: Vec<String>,
    pub min: f64,
    pub max: f64,
    pub palette: Vec<String>,
}

impl VisParams {
    pub fn new(bands: &[&str], min: f64, max: f64, palette: &[&str]) -> Self {
        Self {
            bands: bands.iter().map(|s| s.to_string()).collect(),
            min,
            max,
            palette: palette.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Where to fetch rendered tiles from; no pixel data lives here.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSource {
    pub url_template: String,
    pub attribution: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub name: String,
    pub source: TileSource,
    pub opacity: f64,
}

impl TileLayer {
    pub fn new(name: &str, source: TileSource, opacity: f64) -> Self {
        Self {
            name: name.to_string(),
            source,
            opacity: opacity.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub title: String,
    pub center: LonLat,
    pub zoom: u8,
    pub overlays: Vec<TileLayer>,
}

impl MapView {
    pub fn new(title: &str, center: LonLat, zoom: u8) -> Self {
        Self {
            title: title.to_string(),
            center,
            zoom,
            overlays: Vec::new(),
        }
    }

    pub fn with_overlay(mut self, layer: TileLayer) -> Self {
        self.overlays.push(layer);
        self
    }
}
