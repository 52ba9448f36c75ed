// Standalone Leaflet HTML document for a map view
use crate::domain::map_view::MapView;
use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

const LEAFLET_VERSION: &str = "1.9.4";
const BASE_TILES: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const BASE_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

pub fn render_html(view: &MapView) -> String {
    let overlays: Vec<_> = view
        .overlays
        .iter()
        .map(|l| {
            json!({
                "name": l.name,
                "url": l.source.url_template,
                "attribution": l.source.attribution,
                "opacity": l.opacity,
            })
        })
        .collect();

    let config = json!({
        "center": [view.center.lat, view.center.lon],
        "zoom": view.zoom,
        "base": { "url": BASE_TILES, "attribution": BASE_ATTRIBUTION },
        "overlays": overlays,
    });
    // Keep "</script>" inside strings from closing the script element
    let config = config.to_string().replace("</", "<\\/");

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{v}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{v}/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
const config = {config};
const map = L.map("map").setView(config.center, config.zoom);
const base = L.tileLayer(config.base.url, {{ attribution: config.base.attribution }}).addTo(map);
const overlays = {{}};
for (const o of config.overlays) {{
  overlays[o.name] = L.tileLayer(o.url, {{ attribution: o.attribution, opacity: o.opacity }}).addTo(map);
}}
L.control.layers({{ "OpenStreetMap": base }}, overlays).addTo(map);
</script>
</body>
</html>
"#,
        title = escape_html(&view.title),
        v = LEAFLET_VERSION,
        config = config,
    )
}

pub fn write_html(view: &MapView, path: &Path) -> Result<()> {
    std::fs::write(path, render_html(view))
        .with_context(|| format!("Failed to write map to {}", path.display()))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
