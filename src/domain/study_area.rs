// Fixed study areas and products around Chiyoda, Tokyo
use super::geometry::Geometry;

pub const SENTINEL2_SR: &str = "COPERNICUS/S2_SR_HARMONIZED";
pub const SENTINEL1_GRD: &str = "COPERNICUS/S1_GRD";

pub const CLOUD_PROPERTY: &str = "CLOUDY_PIXEL_PERCENTAGE";
pub const POLARISATION_PROPERTY: &str = "transmitterReceiverPolarisation";

/// Central Chiyoda
pub const CHIYODA_POINT: Geometry = Geometry::point(139.75, 35.68);

/// Rectangle around Uchikanda
pub const CHIYODA_BOUNDS: Geometry = Geometry::rectangle(139.73, 35.66, 139.78, 35.71);

/// Take Building, Uchikanda 2-11-6
pub const TAKE_BUILDING: Geometry = Geometry::point(139.7686, 35.6915);

pub const POINT_SCALE_METRES: f64 = 10.0;
