// Geometry domain model (longitude/latitude in degrees)

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Point(LonLat),
    /// Axis-aligned rectangle given by its south-west and north-east corners
    Rectangle { min: LonLat, max: LonLat },
}

impl Geometry {
    pub const fn point(lon: f64, lat: f64) -> Self {
        Geometry::Point(LonLat::new(lon, lat))
    }

    pub const fn rectangle(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Geometry::Rectangle {
            min: LonLat::new(min_lon, min_lat),
            max: LonLat::new(max_lon, max_lat),
        }
    }

    pub fn center(&self) -> LonLat {
        match self {
            Geometry::Point(p) => *p,
            Geometry::Rectangle { min, max } => {
                LonLat::new((min.lon + max.lon) / 2.0, (min.lat + max.lat) / 2.0)
            }
        }
    }

    /// Flat coordinate list in the order the imagery service expects:
    /// `[lon, lat]` for points, `[min_lon, min_lat, max_lon, max_lat]` for rectangles.
    pub fn coordinates(&self) -> Vec<f64> {
        match self {
            Geometry::Point(p) => vec![p.lon, p.lat],
            Geometry::Rectangle { min, max } => vec![min.lon, min.lat, max.lon, max.lat],
        }
    }
}
