// Query builder - Turns query parameters into server-side expressions
use crate::domain::expression::Expr;
use crate::domain::geometry::Geometry;
use crate::domain::query::{BandSelection, DateRange, Operator, QueryParameters};
use crate::domain::study_area::POLARISATION_PROPERTY;

const IMAGE_VAR: &str = "_MAPPING_VAR_0_0";
const SERIES_DATE_FORMAT: &str = "YYYY-MM-dd";

/// Build the expression for `params`. Nothing is validated locally; bad dates or
/// geometries surface as empty or failed results from the service.
pub fn build(params: &QueryParameters) -> Expr {
    let collection = filtered_collection(params);

    match &params.operator {
        Operator::LeastCloudyFirst { property } => {
            let sorted = Expr::call("Collection.limit")
                .arg("collection", collection)
                .arg("key", property.as_str())
                .arg("ascending", true);
            Expr::call("Collection.first").arg("collection", sorted)
        }
        Operator::Mean => Expr::call("reduce.mean").arg("collection", collection),
        Operator::RegionMean { scale } => {
            let band = params.bands.band_names().into_iter().next().unwrap_or_default();
            map_images(collection, point_feature(&params.geometry, &band, *scale))
        }
    }
}

/// `later - earlier`, clipped to `region`.
pub fn difference(later: Expr, earlier: Expr, region: &Geometry) -> Expr {
    let diff = Expr::call("Image.subtract")
        .arg("image1", later)
        .arg("image2", earlier);
    Expr::call("Image.clip")
        .arg("input", diff)
        .arg("geometry", geometry(region))
}

/// Mean composites for `earlier` and `later` ranges of the same query, differenced
/// and clipped to the query geometry.
pub fn change_between(params: &QueryParameters, earlier: DateRange, later: DateRange) -> Expr {
    let params = QueryParameters {
        operator: Operator::Mean,
        ..params.clone()
    };
    difference(
        build(&params.with_date_range(later)),
        build(&params.with_date_range(earlier)),
        &params.geometry,
    )
}

pub fn geometry(g: &Geometry) -> Expr {
    let constructor = match g {
        Geometry::Point(_) => "GeometryConstructors.Point",
        Geometry::Rectangle { .. } => "GeometryConstructors.Rectangle",
    };
    Expr::call(constructor).arg("coordinates", Expr::constant(g.coordinates()))
}

fn filtered_collection(params: &QueryParameters) -> Expr {
    let mut collection = Expr::call("ImageCollection.load").arg("id", params.collection.as_str());

    collection = filter(
        collection,
        Expr::call("Filter.intersects")
            .arg("leftField", ".all")
            .arg("rightValue", geometry(&params.geometry)),
    );
    collection = filter(collection, date_filter(&params.date_range));

    if let BandSelection::Polarisation { polarisation, .. } = &params.bands {
        collection = filter(
            collection,
            Expr::call("Filter.listContains")
                .arg("leftField", POLARISATION_PROPERTY)
                .arg("rightValue", polarisation.as_str()),
        );
    }

    match &params.operator {
        // Band choice is applied at visualization time for single images
        Operator::LeastCloudyFirst { .. } => collection,
        _ => select_bands(collection, &params.bands.band_names()),
    }
}

fn filter(collection: Expr, f: Expr) -> Expr {
    Expr::call("Collection.filter")
        .arg("collection", collection)
        .arg("filter", f)
}

fn date_filter(range: &DateRange) -> Expr {
    let start = range.start.format("%Y-%m-%d").to_string();
    let end = range.exclusive_end().format("%Y-%m-%d").to_string();
    let date_range = Expr::call("DateRange")
        .arg("start", start.as_str())
        .arg("end", end.as_str());
    Expr::call("Filter.dateRangeContains")
        .arg("leftValue", date_range)
        .arg("rightField", "system:time_start")
}

fn select_bands(collection: Expr, bands: &[String]) -> Expr {
    let select = Expr::call("Image.select")
        .arg("input", Expr::argument(IMAGE_VAR))
        .arg("bandSelectors", Expr::constant(bands.to_vec()));
    map_images(collection, select)
}

fn map_images(collection: Expr, body: Expr) -> Expr {
    Expr::call("Collection.map")
        .arg("collection", collection)
        .arg("baseAlgorithm", Expr::function(&[IMAGE_VAR], body))
}

/// One feature per image with `date` and `value` (mean of `band` over `region`).
fn point_feature(region: &Geometry, band: &str, scale: f64) -> Expr {
    let image = Expr::argument(IMAGE_VAR);
    let stats = Expr::call("Image.reduceRegion")
        .arg("image", image.clone())
        .arg("reducer", Expr::call("Reducer.mean"))
        .arg("geometry", geometry(region))
        .arg("scale", scale);
    let date = Expr::call("Date.format")
        .arg("date", Expr::call("Image.date").arg("image", image))
        .arg("format", SERIES_DATE_FORMAT);
    let value = Expr::call("Dictionary.get")
        .arg("dictionary", stats)
        .arg("key", band);

    Expr::call("Feature")
        .arg("geometry", Expr::Constant(serde_json::Value::Null))
        .arg("metadata", Expr::dictionary([("date", date), ("value", value)]))
}
