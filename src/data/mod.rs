use crate::error::GeoDataError;
use crate::map::geometry::Ring;
use crate::map::RegionLayer;
use geojson::{Feature, GeoJson, Geometry, Value};
use glam::DVec2;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Feature properties that may carry the region name, in priority order
const NAME_KEYS: [&str; 4] = ["name", "st_nm", "ST_NM", "NAME_1"];

/// Load named state polygons from a GeoJSON file
pub fn load_regions(path: &Path) -> Result<RegionLayer, GeoDataError> {
    let file = File::open(path).map_err(|source| GeoDataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let geojson = GeoJson::from_reader(BufReader::new(file)).map_err(|source| GeoDataError::Parse {
        path: path.to_path_buf(),
        source: Box::new(geojson::Error::MalformedJson(source)),
    })?;

    let layer = regions_from_geojson(&geojson);
    if layer.is_empty() {
        return Err(GeoDataError::NoRegions {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!(regions = layer.len(), "loaded geodata from {}", path.display());
    Ok(layer)
}

/// Load `path`, or fall back to the built-in outline when it is unusable
pub fn load_or_outline(path: &Path) -> RegionLayer {
    match load_regions(path) {
        Ok(layer) => layer,
        Err(e) => {
            tracing::warn!(error = %e, "falling back to built-in outline; regions are keyboard-only");
            india_outline()
        }
    }
}

/// Build a region layer from parsed GeoJSON
pub fn regions_from_geojson(geojson: &GeoJson) -> RegionLayer {
    let mut layer = RegionLayer::new();
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                add_feature(&mut layer, feature);
            }
        }
        GeoJson::Feature(f) => add_feature(&mut layer, f),
        GeoJson::Geometry(geometry) => collect_lines(geometry, &mut |ring| layer.add_outline(ring)),
    }
    layer.build_index();
    layer
}

fn feature_name(feature: &Feature) -> Option<&str> {
    NAME_KEYS
        .iter()
        .find_map(|key| feature.property(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

fn add_feature(layer: &mut RegionLayer, feature: &Feature) {
    let Some(geometry) = feature.geometry.as_ref() else {
        return;
    };

    let mut rings = Vec::new();
    collect_rings(geometry, &mut rings);

    match feature_name(feature) {
        Some(name) if !rings.is_empty() => layer.add_region(name, rings),
        _ => {
            if !rings.is_empty() {
                tracing::warn!("skipping polygon feature without a name property");
            }
            // Unnamed or line features still help orient the map
            collect_lines(geometry, &mut |ring| layer.add_outline(ring));
        }
    }
}

fn to_ring(coords: &[Vec<f64>]) -> Ring {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| DVec2::new(c[0], c[1]))
        .collect()
}

/// All polygon rings (exteriors and holes) of a geometry
fn collect_rings(geometry: &Geometry, rings: &mut Vec<Ring>) {
    match &geometry.value {
        Value::Polygon(polygon) => rings.extend(polygon.iter().map(|r| to_ring(r))),
        Value::MultiPolygon(polygons) => {
            for polygon in polygons {
                rings.extend(polygon.iter().map(|r| to_ring(r)));
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_rings(g, rings);
            }
        }
        _ => {}
    }
}

/// Line features; polygons contribute their rings as closed lines
fn collect_lines<F>(geometry: &Geometry, add: &mut F)
where
    F: FnMut(Ring),
{
    match &geometry.value {
        Value::LineString(coords) => add(to_ring(coords)),
        Value::MultiLineString(lines) => lines.iter().for_each(|l| add(to_ring(l))),
        Value::Polygon(polygon) => polygon.iter().for_each(|r| add(to_ring(r))),
        Value::MultiPolygon(polygons) => polygons.iter().flatten().for_each(|r| add(to_ring(r))),
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_lines(g, add);
            }
        }
        _ => {}
    }
}

/// Simplified national outline for when no geodata file is available
pub fn india_outline() -> RegionLayer {
    const OUTLINE: [(f64, f64); 50] = [
        (68.2, 23.7), (70.0, 20.8), (72.6, 21.1), (72.8, 19.0), (73.4, 16.0),
        (74.2, 14.5), (74.9, 12.8), (75.9, 11.0), (76.3, 9.5), (77.5, 8.1),
        (78.2, 8.9), (79.3, 10.3), (79.9, 12.0), (80.3, 13.8), (80.1, 15.6),
        (81.3, 16.4), (82.4, 17.0), (84.1, 18.3), (85.1, 19.5), (86.9, 20.8),
        (87.6, 21.6), (88.9, 21.6), (89.0, 22.9), (88.6, 26.4), (89.8, 26.3),
        (92.0, 26.8), (95.3, 27.9), (97.3, 28.2), (96.0, 29.4), (94.0, 29.0),
        (91.7, 27.8), (88.8, 27.3), (88.1, 27.9), (85.0, 28.3), (81.1, 30.2),
        (79.0, 31.3), (78.8, 32.5), (79.3, 35.5), (77.8, 35.5), (74.4, 34.8),
        (73.9, 33.3), (74.6, 32.1), (74.4, 30.9), (73.4, 29.9), (71.9, 27.9),
        (70.4, 28.0), (69.5, 26.7), (70.1, 25.7), (71.0, 24.3), (68.2, 23.7),
    ];

    let mut layer = RegionLayer::new();
    layer.add_outline(OUTLINE.iter().map(|&(lon, lat)| DVec2::new(lon, lat)).collect());
    layer
}
