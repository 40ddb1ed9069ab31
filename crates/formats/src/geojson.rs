use foundation::geo::LonLat;
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(LonLat),
    Polygon(Vec<Vec<LonLat>>),
    MultiPolygon(Vec<Vec<Vec<LonLat>>>),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => GeometryKind::Polygon,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    Polygon,
}

/// One GeoJSON feature: literal geometry plus its untyped property record.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    pub id: Option<String>,
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

impl GeoFeature {
    pub fn new(geometry: Geometry, properties: Map<String, Value>) -> Self {
        Self {
            id: None,
            geometry,
            properties,
        }
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(Value::as_f64)
    }

    /// Current City Stress Index; a missing value reads as 0.
    pub fn csi_current(&self) -> f64 {
        self.number("csi_current").unwrap_or(0.0)
    }

    pub fn csi_scenario(&self) -> Option<f64> {
        self.number("csi_scenario")
    }

    /// Grid cell identifier: the `id` property, else the feature-level id.
    pub fn cell_id(&self) -> Option<String> {
        match self.properties.get("id") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => self.id.clone(),
        }
    }
}

/// Ordered features of one semantic category (grid cells, trees, planting sites).
///
/// Ordering contract:
/// - Feature order is preserved from the source document and serves as the
///   stable index for sampling and picking.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    pub features: Vec<GeoFeature>,
}

#[derive(Debug)]
pub enum GeoJsonError {
    Json(serde_json::Error),
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for GeoJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoJsonError::Json(e) => write!(f, "JSON parse error: {e}"),
            GeoJsonError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            GeoJsonError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for GeoJsonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeoJsonError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl FeatureCollection {
    pub fn new(features: Vec<GeoFeature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GeoFeature> {
        self.features.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeoFeature> {
        self.features.iter()
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, GeoJsonError> {
        let value: Value = serde_json::from_str(payload).map_err(GeoJsonError::Json)?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, GeoJsonError> {
        let obj = value.as_object().ok_or(GeoJsonError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or(GeoJsonError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(GeoJsonError::NotAFeatureCollection);
        }

        let features_val = obj
            .get("features")
            .and_then(Value::as_array)
            .ok_or(GeoJsonError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(features_val.len());
        let mut skipped = 0usize;
        for (index, feat_val) in features_val.iter().enumerate() {
            match parse_feature(feat_val) {
                Ok(Some(feature)) => features.push(feature),
                Ok(None) => skipped += 1,
                Err(reason) => return Err(GeoJsonError::InvalidFeature { index, reason }),
            }
        }
        if skipped > 0 {
            debug!(skipped, kept = features.len(), "skipped features without drawable geometry");
        }

        Ok(Self { features })
    }

    /// Emits a GeoJSON FeatureCollection. Property ordering follows the map's
    /// iteration order, not necessarily the original document's.
    pub fn to_geojson_value(&self) -> Value {
        let mut root = Map::new();
        root.insert(
            "type".to_string(),
            Value::String("FeatureCollection".to_string()),
        );

        let features = self.features.iter().map(feature_to_value).collect();
        root.insert("features".to_string(), Value::Array(features));
        Value::Object(root)
    }

    pub fn to_geojson_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_geojson_value())
    }
}

impl FromIterator<GeoFeature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = GeoFeature>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// `Ok(None)` for features with null, missing or non-drawable geometry.
fn parse_feature(value: &Value) -> Result<Option<GeoFeature>, String> {
    let obj = value
        .as_object()
        .ok_or("feature must be an object".to_string())?;

    let ty = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or("feature missing type".to_string())?;
    if ty != "Feature" {
        return Err(format!("unexpected feature type: {ty}"));
    }

    let id = match obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let properties = obj
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let geometry = match obj.get("geometry") {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => parse_geometry(value)?,
    };

    Ok(geometry.map(|geometry| GeoFeature {
        id,
        geometry,
        properties,
    }))
}

/// `Ok(None)` for geometry types no layer draws (lines, collections).
fn parse_geometry(value: &Value) -> Result<Option<Geometry>, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or("geometry missing type".to_string())?;
    if !matches!(ty, "Point" | "Polygon" | "MultiPolygon") {
        return Ok(None);
    }
    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Point" => Ok(Some(Geometry::Point(parse_position(coords)?))),
        "Polygon" => Ok(Some(Geometry::Polygon(parse_rings(coords)?))),
        "MultiPolygon" => {
            let polys = coords
                .as_array()
                .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
            let mut out = Vec::with_capacity(polys.len());
            for poly in polys {
                out.push(parse_rings(poly)?);
            }
            Ok(Some(Geometry::MultiPolygon(out)))
        }
        _ => Ok(None),
    }
}

fn parse_position(coords: &Value) -> Result<LonLat, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok(LonLat::new(lon, lat))
}

fn parse_rings(coords: &Value) -> Result<Vec<Vec<LonLat>>, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    let mut out = Vec::with_capacity(rings.len());
    for ring in rings {
        let positions = ring
            .as_array()
            .ok_or("ring must be an array of positions".to_string())?;
        let mut pts = Vec::with_capacity(positions.len());
        for p in positions {
            pts.push(parse_position(p)?);
        }
        out.push(pts);
    }
    Ok(out)
}

fn feature_to_value(feat: &GeoFeature) -> Value {
    let mut obj = Map::new();
    obj.insert("type".to_string(), Value::String("Feature".to_string()));
    if let Some(id) = &feat.id {
        obj.insert("id".to_string(), Value::String(id.clone()));
    }
    obj.insert(
        "properties".to_string(),
        Value::Object(feat.properties.clone()),
    );
    obj.insert("geometry".to_string(), geometry_to_value(&feat.geometry));
    Value::Object(obj)
}

fn geometry_to_value(geom: &Geometry) -> Value {
    let (ty, coords) = match geom {
        Geometry::Point(p) => ("Point", position_value(p)),
        Geometry::Polygon(rings) => ("Polygon", rings_value(rings)),
        Geometry::MultiPolygon(polys) => (
            "MultiPolygon",
            Value::Array(polys.iter().map(|rings| rings_value(rings)).collect()),
        ),
    };
    let mut obj = Map::new();
    obj.insert("type".to_string(), Value::String(ty.to_string()));
    obj.insert("coordinates".to_string(), coords);
    Value::Object(obj)
}

fn position_value(p: &LonLat) -> Value {
    Value::Array(vec![Value::from(p.lon_deg), Value::from(p.lat_deg)])
}

fn rings_value(rings: &[Vec<LonLat>]) -> Value {
    Value::Array(
        rings
            .iter()
            .map(|ring| Value::Array(ring.iter().map(position_value).collect()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::{FeatureCollection, GeoJsonError, Geometry, GeometryKind};
    use pretty_assertions::assert_eq;

    const SAMPLE_GRID: &str = include_str!("../assets/sample_grid.geojson");

    #[test]
    fn parses_sample_grid_cells() {
        let grid = FeatureCollection::from_geojson_str(SAMPLE_GRID).expect("parse grid");
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.features[0].geometry.kind(), GeometryKind::Polygon);
        assert_eq!(grid.features[0].cell_id().as_deref(), Some("cell_0001"));
        assert_eq!(grid.features[1].csi_current(), 75.0);
        assert_eq!(grid.features[2].csi_scenario(), Some(82.5));
    }

    #[test]
    fn missing_csi_reads_as_zero() {
        let payload = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[-73.5,45.5]}}
        ]}"#;
        let trees = FeatureCollection::from_geojson_str(payload).expect("parse");
        assert_eq!(trees.features[0].csi_current(), 0.0);
        assert_eq!(trees.features[0].csi_scenario(), None);
        assert!(matches!(trees.features[0].geometry, Geometry::Point(_)));
    }

    #[test]
    fn rejects_non_collection_and_reports_feature_index() {
        let err = FeatureCollection::from_geojson_str(r#"{"type":"Feature"}"#).unwrap_err();
        assert!(matches!(err, GeoJsonError::NotAFeatureCollection));

        let payload = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[1,2]}},
            {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":["x",2]}}
        ]}"#;
        let err = FeatureCollection::from_geojson_str(payload).unwrap_err();
        assert!(matches!(err, GeoJsonError::InvalidFeature { index: 1, .. }));
        assert!(err.to_string().contains("lon must be a number"));
    }

    #[test]
    fn features_without_drawable_geometry_are_skipped() {
        let payload = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","id":"t1","properties":{},"geometry":{"type":"Point","coordinates":[-73.5,45.5]}},
            {"type":"Feature","id":"t2","properties":{},"geometry":null},
            {"type":"Feature","id":"t3","properties":{}},
            {"type":"Feature","id":"t4","properties":{},"geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]}},
            {"type":"Feature","id":"t5","properties":{},"geometry":{"type":"GeometryCollection","geometries":[]}},
            {"type":"Feature","id":"t6","properties":{},"geometry":{"type":"Point","coordinates":[-73.6,45.6]}}
        ]}"#;
        let trees = FeatureCollection::from_geojson_str(payload).expect("parse");
        let ids: Vec<_> = trees.iter().filter_map(|f| f.id.clone()).collect();
        assert_eq!(ids, vec!["t1", "t6"]);
    }

    #[test]
    fn reemitted_document_parses_to_same_collection() {
        let grid = FeatureCollection::from_geojson_str(SAMPLE_GRID).expect("parse grid");
        let text = grid.to_geojson_string().expect("serialize");
        let again = FeatureCollection::from_geojson_str(&text).expect("reparse");
        assert_eq!(grid, again);
    }
}
