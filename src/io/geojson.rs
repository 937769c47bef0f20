//! Convert between geometry handles and GeoJSON geometry mappings.

use geojson::{GeoJson, Position, Value};

use crate::error::{GeoShapeError, Result};
use crate::handle::{Coord, Coordinates, GeometryHandle, Validation};

fn position_to_coord(position: &Position) -> Result<Coord> {
    Coord::try_from_slice(position)
}

fn positions_to_coords(positions: &[Position]) -> Result<Vec<Coord>> {
    positions.iter().map(position_to_coord).collect()
}

fn rings_to_coords(rings: &[Vec<Position>]) -> Result<Vec<Vec<Coord>>> {
    rings.iter().map(|ring| positions_to_coords(ring)).collect()
}

/// Convert a GeoJSON geometry value into a coordinate structure.
pub fn value_to_coordinates(value: &Value) -> Result<Coordinates> {
    let coords = match value {
        Value::Point(position) if position.is_empty() => Coordinates::Point(vec![]),
        Value::Point(position) => Coordinates::Point(vec![position_to_coord(position)?]),
        Value::MultiPoint(positions) => Coordinates::MultiPoint(
            positions
                .iter()
                .map(|p| {
                    if p.is_empty() {
                        Ok(Coordinates::Point(vec![]))
                    } else {
                        Ok(Coordinates::Point(vec![position_to_coord(p)?]))
                    }
                })
                .collect::<Result<_>>()?,
        ),
        Value::LineString(positions) => Coordinates::LineString(positions_to_coords(positions)?),
        Value::MultiLineString(lines) => Coordinates::MultiLineString(
            lines
                .iter()
                .map(|line| Ok(Coordinates::LineString(positions_to_coords(line)?)))
                .collect::<Result<_>>()?,
        ),
        Value::Polygon(rings) => Coordinates::Polygon(rings_to_coords(rings)?),
        Value::MultiPolygon(polygons) => Coordinates::MultiPolygon(
            polygons
                .iter()
                .map(|rings| Ok(Coordinates::Polygon(rings_to_coords(rings)?)))
                .collect::<Result<_>>()?,
        ),
        Value::GeometryCollection(geoms) => Coordinates::GeometryCollection(
            geoms
                .iter()
                .map(|geom| value_to_coordinates(&geom.value))
                .collect::<Result<_>>()?,
        ),
    };
    Ok(coords)
}

fn coords_to_positions(coords: &[Coord]) -> Vec<Position> {
    coords.iter().map(Coord::to_vec).collect()
}

/// Convert a coordinate structure into a GeoJSON geometry value. Linear rings become line
/// strings.
pub fn coordinates_to_value(coords: &Coordinates) -> Value {
    match coords {
        Coordinates::Point(c) => Value::Point(c.first().map(Coord::to_vec).unwrap_or_default()),
        Coordinates::LineString(c) | Coordinates::LinearRing(c) => {
            Value::LineString(coords_to_positions(c))
        }
        Coordinates::Polygon(rings) => {
            Value::Polygon(rings.iter().map(|r| coords_to_positions(r)).collect())
        }
        Coordinates::MultiPoint(parts) => Value::MultiPoint(
            parts
                .iter()
                .filter_map(|part| match part {
                    // an empty member keeps its slot as an empty position
                    Coordinates::Point(c) => Some(c.first().map(Coord::to_vec).unwrap_or_default()),
                    _ => None,
                })
                .collect(),
        ),
        Coordinates::MultiLineString(parts) => Value::MultiLineString(
            parts
                .iter()
                .filter_map(|part| match part {
                    Coordinates::LineString(c) | Coordinates::LinearRing(c) => {
                        Some(coords_to_positions(c))
                    }
                    _ => None,
                })
                .collect(),
        ),
        Coordinates::MultiPolygon(parts) => Value::MultiPolygon(
            parts
                .iter()
                .filter_map(|part| match part {
                    Coordinates::Polygon(rings) => {
                        Some(rings.iter().map(|r| coords_to_positions(r)).collect())
                    }
                    _ => None,
                })
                .collect(),
        ),
        Coordinates::GeometryCollection(parts) => Value::GeometryCollection(
            parts
                .iter()
                .map(|part| geojson::Geometry::new(coordinates_to_value(part)))
                .collect(),
        ),
    }
}

impl GeometryHandle {
    /// Build a handle from a GeoJSON geometry.
    pub fn from_geojson(geometry: &geojson::Geometry) -> Result<Self> {
        Self::from_coordinates(&value_to_coordinates(&geometry.value)?, Validation::Lenient)
    }

    /// Parse GeoJSON text holding a geometry or a feature with a geometry.
    pub fn from_geojson_str(text: &str) -> Result<Self> {
        let geojson: GeoJson = text
            .parse()
            .map_err(|err: geojson::Error| GeoShapeError::Parse(err.to_string()))?;
        match geojson {
            GeoJson::Geometry(geometry) => Self::from_geojson(&geometry),
            GeoJson::Feature(feature) => match feature.geometry {
                Some(geometry) => Self::from_geojson(&geometry),
                None => Err(GeoShapeError::Parse("feature has no geometry".to_string())),
            },
            GeoJson::FeatureCollection(_) => Err(GeoShapeError::Parse(
                "expected a geometry, found a feature collection".to_string(),
            )),
        }
    }

    /// The GeoJSON representation of this geometry.
    pub fn to_geojson(&self) -> Result<geojson::Geometry> {
        Ok(geojson::Geometry::new(coordinates_to_value(
            &self.coordinates()?,
        )))
    }

    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_geojson()?)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::datatypes::TypeTag;
    use crate::test::wkt;

    #[test]
    fn parse_geometry_text() {
        let handle = GeometryHandle::from_geojson_str(
            r#"{"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}"#,
        )
        .unwrap();
        assert_eq!(handle.type_tag(), TypeTag::Polygon);
        assert_eq!(handle, wkt("POLYGON ((0 0, 1 0, 1 1, 0 0))"));
    }

    #[test]
    fn parse_feature_text() {
        let handle = GeometryHandle::from_geojson_str(
            r#"{"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [3, 4]}}"#,
        )
        .unwrap();
        assert_eq!(handle, wkt("POINT (3 4)"));
    }

    #[test]
    fn malformed_text() {
        let err = GeometryHandle::from_geojson_str(r#"{"type": "Point"}"#).unwrap_err();
        assert!(matches!(err, GeoShapeError::Parse(_)));
        let err = GeometryHandle::from_geojson_str(
            r#"{"type": "Point", "coordinates": [1, 2, 3, 4]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GeoShapeError::Dimension(_)));
    }

    #[test]
    fn round_trip() {
        for input in [
            "POINT (1 2)",
            "MULTILINESTRING ((0 0, 1 1), (2 2, 3 3))",
            "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)))",
            "GEOMETRYCOLLECTION (POINT (1 1), LINESTRING (0 0, 1 1))",
        ] {
            let handle = wkt(input);
            let geometry = handle.to_geojson().unwrap();
            assert_eq!(GeometryHandle::from_geojson(&geometry).unwrap(), handle, "{input}");
        }
    }

    #[test]
    fn malformed_line() {
        let err = GeometryHandle::from_geojson_str(
            r#"{"type": "LineString", "coordinates": [[0, 0]]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GeoShapeError::Parse(_)));
    }

    #[test]
    fn empty_multipoint_members_keep_their_slot() {
        let coords = Coordinates::MultiPoint(vec![
            Coordinates::Point(vec![]),
            Coordinates::Point(vec![Coord::new(1.0, 2.0)]),
        ]);
        let value = coordinates_to_value(&coords);
        assert_eq!(value, Value::MultiPoint(vec![vec![], vec![1.0, 2.0]]));
        assert_eq!(value_to_coordinates(&value).unwrap(), coords);
    }

    #[test]
    fn output_mapping() {
        let value = wkt("LINESTRING (0 0, 1 2)").to_geojson().unwrap().value;
        assert_eq!(
            value,
            Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 2.0]])
        );
        let json = wkt("POINT (1 2)").to_geojson_string().unwrap();
        assert!(json.contains("\"Point\""));
    }
}
