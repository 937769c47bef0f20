use crate::datatypes::TypeTag;
use crate::error::{GeoShapeError, Result};
use crate::handle::GeometryHandle;
use crate::scalar::LineString;

/// A collection of line strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MultiLineString(pub(crate) GeometryHandle);

super::impl_scalar!(MultiLineString, TypeTag::MultiLineString);

impl MultiLineString {
    pub fn new(lines: &[LineString]) -> Result<Self> {
        let handles = lines.iter().map(|l| l.0.clone()).collect::<Vec<_>>();
        Ok(Self(GeometryHandle::multi_line_string(&handles)?))
    }

    pub fn parts(&self) -> Result<Vec<LineString>> {
        Ok(super::ops::parts(&self.0)?
            .into_iter()
            .map(LineString)
            .collect())
    }

    pub fn part(&self, index: usize) -> Result<LineString> {
        let mut parts = self.parts()?;
        let len = parts.len();
        if index >= len {
            return Err(GeoShapeError::IndexOutOfBounds { index, len });
        }
        Ok(parts.swap_remove(index))
    }

    pub fn num_parts(&self) -> Result<usize> {
        Ok(self.parts()?.len())
    }

    /// A group of SVG polyline elements, all drawn in the color of the whole collection.
    pub fn svg(&self, scale_factor: f64, stroke_color: Option<&str>) -> Result<String> {
        if self.0.is_empty() {
            return Ok(super::svg::EMPTY.to_string());
        }
        let color = super::svg::color(&self.0, stroke_color);
        let elements = self
            .parts()?
            .iter()
            .map(|part| part.svg(scale_factor, Some(color.as_str())))
            .collect::<Result<Vec<_>>>()?;
        Ok(super::svg::group(elements))
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    use super::*;
    use crate::handle::Coord;
    use crate::scalar::GeometryOps;

    #[test]
    fn parts_and_length() {
        let a = LineString::new(&[Coord::new(0.0, 0.0), Coord::new(0.0, 2.0)]).unwrap();
        let b = LineString::new(&[Coord::new(1.0, 0.0), Coord::new(4.0, 4.0)]).unwrap();
        let multi = MultiLineString::new(&[a.clone(), b]).unwrap();
        assert_eq!(multi.num_parts().unwrap(), 2);
        assert_eq!(multi.part(0).unwrap(), a);
        assert_relative_eq!(multi.length().unwrap(), 7.0);
        assert!(multi.part(5).is_err());
    }

    #[test]
    fn svg() {
        let a = LineString::new(&[Coord::new(5.0, 8.0), Coord::new(10.0, 12.0)]).unwrap();
        let b = LineString::new(&[Coord::new(15.0, 20.0), Coord::new(30.0, 45.0)]).unwrap();
        let multi = MultiLineString::new(&[a, b]).unwrap();
        assert_eq!(
            multi.svg(2.0, Some("#ff0000")).unwrap(),
            concat!(
                r##"<g><polyline fill="none" stroke="#ff0000" stroke-width="4" points="5,8 10,12" opacity="0.8" />"##,
                r##"<polyline fill="none" stroke="#ff0000" stroke-width="4" points="15,20 30,45" opacity="0.8" /></g>"##,
            )
        );
    }
}
