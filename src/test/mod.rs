use crate::array::GeometryArray;
use crate::handle::GeometryHandle;


pub(crate) fn wkt(text: &str) -> GeometryHandle {
    GeometryHandle::from_wkt(text).unwrap()
}

pub(crate) fn point(x: f64, y: f64) -> GeometryHandle {
    GeometryHandle::point((x, y)).unwrap()
}

/// Axis-aligned square with its lower left corner at `(x, y)`.
pub(crate) fn square(x: f64, y: f64, size: f64) -> GeometryHandle {
    GeometryHandle::rectangle(x, y, x + size, y + size).unwrap()
}

pub(crate) fn points(coords: &[(f64, f64)]) -> GeometryArray {
    coords.iter().map(|(x, y)| Some(point(*x, *y))).collect()
}
