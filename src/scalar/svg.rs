//! SVG fragments for point and line geometries.

use crate::handle::GeometryHandle;

pub(crate) const EMPTY: &str = "<g />";

/// `color`, or green for valid and red for invalid geometries.
pub(crate) fn color(handle: &GeometryHandle, color: Option<&str>) -> String {
    match color {
        Some(color) => color.to_string(),
        None if handle.is_valid() => "#66cc99".to_string(),
        None => "#ff3333".to_string(),
    }
}

pub(crate) fn group(elements: impl IntoIterator<Item = String>) -> String {
    let mut out = String::from("<g>");
    out.extend(elements);
    out.push_str("</g>");
    out
}
