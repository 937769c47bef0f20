//! Read and write geometries as Well-Known Text.

use arrow_array::StringArray;
use geos::{Geom, WKTWriter};

use crate::array::{GeometryArray, ShapedArray};
use crate::error::{GeoShapeError, Result};
use crate::handle::{GeometryHandle, Validation};

/// Options for writing WKT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WktOptions {
    /// Number of decimal places; `None` writes full precision.
    pub precision: Option<u32>,

    /// Whether to trim trailing zeros.
    pub trim: bool,
}

impl Default for WktOptions {
    fn default() -> Self {
        Self {
            precision: None,
            trim: true,
        }
    }
}

impl WktOptions {
    pub fn with_precision(self, precision: u32) -> Self {
        Self {
            precision: Some(precision),
            ..self
        }
    }

    pub fn with_trim(self, trim: bool) -> Self {
        Self { trim, ..self }
    }
}

impl GeometryHandle {
    /// Parse a WKT string.
    pub fn from_wkt(wkt: &str) -> Result<Self> {
        Self::from_wkt_with_validation(wkt, Validation::Lenient)
    }

    pub fn from_wkt_with_validation(wkt: &str, validation: Validation) -> Result<Self> {
        let geom = geos::Geometry::new_from_wkt(wkt)
            .map_err(|err| GeoShapeError::Parse(format!("invalid WKT: {err}")))?;
        GeometryHandle::try_new(geom, validation)
    }

    /// Write WKT with default options.
    pub fn to_wkt(&self) -> Result<String> {
        Ok(self.as_geos().to_wkt()?)
    }

    pub fn to_wkt_with_options(&self, options: &WktOptions) -> Result<String> {
        let mut writer = WKTWriter::new()?;
        writer.set_trim(options.trim);
        if let Some(precision) = options.precision {
            writer.set_rounding_precision(precision);
        }
        Ok(writer.write(self.as_geos())?)
    }
}

/// Parse a flat sequence of optional WKT strings into a 1-d [`GeometryArray`].
pub fn from_wkt<S: AsRef<str>>(
    items: impl IntoIterator<Item = Option<S>>,
    validation: Validation,
) -> Result<GeometryArray> {
    let slots = items
        .into_iter()
        .map(|item| {
            item.map(|wkt| GeometryHandle::from_wkt_with_validation(wkt.as_ref(), validation))
                .transpose()
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(GeometryArray::from(slots))
}

/// Write every slot as WKT, keeping the array shape. Null slots stay null.
pub fn to_wkt(array: &GeometryArray) -> Result<ShapedArray<StringArray>> {
    let values = array
        .iter()
        .map(|slot| slot.map(|handle| handle.as_geos().to_wkt()).transpose())
        .collect::<std::result::Result<StringArray, geos::Error>>()?;
    Ok(ShapedArray::new(array.shape().to_vec(), values))
}
