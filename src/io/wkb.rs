//! Read and write geometries as Well-Known Binary, including Arrow binary arrays.

use arrow_array::{Array, GenericBinaryArray, OffsetSizeTrait};
use geos::{OutputDimension, WKBWriter};

use crate::array::{GeometryArray, ShapedArray};
use crate::datatypes::Dimension;
use crate::error::{GeoShapeError, Result};
use crate::handle::{GeometryHandle, Validation};

impl GeometryHandle {
    /// Parse a WKB buffer.
    pub fn from_wkb(wkb: &[u8]) -> Result<Self> {
        Self::from_wkb_with_validation(wkb, Validation::Lenient)
    }

    pub fn from_wkb_with_validation(wkb: &[u8], validation: Validation) -> Result<Self> {
        let geom = geos::Geometry::new_from_wkb(wkb)
            .map_err(|err| GeoShapeError::Parse(format!("invalid WKB: {err}")))?;
        GeometryHandle::try_new(geom, validation)
    }

    /// Write ISO WKB, keeping the z dimension if present.
    pub fn to_wkb(&self) -> Result<Vec<u8>> {
        let mut writer = WKBWriter::new()?;
        if self.dimension() == Dimension::XYZ {
            writer.set_output_dimension(OutputDimension::ThreeD);
        }
        let buf = writer.write_wkb(self.as_geos())?;
        Ok(AsRef::<[u8]>::as_ref(&buf).to_vec())
    }
}

/// Parse an Arrow binary array of WKB into a 1-d [`GeometryArray`]. Null entries stay null.
pub fn from_wkb<O: OffsetSizeTrait>(
    arr: &GenericBinaryArray<O>,
    validation: Validation,
) -> Result<GeometryArray> {
    let slots = arr
        .iter()
        .map(|item| {
            item.map(|buf| GeometryHandle::from_wkb_with_validation(buf, validation))
                .transpose()
        })
        .collect::<Result<Vec<_>>>()?;
    debug_assert_eq!(slots.len(), arr.len());
    Ok(GeometryArray::from(slots))
}

/// Write every slot as WKB. The output is flattened in row-major order; its shape is kept
/// alongside.
pub fn to_wkb<O: OffsetSizeTrait>(
    array: &GeometryArray,
) -> Result<ShapedArray<GenericBinaryArray<O>>> {
    let buffers = array
        .iter()
        .map(|slot| slot.map(GeometryHandle::to_wkb).transpose())
        .collect::<Result<Vec<_>>>()?;
    let values = GenericBinaryArray::<O>::from_iter(buffers);
    Ok(ShapedArray::new(array.shape().to_vec(), values))
}
