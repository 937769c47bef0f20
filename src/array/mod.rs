//! Shaped arrays of geometry handles and of operation results.

pub use shaped::ShapedArray;

mod shaped;

use ndarray::{ArrayD, ErrorKind, IxDyn, ShapeError};

use crate::datatypes::TypeTag;
use crate::error::{GeoShapeError, Result};
use crate::handle::GeometryHandle;

/// Row-major product of a shape. The empty shape is a scalar with one element.
pub(crate) fn shape_len(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Convert a flat row-major index into a multi-dimensional index.
pub(crate) fn unravel_index(mut index: usize, shape: &[usize]) -> Vec<usize> {
    let mut multi = vec![0; shape.len()];
    for (axis, dim) in shape.iter().enumerate().rev() {
        if *dim == 0 {
            continue;
        }
        multi[axis] = index % dim;
        index /= dim;
    }
    multi
}

/// An n-dimensional, row-major array of nullable geometry handles.
///
/// A null slot means the value is missing. It is never the same thing as an invalid
/// geometry. Slots may alias the same handle.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryArray {
    shape: Vec<usize>,
    slots: Vec<Option<GeometryHandle>>,
}

impl GeometryArray {
    /// Create a new array, checking that the number of slots matches the shape.
    pub fn try_new(shape: Vec<usize>, slots: Vec<Option<GeometryHandle>>) -> Result<Self> {
        if shape_len(&shape) != slots.len() {
            return Err(ShapeError::from_kind(ErrorKind::IncompatibleShape).into());
        }
        Ok(Self { shape, slots })
    }

    /// A zero-dimensional array holding one slot.
    pub fn scalar(slot: Option<GeometryHandle>) -> Self {
        Self {
            shape: vec![],
            slots: vec![slot],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    /// Access a slot by its flat row-major index.
    pub fn get(&self, index: usize) -> Result<Option<&GeometryHandle>> {
        self.slots
            .get(index)
            .map(Option::as_ref)
            .ok_or(GeoShapeError::IndexOutOfBounds {
                index,
                len: self.slots.len(),
            })
    }

    /// Access a slot by its multi-dimensional index.
    pub fn get_nd(&self, index: &[usize]) -> Result<Option<&GeometryHandle>> {
        if index.len() != self.shape.len() {
            return Err(GeoShapeError::Dimension(format!(
                "expected an index with {} axes, got {}",
                self.shape.len(),
                index.len()
            )));
        }
        let mut flat = 0;
        for (i, dim) in index.iter().zip(&self.shape) {
            if i >= dim {
                return Err(GeoShapeError::IndexOutOfBounds {
                    index: *i,
                    len: *dim,
                });
            }
            flat = flat * dim + i;
        }
        self.get(flat)
    }

    /// Replace the slot at `index`, returning the previous value. Handles are immutable,
    /// so this is the only way to change an array's content.
    pub fn replace(
        &mut self,
        index: usize,
        slot: Option<GeometryHandle>,
    ) -> Result<Option<GeometryHandle>> {
        let len = self.slots.len();
        let target = self
            .slots
            .get_mut(index)
            .ok_or(GeoShapeError::IndexOutOfBounds { index, len })?;
        Ok(std::mem::replace(target, slot))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Option<&GeometryHandle>> + '_ {
        self.slots.iter().map(Option::as_ref)
    }

    pub fn slots(&self) -> &[Option<GeometryHandle>] {
        &self.slots
    }

    pub fn into_slots(self) -> Vec<Option<GeometryHandle>> {
        self.slots
    }

    /// Give the same slots a new shape with the same number of elements.
    pub fn reshape(self, shape: Vec<usize>) -> Result<Self> {
        Self::try_new(shape, self.slots)
    }

    /// The kind tag of every slot, `None` for null slots.
    pub fn type_tags(&self) -> Vec<Option<TypeTag>> {
        self.iter().map(|slot| slot.map(GeometryHandle::type_tag)).collect()
    }

    pub fn to_ndarray(&self) -> Result<ArrayD<Option<GeometryHandle>>> {
        Ok(ArrayD::from_shape_vec(
            IxDyn(&self.shape),
            self.slots.clone(),
        )?)
    }

    pub fn into_ndarray(self) -> Result<ArrayD<Option<GeometryHandle>>> {
        Ok(ArrayD::from_shape_vec(IxDyn(&self.shape), self.slots)?)
    }
}

impl From<Vec<Option<GeometryHandle>>> for GeometryArray {
    fn from(slots: Vec<Option<GeometryHandle>>) -> Self {
        Self {
            shape: vec![slots.len()],
            slots,
        }
    }
}

impl From<Vec<GeometryHandle>> for GeometryArray {
    fn from(handles: Vec<GeometryHandle>) -> Self {
        handles.into_iter().map(Some).collect()
    }
}

impl From<GeometryHandle> for GeometryArray {
    fn from(handle: GeometryHandle) -> Self {
        Self::scalar(Some(handle))
    }
}

impl FromIterator<Option<GeometryHandle>> for GeometryArray {
    fn from_iter<T: IntoIterator<Item = Option<GeometryHandle>>>(iter: T) -> Self {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}

impl From<ArrayD<Option<GeometryHandle>>> for GeometryArray {
    fn from(arr: ArrayD<Option<GeometryHandle>>) -> Self {
        // The raw buffer can still hold sliced-away elements.
        let shape = arr.shape().to_vec();
        let slots = arr.iter().cloned().collect();
        Self { shape, slots }
    }
}
