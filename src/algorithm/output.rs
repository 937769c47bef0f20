//! Results of batch calls: values plus the per-element failures of lenient calls.

use arrow_array::{BooleanArray, Float64Array, StringArray};

use crate::array::{unravel_index, GeometryArray, ShapedArray};
use crate::error::{GeoShapeError, Result};

/// One element that failed during a lenient call. Its output slot is null.
#[derive(Debug)]
pub struct ElementFailure {
    /// Flat row-major index into the output.
    pub index: usize,
    /// Index into the output along each axis.
    pub multi_index: Vec<usize>,
    pub error: GeoShapeError,
}

/// Every element failure of a lenient call, in output order.
#[derive(Debug, Default)]
pub struct BatchErrors {
    failures: Vec<ElementFailure>,
}

impl BatchErrors {
    pub(crate) fn push(&mut self, index: usize, shape: &[usize], error: GeoShapeError) {
        self.failures.push(ElementFailure {
            index,
            multi_index: unravel_index(index, shape),
            error,
        });
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ElementFailure> {
        self.failures.iter()
    }

    /// Flat indices of every failed element.
    pub fn indices(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.index).collect()
    }

    /// Turn the first failure into an error, if any.
    pub fn into_result(self) -> Result<()> {
        match self.failures.into_iter().next() {
            None => Ok(()),
            Some(failure) => Err(GeoShapeError::Element {
                index: failure.index,
                source: Box::new(failure.error),
            }),
        }
    }
}

impl IntoIterator for BatchErrors {
    type Item = ElementFailure;
    type IntoIter = std::vec::IntoIter<ElementFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}

/// The constituents of every element of a collection array, flattened.
#[derive(Debug, Clone, PartialEq)]
pub struct Exploded {
    /// All parts, one-dimensional, in input order.
    pub parts: GeometryArray,
    /// For each part, the flat index of the input element it came from.
    pub source_index: Vec<usize>,
}

impl Exploded {
    /// The parts of the input element at flat index `index`.
    pub fn parts_of(&self, index: usize) -> impl Iterator<Item = &crate::handle::GeometryHandle> {
        self.source_index
            .iter()
            .zip(self.parts.slots())
            .filter(move |(source, _)| **source == index)
            .filter_map(|(_, part)| part.as_ref())
    }
}

/// The values of a batch call, by output kind.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchValues {
    Geometry(GeometryArray),
    Boolean(ShapedArray<BooleanArray>),
    Number(ShapedArray<Float64Array>),
    Text(ShapedArray<StringArray>),
    Parts(Exploded),
}

impl BatchValues {
    fn kind_name(&self) -> &'static str {
        match self {
            BatchValues::Geometry(_) => "geometry",
            BatchValues::Boolean(_) => "boolean",
            BatchValues::Number(_) => "number",
            BatchValues::Text(_) => "text",
            BatchValues::Parts(_) => "parts",
        }
    }

    fn mismatch(&self, expected: &str) -> GeoShapeError {
        GeoShapeError::IncorrectType(
            format!("expected {expected} output, got {}", self.kind_name()).into(),
        )
    }

    pub fn into_geometry(self) -> Result<GeometryArray> {
        match self {
            BatchValues::Geometry(arr) => Ok(arr),
            other => Err(other.mismatch("geometry")),
        }
    }

    pub fn into_boolean(self) -> Result<ShapedArray<BooleanArray>> {
        match self {
            BatchValues::Boolean(arr) => Ok(arr),
            other => Err(other.mismatch("boolean")),
        }
    }

    pub fn into_number(self) -> Result<ShapedArray<Float64Array>> {
        match self {
            BatchValues::Number(arr) => Ok(arr),
            other => Err(other.mismatch("number")),
        }
    }

    pub fn into_text(self) -> Result<ShapedArray<StringArray>> {
        match self {
            BatchValues::Text(arr) => Ok(arr),
            other => Err(other.mismatch("text")),
        }
    }

    pub fn into_parts(self) -> Result<Exploded> {
        match self {
            BatchValues::Parts(parts) => Ok(parts),
            other => Err(other.mismatch("parts")),
        }
    }
}

/// The result of a batch call: output values, with failed elements set to null and
/// listed in `errors`.
#[derive(Debug)]
pub struct BatchOutput<T = BatchValues> {
    pub values: T,
    pub errors: BatchErrors,
}

impl<T> BatchOutput<T> {
    /// Convert the values, keeping the errors.
    pub fn map<U>(self, f: impl FnOnce(T) -> Result<U>) -> Result<BatchOutput<U>> {
        Ok(BatchOutput {
            values: f(self.values)?,
            errors: self.errors,
        })
    }

    /// The values if no element failed, otherwise the first failure.
    pub fn into_result(self) -> Result<T> {
        self.errors.into_result()?;
        Ok(self.values)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn errors_keep_multi_index() {
        let mut errors = BatchErrors::default();
        errors.push(4, &[2, 3], GeoShapeError::General("boom".to_string()));
        let failure = errors.iter().next().unwrap();
        assert_eq!(failure.multi_index, vec![1, 1]);
        assert_eq!(errors.indices(), vec![4]);
        assert!(matches!(
            errors.into_result(),
            Err(GeoShapeError::Element { index: 4, .. })
        ));
    }

    #[test]
    fn value_kind_mismatch() {
        let values = BatchValues::Number(ShapedArray::new(vec![1], Float64Array::from(vec![1.0])));
        assert!(values.clone().into_number().is_ok());
        assert!(matches!(
            values.into_boolean(),
            Err(GeoShapeError::IncorrectType(_))
        ));
    }
}
