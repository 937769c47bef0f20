use arrow_array::{Array, BooleanArray, Float64Array, StringArray};
use ndarray::{ArrayD, IxDyn};

use crate::error::Result;

/// A flat Arrow array of results together with the n-dimensional shape it represents.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedArray<A> {
    shape: Vec<usize>,
    values: A,
}

impl<A: Array> ShapedArray<A> {
    pub fn new(shape: Vec<usize>, values: A) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), values.len());
        Self { shape, values }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn values(&self) -> &A {
        &self.values
    }

    pub fn into_inner(self) -> A {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.null_count()
    }
}

impl ShapedArray<BooleanArray> {
    pub fn to_ndarray(&self) -> Result<ArrayD<Option<bool>>> {
        Ok(ArrayD::from_shape_vec(
            IxDyn(&self.shape),
            self.values.iter().collect(),
        )?)
    }
}

impl ShapedArray<Float64Array> {
    pub fn to_ndarray(&self) -> Result<ArrayD<Option<f64>>> {
        Ok(ArrayD::from_shape_vec(
            IxDyn(&self.shape),
            self.values.iter().collect(),
        )?)
    }
}

impl ShapedArray<StringArray> {
    pub fn to_ndarray(&self) -> Result<ArrayD<Option<String>>> {
        Ok(ArrayD::from_shape_vec(
            IxDyn(&self.shape),
            self.values
                .iter()
                .map(|value| value.map(str::to_string))
                .collect(),
        )?)
    }
}

#[cfg(test)]
mod test {
    use ndarray::arr2;

    use super::*;

    #[test]
    fn boolean_to_ndarray() {
        let shaped = ShapedArray::new(
            vec![2, 2],
            BooleanArray::from(vec![Some(true), None, Some(false), Some(true)]),
        );
        assert_eq!(shaped.null_count(), 1);
        assert_eq!(
            shaped.to_ndarray().unwrap(),
            arr2(&[[Some(true), None], [Some(false), Some(true)]]).into_dyn()
        );
    }

    #[test]
    fn scalar_shape() {
        let shaped = ShapedArray::new(vec![], Float64Array::from(vec![1.5]));
        let nd = shaped.to_ndarray().unwrap();
        assert_eq!(nd.ndim(), 0);
        assert_eq!(nd.first(), Some(&Some(1.5)));
    }
}
