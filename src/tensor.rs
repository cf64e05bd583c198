use crate::{rng, shape::Shape};

/// A single trainable tensor: flat row-major storage plus its shape.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    shape: Shape,
    data: Vec<f32>,
}

impl Tensor {
    pub fn zeroed(shape: Shape) -> Self {
        Self { shape, data: vec![0.0; shape.size()] }
    }

    /// Truncated-normal initialisation with stddev = sqrt(2 / fan_in).
    pub fn fan_in_scaled(shape: Shape, fan_in: usize) -> Self {
        Self { shape, data: rng::fan_in_scaled(shape.size(), fan_in) }
    }

    pub fn from_slice(shape: Shape, values: &[f32]) -> Self {
        assert_eq!(shape.size(), values.len(), "Value count does not match {shape}!");
        Self { shape, data: values.to_vec() }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn values(&self) -> &[f32] {
        &self.data
    }

    /// Mutable view for the external optimiser; the shape itself is fixed
    /// for the life of the model.
    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }
}
