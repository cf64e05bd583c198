use crate::tensor::Tensor;

/// Handle into the flat parameter registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamId(usize);

struct Entry {
    name: String,
    tensor: Tensor,
    transform: bool,
}

/// Every trainable tensor of one model, in registration order.
///
/// The order is fixed at construction and never changes afterwards, so an
/// external optimiser can pair momentum buffers with tensors by position.
/// Transform variables are the regularised subset: convolution kernels and
/// dense weight matrices, never biases or activation slopes.
#[derive(Default)]
pub struct ParameterSet {
    entries: Vec<Entry>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, name: impl Into<String>, tensor: Tensor, transform: bool) -> ParamId {
        let id = ParamId(self.entries.len());
        self.entries.push(Entry { name: name.into(), tensor, transform });
        id
    }

    pub fn get(&self, id: ParamId) -> &Tensor {
        &self.entries[id.0].tensor
    }

    pub fn get_mut(&mut self, id: ParamId) -> &mut Tensor {
        &mut self.entries[id.0].tensor
    }

    pub fn name(&self, id: ParamId) -> &str {
        &self.entries[id.0].name
    }

    /// All trainable tensors, named, in registration order.
    pub fn trainable(&self) -> Vec<(&str, &Tensor)> {
        self.entries.iter().map(|e| (e.name.as_str(), &e.tensor)).collect()
    }

    /// Mutable variant for the optimiser's update step.
    pub fn trainable_mut(&mut self) -> Vec<(&str, &mut Tensor)> {
        self.entries.iter_mut().map(|e| (e.name.as_str(), &mut e.tensor)).collect()
    }

    /// The regularised subset, in registration order.
    pub fn transform_variables(&self) -> Vec<(&str, &Tensor)> {
        self.entries.iter().filter(|e| e.transform).map(|e| (e.name.as_str(), &e.tensor)).collect()
    }

    pub fn num_params(&self) -> usize {
        self.entries.iter().map(|e| e.tensor.shape().size()).sum()
    }
}
