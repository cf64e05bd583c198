use log::debug;

use crate::{
    config::NetworkConfig,
    error::{ModelError, ShapeError},
    layers::{Affine, Conv2d},
    loss::{self, LossOutput},
    ops,
    params::ParameterSet,
    planes::{FeatureEncoder, InputBatch},
    shape::PlaneShape,
    tensor::Tensor,
};

const TRUNK_NAMES: [&str; 3] = ["conv1", "conv2", "conv3"];

/// Reduces trunk features to a move distribution: 1x1 conv, flatten, dense,
/// softmax. Keeps the raw logits because the training loss must be computed
/// from them, not from the exponentiated probabilities.
struct PolicyHead {
    conv: Conv2d,
    dense: Affine,
}

impl PolicyHead {
    fn new(config: &NetworkConfig, params: &mut ParameterSet, trunk_output: PlaneShape) -> Self {
        let conv = Conv2d::new("policy_conv", params, trunk_output, 1, config.policy_channels, true, true, true);
        let num_inputs = trunk_output.spatial_size() * config.policy_channels;
        let dense = Affine::new("policy", params, num_inputs, config.policy_outputs(), false);

        Self { conv, dense }
    }

    fn forward(&self, params: &ParameterSet, batch_size: usize, trunk: &[f32]) -> (Vec<f32>, Vec<f32>) {
        let planes = self.conv.forward(params, batch_size, trunk);
        let logits = self.dense.forward(params, batch_size, &planes);

        let mut policy = vec![0.0; logits.len()];
        ops::softmax_rows(self.dense.num_outputs(), &logits, &mut policy);

        (policy, logits)
    }
}

/// Reduces trunk features to one bounded scalar per batch element: 1x1 conv,
/// flatten, two dense layers, tanh.
struct ValueHead {
    conv: Conv2d,
    dense1: Affine,
    dense2: Affine,
}

impl ValueHead {
    fn new(config: &NetworkConfig, params: &mut ParameterSet, trunk_output: PlaneShape) -> Self {
        let conv = Conv2d::new("value_conv", params, trunk_output, 1, config.value_channels, true, true, true);

        let num_inputs = trunk_output.spatial_size() * config.value_channels;
        let hidden = config.value_hidden.width(trunk_output.channels());
        let dense1 = Affine::new("value_dense1", params, num_inputs, hidden, config.value_hidden_activation);
        let dense2 = Affine::new("value_dense2", params, hidden, 1, false);

        Self { conv, dense1, dense2 }
    }

    fn forward(&self, params: &ParameterSet, batch_size: usize, trunk: &[f32]) -> Vec<f32> {
        let planes = self.conv.forward(params, batch_size, trunk);
        let hidden = self.dense1.forward(params, batch_size, &planes);
        let mut scores = self.dense2.forward(params, batch_size, &hidden);

        for v in &mut scores {
            *v = v.tanh();
        }

        scores
    }
}

/// The dual-head network: optional linear preprocessing, a three-block
/// convolution trunk and the two heads, over one flat parameter registry.
///
/// Forward passes and loss evaluation take `&self` and never touch the
/// parameters; the optimiser mutates them through `&mut self`. Ownership
/// therefore enforces the snapshot discipline: no update can interleave
/// with an in-flight inference on the same instance.
pub struct PolicyValueNetwork<E> {
    config: NetworkConfig,
    identity: String,
    encoder: E,
    params: ParameterSet,
    preprocess: Option<Conv2d>,
    trunk: Vec<Conv2d>,
    policy: PolicyHead,
    value: ValueHead,
}

impl<E: FeatureEncoder> PolicyValueNetwork<E> {
    /// Builds and initialises the network. Channel-chain mismatches in the
    /// configuration fail here, before any tensor is allocated.
    pub fn new(config: NetworkConfig, encoder: E) -> Result<Self, ShapeError> {
        let input_channels = config.input_channels();

        if encoder.num_planes() != input_channels {
            return Err(ShapeError::ChannelChain {
                layer: "feature encoder",
                expected: input_channels,
                actual: encoder.num_planes(),
            });
        }

        let mut expected = input_channels;
        for (spec, name) in config.trunk.iter().zip(TRUNK_NAMES) {
            if spec.input_channels != expected {
                return Err(ShapeError::ChannelChain { layer: name, expected, actual: spec.input_channels });
            }
            expected = spec.filters;
        }

        let mut params = ParameterSet::new();
        let input_shape = PlaneShape::square(config.board_size, input_channels);

        let preprocess = config
            .preprocess
            .then(|| Conv2d::new("linear_conv", &mut params, input_shape, 1, input_channels, false, false, false));

        let mut trunk = Vec::with_capacity(config.trunk.len());
        let mut shape = input_shape;
        for (spec, name) in config.trunk.iter().zip(TRUNK_NAMES) {
            let conv = Conv2d::new(name, &mut params, shape, spec.kernel_size, spec.filters, true, true, true);
            shape = conv.output_shape();
            trunk.push(conv);
        }

        let policy = PolicyHead::new(&config, &mut params, shape);
        let value = ValueHead::new(&config, &mut params, shape);

        let identity = config.identity();
        debug!("built {identity}: {} trainable parameters", params.num_params());

        Ok(Self { config, identity, encoder, params, preprocess, trunk, policy, value })
    }

    /// Full forward pass: `(policy, value, policy_logits)`, each flattened
    /// batch-major. Policies are rows of `board_cells + 5` probabilities,
    /// values one scalar in [-1, 1] per batch element.
    pub fn infer(&self, batch: &InputBatch) -> Result<(Vec<f32>, Vec<f32>, Vec<f32>), ModelError> {
        let batch_size = batch.validate(&self.config)?;
        let features = self.encode(batch, batch_size)?;
        Ok(self.forward(batch_size, features))
    }

    /// Serving convenience: `infer` with the logits dropped.
    pub fn call(&self, batch: &InputBatch) -> Result<(Vec<f32>, Vec<f32>), ModelError> {
        let (policy, value, _) = self.infer(batch)?;
        Ok((policy, value))
    }

    /// Joint training loss over one batch. Target policies are rows of
    /// `board_cells + 5` (one-hot or soft); target values one scalar per
    /// element. All shape checks run before any computation.
    pub fn loss(
        &self,
        batch: &InputBatch,
        target_policy: &[f32],
        target_value: &[f32],
    ) -> Result<LossOutput, ModelError> {
        let batch_size = batch.validate(&self.config)?;
        let width = self.config.policy_outputs();

        if target_policy.len() != batch_size * width {
            return Err(ShapeError::Elements {
                what: "target policy",
                expected: batch_size * width,
                actual: target_policy.len(),
            }
            .into());
        }

        if target_value.len() != batch_size {
            return Err(ShapeError::BatchMismatch(vec![batch_size, target_value.len()]).into());
        }

        let features = self.encode(batch, batch_size)?;
        let (_, predicted, logits) = self.forward(batch_size, features);

        let policy = loss::policy_loss(width, &logits, target_policy);
        let value = loss::value_loss(&predicted, target_value);
        let regularisation = loss::regularisation_loss(
            self.config.regularisation,
            self.params.transform_variables().into_iter().map(|(_, t)| t),
        );

        Ok(loss::combine(policy, value, regularisation))
    }

    /// Constant identity token, e.g. `gomoku_cnn_shared_i11`.
    pub fn name(&self) -> &str {
        &self.identity
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Every trainable tensor, in an order that is stable for the life of
    /// the process.
    pub fn trainable_variables(&self) -> Vec<(&str, &Tensor)> {
        self.params.trainable()
    }

    /// Mutable access for the external optimiser, same order.
    pub fn trainable_variables_mut(&mut self) -> Vec<(&str, &mut Tensor)> {
        self.params.trainable_mut()
    }

    /// The regularised subset: kernels and dense weights, no biases, no
    /// activation slopes, and not the SHL preprocessing kernel.
    pub fn transform_variables(&self) -> Vec<(&str, &Tensor)> {
        self.params.transform_variables()
    }

    pub fn num_params(&self) -> usize {
        self.params.num_params()
    }

    fn encode(&self, batch: &InputBatch, batch_size: usize) -> Result<Vec<f32>, ModelError> {
        let planes = self.encoder.encode(batch, self.config.board_size);

        let expected = PlaneShape::square(self.config.board_size, self.config.input_channels());
        if planes.shape() != expected || planes.batch_size() != batch_size {
            return Err(ShapeError::Elements {
                what: "encoded feature planes",
                expected: batch_size * expected.size(),
                actual: planes.batch_size() * planes.shape().size(),
            }
            .into());
        }

        Ok(planes.values().to_vec())
    }

    fn forward(&self, batch_size: usize, features: Vec<f32>) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
        let mut x = features;

        if let Some(preprocess) = &self.preprocess {
            x = preprocess.forward(&self.params, batch_size, &x);
        }

        for conv in &self.trunk {
            x = conv.forward(&self.params, batch_size, &x);
        }

        let (policy, logits) = self.policy.forward(&self.params, batch_size, &x);
        let value = self.value.forward(&self.params, batch_size, &x);

        (policy, value, logits)
    }
}
