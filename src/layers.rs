use crate::{
    ops,
    params::{ParamId, ParameterSet},
    shape::{PlaneShape, Shape},
    tensor::Tensor,
};

/// Initial per-channel slope of every parametric rectifier.
pub(crate) const PRELU_INITIAL_SLOPE: f32 = 0.25;

fn prelu_slopes(channels: usize) -> Tensor {
    let shape = Shape::new(channels, 1);
    Tensor::from_slice(shape, &vec![PRELU_INITIAL_SLOPE; channels])
}

/// Same-padding 2-D convolution with optional per-channel bias and PReLU.
///
/// The kernel is registered with fan-in scaled initialisation
/// (fan_in = kernel² · input_channels); biases start at zero. Whether the
/// kernel counts as a transform variable is the caller's choice, since the
/// SHL preprocessing remix is trainable but exempt from regularisation.
pub(crate) struct Conv2d {
    kernel: ParamId,
    biases: Option<ParamId>,
    alphas: Option<ParamId>,
    kernel_size: usize,
    input: PlaneShape,
    output_channels: usize,
}

impl Conv2d {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        params: &mut ParameterSet,
        input: PlaneShape,
        kernel_size: usize,
        output_channels: usize,
        bias: bool,
        activation: bool,
        transform: bool,
    ) -> Self {
        let fan_in = kernel_size * kernel_size * input.channels();
        let kernel_shape = Shape::new(fan_in, output_channels);

        let kernel = params.add(format!("{name}_kernel"), Tensor::fan_in_scaled(kernel_shape, fan_in), transform);

        let biases =
            bias.then(|| params.add(format!("{name}_biases"), Tensor::zeroed(Shape::new(output_channels, 1)), false));

        let alphas = activation.then(|| params.add(format!("{name}_alphas"), prelu_slopes(output_channels), false));

        Self { kernel, biases, alphas, kernel_size, input, output_channels }
    }

    pub fn output_shape(&self) -> PlaneShape {
        self.input.with_channels(self.output_channels)
    }

    pub fn forward(&self, params: &ParameterSet, batch_size: usize, input: &[f32]) -> Vec<f32> {
        let mut output = vec![0.0; batch_size * self.output_shape().size()];

        ops::conv2d_same(
            batch_size,
            input,
            self.input,
            params.get(self.kernel).values(),
            self.kernel_size,
            self.kernel_size,
            self.output_channels,
            &mut output,
        );

        if let Some(biases) = self.biases {
            ops::add_channel_bias(&mut output, params.get(biases).values());
        }

        if let Some(alphas) = self.alphas {
            ops::prelu(&mut output, params.get(alphas).values());
        }

        output
    }
}

/// Dense transform with bias and optional PReLU over the output features.
pub(crate) struct Affine {
    weights: ParamId,
    biases: ParamId,
    alphas: Option<ParamId>,
    num_inputs: usize,
    num_outputs: usize,
}

impl Affine {
    pub fn new(name: &str, params: &mut ParameterSet, num_inputs: usize, num_outputs: usize, activation: bool) -> Self {
        let shape = Shape::new(num_inputs, num_outputs);
        let weights = params.add(format!("{name}_weights"), Tensor::fan_in_scaled(shape, num_inputs), true);
        let biases = params.add(format!("{name}_biases"), Tensor::zeroed(Shape::new(num_outputs, 1)), false);
        let alphas = activation.then(|| params.add(format!("{name}_alphas"), prelu_slopes(num_outputs), false));

        Self { weights, biases, alphas, num_inputs, num_outputs }
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    pub fn forward(&self, params: &ParameterSet, batch_size: usize, input: &[f32]) -> Vec<f32> {
        let mut output = vec![0.0; batch_size * self.num_outputs];

        ops::affine(
            batch_size,
            input,
            self.num_inputs,
            params.get(self.weights).values(),
            params.get(self.biases).values(),
            self.num_outputs,
            &mut output,
        );

        if let Some(alphas) = self.alphas {
            ops::prelu(&mut output, params.get(alphas).values());
        }

        output
    }
}
