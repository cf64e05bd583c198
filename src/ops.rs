//! Batched CPU kernels. Activations and planes are laid out NHWC with the
//! channel index fastest, batch elements contiguous.

use crate::shape::PlaneShape;

/// 2-D convolution with unit stride and "same" zero padding: the output
/// keeps the input's spatial extent for any kernel size. The kernel is laid
/// out [rows][cols][in_channels][out_channels].
pub fn conv2d_same(
    batch_size: usize,
    input: &[f32],
    input_shape: PlaneShape,
    kernel: &[f32],
    kernel_rows: usize,
    kernel_cols: usize,
    output_channels: usize,
    output: &mut [f32],
) {
    let in_c = input_shape.channels();
    let (rows, cols) = (input_shape.rows() as isize, input_shape.cols() as isize);

    assert_eq!(input.len(), batch_size * input_shape.size());
    assert_eq!(kernel.len(), kernel_rows * kernel_cols * in_c * output_channels);
    assert_eq!(output.len(), batch_size * input_shape.spatial_size() * output_channels);

    let pad_rows = (kernel_rows as isize - 1) / 2;
    let pad_cols = (kernel_cols as isize - 1) / 2;

    let in_stride = input_shape.size();
    let out_stride = input_shape.spatial_size() * output_channels;

    for (input, output) in input.chunks_exact(in_stride).zip(output.chunks_exact_mut(out_stride)).take(batch_size) {
        for oy in 0..rows {
            for ox in 0..cols {
                let out_base = ((oy * cols + ox) as usize) * output_channels;

                for (ky, kernel_row) in kernel.chunks_exact(kernel_cols * in_c * output_channels).enumerate() {
                    let iy = oy + ky as isize - pad_rows;
                    if iy < 0 || iy >= rows {
                        continue;
                    }

                    for (kx, kernel_col) in kernel_row.chunks_exact(in_c * output_channels).enumerate() {
                        let ix = ox + kx as isize - pad_cols;
                        if ix < 0 || ix >= cols {
                            continue;
                        }

                        let in_base = ((iy * cols + ix) as usize) * in_c;
                        for ci in 0..in_c {
                            let x = input[in_base + ci];
                            if x == 0.0 {
                                continue;
                            }

                            let weights = &kernel_col[ci * output_channels..(ci + 1) * output_channels];
                            let out = &mut output[out_base..out_base + output_channels];
                            for (o, &w) in out.iter_mut().zip(weights.iter()) {
                                *o += x * w;
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Adds `biases[c]` to every element of channel `c`; works for NHWC planes
/// and for flat dense rows alike because the channel index is fastest.
pub fn add_channel_bias(buf: &mut [f32], biases: &[f32]) {
    assert_eq!(buf.len() % biases.len(), 0);

    for chunk in buf.chunks_exact_mut(biases.len()) {
        for (x, &b) in chunk.iter_mut().zip(biases.iter()) {
            *x += b;
        }
    }
}

/// Parametric rectified linear unit: positive inputs pass through, negative
/// inputs are scaled by the learned per-channel slope.
pub fn prelu(buf: &mut [f32], alphas: &[f32]) {
    assert_eq!(buf.len() % alphas.len(), 0);

    for chunk in buf.chunks_exact_mut(alphas.len()) {
        for (x, &a) in chunk.iter_mut().zip(alphas.iter()) {
            if *x < 0.0 {
                *x *= a;
            }
        }
    }
}

/// Dense transform: `output = input * weights + biases`, weights laid out
/// [num_inputs][num_outputs].
pub fn affine(
    batch_size: usize,
    input: &[f32],
    num_inputs: usize,
    weights: &[f32],
    biases: &[f32],
    num_outputs: usize,
    output: &mut [f32],
) {
    assert_eq!(input.len(), batch_size * num_inputs);
    assert_eq!(weights.len(), num_inputs * num_outputs);
    assert_eq!(biases.len(), num_outputs);
    assert_eq!(output.len(), batch_size * num_outputs);

    for (input, output) in input.chunks_exact(num_inputs).zip(output.chunks_exact_mut(num_outputs)) {
        output.copy_from_slice(biases);

        for (&x, row) in input.iter().zip(weights.chunks_exact(num_outputs)) {
            if x == 0.0 {
                continue;
            }

            for (o, &w) in output.iter_mut().zip(row.iter()) {
                *o += x * w;
            }
        }
    }
}

/// Row-wise softmax with the usual max shift.
pub fn softmax_rows(width: usize, logits: &[f32], output: &mut [f32]) {
    assert_eq!(logits.len(), output.len());
    assert_eq!(logits.len() % width, 0);

    for (row, out) in logits.chunks_exact(width).zip(output.chunks_exact_mut(width)) {
        let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));

        let mut total = 0.0;
        for (o, &z) in out.iter_mut().zip(row.iter()) {
            *o = (z - max).exp();
            total += *o;
        }

        for o in out.iter_mut() {
            *o /= total;
        }
    }
}

/// Batch-mean categorical cross-entropy between a target distribution and
/// raw logits, computed through log-softmax rather than the exponentiated
/// probabilities.
pub fn softmax_crossentropy_mean(width: usize, logits: &[f32], targets: &[f32]) -> f32 {
    assert_eq!(logits.len(), targets.len());
    assert_eq!(logits.len() % width, 0);

    let batch_size = logits.len() / width;
    let mut total = 0.0;

    for (row, target) in logits.chunks_exact(width).zip(targets.chunks_exact(width)) {
        let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        let lse = max + row.iter().map(|&z| (z - max).exp()).sum::<f32>().ln();

        for (&z, &t) in row.iter().zip(target.iter()) {
            if t != 0.0 {
                total += t * (lse - z);
            }
        }
    }

    total / batch_size as f32
}

/// Batch-mean squared error.
pub fn mean_squared_error(predicted: &[f32], target: &[f32]) -> f32 {
    assert_eq!(predicted.len(), target.len());
    assert!(!predicted.is_empty());

    let total: f32 = predicted.iter().zip(target.iter()).map(|(&p, &t)| (p - t) * (p - t)).sum();
    total / predicted.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conv_identity_kernel() {
        // 1x1 kernel with an identity channel mix leaves the planes alone.
        let shape = PlaneShape::new(2, 2, 2);
        let input = [1.0, -1.0, 2.0, 0.5, 0.0, 3.0, -2.0, 4.0];
        let kernel = [1.0, 0.0, 0.0, 1.0];
        let mut output = [0.0; 8];

        conv2d_same(1, &input, shape, &kernel, 1, 1, 2, &mut output);
        assert_eq!(output, input);
    }

    #[test]
    fn conv_same_padding_sums_neighbourhood() {
        // All-ones 3x3 kernel over an all-ones 3x3 board counts the valid
        // neighbours, so corners see 4, edges 6, the centre 9.
        let shape = PlaneShape::new(3, 3, 1);
        let input = [1.0; 9];
        let kernel = [1.0; 9];
        let mut output = [0.0; 9];

        conv2d_same(1, &input, shape, &kernel, 3, 3, 1, &mut output);
        assert_eq!(output, [4.0, 6.0, 4.0, 6.0, 9.0, 6.0, 4.0, 6.0, 4.0]);
    }

    #[test]
    fn prelu_scales_negatives_per_channel() {
        let mut buf = [2.0, -2.0, -1.0, 1.0];
        prelu(&mut buf, &[0.5, 0.25]);
        assert_eq!(buf, [2.0, -0.5, -0.5, 1.0]);
    }

    #[test]
    fn affine_with_bias() {
        let weights = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let biases = [10.0, 20.0];
        let input = [1.0, 0.0, -1.0, 0.0, 2.0, 0.0];
        let mut output = [0.0; 4];

        affine(2, &input, 3, &weights, &biases, 2, &mut output);
        assert_eq!(output, [10.0 + 1.0 - 5.0, 20.0 + 2.0 - 6.0, 10.0 + 6.0, 20.0 + 8.0]);
    }

    #[test]
    fn softmax_uniform_rows() {
        let logits = [2.0, 2.0, 2.0, 2.0, -1.0, -1.0, -1.0, -1.0];
        let mut output = [0.0; 8];
        softmax_rows(4, &logits, &mut output);
        for &p in &output {
            assert!((p - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn crossentropy_matches_reference() {
        let logits = [1.0, 2.0, 1.0, 2.0, -4.0, -1.0, -1.0, -1.0, 0.0, 0.0, 1.0, 0.0];
        let targets = [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0];

        let mean = softmax_crossentropy_mean(4, &logits, &targets);
        assert!((3.0 * mean - 3.865).abs() < 0.001);
    }

    #[test]
    fn crossentropy_is_shift_invariant() {
        let logits = [3.0, 1.0, 0.0];
        let shifted = [103.0, 101.0, 100.0];
        let target = [0.2, 0.3, 0.5];

        let a = softmax_crossentropy_mean(3, &logits, &target);
        let b = softmax_crossentropy_mean(3, &shifted, &target);
        assert!((a - b).abs() < 1e-4);
    }

    #[test]
    fn mse_simple() {
        assert_eq!(mean_squared_error(&[1.0, -1.0], &[0.0, 1.0]), 2.5);
    }
}
