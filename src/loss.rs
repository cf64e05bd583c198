use crate::{config::Regularisation, ops, tensor::Tensor};

/// The joint training loss and its components, returned separately so a
/// training loop can log them independently.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LossOutput {
    pub total: f32,
    pub policy: f32,
    pub value: f32,
    pub regularisation: f32,
}

/// Batch-mean cross-entropy between target distributions and raw logits.
pub(crate) fn policy_loss(width: usize, logits: &[f32], targets: &[f32]) -> f32 {
    ops::softmax_crossentropy_mean(width, logits, targets)
}

/// Batch-mean squared error on the value scalar.
pub(crate) fn value_loss(predicted: &[f32], targets: &[f32]) -> f32 {
    ops::mean_squared_error(predicted, targets)
}

/// Scheme-and-scale penalty over the transform variables.
pub(crate) fn regularisation_loss<'a>(
    regularisation: Regularisation,
    transform_variables: impl Iterator<Item = &'a Tensor>,
) -> f32 {
    regularisation.penalty(transform_variables.map(Tensor::values))
}

pub(crate) fn combine(policy: f32, value: f32, regularisation: f32) -> LossOutput {
    LossOutput { total: policy + value + regularisation, policy, value, regularisation }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    #[test]
    fn components_sum_to_total() {
        let out = combine(1.25, 0.5, 0.001);
        assert_eq!(out.total, 1.25 + 0.5 + 0.001);
    }

    #[test]
    fn perfect_prediction_costs_entropy_only() {
        // One-hot target on the argmax of strongly peaked logits.
        let logits = [20.0, 0.0, 0.0, 0.0];
        let targets = [1.0, 0.0, 0.0, 0.0];
        assert!(policy_loss(4, &logits, &targets) < 1e-6);
        assert!(policy_loss(4, &logits, &targets) >= 0.0);
    }

    #[test]
    fn regularisation_scales_quadratically_for_l2() {
        let reg = Regularisation::L2 { scale: 1e-4 };
        let t = Tensor::from_slice(Shape::new(2, 2), &[1.0, -2.0, 3.0, 0.5]);
        let t2 = Tensor::from_slice(Shape::new(2, 2), &[3.0, -6.0, 9.0, 1.5]);

        let base = regularisation_loss(reg, [&t].into_iter());
        let scaled = regularisation_loss(reg, [&t2].into_iter());
        assert!((scaled - 9.0 * base).abs() < 1e-9);
    }

    #[test]
    fn regularisation_scales_linearly_for_l1() {
        let reg = Regularisation::L1 { scale: 1e-5 };
        let t = Tensor::from_slice(Shape::new(2, 2), &[1.0, -2.0, 3.0, 0.5]);
        let t2 = Tensor::from_slice(Shape::new(2, 2), &[-3.0, 6.0, -9.0, -1.5]);

        let base = regularisation_loss(reg, [&t].into_iter());
        let scaled = regularisation_loss(reg, [&t2].into_iter());
        assert!((scaled - 3.0 * base).abs() < 1e-9);
    }
}
