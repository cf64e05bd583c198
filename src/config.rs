//! Architecture configuration. The two shipped presets describe the same
//! generalised network with different widths; nothing in the forward pass
//! is preset-specific beyond this record.

/// Board-occupancy feature planes (own stones, opponent stones).
pub const OCCUPANCY_PLANES: usize = 2;
/// One-hot planes for the five swap2 game phases.
pub const GAME_PHASES: usize = 5;
/// Planes indicating the next mover's stone type.
pub const MOVER_PLANES: usize = 3;
/// Precomputed side-heuristic heatmaps consumed by the SHL preset.
pub const HEURISTIC_PLANES: usize = 4;
/// Non-board actions appended to the policy: the phase-specific decisions.
pub const AUX_ACTIONS: usize = 5;

/// One trunk convolution: square kernel, declared input channels, filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvSpec {
    pub kernel_size: usize,
    pub input_channels: usize,
    pub filters: usize,
}

/// Width of the value head's hidden dense layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueHidden {
    /// Half the trunk's output channel count.
    HalfTrunkOutput,
    Fixed(usize),
}

impl ValueHidden {
    pub fn width(&self, trunk_output: usize) -> usize {
        match self {
            Self::HalfTrunkOutput => trunk_output / 2,
            Self::Fixed(width) => *width,
        }
    }
}

/// Penalty applied to the transform variables. Scheme and scale are
/// preset-specific and deliberately kept independent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Regularisation {
    /// Sum of squared elements, scaled.
    L2 { scale: f32 },
    /// Sum of absolute elements, scaled.
    L1 { scale: f32 },
}

impl Regularisation {
    pub fn penalty<'a>(&self, tensors: impl Iterator<Item = &'a [f32]>) -> f32 {
        let mut total = 0.0;

        for tensor in tensors {
            total += match self {
                Self::L2 { .. } => tensor.iter().map(|x| x * x).sum::<f32>(),
                Self::L1 { .. } => tensor.iter().map(|x| x.abs()).sum::<f32>(),
            };
        }

        match self {
            Self::L2 { scale } | Self::L1 { scale } => scale * total,
        }
    }
}

/// Immutable description of one architecture preset.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkConfig {
    pub preset: &'static str,
    pub board_size: usize,
    /// 0 for the base preset, 4 for SHL.
    pub heuristic_planes: usize,
    /// SHL only: 1x1 linear channel remix ahead of the trunk, no bias, no
    /// activation, trainable but exempt from regularisation.
    pub preprocess: bool,
    pub trunk: [ConvSpec; 3],
    pub policy_channels: usize,
    pub value_channels: usize,
    pub value_hidden: ValueHidden,
    /// The base preset has no activation after the value head's first dense
    /// layer; SHL does. An intentional difference between the presets.
    pub value_hidden_activation: bool,
    pub regularisation: Regularisation,
}

impl NetworkConfig {
    pub fn base() -> Self {
        let input = OCCUPANCY_PLANES + GAME_PHASES + MOVER_PLANES;

        Self {
            preset: "gomoku_cnn_shared",
            board_size: 11,
            heuristic_planes: 0,
            preprocess: false,
            trunk: [
                ConvSpec { kernel_size: 5, input_channels: input, filters: 32 },
                ConvSpec { kernel_size: 3, input_channels: 32, filters: 64 },
                ConvSpec { kernel_size: 3, input_channels: 64, filters: 128 },
            ],
            policy_channels: 4,
            value_channels: 2,
            value_hidden: ValueHidden::HalfTrunkOutput,
            value_hidden_activation: false,
            regularisation: Regularisation::L2 { scale: 1e-4 },
        }
    }

    pub fn shl() -> Self {
        let input = OCCUPANCY_PLANES + GAME_PHASES + MOVER_PLANES + HEURISTIC_PLANES;

        Self {
            preset: "gomoku_cnn_shl_shared",
            board_size: 11,
            heuristic_planes: HEURISTIC_PLANES,
            preprocess: true,
            trunk: [
                ConvSpec { kernel_size: 5, input_channels: input, filters: 22 },
                ConvSpec { kernel_size: 3, input_channels: 22, filters: 22 },
                ConvSpec { kernel_size: 1, input_channels: 22, filters: 22 },
            ],
            policy_channels: 1,
            value_channels: 2,
            value_hidden: ValueHidden::Fixed(49),
            value_hidden_activation: true,
            regularisation: Regularisation::L1 { scale: 1e-5 },
        }
    }

    pub fn input_channels(&self) -> usize {
        OCCUPANCY_PLANES + GAME_PHASES + MOVER_PLANES + self.heuristic_planes
    }

    pub fn board_cells(&self) -> usize {
        self.board_size * self.board_size
    }

    /// Length of the policy vector: every board cell plus the auxiliary
    /// phase decisions.
    pub fn policy_outputs(&self) -> usize {
        self.board_cells() + AUX_ACTIONS
    }

    pub fn trunk_output_channels(&self) -> usize {
        self.trunk[2].filters
    }

    /// Constant identity token for versioning and export bookkeeping.
    pub fn identity(&self) -> String {
        format!("{}_i{}", self.preset, self.board_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_identities() {
        assert_eq!(NetworkConfig::base().identity(), "gomoku_cnn_shared_i11");
        assert_eq!(NetworkConfig::shl().identity(), "gomoku_cnn_shl_shared_i11");
    }

    #[test]
    fn preset_widths() {
        let base = NetworkConfig::base();
        assert_eq!(base.input_channels(), 10);
        assert_eq!(base.policy_outputs(), 126);
        assert_eq!(base.value_hidden.width(base.trunk_output_channels()), 64);

        let shl = NetworkConfig::shl();
        assert_eq!(shl.input_channels(), 14);
        assert_eq!(shl.policy_outputs(), 126);
        assert_eq!(shl.value_hidden.width(shl.trunk_output_channels()), 49);
    }

    #[test]
    fn regularisation_scaling() {
        let values = [1.0f32, -2.0, 3.0];

        let l2 = Regularisation::L2 { scale: 1e-4 };
        assert!((l2.penalty([values.as_slice()].into_iter()) - 1e-4 * 14.0).abs() < 1e-9);

        let l1 = Regularisation::L1 { scale: 1e-5 };
        assert!((l1.penalty([values.as_slice()].into_iter()) - 1e-5 * 6.0).abs() < 1e-9);
    }
}
