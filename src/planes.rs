use crate::{
    config::{NetworkConfig, GAME_PHASES, HEURISTIC_PLANES},
    error::{ModelError, ShapeError},
    shape::PlaneShape,
};

/// Batched multi-channel input tensor, NHWC with channels fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct FeaturePlanes {
    shape: PlaneShape,
    batch_size: usize,
    data: Vec<f32>,
}

impl FeaturePlanes {
    pub fn new(shape: PlaneShape, batch_size: usize, data: Vec<f32>) -> Result<Self, ShapeError> {
        if data.len() != batch_size * shape.size() {
            return Err(ShapeError::Elements {
                what: "feature planes",
                expected: batch_size * shape.size(),
                actual: data.len(),
            });
        }

        Ok(Self { shape, batch_size, data })
    }

    pub fn shape(&self) -> PlaneShape {
        self.shape
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn values(&self) -> &[f32] {
        &self.data
    }
}

/// One batch of raw positions: per-cell occupancy (-1 white, 0 empty,
/// +1 black), a game-phase indicator and the next mover's stone type per
/// element, plus the four heuristic heatmaps when the preset wants them.
#[derive(Clone, Copy, Debug)]
pub struct InputBatch<'a> {
    pub boards: &'a [i8],
    pub phases: &'a [u8],
    pub movers: &'a [i8],
    pub heuristics: Option<[&'a [f32]; HEURISTIC_PLANES]>,
}

impl InputBatch<'_> {
    pub fn batch_size(&self) -> usize {
        self.phases.len()
    }

    /// Checks batch agreement, per-input element counts and value domains
    /// against the preset. Returns the batch size.
    pub(crate) fn validate(&self, config: &NetworkConfig) -> Result<usize, ModelError> {
        let batch_size = self.phases.len();
        let cells = config.board_cells();

        if batch_size == 0 {
            return Err(ShapeError::EmptyBatch.into());
        }

        if self.movers.len() != batch_size {
            return Err(ShapeError::BatchMismatch(vec![batch_size, self.movers.len()]).into());
        }

        if self.boards.len() != batch_size * cells {
            return Err(ShapeError::Elements {
                what: "boards",
                expected: batch_size * cells,
                actual: self.boards.len(),
            }
            .into());
        }

        let given_planes = self.heuristics.map_or(0, |h| h.len());
        if given_planes != config.heuristic_planes {
            return Err(ShapeError::Elements {
                what: "side heuristic planes",
                expected: config.heuristic_planes,
                actual: given_planes,
            }
            .into());
        }

        if let Some(heuristics) = self.heuristics {
            for plane in heuristics {
                if plane.len() != batch_size * cells {
                    return Err(ShapeError::Elements {
                        what: "side heuristic plane",
                        expected: batch_size * cells,
                        actual: plane.len(),
                    }
                    .into());
                }
            }
        }

        for &cell in self.boards {
            if !(-1..=1).contains(&cell) {
                return Err(ModelError::InvalidDomain { what: "board cell", value: i64::from(cell) });
            }
        }

        for &phase in self.phases {
            if usize::from(phase) >= GAME_PHASES {
                return Err(ModelError::InvalidDomain { what: "game phase", value: i64::from(phase) });
            }
        }

        for &mover in self.movers {
            if mover != -1 && mover != 1 {
                return Err(ModelError::InvalidDomain { what: "stone type", value: i64::from(mover) });
            }
        }

        Ok(batch_size)
    }
}

/// Collaborator that turns a validated raw batch into feature planes. The
/// network declares the channel count it expects and checks the encoder
/// against it at construction; the encoding itself lives outside this crate.
pub trait FeatureEncoder {
    fn num_planes(&self) -> usize;

    fn encode(&self, batch: &InputBatch, board_size: usize) -> FeaturePlanes;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_domain_phase() {
        let config = NetworkConfig::base();
        let boards = vec![0i8; 121];
        let batch = InputBatch { boards: &boards, phases: &[7], movers: &[1], heuristics: None };

        assert_eq!(
            batch.validate(&config),
            Err(ModelError::InvalidDomain { what: "game phase", value: 7 })
        );
    }

    #[test]
    fn rejects_empty_batch() {
        let config = NetworkConfig::base();
        let batch = InputBatch { boards: &[], phases: &[], movers: &[], heuristics: None };

        assert_eq!(batch.validate(&config), Err(ShapeError::EmptyBatch.into()));
    }

    #[test]
    fn rejects_batch_disagreement() {
        let config = NetworkConfig::base();
        let boards = vec![0i8; 2 * 121];
        let batch = InputBatch { boards: &boards, phases: &[4, 4], movers: &[1], heuristics: None };

        assert_eq!(batch.validate(&config), Err(ShapeError::BatchMismatch(vec![2, 1]).into()));
    }

    #[test]
    fn rejects_missing_heuristics_for_shl() {
        let config = NetworkConfig::shl();
        let boards = vec![0i8; 121];
        let batch = InputBatch { boards: &boards, phases: &[4], movers: &[-1], heuristics: None };

        assert_eq!(
            batch.validate(&config),
            Err(ShapeError::Elements { what: "side heuristic planes", expected: 4, actual: 0 }.into())
        );
    }

    #[test]
    fn accepts_valid_batch() {
        let config = NetworkConfig::base();
        let mut boards = vec![0i8; 121];
        boards[60] = 1;
        boards[0] = -1;
        let batch = InputBatch { boards: &boards, phases: &[4], movers: &[-1], heuristics: None };

        assert_eq!(batch.validate(&config), Ok(1));
    }
}
