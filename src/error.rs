use thiserror::Error;

/// Dimension or channel-count mismatch, either between the configured
/// architecture and an actual input, or between chained layers at
/// construction time.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("layer `{layer}` expects {expected} input channels, got {actual}")]
    ChannelChain { layer: &'static str, expected: usize, actual: usize },
    #[error("`{what}` should hold {expected} elements, got {actual}")]
    Elements { what: &'static str, expected: usize, actual: usize },
    #[error("inputs disagree on batch size: {0:?}")]
    BatchMismatch(Vec<usize>),
    #[error("batch cannot be empty")]
    EmptyBatch,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ModelError {
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error("`{what}` value {value} is outside its domain")]
    InvalidDomain { what: &'static str, value: i64 },
}
