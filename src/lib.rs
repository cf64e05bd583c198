//! Dual-head convolutional policy/value network for a swap2 gomoku agent.
//!
//! The crate covers the computation graph only: parameter topology and
//! initialisation, the batched forward pass and the joint training loss.
//! Feature encoding, optimisation, persistence and search are collaborators
//! supplied by the caller.

/// Contains the two architecture presets and the generalised config record.
pub mod config;
/// Contains the error taxonomy: shape and input-domain failures.
pub mod error;
/// Contains the layer building blocks chained into trunk and heads.
mod layers;
/// Contains the loss components and their combination.
pub mod loss;
/// Contains the network itself and its public operations.
pub mod model;
/// Contains the raw CPU kernels the layers execute.
mod ops;
/// Contains the flat trainable-parameter registry.
pub mod params;
/// Contains batched inputs and the feature-encoder boundary.
pub mod planes;
/// Contains weight initialisation.
mod rng;
/// Contains dense and spatial shape types.
pub mod shape;
/// Contains the parameter tensor type.
pub mod tensor;

pub use config::{NetworkConfig, Regularisation};
pub use error::{ModelError, ShapeError};
pub use loss::LossOutput;
pub use model::PolicyValueNetwork;
pub use params::{ParamId, ParameterSet};
pub use planes::{FeatureEncoder, FeaturePlanes, InputBatch};
pub use shape::{PlaneShape, Shape};
pub use tensor::Tensor;
