//! Error types for snake_net.

use thiserror::Error;

/// Errors that can occur while building or evaluating a snake network.
///
/// Variants fall into two families: shape errors, raised when a tensor does not
/// match what a layer expects, and configuration errors, raised when
/// hyperparameters (or the point count relative to them) cannot produce a
/// well-defined circular convolution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnakeNetError {
    /// Tensor shape mismatch.
    #[error("tensor shape mismatch in {context}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Layer or stage that rejected the tensor.
        context: &'static str,
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        got: Vec<usize>,
    },

    /// Batch or point axis of size zero.
    #[error("empty tensor in {context}: dims {dims:?}")]
    EmptyTensor {
        /// Layer or stage that rejected the tensor.
        context: &'static str,
        /// Dims of the offending tensor.
        dims: Vec<usize>,
    },

    /// The point sequence is shorter than the circular padding radius.
    #[error("sequence of {num_points} points is too short for circular padding radius {radius}")]
    SequenceTooShort {
        /// Number of points in the sequence.
        num_points: usize,
        /// Requested padding radius (`n_adj * dilation`).
        radius: usize,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },
}

impl SnakeNetError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether this is a shape error (rank or dimension mismatch).
    pub fn is_shape_error(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. } | Self::EmptyTensor { .. })
    }

    /// Whether this is a configuration error (invalid hyperparameters).
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::SequenceTooShort { .. } | Self::InvalidConfig { .. }
        )
    }
}

/// Result type for snake_net operations.
pub type Result<T> = std::result::Result<T, SnakeNetError>;
