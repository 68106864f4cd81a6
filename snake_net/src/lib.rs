//! # snake_net
//!
//! Contour deformation with circular dilated convolutions, built on Burn.
//!
//! A contour is a closed sequence of points, each carrying a feature vector,
//! stored as a `[batch, channels, num_points]` tensor. Point `num_points - 1` is
//! adjacent to point `0`, so every convolution wraps around the sequence instead
//! of zero-padding it. The network predicts an (x, y) offset for every point.
//!
//! ## Features
//!
//! - **Circular convolution**: `DilatedCircularConv<B>` pads by wrapping and keeps the point count
//! - **Snake block**: convolution, ReLU and batch norm
//! - **SnakeNet**: head block, seven residual blocks with dilations `[1, 1, 1, 2, 2, 4, 4]`,
//!   multi-scale state fusion, global max-pooled descriptor and a position-wise prediction head
//! - **Parameter inventory**: named enumeration of every weight and running statistic
//!
//! ## Quick Start
//!
//! ```ignore
//! use burn::backend::NdArray;
//! use burn::prelude::*;
//! use snake_net::SnakeNet;
//!
//! let device = Default::default();
//! let net = SnakeNet::<NdArray>::new(128, 66, &device)?;
//!
//! // 4 contours of 128 points with 66 features each
//! let features = Tensor::zeros([4, 66, 128], &device);
//! let offsets = net.forward(features)?;
//! assert_eq!(offsets.dims(), [4, 2, 128]);
//! ```
//!
//! ## Training and evaluation
//!
//! Normalization follows the backend. A network on an `Autodiff` backend uses
//! batch statistics and updates its running estimates; `AutodiffModule::valid`
//! returns the evaluation-mode network, which only reads them. Evaluation-mode
//! networks can be shared across threads for concurrent inference.
//!
//! ## Feature Flags
//!
//! - `std` (default): Standard library support
//! - `ndarray`: CPU backend using ndarray
//! - `wgpu`: GPU acceleration via WebGPU

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod nn;

// Re-export key types for convenience
pub use config::{DilatedCircularConvConfig, SnakeBlockConfig, SnakeNetConfig};
pub use error::{Result, SnakeNetError};
pub use nn::{
    circular_pad, roll_points, DilatedCircularConv, Mode, ParameterInventory, SnakeBlock,
    SnakeNet, SnakeNetOutput,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{
        DilatedCircularConvConfig, SnakeBlockConfig, SnakeNetConfig, FUSION_STATE_DIM,
        OFFSET_DIM, RES_DILATIONS, RES_LAYER_NUM,
    };
    pub use crate::error::{Result, SnakeNetError};
    pub use crate::nn::{
        circular_pad, roll_points, DescribeParameters, DilatedCircularConv, Mode,
        ParameterEntry, ParameterInventory, ParameterKind, PredictionHead, SnakeBlock, SnakeNet,
        SnakeNetOutput,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::prelude::*;

    type TestBackend = NdArray;

    #[test]
    fn test_public_api() {
        let config = SnakeNetConfig::new(8, 4);
        assert!(config.validate().is_ok());
        let _conv = DilatedCircularConvConfig::new(8);
        let _block = SnakeBlockConfig::new(4, 8);
    }

    #[test]
    fn test_config_init_matches_new() {
        let device = Default::default();
        let from_config = SnakeNetConfig::new(8, 4)
            .init::<TestBackend>(&device)
            .unwrap();
        let from_new = SnakeNet::<TestBackend>::new(8, 4, &device).unwrap();

        assert_eq!(
            ParameterInventory::collect(&from_config),
            ParameterInventory::collect(&from_new)
        );
    }

    #[test]
    fn test_forward_from_prelude() {
        use crate::prelude::*;

        let device = Default::default();
        let net = SnakeNet::<TestBackend>::new(4, 3, &device).unwrap();
        let x = Tensor::<TestBackend, 3>::ones([1, 3, 32], &device);

        let offsets = net.forward(x).unwrap();
        assert_eq!(offsets.dims(), [1, OFFSET_DIM, 32]);
    }
}
