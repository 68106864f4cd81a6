//! Snake network: circular residual stack, global fusion and per-point offsets.

use burn::module::{Ignored, Module};
use burn::nn::conv::{Conv1d, Conv1dConfig};
use burn::nn::{PaddingConfig1d, Relu};
use burn::prelude::*;

use crate::config::{SnakeNetConfig, FUSION_STATE_DIM, OFFSET_DIM, PREDICTION_HIDDEN_DIMS};
use crate::error::{Result, SnakeNetError};
use crate::nn::block::SnakeBlock;
use crate::nn::shape::{ensure_channels, ensure_same_points};

/// Whether normalization layers use batch statistics or running estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Batch statistics are used and the running estimates are updated.
    Training,
    /// Stored running estimates are used and left untouched.
    Evaluation,
}

/// Position-wise prediction head: kernel-size-1 convolutions with ReLU between them.
#[derive(Module, Debug)]
pub struct PredictionHead<B: Backend> {
    /// Hidden layers.
    pub(crate) layers: Vec<Conv1d<B>>,
    /// Output layer to per-point offsets.
    pub(crate) output: Conv1d<B>,
    activation: Relu,
}

impl<B: Backend> PredictionHead<B> {
    fn new(input_dim: usize, device: &B::Device) -> Self {
        let mut layers = Vec::new();
        let mut in_dim = input_dim;

        for &out_dim in &PREDICTION_HIDDEN_DIMS {
            layers.push(pointwise_conv(in_dim, out_dim, device));
            in_dim = out_dim;
        }

        Self {
            layers,
            output: pointwise_conv(in_dim, OFFSET_DIM, device),
            activation: Relu::new(),
        }
    }

    /// Channel width the first layer expects.
    pub fn input_dim(&self) -> usize {
        let first = self.layers.first().unwrap_or(&self.output);
        first.weight.val().dims()[1]
    }

    /// Forward pass.
    ///
    /// Input shape: [batch, input_dim, num_points]
    /// Output shape: [batch, 2, num_points]
    pub fn forward(&self, mut x: Tensor<B, 3>) -> Tensor<B, 3> {
        for layer in &self.layers {
            x = layer.forward(x);
            x = self.activation.forward(x);
        }

        self.output.forward(x)
    }
}

fn pointwise_conv<B: Backend>(
    channels_in: usize,
    channels_out: usize,
    device: &B::Device,
) -> Conv1d<B> {
    Conv1dConfig::new(channels_in, channels_out, 1)
        .with_padding(PaddingConfig1d::Valid)
        .init(device)
}

/// Every intermediate of a forward pass.
#[derive(Debug, Clone)]
pub struct SnakeNetOutput<B: Backend> {
    /// Retained states: the head output followed by each residual state.
    /// Each has shape [batch, state_dim, num_points].
    pub states: Vec<Tensor<B, 3>>,
    /// States concatenated along channels: [batch, state_dim * 8, num_points].
    pub state: Tensor<B, 3>,
    /// Fusion output before pooling: [batch, 256, num_points].
    pub fused: Tensor<B, 3>,
    /// Max-pooled fusion output broadcast to every point: [batch, 256, num_points].
    pub global_state: Tensor<B, 3>,
    /// Per-point (x, y) offsets: [batch, 2, num_points].
    pub offsets: Tensor<B, 3>,
}

/// Contour deformation network over closed point sequences.
///
/// Architecture:
/// 1. Head block lifts the input features to `state_dim` channels
/// 2. Seven residual blocks with dilations `[1, 1, 1, 2, 2, 4, 4]`, every state retained
/// 3. Retained states concatenated and fused to 256 channels position-wise
/// 4. Fusion output max-pooled over points and broadcast back as a global descriptor
/// 5. Global descriptor and states pass through the prediction head to a 2-D offset per point
#[derive(Module, Debug)]
pub struct SnakeNet<B: Backend> {
    pub(crate) head: SnakeBlock<B>,
    pub(crate) res_blocks: Vec<SnakeBlock<B>>,
    pub(crate) fusion: Conv1d<B>,
    pub(crate) prediction: PredictionHead<B>,
    state_dim: Ignored<usize>,
    edge_feature_dim: Ignored<usize>,
    min_points: Ignored<usize>,
}

impl SnakeNetConfig {
    /// Initialize the snake network.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<SnakeNet<B>> {
        self.validate()?;

        let head = self.head_config().init(device)?;
        let res_blocks = self
            .res_configs()
            .iter()
            .map(|config| config.init(device))
            .collect::<Result<Vec<_>>>()?;

        let fusion = pointwise_conv(self.concat_state_dim(), FUSION_STATE_DIM, device);
        let prediction = PredictionHead::new(self.prediction_input_dim(), device);

        let net = SnakeNet {
            head,
            res_blocks,
            fusion,
            prediction,
            state_dim: Ignored(self.state_dim),
            edge_feature_dim: Ignored(self.edge_feature_dim),
            min_points: Ignored(self.min_points()),
        };

        log::debug!(
            "Initialized SnakeNet: edge_feature_dim={}, state_dim={}, {} residual blocks, {} parameters",
            self.edge_feature_dim,
            self.state_dim,
            net.res_blocks.len(),
            net.num_params()
        );

        Ok(net)
    }
}

impl<B: Backend> SnakeNet<B> {
    /// Create a network with the given state and input feature widths.
    pub fn new(state_dim: usize, edge_feature_dim: usize, device: &B::Device) -> Result<Self> {
        SnakeNetConfig::new(state_dim, edge_feature_dim).init(device)
    }

    /// Forward pass.
    ///
    /// Input shape: [batch, edge_feature_dim, num_points]
    /// Output shape: [batch, 2, num_points]
    pub fn forward(&self, x: Tensor<B, 3>) -> Result<Tensor<B, 3>> {
        Ok(self.forward_with_states(x)?.offsets)
    }

    /// Forward pass returning every intermediate alongside the offsets.
    pub fn forward_with_states(&self, x: Tensor<B, 3>) -> Result<SnakeNetOutput<B>> {
        let dims = x.dims();
        ensure_channels(dims, self.edge_feature_dim(), "snake net input")?;

        let num_points = dims[2];
        if num_points < self.min_points() {
            log::warn!(
                "SnakeNet: {} points is below the minimum of {}",
                num_points,
                self.min_points()
            );
            return Err(SnakeNetError::SequenceTooShort {
                num_points,
                radius: self.min_points(),
            });
        }

        let mut states = Vec::with_capacity(self.res_blocks.len() + 1);

        let mut x = self.head.forward(x)?;
        ensure_channels(x.dims(), self.state_dim(), "head block")?;
        states.push(x.clone());

        for block in &self.res_blocks {
            let residual = block.forward(x.clone())?;
            ensure_channels(residual.dims(), self.state_dim(), "residual block")?;
            x = residual + x;
            states.push(x.clone());
        }

        let state = Tensor::cat(states.clone(), 1);
        ensure_channels(state.dims(), self.fusion.weight.val().dims()[1], "fusion")?;

        let fused = self.fusion.forward(state.clone());
        let global_state = fused.clone().max_dim(2).repeat_dim(2, num_points);

        ensure_same_points(state.dims(), global_state.dims(), "global state")?;
        let augmented = Tensor::cat(vec![global_state.clone(), state.clone()], 1);
        ensure_channels(augmented.dims(), self.prediction.input_dim(), "prediction head")?;
        let offsets = self.prediction.forward(augmented);

        Ok(SnakeNetOutput {
            states,
            state,
            fused,
            global_state,
            offsets,
        })
    }

    /// Current normalization mode, decided by the backend.
    ///
    /// Networks on an autodiff backend train; `AutodiffModule::valid` returns the
    /// evaluation-mode network on the inner backend.
    pub fn mode(&self) -> Mode {
        if B::ad_enabled() {
            Mode::Training
        } else {
            Mode::Evaluation
        }
    }

    /// Channel width of every retained state.
    pub fn state_dim(&self) -> usize {
        self.state_dim.0
    }

    /// Channel width of the input features.
    pub fn edge_feature_dim(&self) -> usize {
        self.edge_feature_dim.0
    }

    /// Channel width of the concatenated states.
    pub fn concat_state_dim(&self) -> usize {
        self.state_dim.0 * (self.res_blocks.len() + 1)
    }

    /// Smallest number of points the network accepts.
    pub fn min_points(&self) -> usize {
        self.min_points.0
    }

    /// Head block.
    pub fn head(&self) -> &SnakeBlock<B> {
        &self.head
    }

    /// Number of residual blocks.
    pub fn num_res_blocks(&self) -> usize {
        self.res_blocks.len()
    }

    /// Residual block `index`, in stacking order.
    pub fn res_block(&self, index: usize) -> Option<&SnakeBlock<B>> {
        self.res_blocks.get(index)
    }

    /// Fusion convolution.
    pub fn fusion(&self) -> &Conv1d<B> {
        &self.fusion
    }

    /// Prediction head.
    pub fn prediction(&self) -> &PredictionHead<B> {
        &self.prediction
    }
}
