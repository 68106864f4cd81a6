//! Snake block: dilated circular convolution, ReLU, batch normalization.

use burn::module::Module;
use burn::nn::{BatchNorm, BatchNormConfig, Relu};
use burn::prelude::*;

use crate::config::SnakeBlockConfig;
use crate::error::Result;
use crate::nn::circular::DilatedCircularConv;

/// Building block of the snake network.
///
/// Normalization statistics are computed per channel across the batch and point
/// axes. On an autodiff backend the block normalizes with the current batch and
/// updates its running estimate; otherwise it uses the stored estimate.
#[derive(Module, Debug)]
pub struct SnakeBlock<B: Backend> {
    pub(crate) conv: DilatedCircularConv<B>,
    activation: Relu,
    pub(crate) norm: BatchNorm<B, 1>,
}

impl SnakeBlockConfig {
    /// Initialize a snake block.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<SnakeBlock<B>> {
        self.validate()?;

        let conv = self.conv_config().init(device)?;
        let norm = BatchNormConfig::new(self.channels_out)
            .with_momentum(self.norm_momentum)
            .with_epsilon(self.norm_epsilon)
            .init(device);

        Ok(SnakeBlock {
            conv,
            activation: Relu::new(),
            norm,
        })
    }
}

impl<B: Backend> SnakeBlock<B> {
    /// Forward pass.
    ///
    /// Input shape: [batch, channels_in, num_points]
    /// Output shape: [batch, channels_out, num_points]
    pub fn forward(&self, x: Tensor<B, 3>) -> Result<Tensor<B, 3>> {
        let x = self.conv.forward(x)?;
        let x = self.activation.forward(x);
        Ok(self.norm.forward(x))
    }

    /// The block's circular convolution.
    pub fn conv(&self) -> &DilatedCircularConv<B> {
        &self.conv
    }

    /// The block's normalization layer.
    pub fn norm(&self) -> &BatchNorm<B, 1> {
        &self.norm
    }

    /// Input channel width.
    pub fn channels_in(&self) -> usize {
        self.conv.channels_in()
    }

    /// Output channel width.
    pub fn channels_out(&self) -> usize {
        self.conv.channels_out()
    }
}
