//! Network configuration types.

use burn::config::Config;

use crate::error::SnakeNetError;

/// Number of residual blocks stacked after the head block.
pub const RES_LAYER_NUM: usize = 7;

/// Dilation of each residual block, in stacking order.
pub const RES_DILATIONS: [usize; RES_LAYER_NUM] = [1, 1, 1, 2, 2, 4, 4];

/// Neighborhood radius of every residual block.
pub const RES_N_ADJ: usize = 4;

/// Neighborhood radius of the head block.
pub const HEAD_N_ADJ: usize = 4;

/// Channel width of the fusion convolution feeding the global descriptor.
pub const FUSION_STATE_DIM: usize = 256;

/// Hidden widths of the position-wise prediction head.
pub const PREDICTION_HIDDEN_DIMS: [usize; 2] = [256, 64];

/// Output channels per point: an (x, y) offset.
pub const OFFSET_DIM: usize = 2;

/// Configuration for a dilated circular convolution.
#[derive(Config, Debug)]
pub struct DilatedCircularConvConfig {
    /// Input channel width.
    pub channels_in: usize,

    /// Output channel width. Defaults to `channels_in`.
    #[config(default = "None")]
    pub channels_out: Option<usize>,

    /// Number of neighbors considered on each side of a point.
    #[config(default = 4)]
    pub n_adj: usize,

    /// Spacing between sampled neighbors.
    #[config(default = 1)]
    pub dilation: usize,
}

impl DilatedCircularConvConfig {
    /// Output channel width after defaulting.
    pub fn out_channels(&self) -> usize {
        self.channels_out.unwrap_or(self.channels_in)
    }

    /// Kernel size of the underlying convolution: `2 * n_adj + 1`.
    pub fn kernel_size(&self) -> usize {
        2 * self.n_adj + 1
    }

    /// Circular padding applied on each side: `n_adj * dilation`.
    ///
    /// This is also the minimum number of points an input sequence must have.
    pub fn radius(&self) -> usize {
        self.n_adj * self.dilation
    }

    /// Check that the configuration describes a well-formed convolution.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.channels_in == 0 {
            return Err(SnakeNetError::invalid_config(
                "circular convolution input channels must be positive",
            ));
        }
        if self.out_channels() == 0 {
            return Err(SnakeNetError::invalid_config(
                "circular convolution output channels must be positive",
            ));
        }
        if self.dilation == 0 {
            return Err(SnakeNetError::invalid_config("dilation must be positive"));
        }
        Ok(())
    }
}

/// Configuration for a snake block: circular convolution, ReLU, batch norm.
#[derive(Config, Debug)]
pub struct SnakeBlockConfig {
    /// Input channel width.
    pub channels_in: usize,

    /// Output channel width.
    pub channels_out: usize,

    /// Number of neighbors considered on each side of a point.
    #[config(default = 4)]
    pub n_adj: usize,

    /// Spacing between sampled neighbors.
    #[config(default = 1)]
    pub dilation: usize,

    /// Momentum of the normalization running statistics.
    #[config(default = 0.1)]
    pub norm_momentum: f64,

    /// Epsilon added to the variance during normalization.
    #[config(default = 1e-5)]
    pub norm_epsilon: f64,
}

impl SnakeBlockConfig {
    /// Configuration of the block's convolution.
    pub fn conv_config(&self) -> DilatedCircularConvConfig {
        DilatedCircularConvConfig::new(self.channels_in)
            .with_channels_out(Some(self.channels_out))
            .with_n_adj(self.n_adj)
            .with_dilation(self.dilation)
    }

    /// Check the convolution and normalization settings.
    pub fn validate(&self) -> crate::error::Result<()> {
        self.conv_config().validate()?;
        if !(0.0..=1.0).contains(&self.norm_momentum) {
            return Err(SnakeNetError::invalid_config(format!(
                "normalization momentum must lie in [0, 1], got {}",
                self.norm_momentum
            )));
        }
        if self.norm_epsilon <= 0.0 {
            return Err(SnakeNetError::invalid_config(format!(
                "normalization epsilon must be positive, got {}",
                self.norm_epsilon
            )));
        }
        Ok(())
    }
}

/// Configuration for the full snake network.
///
/// Only the state width and the input feature width are configurable. Depth,
/// dilation schedule and fusion width are fixed by the architecture.
#[derive(Config, Debug)]
pub struct SnakeNetConfig {
    /// Channel width of every retained state.
    pub state_dim: usize,

    /// Channel width of the input point features.
    pub edge_feature_dim: usize,
}

impl SnakeNetConfig {
    /// Configuration of the head block.
    pub fn head_config(&self) -> SnakeBlockConfig {
        SnakeBlockConfig::new(self.edge_feature_dim, self.state_dim).with_n_adj(HEAD_N_ADJ)
    }

    /// Configurations of the residual blocks, in stacking order.
    pub fn res_configs(&self) -> Vec<SnakeBlockConfig> {
        RES_DILATIONS
            .iter()
            .map(|&dilation| {
                SnakeBlockConfig::new(self.state_dim, self.state_dim)
                    .with_n_adj(RES_N_ADJ)
                    .with_dilation(dilation)
            })
            .collect()
    }

    /// Number of retained states (head output plus one per residual block).
    pub fn num_states(&self) -> usize {
        RES_LAYER_NUM + 1
    }

    /// Channel width of the concatenated states.
    pub fn concat_state_dim(&self) -> usize {
        self.state_dim * self.num_states()
    }

    /// Channel width entering the prediction head.
    pub fn prediction_input_dim(&self) -> usize {
        FUSION_STATE_DIM + self.concat_state_dim()
    }

    /// Smallest point count every block accepts.
    pub fn min_points(&self) -> usize {
        self.res_configs()
            .iter()
            .map(|c| c.conv_config().radius())
            .chain(std::iter::once(self.head_config().conv_config().radius()))
            .max()
            .unwrap_or(0)
            .max(1)
    }

    /// One-sided receptive field of the convolution stack, in points.
    pub fn receptive_radius(&self) -> usize {
        self.head_config().conv_config().radius()
            + self
                .res_configs()
                .iter()
                .map(|c| c.conv_config().radius())
                .sum::<usize>()
    }

    /// Number of convolution weights and biases in the network.
    pub fn conv_param_count(&self) -> usize {
        let conv = |c_in: usize, c_out: usize, k: usize| c_in * c_out * k + c_out;

        let head = self.head_config();
        let mut count = conv(head.channels_in, head.channels_out, head.conv_config().kernel_size());
        for res in self.res_configs() {
            count += conv(res.channels_in, res.channels_out, res.conv_config().kernel_size());
        }

        count += conv(self.concat_state_dim(), FUSION_STATE_DIM, 1);

        let mut in_dim = self.prediction_input_dim();
        for &out_dim in &PREDICTION_HIDDEN_DIMS {
            count += conv(in_dim, out_dim, 1);
            in_dim = out_dim;
        }
        count + conv(in_dim, OFFSET_DIM, 1)
    }

    /// Number of learnable normalization scales and shifts in the network.
    pub fn norm_param_count(&self) -> usize {
        2 * self.state_dim * self.num_states()
    }

    /// Check the widths and every block's settings.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.state_dim == 0 {
            return Err(SnakeNetError::invalid_config("state_dim must be positive"));
        }
        if self.edge_feature_dim == 0 {
            return Err(SnakeNetError::invalid_config(
                "edge_feature_dim must be positive",
            ));
        }

        self.head_config().validate()?;
        for block in self.res_configs() {
            block.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conv_config_defaults() {
        let config = DilatedCircularConvConfig::new(8);
        assert_eq!(config.n_adj, 4);
        assert_eq!(config.dilation, 1);
        assert_eq!(config.out_channels(), 8);
        assert_eq!(config.kernel_size(), 9);
        assert_eq!(config.radius(), 4);

        let config = config.with_channels_out(Some(16)).with_dilation(4);
        assert_eq!(config.out_channels(), 16);
        assert_eq!(config.radius(), 16);
    }

    #[test]
    fn test_zero_radius_conv() {
        let config = DilatedCircularConvConfig::new(8).with_n_adj(0).with_dilation(4);
        assert_eq!(config.kernel_size(), 1);
        assert_eq!(config.radius(), 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_conv_config_rejects_zero_dilation() {
        let config = DilatedCircularConvConfig::new(8).with_dilation(0);
        assert!(config.validate().unwrap_err().is_config_error());

        let config = DilatedCircularConvConfig::new(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_block_config_norm_settings() {
        let config = SnakeBlockConfig::new(4, 8);
        assert!(config.validate().is_ok());

        let bad = SnakeBlockConfig::new(4, 8).with_norm_momentum(1.5);
        assert!(bad.validate().is_err());

        let bad = SnakeBlockConfig::new(4, 8).with_norm_epsilon(0.0);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_snake_config_bookkeeping() {
        let config = SnakeNetConfig::new(8, 4);
        assert!(config.validate().is_ok());

        assert_eq!(config.num_states(), 8);
        assert_eq!(config.concat_state_dim(), 64);
        assert_eq!(config.prediction_input_dim(), 256 + 64);
        assert_eq!(config.min_points(), 16);
        // 4 (head) + 4 * (1 + 1 + 1 + 2 + 2 + 4 + 4)
        assert_eq!(config.receptive_radius(), 64);
        assert_eq!(config.norm_param_count(), 2 * 8 * 8);

        let dilations: Vec<usize> = config.res_configs().iter().map(|c| c.dilation).collect();
        assert_eq!(dilations, RES_DILATIONS.to_vec());
    }

    #[test]
    fn test_conv_param_count() {
        let config = SnakeNetConfig::new(8, 4);

        let head = 4 * 8 * 9 + 8;
        let res = 7 * (8 * 8 * 9 + 8);
        let fusion = 64 * 256 + 256;
        let prediction = (320 * 256 + 256) + (256 * 64 + 64) + (64 * 2 + 2);

        assert_eq!(config.conv_param_count(), head + res + fusion + prediction);
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = SnakeNetConfig::new(8, 4);
        let json = burn::config::config_to_json(&config);
        let loaded = SnakeNetConfig::load_binary(json.as_bytes()).unwrap();
        assert_eq!(loaded.state_dim, 8);
        assert_eq!(loaded.edge_feature_dim, 4);

        let conv = DilatedCircularConvConfig::new(3)
            .with_channels_out(Some(5))
            .with_dilation(2);
        let json = burn::config::config_to_json(&conv);
        let loaded = DilatedCircularConvConfig::load_binary(json.as_bytes()).unwrap();
        assert_eq!(loaded.out_channels(), 5);
        assert_eq!(loaded.radius(), 8);

        let block = SnakeBlockConfig::new(4, 8).with_norm_momentum(0.2);
        let json = burn::config::config_to_json(&block);
        let loaded = SnakeBlockConfig::load_binary(json.as_bytes()).unwrap();
        assert_eq!(loaded.norm_momentum, 0.2);
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_snake_config_rejects_zero_dims() {
        let err = SnakeNetConfig::new(0, 4).validate().unwrap_err();
        assert!(err.is_config_error());

        let err = SnakeNetConfig::new(8, 0).validate().unwrap_err();
        assert!(err.is_config_error());
    }
}
