//! Circular padding and dilated circular convolution over closed point sequences.
//!
//! A point sequence has shape `[batch, channels, num_points]` and is cyclic:
//! point `num_points - 1` is adjacent to point `0`. Padding copies boundary
//! columns from the opposite end, so a "valid" convolution over the padded
//! sequence equals a convolution over the infinite periodic repetition of the
//! original and preserves the point count.

use burn::module::{Ignored, Module};
use burn::nn::conv::{Conv1d, Conv1dConfig};
use burn::nn::PaddingConfig1d;
use burn::prelude::*;

use crate::config::DilatedCircularConvConfig;
use crate::error::{Result, SnakeNetError};
use crate::nn::shape::{ensure_channels, ensure_non_empty};

/// Wrap a point sequence by `radius` columns on each side.
///
/// Input shape: [batch, channels, num_points]
/// Output shape: [batch, channels, num_points + 2 * radius]
///
/// The first `radius` output columns are the last `radius` input columns and the
/// last `radius` output columns are the first `radius` input columns. A zero
/// radius returns the input unchanged.
///
/// Fails with [`SnakeNetError::SequenceTooShort`] when `num_points < radius`,
/// since the wrap would have to repeat the sequence more than once.
pub fn circular_pad<B: Backend>(x: Tensor<B, 3>, radius: usize) -> Result<Tensor<B, 3>> {
    let dims = x.dims();
    ensure_non_empty(dims, "circular_pad")?;

    if radius == 0 {
        return Ok(x);
    }

    let [batch, channels, num_points] = dims;
    if num_points < radius {
        log::warn!(
            "circular_pad: {} points cannot be wrapped by radius {}",
            num_points,
            radius
        );
        return Err(SnakeNetError::SequenceTooShort { num_points, radius });
    }

    let head = x
        .clone()
        .slice([0..batch, 0..channels, num_points - radius..num_points]);
    let tail = x.clone().slice([0..batch, 0..channels, 0..radius]);

    Ok(Tensor::cat(vec![head, x, tail], 2))
}

/// Cyclically rotate a point sequence along the point axis.
///
/// Point `i` of the input lands at position `(i + shift) mod num_points` of the
/// output. Negative shifts rotate the other way.
pub fn roll_points<B: Backend>(x: Tensor<B, 3>, shift: isize) -> Result<Tensor<B, 3>> {
    let dims = x.dims();
    ensure_non_empty(dims, "roll_points")?;

    let [batch, channels, num_points] = dims;
    let shift = shift.rem_euclid(num_points as isize) as usize;
    if shift == 0 {
        return Ok(x);
    }

    let split = num_points - shift;
    let back = x.clone().slice([0..batch, 0..channels, split..num_points]);
    let front = x.slice([0..batch, 0..channels, 0..split]);

    Ok(Tensor::cat(vec![back, front], 2))
}

/// 1-D convolution over a circularly padded point sequence.
///
/// The kernel spans `2 * n_adj + 1` taps spaced `dilation` points apart. The input
/// is padded by `n_adj * dilation` on each side before a stride-1 convolution
/// without further padding, so the output keeps the input's point count.
#[derive(Module, Debug)]
pub struct DilatedCircularConv<B: Backend> {
    /// Underlying convolution.
    pub(crate) conv: Conv1d<B>,
    /// Input channel width.
    channels_in: Ignored<usize>,
    /// Output channel width.
    channels_out: Ignored<usize>,
    /// Neighbors on each side.
    n_adj: Ignored<usize>,
    /// Spacing between neighbors.
    dilation: Ignored<usize>,
}

impl DilatedCircularConvConfig {
    /// Initialize a dilated circular convolution.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<DilatedCircularConv<B>> {
        self.validate()?;

        let conv = Conv1dConfig::new(self.channels_in, self.out_channels(), self.kernel_size())
            .with_dilation(self.dilation)
            .with_padding(PaddingConfig1d::Valid)
            .with_bias(true)
            .init(device);

        Ok(DilatedCircularConv {
            conv,
            channels_in: Ignored(self.channels_in),
            channels_out: Ignored(self.out_channels()),
            n_adj: Ignored(self.n_adj),
            dilation: Ignored(self.dilation),
        })
    }
}

impl<B: Backend> DilatedCircularConv<B> {
    /// Forward pass.
    ///
    /// Input shape: [batch, channels_in, num_points]
    /// Output shape: [batch, channels_out, num_points]
    pub fn forward(&self, x: Tensor<B, 3>) -> Result<Tensor<B, 3>> {
        ensure_channels(x.dims(), self.channels_in.0, "dilated circular conv")?;

        let padded = if self.n_adj.0 == 0 {
            x
        } else {
            circular_pad(x, self.radius())?
        };

        Ok(self.conv.forward(padded))
    }

    /// Circular padding applied on each side.
    pub fn radius(&self) -> usize {
        self.n_adj.0 * self.dilation.0
    }

    /// Number of neighbors on each side.
    pub fn n_adj(&self) -> usize {
        self.n_adj.0
    }

    /// Spacing between neighbors.
    pub fn dilation(&self) -> usize {
        self.dilation.0
    }

    /// Input channel width.
    pub fn channels_in(&self) -> usize {
        self.channels_in.0
    }

    /// Output channel width.
    pub fn channels_out(&self) -> usize {
        self.channels_out.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::module::Param;

    type TestBackend = NdArray;

    fn sequence(values: Vec<f32>, shape: [usize; 3]) -> Tensor<TestBackend, 3> {
        let device = Default::default();
        Tensor::from_data(TensorData::new(values, shape), &device)
    }

    fn values(x: Tensor<TestBackend, 3>) -> Vec<f32> {
        x.into_data().to_vec().unwrap()
    }

    #[test]
    fn test_circular_pad_wraps_ends() {
        // One channel, points 0..6
        let x = sequence((0..6).map(|i| i as f32).collect(), [1, 1, 6]);
        let padded = circular_pad(x, 2).unwrap();

        assert_eq!(padded.dims(), [1, 1, 10]);
        assert_eq!(
            values(padded),
            vec![4.0, 5.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_circular_pad_per_channel() {
        // Two channels: 0..4 and 10..14
        let data: Vec<f32> = (0..4).chain(10..14).map(|i| i as f32).collect();
        let x = sequence(data, [1, 2, 4]);
        let padded = circular_pad(x, 1).unwrap();

        assert_eq!(
            values(padded),
            vec![3.0, 0.0, 1.0, 2.0, 3.0, 0.0, 13.0, 10.0, 11.0, 12.0, 13.0, 10.0]
        );
    }

    #[test]
    fn test_circular_pad_zero_radius() {
        let x = sequence(vec![1.0, 2.0, 3.0], [1, 1, 3]);
        let padded = circular_pad(x, 0).unwrap();
        assert_eq!(values(padded), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_circular_pad_full_wrap() {
        // radius == num_points is the largest accepted radius
        let x = sequence(vec![1.0, 2.0], [1, 1, 2]);
        let padded = circular_pad(x, 2).unwrap();
        assert_eq!(values(padded), vec![1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);
    }

    #[test]
    fn test_circular_pad_rejects_short_sequence() {
        let x = sequence(vec![1.0, 2.0, 3.0], [1, 1, 3]);
        let err = circular_pad(x, 4).unwrap_err();
        assert_eq!(
            err,
            SnakeNetError::SequenceTooShort {
                num_points: 3,
                radius: 4
            }
        );
    }

    #[test]
    fn test_roll_points() {
        let x = sequence((0..5).map(|i| i as f32).collect(), [1, 1, 5]);

        let rolled = roll_points(x.clone(), 2).unwrap();
        assert_eq!(values(rolled), vec![3.0, 4.0, 0.0, 1.0, 2.0]);

        let rolled = roll_points(x.clone(), -1).unwrap();
        assert_eq!(values(rolled), vec![1.0, 2.0, 3.0, 4.0, 0.0]);

        let rolled = roll_points(x, 5).unwrap();
        assert_eq!(values(rolled), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_conv_preserves_point_count() {
        let device = Default::default();
        let conv = DilatedCircularConvConfig::new(3)
            .with_channels_out(Some(5))
            .with_dilation(2)
            .init::<TestBackend>(&device)
            .unwrap();

        assert_eq!(conv.radius(), 8);

        let x = Tensor::<TestBackend, 3>::ones([2, 3, 12], &device);
        let y = conv.forward(x).unwrap();
        assert_eq!(y.dims(), [2, 5, 12]);
    }

    #[test]
    fn test_conv_zero_radius_is_pointwise() {
        let device = Default::default();
        let conv = DilatedCircularConvConfig::new(2)
            .with_n_adj(0)
            .with_dilation(3)
            .init::<TestBackend>(&device)
            .unwrap();

        assert_eq!(conv.radius(), 0);

        // A single point is enough when no neighbors are sampled.
        let x = Tensor::<TestBackend, 3>::ones([1, 2, 1], &device);
        let y = conv.forward(x).unwrap();
        assert_eq!(y.dims(), [1, 2, 1]);
    }

    #[test]
    fn test_conv_matches_periodic_convolution() {
        let device = Default::default();
        let mut conv = DilatedCircularConvConfig::new(1)
            .with_n_adj(1)
            .with_dilation(2)
            .init::<TestBackend>(&device)
            .unwrap();

        let weights = [0.5f32, 1.0, -2.0];
        let bias = 0.25f32;
        conv.conv.weight = Param::from_tensor(Tensor::from_data(
            TensorData::new(weights.to_vec(), [1, 1, 3]),
            &device,
        ));
        conv.conv.bias = Some(Param::from_tensor(Tensor::from_data(
            TensorData::new(vec![bias], [1]),
            &device,
        )));

        let input: Vec<f32> = vec![1.0, -1.0, 2.0, 0.5, 3.0, -0.5, 1.5];
        let n = input.len();
        let y = conv
            .forward(sequence(input.clone(), [1, 1, n]))
            .unwrap();

        let expected: Vec<f32> = (0..n)
            .map(|i| {
                weights[0] * input[(i + n - 2) % n]
                    + weights[1] * input[i]
                    + weights[2] * input[(i + 2) % n]
                    + bias
            })
            .collect();

        for (got, want) in values(y).iter().zip(&expected) {
            assert!((got - want).abs() < 1e-5, "got {}, want {}", got, want);
        }
    }

    #[test]
    fn test_conv_rejects_wrong_channels() {
        let device = Default::default();
        let conv = DilatedCircularConvConfig::new(4)
            .init::<TestBackend>(&device)
            .unwrap();

        let x = Tensor::<TestBackend, 3>::ones([1, 3, 16], &device);
        let err = conv.forward(x).unwrap_err();
        assert!(err.is_shape_error());
    }

    #[test]
    fn test_conv_rejects_short_sequence() {
        let device = Default::default();
        let conv = DilatedCircularConvConfig::new(4)
            .with_dilation(4)
            .init::<TestBackend>(&device)
            .unwrap();

        let x = Tensor::<TestBackend, 3>::ones([1, 4, 15], &device);
        let err = conv.forward(x).unwrap_err();
        assert!(err.is_config_error());
    }
}
