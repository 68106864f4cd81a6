//! Shape checks shared by the layers.

use crate::error::{Result, SnakeNetError};

/// Reject tensors whose batch or point axis is empty.
pub(crate) fn ensure_non_empty(dims: [usize; 3], context: &'static str) -> Result<()> {
    let [batch, _, num_points] = dims;
    if batch == 0 || num_points == 0 {
        log::warn!("{}: rejecting empty tensor {:?}", context, dims);
        return Err(SnakeNetError::EmptyTensor {
            context,
            dims: dims.to_vec(),
        });
    }
    Ok(())
}

/// Reject tensors whose channel axis differs from `channels`.
pub(crate) fn ensure_channels(
    dims: [usize; 3],
    channels: usize,
    context: &'static str,
) -> Result<()> {
    ensure_non_empty(dims, context)?;
    let [batch, got, num_points] = dims;
    if got != channels {
        log::warn!(
            "{}: expected {} channels, got {}",
            context,
            channels,
            got
        );
        return Err(SnakeNetError::ShapeMismatch {
            context,
            expected: vec![batch, channels, num_points],
            got: dims.to_vec(),
        });
    }
    Ok(())
}

/// Reject a pair of tensors that cannot be added or concatenated along channels.
pub(crate) fn ensure_same_points(
    expected: [usize; 3],
    got: [usize; 3],
    context: &'static str,
) -> Result<()> {
    if expected[0] != got[0] || expected[2] != got[2] {
        log::warn!("{}: {:?} does not line up with {:?}", context, got, expected);
        return Err(SnakeNetError::ShapeMismatch {
            context,
            expected: vec![expected[0], got[1], expected[2]],
            got: got.to_vec(),
        });
    }
    Ok(())
}
