//! Neural network modules for contour deformation.
//!
//! This module provides:
//! - Circular padding and dilated circular convolution over closed point sequences
//! - The snake block (convolution, ReLU, batch norm)
//! - The full snake network and its prediction head
//! - Parameter enumeration for checkpointing harnesses

pub mod block;
pub mod circular;
pub mod inspect;
mod shape;
pub mod snake;

pub use block::SnakeBlock;
pub use circular::{circular_pad, roll_points, DilatedCircularConv};
pub use inspect::{DescribeParameters, ParameterEntry, ParameterInventory, ParameterKind};
pub use snake::{Mode, PredictionHead, SnakeNet, SnakeNetOutput};
