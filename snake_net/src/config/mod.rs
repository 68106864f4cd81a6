//! Configuration types for snake_net.
//!
//! Burn-style configuration structs for the circular convolution, the snake
//! block and the full network, plus the fixed architecture constants.

mod network;

pub use network::{
    DilatedCircularConvConfig, SnakeBlockConfig, SnakeNetConfig, FUSION_STATE_DIM, HEAD_N_ADJ,
    OFFSET_DIM, PREDICTION_HIDDEN_DIMS, RES_DILATIONS, RES_LAYER_NUM, RES_N_ADJ,
};
