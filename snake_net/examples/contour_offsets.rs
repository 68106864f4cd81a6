//! Example: predicting per-point offsets for a closed contour.
//!
//! Builds a small snake network, runs it on a circle whose first point carries a
//! feature spike, then rotates the contour and checks the offsets rotate with it.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run -p snake_net --example contour_offsets
//! ```

use std::error::Error;

use burn::backend::ndarray::NdArrayDevice;
use burn::backend::NdArray;
use burn::prelude::*;

use snake_net::{roll_points, ParameterInventory, SnakeNet};

type MyBackend = NdArray;

const NUM_POINTS: usize = 32;
const EDGE_FEATURE_DIM: usize = 4;
const STATE_DIM: usize = 16;

/// Features per point: (x, y) on the unit circle, a constant, and a spike at `spike`.
fn circle_features(spike: usize, device: &NdArrayDevice) -> Tensor<MyBackend, 3> {
    let mut data = vec![0.0f32; EDGE_FEATURE_DIM * NUM_POINTS];
    for i in 0..NUM_POINTS {
        let theta = i as f32 / NUM_POINTS as f32 * std::f32::consts::TAU;
        data[i] = theta.cos();
        data[NUM_POINTS + i] = theta.sin();
        data[2 * NUM_POINTS + i] = 1.0;
    }
    data[3 * NUM_POINTS + spike] = 5.0;

    Tensor::from_data(
        TensorData::new(data, [1, EDGE_FEATURE_DIM, NUM_POINTS]),
        device,
    )
}

/// Split `[1, 2, num_points]` offsets into one (dx, dy) pair per point.
fn offset_pairs(offsets: Tensor<MyBackend, 3>) -> Result<Vec<(f32, f32)>, Box<dyn Error>> {
    let [batch, channels, num_points] = offsets.dims();
    if batch != 1 || channels != 2 {
        return Err(format!("expected offsets of shape [1, 2, N], got {:?}", offsets.dims()).into());
    }

    let values: Vec<f32> = offsets
        .into_data()
        .to_vec()
        .map_err(|e| format!("offsets are not f32: {:?}", e))?;

    let (xs, ys) = values.split_at(num_points);
    Ok(xs.iter().copied().zip(ys.iter().copied()).collect())
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    env_logger::init();

    let device = NdArrayDevice::Cpu;

    println!("═══════════════════════════════════════════════════════════════");
    println!("          SnakeNet Contour Offsets");
    println!("═══════════════════════════════════════════════════════════════");
    println!();

    let net = SnakeNet::<MyBackend>::new(STATE_DIM, EDGE_FEATURE_DIM, &device)?;

    let inventory = ParameterInventory::collect(&net);
    println!(
        "Network: {} tensors, {} learnable values, {} running statistics",
        inventory.len(),
        inventory.num_learnable(),
        inventory.num_running()
    );
    println!("Minimum contour length: {} points", net.min_points());
    println!();

    let offsets = net.forward(circle_features(0, &device))?;
    let pairs = offset_pairs(offsets.clone())?;

    println!("Offsets for the first 4 points:");
    for (i, (dx, dy)) in pairs.iter().take(4).enumerate() {
        println!("  point {:2}: ({:+.4}, {:+.4})", i, dx, dy);
    }
    println!();

    // Rotate the whole contour by 3 points; the offsets should rotate with it.
    let rotated_input = roll_points(circle_features(0, &device), 3)?;
    let rotated = net.forward(rotated_input)?;
    let expected = roll_points(offsets, 3)?;

    let max_diff = offset_pairs(rotated)?
        .into_iter()
        .zip(offset_pairs(expected)?)
        .map(|((x1, y1), (x2, y2))| (x1 - x2).abs().max((y1 - y2).abs()))
        .fold(0.0f32, f32::max);

    println!("Max difference after rotating the contour by 3 points: {:e}", max_diff);

    Ok(())
}
