//! Parameter enumeration.
//!
//! Lists every float tensor a module owns under its dotted record path, so a
//! checkpointing harness can map burn records back to layers. Path segments are
//! the module field names, with list positions as indices. Serialization itself
//! is left to burn's record API.

use std::fmt;

use burn::nn::conv::Conv1d;
use burn::nn::BatchNorm;
use burn::prelude::*;

use crate::nn::block::SnakeBlock;
use crate::nn::circular::DilatedCircularConv;
use crate::nn::snake::{PredictionHead, SnakeNet};

/// Role of a parameter tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// Convolution kernel, shape [channels_out, channels_in, kernel_size].
    ConvWeight,
    /// Convolution bias, shape [channels_out].
    ConvBias,
    /// Normalization scale.
    NormScale,
    /// Normalization shift.
    NormShift,
    /// Running mean of the normalization, updated in training mode.
    RunningMean,
    /// Running variance of the normalization, updated in training mode.
    RunningVar,
}

impl ParameterKind {
    /// Whether the tensor is trained by gradient descent.
    pub fn is_learnable(&self) -> bool {
        !matches!(self, Self::RunningMean | Self::RunningVar)
    }
}

/// One parameter tensor of a module.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterEntry {
    /// Dotted record path, e.g. `res_blocks.3.conv.conv.weight`.
    pub name: String,
    /// Role of the tensor.
    pub kind: ParameterKind,
    /// Tensor shape.
    pub shape: Vec<usize>,
}

impl ParameterEntry {
    /// Number of scalar values in the tensor.
    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }
}

impl fmt::Display for ParameterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} {:?}", self.name, self.kind, self.shape)
    }
}

/// Modules that can list their parameter tensors.
pub trait DescribeParameters {
    /// Append an entry for every parameter tensor, names prefixed by `prefix`.
    fn describe_parameters(&self, prefix: &str, entries: &mut Vec<ParameterEntry>);
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn entry(prefix: &str, name: &str, kind: ParameterKind, shape: Vec<usize>) -> ParameterEntry {
    ParameterEntry {
        name: join(prefix, name),
        kind,
        shape,
    }
}

impl<B: Backend> DescribeParameters for Conv1d<B> {
    fn describe_parameters(&self, prefix: &str, entries: &mut Vec<ParameterEntry>) {
        entries.push(entry(
            prefix,
            "weight",
            ParameterKind::ConvWeight,
            self.weight.dims().to_vec(),
        ));
        if let Some(bias) = &self.bias {
            entries.push(entry(
                prefix,
                "bias",
                ParameterKind::ConvBias,
                bias.dims().to_vec(),
            ));
        }
    }
}

impl<B: Backend> DescribeParameters for BatchNorm<B, 1> {
    fn describe_parameters(&self, prefix: &str, entries: &mut Vec<ParameterEntry>) {
        entries.push(entry(
            prefix,
            "gamma",
            ParameterKind::NormScale,
            self.gamma.dims().to_vec(),
        ));
        entries.push(entry(
            prefix,
            "beta",
            ParameterKind::NormShift,
            self.beta.dims().to_vec(),
        ));
        entries.push(entry(
            prefix,
            "running_mean",
            ParameterKind::RunningMean,
            self.running_mean.value_sync().dims().to_vec(),
        ));
        entries.push(entry(
            prefix,
            "running_var",
            ParameterKind::RunningVar,
            self.running_var.value_sync().dims().to_vec(),
        ));
    }
}

impl<B: Backend> DescribeParameters for DilatedCircularConv<B> {
    fn describe_parameters(&self, prefix: &str, entries: &mut Vec<ParameterEntry>) {
        self.conv.describe_parameters(&join(prefix, "conv"), entries);
    }
}

impl<B: Backend> DescribeParameters for SnakeBlock<B> {
    fn describe_parameters(&self, prefix: &str, entries: &mut Vec<ParameterEntry>) {
        self.conv.describe_parameters(&join(prefix, "conv"), entries);
        self.norm.describe_parameters(&join(prefix, "norm"), entries);
    }
}

impl<B: Backend> DescribeParameters for PredictionHead<B> {
    fn describe_parameters(&self, prefix: &str, entries: &mut Vec<ParameterEntry>) {
        for (i, layer) in self.layers.iter().enumerate() {
            layer.describe_parameters(&join(prefix, &format!("layers.{}", i)), entries);
        }
        self.output.describe_parameters(&join(prefix, "output"), entries);
    }
}

impl<B: Backend> DescribeParameters for SnakeNet<B> {
    fn describe_parameters(&self, prefix: &str, entries: &mut Vec<ParameterEntry>) {
        self.head.describe_parameters(&join(prefix, "head"), entries);
        for (i, block) in self.res_blocks.iter().enumerate() {
            block.describe_parameters(&join(prefix, &format!("res_blocks.{}", i)), entries);
        }
        self.fusion.describe_parameters(&join(prefix, "fusion"), entries);
        self.prediction
            .describe_parameters(&join(prefix, "prediction"), entries);
    }
}

/// Flat list of a module's parameter tensors, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterInventory {
    entries: Vec<ParameterEntry>,
}

impl ParameterInventory {
    /// Enumerate the parameters of `module`.
    pub fn collect<M: DescribeParameters>(module: &M) -> Self {
        let mut entries = Vec::new();
        module.describe_parameters("", &mut entries);
        Self { entries }
    }

    /// All entries.
    pub fn entries(&self) -> &[ParameterEntry] {
        &self.entries
    }

    /// Entry with the given dotted name.
    pub fn get(&self, name: &str) -> Option<&ParameterEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of tensors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the module owns no tensors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of learnable scalars.
    pub fn num_learnable(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.kind.is_learnable())
            .map(ParameterEntry::num_elements)
            .sum()
    }

    /// Number of running-statistic scalars.
    pub fn num_running(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| !e.kind.is_learnable())
            .map(ParameterEntry::num_elements)
            .sum()
    }
}
