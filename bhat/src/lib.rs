//! Benchmarking heterogeneous architecture tool.
//!
//! Two independent benchmarks:
//! [`transform`] times a 2D forward FFT of a synthetic image on the CPU and on the GPU,
//! [`bandwidth`] times STREAM copy/add/scale/triad over host memory.

pub mod bandwidth;
mod config;
mod error;
mod report;
pub mod timing;
pub mod transform;

pub use config::{
    Cli, Command, StreamArgs, StreamConfig, TransformArgs, TransformConfig, DEFAULT_COLS,
    DEFAULT_ELEMENTS, DEFAULT_GRAY, DEFAULT_REPETITIONS, DEFAULT_ROWS, DEFAULT_SCALAR,
};
pub use error::{BenchError, Result};
