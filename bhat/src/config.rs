use crate::{error::positive, transform::Dims, BenchError, Result};
use clap::{Args, Parser, Subcommand};

pub const DEFAULT_ROWS: usize = 4096;
pub const DEFAULT_COLS: usize = 4096;
/// Pixel value of the synthetic image, mid gray.
pub const DEFAULT_GRAY: u8 = 128;
/// 16 Mi elements, 128 MiB per array: far beyond any last level cache.
pub const DEFAULT_ELEMENTS: usize = 1 << 24;
pub const DEFAULT_REPETITIONS: usize = 4;
pub const DEFAULT_SCALAR: f64 = 2.0;

/// Benchmarking heterogeneous architecture tool.
///
/// Times a 2D forward FFT on the CPU and on the GPU,
/// and STREAM copy/add/scale/triad bandwidth on the CPU.
#[derive(Parser, Debug)]
#[command(name = "bhat", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub transform: TransformArgs,

    #[command(flatten)]
    pub stream: StreamArgs,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum Command {
    /// Run both benchmarks (default).
    #[default]
    All,
    /// 2D FFT, CPU then GPU.
    Transform,
    /// STREAM bandwidth on the CPU.
    Stream,
}

#[derive(Args, Clone, Debug)]
pub struct TransformArgs {
    /// Image rows.
    #[arg(long, global = true, env = "BHAT_ROWS", default_value_t = DEFAULT_ROWS)]
    pub rows: usize,
    /// Image columns.
    #[arg(long, global = true, env = "BHAT_COLS", default_value_t = DEFAULT_COLS)]
    pub cols: usize,
    /// Timed transform runs per device.
    #[arg(long, global = true, default_value_t = 1)]
    pub runs: usize,
    /// Untimed transform runs before timing starts.
    #[arg(long, global = true, default_value_t = 0)]
    pub warm_up: usize,
    /// Copy the GPU result back and compare it with the CPU result.
    #[arg(long, global = true)]
    pub verify: bool,
}

#[derive(Args, Clone, Debug)]
pub struct StreamArgs {
    /// Elements per array.
    #[arg(long, global = true, env = "BHAT_ELEMENTS", default_value_t = DEFAULT_ELEMENTS)]
    pub elements: usize,
    /// Back to back runs of each kernel.
    #[arg(long, global = true, default_value_t = DEFAULT_REPETITIONS)]
    pub repetitions: usize,
    /// Scalar of the scale and triad kernels.
    #[arg(long, global = true, default_value_t = DEFAULT_SCALAR)]
    pub scalar: f64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TransformConfig {
    pub dims: Dims,
    pub gray: u8,
    pub runs: usize,
    pub warm_up: usize,
    pub verify: bool,
}

impl TransformConfig {
    pub fn new(dims: Dims, runs: usize) -> Result<Self> {
        Self {
            dims,
            gray: DEFAULT_GRAY,
            runs,
            warm_up: 0,
            verify: false,
        }
        .validated()
    }

    /// Checks a configuration that may have been assembled field by field.
    pub fn validated(self) -> Result<Self> {
        Dims::new(self.dims.rows, self.dims.cols)?;
        positive("runs", self.runs)?;
        Ok(self)
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            dims: Dims {
                rows: DEFAULT_ROWS,
                cols: DEFAULT_COLS,
            },
            gray: DEFAULT_GRAY,
            runs: 1,
            warm_up: 0,
            verify: false,
        }
    }
}

impl TryFrom<&TransformArgs> for TransformConfig {
    type Error = BenchError;

    fn try_from(args: &TransformArgs) -> Result<Self> {
        Ok(Self {
            warm_up: args.warm_up,
            verify: args.verify,
            ..Self::new(Dims::new(args.rows, args.cols)?, args.runs)?
        })
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct StreamConfig {
    pub elements: usize,
    pub repetitions: usize,
    pub scalar: f64,
}

impl StreamConfig {
    pub fn new(elements: usize, repetitions: usize, scalar: f64) -> Result<Self> {
        Self {
            elements,
            repetitions,
            scalar,
        }
        .validated()
    }

    /// Checks a configuration that may have been assembled field by field.
    ///
    /// The four arrays together must stay addressable.
    pub fn validated(self) -> Result<Self> {
        positive("elements", self.elements)?
            .checked_mul(4 * size_of::<f64>())
            .ok_or(BenchError::Alloc { bytes: usize::MAX })?;
        positive("repetitions", self.repetitions)?;
        Ok(self)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            elements: DEFAULT_ELEMENTS,
            repetitions: DEFAULT_REPETITIONS,
            scalar: DEFAULT_SCALAR,
        }
    }
}

impl TryFrom<&StreamArgs> for StreamConfig {
    type Error = BenchError;

    fn try_from(args: &StreamArgs) -> Result<Self> {
        Self::new(args.elements, args.repetitions, args.scalar)
    }
}

#[test]
fn test_defaults() {
    let args = Cli::try_parse_from(["bhat"]).unwrap();
    assert_eq!(args.command, None);
    assert_eq!(
        TransformConfig::try_from(&args.transform).unwrap(),
        TransformConfig::default(),
    );
    assert_eq!(
        StreamConfig::try_from(&args.stream).unwrap(),
        StreamConfig::default(),
    );
}

#[test]
fn test_overrides() {
    let args = Cli::try_parse_from([
        "bhat", "transform", "--rows", "100", "--cols", "37", "--runs", "3", "--verify",
    ])
    .unwrap();
    assert_eq!(args.command, Some(Command::Transform));
    let config = TransformConfig::try_from(&args.transform).unwrap();
    assert_eq!(config.dims, Dims { rows: 100, cols: 37 });
    assert_eq!(config.runs, 3);
    assert!(config.verify);

    let args =
        Cli::try_parse_from(["bhat", "--elements", "64", "stream", "--scalar", "3"]).unwrap();
    assert_eq!(args.command, Some(Command::Stream));
    let config = StreamConfig::try_from(&args.stream).unwrap();
    assert_eq!(config, StreamConfig::new(64, DEFAULT_REPETITIONS, 3.0).unwrap());
}

#[test]
fn test_rejects() {
    assert!(Cli::try_parse_from(["bhat", "--rows", "-1"]).is_err());

    let args = Cli::try_parse_from(["bhat", "--cols", "0"]).unwrap();
    assert!(matches!(
        TransformConfig::try_from(&args.transform),
        Err(BenchError::InvalidSize { what: "cols", value: 0 })
    ));
    let args = Cli::try_parse_from(["bhat", "--runs", "0"]).unwrap();
    assert!(TransformConfig::try_from(&args.transform).is_err());

    let max = usize::MAX.to_string();
    let args = Cli::try_parse_from(["bhat", "--elements", max.as_str()]).unwrap();
    assert!(matches!(
        StreamConfig::try_from(&args.stream),
        Err(BenchError::Alloc { .. })
    ));
}

#[test]
fn test_validated() {
    let config = StreamConfig {
        repetitions: 0,
        ..StreamConfig::default()
    };
    assert!(matches!(
        config.validated(),
        Err(BenchError::InvalidSize { what: "repetitions", value: 0 })
    ));
    let config = TransformConfig {
        runs: 0,
        ..TransformConfig::default()
    };
    assert!(config.validated().is_err());
    assert_eq!(
        TransformConfig::default().validated().unwrap(),
        TransformConfig::default(),
    );
}
