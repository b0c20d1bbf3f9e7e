//! 2D forward DFT of a synthetic grayscale image, on the host and on the device.

mod cpu;
mod size;

pub use cpu::Fft2d;
pub use rustfft::num_complex::Complex32;
pub use size::{is_5_smooth, optimal_dft_size};

use crate::{
    error::{positive, try_filled},
    timing::{Sample, Summary},
    BenchError, Result, TransformConfig,
};
use std::{fmt, mem::size_of};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Dims {
    pub rows: usize,
    pub cols: usize,
}

impl Dims {
    /// Rejects zero sides, and sides whose padded buffer could not be addressed.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let ans = Self {
            rows: positive("rows", rows)?,
            cols: positive("cols", cols)?,
        };
        footprint(ans.padded())?;
        Ok(ans)
    }

    /// `rows * cols`, failing with `Alloc` when a complex buffer that long overflows `usize`.
    #[inline]
    pub fn area(&self) -> Result<usize> {
        self.rows
            .checked_mul(self.cols)
            .filter(|area| area.checked_mul(size_of::<Complex32>()).is_some())
            .ok_or(BenchError::Alloc { bytes: usize::MAX })
    }

    /// Each dimension rounded up on its own to the optimal transform size.
    #[inline]
    pub fn padded(&self) -> Self {
        Self {
            rows: optimal_dft_size(self.rows),
            cols: optimal_dft_size(self.cols),
        }
    }
}

impl fmt::Display for Dims {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Bytes taken by a complex single precision buffer of `dims`.
#[inline]
pub fn footprint(dims: Dims) -> Result<usize> {
    Ok(size_of::<Complex32>() * dims.area()?)
}

/// One channel, one byte per pixel, row-major.
pub struct GrayImage {
    dims: Dims,
    pixels: Vec<u8>,
}

impl GrayImage {
    pub fn filled(dims: Dims, value: u8) -> Result<Self> {
        Ok(Self {
            dims,
            pixels: try_filled(dims.area()?, value)?,
        })
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Real part from the pixels, zero imaginary part,
    /// zero padding appended to the bottom and the right.
    pub fn to_complex_padded(&self, padded: Dims) -> Result<Vec<Complex32>> {
        let Dims { rows, cols } = self.dims;
        assert!(padded.rows >= rows && padded.cols >= cols);

        let mut ans = try_filled(padded.area()?, Complex32::default())?;
        for (src, dst) in self
            .pixels
            .chunks_exact(cols)
            .zip(ans.chunks_exact_mut(padded.cols))
        {
            for (&p, z) in src.iter().zip(dst) {
                z.re = p as f32
            }
        }
        Ok(ans)
    }
}

/// Timing and memory of one side of the comparison.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PathReport {
    pub summary: Summary,
    /// Bytes of the transformed buffer.
    pub bytes: usize,
}

impl PathReport {
    fn new(samples: &[Sample], bytes: usize) -> Result<Self> {
        Ok(Self {
            summary: Summary::new(samples)
                .ok_or(BenchError::InvalidSize { what: "runs", value: 0 })?,
            bytes,
        })
    }

    /// Whole MiB, rounded down.
    #[inline]
    pub const fn megabytes(&self) -> usize {
        self.bytes / 1024 / 1024
    }
}

/// How far the device result strays from the host result.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Discrepancy {
    pub max_abs: f64,
    /// Sum of absolute differences over sum of absolute reference values.
    pub relative: f64,
}

pub fn compare(result: &[Complex32], reference: &[Complex32]) -> Discrepancy {
    assert_eq!(result.len(), reference.len());
    let mut max_abs = 0.;
    let mut up = 0.;
    let mut down = 0.;
    for (r, a) in result.iter().zip(reference) {
        for (r, a) in [(r.re, a.re), (r.im, a.im)] {
            let (r, a) = (r as f64, a as f64);
            let diff = (r - a).abs();
            max_abs = f64::max(max_abs, diff);
            up += diff;
            down += a.abs();
        }
    }
    Discrepancy {
        max_abs,
        relative: if down > 0. { up / down } else { up },
    }
}

pub struct TransformReport {
    pub requested: Dims,
    pub padded: Dims,
    pub cpu: PathReport,
    /// Device failures do not void the host result.
    pub gpu: Result<PathReport>,
    pub discrepancy: Option<Discrepancy>,
}

pub fn run(config: &TransformConfig) -> Result<TransformReport> {
    let config = &config.validated()?;
    let requested = config.dims;
    let padded = requested.padded();
    log::info!(
        "transform: {requested} padded to {padded}, {} MiB per buffer",
        footprint(padded)? >> 20,
    );

    let image = GrayImage::filled(requested, config.gray)?;
    let input = image.to_complex_padded(padded)?;

    let (cpu, host_result) = cpu::run(&input, padded, config)?;
    let (gpu, discrepancy) = match gpu::run(&input, padded, config) {
        Ok((report, device_result)) => (
            Ok(report),
            device_result.map(|device_result| compare(&device_result, &host_result)),
        ),
        Err(e) => (Err(e), None),
    };
    if let Some(d) = &discrepancy {
        log::debug!("gpu vs cpu: max abs diff {:e}, relative {:e}", d.max_abs, d.relative);
    }
    Ok(TransformReport {
        requested,
        padded,
        cpu,
        gpu,
        discrepancy,
    })
}

#[cfg(detected_cufft)]
mod gpu;

#[cfg(not(detected_cufft))]
mod gpu {
    use super::{Complex32, Dims, PathReport};
    use crate::{BenchError, Result, TransformConfig};

    pub(super) fn run(
        _input: &[Complex32],
        _dims: Dims,
        _config: &TransformConfig,
    ) -> Result<(PathReport, Option<Vec<Complex32>>)> {
        Err(BenchError::DeviceUnavailable(
            "built without a cuda toolkit providing cufft".into(),
        ))
    }
}

#[test]
fn test_padding() {
    for (rows, cols) in [(1, 1), (97, 1001), (4096, 4096), (4097, 13), (480, 641)] {
        let requested = Dims::new(rows, cols).unwrap();
        let padded = requested.padded();
        assert!(padded.rows >= rows && padded.cols >= cols);
        assert!(is_5_smooth(padded.rows) && is_5_smooth(padded.cols));
    }
    assert!(matches!(
        Dims::new(0, 16),
        Err(BenchError::InvalidSize { what: "rows", value: 0 })
    ));
    assert!(Dims::new(16, 0).is_err());
}

#[test]
fn test_oversized() {
    let huge = 1 << (usize::BITS / 2);
    for (rows, cols) in [(huge, huge), (usize::MAX, 1), (1, usize::MAX / 4)] {
        assert!(
            matches!(Dims::new(rows, cols), Err(BenchError::Alloc { .. })),
            "{rows}x{cols}",
        );
    }

    let dims = Dims { rows: huge, cols: huge };
    assert!(matches!(dims.area(), Err(BenchError::Alloc { .. })));
    assert!(matches!(footprint(dims), Err(BenchError::Alloc { .. })));
    assert!(matches!(
        GrayImage::filled(dims, 0),
        Err(BenchError::Alloc { .. })
    ));
    assert!(matches!(Fft2d::new(dims), Err(BenchError::Alloc { .. })));

    let config = TransformConfig {
        dims,
        ..TransformConfig::default()
    };
    assert!(matches!(run(&config), Err(BenchError::Alloc { .. })));
}

#[test]
fn test_unchecked_config() {
    let config = TransformConfig {
        runs: 0,
        ..TransformConfig::new(Dims::new(8, 8).unwrap(), 1).unwrap()
    };
    assert!(matches!(
        run(&config),
        Err(BenchError::InvalidSize { what: "runs", value: 0 })
    ));

    let config = TransformConfig {
        dims: Dims { rows: 8, cols: 0 },
        ..TransformConfig::default()
    };
    assert!(matches!(
        run(&config),
        Err(BenchError::InvalidSize { what: "cols", value: 0 })
    ));
    assert!(PathReport::new(&[], 64).is_err());
}

#[test]
fn test_footprint_linear() {
    let unit = footprint(Dims { rows: 1, cols: 1 }).unwrap();
    assert_eq!(unit, 8);
    for (rows, cols) in [(3, 5), (100, 40), (4096, 4096), (4320, 1024)] {
        let dims = Dims { rows, cols };
        assert_eq!(footprint(dims).unwrap(), unit * dims.area().unwrap());
    }
    let report = PathReport::new(
        &[Sample {
            elapsed: Default::default(),
            bytes: 0,
        }],
        footprint(Dims { rows: 4096, cols: 4096 }).unwrap(),
    )
    .unwrap();
    assert_eq!(report.megabytes(), 128);
}

#[test]
fn test_to_complex_padded() {
    let image = GrayImage::filled(Dims::new(2, 3).unwrap(), 128).unwrap();
    let padded = image
        .to_complex_padded(Dims { rows: 3, cols: 4 })
        .unwrap();
    let re = padded.iter().map(|z| z.re).collect::<Vec<_>>();
    #[rustfmt::skip]
    assert_eq!(re, [
        128., 128., 128., 0.,
        128., 128., 128., 0.,
          0.,   0.,   0., 0.,
    ]);
    assert!(padded.iter().all(|z| z.im == 0.));
}

#[test]
fn test_compare() {
    let a = [Complex32::new(1., 2.), Complex32::new(-3., 0.)];
    let b = [Complex32::new(1., 2.5), Complex32::new(-3., 0.)];
    let d = compare(&a, &b);
    assert_eq!(d.max_abs, 0.5);
    assert!((d.relative - 0.5 / 6.5).abs() < 1e-12);
    assert_eq!(compare(&a, &a).max_abs, 0.);
}

#[test]
fn test_run() {
    let config = TransformConfig {
        runs: 2,
        warm_up: 1,
        verify: true,
        ..TransformConfig::new(Dims::new(30, 47).unwrap(), 1).unwrap()
    };
    let report = run(&config).unwrap();
    assert_eq!(report.padded, Dims { rows: 30, cols: 48 });
    assert_eq!(report.cpu.bytes, 8 * 30 * 48);
    assert_eq!(report.cpu.summary.runs, 2);
    match &report.gpu {
        Ok(gpu) => {
            assert_eq!(gpu.bytes, report.cpu.bytes);
            assert_eq!(gpu.summary.runs, 2);
            let d = report.discrepancy.unwrap();
            assert!(d.relative < 1e-4, "{d:?}");
        }
        Err(e) => {
            assert!(matches!(e, BenchError::DeviceUnavailable(_)), "{e}");
            assert!(report.discrepancy.is_none());
        }
    }
}

#[test]
fn test_constant_image() {
    let dims = Dims::new(30, 50).unwrap();
    let image = GrayImage::filled(dims, 128).unwrap();
    assert_eq!(image.dims(), dims);
    let mut data = image.to_complex_padded(dims.padded()).unwrap();
    Fft2d::new(dims).unwrap().forward(&mut data);

    let dc = 128. * dims.area().unwrap() as f32;
    assert!((data[0].re - dc).abs() / dc < 1e-5);
    assert!(data[1..].iter().all(|z| z.norm() < dc * 1e-5));
}
