use super::{footprint, Dims, PathReport};
use crate::{error::try_filled, timing::Sample, Result, TransformConfig};
use rustfft::{num_complex::Complex32, Fft, FftPlanner};
use std::{sync::Arc, time::Instant};

/// Row-major 2D forward transform: rows, transpose, columns, transpose back.
pub struct Fft2d {
    dims: Dims,
    along_rows: Arc<dyn Fft<f32>>,
    along_cols: Arc<dyn Fft<f32>>,
    transposed: Vec<Complex32>,
    row_scratch: Vec<Complex32>,
    col_scratch: Vec<Complex32>,
}

impl Fft2d {
    pub fn new(dims: Dims) -> Result<Self> {
        let zero = Complex32::default();
        // planning allocates twiddles without reporting failure, so the big buffer goes first
        let transposed = try_filled(dims.area()?, zero)?;
        let mut planner = FftPlanner::new();
        let along_rows = planner.plan_fft_forward(dims.cols);
        let along_cols = planner.plan_fft_forward(dims.rows);
        Ok(Self {
            dims,
            transposed,
            row_scratch: try_filled(along_rows.get_inplace_scratch_len(), zero)?,
            col_scratch: try_filled(along_cols.get_inplace_scratch_len(), zero)?,
            along_rows,
            along_cols,
        })
    }

    pub fn forward(&mut self, data: &mut [Complex32]) {
        let Dims { rows, cols } = self.dims;
        assert_eq!(data.len(), self.transposed.len());
        // rustfft runs one transform per `cols` long chunk
        self.along_rows.process_with_scratch(data, &mut self.row_scratch);
        transpose(data, &mut self.transposed, rows, cols);
        self.along_cols
            .process_with_scratch(&mut self.transposed, &mut self.col_scratch);
        transpose(&self.transposed, data, cols, rows);
    }
}

/// `dst[c][r] = src[r][c]` for a `rows x cols` row-major `src`.
fn transpose<T: Copy>(src: &[T], dst: &mut [T], rows: usize, cols: usize) {
    const TILE: usize = 32;

    assert_eq!(src.len(), rows * cols);
    assert_eq!(dst.len(), rows * cols);
    for r0 in (0..rows).step_by(TILE) {
        for c0 in (0..cols).step_by(TILE) {
            for r in r0..(r0 + TILE).min(rows) {
                for c in c0..(c0 + TILE).min(cols) {
                    dst[c * rows + r] = src[r * cols + c]
                }
            }
        }
    }
}

/// Times `runs` transforms of fresh copies of `input`, after `warm_up` untimed ones.
pub(super) fn run(
    input: &[Complex32],
    dims: Dims,
    config: &TransformConfig,
) -> Result<(PathReport, Vec<Complex32>)> {
    let mut fft = Fft2d::new(dims)?;
    let mut work = try_filled(input.len(), Complex32::default())?;
    let bytes = footprint(dims)?;

    let mut samples = Vec::with_capacity(config.runs);
    for i in 0..config.warm_up + config.runs {
        work.copy_from_slice(input);
        let start = Instant::now();
        fft.forward(&mut work);
        let elapsed = start.elapsed();
        if i >= config.warm_up {
            samples.push(Sample {
                elapsed,
                bytes: bytes as _,
            })
        }
    }
    Ok((PathReport::new(&samples, bytes)?, work))
}

#[cfg(test)]
fn naive_dft(input: &[Complex32], dims: Dims) -> Vec<rustfft::num_complex::Complex64> {
    use rustfft::num_complex::Complex64;
    use std::f64::consts::PI;

    let Dims { rows, cols } = dims;
    let mut ans = vec![Complex64::default(); rows * cols];
    for u in 0..rows {
        for v in 0..cols {
            ans[u * cols + v] = (0..rows * cols)
                .map(|i| {
                    let (r, c) = (i / cols, i % cols);
                    let theta =
                        -2.0 * PI * ((u * r) as f64 / rows as f64 + (v * c) as f64 / cols as f64);
                    let x = input[i];
                    Complex64::new(x.re as _, x.im as _) * Complex64::from_polar(1.0, theta)
                })
                .sum();
        }
    }
    ans
}

#[test]
fn test_transpose() {
    let src = [1, 2, 3, 4, 5, 6];
    let mut dst = [0; 6];
    transpose(&src, &mut dst, 2, 3);
    assert_eq!(dst, [1, 4, 2, 5, 3, 6]);

    let src = (0..70 * 45).collect::<Vec<_>>();
    let mut dst = vec![0; src.len()];
    let mut back = vec![0; src.len()];
    transpose(&src, &mut dst, 70, 45);
    transpose(&dst, &mut back, 45, 70);
    assert_eq!(src, back);
}

#[test]
fn test_against_naive() {
    use rand::Rng;

    let mut rng = rand::rng();
    for (rows, cols) in [(6, 10), (5, 7), (1, 9)] {
        let dims = Dims { rows, cols };
        let input = (0..rows * cols)
            .map(|_| {
                Complex32::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0))
            })
            .collect::<Vec<_>>();
        let mut result = input.clone();
        Fft2d::new(dims).unwrap().forward(&mut result);

        let expect = naive_dft(&input, dims);
        for (r, e) in result.iter().zip(&expect) {
            assert!((r.re as f64 - e.re).abs() < 1e-4, "{dims}: {r} vs {e}");
            assert!((r.im as f64 - e.im).abs() < 1e-4, "{dims}: {r} vs {e}");
        }
    }
}
