use crate::{bindings as fft, FftError};
use cuda::{AsRaw, ContextGuard, DevMem, Stream};
use std::{ffi::c_int, marker::PhantomData, mem::size_of};

/// A single-precision complex-to-complex 2D plan, row-major, `rows` slowest.
pub struct Plan2d<'ctx> {
    handle: fft::cufftHandle,
    rows: usize,
    cols: usize,
    _ctx: PhantomData<&'ctx ContextGuard<'ctx>>,
}

impl<'ctx> Plan2d<'ctx> {
    pub fn new(rows: usize, cols: usize, _ctx: &'ctx ContextGuard) -> Result<Self, FftError> {
        let size = |n: usize| {
            c_int::try_from(n).map_err(|_| FftError(fft::cufftResult::CUFFT_INVALID_SIZE))
        };
        let (nx, ny) = (size(rows)?, size(cols)?);
        let mut handle = 0;
        cufft_result!(cufftPlan2d(&mut handle, nx, ny, cufftType::CUFFT_C2C))?;
        let ans = Self {
            handle,
            rows,
            cols,
            _ctx: PhantomData,
        };
        log::debug!("cufft plan {rows}x{cols}, work area {} bytes", ans.work_size()?);
        Ok(ans)
    }

    /// Creates the plan and binds it to `stream`, so every launch is ordered on it.
    pub fn bind(rows: usize, cols: usize, stream: &Stream<'ctx>) -> Result<Self, FftError> {
        let mut ans = Self::new(rows, cols, stream.ctx())?;
        ans.set_stream(stream)?;
        Ok(ans)
    }

    #[inline]
    pub fn set_stream(&mut self, stream: &Stream) -> Result<(), FftError> {
        cufft_result!(cufftSetStream(self.handle, stream.as_raw().cast()))
    }

    #[inline]
    pub fn work_size(&self) -> Result<usize, FftError> {
        let mut size = 0;
        cufft_result!(cufftGetSize(self.handle, &mut size))?;
        Ok(size as _)
    }

    /// Bytes of `cufftComplex` the plan reads and writes.
    #[inline]
    pub const fn buffer_len(&self) -> usize {
        self.rows * self.cols * size_of::<fft::cufftComplex>()
    }

    /// Issues an in-place forward transform. Returns as soon as the work is queued.
    pub fn forward(&self, data: &mut DevMem) -> Result<(), FftError> {
        assert_eq!(data.len(), self.buffer_len());
        let ptr = unsafe { data.as_raw() } as *mut fft::cufftComplex;
        cufft_result!(cufftExecC2C(self.handle, ptr, ptr, CUFFT_FORWARD as _))
    }
}

impl Drop for Plan2d<'_> {
    #[inline]
    fn drop(&mut self) {
        cufft!(cufftDestroy(self.handle))
    }
}

#[test]
fn test_forward() {
    use rand::Rng;
    use std::f64::consts::PI;

    const ROWS: usize = 6;
    const COLS: usize = 10;

    if let Err(cuda::NoDevice) = cuda::init() {
        return;
    }
    let Some(dev) = cuda::Device::fetch() else {
        return;
    };
    let mut rng = rand::rng();
    let host = (0..ROWS * COLS * 2)
        .map(|_| rng.random_range(-1.0f32..1.0))
        .collect::<Vec<_>>();
    let mut result = vec![0.0f32; host.len()];
    dev.retain_primary().apply(|ctx| {
        let stream = ctx.stream();
        let mut data = stream.from_host(&host).unwrap();
        let plan = Plan2d::bind(ROWS, COLS, &stream).unwrap();
        plan.forward(&mut data).unwrap();
        stream.synchronize();
        data.copy_out(&mut result).unwrap();
    });

    for u in 0..ROWS {
        for v in 0..COLS {
            let (mut re, mut im) = (0.0f64, 0.0f64);
            for r in 0..ROWS {
                for c in 0..COLS {
                    let i = (r * COLS + c) * 2;
                    let (x, y) = (host[i] as f64, host[i + 1] as f64);
                    let theta =
                        -2.0 * PI * ((u * r) as f64 / ROWS as f64 + (v * c) as f64 / COLS as f64);
                    let (sin, cos) = theta.sin_cos();
                    re += x * cos - y * sin;
                    im += x * sin + y * cos;
                }
            }
            let i = (u * COLS + v) * 2;
            assert!((result[i] as f64 - re).abs() < 1e-3, "re at ({u}, {v})");
            assert!((result[i + 1] as f64 - im).abs() < 1e-3, "im at ({u}, {v})");
        }
    }
}
