//! STREAM-style host memory bandwidth: copy, add, scale and triad over `f64` arrays.

use crate::{
    error::try_filled,
    timing::{bench, Summary},
    BenchError, Result, StreamConfig,
};
use std::{hint::black_box, mem::size_of};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Kernel {
    Copy,
    Add,
    Scale,
    Triad,
}

impl Kernel {
    pub const ALL: [Self; 4] = [Self::Copy, Self::Add, Self::Scale, Self::Triad];

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Copy => "Copy",
            Self::Add => "Add",
            Self::Scale => "Scale",
            Self::Triad => "Triad",
        }
    }

    /// Arrays touched per element, reads and writes counted alike.
    #[inline]
    pub const fn arrays(self) -> u64 {
        match self {
            Self::Copy | Self::Scale => 2,
            Self::Add => 3,
            Self::Triad => 4,
        }
    }

    #[inline]
    pub const fn bytes_per_iteration(self, elements: usize) -> u64 {
        self.arrays() * size_of::<f64>() as u64 * elements as u64
    }
}

#[inline]
pub fn copy(dst: &mut [f64], src: &[f64]) {
    dst.copy_from_slice(src)
}

#[inline]
pub fn add(dst: &mut [f64], a: &[f64], b: &[f64]) {
    assert!(a.len() == dst.len() && b.len() == dst.len());
    for ((d, a), b) in dst.iter_mut().zip(a).zip(b) {
        *d = a + b
    }
}

#[inline]
pub fn scale(dst: &mut [f64], src: &[f64], scalar: f64) {
    assert_eq!(src.len(), dst.len());
    for (d, s) in dst.iter_mut().zip(src) {
        *d = scalar * s
    }
}

#[inline]
pub fn triad(dst: &mut [f64], a: &[f64], b: &[f64], c: &[f64], scalar: f64) {
    assert!(a.len() == dst.len() && b.len() == dst.len() && c.len() == dst.len());
    for (((d, a), b), c) in dst.iter_mut().zip(a).zip(b).zip(c) {
        *d = a + scalar * b + c
    }
}

/// The three inputs and the one output every kernel works on.
pub struct StreamBuffers {
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl StreamBuffers {
    /// `a[i] = i`, `b[i] = n - i`, `c[i] = i mod 3`, `d` zeroed.
    pub fn new(n: usize) -> Result<Self> {
        let mut a = try_filled(n, 0.0)?;
        let mut b = try_filled(n, 0.0)?;
        let mut c = try_filled(n, 0.0)?;
        let d = try_filled(n, 0.0)?;
        for i in 0..n {
            a[i] = i as f64;
            b[i] = (n - i) as f64;
            c[i] = (i % 3) as f64;
        }
        Ok(Self { a, b, c, d })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.d.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.d.is_empty()
    }

    pub fn run(&mut self, kernel: Kernel, scalar: f64) {
        let Self { a, b, c, d } = self;
        match kernel {
            Kernel::Copy => copy(d, a),
            Kernel::Add => add(d, a, b),
            Kernel::Scale => scale(d, a, scalar),
            Kernel::Triad => triad(d, a, b, c, scalar),
        }
        black_box(d);
    }

    #[inline]
    pub fn inputs(&self) -> [&[f64]; 3] {
        [&self.a, &self.b, &self.c]
    }

    #[inline]
    pub fn output(&self) -> &[f64] {
        &self.d
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct KernelReport {
    pub kernel: Kernel,
    pub summary: Summary,
}

/// Runs every kernel `repetitions` times back to back over the same buffers.
pub fn run(config: &StreamConfig) -> Result<Vec<KernelReport>> {
    let StreamConfig {
        elements,
        repetitions,
        scalar,
    } = config.validated()?;

    let mut buffers = StreamBuffers::new(elements)?;
    log::info!(
        "stream: 4 arrays x {elements} f64 ({} MiB each), {repetitions} repetitions",
        elements * size_of::<f64>() >> 20,
    );

    Kernel::ALL
        .into_iter()
        .map(|kernel| {
            let samples = bench(
                |_| buffers.run(kernel, scalar),
                repetitions,
                0,
                kernel.bytes_per_iteration(elements),
            );
            let summary = Summary::new(&samples).ok_or(BenchError::InvalidSize {
                what: "repetitions",
                value: 0,
            })?;
            log::debug!("{}: {:?}", kernel.name(), summary);
            Ok(KernelReport { kernel, summary })
        })
        .collect()
}

#[test]
fn test_kernels() {
    let a = [1.0, 2.0, 3.0];
    let b = [4.0, 5.0, 6.0];
    let c = [7.0, 8.0, 9.0];
    let mut d = [0.0; 3];

    copy(&mut d, &a);
    assert_eq!(d, a);
    add(&mut d, &a, &b);
    assert_eq!(d, [5.0, 7.0, 9.0]);
    scale(&mut d, &a, 2.0);
    assert_eq!(d, [2.0, 4.0, 6.0]);
    triad(&mut d, &a, &b, &c, 2.0);
    assert_eq!(d, [16.0, 20.0, 24.0]);
}

#[test]
fn test_init() {
    let buffers = StreamBuffers::new(5).unwrap();
    let [a, b, c] = buffers.inputs();
    assert_eq!(a, [0.0, 1.0, 2.0, 3.0, 4.0]);
    assert_eq!(b, [5.0, 4.0, 3.0, 2.0, 1.0]);
    assert_eq!(c, [0.0, 1.0, 2.0, 0.0, 1.0]);
    assert_eq!(buffers.output(), [0.0; 5]);
    assert_eq!(buffers.len(), 5);
}

#[test]
fn test_bytes_moved() {
    use rand::Rng;

    let mut rng = rand::rng();
    for _ in 0..16 {
        let n = rng.random_range(1..1 << 20);
        let expect = |arrays: u64| arrays * 8 * n as u64;
        assert_eq!(Kernel::Copy.bytes_per_iteration(n), expect(2));
        assert_eq!(Kernel::Add.bytes_per_iteration(n), expect(3));
        assert_eq!(Kernel::Scale.bytes_per_iteration(n), expect(2));
        assert_eq!(Kernel::Triad.bytes_per_iteration(n), expect(4));
    }

    let config = StreamConfig::new(1000, 3, 2.0).unwrap();
    for report in run(&config).unwrap() {
        assert_eq!(report.summary.runs, 3);
        assert_eq!(
            report.summary.bytes,
            report.kernel.bytes_per_iteration(1000) * 3,
        );
        assert!(report.summary.min <= report.summary.avg());
        assert!(report.summary.avg() <= report.summary.max);
    }
}

#[test]
fn test_inputs_untouched() {
    const N: usize = 4096;

    let mut buffers = StreamBuffers::new(N).unwrap();
    let before = buffers.inputs().map(<[f64]>::to_vec);

    let mut outputs = Vec::new();
    for _ in 0..3 {
        let round = Kernel::ALL
            .into_iter()
            .map(|kernel| {
                buffers.run(kernel, 2.0);
                buffers.output().to_vec()
            })
            .collect::<Vec<_>>();
        outputs.push(round);
    }
    assert_eq!(buffers.inputs().map(<[f64]>::to_vec), before);
    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[1], outputs[2]);

    // triad with scalar 2: i + 2 (N - i) + i mod 3
    let triad = &outputs[2][3];
    for (i, &x) in triad.iter().enumerate() {
        assert_eq!(x, (i + 2 * (N - i) + i % 3) as f64);
    }
}

#[test]
fn test_invalid() {
    assert!(matches!(
        StreamConfig::new(0, 4, 2.0),
        Err(BenchError::InvalidSize { what: "elements", .. })
    ));
    assert!(matches!(
        StreamConfig::new(16, 0, 2.0),
        Err(BenchError::InvalidSize { what: "repetitions", .. })
    ));

    let unchecked = StreamConfig {
        elements: 16,
        repetitions: 0,
        scalar: 2.0,
    };
    assert!(matches!(
        run(&unchecked),
        Err(BenchError::InvalidSize { what: "repetitions", value: 0 })
    ));
    let unchecked = StreamConfig {
        elements: 0,
        ..unchecked
    };
    assert!(matches!(
        run(&unchecked),
        Err(BenchError::InvalidSize { what: "elements", value: 0 })
    ));
}
