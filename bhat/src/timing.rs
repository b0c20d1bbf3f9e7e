//! Timing samples and the statistics derived from them.

use std::time::{Duration, Instant};

/// Binary gigabyte, the unit throughput is reported in.
pub const GIB: f64 = (1u64 << 30) as f64;

/// One timed repetition: how long it took and how many bytes it moved.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Sample {
    pub elapsed: Duration,
    pub bytes: u64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Summary {
    pub runs: usize,
    pub min: Duration,
    pub max: Duration,
    pub total: Duration,
    pub bytes: u64,
}

impl Summary {
    /// `None` for an empty sample list.
    pub fn new(samples: &[Sample]) -> Option<Self> {
        let first = samples.first()?;
        Some(samples.iter().skip(1).fold(
            Self {
                runs: 1,
                min: first.elapsed,
                max: first.elapsed,
                total: first.elapsed,
                bytes: first.bytes,
            },
            |acc, s| Self {
                runs: acc.runs + 1,
                min: acc.min.min(s.elapsed),
                max: acc.max.max(s.elapsed),
                total: acc.total + s.elapsed,
                bytes: acc.bytes + s.bytes,
            },
        ))
    }

    /// Zero for a summary of no runs.
    #[inline]
    pub fn avg(&self) -> Duration {
        u32::try_from(self.runs)
            .ok()
            .and_then(|runs| self.total.checked_div(runs))
            .unwrap_or_default()
    }

    /// Bytes moved over all runs divided by the total elapsed time, in GiB/s.
    ///
    /// `None` when the clock saw no time pass.
    #[inline]
    pub fn throughput(&self) -> Option<f64> {
        if self.total.is_zero() {
            None
        } else {
            Some(self.bytes as f64 / self.total.as_secs_f64() / GIB)
        }
    }
}

/// Runs `f` `warm_up` times untimed, then `times` times back to back.
///
/// The clock is read once between two runs, so the samples tile the whole timed loop
/// and their sum is its start to stop time.
pub fn bench(mut f: impl FnMut(usize), times: usize, warm_up: usize, bytes: u64) -> Vec<Sample> {
    for i in 0..warm_up {
        f(i);
    }
    let mut last = Instant::now();
    (0..times)
        .map(|i| {
            f(i);
            let now = Instant::now();
            let elapsed = now - last;
            last = now;
            Sample { elapsed, bytes }
        })
        .collect()
}

#[test]
fn test_summary() {
    let ms = Duration::from_millis;
    let samples = [
        Sample { elapsed: ms(4), bytes: 1 << 30 },
        Sample { elapsed: ms(2), bytes: 1 << 30 },
        Sample { elapsed: ms(6), bytes: 1 << 30 },
    ];
    let summary = Summary::new(&samples).unwrap();
    assert_eq!(summary.runs, 3);
    assert_eq!(summary.min, ms(2));
    assert_eq!(summary.max, ms(6));
    assert_eq!(summary.total, ms(12));
    assert_eq!(summary.avg(), ms(4));
    assert_eq!(summary.bytes, 3 << 30);
    assert!((summary.throughput().unwrap() - 250.0).abs() < 1e-9);

    assert_eq!(Summary::new(&[]), None);
}

#[test]
fn test_degenerate_summary() {
    let instant = Summary::new(&[Sample {
        elapsed: Duration::ZERO,
        bytes: 1 << 20,
    }])
    .unwrap();
    assert_eq!(instant.avg(), Duration::ZERO);
    assert_eq!(instant.throughput(), None);

    let empty = Summary {
        runs: 0,
        min: Duration::ZERO,
        max: Duration::ZERO,
        total: Duration::ZERO,
        bytes: 0,
    };
    assert_eq!(empty.avg(), Duration::ZERO);
    assert_eq!(empty.throughput(), None);
}

#[test]
fn test_bench() {
    let mut calls = Vec::new();
    let samples = bench(|i| calls.push(i), 4, 2, 16);
    assert_eq!(calls, [0, 1, 0, 1, 2, 3]);
    assert_eq!(samples.len(), 4);
    assert!(samples.iter().all(|s| s.bytes == 16));
}

#[test]
fn test_bench_covers_loop() {
    use std::thread::sleep;

    let nap = Duration::from_millis(2);
    let start = Instant::now();
    let samples = bench(|_| sleep(nap), 3, 1, 0);
    let outer = start.elapsed();

    let total = samples.iter().map(|s| s.elapsed).sum::<Duration>();
    assert!(samples.iter().all(|s| s.elapsed >= nap));
    assert!(total >= nap * 3);
    assert!(total <= outer);
}
