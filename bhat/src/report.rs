use crate::{
    bandwidth::KernelReport,
    timing::Summary,
    transform::{PathReport, TransformReport},
};
use std::{fmt, time::Duration};

#[inline]
fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1e3
}

/// GiB/s, or `n/a` when no time was measured.
struct Throughput(Option<f64>);

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Some(gib) => write!(f, "{gib:.6} GB/s"),
            None => write!(f, "n/a"),
        }
    }
}

struct Seconds<'a>(&'a Summary);

impl fmt::Display for Seconds<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = self.0;
        write!(f, "{:.6} seconds", s.avg().as_secs_f64())?;
        if s.runs > 1 {
            write!(
                f,
                " (min {:.6}, max {:.6} over {} runs)",
                s.min.as_secs_f64(),
                s.max.as_secs_f64(),
                s.runs,
            )?
        }
        Ok(())
    }
}

fn write_path(f: &mut fmt::Formatter, name: &str, path: &PathReport) -> fmt::Result {
    writeln!(f, "{name} time: {}", Seconds(&path.summary))?;
    writeln!(f, "{name} memory usage: {} MB", path.megabytes())
}

impl fmt::Display for TransformReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_path(f, "CPU", &self.cpu)?;
        match &self.gpu {
            Ok(gpu) => write_path(f, "GPU", gpu)?,
            Err(e) => writeln!(f, "GPU unavailable: {e}")?,
        }
        if let Some(d) = &self.discrepancy {
            writeln!(
                f,
                "GPU vs CPU: max abs diff {:e}, relative {:e}",
                d.max_abs, d.relative,
            )?
        }
        Ok(())
    }
}

impl fmt::Display for KernelReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = &self.summary;
        write!(
            f,
            "{} time - Avg: {:.6} ms, Min: {:.6} ms, Max: {:.6} ms, Throughput: {}",
            self.kernel.name(),
            ms(s.avg()),
            ms(s.min),
            ms(s.max),
            Throughput(s.throughput()),
        )
    }
}

#[test]
fn test_kernel_line() {
    use crate::bandwidth::Kernel;

    let report = KernelReport {
        kernel: Kernel::Triad,
        summary: Summary {
            runs: 4,
            min: Duration::from_micros(1500),
            max: Duration::from_micros(2500),
            total: Duration::from_millis(8),
            bytes: 1 << 30,
        },
    };
    assert_eq!(
        report.to_string(),
        "Triad time - Avg: 2.000000 ms, Min: 1.500000 ms, Max: 2.500000 ms, Throughput: 125.000000 GB/s",
    );

    let instant = KernelReport {
        kernel: Kernel::Copy,
        summary: Summary {
            runs: 4,
            min: Duration::ZERO,
            max: Duration::ZERO,
            total: Duration::ZERO,
            bytes: 1 << 10,
        },
    };
    assert_eq!(
        instant.to_string(),
        "Copy time - Avg: 0.000000 ms, Min: 0.000000 ms, Max: 0.000000 ms, Throughput: n/a",
    );
}

#[test]
fn test_transform_lines() {
    use crate::{transform::Dims, BenchError};

    let summary = Summary {
        runs: 1,
        min: Duration::from_millis(250),
        max: Duration::from_millis(250),
        total: Duration::from_millis(250),
        bytes: 128 << 20,
    };
    let dims = Dims { rows: 4096, cols: 4096 };
    let mut report = TransformReport {
        requested: dims,
        padded: dims,
        cpu: PathReport {
            summary,
            bytes: 128 << 20,
        },
        gpu: Err(BenchError::DeviceUnavailable(
            "no cuda-capable device detected".into(),
        )),
        discrepancy: None,
    };
    assert_eq!(
        report.to_string(),
        "\
CPU time: 0.250000 seconds
CPU memory usage: 128 MB
GPU unavailable: no cuda-capable device detected
",
    );

    report.gpu = Ok(PathReport {
        summary: Summary {
            runs: 2,
            min: Duration::from_millis(1),
            max: Duration::from_millis(3),
            total: Duration::from_millis(4),
            bytes: 256 << 20,
        },
        bytes: 128 << 20,
    });
    assert_eq!(
        report.to_string().lines().nth(2),
        Some("GPU time: 0.002000 seconds (min 0.001000, max 0.003000 over 2 runs)"),
    );
}
