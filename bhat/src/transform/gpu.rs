use super::{footprint, Complex32, Dims, PathReport};
use crate::{timing::Sample, Result, TransformConfig};
use cuda::{Device, NoDevice};
use cufft::Plan2d;
use std::time::{Duration, Instant};

/// Uploads `input`, then times in-place forward transforms on a stream.
///
/// Every timed run is bracketed by stream events and waited on,
/// so the durations cover completed work.
/// The transforms repeat on their own output; with `verify` the input is uploaded again
/// and transformed once more to fetch a result comparable with the host one.
pub(super) fn run(
    input: &[Complex32],
    dims: Dims,
    config: &TransformConfig,
) -> Result<(PathReport, Option<Vec<Complex32>>)> {
    cuda::init()?;
    let dev = Device::fetch().ok_or(NoDevice)?;
    log::info!(
        "gpu: {} sm_{} with {} MiB",
        dev.name(),
        dev.compute_capability(),
        dev.total_memory() >> 20,
    );

    dev.retain_primary().apply(|ctx| -> Result<_> {
        let (free, total) = ctx.mem_info();
        log::debug!("device memory: {} / {} MiB free", free >> 20, total >> 20);

        let stream = ctx.stream();
        let mut data = stream.from_host(input)?;
        let plan = Plan2d::bind(dims.rows, dims.cols, &stream)?;
        stream.synchronize();

        let mut issued = Vec::with_capacity(config.warm_up + config.runs);
        let mut failure = None;
        let elapsed = stream.bench(
            |_, _| {
                let start = Instant::now();
                if let Err(e) = plan.forward(&mut data) {
                    failure.get_or_insert(e);
                }
                issued.push(start.elapsed());
            },
            config.runs,
            config.warm_up,
        );
        if let Some(e) = failure {
            return Err(e.into());
        }
        log::debug!(
            "gpu issue time {:?} vs completion time {:?} over {} runs",
            issued[config.warm_up..].iter().sum::<Duration>(),
            elapsed.iter().sum::<Duration>(),
            elapsed.len(),
        );

        let result = if config.verify {
            data.copy_in_async(input, &stream)?;
            plan.forward(&mut data)?;
            stream.synchronize();
            let mut result = vec![Complex32::default(); input.len()];
            data.copy_out(&mut result)?;
            Some(result)
        } else {
            None
        };

        let bytes = data.len();
        debug_assert_eq!(footprint(dims).ok(), Some(bytes));
        let samples = elapsed
            .into_iter()
            .map(|elapsed| Sample {
                elapsed,
                bytes: bytes as _,
            })
            .collect::<Vec<_>>();
        Ok((PathReport::new(&samples, bytes)?, result))
    })
}
