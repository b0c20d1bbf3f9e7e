use crate::{bindings as cuda, AsRaw, Stream};
use std::{ptr::null_mut, time::Duration};

#[repr(transparent)]
pub struct Event(cuda::CUevent);

impl Drop for Event {
    fn drop(&mut self) {
        driver!(cuEventDestroy_v2(self.0));
    }
}

impl Stream<'_> {
    pub fn record(&self) -> Event {
        let mut event = null_mut();
        driver!(cuEventCreate(
            &mut event,
            CUevent_flags::CU_EVENT_DEFAULT as _
        ));
        driver!(cuEventRecord(event, self.as_raw()));
        Event(event)
    }

    /// Runs `f` `warm_up` times untimed, then `times` times each bracketed by a pair of events.
    ///
    /// Returns one duration per timed run, measured on the device:
    /// every duration covers the completion of the work, not just its issue.
    pub fn bench(
        &self,
        mut f: impl FnMut(usize, &Self),
        times: usize,
        warm_up: usize,
    ) -> Vec<Duration> {
        for i in 0..warm_up {
            f(i, self);
        }
        let marks = (0..times)
            .map(|i| {
                let start = self.record();
                f(i, self);
                (start, self.record())
            })
            .collect::<Vec<_>>();
        marks
            .iter()
            .map(|(start, end)| {
                end.synchronize();
                end.elapse_from(start)
            })
            .collect()
    }
}

impl Event {
    pub fn synchronize(&self) {
        driver!(cuEventSynchronize(self.0));
    }

    pub fn elapse_from(&self, start: &Self) -> Duration {
        let mut ms = 0.0;
        driver!(cuEventElapsedTime(&mut ms, start.0, self.0));
        Duration::from_secs_f32(ms / 1000.0)
    }
}

#[test]
fn test_bench() {
    if let Err(crate::NoDevice) = crate::init() {
        return;
    }
    let Some(dev) = crate::Device::fetch() else {
        return;
    };
    dev.retain_primary().apply(|ctx| {
        let stream = ctx.stream();
        let mut calls = 0;
        let times = stream.bench(|_, _| calls += 1, 3, 2);
        assert_eq!(calls, 5);
        assert_eq!(times.len(), 3);
    });
}
