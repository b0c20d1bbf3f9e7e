use crate::{bindings as cuda, AsRaw};
use std::{
    cmp::Ordering,
    ffi::{c_char, c_int, CStr},
    fmt,
};

#[repr(transparent)]
pub struct Device(cuda::CUdevice);

impl AsRaw for Device {
    type Raw = cuda::CUdevice;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.0
    }
}

impl Device {
    #[inline]
    pub fn new(index: c_int) -> Self {
        let mut device = 0;
        driver!(cuDeviceGet(&mut device, index));
        Self(device)
    }

    #[inline]
    pub fn fetch() -> Option<Self> {
        if Self::count() > 0 {
            Some(Self::new(0))
        } else {
            None
        }
    }

    #[inline]
    pub fn count() -> usize {
        let mut count = 0;
        driver!(cuDeviceGetCount(&mut count));
        count as _
    }

    pub fn name(&self) -> String {
        let mut name = [0 as c_char; 256];
        driver!(cuDeviceGetName(name.as_mut_ptr(), name.len() as _, self.0));
        unsafe { CStr::from_ptr(name.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }

    #[inline]
    pub fn compute_capability(&self) -> ComputeCapability {
        let mut major = 0;
        let mut minor = 0;
        driver!(cuDeviceComputeCapability(&mut major, &mut minor, self.0));
        ComputeCapability { major, minor }
    }

    #[inline]
    pub fn total_memory(&self) -> usize {
        let mut bytes = 0;
        driver!(cuDeviceTotalMem_v2(&mut bytes, self.0));
        bytes as _
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ComputeCapability {
    pub major: i32,
    pub minor: i32,
}

impl PartialOrd for ComputeCapability {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComputeCapability {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        match self.major.cmp(&other.major) {
            Ordering::Equal => self.minor.cmp(&other.minor),
            other => other,
        }
    }
}

impl fmt::Display for ComputeCapability {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[test]
fn test() {
    if let Err(crate::NoDevice) = crate::init() {
        return;
    }
    for i in 0..Device::count() {
        let dev = Device::new(i as _);
        println!(
            "gpu{i}: {} ver{} mem={}",
            dev.name(),
            dev.compute_capability(),
            dev.total_memory(),
        );
    }
}

#[test]
fn test_order() {
    let a = ComputeCapability { major: 7, minor: 5 };
    let b = ComputeCapability { major: 8, minor: 0 };
    let c = ComputeCapability { major: 8, minor: 6 };
    assert!(a < b);
    assert!(b < c);
    assert_eq!(c.to_string(), "8.6");
}
