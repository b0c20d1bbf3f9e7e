#![cfg(detected_cuda)]

#[macro_use]
pub mod bindings {
    #![allow(unused, non_upper_case_globals, non_camel_case_types, non_snake_case)]
    include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

    #[macro_export]
    macro_rules! driver {
        ($f:expr) => {{
            #[allow(unused_imports)]
            use $crate::bindings::*;
            #[allow(unused_unsafe)]
            let err = unsafe { $f };
            assert_eq!(err, CUresult::CUDA_SUCCESS);
        }};
    }

    /// Like [`driver!`], but hands the failure back as a [`DriverError`](crate::DriverError).
    #[macro_export]
    macro_rules! driver_result {
        ($f:expr) => {{
            #[allow(unused_imports)]
            use $crate::bindings::*;
            #[allow(unused_unsafe)]
            let err = unsafe { $f };
            if err == CUresult::CUDA_SUCCESS {
                Ok(())
            } else {
                Err($crate::DriverError(err))
            }
        }};
    }
}

mod context;
mod device;
mod event;
mod memory;
mod stream;

pub trait AsRaw {
    type Raw;

    /// # Safety
    ///
    /// The caller must ensure that the returned item is dropped before the original item.
    unsafe fn as_raw(&self) -> Self::Raw;
}

/// The driver loaded, but reported no usable device.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NoDevice;

impl std::fmt::Display for NoDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("no cuda-capable device detected")
    }
}

impl std::error::Error for NoDevice {}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DriverError(pub bindings::CUresult);

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use std::{ffi::CStr, ptr::null};

        let mut name = null();
        let mut desc = null();
        let ok = unsafe {
            bindings::cuGetErrorName(self.0, &mut name) == bindings::CUresult::CUDA_SUCCESS
                && bindings::cuGetErrorString(self.0, &mut desc)
                    == bindings::CUresult::CUDA_SUCCESS
        };
        if ok && !name.is_null() && !desc.is_null() {
            let name = unsafe { CStr::from_ptr(name) }.to_string_lossy();
            let desc = unsafe { CStr::from_ptr(desc) }.to_string_lossy();
            write!(f, "{name}: {desc}")
        } else {
            write!(f, "{:?}", self.0)
        }
    }
}

impl std::error::Error for DriverError {}

#[inline]
pub fn init() -> Result<(), NoDevice> {
    use bindings::CUresult::*;
    match unsafe { bindings::cuInit(0) } {
        CUDA_SUCCESS => Ok(()),
        CUDA_ERROR_NO_DEVICE => Err(NoDevice),
        err => {
            // a broken driver install leaves no usable device either
            log::warn!("cuInit failed: {}", DriverError(err));
            Err(NoDevice)
        }
    }
}

pub use context::{Context, ContextGuard};
pub use device::{ComputeCapability, Device};
pub use event::Event;
pub use memory::DevMem;
pub use stream::Stream;
