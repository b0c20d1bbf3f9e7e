#![cfg(detected_cufft)]

#[macro_use]
#[allow(unused, non_upper_case_globals, non_camel_case_types, non_snake_case)]
pub mod bindings {
    include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

    #[macro_export]
    macro_rules! cufft {
        ($f:expr) => {{
            #[allow(unused_imports)]
            use $crate::bindings::*;
            #[allow(unused_unsafe, clippy::macro_metavars_in_unsafe)]
            let err = unsafe { $f };
            assert_eq!(err, cufftResult::CUFFT_SUCCESS)
        }};
    }

    #[macro_export]
    macro_rules! cufft_result {
        ($f:expr) => {{
            #[allow(unused_imports)]
            use $crate::bindings::*;
            #[allow(unused_unsafe, clippy::macro_metavars_in_unsafe)]
            let err = unsafe { $f };
            if err == cufftResult::CUFFT_SUCCESS {
                Ok(())
            } else {
                Err($crate::FftError(err))
            }
        }};
    }
}

mod plan;

pub use plan::Plan2d;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FftError(pub bindings::cufftResult);

impl std::fmt::Display for FftError {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "cufft failed with {:?}", self.0)
    }
}

impl std::error::Error for FftError {}
