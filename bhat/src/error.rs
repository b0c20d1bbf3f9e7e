use std::mem::size_of;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("{what} must be positive, got {value}")]
    InvalidSize { what: &'static str, value: usize },
    #[error("failed to allocate {bytes} bytes of host memory")]
    Alloc { bytes: usize },
    #[error("{0}")]
    DeviceUnavailable(String),
    #[error("device call failed: {0}")]
    Device(String),
}

pub type Result<T> = std::result::Result<T, BenchError>;

#[cfg(detected_cufft)]
impl From<cuda::NoDevice> for BenchError {
    #[inline]
    fn from(e: cuda::NoDevice) -> Self {
        Self::DeviceUnavailable(e.to_string())
    }
}

#[cfg(detected_cufft)]
impl From<cuda::DriverError> for BenchError {
    #[inline]
    fn from(e: cuda::DriverError) -> Self {
        Self::Device(e.to_string())
    }
}

#[cfg(detected_cufft)]
impl From<cufft::FftError> for BenchError {
    #[inline]
    fn from(e: cufft::FftError) -> Self {
        Self::Device(e.to_string())
    }
}

/// Rejects zero where a count or dimension is expected.
#[inline]
pub(crate) fn positive(what: &'static str, value: usize) -> Result<usize> {
    if value == 0 {
        Err(BenchError::InvalidSize { what, value })
    } else {
        Ok(value)
    }
}

/// Allocates `len` copies of `value`, reporting failure instead of aborting.
pub(crate) fn try_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let bytes = len.saturating_mul(size_of::<T>());
    let mut vec = Vec::new();
    vec.try_reserve_exact(len)
        .map_err(|_| BenchError::Alloc { bytes })?;
    vec.resize(len, value);
    Ok(vec)
}

#[test]
fn test_positive() {
    assert_eq!(positive("rows", 3).unwrap(), 3);
    let err = positive("rows", 0).unwrap_err();
    assert!(matches!(err, BenchError::InvalidSize { what: "rows", value: 0 }));
    assert_eq!(err.to_string(), "rows must be positive, got 0");
}

#[test]
fn test_alloc_failure() {
    let err = try_filled(usize::MAX / 8, 0.0f64).unwrap_err();
    assert!(matches!(err, BenchError::Alloc { .. }));

    let vec = try_filled(5, 7u8).unwrap();
    assert_eq!(vec, [7; 5]);
}
