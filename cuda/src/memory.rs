use crate::{bindings as cuda, AsRaw, ContextGuard, DriverError, Stream};
use std::{
    alloc::Layout,
    marker::PhantomData,
    mem::size_of_val,
};

/// Device memory owned by the benchmark, freed on drop.
pub struct DevMem<'ctx> {
    ptr: cuda::CUdeviceptr,
    len: usize,
    _ctx: PhantomData<&'ctx ContextGuard<'ctx>>,
}

impl<'ctx> Stream<'ctx> {
    pub fn malloc<T: Copy>(&self, len: usize) -> Result<DevMem<'ctx>, DriverError> {
        let len = Layout::array::<T>(len)
            .map_err(|_| DriverError(cuda::CUresult::CUDA_ERROR_INVALID_VALUE))?
            .size();
        let mut ptr = 0;
        driver_result!(cuMemAllocAsync(&mut ptr, len, self.as_raw()))?;
        Ok(DevMem {
            ptr,
            len,
            _ctx: PhantomData,
        })
    }

    pub fn from_host<T: Copy>(&self, slice: &[T]) -> Result<DevMem<'ctx>, DriverError> {
        let mut mem = self.malloc::<u8>(size_of_val(slice))?;
        mem.copy_in_async(slice, self)?;
        Ok(mem)
    }
}

impl Drop for DevMem<'_> {
    #[inline]
    fn drop(&mut self) {
        driver!(cuMemFree_v2(self.ptr));
    }
}

impl DevMem<'_> {
    /// Size in bytes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn copy_in_async<T: Copy>(
        &mut self,
        slice: &[T],
        stream: &Stream,
    ) -> Result<(), DriverError> {
        let len = size_of_val(slice);
        let src = slice.as_ptr().cast();
        assert_eq!(len, self.len);
        driver_result!(cuMemcpyHtoDAsync_v2(self.ptr, src, len, stream.as_raw()))
    }

    pub fn copy_out<T: Copy>(&self, slice: &mut [T]) -> Result<(), DriverError> {
        let len = size_of_val(slice);
        let dst = slice.as_mut_ptr().cast();
        assert_eq!(len, self.len);
        driver_result!(cuMemcpyDtoH_v2(dst, self.ptr, len))
    }
}

impl AsRaw for DevMem<'_> {
    type Raw = cuda::CUdeviceptr;

    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.ptr
    }
}

#[test]
fn test_round_trip() {
    use rand::Rng;

    if let Err(crate::NoDevice) = crate::init() {
        return;
    }
    let Some(dev) = crate::Device::fetch() else {
        return;
    };
    let mut rng = rand::rng();
    let host = (0..1024).map(|_| rng.random::<f64>()).collect::<Vec<_>>();
    let mut back = vec![0.0f64; host.len()];
    dev.retain_primary().apply(|ctx| {
        let stream = ctx.stream();
        let mem = stream.from_host(&host).unwrap();
        assert_eq!(mem.len(), size_of_val(&*host));
        stream.synchronize();
        mem.copy_out(&mut back).unwrap();
    });
    assert_eq!(host, back);
}

#[test]
fn test_out_of_memory() {
    if let Err(crate::NoDevice) = crate::init() {
        return;
    }
    let Some(dev) = crate::Device::fetch() else {
        return;
    };
    let total = dev.total_memory();
    dev.retain_primary().apply(|ctx| {
        let stream = ctx.stream();
        let err = stream.malloc::<u8>(total * 2).err().unwrap();
        assert_eq!(err.0, cuda::CUresult::CUDA_ERROR_OUT_OF_MEMORY);
    });
}
