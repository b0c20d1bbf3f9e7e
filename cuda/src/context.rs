use crate::{bindings::CUcontext, bindings::CUdevice, AsRaw, Device};
use std::{marker::PhantomData, ptr::null_mut};

#[derive(PartialEq, Eq, Hash, Debug)]
pub struct Context {
    ctx: CUcontext,
    dev: CUdevice,
}

impl Device {
    /// Retains the primary context, the one shared with the runtime api and libraries built on it.
    #[inline]
    pub fn retain_primary(&self) -> Context {
        let dev = unsafe { self.as_raw() };
        let mut ctx = null_mut();
        driver!(cuDevicePrimaryCtxRetain(&mut ctx, dev));
        Context { ctx, dev }
    }
}

impl Drop for Context {
    #[inline]
    fn drop(&mut self) {
        driver!(cuDevicePrimaryCtxRelease_v2(self.dev));
    }
}

unsafe impl Send for Context {}
unsafe impl Sync for Context {}

impl AsRaw for Context {
    type Raw = CUcontext;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.ctx
    }
}

impl Context {
    #[inline]
    pub fn apply<T>(&self, f: impl FnOnce(&ContextGuard) -> T) -> T {
        f(&self.push())
    }

    #[inline]
    fn push(&self) -> ContextGuard<'_> {
        driver!(cuCtxPushCurrent_v2(self.ctx));
        ContextGuard(self.ctx, PhantomData)
    }
}

#[repr(transparent)]
pub struct ContextGuard<'a>(CUcontext, PhantomData<&'a ()>);

impl Drop for ContextGuard<'_> {
    #[inline]
    fn drop(&mut self) {
        let mut top = null_mut();
        driver!(cuCtxPopCurrent_v2(&mut top));
        assert_eq!(top, self.0)
    }
}

impl AsRaw for ContextGuard<'_> {
    type Raw = CUcontext;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.0
    }
}

impl ContextGuard<'_> {
    #[inline]
    pub fn dev(&self) -> Device {
        let mut dev = 0;
        driver!(cuCtxGetDevice(&mut dev));
        Device::new(dev)
    }

    /// Free and total device memory in bytes, as seen from this context.
    #[inline]
    pub fn mem_info(&self) -> (usize, usize) {
        let mut free = 0;
        let mut total = 0;
        driver!(cuMemGetInfo_v2(&mut free, &mut total));
        (free as _, total as _)
    }

    #[inline]
    pub fn synchronize(&self) {
        driver!(cuCtxSynchronize());
    }
}

#[test]
fn test_primary() {
    if let Err(crate::NoDevice) = crate::init() {
        return;
    }
    let Some(dev) = crate::Device::fetch() else {
        return;
    };
    let ctx = dev.retain_primary();

    let mut flags = 0;
    let mut active = 0;
    driver!(cuDevicePrimaryCtxGetState(
        dev.as_raw(),
        &mut flags,
        &mut active
    ));
    assert_ne!(active, 0);

    ctx.apply(|guard| {
        let (free, total) = guard.mem_info();
        assert!(free <= total);
        assert_eq!(unsafe { guard.dev().as_raw() }, unsafe { dev.as_raw() });
        guard.synchronize();
    });

    let mut current = null_mut();
    driver!(cuCtxGetCurrent(&mut current));
    assert!(current.is_null());
}
