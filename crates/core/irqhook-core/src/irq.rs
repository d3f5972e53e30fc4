//! Masked-interrupt critical sections.
//!
//! [`IrqGuard`] masks the interrupt line on construction and restores the
//! previous mask state when dropped, on every exit path. Nested guards are
//! safe: an inner guard taken while already masked leaves the line masked
//! when it drops.

use core::marker::PhantomData;

use crate::platform::Platform;

/// RAII guard that keeps interrupts masked while held.
pub struct IrqGuard<'a, P: Platform> {
    platform: &'a P,
    was_enabled: bool,
    // Interrupt state belongs to the executing context.
    _not_send: PhantomData<*mut ()>,
}

impl<'a, P: Platform> IrqGuard<'a, P> {
    /// Masks interrupts, remembering whether they were enabled.
    pub fn new(platform: &'a P) -> Self {
        let was_enabled = platform.interrupts_enabled();
        if was_enabled {
            platform.disable_interrupts();
        }
        Self {
            platform,
            was_enabled,
            _not_send: PhantomData,
        }
    }
}

impl<P: Platform> Drop for IrqGuard<'_, P> {
    fn drop(&mut self) {
        if self.was_enabled {
            // SAFETY: We are restoring the state observed on entry; every
            // write done under this guard has completed.
            unsafe { self.platform.enable_interrupts() };
        }
    }
}

/// Executes the given closure with interrupts masked, restoring the
/// previous interrupt state afterward.
#[inline]
pub fn without_interrupts<P, F, R>(platform: &P, f: F) -> R
where
    P: Platform,
    F: FnOnce() -> R,
{
    let _guard = IrqGuard::new(platform);
    f()
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::platform::ResidentRoutine;
    use crate::vector::{HandlerAddr, VectorId};

    /// Counts mask transitions; everything else is inert.
    struct MaskOnly {
        enabled: Cell<bool>,
        disables: Cell<u32>,
        enables: Cell<u32>,
    }

    impl MaskOnly {
        fn new(enabled: bool) -> Self {
            Self {
                enabled: Cell::new(enabled),
                disables: Cell::new(0),
                enables: Cell::new(0),
            }
        }
    }

    unsafe impl Platform for MaskOnly {
        type Frame = ();

        fn interrupts_enabled(&self) -> bool {
            self.enabled.get()
        }
        fn disable_interrupts(&self) {
            self.disables.set(self.disables.get() + 1);
            self.enabled.set(false);
        }
        unsafe fn enable_interrupts(&self) {
            self.enables.set(self.enables.get() + 1);
            self.enabled.set(true);
        }
        fn halt(&self) {}
        fn locate(&self, _id: VectorId) -> u16 {
            0
        }
        fn read_bytes(&self, _addr: u16, _buf: &mut [u8]) {}
        unsafe fn write_bytes(&self, _addr: u16, _bytes: &[u8]) {}
        fn read_status(&self) -> u8 {
            0
        }
        fn latch_status(&self, _status: u8) {}
        unsafe fn call(&self, _addr: u16) {}
        fn push_frame(&self) {}
        fn pop_frame(&self, _frame: ()) {}
        fn resident(&self, _routine: ResidentRoutine) -> HandlerAddr {
            HandlerAddr::new(0)
        }
    }

    #[test]
    fn masks_and_unmasks() {
        let p = MaskOnly::new(true);
        {
            let _guard = IrqGuard::new(&p);
            assert!(!p.interrupts_enabled());
        }
        assert!(p.interrupts_enabled());
        assert_eq!((p.disables.get(), p.enables.get()), (1, 1));
    }

    #[test]
    fn nested_guard_keeps_outer_mask() {
        let p = MaskOnly::new(true);
        let outer = IrqGuard::new(&p);
        {
            let _inner = IrqGuard::new(&p);
        }
        assert!(!p.interrupts_enabled());
        assert_eq!((p.disables.get(), p.enables.get()), (1, 0));
        drop(outer);
        assert!(p.interrupts_enabled());
        assert_eq!(p.enables.get(), 1);
    }

    #[test]
    fn already_masked_stays_masked() {
        let p = MaskOnly::new(false);
        without_interrupts(&p, || assert!(!p.interrupts_enabled()));
        assert!(!p.interrupts_enabled());
        assert_eq!(p.enables.get(), 0);
    }

    #[test]
    fn unmasks_on_early_return() {
        fn bail(p: &MaskOnly) -> Option<u8> {
            let _guard = IrqGuard::new(p);
            let missing: Option<u8> = None;
            let value = missing?;
            Some(value + 1)
        }
        let p = MaskOnly::new(true);
        assert_eq!(bail(&p), None);
        assert!(p.interrupts_enabled());
    }

    #[test]
    fn returns_closure_value() {
        let p = MaskOnly::new(true);
        assert_eq!(without_interrupts(&p, || 42), 42);
    }
}
