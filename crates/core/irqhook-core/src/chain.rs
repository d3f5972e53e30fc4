//! Library-provided interrupt handlers.
//!
//! [`chaining_isr`] is a primary handler that dispatches to the two hook
//! cells the way the firmware handler does, without the firmware's own
//! keyboard scan and timers. [`ack_only_isr`] is the smallest handler that
//! keeps the machine alive and is what a disabled primary vector points at.

use crate::htrace;
use crate::msx::VdpStatus;
use crate::platform::Platform;
use crate::vector::VectorId;

/// When [`chaining_isr`] copies the status byte into the shadow variable.
///
/// The hardware acknowledgement is the single status read, which always
/// happens before the tick hook runs. This choice only affects what the tick
/// hook sees in the shadow variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AckTiming {
    /// Latch, then call the tick hook. The hook sees this frame's status.
    #[default]
    BeforeTickHook,
    /// Call the tick hook, then latch. The hook sees the previous frame's
    /// status.
    AfterTickHook,
}

/// Saves the register file on creation and restores it on drop.
pub struct FrameGuard<'a, P: Platform> {
    platform: &'a P,
    frame: Option<P::Frame>,
}

impl<'a, P: Platform> FrameGuard<'a, P> {
    /// Pushes a full frame.
    pub fn push(platform: &'a P) -> Self {
        Self {
            platform,
            frame: Some(platform.push_frame()),
        }
    }
}

impl<P: Platform> Drop for FrameGuard<'_, P> {
    fn drop(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.platform.pop_frame(frame);
        }
    }
}

/// Chaining primary handler.
///
/// Calls the device hook on every entry, acknowledges with one status read,
/// and on a frame interrupt latches the status and calls the tick hook.
/// Registers are restored before interrupts are unmasked.
///
/// # Safety
///
/// Must only run as the body of a primary interrupt handler: interrupts
/// masked on entry, both hook cells holding complete encodings.
pub unsafe fn chaining_isr<P: Platform>(platform: &P, timing: AckTiming) {
    {
        let _frame = FrameGuard::push(platform);

        // SAFETY: Hook cells are only ever written under an `IrqGuard`, so
        // they hold a complete `JP nn` or `RET`.
        unsafe { platform.call(platform.locate(VectorId::DeviceHook)) };

        let raw = platform.read_status();
        let status = VdpStatus::from_bits_retain(raw);
        htrace!("chain: status {:#04x}", raw);

        if status.is_frame() {
            let tick = platform.locate(VectorId::TickHook);
            match timing {
                AckTiming::BeforeTickHook => {
                    platform.latch_status(raw);
                    // SAFETY: As above.
                    unsafe { platform.call(tick) };
                }
                AckTiming::AfterTickHook => {
                    // SAFETY: As above.
                    unsafe { platform.call(tick) };
                    platform.latch_status(raw);
                }
            }
        }
    }
    // SAFETY: The interrupt is acknowledged and the frame is popped.
    unsafe { platform.enable_interrupts() };
}

/// Acknowledge-only primary handler.
///
/// Reads the status register once, which acknowledges the frame interrupt,
/// and also latches the value into the status shadow (`STATFL` on MSX).
/// A bare acknowledge that only reads the port would leave the shadow stale;
/// this one keeps it current so code polling the shadow still sees frames
/// while hooks are bypassed.
///
/// # Safety
///
/// Same as [`chaining_isr`].
pub unsafe fn ack_only_isr<P: Platform>(platform: &P) {
    let raw = platform.read_status();
    platform.latch_status(raw);
    htrace!("ack: status {:#04x}", raw);
    // SAFETY: The status read was the acknowledgement.
    unsafe { platform.enable_interrupts() };
}

#[cfg(test)]
mod tests {
    use core::cell::{Cell, RefCell};

    use super::*;
    use crate::msx;
    use crate::platform::ResidentRoutine;
    use crate::vector::HandlerAddr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Push,
        Pop,
        Call(u16),
        Read,
        Latch(u8),
        Enable,
    }

    struct Recorder {
        events: RefCell<Vec<Event>>,
        status: Cell<u8>,
    }

    impl Recorder {
        fn with_status(status: u8) -> Self {
            Self {
                events: RefCell::new(Vec::new()),
                status: Cell::new(status),
            }
        }

        fn push(&self, event: Event) {
            self.events.borrow_mut().push(event);
        }

        fn events(&self) -> Vec<Event> {
            self.events.borrow().clone()
        }
    }

    unsafe impl Platform for Recorder {
        type Frame = u8;

        fn interrupts_enabled(&self) -> bool {
            false
        }
        fn disable_interrupts(&self) {}
        unsafe fn enable_interrupts(&self) {
            self.push(Event::Enable);
        }
        fn halt(&self) {}
        fn locate(&self, id: VectorId) -> u16 {
            msx::locate(id)
        }
        fn read_bytes(&self, _addr: u16, _buf: &mut [u8]) {}
        unsafe fn write_bytes(&self, _addr: u16, _bytes: &[u8]) {}
        fn read_status(&self) -> u8 {
            self.push(Event::Read);
            self.status.replace(0)
        }
        fn latch_status(&self, status: u8) {
            self.push(Event::Latch(status));
        }
        unsafe fn call(&self, addr: u16) {
            self.push(Event::Call(addr));
        }
        fn push_frame(&self) -> u8 {
            self.push(Event::Push);
            7
        }
        fn pop_frame(&self, frame: u8) {
            assert_eq!(frame, 7);
            self.push(Event::Pop);
        }
        fn resident(&self, _routine: ResidentRoutine) -> HandlerAddr {
            HandlerAddr::new(0)
        }
    }

    #[test]
    fn frame_interrupt_order() {
        let p = Recorder::with_status(0x80);
        unsafe { chaining_isr(&p, AckTiming::default()) };
        assert_eq!(
            p.events(),
            [
                Event::Push,
                Event::Call(msx::HKEYI),
                Event::Read,
                Event::Latch(0x80),
                Event::Call(msx::HTIMI),
                Event::Pop,
                Event::Enable,
            ]
        );
    }

    #[test]
    fn late_latch_follows_tick_hook() {
        let p = Recorder::with_status(0xA0);
        unsafe { chaining_isr(&p, AckTiming::AfterTickHook) };
        assert_eq!(
            p.events(),
            [
                Event::Push,
                Event::Call(msx::HKEYI),
                Event::Read,
                Event::Call(msx::HTIMI),
                Event::Latch(0xA0),
                Event::Pop,
                Event::Enable,
            ]
        );
    }

    #[test]
    fn device_only_interrupt_skips_tick() {
        let p = Recorder::with_status(0x1F);
        unsafe { chaining_isr(&p, AckTiming::BeforeTickHook) };
        assert_eq!(
            p.events(),
            [
                Event::Push,
                Event::Call(msx::HKEYI),
                Event::Read,
                Event::Pop,
                Event::Enable,
            ]
        );
    }

    #[test]
    fn status_read_exactly_once() {
        for timing in [AckTiming::BeforeTickHook, AckTiming::AfterTickHook] {
            let p = Recorder::with_status(0x80);
            unsafe { chaining_isr(&p, timing) };
            let reads = p.events().iter().filter(|e| **e == Event::Read).count();
            assert_eq!(reads, 1);
        }
    }

    #[test]
    fn ack_only_reads_latches_and_unmasks() {
        let p = Recorder::with_status(0x80);
        unsafe { ack_only_isr(&p) };
        assert_eq!(p.events(), [Event::Read, Event::Latch(0x80), Event::Enable]);
    }
}
