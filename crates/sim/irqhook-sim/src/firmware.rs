//! The firmware's default interrupt handler (`KEYINT`), reduced to the part
//! that touches the hooks.

use irqhook_core::msx::{self, VdpStatus};
use irqhook_core::{FrameGuard, Platform};

use crate::machine::Machine;

/// Calls the device hook, acknowledges, and on a frame interrupt latches the
/// status, calls the tick hook and advances `JIFFY`.
pub(crate) fn keyint(m: &Machine) {
    {
        let _frame = FrameGuard::push(m);

        // SAFETY: Hook cells are only rewritten with interrupts masked.
        unsafe { m.call(msx::HKEYI) };

        let raw = m.read_status();
        if VdpStatus::from_bits_retain(raw).is_frame() {
            m.latch_status(raw);
            // SAFETY: As above.
            unsafe { m.call(msx::HTIMI) };
            m.tick_jiffy();
        }
    }
    // SAFETY: Acknowledged and registers restored.
    unsafe { m.enable_interrupts() };
}

#[cfg(test)]
mod tests {
    use crate::machine::{Line, Machine};

    #[test]
    fn counts_frames_in_jiffy() {
        let m = Machine::default();
        m.run_frames(5).unwrap();
        assert_eq!(m.jiffy(), 5);
        assert_eq!(m.statfl(), 0x80);
    }

    #[test]
    fn device_interrupt_leaves_jiffy() {
        let m = Machine::default();
        m.raise(Line::Device);
        assert_eq!(m.jiffy(), 0);
        assert_eq!(m.stats().dispatches, 1);
    }
}
