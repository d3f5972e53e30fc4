//! Secondary hook control.
//!
//! The firmware handler (and [`chaining_isr`](crate::chaining_isr)) calls two
//! 5-byte hook cells on its way through an interrupt. A hook starts out as
//! `RET`; installing one writes `JP nn` over its first three bytes.

use crate::platform::Platform;
use crate::slot::VectorSlot;
use crate::vector::{HandlerAddr, VectorId, VectorImage};

/// One of the two secondary hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Called on every frame (vertical-blank) interrupt.
    Tick,
    /// Called on every interrupt entry, before the status read.
    Device,
}

impl Hook {
    /// Both hooks.
    pub const ALL: [Self; 2] = [Self::Tick, Self::Device];

    /// The vector cell backing this hook.
    #[must_use]
    pub const fn vector(self) -> VectorId {
        match self {
            Self::Tick => VectorId::TickHook,
            Self::Device => VectorId::DeviceHook,
        }
    }
}

/// Owns the tick and device hook cells.
///
/// Each hook has its own slot and saved image; nothing done to one hook
/// reads or writes the other.
pub struct SecondaryHookController<'p, P: Platform> {
    tick: VectorSlot<'p, P>,
    device: VectorSlot<'p, P>,
}

impl<'p, P: Platform> SecondaryHookController<'p, P> {
    /// Takes control of both hooks, capturing their current contents.
    pub fn new(platform: &'p P) -> Self {
        Self {
            tick: VectorSlot::new(platform, VectorId::TickHook),
            device: VectorSlot::new(platform, VectorId::DeviceHook),
        }
    }

    fn slot(&self, hook: Hook) -> &VectorSlot<'p, P> {
        match hook {
            Hook::Tick => &self.tick,
            Hook::Device => &self.device,
        }
    }

    fn slot_mut(&mut self, hook: Hook) -> &mut VectorSlot<'p, P> {
        match hook {
            Hook::Tick => &mut self.tick,
            Hook::Device => &mut self.device,
        }
    }

    /// Captures all five bytes of `hook` for a later restore.
    pub fn save(&mut self, hook: Hook) {
        self.slot_mut(hook).save();
    }

    /// Makes `hook` jump to `handler`.
    ///
    /// # Safety
    ///
    /// `handler` must be resident, preserve every register it uses and
    /// return normally. It must not return from the interrupt itself.
    pub unsafe fn install(&mut self, hook: Hook, handler: HandlerAddr) {
        // SAFETY: Forwarded to the caller.
        unsafe { self.slot_mut(hook).install(handler) };
    }

    /// Writes the saved five bytes of `hook` back.
    pub fn restore(&mut self, hook: Hook) {
        self.slot_mut(hook).restore();
    }

    /// Makes `hook` return immediately.
    pub fn disable(&mut self, hook: Hook) {
        self.slot_mut(hook).write_return();
    }

    /// Reads the live cell of `hook`.
    #[must_use]
    pub fn current(&self, hook: Hook) -> VectorImage {
        self.slot(hook).current()
    }

    /// The image `restore(hook)` will write.
    #[must_use]
    pub fn saved(&self, hook: Hook) -> &VectorImage {
        self.slot(hook).saved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msx;
    use crate::slot::testing::FlatMemory;
    use crate::vector::SlotState;

    const COUNTER: HandlerAddr = HandlerAddr::new(0x4100);

    #[test]
    fn install_keeps_trailing_bytes() {
        let p = FlatMemory::boot();
        let mut hooks = SecondaryHookController::new(&p);
        unsafe { hooks.install(Hook::Tick, COUNTER) };
        assert_eq!(p.peek(msx::HTIMI, 5), [0xC3, 0x00, 0x41, 0xC9, 0xC9]);
    }

    #[test]
    fn disable_writes_single_ret() {
        let p = FlatMemory::boot();
        let mut hooks = SecondaryHookController::new(&p);
        unsafe { hooks.install(Hook::Device, COUNTER) };
        hooks.disable(Hook::Device);
        assert_eq!(p.peek(msx::HKEYI, 5), [0xC9, 0x00, 0x41, 0xC9, 0xC9]);
        assert_eq!(hooks.current(Hook::Device).state(), SlotState::Disabled);
    }

    #[test]
    fn hooks_are_independent() {
        let p = FlatMemory::boot();
        let mut hooks = SecondaryHookController::new(&p);
        let device_before = p.peek(msx::HKEYI, 5);

        hooks.save(Hook::Tick);
        unsafe { hooks.install(Hook::Tick, COUNTER) };
        hooks.disable(Hook::Tick);
        hooks.restore(Hook::Tick);

        assert_eq!(p.peek(msx::HKEYI, 5), device_before);
        assert_eq!(hooks.saved(Hook::Device).as_bytes(), device_before.as_slice());
    }

    #[test]
    fn restore_undoes_disable() {
        let p = FlatMemory::boot();
        let mut hooks = SecondaryHookController::new(&p);
        unsafe { hooks.install(Hook::Tick, COUNTER) };
        hooks.save(Hook::Tick);
        hooks.disable(Hook::Tick);
        hooks.restore(Hook::Tick);
        assert_eq!(hooks.current(Hook::Tick).target(), Some(COUNTER));
    }

    #[test]
    fn all_writes_masked() {
        let p = FlatMemory::boot();
        let mut hooks = SecondaryHookController::new(&p);
        for hook in Hook::ALL {
            hooks.save(hook);
            unsafe { hooks.install(hook, COUNTER) };
            hooks.disable(hook);
            hooks.restore(hook);
        }
        assert_eq!(p.writes.get(), 6);
        assert_eq!(p.unmasked_writes.get(), 0);
    }
}
