//! Primary interrupt vector control.

use crate::platform::{Platform, ResidentRoutine};
use crate::slot::VectorSlot;
use crate::vector::{HandlerAddr, VectorId, VectorImage};

/// Owns the processor's interrupt entry cell.
///
/// The primary vector is a 3-byte `JP nn`. Unlike the hooks it is never
/// overwritten with `RET`: an unacknowledged interrupt would fire again
/// immediately, so [`disable`](Self::disable) installs a minimal handler that
/// acknowledges and returns.
pub struct PrimaryVectorController<'p, P: Platform> {
    slot: VectorSlot<'p, P>,
}

impl<'p, P: Platform> PrimaryVectorController<'p, P> {
    /// Takes control of the primary vector, capturing its current binding.
    pub fn new(platform: &'p P) -> Self {
        Self {
            slot: VectorSlot::new(platform, VectorId::Primary),
        }
    }

    /// Captures the live vector for a later [`restore`](Self::restore).
    pub fn save(&mut self) {
        self.slot.save();
    }

    /// Routes every subsequent interrupt to `handler`.
    ///
    /// # Safety
    ///
    /// `handler` must be resident and satisfy the primary handler contract
    /// on [`Platform`]: preserve all registers, acknowledge exactly once,
    /// unmask and return from the interrupt. A handler that never unmasks
    /// silently loses every further interrupt.
    pub unsafe fn install(&mut self, handler: HandlerAddr) {
        // SAFETY: Forwarded to the caller.
        unsafe { self.slot.install(handler) };
    }

    /// Puts back the last saved binding.
    pub fn restore(&mut self) {
        self.slot.restore();
    }

    /// Routes interrupts to the resident acknowledge-only handler.
    ///
    /// The saved image is left alone, so `restore` still returns to the
    /// binding captured by the last `save`.
    pub fn disable(&mut self) {
        let ack = self.slot.platform().resident(ResidentRoutine::AckOnly);
        // SAFETY: `Platform::resident` promises a conforming handler.
        unsafe { self.slot.install(ack) };
    }

    /// Routes interrupts to the resident chaining handler, which calls the
    /// device and tick hooks.
    pub fn install_chaining(&mut self) {
        let chaining = self.slot.platform().resident(ResidentRoutine::Chaining);
        // SAFETY: `Platform::resident` promises a conforming handler.
        unsafe { self.slot.install(chaining) };
    }

    /// Reads the live vector.
    #[must_use]
    pub fn current(&self) -> VectorImage {
        self.slot.current()
    }

    /// The image `restore` will write.
    #[must_use]
    pub fn saved(&self) -> &VectorImage {
        self.slot.saved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msx;
    use crate::slot::testing::{ACK_ONLY, CHAINING, FlatMemory};
    use crate::vector::SlotState;

    const USER: HandlerAddr = HandlerAddr::new(0x4010);

    #[test]
    fn save_install_restore_round_trips() {
        let p = FlatMemory::boot();
        let before = p.peek(msx::HINT, 3);
        let mut primary = PrimaryVectorController::new(&p);
        primary.save();
        unsafe { primary.install(USER) };
        assert_eq!(primary.current().target(), Some(USER));
        primary.restore();
        assert_eq!(p.peek(msx::HINT, 3), before);
    }

    #[test]
    fn disable_points_at_ack_handler() {
        let p = FlatMemory::boot();
        let mut primary = PrimaryVectorController::new(&p);
        primary.disable();
        assert_eq!(primary.current().state(), SlotState::Jump(ACK_ONLY));
        primary.restore();
        assert_eq!(primary.current().target(), Some(HandlerAddr::new(msx::KEYINT)));
    }

    #[test]
    fn install_chaining_uses_resident_routine() {
        let p = FlatMemory::boot();
        let mut primary = PrimaryVectorController::new(&p);
        primary.install_chaining();
        assert_eq!(primary.current().target(), Some(CHAINING));
        assert_eq!(p.unmasked_writes.get(), 0);
    }

    #[test]
    fn double_restore_is_idempotent() {
        let p = FlatMemory::boot();
        let mut primary = PrimaryVectorController::new(&p);
        primary.save();
        unsafe { primary.install(USER) };
        primary.restore();
        let once = p.peek(msx::HINT, 3);
        primary.restore();
        assert_eq!(p.peek(msx::HINT, 3), once);
    }
}
