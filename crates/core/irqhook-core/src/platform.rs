//! Hardware abstraction consumed by the vector controllers.
//!
//! Everything the core needs from the machine goes through [`Platform`]:
//! the interrupt mask, the memory holding the vector cells, the status
//! register whose read acknowledges an interrupt, register-file
//! preservation, and the addresses at which the library's own handlers are
//! resident. Real hardware implements it with port I/O and fixed link-time
//! symbols; tests implement it on a simulated vector table.

use crate::vector::{HandlerAddr, VectorId};

/// Handlers this library provides and that a platform keeps resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidentRoutine {
    /// Runs [`ack_only_isr`](crate::chain::ack_only_isr). Installed by
    /// [`PrimaryVectorController::disable`](crate::PrimaryVectorController::disable).
    AckOnly,
    /// Runs [`chaining_isr`](crate::chain::chaining_isr).
    Chaining,
}

/// Access to a single-core machine with one maskable interrupt line.
///
/// # Handler contract
///
/// Any routine whose address ends up in a vector cell must:
///
/// - preserve and restore every register it uses, including the alternate
///   bank;
/// - if it is a primary handler, perform the acknowledgement side effect
///   (one status read) exactly once, then unmask interrupts and return from
///   the interrupt;
/// - if it is a hook handler, return normally; the primary handler that
///   called it owns the interrupt return.
///
/// # Safety
///
/// Implementors must guarantee that:
///
/// - [`locate`](Self::locate) returns the cells the processor and firmware
///   actually dispatch through, and that the three cells do not overlap;
/// - [`disable_interrupts`](Self::disable_interrupts) holds off interrupt
///   delivery until the next [`enable_interrupts`](Self::enable_interrupts);
/// - [`resident`](Self::resident) returns addresses at which the named
///   routines are resident for the life of the program and satisfy the
///   handler contract above.
pub unsafe trait Platform {
    /// Register state captured by [`push_frame`](Self::push_frame).
    type Frame;

    /// Returns `true` if interrupt delivery is currently enabled.
    fn interrupts_enabled(&self) -> bool;

    /// Masks the interrupt line (`DI`).
    fn disable_interrupts(&self);

    /// Unmasks the interrupt line (`EI`). A pending interrupt may be
    /// delivered as soon as this returns.
    ///
    /// # Safety
    ///
    /// Every managed vector cell must hold a complete encoding, and the
    /// caller must not be inside a region that relies on interrupts staying
    /// masked.
    unsafe fn enable_interrupts(&self);

    /// Halts until the next interrupt has been serviced (`HALT`).
    ///
    /// Used by callers driving the machine, never by the core itself.
    fn halt(&self);

    /// Resolves a logical vector to the address of its cell.
    fn locate(&self, id: VectorId) -> u16;

    /// Copies `buf.len()` bytes starting at `addr` into `buf`.
    fn read_bytes(&self, addr: u16, buf: &mut [u8]);

    /// Writes `bytes` starting at `addr`.
    ///
    /// # Safety
    ///
    /// The caller must have interrupts masked, and `addr` must be a managed
    /// vector cell large enough for `bytes`.
    unsafe fn write_bytes(&self, addr: u16, bytes: &[u8]);

    /// Reads the interrupt status register.
    ///
    /// This is the acknowledgement: reading clears the pending bits, so it
    /// must happen exactly once per interrupt entry.
    fn read_status(&self) -> u8;

    /// Stores a status byte into the firmware's shadow variable.
    fn latch_status(&self, status: u8);

    /// Calls the code at `addr` as a subroutine.
    ///
    /// # Safety
    ///
    /// `addr` must hold code that returns normally and honours the hook
    /// handler contract.
    unsafe fn call(&self, addr: u16);

    /// Saves the full register file, including the alternate bank.
    fn push_frame(&self) -> Self::Frame;

    /// Restores a register file saved by [`push_frame`](Self::push_frame).
    fn pop_frame(&self, frame: Self::Frame);

    /// Address at which one of this library's handlers is resident.
    fn resident(&self, routine: ResidentRoutine) -> HandlerAddr;
}
