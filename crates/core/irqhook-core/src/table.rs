//! All three managed vectors behind one owner.

use crate::hooks::{Hook, SecondaryHookController};
use crate::platform::Platform;
use crate::primary::PrimaryVectorController;
use crate::vector::HandlerAddr;

/// The primary vector and both hooks of one machine.
///
/// Flat `save_* / install_* / restore_* / disable_*` operations for each
/// vector; the component controllers are public for inspection.
pub struct InterruptVectors<'p, P: Platform> {
    /// The interrupt entry point.
    pub primary: PrimaryVectorController<'p, P>,
    /// The tick and device hooks.
    pub hooks: SecondaryHookController<'p, P>,
}

impl<'p, P: Platform> InterruptVectors<'p, P> {
    /// Takes control of all three vectors, capturing their current contents.
    pub fn new(platform: &'p P) -> Self {
        Self {
            primary: PrimaryVectorController::new(platform),
            hooks: SecondaryHookController::new(platform),
        }
    }

    /// Saves the primary vector.
    pub fn save_primary(&mut self) {
        self.primary.save();
    }

    /// Installs a primary handler.
    ///
    /// # Safety
    ///
    /// See [`PrimaryVectorController::install`].
    pub unsafe fn install_primary(&mut self, handler: HandlerAddr) {
        // SAFETY: Forwarded to the caller.
        unsafe { self.primary.install(handler) };
    }

    /// Restores the primary vector.
    pub fn restore_primary(&mut self) {
        self.primary.restore();
    }

    /// Points the primary vector at the acknowledge-only handler.
    pub fn disable_primary(&mut self) {
        self.primary.disable();
    }

    /// Saves the tick hook.
    pub fn save_tick_hook(&mut self) {
        self.hooks.save(Hook::Tick);
    }

    /// Installs a tick hook handler.
    ///
    /// # Safety
    ///
    /// See [`SecondaryHookController::install`].
    pub unsafe fn install_tick_hook(&mut self, handler: HandlerAddr) {
        // SAFETY: Forwarded to the caller.
        unsafe { self.hooks.install(Hook::Tick, handler) };
    }

    /// Restores the tick hook.
    pub fn restore_tick_hook(&mut self) {
        self.hooks.restore(Hook::Tick);
    }

    /// Makes the tick hook return immediately.
    pub fn disable_tick_hook(&mut self) {
        self.hooks.disable(Hook::Tick);
    }

    /// Saves the device hook.
    pub fn save_device_hook(&mut self) {
        self.hooks.save(Hook::Device);
    }

    /// Installs a device hook handler.
    ///
    /// # Safety
    ///
    /// See [`SecondaryHookController::install`].
    pub unsafe fn install_device_hook(&mut self, handler: HandlerAddr) {
        // SAFETY: Forwarded to the caller.
        unsafe { self.hooks.install(Hook::Device, handler) };
    }

    /// Restores the device hook.
    pub fn restore_device_hook(&mut self) {
        self.hooks.restore(Hook::Device);
    }

    /// Makes the device hook return immediately.
    pub fn disable_device_hook(&mut self) {
        self.hooks.disable(Hook::Device);
    }

    /// Saves all three vectors.
    pub fn save_all(&mut self) {
        self.save_primary();
        self.save_tick_hook();
        self.save_device_hook();
    }

    /// Restores all three vectors, primary first.
    pub fn restore_all(&mut self) {
        self.restore_primary();
        self.restore_tick_hook();
        self.restore_device_hook();
    }
}
