//! Owned vector cells.
//!
//! A [`VectorSlot`] pairs one managed cell with its saved image and is the
//! only way this crate mutates that cell. Every read of the live cell and
//! every write to it happens inside an [`IrqGuard`].

use crate::hdebug;
use crate::irq::IrqGuard;
use crate::platform::Platform;
use crate::vector::{HandlerAddr, OP_RET, VectorId, VectorImage};

/// One managed vector cell and its saved image.
///
/// The saved image is captured when the slot is created, so a
/// [`restore`](Self::restore) before any [`save`](Self::save) puts back the
/// binding that was live at that point (normally the firmware default).
pub struct VectorSlot<'p, P: Platform> {
    platform: &'p P,
    id: VectorId,
    addr: u16,
    saved: VectorImage,
}

impl<'p, P: Platform> VectorSlot<'p, P> {
    /// Takes ownership of the cell for `id`, capturing its current contents.
    pub fn new(platform: &'p P, id: VectorId) -> Self {
        let mut slot = Self {
            platform,
            id,
            addr: platform.locate(id),
            saved: VectorImage::empty(id),
        };
        slot.capture();
        slot
    }

    /// The vector this slot manages.
    #[must_use]
    pub fn id(&self) -> VectorId {
        self.id
    }

    /// Address of the managed cell.
    #[must_use]
    pub fn address(&self) -> u16 {
        self.addr
    }

    pub(crate) fn platform(&self) -> &'p P {
        self.platform
    }

    /// Copies the live cell into the saved image, replacing the previous one.
    pub fn save(&mut self) {
        self.capture();
        hdebug!("{}: saved {:?}", self.id, self.saved);
    }

    /// Points the cell at `handler` with a `JP nn`.
    ///
    /// Only the first three bytes are written; trailing bytes of a hook cell
    /// are left as they are. The next interrupt after this returns observes
    /// the new target.
    ///
    /// # Safety
    ///
    /// `handler` must stay resident while installed and honour the handler
    /// contract documented on [`Platform`] for this kind of vector.
    pub unsafe fn install(&mut self, handler: HandlerAddr) {
        // SAFETY: `write` masks interrupts; the caller vouches for `handler`.
        unsafe { self.write(&VectorImage::jump(handler)) };
        hdebug!("{}: installed {}", self.id, handler);
    }

    /// Writes the saved image back into the cell.
    ///
    /// Restoring twice writes the same bytes twice.
    pub fn restore(&mut self) {
        let saved = self.saved;
        // SAFETY: The saved image was read from this cell, so it is a
        // complete encoding of the same width.
        unsafe { self.write(saved.as_bytes()) };
        hdebug!("{}: restored {:?}", self.id, saved);
    }

    /// Writes a single `RET` at the start of the cell.
    ///
    /// The rest of the cell and the saved image are untouched.
    pub(crate) fn write_return(&mut self) {
        // SAFETY: A bare `RET` is a complete hook body.
        unsafe { self.write(&[OP_RET]) };
        hdebug!("{}: disabled", self.id);
    }

    /// Reads the live cell.
    #[must_use]
    pub fn current(&self) -> VectorImage {
        let mut image = VectorImage::empty(self.id);
        let _irq = IrqGuard::new(self.platform);
        self.platform.read_bytes(self.addr, image.as_mut_bytes());
        image
    }

    /// The image the next [`restore`](Self::restore) will write.
    #[must_use]
    pub fn saved(&self) -> &VectorImage {
        &self.saved
    }

    fn capture(&mut self) {
        let _irq = IrqGuard::new(self.platform);
        self.platform.read_bytes(self.addr, self.saved.as_mut_bytes());
    }

    /// # Safety
    ///
    /// `bytes` must leave the cell holding code that honours the handler
    /// contract for this vector.
    unsafe fn write(&self, bytes: &[u8]) {
        debug_assert!(bytes.len() <= self.id.image_len());
        let _irq = IrqGuard::new(self.platform);
        // SAFETY: Interrupts are masked and `addr` is this slot's cell.
        unsafe { self.platform.write_bytes(self.addr, bytes) };
    }
}
