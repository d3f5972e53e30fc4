//! Machine state and the [`Platform`] implementation.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use irqhook_core::msx::{self, VdpStatus};
use irqhook_core::vector::OP_RET;
use irqhook_core::{HandlerAddr, Platform, ResidentRoutine, VectorId, VectorImage, hwarn};

use crate::config::MachineConfig;
use crate::error::SimError;
use crate::regs::Registers;

/// Where the resident chaining handler lives.
pub const CHAINING_ADDR: u16 = 0x0100;

/// Where the resident acknowledge-only handler lives.
pub const ACK_ONLY_ADDR: u16 = 0x0140;

/// First address handed out by [`Machine::register`].
pub const USER_BASE: u16 = 0x4000;

/// End of the area [`Machine::register`] hands addresses out from. System
/// RAM starts here.
pub const USER_END: u16 = 0xF380;

const USER_STRIDE: u16 = 0x10;
const MEMORY_SIZE: usize = 0x1_0000;

/// Index of the byte `offset` past `addr`, wrapping at 64 KiB.
fn wrap(addr: u16, offset: usize) -> usize {
    (usize::from(addr) + offset) % MEMORY_SIZE
}

/// Code the machine runs natively when execution reaches its address.
#[derive(Clone)]
pub(crate) enum Routine {
    User(Rc<dyn Fn(&Machine)>),
    Firmware,
    AckOnly,
    Chaining,
}

/// An interrupt source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    /// The VDP vertical-blank interrupt. Stays asserted until the status
    /// register is read.
    Frame,
    /// Any other device. Consumed when the processor accepts an interrupt.
    Device,
}

/// Running counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Frames advanced by `halt` or [`Machine::step_frame`].
    pub frames: u64,
    /// Interrupts accepted by the processor.
    pub dispatches: u64,
    /// Reads of the status register.
    pub status_reads: u64,
}

/// A write to a vector cell, as seen on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorWrite {
    /// First address written.
    pub addr: u16,
    /// Bytes written.
    pub bytes: Vec<u8>,
    /// Whether interrupts were masked for the whole write.
    pub masked: bool,
}

#[derive(Debug, Clone, Copy)]
struct Injection {
    after: usize,
    line: Line,
}

/// A simulated MSX machine running in interrupt mode 1.
///
/// Boots with the firmware handler behind the primary vector and both hooks
/// holding `RET`. Everything is interior-mutable because [`Platform`] is a
/// shared-reference interface and handlers re-enter the machine.
pub struct Machine {
    config: MachineConfig,
    mem: RefCell<Box<[u8]>>,
    iff: Cell<bool>,
    status: Cell<VdpStatus>,
    device_line: Cell<bool>,
    regs: Cell<Registers>,
    frame_depth: Cell<u32>,
    pub(crate) depth: Cell<u32>,
    routines: RefCell<BTreeMap<u16, Routine>>,
    next_user: Cell<u16>,
    stats: Cell<Stats>,
    writes: RefCell<Vec<VectorWrite>>,
    injection: Cell<Option<Injection>>,
    fault: Cell<Option<SimError>>,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(MachineConfig::default())
    }
}

impl Machine {
    /// Boots a machine with interrupts enabled.
    #[must_use]
    pub fn new(config: MachineConfig) -> Self {
        let mut mem = vec![0u8; MEMORY_SIZE].into_boxed_slice();
        let firmware = VectorImage::jump(HandlerAddr::new(msx::KEYINT));
        mem[usize::from(msx::HINT)..][..firmware.len()].copy_from_slice(&firmware);
        for hook in [msx::HTIMI, msx::HKEYI] {
            mem[usize::from(hook)..][..VectorId::TickHook.image_len()].fill(OP_RET);
        }

        let routines = BTreeMap::from([
            (msx::KEYINT, Routine::Firmware),
            (CHAINING_ADDR, Routine::Chaining),
            (ACK_ONLY_ADDR, Routine::AckOnly),
        ]);

        Self {
            config,
            mem: RefCell::new(mem),
            iff: Cell::new(true),
            status: Cell::new(VdpStatus::empty()),
            device_line: Cell::new(false),
            regs: Cell::new(Registers::default()),
            frame_depth: Cell::new(0),
            depth: Cell::new(0),
            routines: RefCell::new(routines),
            next_user: Cell::new(USER_BASE),
            stats: Cell::new(Stats::default()),
            writes: RefCell::new(Vec::new()),
            injection: Cell::new(None),
            fault: Cell::new(None),
        }
    }

    /// The configuration this machine was booted with.
    #[must_use]
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Places `routine` at a fresh address and returns that address.
    ///
    /// The routine runs whenever execution reaches the address, whether from
    /// the primary vector or a hook call. A primary handler must acknowledge
    /// and unmask itself, for example by ending in
    /// [`ack_only_isr`](irqhook_core::ack_only_isr).
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfRoutineSpace`] once every address below
    /// [`USER_END`] is taken.
    pub fn register(
        &self,
        routine: impl Fn(&Machine) + 'static,
    ) -> Result<HandlerAddr, SimError> {
        let addr = self.next_user.get();
        let next = addr
            .checked_add(USER_STRIDE)
            .filter(|&next| next <= USER_END)
            .ok_or(SimError::OutOfRoutineSpace)?;
        self.next_user.set(next);
        self.routines
            .borrow_mut()
            .insert(addr, Routine::User(Rc::new(routine)));
        Ok(HandlerAddr::new(addr))
    }

    pub(crate) fn routine_at(&self, addr: u16) -> Option<Routine> {
        self.routines.borrow().get(&addr).cloned()
    }

    // -----------------------------------------------------------------------
    // Memory
    // -----------------------------------------------------------------------

    /// Reads `len` bytes without going through the interrupt mask.
    ///
    /// Addresses wrap at the top of memory, as the Z80 address bus does.
    #[must_use]
    pub fn peek(&self, addr: u16, len: usize) -> Vec<u8> {
        let mem = self.mem.borrow();
        (0..len).map(|i| mem[wrap(addr, i)]).collect()
    }

    /// Writes bytes directly, bypassing the write log and the mask.
    pub fn poke(&self, addr: u16, bytes: &[u8]) {
        let mut mem = self.mem.borrow_mut();
        for (i, &byte) in bytes.iter().enumerate() {
            mem[wrap(addr, i)] = byte;
        }
    }

    /// Decodes the live contents of a vector cell.
    #[must_use]
    pub fn vector(&self, id: VectorId) -> VectorImage {
        let bytes = self.peek(msx::locate(id), id.image_len());
        VectorImage::from_bytes(&bytes).unwrap_or(VectorImage::empty(id))
    }

    /// The firmware frame counter.
    #[must_use]
    pub fn jiffy(&self) -> u16 {
        let bytes = self.peek(msx::JIFFY, 2);
        u16::from_le_bytes([bytes[0], bytes[1]])
    }

    pub(crate) fn tick_jiffy(&self) {
        self.poke(msx::JIFFY, &self.jiffy().wrapping_add(1).to_le_bytes());
    }

    /// The latched status shadow.
    #[must_use]
    pub fn statfl(&self) -> u8 {
        self.mem.borrow()[usize::from(msx::STATFL)]
    }

    // -----------------------------------------------------------------------
    // Registers
    // -----------------------------------------------------------------------

    /// The current register file.
    #[must_use]
    pub fn registers(&self) -> Registers {
        self.regs.get()
    }

    /// Overwrites the register file, as code running on the machine would.
    pub fn set_registers(&self, regs: Registers) {
        self.regs.set(regs);
    }

    // -----------------------------------------------------------------------
    // Interrupt lines
    // -----------------------------------------------------------------------

    /// Asserts `line`, dispatching at once if the processor can take it.
    pub fn raise(&self, line: Line) {
        self.assert_line(line);
        self.service();
    }

    fn assert_line(&self, line: Line) {
        match line {
            Line::Frame => self
                .status
                .set(self.status.get() | VdpStatus::FRAME_INTERRUPT),
            Line::Device => self.device_line.set(true),
        }
    }

    pub(crate) fn pending(&self) -> bool {
        self.status.get().is_frame() || self.device_line.get()
    }

    /// Returns `true` if an interrupt is asserted but not yet taken.
    #[must_use]
    pub fn interrupt_pending(&self) -> bool {
        self.pending()
    }

    pub(crate) fn take_device_line(&self) {
        self.device_line.set(false);
    }

    /// Advances one frame without halting: raises the frame line and, on
    /// every `device_every`-th frame, the device line.
    ///
    /// Unlike `halt`, this is allowed with interrupts masked; the lines
    /// simply stay pending.
    pub fn step_frame(&self) {
        if self.faulted() {
            return;
        }
        let frames = self.bump(|s| {
            s.frames += 1;
            s.frames
        });
        self.assert_line(Line::Frame);
        let every = u64::from(self.config.device_every);
        if every != 0 && frames % every == 0 {
            self.assert_line(Line::Device);
        }
        self.service();
    }

    /// Halts for `frames` frames, stopping at the first fault.
    ///
    /// # Errors
    ///
    /// Returns the fault that locked the machine up, if any.
    pub fn run_frames(&self, frames: u64) -> Result<(), SimError> {
        for _ in 0..frames {
            self.halt();
            self.check()?;
        }
        Ok(())
    }

    /// Arranges for `line` to be raised right after the `after`-th byte of
    /// the next vector write.
    pub fn inject_after(&self, after: usize, line: Line) {
        self.injection.set(Some(Injection { after, line }));
    }

    // -----------------------------------------------------------------------
    // Bookkeeping
    // -----------------------------------------------------------------------

    /// Counters since boot.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.stats.get()
    }

    fn bump<R>(&self, f: impl FnOnce(&mut Stats) -> R) -> R {
        let mut stats = self.stats.get();
        let r = f(&mut stats);
        self.stats.set(stats);
        r
    }

    pub(crate) fn count_dispatch(&self) {
        self.bump(|s| s.dispatches += 1);
    }

    /// Drains the log of vector writes.
    pub fn take_vector_writes(&self) -> Vec<VectorWrite> {
        core::mem::take(&mut *self.writes.borrow_mut())
    }

    /// Current frame push depth.
    pub(crate) fn frame_depth(&self) -> u32 {
        self.frame_depth.get()
    }

    /// The fault that locked the machine up, if any.
    #[must_use]
    pub fn fault(&self) -> Option<SimError> {
        self.fault.get()
    }

    pub(crate) fn faulted(&self) -> bool {
        self.fault.get().is_some()
    }

    /// Returns the recorded fault as an error.
    ///
    /// # Errors
    ///
    /// Returns the fault that locked the machine up, if any.
    pub fn check(&self) -> Result<(), SimError> {
        self.fault.get().map_or(Ok(()), Err)
    }

    pub(crate) fn set_fault(&self, err: SimError) {
        if self.fault.get().is_none() {
            hwarn!("sim: {}", err);
            self.fault.set(Some(err));
        }
    }

    fn is_vector_cell(addr: u16, len: usize) -> bool {
        VectorId::ALL.iter().any(|&id| {
            let start = usize::from(msx::locate(id));
            let at = usize::from(addr);
            at >= start && at + len <= start + id.image_len()
        })
    }
}

// SAFETY: The three cells are the fixed MSX addresses, which do not overlap.
// `disable_interrupts` holds off `service` until `enable_interrupts`. The
// resident addresses are registered at boot and never replaced.
unsafe impl Platform for Machine {
    type Frame = Registers;

    fn interrupts_enabled(&self) -> bool {
        self.iff.get()
    }

    fn disable_interrupts(&self) {
        self.iff.set(false);
    }

    unsafe fn enable_interrupts(&self) {
        self.iff.set(true);
        self.service();
    }

    fn halt(&self) {
        if self.faulted() {
            return;
        }
        if !self.iff.get() {
            self.set_fault(SimError::HaltWithInterruptsMasked);
            return;
        }
        self.step_frame();
    }

    fn locate(&self, id: VectorId) -> u16 {
        msx::locate(id)
    }

    fn read_bytes(&self, addr: u16, buf: &mut [u8]) {
        buf.copy_from_slice(&self.peek(addr, buf.len()));
    }

    unsafe fn write_bytes(&self, addr: u16, bytes: &[u8]) {
        debug_assert!(Self::is_vector_cell(addr, bytes.len()));
        let mut masked = !self.iff.get();
        for (i, &byte) in bytes.iter().enumerate() {
            self.mem.borrow_mut()[wrap(addr, i)] = byte;
            if let Some(inj) = self.injection.get().filter(|inj| inj.after == i + 1) {
                self.injection.set(None);
                self.raise(inj.line);
            }
            masked &= !self.iff.get();
        }
        self.writes.borrow_mut().push(VectorWrite {
            addr,
            bytes: bytes.to_vec(),
            masked,
        });
    }

    fn read_status(&self) -> u8 {
        self.bump(|s| s.status_reads += 1);
        let status = self.status.get();
        self.status.set(status - VdpStatus::CLEARED_ON_READ);
        status.bits()
    }

    fn latch_status(&self, status: u8) {
        self.mem.borrow_mut()[usize::from(msx::STATFL)] = status;
    }

    unsafe fn call(&self, addr: u16) {
        self.execute(addr);
    }

    fn push_frame(&self) -> Registers {
        self.frame_depth.set(self.frame_depth.get() + 1);
        self.regs.get()
    }

    fn pop_frame(&self, frame: Registers) {
        self.frame_depth.set(self.frame_depth.get().saturating_sub(1));
        self.regs.set(frame);
    }

    fn resident(&self, routine: ResidentRoutine) -> HandlerAddr {
        match routine {
            ResidentRoutine::AckOnly => HandlerAddr::new(ACK_ONLY_ADDR),
            ResidentRoutine::Chaining => HandlerAddr::new(CHAINING_ADDR),
        }
    }
}
