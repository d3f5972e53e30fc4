//! Interrupt vector and hook management for Z80 interrupt mode 1 machines.
//!
//! The processor dispatches every maskable interrupt through one physical
//! entry point. Firmware's default handler at that entry point fans out to
//! two hook cells: one for the display frame tick and one for any other
//! interrupting device. This crate owns all three cells and offers the same
//! save / install / restore / disable protocol for each:
//!
//! - [`PrimaryVectorController`] manages the physical entry point.
//! - [`SecondaryHookController`] manages the tick and device hooks.
//! - [`chain::chaining_isr`] is a drop-in primary handler that calls both
//!   hooks, so the two controllers compose.
//!
//! Every write to a vector cell happens inside an [`IrqGuard`], so the
//! interrupt context never observes a half-written cell. Hardware access goes
//! through the [`Platform`] trait, which keeps this crate host-testable
//! against a simulated vector table.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod chain;
pub mod hooks;
pub mod irq;
pub mod log;
pub mod msx;
pub mod platform;
pub mod primary;
pub mod slot;
pub mod table;
pub mod vector;

pub use chain::{AckTiming, FrameGuard, ack_only_isr, chaining_isr};
pub use hooks::{Hook, SecondaryHookController};
pub use irq::{IrqGuard, without_interrupts};
pub use platform::{Platform, ResidentRoutine};
pub use primary::PrimaryVectorController;
pub use slot::VectorSlot;
pub use table::InterruptVectors;
pub use vector::{HandlerAddr, SlotState, VectorId, VectorImage};
