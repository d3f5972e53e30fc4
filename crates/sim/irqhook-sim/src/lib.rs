//! A host-side MSX machine for exercising `irqhook-core`.
//!
//! [`Machine`] implements [`Platform`](irqhook_core::Platform) over 64 KiB of
//! memory, an interrupt enable flag and two interrupt lines. It executes the
//! `JP nn` / `RET` encodings found in vector cells and runs registered Rust
//! closures where real code would live, including a model of the firmware's
//! default handler. Vector writes are logged with the mask state they were
//! made under, and an interrupt can be injected partway through one.

#![warn(missing_docs)]

pub mod capture;
pub mod config;
pub mod error;
mod exec;
mod firmware;
pub mod machine;
pub mod regs;

pub use config::{MachineConfig, VideoFrequency};
pub use error::SimError;
pub use machine::{ACK_ONLY_ADDR, CHAINING_ADDR, Line, Machine, Stats, VectorWrite};
pub use regs::{Bank, Registers};
