//! Simulated machine faults.

use core::fmt;

/// A condition that locks the simulated machine up, or a request the
/// simulator cannot satisfy.
///
/// On real hardware the lock-ups are hangs or crashes. The simulator records
/// the first one and then ignores further interrupts and execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    /// Execution reached a byte that is neither `JP nn`, `RET`, nor a
    /// registered routine.
    InvalidOpcode {
        /// Address of the byte.
        addr: u16,
        /// The byte found there.
        opcode: u8,
    },
    /// A chain of jumps never reached a routine or `RET`.
    JumpLoop {
        /// Address the chain started from.
        start: u16,
    },
    /// The interrupt line stayed asserted across too many consecutive
    /// dispatches, usually because the handler never acknowledged.
    InterruptStorm {
        /// Dispatches taken back to back.
        dispatches: u32,
    },
    /// `halt` was executed with interrupts masked.
    HaltWithInterruptsMasked,
    /// A handler returned with a different number of frames pushed than on
    /// entry.
    UnbalancedFrames {
        /// Frame depth when the handler was entered.
        entry: u32,
        /// Frame depth when it returned.
        exit: u32,
    },
    /// [`Machine::register`](crate::Machine::register) ran out of addresses
    /// in the user area. Not recorded as a fault.
    OutOfRoutineSpace,
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOpcode { addr, opcode } => {
                write!(f, "invalid opcode {opcode:#04x} at {addr:#06x}")
            }
            Self::JumpLoop { start } => write!(f, "jump chain from {start:#06x} never terminates"),
            Self::InterruptStorm { dispatches } => {
                write!(f, "interrupt storm: {dispatches} dispatches without the line clearing")
            }
            Self::HaltWithInterruptsMasked => write!(f, "HALT with interrupts masked"),
            Self::UnbalancedFrames { entry, exit } => {
                write!(f, "handler left frame depth {exit}, entered at {entry}")
            }
            Self::OutOfRoutineSpace => write!(f, "no free address left for a routine"),
        }
    }
}

impl std::error::Error for SimError {}
