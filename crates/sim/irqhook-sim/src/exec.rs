//! Instruction fetch and interrupt acceptance.

use irqhook_core::msx;
use irqhook_core::vector::{OP_JP, OP_RET};
use irqhook_core::{Platform, ack_only_isr, chaining_isr, htrace};

use crate::error::SimError;
use crate::firmware;
use crate::machine::{Machine, Routine};

/// Jumps followed before giving up on a chain.
const MAX_HOPS: usize = 16;

impl Machine {
    /// Runs the code at `start` until it returns.
    ///
    /// Only `JP nn` and `RET` are decoded; any address with a registered
    /// routine runs that routine instead.
    pub(crate) fn execute(&self, start: u16) {
        let mut pc = start;
        for _ in 0..MAX_HOPS {
            if self.faulted() {
                return;
            }
            if let Some(routine) = self.routine_at(pc) {
                self.run(routine);
                return;
            }
            let code = self.peek(pc, 3);
            match code[0] {
                OP_RET => return,
                OP_JP => pc = u16::from_le_bytes([code[1], code[2]]),
                opcode => {
                    self.set_fault(SimError::InvalidOpcode { addr: pc, opcode });
                    return;
                }
            }
        }
        self.set_fault(SimError::JumpLoop { start });
    }

    fn run(&self, routine: Routine) {
        match routine {
            Routine::User(f) => f(self),
            Routine::Firmware => firmware::keyint(self),
            // SAFETY: Resident handlers only run as the target of the primary
            // vector, where the machine has masked interrupts on acceptance.
            Routine::AckOnly => unsafe { ack_only_isr(self) },
            // SAFETY: As above; hook cells are only written masked.
            Routine::Chaining => unsafe { chaining_isr(self, self.config().ack_timing) },
        }
    }

    /// Takes pending interrupts for as long as the processor can.
    pub(crate) fn service(&self) {
        let mut taken = 0;
        while !self.faulted() && self.depth.get() == 0 && self.interrupt_pending() {
            if !self.interrupts_enabled() {
                return;
            }
            if taken == self.config().storm_limit.get() {
                self.set_fault(SimError::InterruptStorm { dispatches: taken });
                return;
            }
            self.accept();
            taken += 1;
        }
    }

    /// `RST 38h`: mask, consume the device pulse, run the primary vector.
    fn accept(&self) {
        self.disable_interrupts();
        self.take_device_line();
        self.count_dispatch();
        htrace!("sim: accept, frame depth {}", self.frame_depth());

        let entry = self.frame_depth();
        self.depth.set(self.depth.get() + 1);
        self.execute(msx::HINT);
        self.depth.set(self.depth.get() - 1);

        let exit = self.frame_depth();
        if entry != exit {
            self.set_fault(SimError::UnbalancedFrames { entry, exit });
        }
    }
}
