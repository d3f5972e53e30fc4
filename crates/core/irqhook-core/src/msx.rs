//! MSX platform constants.
//!
//! Addresses of the vector cells and system variables on MSX machines, and
//! the bit layout of the VDP status register (S#0) whose read acknowledges
//! the frame interrupt.

use bitflags::bitflags;

use crate::vector::VectorId;

/// Z80 mode 1 entry point (`RST 38h`).
pub const HINT: u16 = 0x0038;

/// `H.KEYI`: hook for interrupt sources other than the VDP (RS-232C, MIDI).
pub const HKEYI: u16 = 0xFD9A;

/// `H.TIMI`: hook for the VDP vertical-blank interrupt.
pub const HTIMI: u16 = 0xFD9F;

/// `STATFL`: shadow copy of VDP status register 0.
pub const STATFL: u16 = 0xF3E7;

/// `JIFFY`: 16-bit frame counter maintained by the firmware handler.
pub const JIFFY: u16 = 0xFC9E;

/// Firmware interrupt handler (`KEYINT`) reached from [`HINT`] at boot.
pub const KEYINT: u16 = 0x0C3C;

bitflags! {
    /// VDP status register 0.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VdpStatus: u8 {
        /// Vertical-blank (frame) interrupt pending. Tested through the sign
        /// flag by the handlers.
        const FRAME_INTERRUPT = 0x80;
        /// Fifth sprite on a line.
        const FIFTH_SPRITE = 0x40;
        /// Sprite collision.
        const COLLISION = 0x20;
    }
}

impl VdpStatus {
    /// Flags cleared by reading the register.
    pub const CLEARED_ON_READ: Self = Self::FRAME_INTERRUPT
        .union(Self::FIFTH_SPRITE)
        .union(Self::COLLISION);

    /// Returns `true` if this status reports a pending frame interrupt.
    #[must_use]
    pub const fn is_frame(self) -> bool {
        self.contains(Self::FRAME_INTERRUPT)
    }
}

/// Resolves a logical vector to its MSX address.
#[must_use]
pub const fn locate(id: VectorId) -> u16 {
    match id {
        VectorId::Primary => HINT,
        VectorId::TickHook => HTIMI,
        VectorId::DeviceHook => HKEYI,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_do_not_overlap() {
        let mut spans: Vec<(u16, u16)> = VectorId::ALL
            .iter()
            .map(|&id| {
                let start = locate(id);
                (start, start + u16::try_from(id.image_len()).unwrap())
            })
            .collect();
        spans.sort_unstable();
        for pair in spans.windows(2) {
            assert!(pair[0].1 <= pair[1].0, "{pair:?} overlap");
        }
    }

    #[test]
    fn frame_bit_is_sign_bit() {
        assert!(VdpStatus::from_bits_retain(0x9F).is_frame());
        assert!(!VdpStatus::from_bits_retain(0x7F).is_frame());
        assert_eq!(VdpStatus::CLEARED_ON_READ.bits(), 0xE0);
    }
}
