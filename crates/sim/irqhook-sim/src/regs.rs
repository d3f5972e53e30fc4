//! Simulated Z80 register file.

/// One of the two general-purpose register banks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bank {
    /// Accumulator and flags.
    pub af: u16,
    /// BC pair.
    pub bc: u16,
    /// DE pair.
    pub de: u16,
    /// HL pair.
    pub hl: u16,
}

/// The registers a handler must preserve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    /// Main bank.
    pub main: Bank,
    /// Alternate bank (`EX AF,AF'` / `EXX`).
    pub alt: Bank,
    /// IX index register.
    pub ix: u16,
    /// IY index register.
    pub iy: u16,
}

impl Bank {
    const fn counting_from(base: u16) -> Self {
        Self {
            af: base,
            bc: base.wrapping_add(1),
            de: base.wrapping_add(2),
            hl: base.wrapping_add(3),
        }
    }
}

impl Registers {
    /// A recognisable non-zero pattern for interrupted-context tests.
    #[must_use]
    pub const fn pattern(seed: u16) -> Self {
        Self {
            main: Bank::counting_from(seed),
            alt: Bank::counting_from(seed.wrapping_add(0x100)),
            ix: seed.wrapping_add(0x200),
            iy: seed.wrapping_add(0x201),
        }
    }
}
