//! Logical vector identities and the byte images stored in them.
//!
//! A managed cell holds Z80 machine code that the processor (or the firmware
//! handler) executes directly:
//!
//! | Vector | Cell size | Installed encoding |
//! |--------|-----------|--------------------|
//! | [`VectorId::Primary`] | 3 bytes | `JP nn` |
//! | [`VectorId::TickHook`] | 5 bytes | `JP nn`, trailing bytes untouched |
//! | [`VectorId::DeviceHook`] | 5 bytes | `JP nn`, trailing bytes untouched |
//!
//! A disabled hook starts with `RET`. The primary vector is never disabled
//! this way; it is pointed at a minimal acknowledging handler instead.

use core::fmt;

/// `JP nn` opcode.
pub const OP_JP: u8 = 0xC3;

/// `RET` opcode.
pub const OP_RET: u8 = 0xC9;

/// Size of the largest managed cell.
pub const MAX_IMAGE_LEN: usize = 5;

/// Logical identity of a managed vector cell.
///
/// Platforms resolve these to addresses with [`Platform::locate`].
///
/// [`Platform::locate`]: crate::Platform::locate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VectorId {
    /// The physical interrupt entry point.
    Primary,
    /// Hook called by the primary handler on every frame interrupt.
    TickHook,
    /// Hook called by the primary handler on every interrupt entry.
    DeviceHook,
}

impl VectorId {
    /// All managed vectors.
    pub const ALL: [Self; 3] = [Self::Primary, Self::TickHook, Self::DeviceHook];

    /// Number of bytes captured and restored for this vector.
    #[must_use]
    pub const fn image_len(self) -> usize {
        match self {
            Self::Primary => 3,
            Self::TickHook | Self::DeviceHook => MAX_IMAGE_LEN,
        }
    }

    /// Short name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::TickHook => "tick-hook",
            Self::DeviceHook => "device-hook",
        }
    }
}

impl fmt::Display for VectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Address of a routine in the platform's 16-bit address space.
///
/// The library stores these addresses but never validates or owns the code
/// behind them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct HandlerAddr(u16);

impl HandlerAddr {
    /// Wraps a raw address.
    #[must_use]
    pub const fn new(addr: u16) -> Self {
        Self(addr)
    }

    /// Returns the raw address.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for HandlerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerAddr({:#06x})", self.0)
    }
}

impl fmt::Display for HandlerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// What a cell's bytes currently do when executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// The cell jumps to the given routine (firmware default or installed).
    Jump(HandlerAddr),
    /// The cell returns immediately.
    Disabled,
    /// Any other byte pattern.
    Unknown,
}

/// Byte-for-byte capture of a vector cell.
///
/// Sized to the cell it was taken from; see [`VectorId::image_len`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VectorImage {
    bytes: [u8; MAX_IMAGE_LEN],
    len: u8,
}

impl VectorImage {
    /// Returns a zero-filled image sized for `id`.
    #[must_use]
    pub const fn empty(id: VectorId) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let len = id.image_len() as u8;
        Self {
            bytes: [0; MAX_IMAGE_LEN],
            len,
        }
    }

    /// Builds an image from raw bytes.
    ///
    /// Returns `None` if `bytes` is longer than [`MAX_IMAGE_LEN`].
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > MAX_IMAGE_LEN {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let len = bytes.len() as u8;
        let mut image = Self {
            bytes: [0; MAX_IMAGE_LEN],
            len,
        };
        image.bytes[..bytes.len()].copy_from_slice(bytes);
        Some(image)
    }

    /// Encodes `JP handler`.
    #[must_use]
    pub const fn jump(handler: HandlerAddr) -> [u8; 3] {
        let [lo, hi] = handler.get().to_le_bytes();
        [OP_JP, lo, hi]
    }

    /// The captured bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.bytes[..usize::from(self.len)]
    }

    /// Decodes what the cell does when executed.
    #[must_use]
    pub fn state(&self) -> SlotState {
        match self.as_bytes() {
            [OP_JP, lo, hi, ..] => SlotState::Jump(HandlerAddr::new(u16::from_le_bytes([*lo, *hi]))),
            [OP_RET, ..] => SlotState::Disabled,
            _ => SlotState::Unknown,
        }
    }

    /// The jump target, if the cell starts with `JP nn`.
    #[must_use]
    pub fn target(&self) -> Option<HandlerAddr> {
        match self.state() {
            SlotState::Jump(addr) => Some(addr),
            SlotState::Disabled | SlotState::Unknown => None,
        }
    }
}

impl fmt::Debug for VectorImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VectorImage[")?;
        for (i, byte) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        f.write_str("]")
    }
}
