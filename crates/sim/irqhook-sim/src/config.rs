//! Machine configuration.

use core::num::NonZeroU32;

use irqhook_core::AckTiming;
use serde::Deserialize;

/// Display refresh rate, which sets the frame interrupt frequency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoFrequency {
    /// 50 Hz.
    Pal,
    /// 60 Hz.
    #[default]
    Ntsc,
}

impl VideoFrequency {
    /// Frame interrupts per second.
    #[must_use]
    pub const fn hz(self) -> u32 {
        match self {
            Self::Pal => 50,
            Self::Ntsc => 60,
        }
    }
}

#[derive(Deserialize)]
#[serde(remote = "AckTiming", rename_all = "kebab-case")]
enum AckTimingDef {
    BeforeTickHook,
    AfterTickHook,
}

/// Parameters of a simulated machine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MachineConfig {
    /// Frame interrupt frequency.
    pub video: VideoFrequency,
    /// Raise a device interrupt every this many frames; `0` never does.
    pub device_every: u32,
    /// Latch timing used by the resident chaining handler.
    #[serde(with = "AckTimingDef")]
    pub ack_timing: AckTiming,
    /// Back-to-back dispatches tolerated before declaring a storm. Zero is
    /// rejected when parsing.
    pub storm_limit: NonZeroU32,
}

const DEFAULT_STORM_LIMIT: NonZeroU32 = match NonZeroU32::new(64) {
    Some(limit) => limit,
    None => unreachable!(),
};

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            video: VideoFrequency::default(),
            device_every: 0,
            ack_timing: AckTiming::default(),
            storm_limit: DEFAULT_STORM_LIMIT,
        }
    }
}

impl MachineConfig {
    /// Frames in `seconds` of emulated time.
    #[must_use]
    pub fn frames_for(&self, seconds: u32) -> u64 {
        u64::from(seconds) * u64::from(self.video.hz())
    }
}
