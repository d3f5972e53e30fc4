//! Demo programs replayed on the simulated machine.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use anyhow::{Context, Result, ensure};
use irqhook_core::{HandlerAddr, InterruptVectors, VectorId, VectorImage, ack_only_isr};
use irqhook_sim::Machine;

use crate::config::DemoConfig;
use crate::verbose::{dprintln, vprintln};

/// A call counter shared with a registered routine.
#[derive(Clone, Default)]
struct Counter(Rc<Cell<u32>>);

impl Counter {
    fn get(&self) -> u32 {
        self.0.get()
    }

    fn bump(&self) {
        self.0.set(self.0.get().wrapping_add(1));
    }

    /// Registers a hook routine that bumps this counter.
    fn hook(&self, m: &Machine) -> Result<HandlerAddr> {
        let counter = self.clone();
        m.register(move |_| counter.bump())
            .context("registering a hook routine")
    }
}

fn snapshot(m: &Machine) -> [VectorImage; 3] {
    VectorId::ALL.map(|id| m.vector(id))
}

// ===========================================================================
// isr
// ===========================================================================

/// Outcome of the `isr` scenario.
#[derive(Debug)]
pub struct IsrReport {
    /// Frames run with the custom handler installed.
    pub frames: u64,
    /// Entries into the custom handler.
    pub handled: u32,
    /// Frame interrupt frequency.
    pub hz: u64,
    /// `JIFFY` advance over one second after restoring.
    pub firmware_frames: u64,
}

impl fmt::Display for IsrReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "custom handler: {} interrupts in {} frames ({}s at {} Hz); firmware resumed with {} ticks/s",
            self.handled,
            self.frames,
            self.frames / self.hz,
            self.hz,
            self.firmware_frames,
        )
    }
}

/// Installs a frame-counting primary handler, runs, then restores the
/// firmware handler and checks that it is counting again.
pub fn isr(config: &DemoConfig) -> Result<IsrReport> {
    let m = Machine::new(config.machine.clone());
    let boot = snapshot(&m);

    let handled = Counter::default();
    let isr = {
        let handled = handled.clone();
        m.register(move |m| {
            handled.bump();
            // SAFETY: Runs as the primary handler with interrupts masked.
            unsafe { ack_only_isr(m) };
        })
        .context("registering the frame counter")?
    };

    let mut vectors = InterruptVectors::new(&m);
    vectors.save_primary();
    // SAFETY: The routine acknowledges and unmasks through `ack_only_isr`.
    unsafe { vectors.install_primary(isr) };
    vprintln!("installed frame counter at {isr}");

    m.run_frames(config.run.frames)
        .context("running with the custom handler")?;
    vectors.restore_primary();
    vprintln!("restored {:?}", vectors.primary.current());

    let hz = u64::from(config.machine.video.hz());
    let jiffy = m.jiffy();
    m.run_frames(hz)
        .context("running the firmware handler after restore")?;

    ensure!(snapshot(&m) == boot, "vectors differ from boot state after restore");
    Ok(IsrReport {
        frames: config.run.frames,
        handled: handled.get(),
        hz,
        firmware_frames: u64::from(m.jiffy().wrapping_sub(jiffy)),
    })
}

// ===========================================================================
// hooks / firmware-hooks
// ===========================================================================

/// Which primary handler calls the hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatcher {
    /// The library's resident chaining handler.
    Chaining,
    /// The firmware's default handler; the primary vector is left alone.
    Firmware,
}

/// One step of the hook script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    DisableTick,
    InstallDevice,
    InstallTick,
    DisableDevice,
    Exit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DisableTick => "disable tick",
            Self::InstallDevice => "install device",
            Self::InstallTick => "install tick",
            Self::DisableDevice => "disable device",
            Self::Exit => "exit",
        })
    }
}

/// Applied one per step, after the step's frames have run.
pub const SCRIPT: [Action; 6] = [
    Action::DisableTick,
    Action::InstallDevice,
    Action::InstallTick,
    Action::DisableDevice,
    Action::DisableTick,
    Action::Exit,
];

/// Counters observed just before an action was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    /// The action about to be applied.
    pub action: Action,
    /// Tick hook calls so far.
    pub ticks: u32,
    /// Device hook calls so far.
    pub devices: u32,
    /// Firmware frame counter.
    pub jiffy: u16,
}

/// Installs a tick counter, then walks [`SCRIPT`] one step every
/// `run.step_seconds`, and finally restores all three vectors.
pub fn hooks(config: &DemoConfig, dispatcher: Dispatcher) -> Result<Vec<Phase>> {
    let m = Machine::new(config.machine.clone());
    let boot = snapshot(&m);

    let ticks = Counter::default();
    let devices = Counter::default();
    let tick = ticks.hook(&m)?;
    let device = devices.hook(&m)?;

    let mut vectors = InterruptVectors::new(&m);
    vectors.save_all();
    // SAFETY: Counter routines touch no registers and return normally.
    unsafe { vectors.install_tick_hook(tick) };
    if dispatcher == Dispatcher::Chaining {
        vectors.primary.install_chaining();
    }

    let step = config.machine.frames_for(config.run.step_seconds);
    let mut phases = Vec::with_capacity(SCRIPT.len());
    for action in SCRIPT {
        m.run_frames(step)
            .with_context(|| format!("running before '{action}'"))?;
        let phase = Phase {
            action,
            ticks: ticks.get(),
            devices: devices.get(),
            jiffy: m.jiffy(),
        };
        dprintln!(
            "  {:<15} tick {:>6}  device {:>6}  jiffy {:>6}",
            action,
            phase.ticks,
            phase.devices,
            phase.jiffy
        );
        phases.push(phase);

        match action {
            Action::DisableTick => vectors.disable_tick_hook(),
            // SAFETY: As above.
            Action::InstallDevice => unsafe { vectors.install_device_hook(device) },
            // SAFETY: As above.
            Action::InstallTick => unsafe { vectors.install_tick_hook(tick) },
            Action::DisableDevice => vectors.disable_device_hook(),
            Action::Exit => break,
        }
    }

    vectors.restore_all();
    ensure!(snapshot(&m) == boot, "vectors differ from boot state after restore");
    Ok(phases)
}
