//! Interrupt vector demo driver.
//!
//! Runs the classic vector and hook exercises against the simulated MSX in
//! `irqhook-sim` and reports what each installed handler saw.

mod cli;
mod config;
mod scenario;
mod verbose;

use anyhow::Result;
use clap::Parser;
use irqhook_core::log::set_log_fn;

use config::DemoConfig;
use scenario::Dispatcher;
use verbose::{Timer, dprintln};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    verbose::init(cli.quiet, cli.verbose);
    if verbose::is_verbose() {
        // SAFETY: The sink only writes to stderr; the simulator runs
        // handlers on this thread.
        unsafe { set_log_fn(verbose::log_to_stderr) };
    }

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(frames) = cli.frames {
        config.run.frames = frames;
    }

    match cli.command {
        cli::Command::Isr => cmd_isr(&config),
        cli::Command::Hooks => cmd_hooks(&config, Dispatcher::Chaining),
        cli::Command::FirmwareHooks => cmd_hooks(&config, Dispatcher::Firmware),
    }
}

fn cmd_isr(config: &DemoConfig) -> Result<()> {
    let _t = Timer::start("isr");
    dprintln!("Running custom primary handler for {} frames...", config.run.frames);
    let report = scenario::isr(config)?;
    println!("{report}");
    Ok(())
}

fn cmd_hooks(config: &DemoConfig, dispatcher: Dispatcher) -> Result<()> {
    let _t = Timer::start("hooks");
    dprintln!(
        "Hook script under the {} handler, one step every {}s:",
        match dispatcher {
            Dispatcher::Chaining => "chaining",
            Dispatcher::Firmware => "firmware",
        },
        config.run.step_seconds
    );
    let phases = scenario::hooks(config, dispatcher)?;
    if let Some(last) = phases.last() {
        println!(
            "hooks: {} steps, tick {} device {}; all vectors restored",
            phases.len(),
            last.ticks,
            last.devices
        );
    }
    Ok(())
}
