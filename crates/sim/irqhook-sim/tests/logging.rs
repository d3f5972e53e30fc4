//! Vector operations reported through the core log facility.

use irqhook_core::{HandlerAddr, InterruptVectors};
use irqhook_sim::{Machine, capture};

#[test]
fn vector_operations_are_logged() {
    capture::install();
    let m = Machine::default();
    let mut vectors = InterruptVectors::new(&m);

    vectors.save_primary();
    unsafe { vectors.install_primary(HandlerAddr::new(0x4000)) };
    vectors.disable_tick_hook();
    vectors.restore_primary();

    let lines = capture::drain();
    for expected in [
        "[DEBUG] primary: saved VectorImage[c3 3c 0c]",
        "[DEBUG] primary: installed 0x4000",
        "[DEBUG] tick-hook: disabled",
        "[DEBUG] primary: restored VectorImage[c3 3c 0c]",
    ] {
        assert!(lines.iter().any(|l| l == expected), "missing {expected:?} in {lines:?}");
    }
}
