//! Interrupts arriving while vectors are being rewritten.

use std::cell::Cell;
use std::rc::Rc;

use irqhook_core::msx;
use irqhook_core::{
    HandlerAddr, InterruptVectors, Platform, VectorImage, ack_only_isr, without_interrupts,
};
use irqhook_sim::{Line, Machine, SimError};

fn counting_isr(m: &Machine) -> (HandlerAddr, Rc<Cell<u32>>) {
    let count = Rc::new(Cell::new(0));
    let seen = count.clone();
    let addr = m.register(move |m| {
        seen.set(seen.get() + 1);
        unsafe { ack_only_isr(m) };
    })
    .unwrap();
    (addr, count)
}

#[test]
fn every_vector_write_is_masked() {
    let m = Machine::default();
    let (isr, _) = counting_isr(&m);
    let mut vectors = InterruptVectors::new(&m);

    vectors.save_all();
    unsafe {
        vectors.install_primary(isr);
        vectors.install_tick_hook(isr);
        vectors.install_device_hook(isr);
    }
    vectors.disable_primary();
    vectors.disable_tick_hook();
    vectors.disable_device_hook();
    vectors.primary.install_chaining();
    vectors.restore_all();

    let writes = m.take_vector_writes();
    assert_eq!(writes.len(), 10);
    assert!(writes.iter().all(|w| w.masked), "{writes:?}");
    assert!(m.interrupts_enabled());
}

#[test]
fn interrupt_during_write_is_deferred_to_new_vector() {
    let m = Machine::default();
    let (old, old_count) = counting_isr(&m);
    let (new, new_count) = counting_isr(&m);
    let mut vectors = InterruptVectors::new(&m);
    unsafe { vectors.install_primary(old) };

    m.inject_after(2, Line::Frame);
    unsafe { vectors.install_primary(new) };

    assert_eq!(old_count.get(), 0);
    assert_eq!(new_count.get(), 1);
    assert_eq!(m.check(), Ok(()));
}

#[test]
fn unmasked_write_can_be_torn() {
    let m = Machine::default();
    let (isr, count) = counting_isr(&m);

    m.inject_after(2, Line::Frame);
    unsafe { m.write_bytes(msx::HINT, &VectorImage::jump(isr)) };

    assert_eq!(count.get(), 0);
    assert!(matches!(m.fault(), Some(SimError::InvalidOpcode { .. })));
    assert!(!m.take_vector_writes()[0].masked);
}

#[test]
fn nested_guard_defers_until_outer_scope_ends() {
    let m = Machine::default();
    let (isr, count) = counting_isr(&m);
    let mut vectors = InterruptVectors::new(&m);

    without_interrupts(&m, || {
        unsafe { vectors.install_primary(isr) };
        m.raise(Line::Frame);
        assert!(!m.interrupts_enabled());
        assert_eq!(count.get(), 0);
    });
    assert_eq!(count.get(), 1);
}

#[test]
fn handler_that_never_unmasks_loses_interrupts() {
    let m = Machine::default();
    let count = Rc::new(Cell::new(0));
    let seen = count.clone();
    let stuck = m.register(move |m| {
        seen.set(seen.get() + 1);
        let status = m.read_status();
        m.latch_status(status);
    })
    .unwrap();
    let mut vectors = InterruptVectors::new(&m);
    unsafe { vectors.install_primary(stuck) };

    for _ in 0..4 {
        m.step_frame();
    }
    assert_eq!(count.get(), 1);
    assert!(m.interrupt_pending());

    m.halt();
    assert_eq!(m.fault(), Some(SimError::HaltWithInterruptsMasked));
}
