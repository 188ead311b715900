//! Unit tests for the gesture engine.
//!
//! These run on the host and drive the engine with synthetic button
//! snapshots and timestamps; the scenarios mirror the behaviour of the
//! installed panel (20 ms poll, one transition event per changed bit).

use super::{Effect, Effects, Engine};
use crate::gesture::detectors::{ClapDetector, CodeDetector, HoldDetector};
use crate::message::{ControlMsg, DimLevel, NotifyMsg};

/// Drives an engine the way its task does: one 20 ms tick per step.
struct Harness {
    engine: Engine,
    buttons: u8,
    now: u64,
}

impl Harness {
    fn new() -> Self {
        Self {
            engine: Engine::new(),
            buttons: 0,
            now: 0,
        }
    }

    /// Flip one button bit and run the next poll.
    fn toggle(&mut self, bit: u8) -> Effects {
        self.buttons ^= 1 << bit;
        self.now += 20;
        self.engine.tick(Some(self.buttons), self.now)
    }

    /// Run polls with no edges for `ms`, collecting all effects.
    fn advance(&mut self, ms: u64) -> std::vec::Vec<Effect> {
        let mut all = std::vec::Vec::new();
        let end = self.now + ms;
        while self.now < end {
            self.now += 20;
            all.extend(self.engine.tick(Some(self.buttons), self.now));
        }
        all
    }

    fn control(&mut self, msg: ControlMsg) -> Effects {
        self.engine.handle_control(msg, self.now)
    }

    /// Feed the alarm activate code with correct (even) parity,
    /// starting from a fresh parity sequence. Fillers ride the odd
    /// slots on a bit the deactivate code rejects.
    fn enter_alarm(&mut self) -> Effects {
        self.toggle(2); // even - activate step 1
        self.toggle(3);
        self.toggle(1); // even - step 2
        self.toggle(3);
        self.toggle(0); // even - step 3
        self.toggle(3);
        self.toggle(0) // even - step 4: alarm
    }

    /// Feed the deactivate code on the odd slots (call straight after
    /// `enter_alarm`, which leaves parity odd-next).
    fn exit_alarm(&mut self) -> Effects {
        self.toggle(1); // odd - deactivate step 1
        self.toggle(3);
        self.toggle(0); // odd - step 2
        self.toggle(3);
        self.toggle(3); // odd - step 3
        self.toggle(3);
        self.toggle(0) // odd - step 4: alarm off
    }
}

fn notifies(fx: &[Effect]) -> std::vec::Vec<NotifyMsg> {
    fx.iter()
        .filter_map(|e| match e {
            Effect::Notify(m) => Some(*m),
            _ => None,
        })
        .collect()
}

fn shutdown_count(fx: &[Effect]) -> usize {
    fx.iter()
        .filter(|e| matches!(e, Effect::Notify(NotifyMsg::Shutdown)))
        .count()
}

// ═══════════════════════════════════════════════════════════════════
// Code detector
// ═══════════════════════════════════════════════════════════════════

#[test]
fn code_detector_completes_on_exact_sequence() {
    let mut det = CodeDetector::new([2, 1, 0, 0]);
    assert!(!det.feed(2));
    assert!(!det.feed(1));
    assert!(!det.feed(0));
    assert!(det.feed(0));
    assert_eq!(det.progress(), 0);
}

#[test]
fn code_detector_first_step_restarts_progress() {
    let mut det = CodeDetector::new([2, 1, 0, 0]);
    det.feed(2);
    det.feed(1);
    // Seeing the first step again restarts at 1, not 0.
    assert!(!det.feed(2));
    assert_eq!(det.progress(), 1);
    det.feed(1);
    det.feed(0);
    assert!(det.feed(0));
}

#[test]
fn code_detector_mismatch_resets_silently() {
    let mut det = CodeDetector::new([2, 1, 0, 0]);
    det.feed(2);
    det.feed(1);
    assert!(!det.feed(3));
    assert_eq!(det.progress(), 0);
}

#[test]
fn code_detector_repeated_step_can_match_itself() {
    // Sequence ends [.., 0, 0]; the third 0 in a row restarts nothing
    // because 0 is not the first step.
    let mut det = CodeDetector::new([2, 1, 0, 0]);
    det.feed(2);
    det.feed(1);
    det.feed(0);
    assert!(det.feed(0));
    assert!(!det.feed(0));
    assert_eq!(det.progress(), 0);
}

// ═══════════════════════════════════════════════════════════════════
// Clap detector
// ═══════════════════════════════════════════════════════════════════

#[test]
fn clap_second_transition_same_bit_consummates() {
    let mut clap = ClapDetector::new();
    assert_eq!(clap.feed(2, 0), None);
    assert_eq!(clap.feed(2, 100), Some(2));
    assert!(!clap.is_armed());
}

#[test]
fn clap_other_bit_leaves_window_open() {
    let mut clap = ClapDetector::new();
    clap.feed(1, 0);
    assert_eq!(clap.feed(3, 100), None);
    assert!(clap.is_armed());
    assert_eq!(clap.feed(1, 200), Some(1));
}

#[test]
fn clap_window_expires() {
    let mut clap = ClapDetector::new();
    clap.feed(1, 0);
    clap.poll(500);
    assert!(!clap.is_armed());
    // Next transition starts a fresh window instead of matching.
    assert_eq!(clap.feed(1, 600), None);
}

// ═══════════════════════════════════════════════════════════════════
// Hold detector
// ═══════════════════════════════════════════════════════════════════

#[test]
fn hold_fires_when_uninterrupted() {
    let mut hold = HoldDetector::new();
    hold.feed(0);
    assert!(!hold.poll(999));
    assert!(hold.poll(1_000));
    assert!(!hold.poll(2_000));
}

#[test]
fn hold_second_transition_cancels() {
    let mut hold = HoldDetector::new();
    hold.feed(0);
    hold.feed(300); // release (or any further edge) inside the window
    assert!(!hold.poll(1_000));
    assert!(!hold.poll(1_300));
    assert!(!hold.poll(10_000));
}

// ═══════════════════════════════════════════════════════════════════
// Engine: alarm via combination codes
// ═══════════════════════════════════════════════════════════════════

#[test]
fn activate_code_on_even_parity_enters_alarm_once() {
    let mut h = Harness::new();
    let fx = h.enter_alarm();
    assert!(h.engine.alarm_active());
    assert!(fx.contains(&Effect::WriteBank(0x11)));
    assert_eq!(shutdown_count(&fx), 1);
}

#[test]
fn activate_code_on_odd_parity_is_ignored() {
    let mut h = Harness::new();
    // One leading event shifts the whole code onto odd slots; gaps
    // keep the clap windows from pairing repeated bits.
    h.toggle(3);
    for bit in [2, 1, 0, 0] {
        h.advance(520);
        h.toggle(bit); // odd
        h.advance(520);
        h.toggle(3); // even filler
    }
    assert!(!h.engine.alarm_active());
}

#[test]
fn interleaved_odd_events_do_not_disturb_activate_count() {
    let mut h = Harness::new();
    // The odd-slot fillers in enter_alarm() include bits that would
    // reset the activate code if they reached it.
    let fx = h.enter_alarm();
    assert!(h.engine.alarm_active());
    assert_eq!(shutdown_count(&fx), 1);
}

#[test]
fn alarm_blinks_and_exits_cleanly() {
    let mut h = Harness::new();
    h.enter_alarm();

    let fx = h.advance(1_000);
    assert!(fx.contains(&Effect::WriteBank(0x44)));
    assert!(notifies(&fx).contains(&NotifyMsg::AlarmPhaseA));

    let fx = h.advance(1_000);
    assert!(fx.contains(&Effect::WriteBank(0x11)));
    assert!(notifies(&fx).contains(&NotifyMsg::AlarmPhaseB));

    let fx = h.exit_alarm();
    assert!(!h.engine.alarm_active());
    assert!(fx.contains(&Effect::FlushControl));
    assert!(fx.contains(&Effect::WriteBank(0x00)));
    assert!(notifies(&fx).contains(&NotifyMsg::AlarmCleared));
    assert_eq!(h.engine.bank().raw(), 0x00);

    // Alternator is dead after deactivation.
    let fx = h.advance(3_000);
    assert!(notifies(&fx).is_empty());
}

#[test]
fn deactivate_code_without_alarm_is_a_no_op() {
    let mut h = Harness::new();
    h.toggle(3); // parity: next event odd
    h.toggle(1);
    h.toggle(3);
    h.toggle(0);
    h.toggle(3);
    h.toggle(3);
    h.toggle(3);
    h.toggle(0);
    assert!(!h.engine.alarm_active());
    assert_eq!(h.engine.bank().raw(), 0x00);
}

// ═══════════════════════════════════════════════════════════════════
// Engine: hold-to-shutdown
// ═══════════════════════════════════════════════════════════════════

#[test]
fn single_transition_all_off_forces_shutdown_once() {
    let mut h = Harness::new();
    h.toggle(0);
    let fx = h.advance(1_000);
    assert_eq!(shutdown_count(&fx), 1);
    assert!(fx.contains(&Effect::WriteBank(0x00)));
    // Nothing further fires.
    let fx = h.advance(2_000);
    assert_eq!(shutdown_count(&fx), 0);
}

#[test]
fn release_before_the_window_cancels_shutdown() {
    let mut h = Harness::new();
    h.toggle(0);
    h.toggle(0); // release 20 ms later
    let fx = h.advance(3_000);
    assert_eq!(shutdown_count(&fx), 0);
}

#[test]
fn hold_is_not_armed_while_zones_are_lit() {
    let mut h = Harness::new();
    h.control(ControlMsg::SetZone { zone: 0, on: true });
    h.toggle(0);
    let fx = h.advance(1_500);
    assert_eq!(shutdown_count(&fx), 0);
    assert_eq!(h.engine.bank().raw(), 0x01);
}

// ═══════════════════════════════════════════════════════════════════
// Engine: clap toggle round trip
// ═══════════════════════════════════════════════════════════════════

#[test]
fn clap_queries_then_toggles_only_that_field() {
    let mut h = Harness::new();
    h.control(ControlMsg::SetZone { zone: 3, on: true });
    h.toggle(1);
    let fx = h.toggle(1);
    assert!(notifies(&fx).contains(&NotifyMsg::QueryZone { zone: 1 }));

    let fx = h.control(ControlMsg::ZoneStateReply { zone: 1, on: false });
    // Zone 1 switches on; zone 3 keeps its level.
    assert_eq!(h.engine.bank().raw(), 0b01_00_01_00);
    assert!(notifies(&fx).contains(&NotifyMsg::ReflectState {
        state: 0b01_00_01_00
    }));
}

#[test]
fn clap_inverts_a_lit_zone_off() {
    let mut h = Harness::new();
    h.control(ControlMsg::SetZone { zone: 2, on: true });
    h.toggle(2);
    h.toggle(2);
    h.control(ControlMsg::ZoneStateReply { zone: 2, on: true });
    assert_eq!(h.engine.bank().raw(), 0x00);
}

#[test]
fn other_bit_during_window_does_not_consummate() {
    let mut h = Harness::new();
    h.toggle(1);
    let fx = h.toggle(2);
    assert!(notifies(&fx).is_empty());
    // An unsolicited reply mutates nothing.
    let fx = h.control(ControlMsg::ZoneStateReply { zone: 2, on: false });
    assert!(fx.is_empty());
    assert_eq!(h.engine.bank().raw(), 0x00);
}

#[test]
fn clap_after_window_expiry_starts_over() {
    let mut h = Harness::new();
    h.toggle(1);
    h.advance(520);
    let fx = h.toggle(1);
    assert!(notifies(&fx).is_empty());
}

// ═══════════════════════════════════════════════════════════════════
// Engine: occupancy watchdog
// ═══════════════════════════════════════════════════════════════════

#[test]
fn watchdog_forces_shutdown_after_thirty_seconds() {
    let mut h = Harness::new();
    h.control(ControlMsg::SetZone { zone: 1, on: true });
    let fx = h.advance(30_000);
    assert_eq!(shutdown_count(&fx), 1);
    assert_eq!(h.engine.bank().raw(), 0x00);
}

#[test]
fn button_activity_retriggers_the_watchdog() {
    let mut h = Harness::new();
    h.control(ControlMsg::SetZone { zone: 1, on: true });
    let fx = h.advance(15_000);
    assert_eq!(shutdown_count(&fx), 0);
    h.toggle(0);
    // 30 s from the retrigger, not from the original arm.
    let fx = h.advance(29_000);
    assert_eq!(shutdown_count(&fx), 0);
    let fx = h.advance(2_000);
    assert_eq!(shutdown_count(&fx), 1);
}

#[test]
fn watchdog_stops_when_zones_switch_off() {
    let mut h = Harness::new();
    h.control(ControlMsg::SetZone { zone: 1, on: true });
    h.control(ControlMsg::SetZone { zone: 1, on: false });
    let fx = h.advance(40_000);
    assert_eq!(shutdown_count(&fx), 0);
}

// ═══════════════════════════════════════════════════════════════════
// Engine: presets and control commands
// ═══════════════════════════════════════════════════════════════════

#[test]
fn preset_save_and_recall_roundtrip_verbatim() {
    let mut h = Harness::new();
    h.control(ControlMsg::SetDim {
        zone: 0,
        level: DimLevel::B,
    });
    h.control(ControlMsg::SetDim {
        zone: 1,
        level: DimLevel::B,
    });
    h.control(ControlMsg::SetDim {
        zone: 3,
        level: DimLevel::A,
    });
    assert_eq!(h.engine.bank().raw(), 0x8F);

    h.control(ControlMsg::SavePreset { slot: 0 });
    h.control(ControlMsg::SetZone { zone: 5, on: false });
    assert_eq!(h.engine.bank().raw(), 0x00);

    let fx = h.control(ControlMsg::RecallPreset { slot: 0 });
    assert_eq!(h.engine.bank().raw(), 0x8F);
    assert!(fx.contains(&Effect::WriteBank(0x8F)));
    assert!(notifies(&fx).contains(&NotifyMsg::ReflectState { state: 0x8F }));
}

#[test]
fn recall_during_alarm_is_refused() {
    let mut h = Harness::new();
    h.enter_alarm();
    let fx = h.control(ControlMsg::RecallPreset { slot: 0 });
    assert!(fx.is_empty());
    assert_eq!(h.engine.bank().raw(), 0x11);
}

#[test]
fn master_zone_ids_drive_the_whole_bank() {
    let mut h = Harness::new();
    h.control(ControlMsg::SetDim {
        zone: 2,
        level: DimLevel::A,
    });
    h.control(ControlMsg::SetZone { zone: 6, on: true });
    assert_eq!(h.engine.bank().raw(), 0x55);
    h.control(ControlMsg::SetZone { zone: 5, on: false });
    assert_eq!(h.engine.bank().raw(), 0x00);
}

#[test]
fn failed_button_reads_still_run_the_timers() {
    let mut h = Harness::new();
    h.control(ControlMsg::SetZone { zone: 0, on: true });
    // Bus dead for the whole window; the watchdog must still fire.
    let mut shutdowns = 0;
    for _ in 0..1_501 {
        h.now += 20;
        let fx = h.engine.tick(None, h.now);
        shutdowns += shutdown_count(&fx);
    }
    assert_eq!(shutdowns, 1);
    assert_eq!(h.engine.bank().raw(), 0x00);
}
