//! The gesture/zone actor core.
//!
//! Owns the packed zone state, the preset store and every software
//! timer on the sensor side, and is the sole writer of all of them.
//! The engine is sans-IO: the caller feeds button snapshots, control
//! messages and timestamps, and executes the effects the engine hands
//! back (bank writes, notify sends, a control-queue flush). That keeps
//! every detector deterministic and host-testable, and keeps timer
//! dispatch on the actor's own context instead of hidden callbacks.

mod detectors;
#[cfg(test)]
mod tests;

pub use detectors::{ClapDetector, CodeDetector, HoldDetector};

use crate::bank::BankState;
use crate::config::{
    ALARM_ACTIVATE_SEQ, ALARM_BLINK_MS, ALARM_DEACTIVATE_SEQ, ALERT_PATTERN_A, ALERT_PATTERN_B,
    WATCHDOG_TIMEOUT_MS,
};
use crate::message::{ControlMsg, NotifyMsg};
use crate::presets::PresetStore;
use crate::timer::Deadline;
use heapless::Vec;

/// Side effect requested by the engine, executed by its task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Write this byte to the bank output register.
    WriteBank(u8),

    /// Queue this message to the touch actor and raise its wake
    /// signal.
    Notify(NotifyMsg),

    /// Drop everything still queued on the control channel.
    FlushControl,
}

/// Effects produced by one engine call, in execution order.
pub type Effects = Vec<Effect, 16>;

/// The sensor-side state machine: edge extraction, gesture detectors,
/// occupancy watchdog and alarm lifecycle.
pub struct Engine {
    bank: BankState,
    presets: PresetStore,
    prev_buttons: u8,
    parity: bool,
    activate: CodeDetector,
    deactivate: CodeDetector,
    hold: HoldDetector,
    clap: ClapDetector,
    clap_pending: Option<u8>,
    watchdog: Deadline,
    alarm_active: bool,
    alarm_phase: bool,
    alarm_blink: Deadline,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            bank: BankState::new(),
            presets: PresetStore::new(),
            prev_buttons: 0,
            parity: false,
            activate: CodeDetector::new(ALARM_ACTIVATE_SEQ),
            deactivate: CodeDetector::new(ALARM_DEACTIVATE_SEQ),
            hold: HoldDetector::new(),
            clap: ClapDetector::new(),
            clap_pending: None,
            watchdog: Deadline::idle(),
            alarm_active: false,
            alarm_phase: false,
            alarm_blink: Deadline::idle(),
        }
    }

    /// Current packed zone state as the engine believes it to be.
    pub fn bank(&self) -> BankState {
        self.bank
    }

    pub fn alarm_active(&self) -> bool {
        self.alarm_active
    }

    /// One fixed-cadence poll. `buttons` is the latest 4-bit snapshot,
    /// or `None` when this cycle's bus read failed - timers still run
    /// so a flaky bus cannot freeze the watchdog or the alarm blink.
    pub fn tick(&mut self, buttons: Option<u8>, now_ms: u64) -> Effects {
        let mut fx = Effects::new();
        self.poll_timers(now_ms, &mut fx);
        if let Some(snapshot) = buttons {
            let changed = snapshot ^ self.prev_buttons;
            for bit in 0..4u8 {
                if changed & (1 << bit) != 0 {
                    self.transition(bit, now_ms, &mut fx);
                }
            }
            self.prev_buttons = snapshot;
        }
        fx
    }

    /// Apply one control-channel command.
    pub fn handle_control(&mut self, msg: ControlMsg, now_ms: u64) -> Effects {
        let mut fx = Effects::new();
        match msg {
            ControlMsg::SetZone { zone, on } => {
                self.bank.set_on_off(zone, on);
                push(&mut fx, Effect::WriteBank(self.bank.raw()));
                self.rearm_watchdog(now_ms);
            }
            ControlMsg::SetDim { zone, level } => {
                self.bank.set_dim(zone, level);
                push(&mut fx, Effect::WriteBank(self.bank.raw()));
                self.rearm_watchdog(now_ms);
            }
            ControlMsg::SavePreset { slot } => {
                self.presets.save(slot, self.bank.raw());
            }
            ControlMsg::RecallPreset { slot } => {
                if !self.alarm_active {
                    if let Some(state) = self.presets.recall(slot) {
                        self.bank = BankState::from_raw(state);
                        push(&mut fx, Effect::WriteBank(state));
                        push(&mut fx, Effect::Notify(NotifyMsg::ReflectState { state }));
                        self.rearm_watchdog(now_ms);
                    }
                }
            }
            ControlMsg::ZoneStateReply { zone, on } => {
                if self.clap_pending == Some(zone) && !self.alarm_active {
                    self.clap_pending = None;
                    self.bank.set_on_off(zone, !on);
                    push(&mut fx, Effect::WriteBank(self.bank.raw()));
                    push(
                        &mut fx,
                        Effect::Notify(NotifyMsg::ReflectState {
                            state: self.bank.raw(),
                        }),
                    );
                    self.rearm_watchdog(now_ms);
                }
            }
        }
        fx
    }

    /// Process one transition event - a button bit that changed since
    /// the previous snapshot.
    fn transition(&mut self, bit: u8, now_ms: u64, fx: &mut Effects) {
        let even = !self.parity;
        self.parity = !self.parity;

        // Activity keeps the occupancy watchdog fed while zones are
        // lit.
        if !self.bank.is_all_off() && !self.alarm_active {
            self.watchdog.arm(now_ms, WATCHDOG_TIMEOUT_MS);
        }

        if self.bank.is_all_off() && !self.alarm_active {
            self.hold.feed(now_ms);
        }

        if let Some(zone) = self.clap.feed(bit, now_ms) {
            if !self.alarm_active {
                // The toggle needs the UI's notion of the zone's
                // logical state; the answer arrives as a
                // ZoneStateReply.
                self.clap_pending = Some(zone);
                push(fx, Effect::Notify(NotifyMsg::QueryZone { zone }));
            }
        }

        // One parity bit multiplexes the two code detectors: even
        // events advance the activate code, odd events the deactivate
        // code, so each sees half the raw transition rate.
        if even {
            if self.activate.feed(bit) && !self.alarm_active {
                self.alarm_enter(now_ms, fx);
            }
        } else if self.deactivate.feed(bit) && self.alarm_active {
            self.alarm_exit(fx);
        }
    }

    fn poll_timers(&mut self, now_ms: u64, fx: &mut Effects) {
        if self.hold.poll(now_ms) {
            self.force_shutdown(fx);
        }
        self.clap.poll(now_ms);
        if self.watchdog.fire(now_ms) {
            self.force_shutdown(fx);
        }
        if self.alarm_active && self.alarm_blink.fire(now_ms) {
            self.alarm_phase = !self.alarm_phase;
            let (pattern, msg) = if self.alarm_phase {
                (ALERT_PATTERN_A, NotifyMsg::AlarmPhaseA)
            } else {
                (ALERT_PATTERN_B, NotifyMsg::AlarmPhaseB)
            };
            self.bank = BankState::from_raw(pattern);
            push(fx, Effect::WriteBank(pattern));
            push(fx, Effect::Notify(msg));
            self.alarm_blink.arm(now_ms, ALARM_BLINK_MS);
        }
    }

    /// Everything off, UI told to follow. Shared by the hold detector
    /// and the occupancy watchdog.
    fn force_shutdown(&mut self, fx: &mut Effects) {
        self.bank = BankState::new();
        self.watchdog.stop();
        push(fx, Effect::WriteBank(self.bank.raw()));
        push(fx, Effect::Notify(NotifyMsg::Shutdown));
    }

    fn alarm_enter(&mut self, now_ms: u64, fx: &mut Effects) {
        self.alarm_active = true;
        self.alarm_phase = false;
        self.watchdog.stop();
        self.bank = BankState::from_raw(ALERT_PATTERN_B);
        push(fx, Effect::WriteBank(ALERT_PATTERN_B));
        push(fx, Effect::Notify(NotifyMsg::Shutdown));
        self.alarm_blink.arm(now_ms, ALARM_BLINK_MS);
    }

    fn alarm_exit(&mut self, fx: &mut Effects) {
        self.alarm_active = false;
        self.alarm_blink.stop();
        self.bank = BankState::new();
        // A recall queued while the alarm ran must not replay once it
        // clears - stale commands here left the UI unresponsive.
        push(fx, Effect::FlushControl);
        push(fx, Effect::WriteBank(self.bank.raw()));
        push(fx, Effect::Notify(NotifyMsg::AlarmCleared));
    }

    fn rearm_watchdog(&mut self, now_ms: u64) {
        if self.alarm_active {
            return;
        }
        if self.bank.is_all_off() {
            self.watchdog.stop();
        } else {
            self.watchdog.arm(now_ms, WATCHDOG_TIMEOUT_MS);
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn push(fx: &mut Effects, effect: Effect) {
    let _ = fx.push(effect);
}
