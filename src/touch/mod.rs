//! The touch/UI actor core.
//!
//! Tracks one contact at a time: the wake signal opens a tracking
//! window, samples arrive at a 25 ms cadence until the pressure drops
//! to zero, and the first contact of each window is hit-tested against
//! the widget layout. The controller owns the widget view model and
//! the preset gesture timers, and is the sole writer of both; the
//! gesture actor's zone state is only ever seen through notify
//! messages.
//!
//! The wake signal is single-slot and overloaded - a touch edge and a
//! forced-state wake look identical - so the owning task drains the
//! notify queue before treating a wake as a touch.

pub mod layout;

pub use layout::{Layout, Rect, Region};

use crate::bank::{BankState, ZoneLevel, MASTER_ZONE_A};
use crate::config::{PRESET_DOUBLE_TAP_MS, PRESET_HOLD_MS, SAVED_BANNER_MS};
use crate::message::{ControlMsg, DimLevel, NotifyMsg};
use crate::timer::Deadline;
use heapless::Vec;

/// One transducer reading. `pressure == 0` means "not touching";
/// coordinate mapping from raw transducer units is the sampler's
/// responsibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchSample {
    pub x: u16,
    pub y: u16,
    pub pressure: u16,
}

impl TouchSample {
    /// A released (no-contact) sample.
    pub const fn released() -> Self {
        Self {
            x: 0,
            y: 0,
            pressure: 0,
        }
    }
}

/// Slider snap levels, far left to far right.
pub const SNAP_OFF_LOW: u8 = 1;
pub const SNAP_DIM_A: u8 = 2;
pub const SNAP_REST: u8 = 3;
pub const SNAP_DIM_B: u8 = 4;
pub const SNAP_FULL: u8 = 5;

/// Alarm presentation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmView {
    Inactive,
    PhaseA,
    PhaseB,
}

/// Everything the display collaborator needs to draw the panel.
#[derive(Clone, Copy, Debug)]
pub struct View {
    /// Per-widget on/off; widgets 3 and 4 mirror each other.
    pub zone_on: [bool; 5],
    /// Snap level per slider, [`SNAP_OFF_LOW`]..=[`SNAP_FULL`].
    pub slider: [u8; 4],
    /// A slider follows its step controls only while active.
    pub slider_active: [bool; 4],
    pub master_on: bool,
    pub alarm: AlarmView,
    /// Transient "configuration saved" banner.
    pub saved_banner: bool,
}

impl View {
    const fn new() -> Self {
        Self {
            zone_on: [false; 5],
            slider: [SNAP_REST; 4],
            slider_active: [false; 4],
            master_on: false,
            alarm: AlarmView::Inactive,
            saved_banner: false,
        }
    }
}

/// Commands produced by one controller call, in send order.
pub type Commands = Vec<ControlMsg, 4>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum TrackPhase {
    Idle,
    Tracking,
}

#[derive(Clone, Copy)]
struct Press {
    region: Option<Region>,
    /// Set when a long-press save fired, so the release neither taps
    /// nor recalls.
    consumed: bool,
}

#[derive(Clone, Copy)]
struct PendingRecall {
    slot: u8,
    deadline: u64,
}

/// The touch-side state machine.
pub struct TouchController {
    layout: Layout,
    phase: TrackPhase,
    view: View,
    press: Option<Press>,
    double_tap: Option<PendingRecall>,
    pending_save: Option<u8>,
    save_hold: Deadline,
    banner: Deadline,
}

impl TouchController {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            phase: TrackPhase::Idle,
            view: View::new(),
            press: None,
            double_tap: None,
            pending_save: None,
            save_hold: Deadline::idle(),
            banner: Deadline::idle(),
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn is_tracking(&self) -> bool {
        self.phase == TrackPhase::Tracking
    }

    /// Handle the single-slot wake. The caller drains the notify
    /// queue first; this only opens a sampling window.
    pub fn on_wake(&mut self) {
        if self.phase == TrackPhase::Idle {
            self.phase = TrackPhase::Tracking;
            self.press = None;
        }
    }

    /// Apply one notification from the gesture actor.
    pub fn on_notify(&mut self, msg: NotifyMsg) -> Commands {
        let mut out = Commands::new();
        match msg {
            NotifyMsg::Shutdown => self.force_all_off(),
            NotifyMsg::ReflectState { state } => self.reflect(state),
            NotifyMsg::AlarmPhaseA => self.view.alarm = AlarmView::PhaseA,
            NotifyMsg::AlarmPhaseB => self.view.alarm = AlarmView::PhaseB,
            NotifyMsg::AlarmCleared => {
                self.view.alarm = AlarmView::Inactive;
                self.force_all_off();
            }
            NotifyMsg::QueryZone { zone } => {
                let on = self
                    .view
                    .zone_on
                    .get(zone as usize)
                    .copied()
                    .unwrap_or(false);
                let _ = out.push(ControlMsg::ZoneStateReply { zone, on });
            }
        }
        out
    }

    /// Feed one sample while tracking. The first contact of a window
    /// is classified; release finalises the press and closes the
    /// window.
    pub fn on_sample(&mut self, sample: TouchSample, now_ms: u64) -> Commands {
        let mut out = Commands::new();
        if self.phase != TrackPhase::Tracking {
            return out;
        }
        if sample.pressure == 0 {
            self.finish_press(now_ms, &mut out);
            self.phase = TrackPhase::Idle;
            return out;
        }
        if self.press.is_none() {
            self.touch_down(sample.x, sample.y, now_ms, &mut out);
        }
        out
    }

    /// Advance the controller's own timers (long-press save, banner
    /// removal, double-tap expiry).
    pub fn poll(&mut self, now_ms: u64) -> Commands {
        let mut out = Commands::new();
        if self.save_hold.fire(now_ms) {
            if let Some(slot) = self.pending_save.take() {
                if let Some(press) = self.press.as_mut() {
                    press.consumed = true;
                }
                self.double_tap = None;
                self.view.saved_banner = true;
                self.banner.arm(now_ms, SAVED_BANNER_MS);
                let _ = out.push(ControlMsg::SavePreset { slot });
            }
        }
        if self.banner.fire(now_ms) {
            self.view.saved_banner = false;
        }
        if let Some(dt) = self.double_tap {
            if now_ms > dt.deadline {
                self.double_tap = None;
            }
        }
        out
    }

    fn alarm_shown(&self) -> bool {
        self.view.alarm != AlarmView::Inactive
    }

    fn touch_down(&mut self, x: u16, y: u16, now_ms: u64, out: &mut Commands) {
        // All widgets are inert while the alarm owns the panel.
        let region = if self.alarm_shown() {
            None
        } else {
            self.layout.hit(x, y)
        };
        self.press = Some(Press {
            region,
            consumed: false,
        });
        match region {
            Some(Region::Zone(widget)) => self.tap_zone(widget, out),
            Some(Region::Master) => self.tap_master(out),
            Some(Region::StepUp(slider)) => self.step(slider as usize, true, out),
            Some(Region::StepDown(slider)) => self.step(slider as usize, false, out),
            Some(Region::Preset(slot)) => {
                // The save half of the gesture needs sustained
                // contact; the tap half resolves at release.
                self.pending_save = Some(slot);
                self.save_hold.arm(now_ms, PRESET_HOLD_MS);
            }
            None => {}
        }
        if !matches!(region, Some(Region::Preset(_))) {
            self.double_tap = None;
        }
    }

    fn finish_press(&mut self, now_ms: u64, out: &mut Commands) {
        self.save_hold.stop();
        self.pending_save = None;
        let press = match self.press.take() {
            Some(p) => p,
            None => return,
        };
        if press.consumed {
            return;
        }
        if let Some(Region::Preset(slot)) = press.region {
            match self.double_tap {
                Some(dt) if dt.slot == slot && now_ms <= dt.deadline => {
                    self.double_tap = None;
                    let _ = out.push(ControlMsg::RecallPreset { slot });
                }
                _ => {
                    self.double_tap = Some(PendingRecall {
                        slot,
                        deadline: now_ms + PRESET_DOUBLE_TAP_MS,
                    });
                }
            }
        }
    }

    fn tap_zone(&mut self, widget: u8, out: &mut Commands) {
        let slider = if widget == 4 { 3 } else { widget as usize };
        let zone = slider as u8;
        let turning_on = !self.view.zone_on[widget as usize];
        self.set_zone_view(widget, turning_on);
        self.view.slider_active[slider] = turning_on;
        self.view.slider[slider] = if turning_on { SNAP_FULL } else { SNAP_REST };
        if turning_on {
            self.view.master_on = true;
        } else if self.all_widgets_off() {
            self.view.master_on = false;
        }
        let _ = out.push(ControlMsg::SetZone {
            zone,
            on: turning_on,
        });
    }

    fn tap_master(&mut self, out: &mut Commands) {
        let on = !self.view.master_on;
        self.view.master_on = on;
        self.view.zone_on = [on; 5];
        self.view.slider = [if on { SNAP_FULL } else { SNAP_REST }; 4];
        self.view.slider_active = [on; 4];
        let _ = out.push(ControlMsg::SetZone {
            zone: MASTER_ZONE_A,
            on,
        });
    }

    /// Step a slider through the snap levels. The two dim levels are
    /// adjacent when stepping, so the rest position is only reachable
    /// by switching the zone off.
    fn step(&mut self, slider: usize, up: bool, out: &mut Commands) {
        if !self.view.slider_active[slider] {
            return;
        }
        let level = self.view.slider[slider];
        let next = if up {
            match level {
                SNAP_OFF_LOW => SNAP_DIM_A,
                SNAP_DIM_A => SNAP_DIM_B,
                SNAP_REST => SNAP_DIM_B,
                SNAP_DIM_B => SNAP_FULL,
                _ => return,
            }
        } else {
            match level {
                SNAP_FULL => SNAP_DIM_B,
                SNAP_DIM_B => SNAP_DIM_A,
                SNAP_REST => SNAP_DIM_A,
                SNAP_DIM_A => SNAP_OFF_LOW,
                _ => return,
            }
        };
        self.view.slider[slider] = next;
        let zone = slider as u8;
        let on = matches!(next, SNAP_DIM_A | SNAP_DIM_B | SNAP_FULL);
        self.set_zone_view(zone, on);
        let _ = out.push(match next {
            SNAP_DIM_A => ControlMsg::SetDim {
                zone,
                level: DimLevel::A,
            },
            SNAP_DIM_B => ControlMsg::SetDim {
                zone,
                level: DimLevel::B,
            },
            SNAP_FULL => ControlMsg::SetZone { zone, on: true },
            _ => ControlMsg::SetZone { zone, on: false },
        });
    }

    /// Mirror a forced zone byte onto the widgets (clap toggles,
    /// preset recalls).
    fn reflect(&mut self, state: u8) {
        let bank = BankState::from_raw(state);
        self.view.master_on = true;
        for zone in 0..4u8 {
            let (on, snap) = match bank.level(zone) {
                ZoneLevel::Off => (false, SNAP_REST),
                ZoneLevel::On => (true, SNAP_FULL),
                ZoneLevel::DimA => (true, SNAP_DIM_A),
                ZoneLevel::DimB => (true, SNAP_DIM_B),
            };
            self.set_zone_view(zone, on);
            self.view.slider[zone as usize] = snap;
            self.view.slider_active[zone as usize] = on;
        }
        if self.all_widgets_off() {
            self.view.master_on = false;
        }
    }

    fn force_all_off(&mut self) {
        self.view.zone_on = [false; 5];
        self.view.master_on = false;
        self.view.slider = [SNAP_REST; 4];
        self.view.slider_active = [false; 4];
    }

    fn set_zone_view(&mut self, widget: u8, on: bool) {
        if widget == 3 || widget == 4 {
            self.view.zone_on[3] = on;
            self.view.zone_on[4] = on;
        } else if let Some(w) = self.view.zone_on.get_mut(widget as usize) {
            *w = on;
        }
    }

    fn all_widgets_off(&self) -> bool {
        self.view.zone_on[..4].iter().all(|on| !on)
    }
}
