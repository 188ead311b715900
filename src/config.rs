//! Application-wide constants and compile-time configuration.
//!
//! All bus constants, timing parameters and byte patterns live here so
//! they can be tuned in one place.

// Bank expander bus

/// Bus address of the LED/button expander with the R/W bit clear.
pub const BANK_ADDR_WRITE: u8 = 0xC0;

/// Bus address with the R/W bit set (read direction).
pub const BANK_ADDR_READ: u8 = 0xC1;

/// Input snapshot register - momentary button bits, active-low.
pub const REG_INPUT: u8 = 0x00;

/// Zone-state output register - the packed zone byte.
pub const REG_OUTPUT: u8 = 0x08;

/// Duty-cycle register behind dim level A.
pub const REG_DUTY_A: u8 = 0x03;

/// Duty-cycle register behind dim level B.
pub const REG_DUTY_B: u8 = 0x05;

/// Power-on duty for dim level A (~75% of 255).
pub const DUTY_A_DEFAULT: u8 = 0xBF;

/// Power-on duty for dim level B (~25% of 255).
pub const DUTY_B_DEFAULT: u8 = 0x40;

/// Spins allowed per bus phase before the transaction is abandoned
/// with `Error::BusTimeout`.
pub const BUS_PHASE_SPIN_LIMIT: u32 = 10_000;

// Gesture engine timing

/// Button poll cadence (ms).
pub const POLL_PERIOD_MS: u64 = 20;

/// Hold-to-shutdown window (ms).
pub const HOLD_TIMEOUT_MS: u64 = 1_000;

/// Double-tap (clap) window per button (ms).
pub const CLAP_WINDOW_MS: u64 = 500;

/// Occupancy watchdog - zones lit with no activity for this long are
/// forced off (ms).
pub const WATCHDOG_TIMEOUT_MS: u64 = 30_000;

/// Alarm blink alternator period (ms).
pub const ALARM_BLINK_MS: u64 = 1_000;

/// Alert pattern shown on the odd alarm blink phases.
pub const ALERT_PATTERN_A: u8 = 0x44;

/// Alert pattern shown on alarm entry and the even blink phases.
pub const ALERT_PATTERN_B: u8 = 0x11;

/// Button sequence entering the alarm, as bit indices. Must differ
/// from the deactivate sequence; repeated indices are fine.
pub const ALARM_ACTIVATE_SEQ: [u8; 4] = [2, 1, 0, 0];

/// Button sequence leaving the alarm.
pub const ALARM_DEACTIVATE_SEQ: [u8; 4] = [1, 0, 3, 0];

// Touch timing

/// Touch sample cadence while a contact is tracked (ms).
pub const TOUCH_SAMPLE_MS: u64 = 25;

/// Continuous contact on a preset widget for this long saves it (ms).
pub const PRESET_HOLD_MS: u64 = 2_000;

/// Second tap on the same preset widget within this window recalls it,
/// measured from the first tap's release (ms).
pub const PRESET_DOUBLE_TAP_MS: u64 = 750;

/// How long the "configuration saved" banner stays up (ms).
pub const SAVED_BANNER_MS: u64 = 3_000;

// Command channel

/// Capacity of each of the two inter-actor queues.
pub const CHANNEL_DEPTH: usize = 10;

// Preset store

/// Power-on contents of the two preset slots.
pub const PRESET_DEFAULTS: [u8; 2] = [0x8F, 0x0B];
