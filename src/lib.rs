//! Interaction controller for a multi-zone room lighting installation.
//!
//! Two concurrent actors drive the room: the gesture actor polls a
//! four-button bank every 20 ms, owns the packed zone state and every
//! safety timer (hold-to-shutdown, double-tap toggles, alarm
//! combination codes, occupancy watchdog, alarm blink), and the touch
//! actor tracks the wall panel and the widget view. They communicate
//! only through two bounded queues plus a single-slot wake signal;
//! neither reads the other's state directly.
//!
//! The crate builds two ways, mirroring how it is tested:
//! - host: `cargo test` exercises the pure gesture/touch/bank logic,
//!   no hardware or cross toolchain required
//! - target: `--features embedded` builds the Embassy binary in
//!   `main.rs` for the nRF52840 board wired to the panel
//!
//! Pixel drawing, display bring-up and raw bus clocking are external
//! collaborators; the core deals in logical regions, view models and
//! register-level bus phases only.

#![cfg_attr(not(test), no_std)]

pub mod bank;
pub mod config;
pub mod error;
pub mod gesture;
pub mod message;
pub mod presets;
pub mod timer;
pub mod touch;

#[cfg(feature = "embedded")]
pub mod hw;
