//! Inter-actor command messages.
//!
//! One tagged union per queue direction, each carrying only the
//! variants its channel actually transports. A message is meaningful
//! only on its declared channel; there is no shared "action code"
//! namespace.

/// Dim levels selectable per zone. `A` runs the duty programmed into
/// the level-A register, `B` the level-B duty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DimLevel {
    A,
    B,
}

/// Commands from the touch actor to the gesture actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlMsg {
    /// Switch a zone fully on or off. Zone ids 5 and 6 address the
    /// master pair and switch every zone at once.
    SetZone { zone: u8, on: bool },

    /// Put a zone into one of the two dim levels.
    SetDim { zone: u8, level: DimLevel },

    /// Snapshot the current zone state into a preset slot.
    SavePreset { slot: u8 },

    /// Restore a preset slot into the zone state. Ignored while the
    /// alarm is active.
    RecallPreset { slot: u8 },

    /// Reply leg of [`NotifyMsg::QueryZone`].
    ZoneStateReply { zone: u8, on: bool },
}

/// Notifications from the gesture actor to the touch actor. Every send
/// is accompanied by a raise of the touch actor's wake signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotifyMsg {
    /// All zones were forced off; the UI must show everything off.
    Shutdown,

    /// Zone state changed outside the UI; `state` is the new packed
    /// byte to mirror onto the widgets.
    ReflectState { state: u8 },

    /// Alarm blink phase A is on the bank.
    AlarmPhaseA,

    /// Alarm blink phase B is on the bank.
    AlarmPhaseB,

    /// Alarm deactivated; resume the normal UI with everything off.
    AlarmCleared,

    /// Ask the touch actor for a zone's current logical on/off state.
    /// It answers with [`ControlMsg::ZoneStateReply`].
    QueryZone { zone: u8 },
}
