//! Widget geometry and hit-testing.
//!
//! Geometry belongs to the display collaborator; the controller only
//! cares which logical region a coordinate lands in. A coordinate that
//! hits nothing produces no command - that is a non-event, not an
//! error.

/// Logical input regions on the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Region {
    /// One of the five zone toggle widgets. Widgets 3 and 4 are the
    /// mirrored aisle pair; widget 4 folds onto zone 3 on the wire.
    Zone(u8),

    /// The master power widget.
    Master,

    /// A preset widget (0 or 1).
    Preset(u8),

    /// A slider's step-up control (slider index 0-3).
    StepUp(u8),

    /// A slider's step-down control.
    StepDown(u8),
}

/// Axis-aligned rectangle in panel coordinates, inclusive origin,
/// exclusive far edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
}

impl Rect {
    pub const fn new(x0: u16, y0: u16, x1: u16, y1: u16) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn contains(self, x: u16, y: u16) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

/// The full widget map, built by whoever owns the screen layout.
#[derive(Clone, Copy, Debug)]
pub struct Layout {
    pub zones: [Rect; 5],
    pub master: Rect,
    pub presets: [Rect; 2],
    pub step_up: [Rect; 4],
    pub step_down: [Rect; 4],
}

impl Layout {
    /// Map a touch coordinate to a region.
    pub fn hit(&self, x: u16, y: u16) -> Option<Region> {
        for (i, r) in self.zones.iter().enumerate() {
            if r.contains(x, y) {
                return Some(Region::Zone(i as u8));
            }
        }
        if self.master.contains(x, y) {
            return Some(Region::Master);
        }
        for (i, r) in self.step_up.iter().enumerate() {
            if r.contains(x, y) {
                return Some(Region::StepUp(i as u8));
            }
        }
        for (i, r) in self.step_down.iter().enumerate() {
            if r.contains(x, y) {
                return Some(Region::StepDown(i as u8));
            }
        }
        for (i, r) in self.presets.iter().enumerate() {
            if r.contains(x, y) {
                return Some(Region::Preset(i as u8));
            }
        }
        None
    }

    /// Default portrait 240x320 layout matching the reference panel:
    /// status bar with the master widget top-right, four slider rows,
    /// zone widgets in the lower half, presets along the bottom edge.
    pub const fn portrait_qvga() -> Self {
        const W: u16 = 240;
        const H: u16 = 320;
        Self {
            zones: [
                Rect::new(W / 3, H - 25, 2 * W / 3, H - 5),   // whiteboard
                Rect::new(W / 4, H - 65, 3 * W / 4, H - 35),  // lecturer
                Rect::new(W / 4, 138, 3 * W / 4, H - 70),     // seating
                Rect::new(15, 138, 45, H - 50),               // aisle left
                Rect::new(W - 45, 138, W - 15, H - 50),       // aisle right
            ],
            master: Rect::new(W - 30, 0, W, 30),
            presets: [
                Rect::new(10, H - 25, 60, H - 5),
                Rect::new(W - 60, H - 25, W - 10, H - 5),
            ],
            step_up: [
                Rect::new(W - 30, 37, W - 12, 57),
                Rect::new(W - 30, 62, W - 12, 82),
                Rect::new(W - 30, 87, W - 12, 107),
                Rect::new(W - 30, 112, W - 12, 132),
            ],
            step_down: [
                Rect::new(12, 37, 30, 57),
                Rect::new(12, 62, 30, 82),
                Rect::new(12, 87, 30, 107),
                Rect::new(12, 112, 30, 132),
            ],
        }
    }
}
