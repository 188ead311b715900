//! Panel rendering - turns the touch view model into drawing
//! primitive calls over any RGB565 target. Display bring-up, SPI
//! clocking and pixel formats stay with the display driver.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;

use crate::touch::{AlarmView, Layout, Rect, View};

const ZONE_LABELS: [&str; 3] = ["WHITEBOARD", "LECTURER", "SEATING"];
const PRESET_LABELS: [&str; 2] = ["P1", "P2"];

fn rectangle(r: Rect) -> Rectangle {
    Rectangle::with_corners(
        Point::new(r.x0 as i32, r.y0 as i32),
        Point::new(r.x1 as i32 - 1, r.y1 as i32 - 1),
    )
}

fn fill(color: Rgb565) -> PrimitiveStyle<Rgb565> {
    PrimitiveStyle::with_fill(color)
}

/// Redraw the whole panel from the view model.
pub fn render<D>(target: &mut D, layout: &Layout, view: &View) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    target.clear(Rgb565::BLACK)?;
    draw_status_bar(target, layout, view)?;
    draw_zones(target, layout, view)?;
    draw_sliders(target, layout, view)?;
    draw_presets(target, layout, view)?;
    Ok(())
}

fn draw_status_bar<D>(target: &mut D, layout: &Layout, view: &View) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let alarming = view.alarm != AlarmView::Inactive;
    let (bar, title) = if alarming {
        (Rgb565::CSS_LIGHT_GRAY, "EXIT IMMEDIATELY")
    } else if view.saved_banner {
        (Rgb565::GREEN, "CONFIGURATION SAVED")
    } else {
        (Rgb565::YELLOW, "LIGHTS CONTROLLER")
    };
    Rectangle::with_corners(Point::zero(), Point::new(239, 25))
        .into_styled(fill(bar))
        .draw(target)?;
    let style = MonoTextStyle::new(&FONT_6X10, Rgb565::BLACK);
    Text::new(title, Point::new(60, 17), style).draw(target)?;

    let master = if view.master_on {
        Rgb565::GREEN
    } else {
        Rgb565::RED
    };
    rectangle(layout.master)
        .into_styled(fill(master))
        .draw(target)?;
    Ok(())
}

fn draw_zones<D>(target: &mut D, layout: &Layout, view: &View) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    for (i, r) in layout.zones.iter().enumerate() {
        let color = match view.alarm {
            AlarmView::PhaseA => Rgb565::RED,
            AlarmView::PhaseB => Rgb565::BLUE,
            AlarmView::Inactive if view.zone_on[i] => Rgb565::GREEN,
            AlarmView::Inactive => Rgb565::WHITE,
        };
        rectangle(*r).into_styled(fill(color)).draw(target)?;
    }

    let style = MonoTextStyle::new(&FONT_6X10, Rgb565::BLACK);
    for (i, label) in ZONE_LABELS.iter().enumerate() {
        let r = layout.zones[i];
        let x = (r.x0 + r.x1) as i32 / 2 - label.len() as i32 * 3;
        let y = (r.y0 + r.y1) as i32 / 2 + 3;
        Text::new(label, Point::new(x, y), style).draw(target)?;
    }
    // The aisle pair is labelled vertically down each column.
    for r in &layout.zones[3..] {
        let x = r.x0 as i32 + 12;
        let mut y = r.y0 as i32 + 22;
        for ch in ["A", "I", "S", "L", "E"] {
            Text::new(ch, Point::new(x, y), style).draw(target)?;
            y += 10;
        }
    }
    Ok(())
}

fn draw_sliders<D>(target: &mut D, layout: &Layout, view: &View) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let label = MonoTextStyle::new(&FONT_6X10, Rgb565::BLACK);
    for i in 0..4 {
        let down = layout.step_down[i];
        let up = layout.step_up[i];
        let active = view.slider_active[i];
        let track_color = if active {
            Rgb565::WHITE
        } else {
            Rgb565::CSS_DIM_GRAY
        };

        let y = (down.y0 + down.y1) as i32 / 2;
        let track_x0 = down.x1 as i32 + 4;
        let track_x1 = up.x0 as i32 - 4;
        Rectangle::with_corners(Point::new(track_x0, y - 1), Point::new(track_x1, y + 1))
            .into_styled(fill(track_color))
            .draw(target)?;

        // Knob position from the snap level (1..=5 across the track).
        let span = track_x1 - track_x0;
        let knob_x = track_x0 + span * (view.slider[i] as i32 - 1) / 4;
        Circle::with_center(Point::new(knob_x, y), 12)
            .into_styled(fill(track_color))
            .draw(target)?;

        for (r, sign) in [(down, "-"), (up, "+")] {
            rectangle(r)
                .into_styled(fill(Rgb565::CSS_LIGHT_GRAY))
                .draw(target)?;
            Text::new(
                sign,
                Point::new((r.x0 + r.x1) as i32 / 2 - 2, y + 3),
                label,
            )
            .draw(target)?;
        }
    }
    Ok(())
}

fn draw_presets<D>(target: &mut D, layout: &Layout, view: &View) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let style = MonoTextStyle::new(&FONT_6X10, Rgb565::WHITE);
    for (i, r) in layout.presets.iter().enumerate() {
        let color = if view.saved_banner {
            Rgb565::GREEN
        } else {
            Rgb565::CSS_DARK_GRAY
        };
        rectangle(*r).into_styled(fill(color)).draw(target)?;
        Text::new(
            PRESET_LABELS[i],
            Point::new((r.x0 + r.x1) as i32 / 2 - 5, (r.y0 + r.y1) as i32 / 2 + 3),
            style,
        )
        .draw(target)?;
    }
    Ok(())
}
