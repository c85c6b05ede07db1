/*
 *  display/components/status_bar.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Bottom status bar with rounded clock and date
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use arrayvec::ArrayString;
use chrono::{Local, NaiveDateTime, Timelike};
use core::fmt::Write;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::prelude::*;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use crate::display::layout::ResolvedLayout;
use crate::display::theme::Theme;
use crate::textfit::TextMetrics;

pub const SEPARATOR: &str = " | ";

/// Left inset of the clock
const TEXT_X: i32 = 12;
/// Gap either side of the separator
const GAP: i32 = 6;

/// Clock and date text for one composed frame (stack allocated).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    pub clock: ArrayString<16>,
    pub date: ArrayString<24>,
}

impl StatusLine {
    pub fn at(t: &NaiveDateTime) -> Self {
        Self {
            clock: clock_text_round10(t),
            date: date_text(t),
        }
    }

    /// Local wall clock now
    pub fn now() -> Self {
        Self::at(&Local::now().naive_local())
    }
}

/// 12 hour time rounded to the nearest ten minutes, e.g. "10:10 AM".
///
/// Exact halves go to the even ten, so 10:05 reads 10:00 and 10:15 reads
/// 10:20; 11:55 PM reads as 12:00 AM.
pub fn clock_text_round10<T: Timelike>(t: &T) -> ArrayString<16> {
    let mut hour = t.hour();
    let (tens, units) = (t.minute() / 10, t.minute() % 10);
    let round_up = units > 5 || (units == 5 && tens % 2 == 1);
    let mut minute = (tens + u32::from(round_up)) * 10;
    if minute == 60 {
        hour = (hour + 1) % 24;
        minute = 0;
    }
    let hour_12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    let ampm = if hour < 12 { "AM" } else { "PM" };

    let mut buf = ArrayString::new();
    let _ = write!(&mut buf, "{}:{:02} {}", hour_12, minute, ampm);
    buf
}

/// Short date, e.g. "Mon, Nov 24".
pub fn date_text(t: &NaiveDateTime) -> ArrayString<24> {
    let mut buf = ArrayString::new();
    let _ = write!(&mut buf, "{}", t.format("%a, %b %d"));
    buf
}

/// Paint the bar across the full canvas width below the art square.
pub fn render_status_bar<D>(
    target: &mut D,
    layout: &ResolvedLayout,
    theme: &Theme,
    status: &StatusLine,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let bar_y = layout.bar_y() as i32;
    let width = layout.canvas_width;
    if layout.bar_height == 0 || width == 0 {
        return Ok(());
    }

    if bar_y > 0 {
        Line::new(Point::new(0, bar_y - 1), Point::new(width as i32 - 1, bar_y - 1))
            .into_styled(PrimitiveStyle::with_stroke(theme.taskbar_rule, 1))
            .draw(target)?;
    }
    target.fill_solid(
        &Rectangle::new(Point::new(0, bar_y), Size::new(width, layout.bar_height)),
        theme.taskbar_background,
    )?;

    let face = &theme.clock;
    let style = MonoTextStyle::new(face.font, theme.clock_color);
    let y = bar_y + (layout.bar_height.saturating_sub(face.height()) / 2) as i32;

    let mut x = TEXT_X;
    for (i, part) in [status.clock.as_str(), SEPARATOR, status.date.as_str()].iter().enumerate() {
        if i > 0 {
            x += GAP;
        }
        Text::with_baseline(part, Point::new(x, y), style, Baseline::Top).draw(target)?;
        x += face.font.measure_width(part) as i32;
    }
    Ok(())
}
