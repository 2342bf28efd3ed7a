//! Header Widget
//!
//! Orange gradient bar with the bouncing bot avatar, title, subtitle and the
//! pulsing status dot. A white highlight band sweeps across every 3s.

use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Widget;

use crate::animation;
use crate::theme;

/// Rows the header occupies
pub const HEADER_HEIGHT: u16 = 4;

const AVATAR: &str = "🤖";
const TITLE: &str = "Dream11 Support Bot";
const SUBTITLE: &str = "Here to help you with your queries";

/// The chat header
pub struct Header {
    /// Health check result (`None` while connecting)
    online: Option<bool>,
    /// Time since the app started
    clock: Duration,
}

impl Header {
    /// Create a header for the given backend status
    pub fn new(online: Option<bool>, clock: Duration) -> Self {
        Self { online, clock }
    }

    fn status_color(&self) -> ratatui::style::Color {
        match self.online {
            Some(true) => theme::STATUS_ONLINE,
            Some(false) => theme::STATUS_OFFLINE,
            None => theme::DIM_GRAY,
        }
    }
}

impl Widget for Header {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        // Diagonal gradient plus the shimmer band
        let span = usize::from(area.width) + 2 * usize::from(area.height);
        for row in 0..area.height {
            for col in 0..area.width {
                let base = theme::gradient(
                    theme::PRIMARY_START,
                    theme::PRIMARY_END,
                    usize::from(col) + 2 * usize::from(row),
                    span,
                );
                let glint = animation::shimmer_alpha(self.clock, col, area.width);
                let bg = theme::mix(base, theme::TEXT_WHITE, glint);
                buf[(area.x + col, area.y + row)].set_symbol(" ").set_bg(bg);
            }
        }

        if area.height < 3 || area.width < 12 {
            return;
        }

        // Avatar rests on row 2 and hops to row 1
        let lift = animation::px_to_rows(animation::bounce(self.clock)).min(1);
        buf.set_string(
            area.x + 2,
            area.y + 2 - lift,
            AVATAR,
            Style::default().fg(theme::TEXT_WHITE),
        );

        let text_x = area.x + 6;
        let text_width = usize::from(area.width.saturating_sub(10));
        buf.set_stringn(
            text_x,
            area.y + 1,
            TITLE,
            text_width,
            Style::default()
                .fg(theme::TEXT_WHITE)
                .add_modifier(Modifier::BOLD),
        );
        let subtitle_bg = buf[(text_x, area.y + 2)].bg;
        buf.set_stringn(
            text_x,
            area.y + 2,
            SUBTITLE,
            text_width,
            Style::default().fg(theme::faded(theme::TEXT_WHITE, subtitle_bg, 0.9)),
        );

        // Status dot, swelling and dimming with the pulse
        let pulse = animation::pulse(self.clock);
        let dot_x = area.x + area.width - 3;
        let dot_y = area.y + 1;
        let dot_bg = buf[(dot_x, dot_y)].bg;
        let glyph = if pulse.scale > 1.1 { "●" } else { "•" };
        buf.set_string(
            dot_x,
            dot_y,
            glyph,
            Style::default().fg(theme::faded(self.status_color(), dot_bg, pulse.opacity)),
        );
    }
}
