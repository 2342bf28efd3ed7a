//! Input Row Widget
//!
//! Text field plus the round send button. Both dim to 60% while a reply is
//! pending; the button also dims while the trimmed input is empty.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthChar;

use crate::theme;

/// Rows the input row occupies (separator, field, spacer)
pub const INPUT_HEIGHT: u16 = 3;

/// Shown while the field is empty
pub const PLACEHOLDER: &str = "Type your message...";

/// Send button glyph
pub const SEND_ICON: &str = "➤";

/// Button width in cells
const BUTTON_WIDTH: u16 = 3;

/// Whether the send button is active
pub fn send_enabled(value: &str, input_enabled: bool) -> bool {
    input_enabled && !value.trim().is_empty()
}

/// The input row
pub struct InputRow<'a> {
    value: &'a str,
    enabled: bool,
    cursor_on: bool,
}

impl<'a> InputRow<'a> {
    /// Create an input row showing `value`
    pub fn new(value: &'a str, enabled: bool) -> Self {
        Self {
            value,
            enabled,
            cursor_on: false,
        }
    }

    /// Show the cursor (blink phase)
    #[must_use]
    pub fn cursor(mut self, on: bool) -> Self {
        self.cursor_on = on;
        self
    }
}

/// The longest suffix of `value` that fits in `width` cells
fn visible_tail(value: &str, width: usize) -> &str {
    let mut used = 0;
    let mut start = value.len();
    for (idx, ch) in value.char_indices().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = idx;
    }
    &value[start..]
}

impl Widget for InputRow<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width < BUTTON_WIDTH + 6 {
            return;
        }

        // Separator line
        let separator = "─".repeat(usize::from(area.width));
        buf.set_string(
            area.x,
            area.y,
            &separator,
            Style::default().fg(theme::faded(
                theme::TEXT_WHITE,
                theme::BACKGROUND_MID,
                0.1,
            )),
        );
        if area.height < 2 {
            return;
        }

        let y = area.y + 1;
        let opacity = if self.enabled {
            1.0
        } else {
            theme::DISABLED_OPACITY
        };

        // Field
        let field_x = area.x + 1;
        let field_width = area.width.saturating_sub(BUTTON_WIDTH + 3);
        let field_bg = theme::faded(theme::INPUT_FILL, theme::BACKGROUND_MID, opacity);
        for col in 0..field_width {
            buf[(field_x + col, y)].set_symbol(" ").set_bg(field_bg);
        }

        // One cell of breathing room on each side, one for the cursor
        let text_width = usize::from(field_width.saturating_sub(3));
        if self.value.is_empty() {
            buf.set_stringn(
                field_x + 1,
                y,
                PLACEHOLDER,
                text_width,
                Style::default().fg(theme::DIM_GRAY),
            );
        } else {
            let shown = visible_tail(self.value, text_width);
            let fg = theme::faded(theme::TEXT_WHITE, field_bg, opacity);
            let (end_x, _) = buf.set_stringn(field_x + 1, y, shown, text_width, Style::default().fg(fg));
            if self.enabled && self.cursor_on {
                buf.set_string(end_x, y, "▏", Style::default().fg(theme::TEXT_WHITE));
            }
        }
        if self.value.is_empty() && self.enabled && self.cursor_on {
            buf.set_string(field_x, y, "▏", Style::default().fg(theme::TEXT_WHITE));
        }

        // Send button
        let button_x = area.x + area.width - BUTTON_WIDTH - 1;
        let button_opacity = if send_enabled(self.value, self.enabled) {
            1.0
        } else {
            theme::DISABLED_OPACITY
        };
        for col in 0..BUTTON_WIDTH {
            let bg = theme::gradient(
                theme::PRIMARY_START,
                theme::PRIMARY_END,
                usize::from(col),
                usize::from(BUTTON_WIDTH),
            );
            buf[(button_x + col, y)]
                .set_symbol(" ")
                .set_bg(theme::faded(bg, theme::BACKGROUND_MID, button_opacity));
        }
        let icon_bg = buf[(button_x + 1, y)].bg;
        buf.set_string(
            button_x + 1,
            y,
            SEND_ICON,
            Style::default()
                .fg(theme::faded(theme::TEXT_WHITE, icon_bg, button_opacity))
                .add_modifier(Modifier::BOLD),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(value: &str, enabled: bool) -> Buffer {
        let area = Rect::new(0, 0, 40, INPUT_HEIGHT);
        let mut buf = Buffer::empty(area);
        InputRow::new(value, enabled).render(area, &mut buf);
        buf
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_send_enabled() {
        assert!(send_enabled("Hello", true));
        assert!(!send_enabled("   ", true));
        assert!(!send_enabled("", true));
        assert!(!send_enabled("Hello", false));
    }

    #[test]
    fn test_placeholder_when_empty() {
        let buf = render("", true);
        assert!(row_text(&buf, 1).contains(PLACEHOLDER));
        assert!(row_text(&buf, 1).contains(SEND_ICON));
    }

    #[test]
    fn test_value_replaces_placeholder() {
        let buf = render("Where is my refund?", true);
        let row = row_text(&buf, 1);
        assert!(row.contains("Where is my refund?"));
        assert!(!row.contains(PLACEHOLDER));
    }

    #[test]
    fn test_button_dims_when_disabled_or_empty() {
        let active = render("Hello", true);
        let empty = render("  ", true);
        let pending = render("Hello", false);

        // Button occupies columns 36..=38
        assert_eq!(active[(36, 1)].bg, theme::PRIMARY_START);
        assert_ne!(empty[(36, 1)].bg, theme::PRIMARY_START);
        assert_eq!(empty[(36, 1)].bg, pending[(36, 1)].bg);
    }

    #[test]
    fn test_field_dims_while_pending() {
        let enabled = render("Hello", true);
        let pending = render("Hello", false);
        assert_eq!(enabled[(1, 1)].bg, theme::INPUT_FILL);
        assert_ne!(pending[(1, 1)].bg, theme::INPUT_FILL);
    }

    #[test]
    fn test_long_input_shows_tail() {
        let long = format!("{}END", "x".repeat(100));
        let buf = render(&long, true);
        assert!(row_text(&buf, 1).contains("END"));
    }

    #[test]
    fn test_visible_tail() {
        assert_eq!(visible_tail("abcdef", 3), "def");
        assert_eq!(visible_tail("ab", 10), "ab");
        assert_eq!(visible_tail("a🏏b", 3), "🏏b");
        assert_eq!(visible_tail("a🏏b", 2), "b");
    }
}
