//! MessageList Widget
//!
//! A borderless, scrollable column of chat bubbles. Bot bubbles sit on the
//! left in the violet palette, user bubbles on the right in orange, each at
//! most 70% of the panel wide.

use std::time::{Duration, Instant};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::StatefulWidget;
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use crate::animation::{self, Entrance};
use crate::display::DisplayMessage;
use crate::theme;

/// Horizontal padding inside a bubble
const PAD_X: u16 = 2;
/// Blank rows between bubbles
const GAP: u16 = 1;
/// Margin between bubbles and the panel edge
const EDGE: u16 = 1;
/// Columns a tab expands to
const TAB_WIDTH: usize = 4;

/// A bubble wrapped to fit its panel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BubbleLayout {
    /// Wrapped text lines
    pub lines: Vec<String>,
    /// Outer width, padding included
    pub width: u16,
    /// Outer height, padding included
    pub height: u16,
}

/// Make reply text safe for terminal cells
///
/// CRLF and lone CR become line breaks, tabs become spaces, and any other
/// control character is dropped.
fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            '\n' => out.push('\n'),
            '\t' => out.push_str(&" ".repeat(TAB_WIDTH)),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Wrap `text` into a bubble no wider than 70% of `panel_width`
///
/// Newlines are kept as hard breaks.
pub fn layout_bubble(text: &str, panel_width: u16) -> BubbleLayout {
    let max_outer = u16::try_from(u32::from(panel_width) * 7 / 10).unwrap_or(u16::MAX);
    let max_inner = max_outer.saturating_sub(2 * PAD_X).max(1);

    let text = normalize_text(text);
    let mut lines: Vec<String> = wrap(&text, usize::from(max_inner))
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect();
    if lines.is_empty() {
        lines.push(String::new());
    }

    let inner = lines
        .iter()
        .map(|line| UnicodeWidthStr::width(line.as_str()))
        .max()
        .unwrap_or(0);
    let inner = u16::try_from(inner).unwrap_or(max_inner).min(max_inner);

    BubbleLayout {
        width: inner + 2 * PAD_X,
        height: u16::try_from(lines.len() + 2).unwrap_or(u16::MAX),
        lines,
    }
}

/// State for the message list
#[derive(Debug, Default)]
pub struct MessageListState {
    /// Scroll offset (rows from bottom, 0 = latest)
    pub scroll_offset: usize,
    /// Total content rows, set on render
    pub total_rows: usize,
    /// Visible rows, set on render
    pub viewport_rows: usize,
}

impl MessageListState {
    /// Scroll toward older messages
    pub fn scroll_up(&mut self, rows: usize) {
        let max_scroll = self.total_rows.saturating_sub(self.viewport_rows);
        self.scroll_offset = (self.scroll_offset + rows).min(max_scroll);
    }

    /// Scroll toward newer messages
    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(rows);
    }

    /// Jump to the latest message
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }
}

/// The chat bubbles
pub struct MessageList<'a> {
    messages: &'a [DisplayMessage],
    /// Elapsed time for the typing dots, `None` when no reply is pending
    typing: Option<Duration>,
    now: Instant,
}

impl<'a> MessageList<'a> {
    /// Create a list over `messages`, sampled at `now`
    pub fn new(messages: &'a [DisplayMessage], now: Instant) -> Self {
        Self {
            messages,
            typing: None,
            now,
        }
    }

    /// Show the typing indicator, animated at `elapsed`
    #[must_use]
    pub fn typing(mut self, elapsed: Option<Duration>) -> Self {
        self.typing = elapsed;
        self
    }
}

/// One bubble placed on the virtual canvas
struct Placed {
    layout: BubbleLayout,
    is_bot: bool,
    entrance: Entrance,
    top: usize,
}

impl StatefulWidget for MessageList<'_> {
    type State = MessageListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let panel_width = area.width.saturating_sub(2 * EDGE);

        // Lay out every bubble on a virtual canvas, top margin of one gap
        let mut placed = Vec::with_capacity(self.messages.len() + 1);
        let mut cursor = usize::from(GAP);
        for message in self.messages {
            let layout = layout_bubble(&message.text, panel_width);
            let height = usize::from(layout.height);
            placed.push(Placed {
                layout,
                is_bot: message.is_bot(),
                entrance: animation::message_slide(
                    self.now.saturating_duration_since(message.arrived),
                ),
                top: cursor,
            });
            cursor += height + usize::from(GAP);
        }
        let typing_top = cursor;
        if self.typing.is_some() {
            cursor += 3 + usize::from(GAP);
        }

        state.total_rows = cursor;
        state.viewport_rows = usize::from(area.height);

        // Clamp scroll
        let max_scroll = state.total_rows.saturating_sub(state.viewport_rows);
        state.scroll_offset = state.scroll_offset.min(max_scroll);

        let window_end = state.total_rows.saturating_sub(state.scroll_offset);
        let window_start = window_end.saturating_sub(state.viewport_rows);

        for bubble in &placed {
            draw_bubble(buf, area, window_start, bubble);
        }

        if let Some(elapsed) = self.typing {
            draw_typing(buf, area, window_start, typing_top, elapsed);
        }
    }
}

fn palette(is_bot: bool) -> (Color, Color) {
    if is_bot {
        (theme::SECONDARY_START, theme::SECONDARY_END)
    } else {
        (theme::PRIMARY_START, theme::PRIMARY_END)
    }
}

/// Screen row of canvas row `canvas_y`, if visible
fn screen_row(area: Rect, window_start: usize, canvas_y: usize) -> Option<u16> {
    let offset = canvas_y.checked_sub(window_start)?;
    let offset = u16::try_from(offset).ok()?;
    (offset < area.height).then_some(area.y + offset)
}

/// Left edge of a bubble, before clipping
fn bubble_x(area: Rect, width: u16, is_bot: bool, slide_cols: u16) -> i32 {
    let resting = if is_bot {
        i32::from(area.x + EDGE)
    } else {
        i32::from(area.x + area.width) - i32::from(EDGE) - i32::from(width)
    };
    resting - i32::from(slide_cols)
}

/// Paint one row of bubble background, clipped to the panel
fn paint_row(
    buf: &mut Buffer,
    area: Rect,
    x: i32,
    y: u16,
    width: u16,
    is_bot: bool,
    opacity: f32,
) {
    let (start, end) = palette(is_bot);
    for col in 0..width {
        let sx = x + i32::from(col);
        let Ok(sx) = u16::try_from(sx) else { continue };
        if sx < area.x || sx >= area.x + area.width {
            continue;
        }
        let base = theme::gradient(start, end, usize::from(col), usize::from(width));
        let bg = theme::faded(base, theme::BACKGROUND_MID, opacity);
        buf[(sx, y)].set_symbol(" ").set_bg(bg);
    }
}

/// Write text inside a bubble row, clipped to the panel
fn write_text(buf: &mut Buffer, area: Rect, x: i32, y: u16, text: &str, style: Style) {
    let mut col = x;
    for ch in text.chars().filter(|c| !c.is_control()) {
        let mut tmp = [0u8; 4];
        let symbol = ch.encode_utf8(&mut tmp);
        let width = i32::try_from(UnicodeWidthStr::width(&*symbol)).unwrap_or(1);
        if let Ok(sx) = u16::try_from(col) {
            if sx >= area.x && i32::from(sx) + width <= i32::from(area.x + area.width) {
                buf[(sx, y)].set_symbol(symbol).set_style(style);
            }
        }
        col += width;
    }
}

fn draw_bubble(buf: &mut Buffer, area: Rect, window_start: usize, bubble: &Placed) {
    let layout = &bubble.layout;
    let x = bubble_x(
        area,
        layout.width,
        bubble.is_bot,
        animation::px_to_cols(bubble.entrance.offset),
    );
    let opacity = bubble.entrance.opacity;
    let text_style = Style::default().fg(theme::faded(
        theme::TEXT_WHITE,
        theme::BACKGROUND_MID,
        opacity,
    ));

    for row in 0..layout.height {
        let Some(y) = screen_row(area, window_start, bubble.top + usize::from(row)) else {
            continue;
        };
        paint_row(buf, area, x, y, layout.width, bubble.is_bot, opacity);

        let line_index = usize::from(row).checked_sub(1);
        if let Some(line) = line_index.and_then(|i| layout.lines.get(i)) {
            write_text(buf, area, x + i32::from(PAD_X), y, line, text_style);
        }
    }
}

fn draw_typing(buf: &mut Buffer, area: Rect, window_start: usize, top: usize, elapsed: Duration) {
    // Three dots, one blank column apart
    let width = 5 + 2 * PAD_X;
    let x = bubble_x(area, width, true, 0);
    let rows: Vec<Option<u16>> = (0..3)
        .map(|row| screen_row(area, window_start, top + row))
        .collect();

    for y in rows.iter().flatten() {
        paint_row(buf, area, x, *y, width, true, 1.0);
    }

    let style = Style::default().fg(theme::TEXT_WHITE);
    for dot in 0..3u16 {
        let lift_px = animation::typing_dot(elapsed, usize::from(dot));
        let lift = usize::from(animation::px_to_rows(lift_px).min(1));
        if let Some(Some(y)) = rows.get(1 - lift) {
            write_text(buf, area, x + i32::from(PAD_X + dot * 2), *y, "●", style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dream11_conductor::ChatMessage;
    use pretty_assertions::assert_eq;

    fn settled(message: ChatMessage) -> DisplayMessage {
        let mut display = DisplayMessage::new(message);
        display.arrived = Instant::now() - Duration::from_secs(5);
        display
    }

    fn render(
        messages: &[DisplayMessage],
        typing: Option<Duration>,
        area: Rect,
    ) -> (Buffer, MessageListState) {
        let mut buf = Buffer::empty(area);
        let mut state = MessageListState::default();
        MessageList::new(messages, Instant::now())
            .typing(typing)
            .render(area, &mut buf, &mut state);
        (buf, state)
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_layout_short_text() {
        let layout = layout_bubble("Hello", 40);
        assert_eq!(layout.lines, vec!["Hello".to_string()]);
        assert_eq!(layout.width, 5 + 2 * PAD_X);
        assert_eq!(layout.height, 3);
    }

    #[test]
    fn test_layout_respects_seventy_percent() {
        let text = "word ".repeat(40);
        let layout = layout_bubble(&text, 50);
        assert!(layout.width <= 35);
        assert!(layout.lines.len() > 1);
    }

    #[test]
    fn test_layout_keeps_newlines() {
        let layout = layout_bubble("Line one\n\nLine three", 60);
        assert_eq!(
            layout.lines,
            vec!["Line one".to_string(), String::new(), "Line three".to_string()]
        );
    }

    #[test]
    fn test_layout_normalizes_line_endings_and_tabs() {
        let layout = layout_bubble("Hi\r\nthere\tfriend\rbye\u{7}", 60);
        assert_eq!(
            layout.lines,
            vec![
                "Hi".to_string(),
                "there    friend".to_string(),
                "bye".to_string(),
            ]
        );
    }

    #[test]
    fn test_control_characters_never_reach_cells() {
        let messages = vec![settled(ChatMessage::bot("Hi\r\nthere\tfriend"))];
        let area = Rect::new(0, 0, 60, 8);
        let (buf, _) = render(&messages, None, area);

        for y in 0..area.height {
            for x in 0..area.width {
                let symbol = buf[(x, y)].symbol();
                assert!(
                    !symbol.chars().any(char::is_control),
                    "control character at ({x}, {y}): {symbol:?}"
                );
            }
        }
        let visible: String = (0..area.height).map(|y| row_text(&buf, y)).collect();
        assert!(visible.contains("Hi"));
        assert!(visible.contains("there    friend"));
    }

    #[test]
    fn test_layout_wide_characters() {
        let layout = layout_bubble("🏏🏏", 60);
        assert_eq!(layout.width, 4 + 2 * PAD_X);
    }

    #[test]
    fn test_bot_left_user_right() {
        let messages = vec![
            settled(ChatMessage::bot("Hi")),
            settled(ChatMessage::user("Yo")),
        ];
        let (buf, _) = render(&messages, None, Rect::new(0, 0, 40, 12));

        // Bot bubble: rows 1..=3, text on row 2 after edge + padding
        assert!(row_text(&buf, 2).starts_with("   Hi"));
        // User bubble: rows 5..=7, text flush right before padding + edge
        assert!(row_text(&buf, 6).ends_with("Yo   "));
        assert_eq!(buf[(1, 2)].bg, theme::SECONDARY_START);
        assert_eq!(buf[(39 - 1 - 5, 6)].bg, theme::PRIMARY_START);
    }

    #[test]
    fn test_typing_indicator_shown_when_pending() {
        let messages = vec![settled(ChatMessage::bot("Hi"))];
        // All three dots resting at the start of the loop
        let (buf, state) = render(&messages, Some(Duration::ZERO), Rect::new(0, 0, 40, 12));

        // Greeting uses rows 1..=3, indicator rows 5..=7
        assert_eq!(state.total_rows, 9);
        let dots = row_text(&buf, 6);
        assert_eq!(dots.matches('●').count(), 3);
    }

    #[test]
    fn test_typing_dot_lifts() {
        let messages = vec![settled(ChatMessage::bot("Hi"))];
        // Dot 0 at its peak, dots 1 and 2 still resting
        let (buf, _) = render(&messages, Some(Duration::from_millis(300)), Rect::new(0, 0, 40, 12));
        assert_eq!(row_text(&buf, 5).matches('●').count(), 1);
        assert_eq!(row_text(&buf, 6).matches('●').count(), 2);
    }

    #[test]
    fn test_no_typing_indicator_when_idle() {
        let messages = vec![settled(ChatMessage::bot("Hi"))];
        let (buf, state) = render(&messages, None, Rect::new(0, 0, 40, 12));
        assert_eq!(state.total_rows, 5);
        assert!((0..12).all(|y| !row_text(&buf, y).contains('●')));
    }

    #[test]
    fn test_auto_scroll_shows_latest() {
        let messages: Vec<DisplayMessage> = (0..10)
            .map(|i| settled(ChatMessage::bot(format!("message {i}"))))
            .collect();
        let (buf, state) = render(&messages, None, Rect::new(0, 0, 40, 8));

        assert_eq!(state.scroll_offset, 0);
        let visible: String = (0..8).map(|y| row_text(&buf, y)).collect();
        assert!(visible.contains("message 9"));
        assert!(!visible.contains("message 0"));
    }

    #[test]
    fn test_scroll_up_reveals_older() {
        let messages: Vec<DisplayMessage> = (0..10)
            .map(|i| settled(ChatMessage::bot(format!("message {i}"))))
            .collect();
        let area = Rect::new(0, 0, 40, 8);
        let mut buf = Buffer::empty(area);
        let mut state = MessageListState::default();
        MessageList::new(&messages, Instant::now()).render(area, &mut buf, &mut state);

        state.scroll_up(1000);
        let mut buf = Buffer::empty(area);
        MessageList::new(&messages, Instant::now()).render(area, &mut buf, &mut state);

        assert_eq!(state.scroll_offset, state.total_rows - 8);
        let visible: String = (0..8).map(|y| row_text(&buf, y)).collect();
        assert!(visible.contains("message 0"));

        state.scroll_down(1000);
        assert_eq!(state.scroll_offset, 0);
    }

    #[test]
    fn test_new_message_starts_offset() {
        let messages = vec![DisplayMessage::new(ChatMessage::bot("Hi"))];
        let (buf, _) = render(&messages, None, Rect::new(0, 0, 40, 6));
        // Still sliding in from the left of its resting spot
        assert_ne!(buf[(1 + PAD_X, 2)].symbol(), "H");
        assert!(row_text(&buf, 2).trim_start().starts_with("Hi"));
    }
}
