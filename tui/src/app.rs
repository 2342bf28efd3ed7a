//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, resize)
//! - ConductorClient for orchestration
//! - DisplayState for rendering
//!
//! The App:
//! 1. Converts terminal events to SurfaceEvents
//! 2. Sends events to the embedded Conductor via ConductorClient
//! 3. Receives ConductorMessages and updates DisplayState
//! 4. Renders based on DisplayState
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ 🤖 Dream11 Support Bot                 ● │  header (z 10)
//! │    Here to help you with your queries    │
//! ├──────────────────────────────────────────┤
//! │ ┌─────────────┐                          │
//! │ │ bot bubble  │                          │  conversation (z 0)
//! │ └─────────────┘          ┌─────────────┐ │
//! │                          │ user bubble │ │
//! │                          └─────────────┘ │
//! ├──────────────────────────────────────────┤
//! │ [ Type your message...           ]  ➤    │  input (z 10)
//! │ Online | Enter to send | Esc to quit     │  status (z 10)
//! └──────────────────────────────────────────┘
//! ```

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, EventStream, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{StatefulWidget, Widget};
use ratatui::Terminal;

use dream11_conductor::{
    ChatBackend, ConductorMessage, ConductorState, HttpChatBackend, NotifyLevel,
};

use crate::animation::{self, Entrance};
use crate::compositor::{Compositor, LayerId};
use crate::conductor_client::ConductorClient;
use crate::display::DisplayState;
use crate::theme;
use crate::widgets::{
    Header, InputRow, MessageList, MessageListState, HEADER_HEIGHT, INPUT_HEIGHT,
};

/// Rows scrolled per mouse wheel notch
const WHEEL_ROWS: usize = 3;

/// Main application state
pub struct App<B: ChatBackend + 'static = HttpChatBackend> {
    // === Core State ===
    /// Is the app still running?
    running: bool,
    /// Has the surface connected to the Conductor?
    connected: bool,

    // === Conductor Integration ===
    /// Client for communicating with the embedded Conductor
    conductor: ConductorClient<B>,
    /// Display state derived from ConductorMessages
    display: DisplayState,

    // === UI Components ===
    /// The layered compositor
    compositor: Compositor,
    /// Layer assignments
    layers: AppLayers,

    // === Input State ===
    /// User input buffer
    input_buffer: String,
    /// Conversation scroll state
    list_state: MessageListState,
    /// Display revision the list was last scrolled for
    seen_revision: u64,

    // === Animation State ===
    /// When the app started (drives looping animations)
    started: Instant,
    /// When the current reply started pending
    pending_since: Option<Instant>,
    /// Terminal size
    size: (u16, u16),
}

/// Layer IDs for UI regions
struct AppLayers {
    header: LayerId,
    conversation: LayerId,
    input: LayerId,
    status: LayerId,
}

/// Screen regions for a terminal size: header, conversation, input, status
fn regions(width: u16, height: u16) -> [Rect; 4] {
    let header_height = HEADER_HEIGHT.min(height);
    let bottom_height = (INPUT_HEIGHT + 1).min(height.saturating_sub(header_height));
    let conversation_height = height.saturating_sub(header_height + bottom_height);
    let input_y = header_height + conversation_height;

    [
        Rect::new(0, 0, width, header_height),
        Rect::new(0, header_height, width, conversation_height),
        Rect::new(0, input_y, width, bottom_height.saturating_sub(1)),
        Rect::new(0, height.saturating_sub(1), width, 1),
    ]
}

/// Copy the composited frame onto the terminal buffer, lowered and faded by
/// the intro animation
fn blit_intro(source: &Buffer, target: &mut Buffer, intro: Entrance) {
    let drop = animation::px_to_rows(intro.offset);
    let width = target.area.width.min(source.area.width);
    let height = target.area.height.min(source.area.height);

    for y in drop..height {
        for x in 0..width {
            let mut cell = source[(x, y - drop)].clone();
            if !intro.is_settled() {
                if cell.fg != Color::Reset {
                    cell.fg = theme::faded(cell.fg, theme::BACKGROUND_START, intro.opacity);
                }
                if cell.bg != Color::Reset {
                    cell.bg = theme::faded(cell.bg, theme::BACKGROUND_START, intro.opacity);
                }
            }
            target[(x, y)] = cell;
        }
    }
}

impl App<HttpChatBackend> {
    /// Create a new App sized to the current terminal
    pub fn new(conductor: ConductorClient<HttpChatBackend>) -> anyhow::Result<Self> {
        let (width, height) = crossterm::terminal::size()?;
        Ok(Self::with_size(conductor, width, height))
    }
}

impl<B: ChatBackend + 'static> App<B> {
    /// Create an App for a terminal of the given size
    pub fn with_size(conductor: ConductorClient<B>, width: u16, height: u16) -> Self {
        let area = Rect::new(0, 0, width, height);
        let mut compositor = Compositor::new(area);

        // Create layers with z-ordering
        let [header, conversation, input, status] = regions(width, height);
        let layers = AppLayers {
            header: compositor.create_layer(header, 10),
            conversation: compositor.create_layer(conversation, 0),
            input: compositor.create_layer(input, 10),
            status: compositor.create_layer(status, 10),
        };

        Self {
            running: true,
            connected: false,
            conductor,
            display: DisplayState::new(),
            compositor,
            layers,
            input_buffer: String::new(),
            list_state: MessageListState::default(),
            seen_revision: 0,
            started: Instant::now(),
            pending_since: None,
            size: (width, height),
        }
    }

    /// Start the Conductor and connect this surface
    pub async fn startup(&mut self) -> anyhow::Result<()> {
        if let Err(e) = self.conductor.start().await {
            tracing::warn!("Conductor start error: {}", e);
        }
        self.conductor.connect().await?;
        self.connected = true;
        self.process_conductor_messages();
        Ok(())
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // Target ~10 FPS for terminal-style animations
        let frame_duration = Duration::from_millis(100);

        // Create async event stream for non-blocking terminal events
        let mut event_stream = EventStream::new();

        // Render initial frame immediately so user sees UI
        self.render(terminal)?;

        while self.running {
            let frame_start = Instant::now();

            tokio::select! {
                biased;

                // Check for terminal events - highest priority
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        match event {
                            // Only handle Press events (not Release or Repeat)
                            Event::Key(key) if key.kind == KeyEventKind::Press => {
                                self.handle_key(key).await;
                            }
                            Event::Mouse(mouse) => self.handle_mouse(mouse),
                            Event::Resize(w, h) => self.handle_resize(w, h).await,
                            _ => {}
                        }
                    }
                }

                // Frame tick - finish startup once, then just render
                () = tokio::time::sleep(Duration::from_millis(16)) => {
                    if !self.connected {
                        if let Err(e) = self.startup().await {
                            tracing::warn!("Conductor connect error: {}", e);
                            self.connected = true;
                        }
                    }
                }
            }

            self.tick().await;

            // Render
            self.render(terminal)?;

            // Check for quit message
            if matches!(self.display.conductor_state, ConductorState::ShuttingDown) {
                self.running = false;
            }

            // Frame rate limiting
            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                tokio::time::sleep(frame_duration - elapsed).await;
            }
        }

        Ok(())
    }

    /// Apply a finished reply and refresh display state
    async fn tick(&mut self) {
        self.conductor.poll_reply().await;
        self.process_conductor_messages();
        self.update();
    }

    /// Process all pending messages from the Conductor
    fn process_conductor_messages(&mut self) {
        for msg in self.conductor.recv_all() {
            if let ConductorMessage::Notify { ref message, .. } = msg {
                tracing::info!(notice = %message, "Conductor notification");
            }
            self.display.apply_message(msg);
        }
    }

    /// Whether keystrokes reach the input row
    fn input_enabled(&self) -> bool {
        self.connected && !self.conductor.is_reply_pending() && self.display.accepts_input()
    }

    /// Handle keyboard input
    async fn handle_key(&mut self, key: event::KeyEvent) {
        match key.code {
            // Quit
            KeyCode::Esc => self.quit().await,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit().await;
            }

            // Submit message
            KeyCode::Enter if !key.modifiers.contains(KeyModifiers::SHIFT) => {
                if !self.input_enabled() || self.input_buffer.trim().is_empty() {
                    return;
                }
                let message = std::mem::take(&mut self.input_buffer);
                self.display.clear_notification();
                if let Err(e) = self.conductor.send_message(message).await {
                    tracing::error!("Failed to submit message: {}", e);
                }
                if let Err(e) = self.conductor.user_typing(false).await {
                    tracing::debug!("Failed to report typing: {}", e);
                }
                self.list_state.scroll_to_bottom();
            }

            // Typing
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self.input_enabled() {
                    self.input_buffer.push(c);
                    if let Err(e) = self.conductor.user_typing(true).await {
                        tracing::debug!("Failed to report typing: {}", e);
                    }
                }
            }

            KeyCode::Backspace => {
                if self.input_enabled() {
                    self.input_buffer.pop();
                }
            }

            // Conversation scrolling
            KeyCode::PageUp => {
                let page = (self.list_state.viewport_rows / 2).max(1);
                self.list_state.scroll_up(page);
            }
            KeyCode::PageDown => {
                let page = (self.list_state.viewport_rows / 2).max(1);
                self.list_state.scroll_down(page);
            }
            KeyCode::Home if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let all = self.list_state.total_rows;
                self.list_state.scroll_up(all);
            }
            KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.list_state.scroll_to_bottom();
            }

            _ => {}
        }
    }

    /// Ask the Conductor to shut down and leave the loop
    async fn quit(&mut self) {
        if let Err(e) = self.conductor.request_quit().await {
            tracing::warn!("Quit request failed: {}", e);
        }
        self.process_conductor_messages();
        self.running = false;
    }

    /// Handle mouse input
    fn handle_mouse(&mut self, mouse: event::MouseEvent) {
        // Only the conversation scrolls
        if self.compositor.layer_at(mouse.column, mouse.row) != Some(self.layers.conversation) {
            return;
        }
        match mouse.kind {
            MouseEventKind::ScrollUp => self.list_state.scroll_up(WHEEL_ROWS),
            MouseEventKind::ScrollDown => self.list_state.scroll_down(WHEEL_ROWS),
            _ => {}
        }
    }

    /// Handle terminal resize
    async fn handle_resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        self.compositor.resize(Rect::new(0, 0, width, height));

        let [header, conversation, input, status] = regions(width, height);
        for (id, rect) in [
            (self.layers.header, header),
            (self.layers.conversation, conversation),
            (self.layers.input, input),
            (self.layers.status, status),
        ] {
            self.compositor.move_layer(id, rect.x, rect.y);
            self.compositor.resize_layer(id, rect.width, rect.height);
        }

        if let Err(e) = self
            .conductor
            .resized(u32::from(width), u32::from(height))
            .await
        {
            tracing::debug!("Failed to report resize: {}", e);
        }
    }

    /// Update timers and scroll position
    fn update(&mut self) {
        self.display.update();

        // Auto-scroll whenever the list or the pending flag changes
        if self.display.revision != self.seen_revision {
            self.seen_revision = self.display.revision;
            self.list_state.scroll_to_bottom();
        }

        match (self.display.is_reply_pending(), self.pending_since) {
            (true, None) => self.pending_since = Some(Instant::now()),
            (false, Some(_)) => self.pending_since = None,
            _ => {}
        }
    }

    /// Render every layer and composite them
    pub fn compose(&mut self) -> &Buffer {
        let now = Instant::now();
        let clock = now.duration_since(self.started);

        self.render_header(clock);
        self.render_conversation(now);
        self.render_input(clock);
        self.render_status();

        self.compositor.composite()
    }

    /// Render the UI
    fn render(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
        // Panel rises and fades into place on startup
        let intro = animation::slide_in(self.started.elapsed());

        let output = self.compose();
        terminal.draw(|frame| blit_intro(output, frame.buffer_mut(), intro))?;

        Ok(())
    }

    /// Render header layer
    fn render_header(&mut self, clock: Duration) {
        let online = self.display.backend_online;
        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.header) {
            buf.reset();
            let area = buf.area;
            Header::new(online, clock).render(area, buf);
        }
    }

    /// Render conversation layer
    fn render_conversation(&mut self, now: Instant) {
        let typing = self.pending_since.map(|since| now.duration_since(since));
        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.conversation) {
            buf.reset();
            let area = buf.area;
            MessageList::new(&self.display.messages, now)
                .typing(typing)
                .render(area, buf, &mut self.list_state);
        }
    }

    /// Render input layer
    fn render_input(&mut self, clock: Duration) {
        let enabled = self.input_enabled();
        let cursor_on = (clock.as_millis() / 500) % 2 == 0;
        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.input) {
            buf.reset();
            let area = buf.area;
            InputRow::new(&self.input_buffer, enabled)
                .cursor(cursor_on)
                .render(area, buf);
        }
    }

    /// Render status bar
    fn render_status(&mut self) {
        let state_str = match (self.display.conductor_state, self.display.backend_online) {
            (ConductorState::Ready, Some(false)) => "Offline",
            (state, _) => state.description(),
        };

        let scroll_info = if self.list_state.scroll_offset > 0 {
            format!(" [^{} rows - PgDn to scroll]", self.list_state.scroll_offset)
        } else {
            String::new()
        };

        let status = format!(
            " {state_str} | Enter to send | Esc to quit | PgUp/PgDn scroll{scroll_info}"
        );
        let notice = self.display.notification.as_ref().map(|n| {
            let color = match n.level {
                NotifyLevel::Info => theme::STATUS_ONLINE,
                NotifyLevel::Warning => theme::PRIMARY_END,
            };
            (format!(" | {}", n.message), color)
        });

        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.status) {
            buf.reset();
            let area = buf.area;
            let (end_x, _) = buf.set_stringn(
                area.x,
                area.y,
                &status,
                usize::from(area.width),
                Style::default().fg(theme::DIM_GRAY),
            );
            if let Some((notice, color)) = notice {
                let room = usize::from((area.x + area.width).saturating_sub(end_x));
                buf.set_stringn(end_x, area.y, &notice, room, Style::default().fg(color));
            }
        }
    }

    /// Get the goodbye message for display after TUI closes
    pub fn goodbye(&self) -> Option<&str> {
        self.display.quit_message.as_deref()
    }

    /// Current display state
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Current contents of the input row
    pub fn input(&self) -> &str {
        &self.input_buffer
    }

    /// Whether the event loop is still running
    pub fn is_running(&self) -> bool {
        self.running
    }
}
