//! Dream11 Support TUI - Terminal chat window for the Dream11 support bot
//!
//! This crate renders the support chat as a full-screen terminal UI: an
//! orange gradient header with the bot avatar and status dot, the bubble
//! conversation, and the input row with its send button.
//!
//! # Architecture
//!
//! - **Conductor client**: Embeds the headless conductor and relays events
//! - **Display**: State derived purely from conductor messages
//! - **Compositor**: Layered rendering over the gradient backdrop
//! - **Widgets**: Header, message bubbles, input row
//! - **Animation**: Time-based keyframes (slide-in, bounce, pulse, typing dots)

pub mod animation;
pub mod app;
pub mod compositor;
pub mod conductor_client;
pub mod display;
pub mod theme;
pub mod widgets;

pub use app::App;
