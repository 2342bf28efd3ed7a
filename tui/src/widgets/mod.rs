//! Widgets
//!
//! - [`Header`]: avatar, title, status dot, shimmer
//! - [`MessageList`]: scrollable chat bubbles with the typing indicator
//! - [`InputRow`]: text field and send button

mod header;
mod input;
mod message_list;

pub use header::{Header, HEADER_HEIGHT};
pub use input::{send_enabled, InputRow, INPUT_HEIGHT, PLACEHOLDER, SEND_ICON};
pub use message_list::{layout_bubble, BubbleLayout, MessageList, MessageListState};
