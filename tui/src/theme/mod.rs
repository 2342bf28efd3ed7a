//! Theme and Colors
//!
//! The Dream11 support palette: an orange primary gradient for the header and
//! user bubbles, a violet secondary gradient for bot bubbles, and a deep navy
//! background.
//!
//! Terminals have no gradients, so each one is a pair of stops that widgets
//! sample per column with [`gradient`].

use ratatui::style::Color;

// ============================================================================
// Brand Gradients
// ============================================================================

/// Primary gradient start - Dream11 orange
pub const PRIMARY_START: Color = Color::Rgb(0xff, 0x6b, 0x35);

/// Primary gradient end - amber
pub const PRIMARY_END: Color = Color::Rgb(0xf7, 0x93, 0x1e);

/// Secondary gradient start - periwinkle
pub const SECONDARY_START: Color = Color::Rgb(0x66, 0x7e, 0xea);

/// Secondary gradient end - violet
pub const SECONDARY_END: Color = Color::Rgb(0x76, 0x4b, 0xa2);

// ============================================================================
// Background
// ============================================================================

/// Background gradient, first stop
pub const BACKGROUND_START: Color = Color::Rgb(0x1a, 0x1a, 0x2e);

/// Background gradient, middle stop
pub const BACKGROUND_MID: Color = Color::Rgb(0x16, 0x21, 0x3e);

/// Background gradient, last stop
pub const BACKGROUND_END: Color = Color::Rgb(0x0f, 0x34, 0x60);

// ============================================================================
// UI Colors
// ============================================================================

/// Online status dot
pub const STATUS_ONLINE: Color = Color::Rgb(0x4c, 0xaf, 0x50);

/// Offline status dot
pub const STATUS_OFFLINE: Color = Color::Rgb(255, 80, 80);

/// Bubble and header text
pub const TEXT_WHITE: Color = Color::Rgb(255, 255, 255);

/// Placeholder and hint text
pub const DIM_GRAY: Color = Color::Rgb(120, 120, 140);

/// Input field fill
pub const INPUT_FILL: Color = Color::Rgb(0x2a, 0x30, 0x4a);

/// Opacity applied to disabled controls
pub const DISABLED_OPACITY: f32 = 0.6;

// ============================================================================
// Color Math
// ============================================================================

fn rgb(color: Color) -> (u8, u8, u8) {
    match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::White => (255, 255, 255),
        _ => (0, 0, 0),
    }
}

fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    let value = f32::from(a) + (f32::from(b) - f32::from(a)) * t;
    // Clamped to 0..=255 above, so the cast cannot truncate
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let channel = value.round().clamp(0.0, 255.0) as u8;
    channel
}

/// Blend `from` toward `to` by `t` (0.0 = `from`, 1.0 = `to`)
#[must_use]
pub fn mix(from: Color, to: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let (r1, g1, b1) = rgb(from);
    let (r2, g2, b2) = rgb(to);
    Color::Rgb(
        lerp_channel(r1, r2, t),
        lerp_channel(g1, g2, t),
        lerp_channel(b1, b2, t),
    )
}

/// Sample a two-stop gradient at column `index` of `len`
#[must_use]
pub fn gradient(start: Color, end: Color, index: usize, len: usize) -> Color {
    if len <= 1 {
        return start;
    }
    #[allow(clippy::cast_precision_loss)]
    let t = index as f32 / (len - 1) as f32;
    mix(start, end, t)
}

/// Sample the three-stop background gradient
#[must_use]
pub fn background(index: usize, len: usize) -> Color {
    if len <= 1 {
        return BACKGROUND_START;
    }
    let half = (len - 1) / 2;
    if index <= half {
        gradient(BACKGROUND_START, BACKGROUND_MID, index, half + 1)
    } else {
        gradient(BACKGROUND_MID, BACKGROUND_END, index - half, len - half)
    }
}

/// Fade a foreground color over a background, as CSS `opacity` would
#[must_use]
pub fn faded(color: Color, over: Color, opacity: f32) -> Color {
    mix(over, color, opacity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        assert_eq!(gradient(PRIMARY_START, PRIMARY_END, 0, 10), PRIMARY_START);
        assert_eq!(gradient(PRIMARY_START, PRIMARY_END, 9, 10), PRIMARY_END);
        assert_eq!(gradient(PRIMARY_START, PRIMARY_END, 0, 1), PRIMARY_START);
    }

    #[test]
    fn test_mix_midpoint() {
        let mid = mix(Color::Rgb(0, 0, 0), Color::Rgb(200, 100, 50), 0.5);
        assert_eq!(mid, Color::Rgb(100, 50, 25));
    }

    #[test]
    fn test_background_stops() {
        assert_eq!(background(0, 11), BACKGROUND_START);
        assert_eq!(background(5, 11), BACKGROUND_MID);
        assert_eq!(background(10, 11), BACKGROUND_END);
    }

    #[test]
    fn test_faded_full_opacity_is_identity() {
        assert_eq!(faded(STATUS_ONLINE, BACKGROUND_START, 1.0), STATUS_ONLINE);
        assert_eq!(faded(STATUS_ONLINE, BACKGROUND_START, 0.0), BACKGROUND_START);
    }
}
