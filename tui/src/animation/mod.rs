//! Keyframe Animations
//!
//! Terminal renditions of the widget's CSS keyframes. Every animation is a
//! pure function of elapsed time, so widgets stay stateless and tests can
//! sample any instant.
//!
//! | Animation       | Period | Drives                         |
//! |-----------------|--------|--------------------------------|
//! | `slide_in`      | 0.8s   | panel entrance (once)          |
//! | `message_slide` | 0.5s   | each new bubble (once)         |
//! | `bounce`        | 2s     | header avatar (loop)           |
//! | `pulse`         | 2s     | status dot (loop)              |
//! | `typing_dot`    | 1.4s   | typing indicator, 0.2s stagger |
//! | `shimmer`       | 3s     | header highlight sweep (loop)  |
//!
//! Values are in CSS pixels; [`px_to_rows`] and [`px_to_cols`] convert them
//! to cells.

mod easing;

use std::time::Duration;

pub use easing::EasingFunction;

/// Panel entrance
pub const SLIDE_IN: Duration = Duration::from_millis(800);
/// Bubble entrance
pub const MESSAGE_SLIDE: Duration = Duration::from_millis(500);
/// Avatar bounce loop
pub const BOUNCE: Duration = Duration::from_secs(2);
/// Status dot pulse loop
pub const PULSE: Duration = Duration::from_secs(2);
/// Typing dot loop
pub const TYPING: Duration = Duration::from_millis(1400);
/// Delay between consecutive typing dots
pub const TYPING_DOT_DELAY: Duration = Duration::from_millis(200);
/// Header shimmer loop
pub const SHIMMER: Duration = Duration::from_secs(3);

/// Peak shimmer highlight alpha
pub const SHIMMER_PEAK_ALPHA: f32 = 0.3;

const PX_PER_ROW: f32 = 10.0;
const PX_PER_COL: f32 = 8.0;

const BOUNCE_FRAMES: &[(f32, f32)] = &[
    (0.0, 0.0),
    (0.2, 0.0),
    (0.4, 10.0),
    (0.5, 0.0),
    (0.6, 5.0),
    (0.8, 0.0),
    (1.0, 0.0),
];

const TYPING_FRAMES: &[(f32, f32)] = &[(0.0, 0.0), (0.3, 10.0), (0.6, 0.0), (1.0, 0.0)];

/// Entrance animation sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entrance {
    /// Remaining offset in px (shrinks to 0)
    pub offset: f32,
    /// Opacity (grows to 1)
    pub opacity: f32,
}

impl Entrance {
    /// Whether the entrance has finished
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.offset <= f32::EPSILON && self.opacity >= 1.0 - f32::EPSILON
    }
}

/// Pulse animation sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulse {
    /// Scale factor, 1.0 to 1.2
    pub scale: f32,
    /// Opacity, 0.7 to 1.0
    pub opacity: f32,
}

/// Progress through a repeating animation (0.0 to 1.0)
#[must_use]
pub fn loop_progress(elapsed: Duration, period: Duration) -> f32 {
    if period.is_zero() {
        return 0.0;
    }
    (elapsed.as_secs_f32() % period.as_secs_f32()) / period.as_secs_f32()
}

/// Progress through a one-shot animation, held at 1.0 once done
#[must_use]
pub fn once_progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
}

/// Interpolate between keyframes, easing within each segment
fn sample(frames: &[(f32, f32)], t: f32, easing: EasingFunction) -> f32 {
    for pair in frames.windows(2) {
        let (start_at, start_value) = pair[0];
        let (end_at, end_value) = pair[1];
        if t <= end_at {
            let span = end_at - start_at;
            let local = if span > 0.0 { (t - start_at) / span } else { 1.0 };
            return start_value + (end_value - start_value) * easing.apply(local);
        }
    }
    frames.last().map_or(0.0, |&(_, value)| value)
}

fn entrance(elapsed: Duration, duration: Duration, distance: f32) -> Entrance {
    let eased = EasingFunction::EaseOut.apply(once_progress(elapsed, duration));
    Entrance {
        offset: distance * (1.0 - eased),
        opacity: eased,
    }
}

/// `slideIn`: panel rises 50px while fading in
#[must_use]
pub fn slide_in(elapsed: Duration) -> Entrance {
    entrance(elapsed, SLIDE_IN, 50.0)
}

/// `messageSlide`: bubble slides 20px from the left while fading in
#[must_use]
pub fn message_slide(elapsed: Duration) -> Entrance {
    entrance(elapsed, MESSAGE_SLIDE, 20.0)
}

/// `bounce`: avatar lift in px
#[must_use]
pub fn bounce(elapsed: Duration) -> f32 {
    sample(
        BOUNCE_FRAMES,
        loop_progress(elapsed, BOUNCE),
        EasingFunction::EaseInOut,
    )
}

/// `pulse`: status dot scale and opacity
#[must_use]
pub fn pulse(elapsed: Duration) -> Pulse {
    let t = loop_progress(elapsed, PULSE);
    let swing = sample(
        &[(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)],
        t,
        EasingFunction::EaseInOut,
    );
    Pulse {
        scale: 1.0 + 0.2 * swing,
        opacity: 1.0 - 0.3 * swing,
    }
}

/// `typing`: lift in px of dot `index` (0, 1, 2)
///
/// Each dot starts 0.2s after the previous one and rests until then.
#[must_use]
pub fn typing_dot(elapsed: Duration, index: usize) -> f32 {
    let delay = TYPING_DOT_DELAY * u32::try_from(index).unwrap_or(u32::MAX);
    let Some(running) = elapsed.checked_sub(delay) else {
        return 0.0;
    };
    sample(
        TYPING_FRAMES,
        loop_progress(running, TYPING),
        EasingFunction::EaseInOut,
    )
}

/// `shimmer`: left edge of the highlight band as a fraction of the width
/// (-1.0 to 1.0)
#[must_use]
pub fn shimmer(elapsed: Duration) -> f32 {
    let eased = EasingFunction::EaseInOut.apply(loop_progress(elapsed, SHIMMER));
    -1.0 + 2.0 * eased
}

/// Highlight alpha for one header column
#[must_use]
pub fn shimmer_alpha(elapsed: Duration, column: u16, width: u16) -> f32 {
    if width == 0 {
        return 0.0;
    }
    let x = (f32::from(column) + 0.5) / f32::from(width);
    let u = x - shimmer(elapsed);
    if !(0.0..=1.0).contains(&u) {
        return 0.0;
    }
    SHIMMER_PEAK_ALPHA * (1.0 - (2.0 * u - 1.0).abs())
}

/// Convert a vertical px offset to whole rows
#[must_use]
pub fn px_to_rows(px: f32) -> u16 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rows = (px.max(0.0) / PX_PER_ROW).round() as u16;
    rows
}

/// Convert a horizontal px offset to whole columns
#[must_use]
pub fn px_to_cols(px: f32) -> u16 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let cols = (px.max(0.0) / PX_PER_COL).round() as u16;
    cols
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_loop_progress_wraps() {
        assert!(close(loop_progress(ms(500), BOUNCE), 0.25));
        assert!(close(loop_progress(ms(2500), BOUNCE), 0.25));
        assert!(close(loop_progress(ms(0), BOUNCE), 0.0));
    }

    #[test]
    fn test_once_progress_holds() {
        assert!(close(once_progress(ms(400), SLIDE_IN), 0.5));
        assert!(close(once_progress(ms(5000), SLIDE_IN), 1.0));
    }

    #[test]
    fn test_slide_in_settles() {
        let start = slide_in(ms(0));
        assert!(close(start.offset, 50.0));
        assert!(close(start.opacity, 0.0));
        assert!(!start.is_settled());

        assert!(slide_in(SLIDE_IN).is_settled());
        assert!(slide_in(ms(10_000)).is_settled());
    }

    #[test]
    fn test_message_slide_distance() {
        assert!(close(message_slide(ms(0)).offset, 20.0));
        assert_eq!(px_to_cols(message_slide(ms(0)).offset), 3);
        assert!(message_slide(MESSAGE_SLIDE).is_settled());
    }

    #[test]
    fn test_bounce_keyframes() {
        assert!(close(bounce(ms(0)), 0.0));
        assert!(close(bounce(ms(400)), 0.0));
        assert!(close(bounce(ms(800)), 10.0));
        assert!(close(bounce(ms(1000)), 0.0));
        assert!(close(bounce(ms(1200)), 5.0));
        assert!(close(bounce(ms(1600)), 0.0));
        assert!(close(bounce(ms(2800)), 10.0));
    }

    #[test]
    fn test_pulse_peaks_midway() {
        let rest = pulse(ms(0));
        assert!(close(rest.scale, 1.0));
        assert!(close(rest.opacity, 1.0));

        let peak = pulse(ms(1000));
        assert!(close(peak.scale, 1.2));
        assert!(close(peak.opacity, 0.7));
    }

    #[test]
    fn test_typing_dots_staggered() {
        // Dot 0 peaks at 30% of 1.4s = 420ms
        assert!(close(typing_dot(ms(420), 0), 10.0));
        // Dot 1 starts 200ms later and is still resting at 100ms
        assert!(close(typing_dot(ms(100), 1), 0.0));
        assert!(close(typing_dot(ms(620), 1), 10.0));
        assert!(close(typing_dot(ms(820), 2), 10.0));
        // Rest phase between 60% and 100%
        assert!(close(typing_dot(ms(1000), 0), 0.0));
    }

    #[test]
    fn test_shimmer_sweeps_across() {
        assert!(close(shimmer(ms(0)), -1.0));
        assert!(close(shimmer(ms(1500)), 0.0));

        // Band fully left of the header at the start of the loop
        assert!(close(shimmer_alpha(ms(0), 10, 40), 0.0));
        // Centered at the midpoint: peak near the middle column
        let middle = shimmer_alpha(ms(1500), 20, 40);
        assert!(middle > 0.25 && middle <= SHIMMER_PEAK_ALPHA);
        assert!(shimmer_alpha(ms(1500), 0, 40) < 0.05);
        assert!(close(shimmer_alpha(ms(1500), 5, 0), 0.0));
    }

    #[test]
    fn test_px_conversion() {
        assert_eq!(px_to_rows(10.0), 1);
        assert_eq!(px_to_rows(5.0), 1);
        assert_eq!(px_to_rows(4.0), 0);
        assert_eq!(px_to_rows(-3.0), 0);
        assert_eq!(px_to_rows(50.0), 5);
        assert_eq!(px_to_cols(0.0), 0);
    }
}
