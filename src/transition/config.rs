//! Transition configuration and easing curves.

use crate::color::Color;

/// Fraction of the cover duration at which the smoke hands over to the hold.
///
/// At 0.5 the page swap happens while the cover animation is only half way
/// through its nominal duration, then the hold snaps to full coverage. This
/// hides more of the incoming page's load time.
pub const EARLY_COVER_TRIGGER: f32 = 0.5;

/// Hand over only once the cover animation has run its full duration.
pub const FULL_COVER_TRIGGER: f32 = 1.0;

/// Nominal frame time used to advance the smoke's flow clock.
pub const NOMINAL_FRAME_DELTA: f32 = 0.016;

/// Progress curves used by the overlays.
///
/// Every curve maps `[0, 1]` onto `[0, 1]` and clamps its input first, so a
/// late frame can never overshoot the target value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
    /// Quadratic in-out (GSAP's `power2.inOut`); the gradient fade's curve.
    Power2InOut,
    /// Cubic Hermite `t²(3 − 2t)`; the smoke's cover and reveal curve.
    Smoothstep,
}

impl Easing {
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Power2InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::Smoothstep => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Which overlay is drawn while a transition runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionStyle {
    /// Procedural terracotta smoke that fills in and then dissolves.
    #[default]
    Smoke,
    /// Flat gradient overlay that fades in and out.
    Fade,
}

/// Timing and look of a page transition.
///
/// ```
/// use veil::{TransitionConfig, FULL_COVER_TRIGGER};
///
/// let config = TransitionConfig::new()
///     .cover(1.2)
///     .hold(0.1)
///     .cover_trigger(FULL_COVER_TRIGGER);
/// assert_eq!(config.cover_duration, 1.2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionConfig {
    /// Overlay used for the effect.
    pub style: TransitionStyle,
    /// Seconds the smoke takes to cover the screen.
    pub cover_duration: f32,
    /// Seconds spent fully covered before the midpoint fires.
    pub hold_duration: f32,
    /// Seconds the smoke takes to clear.
    pub reveal_duration: f32,
    /// Fraction of `cover_duration` after which the cover phase ends.
    pub cover_trigger: f32,
    /// Flow clock increment per frame.
    pub frame_delta: f32,
    /// Base color of the overlay.
    pub color: Color,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            style: TransitionStyle::Smoke,
            cover_duration: 1.5,
            hold_duration: 0.05,
            reveal_duration: 1.5,
            cover_trigger: EARLY_COVER_TRIGGER,
            frame_delta: NOMINAL_FRAME_DELTA,
            color: Color::TERRACOTTA,
        }
    }
}

impl TransitionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(mut self, style: TransitionStyle) -> Self {
        self.style = style;
        self
    }

    pub fn cover(mut self, seconds: f32) -> Self {
        self.cover_duration = seconds.max(0.0);
        self
    }

    pub fn hold(mut self, seconds: f32) -> Self {
        self.hold_duration = seconds.max(0.0);
        self
    }

    pub fn reveal(mut self, seconds: f32) -> Self {
        self.reveal_duration = seconds.max(0.0);
        self
    }

    /// Set the cover hand-over fraction, clamped to `(0, 1]`.
    pub fn cover_trigger(mut self, fraction: f32) -> Self {
        self.cover_trigger = fraction.clamp(f32::EPSILON, 1.0);
        self
    }

    pub fn frame_delta(mut self, seconds: f32) -> Self {
        self.frame_delta = seconds.max(0.0);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}
