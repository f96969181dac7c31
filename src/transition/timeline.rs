//! Ordered list of timed parameter interpolations.
//!
//! Drives the gradient fade overlay: each step either tweens the overlay
//! opacity, waits, or raises a [`Cue`] for the host. Steps run back to back
//! from the first timestamp the timeline sees.

use super::config::Easing;
use super::phase::{Cue, Sample, Tick};

/// One entry in a [`Timeline`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    Tween {
        from: f32,
        to: f32,
        duration: f32,
        easing: Easing,
    },
    Hold {
        duration: f32,
    },
    Cue(Cue),
}

impl Step {
    fn duration(&self) -> f32 {
        match *self {
            Step::Tween { duration, .. } | Step::Hold { duration } => duration.max(0.0),
            Step::Cue(_) => 0.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Timeline {
    steps: Vec<Step>,
    start_time: Option<f32>,
    /// Steps before this index have been fully passed.
    cursor: usize,
    value: f32,
    finished: bool,
    last_sample: Option<Sample>,
}

impl Timeline {
    pub fn new(initial: f32) -> Self {
        Self {
            steps: Vec::new(),
            start_time: None,
            cursor: 0,
            value: initial,
            finished: false,
            last_sample: None,
        }
    }

    pub fn tween(mut self, to: f32, duration: f32, easing: Easing) -> Self {
        let from = self.end_value();
        self.steps.push(Step::Tween {
            from,
            to,
            duration,
            easing,
        });
        self
    }

    pub fn hold(mut self, duration: f32) -> Self {
        self.steps.push(Step::Hold { duration });
        self
    }

    pub fn cue(mut self, cue: Cue) -> Self {
        self.steps.push(Step::Cue(cue));
        self
    }

    /// Fade in over 0.4s, swap at the midpoint, hold 0.15s, fade out over 0.4s.
    pub fn page_fade() -> Self {
        Self::new(0.0)
            .tween(1.0, 0.4, Easing::Power2InOut)
            .cue(Cue::Midpoint)
            .hold(0.15)
            .tween(0.0, 0.4, Easing::Power2InOut)
            .cue(Cue::Complete)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn total_duration(&self) -> f32 {
        self.steps.iter().map(Step::duration).sum()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance to timestamp `now` (seconds), raising every cue passed since the
    /// previous call exactly once. A non-finite `now` repeats the last sample.
    pub fn advance(&mut self, now: f32) -> Tick {
        let mut tick = Tick::default();
        if self.finished {
            return tick;
        }
        if !now.is_finite() {
            tick.sample = self.last_sample;
            return tick;
        }

        let start = *self.start_time.get_or_insert(now);
        let elapsed = (now - start).max(0.0);

        let mut offset: f32 = self.steps[..self.cursor].iter().map(Step::duration).sum();
        while let Some(step) = self.steps.get(self.cursor).copied() {
            let duration = step.duration();
            match step {
                Step::Tween {
                    from,
                    to,
                    easing,
                    ..
                } => {
                    if elapsed < offset + duration {
                        let t = (elapsed - offset) / duration;
                        self.value = from + (to - from) * easing.apply(t);
                        break;
                    }
                    self.value = to;
                }
                Step::Hold { .. } => {
                    if elapsed < offset + duration {
                        break;
                    }
                }
                Step::Cue(cue) => tick.cues.raise(cue),
            }
            offset += duration;
            self.cursor += 1;
        }

        if self.cursor == self.steps.len() {
            self.finished = true;
            self.last_sample = None;
            return tick;
        }

        self.last_sample = Some(Sample {
            progress: self.value.clamp(0.0, 1.0),
            phase_flag: 0,
            time: elapsed,
        });
        tick.sample = self.last_sample;
        tick
    }

    fn end_value(&self) -> f32 {
        self.steps
            .iter()
            .rev()
            .find_map(|step| match step {
                Step::Tween { to, .. } => Some(*to),
                _ => None,
            })
            .unwrap_or(self.value)
    }
}
