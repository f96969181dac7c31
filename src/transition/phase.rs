//! Cover → Hold → Reveal state machine for the smoke transition.

use log::debug;

use super::config::{Easing, TransitionConfig};

/// Stage of a running smoke transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Smoke fills the screen (progress 0.0 → 1.0).
    Cover,
    /// Screen fully covered; the host may swap content.
    Hold,
    /// Smoke dissolves (progress 1.0 → 0.0).
    Reveal,
    /// Nothing left to draw.
    Done,
}

/// Host notification produced by a sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// The screen is hidden; swap content now.
    Midpoint,
    /// The overlay is fully transparent again.
    Complete,
}

/// Cues raised during a single tick. Midpoint always precedes completion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cues {
    pub midpoint: bool,
    pub complete: bool,
}

impl Cues {
    pub fn raise(&mut self, cue: Cue) {
        match cue {
            Cue::Midpoint => self.midpoint = true,
            Cue::Complete => self.complete = true,
        }
    }
}

/// Values to upload for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Eased coverage amount, always within `[0, 1]`.
    pub progress: f32,
    /// 0 while covering or holding, 1 while revealing.
    pub phase_flag: u32,
    /// Flow clock for the noise field.
    pub time: f32,
}

/// Result of advancing a sequence to a new timestamp.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tick {
    /// `None` once the sequence has finished; nothing should be drawn.
    pub sample: Option<Sample>,
    pub cues: Cues,
}

/// Drives the smoke through its phases from frame timestamps.
///
/// The first call to [`tick`](Self::tick) anchors the clock; each phase change
/// re-anchors it at the timestamp of the frame that made the change. A
/// non-finite timestamp is never used as an anchor: such a frame repeats the
/// previous sample and leaves the machine where it was.
#[derive(Debug, Clone)]
pub struct PhaseController {
    cover_duration: f32,
    hold_duration: f32,
    reveal_duration: f32,
    cover_trigger: f32,
    frame_delta: f32,

    phase: Phase,
    start_time: Option<f32>,
    total_elapsed: f32,
    has_fired_midpoint: bool,
    last_sample: Option<Sample>,
}

impl PhaseController {
    pub fn new(config: &TransitionConfig) -> Self {
        Self {
            cover_duration: config.cover_duration,
            hold_duration: config.hold_duration,
            reveal_duration: config.reveal_duration,
            cover_trigger: config.cover_trigger,
            frame_delta: config.frame_delta,
            phase: Phase::Cover,
            start_time: None,
            total_elapsed: 0.0,
            has_fired_midpoint: false,
            last_sample: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn total_elapsed(&self) -> f32 {
        self.total_elapsed
    }

    /// Advance to timestamp `now` (seconds).
    pub fn tick(&mut self, now: f32) -> Tick {
        let mut tick = Tick::default();
        if !now.is_finite() {
            tick.sample = self.last_sample;
            return tick;
        }

        let start = *self.start_time.get_or_insert(now);
        // Clocks running backwards collapse to zero
        let elapsed = (now - start).max(0.0);

        let shape = match self.phase {
            Phase::Done => return tick,
            Phase::Cover => {
                let raw = ratio(elapsed, self.cover_duration);
                if raw >= self.cover_trigger {
                    self.enter(Phase::Hold, now);
                }
                Some((Easing::Smoothstep.apply(raw), 0))
            }
            Phase::Hold => {
                if elapsed >= self.hold_duration {
                    if !self.has_fired_midpoint {
                        self.has_fired_midpoint = true;
                        tick.cues.raise(Cue::Midpoint);
                    }
                    self.enter(Phase::Reveal, now);
                }
                Some((1.0, 0))
            }
            Phase::Reveal => {
                let raw = ratio(elapsed, self.reveal_duration);
                if raw >= 1.0 {
                    self.enter(Phase::Done, now);
                    tick.cues.raise(Cue::Complete);
                    None
                } else {
                    Some((1.0 - Easing::Smoothstep.apply(raw), 1))
                }
            }
        };
        self.total_elapsed += self.frame_delta;
        let time = self.total_elapsed;

        self.last_sample = shape.map(|(progress, phase_flag): (f32, u32)| Sample {
            progress: progress.clamp(0.0, 1.0),
            phase_flag,
            time,
        });
        tick.sample = self.last_sample;
        tick
    }

    fn enter(&mut self, phase: Phase, now: f32) {
        debug!("transition phase {:?} -> {:?} at {:.3}s", self.phase, phase, now);
        self.phase = phase;
        self.start_time = Some(now);
    }
}

/// `elapsed / duration` clamped to `[0, 1]`; a zero duration is already complete.
fn ratio(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::XorShift;
    use crate::transition::config::{FULL_COVER_TRIGGER, NOMINAL_FRAME_DELTA};

    const TICK: f32 = 0.016;

    /// Runs until done, returning (midpoint time, completion time, samples).
    fn run_to_end(config: &TransitionConfig) -> (Option<f32>, Option<f32>, Vec<Sample>) {
        let mut controller = PhaseController::new(config);
        let mut midpoint = None;
        let mut complete = None;
        let mut samples = Vec::new();
        for i in 0..10_000 {
            let now = i as f32 * TICK;
            let tick = controller.tick(now);
            if tick.cues.midpoint {
                assert!(midpoint.is_none(), "midpoint fired twice");
                midpoint = Some(now);
            }
            if tick.cues.complete {
                complete = Some(now);
                assert!(tick.sample.is_none());
                break;
            }
            samples.extend(tick.sample);
        }
        (midpoint, complete, samples)
    }

    fn scenario_config() -> TransitionConfig {
        TransitionConfig::new().cover(1.5).hold(0.1).reveal(1.5)
    }

    #[test]
    fn early_trigger_scenario_timing() {
        let (midpoint, complete, _) = run_to_end(&scenario_config());
        let midpoint = midpoint.expect("midpoint never fired");
        let complete = complete.expect("never completed");

        assert!((0.75..=1.6).contains(&midpoint), "midpoint at {midpoint}");
        assert!((1.6..=3.3).contains(&complete), "complete at {complete}");
        assert!(midpoint < complete);
    }

    #[test]
    fn full_trigger_scenario_timing() {
        let config = scenario_config().cover_trigger(FULL_COVER_TRIGGER);
        let (midpoint, complete, _) = run_to_end(&config);
        let midpoint = midpoint.expect("midpoint never fired");
        let complete = complete.expect("never completed");

        assert!(midpoint >= 1.6 - TICK && midpoint <= 1.6 + 2.0 * TICK, "midpoint at {midpoint}");
        assert!((1.6..=3.3).contains(&complete), "complete at {complete}");
    }

    #[test]
    fn phases_only_move_forward() {
        let mut controller = PhaseController::new(&scenario_config());
        let order = |p: Phase| match p {
            Phase::Cover => 0,
            Phase::Hold => 1,
            Phase::Reveal => 2,
            Phase::Done => 3,
        };
        let mut last = 0;
        for i in 0..1000 {
            controller.tick(i as f32 * TICK);
            let now = order(controller.phase());
            assert!(now >= last);
            last = now;
        }
        assert!(controller.is_done());
    }

    #[test]
    fn cover_progress_rises_and_reveal_falls() {
        let config = scenario_config().cover_trigger(FULL_COVER_TRIGGER);
        let (_, _, samples) = run_to_end(&config);

        let cover: Vec<_> = samples.iter().filter(|s| s.phase_flag == 0).collect();
        let reveal: Vec<_> = samples.iter().filter(|s| s.phase_flag == 1).collect();
        assert!(cover.windows(2).all(|w| w[1].progress >= w[0].progress));
        assert!(reveal.windows(2).all(|w| w[1].progress <= w[0].progress));
        assert_eq!(cover.first().map(|s| s.progress), Some(0.0));
        assert!(reveal.last().is_some_and(|s| s.progress < 0.01));
    }

    #[test]
    fn hold_is_fully_covered() {
        let mut controller = PhaseController::new(&scenario_config());
        let mut now = 0.0;
        while controller.phase() != Phase::Hold {
            controller.tick(now);
            now += TICK;
        }
        let tick = controller.tick(now);
        let sample = tick.sample.expect("hold draws");
        assert_eq!(sample.progress, 1.0);
        assert_eq!(sample.phase_flag, 0);
    }

    #[test]
    fn flow_clock_never_resets() {
        let (_, _, samples) = run_to_end(&scenario_config());
        assert!(samples.windows(2).all(|w| w[1].time > w[0].time));
        assert!((samples[0].time - NOMINAL_FRAME_DELTA).abs() < 1e-6);
    }

    #[test]
    fn progress_is_clamped_for_random_timestamps() {
        let mut rng = XorShift::new(99);
        for _ in 0..200 {
            let mut controller = PhaseController::new(&scenario_config());
            for _ in 0..60 {
                // Jittery, sometimes backwards, sometimes huge jumps
                let now = rng.range(-5.0, 50.0);
                if let Some(sample) = controller.tick(now).sample {
                    assert!((0.0..=1.0).contains(&sample.progress), "{sample:?}");
                }
            }
        }
    }

    #[test]
    fn nan_timestamp_does_not_escape_clamp() {
        let mut controller = PhaseController::new(&scenario_config());
        controller.tick(0.0);
        let sample = controller.tick(f32::NAN).sample.expect("still covering");
        assert!((0.0..=1.0).contains(&sample.progress));
    }

    #[test]
    fn nan_first_frame_is_skipped_and_session_completes() {
        let mut controller = PhaseController::new(&scenario_config());
        assert_eq!(controller.tick(f32::NAN), Tick::default());
        assert_eq!(controller.total_elapsed(), 0.0);

        let mut completed = false;
        for i in 0..1000 {
            if controller.tick(i as f32 * TICK).cues.complete {
                completed = true;
                break;
            }
        }
        assert!(completed);
        assert!(controller.is_done());
    }

    #[test]
    fn nan_at_phase_boundary_does_not_stall() {
        let config = TransitionConfig::new().cover(0.1).hold(0.0).reveal(0.5);
        let mut controller = PhaseController::new(&config);
        controller.tick(0.0);
        controller.tick(0.2);
        assert_eq!(controller.phase(), Phase::Hold);

        // Would have moved to Reveal; a bad timestamp leaves it in Hold
        let held = controller.tick(f32::NAN);
        assert_eq!(controller.phase(), Phase::Hold);
        assert!(!held.cues.midpoint);
        assert_eq!(held.sample.map(|s| s.progress), Some(1.0));

        let mut cues = Vec::new();
        for i in 1..=1000 {
            let tick = controller.tick(i as f32);
            if tick.cues.midpoint {
                cues.push(Cue::Midpoint);
            }
            if tick.cues.complete {
                cues.push(Cue::Complete);
                break;
            }
        }
        assert_eq!(cues, vec![Cue::Midpoint, Cue::Complete]);
        assert!(controller.is_done());
    }

    #[test]
    fn zero_durations_still_fire_both_cues_in_order() {
        let config = TransitionConfig::new().cover(0.0).hold(0.0).reveal(0.0);
        let mut controller = PhaseController::new(&config);
        let mut cues = Vec::new();
        for i in 0..10 {
            let tick = controller.tick(i as f32 * TICK);
            if tick.cues.midpoint {
                cues.push(Cue::Midpoint);
            }
            if tick.cues.complete {
                cues.push(Cue::Complete);
            }
        }
        assert_eq!(cues, vec![Cue::Midpoint, Cue::Complete]);
    }

    #[test]
    fn done_controller_is_inert() {
        let config = TransitionConfig::new().cover(0.0).hold(0.0).reveal(0.0);
        let mut controller = PhaseController::new(&config);
        for i in 0..10 {
            controller.tick(i as f32);
        }
        assert!(controller.is_done());
        let elapsed = controller.total_elapsed();
        assert_eq!(controller.tick(100.0), Tick::default());
        assert_eq!(controller.total_elapsed(), elapsed);
    }
}
