//! Per-frame driver for transition sessions.
//!
//! The driver owns at most one session at a time. A session bundles the
//! sequence (smoke phases or fade timeline) with the overlay renderer that was
//! built for it; dropping the session releases the renderer's GPU resources.
//!
//! Frames are requested through [`FrameToken`]s. The host asks for the pending
//! token ([`TransitionDriver::pending_frame`]) whenever it is about to draw
//! and hands it back with the frame. Tokens from a cancelled or superseded
//! session, or tokens already consumed, are dropped as [`FrameStatus::Stale`].

use std::panic::{AssertUnwindSafe, catch_unwind};

use log::{debug, info, trace, warn};

use crate::error::Result;

use super::config::{TransitionConfig, TransitionStyle};
use super::phase::{Cues, PhaseController, Tick};
use super::shader::RenderParameters;
use super::timeline::Timeline;

/// Drawing surface size in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn resolution(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

/// Something that can draw a transition overlay.
///
/// `Target` is whatever the host hands over each frame to draw into.
pub trait OverlayRenderer {
    type Target;

    /// The drawing surface changed size.
    fn resize(&mut self, viewport: Viewport);

    /// Draw one frame of the overlay.
    fn render(&mut self, target: &mut Self::Target, params: &RenderParameters) -> Result<()>;
}

/// Handle for one scheduled frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameToken {
    generation: u64,
    serial: u64,
}

/// Outcome of [`TransitionDriver::set_active`] and [`TransitionDriver::restart`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    /// A new session is running.
    Started,
    /// Already active; nothing changed.
    AlreadyActive,
    /// Deactivated (or was not active).
    Stopped,
    /// The overlay could not be built. No effect will be shown and no
    /// callbacks will fire; the host should swap content on its own.
    Unavailable,
}

/// Outcome of [`TransitionDriver::frame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    /// The overlay was drawn and another frame is scheduled.
    Rendered,
    /// The overlay failed to draw this frame; timing still advanced.
    Skipped,
    /// The session finished; nothing was drawn and nothing is scheduled.
    Completed,
    /// The token did not belong to the current schedule and was ignored.
    Stale,
}

type Callback = Box<dyn FnMut()>;

/// Timing source of a session.
enum Sequence {
    Smoke(PhaseController),
    Fade(Timeline),
}

impl Sequence {
    fn new(config: &TransitionConfig) -> Self {
        match config.style {
            TransitionStyle::Smoke => Sequence::Smoke(PhaseController::new(config)),
            TransitionStyle::Fade => Sequence::Fade(Timeline::page_fade()),
        }
    }

    fn tick(&mut self, now: f32) -> Tick {
        match self {
            Sequence::Smoke(controller) => controller.tick(now),
            Sequence::Fade(timeline) => timeline.advance(now),
        }
    }
}

struct Session<R> {
    sequence: Sequence,
    renderer: R,
    viewport: Viewport,
}

/// Runs transition sessions and notifies the host at the midpoint and at
/// completion.
///
/// `factory` builds a fresh renderer for every session. It is the only place
/// a session can fail; the failure is logged and the effect skipped.
pub struct TransitionDriver<R, F> {
    config: TransitionConfig,
    factory: F,
    on_midpoint: Option<Callback>,
    on_complete: Option<Callback>,

    active: bool,
    generation: u64,
    serial: u64,
    pending: Option<FrameToken>,
    session: Option<Session<R>>,
}

impl<R, F> TransitionDriver<R, F>
where
    R: OverlayRenderer,
    F: FnMut(&TransitionConfig, Viewport) -> Result<R>,
{
    pub fn new(config: TransitionConfig, factory: F) -> Self {
        Self {
            config,
            factory,
            on_midpoint: None,
            on_complete: None,
            active: false,
            generation: 0,
            serial: 0,
            pending: None,
            session: None,
        }
    }

    /// Called once per session when the screen is fully covered.
    pub fn on_midpoint(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_midpoint = Some(Box::new(callback));
        self
    }

    /// Called once per session when the overlay has fully cleared.
    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// The host's active flag.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether a session is currently running.
    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Level-triggered activation.
    ///
    /// `true` while already active is ignored, even if the previous session
    /// has completed; the host must drop the flag first. `false` tears the
    /// running session down without firing callbacks that have not fired yet.
    pub fn set_active(&mut self, active: bool, viewport: Viewport) -> Activation {
        match (self.active, active) {
            (true, true) => Activation::AlreadyActive,
            (false, false) => Activation::Stopped,
            (true, false) => {
                self.active = false;
                self.teardown("deactivated");
                Activation::Stopped
            }
            (false, true) => {
                self.active = true;
                self.start(viewport)
            }
        }
    }

    /// Tear down whatever is running and start a fresh session.
    pub fn restart(&mut self, viewport: Viewport) -> Activation {
        self.teardown("restarted");
        self.active = true;
        self.start(viewport)
    }

    /// Token for the next frame, if one is scheduled.
    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Advance and draw one frame at timestamp `now` (seconds).
    pub fn frame(
        &mut self,
        token: FrameToken,
        now: f32,
        viewport: Viewport,
        target: &mut R::Target,
    ) -> FrameStatus {
        if self.pending != Some(token) {
            trace!("dropping stale transition frame {token:?}");
            return FrameStatus::Stale;
        }
        self.pending = None;

        let Some(session) = self.session.as_mut() else {
            return FrameStatus::Stale;
        };

        if session.viewport != viewport {
            debug!(
                "transition viewport {}x{} -> {}x{}",
                session.viewport.width, session.viewport.height, viewport.width, viewport.height
            );
            session.viewport = viewport;
            session.renderer.resize(viewport);
        }

        let Tick { sample, cues } = session.sequence.tick(now);

        let mut status = FrameStatus::Rendered;
        if let Some(sample) = sample {
            let resolution = viewport.resolution();
            let params = RenderParameters::from_sample(sample, resolution, self.config.color);
            if let Err(err) = session.renderer.render(target, &params) {
                warn!("transition frame not drawn: {err}");
                status = FrameStatus::Skipped;
            }
        }

        self.dispatch(cues);

        if cues.complete {
            self.teardown("completed");
            return FrameStatus::Completed;
        }

        self.schedule();
        status
    }

    fn start(&mut self, viewport: Viewport) -> Activation {
        self.generation += 1;
        match (self.factory)(&self.config, viewport) {
            Ok(renderer) => {
                info!("transition started ({:?})", self.config.style);
                self.session = Some(Session {
                    sequence: Sequence::new(&self.config),
                    renderer,
                    viewport,
                });
                self.schedule();
                Activation::Started
            }
            Err(err) => {
                warn!("transition unavailable, skipping effect: {err}");
                Activation::Unavailable
            }
        }
    }

    fn schedule(&mut self) {
        self.serial += 1;
        self.pending = Some(FrameToken {
            generation: self.generation,
            serial: self.serial,
        });
    }

    fn teardown(&mut self, reason: &str) {
        self.pending = None;
        self.generation += 1;
        if self.session.take().is_some() {
            info!("transition {reason}");
        }
    }

    fn dispatch(&mut self, cues: Cues) {
        if cues.midpoint {
            invoke(&mut self.on_midpoint, "midpoint");
        }
        if cues.complete {
            invoke(&mut self.on_complete, "complete");
        }
    }
}

/// Run a host callback, absorbing panics so the transition can finish.
fn invoke(callback: &mut Option<Callback>, name: &str) {
    if let Some(callback) = callback {
        if catch_unwind(AssertUnwindSafe(|| callback())).is_err() {
            warn!("transition {name} callback panicked; continuing");
        }
    }
}
