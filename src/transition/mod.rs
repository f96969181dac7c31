//! Full-screen page transitions.
//!
//! A transition covers the screen, tells the host when it is safe to swap
//! content, then uncovers it again:
//!
//! ```text
//! set_active(true) ─► Cover ─► Hold ─► on_midpoint ─► Reveal ─► on_complete
//! ```
//!
//! The pieces, leaf first:
//!
//! - [`shader`]: the smoke program and its CPU reference [`shade`].
//! - [`PhaseController`]: Cover → Hold → Reveal timing for the smoke.
//! - [`Timeline`]: tween/hold/cue sequence used by the gradient fade.
//! - [`TransitionDriver`]: session lifecycle, frame tokens, callbacks.
//! - [`Overlay`]: wgpu renderers for both styles.
//!
//! # Example
//!
//! ```ignore
//! let mut driver = TransitionDriver::new(TransitionConfig::default(), |config, viewport| {
//!     Overlay::new(&device, &queue, format, config, viewport)
//! })
//! .on_midpoint(|| println!("swap the page"))
//! .on_complete(|| println!("done"));
//!
//! driver.set_active(true, gpu.viewport());
//!
//! // every redraw, after drawing the page into `frame`:
//! if let Some(token) = driver.pending_frame() {
//!     driver.frame(token, time, gpu.viewport(), &mut frame);
//! }
//! ```

mod config;
mod driver;
mod overlay;
mod phase;
pub mod shader;
mod timeline;

pub use config::{
    EARLY_COVER_TRIGGER, Easing, FULL_COVER_TRIGGER, NOMINAL_FRAME_DELTA, TransitionConfig,
    TransitionStyle,
};
pub use driver::{
    Activation, FrameStatus, FrameToken, OverlayRenderer, TransitionDriver, Viewport,
};
pub use overlay::{FadeOverlay, Overlay, SmokeOverlay};
pub use phase::{Cue, Cues, Phase, PhaseController, Sample, Tick};
pub use shader::{RenderParameters, shade};
pub use timeline::{Step, Timeline};
