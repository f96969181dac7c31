//! # Veil
//!
//! **Full-screen page transitions for wgpu applications.**
//!
//! Veil covers the window with a flowing procedural smoke, tells the host
//! when the screen is fully hidden so it can swap content, then dissolves
//! the smoke to reveal the new page.
//!
//! ## Quick Start
//!
//! ```ignore
//! use veil::*;
//!
//! let mut driver = TransitionDriver::new(TransitionConfig::default(), move |config, viewport| {
//!     Overlay::new(&device, &queue, format, config, viewport)
//! })
//! .on_midpoint(|| swap_page())
//! .on_complete(|| done_transitioning());
//!
//! driver.set_active(true, gpu.viewport());
//!
//! // In the redraw handler, after drawing the page into `frame`:
//! if let Some(token) = driver.pending_frame() {
//!     driver.frame(token, time, gpu.viewport(), &mut frame);
//! }
//! ```
//!
//! The effect is cosmetic: a missing GPU, a shader that fails validation or
//! a panicking callback are logged and the effect is skipped. Nothing is
//! propagated to the host as a failure.
//!
//! Run the bundled demo with `cargo run`; `RUST_LOG=veil=debug` shows phase
//! changes.

mod app;
mod color;
mod error;
mod gpu;
pub mod noise;
mod page;
pub mod transition;

#[cfg(test)]
mod test_support;

pub use app::{AppConfig, Navigation, run};
pub use color::Color;
pub use error::{Result, TransitionError};
pub use gpu::{GpuContext, SurfaceFrame};
pub use page::{Page, PagePass};
pub use transition::{
    Activation, Cue, EARLY_COVER_TRIGGER, Easing, FULL_COVER_TRIGGER, FadeOverlay, FrameStatus,
    FrameToken, Overlay, OverlayRenderer, Phase, PhaseController, RenderParameters, SmokeOverlay,
    Timeline, TransitionConfig, TransitionDriver, TransitionStyle, Viewport, shade,
};

// Re-export glam math types for convenience
pub use glam::{Vec2, Vec3, Vec4};
