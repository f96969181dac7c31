//! Demo host: a window with three showcase pages and transitions between them.
//!
//! The host owns its navigation state; the transition engine only decides
//! when that state may change. Navigation requests set a `transitioning` flag
//! that is fed to [`TransitionDriver::set_active`] every frame, the page is
//! swapped in the midpoint callback, and the flag is cleared in the completion
//! callback.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use log::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::error::Result;
use crate::gpu::GpuContext;
use crate::page::{Page, PagePass};
use crate::transition::{
    Activation, Overlay, OverlayRenderer, TransitionConfig, TransitionDriver, Viewport,
};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub transition: TransitionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Veil".to_string(),
            width: 1280,
            height: 720,
            transition: TransitionConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn transition(mut self, transition: TransitionConfig) -> Self {
        self.transition = transition;
        self
    }
}

/// Which page is shown and whether a swap is in flight.
#[derive(Debug, Default)]
pub struct Navigation {
    page: Page,
    pending: Option<Page>,
    transitioning: bool,
}

impl Navigation {
    pub fn page(&self) -> Page {
        self.page
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Ask to move to `target`. Ignored while a transition is running or when
    /// already there.
    pub fn request(&mut self, target: Page) -> bool {
        if self.transitioning || target == self.page {
            return false;
        }
        self.pending = Some(target);
        self.transitioning = true;
        true
    }

    /// Show the requested page. Safe to call more than once.
    pub fn swap(&mut self) {
        if let Some(page) = self.pending.take() {
            self.page = page;
        }
    }

    /// End the transition, making sure the requested page is shown.
    pub fn finish(&mut self) {
        self.swap();
        self.transitioning = false;
    }
}

type OverlayFactory = Box<dyn FnMut(&TransitionConfig, Viewport) -> Result<Overlay>>;

enum VeilApp {
    Pending {
        config: AppConfig,
    },
    Running {
        window: Arc<Window>,
        gpu: GpuContext,
        page_pass: PagePass,
        driver: TransitionDriver<Overlay, OverlayFactory>,
        nav: Rc<RefCell<Navigation>>,
        title: String,
        shown: Page,
        start_time: Instant,
    },
}

/// Open the demo window and run until it is closed.
pub fn run(config: AppConfig) -> std::result::Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = VeilApp::Pending { config };
    event_loop.run_app(&mut app)
}

impl ApplicationHandler for VeilApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let VeilApp::Pending { config } = self else {
            return;
        };
        let config = config.clone();

        let window_attrs = WindowAttributes::default()
            .with_title(window_title(&config.title, Page::default()))
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("could not create window: {err}");
                event_loop.exit();
                return;
            }
        };

        let gpu = match GpuContext::new(window.clone()) {
            Ok(gpu) => gpu,
            Err(err) => {
                error!("could not initialise GPU: {err}");
                event_loop.exit();
                return;
            }
        };

        let page_pass = PagePass::new(&gpu);
        let nav = Rc::new(RefCell::new(Navigation::default()));

        let device = gpu.device.clone();
        let queue = gpu.queue.clone();
        let format = gpu.format();
        let factory: OverlayFactory = Box::new(move |config: &TransitionConfig, viewport| {
            Overlay::new(&device, &queue, format, config, viewport)
        });

        let midpoint_nav = Rc::clone(&nav);
        let complete_nav = Rc::clone(&nav);
        let driver = TransitionDriver::new(config.transition.clone(), factory)
            .on_midpoint(move || midpoint_nav.borrow_mut().swap())
            .on_complete(move || complete_nav.borrow_mut().finish());

        info!(
            "veil running at {}x{} with {:?} transitions",
            gpu.width(),
            gpu.height(),
            config.transition.style
        );

        *self = VeilApp::Running {
            title: config.title,
            window,
            gpu,
            page_pass,
            driver,
            nav,
            shown: Page::default(),
            start_time: Instant::now(),
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let VeilApp::Running {
            window,
            gpu,
            page_pass,
            driver,
            nav,
            title,
            shown,
            start_time,
        } = self
        else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                gpu.resize(size.width, size.height);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let target = nav.borrow().page().next();
                navigate(driver, nav, gpu.viewport(), target);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let current = nav.borrow().page();
                let target = match code {
                    KeyCode::Escape => {
                        event_loop.exit();
                        return;
                    }
                    KeyCode::Space | KeyCode::ArrowRight => current.next(),
                    KeyCode::ArrowLeft => current.previous(),
                    KeyCode::Digit1 => Page::Home,
                    KeyCode::Digit2 => Page::Apartment,
                    KeyCode::Digit3 => Page::FloorPlan,
                    _ => return,
                };
                navigate(driver, nav, gpu.viewport(), target);
            }
            WindowEvent::RedrawRequested => {
                let time = start_time.elapsed().as_secs_f32();
                let viewport = gpu.viewport();

                // Drop the driver's flag once the host has cleared its own
                sync_active(driver, nav, viewport);

                let output = match gpu.surface.get_current_texture() {
                    Ok(output) => output,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        gpu.reconfigure();
                        window.request_redraw();
                        return;
                    }
                    Err(err) => {
                        warn!("frame skipped: {err}");
                        window.request_redraw();
                        return;
                    }
                };
                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                let mut frame = gpu.begin_frame(view);

                let page = nav.borrow().page();
                page_pass.render(gpu, &mut frame, time, page);

                if let Some(token) = driver.pending_frame() {
                    driver.frame(token, time, viewport, &mut frame);
                }

                gpu.submit(frame);
                output.present();

                let page = nav.borrow().page();
                if page != *shown {
                    *shown = page;
                    window.set_title(&window_title(title, page));
                }

                window.request_redraw();
            }
            _ => {}
        }
    }
}

/// Mirror the host's `transitioning` flag into the driver.
fn sync_active<R, F>(
    driver: &mut TransitionDriver<R, F>,
    nav: &Rc<RefCell<Navigation>>,
    viewport: Viewport,
) -> Activation
where
    R: OverlayRenderer,
    F: FnMut(&TransitionConfig, Viewport) -> Result<R>,
{
    let transitioning = nav.borrow().is_transitioning();
    driver.set_active(transitioning, viewport)
}

/// Start a transition to `target`, or swap straight away when no overlay can
/// be shown.
fn navigate<R, F>(
    driver: &mut TransitionDriver<R, F>,
    nav: &Rc<RefCell<Navigation>>,
    viewport: Viewport,
    target: Page,
) where
    R: OverlayRenderer,
    F: FnMut(&TransitionConfig, Viewport) -> Result<R>,
{
    sync_active(driver, nav, viewport);
    if !nav.borrow_mut().request(target) {
        return;
    }

    if sync_active(driver, nav, viewport) == Activation::Unavailable {
        // No overlay to hide the swap behind; navigate anyway
        nav.borrow_mut().finish();
        sync_active(driver, nav, viewport);
    }
}

fn window_title(app: &str, page: Page) -> String {
    format!("{app} | {}", page.title())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransitionError;
    use crate::transition::RenderParameters;

    const VIEW: Viewport = Viewport::new(800, 600);

    /// Renderer that draws nothing; only the driver's bookkeeping matters here.
    struct Blank;

    impl OverlayRenderer for Blank {
        type Target = ();

        fn resize(&mut self, _: Viewport) {}

        fn render(&mut self, _: &mut (), _: &RenderParameters) -> Result<()> {
            Ok(())
        }
    }

    /// A driver wired to `nav` the same way the window host wires it.
    fn host_driver(
        nav: &Rc<RefCell<Navigation>>,
        available: bool,
    ) -> TransitionDriver<Blank, impl FnMut(&TransitionConfig, Viewport) -> Result<Blank>> {
        let midpoint_nav = Rc::clone(nav);
        let complete_nav = Rc::clone(nav);
        TransitionDriver::new(TransitionConfig::default(), move |_: &TransitionConfig, _| {
            if available {
                Ok(Blank)
            } else {
                Err(TransitionError::Shader("no pipeline".into()))
            }
        })
        .on_midpoint(move || midpoint_nav.borrow_mut().swap())
        .on_complete(move || complete_nav.borrow_mut().finish())
    }

    #[test]
    fn unavailable_overlay_swaps_immediately() {
        let nav = Rc::new(RefCell::new(Navigation::default()));
        let mut driver = host_driver(&nav, false);

        navigate(&mut driver, &nav, VIEW, Page::Apartment);
        assert_eq!(nav.borrow().page(), Page::Apartment);
        assert!(!nav.borrow().is_transitioning());
        assert!(!driver.is_active());
        assert!(driver.pending_frame().is_none());

        navigate(&mut driver, &nav, VIEW, Page::FloorPlan);
        assert_eq!(nav.borrow().page(), Page::FloorPlan);
        assert!(!nav.borrow().is_transitioning());
        assert!(!driver.is_active());
    }

    #[test]
    fn navigation_swaps_at_midpoint_and_settles_on_completion() {
        let nav = Rc::new(RefCell::new(Navigation::default()));
        let mut driver = host_driver(&nav, true);

        navigate(&mut driver, &nav, VIEW, Page::FloorPlan);
        assert!(driver.is_running());
        assert_eq!(nav.borrow().page(), Page::Home);

        // Ignored while the first transition runs
        navigate(&mut driver, &nav, VIEW, Page::Apartment);

        let mut now = 0.0;
        while let Some(token) = driver.pending_frame() {
            driver.frame(token, now, VIEW, &mut ());
            now += 0.016;
            assert!(now < 10.0, "transition never finished");
        }
        sync_active(&mut driver, &nav, VIEW);

        assert_eq!(nav.borrow().page(), Page::FloorPlan);
        assert!(!nav.borrow().is_transitioning());
        assert!(!driver.is_active());
    }

    #[test]
    fn requests_are_ignored_while_transitioning() {
        let mut nav = Navigation::default();
        assert!(nav.request(Page::Apartment));
        assert!(!nav.request(Page::FloorPlan));
        nav.swap();
        assert_eq!(nav.page(), Page::Apartment);
        nav.finish();
        assert!(!nav.is_transitioning());
        assert_eq!(nav.page(), Page::Apartment);
    }

    #[test]
    fn request_for_current_page_is_a_no_op() {
        let mut nav = Navigation::default();
        assert!(!nav.request(Page::Home));
        assert!(!nav.is_transitioning());
    }

    #[test]
    fn finish_without_midpoint_still_swaps() {
        let mut nav = Navigation::default();
        nav.request(Page::FloorPlan);
        nav.finish();
        assert_eq!(nav.page(), Page::FloorPlan);
    }

    #[test]
    fn config_builder() {
        let config = AppConfig::new().title("Showcase").size(640, 480);
        assert_eq!(config.title, "Showcase");
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.transition, TransitionConfig::default());
    }
}
