//! Rendering surface ownership, viewport sync, background colour and the
//! frame loop.

use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::Rc;

use crate::color::{clamp, hex_to_rgb, Background, Rgba};
use crate::error::{ContextError, Result};
use crate::gl::{self, Gl};

/// Pixel dimensions of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Something that can be drawn into: yields a GPU context, reports and
/// adopts pixel dimensions, and schedules work on display refresh.
pub trait Surface: Clone + 'static {
    type Gl: Gl;
    /// Pending refresh request.
    type Frame: Copy + Debug;
    /// Registered resize handler.
    type Listener;

    fn acquire_context(&self) -> Result<Self::Gl, ContextError>;
    /// Current drawing-buffer size.
    fn size(&self) -> SurfaceSize;
    /// Size the surface should occupy (the window's inner size in a browser).
    fn display_size(&self) -> SurfaceSize;
    fn set_size(&self, size: SurfaceSize);

    fn listen_resize(&self, handler: Rc<dyn Fn()>) -> Result<Self::Listener, ContextError>;
    fn unlisten_resize(&self, listener: Self::Listener);

    /// Runs `tick` once on the next display refresh. `None` if the request
    /// could not be made.
    fn request_frame(&self, tick: Box<dyn FnOnce()>) -> Option<Self::Frame>;
    fn cancel_frame(&self, frame: Self::Frame);
}

struct FrameLoop<S: Surface> {
    surface: S,
    gl: S::Gl,
    background: Rc<Cell<Rgba>>,
    callback: RefCell<Box<dyn FnMut()>>,
    pending: Cell<Option<S::Frame>>,
    cancelled: Cell<bool>,
}

impl<S: Surface> FrameLoop<S> {
    fn schedule(self: &Rc<Self>) {
        if self.cancelled.get() {
            return;
        }
        let next = Rc::clone(self);
        match self.surface.request_frame(Box::new(move || next.tick())) {
            Some(frame) => self.pending.set(Some(frame)),
            None => log::error!("animation frame request failed; loop stopped"),
        }
    }

    fn tick(self: &Rc<Self>) {
        self.pending.set(None);
        if self.cancelled.get() {
            return;
        }
        clear(&self.gl, self.background.get());
        (self.callback.borrow_mut())();
        self.schedule();
    }

    fn cancel(&self) {
        self.cancelled.set(true);
        if let Some(frame) = self.pending.take() {
            self.surface.cancel_frame(frame);
        }
    }
}

fn clear<G: Gl>(gl: &G, [r, g, b, a]: Rgba) {
    gl.clear_color(r, g, b, a);
    gl.clear_depth(1.0);
    gl.clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
}

fn sync_viewport<S: Surface>(surface: &S, gl: &S::Gl) {
    let size = surface.display_size();
    surface.set_size(size);
    gl.viewport(0, 0, size.width as i32, size.height as i32);
    log::debug!("viewport resized to {}x{}", size.width, size.height);
}

/// The one rendering context of a surface.
pub struct GpuContext<S: Surface> {
    surface: S,
    gl: S::Gl,
    background: Rc<Cell<Rgba>>,
    resize_listener: Option<S::Listener>,
    animation: Option<Rc<FrameLoop<S>>>,
}

impl<S: Surface> GpuContext<S> {
    /// Acquires the context, enables depth testing, clears to the default
    /// background, binds the resize handler and syncs the viewport.
    pub fn setup(surface: S) -> Result<Self> {
        let gl = surface.acquire_context().map_err(|err| {
            log::error!("{err}");
            err
        })?;
        gl.enable(gl::DEPTH_TEST);

        let background = Rc::new(Cell::new([1.0, 1.0, 1.0, 1.0]));
        clear(&gl, background.get());

        let handler: Rc<dyn Fn()> = {
            let surface = surface.clone();
            let gl = gl.clone();
            Rc::new(move || sync_viewport(&surface, &gl))
        };
        let resize_listener = Some(surface.listen_resize(handler)?);

        let ctx = Self {
            surface,
            gl,
            background,
            resize_listener,
            animation: None,
        };
        ctx.resize();
        log::info!("rendering context ready ({}x{})", ctx.size().width, ctx.size().height);
        Ok(ctx)
    }

    pub fn gl(&self) -> &S::Gl {
        &self.gl
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Matches the surface to its display size and the viewport to the surface.
    pub fn resize(&self) {
        sync_viewport(&self.surface, &self.gl);
    }

    pub fn size(&self) -> SurfaceSize {
        self.surface.size()
    }

    pub fn background(&self) -> Rgba {
        self.background.get()
    }

    /// Hex colours keep the current alpha; malformed hex is ignored.
    pub fn set_background(&self, color: impl Into<Background>) {
        let next = match color.into() {
            Background::Hex(hex) => match hex_to_rgb(&hex) {
                Some([r, g, b]) => [r, g, b, self.background.get()[3]],
                None => {
                    log::debug!("ignoring malformed background colour {hex:?}");
                    return;
                }
            },
            Background::Rgba(rgba) => rgba.map(|c| clamp(c, 0.0, 1.0)),
        };
        self.background.set(next);
        let [r, g, b, a] = next;
        self.gl.clear_color(r, g, b, a);
        self.gl.clear(gl::COLOR_BUFFER_BIT);
    }

    /// Starts the frame loop: every refresh clears colour and depth, then
    /// calls `callback`. Replaces any loop already running.
    pub fn animation(&mut self, callback: impl FnMut() + 'static) {
        self.cancel_animation();
        let frame_loop = Rc::new(FrameLoop {
            surface: self.surface.clone(),
            gl: self.gl.clone(),
            background: Rc::clone(&self.background),
            callback: RefCell::new(Box::new(callback)),
            pending: Cell::new(None),
            cancelled: Cell::new(false),
        });
        frame_loop.schedule();
        self.animation = Some(frame_loop);
    }

    pub fn cancel_animation(&mut self) {
        if let Some(frame_loop) = self.animation.take() {
            frame_loop.cancel();
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Unbinds the resize handler and stops the loop. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if let Some(listener) = self.resize_listener.take() {
            self.surface.unlisten_resize(listener);
        }
        self.cancel_animation();
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::testing::{Call, ManualSurface};

    fn setup() -> (ManualSurface, GpuContext<ManualSurface>) {
        let surface = ManualSurface::new(SurfaceSize::new(300, 150), SurfaceSize::new(800, 600));
        let ctx = GpuContext::setup(surface.clone()).unwrap();
        (surface, ctx)
    }

    #[test]
    fn setup_fails_without_context() {
        let surface = ManualSurface::new(SurfaceSize::new(1, 1), SurfaceSize::new(1, 1));
        surface.set_supported(false);
        assert!(matches!(
            GpuContext::setup(surface),
            Err(crate::Error::Context(ContextError::Unsupported))
        ));
    }

    #[test]
    fn setup_syncs_viewport_and_enables_depth() {
        let (surface, ctx) = setup();
        assert_eq!(ctx.size(), SurfaceSize::new(800, 600));
        let calls = surface.gl().calls();
        assert!(calls.contains(&Call::Enable(gl::DEPTH_TEST)));
        assert!(calls.contains(&Call::Viewport(800, 600)));
        assert_eq!(surface.resize_listener_count(), 1);
    }

    #[test]
    fn resize_event_follows_display() {
        let (surface, ctx) = setup();
        surface.set_display_size(SurfaceSize::new(1024, 512));
        surface.fire_resize();
        assert_eq!(ctx.size(), SurfaceSize::new(1024, 512));
        assert_eq!(surface.gl().calls().last(), Some(&Call::Viewport(1024, 512)));
        assert_eq!(ctx.size().aspect(), 2.0);
    }

    #[test]
    fn hex_background_keeps_alpha() {
        let (_surface, ctx) = setup();
        ctx.set_background([0.5, 0.5, 0.5, 0.25]);
        ctx.set_background("#012");
        assert_eq!(ctx.background(), [0.0, 1.0 / 15.0, 2.0 / 15.0, 0.25]);
    }

    #[test]
    fn malformed_hex_leaves_background() {
        let (_surface, ctx) = setup();
        ctx.set_background("#ff0000");
        ctx.set_background("#zz0000");
        ctx.set_background("ff0000");
        assert_eq!(ctx.background(), [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn rgba_background_is_clamped() {
        let (_surface, ctx) = setup();
        ctx.set_background([2.0, -1.0, 0.5, 1.5]);
        assert_eq!(ctx.background(), [1.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn animation_clears_then_calls_back_each_tick() {
        let (surface, mut ctx) = setup();
        let ticks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&ticks);
        ctx.animation(move || counter.set(counter.get() + 1));

        assert_eq!(ticks.get(), 0);
        surface.gl().take_calls();
        surface.run_frame();
        assert_eq!(ticks.get(), 1);
        let calls = surface.gl().take_calls();
        assert!(calls.contains(&Call::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT)));

        surface.run_frame();
        surface.run_frame();
        assert_eq!(ticks.get(), 3);
        assert_eq!(surface.pending_frames(), 1);
    }

    #[test]
    fn dispose_is_idempotent() {
        let (surface, mut ctx) = setup();
        let ticks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&ticks);
        ctx.animation(move || counter.set(counter.get() + 1));
        surface.run_frame();

        ctx.dispose();
        ctx.dispose();
        assert_eq!(surface.resize_listener_count(), 0);
        assert_eq!(surface.cancelled_frames(), 1);
        assert!(!ctx.is_animating());

        surface.run_frame();
        assert_eq!(ticks.get(), 1);
    }

    #[test]
    fn dispose_inside_callback_stops_rescheduling() {
        let (surface, ctx) = setup();
        let ctx = Rc::new(RefCell::new(ctx));
        let weak = Rc::downgrade(&ctx);
        ctx.borrow_mut().animation(move || {
            if let Some(ctx) = weak.upgrade() {
                ctx.borrow_mut().dispose();
            }
        });
        surface.run_frame();
        assert_eq!(surface.pending_frames(), 0);
    }
}
