use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{HtmlCanvasElement, WebGlRenderingContext, Window};

use crate::context::{Surface, SurfaceSize};
use crate::error::ContextError;

/// A canvas sized to the browser window.
#[derive(Clone)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    window: Window,
    resize: Rc<RefCell<Vec<(u32, Closure<dyn FnMut()>)>>>,
    next_listener: Rc<Cell<u32>>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, ContextError> {
        let window = web_sys::window().ok_or_else(|| ContextError::Acquire("no window".into()))?;
        Ok(Self {
            canvas,
            window,
            resize: Rc::new(RefCell::new(Vec::new())),
            next_listener: Rc::new(Cell::new(0)),
        })
    }

    /// Finds the canvas matching `selector` in the current document.
    pub fn query(selector: &str) -> Result<Self, ContextError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| ContextError::Acquire("no document".into()))?;
        let canvas = document
            .query_selector(selector)
            .ok()
            .flatten()
            .ok_or_else(|| ContextError::Acquire(format!("no element matches {selector:?}")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| ContextError::Acquire(format!("{selector:?} is not a canvas")))?;
        Self::new(canvas)
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn dimension(value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>) -> u32 {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as u32
    }
}

impl Surface for CanvasSurface {
    type Gl = WebGlRenderingContext;
    type Frame = i32;
    type Listener = u32;

    fn acquire_context(&self) -> Result<WebGlRenderingContext, ContextError> {
        self.canvas
            .get_context("webgl")
            .map_err(|err| ContextError::Acquire(format!("{err:?}")))?
            .ok_or(ContextError::Unsupported)?
            .dyn_into::<WebGlRenderingContext>()
            .map_err(|_| ContextError::Unsupported)
    }

    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.canvas.width(), self.canvas.height())
    }

    fn display_size(&self) -> SurfaceSize {
        SurfaceSize::new(
            Self::dimension(self.window.inner_width()),
            Self::dimension(self.window.inner_height()),
        )
    }

    fn set_size(&self, size: SurfaceSize) {
        self.canvas.set_width(size.width);
        self.canvas.set_height(size.height);
    }

    fn listen_resize(&self, handler: Rc<dyn Fn()>) -> Result<u32, ContextError> {
        let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        self.window
            .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
            .map_err(|err| ContextError::Listen {
                event: "resize",
                reason: format!("{err:?}"),
            })?;

        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.resize.borrow_mut().push((id, closure));
        Ok(id)
    }

    fn unlisten_resize(&self, listener: u32) {
        let mut resize = self.resize.borrow_mut();
        if let Some(pos) = resize.iter().position(|(id, _)| *id == listener) {
            let (_, closure) = resize.remove(pos);
            let _ = self
                .window
                .remove_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        }
    }

    fn request_frame(&self, tick: Box<dyn FnOnce()>) -> Option<i32> {
        // The closure frees itself after running; a cancelled one leaks.
        let callback = Closure::once_into_js(move || tick());
        match self.window.request_animation_frame(callback.unchecked_ref()) {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::error!("requestAnimationFrame failed: {err:?}");
                None
            }
        }
    }

    fn cancel_frame(&self, frame: i32) {
        let _ = self.window.cancel_animation_frame(frame);
    }
}
