use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Event, MouseEvent, TouchEvent, Window};

use super::surface::CanvasSurface;
use crate::error::ContextError;
use crate::scene::{Canvas, InputBinding};

pub type Scene = Rc<RefCell<Canvas<CanvasSurface>>>;

/// Runs `f` on the scene if it is still alive and not mid-frame.
pub(crate) fn with_scene(
    scene: &Weak<RefCell<Canvas<CanvasSurface>>>,
    f: impl FnOnce(&mut Canvas<CanvasSurface>),
) {
    let Some(scene) = scene.upgrade() else {
        return;
    };
    match scene.try_borrow_mut() {
        Ok(mut scene) => f(&mut scene),
        Err(_) => log::warn!("scene busy; input event dropped"),
    };
}

fn first_touch(event: &TouchEvent) -> Option<(f32, f32)> {
    let touch = event.touches().get(0)?;
    Some((touch.client_x() as f32, touch.client_y() as f32))
}

/// Window listeners registered for a scene, removed together on release.
pub struct EventBindings {
    window: Window,
    listeners: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
}

impl EventBindings {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            listeners: Vec::new(),
        }
    }

    pub fn add(
        &mut self,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), ContextError> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        self.window
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|err| ContextError::Listen {
                event,
                reason: format!("{err:?}"),
            })?;
        self.listeners.push((event, closure));
        Ok(())
    }

    /// Resize, mouse and touch handlers feeding `scene`.
    pub fn bind(window: Window, scene: &Scene) -> Result<Self, ContextError> {
        let mut bindings = Self::new(window);
        if let Err(err) = bindings.bind_scene(Rc::downgrade(scene)) {
            bindings.release();
            return Err(err);
        }
        Ok(bindings)
    }

    fn bind_scene(
        &mut self,
        scene: Weak<RefCell<Canvas<CanvasSurface>>>,
    ) -> Result<(), ContextError> {
        let s = scene.clone();
        self.add("resize", move |_| with_scene(&s, Canvas::handle_resize))?;

        let s = scene.clone();
        self.add("mousemove", move |e| {
            if let Some(e) = e.dyn_ref::<MouseEvent>() {
                let (x, y) = (e.client_x() as f32, e.client_y() as f32);
                with_scene(&s, |c| c.handle_move(x, y));
            }
        })?;

        let s = scene.clone();
        self.add("mousedown", move |e| {
            if let Some(e) = e.dyn_ref::<MouseEvent>() {
                let (x, y) = (e.client_x() as f32, e.client_y() as f32);
                with_scene(&s, |c| c.handle_start(x, y));
            }
        })?;

        let s = scene.clone();
        self.add("mouseup", move |_| with_scene(&s, Canvas::handle_end))?;

        let s = scene.clone();
        self.add("touchmove", move |e| {
            if let Some((x, y)) = e.dyn_ref::<TouchEvent>().and_then(first_touch) {
                with_scene(&s, |c| c.handle_touch_move(x, y));
            }
        })?;

        let s = scene.clone();
        self.add("touchstart", move |e| {
            if let Some((x, y)) = e.dyn_ref::<TouchEvent>().and_then(first_touch) {
                with_scene(&s, |c| c.handle_touch_start(x, y));
            }
        })?;

        self.add("touchend", move |_| with_scene(&scene, Canvas::handle_end))?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl InputBinding for EventBindings {
    fn release(&mut self) {
        for (event, closure) in self.listeners.drain(..) {
            let _ = self
                .window
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        }
    }
}
