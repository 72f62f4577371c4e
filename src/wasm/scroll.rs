use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Window, WheelEvent};

use crate::error::ContextError;
use crate::scene::InputBinding;

/// Firefox reports wheel deltas in lines.
const LINE_HEIGHT: f64 = 40.0;

/// One normalized wheel step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    /// Running total since the scroller was created.
    pub y: f32,
    pub delta_y: f32,
}

/// Converts raw wheel events into an accumulated scroll position.
pub struct WheelScroller {
    window: Window,
    closure: Option<Closure<dyn FnMut(WheelEvent)>>,
}

impl WheelScroller {
    pub fn new(
        window: Window,
        mut on_scroll: impl FnMut(ScrollEvent) + 'static,
    ) -> Result<Self, ContextError> {
        let mut y = 0.0f32;
        let closure = Closure::wrap(Box::new(move |event: WheelEvent| {
            let mut delta = -event.delta_y();
            if event.delta_mode() == WheelEvent::DOM_DELTA_LINE {
                delta *= LINE_HEIGHT;
            }
            let delta_y = delta as f32;
            y += delta_y;
            on_scroll(ScrollEvent { y, delta_y });
        }) as Box<dyn FnMut(WheelEvent)>);

        window
            .add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref())
            .map_err(|err| ContextError::Listen {
                event: "wheel",
                reason: format!("{err:?}"),
            })?;
        Ok(Self {
            window,
            closure: Some(closure),
        })
    }
}

impl InputBinding for WheelScroller {
    fn release(&mut self) {
        if let Some(closure) = self.closure.take() {
            let _ = self
                .window
                .remove_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
        }
    }
}

/// True when the page can receive touch input.
pub fn is_touch(window: &Window) -> bool {
    window.navigator().max_touch_points() > 0
        || js_sys::Reflect::has(window, &JsValue::from_str("ontouchstart")).unwrap_or(false)
}
