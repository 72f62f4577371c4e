//! Pointer, drag and scroll state, eased toward its targets once per frame.

use serde::Deserialize;

use crate::color::lerp;
use crate::context::SurfaceSize;

/// Per-frame easing factors, one per input axis.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Smoothing {
    pub pointer: f32,
    pub drag: f32,
    pub scroll: f32,
}

impl Default for Smoothing {
    fn default() -> Self {
        Self {
            pointer: 0.07,
            drag: 0.07,
            scroll: 0.06,
        }
    }
}

/// Maps client coordinates to normalized device coordinates, Y up.
pub fn to_ndc(x: f32, y: f32, size: SurfaceSize) -> [f32; 2] {
    let width = size.width.max(1) as f32;
    let height = size.height.max(1) as f32;
    [(x / width) * 2.0 - 1.0, (1.0 - y / height) * 2.0 - 1.0]
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Eased<T> {
    pub current: T,
    pub target: T,
}

impl Eased<f32> {
    fn step(&mut self, t: f32) {
        self.current = lerp(self.current, self.target, t);
    }
}

impl Eased<[f32; 2]> {
    fn step(&mut self, t: f32) {
        for i in 0..2 {
            self.current[i] = lerp(self.current[i], self.target[i], t);
        }
    }
}

/// Accumulated drag offset in client pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Drag {
    pub offset: Eased<[f32; 2]>,
    pub prev: [f32; 2],
    pub active: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Interaction {
    pub pointer: Eased<[f32; 2]>,
    pub drag: Drag,
    pub scroll: Eased<f32>,
}

impl Interaction {
    pub fn pointer_move(&mut self, x: f32, y: f32, size: SurfaceSize) {
        self.pointer.target = to_ndc(x, y, size);

        if self.drag.active {
            let [px, py] = self.drag.prev;
            self.drag.offset.target[0] += x - px;
            self.drag.offset.target[1] += y - py;
            self.drag.prev = [x, y];
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.drag.active = true;
        self.drag.prev = [x, y];
    }

    pub fn pointer_up(&mut self) {
        self.drag.active = false;
    }

    pub fn scroll_to(&mut self, y: f32) {
        self.scroll.target = y;
    }

    /// Moves every current value toward its target.
    pub fn step(&mut self, smoothing: &Smoothing) {
        self.pointer.step(smoothing.pointer);
        self.drag.offset.step(smoothing.drag);
        self.scroll.step(smoothing.scroll);
    }
}
