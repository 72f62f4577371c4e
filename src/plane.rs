use crate::error::Result;
use crate::gl::{self, Gl};
use crate::program::{Attributes, Program};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSize {
    pub width: f32,
    pub height: f32,
}

impl Default for PlaneSize {
    /// Fills clip space.
    fn default() -> Self {
        Self {
            width: 2.0,
            height: 2.0,
        }
    }
}

/// A four-vertex quad centred on the origin, drawn as two indexed triangles.
pub struct Plane<G: Gl> {
    program: Program<G>,
}

impl<G: Gl> Plane<G> {
    pub fn new(gl: &G, vertex: &str, fragment: &str, size: PlaneSize) -> Result<Self> {
        let program = Program::new(gl, vertex, fragment, &Self::attributes(size))?;
        Ok(Self { program })
    }

    pub fn attributes(size: PlaneSize) -> Attributes {
        let (w, h) = (size.width / 2.0, size.height / 2.0);
        #[rustfmt::skip]
        let position = vec![
            -w,  h, 0.0,
             w,  h, 0.0,
            -w, -h, 0.0,
             w, -h, 0.0,
        ];
        #[rustfmt::skip]
        let normal = vec![
            0.0, 0.0, 1.0,
            0.0, 0.0, 1.0,
            0.0, 0.0, 1.0,
            0.0, 0.0, 1.0,
        ];
        #[rustfmt::skip]
        let uv = vec![
            0.0, 1.0,
            1.0, 1.0,
            0.0, 0.0,
            1.0, 0.0,
        ];
        #[rustfmt::skip]
        let index = vec![
            0, 2, 1,
            1, 2, 3,
        ];
        Attributes {
            position,
            normal,
            uv,
            index: Some(index),
        }
    }

    /// Binds the buffers and draws the two triangles.
    pub fn render(&self) {
        if self.program.is_disposed() || self.program.index_count() == 0 {
            return;
        }
        self.program.render();
        self.program.gl().draw_elements(
            gl::TRIANGLES,
            self.program.index_count() as i32,
            gl::UNSIGNED_SHORT,
            0,
        );
    }
}

impl<G: Gl> std::ops::Deref for Plane<G> {
    type Target = Program<G>;

    fn deref(&self) -> &Self::Target {
        &self.program
    }
}

impl<G: Gl> std::ops::DerefMut for Plane<G> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.program
    }
}
