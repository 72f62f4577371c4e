//! A full-screen textured quad driven by pointer, drag and scroll input.
//!
//! The core is platform neutral and runs against the [`Gl`] and [`Surface`]
//! traits; the browser bindings are only compiled for `wasm32`.

pub mod color;
pub mod context;
pub mod error;
pub mod gl;
pub mod interaction;
pub mod normalize;
pub mod plane;
pub mod program;
pub mod scene;
pub mod texture;

#[cfg(all(test, not(target_arch = "wasm32")))]
mod testing;

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use color::{Background, Rgba};
pub use context::{GpuContext, Surface, SurfaceSize};
pub use error::{ContextError, Error, ProgramError, Result, SceneError, TextureError};
pub use gl::Gl;
pub use interaction::{Interaction, Smoothing};
pub use plane::{Plane, PlaneSize};
pub use program::{Attribute, Attributes, Program, UniformKind, UniformValue};
pub use scene::{Canvas, InputBinding, SceneConfig, SceneState};
pub use texture::{Filter, Texture, TextureOptions, TextureSize, Wrap};
