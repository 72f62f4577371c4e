//! The slice of the WebGL 1 API the renderer drives.
//!
//! Everything above this module talks to the GPU through [`Gl`]; the browser
//! implementation lives in `wasm::webgl`. Enum values are the WebGL ones, so
//! implementations forward them untouched.

use std::fmt::Debug;

pub const DEPTH_BUFFER_BIT: u32 = 0x0100;
pub const COLOR_BUFFER_BIT: u32 = 0x4000;
pub const DEPTH_TEST: u32 = 0x0B71;

pub const TRIANGLES: u32 = 0x0004;
pub const UNSIGNED_BYTE: u32 = 0x1401;
pub const UNSIGNED_SHORT: u32 = 0x1403;
pub const FLOAT: u32 = 0x1406;
pub const RGBA: u32 = 0x1908;

pub const ARRAY_BUFFER: u32 = 0x8892;
pub const ELEMENT_ARRAY_BUFFER: u32 = 0x8893;
pub const STATIC_DRAW: u32 = 0x88E4;

pub const FRAGMENT_SHADER: u32 = 0x8B30;
pub const VERTEX_SHADER: u32 = 0x8B31;

pub const TEXTURE_2D: u32 = 0x0DE1;
pub const TEXTURE0: u32 = 0x84C0;
pub const TEXTURE_MAG_FILTER: u32 = 0x2800;
pub const TEXTURE_MIN_FILTER: u32 = 0x2801;
pub const TEXTURE_WRAP_S: u32 = 0x2802;
pub const TEXTURE_WRAP_T: u32 = 0x2803;

pub const NEAREST: u32 = 0x2600;
pub const LINEAR: u32 = 0x2601;
pub const NEAREST_MIPMAP_NEAREST: u32 = 0x2700;
pub const LINEAR_MIPMAP_NEAREST: u32 = 0x2701;
pub const NEAREST_MIPMAP_LINEAR: u32 = 0x2702;
pub const LINEAR_MIPMAP_LINEAR: u32 = 0x2703;

pub const REPEAT: u32 = 0x2901;
pub const CLAMP_TO_EDGE: u32 = 0x812F;
pub const MIRRORED_REPEAT: u32 = 0x8370;

/// A rendering context. Handles are cheap clones of the underlying GPU
/// object references; cloning the context itself shares it.
pub trait Gl: Clone + 'static {
    type Shader: Debug;
    type Program: Clone + Debug;
    type Buffer: Clone + Debug;
    type Texture: Clone + Debug;
    type UniformLocation: Clone + Debug;

    fn enable(&self, capability: u32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear_depth(&self, depth: f32);
    fn clear(&self, mask: u32);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);

    fn create_shader(&self, kind: u32) -> Option<Self::Shader>;
    fn shader_source(&self, shader: &Self::Shader, source: &str);
    fn compile_shader(&self, shader: &Self::Shader);
    fn shader_compiled(&self, shader: &Self::Shader) -> bool;
    fn shader_info_log(&self, shader: &Self::Shader) -> Option<String>;
    fn delete_shader(&self, shader: &Self::Shader);

    fn create_program(&self) -> Option<Self::Program>;
    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader);
    fn link_program(&self, program: &Self::Program);
    fn program_linked(&self, program: &Self::Program) -> bool;
    fn program_info_log(&self, program: &Self::Program) -> Option<String>;
    fn use_program(&self, program: Option<&Self::Program>);
    fn delete_program(&self, program: &Self::Program);

    /// Negative when the program has no active attribute of that name.
    fn attrib_location(&self, program: &Self::Program, name: &str) -> i32;
    fn uniform_location(&self, program: &Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    fn create_buffer(&self) -> Option<Self::Buffer>;
    fn bind_buffer(&self, target: u32, buffer: Option<&Self::Buffer>);
    fn buffer_data_f32(&self, target: u32, data: &[f32], usage: u32);
    fn buffer_data_u16(&self, target: u32, data: &[u16], usage: u32);
    fn buffer_sub_data_f32(&self, target: u32, offset: i32, data: &[f32]);
    fn delete_buffer(&self, buffer: &Self::Buffer);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn vertex_attrib_pointer(&self, index: u32, size: i32, kind: u32, normalized: bool);
    fn draw_elements(&self, mode: u32, count: i32, kind: u32, offset: i32);

    fn uniform1f(&self, location: Option<&Self::UniformLocation>, value: f32);
    fn uniform1i(&self, location: Option<&Self::UniformLocation>, value: i32);
    fn uniform2fv(&self, location: Option<&Self::UniformLocation>, value: &[f32; 2]);
    fn uniform_matrix4fv(&self, location: Option<&Self::UniformLocation>, value: &[f32; 16]);

    fn create_texture(&self) -> Option<Self::Texture>;
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, target: u32, texture: Option<&Self::Texture>);
    /// Uploads tightly packed RGBA8 pixels to mip level 0 of the bound texture.
    fn tex_image_rgba(&self, width: u32, height: u32, pixels: &[u8]) -> Result<(), String>;
    fn generate_mipmap(&self, target: u32);
    fn tex_parameteri(&self, target: u32, pname: u32, value: u32);
    fn delete_texture(&self, texture: &Self::Texture);
}
