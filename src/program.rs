//! Compiled GPU program with its vertex/index buffers and uniform registry.

use std::collections::HashMap;

use crate::error::{ProgramError, Result};
use crate::gl::{self, Gl};
use crate::texture::Texture;

/// Per-vertex streams every program is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Position,
    Normal,
    Uv,
}

impl Attribute {
    pub const ALL: [Attribute; 3] = [Attribute::Position, Attribute::Normal, Attribute::Uv];

    /// Name of the shader input fed by this stream.
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Position => "position",
            Attribute::Normal => "normal",
            Attribute::Uv => "uv",
        }
    }

    pub fn components(self) -> i32 {
        match self {
            Attribute::Uv => 2,
            Attribute::Position | Attribute::Normal => 3,
        }
    }
}

/// Vertex data handed to [`Program::new`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    pub position: Vec<f32>,
    pub normal: Vec<f32>,
    pub uv: Vec<f32>,
    pub index: Option<Vec<u16>>,
}

impl Attributes {
    pub fn data(&self, attribute: Attribute) -> &[f32] {
        match attribute {
            Attribute::Position => &self.position,
            Attribute::Normal => &self.normal,
            Attribute::Uv => &self.uv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Int,
    Vec2,
    Mat4,
    Sampler,
}

impl UniformKind {
    fn name(self) -> &'static str {
        match self {
            UniformKind::Float => "float",
            UniformKind::Int => "int",
            UniformKind::Vec2 => "vec2",
            UniformKind::Mat4 => "mat4",
            UniformKind::Sampler => "sampler",
        }
    }
}

/// A value for one uniform; `T` is the backend's texture handle.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue<T> {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Mat4([f32; 16]),
    Sampler(T),
}

impl<T> UniformValue<T> {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Mat4(_) => UniformKind::Mat4,
            UniformValue::Sampler(_) => UniformKind::Sampler,
        }
    }
}

impl<T> From<f32> for UniformValue<T> {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl<T> From<i32> for UniformValue<T> {
    fn from(value: i32) -> Self {
        UniformValue::Int(value)
    }
}

impl<T> From<bool> for UniformValue<T> {
    fn from(value: bool) -> Self {
        UniformValue::Int(value as i32)
    }
}

impl<T> From<[f32; 2]> for UniformValue<T> {
    fn from(value: [f32; 2]) -> Self {
        UniformValue::Vec2(value)
    }
}

impl<T> From<[f32; 16]> for UniformValue<T> {
    fn from(value: [f32; 16]) -> Self {
        UniformValue::Mat4(value)
    }
}

// Last value pushed to the GPU, or the link-time zero.
enum UniformState<T> {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Mat4([f32; 16]),
    Sampler { texture: T, unit: u32 },
}

struct Uniform<G: Gl> {
    location: Option<G::UniformLocation>,
    state: UniformState<G::Texture>,
}

impl<G: Gl> Uniform<G> {
    fn apply(&self, gl: &G) {
        let location = self.location.as_ref();
        match &self.state {
            UniformState::Float(v) => gl.uniform1f(location, *v),
            UniformState::Int(v) => gl.uniform1i(location, *v),
            UniformState::Vec2(v) => gl.uniform2fv(location, v),
            UniformState::Mat4(v) => gl.uniform_matrix4fv(location, v),
            UniformState::Sampler { texture, unit } => {
                gl.active_texture(gl::TEXTURE0 + unit);
                gl.bind_texture(gl::TEXTURE_2D, Some(texture));
                gl.uniform1i(location, *unit as i32);
            }
        }
    }
}

struct VertexBuffer<G: Gl> {
    attribute: Attribute,
    buffer: G::Buffer,
    location: Option<u32>,
}

/// A linked vertex/fragment pair, the buffers feeding it and its uniforms.
pub struct Program<G: Gl> {
    gl: G,
    program: Option<G::Program>,
    buffers: Vec<VertexBuffer<G>>,
    index: Option<G::Buffer>,
    index_count: usize,
    vertex_count: usize,
    uniforms: HashMap<String, Uniform<G>>,
    texture_unit: u32,
}

fn compile<G: Gl>(gl: &G, kind: u32, source: &str) -> Result<G::Shader, ProgramError> {
    let stage = if kind == gl::VERTEX_SHADER { "vertex" } else { "fragment" };
    let shader = gl
        .create_shader(kind)
        .ok_or(ProgramError::CreateShader(stage))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if !gl.shader_compiled(&shader) {
        let log = gl.shader_info_log(&shader).unwrap_or_else(|| "error".to_owned());
        gl.delete_shader(&shader);
        log::error!("{stage} shader failed to compile: {log}");
        return Err(ProgramError::Compile { stage, log });
    }
    Ok(shader)
}

fn link<G: Gl>(gl: &G, vs: G::Shader, fs: G::Shader) -> Result<G::Program, ProgramError> {
    let Some(program) = gl.create_program() else {
        gl.delete_shader(&vs);
        gl.delete_shader(&fs);
        return Err(ProgramError::CreateProgram);
    };
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);
    gl.delete_shader(&vs);
    gl.delete_shader(&fs);

    if !gl.program_linked(&program) {
        let log = gl.program_info_log(&program).unwrap_or_else(|| "error".to_owned());
        gl.delete_program(&program);
        log::error!("program failed to link: {log}");
        return Err(ProgramError::Link(log));
    }
    gl.use_program(Some(&program));
    Ok(program)
}

impl<G: Gl> Program<G> {
    /// Compiles and links the shaders, makes the program current and uploads
    /// every attribute stream.
    pub fn new(gl: &G, vertex: &str, fragment: &str, attributes: &Attributes) -> Result<Self> {
        let vs = compile(gl, gl::VERTEX_SHADER, vertex)?;
        let fs = match compile(gl, gl::FRAGMENT_SHADER, fragment) {
            Ok(fs) => fs,
            Err(err) => {
                gl.delete_shader(&vs);
                return Err(err.into());
            }
        };
        let program = link(gl, vs, fs)?;

        let mut this = Self {
            gl: gl.clone(),
            program: Some(program),
            buffers: Vec::with_capacity(Attribute::ALL.len()),
            index: None,
            index_count: attributes.index.as_ref().map_or(0, Vec::len),
            vertex_count: attributes.position.len() / Attribute::Position.components() as usize,
            uniforms: HashMap::new(),
            texture_unit: 0,
        };
        if let Err(err) = this.create_buffers(attributes) {
            this.dispose();
            return Err(err.into());
        }
        Ok(this)
    }

    fn create_buffers(&mut self, attributes: &Attributes) -> Result<(), ProgramError> {
        let Some(program) = self.program.as_ref() else {
            return Ok(());
        };
        for attribute in Attribute::ALL {
            let buffer = self
                .gl
                .create_buffer()
                .ok_or(ProgramError::CreateBuffer(attribute.name()))?;
            self.gl.bind_buffer(gl::ARRAY_BUFFER, Some(&buffer));
            self.gl
                .buffer_data_f32(gl::ARRAY_BUFFER, attributes.data(attribute), gl::STATIC_DRAW);
            self.gl.bind_buffer(gl::ARRAY_BUFFER, None);

            let location = self.gl.attrib_location(program, attribute.name());
            self.buffers.push(VertexBuffer {
                attribute,
                buffer,
                location: u32::try_from(location).ok(),
            });
        }

        if let Some(index) = &attributes.index {
            let buffer = self
                .gl
                .create_buffer()
                .ok_or(ProgramError::CreateBuffer("index"))?;
            self.gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, Some(&buffer));
            self.gl
                .buffer_data_u16(gl::ELEMENT_ARRAY_BUFFER, index, gl::STATIC_DRAW);
            self.gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, None);
            self.index = Some(buffer);
        }
        Ok(())
    }

    pub fn gl(&self) -> &G {
        &self.gl
    }

    /// Makes this program current again; only needed when several coexist.
    pub fn use_program(&self) {
        if let Some(program) = &self.program {
            self.gl.use_program(Some(program));
        }
    }

    /// Rebinds every vertex stream the shader reads, and the index buffer.
    pub fn enable_buffer(&self) {
        for vbo in &self.buffers {
            let Some(location) = vbo.location else {
                continue;
            };
            self.gl.bind_buffer(gl::ARRAY_BUFFER, Some(&vbo.buffer));
            self.gl.enable_vertex_attrib_array(location);
            self.gl
                .vertex_attrib_pointer(location, vbo.attribute.components(), gl::FLOAT, false);
        }
        if let Some(index) = &self.index {
            self.gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, Some(index));
        }
    }

    /// Overwrites the start of an attribute's buffer.
    pub fn update_attribute(&self, attribute: Attribute, data: &[f32]) {
        let Some(vbo) = self.buffers.iter().find(|b| b.attribute == attribute) else {
            return;
        };
        self.gl.bind_buffer(gl::ARRAY_BUFFER, Some(&vbo.buffer));
        self.gl.buffer_sub_data_f32(gl::ARRAY_BUFFER, 0, data);
        self.gl.bind_buffer(gl::ARRAY_BUFFER, None);
    }

    pub fn index_count(&self) -> usize {
        self.index_count
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Registers `name` once.
    ///
    /// Samplers take the next free texture unit and bind immediately; other
    /// kinds apply `value` if one is given.
    pub fn add_uniform(
        &mut self,
        name: &str,
        kind: UniformKind,
        value: Option<UniformValue<G::Texture>>,
    ) -> Result<(), ProgramError> {
        if self.uniforms.contains_key(name) {
            return Err(ProgramError::DuplicateUniform(name.to_owned()));
        }
        if let Some(v) = &value {
            if v.kind() != kind {
                return Err(ProgramError::UniformMismatch {
                    name: name.to_owned(),
                    kind: kind.name(),
                });
            }
        }

        let location = self
            .program
            .as_ref()
            .and_then(|program| self.gl.uniform_location(program, name));
        let apply = value.is_some();
        let state = match (kind, value) {
            (UniformKind::Sampler, Some(UniformValue::Sampler(texture))) => {
                let unit = self.texture_unit;
                self.texture_unit += 1;
                UniformState::Sampler { texture, unit }
            }
            (UniformKind::Sampler, _) => {
                return Err(ProgramError::MissingTexture(name.to_owned()));
            }
            (_, Some(UniformValue::Float(v))) => UniformState::Float(v),
            (_, Some(UniformValue::Int(v))) => UniformState::Int(v),
            (_, Some(UniformValue::Vec2(v))) => UniformState::Vec2(v),
            (_, Some(UniformValue::Mat4(v))) => UniformState::Mat4(v),
            (UniformKind::Float, _) => UniformState::Float(0.0),
            (UniformKind::Int, _) => UniformState::Int(0),
            (UniformKind::Vec2, _) => UniformState::Vec2([0.0; 2]),
            (UniformKind::Mat4, _) => UniformState::Mat4([0.0; 16]),
        };

        let uniform = Uniform { location, state };
        if apply {
            uniform.apply(&self.gl);
        }
        self.uniforms.insert(name.to_owned(), uniform);
        Ok(())
    }

    /// Registers a sampler bound to `texture`, returning its texture unit.
    pub fn add_texture(&mut self, name: &str, texture: &Texture<G>) -> Result<u32, ProgramError> {
        let handle = texture
            .handle()
            .cloned()
            .ok_or_else(|| ProgramError::MissingTexture(name.to_owned()))?;
        self.add_uniform(name, UniformKind::Sampler, Some(UniformValue::Sampler(handle)))?;
        Ok(self.texture_unit - 1)
    }

    /// Re-applies a registered uniform. `None` leaves non-sampler uniforms
    /// untouched; samplers always rebind. Unknown names and mismatched kinds
    /// are ignored.
    pub fn set_uniform(&mut self, name: &str, value: Option<UniformValue<G::Texture>>) {
        let Some(uniform) = self.uniforms.get_mut(name) else {
            log::trace!("set_uniform: '{name}' is not registered");
            return;
        };
        match (&mut uniform.state, value) {
            (UniformState::Sampler { texture, .. }, value) => {
                if let Some(UniformValue::Sampler(next)) = value {
                    *texture = next;
                }
            }
            (_, None) => return,
            (UniformState::Float(current), Some(UniformValue::Float(v))) => *current = v,
            (UniformState::Int(current), Some(UniformValue::Int(v))) => *current = v,
            (UniformState::Vec2(current), Some(UniformValue::Vec2(v))) => *current = v,
            (UniformState::Mat4(current), Some(UniformValue::Mat4(v))) => *current = v,
            (_, Some(other)) => {
                log::debug!("set_uniform: {:?} value ignored for '{name}'", other.kind());
                return;
            }
        }
        uniform.apply(&self.gl);
    }

    /// Current value of a float or int uniform the shader actually uses.
    pub fn get_uniform_value(&self, name: &str) -> Option<f32> {
        let uniform = self.uniforms.get(name)?;
        uniform.location.as_ref()?;
        match uniform.state {
            UniformState::Float(v) => Some(v),
            UniformState::Int(v) => Some(v as f32),
            _ => None,
        }
    }

    /// Adds `delta` to a numeric uniform and re-applies it.
    pub fn add_uniform_value(&mut self, name: &str, delta: f32) {
        let Some(current) = self.get_uniform_value(name) else {
            return;
        };
        let value = match self.uniforms.get(name).map(|u| &u.state) {
            Some(UniformState::Int(_)) => UniformValue::Int((current + delta) as i32),
            _ => UniformValue::Float(current + delta),
        };
        self.set_uniform(name, Some(value));
    }

    pub fn texture_unit(&self, name: &str) -> Option<u32> {
        match self.uniforms.get(name)?.state {
            UniformState::Sampler { unit, .. } => Some(unit),
            _ => None,
        }
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.contains_key(name)
    }

    pub fn is_disposed(&self) -> bool {
        self.program.is_none()
    }

    pub fn render(&self) {
        if self.program.is_none() {
            return;
        }
        self.enable_buffer();
    }

    /// Deletes the program and every buffer. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if let Some(program) = self.program.take() {
            self.gl.delete_program(&program);
        }
        for vbo in self.buffers.drain(..) {
            self.gl.delete_buffer(&vbo.buffer);
        }
        if let Some(index) = self.index.take() {
            self.gl.delete_buffer(&index);
        }
    }
}
