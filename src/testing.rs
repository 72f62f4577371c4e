//! Recording GL backend and a hand-cranked surface for host tests.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::context::{Surface, SurfaceSize};
use crate::error::ContextError;
use crate::gl::Gl;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Enable(u32),
    ClearColor([f32; 4]),
    ClearDepth(f32),
    Clear(u32),
    Viewport(i32, i32),
    CreateShader(u32, u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    LinkProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    CreateBuffer(u32),
    BindBuffer(u32, Option<u32>),
    BufferDataF32(u32, Vec<f32>),
    BufferDataU16(u32, Vec<u16>),
    BufferSubData(u32, Vec<f32>),
    DeleteBuffer(u32),
    EnableAttrib(u32),
    AttribPointer(u32, i32),
    DrawElements(u32, i32, u32),
    Uniform1f(String, f32),
    Uniform1i(String, i32),
    Uniform2fv(String, [f32; 2]),
    UniformMatrix4fv(String, [f32; 16]),
    CreateTexture(u32),
    ActiveTexture(u32),
    BindTexture(Option<u32>),
    TexImage(u32, u32),
    GenerateMipmap,
    TexParameter(u32, u32),
    DeleteTexture(u32),
}

#[derive(Default)]
struct GlState {
    calls: Vec<Call>,
    next_id: u32,
    fail_compile: Option<u32>,
    fail_link: bool,
    inactive: HashSet<String>,
}

/// Logs every call; object handles are sequential ids.
#[derive(Clone, Default)]
pub struct RecordingGl {
    state: Rc<RefCell<GlState>>,
}

impl RecordingGl {
    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut self.state.borrow_mut().calls)
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    /// Makes shaders of `kind` fail to compile.
    pub fn fail_compile(&self, kind: u32) {
        self.state.borrow_mut().fail_compile = Some(kind);
    }

    pub fn fail_link(&self) {
        self.state.borrow_mut().fail_link = true;
    }

    /// Makes an attribute or uniform name unknown to linked programs.
    pub fn deactivate(&self, name: &str) {
        self.state.borrow_mut().inactive.insert(name.to_owned());
    }

    fn log(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }

    fn next_id(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        state.next_id
    }
}

impl Gl for RecordingGl {
    type Shader = (u32, u32);
    type Program = u32;
    type Buffer = u32;
    type Texture = u32;
    type UniformLocation = String;

    fn enable(&self, capability: u32) {
        self.log(Call::Enable(capability));
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.log(Call::ClearColor([r, g, b, a]));
    }

    fn clear_depth(&self, depth: f32) {
        self.log(Call::ClearDepth(depth));
    }

    fn clear(&self, mask: u32) {
        self.log(Call::Clear(mask));
    }

    fn viewport(&self, _x: i32, _y: i32, width: i32, height: i32) {
        self.log(Call::Viewport(width, height));
    }

    fn create_shader(&self, kind: u32) -> Option<Self::Shader> {
        let id = self.next_id();
        self.log(Call::CreateShader(kind, id));
        Some((id, kind))
    }

    fn shader_source(&self, _shader: &Self::Shader, _source: &str) {}

    fn compile_shader(&self, shader: &Self::Shader) {
        self.log(Call::CompileShader(shader.0));
    }

    fn shader_compiled(&self, shader: &Self::Shader) -> bool {
        self.state.borrow().fail_compile != Some(shader.1)
    }

    fn shader_info_log(&self, _shader: &Self::Shader) -> Option<String> {
        Some("ERROR: 0:1: syntax error".to_owned())
    }

    fn delete_shader(&self, shader: &Self::Shader) {
        self.log(Call::DeleteShader(shader.0));
    }

    fn create_program(&self) -> Option<Self::Program> {
        let id = self.next_id();
        self.log(Call::CreateProgram(id));
        Some(id)
    }

    fn attach_shader(&self, _program: &Self::Program, _shader: &Self::Shader) {}

    fn link_program(&self, program: &Self::Program) {
        self.log(Call::LinkProgram(*program));
    }

    fn program_linked(&self, _program: &Self::Program) -> bool {
        !self.state.borrow().fail_link
    }

    fn program_info_log(&self, _program: &Self::Program) -> Option<String> {
        Some("link error".to_owned())
    }

    fn use_program(&self, program: Option<&Self::Program>) {
        self.log(Call::UseProgram(program.copied()));
    }

    fn delete_program(&self, program: &Self::Program) {
        self.log(Call::DeleteProgram(*program));
    }

    fn attrib_location(&self, _program: &Self::Program, name: &str) -> i32 {
        if self.state.borrow().inactive.contains(name) {
            return -1;
        }
        match name {
            "position" => 0,
            "normal" => 1,
            "uv" => 2,
            _ => -1,
        }
    }

    fn uniform_location(
        &self,
        _program: &Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        (!self.state.borrow().inactive.contains(name)).then(|| name.to_owned())
    }

    fn create_buffer(&self) -> Option<Self::Buffer> {
        let id = self.next_id();
        self.log(Call::CreateBuffer(id));
        Some(id)
    }

    fn bind_buffer(&self, target: u32, buffer: Option<&Self::Buffer>) {
        self.log(Call::BindBuffer(target, buffer.copied()));
    }

    fn buffer_data_f32(&self, target: u32, data: &[f32], _usage: u32) {
        self.log(Call::BufferDataF32(target, data.to_vec()));
    }

    fn buffer_data_u16(&self, target: u32, data: &[u16], _usage: u32) {
        self.log(Call::BufferDataU16(target, data.to_vec()));
    }

    fn buffer_sub_data_f32(&self, target: u32, _offset: i32, data: &[f32]) {
        self.log(Call::BufferSubData(target, data.to_vec()));
    }

    fn delete_buffer(&self, buffer: &Self::Buffer) {
        self.log(Call::DeleteBuffer(*buffer));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.log(Call::EnableAttrib(index));
    }

    fn vertex_attrib_pointer(&self, index: u32, size: i32, _kind: u32, _normalized: bool) {
        self.log(Call::AttribPointer(index, size));
    }

    fn draw_elements(&self, mode: u32, count: i32, kind: u32, _offset: i32) {
        self.log(Call::DrawElements(mode, count, kind));
    }

    fn uniform1f(&self, location: Option<&Self::UniformLocation>, value: f32) {
        self.log(Call::Uniform1f(location.cloned().unwrap_or_default(), value));
    }

    fn uniform1i(&self, location: Option<&Self::UniformLocation>, value: i32) {
        self.log(Call::Uniform1i(location.cloned().unwrap_or_default(), value));
    }

    fn uniform2fv(&self, location: Option<&Self::UniformLocation>, value: &[f32; 2]) {
        self.log(Call::Uniform2fv(location.cloned().unwrap_or_default(), *value));
    }

    fn uniform_matrix4fv(&self, location: Option<&Self::UniformLocation>, value: &[f32; 16]) {
        self.log(Call::UniformMatrix4fv(location.cloned().unwrap_or_default(), *value));
    }

    fn create_texture(&self) -> Option<Self::Texture> {
        let id = self.next_id();
        self.log(Call::CreateTexture(id));
        Some(id)
    }

    fn active_texture(&self, unit: u32) {
        self.log(Call::ActiveTexture(unit));
    }

    fn bind_texture(&self, _target: u32, texture: Option<&Self::Texture>) {
        self.log(Call::BindTexture(texture.copied()));
    }

    fn tex_image_rgba(&self, width: u32, height: u32, pixels: &[u8]) -> Result<(), String> {
        assert_eq!(pixels.len(), (width * height * 4) as usize);
        self.log(Call::TexImage(width, height));
        Ok(())
    }

    fn generate_mipmap(&self, _target: u32) {
        self.log(Call::GenerateMipmap);
    }

    fn tex_parameteri(&self, _target: u32, pname: u32, value: u32) {
        self.log(Call::TexParameter(pname, value));
    }

    fn delete_texture(&self, texture: &Self::Texture) {
        self.log(Call::DeleteTexture(*texture));
    }
}

struct SurfaceState {
    size: SurfaceSize,
    display: SurfaceSize,
    supported: bool,
    next_id: u32,
    listeners: Vec<(u32, Rc<dyn Fn()>)>,
    frames: Vec<(u32, Box<dyn FnOnce()>)>,
    cancelled: usize,
}

/// A surface whose refresh ticks and resize events are fired by the test.
#[derive(Clone)]
pub struct ManualSurface {
    gl: RecordingGl,
    state: Rc<RefCell<SurfaceState>>,
}

impl ManualSurface {
    pub fn new(size: SurfaceSize, display: SurfaceSize) -> Self {
        Self {
            gl: RecordingGl::default(),
            state: Rc::new(RefCell::new(SurfaceState {
                size,
                display,
                supported: true,
                next_id: 0,
                listeners: Vec::new(),
                frames: Vec::new(),
                cancelled: 0,
            })),
        }
    }

    pub fn gl(&self) -> &RecordingGl {
        &self.gl
    }

    pub fn set_supported(&self, supported: bool) {
        self.state.borrow_mut().supported = supported;
    }

    pub fn set_display_size(&self, size: SurfaceSize) {
        self.state.borrow_mut().display = size;
    }

    pub fn fire_resize(&self) {
        let listeners: Vec<_> = self
            .state
            .borrow()
            .listeners
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in listeners {
            handler();
        }
    }

    /// Runs every frame requested so far.
    pub fn run_frame(&self) {
        let frames = std::mem::take(&mut self.state.borrow_mut().frames);
        for (_, tick) in frames {
            tick();
        }
    }

    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }

    pub fn cancelled_frames(&self) -> usize {
        self.state.borrow().cancelled
    }

    pub fn resize_listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    fn next_id(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        state.next_id
    }
}

impl Surface for ManualSurface {
    type Gl = RecordingGl;
    type Frame = u32;
    type Listener = u32;

    fn acquire_context(&self) -> Result<Self::Gl, ContextError> {
        if self.state.borrow().supported {
            Ok(self.gl.clone())
        } else {
            Err(ContextError::Unsupported)
        }
    }

    fn size(&self) -> SurfaceSize {
        self.state.borrow().size
    }

    fn display_size(&self) -> SurfaceSize {
        self.state.borrow().display
    }

    fn set_size(&self, size: SurfaceSize) {
        self.state.borrow_mut().size = size;
    }

    fn listen_resize(&self, handler: Rc<dyn Fn()>) -> Result<Self::Listener, ContextError> {
        let id = self.next_id();
        self.state.borrow_mut().listeners.push((id, handler));
        Ok(id)
    }

    fn unlisten_resize(&self, listener: Self::Listener) {
        self.state.borrow_mut().listeners.retain(|(id, _)| *id != listener);
    }

    fn request_frame(&self, tick: Box<dyn FnOnce()>) -> Option<Self::Frame> {
        let id = self.next_id();
        self.state.borrow_mut().frames.push((id, tick));
        Some(id)
    }

    fn cancel_frame(&self, frame: Self::Frame) {
        let mut state = self.state.borrow_mut();
        let before = state.frames.len();
        state.frames.retain(|(id, _)| *id != frame);
        if state.frames.len() < before {
            state.cancelled += 1;
        }
    }
}

