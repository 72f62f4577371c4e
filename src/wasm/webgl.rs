use js_sys::{Float32Array, Uint16Array};
use web_sys::{
    WebGlBuffer, WebGlProgram, WebGlRenderingContext as GL, WebGlShader, WebGlTexture,
    WebGlUniformLocation,
};

use crate::gl::{self, Gl};

impl Gl for GL {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type Buffer = WebGlBuffer;
    type Texture = WebGlTexture;
    type UniformLocation = WebGlUniformLocation;

    fn enable(&self, capability: u32) {
        GL::enable(self, capability);
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        GL::clear_color(self, r, g, b, a);
    }

    fn clear_depth(&self, depth: f32) {
        GL::clear_depth(self, depth);
    }

    fn clear(&self, mask: u32) {
        GL::clear(self, mask);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        GL::viewport(self, x, y, width, height);
    }

    fn create_shader(&self, kind: u32) -> Option<WebGlShader> {
        GL::create_shader(self, kind)
    }

    fn shader_source(&self, shader: &WebGlShader, source: &str) {
        GL::shader_source(self, shader, source);
    }

    fn compile_shader(&self, shader: &WebGlShader) {
        GL::compile_shader(self, shader);
    }

    fn shader_compiled(&self, shader: &WebGlShader) -> bool {
        self.get_shader_parameter(shader, GL::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: &WebGlShader) -> Option<String> {
        self.get_shader_info_log(shader)
    }

    fn delete_shader(&self, shader: &WebGlShader) {
        GL::delete_shader(self, Some(shader));
    }

    fn create_program(&self) -> Option<WebGlProgram> {
        GL::create_program(self)
    }

    fn attach_shader(&self, program: &WebGlProgram, shader: &WebGlShader) {
        GL::attach_shader(self, program, shader);
    }

    fn link_program(&self, program: &WebGlProgram) {
        GL::link_program(self, program);
    }

    fn program_linked(&self, program: &WebGlProgram) -> bool {
        self.get_program_parameter(program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: &WebGlProgram) -> Option<String> {
        self.get_program_info_log(program)
    }

    fn use_program(&self, program: Option<&WebGlProgram>) {
        GL::use_program(self, program);
    }

    fn delete_program(&self, program: &WebGlProgram) {
        GL::delete_program(self, Some(program));
    }

    fn attrib_location(&self, program: &WebGlProgram, name: &str) -> i32 {
        self.get_attrib_location(program, name)
    }

    fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.get_uniform_location(program, name)
    }

    fn create_buffer(&self) -> Option<WebGlBuffer> {
        GL::create_buffer(self)
    }

    fn bind_buffer(&self, target: u32, buffer: Option<&WebGlBuffer>) {
        GL::bind_buffer(self, target, buffer);
    }

    fn buffer_data_f32(&self, target: u32, data: &[f32], usage: u32) {
        // Copies into a JS-owned array; a view into wasm memory would be
        // invalidated by the next allocation.
        let array = Float32Array::from(data);
        self.buffer_data_with_array_buffer_view(target, &array, usage);
    }

    fn buffer_data_u16(&self, target: u32, data: &[u16], usage: u32) {
        let array = Uint16Array::from(data);
        self.buffer_data_with_array_buffer_view(target, &array, usage);
    }

    fn buffer_sub_data_f32(&self, target: u32, offset: i32, data: &[f32]) {
        let array = Float32Array::from(data);
        self.buffer_sub_data_with_i32_and_array_buffer_view(target, offset, &array);
    }

    fn delete_buffer(&self, buffer: &WebGlBuffer) {
        GL::delete_buffer(self, Some(buffer));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        GL::enable_vertex_attrib_array(self, index);
    }

    fn vertex_attrib_pointer(&self, index: u32, size: i32, kind: u32, normalized: bool) {
        self.vertex_attrib_pointer_with_i32(index, size, kind, normalized, 0, 0);
    }

    fn draw_elements(&self, mode: u32, count: i32, kind: u32, offset: i32) {
        self.draw_elements_with_i32(mode, count, kind, offset);
    }

    fn uniform1f(&self, location: Option<&WebGlUniformLocation>, value: f32) {
        GL::uniform1f(self, location, value);
    }

    fn uniform1i(&self, location: Option<&WebGlUniformLocation>, value: i32) {
        GL::uniform1i(self, location, value);
    }

    fn uniform2fv(&self, location: Option<&WebGlUniformLocation>, value: &[f32; 2]) {
        self.uniform2fv_with_f32_array(location, value);
    }

    fn uniform_matrix4fv(&self, location: Option<&WebGlUniformLocation>, value: &[f32; 16]) {
        self.uniform_matrix4fv_with_f32_array(location, false, value);
    }

    fn create_texture(&self) -> Option<WebGlTexture> {
        GL::create_texture(self)
    }

    fn active_texture(&self, unit: u32) {
        GL::active_texture(self, unit);
    }

    fn bind_texture(&self, target: u32, texture: Option<&WebGlTexture>) {
        GL::bind_texture(self, target, texture);
    }

    fn tex_image_rgba(&self, width: u32, height: u32, pixels: &[u8]) -> Result<(), String> {
        self.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
            gl::TEXTURE_2D,
            0,
            gl::RGBA as i32,
            width as i32,
            height as i32,
            0,
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            Some(pixels),
        )
        .map_err(|err| format!("{err:?}"))
    }

    fn generate_mipmap(&self, target: u32) {
        GL::generate_mipmap(self, target);
    }

    fn tex_parameteri(&self, target: u32, pname: u32, value: u32) {
        GL::tex_parameteri(self, target, pname, value as i32);
    }

    fn delete_texture(&self, texture: &WebGlTexture) {
        GL::delete_texture(self, Some(texture));
    }
}
