//! The textured-quad scene: owns the context, the quad, its textures and the
//! interaction state, and pushes eased input into the shader every frame.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use image::RgbaImage;
use serde::Deserialize;

use crate::context::{GpuContext, Surface};
use crate::error::{Result, SceneError};
use crate::gl::Gl;
use crate::interaction::{Interaction, Smoothing};
use crate::plane::{Plane, PlaneSize};
use crate::program::{UniformKind, UniformValue};
use crate::texture::{Texture, TextureOptions};

const VERTEX_SHADER: &str = include_str!("shaders/plane.vert");
const FRAGMENT_SHADER: &str = include_str!("shaders/plane.frag");

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub images: Vec<String>,
    /// Prefix for image paths; a leading `/` on the path is dropped.
    pub asset_base: String,
    pub background: String,
    pub smoothing: Smoothing,
    pub touch_speed: f32,
    pub time_step: f32,
    /// Whether texture `i` is sampled upside down. Missing entries flip.
    pub flip_y: Vec<bool>,
    pub log_level: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            images: vec!["/images/webgl.jpg".to_owned(), "/images/matcap.png".to_owned()],
            asset_base: String::new(),
            background: "#012".to_owned(),
            smoothing: Smoothing::default(),
            touch_speed: 1.5,
            time_step: 0.01,
            flip_y: Vec::new(),
            log_level: "info".to_owned(),
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn image_paths(&self) -> Vec<String> {
        self.images
            .iter()
            .map(|path| format!("{}{}", self.asset_base, path.strip_prefix('/').unwrap_or(path)))
            .collect()
    }

    /// Unknown level names fall back to `Info`.
    pub fn level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }

    fn flips(&self, index: usize) -> bool {
        self.flip_y.get(index).copied().unwrap_or(true)
    }
}

/// An input source bound on behalf of a scene, released on dispose.
pub trait InputBinding {
    fn release(&mut self);
}

pub enum SceneState<G: Gl> {
    /// Waiting for images.
    Uninitialized,
    Ready {
        plane: Plane<G>,
        textures: Vec<Texture<G>>,
        bindings: Vec<Box<dyn InputBinding>>,
    },
    Disposed,
}

pub struct Canvas<S: Surface> {
    context: GpuContext<S>,
    config: SceneConfig,
    interaction: Interaction,
    state: SceneState<S::Gl>,
}

fn release_all(bindings: &mut Vec<Box<dyn InputBinding>>) {
    for mut binding in bindings.drain(..) {
        binding.release();
    }
}

impl<S: Surface> Canvas<S> {
    pub fn new(surface: S, config: SceneConfig) -> Result<Self> {
        let context = GpuContext::setup(surface)?;
        Ok(Self {
            context,
            config,
            interaction: Interaction::default(),
            state: SceneState::Uninitialized,
        })
    }

    pub fn context(&self) -> &GpuContext<S> {
        &self.context
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn state(&self) -> &SceneState<S::Gl> {
        &self.state
    }

    pub fn plane(&self) -> Option<&Plane<S::Gl>> {
        match &self.state {
            SceneState::Ready { plane, .. } => Some(plane),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, SceneState::Ready { .. })
    }

    /// Builds the scene once its images have loaded and takes ownership of
    /// the input `bindings`. On failure the bindings are released and the
    /// scene stays uninitialized.
    pub fn start(
        &mut self,
        images: &[RgbaImage],
        mut bindings: Vec<Box<dyn InputBinding>>,
    ) -> Result<()> {
        let checked = match self.state {
            SceneState::Uninitialized if images.len() == self.config.images.len() => Ok(()),
            SceneState::Uninitialized => Err(SceneError::MissingImages {
                expected: self.config.images.len(),
                got: images.len(),
            }),
            SceneState::Ready { .. } => Err(SceneError::AlreadyStarted),
            SceneState::Disposed => Err(SceneError::Disposed),
        };
        if let Err(err) = checked {
            release_all(&mut bindings);
            return Err(err.into());
        }

        self.context.set_background(self.config.background.as_str());
        let (plane, textures) = match self.create_screen(images) {
            Ok(screen) => screen,
            Err(err) => {
                release_all(&mut bindings);
                return Err(err);
            }
        };
        log::info!("scene started with {} textures", textures.len());
        self.state = SceneState::Ready {
            plane,
            textures,
            bindings,
        };
        Ok(())
    }

    fn create_screen(&self, images: &[RgbaImage]) -> Result<(Plane<S::Gl>, Vec<Texture<S::Gl>>)> {
        let gl = self.context.gl();

        // Textures unbind themselves, so they all exist before any sampler
        // is registered.
        let mut textures = Vec::with_capacity(images.len());
        for image in images {
            match Texture::new(gl, image, TextureOptions::default()) {
                Ok(texture) => textures.push(texture),
                Err(err) => {
                    textures.iter_mut().for_each(Texture::dispose);
                    return Err(err);
                }
            }
        }

        let fragment = format!("#define TEXTURE_COUNT {}\n{FRAGMENT_SHADER}", textures.len().max(1));
        let mut plane = match Plane::new(gl, VERTEX_SHADER, &fragment, PlaneSize::default()) {
            Ok(plane) => plane,
            Err(err) => {
                textures.iter_mut().for_each(Texture::dispose);
                return Err(err);
            }
        };

        if let Err(err) = self.register_uniforms(&mut plane, &textures) {
            plane.dispose();
            textures.iter_mut().for_each(Texture::dispose);
            return Err(err);
        }
        Ok((plane, textures))
    }

    fn register_uniforms(&self, plane: &mut Plane<S::Gl>, textures: &[Texture<S::Gl>]) -> Result<()> {
        for (i, texture) in textures.iter().enumerate() {
            plane.add_texture(&format!("uTextures[{i}].data"), texture)?;
            plane.add_uniform(
                &format!("uTextures[{i}].aspect"),
                UniformKind::Float,
                Some(UniformValue::Float(texture.size().aspect)),
            )?;
            if self.config.flips(i) {
                plane.add_uniform(
                    &format!("uTextures[{i}].flipY"),
                    UniformKind::Int,
                    Some(true.into()),
                )?;
            }
        }

        let aspect = self.context.size().aspect();
        plane.add_uniform("uAspect", UniformKind::Float, Some(UniformValue::Float(aspect)))?;
        plane.add_uniform("uMouseMove", UniformKind::Vec2, Some(UniformValue::Vec2([0.0; 2])))?;
        plane.add_uniform("uMouseDrag", UniformKind::Vec2, Some(UniformValue::Vec2([0.0; 2])))?;
        plane.add_uniform("uTime", UniformKind::Float, Some(UniformValue::Float(0.0)))?;
        plane.add_uniform("uScroll", UniformKind::Float, Some(UniformValue::Float(0.0)))?;
        plane.add_uniform("uProgress", UniformKind::Float, Some(UniformValue::Float(0.0)))?;
        Ok(())
    }

    /// Runs [`Canvas::frame`] on every display refresh until disposed.
    pub fn animate(scene: &Rc<RefCell<Self>>) {
        let weak: Weak<RefCell<Self>> = Rc::downgrade(scene);
        let mut this = scene.borrow_mut();
        if !this.is_ready() {
            log::warn!("animate called before the scene was started");
            return;
        }
        this.context.animation(move || {
            let Some(scene) = weak.upgrade() else {
                return;
            };
            match scene.try_borrow_mut() {
                Ok(mut scene) => scene.frame(),
                Err(_) => log::error!("scene busy during frame; frame skipped"),
            };
        });
    }

    /// Eases the input state and draws one frame.
    pub fn frame(&mut self) {
        let SceneState::Ready { plane, .. } = &mut self.state else {
            return;
        };
        self.interaction.step(&self.config.smoothing);

        let Interaction {
            pointer,
            drag,
            scroll,
        } = &self.interaction;
        plane.set_uniform("uMouseMove", Some(UniformValue::Vec2(pointer.current)));
        plane.set_uniform("uMouseDrag", Some(UniformValue::Vec2(drag.offset.current)));
        plane.set_uniform("uScroll", Some(UniformValue::Float(scroll.current)));
        plane.add_uniform_value("uTime", self.config.time_step);
        plane.render();
    }

    pub fn handle_resize(&mut self) {
        let aspect = self.context.size().aspect();
        if let SceneState::Ready { plane, .. } = &mut self.state {
            plane.set_uniform("uAspect", Some(UniformValue::Float(aspect)));
        }
    }

    pub fn handle_move(&mut self, x: f32, y: f32) {
        self.interaction.pointer_move(x, y, self.context.size());
    }

    pub fn handle_start(&mut self, x: f32, y: f32) {
        self.interaction.pointer_down(x, y);
    }

    pub fn handle_end(&mut self) {
        self.interaction.pointer_up();
    }

    pub fn handle_touch_move(&mut self, x: f32, y: f32) {
        let speed = self.config.touch_speed;
        self.handle_move(x * speed, y * speed);
    }

    pub fn handle_touch_start(&mut self, x: f32, y: f32) {
        let speed = self.config.touch_speed;
        self.handle_start(x * speed, y * speed);
    }

    pub fn handle_scroll(&mut self, y: f32) {
        self.interaction.scroll_to(y);
    }

    pub fn set_progress(&mut self, value: f32) {
        if let SceneState::Ready { plane, .. } = &mut self.state {
            plane.set_uniform("uProgress", Some(UniformValue::Float(value)));
        }
    }

    /// Stops the loop and releases every GPU object and input binding.
    /// Safe in any state and on repeated calls.
    pub fn dispose(&mut self) {
        self.context.dispose();
        match std::mem::replace(&mut self.state, SceneState::Disposed) {
            SceneState::Ready {
                mut plane,
                mut textures,
                mut bindings,
            } => {
                plane.dispose();
                textures.iter_mut().for_each(Texture::dispose);
                release_all(&mut bindings);
                log::info!("scene disposed");
            }
            SceneState::Uninitialized | SceneState::Disposed => {}
        }
    }
}
