use thiserror::Error;

/// Failure to obtain a rendering context from a surface.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("webgl not supported")]
    Unsupported,
    #[error("failed to acquire rendering context: {0}")]
    Acquire(String),
    #[error("failed to listen for '{event}': {reason}")]
    Listen { event: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("cannot create {0} shader")]
    CreateShader(&'static str),
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: &'static str, log: String },
    #[error("cannot create program")]
    CreateProgram,
    #[error("program failed to link: {0}")]
    Link(String),
    #[error("cannot create buffer for attribute '{0}'")]
    CreateBuffer(&'static str),
    #[error("uniform '{0}' is already registered")]
    DuplicateUniform(String),
    #[error("uniform '{0}' has no texture to bind")]
    MissingTexture(String),
    #[error("value for uniform '{name}' does not match its {kind} type")]
    UniformMismatch { name: String, kind: &'static str },
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("cannot create texture")]
    Create,
    #[error("texture upload failed: {0}")]
    Upload(String),
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene expects {expected} images, got {got}")]
    MissingImages { expected: usize, got: usize },
    #[error("scene has already been started")]
    AlreadyStarted,
    #[error("scene has been disposed")]
    Disposed,
    #[error("failed to load image '{path}': {reason}")]
    ImageLoad { path: String, reason: String },
    #[error("invalid scene config: {0}")]
    Config(#[from] serde_json::Error),
}

/// Every fatal construction error the renderer can raise.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Texture(#[from] TextureError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for wasm_bindgen::JsValue {
    fn from(err: Error) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
