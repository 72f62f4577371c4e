//! Browser entry points.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::error::Error;
use crate::scene::{Canvas, InputBinding, SceneConfig};

pub mod events;
pub mod loader;
pub mod scroll;
pub mod surface;
pub mod webgl;

use events::{with_scene, EventBindings, Scene};
use scroll::WheelScroller;
use surface::CanvasSurface;

const DEFAULT_SELECTOR: &str = ".home__canvas";
const FALLBACK_SELECTOR: &str = "#c";

fn init_logging(level: log::Level) {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed.
    console_log::init_with_level(level).ok();
    log::set_max_level(level.to_level_filter());
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    let config = SceneConfig::default();
    init_logging(config.level());

    let surface = match CanvasSurface::query(DEFAULT_SELECTOR) {
        Ok(surface) => surface,
        Err(_) => match CanvasSurface::query(FALLBACK_SELECTOR) {
            Ok(surface) => surface,
            Err(err) => {
                // Pages that call `mount` themselves have no default canvas.
                log::info!("auto-start skipped: {err}");
                return Ok(());
            }
        },
    };
    start(surface, config)?;
    Ok(())
}

/// Handle to a mounted scene.
#[wasm_bindgen]
pub struct SceneHandle {
    scene: Scene,
}

#[wasm_bindgen]
impl SceneHandle {
    /// Drives the `uProgress` uniform, typically from 0 to 1.
    #[wasm_bindgen(js_name = setProgress)]
    pub fn set_progress(&self, value: f32) {
        with_scene(&Rc::downgrade(&self.scene), |canvas| canvas.set_progress(value));
    }

    pub fn dispose(&self) {
        with_scene(&Rc::downgrade(&self.scene), Canvas::dispose);
    }
}

/// Mounts a scene on the canvas matching `selector`. `config_json` is an
/// optional [`SceneConfig`] in JSON; omitted fields take their defaults.
#[wasm_bindgen]
pub fn mount(selector: &str, config_json: Option<String>) -> Result<SceneHandle, JsValue> {
    let config = match config_json.as_deref() {
        Some(json) => SceneConfig::from_json(json).map_err(Error::from)?,
        None => SceneConfig::default(),
    };
    init_logging(config.level());
    let surface = CanvasSurface::query(selector).map_err(Error::from)?;
    Ok(start(surface, config)?)
}

/// Sets up the context now, then loads the images and starts the scene in
/// the background. The scene lives until `beforeunload` tears it down.
fn start(surface: CanvasSurface, config: SceneConfig) -> Result<SceneHandle, Error> {
    let window = surface.window().clone();
    let paths = config.image_paths();
    let scene: Scene = Rc::new(RefCell::new(Canvas::new(surface, config)?));

    let owner = Rc::clone(&scene);
    let on_unload = Closure::wrap(Box::new(move || {
        with_scene(&Rc::downgrade(&owner), Canvas::dispose);
    }) as Box<dyn FnMut()>);
    if let Err(err) = window
        .add_event_listener_with_callback("beforeunload", on_unload.as_ref().unchecked_ref())
    {
        log::warn!("cannot bind beforeunload: {err:?}");
    }
    on_unload.forget();

    let loading = Rc::clone(&scene);
    spawn_local(async move {
        if let Err(err) = run(window, loading, paths).await {
            log::error!("{err}");
        }
    });
    Ok(SceneHandle { scene })
}

async fn run(window: web_sys::Window, scene: Scene, paths: Vec<String>) -> Result<(), Error> {
    let images = loader::load_images(&window, &paths).await?;

    let events = EventBindings::bind(window.clone(), &scene)?;
    let mut bindings: Vec<Box<dyn InputBinding>> = vec![Box::new(events)];
    if !scroll::is_touch(&window) {
        let target = Rc::downgrade(&scene);
        let scroller = WheelScroller::new(window, move |event| {
            with_scene(&target, |canvas| canvas.handle_scroll(event.y));
        });
        match scroller {
            Ok(scroller) => bindings.push(Box::new(scroller)),
            Err(err) => {
                bindings.iter_mut().for_each(|b| b.release());
                return Err(err.into());
            }
        }
    }

    scene.borrow_mut().start(&images, bindings)?;
    Canvas::animate(&scene);
    Ok(())
}
