use image::RgbaImage;
use js_sys::{Promise, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Response, Window};

use crate::error::SceneError;

fn failed(path: &str, reason: impl std::fmt::Debug) -> SceneError {
    SceneError::ImageLoad {
        path: path.to_owned(),
        reason: format!("{reason:?}"),
    }
}

async fn decode(path: &str, request: Promise) -> Result<RgbaImage, SceneError> {
    let response: Response = JsFuture::from(request)
        .await
        .and_then(JsValue::dyn_into)
        .map_err(|err| failed(path, err))?;
    if !response.ok() {
        return Err(failed(path, format_args!("HTTP {}", response.status())));
    }
    let body = response.array_buffer().map_err(|err| failed(path, err))?;
    let buffer = JsFuture::from(body).await.map_err(|err| failed(path, err))?;
    let bytes = Uint8Array::new(&buffer).to_vec();

    let image = image::load_from_memory(&bytes)
        .map_err(|err| failed(path, err))?
        .to_rgba8();
    log::debug!("loaded {path} ({}x{})", image.width(), image.height());
    Ok(image)
}

/// Fetches and decodes every path, in order. All requests are in flight
/// before the first one is awaited.
pub async fn load_images(window: &Window, paths: &[String]) -> Result<Vec<RgbaImage>, SceneError> {
    let requests: Vec<Promise> = paths.iter().map(|path| window.fetch_with_str(path)).collect();
    let mut images = Vec::with_capacity(paths.len());
    for (path, request) in paths.iter().zip(requests) {
        images.push(decode(path, request).await?);
    }
    Ok(images)
}
