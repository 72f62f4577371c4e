//! Colour parsing and the small numeric helpers shared by the scene.

/// Normalized RGBA, each channel in `[0, 1]`.
pub type Rgba = [f32; 4];

/// Normalized RGB, each channel in `[0, 1]`.
pub type Rgb = [f32; 3];

/// A background colour as accepted by [`GpuContext::set_background`](crate::GpuContext::set_background).
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    /// Normalized quadruple; channels are clamped to `[0, 1]`.
    Rgba(Rgba),
    /// `#rgb` or `#rrggbb`, case-insensitive. Alpha is kept from the previous colour.
    Hex(String),
}

impl From<Rgba> for Background {
    fn from(value: Rgba) -> Self {
        Self::Rgba(value)
    }
}

impl From<&str> for Background {
    fn from(value: &str) -> Self {
        Self::Hex(value.to_owned())
    }
}

impl From<String> for Background {
    fn from(value: String) -> Self {
        Self::Hex(value)
    }
}

/// Parses `#rgb` / `#rrggbb` into normalized components.
///
/// Three-digit components are divided by 15, six-digit ones by 255. Anything
/// else (missing `#`, wrong length, non-hex characters) yields `None`.
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let digits = hex.strip_prefix('#')?;
    let width = match digits.len() {
        6 => 2,
        3 => 1,
        _ => return None,
    };
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let norm = if width == 2 { 255.0 } else { 15.0 };
    let mut rgb = [0.0; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        let part = &digits[i * width..(i + 1) * width];
        *channel = u8::from_str_radix(part, 16).ok()? as f32 / norm;
    }
    Some(rgb)
}

#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    min.max(max.min(value))
}

#[inline]
pub fn lerp(x: f32, y: f32, t: f32) -> f32 {
    x * (1.0 - t) + y * t
}
