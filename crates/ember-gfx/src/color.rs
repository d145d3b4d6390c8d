//! RGBA color with `f32` channels in `0.0..=1.0`.

/// An RGBA color. Channels are linear `f32` in `0.0..=1.0`.
///
/// A color with `a == 0.0` is treated as "absent" by the sprite pipeline:
/// the normal pass is skipped when the tint alpha is zero, and the glow
/// pass is skipped when the glow alpha is zero.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Fully transparent black. Suppresses the pass it is assigned to.
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    /// Opaque white (identity tint).
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    /// Construct a color from channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from RGB channels.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// True if the alpha channel is exactly zero.
    pub fn is_transparent(&self) -> bool {
        self.a == 0.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}
