//! Opaque backend resource handles and their metadata.
//!
//! Handles are plain `u64` newtypes minted by the backend. The render core
//! never interprets them; it only stores, compares, and hands them back for
//! drawing or destruction. Every minted handle is destroyed exactly once --
//! the asset cache enforces this for cached resources, and the one-shot
//! text path destroys its texture and surface within the same call.

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Opaque handle to a backend texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TextureHandle(pub u64);

/// Opaque handle to a backend font at a fixed point size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FontHandle(pub u64);

// ---------------------------------------------------------------------------
// TextureMetadata
// ---------------------------------------------------------------------------

/// Dimensions of a texture in texels.
///
/// Needed by the quad batcher to convert pixel-space atlas insets into UV
/// coordinates and to apply the half-texel bleed bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextureMetadata {
    pub width: u32,
    pub height: u32,
}

impl TextureMetadata {
    /// Size of one texel in UV space, per axis.
    pub fn texel_size(&self) -> (f32, f32) {
        (1.0 / self.width.max(1) as f32, 1.0 / self.height.max(1) as f32)
    }
}

// ---------------------------------------------------------------------------
// TextSurface
// ---------------------------------------------------------------------------

/// A one-shot CPU surface holding rasterized text.
///
/// Produced by [`rasterize_text`](crate::backend::GraphicsBackend::rasterize_text),
/// uploaded as a temporary texture, and destroyed before the text submission
/// returns. Never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSurface {
    /// Backend-minted surface id.
    pub id: u64,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
}
