//! Render messages and draw descriptors.
//!
//! The simulation layer communicates with the renderer exclusively through
//! [`RenderMessage`] values: layered draw requests plus package lifecycle
//! hints. A [`LayeredMessage`] carries its paint-order keys (`elevation`,
//! `horizon`), the asset it draws with, and a [`RenderDescriptor`] -- a
//! closed union over every draw primitive the core knows.
//!
//! All descriptor payloads are value types. The one deliberate exception is
//! [`RenderDescriptor::CachedSprite`]: its payload is mutated in place when
//! the message is recycled through the [`MessagePool`](crate::pool::MessagePool),
//! which is why sprite fields are plain public data rather than builder-
//! frozen state.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use ember_gfx::backend::{Eye, GraphicsBackend};
use ember_gfx::blend::BlendMode;
use ember_gfx::color::Color;
use ember_gfx::draw_list::ExternalDrawList;
use ember_gfx::math::{Rect, Vec2};

// ---------------------------------------------------------------------------
// AssetTag
// ---------------------------------------------------------------------------

/// Names one asset inside one package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AssetTag {
    /// Package the asset lives in.
    pub package: String,
    /// Asset name within the package.
    pub asset: String,
}

impl AssetTag {
    /// Construct a tag from package and asset names.
    pub fn new(package: impl Into<String>, asset: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            asset: asset.into(),
        }
    }
}

impl fmt::Display for AssetTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.asset)
    }
}

// ---------------------------------------------------------------------------
// Flip
// ---------------------------------------------------------------------------

/// Horizontal/vertical mirroring of a sprite's texture read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Flip {
    /// No mirroring.
    pub const NONE: Flip = Flip {
        horizontal: false,
        vertical: false,
    };
}

// ---------------------------------------------------------------------------
// SpriteData
// ---------------------------------------------------------------------------

/// One textured quad draw request.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpriteData {
    /// When true, `position` is in viewport pixels rather than world units
    /// (HUD-style placement that ignores the camera).
    pub absolute: bool,
    /// Pivot location, in world units (or viewport pixels when `absolute`).
    pub position: Vec2,
    /// Full quad extent in world units.
    pub size: Vec2,
    /// Normalized pivot within the quad; `(0.5, 0.5)` is centered.
    pub pivot: Vec2,
    /// Rotation about the pivot, radians.
    pub rotation: f32,
    /// Atlas sub-rectangle in texels; `None` reads the whole texture.
    pub inset: Option<Rect>,
    /// Tint for the normal pass. Alpha zero suppresses the pass.
    pub color: Color,
    /// Blend mode for the normal pass.
    pub blend: BlendMode,
    /// Tint for the additive glow pass. Alpha zero suppresses the pass.
    pub glow: Color,
    /// Texture-read mirroring.
    pub flip: Flip,
}

impl Default for SpriteData {
    fn default() -> Self {
        Self {
            absolute: false,
            position: Vec2::ZERO,
            size: Vec2::splat(1.0),
            pivot: Vec2::splat(0.5),
            rotation: 0.0,
            inset: None,
            color: Color::WHITE,
            blend: BlendMode::Transparent,
            glow: Color::TRANSPARENT,
            flip: Flip::NONE,
        }
    }
}

// ---------------------------------------------------------------------------
// ParticleData
// ---------------------------------------------------------------------------

/// One particle within a [`RenderDescriptor::Particles`] batch.
///
/// Particles draw through the same quad path as sprites, in array order --
/// the batch's order is its z-order.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParticleData {
    pub position: Vec2,
    pub size: Vec2,
    pub rotation: f32,
    pub inset: Option<Rect>,
    pub color: Color,
    pub glow: Color,
    pub flip: Flip,
}

// ---------------------------------------------------------------------------
// Tile layers
// ---------------------------------------------------------------------------

/// One tileset referenced by a tile layer.
///
/// A layer's global tile ids (gids) are resolved against its tilesets in
/// declaration order; the first matching tileset wins. A tileset without a
/// declared `tile_count` matches every gid unconditionally, so it absorbs
/// anything later tilesets would otherwise own -- keep unbounded tilesets
/// last.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TilesetRef {
    /// Texture asset name within the message's package.
    pub asset: String,
    /// First global tile id owned by this tileset.
    pub first_gid: u32,
    /// Number of tiles, or `None` for an unbounded tileset.
    pub tile_count: Option<u32>,
    /// Tiles per atlas row.
    pub columns: u32,
}

impl TilesetRef {
    /// True if `gid` belongs to this tileset.
    pub fn owns(&self, gid: u32) -> bool {
        match self.tile_count {
            Some(count) => gid >= self.first_gid && gid < self.first_gid + count,
            // No declared count: matches every gid.
            None => true,
        }
    }
}

/// A rectangular grid of tiles plus the tilesets that texture it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TileLayerData {
    /// World position of the grid's origin corner.
    pub origin: Vec2,
    /// Grid width in tiles.
    pub columns: u32,
    /// Grid height in tiles.
    pub rows: u32,
    /// Extent of one tile in world units (also the atlas cell size in texels).
    pub tile_size: Vec2,
    /// Row-major global tile ids; 0 means "empty cell, draw nothing".
    pub gids: Vec<u32>,
    /// Tilesets in declaration order.
    pub tilesets: Vec<TilesetRef>,
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Horizontal placement of justified text within its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

/// Vertical placement of justified text within its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

/// Text layout request.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Justification {
    /// Lay out from the box origin; wrap to the box width when `wrap` is
    /// set, otherwise a single unbounded line.
    Unjustified { wrap: bool },
    /// Align the measured text within the box on both axes.
    Justified {
        horizontal: HorizontalAlign,
        vertical: VerticalAlign,
    },
}

/// A one-shot text draw. The message's asset tag names the font.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextData {
    pub text: String,
    /// World position of the layout box's origin corner.
    pub position: Vec2,
    /// Layout box extent in world units.
    pub box_size: Vec2,
    pub justify: Justification,
    pub color: Color,
}

// ---------------------------------------------------------------------------
// RenderCallback
// ---------------------------------------------------------------------------

/// Escape hatch: arbitrary drawing against the raw backend.
///
/// Invoked at its message's position in paint order with the current eye.
pub struct RenderCallback(Box<dyn Fn(&Eye, &mut dyn GraphicsBackend) + Send>);

impl RenderCallback {
    /// Wrap a callback function.
    pub fn new(f: impl Fn(&Eye, &mut dyn GraphicsBackend) + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    /// Invoke the callback.
    pub fn invoke(&self, eye: &Eye, backend: &mut dyn GraphicsBackend) {
        (self.0)(eye, backend);
    }
}

impl fmt::Debug for RenderCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RenderCallback(..)")
    }
}

// ---------------------------------------------------------------------------
// RenderDescriptor
// ---------------------------------------------------------------------------

/// Closed union over every draw primitive the core renders.
#[derive(Debug)]
pub enum RenderDescriptor {
    /// A single sprite.
    Sprite(SpriteData),
    /// A homogeneous batch of sprites sharing one texture.
    SpriteBatch(Vec<SpriteData>),
    /// A chunked batch, for producers that build sprites segment by segment
    /// without reallocating one large array.
    SegmentedSpriteBatch(Vec<Vec<SpriteData>>),
    /// A pool-recycled sprite; payload is rewritten in place on reuse.
    CachedSprite(SpriteData),
    /// Particles drawn in array order.
    Particles(Vec<ParticleData>),
    /// A tile grid textured from one or more tilesets.
    TileLayer(TileLayerData),
    /// One-shot rasterized text.
    Text(TextData),
    /// An owned overlay draw list, passed through to the backend.
    ExternalDrawList(ExternalDrawList),
    /// A shared, externally retained overlay draw list.
    ExternalDrawData(Arc<ExternalDrawList>),
    /// Arbitrary drawing against the raw backend.
    Callback(RenderCallback),
}

impl RenderDescriptor {
    /// True for the pool-recycled sprite kind.
    pub fn is_cached_sprite(&self) -> bool {
        matches!(self, RenderDescriptor::CachedSprite(_))
    }
}

// ---------------------------------------------------------------------------
// LayeredMessage
// ---------------------------------------------------------------------------

/// One draw request with its paint-order keys.
///
/// Semantically a value type; fields are public only so pooled messages can
/// be rewritten in place.
#[derive(Debug)]
pub struct LayeredMessage {
    /// Coarse draw-order bucket, ascending.
    pub elevation: f32,
    /// Fine depth within a bucket; larger draws earlier (back-to-front).
    pub horizon: f32,
    /// The asset this message draws with.
    pub tag: AssetTag,
    /// What to draw.
    pub descriptor: RenderDescriptor,
}

impl LayeredMessage {
    /// Construct a layered message.
    pub fn new(elevation: f32, horizon: f32, tag: AssetTag, descriptor: RenderDescriptor) -> Self {
        Self {
            elevation,
            horizon,
            tag,
            descriptor,
        }
    }

    /// Paint-order comparator: elevation ascending, then horizon
    /// descending, then asset and package names for a deterministic total
    /// order. Used with a stable sort, so fully tied messages keep their
    /// enqueue order.
    pub fn paint_cmp(&self, other: &LayeredMessage) -> Ordering {
        self.elevation
            .total_cmp(&other.elevation)
            .then_with(|| other.horizon.total_cmp(&self.horizon))
            .then_with(|| self.tag.asset.cmp(&other.tag.asset))
            .then_with(|| self.tag.package.cmp(&other.tag.package))
    }
}

// ---------------------------------------------------------------------------
// RenderMessage
// ---------------------------------------------------------------------------

/// Everything the simulation layer can send to the renderer.
#[derive(Debug)]
pub enum RenderMessage {
    /// A draw request.
    Layered(LayeredMessage),
    /// Eagerly load a package before it is first drawn from.
    HintPackageUse(String),
    /// Free a package that will not be drawn from again. No-op if absent.
    HintPackageDisuse(String),
    /// Free and reload every loaded package (assets changed on disk).
    ReloadAssets,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(elevation: f32, horizon: f32, package: &str, asset: &str) -> LayeredMessage {
        LayeredMessage::new(
            elevation,
            horizon,
            AssetTag::new(package, asset),
            RenderDescriptor::Sprite(SpriteData::default()),
        )
    }

    #[test]
    fn paint_cmp_orders_elevation_ascending() {
        let low = msg(1.0, 0.0, "p", "a");
        let high = msg(2.0, 0.0, "p", "a");
        assert_eq!(low.paint_cmp(&high), Ordering::Less);
    }

    #[test]
    fn paint_cmp_orders_horizon_descending_within_elevation() {
        let near = msg(1.0, 5.0, "p", "a");
        let far = msg(1.0, 1.0, "p", "a");
        assert_eq!(near.paint_cmp(&far), Ordering::Less, "larger horizon draws first");
    }

    #[test]
    fn paint_cmp_breaks_ties_on_asset_then_package() {
        let a = msg(1.0, 1.0, "pb", "aa");
        let b = msg(1.0, 1.0, "pa", "ab");
        assert_eq!(a.paint_cmp(&b), Ordering::Less, "asset name compares before package");

        let c = msg(1.0, 1.0, "pa", "aa");
        let d = msg(1.0, 1.0, "pb", "aa");
        assert_eq!(c.paint_cmp(&d), Ordering::Less);
    }

    #[test]
    fn tileset_without_count_matches_any_gid() {
        let unbounded = TilesetRef {
            asset: "tiles".to_owned(),
            first_gid: 100,
            tile_count: None,
            columns: 8,
        };
        assert!(unbounded.owns(1), "unbounded tileset matches below first_gid too");
        assert!(unbounded.owns(10_000));

        let bounded = TilesetRef {
            asset: "tiles".to_owned(),
            first_gid: 1,
            tile_count: Some(16),
            columns: 8,
        };
        assert!(bounded.owns(16));
        assert!(!bounded.owns(17));
    }
}
