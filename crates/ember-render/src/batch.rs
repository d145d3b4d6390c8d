//! Stateless descriptor-to-quad translation.
//!
//! Free functions that turn one render descriptor into backend submissions.
//! Each function is pure translation: no state survives a call, ordering is
//! the caller's (the compositor's) responsibility, and every function here
//! processes its input in the order given.

use ember_gfx::backend::{Eye, GraphicsBackend, QuadSubmission};
use ember_gfx::blend::BlendMode;
use ember_gfx::color::Color;
use ember_gfx::draw_list::ExternalDrawList;
use ember_gfx::handle::{FontHandle, TextureHandle, TextureMetadata};
use ember_gfx::math::{Rect, Vec2};
use ember_gfx::BackendError;

use crate::message::{
    Flip, HorizontalAlign, Justification, ParticleData, SpriteData, TextData, TileLayerData,
    VerticalAlign,
};

/// Atlas-bleed bias in texels: inset UV rectangles are shrunk by half a
/// texel per edge so filtering never samples a neighboring atlas cell.
const UV_BLEED_BIAS: f32 = 0.5;

// ---------------------------------------------------------------------------
// Sprites
// ---------------------------------------------------------------------------

/// Submit one sprite as up to two quads: a normal pass with the sprite's
/// tint and blend mode, and an additive glow pass.
///
/// The two passes are independent: each fires when its color's alpha is
/// non-zero, and both may fire for one sprite.
pub fn submit_sprite<B: GraphicsBackend + ?Sized>(
    backend: &mut B,
    eye: &Eye,
    viewport: Vec2,
    sprite: &SpriteData,
    metadata: &TextureMetadata,
    texture: TextureHandle,
) {
    let uv = uv_rect(sprite.inset, metadata, sprite.flip);
    let position = if sprite.absolute {
        // Viewport pixels to world units through the eye.
        eye.min_corner() + sprite.position * (eye.extent / viewport)
    } else {
        sprite.position
    };

    if !sprite.color.is_transparent() {
        backend.submit_quad(&QuadSubmission {
            position,
            size: sprite.size,
            pivot: sprite.pivot,
            rotation: sprite.rotation,
            uv,
            color: sprite.color,
            blend: sprite.blend.triple(),
            texture,
        });
    }

    if !sprite.glow.is_transparent() {
        backend.submit_quad(&QuadSubmission {
            position,
            size: sprite.size,
            pivot: sprite.pivot,
            rotation: sprite.rotation,
            uv,
            color: sprite.glow,
            blend: BlendMode::Additive.triple(),
            texture,
        });
    }
}

/// Compute the UV rectangle for a sprite.
///
/// Pixel-space insets are shrunk by the bleed bias and scaled to UV space.
/// Without an inset the whole texture is read through a Y-flipped unit
/// rectangle. Flips negate and offset the corresponding UV extent.
fn uv_rect(inset: Option<Rect>, metadata: &TextureMetadata, flip: Flip) -> Rect {
    let (tx, ty) = metadata.texel_size();
    let mut uv = match inset {
        Some(r) => Rect::new(
            (r.x + UV_BLEED_BIAS) * tx,
            (r.y + UV_BLEED_BIAS) * ty,
            (r.w - 2.0 * UV_BLEED_BIAS) * tx,
            (r.h - 2.0 * UV_BLEED_BIAS) * ty,
        ),
        None => Rect::new(0.0, 1.0, 1.0, -1.0),
    };
    if flip.horizontal {
        uv.x += uv.w;
        uv.w = -uv.w;
    }
    if flip.vertical {
        uv.y += uv.h;
        uv.h = -uv.h;
    }
    uv
}

// ---------------------------------------------------------------------------
// Particles
// ---------------------------------------------------------------------------

/// Submit a particle batch through the single-sprite path.
///
/// Particles are processed strictly in array order; the producer's order is
/// the z-order.
pub fn submit_particles<B: GraphicsBackend + ?Sized>(
    backend: &mut B,
    eye: &Eye,
    viewport: Vec2,
    particles: &[ParticleData],
    metadata: &TextureMetadata,
    texture: TextureHandle,
) {
    for particle in particles {
        let sprite = SpriteData {
            absolute: false,
            position: particle.position,
            size: particle.size,
            pivot: Vec2::splat(0.5),
            rotation: particle.rotation,
            inset: particle.inset,
            color: particle.color,
            blend: BlendMode::Transparent,
            glow: particle.glow,
            flip: particle.flip,
        };
        submit_sprite(backend, eye, viewport, &sprite, metadata, texture);
    }
}

// ---------------------------------------------------------------------------
// Tile layers
// ---------------------------------------------------------------------------

/// Resolved tileset texture passed in by the compositor, keyed by the
/// tileset's position in the layer's declaration order. `None` means the
/// texture asset could not be resolved (already logged by the caller).
pub type TilesetTextures = Vec<Option<(TextureMetadata, TextureHandle)>>;

/// Submit a tile layer as one inset sprite per non-empty, visible tile.
///
/// Cells with gid 0 are empty. Each gid is resolved to the first tileset
/// that owns it, in declaration order; if any gid matches no tileset the
/// whole layer is skipped with a single log line, before anything is
/// submitted. Tiles fully outside the eye's world rectangle are culled (a
/// pure performance optimization; it never changes which layers draw).
pub fn submit_tile_layer<B: GraphicsBackend + ?Sized>(
    backend: &mut B,
    eye: &Eye,
    viewport: Vec2,
    layer: &TileLayerData,
    textures: &TilesetTextures,
) {
    // Validate every non-empty gid up front. The abort decision must not
    // depend on culling, and no tile may be submitted before it is made.
    if let Some(&gid) = layer
        .gids
        .iter()
        .find(|&&gid| gid != 0 && !layer.tilesets.iter().any(|ts| ts.owns(gid)))
    {
        tracing::warn!(gid, "no tileset owns gid; skipping tile layer");
        return;
    }

    let camera = eye.world_rect();
    let columns = layer.columns.max(1);
    let mut missing_texture_logged = false;

    for (index, &gid) in layer.gids.iter().enumerate() {
        if gid == 0 {
            continue;
        }

        let col = index as u32 % columns;
        let row = index as u32 / columns;
        let center = layer.origin
            + Vec2::new(
                (col as f32 + 0.5) * layer.tile_size.x,
                (row as f32 + 0.5) * layer.tile_size.y,
            );

        let cell = Rect::from_center(center, layer.tile_size);
        if !cell.intersects(&camera) {
            continue;
        }

        let Some(tileset_index) = layer.tilesets.iter().position(|ts| ts.owns(gid)) else {
            // Unreachable: every gid was validated above.
            continue;
        };
        let tileset = &layer.tilesets[tileset_index];

        let Some((metadata, texture)) = textures.get(tileset_index).copied().flatten() else {
            if !missing_texture_logged {
                tracing::warn!(
                    tileset = %tileset.asset,
                    "tileset texture unresolved; skipping its tiles"
                );
                missing_texture_logged = true;
            }
            continue;
        };

        // Local id within the tileset selects the atlas cell.
        let local = gid.saturating_sub(tileset.first_gid);
        let atlas_columns = tileset.columns.max(1);
        let src = Rect::new(
            (local % atlas_columns) as f32 * layer.tile_size.x,
            (local / atlas_columns) as f32 * layer.tile_size.y,
            layer.tile_size.x,
            layer.tile_size.y,
        );

        let sprite = SpriteData {
            absolute: false,
            position: center,
            size: layer.tile_size,
            pivot: Vec2::splat(0.5),
            rotation: 0.0,
            inset: Some(src),
            color: Color::WHITE,
            blend: BlendMode::Transparent,
            glow: Color::TRANSPARENT,
            flip: Flip::NONE,
        };
        submit_sprite(backend, eye, viewport, &sprite, &metadata, texture);
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Submit a one-shot text draw.
///
/// Rasterizes the text through the backend, uploads the surface as a
/// temporary texture, draws a single quad sized to the surface, and
/// destroys both the texture and the surface before returning. Nothing is
/// cached; callers needing throughput must batch or cache externally.
pub fn submit_text<B: GraphicsBackend + ?Sized>(
    backend: &mut B,
    text: &TextData,
    font: FontHandle,
) -> Result<(), BackendError> {
    let wrap = match text.justify {
        Justification::Unjustified { wrap: true } => Some(text.box_size.x.max(1.0) as u32),
        Justification::Unjustified { wrap: false } => None,
        Justification::Justified { .. } => None,
    };

    let surface = backend.rasterize_text(font, &text.text, wrap)?;
    let (metadata, texture) = match backend.upload_surface(&surface) {
        Ok(uploaded) => uploaded,
        Err(error) => {
            backend.destroy_surface(surface);
            return Err(error);
        }
    };

    let measured = Vec2::new(surface.width as f32, surface.height as f32);
    let offset = match text.justify {
        Justification::Unjustified { .. } => Vec2::ZERO,
        Justification::Justified {
            horizontal,
            vertical,
        } => Vec2::new(
            match horizontal {
                HorizontalAlign::Left => 0.0,
                HorizontalAlign::Center => (text.box_size.x - measured.x) / 2.0,
                HorizontalAlign::Right => text.box_size.x - measured.x,
            },
            match vertical {
                VerticalAlign::Top => 0.0,
                VerticalAlign::Middle => (text.box_size.y - measured.y) / 2.0,
                VerticalAlign::Bottom => text.box_size.y - measured.y,
            },
        ),
    };

    backend.submit_quad(&QuadSubmission {
        position: text.position + offset + measured / 2.0,
        size: measured,
        pivot: Vec2::splat(0.5),
        rotation: 0.0,
        // Uploaded surfaces are top-down; no Y flip.
        uv: Rect::new(0.0, 0.0, 1.0, 1.0),
        color: text.color,
        blend: BlendMode::Transparent.triple(),
        texture,
    });

    backend.destroy_texture(texture);
    backend.destroy_surface(surface);
    Ok(())
}

// ---------------------------------------------------------------------------
// External draw lists
// ---------------------------------------------------------------------------

/// Pass an overlay draw list through to the backend.
///
/// The backend owns state save/restore around the list (see the
/// [`GraphicsBackend::submit_draw_list`] contract); this path must be
/// side-effect-free on the surrounding quad stream.
pub fn submit_external_draw_list<B: GraphicsBackend + ?Sized>(
    backend: &mut B,
    list: &ExternalDrawList,
) {
    backend.submit_draw_list(list);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(width: u32, height: u32) -> TextureMetadata {
        TextureMetadata { width, height }
    }

    #[test]
    fn uv_without_inset_reads_whole_texture_flipped() {
        let uv = uv_rect(None, &meta(64, 64), Flip::NONE);
        assert_eq!(uv, Rect::new(0.0, 1.0, 1.0, -1.0));
    }

    #[test]
    fn uv_inset_applies_half_texel_bias() {
        let uv = uv_rect(Some(Rect::new(16.0, 32.0, 16.0, 16.0)), &meta(64, 64), Flip::NONE);
        let texel = 1.0 / 64.0;
        assert!((uv.x - 16.5 * texel).abs() < 1e-6);
        assert!((uv.y - 32.5 * texel).abs() < 1e-6);
        assert!((uv.w - 15.0 * texel).abs() < 1e-6);
        assert!((uv.h - 15.0 * texel).abs() < 1e-6);
    }

    #[test]
    fn horizontal_flip_negates_and_offsets_u() {
        let plain = uv_rect(None, &meta(64, 64), Flip::NONE);
        let flipped = uv_rect(
            None,
            &meta(64, 64),
            Flip {
                horizontal: true,
                vertical: false,
            },
        );
        assert_eq!(flipped.x, plain.x + plain.w);
        assert_eq!(flipped.w, -plain.w);
        assert_eq!(flipped.y, plain.y);
    }
}
