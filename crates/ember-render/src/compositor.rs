//! Per-frame message collection, paint-order sort, and ordered dispatch.
//!
//! The compositor runs one frame as a fixed four-step machine: collect the
//! incoming messages (applying package hints immediately, in the order
//! received), stably sort the layered messages into paint order, dispatch
//! each descriptor to the batcher bracketed by `begin_frame`/`end_frame`,
//! and clear the frame sequence. Dispatch order is the one load-bearing
//! ordering in the whole core: violating it changes visible overdraw.
//!
//! Unresolvable asset tags skip their draw and log once per tag; the frame
//! as a whole always completes.

use std::collections::HashSet;
use std::sync::Arc;

use ember_gfx::backend::{Eye, GraphicsBackend};
use ember_gfx::handle::{FontHandle, TextureHandle, TextureMetadata};
use ember_gfx::math::Vec2;

use crate::assets::{AssetCache, AssetGraph, RenderAsset};
use crate::batch;
use crate::message::{AssetTag, LayeredMessage, RenderDescriptor, RenderMessage};
use crate::pool::MessagePool;

// ---------------------------------------------------------------------------
// FrameCompositor
// ---------------------------------------------------------------------------

/// Collects, orders, and dispatches one frame of render messages.
///
/// Owns the [`AssetCache`]; in threaded mode the compositor (and therefore
/// all cache state) is confined to the worker thread.
pub struct FrameCompositor {
    cache: AssetCache,
    /// Per-frame layered sequence. Cleared after dispatch; the allocation
    /// is retained across frames.
    frame: Vec<LayeredMessage>,
    /// Tags already reported as unresolvable, to keep the skip log to one
    /// line per tag.
    missing_logged: HashSet<AssetTag>,
}

impl FrameCompositor {
    /// A compositor resolving packages through `graph`.
    pub fn new(graph: Arc<dyn AssetGraph>) -> Self {
        Self {
            cache: AssetCache::new(graph),
            frame: Vec::new(),
            missing_logged: HashSet::new(),
        }
    }

    /// Render one frame.
    ///
    /// Consumes the submitted messages: hints mutate the cache immediately
    /// as they are encountered, layered messages are collected, sorted
    /// stably by paint order, and dispatched in order between
    /// `begin_frame` and `end_frame`. Afterwards the frame sequence is
    /// emptied -- recycled into `pool` where one is provided, dropped
    /// otherwise.
    pub fn render<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        messages: Vec<RenderMessage>,
        eye: &Eye,
        viewport: Vec2,
        pool: Option<&MessagePool>,
    ) {
        // Collect. Hints apply in the order received, interleaved with
        // message collection.
        for message in messages {
            match message {
                RenderMessage::Layered(layered) => self.frame.push(layered),
                RenderMessage::HintPackageUse(name) => self.cache.hint_use(&name, backend),
                RenderMessage::HintPackageDisuse(name) => self.cache.hint_disuse(&name, backend),
                RenderMessage::ReloadAssets => self.cache.reload_all(backend),
            }
        }

        // Sort. `sort_by` is stable, so fully tied messages keep their
        // enqueue order.
        self.frame.sort_by(LayeredMessage::paint_cmp);

        // Render in order.
        backend.begin_frame(eye, viewport);
        let Self {
            cache,
            frame,
            missing_logged,
        } = self;
        for message in frame.iter() {
            dispatch(cache, missing_logged, backend, eye, viewport, message);
        }
        backend.end_frame();

        // Clear, recycling pooled messages.
        match pool {
            Some(pool) => pool.recycle_batch(self.frame.drain(..)),
            None => self.frame.clear(),
        }
    }

    /// Free every cached asset. Called at renderer clean-up.
    pub fn shutdown<B: GraphicsBackend>(&mut self, backend: &mut B) {
        self.cache.shutdown(backend);
        self.frame.clear();
        self.missing_logged.clear();
    }

    /// The underlying asset cache.
    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Dispatch one sorted message's descriptor to the batcher.
fn dispatch<B: GraphicsBackend>(
    cache: &mut AssetCache,
    missing_logged: &mut HashSet<AssetTag>,
    backend: &mut B,
    eye: &Eye,
    viewport: Vec2,
    message: &LayeredMessage,
) {
    match &message.descriptor {
        RenderDescriptor::Sprite(sprite) | RenderDescriptor::CachedSprite(sprite) => {
            if let Some((metadata, texture)) =
                resolve_texture(cache, missing_logged, backend, &message.tag)
            {
                batch::submit_sprite(backend, eye, viewport, sprite, &metadata, texture);
            }
        }
        RenderDescriptor::SpriteBatch(sprites) => {
            if let Some((metadata, texture)) =
                resolve_texture(cache, missing_logged, backend, &message.tag)
            {
                for sprite in sprites {
                    batch::submit_sprite(backend, eye, viewport, sprite, &metadata, texture);
                }
            }
        }
        RenderDescriptor::SegmentedSpriteBatch(segments) => {
            if let Some((metadata, texture)) =
                resolve_texture(cache, missing_logged, backend, &message.tag)
            {
                for segment in segments {
                    for sprite in segment {
                        batch::submit_sprite(backend, eye, viewport, sprite, &metadata, texture);
                    }
                }
            }
        }
        RenderDescriptor::Particles(particles) => {
            if let Some((metadata, texture)) =
                resolve_texture(cache, missing_logged, backend, &message.tag)
            {
                batch::submit_particles(backend, eye, viewport, particles, &metadata, texture);
            }
        }
        RenderDescriptor::TileLayer(layer) => {
            let textures: batch::TilesetTextures = layer
                .tilesets
                .iter()
                .map(|tileset| {
                    let tag = AssetTag::new(message.tag.package.clone(), tileset.asset.clone());
                    resolve_texture(cache, missing_logged, backend, &tag)
                })
                .collect();
            batch::submit_tile_layer(backend, eye, viewport, layer, &textures);
        }
        RenderDescriptor::Text(text) => {
            if let Some(font) = resolve_font(cache, missing_logged, backend, &message.tag) {
                if let Err(error) = batch::submit_text(backend, text, font) {
                    tracing::warn!(tag = %message.tag, %error, "text draw failed; skipped");
                }
            }
        }
        RenderDescriptor::ExternalDrawList(list) => {
            batch::submit_external_draw_list(backend, list);
        }
        RenderDescriptor::ExternalDrawData(list) => {
            batch::submit_external_draw_list(backend, list);
        }
        RenderDescriptor::Callback(callback) => {
            callback.invoke(eye, backend);
        }
    }
}

/// Resolve a tag to a texture, logging once per tag on failure.
fn resolve_texture<B: GraphicsBackend>(
    cache: &mut AssetCache,
    missing_logged: &mut HashSet<AssetTag>,
    backend: &mut B,
    tag: &AssetTag,
) -> Option<(TextureMetadata, TextureHandle)> {
    match cache.try_find(tag, backend) {
        Some(RenderAsset::Texture { metadata, handle }) => Some((metadata, handle)),
        Some(RenderAsset::Font { .. }) => {
            log_unresolvable(missing_logged, tag, "asset is a font, texture required");
            None
        }
        None => {
            log_unresolvable(missing_logged, tag, "asset not found");
            None
        }
    }
}

/// Resolve a tag to a font, logging once per tag on failure.
fn resolve_font<B: GraphicsBackend>(
    cache: &mut AssetCache,
    missing_logged: &mut HashSet<AssetTag>,
    backend: &mut B,
    tag: &AssetTag,
) -> Option<FontHandle> {
    match cache.try_find(tag, backend) {
        Some(RenderAsset::Font { handle, .. }) => Some(handle),
        Some(RenderAsset::Texture { .. }) => {
            log_unresolvable(missing_logged, tag, "asset is a texture, font required");
            None
        }
        None => {
            log_unresolvable(missing_logged, tag, "asset not found");
            None
        }
    }
}

fn log_unresolvable(missing_logged: &mut HashSet<AssetTag>, tag: &AssetTag, reason: &str) {
    if missing_logged.insert(tag.clone()) {
        tracing::warn!(tag = %tag, reason, "draw skipped");
    }
}
