//! Package-grouped asset cache for backend-bound resources.
//!
//! Renderable assets (textures, fonts) are grouped into named packages.
//! Packages load lazily on first reference or eagerly on a use hint, and
//! are freed on a disuse hint, on wholesale reload, or at shutdown. Every
//! backend handle owned by the cache is destroyed exactly once.
//!
//! Asset lookup is dominated by the same handful of tags every frame, so
//! [`AssetCache::try_find`] keeps a two-level "last package / last asset"
//! memo in front of the package map: two optional name/value slots that are
//! invalidated together on any structural mutation, never a general LRU.
//!
//! Load failures are per-asset and non-fatal: a bad file is logged and
//! dropped, and the rest of the package still loads. Resolution failures
//! are per-package and equally non-fatal.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ember_gfx::backend::GraphicsBackend;
use ember_gfx::handle::{FontHandle, TextureHandle, TextureMetadata};
use ember_gfx::BackendError;

use crate::message::AssetTag;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while resolving or loading assets.
///
/// All of these are environmental and non-fatal: the failing asset or
/// package is logged and skipped, and rendering continues without it.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// The asset graph could not resolve a package's contents.
    #[error("package '{package}' could not be resolved: {details}")]
    PackageResolution { package: String, details: String },

    /// The file extension maps to no known asset kind.
    #[error("'{path}' has no recognized asset extension")]
    UnsupportedExtension { path: String },

    /// A font file name carries no parsable trailing point size.
    #[error("font file '{name}' is too short or lacks a trailing point-size suffix")]
    FontSizeSuffix { name: String },

    /// The backend rejected the resource.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

// ---------------------------------------------------------------------------
// AssetGraph
// ---------------------------------------------------------------------------

/// External collaborator that maps a package name to its asset list.
pub trait AssetGraph: Send + Sync {
    /// Resolve a package to `(asset name, file path)` pairs.
    fn resolve_package_contents(&self, package: &str) -> Result<Vec<(String, PathBuf)>, AssetError>;
}

/// In-memory [`AssetGraph`], optionally populated from a JSON manifest.
///
/// The manifest form is a map of package names to `{ asset: path }` maps:
///
/// ```
/// use ember_render::assets::StaticAssetGraph;
///
/// let graph = StaticAssetGraph::from_json_str(
///     r#"{ "hud": { "cursor": "art/cursor.png", "label": "fonts/label_14.ttf" } }"#,
/// )
/// .expect("valid manifest");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticAssetGraph {
    packages: HashMap<String, Vec<(String, PathBuf)>>,
}

impl StaticAssetGraph {
    /// An empty graph (every resolution fails).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package's contents, replacing any previous entry.
    pub fn insert_package(
        &mut self,
        name: impl Into<String>,
        entries: Vec<(String, PathBuf)>,
    ) {
        self.packages.insert(name.into(), entries);
    }

    /// Parse a JSON manifest into a graph.
    ///
    /// Assets within a package are sorted by name so load order (and thus
    /// handle assignment) is deterministic regardless of JSON key order.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, HashMap<String, String>> = serde_json::from_str(json)?;
        let mut graph = Self::new();
        for (package, assets) in raw {
            let mut entries: Vec<(String, PathBuf)> = assets
                .into_iter()
                .map(|(name, path)| (name, PathBuf::from(path)))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            graph.packages.insert(package, entries);
        }
        Ok(graph)
    }
}

impl AssetGraph for StaticAssetGraph {
    fn resolve_package_contents(&self, package: &str) -> Result<Vec<(String, PathBuf)>, AssetError> {
        self.packages
            .get(package)
            .cloned()
            .ok_or_else(|| AssetError::PackageResolution {
                package: package.to_owned(),
                details: "package is not in the asset graph".to_owned(),
            })
    }
}

// ---------------------------------------------------------------------------
// RenderAsset / Package
// ---------------------------------------------------------------------------

/// A loaded, backend-bound asset.
///
/// Each value owns exactly one backend handle; the cache destroys it
/// exactly once when the asset is freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderAsset {
    Texture {
        metadata: TextureMetadata,
        handle: TextureHandle,
    },
    Font {
        point_size: u32,
        handle: FontHandle,
    },
}

/// A named group of assets loaded and freed as a unit.
#[derive(Debug, Default)]
pub struct Package {
    assets: HashMap<String, RenderAsset>,
}

impl Package {
    /// Look up an asset by name.
    pub fn get(&self, asset: &str) -> Option<&RenderAsset> {
        self.assets.get(asset)
    }

    /// Number of loaded assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// True if no assets loaded (e.g. every entry failed).
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

// ---------------------------------------------------------------------------
// AssetCache
// ---------------------------------------------------------------------------

/// Two-level memo in front of the package map.
///
/// Both slots are cleared together before any structural mutation becomes
/// visible, so the memo can never hand out a freed handle.
#[derive(Debug)]
struct Memo {
    package: String,
    asset: Option<(String, RenderAsset)>,
}

/// Loads, memoizes, and frees packages of renderable assets.
pub struct AssetCache {
    packages: HashMap<String, Package>,
    graph: Arc<dyn AssetGraph>,
    memo: Option<Memo>,
    /// Packages whose resolution failed and was already logged. Resolution
    /// is still retried on every reference; only the logging is one-shot.
    resolution_failed: HashSet<String>,
}

impl AssetCache {
    /// A cache resolving packages through `graph`. Nothing is loaded yet.
    pub fn new(graph: Arc<dyn AssetGraph>) -> Self {
        Self {
            packages: HashMap::new(),
            graph,
            memo: None,
            resolution_failed: HashSet::new(),
        }
    }

    /// Resolve a tag to its loaded asset.
    ///
    /// Checks the memo ("same package as last time?", then "same asset?"),
    /// falls through to the package map, and -- if the package has never
    /// been loaded -- loads it on demand and retries once. Returns `None`
    /// if the package or asset is still absent; the caller skips the draw.
    pub fn try_find(
        &mut self,
        tag: &AssetTag,
        backend: &mut dyn GraphicsBackend,
    ) -> Option<RenderAsset> {
        if self.memo.as_ref().is_some_and(|m| m.package == tag.package) {
            if let Some(m) = &self.memo {
                if let Some((name, asset)) = &m.asset {
                    if *name == tag.asset {
                        return Some(*asset);
                    }
                }
            }
            // Same package, different asset: one map chain, then re-memo.
            let found = self
                .packages
                .get(&tag.package)
                .and_then(|p| p.get(&tag.asset))
                .copied();
            if let Some(asset) = found {
                self.remember(tag, asset);
            }
            return found;
        }

        if !self.packages.contains_key(&tag.package) {
            if !self.resolution_failed.contains(&tag.package) {
                tracing::info!(package = %tag.package, "package not loaded; loading on demand");
            }
            self.load_package(&tag.package, backend);
        }

        let found = self
            .packages
            .get(&tag.package)
            .and_then(|p| p.get(&tag.asset))
            .copied();
        if let Some(asset) = found {
            self.remember(tag, asset);
        }
        found
    }

    /// Load (or merge into) a package by resolving it through the asset
    /// graph. Assets that fail to load are logged and dropped; the rest of
    /// the package still loads.
    pub fn load_package(&mut self, name: &str, backend: &mut dyn GraphicsBackend) {
        self.memo = None;

        let contents = match self.graph.resolve_package_contents(name) {
            Ok(contents) => {
                self.resolution_failed.remove(name);
                contents
            }
            Err(error) => {
                if self.resolution_failed.insert(name.to_owned()) {
                    tracing::warn!(package = %name, %error, "package resolution failed");
                }
                return;
            }
        };

        let package = self.packages.entry(name.to_owned()).or_default();
        for (asset_name, path) in contents {
            match load_asset(&path, backend) {
                Ok(asset) => {
                    if let Some(replaced) = package.assets.insert(asset_name, asset) {
                        free_asset(replaced, backend);
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        package = %name,
                        path = %path.display(),
                        %error,
                        "asset failed to load; dropped"
                    );
                }
            }
        }
    }

    /// Eagerly load a package ahead of its first draw. Already-loaded
    /// packages are left as they are.
    pub fn hint_use(&mut self, name: &str, backend: &mut dyn GraphicsBackend) {
        if !self.packages.contains_key(name) {
            self.load_package(name, backend);
        }
    }

    /// Free and remove a package. No-op if the package was never loaded.
    pub fn hint_disuse(&mut self, name: &str, backend: &mut dyn GraphicsBackend) {
        if !self.packages.contains_key(name) {
            return;
        }
        self.memo = None;
        if let Some(package) = self.packages.remove(name) {
            free_package(package, backend);
        }
    }

    /// Free every loaded package, then reload each by name. Used after
    /// assets change on disk.
    pub fn reload_all(&mut self, backend: &mut dyn GraphicsBackend) {
        self.memo = None;

        let mut names: Vec<String> = self.packages.keys().cloned().collect();
        names.sort();

        for name in &names {
            if let Some(package) = self.packages.remove(name) {
                free_package(package, backend);
            }
        }
        for name in &names {
            self.load_package(name, backend);
        }
    }

    /// Free every remaining asset. Called at renderer clean-up.
    pub fn shutdown(&mut self, backend: &mut dyn GraphicsBackend) {
        self.memo = None;
        let mut names: Vec<String> = self.packages.keys().cloned().collect();
        names.sort();
        for name in names {
            if let Some(package) = self.packages.remove(&name) {
                free_package(package, backend);
            }
        }
    }

    /// True if the named package is currently loaded.
    pub fn is_loaded(&self, package: &str) -> bool {
        self.packages.contains_key(package)
    }

    fn remember(&mut self, tag: &AssetTag, asset: RenderAsset) {
        self.memo = Some(Memo {
            package: tag.package.clone(),
            asset: Some((tag.asset.clone(), asset)),
        });
    }
}

// ---------------------------------------------------------------------------
// Asset loading helpers
// ---------------------------------------------------------------------------

/// Image extensions loaded as textures.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tga"];

/// Font extensions loaded as fonts.
const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "fnt"];

/// Load one asset, dispatching on file extension.
fn load_asset(path: &Path, backend: &mut dyn GraphicsBackend) -> Result<RenderAsset, AssetError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        let (metadata, handle) = backend.create_texture(path)?;
        return Ok(RenderAsset::Texture { metadata, handle });
    }

    if FONT_EXTENSIONS.contains(&extension.as_str()) {
        let point_size = font_point_size(path)?;
        let handle = backend.create_font(path, point_size)?;
        return Ok(RenderAsset::Font { point_size, handle });
    }

    Err(AssetError::UnsupportedExtension {
        path: path.display().to_string(),
    })
}

/// Parse the trailing numeric suffix of a font file's stem as its point
/// size (`label_14.ttf` -> 14).
fn font_point_size(path: &Path) -> Result<u32, AssetError> {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let digits: String = stem
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    if stem.len() <= digits.len() || digits.is_empty() {
        return Err(AssetError::FontSizeSuffix {
            name: stem.to_owned(),
        });
    }
    digits.parse().map_err(|_| AssetError::FontSizeSuffix {
        name: stem.to_owned(),
    })
}

/// Destroy the backend handle owned by one asset.
fn free_asset(asset: RenderAsset, backend: &mut dyn GraphicsBackend) {
    match asset {
        RenderAsset::Texture { handle, .. } => backend.destroy_texture(handle),
        RenderAsset::Font { handle, .. } => backend.destroy_font(handle),
    }
}

/// Destroy every handle in a package, in asset-name order so teardown is
/// deterministic run to run.
fn free_package(package: Package, backend: &mut dyn GraphicsBackend) {
    let mut assets: Vec<(String, RenderAsset)> = package.assets.into_iter().collect();
    assets.sort_by(|a, b| a.0.cmp(&b.0));
    for (_, asset) in assets {
        free_asset(asset, backend);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_point_size_parses_trailing_suffix() {
        assert_eq!(font_point_size(Path::new("fonts/label_14.ttf")).unwrap(), 14);
        assert_eq!(font_point_size(Path::new("big240.otf")).unwrap(), 240);
    }

    #[test]
    fn font_point_size_rejects_missing_suffix() {
        assert!(font_point_size(Path::new("label.ttf")).is_err());
    }

    #[test]
    fn font_point_size_rejects_digits_only_name() {
        // Nothing before the digits: the name is just a number, which the
        // loader treats as "too short".
        assert!(font_point_size(Path::new("14.ttf")).is_err());
    }

    #[test]
    fn json_manifest_round_trips_into_graph() {
        let graph = StaticAssetGraph::from_json_str(
            r#"{ "world": { "grass": "art/grass.png", "hero": "art/hero.png" } }"#,
        )
        .expect("valid manifest");
        let contents = graph.resolve_package_contents("world").expect("resolves");
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].0, "grass", "entries are sorted by asset name");
    }
}
