//! Sprite atlas store.
//!
//! Maps sprite names to regions within loaded texture pages. The store is
//! read-only from the frame pipeline's perspective; it is populated at load
//! time, either programmatically or from a TexturePacker-style JSON hash
//! file whose texture page is uploaded through the rendering backend.
//! Texture lifetime belongs to the backend, never to the sprite registry.

use std::collections::HashMap;
use std::path::Path;

use log::info;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::backend::{RenderBackend, TextureId};
use crate::error::EngineError;
use crate::math::{Rect, Vec2};

/// A named sub-image within a texture page.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteRegion {
    pub texture: TextureId,
    /// Rectangle of the stored pixels in the page. For `rotated` regions
    /// the pixels are stored transposed, so width/height are swapped
    /// relative to the logical frame.
    pub source: Rect,
    pub rotated: bool,
    pub trimmed: bool,
    /// Offset of the stored pixels within the untrimmed frame.
    pub trim_offset: Vec2,
    /// Untrimmed, unrotated frame size.
    pub source_size: Vec2,
}

/// Name-to-region lookup over every loaded atlas.
#[derive(Debug, Default)]
pub struct AtlasStore {
    regions: FxHashMap<String, SpriteRegion>,
}

impl AtlasStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, region: SpriteRegion) {
        self.regions.insert(name.into(), region);
    }

    pub fn find(&self, name: &str) -> Option<&SpriteRegion> {
        self.regions.get(name)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(|name| name.as_str())
    }

    /// Load a TexturePacker-style JSON hash atlas. The texture page named
    /// by the file's `meta.image`, resolved next to the JSON file, is
    /// uploaded through `backend`. Returns the number of sprites added.
    pub fn load_file(
        &mut self,
        path: impl AsRef<Path>,
        backend: &mut impl RenderBackend,
    ) -> Result<usize, EngineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::AssetRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: AtlasFile = serde_json::from_str(&text).map_err(|e| EngineError::AssetParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        let image_path = path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&file.meta.image);
        let texture = backend.load_texture(&image_path)?;
        let count = self.insert_frames(file, texture);
        info!("loaded atlas {path:?}: {count} sprites");
        Ok(count)
    }

    /// Parse atlas JSON that describes an already-loaded texture page.
    pub fn load_str(&mut self, json: &str, texture: TextureId) -> Result<usize, EngineError> {
        let file: AtlasFile = serde_json::from_str(json).map_err(|e| EngineError::AssetParse {
            path: "<inline>".into(),
            source: e,
        })?;
        Ok(self.insert_frames(file, texture))
    }

    fn insert_frames(&mut self, file: AtlasFile, texture: TextureId) -> usize {
        let count = file.frames.len();
        for (name, entry) in file.frames {
            let source = Rect::new(entry.frame.x, entry.frame.y, entry.frame.w, entry.frame.h);
            let trim_offset = entry
                .sprite_source_size
                .as_ref()
                .map(|r| Vec2::new(r.x, r.y))
                .unwrap_or(Vec2::ZERO);
            let source_size = match entry.source_size {
                Some(size) => Vec2::new(size.w, size.h),
                // Fall back to the stored rect, un-transposing it for
                // rotated regions.
                None if entry.rotated => Vec2::new(entry.frame.h, entry.frame.w),
                None => Vec2::new(entry.frame.w, entry.frame.h),
            };
            self.insert(
                name,
                SpriteRegion {
                    texture,
                    source,
                    rotated: entry.rotated,
                    trimmed: entry.trimmed,
                    trim_offset,
                    source_size,
                },
            );
        }
        count
    }
}

// ----------------------------------------------------------------------
// File format (TexturePacker JSON hash).
// ----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AtlasFile {
    frames: HashMap<String, AtlasFrame>,
    meta: AtlasMeta,
}

#[derive(Debug, Deserialize)]
struct AtlasMeta {
    image: String,
}

#[derive(Debug, Deserialize)]
struct AtlasFrame {
    frame: AtlasRect,
    #[serde(default)]
    rotated: bool,
    #[serde(default)]
    trimmed: bool,
    #[serde(rename = "spriteSourceSize", default)]
    sprite_source_size: Option<AtlasRect>,
    #[serde(rename = "sourceSize", default)]
    source_size: Option<AtlasSize>,
}

#[derive(Debug, Deserialize)]
struct AtlasRect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

#[derive(Debug, Deserialize)]
struct AtlasSize {
    w: f32,
    h: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATLAS_JSON: &str = r#"{
        "frames": {
            "hero/walk_0001": {
                "frame": { "x": 0, "y": 0, "w": 32, "h": 48 },
                "rotated": false,
                "trimmed": false,
                "spriteSourceSize": { "x": 0, "y": 0, "w": 32, "h": 48 },
                "sourceSize": { "w": 32, "h": 48 }
            },
            "hero/walk_0002": {
                "frame": { "x": 32, "y": 0, "w": 48, "h": 32 },
                "rotated": true,
                "trimmed": false,
                "sourceSize": { "w": 32, "h": 48 }
            },
            "props/barrel": {
                "frame": { "x": 80, "y": 0, "w": 20, "h": 26 },
                "rotated": false,
                "trimmed": true,
                "spriteSourceSize": { "x": 6, "y": 3, "w": 20, "h": 26 },
                "sourceSize": { "w": 32, "h": 32 }
            }
        },
        "meta": { "image": "pack.png" }
    }"#;

    #[test]
    fn test_load_str_populates_regions() {
        let mut atlas = AtlasStore::new();
        let count = atlas.load_str(ATLAS_JSON, TextureId(7)).unwrap();
        assert_eq!(count, 3);
        assert_eq!(atlas.len(), 3);

        let walk = atlas.find("hero/walk_0001").unwrap();
        assert_eq!(walk.texture, TextureId(7));
        assert_eq!(walk.source, Rect::new(0.0, 0.0, 32.0, 48.0));
        assert!(!walk.rotated);
        assert_eq!(walk.source_size, Vec2::new(32.0, 48.0));
    }

    #[test]
    fn test_rotated_region_keeps_stored_rect() {
        let mut atlas = AtlasStore::new();
        atlas.load_str(ATLAS_JSON, TextureId(0)).unwrap();

        let rotated = atlas.find("hero/walk_0002").unwrap();
        assert!(rotated.rotated);
        assert_eq!(rotated.source, Rect::new(32.0, 0.0, 48.0, 32.0));
        assert_eq!(rotated.source_size, Vec2::new(32.0, 48.0));
    }

    #[test]
    fn test_trimmed_region_records_offset() {
        let mut atlas = AtlasStore::new();
        atlas.load_str(ATLAS_JSON, TextureId(0)).unwrap();

        let barrel = atlas.find("props/barrel").unwrap();
        assert!(barrel.trimmed);
        assert_eq!(barrel.trim_offset, Vec2::new(6.0, 3.0));
        assert_eq!(barrel.source_size, Vec2::new(32.0, 32.0));
    }

    #[test]
    fn test_find_unknown_is_none() {
        let atlas = AtlasStore::new();
        assert!(atlas.find("nope").is_none());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let mut atlas = AtlasStore::new();
        let result = atlas.load_str("{ not json", TextureId(0));
        assert!(matches!(result, Err(EngineError::AssetParse { .. })));
    }
}
