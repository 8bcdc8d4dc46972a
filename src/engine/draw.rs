//! Viewport culling and z-ordered draw-call resolution.
//!
//! Once per frame the registry's visible records are resolved against the
//! atlas, culled against the camera's world rectangle, stably sorted by
//! z-index, and turned into fully resolved [`DrawCommand`]s for the backend.
//! Lower z-indices draw first (painter's algorithm); ties break on the
//! record's slot-allocation sequence number so two sprites sharing a
//! z-index keep the same relative order across frames.

use log::debug;

use crate::atlas::{AtlasStore, SpriteRegion};
use crate::backend::TextureId;
use crate::engine::registry::{SpriteRecord, SpriteRegistry};
use crate::math::{Rect, Rgba, Vec2};

/// One draw call, fully resolved: nothing left to look up.
///
/// Flips are encoded as negative source-rectangle dimensions, which is the
/// convention the raylib `DrawTexturePro` primitive expects.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub texture: TextureId,
    pub source: Rect,
    pub dest: Rect,
    pub origin: Vec2,
    pub rotation: f32,
    pub tint: Rgba,
}

/// Scaled on-screen size of a region; pre-rotated atlas regions store their
/// pixels transposed, so width and height swap back here.
fn dest_size(record: &SpriteRecord, region: &SpriteRegion) -> (f32, f32) {
    if region.rotated {
        (
            region.source.height * record.scale,
            region.source.width * record.scale,
        )
    } else {
        (
            region.source.width * record.scale,
            region.source.height * record.scale,
        )
    }
}

/// Pixel offset of the pivot anchor from the drawn rectangle's top-left.
///
/// The anchor is resolved over the untrimmed frame size; for trimmed
/// regions the packer's trim offset shifts it onto the stored pixels.
fn pivot_origin(record: &SpriteRecord, region: &SpriteRegion) -> Vec2 {
    let anchor = record.pivot.normalized(record.pivot_custom);
    Vec2::new(
        (anchor.x * region.source_size.x - region.trim_offset.x) * record.scale,
        (anchor.y * region.source_size.y - region.trim_offset.y) * record.scale,
    )
}

/// World-space AABB used for culling. Rotation is ignored here; a rotated
/// sprite may cull a frame early at the viewport fringe.
fn drawable_bounds(record: &SpriteRecord, region: &SpriteRegion) -> Rect {
    let (width, height) = dest_size(record, region);
    let origin = pivot_origin(record, region);
    Rect::new(
        record.position.x - origin.x,
        record.position.y - origin.y,
        width,
        height,
    )
}

fn resolve(record: &SpriteRecord, region: &SpriteRegion) -> DrawCommand {
    let (width, height) = dest_size(record, region);
    let mut source = region.source;
    if record.flip_x {
        source.width = -source.width;
    }
    if record.flip_y {
        source.height = -source.height;
    }
    let rotation = if region.rotated {
        record.rotation - 90.0
    } else {
        record.rotation
    };
    DrawCommand {
        texture: region.texture,
        source,
        dest: Rect::new(record.position.x, record.position.y, width, height),
        origin: pivot_origin(record, region),
        rotation,
        tint: record.tint,
    }
}

/// Cull, order, and resolve the registry's visible sprites for one frame.
///
/// A sprite whose name has no atlas entry is skipped for this frame only;
/// the rest of the list still draws.
pub fn build_draw_list(
    registry: &SpriteRegistry,
    atlas: &AtlasStore,
    viewport: &Rect,
) -> Vec<DrawCommand> {
    let mut visible: Vec<(&SpriteRecord, &SpriteRegion)> = registry
        .iter()
        .filter(|record| record.visible)
        .filter_map(|record| match atlas.find(&record.sprite_name) {
            Some(region) => Some((record, region)),
            None => {
                debug!("sprite name {:?} not in any atlas, skipped", record.sprite_name);
                None
            }
        })
        .filter(|(record, region)| drawable_bounds(record, region).overlaps(viewport))
        .collect();

    visible.sort_by_key(|(record, _)| (record.z_index, record.seq));
    visible
        .into_iter()
        .map(|(record, region)| resolve(record, region))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::registry::{Pivot, SpriteConfig};

    fn region(width: f32, height: f32) -> SpriteRegion {
        SpriteRegion {
            texture: TextureId(0),
            source: Rect::new(0.0, 0.0, width, height),
            rotated: false,
            trimmed: false,
            trim_offset: Vec2::ZERO,
            source_size: Vec2::new(width, height),
        }
    }

    fn atlas_with(entries: &[(&str, SpriteRegion)]) -> AtlasStore {
        let mut atlas = AtlasStore::new();
        for (name, region) in entries {
            atlas.insert(*name, region.clone());
        }
        atlas
    }

    #[test]
    fn test_draw_order_by_z_then_creation() {
        let mut registry = SpriteRegistry::new();
        registry
            .create(SpriteConfig::named("a").with_z_index(10).with_position(1.0, 0.0))
            .unwrap();
        registry
            .create(SpriteConfig::named("b").with_z_index(5).with_position(2.0, 0.0))
            .unwrap();

        let atlas = atlas_with(&[("a", region(16.0, 16.0)), ("b", region(16.0, 16.0))]);
        let viewport = Rect::new(-100.0, -100.0, 200.0, 200.0);
        let list = build_draw_list(&registry, &atlas, &viewport);

        assert_eq!(list.len(), 2);
        // b has the lower z-index and draws first even though a was
        // created first.
        assert_eq!(list[0].dest.x, 2.0);
        assert_eq!(list[1].dest.x, 1.0);
    }

    #[test]
    fn test_equal_z_keeps_creation_order() {
        let mut registry = SpriteRegistry::new();
        let first = registry
            .create(SpriteConfig::named("a").with_position(50.0, 0.0))
            .unwrap();
        let _second = registry
            .create(SpriteConfig::named("b").with_position(-50.0, 0.0))
            .unwrap();
        // Moving the first sprite must not change the tie-break.
        registry.set_position(first, Vec2::new(99.0, 0.0));

        let atlas = atlas_with(&[("a", region(8.0, 8.0)), ("b", region(8.0, 8.0))]);
        let viewport = Rect::new(-200.0, -200.0, 400.0, 400.0);
        let list = build_draw_list(&registry, &atlas, &viewport);

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].dest.x, 99.0);
        assert_eq!(list[1].dest.x, -50.0);
    }

    #[test]
    fn test_culling_excludes_outside_viewport() {
        let mut registry = SpriteRegistry::new();
        registry
            .create(SpriteConfig::named("in").with_position(10.0, 10.0))
            .unwrap();
        registry
            .create(SpriteConfig::named("out").with_position(5000.0, 5000.0))
            .unwrap();

        let atlas = atlas_with(&[("in", region(16.0, 16.0)), ("out", region(16.0, 16.0))]);
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let list = build_draw_list(&registry, &atlas, &viewport);

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].dest.x, 10.0);
    }

    #[test]
    fn test_culling_flush_edge_is_visible() {
        let mut registry = SpriteRegistry::new();
        registry
            .create(SpriteConfig::named("edge").with_position(800.0, 100.0))
            .unwrap();
        registry
            .create(SpriteConfig::named("past").with_position(801.0, 100.0))
            .unwrap();

        let atlas = atlas_with(&[("edge", region(16.0, 16.0)), ("past", region(16.0, 16.0))]);
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let list = build_draw_list(&registry, &atlas, &viewport);

        // The sprite flush with the right edge still draws; the one a pixel
        // past it is culled.
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].dest.x, 800.0);
    }

    #[test]
    fn test_invisible_sprites_are_not_drawn() {
        let mut registry = SpriteRegistry::new();
        registry
            .create(SpriteConfig::named("ghost").invisible())
            .unwrap();

        let atlas = atlas_with(&[("ghost", region(16.0, 16.0))]);
        let viewport = Rect::new(-100.0, -100.0, 200.0, 200.0);
        assert!(build_draw_list(&registry, &atlas, &viewport).is_empty());
    }

    #[test]
    fn test_missing_atlas_entry_skips_only_that_sprite() {
        let mut registry = SpriteRegistry::new();
        registry.create(SpriteConfig::named("known")).unwrap();
        registry.create(SpriteConfig::named("unknown")).unwrap();

        let atlas = atlas_with(&[("known", region(16.0, 16.0))]);
        let viewport = Rect::new(-100.0, -100.0, 200.0, 200.0);
        let list = build_draw_list(&registry, &atlas, &viewport);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_pivot_offsets_dest_origin() {
        let mut registry = SpriteRegistry::new();
        registry
            .create(
                SpriteConfig::named("hero")
                    .with_position(100.0, 100.0)
                    .with_pivot(Pivot::BottomCenter),
            )
            .unwrap();

        let atlas = atlas_with(&[("hero", region(32.0, 64.0))]);
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let list = build_draw_list(&registry, &atlas, &viewport);

        assert_eq!(list[0].origin, Vec2::new(16.0, 64.0));
        assert_eq!(list[0].dest, Rect::new(100.0, 100.0, 32.0, 64.0));
    }

    #[test]
    fn test_scale_multiplies_dest_and_origin() {
        let mut registry = SpriteRegistry::new();
        registry
            .create(
                SpriteConfig::named("hero")
                    .with_scale(2.0)
                    .with_pivot(Pivot::Center),
            )
            .unwrap();

        let atlas = atlas_with(&[("hero", region(10.0, 20.0))]);
        let viewport = Rect::new(-500.0, -500.0, 1000.0, 1000.0);
        let list = build_draw_list(&registry, &atlas, &viewport);

        assert_eq!(list[0].dest.width, 20.0);
        assert_eq!(list[0].dest.height, 40.0);
        assert_eq!(list[0].origin, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_rotated_region_swaps_dest_and_compensates() {
        let mut registry = SpriteRegistry::new();
        registry.create(SpriteConfig::named("rot")).unwrap();

        let stored = SpriteRegion {
            texture: TextureId(0),
            // Stored transposed in the atlas page: 64 wide, 32 tall.
            source: Rect::new(0.0, 0.0, 64.0, 32.0),
            rotated: true,
            trimmed: false,
            trim_offset: Vec2::ZERO,
            source_size: Vec2::new(32.0, 64.0),
        };
        let atlas = atlas_with(&[("rot", stored)]);
        let viewport = Rect::new(-500.0, -500.0, 1000.0, 1000.0);
        let list = build_draw_list(&registry, &atlas, &viewport);

        assert_eq!(list[0].dest.width, 32.0);
        assert_eq!(list[0].dest.height, 64.0);
        assert_eq!(list[0].rotation, -90.0);
    }

    #[test]
    fn test_flips_negate_source_dimensions() {
        let mut registry = SpriteRegistry::new();
        let handle = registry.create(SpriteConfig::named("hero")).unwrap();
        registry.set_flip(handle, true, true);

        let atlas = atlas_with(&[("hero", region(16.0, 24.0))]);
        let viewport = Rect::new(-500.0, -500.0, 1000.0, 1000.0);
        let list = build_draw_list(&registry, &atlas, &viewport);

        assert_eq!(list[0].source.width, -16.0);
        assert_eq!(list[0].source.height, -24.0);
        // Destination is unaffected by flips.
        assert_eq!(list[0].dest.width, 16.0);
        assert_eq!(list[0].dest.height, 24.0);
    }

    #[test]
    fn test_trim_offset_shifts_pivot_origin() {
        let mut registry = SpriteRegistry::new();
        registry
            .create(SpriteConfig::named("trimmed").with_pivot(Pivot::Center))
            .unwrap();

        let stored = SpriteRegion {
            texture: TextureId(0),
            source: Rect::new(0.0, 0.0, 20.0, 20.0),
            rotated: false,
            trimmed: true,
            trim_offset: Vec2::new(6.0, 4.0),
            // Untrimmed frame was 32x32; transparent borders were cut.
            source_size: Vec2::new(32.0, 32.0),
        };
        let atlas = atlas_with(&[("trimmed", stored)]);
        let viewport = Rect::new(-500.0, -500.0, 1000.0, 1000.0);
        let list = build_draw_list(&registry, &atlas, &viewport);

        // Center of the 32x32 frame, shifted by the trim offset.
        assert_eq!(list[0].origin, Vec2::new(10.0, 12.0));
    }
}
