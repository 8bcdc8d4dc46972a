//! Sprite registry: a generation-indexed slot table owning every sprite
//! record.
//!
//! Callers hold [`SpriteHandle`]s, never references. A handle addresses a
//! slot and carries the generation the slot had when the sprite was created;
//! destroying a sprite bumps the slot generation, so operations through an
//! old handle are detected and refused. Freed slots go onto a free list and
//! are reused before the table grows.
//!
//! All mutation goes through the registry's setters. The registry is
//! single-threaded by contract (one caller owns the engine for its whole
//! lifetime), so the generation check is the only consistency guard.

use log::debug;

use crate::engine::animation::AnimationState;
use crate::engine::handle::SpriteHandle;
use crate::error::EngineError;
use crate::math::{Rgba, Vec2};

/// Anchor point within a sprite's bounds used as its draw origin.
///
/// The named anchors form a 3x3 grid over the sprite rectangle. `Custom`
/// defers to an explicit normalized pair stored on the record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pivot {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    Custom,
}

impl Pivot {
    /// Normalized (x, y) anchor within the sprite rectangle.
    ///
    /// `custom` is only consulted for [`Pivot::Custom`].
    pub fn normalized(self, custom: Vec2) -> Vec2 {
        match self {
            Pivot::TopLeft => Vec2::new(0.0, 0.0),
            Pivot::TopCenter => Vec2::new(0.5, 0.0),
            Pivot::TopRight => Vec2::new(1.0, 0.0),
            Pivot::CenterLeft => Vec2::new(0.0, 0.5),
            Pivot::Center => Vec2::new(0.5, 0.5),
            Pivot::CenterRight => Vec2::new(1.0, 0.5),
            Pivot::BottomLeft => Vec2::new(0.0, 1.0),
            Pivot::BottomCenter => Vec2::new(0.5, 1.0),
            Pivot::BottomRight => Vec2::new(1.0, 1.0),
            Pivot::Custom => custom,
        }
    }
}

/// Initial attributes for [`SpriteRegistry::create`]. Every field has a
/// default, so callers set only what they need.
#[derive(Clone, Debug)]
pub struct SpriteConfig {
    pub sprite_name: String,
    pub position: Vec2,
    pub z_index: i32,
    pub scale: f32,
    pub rotation: f32,
    pub flip_x: bool,
    pub flip_y: bool,
    pub tint: Rgba,
    pub pivot: Pivot,
    pub pivot_custom: Vec2,
    pub visible: bool,
    /// Atlas folder prepended to animation-generated frame names.
    pub name_prefix: Option<String>,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            sprite_name: String::new(),
            position: Vec2::ZERO,
            z_index: 0,
            scale: 1.0,
            rotation: 0.0,
            flip_x: false,
            flip_y: false,
            tint: Rgba::WHITE,
            pivot: Pivot::default(),
            pivot_custom: Vec2::ZERO,
            visible: true,
            name_prefix: None,
        }
    }
}

impl SpriteConfig {
    pub fn named(sprite_name: impl Into<String>) -> Self {
        Self {
            sprite_name: sprite_name.into(),
            ..Self::default()
        }
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Vec2::new(x, y);
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_pivot(mut self, pivot: Pivot) -> Self {
        self.pivot = pivot;
        self
    }

    pub fn with_tint(mut self, tint: Rgba) -> Self {
        self.tint = tint;
        self
    }

    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }

    pub fn invisible(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// One sprite's state, owned exclusively by the registry.
#[derive(Clone, Debug)]
pub struct SpriteRecord {
    pub sprite_name: String,
    pub position: Vec2,
    pub z_index: i32,
    pub scale: f32,
    pub rotation: f32,
    pub flip_x: bool,
    pub flip_y: bool,
    pub tint: Rgba,
    pub pivot: Pivot,
    pub pivot_custom: Vec2,
    pub visible: bool,
    pub name_prefix: Option<String>,
    pub animation: Option<AnimationState>,
    /// Slot-allocation sequence number; the stable draw-order tie-break.
    pub seq: u64,
}

impl SpriteRecord {
    fn from_config(config: SpriteConfig, seq: u64) -> Self {
        Self {
            sprite_name: config.sprite_name,
            position: config.position,
            z_index: config.z_index,
            scale: config.scale,
            rotation: config.rotation,
            flip_x: config.flip_x,
            flip_y: config.flip_y,
            tint: config.tint,
            pivot: config.pivot,
            pivot_custom: config.pivot_custom,
            visible: config.visible,
            name_prefix: config.name_prefix,
            animation: None,
            seq,
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    record: Option<SpriteRecord>,
}

/// Slot table of sprite records with generation-checked handles.
#[derive(Debug, Default)]
pub struct SpriteRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// 0 means unbounded growth.
    max_sprites: usize,
    live: usize,
    next_seq: u64,
}

impl SpriteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry refusing to grow past `max_sprites` live sprites.
    pub fn with_capacity_limit(max_sprites: usize) -> Self {
        Self {
            max_sprites,
            ..Self::default()
        }
    }

    /// Number of live sprites.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Allocate a slot (free list first) and return a handle carrying the
    /// slot's current generation.
    pub fn create(&mut self, config: SpriteConfig) -> Result<SpriteHandle, EngineError> {
        if self.max_sprites > 0 && self.live >= self.max_sprites {
            return Err(EngineError::CapacityExceeded {
                capacity: self.max_sprites,
            });
        }
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    record: None,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        let slot = &mut self.slots[index as usize];
        slot.record = Some(SpriteRecord::from_config(config, seq));
        self.live += 1;
        Ok(SpriteHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Free the sprite's slot and bump its generation so outstanding
    /// handles go stale. Returns `false` (and does nothing) if the handle
    /// already is.
    pub fn destroy(&mut self, handle: SpriteHandle) -> bool {
        match self.slots.get_mut(handle.index as usize) {
            Some(slot) if slot.generation == handle.generation && slot.record.is_some() => {
                slot.record = None;
                // Wraps after a full u32 cycle; astronomically high reuse
                // counts could then revalidate an ancient handle.
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(handle.index);
                self.live -= 1;
                true
            }
            _ => {
                debug!("destroy on stale sprite handle {handle}");
                false
            }
        }
    }

    pub fn is_valid(&self, handle: SpriteHandle) -> bool {
        self.record(handle).is_some()
    }

    fn record(&self, handle: SpriteHandle) -> Option<&SpriteRecord> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.record.as_ref())
    }

    fn record_mut(&mut self, handle: SpriteHandle, op: &'static str) -> Option<&mut SpriteRecord> {
        let record = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.record.as_mut());
        if record.is_none() {
            debug!("{op} on stale sprite handle {handle}");
        }
        record
    }

    // ------------------------------------------------------------------
    // Attribute access. Setters return false on a stale handle and mutate
    // nothing; getters return None.
    // ------------------------------------------------------------------

    pub fn sprite_name(&self, handle: SpriteHandle) -> Option<&str> {
        self.record(handle).map(|r| r.sprite_name.as_str())
    }

    pub fn set_sprite_name(&mut self, handle: SpriteHandle, name: impl Into<String>) -> bool {
        match self.record_mut(handle, "set_sprite_name") {
            Some(record) => {
                record.sprite_name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn position(&self, handle: SpriteHandle) -> Option<Vec2> {
        self.record(handle).map(|r| r.position)
    }

    pub fn set_position(&mut self, handle: SpriteHandle, position: Vec2) -> bool {
        match self.record_mut(handle, "set_position") {
            Some(record) => {
                record.position = position;
                true
            }
            None => false,
        }
    }

    pub fn z_index(&self, handle: SpriteHandle) -> Option<i32> {
        self.record(handle).map(|r| r.z_index)
    }

    pub fn set_z_index(&mut self, handle: SpriteHandle, z_index: i32) -> bool {
        match self.record_mut(handle, "set_z_index") {
            Some(record) => {
                record.z_index = z_index;
                true
            }
            None => false,
        }
    }

    pub fn set_scale(&mut self, handle: SpriteHandle, scale: f32) -> bool {
        match self.record_mut(handle, "set_scale") {
            Some(record) => {
                record.scale = scale;
                true
            }
            None => false,
        }
    }

    pub fn set_rotation(&mut self, handle: SpriteHandle, degrees: f32) -> bool {
        match self.record_mut(handle, "set_rotation") {
            Some(record) => {
                record.rotation = degrees;
                true
            }
            None => false,
        }
    }

    pub fn set_flip(&mut self, handle: SpriteHandle, flip_x: bool, flip_y: bool) -> bool {
        match self.record_mut(handle, "set_flip") {
            Some(record) => {
                record.flip_x = flip_x;
                record.flip_y = flip_y;
                true
            }
            None => false,
        }
    }

    pub fn tint(&self, handle: SpriteHandle) -> Option<Rgba> {
        self.record(handle).map(|r| r.tint)
    }

    pub fn set_tint(&mut self, handle: SpriteHandle, tint: Rgba) -> bool {
        match self.record_mut(handle, "set_tint") {
            Some(record) => {
                record.tint = tint;
                true
            }
            None => false,
        }
    }

    /// Adjust only the tint alpha; the usual way to fade a sprite in or
    /// out without touching its color.
    pub fn set_alpha(&mut self, handle: SpriteHandle, alpha: u8) -> bool {
        match self.record_mut(handle, "set_alpha") {
            Some(record) => {
                record.tint = record.tint.with_alpha(alpha);
                true
            }
            None => false,
        }
    }

    pub fn set_pivot(&mut self, handle: SpriteHandle, pivot: Pivot) -> bool {
        match self.record_mut(handle, "set_pivot") {
            Some(record) => {
                record.pivot = pivot;
                true
            }
            None => false,
        }
    }

    /// Set an explicit normalized anchor and switch the pivot to
    /// [`Pivot::Custom`].
    pub fn set_custom_pivot(&mut self, handle: SpriteHandle, normalized: Vec2) -> bool {
        match self.record_mut(handle, "set_custom_pivot") {
            Some(record) => {
                record.pivot = Pivot::Custom;
                record.pivot_custom = normalized;
                true
            }
            None => false,
        }
    }

    pub fn is_visible(&self, handle: SpriteHandle) -> Option<bool> {
        self.record(handle).map(|r| r.visible)
    }

    /// Invisible sprites are excluded from culling and drawing but keep
    /// receiving animation updates.
    pub fn set_visible(&mut self, handle: SpriteHandle, visible: bool) -> bool {
        match self.record_mut(handle, "set_visible") {
            Some(record) => {
                record.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn set_name_prefix(&mut self, handle: SpriteHandle, prefix: Option<String>) -> bool {
        match self.record_mut(handle, "set_name_prefix") {
            Some(record) => {
                record.name_prefix = prefix;
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Animation control.
    // ------------------------------------------------------------------

    pub fn animation(&self, handle: SpriteHandle) -> Option<&AnimationState> {
        self.record(handle).and_then(|r| r.animation.as_ref())
    }

    /// Attach or replace the sprite's animation state and point the sprite
    /// name at the first frame. `frame_duration` becomes
    /// `total_duration / frame_count`.
    pub fn play_animation(
        &mut self,
        handle: SpriteHandle,
        animation_key: &str,
        frame_count: usize,
        total_duration: f32,
        looping: bool,
    ) -> bool {
        match self.record_mut(handle, "play_animation") {
            Some(record) => {
                match record.animation.as_mut() {
                    Some(animation) => {
                        animation.play(animation_key, frame_count, total_duration, looping)
                    }
                    None => {
                        record.animation = Some(AnimationState::new(
                            animation_key,
                            frame_count,
                            total_duration,
                            looping,
                        ));
                    }
                }
                if let Some(animation) = record.animation.as_ref() {
                    record.sprite_name = animation.sprite_name(record.name_prefix.as_deref());
                }
                true
            }
            None => false,
        }
    }

    /// Pause or resume the sprite's animation, if it has one.
    pub fn set_animation_playing(&mut self, handle: SpriteHandle, playing: bool) -> bool {
        match self.record_mut(handle, "set_animation_playing") {
            Some(record) => match record.animation.as_mut() {
                Some(animation) => {
                    animation.playing = playing;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// Advance every animation timer by `dt` and refresh the owning
    /// sprite's name from the resulting frame. Runs for invisible and
    /// off-screen sprites too; culling affects drawing, never simulation.
    pub fn advance_animations(&mut self, dt: f32) {
        for slot in &mut self.slots {
            let Some(record) = slot.record.as_mut() else {
                continue;
            };
            let Some(animation) = record.animation.as_mut() else {
                continue;
            };
            animation.update(dt);
            record.sprite_name = animation.sprite_name(record.name_prefix.as_deref());
        }
    }

    /// Iterate live records. Read-only; mutation goes through setters.
    pub fn iter(&self) -> impl Iterator<Item = &SpriteRecord> {
        self.slots.iter().filter_map(|slot| slot.record.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_returns_valid_handle() {
        let mut registry = SpriteRegistry::new();
        let handle = registry.create(SpriteConfig::named("hero")).unwrap();
        assert!(registry.is_valid(handle));
        assert_eq!(registry.sprite_name(handle), Some("hero"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_config_defaults() {
        let mut registry = SpriteRegistry::new();
        let handle = registry.create(SpriteConfig::default()).unwrap();
        assert_eq!(registry.position(handle), Some(Vec2::ZERO));
        assert_eq!(registry.z_index(handle), Some(0));
        assert_eq!(registry.tint(handle), Some(Rgba::WHITE));
        assert_eq!(registry.is_visible(handle), Some(true));
        assert!(registry.animation(handle).is_none());
    }

    #[test]
    fn test_destroy_invalidates_handle() {
        let mut registry = SpriteRegistry::new();
        let handle = registry.create(SpriteConfig::named("hero")).unwrap();
        assert!(registry.destroy(handle));
        assert!(!registry.is_valid(handle));
        assert_eq!(registry.len(), 0);

        // Second destroy is a no-op.
        assert!(!registry.destroy(handle));
    }

    #[test]
    fn test_stale_handle_setters_do_not_mutate() {
        let mut registry = SpriteRegistry::new();
        let stale = registry.create(SpriteConfig::named("hero")).unwrap();
        registry.destroy(stale);

        assert!(!registry.set_position(stale, Vec2::new(5.0, 5.0)));
        assert!(!registry.set_z_index(stale, 9));
        assert!(!registry.set_visible(stale, false));
        assert!(!registry.play_animation(stale, "walk", 4, 1.0, true));
        assert!(registry.position(stale).is_none());
    }

    #[test]
    fn test_slot_reuse_keeps_old_handle_stale() {
        let mut registry = SpriteRegistry::new();
        let first = registry.create(SpriteConfig::named("a")).unwrap();
        registry.destroy(first);

        let second = registry.create(SpriteConfig::named("b")).unwrap();
        // Free list reuse: same slot, new generation.
        assert_eq!(second.index, first.index);
        assert_ne!(second.generation, first.generation);

        assert!(!registry.set_position(first, Vec2::new(1.0, 1.0)));
        assert_eq!(registry.position(second), Some(Vec2::ZERO));
        assert_eq!(registry.sprite_name(second), Some("b"));
    }

    #[test]
    fn test_free_list_preferred_over_growth() {
        let mut registry = SpriteRegistry::new();
        let a = registry.create(SpriteConfig::named("a")).unwrap();
        let _b = registry.create(SpriteConfig::named("b")).unwrap();
        registry.destroy(a);
        let c = registry.create(SpriteConfig::named("c")).unwrap();
        assert_eq!(c.index, a.index);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_capacity_limit() {
        let mut registry = SpriteRegistry::with_capacity_limit(2);
        let a = registry.create(SpriteConfig::named("a")).unwrap();
        let _b = registry.create(SpriteConfig::named("b")).unwrap();

        let overflow = registry.create(SpriteConfig::named("c"));
        assert!(matches!(
            overflow,
            Err(EngineError::CapacityExceeded { capacity: 2 })
        ));

        // Destroying frees room again.
        registry.destroy(a);
        assert!(registry.create(SpriteConfig::named("c")).is_ok());
    }

    #[test]
    fn test_generation_wraparound_is_accepted_behavior() {
        // The generation counter wraps after a full u32 cycle; a handle
        // from that long ago would validate again. Nothing guards against
        // it, which this test documents rather than fixes.
        let mut registry = SpriteRegistry::new();
        let handle = registry.create(SpriteConfig::named("a")).unwrap();
        registry.slots[handle.index as usize].generation = u32::MAX;
        let ancient = SpriteHandle {
            index: handle.index,
            generation: u32::MAX,
        };
        assert!(registry.destroy(ancient));

        let reborn = registry.create(SpriteConfig::named("b")).unwrap();
        assert_eq!(reborn.generation, 0);
    }

    #[test]
    fn test_play_animation_sets_first_frame_name() {
        let mut registry = SpriteRegistry::new();
        let handle = registry
            .create(SpriteConfig::named("hero").with_name_prefix("hero"))
            .unwrap();
        assert!(registry.play_animation(handle, "walk", 8, 1.0, true));
        assert_eq!(registry.sprite_name(handle), Some("hero/walk_0001"));

        let animation = registry.animation(handle).unwrap();
        assert_eq!(animation.frame_count, 8);
        assert!(animation.playing);
    }

    #[test]
    fn test_play_animation_replaces_previous() {
        let mut registry = SpriteRegistry::new();
        let handle = registry.create(SpriteConfig::named("hero")).unwrap();
        registry.play_animation(handle, "walk", 8, 1.0, true);
        registry.advance_animations(0.5);
        assert_ne!(registry.animation(handle).unwrap().frame, 0);

        registry.play_animation(handle, "attack", 4, 0.4, false);
        let animation = registry.animation(handle).unwrap();
        assert_eq!(animation.animation_key, "attack");
        assert_eq!(animation.frame, 0);
        assert!(!animation.looping);
    }

    #[test]
    fn test_advance_animations_renames_sprite() {
        let mut registry = SpriteRegistry::new();
        let handle = registry.create(SpriteConfig::named("hero")).unwrap();
        registry.play_animation(handle, "walk", 4, 0.8, true);

        registry.advance_animations(0.25);
        assert_eq!(registry.sprite_name(handle), Some("walk_0002"));
    }

    #[test]
    fn test_advance_animations_includes_invisible_sprites() {
        let mut registry = SpriteRegistry::new();
        let handle = registry
            .create(SpriteConfig::named("hero").invisible())
            .unwrap();
        registry.play_animation(handle, "walk", 4, 0.8, true);

        registry.advance_animations(0.25);
        assert_eq!(registry.animation(handle).unwrap().frame, 1);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut registry = SpriteRegistry::new();
        let handle = registry.create(SpriteConfig::named("hero")).unwrap();
        registry.play_animation(handle, "walk", 4, 0.8, true);

        assert!(registry.set_animation_playing(handle, false));
        registry.advance_animations(1.0);
        assert_eq!(registry.animation(handle).unwrap().frame, 0);

        assert!(registry.set_animation_playing(handle, true));
        registry.advance_animations(0.25);
        assert_eq!(registry.animation(handle).unwrap().frame, 1);
    }

    #[test]
    fn test_set_animation_playing_without_animation() {
        let mut registry = SpriteRegistry::new();
        let handle = registry.create(SpriteConfig::named("hero")).unwrap();
        assert!(!registry.set_animation_playing(handle, true));
    }

    #[test]
    fn test_set_alpha_keeps_color() {
        let mut registry = SpriteRegistry::new();
        let handle = registry
            .create(SpriteConfig::named("hero").with_tint(Rgba::new(200, 100, 50, 255)))
            .unwrap();
        registry.set_alpha(handle, 64);
        assert_eq!(registry.tint(handle), Some(Rgba::new(200, 100, 50, 64)));
    }

    #[test]
    fn test_seq_increases_with_creation_order() {
        let mut registry = SpriteRegistry::new();
        let a = registry.create(SpriteConfig::named("a")).unwrap();
        registry.destroy(a);
        let _b = registry.create(SpriteConfig::named("b")).unwrap();
        let _c = registry.create(SpriteConfig::named("c")).unwrap();

        let seqs: Vec<u64> = registry.iter().map(|r| r.seq).collect();
        // b reused a's slot but kept a later sequence number.
        assert!(seqs.iter().all(|&seq| seq > 0));
    }

    #[test]
    fn test_pivot_normalized_grid() {
        assert_eq!(Pivot::TopLeft.normalized(Vec2::ZERO), Vec2::new(0.0, 0.0));
        assert_eq!(Pivot::Center.normalized(Vec2::ZERO), Vec2::new(0.5, 0.5));
        assert_eq!(
            Pivot::BottomCenter.normalized(Vec2::ZERO),
            Vec2::new(0.5, 1.0)
        );
        assert_eq!(
            Pivot::CenterRight.normalized(Vec2::ZERO),
            Vec2::new(1.0, 0.5)
        );
        assert_eq!(
            Pivot::Custom.normalized(Vec2::new(0.25, 0.75)),
            Vec2::new(0.25, 0.75)
        );
    }
}
