//! Systems that copy ECS state into the sprite registry.
//!
//! Schedule these before running the engine's `tick` for the frame so that
//! draws reflect this frame's simulation.

use bevy_ecs::prelude::*;

use crate::backend::RenderBackend;
use crate::ecs::components::{SpriteRef, WorldPosition};
use crate::engine::VisualEngine;
use crate::math::Vec2;

/// Copy every entity's [`WorldPosition`] into its registry sprite.
///
/// Entities whose handle has gone stale are skipped; the registry refuses
/// the write and nothing else happens.
pub fn sync_sprite_transforms<B: RenderBackend + 'static>(
    query: Query<(&WorldPosition, &SpriteRef)>,
    mut engine: NonSendMut<VisualEngine<B>>,
) {
    for (position, sprite) in query.iter() {
        engine.set_position(sprite.handle, Vec2::new(position.x, position.y));
    }
}
