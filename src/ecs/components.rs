use bevy_ecs::prelude::Component;

use crate::engine::handle::SpriteHandle;

/// World-space position (pivot point) for an entity.
#[derive(Component, Clone, Copy, Debug)]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
}

impl WorldPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Links an ECS entity to a sprite in the engine's registry.
///
/// The handle is a pure lookup key and carries no ownership; the sprite is
/// released by calling the engine's `destroy`, and a stale handle simply
/// stops syncing.
#[derive(Component, Clone, Copy, Debug)]
pub struct SpriteRef {
    pub handle: SpriteHandle,
}

impl SpriteRef {
    pub fn new(handle: SpriteHandle) -> Self {
        Self { handle }
    }
}
