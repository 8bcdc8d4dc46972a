//! The visual engine: sprite bookkeeping and the per-frame pipeline.
//!
//! Submodules overview:
//! - [`animation`] – per-sprite animation timers and reusable definitions
//! - [`camera`] – 2D camera and viewport math
//! - [`draw`] – viewport culling, z-ordering, draw-call resolution
//! - [`handle`] – generation-checked sprite handles
//! - [`registry`] – the slot table owning every sprite record
//!
//! [`VisualEngine`] is the facade: it owns the registry, camera, atlas
//! store, and the rendering backend, and runs the frame pipeline
//! (animate → cull → sort → draw) to completion inside [`VisualEngine::tick`].
//! Everything is single-threaded; one caller owns the engine for its whole
//! lifetime.

pub mod animation;
pub mod camera;
pub mod draw;
pub mod handle;
pub mod registry;

use std::path::Path;

use log::debug;

use crate::atlas::AtlasStore;
use crate::backend::RenderBackend;
use crate::config::EngineConfig;
use crate::engine::animation::{AnimationLibrary, AnimationState};
use crate::engine::camera::Camera;
use crate::engine::draw::build_draw_list;
use crate::engine::handle::SpriteHandle;
use crate::engine::registry::{Pivot, SpriteConfig, SpriteRegistry};
use crate::error::EngineError;
use crate::math::{Rect, Rgba, Vec2};

pub struct VisualEngine<B> {
    backend: B,
    registry: SpriteRegistry,
    camera: Camera,
    atlas: AtlasStore,
    library: AnimationLibrary,
}

impl<B: RenderBackend> VisualEngine<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            registry: SpriteRegistry::new(),
            camera: Camera::new(),
            atlas: AtlasStore::new(),
            library: AnimationLibrary::new(),
        }
    }

    /// Engine with a fixed sprite capacity taken from the configuration.
    pub fn with_config(backend: B, config: &EngineConfig) -> Self {
        Self {
            registry: if config.max_sprites > 0 {
                SpriteRegistry::with_capacity_limit(config.max_sprites)
            } else {
                SpriteRegistry::new()
            },
            ..Self::new(backend)
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    // ------------------------------------------------------------------
    // Asset stores.
    // ------------------------------------------------------------------

    /// Load a TexturePacker-style atlas; its texture page goes through the
    /// backend.
    pub fn load_atlas(&mut self, path: impl AsRef<Path>) -> Result<usize, EngineError> {
        self.atlas.load_file(path, &mut self.backend)
    }

    pub fn atlas(&self) -> &AtlasStore {
        &self.atlas
    }

    pub fn atlas_mut(&mut self) -> &mut AtlasStore {
        &mut self.atlas
    }

    pub fn library(&self) -> &AnimationLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut AnimationLibrary {
        &mut self.library
    }

    // ------------------------------------------------------------------
    // Camera.
    // ------------------------------------------------------------------

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera_position(&mut self, position: Vec2) {
        self.camera.set_position(position);
    }

    pub fn set_camera_zoom(&mut self, zoom: f32) {
        self.camera.set_zoom(zoom);
    }

    pub fn set_camera_bounds(&mut self, bounds: Option<Rect>) {
        self.camera.set_bounds(bounds);
    }

    // ------------------------------------------------------------------
    // Sprite lifecycle and attributes, delegated to the registry.
    // ------------------------------------------------------------------

    pub fn create(&mut self, config: SpriteConfig) -> Result<SpriteHandle, EngineError> {
        self.registry.create(config)
    }

    pub fn destroy(&mut self, handle: SpriteHandle) -> bool {
        self.registry.destroy(handle)
    }

    pub fn is_valid(&self, handle: SpriteHandle) -> bool {
        self.registry.is_valid(handle)
    }

    pub fn sprite_count(&self) -> usize {
        self.registry.len()
    }

    pub fn sprite_name(&self, handle: SpriteHandle) -> Option<&str> {
        self.registry.sprite_name(handle)
    }

    pub fn set_sprite_name(&mut self, handle: SpriteHandle, name: impl Into<String>) -> bool {
        self.registry.set_sprite_name(handle, name)
    }

    pub fn position(&self, handle: SpriteHandle) -> Option<Vec2> {
        self.registry.position(handle)
    }

    pub fn set_position(&mut self, handle: SpriteHandle, position: Vec2) -> bool {
        self.registry.set_position(handle, position)
    }

    pub fn z_index(&self, handle: SpriteHandle) -> Option<i32> {
        self.registry.z_index(handle)
    }

    pub fn set_z_index(&mut self, handle: SpriteHandle, z_index: i32) -> bool {
        self.registry.set_z_index(handle, z_index)
    }

    pub fn set_scale(&mut self, handle: SpriteHandle, scale: f32) -> bool {
        self.registry.set_scale(handle, scale)
    }

    pub fn set_rotation(&mut self, handle: SpriteHandle, degrees: f32) -> bool {
        self.registry.set_rotation(handle, degrees)
    }

    pub fn set_flip(&mut self, handle: SpriteHandle, flip_x: bool, flip_y: bool) -> bool {
        self.registry.set_flip(handle, flip_x, flip_y)
    }

    pub fn tint(&self, handle: SpriteHandle) -> Option<Rgba> {
        self.registry.tint(handle)
    }

    pub fn set_tint(&mut self, handle: SpriteHandle, tint: Rgba) -> bool {
        self.registry.set_tint(handle, tint)
    }

    pub fn set_alpha(&mut self, handle: SpriteHandle, alpha: u8) -> bool {
        self.registry.set_alpha(handle, alpha)
    }

    pub fn set_pivot(&mut self, handle: SpriteHandle, pivot: Pivot) -> bool {
        self.registry.set_pivot(handle, pivot)
    }

    pub fn set_custom_pivot(&mut self, handle: SpriteHandle, normalized: Vec2) -> bool {
        self.registry.set_custom_pivot(handle, normalized)
    }

    pub fn is_visible(&self, handle: SpriteHandle) -> Option<bool> {
        self.registry.is_visible(handle)
    }

    pub fn set_visible(&mut self, handle: SpriteHandle, visible: bool) -> bool {
        self.registry.set_visible(handle, visible)
    }

    // ------------------------------------------------------------------
    // Animation control.
    // ------------------------------------------------------------------

    pub fn animation(&self, handle: SpriteHandle) -> Option<&AnimationState> {
        self.registry.animation(handle)
    }

    pub fn play_animation(
        &mut self,
        handle: SpriteHandle,
        animation_key: &str,
        frame_count: usize,
        total_duration: f32,
        looping: bool,
    ) -> bool {
        self.registry
            .play_animation(handle, animation_key, frame_count, total_duration, looping)
    }

    /// Play an animation by library key, adopting the definition's frame
    /// count, duration, loop flag, and name prefix.
    pub fn play_from_library(&mut self, handle: SpriteHandle, animation_key: &str) -> bool {
        let Some(def) = self.library.get(animation_key) else {
            debug!("animation {animation_key:?} not in library");
            return false;
        };
        let def = def.clone();
        self.registry.set_name_prefix(handle, def.name_prefix);
        self.registry.play_animation(
            handle,
            animation_key,
            def.frame_count,
            def.total_duration,
            def.looping,
        )
    }

    pub fn set_animation_playing(&mut self, handle: SpriteHandle, playing: bool) -> bool {
        self.registry.set_animation_playing(handle, playing)
    }

    // ------------------------------------------------------------------
    // Frame pipeline.
    // ------------------------------------------------------------------

    /// Start a frame: clears the backend's draw buffer.
    pub fn begin_frame(&mut self) {
        self.backend.begin_frame();
    }

    /// Run one frame of the pipeline: advance every animation timer by
    /// `dt`, cull against the camera viewport, order by z-index, and emit
    /// the resolved draw calls to the backend.
    ///
    /// Runs to completion before returning; a sprite that fails to resolve
    /// is skipped for this frame only and never aborts the rest.
    pub fn tick(&mut self, dt: f32) {
        self.registry.advance_animations(dt);

        let viewport = self.camera.viewport(
            self.backend.screen_width() as f32,
            self.backend.screen_height() as f32,
        );
        let commands = build_draw_list(&self.registry, &self.atlas, &viewport);

        self.backend.begin_camera(&self.camera);
        for command in &commands {
            self.backend.draw_texture(
                command.texture,
                command.source,
                command.dest,
                command.origin,
                command.rotation,
                command.tint,
            );
        }
        self.backend.end_camera();
    }

    /// Finish a frame: presents the backend's buffer.
    pub fn end_frame(&mut self) {
        self.backend.end_frame();
    }
}
