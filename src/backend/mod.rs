//! Rendering backend boundary.
//!
//! The engine issues all of its drawing through [`RenderBackend`]; a
//! backend that compiles against the trait is, by construction, a complete
//! one. Textures are referred to by opaque [`TextureId`]s issued by the
//! backend at load time; the backend owns the texture memory.
//!
//! Submodules overview:
//! - `raylib` – windowed raylib implementation (feature `raylib`)
//! - [`RecordingBackend`] – headless backend that records draw calls, for
//!   tests and CI runs without a window

#[cfg(feature = "raylib")]
pub mod raylib;

use std::path::{Path, PathBuf};

use crate::engine::camera::Camera;
use crate::error::EngineError;
use crate::math::{Rect, Rgba, Vec2};

/// Opaque key for a texture owned by a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Operation set the engine requires from a rendering backend.
///
/// Calls arrive in a fixed shape per frame: `begin_frame`, then one
/// `begin_camera`/`end_camera` scope containing zero or more
/// `draw_texture` calls, then `end_frame`.
pub trait RenderBackend {
    fn screen_width(&self) -> i32;

    fn screen_height(&self) -> i32;

    /// Upload a texture and return its key. Failures surface here, once,
    /// at load time.
    fn load_texture(&mut self, path: &Path) -> Result<TextureId, EngineError>;

    /// Start a frame and clear the draw buffer.
    fn begin_frame(&mut self);

    /// Present the frame.
    fn end_frame(&mut self);

    fn begin_camera(&mut self, camera: &Camera);

    fn end_camera(&mut self);

    /// Draw a texture region. Negative `source` dimensions mirror the
    /// sprite on that axis; `origin` is in destination pixels and is the
    /// point `dest.x/dest.y` maps to and rotation pivots around.
    fn draw_texture(
        &mut self,
        texture: TextureId,
        source: Rect,
        dest: Rect,
        origin: Vec2,
        rotation: f32,
        tint: Rgba,
    );
}

/// One recorded `draw_texture` call.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedDraw {
    pub texture: TextureId,
    pub source: Rect,
    pub dest: Rect,
    pub origin: Vec2,
    pub rotation: f32,
    pub tint: Rgba,
}

/// Headless backend for tests and CI: draws nothing, records everything.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    screen_width: i32,
    screen_height: i32,
    /// Draw calls of the current frame, in emission order.
    pub draws: Vec<RecordedDraw>,
    pub frames_begun: usize,
    pub frames_ended: usize,
    pub camera_scopes: usize,
    /// Paths passed to `load_texture`, indexed by `TextureId`.
    pub textures: Vec<PathBuf>,
}

impl RecordingBackend {
    pub fn new(screen_width: i32, screen_height: i32) -> Self {
        Self {
            screen_width,
            screen_height,
            ..Self::default()
        }
    }

    /// Register a texture without touching the filesystem.
    pub fn fake_texture(&mut self, name: &str) -> TextureId {
        self.textures.push(PathBuf::from(name));
        TextureId((self.textures.len() - 1) as u32)
    }
}

impl RenderBackend for RecordingBackend {
    fn screen_width(&self) -> i32 {
        self.screen_width
    }

    fn screen_height(&self) -> i32 {
        self.screen_height
    }

    fn load_texture(&mut self, path: &Path) -> Result<TextureId, EngineError> {
        self.textures.push(path.to_path_buf());
        Ok(TextureId((self.textures.len() - 1) as u32))
    }

    fn begin_frame(&mut self) {
        self.draws.clear();
        self.frames_begun += 1;
    }

    fn end_frame(&mut self) {
        self.frames_ended += 1;
    }

    fn begin_camera(&mut self, _camera: &Camera) {
        self.camera_scopes += 1;
    }

    fn end_camera(&mut self) {}

    fn draw_texture(
        &mut self,
        texture: TextureId,
        source: Rect,
        dest: Rect,
        origin: Vec2,
        rotation: f32,
        tint: Rgba,
    ) {
        self.draws.push(RecordedDraw {
            texture,
            source,
            dest,
            origin,
            rotation,
            tint,
        });
    }
}
