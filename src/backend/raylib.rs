//! Raylib rendering backend.
//!
//! Owns the window, the GL context, and every texture uploaded through it.
//! Frame and camera scopes map to raylib's begin/end pairs; since the
//! engine drives those as plain calls rather than lexical scopes, this
//! backend goes through the raylib FFI directly instead of the
//! handle-scoped safe wrappers.

use std::path::Path;

use raylib::ffi;
use raylib::prelude::*;

use crate::backend::{RenderBackend, TextureId};
use crate::config::EngineConfig;
use crate::engine::camera::Camera;
use crate::error::EngineError;
use crate::math::{Rect, Rgba, Vec2};

fn to_ffi_rect(rect: Rect) -> ffi::Rectangle {
    ffi::Rectangle {
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
    }
}

fn to_ffi_vec(vec: Vec2) -> ffi::Vector2 {
    ffi::Vector2 { x: vec.x, y: vec.y }
}

fn to_ffi_color(color: Rgba) -> ffi::Color {
    ffi::Color {
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    }
}

pub struct RaylibBackend {
    rl: RaylibHandle,
    thread: RaylibThread,
    textures: Vec<Texture2D>,
    clear_color: Rgba,
}

impl RaylibBackend {
    /// Open a window and set up the GL context.
    pub fn init(title: &str, width: i32, height: i32) -> Self {
        let (rl, thread) = raylib::init().size(width, height).title(title).build();
        Self {
            rl,
            thread,
            textures: Vec::new(),
            clear_color: Rgba::new(0, 0, 0, 255),
        }
    }

    /// Open a window using the settings from an [`EngineConfig`].
    pub fn from_config(title: &str, config: &EngineConfig) -> Self {
        let (width, height) = config.window_size();
        let mut builder = raylib::init();
        builder.size(width as i32, height as i32).title(title);
        if config.vsync {
            builder.vsync();
        }
        if config.fullscreen {
            builder.fullscreen();
        }
        let (mut rl, thread) = builder.build();
        rl.set_target_fps(config.target_fps);
        Self {
            rl,
            thread,
            textures: Vec::new(),
            clear_color: Rgba::new(0, 0, 0, 255),
        }
    }

    pub fn set_clear_color(&mut self, color: Rgba) {
        self.clear_color = color;
    }

    pub fn window_should_close(&self) -> bool {
        self.rl.window_should_close()
    }

    /// Seconds the last frame took; the usual `tick` delta.
    pub fn frame_time(&self) -> f32 {
        self.rl.get_frame_time()
    }
}

impl RenderBackend for RaylibBackend {
    fn screen_width(&self) -> i32 {
        self.rl.get_screen_width()
    }

    fn screen_height(&self) -> i32 {
        self.rl.get_screen_height()
    }

    fn load_texture(&mut self, path: &Path) -> Result<TextureId, EngineError> {
        let path_str = path.to_str().ok_or_else(|| EngineError::TextureLoad {
            path: path.to_path_buf(),
            reason: "path is not valid UTF-8".into(),
        })?;
        let texture =
            self.rl
                .load_texture(&self.thread, path_str)
                .map_err(|e| EngineError::TextureLoad {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
        self.textures.push(texture);
        Ok(TextureId((self.textures.len() - 1) as u32))
    }

    fn begin_frame(&mut self) {
        unsafe {
            ffi::BeginDrawing();
            ffi::ClearBackground(to_ffi_color(self.clear_color));
        }
    }

    fn end_frame(&mut self) {
        unsafe {
            ffi::EndDrawing();
        }
    }

    fn begin_camera(&mut self, camera: &Camera) {
        let cam = ffi::Camera2D {
            offset: ffi::Vector2 {
                x: self.rl.get_screen_width() as f32 * 0.5,
                y: self.rl.get_screen_height() as f32 * 0.5,
            },
            target: to_ffi_vec(camera.position()),
            rotation: 0.0,
            zoom: camera.zoom(),
        };
        unsafe {
            ffi::BeginMode2D(cam);
        }
    }

    fn end_camera(&mut self) {
        unsafe {
            ffi::EndMode2D();
        }
    }

    fn draw_texture(
        &mut self,
        texture: TextureId,
        source: Rect,
        dest: Rect,
        origin: Vec2,
        rotation: f32,
        tint: Rgba,
    ) {
        let Some(tex) = self.textures.get(texture.0 as usize) else {
            return;
        };
        unsafe {
            ffi::DrawTexturePro(
                **tex,
                to_ffi_rect(source),
                to_ffi_rect(dest),
                to_ffi_vec(origin),
                rotation,
                to_ffi_color(tint),
            );
        }
    }
}
