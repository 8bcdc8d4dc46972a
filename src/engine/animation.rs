//! Animation playback state and reusable animation definitions.
//!
//! [`AnimationState`] is the per-sprite timer: which animation is playing,
//! the elapsed time within the current frame, and the play/loop flags. It is
//! pure data plus an update function; sprite-name resolution against the
//! atlas happens elsewhere.
//!
//! [`AnimationLibrary`] is the caller-facing registry of reusable
//! [`AnimationDef`] entries keyed by string IDs, resolved before playback
//! starts. The engine never interprets where the definitions come from.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Immutable playback parameters for one animation, fixed at play-time.
///
/// `total_duration` is for the whole animation; each frame gets an equal
/// share. Per-frame variable durations are not supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationDef {
    pub frame_count: usize,
    pub total_duration: f32,
    pub looping: bool,
    /// Optional atlas folder prepended when resolving frame sprite names.
    #[serde(default)]
    pub name_prefix: Option<String>,
}

/// Reusable animation definitions keyed by string IDs.
#[derive(Debug, Clone, Default)]
pub struct AnimationLibrary {
    pub animations: FxHashMap<String, AnimationDef>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, def: AnimationDef) {
        self.animations.insert(key.into(), def);
    }

    pub fn get(&self, key: &str) -> Option<&AnimationDef> {
        self.animations.get(key)
    }

    /// Load definitions from a JSON file mapping keys to [`AnimationDef`]s.
    ///
    /// Entries already present keep their value unless the file redefines
    /// them.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize, EngineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::AssetRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let defs: FxHashMap<String, AnimationDef> =
            serde_json::from_str(&text).map_err(|e| EngineError::AssetParse {
                path: path.to_path_buf(),
                source: e,
            })?;
        let count = defs.len();
        self.animations.extend(defs);
        Ok(count)
    }
}

/// Per-sprite animation timer state.
///
/// Embedded in a sprite record; it has no lifecycle of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    pub animation_key: String,
    pub elapsed_time: f32,
    pub frame: usize,
    pub frame_count: usize,
    pub frame_duration: f32,
    pub playing: bool,
    pub looping: bool,
}

impl AnimationState {
    pub fn new(
        animation_key: impl Into<String>,
        frame_count: usize,
        total_duration: f32,
        looping: bool,
    ) -> Self {
        let frame_count = frame_count.max(1);
        Self {
            animation_key: animation_key.into(),
            elapsed_time: 0.0,
            frame: 0,
            frame_count,
            frame_duration: total_duration / frame_count as f32,
            playing: true,
            looping,
        }
    }

    /// Restart playback with a new animation.
    ///
    /// Always resets to frame 0, even when `animation_key` is unchanged;
    /// replaying from the start is the intended behavior.
    pub fn play(
        &mut self,
        animation_key: impl Into<String>,
        frame_count: usize,
        total_duration: f32,
        looping: bool,
    ) {
        *self = Self::new(animation_key, frame_count, total_duration, looping);
    }

    /// Advance the timer by `dt` seconds.
    ///
    /// Excess time folds into frame advances, so a large `dt` (after a
    /// stall) can legitimately skip several frames in one call. A
    /// non-looping animation clamps on its last frame, stops, and discards
    /// whatever time is left over; once stopped, updates are no-ops.
    pub fn update(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        self.elapsed_time += dt;
        while self.elapsed_time >= self.frame_duration {
            self.elapsed_time -= self.frame_duration;
            self.frame += 1;
            if self.frame == self.frame_count {
                if self.looping {
                    self.frame = 0;
                } else {
                    self.frame = self.frame_count - 1;
                    self.playing = false;
                    self.elapsed_time = 0.0;
                    break;
                }
            }
        }
    }

    /// Atlas sprite name for the current frame.
    ///
    /// Frame numbers are 1-based in the name while `frame` is 0-based
    /// internally; atlases are packed with `_0001` as the first frame.
    pub fn sprite_name(&self, prefix: Option<&str>) -> String {
        match prefix {
            Some(prefix) => format!("{}/{}_{:04}", prefix, self.animation_key, self.frame + 1),
            None => format!("{}_{:04}", self.animation_key, self.frame + 1),
        }
    }
}
