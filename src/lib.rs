//! Vista Engine library.
//!
//! A thin 2D sprite/animation layer over a pluggable rendering backend:
//! sprite state bookkeeping behind generation-checked handles, animation
//! timers, viewport culling, and z-ordered draw emission. The heavy lifting
//! (windowing, texture upload, pixel work) belongs to the backend behind
//! the [`backend::RenderBackend`] trait.
//!
//! - [`atlas`] – sprite-name to texture-region lookup and the JSON loader
//! - [`backend`] – rendering backend trait, raylib and headless impls
//! - [`config`] – INI-backed engine configuration
//! - [`ecs`] – optional bevy_ecs bridge (feature `ecs`)
//! - [`engine`] – sprite registry, animation, camera, and frame pipeline
//! - [`error`] – load-time error type
//! - [`math`] – engine-owned vector/rect/color primitives

pub mod atlas;
pub mod backend;
pub mod config;
#[cfg(feature = "ecs")]
pub mod ecs;
pub mod engine;
pub mod error;
pub mod math;
