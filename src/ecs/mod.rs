//! Optional bevy_ecs bridge.
//!
//! The engine does not depend on any entity-component registry; this module
//! lets a game that already runs a bevy_ecs `World` drive the visual engine
//! from it. Entities carry a [`components::SpriteRef`] pointing at a
//! registry sprite, and the [`systems`] copy ECS state into the registry
//! once per frame, before `tick` runs.
//!
//! The engine itself lives in the world as a non-send resource (rendering
//! backends are generally not `Send`), accessed from systems through
//! `NonSendMut`.

pub mod components;
pub mod systems;
