use std::fmt;

/// Stable identifier for a sprite slot in the registry.
///
/// The handle carries no ownership. `index` addresses a slot and
/// `generation` must match the slot's current generation; a mismatch means
/// the sprite was destroyed (and the slot possibly reused) after this handle
/// was issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpriteHandle {
    pub index: u32,
    pub generation: u32,
}

impl fmt::Display for SpriteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}
