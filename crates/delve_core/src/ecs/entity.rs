//! Entity handle with generational index
//!
//! Handles are lightweight (8 byte) values that reference a slot in the
//! World. The generation counter prevents use-after-free bugs when a slot
//! is recycled.

use std::fmt;

/// Entity handle (generation-indexed for safety)
///
/// Format: [32-bit index | 32-bit generation]
/// - Index: Position in the World's slot arrays. Index 0 is never allocated.
/// - Generation: Incremented on destruction (detects stale handles)
///
/// Example:
/// ```ignore
/// let handle = world.create()?;
/// world.destroy(handle)?;
/// // handle is now invalid (generation mismatch)
/// assert!(!world.is_alive(handle));
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// The universal null handle. Never alive in any World.
    pub const NULL: Handle = Handle::new(0, 0);

    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_null(&self) -> bool {
        self.index == 0
    }

    /// Serialize to 64-bit integer (for logs and host tooling)
    pub fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Deserialize from 64-bit integer
    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}
