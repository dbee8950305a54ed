use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer block coordinate in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Position displaced by the given deltas.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// Chunk column (16x16) containing this position.
    pub const fn chunk(self) -> (i32, i32) {
        (self.x >> 4, self.z >> 4)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_of_negative_coordinates() {
        assert_eq!(BlockPos::new(-1, 64, -17).chunk(), (-1, -2));
        assert_eq!(BlockPos::new(15, 0, 16).chunk(), (0, 1));
    }

    #[test]
    fn offset_moves_all_axes() {
        let pos = BlockPos::new(1, 2, 3).offset(-1, 1, 0);
        assert_eq!(pos, BlockPos::new(0, 3, 3));
        assert_eq!(pos.to_string(), "(0, 3, 3)");
    }
}
