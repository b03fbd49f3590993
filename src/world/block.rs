//! Block identities.

/// A single voxel's identity. Pure value type: a block has no state beyond
/// its enum tag.
///
/// `Air` is the universal "empty" sentinel: every occupancy test in the
/// engine reduces to [`Block::is_air`]. Water counts as occupied for face
/// culling, so submerged terrain does not render its sea floor faces twice.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Block {
    /// Empty space.
    #[default]
    Air,
    /// Bedrock-to-surface filler.
    Stone,
    /// The soil band directly under the surface.
    Dirt,
    /// The surface block of grassland columns.
    Grass,
    /// Still water between a submerged surface and sea level.
    Water,
}

impl Block {
    /// Whether this block is empty space.
    pub fn is_air(self) -> bool {
        self == Block::Air
    }

    /// Whether this block occupies its cell for face culling.
    pub fn is_opaque(self) -> bool {
        !self.is_air()
    }
}
