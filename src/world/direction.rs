//! Axis directions and the constant face templates indexed by them.

use cgmath::Vector3;

/// The six axis-aligned directions a voxel face can point.
///
/// The discriminant indexes [`FACE_CORNERS`]: positive axes first, then the
/// negative axes in the same order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards positive X.
    PosX = 0,
    /// Towards positive Y (up).
    PosY = 1,
    /// Towards positive Z.
    PosZ = 2,
    /// Towards negative X.
    NegX = 3,
    /// Towards negative Y (down).
    NegY = 4,
    /// Towards negative Z.
    NegZ = 5,
}

impl Direction {
    /// All six directions, in face-table order.
    pub const ALL: [Direction; 6] = [
        Direction::PosX,
        Direction::PosY,
        Direction::PosZ,
        Direction::NegX,
        Direction::NegY,
        Direction::NegZ,
    ];

    /// Unit offset to the neighboring cell in this direction.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            Direction::PosX => Vector3::new(1, 0, 0),
            Direction::PosY => Vector3::new(0, 1, 0),
            Direction::PosZ => Vector3::new(0, 0, 1),
            Direction::NegX => Vector3::new(-1, 0, 0),
            Direction::NegY => Vector3::new(0, -1, 0),
            Direction::NegZ => Vector3::new(0, 0, -1),
        }
    }
}

/// Corner offsets of the quad emitted for each direction, four corners per
/// face, wound counter-clockwise seen from outside the voxel.
///
/// Indexed by `Direction as usize`.
pub const FACE_CORNERS: [[[f32; 3]; 4]; 6] = [
    // PosX
    [
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [1.0, 1.0, 0.0],
        [1.0, 0.0, 0.0],
    ],
    // PosY
    [
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
        [0.0, 1.0, 0.0],
        [1.0, 1.0, 0.0],
    ],
    // PosZ
    [
        [0.0, 0.0, 1.0],
        [0.0, 1.0, 1.0],
        [1.0, 1.0, 1.0],
        [1.0, 0.0, 1.0],
    ],
    // NegX
    [
        [0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 1.0, 1.0],
        [0.0, 0.0, 1.0],
    ],
    // NegY
    [
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 0.0, 0.0],
        [0.0, 0.0, 0.0],
    ],
    // NegZ
    [
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0],
    ],
];

/// Texture coordinates shared by every face, one per corner.
pub const FACE_TEX_COORDS: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];

/// Index pattern splitting a quad into two triangles, offset by 4 per face.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];
