// Error type shared by the generator, scene assembly and depth controls.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GasketError {
    /// Subdivision depth below zero.
    #[error("subdivision depth must be non-negative, got {depth}")]
    InvalidDepth { depth: i64 },

    /// Depth text that is empty or not an integer.
    #[error("cannot parse subdivision depth from {input:?}")]
    UnparsableDepth { input: String },

    /// Normalizing a zero-length or non-finite vector.
    #[error("cannot normalize degenerate vector ({x}, {y}, {z})")]
    DegenerateNormal { x: f32, y: f32, z: f32 },

    /// Output for this depth would not fit in a vertex buffer.
    #[error("subdivision depth {depth} produces more vertices than a buffer can address")]
    DepthTooLarge { depth: u32 },

    /// A triangle fan needs at least one triangle.
    #[error("triangle fan needs at least 3 vertices, got {vertices}")]
    DegenerateFan { vertices: usize },

    #[error("draw range ends at vertex {end} but the buffer holds {len}")]
    RangeOutOfBounds { end: u32, len: usize },
}

pub type Result<T> = std::result::Result<T, GasketError>;
