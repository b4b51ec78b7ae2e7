// Engine module - gasket generation and the collaborators around it

pub mod camera;
pub mod config;
pub mod controls;
pub mod error;
pub mod input;
pub mod logging;
pub mod mesh;
pub mod scene;
pub mod subdivide;

// Re-export commonly used items
pub use error::GasketError;
pub use mesh::{DrawInstance, GpuVertex, Point, VertexList};
pub use subdivide::{divide_triangle, normalize, tetrahedron, Flat, Projection, UnitSphere};
