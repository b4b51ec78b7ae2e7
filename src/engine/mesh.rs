// Vertex types and the flat triangle list the subdivision generator fills.
//
// Data flow:
//   base corners → divide_triangle()/tetrahedron() → VertexList<P> → lift() → VertexList<Vec3> → GPU

use std::collections::TryReserveError;
use glam::{Vec2, Vec3};

// ============================================================================
// POINT
// ============================================================================

/// A 2D or 3D coordinate the generator can subdivide.
/// Points are plain values; two points with equal components are the same point.
pub trait Point: Copy + PartialEq + std::fmt::Debug {
    /// Number of components written per vertex by `VertexList::flatten`.
    const DIM: usize;

    /// Linear interpolation at 0.5 (componentwise average).
    fn midpoint(self, other: Self) -> Self;

    /// Append this point's components, x first.
    fn write_components(self, out: &mut Vec<f32>);

    /// Embed in 3D. 2D points land on the z = 0 plane.
    fn to_vec3(self) -> Vec3;
}

impl Point for Vec2 {
    const DIM: usize = 2;

    fn midpoint(self, other: Self) -> Self {
        self.lerp(other, 0.5)
    }

    fn write_components(self, out: &mut Vec<f32>) {
        out.extend_from_slice(&self.to_array());
    }

    fn to_vec3(self) -> Vec3 {
        self.extend(0.0)
    }
}

impl Point for Vec3 {
    const DIM: usize = 3;

    fn midpoint(self, other: Self) -> Self {
        self.lerp(other, 0.5)
    }

    fn write_components(self, out: &mut Vec<f32>) {
        out.extend_from_slice(&self.to_array());
    }

    fn to_vec3(self) -> Vec3 {
        self
    }
}

// ============================================================================
// VERTEX LIST
// ============================================================================

/// Ordered triangle list: every three consecutive points form one triangle.
///
/// Emission order is significant. The renderer slices this list into
/// contiguous vertex ranges and draws each with its own translation,
/// so the generator must always emit triangles in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexList<P: Point> {
    points: Vec<P>,
}

impl<P: Point> Default for VertexList<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Point> VertexList<P> {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn with_capacity(vertices: usize) -> Self {
        Self { points: Vec::with_capacity(vertices) }
    }

    /// Append one triangle, vertices in the given order.
    pub fn push_triangle(&mut self, a: P, b: P, c: P) {
        self.points.extend_from_slice(&[a, b, c]);
    }

    /// Append every triangle of `other`, preserving its order.
    pub fn append(&mut self, other: &VertexList<P>) {
        self.points.extend_from_slice(&other.points);
    }

    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.points.try_reserve(additional)
    }

    /// Drop everything emitted after `len` vertices. Used to roll back a failed pass.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.points.truncate(len);
    }

    pub fn vertex_count(&self) -> usize { self.points.len() }
    pub fn triangle_count(&self) -> usize { self.points.len() / 3 }
    pub fn is_empty(&self) -> bool { self.points.is_empty() }
    pub fn points(&self) -> &[P] { &self.points }

    /// Component-major flat sequence (x, y[, z] per vertex) in emission order.
    pub fn flatten(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.points.len() * P::DIM);
        for &p in &self.points {
            p.write_components(&mut out);
        }
        out
    }

    /// Same triangles embedded in 3D, so 2D and 3D output can share one buffer.
    pub fn lift(&self) -> VertexList<Vec3> {
        VertexList {
            points: self.points.iter().map(|p| p.to_vec3()).collect(),
        }
    }
}

impl VertexList<Vec3> {
    /// Convert to the GPU vertex layout, one `GpuVertex` per emitted point.
    pub fn gpu_vertices(&self) -> Vec<GpuVertex> {
        self.points
            .iter()
            .map(|p| GpuVertex { position: p.to_array() })
            .collect()
    }
}

// ============================================================================
// GPU LAYOUTS
// ============================================================================

/// GPU vertex: position only, colour comes from the draw instance.
///   @location(0) position: vec3<f32>
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
}

impl GpuVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

/// Per-draw data: the translation and colour one vertex range is drawn with.
///   @location(1) translation: vec3<f32>
///   @location(2) color:       vec4<f32>
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawInstance {
    pub translation: [f32; 3],
    _padding: f32,  // Align color to 16 bytes
    pub color: [f32; 4],
}

impl DrawInstance {
    pub fn new(translation: Vec3, color: [f32; 4]) -> Self {
        Self {
            translation: translation.to_array(),
            _padding: 0.0,
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DrawInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_is_component_major() {
        let mut list = VertexList::new();
        list.push_triangle(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0), Vec2::new(5.0, 6.0));
        assert_eq!(list.flatten(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(list.triangle_count(), 1);
    }

    #[test]
    fn lift_puts_2d_points_on_z_zero() {
        let mut list = VertexList::new();
        list.push_triangle(Vec2::new(-1.0, 0.5), Vec2::X, Vec2::Y);
        let lifted = list.lift();
        assert_eq!(
            lifted.points(),
            &[Vec3::new(-1.0, 0.5, 0.0), Vec3::X, Vec3::Y]
        );
        assert_eq!(lifted.flatten().len(), 9);
    }

    #[test]
    fn midpoint_averages_components() {
        let m = Vec3::new(0.0, 2.0, -4.0).midpoint(Vec3::new(2.0, 0.0, 4.0));
        assert_eq!(m, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn gpu_layouts_have_expected_sizes() {
        assert_eq!(std::mem::size_of::<GpuVertex>(), 12);
        assert_eq!(std::mem::size_of::<DrawInstance>(), 32);
    }
}
