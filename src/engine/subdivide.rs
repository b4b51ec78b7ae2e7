// Recursive midpoint subdivision producing Sierpinski gasket geometry.
//
// Each step replaces one triangle with four: three corner triangles plus the
// middle one, built from the three edge midpoints. Only leaf triangles
// (depth 0) are written to the output.
//
// Vertex count for one base triangle: V(n) = 3 * 4^n
//   depth 0:   3
//   depth 1:  12
//   depth 2:  48
//   depth 3: 192
// A tetrahedron subdivides its four faces independently: 4 * 3 * 4^n.
//
// Draw ranges are u32, so no output buffer may hold more than u32::MAX
// vertices. One triangle stops fitting past depth 15, a tetrahedron past 14.

use std::ops::Range;
use glam::Vec3;
use super::error::{GasketError, Result};
use super::mesh::{Point, VertexList};

// ============================================================================
// PROJECTION POLICY
// ============================================================================

/// What happens to each new edge midpoint before recursing.
pub trait Projection<P: Point> {
    fn project(&self, p: P) -> Result<P>;
}

/// Keep raw midpoints: the flat 2D gasket.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flat;

impl<P: Point> Projection<P> for Flat {
    fn project(&self, p: P) -> Result<P> {
        Ok(p)
    }
}

/// Push midpoints out onto the unit sphere: the curved 3D gasket.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitSphere;

impl Projection<Vec3> for UnitSphere {
    fn project(&self, p: Vec3) -> Result<Vec3> {
        normalize(p)
    }
}

/// Rescale to unit Euclidean length.
/// The zero vector has no direction and is rejected, as is anything non-finite.
pub fn normalize(p: Vec3) -> Result<Vec3> {
    let length = (p.x * p.x + p.y * p.y + p.z * p.z).sqrt();
    if length == 0.0 || !length.is_finite() {
        return Err(GasketError::DegenerateNormal { x: p.x, y: p.y, z: p.z });
    }
    Ok(Vec3::new(p.x / length, p.y / length, p.z / length))
}

// ============================================================================
// VERTEX COUNTS
// ============================================================================

/// Most vertices a single output buffer may hold: the widest u32 draw range.
pub const MAX_VERTICES: usize = u32::MAX as usize;

/// Deepest level at which a full gasket scene (tetrahedron plus flat
/// triangle) still fits in `MAX_VERTICES`.
pub const MAX_DEPTH: u32 = 14;

/// Vertices emitted for one base triangle at `depth`.
/// `None` if negative or more than `MAX_VERTICES`.
pub fn triangle_vertex_count(depth: i64) -> Option<usize> {
    let depth = u32::try_from(depth).ok()?;
    4usize
        .checked_pow(depth)?
        .checked_mul(3)
        .filter(|&n| n <= MAX_VERTICES)
}

/// Vertices emitted for a whole tetrahedron at `depth`.
pub fn tetrahedron_vertex_count(depth: i64) -> Option<usize> {
    triangle_vertex_count(depth)?
        .checked_mul(4)
        .filter(|&n| n <= MAX_VERTICES)
}

/// Make room for `count` more vertices, or fail with `DepthTooLarge` if the
/// buffer would outgrow `MAX_VERTICES` or the allocation is refused.
fn reserve_for<P: Point>(out: &mut VertexList<P>, count: usize, depth: u32) -> Result<()> {
    let too_large = GasketError::DepthTooLarge { depth };
    match out.vertex_count().checked_add(count) {
        Some(total) if total <= MAX_VERTICES => {}
        _ => return Err(too_large),
    }
    out.try_reserve(count).map_err(|_| too_large)
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Subdivide triangle `(a, b, c)` `depth` times, appending leaf triangles to `out`.
///
/// Sub-triangle order at each level is fixed:
///   (a, ab, ac), (ab, b, bc), (bc, c, ac), (ab, bc, ac)
///
/// Negative depth is rejected before anything is written, as is any depth
/// whose output would not fit in `MAX_VERTICES` alongside what `out` already
/// holds. If the projection fails partway, `out` is rolled back to its
/// length on entry.
pub fn divide_triangle<P, J>(
    a: P,
    b: P,
    c: P,
    depth: i64,
    projection: &J,
    out: &mut VertexList<P>,
) -> Result<()>
where
    P: Point,
    J: Projection<P> + ?Sized,
{
    if depth < 0 {
        return Err(GasketError::InvalidDepth { depth });
    }
    let level = u32::try_from(depth).unwrap_or(u32::MAX);
    let count = triangle_vertex_count(depth).ok_or(GasketError::DepthTooLarge { depth: level })?;
    reserve_for(out, count, level)?;

    let start = out.vertex_count();
    if let Err(e) = divide(a, b, c, level, projection, out) {
        out.truncate(start);
        return Err(e);
    }
    Ok(())
}

/// Subdivide all four faces of tetrahedron `(a, b, c, d)`.
///
/// Faces are processed in the fixed order (a,b,c), (d,c,b), (a,d,b), (a,c,d).
/// Returns each face's vertex range within `out`, in that order.
pub fn tetrahedron<P, J>(
    a: P,
    b: P,
    c: P,
    d: P,
    depth: i64,
    projection: &J,
    out: &mut VertexList<P>,
) -> Result<[Range<usize>; 4]>
where
    P: Point,
    J: Projection<P> + ?Sized,
{
    if depth < 0 {
        return Err(GasketError::InvalidDepth { depth });
    }
    let level = u32::try_from(depth).unwrap_or(u32::MAX);
    let count = tetrahedron_vertex_count(depth).ok_or(GasketError::DepthTooLarge { depth: level })?;
    reserve_for(out, count, level)?;

    let start = out.vertex_count();
    let faces = [(a, b, c), (d, c, b), (a, d, b), (a, c, d)];
    let mut ranges: [Range<usize>; 4] = Default::default();

    for (range, (p, q, r)) in ranges.iter_mut().zip(faces) {
        let face_start = out.vertex_count();
        if let Err(e) = divide_triangle(p, q, r, depth, projection, out) {
            out.truncate(start);
            return Err(e);
        }
        *range = face_start..out.vertex_count();
    }

    Ok(ranges)
}

// ============================================================================
// RECURSION
// ============================================================================

fn divide<P, J>(a: P, b: P, c: P, level: u32, projection: &J, out: &mut VertexList<P>) -> Result<()>
where
    P: Point,
    J: Projection<P> + ?Sized,
{
    if level == 0 {
        out.push_triangle(a, b, c);
        return Ok(());
    }

    let ab = projection.project(a.midpoint(b))?;
    let ac = projection.project(a.midpoint(c))?;
    let bc = projection.project(b.midpoint(c))?;

    divide(a, ab, ac, level - 1, projection, out)?;
    divide(ab, b, bc, level - 1, projection, out)?;
    divide(bc, c, ac, level - 1, projection, out)?;
    divide(ab, bc, ac, level - 1, projection, out)
}
