// Scene assembly: turns generator output into one vertex list plus the
// (range, translation, colour) draws the renderer issues over it.
//
// Gasket scene buffer layout:
//   [ 3D tetrahedron gasket | 2D triangle gasket lifted to z = 0 ]
//     drawn once per tetra     drawn once
//     translation

use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use glam::{Vec2, Vec3};
use super::config::{AppConfig, GasketConfig};
use super::error::{GasketError, Result};
use super::input::DepthSettings;
use super::mesh::{DrawInstance, Point, VertexList};
use super::subdivide::{
    divide_triangle, tetrahedron, tetrahedron_vertex_count, triangle_vertex_count, Flat, UnitSphere,
    MAX_VERTICES,
};

// ============================================================================
// SCENE KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    /// 3D spherical tetrahedron gasket plus the flat 2D gasket.
    Gasket,
    /// One triangle and one quad in clip space.
    Shapes,
}

impl SceneKind {
    pub fn toggled(self) -> Self {
        match self {
            SceneKind::Gasket => SceneKind::Shapes,
            SceneKind::Shapes => SceneKind::Gasket,
        }
    }

    /// Whether vertices go through the perspective camera.
    /// The shapes demo is authored directly in clip space.
    pub fn uses_camera(self) -> bool {
        matches!(self, SceneKind::Gasket)
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneKind::Gasket => write!(f, "gasket"),
            SceneKind::Shapes => write!(f, "shapes"),
        }
    }
}

impl FromStr for SceneKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gasket" => Ok(SceneKind::Gasket),
            "shapes" => Ok(SceneKind::Shapes),
            other => Err(format!("unknown scene {other:?} (expected \"gasket\" or \"shapes\")")),
        }
    }
}

// ============================================================================
// DRAW RANGES
// ============================================================================

/// One draw call: a contiguous vertex range and the transform it is drawn with.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRange {
    pub vertices: Range<u32>,
    pub translation: Vec3,
    pub color: [f32; 4],
}

impl DrawRange {
    pub fn instance(&self) -> DrawInstance {
        DrawInstance::new(self.translation, self.color)
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.end - self.vertices.start
    }
}

fn to_u32_range(range: Range<usize>, depth: u32) -> Result<Range<u32>> {
    let too_large = || GasketError::DepthTooLarge { depth };
    let start = u32::try_from(range.start).map_err(|_| too_large())?;
    let end = u32::try_from(range.end).map_err(|_| too_large())?;
    Ok(start..end)
}

// ============================================================================
// SCENE
// ============================================================================

/// Everything the renderer needs for one frame's geometry.
/// Rebuilt from scratch whenever a depth changes.
pub struct Scene {
    pub kind: SceneKind,
    pub vertices: VertexList<Vec3>,
    pub draws: Vec<DrawRange>,
}

impl Scene {
    pub fn build(kind: SceneKind, config: &GasketConfig, depths: &DepthSettings) -> Result<Self> {
        let scene = match kind {
            SceneKind::Gasket => Self::gasket(config, depths)?,
            SceneKind::Shapes => Self::shapes(config)?,
        };
        scene.validate()?;
        log::info!(
            "built {} scene: {} vertices, {} draws (depth 2D {}, 3D {})",
            kind,
            scene.vertices.vertex_count(),
            scene.draws.len(),
            depths.depth_2d(),
            depths.depth_3d(),
        );
        Ok(scene)
    }

    /// Build `kind` at `depths` and only then adopt both into `app`.
    /// On failure `app` keeps the scene kind and depths it had, which still
    /// describe the scene currently on screen.
    pub fn rebuild(app: &mut AppConfig, kind: SceneKind, depths: DepthSettings) -> Result<Self> {
        let scene = Self::build(kind, &app.gasket, &depths)?;
        app.scene = kind;
        app.depths = depths;
        Ok(scene)
    }

    /// Spherical tetrahedron gasket drawn at every configured translation,
    /// followed by the flat triangle gasket.
    /// Fails with `DepthTooLarge` before generating anything if the combined
    /// buffer would not fit in a u32 draw range.
    pub fn gasket(config: &GasketConfig, depths: &DepthSettings) -> Result<Self> {
        let (depth_2d, depth_3d) = (depths.depth_2d(), depths.depth_3d());
        let tetra_count = tetrahedron_vertex_count(depth_3d.into())
            .ok_or(GasketError::DepthTooLarge { depth: depth_3d })?;
        let flat_count = triangle_vertex_count(depth_2d.into())
            .ok_or(GasketError::DepthTooLarge { depth: depth_2d })?;
        match tetra_count.checked_add(flat_count) {
            Some(total) if total <= MAX_VERTICES => {}
            _ => return Err(GasketError::DepthTooLarge { depth: depth_2d.max(depth_3d) }),
        }

        let mut vertices = VertexList::new();

        let [a, b, c, d] = config.tetrahedron;
        let faces = tetrahedron(a, b, c, d, depths.depth_3d().into(), &UnitSphere, &mut vertices)?;
        let tetra = to_u32_range(faces[0].start..faces[3].end, depths.depth_3d())?;

        let mut flat = VertexList::<Vec2>::new();
        let [p, q, r] = config.triangle;
        divide_triangle(p, q, r, depths.depth_2d().into(), &Flat, &mut flat)?;
        let flat_start = vertices.vertex_count();
        vertices.append(&flat.lift());
        let flat_range = to_u32_range(flat_start..vertices.vertex_count(), depths.depth_2d())?;

        let mut draws: Vec<DrawRange> = config
            .tetrahedron_translations
            .iter()
            .map(|&translation| DrawRange {
                vertices: tetra.clone(),
                translation,
                color: config.tetrahedron_color,
            })
            .collect();
        draws.push(DrawRange {
            vertices: flat_range,
            translation: config.triangle_translation,
            color: config.triangle_color,
        });

        Ok(Self { kind: SceneKind::Gasket, vertices, draws })
    }

    /// A triangle and a quad sharing one buffer, each in its own colour.
    pub fn shapes(config: &GasketConfig) -> Result<Self> {
        let mut vertices = VertexList::new();
        let [a, b, c] = config.shapes.triangle;
        vertices.push_triangle(a, b, c);
        vertices.append(&fan_to_list(&config.shapes.quad_fan[..])?);

        let lifted = vertices.lift();
        let quad = to_u32_range(3..lifted.vertex_count(), 0)?;
        let draws = vec![
            DrawRange {
                vertices: 0..3,
                translation: Vec3::ZERO,
                color: config.shapes.triangle_color,
            },
            DrawRange {
                vertices: quad,
                translation: Vec3::ZERO,
                color: config.shapes.quad_color,
            },
        ];

        Ok(Self { kind: SceneKind::Shapes, vertices: lifted, draws })
    }

    /// Every draw range must lie inside the vertex list.
    pub fn validate(&self) -> Result<()> {
        let len = self.vertices.vertex_count();
        for draw in &self.draws {
            if draw.vertices.end as usize > len || draw.vertices.start > draw.vertices.end {
                return Err(GasketError::RangeOutOfBounds { end: draw.vertices.end, len });
            }
        }
        Ok(())
    }

    pub fn instances(&self) -> Vec<DrawInstance> {
        self.draws.iter().map(DrawRange::instance).collect()
    }
}

/// Expand a triangle fan (v0, v1, ..., vk) into a list of (v0, vi, vi+1) triangles.
pub fn fan_to_list<P: Point>(fan: &[P]) -> Result<VertexList<P>> {
    if fan.len() < 3 {
        return Err(GasketError::DegenerateFan { vertices: fan.len() });
    }
    let mut out = VertexList::with_capacity((fan.len() - 2) * 3);
    let hub = fan[0];
    for pair in fan[1..].windows(2) {
        out.push_triangle(hub, pair[0], pair[1]);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depths(d2: u32, d3: u32) -> DepthSettings {
        let mut depths = DepthSettings::new(0, 0, 8);
        depths.set_2d(d2);
        depths.set_3d(d3);
        depths
    }

    #[test]
    fn gasket_scene_layout() {
        let config = GasketConfig::default();
        let scene = Scene::gasket(&config, &depths(4, 2)).unwrap();

        // 4 * 3 * 4^2 = 192 sphere vertices, then 3 * 4^4 = 768 flat ones.
        assert_eq!(scene.vertices.vertex_count(), 192 + 768);
        assert_eq!(scene.draws.len(), 5);
        for draw in &scene.draws[..4] {
            assert_eq!(draw.vertices, 0..192);
        }
        assert_eq!(scene.draws[4].vertices, 192..960);
        assert_eq!(scene.draws[1].translation, Vec3::new(2.0, 0.0, 0.0));
        scene.validate().unwrap();
    }

    #[test]
    fn flat_gasket_lies_on_z_zero() {
        let scene = Scene::gasket(&GasketConfig::default(), &depths(2, 0)).unwrap();
        let range = scene.draws[4].vertices.clone();
        assert!(scene.vertices.points()[range.start as usize..range.end as usize]
            .iter()
            .all(|p| p.z == 0.0));
    }

    #[test]
    fn sphere_gasket_midpoints_lie_on_unit_sphere() {
        let scene = Scene::gasket(&GasketConfig::default(), &depths(0, 1)).unwrap();
        // Second vertex of the first face is a projected midpoint.
        let p = scene.vertices.points()[1];
        assert!((p.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rebuild_does_not_accumulate() {
        let config = GasketConfig::default();
        let first = Scene::build(SceneKind::Gasket, &config, &depths(3, 1)).unwrap();
        let second = Scene::build(SceneKind::Gasket, &config, &depths(3, 1)).unwrap();
        assert_eq!(first.vertices, second.vertices);
        assert_eq!(first.draws, second.draws);
    }

    #[test]
    fn rebuild_adopts_depths_only_when_the_build_succeeds() {
        let mut app = AppConfig::default();
        app.depths = depths(2, 0);
        // Opposite corners: the first edge midpoint is the origin.
        app.gasket.tetrahedron = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::Z];

        let mut candidate = app.depths;
        candidate.set_3d(1);
        assert!(matches!(
            Scene::rebuild(&mut app, SceneKind::Gasket, candidate),
            Err(GasketError::DegenerateNormal { .. })
        ));
        assert_eq!(app.depths, depths(2, 0));
        assert_eq!(app.scene, SceneKind::Gasket);

        let mut candidate = app.depths;
        candidate.set_2d(3);
        let scene = Scene::rebuild(&mut app, SceneKind::Gasket, candidate).unwrap();
        assert_eq!(app.depths, candidate);
        assert_eq!(scene.vertices.vertex_count(), 12 + 192);

        let current = app.depths;
        let scene = Scene::rebuild(&mut app, SceneKind::Shapes, current).unwrap();
        assert_eq!(app.scene, SceneKind::Shapes);
        assert_eq!(scene.kind, SceneKind::Shapes);
    }

    #[test]
    fn shapes_scene_has_triangle_and_quad() {
        let scene = Scene::build(SceneKind::Shapes, &GasketConfig::default(), &depths(0, 0)).unwrap();
        assert_eq!(scene.vertices.vertex_count(), 9);
        assert_eq!(scene.draws[0].vertices, 0..3);
        assert_eq!(scene.draws[1].vertices, 3..9);
        assert_eq!(scene.draws[1].vertex_count(), 6);
        assert_eq!(scene.draws[0].color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(scene.draws[1].color, [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(scene.vertices.points()[3], Vec3::new(0.0, -0.5, 0.0));
    }

    #[test]
    fn fan_expands_to_hub_triangles() {
        let fan = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
        let list = fan_to_list(&fan[..]).unwrap();
        assert_eq!(
            list.points(),
            &[Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::ZERO, Vec2::ONE, Vec2::Y]
        );
        assert_eq!(
            fan_to_list(&fan[..2]).unwrap_err(),
            GasketError::DegenerateFan { vertices: 2 }
        );
    }

    #[test]
    fn validate_rejects_out_of_range_draws() {
        let mut scene = Scene::shapes(&GasketConfig::default()).unwrap();
        scene.draws[1].vertices = 3..12;
        assert_eq!(
            scene.validate(),
            Err(GasketError::RangeOutOfBounds { end: 12, len: 9 })
        );
    }

    #[test]
    fn scene_kind_parses_and_toggles() {
        assert_eq!(" Shapes ".parse::<SceneKind>(), Ok(SceneKind::Shapes));
        assert!("cube".parse::<SceneKind>().is_err());
        assert_eq!(SceneKind::Gasket.toggled(), SceneKind::Shapes);
        assert_eq!(SceneKind::Gasket.to_string(), "gasket");
    }
}
