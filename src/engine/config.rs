// Application configuration
// Defaults reproduce the two lab demos; a few values can be overridden from
// the environment:
//
//   GASKET_DEPTH_2D   2D gasket depth          (default 4)
//   GASKET_DEPTH_3D   3D gasket depth          (default 2)
//   GASKET_MAX_DEPTH  upper clamp for both     (default 8, at most 14)
//   GASKET_SCENE      "gasket" | "shapes"      (default gasket)
//   RUST_LOG          env_logger filter

use glam::{Vec2, Vec3};
use super::input::{parse_depth, DepthSettings};
use super::scene::SceneKind;
use super::subdivide::MAX_DEPTH;

pub const DEFAULT_DEPTH_2D: u32 = 4;
pub const DEFAULT_DEPTH_3D: u32 = 2;

/// 3 * 4^8 = 196608 vertices per triangle; beyond this the demo stops being interactive.
pub const DEFAULT_MAX_DEPTH: u32 = 8;

// ============================================================================
// GEOMETRY
// ============================================================================

/// Shapes demo: a triangle and a quad given as a fan, in clip space.
#[derive(Debug, Clone)]
pub struct ShapesConfig {
    pub triangle: [Vec2; 3],
    pub quad_fan: [Vec2; 4],
    pub triangle_color: [f32; 4],
    pub quad_color: [f32; 4],
}

impl Default for ShapesConfig {
    fn default() -> Self {
        Self {
            triangle: [
                Vec2::new(-0.5, 0.5),
                Vec2::new(-1.0, -0.5),
                Vec2::new(0.0, -0.5),
            ],
            // Shares its first corner with the triangle's last.
            quad_fan: [
                Vec2::new(0.0, -0.5),
                Vec2::new(1.0, -0.5),
                Vec2::new(1.0, 0.5),
                Vec2::new(0.0, 0.5),
            ],
            triangle_color: [1.0, 0.0, 0.0, 1.0],
            quad_color: [0.0, 0.0, 1.0, 1.0],
        }
    }
}

/// Base primitives and per-copy placement for the gasket scene.
#[derive(Debug, Clone)]
pub struct GasketConfig {
    /// Corners a, b, c, d. Faces are (a,b,c), (d,c,b), (a,d,b), (a,c,d).
    pub tetrahedron: [Vec3; 4],
    /// One draw of the whole tetrahedron gasket per entry.
    pub tetrahedron_translations: Vec<Vec3>,
    pub tetrahedron_color: [f32; 4],

    pub triangle: [Vec2; 3],
    pub triangle_translation: Vec3,
    pub triangle_color: [f32; 4],

    pub shapes: ShapesConfig,
}

impl Default for GasketConfig {
    fn default() -> Self {
        Self {
            tetrahedron: [
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(0.0, 0.942809, -0.333333),
                Vec3::new(0.816497, -0.471405, -0.333333),
                Vec3::new(-0.816497, -0.471405, -0.333333),
            ],
            tetrahedron_translations: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(-1.0, -1.5, 0.0),
                Vec3::new(1.0, -1.5, 0.0),
            ],
            tetrahedron_color: [0.85, 0.2, 0.2, 1.0],

            triangle: [
                Vec2::new(-0.6, -0.6),
                Vec2::new(0.0, 0.6),
                Vec2::new(0.6, -0.6),
            ],
            triangle_translation: Vec3::new(-2.8, 0.0, 0.0),
            triangle_color: [0.2, 0.3, 0.85, 1.0],

            shapes: ShapesConfig::default(),
        }
    }
}

// ============================================================================
// APP CONFIG
// ============================================================================

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub window_title: String,
    pub window_size: (u32, u32),
    pub clear_color: wgpu::Color,
    pub scene: SceneKind,
    pub depths: DepthSettings,
    pub gasket: GasketConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_title: "Sierpinski Gasket".to_string(),
            window_size: (1280, 720),
            clear_color: wgpu::Color::WHITE,
            scene: SceneKind::Gasket,
            depths: DepthSettings::new(DEFAULT_DEPTH_2D, DEFAULT_DEPTH_3D, DEFAULT_MAX_DEPTH),
            gasket: GasketConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `GASKET_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    /// Invalid values are logged and the default is kept, so initialize
    /// logging first.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        let depth = |key: &str, default: u32| -> u32 {
            match lookup(key).map(|raw| parse_depth(&raw)) {
                None => default,
                Some(Ok(value)) => value,
                Some(Err(e)) => {
                    log::warn!("ignoring {key}: {e}");
                    default
                }
            }
        };

        let mut max_depth = depth("GASKET_MAX_DEPTH", DEFAULT_MAX_DEPTH);
        if max_depth > MAX_DEPTH {
            log::warn!("GASKET_MAX_DEPTH {max_depth} is past the supported limit, using {MAX_DEPTH}");
            max_depth = MAX_DEPTH;
        }
        let depth_2d = depth("GASKET_DEPTH_2D", DEFAULT_DEPTH_2D);
        let depth_3d = depth("GASKET_DEPTH_3D", DEFAULT_DEPTH_3D);
        if depth_2d > max_depth || depth_3d > max_depth {
            log::warn!("clamping depths ({depth_2d}, {depth_3d}) to max depth {max_depth}");
        }
        config.depths = DepthSettings::new(depth_2d, depth_3d, max_depth);

        if let Some(raw) = lookup("GASKET_SCENE") {
            match raw.parse() {
                Ok(scene) => config.scene = scene,
                Err(e) => log::warn!("ignoring GASKET_SCENE: {e}"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_demo() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config.depths, DepthSettings::new(4, 2, 8));
        assert_eq!(config.scene, SceneKind::Gasket);
        assert_eq!(config.gasket.tetrahedron_translations.len(), 4);
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup(&[
            ("GASKET_DEPTH_2D", "1"),
            ("GASKET_DEPTH_3D", "3"),
            ("GASKET_SCENE", "shapes"),
        ]));
        assert_eq!(config.depths.depth_2d(), 1);
        assert_eq!(config.depths.depth_3d(), 3);
        assert_eq!(config.scene, SceneKind::Shapes);
    }

    #[test]
    fn invalid_env_values_keep_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("GASKET_DEPTH_2D", "-1"),
            ("GASKET_DEPTH_3D", "lots"),
            ("GASKET_SCENE", "teapot"),
        ]));
        assert_eq!(config.depths.depth_2d(), DEFAULT_DEPTH_2D);
        assert_eq!(config.depths.depth_3d(), DEFAULT_DEPTH_3D);
        assert_eq!(config.scene, SceneKind::Gasket);
    }

    #[test]
    fn depths_clamp_to_configured_max() {
        let config = AppConfig::from_lookup(lookup(&[
            ("GASKET_MAX_DEPTH", "3"),
            ("GASKET_DEPTH_2D", "6"),
        ]));
        assert_eq!(config.depths.depth_2d(), 3);
        assert_eq!(config.depths.max_depth(), 3);
    }

    #[test]
    fn max_depth_is_capped_at_what_a_u32_buffer_holds() {
        let config = AppConfig::from_lookup(lookup(&[
            ("GASKET_MAX_DEPTH", "29"),
            ("GASKET_DEPTH_2D", "29"),
            ("GASKET_DEPTH_3D", "40"),
        ]));
        assert_eq!(config.depths.max_depth(), MAX_DEPTH);
        assert_eq!(config.depths.depth_2d(), MAX_DEPTH);
        assert_eq!(config.depths.depth_3d(), MAX_DEPTH);
    }

    #[test]
    fn default_tetrahedron_corners_are_unit_length() {
        for corner in GasketConfig::default().tetrahedron {
            assert!((corner.length() - 1.0).abs() < 1e-5);
        }
    }
}
