// Input state tracking and subdivision depth control
// Abstracts winit keyboard events into a per-frame snapshot, and owns the
// two depth values the gasket scene is generated from.

use std::collections::HashSet;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use super::error::{GasketError, Result};
use super::subdivide::MAX_DEPTH;

// ============================================================================
// DEPTH PARSING
// ============================================================================

/// Parse a user-entered subdivision depth.
/// Empty and non-integer text is unparsable; negative integers are invalid.
pub fn parse_depth(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    let value: i64 = trimmed.parse().map_err(|_| GasketError::UnparsableDepth {
        input: input.to_string(),
    })?;
    if value < 0 {
        return Err(GasketError::InvalidDepth { depth: value });
    }
    u32::try_from(value).map_err(|_| GasketError::DepthTooLarge { depth: u32::MAX })
}

// ============================================================================
// DEPTH SETTINGS
// ============================================================================

/// Current 2D and 3D gasket depths, always within `0..=max_depth`.
/// `max_depth` itself never exceeds the generator's `MAX_DEPTH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthSettings {
    depth_2d: u32,
    depth_3d: u32,
    max_depth: u32,
}

impl DepthSettings {
    pub fn new(depth_2d: u32, depth_3d: u32, max_depth: u32) -> Self {
        let max_depth = max_depth.min(MAX_DEPTH);
        Self {
            depth_2d: depth_2d.min(max_depth),
            depth_3d: depth_3d.min(max_depth),
            max_depth,
        }
    }

    pub fn depth_2d(&self) -> u32 { self.depth_2d }
    pub fn depth_3d(&self) -> u32 { self.depth_3d }
    pub fn max_depth(&self) -> u32 { self.max_depth }

    /// Set the 2D depth, clamped. Returns true if the value changed.
    pub fn set_2d(&mut self, depth: u32) -> bool {
        let depth = depth.min(self.max_depth);
        let changed = depth != self.depth_2d;
        self.depth_2d = depth;
        changed
    }

    /// Set the 3D depth, clamped. Returns true if the value changed.
    pub fn set_3d(&mut self, depth: u32) -> bool {
        let depth = depth.min(self.max_depth);
        let changed = depth != self.depth_3d;
        self.depth_3d = depth;
        changed
    }

    /// Step the 2D depth by `delta`, saturating at 0 and `max_depth`.
    pub fn step_2d(&mut self, delta: i32) -> bool {
        self.set_2d(self.depth_2d.saturating_add_signed(delta))
    }

    pub fn step_3d(&mut self, delta: i32) -> bool {
        self.set_3d(self.depth_3d.saturating_add_signed(delta))
    }
}

// ============================================================================
// KEYBOARD STATE
// ============================================================================

pub struct InputState {
    keys_held: HashSet<KeyCode>,

    // Keys that went down this frame, cleared in end_frame()
    keys_pressed: HashSet<KeyCode>,

    pub window_size: (u32, u32),
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_held: HashSet::new(),
            keys_pressed: HashSet::new(),
            window_size: (0, 0),
        }
    }

    /// Feed a winit WindowEvent into the input state.
    /// Call this once per event before the app's own event handling.
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.apply_key(key, event.state, event.repeat);
                }
            }
            WindowEvent::Resized(size) => {
                self.window_size = (size.width, size.height);
            }
            _ => {}
        }
    }

    fn apply_key(&mut self, key: KeyCode, state: ElementState, repeat: bool) {
        match state {
            ElementState::Pressed => {
                // Auto-repeat counts as another press so holding Up keeps stepping.
                if self.keys_held.insert(key) || repeat {
                    self.keys_pressed.insert(key);
                }
            }
            ElementState::Released => { self.keys_held.remove(&key); }
        }
    }

    /// Call once per frame after input has been consumed.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn was_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Apply this frame's depth shortcuts.
    ///   Up / Down    → 3D depth
    ///   Right / Left → 2D depth
    /// Returns true if either depth changed.
    pub fn apply_depth_keys(&self, depths: &mut DepthSettings) -> bool {
        let mut changed = false;
        if self.was_pressed(KeyCode::ArrowUp)    { changed |= depths.step_3d(1); }
        if self.was_pressed(KeyCode::ArrowDown)  { changed |= depths.step_3d(-1); }
        if self.was_pressed(KeyCode::ArrowRight) { changed |= depths.step_2d(1); }
        if self.was_pressed(KeyCode::ArrowLeft)  { changed |= depths.step_2d(-1); }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_depth_accepts_non_negative_integers() {
        assert_eq!(parse_depth("0"), Ok(0));
        assert_eq!(parse_depth(" 5\n"), Ok(5));
    }

    #[test]
    fn parse_depth_rejects_bad_text() {
        assert_eq!(
            parse_depth(""),
            Err(GasketError::UnparsableDepth { input: String::new() })
        );
        assert!(matches!(parse_depth("2.5"), Err(GasketError::UnparsableDepth { .. })));
        assert!(matches!(parse_depth("four"), Err(GasketError::UnparsableDepth { .. })));
        assert_eq!(parse_depth("-2"), Err(GasketError::InvalidDepth { depth: -2 }));
    }

    #[test]
    fn depth_settings_clamp_to_max() {
        let mut depths = DepthSettings::new(12, 3, 6);
        assert_eq!(depths.depth_2d(), 6);
        assert!(depths.set_3d(9));
        assert_eq!(depths.depth_3d(), 6);
        assert!(!depths.set_3d(7));

        let mut unbounded = DepthSettings::new(0, 0, u32::MAX);
        assert_eq!(unbounded.max_depth(), MAX_DEPTH);
        unbounded.set_2d(29);
        assert_eq!(unbounded.depth_2d(), MAX_DEPTH);
    }

    #[test]
    fn depth_steps_saturate_at_zero() {
        let mut depths = DepthSettings::new(0, 1, 4);
        assert!(!depths.step_2d(-1));
        assert!(depths.step_3d(-1));
        assert!(!depths.step_3d(-1));
        assert_eq!(depths.depth_3d(), 0);
    }

    #[test]
    fn arrow_keys_step_depths_once_per_press() {
        let mut input = InputState::new();
        let mut depths = DepthSettings::new(2, 2, 8);

        input.apply_key(KeyCode::ArrowUp, ElementState::Pressed, false);
        input.apply_key(KeyCode::ArrowLeft, ElementState::Pressed, false);
        assert!(input.apply_depth_keys(&mut depths));
        assert_eq!((depths.depth_2d(), depths.depth_3d()), (1, 3));

        // Still held, but not newly pressed.
        input.end_frame();
        assert!(input.is_key_held(KeyCode::ArrowUp));
        assert!(!input.apply_depth_keys(&mut depths));

        input.apply_key(KeyCode::ArrowUp, ElementState::Pressed, true);
        assert!(input.apply_depth_keys(&mut depths));
        assert_eq!(depths.depth_3d(), 4);
    }
}
