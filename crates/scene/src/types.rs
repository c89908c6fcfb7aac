//! Scene value types.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use propshot_project_model::settings::LightingMode;

/// Handle to a live scene object. Only meaningful to the host that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

/// Handle to a camera rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(pub(crate) u64);

impl ObjectId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl CameraId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Rotation from editor-style Euler angles in degrees.
///
/// Rotations apply about Z, then X, then Y, matching the usual
/// pitch/yaw/roll convention of scene editors.
pub fn euler_degrees(pitch: f32, yaw: f32, roll: f32) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        yaw.to_radians(),
        pitch.to_radians(),
        roll.to_radians(),
    )
}

/// Position, rotation and scale of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Map a point from local to world space.
    pub fn apply(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * (point * self.scale)
    }
}

/// Axis-aligned bounds in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Zero-size bounds at `point`.
    pub fn at(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Grow to include `point`.
    pub fn encapsulate(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Background a camera clears to before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearColor {
    #[default]
    Transparent,
    White,
}

impl ClearColor {
    pub fn rgba(self) -> [u8; 4] {
        match self {
            Self::Transparent => [0, 0, 0, 0],
            Self::White => [255, 255, 255, 255],
        }
    }
}

/// A three-level orthographic camera rig.
///
/// The rotate pivot spins about the vertical axis, the tilt pivot below it
/// pitches the camera and carries a fixed 45° yaw, and the camera itself sits
/// at `local_position` inside the tilt pivot looking down its local +Z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    /// Yaw of the rotate pivot, degrees.
    pub rotate: f32,
    /// Pitch of the tilt pivot, degrees.
    pub tilt: f32,
    /// Camera position relative to the tilt pivot.
    pub local_position: Vec3,
    /// Orthographic half-extent (vertical).
    pub half_extent: f32,
    pub clear: ClearColor,
}

/// Fixed yaw of the tilt pivot, degrees.
pub const TILT_PIVOT_YAW: f32 = 45.0;

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            rotate: 0.0,
            tilt: 0.0,
            local_position: Vec3::new(0.0, 8.0, -10.0),
            half_extent: 5.0,
            clear: ClearColor::Transparent,
        }
    }
}

impl CameraRig {
    /// World rotation of the camera.
    pub fn world_rotation(&self) -> Quat {
        let rotate = euler_degrees(0.0, self.rotate, 0.0);
        let tilt = euler_degrees(self.tilt, TILT_PIVOT_YAW, 0.0);
        rotate * tilt
    }

    /// World position of the camera. Both pivots sit at the origin.
    pub fn world_position(&self) -> Vec3 {
        self.world_rotation() * self.local_position
    }

    /// Map a world-space point into camera space (+Z forward, +Y up).
    pub fn to_view(&self, point: Vec3) -> Vec3 {
        self.world_rotation().inverse() * (point - self.world_position())
    }
}

/// Scene lighting: a single directional light on a yaw pivot plus a preset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lighting {
    /// Light pivot yaw, degrees.
    pub rotation: f32,
    pub mode: LightingMode,
}

impl Lighting {
    /// Direction the light travels, in world space.
    pub fn direction(&self) -> Vec3 {
        euler_degrees(50.0, self.rotation, 0.0) * Vec3::Z
    }

    /// Per-channel tint applied by the preset.
    pub fn tint(&self) -> Vec3 {
        match self.mode {
            LightingMode::Neutral => Vec3::ONE,
            LightingMode::Warm => Vec3::new(1.0, 0.9, 0.75),
            LightingMode::Cold => Vec3::new(0.8, 0.9, 1.0),
        }
    }
}

/// Physics state of an object that carries a rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub simulated: bool,
    pub detect_collisions: bool,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            simulated: true,
            detect_collisions: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_bounds_encapsulate() {
        let mut bounds = Bounds::at(Vec3::ZERO);
        bounds.encapsulate(Vec3::new(1.0, 2.0, -1.0));
        bounds.encapsulate(Vec3::new(-1.0, 0.0, 1.0));
        assert_eq!(bounds.size(), Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(bounds.center(), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_untilted_rig_looks_across_diagonal() {
        let rig = CameraRig {
            local_position: Vec3::new(0.0, 0.0, -10.0),
            ..CameraRig::default()
        };
        // The tilt pivot's 45° yaw points the camera along (+X, +Z).
        let forward = rig.world_rotation() * Vec3::Z;
        let diag = Vec3::new(1.0, 0.0, 1.0).normalize();
        assert!(approx(forward, diag));
        assert!(approx(rig.to_view(Vec3::ZERO), Vec3::new(0.0, 0.0, 10.0)));
    }

    #[test]
    fn test_tilt_pitches_camera_down() {
        let rig = CameraRig {
            tilt: 30.0,
            local_position: Vec3::new(0.0, 0.0, -10.0),
            ..CameraRig::default()
        };
        let forward = rig.world_rotation() * Vec3::Z;
        assert!(forward.y < -0.4);
        assert!(rig.world_position().y > 0.0);
    }

    #[test]
    fn test_clear_colors() {
        assert_eq!(ClearColor::Transparent.rgba()[3], 0);
        assert_eq!(ClearColor::White.rgba(), [255; 4]);
    }
}
