use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Eye {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: [f32; 3],
    pub orientation: [f32; 4],
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            // Identity quaternion, not the zero quaternion.
            orientation: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseVelocity {
    pub linear: [f32; 3],
    pub angular: [f32; 3],
}

/// Near/far projection planes. The defaults are the values patched into
/// surfaces that predate configurable depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthRange {
    pub near: f32,
    pub far: f32,
}

impl Default for DepthRange {
    fn default() -> Self {
        Self {
            near: 0.01,
            far: 10_000.0,
        }
    }
}

/// Per-eye half-angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldOfView {
    pub up_degrees: f32,
    pub down_degrees: f32,
    pub left_degrees: f32,
    pub right_degrees: f32,
}

impl Default for FieldOfView {
    fn default() -> Self {
        Self {
            up_degrees: 45.0,
            down_degrees: 45.0,
            left_degrees: 45.0,
            right_degrees: 45.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeParameters {
    /// Offset from the head center to this eye, in meters.
    pub offset: [f32; 3],
    pub fov: FieldOfView,
    pub render_width: u32,
    pub render_height: u32,
}

impl Default for EyeParameters {
    fn default() -> Self {
        Self {
            offset: [0.0; 3],
            fov: FieldOfView::default(),
            render_width: 960,
            render_height: 1080,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayCapabilities {
    pub has_orientation: bool,
    pub has_position: bool,
    pub has_external_display: bool,
    pub can_present: bool,
    pub max_layers: u32,
}

/// Rich per-frame snapshot: pose plus per-eye view and projection matrices,
/// all column-major.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameData {
    pub timestamp_us: u64,
    pub pose: Pose,
    pub left_projection_matrix: [f32; 16],
    pub left_view_matrix: [f32; 16],
    pub right_projection_matrix: [f32; 16],
    pub right_view_matrix: [f32; 16],
}

impl FrameData {
    /// Derive the rich frame value from a lower-level pose query. This is the
    /// derivation used to bring surfaces that only expose `pose()` up to the
    /// current contract.
    pub fn from_pose(
        pose: &Pose,
        depth: DepthRange,
        left: &EyeParameters,
        right: &EyeParameters,
        timestamp_us: u64,
    ) -> Self {
        let head = Mat4::from_rotation_translation(
            Quat::from_array(pose.orientation),
            Vec3::from_array(pose.position),
        );
        let left_view = (head * Mat4::from_translation(Vec3::from_array(left.offset))).inverse();
        let right_view = (head * Mat4::from_translation(Vec3::from_array(right.offset))).inverse();

        Self {
            timestamp_us,
            pose: *pose,
            left_projection_matrix: projection_from_fov(&left.fov, depth).to_cols_array(),
            left_view_matrix: left_view.to_cols_array(),
            right_projection_matrix: projection_from_fov(&right.fov, depth).to_cols_array(),
            right_view_matrix: right_view.to_cols_array(),
        }
    }
}

/// Off-axis projection from per-edge half-angles, matching the classic
/// perspective-from-field-of-view construction.
fn projection_from_fov(fov: &FieldOfView, depth: DepthRange) -> Mat4 {
    let up = fov.up_degrees.to_radians().tan();
    let down = fov.down_degrees.to_radians().tan();
    let left = fov.left_degrees.to_radians().tan();
    let right = fov.right_degrees.to_radians().tan();

    let x_scale = 2.0 / (left + right);
    let y_scale = 2.0 / (up + down);
    let DepthRange { near, far } = depth;

    Mat4::from_cols_array(&[
        x_scale,
        0.0,
        0.0,
        0.0,
        0.0,
        y_scale,
        0.0,
        0.0,
        -((left - right) * x_scale * 0.5),
        (up - down) * y_scale * 0.5,
        far / (near - far),
        -1.0,
        0.0,
        0.0,
        (far * near) / (near - far),
        0.0,
    ])
}
