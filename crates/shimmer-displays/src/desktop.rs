use std::f32::consts::FRAC_PI_2;
use std::sync::Mutex;

use glam::{EulerRot, Quat};
use tracing::debug;

use shimmer_core::{
    next_display_id, DepthRange, DisplayCapabilities, DisplayError, DisplayId, DisplayResult, Eye,
    EyeParameters, FieldOfView, FrameData, Pose, VrDisplay,
};

const EYE_SEPARATION: f32 = 0.060;

struct DesktopState {
    yaw: f32,
    pitch: f32,
    presenting: bool,
}

/// Mouse/keyboard-driven emulated display for non-handheld hosts. The host
/// feeds relative look deltas; orientation is pure yaw/pitch with the pitch
/// clamped to straight up/down.
pub struct DesktopDisplay {
    id: DisplayId,
    state: Mutex<DesktopState>,
}

impl DesktopDisplay {
    pub fn new() -> Self {
        Self {
            id: next_display_id(),
            state: Mutex::new(DesktopState {
                yaw: 0.0,
                pitch: 0.0,
                presenting: false,
            }),
        }
    }

    /// Apply a relative look delta in radians.
    pub fn look(&self, delta_yaw: f32, delta_pitch: f32) {
        let mut state = self.lock_state();
        state.yaw += delta_yaw;
        state.pitch = (state.pitch + delta_pitch).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    pub fn yaw_pitch(&self) -> (f32, f32) {
        let state = self.lock_state();
        (state.yaw, state.pitch)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, DesktopState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn orientation(&self) -> Pose {
        let state = self.lock_state();
        let rotation = Quat::from_euler(EulerRot::YXZ, state.yaw, state.pitch, 0.0);
        Pose {
            position: [0.0; 3],
            orientation: rotation.to_array(),
        }
    }

    fn eye(&self, eye: Eye) -> EyeParameters {
        let sign = match eye {
            Eye::Left => -1.0,
            Eye::Right => 1.0,
        };
        EyeParameters {
            offset: [sign * EYE_SEPARATION / 2.0, 0.0, 0.0],
            fov: FieldOfView::default(),
            render_width: 960,
            render_height: 1080,
        }
    }
}

impl Default for DesktopDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl VrDisplay for DesktopDisplay {
    fn display_id(&self) -> DisplayId {
        self.id
    }

    fn display_name(&self) -> String {
        "Mouse Keyboard VR Display (shimmer)".to_string()
    }

    fn capabilities(&self) -> DisplayCapabilities {
        DisplayCapabilities {
            has_orientation: true,
            has_position: false,
            has_external_display: false,
            can_present: true,
            max_layers: 1,
        }
    }

    fn eye_parameters(&self, eye: Eye) -> EyeParameters {
        self.eye(eye)
    }

    fn pose(&self) -> Pose {
        self.orientation()
    }

    fn frame_data(&self) -> Option<FrameData> {
        let pose = self.orientation();
        Some(FrameData::from_pose(
            &pose,
            DepthRange::default(),
            &self.eye(Eye::Left),
            &self.eye(Eye::Right),
            shimmer_common::now_us(),
        ))
    }

    fn depth_range(&self) -> Option<DepthRange> {
        Some(DepthRange::default())
    }

    fn is_presenting(&self) -> bool {
        self.lock_state().presenting
    }

    fn request_present(&self) -> DisplayResult<()> {
        let mut state = self.lock_state();
        if state.presenting {
            return Err(DisplayError::Presentation(
                "display is already presenting".into(),
            ));
        }
        state.presenting = true;
        Ok(())
    }

    fn exit_present(&self) -> DisplayResult<()> {
        self.lock_state().presenting = false;
        Ok(())
    }

    fn notify_connected(&self) {
        debug!("desktop emulated display {} connected", self.id);
    }
}
