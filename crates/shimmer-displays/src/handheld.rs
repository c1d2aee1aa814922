use std::sync::Mutex;

use tracing::debug;

use shimmer_core::{
    next_display_id, DepthRange, DisplayCapabilities, DisplayError, DisplayId, DisplayResult, Eye,
    EyeParameters, FieldOfView, FrameData, Pose, VrDisplay,
};

const EYE_SEPARATION: f32 = 0.064;

struct HandheldState {
    pose: Pose,
    presenting: bool,
}

/// Camera/gyroscope-class emulated display for handheld hosts. Carries the
/// full current surface; pose updates are pushed in by the host, this
/// display does no sensor fusion of its own.
pub struct HandheldDisplay {
    id: DisplayId,
    state: Mutex<HandheldState>,
}

impl HandheldDisplay {
    pub fn new() -> Self {
        Self {
            id: next_display_id(),
            state: Mutex::new(HandheldState {
                pose: Pose::default(),
                presenting: false,
            }),
        }
    }

    /// Host-side sensor feed.
    pub fn update_pose(&self, pose: Pose) {
        self.lock_state().pose = pose;
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, HandheldState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn eye(&self, eye: Eye) -> EyeParameters {
        let sign = match eye {
            Eye::Left => -1.0,
            Eye::Right => 1.0,
        };
        EyeParameters {
            offset: [sign * EYE_SEPARATION / 2.0, 0.0, 0.0],
            fov: FieldOfView {
                up_degrees: 40.0,
                down_degrees: 40.0,
                left_degrees: 40.0,
                right_degrees: 40.0,
            },
            render_width: 960,
            render_height: 1080,
        }
    }
}

impl Default for HandheldDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl VrDisplay for HandheldDisplay {
    fn display_id(&self) -> DisplayId {
        self.id
    }

    fn display_name(&self) -> String {
        "Handheld VR Display (shimmer)".to_string()
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
        self.lock_state().pose
    }

    fn frame_data(&self) -> Option<FrameData> {
        let pose = self.lock_state().pose;
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
        debug!("handheld emulated display {} connected", self.id);
    }
}
