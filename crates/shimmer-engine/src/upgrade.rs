//! Capability surface builder: takes a display implementing an older
//! generation of the contract and returns one satisfying the current shape,
//! synthesizing only the members that are absent.

use std::sync::{Arc, Mutex};

use shimmer_core::{
    DepthRange, DisplayCapabilities, DisplayHandle, DisplayId, DisplayResult, Eye, EyeParameters,
    FrameData, Pose, VrDisplay,
};

/// Bring one display up to the current contract shape. A surface that
/// already carries every member is returned unchanged, so applying this to
/// its own output yields the same handle.
pub fn conform(display: DisplayHandle) -> DisplayHandle {
    if display.frame_data().is_some() && display.depth_range().is_some() {
        return display;
    }
    Arc::new(ConformedDisplay { inner: display })
}

/// Delegating surface that re-checks member presence on every call and
/// fills in only what the underlying display lacks: frame data derived from
/// the pose query, and the fixed default depth range.
struct ConformedDisplay {
    inner: DisplayHandle,
}

impl VrDisplay for ConformedDisplay {
    fn display_id(&self) -> DisplayId {
        self.inner.display_id()
    }

    fn display_name(&self) -> String {
        self.inner.display_name()
    }

    fn capabilities(&self) -> DisplayCapabilities {
        self.inner.capabilities()
    }

    fn eye_parameters(&self, eye: Eye) -> EyeParameters {
        self.inner.eye_parameters(eye)
    }

    fn pose(&self) -> Pose {
        self.inner.pose()
    }

    fn frame_data(&self) -> Option<FrameData> {
        if let Some(frame) = self.inner.frame_data() {
            return Some(frame);
        }
        let depth = self.inner.depth_range().unwrap_or_default();
        let left = self.inner.eye_parameters(Eye::Left);
        let right = self.inner.eye_parameters(Eye::Right);
        Some(FrameData::from_pose(
            &self.inner.pose(),
            depth,
            &left,
            &right,
            shimmer_common::now_us(),
        ))
    }

    fn depth_range(&self) -> Option<DepthRange> {
        Some(self.inner.depth_range().unwrap_or_default())
    }

    fn is_presenting(&self) -> bool {
        self.inner.is_presenting()
    }

    fn request_present(&self) -> DisplayResult<()> {
        self.inner.request_present()
    }

    fn exit_present(&self) -> DisplayResult<()> {
        self.inner.exit_present()
    }

    fn notify_connected(&self) {
        self.inner.notify_connected();
    }
}

/// Conforms each underlying handle at most once per engine lifetime, so the
/// same native display keeps the same conformed identity across repeated
/// discovery calls.
pub struct ConformCache {
    entries: Mutex<Vec<(DisplayHandle, DisplayHandle)>>,
}

impl ConformCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn conform(&self, display: DisplayHandle) -> DisplayHandle {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some((_, conformed)) = entries
            .iter()
            .find(|(inner, _)| Arc::ptr_eq(inner, &display))
        {
            return conformed.clone();
        }
        let conformed = conform(display.clone());
        entries.push((display, conformed.clone()));
        conformed
    }
}

impl Default for ConformCache {
    fn default() -> Self {
        Self::new()
    }
}
