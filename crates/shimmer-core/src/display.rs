use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::{DepthRange, DisplayCapabilities, Eye, EyeParameters, FrameData, Pose};
use crate::DisplayResult;

pub type DisplayId = u32;

static NEXT_DISPLAY_ID: AtomicU32 = AtomicU32::new(1);

/// Allocate a process-unique display id. Ids start at 1 so 0 can be treated
/// as "no display" by callers that need a sentinel.
pub fn next_display_id() -> DisplayId {
    NEXT_DISPLAY_ID.fetch_add(1, Ordering::Relaxed)
}

/// A discoverable VR display: identity, per-eye parameters, pose queries and
/// presentation control.
///
/// `frame_data` and `depth_range` return `None` on surfaces that predate
/// those members; the engine's conforming wrapper fills them in. Everything
/// else is mandatory on every generation.
pub trait VrDisplay: Send + Sync {
    fn display_id(&self) -> DisplayId;
    fn display_name(&self) -> String;
    fn capabilities(&self) -> DisplayCapabilities;
    fn eye_parameters(&self, eye: Eye) -> EyeParameters;
    fn pose(&self) -> Pose;

    /// Rich per-frame snapshot. `None` when this surface does not carry the
    /// member at all, as opposed to carrying it and failing.
    fn frame_data(&self) -> Option<FrameData>;

    /// Configured near/far planes, `None` when the surface predates them.
    fn depth_range(&self) -> Option<DepthRange>;

    fn is_presenting(&self) -> bool;
    fn request_present(&self) -> DisplayResult<()>;
    fn exit_present(&self) -> DisplayResult<()>;

    /// Invoked exactly once per process by the registry when an emulated
    /// display is first constructed. Native displays never see this call.
    fn notify_connected(&self) {}
}

/// Shared display handle. Pointer identity is handle identity: the same
/// device is always represented by the same `Arc`.
pub type DisplayHandle = Arc<dyn VrDisplay>;

/// Serializable summary of one display, for diagnostics and CLI output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub display_id: DisplayId,
    pub display_name: String,
    pub capabilities: DisplayCapabilities,
    pub is_presenting: bool,
}

impl From<&DisplayHandle> for DisplayInfo {
    fn from(display: &DisplayHandle) -> Self {
        Self {
            display_id: display.display_id(),
            display_name: display.display_name(),
            capabilities: display.capabilities(),
            is_presenting: display.is_presenting(),
        }
    }
}
