//! Reference emulated displays consumed by the Shimmer engine through the
//! factory interface: a camera/gyroscope-class handheld display and a
//! mouse/keyboard-driven desktop display.
//!
//! Deliberately thin: no sensor fusion, no rendering, no distortion. Pose
//! state is pushed in by the host.

#![forbid(unsafe_code)]

pub mod desktop;
pub mod handheld;

pub use desktop::DesktopDisplay;
pub use handheld::HandheldDisplay;

use std::sync::Arc;

use shimmer_core::{DisplayFactory, DisplayHandle, DisplayResult};

/// Default display factory. Construction never fails; the `DisplayResult`
/// return is part of the factory contract.
pub struct EmulatedDisplays;

impl DisplayFactory for EmulatedDisplays {
    fn handheld_display(&self) -> DisplayResult<DisplayHandle> {
        Ok(Arc::new(HandheldDisplay::new()))
    }

    fn desktop_display(&self) -> DisplayResult<DisplayHandle> {
        Ok(Arc::new(DesktopDisplay::new()))
    }
}
