//! Stand-in displays, factories and deprecated devices shared by the unit
//! tests in this crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use shimmer_core::{
    next_display_id, DepthRange, DisplayCapabilities, DisplayError, DisplayFactory, DisplayHandle,
    DisplayId, DisplayResult, Eye, EyeParameters, FrameData, HmdDevice, Pose,
    PositionSensorDevice, SensorState, VrDisplay,
};

pub(crate) struct TestDisplay {
    id: DisplayId,
    name: String,
    complete: bool,
    pose: Pose,
    connects: AtomicUsize,
}

impl TestDisplay {
    /// Display carrying the full current surface.
    pub fn complete(name: &str) -> Arc<Self> {
        Self::build(name, true, Pose::default())
    }

    /// Display missing `frame_data` and `depth_range`, like an older native
    /// surface.
    pub fn partial(name: &str) -> Arc<Self> {
        Self::build(name, false, Pose::default())
    }

    pub fn partial_with_pose(name: &str, pose: Pose) -> Arc<Self> {
        Self::build(name, false, pose)
    }

    fn build(name: &str, complete: bool, pose: Pose) -> Arc<Self> {
        Arc::new(Self {
            id: next_display_id(),
            name: name.to_string(),
            complete,
            pose,
            connects: AtomicUsize::new(0),
        })
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn as_handle(self: &Arc<Self>) -> DisplayHandle {
        self.clone()
    }
}

impl VrDisplay for TestDisplay {
    fn display_id(&self) -> DisplayId {
        self.id
    }

    fn display_name(&self) -> String {
        self.name.clone()
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

    fn eye_parameters(&self, _eye: Eye) -> EyeParameters {
        EyeParameters::default()
    }

    fn pose(&self) -> Pose {
        self.pose
    }

    fn frame_data(&self) -> Option<FrameData> {
        if self.complete {
            let eye = EyeParameters::default();
            Some(FrameData::from_pose(
                &self.pose,
                DepthRange::default(),
                &eye,
                &eye,
                0,
            ))
        } else {
            None
        }
    }

    fn depth_range(&self) -> Option<DepthRange> {
        if self.complete {
            Some(DepthRange::default())
        } else {
            None
        }
    }

    fn is_presenting(&self) -> bool {
        false
    }

    fn request_present(&self) -> DisplayResult<()> {
        Ok(())
    }

    fn exit_present(&self) -> DisplayResult<()> {
        Ok(())
    }

    fn notify_connected(&self) {
        self.connects.fetch_add(1, Ordering::SeqCst);
    }
}

/// Factory that hands out pre-built displays and counts how often each
/// constructor runs. A `None` slot simulates a construction failure.
pub(crate) struct CountingFactory {
    handheld: Option<Arc<TestDisplay>>,
    desktop: Option<Arc<TestDisplay>>,
    auxiliary: Vec<DisplayHandle>,
    pub handheld_calls: AtomicUsize,
    pub desktop_calls: AtomicUsize,
}

impl CountingFactory {
    pub fn new() -> Self {
        Self::with_displays(
            Some(TestDisplay::complete("Emulated Handheld")),
            Some(TestDisplay::complete("Emulated Desktop")),
        )
    }

    pub fn with_displays(
        handheld: Option<Arc<TestDisplay>>,
        desktop: Option<Arc<TestDisplay>>,
    ) -> Self {
        Self {
            handheld,
            desktop,
            auxiliary: Vec::new(),
            handheld_calls: AtomicUsize::new(0),
            desktop_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_auxiliary(mut self, auxiliary: Vec<DisplayHandle>) -> Self {
        self.auxiliary = auxiliary;
        self
    }
}

impl DisplayFactory for CountingFactory {
    fn handheld_display(&self) -> DisplayResult<DisplayHandle> {
        self.handheld_calls.fetch_add(1, Ordering::SeqCst);
        match &self.handheld {
            Some(display) => Ok(display.as_handle()),
            None => Err(DisplayError::Unavailable(
                "handheld display construction failed".into(),
            )),
        }
    }

    fn desktop_display(&self) -> DisplayResult<DisplayHandle> {
        self.desktop_calls.fetch_add(1, Ordering::SeqCst);
        match &self.desktop {
            Some(display) => Ok(display.as_handle()),
            None => Err(DisplayError::Unavailable(
                "desktop display construction failed".into(),
            )),
        }
    }

    fn auxiliary_displays(&self) -> Vec<DisplayHandle> {
        self.auxiliary.clone()
    }
}

pub(crate) struct TestHmd {
    pub unit: u32,
    pub name: String,
}

impl HmdDevice for TestHmd {
    fn unit_id(&self) -> u32 {
        self.unit
    }

    fn device_name(&self) -> String {
        self.name.clone()
    }

    fn eye_parameters(&self, _eye: Eye) -> EyeParameters {
        EyeParameters::default()
    }
}

pub(crate) struct TestSensor {
    pub unit: u32,
    pub pose: Pose,
}

impl PositionSensorDevice for TestSensor {
    fn unit_id(&self) -> u32 {
        self.unit
    }

    fn device_name(&self) -> String {
        format!("Sensor {}", self.unit)
    }

    fn state(&self) -> SensorState {
        SensorState {
            pose: self.pose,
            ..SensorState::default()
        }
    }

    fn reset_sensor(&self) {}
}
