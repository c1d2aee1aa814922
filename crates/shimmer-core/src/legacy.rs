//! The deprecated device contract: one physical unit split into an identity
//! ("HMD") facet and a position-sensor facet, tied together by `unit_id`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::display::DisplayHandle;
use crate::types::{Eye, EyeParameters, Pose, PoseVelocity};

/// Reading shape of the deprecated position-sensor contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    pub pose: Pose,
    pub velocity: PoseVelocity,
    pub timestamp_us: u64,
}

/// Identity facet of a deprecated device.
pub trait HmdDevice: Send + Sync {
    /// Hardware-unit number shared with the sensor facet of the same unit.
    fn unit_id(&self) -> u32;
    fn device_name(&self) -> String;
    fn eye_parameters(&self, eye: Eye) -> EyeParameters;
}

/// Sensor facet of a deprecated device.
pub trait PositionSensorDevice: Send + Sync {
    fn unit_id(&self) -> u32;
    fn device_name(&self) -> String;
    fn state(&self) -> SensorState;
    fn reset_sensor(&self);
}

/// Element type of the deprecated enumeration.
#[derive(Clone)]
pub enum LegacyDevice {
    Hmd(Arc<dyn HmdDevice>),
    PositionSensor(Arc<dyn PositionSensorDevice>),
}

impl LegacyDevice {
    pub fn unit_id(&self) -> u32 {
        match self {
            LegacyDevice::Hmd(hmd) => hmd.unit_id(),
            LegacyDevice::PositionSensor(sensor) => sensor.unit_id(),
        }
    }

    pub fn device_name(&self) -> String {
        match self {
            LegacyDevice::Hmd(hmd) => hmd.device_name(),
            LegacyDevice::PositionSensor(sensor) => sensor.device_name(),
        }
    }
}

impl std::fmt::Debug for LegacyDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            LegacyDevice::Hmd(_) => "Hmd",
            LegacyDevice::PositionSensor(_) => "PositionSensor",
        };
        f.debug_struct("LegacyDevice")
            .field("kind", &kind)
            .field("unit_id", &self.unit_id())
            .field("device_name", &self.device_name())
            .finish()
    }
}

fn now_us() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// Re-exposes one display under the deprecated identity facet. Disposable:
/// built per enumeration call, identity derives from the wrapped handle.
pub struct DisplayHmdDevice {
    display: DisplayHandle,
}

impl DisplayHmdDevice {
    pub fn new(display: DisplayHandle) -> Self {
        Self { display }
    }

    pub fn display(&self) -> &DisplayHandle {
        &self.display
    }
}

impl HmdDevice for DisplayHmdDevice {
    fn unit_id(&self) -> u32 {
        self.display.display_id()
    }

    fn device_name(&self) -> String {
        format!("{} (HMD)", self.display.display_name())
    }

    fn eye_parameters(&self, eye: Eye) -> EyeParameters {
        self.display.eye_parameters(eye)
    }
}

/// Re-exposes the same display under the deprecated sensor facet.
pub struct DisplaySensorDevice {
    display: DisplayHandle,
}

impl DisplaySensorDevice {
    pub fn new(display: DisplayHandle) -> Self {
        Self { display }
    }

    pub fn display(&self) -> &DisplayHandle {
        &self.display
    }
}

impl PositionSensorDevice for DisplaySensorDevice {
    fn unit_id(&self) -> u32 {
        self.display.display_id()
    }

    fn device_name(&self) -> String {
        format!("{} (Sensor)", self.display.display_name())
    }

    fn state(&self) -> SensorState {
        let timestamp_us = self
            .display
            .frame_data()
            .map(|frame| frame.timestamp_us)
            .unwrap_or_else(now_us);
        SensorState {
            pose: self.display.pose(),
            velocity: PoseVelocity::default(),
            timestamp_us,
        }
    }

    fn reset_sensor(&self) {
        // Recentering is owned by the display implementation; the facet has
        // no state of its own to reset.
    }
}
