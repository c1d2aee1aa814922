//! Compatibility adapter between the unified display contract and the
//! deprecated split-device contract, in both directions: wrapping displays
//! for deprecated callers, and adopting deprecated native devices into
//! display surfaces.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use shimmer_core::{
    next_display_id, DepthRange, DisplayCapabilities, DisplayError, DisplayHandle, DisplayHmdDevice,
    DisplayId, DisplayResult, DisplaySensorDevice, Eye, EyeParameters, FrameData, HmdDevice,
    LegacyDevice, LegacyRuntime, Pose, PositionSensorDevice, VrDisplay,
};

use crate::race::SettleCell;

/// Build the deprecated view of a display list: one identity facet and one
/// sensor facet per display, in that order, both referencing the same
/// handle. Wrappers are disposable and rebuilt per enumeration call.
pub fn wrap_displays(displays: &[DisplayHandle]) -> Vec<LegacyDevice> {
    let mut devices = Vec::with_capacity(displays.len() * 2);
    for display in displays {
        devices.push(LegacyDevice::Hmd(Arc::new(DisplayHmdDevice::new(
            display.clone(),
        ))));
        devices.push(LegacyDevice::PositionSensor(Arc::new(
            DisplaySensorDevice::new(display.clone()),
        )));
    }
    devices
}

/// Bridge the callback-form native enumeration to async. The host is
/// supposed to invoke at most one callback at most once; a host that fires
/// both anyway loses the second write.
pub async fn collect_legacy(runtime: &dyn LegacyRuntime) -> DisplayResult<Vec<LegacyDevice>> {
    let cell = Arc::new(SettleCell::new());
    let done_cell = cell.clone();
    let fail_cell = cell.clone();

    runtime.devices(
        Box::new(move |devices| {
            done_cell.settle(Ok(devices));
        }),
        Box::new(move |err| {
            fail_cell.settle(Err(err));
        }),
    );

    cell.wait().await
}

/// Pair deprecated native devices into display surfaces by hardware unit.
/// A unit with only a sensor facet is dropped; a unit with only an identity
/// facet keeps a static pose. The produced surfaces are partial (no
/// frame-data or depth members) and rely on the conforming step downstream.
///
/// Every call builds fresh surfaces; discovery goes through
/// [`AdoptionCache`] instead so repeat enumeration keeps handle identity.
pub fn adopt_legacy_devices(devices: Vec<LegacyDevice>) -> Vec<DisplayHandle> {
    group_units(devices)
        .into_iter()
        .map(UnitFacets::into_display)
        .collect()
}

/// The facets of one hardware unit, paired and ready for adoption.
struct UnitFacets {
    id: u32,
    hmd: Arc<dyn HmdDevice>,
    sensor: Option<Arc<dyn PositionSensorDevice>>,
}

impl UnitFacets {
    fn into_display(self) -> DisplayHandle {
        Arc::new(AdoptedDisplay::new(self.hmd, self.sensor))
    }
}

fn group_units(devices: Vec<LegacyDevice>) -> Vec<UnitFacets> {
    let mut unit_order: Vec<u32> = Vec::new();
    let mut hmds: HashMap<u32, Arc<dyn HmdDevice>> = HashMap::new();
    let mut sensors: HashMap<u32, Arc<dyn PositionSensorDevice>> = HashMap::new();

    for device in devices {
        let unit = device.unit_id();
        if !unit_order.contains(&unit) {
            unit_order.push(unit);
        }
        match device {
            LegacyDevice::Hmd(hmd) => {
                hmds.entry(unit).or_insert(hmd);
            }
            LegacyDevice::PositionSensor(sensor) => {
                sensors.entry(unit).or_insert(sensor);
            }
        }
    }

    let mut units = Vec::new();
    for unit in unit_order {
        let Some(hmd) = hmds.remove(&unit) else {
            debug!("dropping position sensor without identity facet: unit {}", unit);
            continue;
        };
        units.push(UnitFacets {
            id: unit,
            hmd,
            sensor: sensors.remove(&unit),
        });
    }
    units
}

/// Adopts each hardware unit at most once per engine lifetime, so the same
/// underlying deprecated device keeps the same display handle and id across
/// repeated discovery calls, even when the host hands back freshly
/// allocated facets on every enumeration.
pub struct AdoptionCache {
    entries: Mutex<Vec<(u32, DisplayHandle)>>,
}

impl AdoptionCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Adopt a device enumeration, replaying the existing surface for any
    /// unit seen before and building one for any unit that is new.
    pub fn adopt(&self, devices: Vec<LegacyDevice>) -> Vec<DisplayHandle> {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut displays = Vec::new();
        for unit in group_units(devices) {
            if let Some((_, display)) = entries.iter().find(|(id, _)| *id == unit.id) {
                displays.push(display.clone());
                continue;
            }
            let id = unit.id;
            let display = unit.into_display();
            entries.push((id, display.clone()));
            displays.push(display);
        }
        displays
    }
}

impl Default for AdoptionCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Display surface reconstructed from deprecated facets. Presentation is
/// not part of the deprecated contract, so the surface reports itself as
/// non-presentable.
struct AdoptedDisplay {
    id: DisplayId,
    hmd: Arc<dyn HmdDevice>,
    sensor: Option<Arc<dyn PositionSensorDevice>>,
}

impl AdoptedDisplay {
    fn new(hmd: Arc<dyn HmdDevice>, sensor: Option<Arc<dyn PositionSensorDevice>>) -> Self {
        Self {
            id: next_display_id(),
            hmd,
            sensor,
        }
    }
}

impl VrDisplay for AdoptedDisplay {
    fn display_id(&self) -> DisplayId {
        self.id
    }

    fn display_name(&self) -> String {
        self.hmd.device_name()
    }

    fn capabilities(&self) -> DisplayCapabilities {
        DisplayCapabilities {
            has_orientation: self.sensor.is_some(),
            has_position: false,
            has_external_display: false,
            can_present: false,
            max_layers: 0,
        }
    }

    fn eye_parameters(&self, eye: Eye) -> EyeParameters {
        self.hmd.eye_parameters(eye)
    }

    fn pose(&self) -> Pose {
        match &self.sensor {
            Some(sensor) => sensor.state().pose,
            None => Pose::default(),
        }
    }

    fn frame_data(&self) -> Option<FrameData> {
        None
    }

    fn depth_range(&self) -> Option<DepthRange> {
        None
    }

    fn is_presenting(&self) -> bool {
        false
    }

    fn request_present(&self) -> DisplayResult<()> {
        Err(DisplayError::Presentation(
            "adopted deprecated device cannot present".into(),
        ))
    }

    fn exit_present(&self) -> DisplayResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestDisplay, TestHmd, TestSensor};
    use shimmer_core::{LegacyCallback, LegacyErrback};

    #[test]
    fn wrapping_yields_facet_pairs_in_order() {
        let a = TestDisplay::complete("A");
        let b = TestDisplay::complete("B");
        let displays = vec![a.as_handle(), b.as_handle()];

        let devices = wrap_displays(&displays);
        assert_eq!(devices.len(), 4);

        assert!(matches!(devices[0], LegacyDevice::Hmd(_)));
        assert!(matches!(devices[1], LegacyDevice::PositionSensor(_)));
        assert_eq!(devices[0].unit_id(), devices[1].unit_id());
        assert_eq!(devices[0].unit_id(), a.display_id());
        assert_eq!(devices[2].unit_id(), b.display_id());
    }

    struct ImmediateRuntime {
        devices: std::sync::Mutex<Option<Vec<LegacyDevice>>>,
    }

    impl LegacyRuntime for ImmediateRuntime {
        fn devices(&self, done: LegacyCallback, _fail: LegacyErrback) {
            if let Some(devices) = self.devices.lock().unwrap().take() {
                done(devices);
            }
        }
    }

    struct FailingRuntime;

    impl LegacyRuntime for FailingRuntime {
        fn devices(&self, _done: LegacyCallback, fail: LegacyErrback) {
            fail(DisplayError::NativeRejection("device service down".into()));
        }
    }

    struct DoubleFiringRuntime;

    impl LegacyRuntime for DoubleFiringRuntime {
        fn devices(&self, done: LegacyCallback, fail: LegacyErrback) {
            done(vec![LegacyDevice::Hmd(Arc::new(TestHmd {
                unit: 9,
                name: "Unit 9".into(),
            }))]);
            fail(DisplayError::NativeRejection("should be ignored".into()));
        }
    }

    #[tokio::test]
    async fn collect_settles_on_done() {
        let runtime = ImmediateRuntime {
            devices: std::sync::Mutex::new(Some(vec![LegacyDevice::Hmd(Arc::new(TestHmd {
                unit: 3,
                name: "Unit 3".into(),
            }))])),
        };
        let devices = collect_legacy(&runtime).await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].unit_id(), 3);
    }

    #[tokio::test]
    async fn collect_settles_on_fail() {
        let err = collect_legacy(&FailingRuntime).await.unwrap_err();
        assert!(matches!(err, DisplayError::NativeRejection(_)));
    }

    #[tokio::test]
    async fn first_callback_wins_when_host_misbehaves() {
        let devices = collect_legacy(&DoubleFiringRuntime).await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].unit_id(), 9);
    }

    #[test]
    fn adoption_pairs_facets_by_unit() {
        let pose = Pose {
            position: [0.0, 1.5, -0.2],
            ..Pose::default()
        };
        let devices = vec![
            LegacyDevice::Hmd(Arc::new(TestHmd {
                unit: 1,
                name: "Headset One".into(),
            })),
            LegacyDevice::PositionSensor(Arc::new(TestSensor { unit: 1, pose })),
        ];

        let displays = adopt_legacy_devices(devices);
        assert_eq!(displays.len(), 1);
        assert_eq!(displays[0].display_name(), "Headset One");
        assert_eq!(displays[0].pose(), pose);
        assert!(displays[0].capabilities().has_orientation);
        // Partial surface until conformed.
        assert!(displays[0].frame_data().is_none());
        assert!(displays[0].depth_range().is_none());
    }

    #[test]
    fn adoption_cache_replays_units_across_enumerations() {
        let cache = AdoptionCache::new();

        let first = cache.adopt(vec![
            LegacyDevice::Hmd(Arc::new(TestHmd {
                unit: 2,
                name: "Headset Two".into(),
            })),
            LegacyDevice::PositionSensor(Arc::new(TestSensor {
                unit: 2,
                pose: Pose::default(),
            })),
        ]);
        assert_eq!(first.len(), 1);

        // A later enumeration hands back freshly allocated facets for the
        // same unit; the adopted surface and its id must not change.
        let second = cache.adopt(vec![
            LegacyDevice::Hmd(Arc::new(TestHmd {
                unit: 2,
                name: "Headset Two".into(),
            })),
            LegacyDevice::PositionSensor(Arc::new(TestSensor {
                unit: 2,
                pose: Pose::default(),
            })),
            LegacyDevice::Hmd(Arc::new(TestHmd {
                unit: 5,
                name: "Headset Five".into(),
            })),
        ]);
        assert_eq!(second.len(), 2);
        assert!(Arc::ptr_eq(&first[0], &second[0]));
        assert_eq!(first[0].display_id(), second[0].display_id());
        assert_eq!(second[1].display_name(), "Headset Five");
    }

    #[test]
    fn orphan_sensor_is_dropped_and_orphan_hmd_keeps_static_pose() {
        let devices = vec![
            LegacyDevice::PositionSensor(Arc::new(TestSensor {
                unit: 7,
                pose: Pose::default(),
            })),
            LegacyDevice::Hmd(Arc::new(TestHmd {
                unit: 8,
                name: "Orphan Headset".into(),
            })),
        ];

        let displays = adopt_legacy_devices(devices);
        assert_eq!(displays.len(), 1);
        assert_eq!(displays[0].display_name(), "Orphan Headset");
        assert_eq!(displays[0].pose(), Pose::default());
        assert!(!displays[0].capabilities().has_orientation);
        assert!(displays[0].request_present().is_err());
    }
}
