//! Lazy, idempotent registry of the emulated displays.

use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use shimmer_core::{DisplayFactory, DisplayHandle};

use crate::config::EngineConfig;

/// Which emulated displays a population round may construct. Derived once
/// per engine from the host form factor and the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationPolicy {
    pub include_handheld: bool,
    pub include_desktop: bool,
}

impl PopulationPolicy {
    /// Fixed inclusion rules: the camera/gyroscope-class display on handheld
    /// hosts (or under the force-enable override), the mouse/keyboard-driven
    /// display on non-handheld hosts unless that emulation is disabled.
    pub fn derive(is_handheld: bool, config: &EngineConfig) -> Self {
        Self {
            include_handheld: is_handheld || config.force_enable_vr,
            include_desktop: !is_handheld && !config.mouse_keyboard_controls_disabled,
        }
    }
}

/// Builds the emulated display sequence at most once and replays it to every
/// later caller. Population also pushes each display into the shared
/// connected-displays list and fires its connect notification, so those side
/// effects happen exactly once per display.
pub struct EmulatedRegistry {
    factory: Arc<dyn DisplayFactory>,
    displays: OnceCell<Vec<DisplayHandle>>,
    connected: Arc<Mutex<Vec<DisplayHandle>>>,
}

impl EmulatedRegistry {
    pub fn new(
        factory: Arc<dyn DisplayFactory>,
        connected: Arc<Mutex<Vec<DisplayHandle>>>,
    ) -> Self {
        Self {
            factory,
            displays: OnceCell::new(),
            connected,
        }
    }

    pub fn populated(&self) -> bool {
        self.displays.initialized()
    }

    /// Concurrent first callers all await the single construction; every
    /// later call returns the already-built sequence untouched.
    pub async fn ensure_populated(&self, policy: &PopulationPolicy) -> &[DisplayHandle] {
        self.displays
            .get_or_init(|| async { self.populate(policy) })
            .await
            .as_slice()
    }

    fn populate(&self, policy: &PopulationPolicy) -> Vec<DisplayHandle> {
        let mut sequence = Vec::new();

        if policy.include_handheld {
            match self.factory.handheld_display() {
                Ok(display) => self.register(display, &mut sequence),
                Err(err) => warn!("omitting emulated handheld display: {}", err),
            }
        }
        if policy.include_desktop {
            match self.factory.desktop_display() {
                Ok(display) => self.register(display, &mut sequence),
                Err(err) => warn!("omitting emulated desktop display: {}", err),
            }
        }
        for display in self.factory.auxiliary_displays() {
            self.register(display, &mut sequence);
        }

        debug!("emulated display registry populated: {} display(s)", sequence.len());
        sequence
    }

    /// Connect notification and the connected-displays side list come before
    /// the registry's own sequence, so a connect observer already sees the
    /// display as externally connected.
    fn register(&self, display: DisplayHandle, sequence: &mut Vec<DisplayHandle>) {
        display.notify_connected();
        let mut connected = match self.connected.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        connected.push(display.clone());
        drop(connected);
        sequence.push(display);
    }
}
