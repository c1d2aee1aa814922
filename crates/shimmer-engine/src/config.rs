use std::time::Duration;

use shimmer_common::{env_bool, env_u64};

use crate::merge::MergePolicy;

pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_millis(1000);

/// Recognized engine options. All default to off; the discovery timeout
/// defaults to one second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Treat the host as VR-capable even on a non-handheld form factor.
    pub force_enable_vr: bool,
    /// Suppress the mouse/keyboard-driven emulated display.
    pub mouse_keyboard_controls_disabled: bool,
    /// Serve the deprecated device enumeration even without native legacy
    /// support.
    pub enable_deprecated_api: bool,
    /// Append emulated displays behind native ones instead of hiding them.
    pub always_append_emulated: bool,
    /// Grace period granted to a native enumeration before falling back.
    pub discovery_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            force_enable_vr: false,
            mouse_keyboard_controls_disabled: false,
            enable_deprecated_api: false,
            always_append_emulated: false,
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
        }
    }
}

impl EngineConfig {
    /// Read the `SHIMMER_*` environment overrides.
    pub fn from_env() -> Self {
        Self {
            force_enable_vr: env_bool("SHIMMER_FORCE_ENABLE_VR", false),
            mouse_keyboard_controls_disabled: env_bool(
                "SHIMMER_MOUSE_KEYBOARD_CONTROLS_DISABLED",
                false,
            ),
            enable_deprecated_api: env_bool("SHIMMER_ENABLE_DEPRECATED_API", false),
            always_append_emulated: env_bool("SHIMMER_ALWAYS_APPEND_EMULATED", false),
            discovery_timeout: Duration::from_millis(env_u64(
                "SHIMMER_DISCOVERY_TIMEOUT_MS",
                DEFAULT_DISCOVERY_TIMEOUT.as_millis() as u64,
            )),
        }
    }

    pub fn merge_policy(&self) -> MergePolicy {
        if self.always_append_emulated {
            MergePolicy::AlwaysAppendEmulated
        } else {
            MergePolicy::PreferNativeWhenPresent
        }
    }
}
