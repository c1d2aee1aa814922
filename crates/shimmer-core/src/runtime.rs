//! Host-facing provider traits: the two native discovery generations, the
//! host environment consulted by the capability probe, and the factory that
//! constructs emulated displays on demand.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::display::DisplayHandle;
use crate::legacy::LegacyDevice;
use crate::{DisplayError, DisplayResult};

/// Result future of one modern enumeration call. The host may take
/// arbitrarily long, may reject, or may never settle at all.
pub type DiscoveryFuture = BoxFuture<'static, DisplayResult<Vec<DisplayHandle>>>;

pub type LegacyCallback = Box<dyn FnOnce(Vec<LegacyDevice>) + Send>;
pub type LegacyErrback = Box<dyn FnOnce(DisplayError) + Send>;

/// Modern native discovery: a single list-returning asynchronous call.
pub trait ModernRuntime: Send + Sync {
    fn displays(&self) -> DiscoveryFuture;
}

/// Deprecated native discovery: callback form. The host invokes at most one
/// of the two callbacks, at most once.
pub trait LegacyRuntime: Send + Sync {
    fn devices(&self, done: LegacyCallback, fail: LegacyErrback);
}

/// Read-only view of the host. Consulted exactly once, at engine
/// construction; answers must not change while the engine is alive.
pub trait HostEnvironment: Send + Sync {
    fn modern_runtime(&self) -> Option<Arc<dyn ModernRuntime>>;
    fn legacy_runtime(&self) -> Option<Arc<dyn LegacyRuntime>>;

    /// Handheld (camera/gyroscope-class) form factor.
    fn is_handheld(&self) -> bool;

    /// Whether fullscreen, or an equivalent immersive path on hosts without
    /// a fullscreen notion, is available.
    fn fullscreen_available(&self) -> bool;
}

/// Constructs the emulated displays. Implementations are consulted lazily,
/// at most once per display kind per engine.
pub trait DisplayFactory: Send + Sync {
    fn handheld_display(&self) -> DisplayResult<DisplayHandle>;
    fn desktop_display(&self) -> DisplayResult<DisplayHandle>;

    /// Reserved extension point for additional emulated display kinds.
    fn auxiliary_displays(&self) -> Vec<DisplayHandle> {
        Vec::new()
    }
}

/// Host with no native runtimes: desktop form factor, fullscreen available.
pub struct NullEnvironment;

impl HostEnvironment for NullEnvironment {
    fn modern_runtime(&self) -> Option<Arc<dyn ModernRuntime>> {
        None
    }

    fn legacy_runtime(&self) -> Option<Arc<dyn LegacyRuntime>> {
        None
    }

    fn is_handheld(&self) -> bool {
        false
    }

    fn fullscreen_available(&self) -> bool {
        true
    }
}
