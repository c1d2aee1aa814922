use shimmer_core::HostEnvironment;

/// Immutable snapshot of which native discovery generations the host
/// exposes. Taken once, before any discovery call is issued, and never
/// recomputed for the lifetime of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub has_modern_native: bool,
    pub has_legacy_native: bool,
}

/// Classification of the host's native support, newest generation first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeGeneration {
    Modern,
    LegacyOnly,
    None,
}

impl Capabilities {
    /// Inspect the host once. Pure: no side effects beyond reading the
    /// environment, and absence of a capability is an expected outcome,
    /// not a failure.
    pub fn probe(env: &dyn HostEnvironment) -> Self {
        Self {
            has_modern_native: env.modern_runtime().is_some(),
            has_legacy_native: env.legacy_runtime().is_some(),
        }
    }

    pub fn has_any_native(&self) -> bool {
        self.has_modern_native || self.has_legacy_native
    }

    pub fn native_generation(&self) -> NativeGeneration {
        if self.has_modern_native {
            NativeGeneration::Modern
        } else if self.has_legacy_native {
            NativeGeneration::LegacyOnly
        } else {
            NativeGeneration::None
        }
    }
}
