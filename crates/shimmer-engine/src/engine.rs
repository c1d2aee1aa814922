//! The engine façade: owns the capability snapshot, the emulated registry
//! and the negotiated discovery plan, and serves the externally visible
//! entry points. All state lives in this one instance; nothing is ambient.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use shimmer_core::{
    DisplayFactory, DisplayHandle, DisplayResult, HostEnvironment, LegacyDevice, LegacyRuntime,
    ModernRuntime,
};

use crate::compat::{self, AdoptionCache};
use crate::config::EngineConfig;
use crate::merge;
use crate::probe::Capabilities;
use crate::race::{self, DiscoveryOutcome, RaceOutcome};
use crate::registry::{EmulatedRegistry, PopulationPolicy};
use crate::upgrade::ConformCache;

/// Which pipeline serves display enumeration on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    /// Modern native present: race it against the timeout, then merge.
    Raced,
    /// Only deprecated native present: collect, adopt by unit, conform.
    LegacyAdopted,
    /// No native support: the emulated registry alone.
    EmulatedOnly,
}

enum DiscoveryPlan {
    Raced(Arc<dyn ModernRuntime>),
    LegacyAdopted(Arc<dyn LegacyRuntime>),
    EmulatedOnly,
}

impl DiscoveryPlan {
    fn kind(&self) -> PlanKind {
        match self {
            DiscoveryPlan::Raced(_) => PlanKind::Raced,
            DiscoveryPlan::LegacyAdopted(_) => PlanKind::LegacyAdopted,
            DiscoveryPlan::EmulatedOnly => PlanKind::EmulatedOnly,
        }
    }
}

/// One owned instance per host session. The environment is probed once at
/// construction; the capability snapshot, the discovery plan and the
/// population policy never change afterwards.
pub struct DiscoveryEngine {
    env: Arc<dyn HostEnvironment>,
    config: EngineConfig,
    capabilities: Capabilities,
    plan: DiscoveryPlan,
    policy: PopulationPolicy,
    registry: EmulatedRegistry,
    connected: Arc<Mutex<Vec<DisplayHandle>>>,
    adoption_cache: Arc<AdoptionCache>,
    conform_cache: ConformCache,
    installed: AtomicBool,
}

impl DiscoveryEngine {
    pub fn new(
        env: Arc<dyn HostEnvironment>,
        factory: Arc<dyn DisplayFactory>,
        config: EngineConfig,
    ) -> Self {
        // Each environment accessor is consulted exactly once; the plan and
        // the snapshot therefore cannot disagree.
        let modern = env.modern_runtime();
        let legacy = env.legacy_runtime();
        let capabilities = Capabilities {
            has_modern_native: modern.is_some(),
            has_legacy_native: legacy.is_some(),
        };
        let plan = match (modern, legacy) {
            (Some(runtime), _) => DiscoveryPlan::Raced(runtime),
            (None, Some(runtime)) => DiscoveryPlan::LegacyAdopted(runtime),
            (None, None) => DiscoveryPlan::EmulatedOnly,
        };
        let policy = PopulationPolicy::derive(env.is_handheld(), &config);
        let connected = Arc::new(Mutex::new(Vec::new()));
        let registry = EmulatedRegistry::new(factory, connected.clone());

        Self {
            env,
            config,
            capabilities,
            plan,
            policy,
            registry,
            connected,
            adoption_cache: Arc::new(AdoptionCache::new()),
            conform_cache: ConformCache::new(),
            installed: AtomicBool::new(false),
        }
    }

    /// Activate the engine. Idempotent: the first call reports the
    /// negotiated plan and returns `true`; repeat installation is a no-op
    /// and cannot re-register pipelines or re-apply patches.
    pub fn install(&self) -> bool {
        if self.installed.swap(true, Ordering::SeqCst) {
            debug!("engine already installed; repeat install ignored");
            return false;
        }
        info!(
            "display discovery engine installed: plan {:?}, deprecated api {}",
            self.plan.kind(),
            if self.deprecated_active() {
                "active"
            } else {
                "inactive"
            }
        );
        true
    }

    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    /// Enumerate displays under the newest contract shape. Never fails
    /// except on explicit native rejection; a hung native implementation is
    /// absorbed by the timeout and the emulated fallback.
    pub async fn displays(&self) -> DisplayResult<Vec<DisplayHandle>> {
        match &self.plan {
            DiscoveryPlan::Raced(runtime) => {
                let native = runtime.displays();
                self.discover_native(native).await
            }
            DiscoveryPlan::LegacyAdopted(runtime) => {
                let runtime = runtime.clone();
                let adoption = self.adoption_cache.clone();
                self.discover_native(async move {
                    let devices = compat::collect_legacy(runtime.as_ref()).await?;
                    Ok(adoption.adopt(devices))
                })
                .await
            }
            DiscoveryPlan::EmulatedOnly => {
                Ok(self.registry.ensure_populated(&self.policy).await.to_vec())
            }
        }
    }

    /// Enumerate devices under the deprecated split contract.
    ///
    /// Hosts whose only native support is the deprecated generation get
    /// their own devices passed through unmodified; everywhere else the
    /// display pipeline result is wrapped into facet pairs. Without any
    /// deprecated support this yields an empty list, not a failure.
    pub async fn legacy_devices(&self) -> DisplayResult<Vec<LegacyDevice>> {
        warn!("deprecated device enumeration requested; migrate to display enumeration");

        if let DiscoveryPlan::LegacyAdopted(runtime) = &self.plan {
            let runtime = runtime.clone();
            let outcome = race::race(
                async move { compat::collect_legacy(runtime.as_ref()).await },
                self.config.discovery_timeout,
            )
            .await;
            return match outcome {
                RaceOutcome::Resolved(devices) => Ok(devices),
                RaceOutcome::TimedOut => {
                    let emulated = self.registry.ensure_populated(&self.policy).await;
                    Ok(compat::wrap_displays(emulated))
                }
                RaceOutcome::Rejected(err) => Err(err),
            };
        }

        if !self.deprecated_active() {
            debug!("deprecated enumeration without deprecated support; returning empty list");
            return Ok(Vec::new());
        }

        let displays = self.displays().await?;
        Ok(compat::wrap_displays(&displays))
    }

    /// Race the native enumeration against the timeout while the emulated
    /// registry is realized in parallel, then conform and merge.
    async fn discover_native<F>(&self, native: F) -> DisplayResult<Vec<DisplayHandle>>
    where
        F: Future<Output = DisplayResult<Vec<DisplayHandle>>> + Send + 'static,
    {
        let (outcome, emulated) = tokio::join!(
            race::race(native, self.config.discovery_timeout),
            self.registry.ensure_populated(&self.policy)
        );

        let native = match outcome {
            DiscoveryOutcome::Resolved(displays) => displays
                .into_iter()
                .map(|display| self.conform_cache.conform(display))
                .collect(),
            // A timeout counts as a resolved empty native list.
            DiscoveryOutcome::TimedOut => Vec::new(),
            DiscoveryOutcome::Rejected(err) => return Err(err),
        };

        Ok(merge::merge(native, emulated, self.config.merge_policy()))
    }

    /// Whether the deprecated enumeration is served with real content.
    pub fn deprecated_active(&self) -> bool {
        self.config.enable_deprecated_api || self.capabilities.has_legacy_native
    }

    /// Readable activation signal: VR-capable form factor (or the force
    /// override) combined with fullscreen-or-equivalent availability.
    pub fn presentation_eligible(&self) -> bool {
        (self.env.is_handheld() || self.config.force_enable_vr)
            && self.env.fullscreen_available()
    }

    /// Snapshot of the shared connected-displays side list.
    pub fn connected_displays(&self) -> Vec<DisplayHandle> {
        match self.connected.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn plan(&self) -> PlanKind {
        self.plan.kind()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
