//! Discovery negotiation and compatibility shim engine.
//!
//! Reconciles three generations of asynchronous VR display discovery into
//! one contract:
//! - modern native hosts are raced against a timeout guard, so a hung
//!   enumeration degrades to the emulated fallback instead of hanging
//!   callers;
//! - deprecated callback-form hosts are bridged to async, their split
//!   devices adopted into display surfaces and conformed to the current
//!   shape;
//! - hosts with no native support are served entirely from the lazily
//!   populated emulated display registry.

#![forbid(unsafe_code)]

pub mod compat;
pub mod config;
pub mod engine;
pub mod merge;
pub mod probe;
pub mod race;
pub mod registry;
pub mod upgrade;

#[cfg(test)]
pub(crate) mod testing;

pub use compat::{adopt_legacy_devices, collect_legacy, wrap_displays, AdoptionCache};
pub use config::{EngineConfig, DEFAULT_DISCOVERY_TIMEOUT};
pub use engine::{DiscoveryEngine, PlanKind};
pub use merge::{merge, MergePolicy};
pub use probe::{Capabilities, NativeGeneration};
pub use race::{race, DiscoveryOutcome, RaceOutcome, SettleCell};
pub use registry::{EmulatedRegistry, PopulationPolicy};
pub use upgrade::{conform, ConformCache};
