//! Core Shimmer device contract.
//!
//! This crate provides:
//! - The [`VrDisplay`] trait and [`DisplayHandle`], the one display contract
//!   every caller consumes, whatever generation of host API produced it
//! - Pose, frame data, and eye parameter types shared by all backends
//! - The deprecated device contract ([`HmdDevice`], [`PositionSensorDevice`])
//!   and the per-display wrappers that re-expose a handle under it
//! - Host-facing provider traits: [`ModernRuntime`], [`LegacyRuntime`],
//!   [`HostEnvironment`], [`DisplayFactory`]

#![forbid(unsafe_code)]

pub mod display;
pub mod legacy;
pub mod runtime;
pub mod types;

pub use display::{next_display_id, DisplayHandle, DisplayId, DisplayInfo, VrDisplay};
pub use legacy::{
    DisplayHmdDevice, DisplaySensorDevice, HmdDevice, LegacyDevice, PositionSensorDevice,
    SensorState,
};
pub use runtime::{
    DiscoveryFuture, DisplayFactory, HostEnvironment, LegacyCallback, LegacyErrback,
    LegacyRuntime, ModernRuntime, NullEnvironment,
};
pub use types::{
    DepthRange, DisplayCapabilities, Eye, EyeParameters, FieldOfView, FrameData, Pose,
    PoseVelocity,
};

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DisplayError {
    /// The host's native discovery call failed outright. Propagated verbatim
    /// to enumeration callers; a hung native call is not this, it degrades
    /// to the emulated fallback instead.
    #[error("native discovery rejected: {0}")]
    NativeRejection(String),
    /// An emulated display could not be constructed. Absorbed by the
    /// registry, which omits the display rather than failing population.
    #[error("display unavailable: {0}")]
    Unavailable(String),
    #[error("presentation refused: {0}")]
    Presentation(String),
}

pub type DisplayResult<T> = Result<T, DisplayError>;
