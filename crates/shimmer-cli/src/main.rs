//! Shimmer CLI tools: discovery probes, display dumps, diagnostics.
//!
//! The discovery subcommands run a real engine against a simulated host so
//! every negotiation path can be exercised from the command line.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use shimmer_core::{
    DiscoveryFuture, DisplayError, DisplayInfo, Eye, EyeParameters, HmdDevice, HostEnvironment,
    LegacyCallback, LegacyDevice, LegacyErrback, LegacyRuntime, ModernRuntime,
    PositionSensorDevice, SensorState,
};
use shimmer_displays::EmulatedDisplays;
use shimmer_engine::{DiscoveryEngine, EngineConfig};

#[derive(Parser, Debug)]
#[command(name = "shimmer")]
#[command(about = "Shimmer CLI tools")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the capability snapshot and the negotiated discovery plan
    Probe {
        #[command(flatten)]
        host: HostArgs,
    },

    /// Run display discovery and list the results
    Displays {
        #[command(flatten)]
        host: HostArgs,

        /// Emit the display list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the deprecated device enumeration and list the results
    Legacy {
        #[command(flatten)]
        host: HostArgs,
    },

    /// Show version information
    Version,
}

/// Simulated host shared by the discovery subcommands.
#[derive(clap::Args, Debug)]
struct HostArgs {
    /// Simulate a handheld form factor
    #[arg(long)]
    handheld: bool,

    /// Simulate a host without fullscreen support
    #[arg(long)]
    no_fullscreen: bool,

    /// Native discovery behavior to simulate
    #[arg(long, value_enum, default_value_t = NativeSim::None)]
    native: NativeSim,

    /// Override the discovery timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Append emulated displays behind native ones
    #[arg(long)]
    append_emulated: bool,

    /// Serve the deprecated enumeration even without native legacy support
    #[arg(long)]
    deprecated_api: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum NativeSim {
    /// No native runtime of either generation
    None,
    /// Modern runtime resolving an empty display list
    Empty,
    /// Modern runtime that never settles
    Hang,
    /// Modern runtime that rejects the enumeration
    Reject,
    /// Deprecated runtime answering with one simulated unit
    Legacy,
}

struct SimEnvironment {
    native: NativeSim,
    handheld: bool,
    fullscreen: bool,
}

impl HostEnvironment for SimEnvironment {
    fn modern_runtime(&self) -> Option<Arc<dyn ModernRuntime>> {
        match self.native {
            NativeSim::Empty | NativeSim::Hang | NativeSim::Reject => {
                Some(Arc::new(SimModernRuntime {
                    behavior: self.native,
                }))
            }
            NativeSim::None | NativeSim::Legacy => None,
        }
    }

    fn legacy_runtime(&self) -> Option<Arc<dyn LegacyRuntime>> {
        match self.native {
            NativeSim::Legacy => Some(Arc::new(SimLegacyRuntime)),
            _ => None,
        }
    }

    fn is_handheld(&self) -> bool {
        self.handheld
    }

    fn fullscreen_available(&self) -> bool {
        self.fullscreen
    }
}

struct SimModernRuntime {
    behavior: NativeSim,
}

impl ModernRuntime for SimModernRuntime {
    fn displays(&self) -> DiscoveryFuture {
        match self.behavior {
            NativeSim::Hang => Box::pin(std::future::pending()),
            NativeSim::Reject => Box::pin(async {
                Err(DisplayError::NativeRejection(
                    "simulated rejection".to_string(),
                ))
            }),
            _ => Box::pin(async { Ok(Vec::new()) }),
        }
    }
}

struct SimLegacyRuntime;

impl LegacyRuntime for SimLegacyRuntime {
    fn devices(&self, done: LegacyCallback, _fail: LegacyErrback) {
        done(vec![
            LegacyDevice::Hmd(Arc::new(SimHmd)),
            LegacyDevice::PositionSensor(Arc::new(SimSensor)),
        ]);
    }
}

struct SimHmd;

impl HmdDevice for SimHmd {
    fn unit_id(&self) -> u32 {
        1
    }

    fn device_name(&self) -> String {
        "Simulated Legacy Headset".to_string()
    }

    fn eye_parameters(&self, _eye: Eye) -> EyeParameters {
        EyeParameters::default()
    }
}

struct SimSensor;

impl PositionSensorDevice for SimSensor {
    fn unit_id(&self) -> u32 {
        1
    }

    fn device_name(&self) -> String {
        "Simulated Legacy Headset".to_string()
    }

    fn state(&self) -> SensorState {
        SensorState::default()
    }

    fn reset_sensor(&self) {}
}

fn sim_environment(host: &HostArgs) -> Arc<SimEnvironment> {
    Arc::new(SimEnvironment {
        native: host.native,
        handheld: host.handheld,
        fullscreen: !host.no_fullscreen,
    })
}

fn engine_config(host: &HostArgs) -> EngineConfig {
    let mut config = EngineConfig::from_env();
    if host.append_emulated {
        config.always_append_emulated = true;
    }
    if host.deprecated_api {
        config.enable_deprecated_api = true;
    }
    if let Some(ms) = host.timeout_ms {
        config.discovery_timeout = Duration::from_millis(ms);
    }
    config
}

fn build_engine(host: &HostArgs) -> DiscoveryEngine {
    DiscoveryEngine::new(
        sim_environment(host),
        Arc::new(EmulatedDisplays),
        engine_config(host),
    )
}

fn main() -> Result<()> {
    shimmer_common::init_tracing();

    let args = Args::parse();

    match args.command {
        Command::Probe { host } => {
            let engine = build_engine(&host);
            engine.install();

            let capabilities = engine.capabilities();
            println!("Modern native:  {}", capabilities.has_modern_native);
            println!("Legacy native:  {}", capabilities.has_legacy_native);
            println!("Generation:     {:?}", capabilities.native_generation());
            println!("Plan:           {:?}", engine.plan());
            println!(
                "Deprecated API: {}",
                if engine.deprecated_active() {
                    "active"
                } else {
                    "inactive"
                }
            );
            println!(
                "Presentation:   {}",
                if engine.presentation_eligible() {
                    "eligible"
                } else {
                    "not eligible"
                }
            );
        }
        Command::Displays { host, json } => {
            let engine = build_engine(&host);
            engine.install();

            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;

            rt.block_on(async {
                let displays = engine.displays().await?;

                if json {
                    let infos: Vec<DisplayInfo> = displays.iter().map(DisplayInfo::from).collect();
                    println!("{}", serde_json::to_string_pretty(&infos)?);
                } else {
                    println!("Plan:         {:?}", engine.plan());
                    println!("Displays:     {}", displays.len());
                    for display in &displays {
                        let capabilities = display.capabilities();
                        println!(
                            "  [{}] {} (orientation={}, position={}, present={})",
                            display.display_id(),
                            display.display_name(),
                            capabilities.has_orientation,
                            capabilities.has_position,
                            capabilities.can_present,
                        );
                    }
                }

                Ok::<(), anyhow::Error>(())
            })?;
        }
        Command::Legacy { host } => {
            let engine = build_engine(&host);
            engine.install();

            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;

            rt.block_on(async {
                let devices = engine.legacy_devices().await?;

                println!("Devices: {}", devices.len());
                for device in &devices {
                    let kind = match device {
                        LegacyDevice::Hmd(_) => "HMD",
                        LegacyDevice::PositionSensor(_) => "PositionSensor",
                    };
                    println!(
                        "  [unit {}] {} ({})",
                        device.unit_id(),
                        device.device_name(),
                        kind
                    );
                }

                Ok::<(), anyhow::Error>(())
            })?;
        }
        Command::Version => {
            println!("shimmer {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
