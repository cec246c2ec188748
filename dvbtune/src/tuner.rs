#[cfg(target_os = "linux")]
pub use self::linux::{AdapterDir, LinuxBackend, LinuxNode};
#[cfg(not(target_os = "linux"))]
pub use self::unsupported::UnsupportedBackend;

pub use self::delsys::{AtscParams, CableParams, Delsys, SatelliteParams, TerrestrialParams};
pub use self::error::{Result, TunerError};
pub use self::filter::{FilterMode, MAX_PIDS};
pub use self::io::ReadOutcome;
pub use self::node::{
    Access, DeviceNode, DvbBackend, FrontendInfo, FrontendStatus, FrontendType, NodeKind,
    Readiness,
};
pub use self::sec::{SecParams, ToneMode};
pub use self::session::DvbDevice;

/// Backend for the host this binary was built for.
#[cfg(target_os = "linux")]
pub type SystemBackend = LinuxBackend;
#[cfg(not(target_os = "linux"))]
pub type SystemBackend = UnsupportedBackend;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(target_os = "linux"))]
mod unsupported;

pub mod delsys;
mod error;
mod filter;
mod io;
pub mod node;
pub mod props;
pub mod sec;
mod session;
pub mod translate;

#[cfg(test)]
mod mock;
