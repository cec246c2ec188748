//! dvbtune library - tuner control for Linux DVB API v5 adapters
//!
//! This library opens DVB adapters, configures DVB-C, DVB-S/S2 (with LNB
//! and DiSEqC switch control), DVB-T and ATSC frontends, manages PID
//! filters and reads the resulting transport stream.

pub mod config;
pub mod tuner;

// Re-export commonly used types
pub use config::{ConfigError, DvbConfig};
pub use tuner::{
    Delsys, DvbDevice, FilterMode, ReadOutcome, SecParams, SystemBackend, ToneMode, TunerError,
};
