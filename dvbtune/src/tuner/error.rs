use std::io;

use thiserror::Error;

use crate::tuner::node::NodeKind;

/// Errors reported by tuner sessions and delivery-system configurators.
///
/// Every variant that wraps an [`io::Error`] carries the OS error of the
/// failed system call.
#[derive(Debug, Error)]
pub enum TunerError {
    #[error("cannot access adapter {adapter}: {source}")]
    AdapterUnavailable { adapter: u8, source: io::Error },

    #[error("cannot access {kind} {device} of adapter {adapter}: {source}")]
    NodeUnavailable {
        kind: NodeKind,
        adapter: u8,
        device: u8,
        source: io::Error,
    },

    #[error("cannot get frontend info: {0}")]
    FrontendInfo(#[source] io::Error),

    #[error("cannot read frontend status: {0}")]
    FrontendStatus(#[source] io::Error),

    #[error("cannot setup TS demultiplexer: {0}")]
    DemuxSetup(#[source] io::Error),

    #[error("cannot set frontend tuning parameters: {0}")]
    PropertiesRejected(#[source] io::Error),

    #[error("cannot add PID 0x{pid:04X}: {source}")]
    PidFilter { pid: u16, source: io::Error },

    #[error("cannot add PID 0x{0:04X}: too many PID filters")]
    TooManyFilters(u16),

    #[error("cannot send DiSEqC command: {0}")]
    DiseqcCommand(#[source] io::Error),

    #[error("cannot send Mini-DiSEqC tone burst: {0}")]
    ToneBurst(#[source] io::Error),

    #[error("operation requires an open frontend")]
    NotTuning,

    #[error("unsupported frontend type {0}")]
    UnsupportedFrontend(u32),

    #[error("frequency {0} out of range")]
    FrequencyOutOfRange(u64),
}

impl TunerError {
    /// The underlying OS error, if any.
    pub fn os_error(&self) -> Option<&io::Error> {
        match self {
            TunerError::AdapterUnavailable { source, .. }
            | TunerError::NodeUnavailable { source, .. }
            | TunerError::PidFilter { source, .. } => Some(source),
            TunerError::FrontendInfo(e)
            | TunerError::FrontendStatus(e)
            | TunerError::DemuxSetup(e)
            | TunerError::PropertiesRejected(e)
            | TunerError::DiseqcCommand(e)
            | TunerError::ToneBurst(e) => Some(e),
            TunerError::TooManyFilters(_)
            | TunerError::NotTuning
            | TunerError::UnsupportedFrontend(_)
            | TunerError::FrequencyOutOfRange(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TunerError>;
