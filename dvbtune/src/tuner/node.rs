//! Device nodes of a DVB adapter and the host interface used to reach them.
//!
//! [`DvbBackend`] resolves `adapter<N>` directories and the `frontend<N>`,
//! `demux<N>`, `dvr<N>` and `ca<N>` nodes inside them. [`DeviceNode`] is an
//! opened node; dropping it closes the descriptor.

use std::fmt;
use std::io;
use std::time::Duration;

use dvb_sys as sys;

use crate::tuner::translate::MiniCmd;

/// Device node types found in an adapter directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Frontend,
    Demux,
    Dvr,
    Ca,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Frontend => "frontend",
            NodeKind::Demux => "demux",
            NodeKind::Dvr => "dvr",
            NodeKind::Ca => "ca",
        }
    }

    /// File name of the node inside its adapter directory.
    pub fn file_name(self, device: u8) -> String {
        format!("{}{}", self.name(), device)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// Which descriptors became readable during [`DvbBackend::wait`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    pub data: bool,
    pub frontend: bool,
}

/// Parameters of a demultiplexer PES/TS filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PesFilter {
    pub pid: u16,
    pub input: u32,
    pub output: u32,
    pub pes_type: u32,
    pub flags: u32,
}

impl PesFilter {
    /// A filter fed by the frontend and started immediately.
    pub fn from_frontend(pid: u16, output: u32) -> Self {
        Self {
            pid,
            input: sys::DMX_IN_FRONTEND,
            output,
            pes_type: sys::DMX_PES_OTHER,
            flags: sys::DMX_IMMEDIATE_START,
        }
    }
}

impl From<PesFilter> for sys::dmx_pes_filter_params {
    fn from(f: PesFilter) -> Self {
        Self {
            pid: f.pid,
            input: f.input,
            output: f.output,
            pes_type: f.pes_type,
            flags: f.flags,
        }
    }
}

/// Hardware class reported by the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontendType {
    Satellite,
    Cable,
    Terrestrial,
    Atsc,
    Unknown(u32),
}

impl From<u32> for FrontendType {
    fn from(v: u32) -> Self {
        match v {
            sys::FE_QPSK => FrontendType::Satellite,
            sys::FE_QAM => FrontendType::Cable,
            sys::FE_OFDM => FrontendType::Terrestrial,
            sys::FE_ATSC => FrontendType::Atsc,
            other => FrontendType::Unknown(other),
        }
    }
}

/// Capability snapshot of a frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendInfo {
    pub name: String,
    pub type_: u32,
    pub frequency_min: u32,
    pub frequency_max: u32,
    pub frequency_stepsize: u32,
    pub symbol_rate_min: u32,
    pub symbol_rate_max: u32,
    pub caps: u32,
}

impl FrontendInfo {
    pub fn frontend_type(&self) -> FrontendType {
        FrontendType::from(self.type_)
    }

    /// Whether the frontend handles second generation systems (DVB-S2, ...).
    pub fn supports_2g(&self) -> bool {
        self.caps & sys::FE_CAN_2G_MODULATION != 0
    }
}

impl From<&sys::dvb_frontend_info> for FrontendInfo {
    fn from(raw: &sys::dvb_frontend_info) -> Self {
        let len = raw.name.iter().position(|&b| b == 0).unwrap_or(raw.name.len());
        Self {
            name: String::from_utf8_lossy(&raw.name[..len]).into_owned(),
            type_: raw.type_,
            frequency_min: raw.frequency_min,
            frequency_max: raw.frequency_max,
            frequency_stepsize: raw.frequency_stepsize,
            symbol_rate_min: raw.symbol_rate_min,
            symbol_rate_max: raw.symbol_rate_max,
            caps: raw.caps,
        }
    }
}

/// Frontend lock status bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontendStatus(pub u32);

impl FrontendStatus {
    pub fn has_signal(self) -> bool {
        self.0 & sys::FE_HAS_SIGNAL != 0
    }

    pub fn has_carrier(self) -> bool {
        self.0 & sys::FE_HAS_CARRIER != 0
    }

    pub fn has_viterbi(self) -> bool {
        self.0 & sys::FE_HAS_VITERBI != 0
    }

    pub fn has_sync(self) -> bool {
        self.0 & sys::FE_HAS_SYNC != 0
    }

    pub fn has_lock(self) -> bool {
        self.0 & sys::FE_HAS_LOCK != 0
    }

    pub fn timed_out(self) -> bool {
        self.0 & sys::FE_TIMEDOUT != 0
    }
}

impl fmt::Display for FrontendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            (self.has_signal(), "SIGNAL"),
            (self.has_carrier(), "CARRIER"),
            (self.has_viterbi(), "VITERBI"),
            (self.has_sync(), "SYNC"),
            (self.has_lock(), "LOCK"),
            (self.timed_out(), "TIMEDOUT"),
        ];
        write!(f, "0x{:02X}", self.0)?;
        for (set, name) in flags {
            if set {
                write!(f, " {}", name)?;
            }
        }
        Ok(())
    }
}

/// An opened device node.
///
/// Each method corresponds to one kernel request; implementations must not
/// retry or reinterpret errors.
pub trait DeviceNode {
    fn set_buffer_size(&self, size: u32) -> io::Result<()>;
    fn set_pes_filter(&self, filter: &PesFilter) -> io::Result<()>;
    fn add_pid(&self, pid: u16) -> io::Result<()>;
    fn remove_pid(&self, pid: u16) -> io::Result<()>;

    fn frontend_info(&self) -> io::Result<FrontendInfo>;
    /// Submits an ordered property set in a single call.
    fn set_properties(&self, props: &[(u32, u32)]) -> io::Result<()>;
    fn read_status(&self) -> io::Result<FrontendStatus>;
    fn signal_strength(&self) -> io::Result<u16>;
    fn snr(&self) -> io::Result<u16>;
    fn ber(&self) -> io::Result<u32>;
    fn uncorrected_blocks(&self) -> io::Result<u32>;
    /// Dequeues one pending frontend event.
    fn next_event(&self) -> io::Result<FrontendStatus>;
    fn enable_high_lnb_voltage(&self, enable: bool) -> io::Result<()>;
    fn diseqc_send_master_cmd(&self, msg: &[u8]) -> io::Result<()>;
    fn diseqc_send_burst(&self, cmd: MiniCmd) -> io::Result<()>;

    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Host access to DVB adapters.
pub trait DvbBackend {
    /// Handle on an `adapter<N>` directory.
    type Dir;
    type Node: DeviceNode;

    fn open_adapter(&self, adapter: u8) -> io::Result<Self::Dir>;

    /// Duplicates a directory handle so it can outlive the one it came from.
    fn duplicate_dir(&self, dir: &Self::Dir) -> io::Result<Self::Dir>;

    /// Opens `<kind><device>` relative to `dir`, close-on-exec and
    /// non-blocking.
    fn open_node(
        &self,
        dir: &Self::Dir,
        device: u8,
        kind: NodeKind,
        access: Access,
    ) -> io::Result<Self::Node>;

    /// Blocks until `data` or `frontend` is readable or `timeout` expires.
    fn wait(
        &self,
        data: &Self::Node,
        frontend: Option<&Self::Node>,
        timeout: Duration,
    ) -> io::Result<Readiness>;
}
