use std::io;
use std::io::ErrorKind;
use std::time::Duration;

use crate::tuner::node::{
    Access, DeviceNode, DvbBackend, FrontendInfo, FrontendStatus, NodeKind, PesFilter, Readiness,
};
use crate::tuner::translate::MiniCmd;

const UNSUPPORTED_MSG: &str = "DVB device access is not supported on this platform (supported: Linux)";

fn unsupported<T>() -> io::Result<T> {
    Err(io::Error::new(ErrorKind::Unsupported, UNSUPPORTED_MSG))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedBackend;

/// Never constructed; exists so the session type can be named.
pub enum NoDir {}

pub enum NoNode {}

impl DvbBackend for UnsupportedBackend {
    type Dir = NoDir;
    type Node = NoNode;

    fn open_adapter(&self, _adapter: u8) -> io::Result<NoDir> {
        unsupported()
    }

    fn duplicate_dir(&self, dir: &NoDir) -> io::Result<NoDir> {
        match *dir {}
    }

    fn open_node(&self, dir: &NoDir, _: u8, _: NodeKind, _: Access) -> io::Result<NoNode> {
        match *dir {}
    }

    fn wait(&self, data: &NoNode, _: Option<&NoNode>, _: Duration) -> io::Result<Readiness> {
        match *data {}
    }
}

impl DeviceNode for NoNode {
    fn set_buffer_size(&self, _: u32) -> io::Result<()> {
        match *self {}
    }
    fn set_pes_filter(&self, _: &PesFilter) -> io::Result<()> {
        match *self {}
    }
    fn add_pid(&self, _: u16) -> io::Result<()> {
        match *self {}
    }
    fn remove_pid(&self, _: u16) -> io::Result<()> {
        match *self {}
    }
    fn frontend_info(&self) -> io::Result<FrontendInfo> {
        match *self {}
    }
    fn set_properties(&self, _: &[(u32, u32)]) -> io::Result<()> {
        match *self {}
    }
    fn read_status(&self) -> io::Result<FrontendStatus> {
        match *self {}
    }
    fn signal_strength(&self) -> io::Result<u16> {
        match *self {}
    }
    fn snr(&self) -> io::Result<u16> {
        match *self {}
    }
    fn ber(&self) -> io::Result<u32> {
        match *self {}
    }
    fn uncorrected_blocks(&self) -> io::Result<u32> {
        match *self {}
    }
    fn next_event(&self) -> io::Result<FrontendStatus> {
        match *self {}
    }
    fn enable_high_lnb_voltage(&self, _: bool) -> io::Result<()> {
        match *self {}
    }
    fn diseqc_send_master_cmd(&self, _: &[u8]) -> io::Result<()> {
        match *self {}
    }
    fn diseqc_send_burst(&self, _: MiniCmd) -> io::Result<()> {
        match *self {}
    }
    fn read(&self, _: &mut [u8]) -> io::Result<usize> {
        match *self {}
    }
}
