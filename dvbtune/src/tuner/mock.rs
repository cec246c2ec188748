//! In-memory adapter used by the unit tests.
//!
//! Every opened directory and node gets an id; dropping it records the
//! release so tests can check exactly which descriptors were closed and in
//! which order.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::io::{self, ErrorKind};
use std::rc::Rc;
use std::time::Duration;

use dvb_sys as sys;

use crate::tuner::node::{
    Access, DeviceNode, DvbBackend, FrontendInfo, FrontendStatus, NodeKind, PesFilter, Readiness,
};
use crate::tuner::translate::MiniCmd;

fn injected() -> io::Error {
    io::Error::new(ErrorKind::Other, "injected failure")
}

pub struct MockState {
    next_id: u32,
    open: BTreeMap<u32, String>,
    pub closed: Vec<String>,

    pub fail_adapter: bool,
    pub missing: HashSet<String>,
    pub frontend_type: u32,
    pub fail_info: bool,
    pub fail_buffer_size: bool,
    pub fail_pes_filter: bool,
    pub fail_properties: bool,
    pub fail_high_voltage: bool,
    pub fail_diseqc: bool,
    pub fail_burst: bool,
    pub signal: Option<u16>,
    pub snr: Option<u16>,
    pub status: Option<u32>,

    pub waits: VecDeque<io::Result<Readiness>>,
    pub reads: VecDeque<io::Result<Vec<u8>>>,
    pub events: VecDeque<io::Result<u32>>,
    pub waited_with_frontend: Vec<bool>,

    pub buffer_sizes: Vec<u32>,
    pub filters: Vec<(String, PesFilter)>,
    pub added_pids: Vec<u16>,
    pub removed_pids: Vec<u16>,
    pub submitted: Vec<Vec<(u32, u32)>>,
    pub high_voltage: Vec<bool>,
    pub diseqc: Vec<Vec<u8>>,
    pub bursts: Vec<MiniCmd>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            next_id: 0,
            open: BTreeMap::new(),
            closed: Vec::new(),
            fail_adapter: false,
            missing: HashSet::new(),
            frontend_type: sys::FE_OFDM,
            fail_info: false,
            fail_buffer_size: false,
            fail_pes_filter: false,
            fail_properties: false,
            fail_high_voltage: false,
            fail_diseqc: false,
            fail_burst: false,
            signal: None,
            snr: None,
            status: None,
            waits: VecDeque::new(),
            reads: VecDeque::new(),
            events: VecDeque::new(),
            waited_with_frontend: Vec::new(),
            buffer_sizes: Vec::new(),
            filters: Vec::new(),
            added_pids: Vec::new(),
            removed_pids: Vec::new(),
            submitted: Vec::new(),
            high_voltage: Vec::new(),
            diseqc: Vec::new(),
            bursts: Vec::new(),
        }
    }
}

impl MockState {
    /// Number of directories and nodes currently open.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Labels of the currently open handles, in opening order.
    pub fn open_labels(&self) -> Vec<String> {
        self.open.values().cloned().collect()
    }

    fn register(&mut self, label: String) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.open.insert(id, label);
        id
    }

    fn release(&mut self, id: u32) {
        if let Some(label) = self.open.remove(&id) {
            self.closed.push(label);
        }
    }
}

#[derive(Clone, Default)]
pub struct MockBackend {
    state: Rc<RefCell<MockState>>,
}

impl MockBackend {
    pub fn state(&self) -> Ref<'_, MockState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, MockState> {
        self.state.borrow_mut()
    }

    pub fn label_of(&self, node: &MockNode) -> String {
        node.label.clone()
    }
}

pub struct MockDir {
    id: u32,
    state: Rc<RefCell<MockState>>,
}

impl Drop for MockDir {
    fn drop(&mut self) {
        self.state.borrow_mut().release(self.id);
    }
}

pub struct MockNode {
    id: u32,
    label: String,
    state: Rc<RefCell<MockState>>,
}

impl Drop for MockNode {
    fn drop(&mut self) {
        self.state.borrow_mut().release(self.id);
    }
}

impl DvbBackend for MockBackend {
    type Dir = MockDir;
    type Node = MockNode;

    fn open_adapter(&self, adapter: u8) -> io::Result<MockDir> {
        let mut state = self.state.borrow_mut();
        if state.fail_adapter {
            return Err(io::Error::from(ErrorKind::NotFound));
        }
        let id = state.register(format!("adapter{}", adapter));
        Ok(MockDir {
            id,
            state: self.state.clone(),
        })
    }

    fn duplicate_dir(&self, dir: &MockDir) -> io::Result<MockDir> {
        let mut state = self.state.borrow_mut();
        let label = state.open.get(&dir.id).cloned().unwrap_or_default();
        let id = state.register(label);
        Ok(MockDir {
            id,
            state: self.state.clone(),
        })
    }

    fn open_node(
        &self,
        _dir: &MockDir,
        device: u8,
        kind: NodeKind,
        _access: Access,
    ) -> io::Result<MockNode> {
        let label = kind.file_name(device);
        let mut state = self.state.borrow_mut();
        if state.missing.contains(&label) {
            return Err(io::Error::from(ErrorKind::NotFound));
        }
        let id = state.register(label.clone());
        Ok(MockNode {
            id,
            label,
            state: self.state.clone(),
        })
    }

    fn wait(
        &self,
        _data: &MockNode,
        frontend: Option<&MockNode>,
        _timeout: Duration,
    ) -> io::Result<Readiness> {
        let mut state = self.state.borrow_mut();
        state.waited_with_frontend.push(frontend.is_some());
        state.waits.pop_front().unwrap_or_else(|| Ok(Readiness::default()))
    }
}

impl MockNode {
    fn state(&self) -> RefMut<'_, MockState> {
        self.state.borrow_mut()
    }
}

impl DeviceNode for MockNode {
    fn set_buffer_size(&self, size: u32) -> io::Result<()> {
        let mut state = self.state();
        if state.fail_buffer_size {
            return Err(injected());
        }
        state.buffer_sizes.push(size);
        Ok(())
    }

    fn set_pes_filter(&self, filter: &PesFilter) -> io::Result<()> {
        let mut state = self.state();
        if state.fail_pes_filter {
            return Err(injected());
        }
        state.filters.push((self.label.clone(), *filter));
        Ok(())
    }

    fn add_pid(&self, pid: u16) -> io::Result<()> {
        self.state().added_pids.push(pid);
        Ok(())
    }

    fn remove_pid(&self, pid: u16) -> io::Result<()> {
        self.state().removed_pids.push(pid);
        Ok(())
    }

    fn frontend_info(&self) -> io::Result<FrontendInfo> {
        let state = self.state();
        if state.fail_info {
            return Err(injected());
        }
        Ok(FrontendInfo {
            name: "Mock Frontend".to_string(),
            type_: state.frontend_type,
            frequency_min: 0,
            frequency_max: u32::MAX,
            frequency_stepsize: 0,
            symbol_rate_min: 0,
            symbol_rate_max: u32::MAX,
            caps: 0,
        })
    }

    fn set_properties(&self, props: &[(u32, u32)]) -> io::Result<()> {
        let mut state = self.state();
        if state.fail_properties {
            return Err(injected());
        }
        state.submitted.push(props.to_vec());
        Ok(())
    }

    fn read_status(&self) -> io::Result<FrontendStatus> {
        self.state().status.map(FrontendStatus).ok_or_else(injected)
    }

    fn signal_strength(&self) -> io::Result<u16> {
        self.state().signal.ok_or_else(injected)
    }

    fn snr(&self) -> io::Result<u16> {
        self.state().snr.ok_or_else(injected)
    }

    fn ber(&self) -> io::Result<u32> {
        Err(injected())
    }

    fn uncorrected_blocks(&self) -> io::Result<u32> {
        Err(injected())
    }

    fn next_event(&self) -> io::Result<FrontendStatus> {
        let mut state = self.state();
        match state.events.pop_front() {
            Some(ev) => ev.map(FrontendStatus),
            None => Err(io::Error::from(ErrorKind::WouldBlock)),
        }
    }

    fn enable_high_lnb_voltage(&self, enable: bool) -> io::Result<()> {
        let mut state = self.state();
        state.high_voltage.push(enable);
        if state.fail_high_voltage {
            return Err(injected());
        }
        Ok(())
    }

    fn diseqc_send_master_cmd(&self, msg: &[u8]) -> io::Result<()> {
        let mut state = self.state();
        if state.fail_diseqc {
            return Err(injected());
        }
        state.diseqc.push(msg.to_vec());
        Ok(())
    }

    fn diseqc_send_burst(&self, cmd: MiniCmd) -> io::Result<()> {
        let mut state = self.state();
        if state.fail_burst {
            return Err(injected());
        }
        state.bursts.push(cmd);
        Ok(())
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state();
        match state.reads.pop_front() {
            Some(Ok(data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
            Some(Err(e)) => Err(e),
            None => Err(io::Error::from(ErrorKind::WouldBlock)),
        }
    }
}
