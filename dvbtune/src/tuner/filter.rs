//! PID filtering strategies.
//!
//! A session either taps the whole transport stream through one shared
//! demultiplexer filter, or opens one demultiplexer descriptor per PID and
//! reads the merged output from the DVR node. The strategy is chosen when
//! the session is opened and never changes afterwards.

use log::{debug, error, warn};

use dvb_sys as sys;

use crate::tuner::error::{Result, TunerError};
use crate::tuner::node::{Access, DeviceNode, DvbBackend, NodeKind, PesFilter};

/// Capacity of the per-PID descriptor table.
pub const MAX_PIDS: usize = 256;

/// How PIDs reach user space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// One filter on the whole-stream pseudo PID; PID requests are ignored.
    Budget,
    /// One filter on the PAT, extended with `DMX_ADD_PID`.
    SharedFilter,
    /// One demultiplexer descriptor per PID, data read from the DVR node.
    PerPid,
}

pub(crate) enum FilterStrategy<B: DvbBackend> {
    Shared(SharedFilter<B::Node>),
    PerPid(PidTable<B>),
}

impl<B: DvbBackend> FilterStrategy<B> {
    pub(crate) fn open(
        backend: &B,
        dir: &B::Dir,
        adapter: u8,
        device: u8,
        mode: FilterMode,
        buffer_size: u32,
    ) -> Result<Self> {
        match mode {
            FilterMode::Budget | FilterMode::SharedFilter => {
                let budget = mode == FilterMode::Budget;
                SharedFilter::open(backend, dir, adapter, device, budget, buffer_size)
                    .map(FilterStrategy::Shared)
            }
            FilterMode::PerPid => {
                PidTable::open(backend, dir, adapter, device).map(FilterStrategy::PerPid)
            }
        }
    }

    pub(crate) fn mode(&self) -> FilterMode {
        match self {
            FilterStrategy::Shared(f) if f.budget => FilterMode::Budget,
            FilterStrategy::Shared(_) => FilterMode::SharedFilter,
            FilterStrategy::PerPid(_) => FilterMode::PerPid,
        }
    }

    /// Descriptor the transport stream is read from.
    pub(crate) fn data_node(&self) -> &B::Node {
        match self {
            FilterStrategy::Shared(f) => &f.demux,
            FilterStrategy::PerPid(t) => &t.dvr,
        }
    }

    pub(crate) fn add_pid(&mut self, backend: &B, pid: u16) -> Result<()> {
        match self {
            FilterStrategy::Shared(f) => f.add_pid(pid),
            FilterStrategy::PerPid(t) => t.add_pid(backend, pid),
        }
    }

    pub(crate) fn remove_pid(&mut self, pid: u16) {
        match self {
            FilterStrategy::Shared(f) => f.remove_pid(pid),
            FilterStrategy::PerPid(t) => t.remove_pid(pid),
        }
    }

    /// Closes every per-PID descriptor; the data path stays open.
    pub(crate) fn release_pids(&mut self) {
        if let FilterStrategy::PerPid(t) = self {
            t.clear();
        }
    }
}

pub(crate) struct SharedFilter<N> {
    demux: N,
    budget: bool,
}

impl<N: DeviceNode> SharedFilter<N> {
    fn open<B: DvbBackend<Node = N>>(
        backend: &B,
        dir: &B::Dir,
        adapter: u8,
        device: u8,
        budget: bool,
        buffer_size: u32,
    ) -> Result<Self> {
        let demux = backend
            .open_node(dir, device, NodeKind::Demux, Access::ReadOnly)
            .map_err(|source| {
                error!("cannot access demultiplexer: {}", source);
                TunerError::NodeUnavailable {
                    kind: NodeKind::Demux,
                    adapter,
                    device,
                    source,
                }
            })?;

        if let Err(e) = demux.set_buffer_size(buffer_size) {
            warn!("cannot expand demultiplexing buffer: {}", e);
        }

        // The TS demux tap cannot be configured without at least one PID.
        let pid = if budget { sys::DMX_PID_ALL } else { 0x0000 };
        let filter = PesFilter::from_frontend(pid, sys::DMX_OUT_TSDEMUX_TAP);
        if let Err(e) = demux.set_pes_filter(&filter) {
            error!("cannot setup TS demultiplexer: {}", e);
            return Err(TunerError::DemuxSetup(e));
        }

        Ok(Self { demux, budget })
    }

    fn add_pid(&self, pid: u16) -> Result<()> {
        if self.budget || pid == 0 {
            return Ok(());
        }
        self.demux.add_pid(pid).map_err(|source| {
            error!("cannot add PID 0x{:04X}: {}", pid, source);
            TunerError::PidFilter { pid, source }
        })
    }

    fn remove_pid(&self, pid: u16) {
        if self.budget || pid == 0 {
            return;
        }
        if let Err(e) = self.demux.remove_pid(pid) {
            debug!("cannot remove PID 0x{:04X}: {}", pid, e);
        }
    }
}

struct PidSlot<N> {
    pid: u16,
    // held open until the slot is cleared
    _node: N,
}

/// Fixed-capacity table of per-PID demultiplexer descriptors.
pub(crate) struct PidTable<B: DvbBackend> {
    dir: B::Dir,
    adapter: u8,
    device: u8,
    dvr: B::Node,
    slots: Box<[Option<PidSlot<B::Node>>]>,
}

impl<B: DvbBackend> PidTable<B> {
    fn open(backend: &B, dir: &B::Dir, adapter: u8, device: u8) -> Result<Self> {
        let dir = backend.duplicate_dir(dir).map_err(|source| {
            error!("cannot duplicate adapter {} directory: {}", adapter, source);
            TunerError::AdapterUnavailable { adapter, source }
        })?;
        let dvr = backend
            .open_node(&dir, device, NodeKind::Dvr, Access::ReadOnly)
            .map_err(|source| {
                error!("cannot access DVR: {}", source);
                TunerError::NodeUnavailable {
                    kind: NodeKind::Dvr,
                    adapter,
                    device,
                    source,
                }
            })?;

        Ok(Self {
            dir,
            adapter,
            device,
            dvr,
            slots: (0..MAX_PIDS).map(|_| None).collect(),
        })
    }

    fn contains(&self, pid: u16) -> bool {
        self.slots.iter().flatten().any(|s| s.pid == pid)
    }

    fn add_pid(&mut self, backend: &B, pid: u16) -> Result<()> {
        if pid == 0 || self.contains(pid) {
            return Ok(());
        }
        let Some(free) = self.slots.iter().position(Option::is_none) else {
            error!("cannot add PID 0x{:04X}: too many PID filters", pid);
            return Err(TunerError::TooManyFilters(pid));
        };

        let node = self.open_filter(backend, pid).map_err(|source| {
            error!("cannot add PID 0x{:04X}: {}", pid, source);
            TunerError::PidFilter { pid, source }
        })?;
        self.slots[free] = Some(PidSlot { pid, _node: node });
        debug!("adapter {}: PID 0x{:04X} filtered in slot {}", self.adapter, pid, free);
        Ok(())
    }

    fn open_filter(&self, backend: &B, pid: u16) -> std::io::Result<B::Node> {
        let node = backend.open_node(&self.dir, self.device, NodeKind::Demux, Access::ReadOnly)?;
        node.set_pes_filter(&PesFilter::from_frontend(pid, sys::DMX_OUT_TS_TAP))?;
        Ok(node)
    }

    fn remove_pid(&mut self, pid: u16) {
        if let Some(slot) = self
            .slots
            .iter_mut()
            .find(|s| matches!(s, Some(s) if s.pid == pid))
        {
            *slot = None;
        }
    }

    fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
    }

    #[cfg(test)]
    pub(crate) fn pids(&self) -> impl Iterator<Item = u16> + '_ {
        self.slots.iter().flatten().map(|s| s.pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuner::mock::MockBackend;

    fn open(backend: &MockBackend, mode: FilterMode) -> FilterStrategy<MockBackend> {
        let dir = backend.open_adapter(0).unwrap();
        FilterStrategy::open(backend, &dir, 0, 0, mode, 1 << 20).unwrap()
    }

    #[test]
    fn test_budget_filter_taps_whole_stream() {
        let backend = MockBackend::default();
        let strategy = open(&backend, FilterMode::Budget);

        let state = backend.state();
        assert_eq!(state.buffer_sizes, vec![1 << 20]);
        assert_eq!(state.filters.len(), 1);
        assert_eq!(state.filters[0].1.pid, 0x2000);
        assert_eq!(state.filters[0].1.output, sys::DMX_OUT_TSDEMUX_TAP);
        assert_eq!(strategy.mode(), FilterMode::Budget);
    }

    #[test]
    fn test_shared_filter_starts_on_pat() {
        let backend = MockBackend::default();
        let _strategy = open(&backend, FilterMode::SharedFilter);
        assert_eq!(backend.state().filters[0].1.pid, 0x0000);
    }

    #[test]
    fn test_buffer_size_failure_is_not_fatal() {
        let backend = MockBackend::default();
        backend.state_mut().fail_buffer_size = true;
        let strategy = open(&backend, FilterMode::Budget);
        assert_eq!(strategy.mode(), FilterMode::Budget);
    }

    #[test]
    fn test_budget_pids_are_noops() {
        let backend = MockBackend::default();
        let mut strategy = open(&backend, FilterMode::Budget);
        let before = backend.state().open_count();

        for pid in [0u16, 0x11, 0x1FFF] {
            strategy.add_pid(&backend, pid).unwrap();
            strategy.remove_pid(pid);
        }

        let state = backend.state();
        assert_eq!(state.open_count(), before);
        assert!(state.added_pids.is_empty());
        assert!(state.removed_pids.is_empty());
    }

    #[test]
    fn test_shared_filter_adds_to_existing_filter() {
        let backend = MockBackend::default();
        let mut strategy = open(&backend, FilterMode::SharedFilter);

        strategy.add_pid(&backend, 0).unwrap();
        strategy.add_pid(&backend, 0x100).unwrap();
        strategy.remove_pid(0x100);
        strategy.remove_pid(0);

        let state = backend.state();
        assert_eq!(state.added_pids, vec![0x100]);
        assert_eq!(state.removed_pids, vec![0x100]);
    }

    #[test]
    fn test_per_pid_add_is_idempotent() {
        let backend = MockBackend::default();
        let mut strategy = open(&backend, FilterMode::PerPid);
        let before = backend.state().open_count();

        strategy.add_pid(&backend, 0x100).unwrap();
        strategy.add_pid(&backend, 0x100).unwrap();
        assert_eq!(backend.state().open_count(), before + 1);

        let filter = backend.state().filters.last().unwrap().1;
        assert_eq!(filter.pid, 0x100);
        assert_eq!(filter.output, sys::DMX_OUT_TS_TAP);
    }

    #[test]
    fn test_per_pid_remove_closes_descriptor() {
        let backend = MockBackend::default();
        let mut strategy = open(&backend, FilterMode::PerPid);
        let before = backend.state().open_count();

        strategy.add_pid(&backend, 0x200).unwrap();
        strategy.remove_pid(0x200);
        strategy.remove_pid(0x300);
        assert_eq!(backend.state().open_count(), before);

        if let FilterStrategy::PerPid(table) = &strategy {
            assert_eq!(table.pids().count(), 0);
        }
    }

    #[test]
    fn test_per_pid_table_exhaustion() {
        let backend = MockBackend::default();
        let mut strategy = open(&backend, FilterMode::PerPid);

        for pid in 1..=MAX_PIDS as u16 {
            strategy.add_pid(&backend, pid).unwrap();
        }
        let before = backend.state().open_count();

        let err = strategy.add_pid(&backend, 0x1000).unwrap_err();
        assert!(matches!(err, TunerError::TooManyFilters(0x1000)));
        assert_eq!(backend.state().open_count(), before);

        // previously added PIDs are still filtered
        strategy.add_pid(&backend, 1).unwrap();
        if let FilterStrategy::PerPid(table) = &strategy {
            assert_eq!(table.pids().count(), MAX_PIDS);
        }

        // a freed slot is reusable
        strategy.remove_pid(7);
        strategy.add_pid(&backend, 0x1000).unwrap();
    }

    #[test]
    fn test_per_pid_filter_failure_consumes_no_slot() {
        let backend = MockBackend::default();
        let mut strategy = open(&backend, FilterMode::PerPid);
        let before = backend.state().open_count();

        backend.state_mut().fail_pes_filter = true;
        let err = strategy.add_pid(&backend, 0x100).unwrap_err();
        assert!(matches!(err, TunerError::PidFilter { pid: 0x100, .. }));
        assert_eq!(backend.state().open_count(), before);

        backend.state_mut().fail_pes_filter = false;
        strategy.add_pid(&backend, 0x100).unwrap();
    }

    #[test]
    fn test_per_pid_reads_from_dvr() {
        let backend = MockBackend::default();
        let strategy = open(&backend, FilterMode::PerPid);
        assert_eq!(backend.label_of(strategy.data_node()), "dvr0");
    }
}
