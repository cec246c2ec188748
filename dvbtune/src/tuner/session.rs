//! Tuner sessions.

use std::time::Duration;

use log::{debug, error, info};

use crate::config::DvbConfig;
use crate::tuner::delsys::Delsys;
use crate::tuner::error::{Result, TunerError};
use crate::tuner::filter::{FilterMode, FilterStrategy};
use crate::tuner::node::{
    Access, DeviceNode, DvbBackend, FrontendInfo, FrontendStatus, FrontendType, NodeKind,
};
use crate::tuner::props::PropertySet;
use crate::tuner::sec::ToneMode;

/// Satellite equipment settings taken from the configuration at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SecSettings {
    pub high_voltage: bool,
    pub tone: ToneMode,
    pub satno: u32,
}

/// An open DVB adapter.
///
/// Owns every descriptor it opened. Dropping the session closes the per-PID
/// filters, the conditional access node, the frontend and finally the data
/// node, in that order.
pub struct DvbDevice<B: DvbBackend> {
    pub(crate) backend: B,
    adapter: u8,
    device: u8,
    pub(crate) filter: FilterStrategy<B>,
    pub(crate) frontend: Option<B::Node>,
    ca: Option<B::Node>,
    info: Option<FrontendInfo>,
    pub(crate) sec: SecSettings,
    pub(crate) read_timeout: Duration,
}

impl<B: DvbBackend> DvbDevice<B> {
    /// Opens the adapter and device named in `config`.
    ///
    /// Without `tune` only the data path is opened. With `tune` the frontend
    /// is opened and identified as well, and the conditional access node is
    /// opened if present.
    pub fn open(backend: B, config: &DvbConfig, tune: bool) -> Result<Self> {
        let adapter = config.adapter;
        let device = config.device;

        let dir = backend.open_adapter(adapter).map_err(|source| {
            error!("cannot access adapter {}: {}", adapter, source);
            TunerError::AdapterUnavailable { adapter, source }
        })?;

        let filter = FilterStrategy::open(
            &backend,
            &dir,
            adapter,
            device,
            config.filter_mode(),
            config.buffer_size,
        )?;

        let mut dev = Self {
            backend,
            adapter,
            device,
            filter,
            frontend: None,
            ca: None,
            info: None,
            sec: SecSettings {
                high_voltage: config.high_voltage,
                tone: config.tone_mode(),
                satno: config.satno,
            },
            read_timeout: config.read_timeout(),
        };

        if tune {
            let frontend = dev
                .backend
                .open_node(&dir, device, NodeKind::Frontend, Access::ReadWrite)
                .map_err(|source| {
                    error!(
                        "cannot access frontend {} of adapter {}: {}",
                        device, adapter, source
                    );
                    TunerError::NodeUnavailable {
                        kind: NodeKind::Frontend,
                        adapter,
                        device,
                        source,
                    }
                })?;

            let info = frontend.frontend_info().map_err(|e| {
                error!("cannot get frontend info: {}", e);
                TunerError::FrontendInfo(e)
            })?;
            debug!("using frontend: {}", info.name);
            debug!(" type {}, capabilities 0x{:08X}", info.type_, info.caps);

            dev.frontend = Some(frontend);
            dev.info = Some(info);

            match dev.backend.open_node(&dir, device, NodeKind::Ca, Access::ReadWrite) {
                Ok(ca) => dev.ca = Some(ca),
                Err(e) => debug!("conditional access module not available ({})", e),
            }
        }

        info!(
            "adapter {} device {} opened ({:?}{})",
            adapter,
            device,
            dev.filter.mode(),
            if dev.frontend.is_some() { ", tuning" } else { "" }
        );
        Ok(dev)
    }

    /// Closes the session. Equivalent to dropping it.
    pub fn close(self) {}

    pub fn adapter(&self) -> u8 {
        self.adapter
    }

    pub fn device(&self) -> u8 {
        self.device
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.filter.mode()
    }

    pub fn is_tuning(&self) -> bool {
        self.frontend.is_some()
    }

    pub fn has_ca(&self) -> bool {
        self.ca.is_some()
    }

    /// Capability snapshot read when the frontend was opened.
    pub fn frontend_info(&self) -> Option<&FrontendInfo> {
        self.info.as_ref()
    }

    pub(crate) fn frontend(&self) -> Result<&B::Node> {
        self.frontend.as_ref().ok_or(TunerError::NotTuning)
    }

    /// Picks the delivery system matching the frontend hardware class.
    pub fn guess_system(&self) -> Result<Delsys> {
        let info = self.info.as_ref().ok_or(TunerError::NotTuning)?;
        match info.frontend_type() {
            FrontendType::Satellite => Ok(Delsys::Dvbs),
            FrontendType::Cable => Ok(Delsys::Dvbc),
            FrontendType::Terrestrial => Ok(Delsys::Dvbt),
            FrontendType::Atsc => Ok(Delsys::Atsc),
            FrontendType::Unknown(t) => Err(TunerError::UnsupportedFrontend(t)),
        }
    }

    /// Signal strength in `[0, 1]`; 0 when it cannot be read.
    pub fn signal_strength(&self) -> f32 {
        self.frontend
            .as_ref()
            .and_then(|fe| fe.signal_strength().ok())
            .map_or(0.0, normalize)
    }

    /// Signal to noise ratio in `[0, 1]`; 0 when it cannot be read.
    pub fn snr(&self) -> f32 {
        self.frontend
            .as_ref()
            .and_then(|fe| fe.snr().ok())
            .map_or(0.0, normalize)
    }

    /// Bit error rate as reported by the driver; 0 when it cannot be read.
    pub fn ber(&self) -> u32 {
        self.frontend
            .as_ref()
            .and_then(|fe| fe.ber().ok())
            .unwrap_or(0)
    }

    pub fn uncorrected_blocks(&self) -> u32 {
        self.frontend
            .as_ref()
            .and_then(|fe| fe.uncorrected_blocks().ok())
            .unwrap_or(0)
    }

    pub fn status(&self) -> Result<FrontendStatus> {
        let status = self.frontend()?.read_status().map_err(|e| {
            debug!("cannot read frontend status: {}", e);
            TunerError::FrontendStatus(e)
        })?;
        Ok(status)
    }

    pub fn add_pid(&mut self, pid: u16) -> Result<()> {
        self.filter.add_pid(&self.backend, pid)
    }

    pub fn remove_pid(&mut self, pid: u16) {
        self.filter.remove_pid(pid)
    }

    /// Submits `props` to the frontend in one request.
    pub(crate) fn set_properties(&self, props: &PropertySet) -> Result<()> {
        let frontend = self.frontend()?;
        for &(cmd, value) in props.as_slice() {
            debug!("setting property {} to {}", cmd, value);
        }
        frontend.set_properties(props.as_slice()).map_err(|e| {
            error!("cannot set frontend tuning parameters: {}", e);
            TunerError::PropertiesRejected(e)
        })
    }
}

impl<B: DvbBackend> Drop for DvbDevice<B> {
    fn drop(&mut self) {
        self.filter.release_pids();
        self.ca.take();
        self.frontend.take();
        debug!("adapter {} device {} closed", self.adapter, self.device);
    }
}

fn normalize(raw: u16) -> f32 {
    f32::from(raw) / 65535.0
}
