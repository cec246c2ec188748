//! Delivery system configurators.
//!
//! Each builder turns a tuning request into the ordered property set the
//! frontend expects. The units differ per system and are converted here:
//! cable, terrestrial and ATSC frequencies are given in kHz and submitted in
//! Hz, satellite frequencies are submitted as given (kHz), and the
//! terrestrial bandwidth is given in MHz and submitted in Hz.

use dvb_sys as sys;

use crate::tuner::error::{Result, TunerError};
use crate::tuner::node::DvbBackend;
use crate::tuner::props::PropertySet;
use crate::tuner::session::DvbDevice;
use crate::tuner::translate::{
    parse_fec, parse_guard, parse_hierarchy, parse_modulation, parse_transmit_mode,
    DeliverySystem, Inversion, Modulation, Pilot, Rolloff,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Delsys {
    Dvbc,
    Dvbs,
    Dvbs2,
    Dvbt,
    Atsc,
    Cqam,
}

impl Delsys {
    pub fn is_satellite(self) -> bool {
        matches!(self, Delsys::Dvbs | Delsys::Dvbs2)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CableParams {
    /// kHz
    pub frequency: u32,
    pub modulation: Option<String>,
    pub symbol_rate: u32,
    pub fec: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrestrialParams {
    /// kHz
    pub frequency: u32,
    pub modulation: Option<String>,
    pub fec_hp: Option<String>,
    pub fec_lp: Option<String>,
    /// MHz
    pub bandwidth: u32,
    /// 2, 4, 8 (k) or -1 for automatic.
    pub transmission_mode: i32,
    pub guard: Option<String>,
    /// 0, 1, 2, 4 or -1 for automatic.
    pub hierarchy: i32,
}

impl Default for TerrestrialParams {
    fn default() -> Self {
        Self {
            frequency: 0,
            modulation: None,
            fec_hp: None,
            fec_lp: None,
            bandwidth: 8,
            transmission_mode: -1,
            guard: None,
            hierarchy: -1,
        }
    }
}

/// ATSC and clear QAM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtscParams {
    /// kHz
    pub frequency: u32,
    pub modulation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SatelliteParams {
    /// Intermediate frequency, kHz.
    pub frequency: u32,
    pub modulation: Option<String>,
    pub symbol_rate: u32,
    pub fec: Option<String>,
    /// 0 off, 1 on, anything else automatic.
    pub pilot: i32,
    /// Roll-off factor in percent.
    pub rolloff: i32,
}

impl Default for SatelliteParams {
    fn default() -> Self {
        Self {
            frequency: 0,
            modulation: None,
            symbol_rate: 0,
            fec: None,
            pilot: -1,
            rolloff: 35,
        }
    }
}

fn scale(value: u32, factor: u32) -> Result<u32> {
    value
        .checked_mul(factor)
        .ok_or_else(|| TunerError::FrequencyOutOfRange(u64::from(value) * u64::from(factor)))
}

pub fn dvbc_properties(p: &CableParams) -> Result<PropertySet> {
    Ok(PropertySet::cleared()
        .with(sys::DTV_DELIVERY_SYSTEM, DeliverySystem::DvbcAnnexAc)
        .with(sys::DTV_FREQUENCY, scale(p.frequency, 1000)?)
        .with(
            sys::DTV_MODULATION,
            parse_modulation(p.modulation.as_deref(), Modulation::QamAuto),
        )
        .with(sys::DTV_SYMBOL_RATE, p.symbol_rate)
        .with(sys::DTV_INNER_FEC, parse_fec(p.fec.as_deref())))
}

pub fn dvbt_properties(p: &TerrestrialParams) -> Result<PropertySet> {
    Ok(PropertySet::cleared()
        .with(sys::DTV_DELIVERY_SYSTEM, DeliverySystem::Dvbt)
        .with(sys::DTV_FREQUENCY, scale(p.frequency, 1000)?)
        .with(
            sys::DTV_MODULATION,
            parse_modulation(p.modulation.as_deref(), Modulation::QamAuto),
        )
        .with(sys::DTV_CODE_RATE_HP, parse_fec(p.fec_hp.as_deref()))
        .with(sys::DTV_CODE_RATE_LP, parse_fec(p.fec_lp.as_deref()))
        .with(sys::DTV_BANDWIDTH_HZ, scale(p.bandwidth, 1_000_000)?)
        .with(
            sys::DTV_TRANSMISSION_MODE,
            parse_transmit_mode(p.transmission_mode),
        )
        .with(sys::DTV_GUARD_INTERVAL, parse_guard(p.guard.as_deref()))
        .with(sys::DTV_HIERARCHY, parse_hierarchy(p.hierarchy)))
}

pub fn atsc_properties(p: &AtscParams) -> Result<PropertySet> {
    Ok(PropertySet::cleared()
        .with(sys::DTV_DELIVERY_SYSTEM, DeliverySystem::Atsc)
        .with(sys::DTV_FREQUENCY, scale(p.frequency, 1000)?)
        .with(
            sys::DTV_MODULATION,
            parse_modulation(p.modulation.as_deref(), Modulation::Vsb8),
        ))
}

pub fn cqam_properties(p: &AtscParams) -> Result<PropertySet> {
    Ok(PropertySet::cleared()
        .with(sys::DTV_DELIVERY_SYSTEM, DeliverySystem::DvbcAnnexB)
        .with(sys::DTV_FREQUENCY, scale(p.frequency, 1000)?)
        .with(
            sys::DTV_MODULATION,
            parse_modulation(p.modulation.as_deref(), Modulation::QamAuto),
        ))
}

/// First generation satellite; modulation, pilot and roll-off are ignored.
pub fn dvbs_properties(p: &SatelliteParams) -> PropertySet {
    PropertySet::cleared()
        .with(sys::DTV_DELIVERY_SYSTEM, DeliverySystem::Dvbs)
        .with(sys::DTV_FREQUENCY, p.frequency)
        .with(sys::DTV_SYMBOL_RATE, p.symbol_rate)
        .with(sys::DTV_INNER_FEC, parse_fec(p.fec.as_deref()))
}

pub fn dvbs2_properties(p: &SatelliteParams) -> PropertySet {
    PropertySet::cleared()
        .with(sys::DTV_DELIVERY_SYSTEM, DeliverySystem::Dvbs2)
        .with(sys::DTV_FREQUENCY, p.frequency)
        .with(
            sys::DTV_MODULATION,
            parse_modulation(p.modulation.as_deref(), Modulation::Qpsk),
        )
        .with(sys::DTV_SYMBOL_RATE, p.symbol_rate)
        .with(sys::DTV_INNER_FEC, parse_fec(p.fec.as_deref()))
        .with(sys::DTV_PILOT, Pilot::from_config(p.pilot))
        .with(sys::DTV_ROLLOFF, Rolloff::from_percent(p.rolloff))
}

impl<B: DvbBackend> DvbDevice<B> {
    pub fn set_dvbc(&self, params: &CableParams) -> Result<()> {
        self.set_properties(&dvbc_properties(params)?)
    }

    pub fn set_dvbt(&self, params: &TerrestrialParams) -> Result<()> {
        self.set_properties(&dvbt_properties(params)?)
    }

    pub fn set_atsc(&self, params: &AtscParams) -> Result<()> {
        self.set_properties(&atsc_properties(params)?)
    }

    pub fn set_cqam(&self, params: &AtscParams) -> Result<()> {
        self.set_properties(&cqam_properties(params)?)
    }

    pub fn set_dvbs(&self, params: &SatelliteParams) -> Result<()> {
        self.set_properties(&dvbs_properties(params))
    }

    pub fn set_dvbs2(&self, params: &SatelliteParams) -> Result<()> {
        self.set_properties(&dvbs2_properties(params))
    }

    /// 0 is off, 1 is on, anything else is automatic.
    pub fn set_inversion(&self, v: i32) -> Result<()> {
        self.set_properties(&PropertySet::new().with(sys::DTV_INVERSION, Inversion::from_config(v)))
    }

    /// Starts tuning with the parameters submitted so far.
    pub fn tune(&self) -> Result<()> {
        self.set_properties(&PropertySet::new().with(sys::DTV_TUNE, 0u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DvbConfig;
    use crate::tuner::mock::MockBackend;

    #[test]
    fn test_dvbc() {
        let props = dvbc_properties(&CableParams {
            frequency: 346_000,
            modulation: Some("256QAM".to_string()),
            symbol_rate: 6_900_000,
            fec: None,
        })
        .unwrap();
        assert_eq!(
            props.as_slice(),
            &[
                (sys::DTV_CLEAR, 0),
                (sys::DTV_DELIVERY_SYSTEM, sys::SYS_DVBC_ANNEX_AC),
                (sys::DTV_FREQUENCY, 346_000_000),
                (sys::DTV_MODULATION, sys::QAM_256),
                (sys::DTV_SYMBOL_RATE, 6_900_000),
                (sys::DTV_INNER_FEC, sys::FEC_AUTO),
            ]
        );
    }

    #[test]
    fn test_dvbt_units() {
        let props = dvbt_properties(&TerrestrialParams {
            frequency: 474_000,
            fec_hp: Some("2/3".to_string()),
            bandwidth: 8,
            transmission_mode: 8,
            guard: Some("1/4".to_string()),
            hierarchy: 0,
            ..TerrestrialParams::default()
        })
        .unwrap();

        assert_eq!(props.len(), 10);
        assert_eq!(props.as_slice()[0], (sys::DTV_CLEAR, 0));
        assert_eq!(props.as_slice()[1], (sys::DTV_DELIVERY_SYSTEM, sys::SYS_DVBT));
        assert_eq!(props.get(sys::DTV_FREQUENCY), Some(474_000_000));
        assert_eq!(props.get(sys::DTV_BANDWIDTH_HZ), Some(8_000_000));
        assert_eq!(props.get(sys::DTV_MODULATION), Some(sys::QAM_AUTO));
        assert_eq!(props.get(sys::DTV_CODE_RATE_HP), Some(sys::FEC_2_3));
        assert_eq!(props.get(sys::DTV_CODE_RATE_LP), Some(sys::FEC_AUTO));
        assert_eq!(
            props.get(sys::DTV_TRANSMISSION_MODE),
            Some(sys::TRANSMISSION_MODE_8K)
        );
        assert_eq!(props.get(sys::DTV_GUARD_INTERVAL), Some(sys::GUARD_INTERVAL_1_4));
        assert_eq!(props.get(sys::DTV_HIERARCHY), Some(sys::HIERARCHY_NONE));
    }

    #[test]
    fn test_dvbt_overflow() {
        let err = dvbt_properties(&TerrestrialParams {
            frequency: 474_000,
            bandwidth: 5000,
            ..TerrestrialParams::default()
        })
        .unwrap_err();
        assert!(matches!(err, TunerError::FrequencyOutOfRange(5_000_000_000)));

        assert!(dvbc_properties(&CableParams {
            frequency: 5_000_000,
            ..CableParams::default()
        })
        .is_err());
    }

    #[test]
    fn test_atsc_and_cqam_defaults() {
        let p = AtscParams {
            frequency: 57_000,
            modulation: None,
        };
        let atsc = atsc_properties(&p).unwrap();
        assert_eq!(atsc.get(sys::DTV_DELIVERY_SYSTEM), Some(sys::SYS_ATSC));
        assert_eq!(atsc.get(sys::DTV_MODULATION), Some(sys::VSB_8));
        assert_eq!(atsc.get(sys::DTV_FREQUENCY), Some(57_000_000));

        let cqam = cqam_properties(&p).unwrap();
        assert_eq!(cqam.get(sys::DTV_DELIVERY_SYSTEM), Some(sys::SYS_DVBC_ANNEX_B));
        assert_eq!(cqam.get(sys::DTV_MODULATION), Some(sys::QAM_AUTO));
        assert_eq!(cqam.len(), 4);
    }

    #[test]
    fn test_dvbs_frequency_is_not_scaled() {
        let props = dvbs_properties(&SatelliteParams {
            frequency: 1_250_000,
            symbol_rate: 27_500_000,
            fec: Some("3/4".to_string()),
            ..SatelliteParams::default()
        });
        assert_eq!(
            props.as_slice(),
            &[
                (sys::DTV_CLEAR, 0),
                (sys::DTV_DELIVERY_SYSTEM, sys::SYS_DVBS),
                (sys::DTV_FREQUENCY, 1_250_000),
                (sys::DTV_SYMBOL_RATE, 27_500_000),
                (sys::DTV_INNER_FEC, sys::FEC_3_4),
            ]
        );
    }

    #[test]
    fn test_dvbs2_pilot_and_rolloff() {
        let mut p = SatelliteParams {
            frequency: 1_400_000,
            symbol_rate: 22_000_000,
            modulation: Some("8PSK".to_string()),
            pilot: 1,
            rolloff: 20,
            ..SatelliteParams::default()
        };
        let props = dvbs2_properties(&p);
        assert_eq!(props.len(), 8);
        assert_eq!(props.get(sys::DTV_MODULATION), Some(sys::PSK_8));
        assert_eq!(props.get(sys::DTV_PILOT), Some(sys::PILOT_ON));
        assert_eq!(props.get(sys::DTV_ROLLOFF), Some(sys::ROLLOFF_20));

        p.modulation = None;
        p.pilot = 5;
        p.rolloff = 15;
        let props = dvbs2_properties(&p);
        assert_eq!(props.get(sys::DTV_MODULATION), Some(sys::QPSK));
        assert_eq!(props.get(sys::DTV_PILOT), Some(sys::PILOT_AUTO));
        assert_eq!(props.get(sys::DTV_ROLLOFF), Some(sys::ROLLOFF_AUTO));
    }

    #[test]
    fn test_session_configurators() {
        let backend = MockBackend::default();
        let dev = DvbDevice::open(backend.clone(), &DvbConfig::default(), true).unwrap();

        dev.set_atsc(&AtscParams {
            frequency: 57_000,
            modulation: None,
        })
        .unwrap();
        dev.set_inversion(7).unwrap();
        dev.tune().unwrap();

        let state = backend.state();
        assert_eq!(state.submitted.len(), 3);
        assert_eq!(state.submitted[0][0], (sys::DTV_CLEAR, 0));
        assert_eq!(state.submitted[1], vec![(sys::DTV_INVERSION, sys::INVERSION_AUTO)]);
        assert_eq!(state.submitted[2], vec![(sys::DTV_TUNE, 0)]);
    }

    #[test]
    fn test_rejected_properties_keep_session_usable() {
        let backend = MockBackend::default();
        let dev = DvbDevice::open(backend.clone(), &DvbConfig::default(), true).unwrap();

        backend.state_mut().fail_properties = true;
        let err = dev.set_dvbc(&CableParams::default()).unwrap_err();
        assert!(matches!(err, TunerError::PropertiesRejected(_)));

        backend.state_mut().fail_properties = false;
        dev.set_dvbc(&CableParams::default()).unwrap();
        assert_eq!(backend.state().submitted.len(), 1);
    }

    #[test]
    fn test_configurators_require_frontend() {
        let backend = MockBackend::default();
        let dev = DvbDevice::open(backend, &DvbConfig::default(), false).unwrap();
        assert!(matches!(dev.tune(), Err(TunerError::NotTuning)));
    }
}
