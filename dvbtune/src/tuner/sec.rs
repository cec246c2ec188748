//! Satellite equipment control: LNB oscillator selection, supply voltage,
//! 22 kHz tone and DiSEqC 1.0 switch commands.

use std::thread;
use std::time::Duration;

use log::{debug, error};

use dvb_sys as sys;

use crate::tuner::error::{Result, TunerError};
use crate::tuner::node::{DeviceNode, DvbBackend};
use crate::tuner::props::PropertySet;
use crate::tuner::session::DvbDevice;
use crate::tuner::translate::{parse_polarization, MiniCmd, SecTone, SecVoltage};

const DISEQC_PRE_COMMAND: Duration = Duration::from_millis(15);
const DISEQC_POST_COMMAND: Duration = Duration::from_millis(54 + 15);
const DISEQC_POST_BURST: Duration = Duration::from_millis(15);

/// 22 kHz continuous tone override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneMode {
    Off,
    On,
    /// Tone on iff the high oscillator is selected.
    Auto,
}

impl ToneMode {
    /// 0 is off, 1 is on, anything else is automatic.
    pub fn from_config(v: i32) -> Self {
        match v {
            0 => ToneMode::Off,
            1 => ToneMode::On,
            _ => ToneMode::Auto,
        }
    }

    pub fn resolve(self, high: bool) -> SecTone {
        match self {
            ToneMode::Off => SecTone::Off,
            ToneMode::On => SecTone::On,
            ToneMode::Auto if high => SecTone::On,
            ToneMode::Auto => SecTone::Off,
        }
    }
}

/// Satellite tuning request. Frequencies are in kHz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecParams {
    pub frequency: u32,
    pub polarization: Option<char>,
    /// Low band oscillator; 0 selects the oscillators from the band table.
    pub lnb_low: u32,
    pub lnb_high: u32,
    pub lnb_switch: u32,
}

struct Band {
    min: u32,
    max: u32,
    low: u32,
    high: u32,
}

// MHz
const BANDS: &[Band] = &[
    // Ku
    Band { min: 10700, max: 13250, low: 9750, high: 10600 },
    // C (high)
    Band { min: 4500, max: 4800, low: 5950, high: 0 },
    // C (low)
    Band { min: 3400, max: 4200, low: 5150, high: 0 },
    // S
    Band { min: 2500, max: 2700, low: 3650, high: 0 },
    // L band, already converted
    Band { min: 950, max: 2150, low: 0, high: 0 },
];

/// Default `(low, high)` oscillator frequencies in kHz for a frequency in
/// kHz, or `None` outside every known band.
pub fn default_oscillators(frequency: u32) -> Option<(u32, u32)> {
    let mhz = frequency / 1000;
    BANDS
        .iter()
        .find(|b| (b.min..=b.max).contains(&mhz))
        .map(|b| (b.low * 1000, b.high * 1000))
}

/// Distance between the input frequency and the oscillator. Must fit in 31
/// bits.
pub fn intermediate_frequency(frequency: u32, oscillator: u32) -> Result<u32> {
    let diff = frequency.abs_diff(oscillator);
    if diff > i32::MAX as u32 {
        return Err(TunerError::FrequencyOutOfRange(u64::from(diff)));
    }
    Ok(diff)
}

/// DiSEqC 1.0 "Write N0" command for a committed switch.
pub fn diseqc_committed_command(satno: u32, voltage: SecVoltage, tone: SecTone) -> [u8; 4] {
    let port = (satno.wrapping_sub(1) & 3) as u8;
    [
        0xE0, // master, no reply, first transmission
        0x10, // any LNB or switch
        0x38, // write port group 0
        0xF0 | (port << 2)
            | (u8::from(voltage == SecVoltage::V18) << 1)
            | u8::from(tone == SecTone::On),
    ]
}

/// Mini-DiSEqC burst selecting the satellite on a simple A/B switch.
pub fn tone_burst(satno: u32) -> MiniCmd {
    if satno.wrapping_sub(1) & 1 == 0 {
        MiniCmd::A
    } else {
        MiniCmd::B
    }
}

impl<B: DvbBackend> DvbDevice<B> {
    /// Configures the LNB and any DiSEqC switch, then sets the intermediate
    /// frequency.
    ///
    /// Blocks for roughly 100 ms when a satellite number is configured.
    pub fn set_sec(&self, params: &SecParams) -> Result<()> {
        let frontend = self.frontend()?;
        let freq = params.frequency;

        let enable = self.sec.high_voltage;
        if let Err(e) = frontend.enable_high_lnb_voltage(enable) {
            if enable {
                error!("cannot enable high LNB voltage: {}", e);
            }
        }

        let (low, high) = if params.lnb_low == 0 {
            let (low, high) = default_oscillators(freq).unwrap_or_else(|| {
                error!("no known band for frequency {} kHz", freq);
                (0, 0)
            });
            debug!("selected LNB low: {} kHz, LNB high: {} kHz", low, high);
            (low, high)
        } else {
            (params.lnb_low, params.lnb_high)
        };

        let use_high = high != 0 && freq > params.lnb_switch;
        let if_freq = intermediate_frequency(freq, if use_high { high } else { low })?;
        let tone = self.sec.tone.resolve(use_high);

        let voltage = parse_polarization(params.polarization);
        self.set_properties(
            &PropertySet::new()
                .with(sys::DTV_TONE, SecTone::Off)
                .with(sys::DTV_VOLTAGE, voltage),
        )?;

        let satno = self.sec.satno;
        if satno > 0 {
            let cmd = diseqc_committed_command(satno, voltage, tone);
            thread::sleep(DISEQC_PRE_COMMAND);
            frontend.diseqc_send_master_cmd(&cmd).map_err(|e| {
                error!("cannot send DiSEqC command: {}", e);
                TunerError::DiseqcCommand(e)
            })?;
            thread::sleep(DISEQC_POST_COMMAND);

            frontend.diseqc_send_burst(tone_burst(satno)).map_err(|e| {
                error!("cannot send Mini-DiSEqC tone burst: {}", e);
                TunerError::ToneBurst(e)
            })?;
            thread::sleep(DISEQC_POST_BURST);
        }

        self.set_properties(
            &PropertySet::new()
                .with(sys::DTV_FREQUENCY, if_freq)
                .with(sys::DTV_TONE, tone),
        )
    }
}
