//! Configuration vocabulary to Linux DVB enumerations.
//!
//! Every table here is sorted by key and searched with a binary search.
//! Lookups never fail: a missing or unknown key yields the caller's default.

use dvb_sys as sys;

macro_rules! dtv_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum $name {
            $($variant = $value),+
        }

        impl From<$name> for u32 {
            fn from(v: $name) -> u32 {
                v as u32
            }
        }
    };
}

dtv_enum! {
    /// Delivery system submitted as `DTV_DELIVERY_SYSTEM`.
    DeliverySystem {
        DvbcAnnexAc = sys::SYS_DVBC_ANNEX_AC,
        DvbcAnnexB = sys::SYS_DVBC_ANNEX_B,
        Dvbt = sys::SYS_DVBT,
        Dvbs = sys::SYS_DVBS,
        Dvbs2 = sys::SYS_DVBS2,
        Atsc = sys::SYS_ATSC,
    }
}

dtv_enum! {
    Modulation {
        Qpsk = sys::QPSK,
        Qam16 = sys::QAM_16,
        Qam32 = sys::QAM_32,
        Qam64 = sys::QAM_64,
        Qam128 = sys::QAM_128,
        Qam256 = sys::QAM_256,
        QamAuto = sys::QAM_AUTO,
        Vsb8 = sys::VSB_8,
        Vsb16 = sys::VSB_16,
        Psk8 = sys::PSK_8,
        Apsk16 = sys::APSK_16,
        Apsk32 = sys::APSK_32,
        Dqpsk = sys::DQPSK,
    }
}

dtv_enum! {
    /// Inner FEC code rate.
    CodeRate {
        Fec1_2 = sys::FEC_1_2,
        Fec2_3 = sys::FEC_2_3,
        Fec3_4 = sys::FEC_3_4,
        Fec4_5 = sys::FEC_4_5,
        Fec5_6 = sys::FEC_5_6,
        Fec6_7 = sys::FEC_6_7,
        Fec7_8 = sys::FEC_7_8,
        Fec8_9 = sys::FEC_8_9,
        Fec9_10 = sys::FEC_9_10,
        Auto = sys::FEC_AUTO,
    }
}

dtv_enum! {
    TransmitMode {
        Mode2K = sys::TRANSMISSION_MODE_2K,
        Mode4K = sys::TRANSMISSION_MODE_4K,
        Mode8K = sys::TRANSMISSION_MODE_8K,
        Auto = sys::TRANSMISSION_MODE_AUTO,
    }
}

dtv_enum! {
    GuardInterval {
        Guard1_4 = sys::GUARD_INTERVAL_1_4,
        Guard1_8 = sys::GUARD_INTERVAL_1_8,
        Guard1_16 = sys::GUARD_INTERVAL_1_16,
        Guard1_32 = sys::GUARD_INTERVAL_1_32,
        Auto = sys::GUARD_INTERVAL_AUTO,
    }
}

dtv_enum! {
    Hierarchy {
        None = sys::HIERARCHY_NONE,
        Hierarchy1 = sys::HIERARCHY_1,
        Hierarchy2 = sys::HIERARCHY_2,
        Hierarchy4 = sys::HIERARCHY_4,
        Auto = sys::HIERARCHY_AUTO,
    }
}

dtv_enum! {
    /// LNB supply voltage; selects the polarization.
    SecVoltage {
        V13 = sys::SEC_VOLTAGE_13,
        V18 = sys::SEC_VOLTAGE_18,
        Off = sys::SEC_VOLTAGE_OFF,
    }
}

dtv_enum! {
    /// 22 kHz continuous tone.
    SecTone {
        On = sys::SEC_TONE_ON,
        Off = sys::SEC_TONE_OFF,
    }
}

dtv_enum! {
    /// Mini-DiSEqC tone burst.
    MiniCmd {
        A = sys::SEC_MINI_A,
        B = sys::SEC_MINI_B,
    }
}

dtv_enum! {
    Pilot {
        On = sys::PILOT_ON,
        Off = sys::PILOT_OFF,
        Auto = sys::PILOT_AUTO,
    }
}

dtv_enum! {
    Rolloff {
        R35 = sys::ROLLOFF_35,
        R20 = sys::ROLLOFF_20,
        R25 = sys::ROLLOFF_25,
        Auto = sys::ROLLOFF_AUTO,
    }
}

dtv_enum! {
    Inversion {
        Off = sys::INVERSION_OFF,
        On = sys::INVERSION_ON,
        Auto = sys::INVERSION_AUTO,
    }
}

/// Maps an integer key through a sorted table.
pub fn lookup_int<T: Copy>(key: i32, table: &[(i32, T)], default: T) -> T {
    table
        .binary_search_by(|(k, _)| k.cmp(&key))
        .map(|i| table[i].1)
        .unwrap_or(default)
}

/// Maps a string key through a sorted table. Comparison is bytewise and
/// therefore case-sensitive.
pub fn lookup_str<T: Copy>(key: Option<&str>, table: &[(&str, T)], default: T) -> T {
    key.and_then(|key| table.binary_search_by(|(k, _)| (*k).cmp(key)).ok())
        .map(|i| table[i].1)
        .unwrap_or(default)
}

const MODULATIONS: &[(&str, Modulation)] = &[
    ("128QAM", Modulation::Qam128),
    ("16APSK", Modulation::Apsk16),
    ("16QAM", Modulation::Qam16),
    ("16VSB", Modulation::Vsb16),
    ("256QAM", Modulation::Qam256),
    ("32APSK", Modulation::Apsk32),
    ("32QAM", Modulation::Qam32),
    ("64QAM", Modulation::Qam64),
    ("8PSK", Modulation::Psk8),
    ("8VSB", Modulation::Vsb8),
    ("DQPSK", Modulation::Dqpsk),
    ("QAM", Modulation::QamAuto),
    ("QPSK", Modulation::Qpsk),
];

const CODE_RATES: &[(&str, CodeRate)] = &[
    ("", CodeRate::Auto),
    ("1/2", CodeRate::Fec1_2),
    ("2/3", CodeRate::Fec2_3),
    ("3/4", CodeRate::Fec3_4),
    ("4/5", CodeRate::Fec4_5),
    ("5/6", CodeRate::Fec5_6),
    ("6/7", CodeRate::Fec6_7),
    ("7/8", CodeRate::Fec7_8),
    ("8/9", CodeRate::Fec8_9),
    ("9/10", CodeRate::Fec9_10),
];

const TRANSMIT_MODES: &[(i32, TransmitMode)] = &[
    (-1, TransmitMode::Auto),
    (2, TransmitMode::Mode2K),
    (4, TransmitMode::Mode4K),
    (8, TransmitMode::Mode8K),
];

const GUARD_INTERVALS: &[(&str, GuardInterval)] = &[
    ("", GuardInterval::Auto),
    ("1/16", GuardInterval::Guard1_16),
    ("1/32", GuardInterval::Guard1_32),
    ("1/4", GuardInterval::Guard1_4),
    ("1/8", GuardInterval::Guard1_8),
];

const HIERARCHIES: &[(i32, Hierarchy)] = &[
    (-1, Hierarchy::Auto),
    (0, Hierarchy::None),
    (1, Hierarchy::Hierarchy1),
    (2, Hierarchy::Hierarchy2),
    (4, Hierarchy::Hierarchy4),
];

const POLARIZATIONS: &[(i32, SecVoltage)] = &[
    (0, SecVoltage::Off),
    ('H' as i32, SecVoltage::V18),
    ('L' as i32, SecVoltage::V18),
    ('R' as i32, SecVoltage::V13),
    ('V' as i32, SecVoltage::V13),
];

pub fn parse_modulation(s: Option<&str>, default: Modulation) -> Modulation {
    lookup_str(s, MODULATIONS, default)
}

/// An absent or empty rate means automatic.
pub fn parse_fec(s: Option<&str>) -> CodeRate {
    lookup_str(s, CODE_RATES, CodeRate::Auto)
}

/// `-1` or any unknown value means automatic.
pub fn parse_transmit_mode(i: i32) -> TransmitMode {
    lookup_int(i, TRANSMIT_MODES, TransmitMode::Auto)
}

pub fn parse_guard(s: Option<&str>) -> GuardInterval {
    lookup_str(s, GUARD_INTERVALS, GuardInterval::Auto)
}

pub fn parse_hierarchy(i: i32) -> Hierarchy {
    lookup_int(i, HIERARCHIES, Hierarchy::Auto)
}

/// Horizontal and left-hand circular use 18 V, vertical and right-hand
/// circular use 13 V. No polarization switches the LNB supply off.
pub fn parse_polarization(pol: Option<char>) -> SecVoltage {
    let key = pol.map(|c| c as i32).unwrap_or(0);
    lookup_int(key, POLARIZATIONS, SecVoltage::Off)
}

impl Pilot {
    /// 0 is off, 1 is on, anything else is automatic.
    pub fn from_config(v: i32) -> Self {
        match v {
            0 => Pilot::Off,
            1 => Pilot::On,
            _ => Pilot::Auto,
        }
    }
}

impl Rolloff {
    /// Roll-off factor in percent; unknown factors are automatic.
    pub fn from_percent(v: i32) -> Self {
        match v {
            20 => Rolloff::R20,
            25 => Rolloff::R25,
            35 => Rolloff::R35,
            _ => Rolloff::Auto,
        }
    }
}

impl Inversion {
    /// 0 is off, 1 is on, anything else is automatic.
    pub fn from_config(v: i32) -> Self {
        match v {
            0 => Inversion::Off,
            1 => Inversion::On,
            _ => Inversion::Auto,
        }
    }
}
