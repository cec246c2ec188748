//! Frontend ABI (`<linux/dvb/frontend.h>`).

/// `enum fe_type`
pub const FE_QPSK: u32 = 0;
pub const FE_QAM: u32 = 1;
pub const FE_OFDM: u32 = 2;
pub const FE_ATSC: u32 = 3;

/// `enum fe_caps` (subset)
pub const FE_CAN_INVERSION_AUTO: u32 = 0x1;
pub const FE_CAN_FEC_AUTO: u32 = 0x200;
pub const FE_CAN_QAM_AUTO: u32 = 0x10000;
pub const FE_CAN_TRANSMISSION_MODE_AUTO: u32 = 0x20000;
pub const FE_CAN_GUARD_INTERVAL_AUTO: u32 = 0x80000;
pub const FE_CAN_HIERARCHY_AUTO: u32 = 0x100000;
pub const FE_CAN_8VSB: u32 = 0x200000;
pub const FE_CAN_16VSB: u32 = 0x400000;
pub const FE_CAN_MULTISTREAM: u32 = 0x4000000;
pub const FE_CAN_2G_MODULATION: u32 = 0x10000000;

/// `enum fe_status`
pub const FE_HAS_SIGNAL: u32 = 0x01;
pub const FE_HAS_CARRIER: u32 = 0x02;
pub const FE_HAS_VITERBI: u32 = 0x04;
pub const FE_HAS_SYNC: u32 = 0x08;
pub const FE_HAS_LOCK: u32 = 0x10;
pub const FE_TIMEDOUT: u32 = 0x20;
pub const FE_REINIT: u32 = 0x40;

/// `enum fe_sec_voltage`
pub const SEC_VOLTAGE_13: u32 = 0;
pub const SEC_VOLTAGE_18: u32 = 1;
pub const SEC_VOLTAGE_OFF: u32 = 2;

/// `enum fe_sec_tone_mode`
pub const SEC_TONE_ON: u32 = 0;
pub const SEC_TONE_OFF: u32 = 1;

/// `enum fe_sec_mini_cmd`
pub const SEC_MINI_A: u32 = 0;
pub const SEC_MINI_B: u32 = 1;

/// `enum fe_spectral_inversion`
pub const INVERSION_OFF: u32 = 0;
pub const INVERSION_ON: u32 = 1;
pub const INVERSION_AUTO: u32 = 2;

/// `enum fe_code_rate`
pub const FEC_NONE: u32 = 0;
pub const FEC_1_2: u32 = 1;
pub const FEC_2_3: u32 = 2;
pub const FEC_3_4: u32 = 3;
pub const FEC_4_5: u32 = 4;
pub const FEC_5_6: u32 = 5;
pub const FEC_6_7: u32 = 6;
pub const FEC_7_8: u32 = 7;
pub const FEC_8_9: u32 = 8;
pub const FEC_AUTO: u32 = 9;
pub const FEC_3_5: u32 = 10;
pub const FEC_9_10: u32 = 11;

/// `enum fe_modulation`
pub const QPSK: u32 = 0;
pub const QAM_16: u32 = 1;
pub const QAM_32: u32 = 2;
pub const QAM_64: u32 = 3;
pub const QAM_128: u32 = 4;
pub const QAM_256: u32 = 5;
pub const QAM_AUTO: u32 = 6;
pub const VSB_8: u32 = 7;
pub const VSB_16: u32 = 8;
pub const PSK_8: u32 = 9;
pub const APSK_16: u32 = 10;
pub const APSK_32: u32 = 11;
pub const DQPSK: u32 = 12;

/// `enum fe_transmit_mode`
pub const TRANSMISSION_MODE_2K: u32 = 0;
pub const TRANSMISSION_MODE_8K: u32 = 1;
pub const TRANSMISSION_MODE_AUTO: u32 = 2;
pub const TRANSMISSION_MODE_4K: u32 = 3;

/// `enum fe_guard_interval`
pub const GUARD_INTERVAL_1_32: u32 = 0;
pub const GUARD_INTERVAL_1_16: u32 = 1;
pub const GUARD_INTERVAL_1_8: u32 = 2;
pub const GUARD_INTERVAL_1_4: u32 = 3;
pub const GUARD_INTERVAL_AUTO: u32 = 4;

/// `enum fe_hierarchy`
pub const HIERARCHY_NONE: u32 = 0;
pub const HIERARCHY_1: u32 = 1;
pub const HIERARCHY_2: u32 = 2;
pub const HIERARCHY_4: u32 = 3;
pub const HIERARCHY_AUTO: u32 = 4;

/// `enum fe_pilot`
pub const PILOT_ON: u32 = 0;
pub const PILOT_OFF: u32 = 1;
pub const PILOT_AUTO: u32 = 2;

/// `enum fe_rolloff`
pub const ROLLOFF_35: u32 = 0;
pub const ROLLOFF_20: u32 = 1;
pub const ROLLOFF_25: u32 = 2;
pub const ROLLOFF_AUTO: u32 = 3;

/// `enum fe_delivery_system`
pub const SYS_UNDEFINED: u32 = 0;
pub const SYS_DVBC_ANNEX_A: u32 = 1;
pub const SYS_DVBC_ANNEX_B: u32 = 2;
pub const SYS_DVBT: u32 = 3;
pub const SYS_DVBS: u32 = 5;
pub const SYS_DVBS2: u32 = 6;
pub const SYS_ATSC: u32 = 11;
pub const SYS_DVBC_ANNEX_AC: u32 = SYS_DVBC_ANNEX_A;

/// Property commands for `FE_SET_PROPERTY`.
pub const DTV_UNDEFINED: u32 = 0;
pub const DTV_TUNE: u32 = 1;
pub const DTV_CLEAR: u32 = 2;
pub const DTV_FREQUENCY: u32 = 3;
pub const DTV_MODULATION: u32 = 4;
pub const DTV_BANDWIDTH_HZ: u32 = 5;
pub const DTV_INVERSION: u32 = 6;
pub const DTV_SYMBOL_RATE: u32 = 8;
pub const DTV_INNER_FEC: u32 = 9;
pub const DTV_VOLTAGE: u32 = 10;
pub const DTV_TONE: u32 = 11;
pub const DTV_PILOT: u32 = 12;
pub const DTV_ROLLOFF: u32 = 13;
pub const DTV_DELIVERY_SYSTEM: u32 = 17;
pub const DTV_CODE_RATE_HP: u32 = 36;
pub const DTV_CODE_RATE_LP: u32 = 37;
pub const DTV_GUARD_INTERVAL: u32 = 38;
pub const DTV_TRANSMISSION_MODE: u32 = 39;
pub const DTV_HIERARCHY: u32 = 40;

/// Upper bound the kernel accepts for one `FE_SET_PROPERTY` call.
pub const DTV_IOCTL_MAX_MSGS: usize = 64;

/// `struct dvb_frontend_info`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct dvb_frontend_info {
    pub name: [u8; 128],
    pub type_: u32,
    pub frequency_min: u32,
    pub frequency_max: u32,
    pub frequency_stepsize: u32,
    pub frequency_tolerance: u32,
    pub symbol_rate_min: u32,
    pub symbol_rate_max: u32,
    pub symbol_rate_tolerance: u32,
    pub notifier_delay: u32,
    pub caps: u32,
}

impl Default for dvb_frontend_info {
    fn default() -> Self {
        Self {
            name: [0; 128],
            type_: 0,
            frequency_min: 0,
            frequency_max: 0,
            frequency_stepsize: 0,
            frequency_tolerance: 0,
            symbol_rate_min: 0,
            symbol_rate_max: 0,
            symbol_rate_tolerance: 0,
            notifier_delay: 0,
            caps: 0,
        }
    }
}

/// `struct dvb_frontend_parameters` (legacy API, only used inside events).
///
/// The trailing union is at most seven 32-bit words (the OFDM variant).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct dvb_frontend_parameters {
    pub frequency: u32,
    pub inversion: u32,
    pub u: [u32; 7],
}

/// `struct dvb_frontend_event`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct dvb_frontend_event {
    pub status: u32,
    pub parameters: dvb_frontend_parameters,
}

/// `struct dvb_diseqc_master_cmd`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct dvb_diseqc_master_cmd {
    pub msg: [u8; 6],
    pub msg_len: u8,
}

/// Size of the anonymous union inside `struct dtv_property`.
///
/// The largest member is the `buffer` struct, which ends in a pointer.
pub const DTV_PROPERTY_UNION_SIZE: usize = 48 + std::mem::size_of::<*const u8>();

/// `struct dtv_property` (declared `__attribute__((packed))` by the kernel).
///
/// Only the scalar `u.data` member of the union is exposed; the rest is
/// carried as opaque bytes.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct dtv_property {
    pub cmd: u32,
    pub reserved: [u32; 3],
    pub data: u32,
    pub u_rest: [u8; DTV_PROPERTY_UNION_SIZE - 4],
    pub result: i32,
}

impl dtv_property {
    pub fn new(cmd: u32, data: u32) -> Self {
        Self {
            cmd,
            reserved: [0; 3],
            data,
            u_rest: [0; DTV_PROPERTY_UNION_SIZE - 4],
            result: 0,
        }
    }
}

/// `struct dtv_properties`
#[repr(C)]
#[derive(Debug)]
pub struct dtv_properties {
    pub num: u32,
    pub props: *mut dtv_property,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_struct_sizes() {
        assert_eq!(size_of::<dvb_frontend_info>(), 168);
        assert_eq!(size_of::<dvb_frontend_event>(), 40);
        assert_eq!(size_of::<dvb_diseqc_master_cmd>(), 7);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_dtv_property_is_packed() {
        assert_eq!(size_of::<dtv_property>(), 76);
        assert_eq!(size_of::<dtv_properties>(), 16);
    }

    #[test]
    fn test_property_new_sets_scalar() {
        let prop = dtv_property::new(DTV_FREQUENCY, 474_000_000);
        let cmd = prop.cmd;
        let data = prop.data;
        assert_eq!(cmd, DTV_FREQUENCY);
        assert_eq!(data, 474_000_000);
    }
}
