//! Demultiplexer ABI (`<linux/dvb/dmx.h>`).

/// `enum dmx_input`
pub const DMX_IN_FRONTEND: u32 = 0;
pub const DMX_IN_DVR: u32 = 1;

/// `enum dmx_output`
pub const DMX_OUT_DECODER: u32 = 0;
pub const DMX_OUT_TAP: u32 = 1;
pub const DMX_OUT_TS_TAP: u32 = 2;
pub const DMX_OUT_TSDEMUX_TAP: u32 = 3;

/// `enum dmx_ts_pes`
pub const DMX_PES_OTHER: u32 = 20;

/// Filter flags.
pub const DMX_CHECK_CRC: u32 = 1;
pub const DMX_ONESHOT: u32 = 2;
pub const DMX_IMMEDIATE_START: u32 = 4;

/// Pseudo PID selecting the whole transport stream.
pub const DMX_PID_ALL: u16 = 0x2000;

/// `struct dmx_pes_filter_params`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct dmx_pes_filter_params {
    pub pid: u16,
    pub input: u32,
    pub output: u32,
    pub pes_type: u32,
    pub flags: u32,
}
