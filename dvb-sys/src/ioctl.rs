//! ioctl request wrappers.
//!
//! Requests declared `_IO` in the kernel headers take their argument by
//! value and are therefore generated with the `*_bad` macro variants.

use crate::{
    dmx_pes_filter_params, dtv_properties, dvb_diseqc_master_cmd, dvb_frontend_event,
    dvb_frontend_info,
};

const DVB_IOC_MAGIC: u8 = b'o';

// Demultiplexer
nix::ioctl_write_ptr!(dmx_set_pes_filter, DVB_IOC_MAGIC, 44, dmx_pes_filter_params);
nix::ioctl_write_int_bad!(dmx_set_buffer_size, nix::request_code_none!(DVB_IOC_MAGIC, 45));
nix::ioctl_write_ptr!(dmx_add_pid, DVB_IOC_MAGIC, 51, u16);
nix::ioctl_write_ptr!(dmx_remove_pid, DVB_IOC_MAGIC, 52, u16);

// Frontend
nix::ioctl_read!(fe_get_info, DVB_IOC_MAGIC, 61, dvb_frontend_info);
nix::ioctl_write_ptr!(fe_diseqc_send_master_cmd, DVB_IOC_MAGIC, 63, dvb_diseqc_master_cmd);
nix::ioctl_write_int_bad!(fe_diseqc_send_burst, nix::request_code_none!(DVB_IOC_MAGIC, 65));
nix::ioctl_write_int_bad!(fe_enable_high_lnb_voltage, nix::request_code_none!(DVB_IOC_MAGIC, 68));
nix::ioctl_read!(fe_read_status, DVB_IOC_MAGIC, 69, u32);
nix::ioctl_read!(fe_read_ber, DVB_IOC_MAGIC, 70, u32);
nix::ioctl_read!(fe_read_signal_strength, DVB_IOC_MAGIC, 71, u16);
nix::ioctl_read!(fe_read_snr, DVB_IOC_MAGIC, 72, u16);
nix::ioctl_read!(fe_read_uncorrected_blocks, DVB_IOC_MAGIC, 73, u32);
nix::ioctl_read!(fe_get_event, DVB_IOC_MAGIC, 78, dvb_frontend_event);
nix::ioctl_write_ptr!(fe_set_property, DVB_IOC_MAGIC, 82, dtv_properties);
