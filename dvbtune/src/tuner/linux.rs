use std::ffi::CString;
use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::time::Duration;

use dvb_sys as sys;
use dvb_sys::ioctl;

use crate::tuner::node::{
    Access, DeviceNode, DvbBackend, FrontendInfo, FrontendStatus, NodeKind, PesFilter, Readiness,
};
use crate::tuner::translate::MiniCmd;

const DVB_DEV_ROOT: &str = "/dev/dvb";

fn cvt(ret: libc::c_int) -> io::Result<libc::c_int> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

fn nix_io<T>(res: nix::Result<T>) -> io::Result<T> {
    res.map_err(io::Error::from)
}

/// Kernel character devices under `/dev/dvb`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxBackend;

/// An open `adapter<N>` directory.
#[derive(Debug)]
pub struct AdapterDir {
    fd: OwnedFd,
}

/// An open DVB device node.
#[derive(Debug)]
pub struct LinuxNode {
    file: File,
}

impl AsRawFd for LinuxNode {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl DvbBackend for LinuxBackend {
    type Dir = AdapterDir;
    type Node = LinuxNode;

    fn open_adapter(&self, adapter: u8) -> io::Result<AdapterDir> {
        let path = CString::new(format!("{}/adapter{}", DVB_DEV_ROOT, adapter))?;
        let fd = cvt(unsafe {
            libc::open(
                path.as_ptr(),
                libc::O_RDONLY | libc::O_DIRECTORY | libc::O_CLOEXEC,
            )
        })?;
        Ok(AdapterDir {
            fd: unsafe { OwnedFd::from_raw_fd(fd) },
        })
    }

    fn duplicate_dir(&self, dir: &AdapterDir) -> io::Result<AdapterDir> {
        Ok(AdapterDir {
            fd: dir.fd.try_clone()?,
        })
    }

    fn open_node(
        &self,
        dir: &AdapterDir,
        device: u8,
        kind: NodeKind,
        access: Access,
    ) -> io::Result<LinuxNode> {
        let name = CString::new(kind.file_name(device))?;
        let mode = match access {
            Access::ReadOnly => libc::O_RDONLY,
            Access::ReadWrite => libc::O_RDWR,
        };
        let fd = cvt(unsafe {
            libc::openat(dir.fd.as_raw_fd(), name.as_ptr(), mode | libc::O_CLOEXEC)
        })?;
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };

        let flags = cvt(unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETFL) })?;
        cvt(unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFL, flags | libc::O_NONBLOCK) })?;

        Ok(LinuxNode {
            file: File::from(fd),
        })
    }

    fn wait(
        &self,
        data: &LinuxNode,
        frontend: Option<&LinuxNode>,
        timeout: Duration,
    ) -> io::Result<Readiness> {
        let mut fds = [
            libc::pollfd {
                fd: data.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            },
            libc::pollfd {
                fd: -1,
                events: libc::POLLIN,
                revents: 0,
            },
        ];
        let n = match frontend {
            Some(fe) => {
                fds[1].fd = fe.as_raw_fd();
                2
            }
            None => 1,
        };
        let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

        cvt(unsafe { libc::poll(fds.as_mut_ptr(), n as libc::nfds_t, timeout_ms) })?;

        Ok(Readiness {
            data: fds[0].revents != 0,
            frontend: n == 2 && fds[1].revents != 0,
        })
    }
}

impl DeviceNode for LinuxNode {
    fn set_buffer_size(&self, size: u32) -> io::Result<()> {
        let size =
            libc::c_int::try_from(size).map_err(|_| io::Error::from(ErrorKind::InvalidInput))?;
        nix_io(unsafe { ioctl::dmx_set_buffer_size(self.as_raw_fd(), size) })?;
        Ok(())
    }

    fn set_pes_filter(&self, filter: &PesFilter) -> io::Result<()> {
        let params = sys::dmx_pes_filter_params::from(*filter);
        nix_io(unsafe { ioctl::dmx_set_pes_filter(self.as_raw_fd(), &params) })?;
        Ok(())
    }

    fn add_pid(&self, pid: u16) -> io::Result<()> {
        nix_io(unsafe { ioctl::dmx_add_pid(self.as_raw_fd(), &pid) })?;
        Ok(())
    }

    fn remove_pid(&self, pid: u16) -> io::Result<()> {
        nix_io(unsafe { ioctl::dmx_remove_pid(self.as_raw_fd(), &pid) })?;
        Ok(())
    }

    fn frontend_info(&self) -> io::Result<FrontendInfo> {
        let mut raw = sys::dvb_frontend_info::default();
        nix_io(unsafe { ioctl::fe_get_info(self.as_raw_fd(), &mut raw) })?;
        Ok(FrontendInfo::from(&raw))
    }

    fn set_properties(&self, props: &[(u32, u32)]) -> io::Result<()> {
        if props.len() > sys::DTV_IOCTL_MAX_MSGS {
            return Err(io::Error::from(ErrorKind::InvalidInput));
        }
        let mut buf: Vec<sys::dtv_property> = props
            .iter()
            .map(|&(cmd, data)| sys::dtv_property::new(cmd, data))
            .collect();
        let arg = sys::dtv_properties {
            num: buf.len() as u32,
            props: buf.as_mut_ptr(),
        };
        nix_io(unsafe { ioctl::fe_set_property(self.as_raw_fd(), &arg) })?;
        Ok(())
    }

    fn read_status(&self) -> io::Result<FrontendStatus> {
        let mut status = 0u32;
        nix_io(unsafe { ioctl::fe_read_status(self.as_raw_fd(), &mut status) })?;
        Ok(FrontendStatus(status))
    }

    fn signal_strength(&self) -> io::Result<u16> {
        let mut strength = 0u16;
        nix_io(unsafe { ioctl::fe_read_signal_strength(self.as_raw_fd(), &mut strength) })?;
        Ok(strength)
    }

    fn snr(&self) -> io::Result<u16> {
        let mut snr = 0u16;
        nix_io(unsafe { ioctl::fe_read_snr(self.as_raw_fd(), &mut snr) })?;
        Ok(snr)
    }

    fn ber(&self) -> io::Result<u32> {
        let mut ber = 0u32;
        nix_io(unsafe { ioctl::fe_read_ber(self.as_raw_fd(), &mut ber) })?;
        Ok(ber)
    }

    fn uncorrected_blocks(&self) -> io::Result<u32> {
        let mut blocks = 0u32;
        nix_io(unsafe { ioctl::fe_read_uncorrected_blocks(self.as_raw_fd(), &mut blocks) })?;
        Ok(blocks)
    }

    fn next_event(&self) -> io::Result<FrontendStatus> {
        let mut ev = sys::dvb_frontend_event::default();
        nix_io(unsafe { ioctl::fe_get_event(self.as_raw_fd(), &mut ev) })?;
        Ok(FrontendStatus(ev.status))
    }

    fn enable_high_lnb_voltage(&self, enable: bool) -> io::Result<()> {
        nix_io(unsafe {
            ioctl::fe_enable_high_lnb_voltage(self.as_raw_fd(), libc::c_int::from(enable))
        })?;
        Ok(())
    }

    fn diseqc_send_master_cmd(&self, msg: &[u8]) -> io::Result<()> {
        let mut cmd = sys::dvb_diseqc_master_cmd::default();
        if !(3..=cmd.msg.len()).contains(&msg.len()) {
            return Err(io::Error::from(ErrorKind::InvalidInput));
        }
        cmd.msg[..msg.len()].copy_from_slice(msg);
        cmd.msg_len = msg.len() as u8;
        nix_io(unsafe { ioctl::fe_diseqc_send_master_cmd(self.as_raw_fd(), &cmd) })?;
        Ok(())
    }

    fn diseqc_send_burst(&self, cmd: MiniCmd) -> io::Result<()> {
        let cmd = u32::from(cmd) as libc::c_int;
        nix_io(unsafe { ioctl::fe_diseqc_send_burst(self.as_raw_fd(), cmd) })?;
        Ok(())
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        (&self.file).read(buf)
    }
}
