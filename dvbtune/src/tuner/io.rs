use std::io;
use std::io::ErrorKind;

use log::{debug, error};

use crate::tuner::node::{DeviceNode, DvbBackend};
use crate::tuner::session::DvbDevice;

/// Result of one [`DvbDevice::read`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Data(usize),
    /// The stream ended or the demultiplexer failed; stop reading.
    EndOfStream,
    /// Nothing available yet; call again.
    Retry,
}

impl ReadOutcome {
    /// `n`, `0` or `-1`.
    pub fn as_raw(self) -> isize {
        match self {
            ReadOutcome::Data(n) => n as isize,
            ReadOutcome::EndOfStream => 0,
            ReadOutcome::Retry => -1,
        }
    }
}

#[cfg(unix)]
fn is_overflow(e: &io::Error) -> bool {
    e.raw_os_error() == Some(libc::EOVERFLOW)
}

#[cfg(not(unix))]
fn is_overflow(_e: &io::Error) -> bool {
    false
}

impl<B: DvbBackend> DvbDevice<B> {
    /// Waits for transport stream data, handling at most one frontend event
    /// on the way.
    pub fn read(&self, buf: &mut [u8]) -> ReadOutcome {
        let data = self.filter.data_node();
        let ready = match self
            .backend
            .wait(data, self.frontend.as_ref(), self.read_timeout)
        {
            Ok(ready) => ready,
            Err(e) => {
                debug!("cannot poll: {}", e);
                return ReadOutcome::Retry;
            }
        };

        if let (true, Some(frontend)) = (ready.frontend, self.frontend.as_ref()) {
            match frontend.next_event() {
                Ok(status) => debug!("frontend status: {}", status),
                Err(e) if is_overflow(&e) => {
                    error!("cannot dequeue events fast enough!");
                    return ReadOutcome::Retry;
                }
                Err(e) => {
                    error!("cannot dequeue frontend event: {}", e);
                    return ReadOutcome::EndOfStream;
                }
            }
        }

        if !ready.data {
            return ReadOutcome::Retry;
        }

        match data.read(buf) {
            Ok(0) => ReadOutcome::EndOfStream,
            Ok(n) => ReadOutcome::Data(n),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                ReadOutcome::Retry
            }
            Err(e) if is_overflow(&e) => {
                error!("cannot demux data fast enough!");
                ReadOutcome::Retry
            }
            Err(e) => {
                error!("cannot demux: {}", e);
                ReadOutcome::EndOfStream
            }
        }
    }
}
