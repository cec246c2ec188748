//! Raw Linux DVB API version 5 definitions.
//!
//! This crate mirrors the parts of `<linux/dvb/frontend.h>` and
//! `<linux/dvb/dmx.h>` needed to drive a tuner: enumeration values,
//! the structures passed through `ioctl(2)`, and thin `nix` wrappers for
//! the ioctl requests themselves.
//!
//! Nothing here is safe to call without a valid descriptor; higher level
//! crates are expected to wrap these in an owned handle.

#![allow(non_camel_case_types)]

pub mod dmx;
pub mod frontend;

#[cfg(target_os = "linux")]
pub mod ioctl;

pub use dmx::*;
pub use frontend::*;
