//! EphemeralOS in user space: a flat filesystem on a disk image, a polled
//! IPv4 stack over a raw-frame NIC, and the login shell that drives them.

pub mod commands;
pub mod context;
pub mod dev;
pub mod fs;
pub mod net;
pub mod utils;
