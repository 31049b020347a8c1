//! Minimal IPv4 stack over raw Ethernet frames: ARP, ICMP echo, UDP and the
//! DNS and NTP clients built on it. Everything is polled; nothing runs in the
//! background.

pub mod arp;
pub mod checksum;
pub mod dns;
pub mod ethernet;
pub mod icmp;
pub mod ipv4;
pub mod ntp;
pub mod stack;
pub mod udp;

use crate::dev::DeviceError;
use std::net::Ipv4Addr;
use std::time::Duration;

pub use stack::NetworkStack;

#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("timed out waiting for a reply")]
    Timeout,

    #[error("could not resolve address")]
    ResolutionFailure,

    #[error("payload of {0} bytes exceeds the MTU")]
    PayloadTooLarge(usize),

    #[error("UDP handler table is full")]
    HandlerTableFull,

    #[error("NIC error: {0}")]
    Device(#[from] DeviceError),
}

pub type NetResult<T> = Result<T, NetError>;

/// Addressing and wait budgets. Defaults match QEMU user networking.
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub local_ip: Ipv4Addr,
    pub dns_server: Ipv4Addr,
    pub ntp_server: Ipv4Addr,
    pub arp_retries: u32,
    pub arp_interval: Duration,
    /// Sleep between polls when no frame was waiting.
    pub poll_interval: Duration,
    pub dns_timeout: Duration,
    pub ntp_timeout: Duration,
    pub ping_timeout: Duration,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            local_ip: Ipv4Addr::new(10, 0, 2, 15),
            dns_server: Ipv4Addr::new(8, 8, 8, 8),
            ntp_server: Ipv4Addr::new(8, 8, 8, 8),
            arp_retries: 10,
            arp_interval: Duration::from_millis(100),
            poll_interval: Duration::from_millis(1),
            dns_timeout: Duration::from_secs(5),
            ntp_timeout: Duration::from_secs(5),
            ping_timeout: Duration::from_secs(1),
        }
    }
}
