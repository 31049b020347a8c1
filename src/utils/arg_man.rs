use crate::dev::MacAddr;
use crate::net::NetConfig;
use clap::Parser;
use log::LevelFilter;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "ephos-emu", version)]
#[command(about = "EphemeralOS emulator: flat filesystem on a disk image plus a polled IPv4 stack")]
pub struct Args {
    /// Disk image backing the volume, created and grown as needed
    #[arg(default_value = "ephos.img")]
    pub image: PathBuf,

    /// Local IPv4 address
    #[arg(long, default_value_t = Ipv4Addr::new(10, 0, 2, 15))]
    pub ip: Ipv4Addr,

    /// NIC hardware address
    #[arg(long, default_value = "52:54:00:12:34:56")]
    pub mac: MacAddr,

    #[arg(long, default_value_t = Ipv4Addr::new(8, 8, 8, 8))]
    pub dns: Ipv4Addr,

    #[arg(long, default_value_t = Ipv4Addr::new(8, 8, 8, 8))]
    pub ntp: Ipv4Addr,

    /// ARP requests sent before a next hop is given up on
    #[arg(long, default_value_t = 10)]
    pub arp_retries: u32,

    #[arg(long, value_name = "MS", default_value_t = 5000)]
    pub dns_timeout: u64,

    #[arg(long, value_name = "MS", default_value_t = 5000)]
    pub ntp_timeout: u64,

    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub ping_timeout: u64,

    /// Local end of the Ethernet-over-UDP tunnel
    #[arg(long, value_name = "ADDR", requires = "tunnel_peer")]
    pub tunnel_bind: Option<SocketAddr>,

    /// Remote end of the tunnel, e.g. a QEMU `-netdev dgram` socket
    #[arg(long, value_name = "ADDR", requires = "tunnel_bind")]
    pub tunnel_peer: Option<SocketAddr>,

    /// off, error, warn, info, debug or trace
    #[arg(short, long, default_value_t = LevelFilter::Warn)]
    pub log_level: LevelFilter,
}

impl Args {
    pub fn net_config(&self) -> NetConfig {
        NetConfig {
            local_ip: self.ip,
            dns_server: self.dns,
            ntp_server: self.ntp,
            arp_retries: self.arp_retries,
            dns_timeout: Duration::from_millis(self.dns_timeout),
            ntp_timeout: Duration::from_millis(self.ntp_timeout),
            ping_timeout: Duration::from_millis(self.ping_timeout),
            ..NetConfig::default()
        }
    }
}

impl Args {
    /// Both tunnel ends, when a tunnel was requested.
    pub fn tunnel(&self) -> Option<(SocketAddr, SocketAddr)> {
        self.tunnel_bind.zip(self.tunnel_peer)
    }
}

pub fn handle_prog_args() -> Args {
    Args::parse()
}
