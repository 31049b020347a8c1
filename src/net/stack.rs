use crate::dev::{MacAddr, Nic};
use crate::net::arp::{ArpCache, ArpPacket, OPER_REQUEST};
use crate::net::dns::{self, DNS_CLIENT_PORT, DNS_PORT};
use crate::net::ethernet::{
    ETH_FRAME_LEN, ETHERTYPE_ARP, ETHERTYPE_IPV4, EthernetHeader, build_frame, parse_frame,
};
use crate::net::icmp::{self, ECHO_REPLY, ECHO_REQUEST, EchoHeader, PingTable};
use crate::net::ipv4::{self, Ipv4Header, PROTO_ICMP, PROTO_UDP};
use crate::net::ntp::{self, NTP_PORT};
use crate::net::udp::{self, HandlerTable, UdpHandler, UdpHeader};
use crate::net::{NetConfig, NetError, NetResult};
use log::{debug, trace, warn};
use std::net::Ipv4Addr;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct DnsClient {
    next_id: u16,
    pending: Option<u16>,
    answer: Option<Ipv4Addr>,
}

#[derive(Debug, Default)]
struct NtpClient {
    waiting: bool,
    answer: Option<u32>,
}

/// One host's view of the network: a NIC plus all protocol state.
pub struct NetworkStack<N: Nic> {
    nic: N,
    config: NetConfig,
    arp: ArpCache,
    pings: PingTable,
    udp: HandlerTable,
    ip_ident: u16,
    dns: DnsClient,
    ntp: NtpClient,
}

impl<N: Nic> NetworkStack<N> {
    pub fn new(nic: N, config: NetConfig) -> Self {
        let mut udp = HandlerTable::default();
        // An empty table always has room for the two built-in clients
        let _ = udp.register(DNS_CLIENT_PORT, UdpHandler::Dns);
        let _ = udp.register(NTP_PORT, UdpHandler::Ntp);
        debug!(
            "network up: {} at {} (link {})",
            config.local_ip,
            nic.mac(),
            if nic.link_up() { "up" } else { "down" }
        );

        Self {
            nic,
            config,
            arp: ArpCache::new(),
            pings: PingTable::new(),
            udp,
            ip_ident: 1,
            dns: DnsClient {
                next_id: 1,
                ..DnsClient::default()
            },
            ntp: NtpClient::default(),
        }
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    pub fn nic(&self) -> &N {
        &self.nic
    }

    pub fn nic_mut(&mut self) -> &mut N {
        &mut self.nic
    }

    pub fn mac(&self) -> MacAddr {
        self.nic.mac()
    }

    pub fn link_up(&self) -> bool {
        self.nic.link_up()
    }

    pub fn local_ip(&self) -> Ipv4Addr {
        self.config.local_ip
    }

    pub fn arp_cache(&self) -> &ArpCache {
        &self.arp
    }

    pub fn udp_ports(&self) -> Vec<u16> {
        self.udp.ports().collect()
    }

    pub fn send_frame(&mut self, dest: MacAddr, ethertype: u16, payload: &[u8]) -> NetResult<()> {
        let header = EthernetHeader {
            dest,
            src: self.nic.mac(),
            ethertype,
        };
        let frame = build_frame(&header, payload)?;
        self.nic.send_frame(&frame)?;
        trace!("tx {} bytes to {dest} type {ethertype:#06x}", frame.len());
        Ok(())
    }

    /// Processes at most one pending frame. Returns whether one was waiting.
    pub fn pump(&mut self) -> NetResult<bool> {
        let mut buf = [0u8; ETH_FRAME_LEN];
        match self.nic.receive_frame(&mut buf)? {
            Some(len) => {
                self.handle_frame(&buf[..len])?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn handle_frame(&mut self, frame: &[u8]) -> NetResult<()> {
        let Some((header, payload)) = parse_frame(frame) else {
            debug!("dropping runt frame of {} bytes", frame.len());
            return Ok(());
        };
        match header.ethertype {
            ETHERTYPE_ARP => self.handle_arp(payload),
            ETHERTYPE_IPV4 => self.handle_ipv4(payload),
            other => {
                trace!("ignoring ethertype {other:#06x}");
                Ok(())
            }
        }
    }

    // ARP

    pub fn arp_resolve(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        self.arp.resolve(ip)
    }

    pub fn arp_send_request(&mut self, ip: Ipv4Addr) -> NetResult<()> {
        let request = ArpPacket::request(self.nic.mac(), self.config.local_ip, ip);
        debug!("ARP who-has {ip} tell {}", self.config.local_ip);
        self.send_frame(MacAddr::BROADCAST, ETHERTYPE_ARP, &request.encode())
    }

    fn handle_arp(&mut self, payload: &[u8]) -> NetResult<()> {
        let Some(packet) = ArpPacket::decode(payload) else {
            debug!("dropping malformed ARP packet");
            return Ok(());
        };
        if !packet.sender_ip.is_unspecified() {
            self.arp.insert(packet.sender_ip, packet.sender_mac);
        }
        if packet.oper == OPER_REQUEST && packet.target_ip == self.config.local_ip {
            debug!("ARP reply to {} ({})", packet.sender_ip, packet.sender_mac);
            let reply = packet.reply_to(self.nic.mac());
            self.send_frame(packet.sender_mac, ETHERTYPE_ARP, &reply.encode())?;
        }
        Ok(())
    }

    // Resolves the link address, asking once and polling up to the retry
    // budget on a cache miss.
    fn link_address(&mut self, dest: Ipv4Addr) -> NetResult<MacAddr> {
        if dest.is_broadcast() {
            return Ok(MacAddr::BROADCAST);
        }
        let hop = ipv4::next_hop(self.config.local_ip, dest);
        if let Some(mac) = self.arp.resolve(hop) {
            return Ok(mac);
        }

        self.arp_send_request(hop)?;
        for _ in 0..self.config.arp_retries {
            thread::sleep(self.config.arp_interval);
            self.pump()?;
            if let Some(mac) = self.arp.resolve(hop) {
                return Ok(mac);
            }
        }
        warn!("no ARP reply from {hop}, dropping datagram for {dest}");
        Err(NetError::ResolutionFailure)
    }

    // IPv4

    pub fn send_ip(&mut self, dest: Ipv4Addr, protocol: u8, payload: &[u8]) -> NetResult<()> {
        let header = Ipv4Header::new(
            self.config.local_ip,
            dest,
            protocol,
            self.ip_ident,
            payload.len(),
        );
        let packet = ipv4::build_datagram(&header, payload)?;

        let mac = self.link_address(dest)?;
        self.send_frame(mac, ETHERTYPE_IPV4, &packet)?;
        // Dropped datagrams do not consume an identification
        self.ip_ident = self.ip_ident.wrapping_add(1);
        Ok(())
    }

    fn handle_ipv4(&mut self, packet: &[u8]) -> NetResult<()> {
        let (header, payload) = match Ipv4Header::decode(packet) {
            Ok(parsed) => parsed,
            Err(reason) => {
                warn!("dropping IPv4 packet: {reason}");
                return Ok(());
            }
        };
        if header.dest != self.config.local_ip && !header.dest.is_broadcast() {
            trace!("IPv4 for {} is not ours", header.dest);
            return Ok(());
        }
        match header.protocol {
            PROTO_ICMP => self.handle_icmp(header.src, payload),
            PROTO_UDP => self.handle_udp(header.src, payload),
            other => {
                trace!("ignoring IP protocol {other}");
                Ok(())
            }
        }
    }

    // ICMP

    pub fn send_echo_request(&mut self, dest: Ipv4Addr, ident: u16, seq: u16) -> NetResult<()> {
        self.pings.record(dest, seq, Instant::now());
        self.send_ip(dest, PROTO_ICMP, &icmp::echo_request(ident, seq))
    }

    /// Pumps frames until the echo reply for `seq` arrives, returning the
    /// round-trip time.
    pub fn wait_reply(&mut self, dest: Ipv4Addr, seq: u16, timeout: Duration) -> NetResult<Duration> {
        self.poll_until(timeout, |s| s.pings.round_trip(dest, seq))?
            .ok_or(NetError::Timeout)
    }

    fn handle_icmp(&mut self, src: Ipv4Addr, message: &[u8]) -> NetResult<()> {
        let Some(header) = EchoHeader::decode(message) else {
            warn!("dropping ICMP message from {src}: bad checksum or length");
            return Ok(());
        };
        match header.kind {
            ECHO_REQUEST => {
                debug!("echo request from {src} seq {}", header.seq);
                match self.send_ip(src, PROTO_ICMP, &icmp::echo_reply_for(message)) {
                    Err(NetError::ResolutionFailure) => Ok(()),
                    other => other,
                }
            }
            ECHO_REPLY => {
                if !self.pings.mark_received(src, header.seq, Instant::now()) {
                    debug!("unsolicited echo reply from {src} seq {}", header.seq);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    // UDP

    pub fn register_handler<F>(&mut self, port: u16, callback: F) -> NetResult<()>
    where
        F: FnMut(Ipv4Addr, u16, &[u8]) + 'static,
    {
        self.udp.register(port, UdpHandler::Callback(Box::new(callback)))
    }

    pub fn send_udp(
        &mut self,
        dest: Ipv4Addr,
        src_port: u16,
        dest_port: u16,
        payload: &[u8],
    ) -> NetResult<()> {
        self.send_ip(dest, PROTO_UDP, &udp::build_datagram(src_port, dest_port, payload))
    }

    fn handle_udp(&mut self, src: Ipv4Addr, datagram: &[u8]) -> NetResult<()> {
        let Some((header, payload)) = UdpHeader::decode(datagram) else {
            debug!("dropping malformed UDP datagram from {src}");
            return Ok(());
        };
        let Some(handler) = self.udp.get_mut(header.dest_port) else {
            trace!("no handler on UDP port {}", header.dest_port);
            return Ok(());
        };

        match handler {
            UdpHandler::Dns => {
                if let Some(id) = self.dns.pending {
                    match dns::parse_response(payload, id) {
                        Some(addr) => self.dns.answer = Some(addr),
                        None => debug!("ignoring DNS datagram from {src}"),
                    }
                }
            }
            UdpHandler::Ntp => {
                if self.ntp.waiting {
                    match ntp::parse_reply(payload) {
                        Some(unix) => self.ntp.answer = Some(unix),
                        None => debug!("ignoring NTP datagram from {src}"),
                    }
                }
            }
            UdpHandler::Callback(callback) => callback(src, header.src_port, payload),
        }
        Ok(())
    }

    // DNS

    /// Dotted quads are parsed locally; anything else is one A query to the
    /// configured server.
    pub fn resolve_host(&mut self, name: &str) -> NetResult<Ipv4Addr> {
        if let Some(addr) = dns::parse_dotted(name) {
            return Ok(addr);
        }

        let id = self.dns.next_id;
        self.dns.next_id = id.wrapping_add(1);
        let query = dns::encode_query(id, name)?;

        self.dns.pending = Some(id);
        self.dns.answer = None;
        let server = self.config.dns_server;
        let result = self
            .send_udp(server, DNS_CLIENT_PORT, DNS_PORT, &query)
            .and_then(|()| self.poll_until(self.config.dns_timeout, |s| s.dns.answer));
        self.dns.pending = None;

        let addr = result?.ok_or(NetError::Timeout)?;
        debug!("{name} resolved to {addr}");
        Ok(addr)
    }

    // NTP

    /// Asks the configured server for the time, sending `local_unix` as the
    /// transmit timestamp.
    pub fn sync_time(&mut self, local_unix: u32) -> NetResult<u32> {
        self.ntp.waiting = true;
        self.ntp.answer = None;
        let server = self.config.ntp_server;
        let packet = ntp::encode_request(local_unix);
        let result = self
            .send_udp(server, NTP_PORT, NTP_PORT, &packet)
            .and_then(|()| self.poll_until(self.config.ntp_timeout, |s| s.ntp.answer));
        self.ntp.waiting = false;

        result?.ok_or(NetError::Timeout)
    }

    fn poll_until<T>(
        &mut self,
        timeout: Duration,
        done: impl Fn(&Self) -> Option<T>,
    ) -> NetResult<Option<T>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(value) = done(self) {
                return Ok(Some(value));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            if !self.pump()? {
                self.idle();
            }
        }
    }

    fn idle(&self) {
        if self.config.poll_interval.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(self.config.poll_interval);
        }
    }
}
