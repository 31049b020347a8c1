use crate::dev::MacAddr;
use std::net::Ipv4Addr;

pub const ARP_PACKET_LEN: usize = 28;
pub const ARP_CACHE_SIZE: usize = 32;

const HTYPE_ETHERNET: u16 = 1;
const PTYPE_IPV4: u16 = 0x0800;

pub const OPER_REQUEST: u16 = 1;
pub const OPER_REPLY: u16 = 2;

// Ethernet/IPv4 ARP packet - 28 B
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpPacket {
    pub oper: u16,             // 2 (offset 6)
    pub sender_mac: MacAddr,   // 6 (offset 8)
    pub sender_ip: Ipv4Addr,   // 4 (offset 14)
    pub target_mac: MacAddr,   // 6 (offset 18)
    pub target_ip: Ipv4Addr,   // 4 (offset 24)
}

impl ArpPacket {
    pub fn request(local_mac: MacAddr, local_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Self {
        Self {
            oper: OPER_REQUEST,
            sender_mac: local_mac,
            sender_ip: local_ip,
            target_mac: MacAddr::ZERO,
            target_ip,
        }
    }

    pub fn reply_to(&self, local_mac: MacAddr) -> Self {
        Self {
            oper: OPER_REPLY,
            sender_mac: local_mac,
            sender_ip: self.target_ip,
            target_mac: self.sender_mac,
            target_ip: self.sender_ip,
        }
    }

    pub fn encode(&self) -> [u8; ARP_PACKET_LEN] {
        let mut out = [0u8; ARP_PACKET_LEN];
        out[0..2].copy_from_slice(&HTYPE_ETHERNET.to_be_bytes());
        out[2..4].copy_from_slice(&PTYPE_IPV4.to_be_bytes());
        out[4] = 6;
        out[5] = 4;
        out[6..8].copy_from_slice(&self.oper.to_be_bytes());
        out[8..14].copy_from_slice(&self.sender_mac.octets());
        out[14..18].copy_from_slice(&self.sender_ip.octets());
        out[18..24].copy_from_slice(&self.target_mac.octets());
        out[24..28].copy_from_slice(&self.target_ip.octets());
        out
    }

    /// Only Ethernet/IPv4 packets are understood.
    pub fn decode(inp: &[u8]) -> Option<Self> {
        if inp.len() < ARP_PACKET_LEN
            || u16::from_be_bytes([inp[0], inp[1]]) != HTYPE_ETHERNET
            || u16::from_be_bytes([inp[2], inp[3]]) != PTYPE_IPV4
            || inp[4] != 6
            || inp[5] != 4
        {
            return None;
        }
        let mac_at = |at: usize| {
            let mut mac = [0u8; 6];
            mac.copy_from_slice(&inp[at..at + 6]);
            MacAddr(mac)
        };
        let ip_at = |at: usize| Ipv4Addr::new(inp[at], inp[at + 1], inp[at + 2], inp[at + 3]);

        Some(Self {
            oper: u16::from_be_bytes([inp[6], inp[7]]),
            sender_mac: mac_at(8),
            sender_ip: ip_at(14),
            target_mac: mac_at(18),
            target_ip: ip_at(24),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpEntry {
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
    stamp: u64,
}

/// Fixed table of IP to MAC mappings. Every insert advances a tick; a full
/// table evicts the entry with the oldest tick.
#[derive(Debug, Clone)]
pub struct ArpCache {
    entries: [Option<ArpEntry>; ARP_CACHE_SIZE],
    tick: u64,
}

impl ArpCache {
    pub fn new() -> Self {
        Self {
            entries: [None; ARP_CACHE_SIZE],
            tick: 0,
        }
    }

    pub fn resolve(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        self.entries
            .iter()
            .flatten()
            .find(|e| e.ip == ip)
            .map(|e| e.mac)
    }

    pub fn insert(&mut self, ip: Ipv4Addr, mac: MacAddr) {
        self.tick += 1;
        let stamp = self.tick;

        if let Some(entry) = self.entries.iter_mut().flatten().find(|e| e.ip == ip) {
            entry.mac = mac;
            entry.stamp = stamp;
            return;
        }

        let slot = match self.entries.iter().position(Option::is_none) {
            Some(free) => free,
            None => self
                .entries
                .iter()
                .enumerate()
                .min_by_key(|(_, e)| e.map_or(0, |e| e.stamp))
                .map_or(0, |(i, _)| i),
        };
        self.entries[slot] = Some(ArpEntry { ip, mac, stamp });
    }

    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArpEntry> {
        self.entries.iter().flatten()
    }
}

impl Default for ArpCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac(n: u8) -> MacAddr {
        MacAddr([2, 0, 0, 0, 0, n])
    }

    fn ip(n: u8) -> Ipv4Addr {
        Ipv4Addr::new(10, 0, 2, n)
    }

    #[test]
    fn request_wire_layout() {
        let bytes = ArpPacket::request(mac(1), ip(15), ip(2)).encode();
        assert_eq!(&bytes[0..8], &[0, 1, 8, 0, 6, 4, 0, 1]);
        assert_eq!(&bytes[14..18], &[10, 0, 2, 15]);
        assert_eq!(&bytes[18..24], &[0; 6]);
        assert_eq!(&bytes[24..28], &[10, 0, 2, 2]);
    }

    #[test]
    fn reply_swaps_roles() {
        let req = ArpPacket::request(mac(9), ip(2), ip(15));
        let reply = ArpPacket::decode(&req.reply_to(mac(1)).encode()).unwrap();
        assert_eq!(reply.oper, OPER_REPLY);
        assert_eq!(reply.sender_mac, mac(1));
        assert_eq!(reply.sender_ip, ip(15));
        assert_eq!(reply.target_mac, mac(9));
        assert_eq!(reply.target_ip, ip(2));
    }

    #[test]
    fn decode_rejects_other_protocols() {
        let mut bytes = ArpPacket::request(mac(1), ip(1), ip(2)).encode();
        bytes[3] = 0xDD;
        assert!(ArpPacket::decode(&bytes).is_none());
        assert!(ArpPacket::decode(&bytes[..20]).is_none());
    }

    #[test]
    fn duplicate_ip_refreshes_in_place() {
        let mut cache = ArpCache::new();
        cache.insert(ip(1), mac(1));
        cache.insert(ip(1), mac(7));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.resolve(ip(1)), Some(mac(7)));
    }

    #[test]
    fn full_cache_evicts_oldest() {
        let mut cache = ArpCache::new();
        for n in 0..ARP_CACHE_SIZE as u8 {
            cache.insert(ip(n), mac(n));
        }
        // Refresh the first entry so the second becomes the oldest
        cache.insert(ip(0), mac(0));
        cache.insert(ip(200), mac(200));

        assert_eq!(cache.len(), ARP_CACHE_SIZE);
        assert_eq!(cache.resolve(ip(0)), Some(mac(0)));
        assert_eq!(cache.resolve(ip(1)), None);
        assert_eq!(cache.resolve(ip(200)), Some(mac(200)));
    }
}
