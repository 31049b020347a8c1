use crate::net::checksum::internet_checksum;
use crate::net::ethernet::ETH_DATA_LEN;
use crate::net::{NetError, NetResult};
use std::net::Ipv4Addr;

pub const IPV4_HEADER_LEN: usize = 20;
pub const IPV4_MAX_PAYLOAD: usize = ETH_DATA_LEN - IPV4_HEADER_LEN;

pub const PROTO_ICMP: u8 = 1;
pub const PROTO_UDP: u8 = 17;

pub const DEFAULT_TTL: u8 = 64;
const DONT_FRAGMENT: u16 = 0x4000;
const SUBNET_MASK: u32 = 0xFFFF_FF00;

// IPv4 header without options - 20 B
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    pub header_len: usize,
    pub total_len: u16,
    pub ident: u16,
    pub flags_fragment: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub src: Ipv4Addr,
    pub dest: Ipv4Addr,
}

impl Ipv4Header {
    pub fn new(src: Ipv4Addr, dest: Ipv4Addr, protocol: u8, ident: u16, payload_len: usize) -> Self {
        Self {
            header_len: IPV4_HEADER_LEN,
            total_len: (IPV4_HEADER_LEN + payload_len) as u16,
            ident,
            flags_fragment: DONT_FRAGMENT,
            ttl: DEFAULT_TTL,
            protocol,
            src,
            dest,
        }
    }

    /// Serializes with the header checksum filled in.
    pub fn encode(&self) -> [u8; IPV4_HEADER_LEN] {
        let mut out = [0u8; IPV4_HEADER_LEN];
        out[0] = 0x45;
        out[2..4].copy_from_slice(&self.total_len.to_be_bytes());
        out[4..6].copy_from_slice(&self.ident.to_be_bytes());
        out[6..8].copy_from_slice(&self.flags_fragment.to_be_bytes());
        out[8] = self.ttl;
        out[9] = self.protocol;
        out[12..16].copy_from_slice(&self.src.octets());
        out[16..20].copy_from_slice(&self.dest.octets());
        let sum = internet_checksum(&out);
        out[10..12].copy_from_slice(&sum.to_be_bytes());
        out
    }

    /// Validates version, header length, total length and checksum, and
    /// returns the header with its payload (trailing padding dropped).
    pub fn decode(packet: &[u8]) -> Result<(Self, &[u8]), &'static str> {
        if packet.len() < IPV4_HEADER_LEN {
            return Err("truncated header");
        }
        if packet[0] >> 4 != 4 {
            return Err("not IPv4");
        }
        let header_len = (packet[0] & 0x0F) as usize * 4;
        if header_len < IPV4_HEADER_LEN || header_len > packet.len() {
            return Err("bad header length");
        }
        let total_len = u16::from_be_bytes([packet[2], packet[3]]);
        if (total_len as usize) < header_len || total_len as usize > packet.len() {
            return Err("bad total length");
        }
        if internet_checksum(&packet[..header_len]) != 0 {
            return Err("bad header checksum");
        }

        let ip_at = |at: usize| Ipv4Addr::new(packet[at], packet[at + 1], packet[at + 2], packet[at + 3]);
        let header = Self {
            header_len,
            total_len,
            ident: u16::from_be_bytes([packet[4], packet[5]]),
            flags_fragment: u16::from_be_bytes([packet[6], packet[7]]),
            ttl: packet[8],
            protocol: packet[9],
            src: ip_at(12),
            dest: ip_at(16),
        };
        Ok((header, &packet[header_len..total_len as usize]))
    }
}

pub fn build_datagram(header: &Ipv4Header, payload: &[u8]) -> NetResult<Vec<u8>> {
    if payload.len() > IPV4_MAX_PAYLOAD {
        return Err(NetError::PayloadTooLarge(payload.len()));
    }
    let mut packet = Vec::with_capacity(IPV4_HEADER_LEN + payload.len());
    packet.extend_from_slice(&header.encode());
    packet.extend_from_slice(payload);
    Ok(packet)
}

/// `x.y.z.1` of the local /24.
pub fn gateway_for(local: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from((u32::from(local) & SUBNET_MASK) | 1)
}

/// Same /24 goes direct, everything else via the gateway.
pub fn next_hop(local: Ipv4Addr, dest: Ipv4Addr) -> Ipv4Addr {
    if u32::from(local) & SUBNET_MASK == u32::from(dest) & SUBNET_MASK {
        dest
    } else {
        gateway_for(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCAL: Ipv4Addr = Ipv4Addr::new(10, 0, 2, 15);

    #[test]
    fn header_fields_and_checksum() {
        let header = Ipv4Header::new(LOCAL, Ipv4Addr::new(8, 8, 8, 8), PROTO_UDP, 1, 30);
        let bytes = header.encode();
        assert_eq!(bytes[0], 0x45);
        assert_eq!(&bytes[2..4], &50u16.to_be_bytes());
        assert_eq!(&bytes[4..6], &[0, 1]);
        assert_eq!(&bytes[6..8], &[0x40, 0x00]);
        assert_eq!(bytes[8], 64);
        assert_eq!(bytes[9], 17);
        assert_eq!(internet_checksum(&bytes), 0);
    }

    #[test]
    fn decode_strips_ethernet_padding() {
        let header = Ipv4Header::new(LOCAL, LOCAL, PROTO_ICMP, 7, 4);
        let mut packet = build_datagram(&header, &[1, 2, 3, 4]).unwrap();
        packet.extend_from_slice(&[0; 10]);

        let (parsed, payload) = Ipv4Header::decode(&packet).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(payload, &[1, 2, 3, 4]);
    }

    #[test]
    fn decode_rejects_malformed() {
        let header = Ipv4Header::new(LOCAL, LOCAL, PROTO_ICMP, 7, 4);
        let good = build_datagram(&header, &[0; 4]).unwrap();

        let mut bad_version = good.clone();
        bad_version[0] = 0x65;
        assert!(Ipv4Header::decode(&bad_version).is_err());

        let mut bad_ihl = good.clone();
        bad_ihl[0] = 0x44;
        assert!(Ipv4Header::decode(&bad_ihl).is_err());

        let mut bad_sum = good.clone();
        bad_sum[8] = 1;
        assert_eq!(Ipv4Header::decode(&bad_sum).unwrap_err(), "bad header checksum");

        assert!(Ipv4Header::decode(&good[..22]).is_err());
    }

    #[test]
    fn payload_limit() {
        let header = Ipv4Header::new(LOCAL, LOCAL, PROTO_UDP, 1, 0);
        assert!(build_datagram(&header, &[0; IPV4_MAX_PAYLOAD]).is_ok());
        assert!(build_datagram(&header, &[0; IPV4_MAX_PAYLOAD + 1]).is_err());
    }

    #[test]
    fn routing_by_subnet() {
        assert_eq!(gateway_for(LOCAL), Ipv4Addr::new(10, 0, 2, 1));
        assert_eq!(next_hop(LOCAL, Ipv4Addr::new(10, 0, 2, 3)), Ipv4Addr::new(10, 0, 2, 3));
        assert_eq!(next_hop(LOCAL, Ipv4Addr::new(8, 8, 8, 8)), Ipv4Addr::new(10, 0, 2, 1));
    }
}
