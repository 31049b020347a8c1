use crate::dev::MacAddr;
use crate::net::{NetError, NetResult};

pub const ETH_HLEN: usize = 14;
pub const ETH_DATA_LEN: usize = 1500;
pub const ETH_FRAME_LEN: usize = 1518;
pub const ETH_MIN_FRAME: usize = 60;

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub dest: MacAddr,
    pub src: MacAddr,
    pub ethertype: u16,
}

impl EthernetHeader {
    pub fn encode(&self, out: &mut [u8]) {
        out[0..6].copy_from_slice(&self.dest.octets());
        out[6..12].copy_from_slice(&self.src.octets());
        out[12..14].copy_from_slice(&self.ethertype.to_be_bytes());
    }

    pub fn decode(inp: &[u8]) -> Option<Self> {
        if inp.len() < ETH_HLEN {
            return None;
        }
        let mut dest = [0u8; 6];
        let mut src = [0u8; 6];
        dest.copy_from_slice(&inp[0..6]);
        src.copy_from_slice(&inp[6..12]);
        Some(Self {
            dest: MacAddr(dest),
            src: MacAddr(src),
            ethertype: u16::from_be_bytes([inp[12], inp[13]]),
        })
    }
}

/// Header plus payload, zero padded to the 60-byte minimum.
pub fn build_frame(header: &EthernetHeader, payload: &[u8]) -> NetResult<Vec<u8>> {
    if payload.len() > ETH_DATA_LEN {
        return Err(NetError::PayloadTooLarge(payload.len()));
    }
    let mut frame = vec![0u8; (ETH_HLEN + payload.len()).max(ETH_MIN_FRAME)];
    header.encode(&mut frame);
    frame[ETH_HLEN..ETH_HLEN + payload.len()].copy_from_slice(payload);
    Ok(frame)
}

pub fn parse_frame(frame: &[u8]) -> Option<(EthernetHeader, &[u8])> {
    let header = EthernetHeader::decode(frame)?;
    Some((header, &frame[ETH_HLEN..]))
}
