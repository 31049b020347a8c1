use crate::net::{NetError, NetResult};
use std::net::Ipv4Addr;

pub const UDP_HEADER_LEN: usize = 8;
pub const MAX_UDP_HANDLERS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    pub src_port: u16,
    pub dest_port: u16,
    pub length: u16,
}

impl UdpHeader {
    /// Returns the header and the payload bounded by the length field.
    pub fn decode(datagram: &[u8]) -> Option<(Self, &[u8])> {
        if datagram.len() < UDP_HEADER_LEN {
            return None;
        }
        let length = u16::from_be_bytes([datagram[4], datagram[5]]);
        if (length as usize) < UDP_HEADER_LEN || length as usize > datagram.len() {
            return None;
        }
        let header = Self {
            src_port: u16::from_be_bytes([datagram[0], datagram[1]]),
            dest_port: u16::from_be_bytes([datagram[2], datagram[3]]),
            length,
        };
        Some((header, &datagram[UDP_HEADER_LEN..length as usize]))
    }
}

/// Header plus payload. The checksum field stays zero (unused).
pub fn build_datagram(src_port: u16, dest_port: u16, payload: &[u8]) -> Vec<u8> {
    let length = (UDP_HEADER_LEN + payload.len()) as u16;
    let mut out = Vec::with_capacity(length as usize);
    out.extend_from_slice(&src_port.to_be_bytes());
    out.extend_from_slice(&dest_port.to_be_bytes());
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(payload);
    out
}

/// Called with the sender address, sender port and payload.
pub type UdpCallback = Box<dyn FnMut(Ipv4Addr, u16, &[u8])>;

pub(crate) enum UdpHandler {
    Dns,
    Ntp,
    Callback(UdpCallback),
}

/// Port to handler bindings, at most [`MAX_UDP_HANDLERS`].
#[derive(Default)]
pub(crate) struct HandlerTable {
    slots: Vec<(u16, UdpHandler)>,
}

impl HandlerTable {
    /// Rebinding a port replaces its handler without using another slot.
    pub fn register(&mut self, port: u16, handler: UdpHandler) -> NetResult<()> {
        if let Some(slot) = self.slots.iter_mut().find(|(p, _)| *p == port) {
            slot.1 = handler;
            return Ok(());
        }
        if self.slots.len() >= MAX_UDP_HANDLERS {
            return Err(NetError::HandlerTableFull);
        }
        self.slots.push((port, handler));
        Ok(())
    }

    pub fn get_mut(&mut self, port: u16) -> Option<&mut UdpHandler> {
        self.slots
            .iter_mut()
            .find(|(p, _)| *p == port)
            .map(|(_, h)| h)
    }

    pub fn ports(&self) -> impl Iterator<Item = u16> + '_ {
        self.slots.iter().map(|(p, _)| *p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datagram_layout() {
        let dgram = build_datagram(12345, 53, b"abc");
        assert_eq!(&dgram[0..2], &12345u16.to_be_bytes());
        assert_eq!(&dgram[2..4], &53u16.to_be_bytes());
        assert_eq!(&dgram[4..6], &11u16.to_be_bytes());
        assert_eq!(&dgram[6..8], &[0, 0]);

        let (header, payload) = UdpHeader::decode(&dgram).unwrap();
        assert_eq!(header.dest_port, 53);
        assert_eq!(payload, b"abc");
    }

    #[test]
    fn decode_checks_length_field() {
        let mut dgram = build_datagram(1, 2, b"abcd");
        dgram[5] = 40;
        assert!(UdpHeader::decode(&dgram).is_none());
        dgram[5] = 4;
        assert!(UdpHeader::decode(&dgram).is_none());
        assert!(UdpHeader::decode(&dgram[..7]).is_none());
    }

    #[test]
    fn table_fills_up() {
        let mut table = HandlerTable::default();
        for port in 0..MAX_UDP_HANDLERS as u16 {
            table.register(1000 + port, UdpHandler::Ntp).unwrap();
        }
        assert!(matches!(
            table.register(9999, UdpHandler::Dns),
            Err(NetError::HandlerTableFull)
        ));
        table.register(1000, UdpHandler::Dns).unwrap();
        assert!(matches!(table.get_mut(1000), Some(UdpHandler::Dns)));
        assert!(table.get_mut(9999).is_none());
        assert_eq!(table.ports().count(), MAX_UDP_HANDLERS);
    }
}
