use crate::net::checksum::internet_checksum;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

pub const ICMP_HEADER_LEN: usize = 8;
pub const ECHO_REPLY: u8 = 0;
pub const ECHO_REQUEST: u8 = 8;
pub const PING_PAYLOAD_LEN: usize = 56;
pub const MAX_PINGS: usize = 16;

/// A slot older than this may be reused even if its reply never came.
pub const PING_STALE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoHeader {
    pub kind: u8,
    pub code: u8,
    pub ident: u16,
    pub seq: u16,
}

impl EchoHeader {
    /// Requires a valid checksum over the whole message.
    pub fn decode(message: &[u8]) -> Option<Self> {
        if message.len() < ICMP_HEADER_LEN || internet_checksum(message) != 0 {
            return None;
        }
        Some(Self {
            kind: message[0],
            code: message[1],
            ident: u16::from_be_bytes([message[4], message[5]]),
            seq: u16::from_be_bytes([message[6], message[7]]),
        })
    }
}

fn seal(message: &mut [u8]) {
    message[2..4].fill(0);
    let sum = internet_checksum(message);
    message[2..4].copy_from_slice(&sum.to_be_bytes());
}

/// Echo request carrying the 56-byte `A..Z` repeating pattern.
pub fn echo_request(ident: u16, seq: u16) -> Vec<u8> {
    let mut message = vec![0u8; ICMP_HEADER_LEN + PING_PAYLOAD_LEN];
    message[0] = ECHO_REQUEST;
    message[4..6].copy_from_slice(&ident.to_be_bytes());
    message[6..8].copy_from_slice(&seq.to_be_bytes());
    for (i, byte) in message[ICMP_HEADER_LEN..].iter_mut().enumerate() {
        *byte = b'A' + (i % 26) as u8;
    }
    seal(&mut message);
    message
}

/// The request echoed back with its type rewritten.
pub fn echo_reply_for(request: &[u8]) -> Vec<u8> {
    let mut reply = request.to_vec();
    reply[0] = ECHO_REPLY;
    reply[1] = 0;
    seal(&mut reply);
    reply
}

#[derive(Debug, Clone, Copy)]
struct PingSlot {
    ip: Ipv4Addr,
    seq: u16,
    sent: Instant,
    received: Option<Instant>,
}

/// Outstanding echo requests.
#[derive(Debug, Clone, Default)]
pub struct PingTable {
    slots: [Option<PingSlot>; MAX_PINGS],
}

impl PingTable {
    pub fn new() -> Self {
        Self::default()
    }

    // Slot preference: same (ip, seq), free, answered, stale, then oldest.
    fn pick_slot(&self, ip: Ipv4Addr, seq: u16, now: Instant) -> usize {
        let find = |pred: &dyn Fn(&Option<PingSlot>) -> bool| self.slots.iter().position(pred);

        find(&|s| s.is_some_and(|s| s.ip == ip && s.seq == seq))
            .or_else(|| find(&|s| s.is_none()))
            .or_else(|| find(&|s| s.is_some_and(|s| s.received.is_some())))
            .or_else(|| find(&|s| s.is_some_and(|s| now.duration_since(s.sent) > PING_STALE)))
            .unwrap_or_else(|| {
                self.slots
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, s)| s.map(|s| s.sent))
                    .map_or(0, |(i, _)| i)
            })
    }

    pub fn record(&mut self, ip: Ipv4Addr, seq: u16, now: Instant) {
        let slot = self.pick_slot(ip, seq, now);
        self.slots[slot] = Some(PingSlot {
            ip,
            seq,
            sent: now,
            received: None,
        });
    }

    /// Marks the outstanding request answered. Unknown replies return false.
    pub fn mark_received(&mut self, ip: Ipv4Addr, seq: u16, now: Instant) -> bool {
        match self
            .slots
            .iter_mut()
            .flatten()
            .find(|s| s.ip == ip && s.seq == seq && s.received.is_none())
        {
            Some(slot) => {
                slot.received = Some(now);
                true
            }
            None => false,
        }
    }

    pub fn round_trip(&self, ip: Ipv4Addr, seq: u16) -> Option<Duration> {
        self.slots
            .iter()
            .flatten()
            .find(|s| s.ip == ip && s.seq == seq)
            .and_then(|s| s.received.map(|at| at.duration_since(s.sent)))
    }

    pub fn outstanding(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.received.is_none())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEER: Ipv4Addr = Ipv4Addr::new(10, 0, 2, 2);

    #[test]
    fn request_layout() {
        let msg = echo_request(1234, 3);
        assert_eq!(msg.len(), 64);
        assert_eq!(msg[0], ECHO_REQUEST);
        assert_eq!(&msg[4..8], &[0x04, 0xD2, 0, 3]);
        assert_eq!(&msg[8..11], b"ABC");
        assert_eq!(msg[8 + 26], b'A');
        assert_eq!(internet_checksum(&msg), 0);

        let header = EchoHeader::decode(&msg).unwrap();
        assert_eq!((header.ident, header.seq), (1234, 3));
    }

    #[test]
    fn reply_keeps_payload_and_fixes_checksum() {
        let req = echo_request(1, 1);
        let reply = echo_reply_for(&req);
        assert_eq!(reply[0], ECHO_REPLY);
        assert_eq!(&reply[4..], &req[4..]);
        assert_eq!(EchoHeader::decode(&reply).unwrap().kind, ECHO_REPLY);
    }

    #[test]
    fn corrupted_message_is_rejected() {
        let mut msg = echo_request(1, 1);
        msg[20] ^= 0xFF;
        assert!(EchoHeader::decode(&msg).is_none());
    }

    #[test]
    fn table_tracks_replies() {
        let now = Instant::now();
        let mut table = PingTable::new();
        table.record(PEER, 1, now);
        assert_eq!(table.round_trip(PEER, 1), None);
        assert!(!table.mark_received(PEER, 2, now));
        assert!(table.mark_received(PEER, 1, now + Duration::from_millis(3)));
        assert_eq!(table.round_trip(PEER, 1), Some(Duration::from_millis(3)));
        assert!(!table.mark_received(PEER, 1, now));
    }

    #[test]
    fn full_table_reuses_answered_then_oldest() {
        let start = Instant::now();
        let mut table = PingTable::new();
        for seq in 0..MAX_PINGS as u16 {
            table.record(PEER, seq, start + Duration::from_millis(seq as u64));
        }
        table.mark_received(PEER, 5, start);

        let later = start + Duration::from_millis(100);
        table.record(PEER, 100, later);
        assert_eq!(table.round_trip(PEER, 5), None);
        assert_eq!(table.outstanding(), MAX_PINGS);

        // Nothing answered or stale: the oldest request goes
        table.record(PEER, 101, later);
        assert!(!table.mark_received(PEER, 0, later));
        assert!(table.mark_received(PEER, 101, later));
        assert!(table.mark_received(PEER, 1, later));
    }
}
