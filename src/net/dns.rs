use crate::net::{NetError, NetResult};
use std::net::Ipv4Addr;

pub const DNS_PORT: u16 = 53;
pub const DNS_CLIENT_PORT: u16 = 12345;
pub const DNS_HEADER_LEN: usize = 12;

const FLAG_QR: u16 = 0x8000;
const FLAG_RD: u16 = 0x0100;
const TYPE_A: u16 = 1;
const CLASS_IN: u16 = 1;
const MAX_LABEL: usize = 63;

/// Four groups of one to three digits, each at most 255.
pub fn parse_dotted(name: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut groups = name.split('.');
    for octet in octets.iter_mut() {
        let group = groups.next()?;
        if group.is_empty() || group.len() > 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = group.parse().ok()?;
    }
    if groups.next().is_some() {
        return None;
    }
    Some(Ipv4Addr::from(octets))
}

/// Single type-A, class-IN question with recursion desired.
pub fn encode_query(id: u16, name: &str) -> NetResult<Vec<u8>> {
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() {
        return Err(NetError::ResolutionFailure);
    }

    let mut query = Vec::with_capacity(DNS_HEADER_LEN + name.len() + 6);
    query.extend_from_slice(&id.to_be_bytes());
    query.extend_from_slice(&FLAG_RD.to_be_bytes());
    query.extend_from_slice(&1u16.to_be_bytes()); // qdcount
    query.extend_from_slice(&[0; 6]); // an, ns, ar

    for label in name.split('.') {
        if label.is_empty() || label.len() > MAX_LABEL {
            return Err(NetError::ResolutionFailure);
        }
        query.push(label.len() as u8);
        query.extend_from_slice(label.as_bytes());
    }
    query.push(0);
    query.extend_from_slice(&TYPE_A.to_be_bytes());
    query.extend_from_slice(&CLASS_IN.to_be_bytes());
    Ok(query)
}

// Skips an encoded name. A compression pointer ends the name.
fn skip_name(msg: &[u8], mut pos: usize) -> Option<usize> {
    loop {
        let len = *msg.get(pos)? as usize;
        if len == 0 {
            return Some(pos + 1);
        }
        if len & 0xC0 == 0xC0 {
            return (pos + 2 <= msg.len()).then_some(pos + 2);
        }
        pos += len + 1;
    }
}

fn read_u16(msg: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes([*msg.get(at)?, *msg.get(at + 1)?]))
}

/// First type-A answer of a response to query `id`.
pub fn parse_response(msg: &[u8], id: u16) -> Option<Ipv4Addr> {
    if msg.len() < DNS_HEADER_LEN || read_u16(msg, 0)? != id {
        return None;
    }
    if read_u16(msg, 2)? & FLAG_QR == 0 {
        return None;
    }
    let qdcount = read_u16(msg, 4)?;
    let ancount = read_u16(msg, 6)?;

    let mut pos = DNS_HEADER_LEN;
    for _ in 0..qdcount {
        pos = skip_name(msg, pos)? + 4;
    }

    for _ in 0..ancount {
        pos = skip_name(msg, pos)?;
        let rtype = read_u16(msg, pos)?;
        let rdlength = read_u16(msg, pos + 8)? as usize;
        pos += 10;
        if rtype == TYPE_A && rdlength == 4 {
            let rdata = msg.get(pos..pos + 4)?;
            let addr = Ipv4Addr::new(rdata[0], rdata[1], rdata[2], rdata[3]);
            if !addr.is_unspecified() {
                return Some(addr);
            }
        }
        pos += rdlength;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    // Response for example.com: a CNAME first, then an A record, both
    // using compression pointers back to the question.
    fn response(id: u16) -> Vec<u8> {
        let mut msg = encode_query(id, "example.com").unwrap();
        msg[2] = 0x81;
        msg[3] = 0x80;
        msg[7] = 2; // ancount

        msg.extend_from_slice(&[0xC0, 0x0C, 0, 5, 0, 1, 0, 0, 0, 60, 0, 2, 0xC0, 0x0C]);
        msg.extend_from_slice(&[0xC0, 0x0C, 0, 1, 0, 1, 0, 0, 0, 60, 0, 4, 93, 184, 216, 34]);
        msg
    }

    #[test]
    fn dotted_quads() {
        assert_eq!(parse_dotted("8.8.8.8"), Some(Ipv4Addr::new(8, 8, 8, 8)));
        assert_eq!(parse_dotted("10.0.2.15"), Some(Ipv4Addr::new(10, 0, 2, 15)));
        assert_eq!(parse_dotted("256.1.1.1"), None);
        assert_eq!(parse_dotted("1.2.3"), None);
        assert_eq!(parse_dotted("1.2.3.4.5"), None);
        assert_eq!(parse_dotted("1..3.4"), None);
        assert_eq!(parse_dotted("example.com"), None);
    }

    #[test]
    fn query_encoding() {
        let q = encode_query(0x1234, "www.example.com").unwrap();
        assert_eq!(&q[0..4], &[0x12, 0x34, 0x01, 0x00]);
        assert_eq!(&q[4..6], &[0, 1]);
        assert_eq!(&q[12..16], b"\x03www");
        assert_eq!(&q[16..24], b"\x07example");
        assert_eq!(&q[24..29], b"\x03com\x00");
        assert_eq!(&q[29..], &[0, 1, 0, 1]);
        assert_eq!(encode_query(1, "example.com.").unwrap(), encode_query(1, "example.com").unwrap());
    }

    #[test]
    fn query_rejects_bad_labels() {
        assert!(encode_query(1, "").is_err());
        assert!(encode_query(1, "a..b").is_err());
        assert!(encode_query(1, &"x".repeat(64)).is_err());
    }

    #[test]
    fn finds_a_record_after_cname() {
        assert_eq!(parse_response(&response(7), 7), Some(Ipv4Addr::new(93, 184, 216, 34)));
    }

    #[test]
    fn ignores_wrong_id_and_queries() {
        assert_eq!(parse_response(&response(7), 8), None);
        let query = encode_query(7, "example.com").unwrap();
        assert_eq!(parse_response(&query, 7), None);
    }

    #[test]
    fn truncated_answer_is_rejected() {
        let msg = response(7);
        assert_eq!(parse_response(&msg[..msg.len() - 2], 7), None);
    }
}
