pub const NTP_PORT: u16 = 123;
pub const NTP_PACKET_LEN: usize = 48;

/// Seconds from 1900-01-01 to 1970-01-01.
pub const NTP_TIMESTAMP_DELTA: u32 = 2_208_988_800;

const NTP_VERSION: u8 = 4;
const MODE_CLIENT: u8 = 3;
const MODE_SERVER: u8 = 4;
const TRANSMIT_OFFSET: usize = 40;

/// Client request with `local_unix` in the transmit timestamp.
pub fn encode_request(local_unix: u32) -> [u8; NTP_PACKET_LEN] {
    let mut packet = [0u8; NTP_PACKET_LEN];
    packet[0] = (NTP_VERSION << 3) | MODE_CLIENT;
    let secs = local_unix.wrapping_add(NTP_TIMESTAMP_DELTA);
    packet[TRANSMIT_OFFSET..TRANSMIT_OFFSET + 4].copy_from_slice(&secs.to_be_bytes());
    packet
}

/// Unix seconds from a server-mode reply's transmit timestamp.
pub fn parse_reply(packet: &[u8]) -> Option<u32> {
    if packet.len() < NTP_PACKET_LEN || packet[0] & 0x07 != MODE_SERVER {
        return None;
    }
    let secs = u32::from_be_bytes([
        packet[TRANSMIT_OFFSET],
        packet[TRANSMIT_OFFSET + 1],
        packet[TRANSMIT_OFFSET + 2],
        packet[TRANSMIT_OFFSET + 3],
    ]);
    (secs > NTP_TIMESTAMP_DELTA).then(|| secs - NTP_TIMESTAMP_DELTA)
}
