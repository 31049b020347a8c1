use crate::dev::DeviceError;
use std::fmt;
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xFF; 6]);
    pub const ZERO: MacAddr = MacAddr([0; 6]);

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid MAC address: {0:?}")]
pub struct ParseMacError(String);

impl FromStr for MacAddr {
    type Err = ParseMacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = [0u8; 6];
        let mut parts = s.split([':', '-']);
        for byte in out.iter_mut() {
            let part = parts.next().ok_or_else(|| ParseMacError(s.to_string()))?;
            if part.len() != 2 {
                return Err(ParseMacError(s.to_string()));
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| ParseMacError(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(ParseMacError(s.to_string()));
        }
        Ok(MacAddr(out))
    }
}

/// Raw Ethernet frame I/O, polled. `receive_frame` never blocks.
pub trait Nic {
    fn mac(&self) -> MacAddr;

    fn link_up(&self) -> bool;

    fn send_frame(&mut self, frame: &[u8]) -> Result<(), DeviceError>;

    /// Copies the next pending frame into `buf`, returning its length.
    fn receive_frame(&mut self, buf: &mut [u8]) -> Result<Option<usize>, DeviceError>;
}

impl<T: Nic + ?Sized> Nic for Box<T> {
    fn mac(&self) -> MacAddr {
        (**self).mac()
    }

    fn link_up(&self) -> bool {
        (**self).link_up()
    }

    fn send_frame(&mut self, frame: &[u8]) -> Result<(), DeviceError> {
        (**self).send_frame(frame)
    }

    fn receive_frame(&mut self, buf: &mut [u8]) -> Result<Option<usize>, DeviceError> {
        (**self).receive_frame(buf)
    }
}

/// NIC with no cable attached: sends vanish, nothing ever arrives.
pub struct NullNic {
    mac: MacAddr,
    sent: u64,
}

impl NullNic {
    pub fn new(mac: MacAddr) -> Self {
        Self { mac, sent: 0 }
    }

    pub fn frames_sent(&self) -> u64 {
        self.sent
    }
}

impl Nic for NullNic {
    fn mac(&self) -> MacAddr {
        self.mac
    }

    fn link_up(&self) -> bool {
        false
    }

    fn send_frame(&mut self, _frame: &[u8]) -> Result<(), DeviceError> {
        self.sent += 1;
        Ok(())
    }

    fn receive_frame(&mut self, _buf: &mut [u8]) -> Result<Option<usize>, DeviceError> {
        Ok(None)
    }
}

/// Ethernet carried one frame per UDP datagram to a fixed peer, the framing
/// QEMU uses for `-netdev dgram` and `-netdev socket,udp=`.
pub struct UdpTunnelNic {
    socket: UdpSocket,
    mac: MacAddr,
}

impl UdpTunnelNic {
    pub fn open(bind: SocketAddr, peer: SocketAddr, mac: MacAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(bind)?;
        socket.connect(peer)?;
        Self::from_socket(socket, mac)
    }

    /// Wraps a socket that is already connected to the peer.
    pub fn from_socket(socket: UdpSocket, mac: MacAddr) -> io::Result<Self> {
        socket.set_nonblocking(true)?;
        Ok(Self { socket, mac })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl Nic for UdpTunnelNic {
    fn mac(&self) -> MacAddr {
        self.mac
    }

    fn link_up(&self) -> bool {
        true
    }

    fn send_frame(&mut self, frame: &[u8]) -> Result<(), DeviceError> {
        self.socket.send(frame)?;
        Ok(())
    }

    fn receive_frame(&mut self, buf: &mut [u8]) -> Result<Option<usize>, DeviceError> {
        match self.socket.recv(buf) {
            Ok(len) => Ok(Some(len)),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(None),
            // Peer not listening yet; reported on a later call after an earlier send
            Err(err) if err.kind() == io::ErrorKind::ConnectionRefused => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
