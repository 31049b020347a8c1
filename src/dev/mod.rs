//! Hardware collaborators consumed by the filesystem and the network stack.
//!
//! Each device is a small trait so the core can run against a disk image and a
//! real frame source in the emulator, or against in-memory fakes in tests.

pub mod block;
pub mod nic;
pub mod rtc;

pub use block::{BlockDevice, DiskImage, MemDisk, SECTOR_SIZE};
pub use nic::{MacAddr, Nic, NullNic, UdpTunnelNic};
pub use rtc::{DateTime, Rtc, SystemRtc};

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("sectors {lba}..{end} are outside the device ({total} sectors)")]
    OutOfRange { lba: u64, end: u64, total: u64 },
    #[error("buffer of {0} bytes is not a whole number of sectors")]
    UnalignedBuffer(usize),
    #[error("frame of {0} bytes does not fit the receive buffer")]
    FrameTooLarge(usize),
    #[error("device I/O failed")]
    Io(#[from] std::io::Error),
}
