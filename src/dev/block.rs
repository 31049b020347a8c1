use crate::dev::DeviceError;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

pub const SECTOR_SIZE: usize = 512;

/// Sector-addressed storage. Buffer length decides how many sectors move.
pub trait BlockDevice {
    fn sector_count(&self) -> u64;

    fn read_sectors(&mut self, lba: u64, buf: &mut [u8]) -> Result<(), DeviceError>;

    fn write_sectors(&mut self, lba: u64, buf: &[u8]) -> Result<(), DeviceError>;

    fn flush(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }
}

impl<T: BlockDevice + ?Sized> BlockDevice for Box<T> {
    fn sector_count(&self) -> u64 {
        (**self).sector_count()
    }

    fn read_sectors(&mut self, lba: u64, buf: &mut [u8]) -> Result<(), DeviceError> {
        (**self).read_sectors(lba, buf)
    }

    fn write_sectors(&mut self, lba: u64, buf: &[u8]) -> Result<(), DeviceError> {
        (**self).write_sectors(lba, buf)
    }

    fn flush(&mut self) -> Result<(), DeviceError> {
        (**self).flush()
    }
}

// Validates a transfer and returns its byte offset on the device.
fn span_offset(total: u64, lba: u64, len: usize) -> Result<u64, DeviceError> {
    if len % SECTOR_SIZE != 0 {
        return Err(DeviceError::UnalignedBuffer(len));
    }
    let end = lba + (len / SECTOR_SIZE) as u64;
    if end > total {
        return Err(DeviceError::OutOfRange { lba, end, total });
    }
    Ok(lba * SECTOR_SIZE as u64)
}

/// Disk image file on the host, grown to the requested size on open.
pub struct DiskImage {
    file: File,
    sectors: u64,
}

impl DiskImage {
    pub fn open<P: AsRef<Path>>(path: P, min_sectors: u64) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let wanted = min_sectors * SECTOR_SIZE as u64;
        let len = file.metadata()?.len();
        if len < wanted {
            file.set_len(wanted)?;
        }
        let sectors = len.max(wanted) / SECTOR_SIZE as u64;

        Ok(Self { file, sectors })
    }
}

impl BlockDevice for DiskImage {
    fn sector_count(&self) -> u64 {
        self.sectors
    }

    fn read_sectors(&mut self, lba: u64, buf: &mut [u8]) -> Result<(), DeviceError> {
        let offset = span_offset(self.sectors, lba, buf.len())?;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn write_sectors(&mut self, lba: u64, buf: &[u8]) -> Result<(), DeviceError> {
        let offset = span_offset(self.sectors, lba, buf.len())?;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(buf)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DeviceError> {
        self.file.sync_data()?;
        Ok(())
    }
}

/// RAM-backed disk, zero-filled.
#[derive(Clone)]
pub struct MemDisk {
    data: Vec<u8>,
}

impl MemDisk {
    pub fn new(sectors: u64) -> Self {
        Self {
            data: vec![0u8; sectors as usize * SECTOR_SIZE],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl BlockDevice for MemDisk {
    fn sector_count(&self) -> u64 {
        (self.data.len() / SECTOR_SIZE) as u64
    }

    fn read_sectors(&mut self, lba: u64, buf: &mut [u8]) -> Result<(), DeviceError> {
        let offset = span_offset(self.sector_count(), lba, buf.len())? as usize;
        buf.copy_from_slice(&self.data[offset..offset + buf.len()]);
        Ok(())
    }

    fn write_sectors(&mut self, lba: u64, buf: &[u8]) -> Result<(), DeviceError> {
        let offset = span_offset(self.sector_count(), lba, buf.len())? as usize;
        self.data[offset..offset + buf.len()].copy_from_slice(buf);
        Ok(())
    }
}
