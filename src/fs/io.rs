use crate::dev::{BlockDevice, DeviceError, SECTOR_SIZE};
use crate::fs::bitmap::BlockBitmap;
use crate::fs::consts::{
    BITMAP_BYTES, BITMAP_SECTORS, BLOCK_BITMAP_SECTOR, BLOCK_SIZE, DATA_START_SECTOR, INODE_SIZE,
    INODE_TABLE_BYTES, INODE_TABLE_SECTOR, INODE_TABLE_SECTORS, MAX_INODES, SUPERBLOCK_SECTOR,
};
use crate::fs::layout::Inode;
use crate::fs::superblock::Superblock;

fn block_sector(block: u32) -> u64 {
    DATA_START_SECTOR + block as u64
}

pub fn read_block<D: BlockDevice + ?Sized>(
    dev: &mut D,
    block: u32,
    buf: &mut [u8; BLOCK_SIZE],
) -> Result<(), DeviceError> {
    dev.read_sectors(block_sector(block), buf)
}

pub fn write_block<D: BlockDevice + ?Sized>(
    dev: &mut D,
    block: u32,
    buf: &[u8; BLOCK_SIZE],
) -> Result<(), DeviceError> {
    dev.write_sectors(block_sector(block), buf)
}

pub fn zero_block<D: BlockDevice + ?Sized>(dev: &mut D, block: u32) -> Result<(), DeviceError> {
    write_block(dev, block, &[0u8; BLOCK_SIZE])
}

pub fn read_superblock<D: BlockDevice + ?Sized>(dev: &mut D) -> Result<Superblock, DeviceError> {
    let mut sector = [0u8; SECTOR_SIZE];
    dev.read_sectors(SUPERBLOCK_SECTOR, &mut sector)?;
    Ok(Superblock::deserialize(&sector))
}

pub fn write_superblock<D: BlockDevice + ?Sized>(
    dev: &mut D,
    sb: &Superblock,
) -> Result<(), DeviceError> {
    let mut sector = [0u8; SECTOR_SIZE];
    sb.serialize(&mut sector);
    dev.write_sectors(SUPERBLOCK_SECTOR, &sector)
}

pub fn read_inode_table<D: BlockDevice + ?Sized>(dev: &mut D) -> Result<Vec<Inode>, DeviceError> {
    let mut span = vec![0u8; INODE_TABLE_SECTORS as usize * SECTOR_SIZE];
    dev.read_sectors(INODE_TABLE_SECTOR, &mut span)?;
    Ok(span[..INODE_TABLE_BYTES]
        .chunks_exact(INODE_SIZE)
        .map(Inode::deserialize)
        .collect())
}

pub fn write_inode_table<D: BlockDevice + ?Sized>(
    dev: &mut D,
    inodes: &[Inode],
) -> Result<(), DeviceError> {
    debug_assert_eq!(inodes.len(), MAX_INODES);
    let mut span = vec![0u8; INODE_TABLE_SECTORS as usize * SECTOR_SIZE];
    for (inode, out) in inodes.iter().zip(span.chunks_exact_mut(INODE_SIZE)) {
        inode.serialize(out);
    }
    dev.write_sectors(INODE_TABLE_SECTOR, &span)
}

pub fn read_bitmap<D: BlockDevice + ?Sized>(dev: &mut D) -> Result<BlockBitmap, DeviceError> {
    let mut span = vec![0u8; BITMAP_SECTORS as usize * SECTOR_SIZE];
    dev.read_sectors(BLOCK_BITMAP_SECTOR, &mut span)?;
    Ok(BlockBitmap::from_bytes(&span[..BITMAP_BYTES]))
}

pub fn write_bitmap<D: BlockDevice + ?Sized>(
    dev: &mut D,
    bitmap: &BlockBitmap,
) -> Result<(), DeviceError> {
    let mut span = vec![0u8; BITMAP_SECTORS as usize * SECTOR_SIZE];
    span[..BITMAP_BYTES].copy_from_slice(bitmap.as_bytes());
    dev.write_sectors(BLOCK_BITMAP_SECTOR, &span)
}
