pub const FS_MAGIC: u32 = 0x4550_4853;
pub const FS_VERSION: u32 = 2;

// Disk layout, absolute sector numbers
pub const SUPERBLOCK_SECTOR: u64 = 100;
pub const INODE_TABLE_SECTOR: u64 = 101;
pub const BLOCK_BITMAP_SECTOR: u64 = 151;
pub const DATA_START_SECTOR: u64 = 201;

// Limits
pub const MAX_INODES: usize = 200;
pub const MAX_BLOCKS: usize = 512;
pub const BLOCK_SIZE: usize = 512;
pub const MAX_FILENAME: usize = 28; // on-disk field, NUL terminated
pub const MAX_NAME_LEN: usize = MAX_FILENAME - 1;
pub const MAX_FILE_SIZE: usize = 16384;
pub const DIRECT_BLOCKS: usize = 12;
pub const DIRECT_CAPACITY: usize = DIRECT_BLOCKS * BLOCK_SIZE;
pub const DIR_ENTRIES_PER_BLOCK: usize = 12;
pub const MAX_PATH_LEN: usize = 256;

pub const ROOT_INODE: u32 = 0;
pub const ROOT_BLOCK: u32 = 0;

// Record sizes (C layout, padding included)
pub const SUPERBLOCK_SIZE: usize = 192;
pub const INODE_SIZE: usize = 60;
pub const DIR_ENTRY_SIZE: usize = 36;
pub const BITMAP_BYTES: usize = MAX_BLOCKS / 8;

pub const INODE_TABLE_BYTES: usize = MAX_INODES * INODE_SIZE;
pub const INODE_TABLE_SECTORS: u64 = INODE_TABLE_BYTES.div_ceil(BLOCK_SIZE) as u64;
pub const BITMAP_SECTORS: u64 = BITMAP_BYTES.div_ceil(BLOCK_SIZE) as u64;

/// Smallest device that holds the whole volume.
pub const VOLUME_SECTORS: u64 = DATA_START_SECTOR + MAX_BLOCKS as u64;

pub const HOSTNAME_LEN: usize = 64;
pub const USERNAME_LEN: usize = 64;
pub const PASSWORD_HASH_LEN: usize = 32;

pub const DEFAULT_DIRECTORIES: [&str; 5] = ["/bin", "/home", "/tmp", "/etc", "/var"];
