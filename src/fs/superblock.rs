use crate::fs::consts::{
    FS_MAGIC, FS_VERSION, HOSTNAME_LEN, MAX_BLOCKS, MAX_INODES, PASSWORD_HASH_LEN, ROOT_INODE,
    SUPERBLOCK_SIZE, USERNAME_LEN,
};
use crate::fs::layout::{read_u32, write_cstr, read_cstr};

// Structure that represents the volume superblock - 192 B
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Superblock {
    pub magic: u32,                             // 4 (offset 0)
    pub version: u32,                           // 4 (offset 4)
    pub total_inodes: u32,                      // 4 (offset 8)
    pub total_blocks: u32,                      // 4 (offset 12)
    pub free_inodes: u32,                       // 4 (offset 16)
    pub free_blocks: u32,                       // 4 (offset 20)
    pub root_inode: u32,                        // 4 (offset 24)
    pub installed: u32,                         // 4 (offset 28)
    pub hostname: [u8; HOSTNAME_LEN],           // 64 (offset 32)
    pub username: [u8; USERNAME_LEN],           // 64 (offset 96)
    pub password_hash: [u8; PASSWORD_HASH_LEN], // 32 (offset 160)
}

impl Superblock {
    /// Freshly formatted volume: everything free, not installed.
    pub fn formatted() -> Self {
        Self {
            magic: FS_MAGIC,
            version: FS_VERSION,
            total_inodes: MAX_INODES as u32,
            total_blocks: MAX_BLOCKS as u32,
            free_inodes: MAX_INODES as u32,
            free_blocks: MAX_BLOCKS as u32,
            root_inode: ROOT_INODE,
            installed: 0,
            hostname: [0; HOSTNAME_LEN],
            username: [0; USERNAME_LEN],
            password_hash: [0; PASSWORD_HASH_LEN],
        }
    }

    pub fn is_installed(&self) -> bool {
        self.magic == FS_MAGIC && self.version == FS_VERSION && self.installed == 1
    }

    pub fn hostname(&self) -> String {
        read_cstr(&self.hostname)
    }

    pub fn username(&self) -> String {
        read_cstr(&self.username)
    }

    /// Stores the string truncated so the field stays NUL terminated.
    pub fn set_hostname(&mut self, hostname: &str) {
        write_cstr(&mut self.hostname, hostname);
    }

    pub fn set_username(&mut self, username: &str) {
        write_cstr(&mut self.username, username);
    }

    pub fn set_password(&mut self, password: &str) {
        self.password_hash = password_hash(password);
    }

    pub fn password_matches(&self, candidate: &str) -> bool {
        password_hash(candidate) == self.password_hash
    }

    pub fn serialize(&self, out: &mut [u8]) {
        debug_assert!(out.len() >= SUPERBLOCK_SIZE);
        out[0..4].copy_from_slice(&self.magic.to_le_bytes());
        out[4..8].copy_from_slice(&self.version.to_le_bytes());
        out[8..12].copy_from_slice(&self.total_inodes.to_le_bytes());
        out[12..16].copy_from_slice(&self.total_blocks.to_le_bytes());
        out[16..20].copy_from_slice(&self.free_inodes.to_le_bytes());
        out[20..24].copy_from_slice(&self.free_blocks.to_le_bytes());
        out[24..28].copy_from_slice(&self.root_inode.to_le_bytes());
        out[28..32].copy_from_slice(&self.installed.to_le_bytes());
        out[32..96].copy_from_slice(&self.hostname);
        out[96..160].copy_from_slice(&self.username);
        out[160..192].copy_from_slice(&self.password_hash);
    }

    pub fn deserialize(inp: &[u8]) -> Self {
        debug_assert!(inp.len() >= SUPERBLOCK_SIZE);
        let mut hostname = [0u8; HOSTNAME_LEN];
        hostname.copy_from_slice(&inp[32..96]);
        let mut username = [0u8; USERNAME_LEN];
        username.copy_from_slice(&inp[96..160]);
        let mut password_hash = [0u8; PASSWORD_HASH_LEN];
        password_hash.copy_from_slice(&inp[160..192]);

        Self {
            magic: read_u32(inp, 0),
            version: read_u32(inp, 4),
            total_inodes: read_u32(inp, 8),
            total_blocks: read_u32(inp, 12),
            free_inodes: read_u32(inp, 16),
            free_blocks: read_u32(inp, 20),
            root_inode: read_u32(inp, 24),
            installed: read_u32(inp, 28),
            hostname,
            username,
            password_hash,
        }
    }
}

/// djb2 over the bytes, smeared into 32 bytes. Unsalted and trivially
/// reversible; kept for on-disk compatibility only.
pub fn password_hash(password: &str) -> [u8; PASSWORD_HASH_LEN] {
    let hash = password
        .bytes()
        .fold(5381u32, |h, b| (h << 5).wrapping_add(h).wrapping_add(b as u32));

    let mut out = [0u8; PASSWORD_HASH_LEN];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = (hash >> (i % 32)) as u8;
    }
    out
}
