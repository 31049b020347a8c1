use crate::fs::consts::{
    BLOCK_SIZE, DIR_ENTRIES_PER_BLOCK, DIR_ENTRY_SIZE, DIRECT_BLOCKS, INODE_SIZE, MAX_FILENAME,
    MAX_NAME_LEN,
};
use std::fmt;

pub(crate) fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

pub(crate) fn read_cstr(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

pub(crate) fn write_cstr(field: &mut [u8], value: &str) {
    field.fill(0);
    let len = value.len().min(field.len() - 1);
    field[..len].copy_from_slice(&value.as_bytes()[..len]);
}

/// Number of direct blocks a file of `size` bytes occupies.
pub fn blocks_for(size: usize) -> usize {
    size.div_ceil(BLOCK_SIZE).min(DIRECT_BLOCKS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeKind {
    Free,
    File,
    Directory,
}

impl InodeKind {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => InodeKind::File,
            2 => InodeKind::Directory,
            _ => InodeKind::Free,
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            InodeKind::Free => 0,
            InodeKind::File => 1,
            InodeKind::Directory => 2,
        }
    }
}

// Structure that represents one inode - 60 B
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inode {
    pub kind: InodeKind,             // 1 (offset 0) + 3 padding
    pub size: u32,                   // 4 (offset 4)
    pub blocks: [u32; DIRECT_BLOCKS], // 48 (offset 8..55)
    pub parent: u32,                 // 4 (offset 56)
}

impl Inode {
    pub const FREE: Inode = Inode {
        kind: InodeKind::Free,
        size: 0,
        blocks: [0; DIRECT_BLOCKS],
        parent: 0,
    };

    pub fn directory(block: u32, parent: u32) -> Self {
        let mut blocks = [0; DIRECT_BLOCKS];
        blocks[0] = block;
        Self {
            kind: InodeKind::Directory,
            size: 0,
            blocks,
            parent,
        }
    }

    pub fn is_free(&self) -> bool {
        self.kind == InodeKind::Free
    }

    pub fn is_dir(&self) -> bool {
        self.kind == InodeKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == InodeKind::File
    }

    /// Blocks this inode owns: a directory its single data block, a file
    /// as many as its size needs.
    pub fn owned_blocks(&self) -> &[u32] {
        match self.kind {
            InodeKind::Free => &[],
            InodeKind::Directory => &self.blocks[..1],
            InodeKind::File => &self.blocks[..blocks_for(self.size as usize)],
        }
    }

    pub fn serialize(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), INODE_SIZE);
        out.fill(0);
        out[0] = self.kind.raw();
        out[4..8].copy_from_slice(&self.size.to_le_bytes());
        for (i, block) in self.blocks.iter().enumerate() {
            let at = 8 + i * 4;
            out[at..at + 4].copy_from_slice(&block.to_le_bytes());
        }
        out[56..60].copy_from_slice(&self.parent.to_le_bytes());
    }

    pub fn deserialize(inp: &[u8]) -> Self {
        debug_assert_eq!(inp.len(), INODE_SIZE);
        let mut blocks = [0u32; DIRECT_BLOCKS];
        for (i, block) in blocks.iter_mut().enumerate() {
            *block = read_u32(inp, 8 + i * 4);
        }
        Self {
            kind: InodeKind::from_raw(inp[0]),
            size: read_u32(inp, 4),
            blocks,
            parent: read_u32(inp, 56),
        }
    }
}

// One directory slot - 36 B: name[28], inode u32, in_use u8, 3 padding
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: [u8; MAX_FILENAME],
    pub inode: u32,
    pub in_use: u8,
}

impl DirectoryEntry {
    pub const EMPTY: DirectoryEntry = DirectoryEntry {
        name: [0; MAX_FILENAME],
        inode: 0,
        in_use: 0,
    };

    pub fn from_name(name: &str, inode: u32) -> Result<Self, &'static str> {
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err("invalid name length");
        }
        let mut buf = [0u8; MAX_FILENAME];
        buf[..name.len()].copy_from_slice(name.as_bytes());
        Ok(Self {
            name: buf,
            inode,
            in_use: 1,
        })
    }

    /// Only an exact `1` counts; anything else is a free or corrupt slot.
    pub fn is_used(&self) -> bool {
        self.in_use == 1
    }

    pub fn name_bytes(&self) -> &[u8] {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MAX_FILENAME);
        &self.name[..end]
    }

    pub fn name_str(&self) -> &str {
        std::str::from_utf8(self.name_bytes()).unwrap_or("<invalid>")
    }

    pub fn has_printable_name(&self) -> bool {
        let name = self.name_bytes();
        !name.is_empty() && name.iter().all(|&b| (32..=126).contains(&b))
    }

    pub fn is_dot(&self) -> bool {
        matches!(self.name_bytes(), b"." | b"..")
    }

    pub fn clear(&mut self) {
        *self = Self::EMPTY;
    }

    pub fn serialize(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), DIR_ENTRY_SIZE);
        out.fill(0);
        out[0..MAX_FILENAME].copy_from_slice(&self.name);
        out[MAX_FILENAME..MAX_FILENAME + 4].copy_from_slice(&self.inode.to_le_bytes());
        out[MAX_FILENAME + 4] = self.in_use;
    }

    pub fn deserialize(inp: &[u8]) -> Self {
        debug_assert_eq!(inp.len(), DIR_ENTRY_SIZE);
        let mut name = [0u8; MAX_FILENAME];
        name.copy_from_slice(&inp[0..MAX_FILENAME]);
        Self {
            name,
            inode: read_u32(inp, MAX_FILENAME),
            in_use: inp[MAX_FILENAME + 4],
        }
    }
}

impl fmt::Debug for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_used() {
            write!(f, "DirectoryEntry(<free>)")
        } else {
            write!(f, "DirectoryEntry({}, inode={})", self.name_str(), self.inode)
        }
    }
}

/// The single data block of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryBlock {
    pub entries: [DirectoryEntry; DIR_ENTRIES_PER_BLOCK],
}

impl DirectoryBlock {
    pub fn empty() -> Self {
        Self {
            entries: [DirectoryEntry::EMPTY; DIR_ENTRIES_PER_BLOCK],
        }
    }

    /// New directory holding only `.` and `..`.
    pub fn with_dots(own: u32, parent: u32) -> Self {
        let mut block = Self::empty();
        block.insert(".", own);
        block.insert("..", parent);
        block
    }

    pub fn find(&self, name: &str) -> Option<&DirectoryEntry> {
        self.entries
            .iter()
            .find(|e| e.is_used() && e.name_bytes() == name.as_bytes())
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut DirectoryEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.is_used() && e.name_bytes() == name.as_bytes())
    }

    pub fn free_slot(&self) -> Option<usize> {
        self.entries.iter().position(|e| !e.is_used())
    }

    /// Puts `name -> inode` into the first free slot.
    pub fn insert(&mut self, name: &str, inode: u32) -> Option<usize> {
        let entry = DirectoryEntry::from_name(name, inode).ok()?;
        let slot = self.free_slot()?;
        self.entries[slot] = entry;
        Some(slot)
    }

    /// Clears the slot naming `inode`. Dots are never matched.
    pub fn remove_inode(&mut self, inode: u32) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|e| e.is_used() && !e.is_dot() && e.inode == inode)
        {
            Some(entry) => {
                entry.clear();
                true
            }
            None => false,
        }
    }

    /// Used entries other than `.` and `..`.
    pub fn children(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.iter().filter(|e| e.is_used() && !e.is_dot())
    }

    pub fn serialize(&self) -> [u8; BLOCK_SIZE] {
        let mut out = [0u8; BLOCK_SIZE];
        for (i, entry) in self.entries.iter().enumerate() {
            let at = i * DIR_ENTRY_SIZE;
            entry.serialize(&mut out[at..at + DIR_ENTRY_SIZE]);
        }
        out
    }

    pub fn deserialize(inp: &[u8]) -> Self {
        debug_assert!(inp.len() >= DIR_ENTRIES_PER_BLOCK * DIR_ENTRY_SIZE);
        let mut block = Self::empty();
        for (i, entry) in block.entries.iter_mut().enumerate() {
            let at = i * DIR_ENTRY_SIZE;
            *entry = DirectoryEntry::deserialize(&inp[at..at + DIR_ENTRY_SIZE]);
        }
        block
    }
}
