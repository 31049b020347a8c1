use crate::dev::BlockDevice;
use crate::fs::bitmap::BlockBitmap;
use crate::fs::consts::{
    BLOCK_SIZE, DEFAULT_DIRECTORIES, DIRECT_BLOCKS, DIRECT_CAPACITY, MAX_BLOCKS, MAX_FILE_SIZE,
    MAX_INODES, MAX_NAME_LEN, ROOT_BLOCK, ROOT_INODE,
};
use crate::fs::error::{FsError, FsResult};
use crate::fs::io;
use crate::fs::layout::{DirectoryBlock, Inode, InodeKind, blocks_for};
use crate::fs::path::{self, components, split_parent};
use crate::fs::superblock::Superblock;
use log::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    pub name: String,
    pub is_dir: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InodeInfo {
    pub index: u32,
    pub kind: InodeKind,
    pub size: u32,
    pub blocks: Vec<u32>,
    pub parent: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStats {
    pub total_inodes: u32,
    pub free_inodes: u32,
    pub total_blocks: u32,
    pub free_blocks: u32,
    pub directories: u32,
    pub files: u32,
}

/// The mounted volume. Superblock, inode table and bitmap live in memory and
/// are written back by every mutating operation before it returns.
pub struct FileSystem<D: BlockDevice> {
    dev: D,
    sb: Superblock,
    inodes: Vec<Inode>,
    bitmap: BlockBitmap,
}

fn validate_name(name: &str) -> FsResult<()> {
    if name.is_empty()
        || name.len() > MAX_NAME_LEN
        || name == "."
        || name == ".."
        || name.bytes().any(|b| b == 0)
    {
        return Err(FsError::InvalidName);
    }
    Ok(())
}

impl<D: BlockDevice> FileSystem<D> {
    /// Loads the on-disk structures as they are. An unformatted device
    /// mounts fine and simply reports not installed.
    pub fn mount(mut dev: D) -> FsResult<Self> {
        let sb = io::read_superblock(&mut dev)?;
        let inodes = io::read_inode_table(&mut dev)?;
        let bitmap = io::read_bitmap(&mut dev)?;
        debug!(
            "mounted: magic={:#010x} version={} free inodes={} free blocks={}",
            sb.magic, sb.version, sb.free_inodes, sb.free_blocks
        );

        Ok(Self {
            dev,
            sb,
            inodes,
            bitmap,
        })
    }

    pub fn device(&self) -> &D {
        &self.dev
    }

    pub fn into_device(self) -> D {
        self.dev
    }

    pub fn superblock(&self) -> &Superblock {
        &self.sb
    }

    pub fn flush(&mut self) -> FsResult<()> {
        io::write_superblock(&mut self.dev, &self.sb)?;
        io::write_inode_table(&mut self.dev, &self.inodes)?;
        io::write_bitmap(&mut self.dev, &self.bitmap)?;
        self.dev.flush()?;
        Ok(())
    }

    pub fn format(&mut self) -> FsResult<()> {
        self.sb = Superblock::formatted();
        self.inodes = vec![Inode::FREE; MAX_INODES];
        self.bitmap = BlockBitmap::new();
        self.flush()?;
        info!("formatted volume: {MAX_INODES} inodes, {MAX_BLOCKS} blocks of {BLOCK_SIZE} B");
        Ok(())
    }

    /// Formats, builds the root, records identity and lays out the default
    /// tree. Failing default directories are logged and skipped.
    pub fn install(&mut self, hostname: &str, username: &str, password: &str) -> FsResult<()> {
        self.format()?;

        self.bitmap.set(ROOT_BLOCK);
        self.sb.free_blocks -= 1;
        self.inodes[ROOT_INODE as usize] = Inode::directory(ROOT_BLOCK, ROOT_INODE);
        self.sb.free_inodes -= 1;
        self.write_dir(ROOT_BLOCK, &DirectoryBlock::with_dots(ROOT_INODE, ROOT_INODE))?;

        self.sb.set_hostname(hostname);
        self.sb.set_username(username);
        self.sb.set_password(password);
        self.sb.installed = 1;
        self.flush()?;

        let home = format!("/home/{username}");
        for dir in DEFAULT_DIRECTORIES
            .iter()
            .copied()
            .chain(std::iter::once(home.as_str()))
        {
            if let Err(err) = self.create_directory(dir) {
                warn!("install: could not create {dir}: {err}");
            }
        }
        self.flush()?;

        info!("installed system '{hostname}' for user '{username}'");
        Ok(())
    }

    /// Re-reads the superblock from disk.
    pub fn check_installed(&mut self) -> bool {
        match io::read_superblock(&mut self.dev) {
            Ok(sb) => {
                self.sb = sb;
                self.sb.is_installed()
            }
            Err(err) => {
                warn!("superblock unreadable: {err}");
                false
            }
        }
    }

    pub fn verify_password(&self, candidate: &str) -> bool {
        self.sb.password_matches(candidate)
    }

    pub fn hostname(&self) -> String {
        self.sb.hostname()
    }

    pub fn username(&self) -> String {
        self.sb.username()
    }

    // mkdir -p: walks the components, creating whatever is missing.
    pub fn create_directory(&mut self, path: &str) -> FsResult<()> {
        let path = path::normalize(path)?;
        let mut current = ROOT_INODE;

        for comp in components(&path) {
            let (_, dir) = self.read_dir(current)?;
            match dir.find(comp) {
                Some(entry) => {
                    let child = entry.inode;
                    if !self.inode(child)?.is_dir() {
                        return Err(FsError::NotADirectory);
                    }
                    current = child;
                }
                None => {
                    validate_name(comp)?;
                    current = self.make_dir(current, comp)?;
                }
            }
        }

        self.flush()
    }

    pub fn list_directory(&mut self, path: &str) -> FsResult<Vec<DirListing>> {
        let idx = self.lookup(&path::normalize(path)?)?;
        let (_, dir) = self.read_dir(idx)?;

        Ok(dir
            .children()
            .filter(|e| e.has_printable_name())
            .map(|e| DirListing {
                name: e.name_str().to_string(),
                is_dir: self
                    .inodes
                    .get(e.inode as usize)
                    .is_some_and(|i| i.is_dir()),
            })
            .collect())
    }

    /// Returns the new working directory. `..` is purely lexical on
    /// `current`; anything else must resolve to an existing directory.
    pub fn change_directory(&mut self, path: &str, current: &str) -> FsResult<String> {
        if path == ".." {
            let current = path::normalize(current)?;
            return Ok(match split_parent(&current) {
                Some((parent, _)) => parent.to_string(),
                None => "/".to_string(),
            });
        }

        let target = path::normalize(&path::join(current, path))?;
        let idx = self.lookup(&target)?;
        if !self.inode(idx)?.is_dir() {
            return Err(FsError::NotADirectory);
        }
        Ok(path::canonical(&target))
    }

    /// Creates or replaces a file, creating missing parents. Data beyond the
    /// direct block capacity is dropped, but the inode records the full
    /// requested size.
    pub fn create_file(&mut self, path: &str, data: &[u8]) -> FsResult<()> {
        if data.len() > MAX_FILE_SIZE {
            return Err(FsError::FileTooLarge);
        }
        let path = path::normalize(path)?;
        let (parent_path, name) = split_parent(&path).ok_or(FsError::NotAFile)?;
        validate_name(name)?;

        self.create_directory(parent_path)?;
        let parent = self.lookup(parent_path)?;
        let (dir_block, mut dir) = self.read_dir(parent)?;

        let existing = match dir.find(name) {
            Some(entry) if self.inode(entry.inode)?.is_dir() => return Err(FsError::NotAFile),
            Some(entry) => Some(entry.inode),
            None => None,
        };

        let stored = data.len().min(DIRECT_CAPACITY);
        if stored < data.len() {
            warn!("{path}: only {stored} of {} bytes fit", data.len());
        }

        let needed = blocks_for(data.len());
        let mut blocks = [0u32; DIRECT_BLOCKS];
        for n in 0..needed {
            match self.alloc_block() {
                Ok(block) => blocks[n] = block,
                Err(err) => {
                    self.release_blocks(&blocks[..n]);
                    return Err(err);
                }
            }
        }

        let inode = Inode {
            kind: InodeKind::File,
            size: data.len() as u32,
            blocks,
            parent,
        };
        let idx = match self.alloc_inode(inode) {
            Ok(idx) => idx,
            Err(err) => {
                self.release_blocks(&blocks[..needed]);
                return Err(err);
            }
        };

        match existing {
            Some(old) => {
                if let Some(entry) = dir.find_mut(name) {
                    entry.inode = idx;
                }
                self.release_inode(old);
            }
            None => {
                if dir.insert(name, idx).is_none() {
                    self.release_inode(idx);
                    return Err(FsError::NoSpace);
                }
            }
        }

        for (chunk, &block) in data[..stored].chunks(BLOCK_SIZE).zip(&blocks) {
            let mut buf = [0u8; BLOCK_SIZE];
            buf[..chunk.len()].copy_from_slice(chunk);
            io::write_block(&mut self.dev, block, &buf)?;
        }
        self.write_dir(dir_block, &dir)?;
        self.flush()?;

        debug!("created {path}: inode {idx}, {stored} bytes in {needed} blocks");
        Ok(())
    }

    /// Copies up to `buf.len()` bytes of the stored data and returns the
    /// file's recorded size, which may exceed what was copied.
    pub fn read_file(&mut self, path: &str, buf: &mut [u8]) -> FsResult<usize> {
        let idx = self.lookup(&path::normalize(path)?)?;
        let inode = *self.inode(idx)?;
        match inode.kind {
            InodeKind::File => {}
            InodeKind::Directory => return Err(FsError::NotAFile),
            InodeKind::Free => return Err(FsError::NotFound),
        }

        let size = inode.size as usize;
        let wanted = size.min(buf.len()).min(DIRECT_CAPACITY);
        let mut block_buf = [0u8; BLOCK_SIZE];
        for (chunk, &block) in buf[..wanted]
            .chunks_mut(BLOCK_SIZE)
            .zip(inode.owned_blocks())
        {
            io::read_block(&mut self.dev, block, &mut block_buf)?;
            chunk.copy_from_slice(&block_buf[..chunk.len()]);
        }
        Ok(size)
    }

    pub fn read_to_vec(&mut self, path: &str) -> FsResult<Vec<u8>> {
        let size = self.stat(path)?.size as usize;
        let mut out = vec![0u8; size.min(DIRECT_CAPACITY)];
        self.read_file(path, &mut out)?;
        Ok(out)
    }

    pub fn delete_file(&mut self, path: &str) -> FsResult<()> {
        let path = path::normalize(path)?;
        let idx = self.lookup(&path)?;
        if !self.inode(idx)?.is_file() {
            return Err(FsError::NotAFile);
        }
        self.unlink(&path, idx)?;
        self.flush()?;
        debug!("deleted {path} (inode {idx})");
        Ok(())
    }

    pub fn remove_directory(&mut self, path: &str) -> FsResult<()> {
        let path = path::canonical(&path::normalize(path)?);
        let idx = self.lookup(&path)?;
        if !self.inode(idx)?.is_dir() {
            return Err(FsError::NotADirectory);
        }
        if idx == ROOT_INODE {
            return Err(FsError::InvalidName);
        }
        let (_, dir) = self.read_dir(idx)?;
        if dir.children().next().is_some() {
            return Err(FsError::NotEmpty);
        }
        self.unlink(&path, idx)?;
        self.flush()?;
        debug!("removed directory {path} (inode {idx})");
        Ok(())
    }

    pub fn dir_exists(&mut self, path: &str) -> bool {
        match path::normalize(path).and_then(|p| self.lookup(&p)) {
            Ok(idx) => self.inode(idx).is_ok_and(|i| i.is_dir()),
            Err(_) => false,
        }
    }

    pub fn stat(&mut self, path: &str) -> FsResult<InodeInfo> {
        let idx = self.lookup(&path::normalize(path)?)?;
        let inode = self.inode(idx)?;
        Ok(InodeInfo {
            index: idx,
            kind: inode.kind,
            size: inode.size,
            blocks: inode.owned_blocks().to_vec(),
            parent: inode.parent,
        })
    }

    pub fn stats(&self) -> FsStats {
        let count = |pred: fn(&Inode) -> bool| self.inodes.iter().filter(|i| pred(i)).count() as u32;
        FsStats {
            total_inodes: self.sb.total_inodes,
            free_inodes: self.sb.free_inodes,
            total_blocks: self.sb.total_blocks,
            free_blocks: self.sb.free_blocks,
            directories: count(Inode::is_dir),
            files: count(Inode::is_file),
        }
    }

    fn inode(&self, idx: u32) -> FsResult<&Inode> {
        self.inodes.get(idx as usize).ok_or(FsError::NotFound)
    }

    // Path must already be normalized. `.` and `..` go through the on-disk
    // entries like any other name.
    fn lookup(&mut self, path: &str) -> FsResult<u32> {
        let mut current = ROOT_INODE;
        for comp in components(path) {
            let (_, dir) = self.read_dir(current)?;
            let entry = dir.find(comp).ok_or(FsError::NotFound)?;
            if self.inode(entry.inode)?.is_free() {
                warn!("entry '{comp}' points at free inode {}", entry.inode);
                return Err(FsError::NotFound);
            }
            current = entry.inode;
        }
        Ok(current)
    }

    fn read_dir(&mut self, idx: u32) -> FsResult<(u32, DirectoryBlock)> {
        let inode = *self.inode(idx)?;
        if !inode.is_dir() {
            return Err(FsError::NotADirectory);
        }
        let block = inode.blocks[0];
        if block as usize >= MAX_BLOCKS {
            warn!("directory inode {idx} has bad block {block}");
            return Err(FsError::NotFound);
        }
        let mut buf = [0u8; BLOCK_SIZE];
        io::read_block(&mut self.dev, block, &mut buf)?;
        Ok((block, DirectoryBlock::deserialize(&buf)))
    }

    fn write_dir(&mut self, block: u32, dir: &DirectoryBlock) -> FsResult<()> {
        io::write_block(&mut self.dev, block, &dir.serialize())?;
        Ok(())
    }

    fn make_dir(&mut self, parent: u32, name: &str) -> FsResult<u32> {
        let (parent_block, mut parent_dir) = self.read_dir(parent)?;
        if parent_dir.free_slot().is_none() {
            return Err(FsError::NoSpace);
        }

        let block = self.alloc_block()?;
        let idx = match self.alloc_inode(Inode::directory(block, parent)) {
            Ok(idx) => idx,
            Err(err) => {
                self.release_blocks(&[block]);
                return Err(err);
            }
        };
        parent_dir.insert(name, idx);

        self.write_dir(block, &DirectoryBlock::with_dots(idx, parent))?;
        self.write_dir(parent_block, &parent_dir)?;
        debug!("mkdir '{name}' under inode {parent}: inode {idx}, block {block}");
        Ok(idx)
    }

    fn unlink(&mut self, path: &str, idx: u32) -> FsResult<()> {
        let (parent_path, _) = split_parent(path).ok_or(FsError::NotFound)?;
        let parent = self.lookup(parent_path)?;
        let (block, mut dir) = self.read_dir(parent)?;
        if !dir.remove_inode(idx) {
            warn!("inode {idx} missing from its parent directory");
        }
        self.write_dir(block, &dir)?;
        self.release_inode(idx);
        Ok(())
    }

    // Inode 0 is the root and never handed out.
    fn alloc_inode(&mut self, inode: Inode) -> FsResult<u32> {
        let idx = (1..MAX_INODES)
            .find(|&n| self.inodes[n].is_free())
            .ok_or(FsError::NoSpace)?;
        self.inodes[idx] = inode;
        self.sb.free_inodes = self.sb.free_inodes.saturating_sub(1);
        Ok(idx as u32)
    }

    fn alloc_block(&mut self) -> FsResult<u32> {
        let block = self.bitmap.allocate().ok_or(FsError::NoSpace)?;
        self.sb.free_blocks = self.sb.free_blocks.saturating_sub(1);
        Ok(block)
    }

    fn release_blocks(&mut self, blocks: &[u32]) {
        for &block in blocks {
            if self.bitmap.is_used(block) {
                self.bitmap.clear(block);
                self.sb.free_blocks += 1;
            }
        }
    }

    fn release_inode(&mut self, idx: u32) {
        let inode = self.inodes[idx as usize];
        self.release_blocks(inode.owned_blocks());
        self.inodes[idx as usize] = Inode::FREE;
        self.sb.free_inodes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dev::MemDisk;
    use crate::fs::consts::{DIR_ENTRIES_PER_BLOCK, MAX_PATH_LEN, VOLUME_SECTORS};
    use std::collections::HashSet;

    fn installed() -> FileSystem<MemDisk> {
        let mut fs = FileSystem::mount(MemDisk::new(VOLUME_SECTORS)).unwrap();
        fs.install("ephos", "alice", "hunter2").unwrap();
        fs
    }

    fn remount(fs: FileSystem<MemDisk>) -> FileSystem<MemDisk> {
        FileSystem::mount(fs.into_device()).unwrap()
    }

    fn assert_conserved(fs: &FileSystem<MemDisk>) {
        let mut owned = HashSet::new();
        let mut live = 0;
        for inode in fs.inodes.iter().filter(|i| !i.is_free()) {
            live += 1;
            for &block in inode.owned_blocks() {
                assert!(owned.insert(block), "block {block} owned twice");
                assert!(fs.bitmap.is_used(block), "owned block {block} marked free");
            }
        }
        assert_eq!(fs.bitmap.used_count(), owned.len());
        assert_eq!(fs.sb.free_blocks as usize + owned.len(), MAX_BLOCKS);
        assert_eq!(fs.sb.free_inodes as usize + live, MAX_INODES);
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 % 251) as u8).collect()
    }

    #[test]
    fn install_lays_out_default_tree() {
        let mut fs = installed();
        let names: Vec<String> = fs
            .list_directory("/")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["bin", "home", "tmp", "etc", "var"]);
        assert!(fs.dir_exists("/home/alice"));

        let stats = fs.stats();
        assert_eq!(stats.directories, 7);
        assert_eq!(stats.free_inodes, MAX_INODES as u32 - 7);
        assert_eq!(stats.free_blocks, MAX_BLOCKS as u32 - 7);
        assert_conserved(&fs);
    }

    #[test]
    fn install_then_login_survives_remount() {
        let mut fs = remount(installed());
        assert!(fs.check_installed());
        assert_eq!(fs.username(), "alice");
        assert_eq!(fs.hostname(), "ephos");
        assert!(fs.verify_password("hunter2"));
        assert!(!fs.verify_password("hunter3"));
    }

    #[test]
    fn blank_device_is_not_installed() {
        let mut fs = FileSystem::mount(MemDisk::new(VOLUME_SECTORS)).unwrap();
        assert!(!fs.check_installed());
        fs.format().unwrap();
        assert!(!fs.check_installed());
    }

    #[test]
    fn round_trips_up_to_direct_capacity() {
        let mut fs = installed();
        for len in [0, 1, 511, 512, 513, 4096, DIRECT_CAPACITY] {
            let path = format!("/tmp/f{len}");
            let data = pattern(len);
            fs.create_file(&path, &data).unwrap();
            assert_eq!(fs.read_to_vec(&path).unwrap(), data, "len {len}");
            assert_eq!(fs.stat(&path).unwrap().blocks.len(), blocks_for(len));
        }
        assert_conserved(&fs);

        let mut fs = remount(fs);
        assert_eq!(fs.read_to_vec("/tmp/f513").unwrap(), pattern(513));
    }

    #[test]
    fn oversized_files_are_truncated_or_rejected() {
        let mut fs = installed();
        fs.create_file("/tmp/big", &pattern(MAX_FILE_SIZE)).unwrap();
        let info = fs.stat("/tmp/big").unwrap();
        assert_eq!(info.size as usize, MAX_FILE_SIZE);
        assert_eq!(info.blocks.len(), DIRECT_BLOCKS);
        assert_eq!(
            fs.read_to_vec("/tmp/big").unwrap(),
            pattern(DIRECT_CAPACITY)
        );

        // Only the stored prefix is copied; the recorded size comes back
        let mut buf = vec![0xAAu8; MAX_FILE_SIZE];
        assert_eq!(fs.read_file("/tmp/big", &mut buf).unwrap(), MAX_FILE_SIZE);
        assert_eq!(&buf[..DIRECT_CAPACITY], &pattern(DIRECT_CAPACITY)[..]);
        assert!(buf[DIRECT_CAPACITY..].iter().all(|&b| b == 0xAA));

        fs.create_file("/tmp/mid", &[7u8; 10000]).unwrap();
        let mut buf = vec![0u8; MAX_FILE_SIZE];
        assert_eq!(fs.read_file("/tmp/mid", &mut buf).unwrap(), 10000);
        assert_eq!(fs.stat("/tmp/mid").unwrap().blocks.len(), DIRECT_BLOCKS);

        let mut fs = remount(fs);
        assert_eq!(fs.stat("/tmp/mid").unwrap().size, 10000);
        assert_conserved(&fs);

        let before = fs.stats();
        assert!(matches!(
            fs.create_file("/tmp/huge", &pattern(MAX_FILE_SIZE + 1)),
            Err(FsError::FileTooLarge)
        ));
        assert_eq!(fs.stats(), before);
        assert_conserved(&fs);
    }

    #[test]
    fn read_file_reports_full_size_into_short_buffer() {
        let mut fs = installed();
        fs.create_file("/tmp/msg", b"hello world").unwrap();
        let mut buf = [0u8; 5];
        assert_eq!(fs.read_file("/tmp/msg", &mut buf).unwrap(), 11);
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn mkdir_is_idempotent() {
        let mut fs = installed();
        fs.create_directory("/a/b/c").unwrap();
        let before = fs.stats();
        fs.create_directory("/a/b/c").unwrap();
        fs.create_directory("a//b/c/").unwrap();
        assert_eq!(fs.stats(), before);
        assert_conserved(&fs);
    }

    #[test]
    fn nested_directories_link_parents() {
        let mut fs = installed();
        fs.create_directory("/a/b/c").unwrap();
        let listing = fs.list_directory("/a/b").unwrap();
        assert_eq!(
            listing,
            vec![DirListing {
                name: "c".into(),
                is_dir: true
            }]
        );

        let b = fs.stat("/a/b").unwrap();
        let c = fs.stat("/a/b/c").unwrap();
        assert_eq!(c.parent, b.index);
        assert_eq!(fs.stat("/a/b/c/..").unwrap().index, b.index);
        assert_eq!(fs.stat("/a/./b").unwrap().index, b.index);
    }

    #[test]
    fn paths_are_normalized() {
        let mut fs = installed();
        fs.create_directory("/a/b").unwrap();
        assert_eq!(
            fs.stat("a//b/").unwrap().index,
            fs.stat("/a/b").unwrap().index
        );

        fs.create_file("/home/alice/notes", b"n").unwrap();
        fs.create_directory("/home/alice/docs").unwrap();
        let messy = fs.list_directory("/home//alice/").unwrap();
        assert_eq!(messy, fs.list_directory("/home/alice").unwrap());
        assert_eq!(messy.len(), 2);
    }

    #[test]
    fn overlong_paths_fail_without_side_effects() {
        let mut fs = installed();
        let mut long = String::new();
        for _ in 0..10 {
            long.push('/');
            long.push_str(&"d".repeat(26));
        }
        let file = format!("{long}/myfile.txt");
        assert!(file.len() > MAX_PATH_LEN - 1);

        let before = fs.stats();
        assert!(matches!(fs.create_file(&file, b"data"), Err(FsError::InvalidName)));
        assert!(matches!(fs.create_directory(&file), Err(FsError::InvalidName)));
        assert!(matches!(fs.delete_file(&file), Err(FsError::InvalidName)));
        assert!(matches!(fs.remove_directory(&file), Err(FsError::InvalidName)));
        assert!(matches!(fs.stat(&file), Err(FsError::InvalidName)));
        assert!(!fs.dir_exists(&file));
        assert_eq!(fs.stats(), before);

        // The cwd join can push an otherwise short path over the limit
        let cwd = &long[..long.len() - 27];
        fs.create_directory(cwd).unwrap();
        assert!(matches!(
            fs.change_directory(&"e".repeat(27), cwd),
            Err(FsError::InvalidName)
        ));
        assert_conserved(&fs);
    }

    #[test]
    fn file_in_path_is_not_a_directory() {
        let mut fs = installed();
        fs.create_file("/tmp/x", b"1").unwrap();
        assert!(matches!(
            fs.create_directory("/tmp/x/y"),
            Err(FsError::NotADirectory)
        ));
        assert!(matches!(
            fs.create_file("/tmp/x/y", b"2"),
            Err(FsError::NotADirectory)
        ));
        assert!(matches!(
            fs.list_directory("/tmp/x"),
            Err(FsError::NotADirectory)
        ));
        assert!(matches!(
            fs.create_file("/tmp", b"2"),
            Err(FsError::NotAFile)
        ));
    }

    #[test]
    fn create_file_makes_parents() {
        let mut fs = installed();
        fs.create_file("/srv/www/index.html", b"<html>").unwrap();
        assert!(fs.dir_exists("/srv/www"));
        assert_eq!(fs.read_to_vec("/srv/www/index.html").unwrap(), b"<html>");
        assert_conserved(&fs);
    }

    #[test]
    fn replacing_a_file_frees_old_blocks() {
        let mut fs = installed();
        fs.create_file("/tmp/log", &pattern(2000)).unwrap();
        let before = fs.stats();
        fs.create_file("/tmp/log", b"short").unwrap();

        assert_eq!(fs.read_to_vec("/tmp/log").unwrap(), b"short");
        assert_eq!(fs.stats().free_blocks, before.free_blocks + 3);
        assert_eq!(fs.stats().files, 1);
        assert_eq!(fs.list_directory("/tmp").unwrap().len(), 1);
        assert_conserved(&fs);
    }

    #[test]
    fn delete_reclaims_everything() {
        let mut fs = installed();
        let before = fs.stats();
        fs.create_file("/tmp/data", &pattern(3000)).unwrap();
        fs.delete_file("/tmp/data").unwrap();

        assert_eq!(fs.stats(), before);
        assert!(matches!(fs.stat("/tmp/data"), Err(FsError::NotFound)));
        assert!(matches!(
            fs.delete_file("/tmp/data"),
            Err(FsError::NotFound)
        ));
        assert!(matches!(fs.delete_file("/tmp"), Err(FsError::NotAFile)));
        assert_conserved(&fs);
    }

    #[test]
    fn directory_full_rolls_back() {
        let mut fs = installed();
        fs.create_directory("/full").unwrap();
        for i in 0..DIR_ENTRIES_PER_BLOCK - 2 {
            fs.create_file(&format!("/full/f{i}"), b"x").unwrap();
        }
        let before = fs.stats();
        assert!(matches!(
            fs.create_file("/full/extra", b"data"),
            Err(FsError::NoSpace)
        ));
        assert!(matches!(
            fs.create_directory("/full/sub"),
            Err(FsError::NoSpace)
        ));
        assert_eq!(fs.stats(), before);
        assert_conserved(&fs);
    }

    #[test]
    fn block_exhaustion_is_no_space() {
        let mut fs = installed();
        let mut n = 0;
        let err = loop {
            match fs.create_file(&format!("/d{}/f{}", n / 10, n % 10), &pattern(DIRECT_CAPACITY)) {
                Ok(()) => n += 1,
                Err(err) => break err,
            }
        };
        assert!(matches!(err, FsError::NoSpace));
        assert_conserved(&fs);
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut fs = installed();
        let long = "n".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            fs.create_file(&format!("/tmp/{long}"), b""),
            Err(FsError::InvalidName)
        ));
        assert!(matches!(
            fs.create_directory(&format!("/tmp/{long}")),
            Err(FsError::InvalidName)
        ));
        fs.create_file(&format!("/tmp/{}", "n".repeat(MAX_NAME_LEN)), b"ok")
            .unwrap();
    }

    #[test]
    fn change_directory_rules() {
        let mut fs = installed();
        assert_eq!(fs.change_directory("..", "/home/alice").unwrap(), "/home");
        assert_eq!(fs.change_directory("..", "/").unwrap(), "/");
        assert_eq!(fs.change_directory("alice", "/home").unwrap(), "/home/alice");
        assert_eq!(fs.change_directory("/tmp/", "/home").unwrap(), "/tmp");
        assert_eq!(fs.change_directory("../etc", "/home").unwrap(), "/etc");
        assert!(matches!(
            fs.change_directory("nope", "/"),
            Err(FsError::NotFound)
        ));
        fs.create_file("/tmp/f", b"").unwrap();
        assert!(matches!(
            fs.change_directory("f", "/tmp"),
            Err(FsError::NotADirectory)
        ));
    }

    #[test]
    fn rmdir_requires_empty() {
        let mut fs = installed();
        fs.create_directory("/a/b").unwrap();
        assert!(matches!(fs.remove_directory("/a"), Err(FsError::NotEmpty)));
        fs.remove_directory("/a/b").unwrap();
        fs.remove_directory("/a").unwrap();
        assert!(!fs.dir_exists("/a"));
        assert!(fs.remove_directory("/").is_err());
        assert_conserved(&fs);
    }

    #[test]
    fn listing_skips_unprintable_names() {
        let mut fs = installed();
        fs.create_file("/tmp/ok", b"").unwrap();

        let tmp = fs.stat("/tmp").unwrap();
        let block = tmp.blocks[0];
        let (_, mut dir) = fs.read_dir(tmp.index).unwrap();
        let slot = dir.insert("bad", 1).unwrap();
        dir.entries[slot].name[0] = 0x07;
        fs.write_dir(block, &dir).unwrap();

        let names: Vec<String> = fs
            .list_directory("/tmp")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["ok"]);
    }
}
