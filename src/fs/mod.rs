//! Flat on-disk filesystem: a superblock, a fixed inode table, a block
//! bitmap and single-block directories, all at fixed sectors.

pub mod bitmap;
pub mod consts;
pub mod error;
pub mod filesystem;
pub mod io;
pub mod layout;
pub mod path;
pub mod superblock;

pub use error::{FsError, FsResult};
pub use filesystem::{DirListing, FileSystem, FsStats, InodeInfo};
pub use layout::InodeKind;
