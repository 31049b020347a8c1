use crate::dev::DiskImage;
use crate::fs::consts::VOLUME_SECTORS;
use anyhow::{Context, bail};
use log::info;
use std::path::Path;

/// Opens the disk image, creating it (and its parent directories) when
/// missing and growing it to hold the whole volume.
pub fn handle_fs(fs_path: &Path) -> anyhow::Result<DiskImage> {
    if fs_path.is_dir() {
        bail!(
            "path points to a directory, cannot open it as a disk image: {}",
            fs_path.display()
        );
    }

    if let Some(parent) = fs_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create directory '{}'", parent.display()))?;
        }
    }

    let existed = fs_path.exists();
    let disk = DiskImage::open(fs_path, VOLUME_SECTORS)
        .with_context(|| format!("failed to open/create '{}'", fs_path.display()))?;

    if existed {
        info!("opened existing disk image {}", fs_path.display());
    } else {
        info!("created new disk image {}", fs_path.display());
    }
    Ok(disk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dev::{BlockDevice, SECTOR_SIZE};

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("ephos-file-man-{}-{name}", std::process::id()))
    }

    #[test]
    fn creates_missing_parents_and_sizes_image() {
        let root = scratch("nested");
        let image = root.join("a/b/disk.img");
        let disk = handle_fs(&image).unwrap();

        assert_eq!(disk.sector_count(), VOLUME_SECTORS);
        assert_eq!(
            std::fs::metadata(&image).unwrap().len(),
            VOLUME_SECTORS * SECTOR_SIZE as u64
        );
        std::fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn directory_is_rejected() {
        let dir = scratch("dir");
        std::fs::create_dir_all(&dir).unwrap();
        assert!(handle_fs(&dir).is_err());
        std::fs::remove_dir_all(dir).unwrap();
    }
}
