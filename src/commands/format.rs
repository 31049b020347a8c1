//! `format`
//!
//! Erases the volume: superblock, inode table and bitmap go back to the
//! freshly formatted state and the installed flag is cleared. The system
//! then reboots, which lands in the installer.

use crate::context::{Context, Session};
use anyhow::Context as _;

pub fn handle_argv(_argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    println!("Formatting disk...");
    context.fs.format().context("format failed")?;
    context.set_cwd("/".to_string());
    println!("Disk erased. Rebooting into the installer...");
    context.set_session(Session::Reboot);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::installed_context;

    #[test]
    fn wipes_and_requests_reboot() {
        let mut ctx = installed_context(0);
        ctx.fs.create_file("/tmp/keep", b"data").unwrap();

        handle_argv(&[], &mut ctx).unwrap();

        assert_eq!(ctx.session(), Session::Reboot);
        assert!(!ctx.fs.check_installed());
        assert!(ctx.fs.stat("/tmp/keep").is_err());
        let stats = ctx.fs.stats();
        assert_eq!(stats.free_blocks, stats.total_blocks);
        assert_eq!(stats.free_inodes, stats.total_inodes);
    }
}
