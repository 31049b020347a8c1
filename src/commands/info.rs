use crate::context::Context;
use crate::fs::InodeKind;
use crate::fs::path::{canonical, split_parent};
use anyhow::Context as _;

/// `info <path>`: one line with the inode behind a path.
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    let target = match argv.first() {
        Some(arg) => context.resolve(arg),
        None => context.cwd().to_string(),
    };
    let info = context.fs.stat(&target).with_context(|| target.clone())?;

    let shown = canonical(&target);
    let name = split_parent(&shown).map_or("/", |(_, name)| name);
    let kind = match info.kind {
        InodeKind::Directory => "dir",
        InodeKind::File => "file",
        InodeKind::Free => "free",
    };
    let blocks: Vec<String> = info.blocks.iter().map(u32::to_string).collect();

    println!(
        "{name} - {kind} - {} B - i-node {} - parent {} - blocks [{}]",
        info.size,
        info.index,
        info.parent,
        blocks.join(", ")
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::installed_context;

    #[test]
    fn reports_files_dirs_and_missing() {
        let mut ctx = installed_context(0);
        ctx.fs.create_file("/tmp/a", &[0u8; 700]).unwrap();
        handle_argv(&["/tmp/a"], &mut ctx).unwrap();
        handle_argv(&[], &mut ctx).unwrap();
        assert!(handle_argv(&["/tmp/none"], &mut ctx).is_err());
    }
}
