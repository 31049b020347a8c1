use crate::context::Context;
use crate::fs::path::{canonical, split_parent};
use anyhow::Context as _;

pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    let Some(arg) = argv.first() else {
        println!("Usage: rmdir <directory>");
        return Ok(());
    };

    let path = canonical(&context.resolve(arg));
    context
        .fs
        .remove_directory(&path)
        .with_context(|| format!("failed to remove '{arg}'"))?;

    // Removing the directory we stand in leaves us at its parent
    let cwd = context.cwd().to_string();
    if cwd == path || cwd.starts_with(&format!("{path}/")) {
        let parent = split_parent(&path).map_or("/", |(parent, _)| parent);
        context.set_cwd(parent.to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::installed_context;

    #[test]
    fn removes_empty_directory_only() {
        let mut ctx = installed_context(0);
        ctx.fs.create_directory("/tmp/full/inner").unwrap();

        let err = handle_argv(&["/tmp/full"], &mut ctx).unwrap_err();
        assert!(format!("{err:#}").ends_with("directory not empty"));

        handle_argv(&["/tmp/full/inner"], &mut ctx).unwrap();
        handle_argv(&["/tmp/full"], &mut ctx).unwrap();
        assert!(!ctx.fs.dir_exists("/tmp/full"));
    }

    #[test]
    fn removing_cwd_moves_to_parent() {
        let mut ctx = installed_context(0);
        ctx.fs.create_directory("/tmp/here").unwrap();
        ctx.set_cwd("/tmp/here".to_string());
        handle_argv(&["."], &mut ctx).unwrap();
        assert!(!ctx.fs.dir_exists("/tmp/here"));
        assert_eq!(ctx.cwd(), "/tmp");
    }
}
