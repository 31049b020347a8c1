use crate::context::Context;
use anyhow::Context as _;

pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    if argv.is_empty() {
        println!("Usage: rm <filename>");
        return Ok(());
    }

    for arg in argv {
        let path = context.resolve(arg);
        context
            .fs
            .delete_file(&path)
            .with_context(|| format!("cannot remove '{arg}'"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::installed_context;

    #[test]
    fn delete_returns_space() {
        let mut ctx = installed_context(0);
        let before = ctx.fs.stats();
        ctx.fs.create_file("/tmp/a", &[1u8; 1500]).unwrap();
        handle_argv(&["/tmp/a"], &mut ctx).unwrap();
        assert_eq!(ctx.fs.stats(), before);
    }

    #[test]
    fn refuses_directories() {
        let mut ctx = installed_context(0);
        let err = handle_argv(&["/tmp"], &mut ctx).unwrap_err();
        assert_eq!(format!("{err:#}"), "cannot remove '/tmp': not a file");
        assert!(ctx.fs.dir_exists("/tmp"));
    }
}
