use crate::context::Context;
use anyhow::Context as _;

/// `mkdir <dir>...`: missing parents are created too.
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    if argv.is_empty() {
        println!("Usage: mkdir <directory>");
        return Ok(());
    }

    for arg in argv {
        let path = context.resolve(arg);
        context
            .fs
            .create_directory(&path)
            .with_context(|| format!("cannot create directory '{arg}'"))?;
    }
    Ok(())
}
