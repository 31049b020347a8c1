use crate::context::Context;
use anyhow::Context as _;

/// Creates empty files; existing files are left as they are.
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    if argv.is_empty() {
        println!("Usage: touch <filename>");
        return Ok(());
    }

    for arg in argv {
        let path = context.resolve(arg);
        if context.fs.stat(&path).is_ok() {
            continue;
        }
        context
            .fs
            .create_file(&path, &[])
            .with_context(|| format!("cannot touch '{arg}'"))?;
    }
    Ok(())
}
