//! `cd [path]`: with no argument goes to the user's home directory.

use crate::context::Context;
use anyhow::Context as _;

pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    let target = match argv.first() {
        Some(arg) => arg.to_string(),
        None => context.home(),
    };

    let cwd = context.cwd().to_string();
    let dir = context
        .fs
        .change_directory(&target, &cwd)
        .with_context(|| target.clone())?;
    context.set_cwd(dir);
    Ok(())
}
