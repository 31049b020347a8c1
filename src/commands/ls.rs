//! `ls [path]`
//!
//! Lists the current directory, or `path` resolved against it. Directories
//! are printed with a trailing `/` in cyan; `.` and `..` are not shown.

use crate::context::Context;
use anyhow::Context as _;
use colored::Colorize;

pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    let target = match argv.first() {
        Some(arg) => context.resolve(arg),
        None => context.cwd().to_string(),
    };

    let entries = context
        .fs
        .list_directory(&target)
        .with_context(|| format!("cannot access '{target}'"))?;

    for entry in entries {
        if entry.is_dir {
            println!("{}", format!("{}/", entry.name).cyan());
        } else {
            println!("{}", entry.name);
        }
    }
    Ok(())
}
