use crate::context::Context;
use anyhow::Context as _;

pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    if argv.is_empty() {
        println!("Usage: cat <filename>");
        return Ok(());
    }

    for arg in argv {
        let path = context.resolve(arg);
        let data = context.fs.read_to_vec(&path).with_context(|| arg.to_string())?;
        print!("{}", String::from_utf8_lossy(&data));
        if data.last().is_some_and(|&b| b != b'\n') {
            println!();
        }
    }
    Ok(())
}
