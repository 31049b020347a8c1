use crate::context::Context;

pub fn handle_argv(_argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    println!("{}", context.local_time());
    Ok(())
}
