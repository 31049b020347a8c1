use crate::context::{Context, Session};

pub fn handle_argv(_argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    println!("Rebooting...");
    context.sync()?;
    context.set_session(Session::Reboot);
    Ok(())
}
