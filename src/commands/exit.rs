use crate::context::{Context, Session};

/// Ends the shell session and returns to the login prompt.
pub fn handle_argv(_argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    println!("logout");
    context.set_session(Session::Logout);
    Ok(())
}
