use crate::context::Context;

pub fn handle_argv(_argv: &[&str], _context: &mut Context) -> anyhow::Result<()> {
    // ANSI: clear screen, cursor home
    print!("\x1B[2J\x1B[H");
    Ok(())
}
