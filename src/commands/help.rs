use crate::commands::COMMANDS;
use crate::context::Context;
use crate::commands::uname::SYSTEM_NAME;

pub fn handle_argv(_argv: &[&str], _context: &mut Context) -> anyhow::Result<()> {
    let title = format!("{SYSTEM_NAME} Available Commands:");
    println!("\n{title}");
    println!("{}", "=".repeat(title.len()));
    for command in COMMANDS {
        println!("{:<9} - {}", command.name, command.help);
    }
    println!();
    Ok(())
}
