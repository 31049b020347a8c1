use crate::context::Context;

pub const SYSTEM_NAME: &str = "EphemeralOS";

/// `uname` prints the system name; `uname -a` adds host and version.
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    if argv.first() == Some(&"-a") {
        println!(
            "{SYSTEM_NAME} {} {} i386",
            context.hostname(),
            env!("CARGO_PKG_VERSION")
        );
    } else {
        println!("{SYSTEM_NAME}");
    }
    Ok(())
}
