use crate::context::Context;
use anyhow::Context as _;

pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    let Some(host) = argv.first() else {
        println!("Usage: nslookup <hostname>");
        return Ok(());
    };

    let server = context.net.config().dns_server;
    println!("Server:  {server}");
    let addr = context
        .net
        .resolve_host(host)
        .with_context(|| format!("can't find {host}"))?;
    println!("Name:    {host}");
    println!("Address: {addr}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::installed_context;

    #[test]
    fn literal_needs_no_network() {
        let mut ctx = installed_context(0);
        handle_argv(&["192.168.1.1"], &mut ctx).unwrap();
    }

    #[test]
    fn unreachable_server_fails() {
        let mut ctx = installed_context(0);
        let err = handle_argv(&["example.com"], &mut ctx).unwrap_err();
        assert!(format!("{err:#}").starts_with("can't find example.com"));
    }
}
