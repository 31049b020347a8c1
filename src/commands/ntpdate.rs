use crate::context::Context;
use anyhow::Context as _;

/// `ntpdate`: one request to the configured server, then the clock follows
/// the server's time.
pub fn handle_argv(_argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    let server = context.net.config().ntp_server;
    let local = context.rtc_time();
    let remote = context
        .net
        .sync_time(local)
        .with_context(|| format!("no server suitable for synchronization found ({server})"))?;

    context.set_clock(remote);
    let delta = i64::from(remote) - i64::from(local);
    println!("{}", context.local_time());
    println!("adjust time server {server} offset {delta:+} sec");
    Ok(())
}
