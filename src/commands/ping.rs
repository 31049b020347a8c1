//! `ping <host>`
//!
//! Sends four ICMP echo requests (identifier 1234, sequence 1 to 4) and
//! waits for each reply in turn before printing the totals.

use crate::context::Context;
use crate::net::NetError;
use anyhow::{Context as _, bail};
use std::time::Duration;

const PING_COUNT: u16 = 4;
const PING_IDENT: u16 = 1234;

pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    let Some(host) = argv.first() else {
        println!("Usage: ping <hostname or IP>");
        return Ok(());
    };
    if !context.net.link_up() {
        bail!("network is down");
    }

    println!("PING {host}");
    let target = context
        .net
        .resolve_host(host)
        .with_context(|| format!("cannot resolve {host}"))?;
    println!("Pinging {target} with 64 bytes of data:\n");

    let timeout = context.net.config().ping_timeout;
    let mut received = 0;
    for seq in 1..=PING_COUNT {
        let reply = context
            .net
            .send_echo_request(target, PING_IDENT, seq)
            .and_then(|()| context.net.wait_reply(target, seq, timeout));

        match reply {
            Ok(rtt) => {
                received += 1;
                println!("Reply from {target}: bytes=64 {} TTL=64", format_rtt(rtt));
            }
            // No ARP answer for the next hop looks the same as a lost echo
            Err(NetError::Timeout | NetError::ResolutionFailure) => {
                println!("Request timed out.");
            }
            Err(err) => return Err(err.into()),
        }
    }

    println!("\nPing statistics for {target}:");
    println!(
        "    Packets: Sent = {PING_COUNT}, Received = {received}, Lost = {}",
        PING_COUNT - received
    );
    Ok(())
}

fn format_rtt(rtt: Duration) -> String {
    match rtt.as_millis() {
        0 => "time<1ms".to_string(),
        ms => format!("time={ms}ms"),
    }
}
