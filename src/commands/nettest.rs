//! `nettest`: hardware smoke test. Prints the NIC identity, broadcasts one
//! ARP request for the local address and counts whatever arrives in the next
//! five seconds.

use crate::context::Context;
use crate::net::arp::ArpPacket;
use crate::net::ethernet::ETHERTYPE_ARP;
use crate::dev::MacAddr;
use anyhow::Context as _;
use colored::Colorize;
use std::thread;
use std::time::Duration;

const LISTEN_ROUNDS: u32 = 50;
const LISTEN_INTERVAL: Duration = Duration::from_millis(100);

pub fn handle_argv(_argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    println!("Network Hardware Test");
    println!("=====================\n");

    let net = &mut context.net;
    let mac = net.mac();
    let ip = net.local_ip();
    println!("MAC Address: {mac}");
    println!("IP Address:  {ip}");
    println!("Link Status: {}", if net.link_up() { "UP" } else { "DOWN" });

    println!("\nSending test packet...");
    let request = ArpPacket::request(mac, ip, ip);
    net.send_frame(MacAddr::BROADCAST, ETHERTYPE_ARP, &request.encode())
        .context("test packet could not be sent")?;
    println!("Packet sent!");

    println!("\nWaiting for incoming packets (5 seconds)...");
    let mut count = 0;
    for _ in 0..LISTEN_ROUNDS {
        while net.pump()? {
            count += 1;
            println!("Received packet #{count}");
        }
        thread::sleep(LISTEN_INTERVAL);
    }

    println!("\nTest complete. Received {count} packets.");
    if count == 0 {
        println!("\n{}", "WARNING: No packets received!".yellow());
        println!("Possible issues:");
        println!("- NIC not attached or link down");
        println!("- host network configuration");
    } else {
        println!("\n{}", "SUCCESS: Network hardware is working!".green());
    }
    Ok(())
}
