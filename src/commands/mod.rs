use crate::context::Context;
use colored::Colorize;
use std::collections::HashMap;

pub type Handler = fn(&[&str], &mut Context) -> anyhow::Result<()>;

pub struct Command {
    pub name: &'static str,
    pub handler: Handler,
    pub help: &'static str,
}

/// Every shell command, in the order `help` lists them.
pub const COMMANDS: &[Command] = &[
    Command { name: "help", handler: help::handle_argv, help: "Show this help message" },
    Command { name: "clear", handler: clear::handle_argv, help: "Clear the screen" },
    Command { name: "ls", handler: ls::handle_argv, help: "List files and directories" },
    Command { name: "cd", handler: cd::handle_argv, help: "Change directory" },
    Command { name: "mkdir", handler: mkdir::handle_argv, help: "Create directory" },
    Command { name: "rmdir", handler: rmdir::handle_argv, help: "Remove empty directory" },
    Command { name: "cat", handler: cat::handle_argv, help: "Display file contents" },
    Command { name: "echo", handler: echo::handle_argv, help: "Print text or create file" },
    Command { name: "touch", handler: touch::handle_argv, help: "Create empty file" },
    Command { name: "rm", handler: rm::handle_argv, help: "Remove file" },
    Command { name: "pwd", handler: pwd::handle_argv, help: "Print working directory" },
    Command { name: "whoami", handler: whoami::handle_argv, help: "Print current user" },
    Command { name: "uname", handler: uname::handle_argv, help: "Show system information" },
    Command { name: "date", handler: date::handle_argv, help: "Show current date/time" },
    Command { name: "info", handler: info::handle_argv, help: "Show inode of a file or directory" },
    Command { name: "statfs", handler: statfs::handle_argv, help: "Show filesystem usage" },
    Command { name: "ping", handler: ping::handle_argv, help: "Send ICMP echo requests" },
    Command { name: "nslookup", handler: nslookup::handle_argv, help: "Resolve a hostname" },
    Command { name: "ntpdate", handler: ntpdate::handle_argv, help: "Set the clock from NTP" },
    Command { name: "nettest", handler: nettest::handle_argv, help: "Test the network hardware" },
    Command { name: "format", handler: format::handle_argv, help: "Erase the disk and reinstall" },
    Command { name: "exit", handler: exit::handle_argv, help: "Log out" },
    Command { name: "shutdown", handler: shutdown::handle_argv, help: "Power off the system" },
    Command { name: "reboot", handler: reboot::handle_argv, help: "Restart the system" },
];

pub struct Registry {
    pub map: HashMap<&'static str, Handler>,
}

impl Registry {
    pub fn new() -> Self {
        let map = COMMANDS.iter().map(|c| (c.name, c.handler)).collect();
        Self { map }
    }

    pub fn dispatch(&self, name: &str, argv: &[&str], context: &mut Context) {
        let Some(handler) = self.map.get(name) else {
            println!("{name}: command not found");
            return;
        };
        log::debug!("dispatch {name} {argv:?}");
        if let Err(err) = handler(argv, context) {
            eprintln!("{}", format!("{name}: {err:#}").red());
        }
    }
}

pub mod cat;
pub mod cd;
pub mod clear;
pub mod date;
pub mod echo;
pub mod exit;
pub mod format;
pub mod help;
pub mod info;
pub mod ls;
pub mod mkdir;
pub mod nettest;
pub mod nslookup;
pub mod ntpdate;
pub mod ping;
pub mod pwd;
pub mod reboot;
pub mod rm;
pub mod rmdir;
pub mod shutdown;
pub mod statfs;
pub mod touch;
pub mod uname;
pub mod whoami;
