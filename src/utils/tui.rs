use crate::commands::Registry;
use crate::commands::uname::SYSTEM_NAME;
use crate::context::{Context, Session};
use crate::fs::consts::MAX_NAME_LEN;
use anyhow::Context as _;
use colored::Colorize;
use log::info;
use std::io::{self, BufRead, Write};

fn write_greet() {
    println!(
        "{} v{}",
        SYSTEM_NAME.green(),
        env!("CARGO_PKG_VERSION").yellow()
    );
    println!("================\n");
}

fn write_prefix(user: &str) {
    let sigil = if user == "root" { "# " } else { "$ " };
    print!("{}{sigil}", user.green());
    let _ = io::stdout().flush();
}

// None once the input is exhausted
fn read_line(input: &mut impl BufRead, prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn valid_username(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains(char::is_whitespace)
}

/// Asks for hostname, user and password, then installs. Returns false if the
/// input ran out before the wizard finished.
fn run_installer(context: &mut Context, input: &mut impl BufRead) -> anyhow::Result<bool> {
    println!("===================================");
    println!("   {SYSTEM_NAME} Installation Wizard");
    println!("===================================\n");
    println!("Welcome! Let's set up your system.\n");

    let Some(hostname) = read_line(input, "Enter device hostname: ")? else {
        return Ok(false);
    };

    let username = loop {
        let Some(name) = read_line(input, "Enter username: ")? else {
            return Ok(false);
        };
        if valid_username(&name) {
            break name;
        }
        println!("Invalid username. Use 1 to {MAX_NAME_LEN} characters without '/' or spaces.\n");
    };

    let password = loop {
        let Some(first) = read_line(input, "Enter password: ")? else {
            return Ok(false);
        };
        let Some(second) = read_line(input, "Confirm password: ")? else {
            return Ok(false);
        };
        if first == second {
            break first;
        }
        println!("Passwords do not match. Please try again.\n");
    };

    println!("\nInstalling {SYSTEM_NAME}...");
    println!("- Creating file system...");
    println!("- Setting up directories...");
    println!("- Writing configuration to disk...");
    context
        .fs
        .install(hostname.trim(), &username, &password)
        .context("installation failed")?;
    println!("\n{}", "Installation successful!".green());
    Ok(true)
}

/// Loops until the stored user authenticates. Returns false on end of input.
fn login(context: &mut Context, input: &mut impl BufRead) -> anyhow::Result<bool> {
    let stored = context.fs.username();
    loop {
        let Some(name) = read_line(input, "login: ")? else {
            return Ok(false);
        };
        if name != stored {
            println!("Login incorrect\n");
            continue;
        }
        let Some(password) = read_line(input, "Password: ")? else {
            return Ok(false);
        };
        if context.fs.verify_password(&password) {
            context.login();
            return Ok(true);
        }
        println!("Login incorrect\n");
    }
}

// Runs commands until one ends the session or input runs out.
fn shell(context: &mut Context, registry: &Registry, input: &mut impl BufRead) -> io::Result<Session> {
    loop {
        write_prefix(context.user());
        let mut user_input = String::new();
        if input.read_line(&mut user_input)? == 0 {
            println!();
            return Ok(Session::Shutdown);
        }

        let mut it = user_input.split_whitespace();
        let Some(command) = it.next() else {
            continue;
        };
        let args: Vec<&str> = it.collect();

        registry.dispatch(command, &args, context);
        if context.session() != Session::Active {
            return Ok(context.session());
        }
    }
}

/// Boot, install if needed, login and shell, until shutdown or end of input.
pub fn handle_app_loop(context: &mut Context, input: &mut impl BufRead) -> anyhow::Result<()> {
    let registry = Registry::new();

    'boot: loop {
        write_greet();
        if !context.fs.check_installed() {
            info!("volume not installed, starting installer");
            if !run_installer(context, input)? {
                return Ok(());
            }
            println!("\nInstallation complete! Rebooting...\n");
            continue 'boot;
        }

        println!("{} login: \n", context.hostname());
        loop {
            if !login(context, input)? {
                return Ok(());
            }
            println!("\nWelcome to {}!", context.hostname());
            println!("Last login: {}\n", context.local_time());

            match shell(context, &registry, input)? {
                Session::Logout | Session::Active => continue,
                Session::Reboot => continue 'boot,
                Session::Shutdown => return Ok(()),
            }
        }
    }
}
