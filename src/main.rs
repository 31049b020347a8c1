use anyhow::Context as _;
use ephos_emu::context::{Context, Disk, Interface};
use ephos_emu::dev::{NullNic, SystemRtc, UdpTunnelNic};
use ephos_emu::fs::FileSystem;
use ephos_emu::net::NetworkStack;
use ephos_emu::utils::{arg_man, file_man, logger, tui};
use log::info;

fn main() -> anyhow::Result<()> {
    let args = arg_man::handle_prog_args();
    logger::init(args.log_level);

    let disk: Disk = Box::new(file_man::handle_fs(&args.image)?);
    let fs = FileSystem::mount(disk)?;

    // Without a tunnel the link stays down
    let nic: Interface = match args.tunnel() {
        Some((bind, peer)) => {
            let nic = UdpTunnelNic::open(bind, peer, args.mac)
                .with_context(|| format!("cannot open tunnel {bind} -> {peer}"))?;
            info!("frames tunnelled over UDP {bind} -> {peer}");
            Box::new(nic)
        }
        None => Box::new(NullNic::new(args.mac)),
    };
    let net = NetworkStack::new(nic, args.net_config());

    let mut context = Context::new(fs, net, Box::new(SystemRtc));
    tui::handle_app_loop(&mut context, &mut std::io::stdin().lock())?;
    context.sync()?;
    Ok(())
}
