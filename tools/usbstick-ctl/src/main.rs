mod logging;
mod step;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use step::Step;
use usbstick::{StickConfig, TransportKind, UsbStick};
use usbstick_hal::{
    CommandOps, FakeHal, FileTransferOps, LocalHal, Operation, SshHal, SshTarget, TargetHal,
};

#[derive(Debug, Parser)]
#[command(name = "usbstick-ctl")]
#[command(about = "Drive an emulated USB stick on a target board")]
#[command(long_about = "Drive an emulated USB stick on a target board.\n\n\
    Steps run in order against one controller, so an image uploaded by an earlier step can be\n\
    switched to by a later one. Example:\n\n  \
    usbstick-ctl --config stick.toml upload=foo.img switch=foo.img put=fw.bin plug-in")]
struct Cli {
    /// Path to the stick TOML configuration
    #[arg(long, short = 'c')]
    config: PathBuf,

    /// Override the target host from the configuration
    #[arg(long)]
    host: Option<String>,

    /// Record the operations instead of touching the target, then print them
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Steps: upload=PATH, switch=NAME, plug-in, plug-out, put=LOCAL[:DEST],
    /// get=REMOTE[:LOCAL], cleanup, status
    #[arg(required = true)]
    steps: Vec<Step>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = prepare_config(StickConfig::load(&cli.config)?, cli.host, cli.dry_run)
        .with_context(|| format!("Invalid config file: {}", cli.config.display()))?;

    if cli.dry_run {
        let (result, lines) = dry_run(&config, &cli.steps);
        for line in lines {
            println!("{}", line);
        }
        return result;
    }

    let transport = &config.transport;
    match transport.kind {
        TransportKind::Local => {
            let hal = LocalHal::new().with_timeout(transport.command_timeout());
            run_steps(&mut stick_on(&config, hal), &cli.steps)
        }
        TransportKind::Ssh => {
            let host = transport
                .host
                .clone()
                .context("transport.host is required for ssh transport")?;
            let mut target = SshTarget::new(host).with_port(transport.port);
            if let Some(user) = &transport.user {
                target = target.with_user(user.clone());
            }
            let hal = SshHal::new(target)
                .with_timeouts(transport.command_timeout(), transport.transfer_timeout());
            run_steps(&mut stick_on(&config, hal), &cli.steps)
        }
    }
}

/// Apply command-line overrides, then validate. A dry run never reaches the target, so it
/// does not need a transport endpoint.
fn prepare_config(
    mut config: StickConfig,
    host: Option<String>,
    dry_run: bool,
) -> Result<StickConfig> {
    if let Some(host) = host {
        config.transport.host = Some(host);
    }
    if dry_run {
        config.validate_layout()?;
    } else {
        config.validate()?;
    }
    Ok(config)
}

/// Run `steps` against a recording backend and describe what would have been issued.
fn dry_run(config: &StickConfig, steps: &[Step]) -> (Result<()>, Vec<String>) {
    let hal = FakeHal::new();
    let result = run_steps(&mut stick_on(config, hal.clone()), steps);
    let lines = hal.operations().iter().map(describe).collect();
    (result, lines)
}

/// One backend serves as both the command runner and the file transport.
fn stick_on<H: TargetHal + Clone>(config: &StickConfig, hal: H) -> UsbStick<H, H> {
    UsbStick::new(hal.clone(), hal, config.image_dir.clone()).with_layout(config.layout.clone())
}

fn run_steps<C: CommandOps, F: FileTransferOps>(
    stick: &mut UsbStick<C, F>,
    steps: &[Step],
) -> Result<()> {
    for step in steps {
        log::info!("step: {}", step);
        match step {
            Step::Upload(path) => {
                stick.upload_image(path)?;
            }
            Step::Switch(name) => stick.switch_image(name)?,
            Step::PlugIn => stick.plug_in()?,
            Step::PlugOut => stick.plug_out()?,
            Step::Put { local, destination } => stick.put_file(local, destination.as_deref())?,
            Step::Get { remote, local } => {
                let landed = stick.get_file(remote, local.as_deref())?;
                println!("{}", landed.display());
            }
            Step::Cleanup => stick.cleanup()?,
            Step::Status => println!(
                "status={} active={} known=[{}]",
                stick.status(),
                stick.active_image().unwrap_or("-"),
                stick.known_images().join(",")
            ),
        }
    }
    Ok(())
}

fn describe(op: &Operation) -> String {
    match op {
        Operation::Run { command } => format!("run (unchecked): {}", command),
        Operation::RunCheck { command } => format!("run: {}", command),
        Operation::Put { local, remote } => format!("put: {} -> {}", local.display(), remote),
        Operation::Get { remote, local } => match local {
            Some(local) => format!("get: {} -> {}", remote, local.display()),
            None => format!("get: {}", remote),
        },
    }
}
