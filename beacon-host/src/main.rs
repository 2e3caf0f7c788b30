//! `beacon-remote`: interactive remote for a Beacon peripheral

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use beacon_host::session::{Outcome, RequestResult};
use beacon_host::{CliCommand, HostTransport, RemoteConfig, Requester, Session, TransportError};
use log::{error, info, warn};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = try_main() {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let options = match CliCommand::parse(&args) {
        Ok(CliCommand::ShowHelp) => {
            CliCommand::print_help();
            return Ok(());
        }
        Ok(CliCommand::ShowVersion) => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Ok(CliCommand::Run(options)) => options,
        Err(err) => {
            CliCommand::print_help();
            return Err(err.into());
        }
    };

    let config = RemoteConfig::resolve(&options).context("loading configuration")?;

    ctrlc::set_handler(|| {
        info!("Ctrl-C caught, exiting");
        std::process::exit(0);
    })
    .context("installing Ctrl-C handler")?;

    run(&config)
}

#[cfg(target_os = "linux")]
fn run(config: &RemoteConfig) -> Result<()> {
    use linux_embedded_hal::{Delay, I2cdev};

    let bus = I2cdev::new(&config.bus).with_context(|| format!("opening {}", config.bus))?;
    info!("opened {} for target {:#04x}", config.bus, config.address);

    let mut transport = HostTransport::new(bus, Delay, config.transport_config());
    transport.enable().context("enabling transport")?;

    interact(transport, config)
}

#[cfg(not(target_os = "linux"))]
fn run(_config: &RemoteConfig) -> Result<()> {
    bail!("beacon-remote needs a Linux I2C character device")
}

fn report(result: RequestResult) -> Result<(), TransportError> {
    match result {
        Ok(Some(response)) => {
            println!("response: {response}");
            Ok(())
        }
        Ok(None) => {
            warn!("no response");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn interact<R: Requester + Send + 'static>(requester: R, config: &RemoteConfig) -> Result<()> {
    let mut session = Session::new(requester, config.poll_request.clone(), config.poll_interval());
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("\u{25ba} ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("reading stdin")?;

        let outcome = session.handle_line(&line, |result| {
            if let Err(e) = report(result) {
                error!("poll failed: {e}");
            }
        });
        match outcome {
            Outcome::Idle => {}
            Outcome::Quit => break,
            Outcome::Sent(command, result) => {
                if let Err(e) = report(result) {
                    session.shutdown();
                    bail!("'{command}' failed: {e}");
                }
            }
        }
    }

    session.shutdown();
    info!("bye");
    Ok(())
}
