//! Host runner for the central lock system.
//!
//! Builds the drivers of the configured board on a simulated GPIO bank and
//! ticks the lock controller until Ctrl-C. Terminal lines starting with `!`
//! press and release the simulated buttons and key fob (see
//! [`host_input`]).

mod config;
mod host_input;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use ccls_controller::{BluetoothCentralLockSystem, KeyFobCentralLockSystem};
use ccls_core::HardwareTarget;
use ccls_hardware::{
    DriverFactory, SimulatedLinxFactory, SimulatedUnoFactory, console::ConsoleBluetooth,
    gpio::SimulatedGpio,
};
use clap::Parser;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{ControllerConfig, LinkMode};
use crate::host_input::{CommandConsole, HostInputs};

/// Bluetooth central lock controller.
#[derive(Parser, Debug)]
#[command(name = "ccls")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial device of the Bluetooth module; implies serial mode.
    #[arg(short, long, conflicts_with = "console")]
    port: Option<String>,

    /// Use standard input/output as the Bluetooth link.
    #[arg(long)]
    console: bool,

    /// Log level or filter directive, e.g. `debug` or `ccls_controller=trace`.
    #[arg(short, long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(self, config: &mut ControllerConfig) {
        if let Some(port) = self.port {
            config.link.mode = LinkMode::Serial;
            config.link.port = Some(port);
        }
        if self.console {
            config.link.mode = LinkMode::Console;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ControllerConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ControllerConfig::default(),
    };
    args.apply(&mut config);

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.log_level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    config.validate().context("invalid configuration")?;
    info!(
        target_board = %config.target,
        version = ccls_core::VERSION,
        "Starting central lock controller"
    );

    run(config).await
}

async fn run(config: ControllerConfig) -> Result<()> {
    let gpio = SimulatedGpio::new();
    let inputs = HostInputs::new(gpio.clone(), config.pins());

    match config.target {
        HardwareTarget::UnoBluetooth => {
            if config.uses_default_credentials() {
                warn!("No credentials configured, using the built-in defaults");
            }
            let factory = SimulatedUnoFactory::new(gpio, config.bluetooth_link())
                .with_pins(config.pins())
                .with_pulse_duration(config.pulse_duration());
            let (link, power_locks, lock_button, unlock_button) = factory
                .build()
                .context("building Uno drivers")?
                .into_parts();
            let session = config.session_config()?;

            match config.link.mode {
                // The terminal is the phone; commands share it
                LinkMode::Console => {
                    let link = CommandConsole::new(link, inputs);
                    let mut system = BluetoothCentralLockSystem::new(
                        link,
                        power_locks,
                        lock_button,
                        unlock_button,
                        session,
                    );
                    control_loop(config.tick_interval(), || system.run()).await
                }
                LinkMode::Serial => {
                    let mut operator = operator_console(inputs)?;
                    let mut system = BluetoothCentralLockSystem::new(
                        link,
                        power_locks,
                        lock_button,
                        unlock_button,
                        session,
                    );
                    control_loop(config.tick_interval(), || {
                        operator.poll_commands()?;
                        system.run()
                    })
                    .await
                }
            }
        }
        HardwareTarget::Attiny84Linx => {
            let factory = SimulatedLinxFactory::new(gpio)
                .with_pins(config.pins())
                .with_pulse_duration(config.pulse_duration());
            let drivers = factory.build().context("building Linx drivers")?;
            let mut operator = operator_console(inputs)?;
            let mut system = KeyFobCentralLockSystem::from_drivers(drivers);
            control_loop(config.tick_interval(), || {
                operator.poll_commands()?;
                system.run()
            })
            .await
        }
    }
}

/// Command-only terminal for boards whose link does not use stdin.
fn operator_console(inputs: HostInputs) -> Result<CommandConsole<ConsoleBluetooth>> {
    let console = ConsoleBluetooth::spawn().context("starting operator console")?;
    info!("Operator console ready, e.g. '!press lock' then '!release lock'");
    Ok(CommandConsole::new(console, inputs))
}

/// Tick until Ctrl-C. Failed ticks are logged and the loop keeps going.
async fn control_loop<F>(period: Duration, mut tick: F) -> Result<()>
where
    F: FnMut() -> ccls_controller::Result<()>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(period_ms = period.as_millis() as u64, "Control loop running");
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = tick() {
                    warn!(error = %e, "Control tick failed");
                }
            }
            result = &mut shutdown => {
                result.context("waiting for Ctrl-C")?;
                info!("Shutdown requested, stopping control loop");
                return Ok(());
            }
        }
    }
}
