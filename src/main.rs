// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use clap::{crate_version, Parser, Subcommand};
use dmx_executor::config::{self, DeviceConfig};
use dmx_executor::device::{self, signal::Notifier};
use dmx_executor::driver::{keyboard, Dispatcher};
use dmx_executor::executor::Executor;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The number of signals that may queue up before they are dropped.
const SIGNAL_QUEUE_SIZE: usize = 256;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Scene-based ArtNet and DMX lighting control."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Starts the devices and reads operator commands from stdin.
    Start {
        /// The path to the device configuration (YAML or JSON).
        config_path: String,
    },
    /// Validates a configuration and lists its devices and scenes.
    Verify {
        /// The path to the device configuration (YAML or JSON).
        config_path: String,
    },
}

fn print_device<D: DeviceConfig>(family: &str, target: &str, fixture: &D) {
    println!("- {} ({} @ {})", fixture.alias(), family, target);
    for scene in fixture.scenes() {
        let default = match device::default_scene(fixture) {
            Some(default) if default == scene.alias() => " (default)",
            _ => "",
        };
        println!(
            "    - {}{}: {} channel(s)",
            scene.alias(),
            default,
            scene.channel_map().len()
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start { config_path } => {
            let config = config::load(&PathBuf::from(config_path))?;

            let (signals_tx, signals_rx) = crossbeam_channel::bounded(SIGNAL_QUEUE_SIZE);
            let executor = Executor::from_config(&config, Notifier::new(signals_tx))?;

            // Runs until every device, and with it every notifier, is gone.
            thread::spawn(move || {
                for signal in signals_rx.iter() {
                    info!(
                        device = signal.device_alias(),
                        scene = signal.scene_alias(),
                        "{}",
                        signal
                    );
                }
            });

            Dispatcher::new(executor, Arc::new(keyboard::Driver::new()))
                .join()
                .await?;
        }
        Commands::Verify { config_path } => {
            let config = config::load(&PathBuf::from(&config_path))?;

            if config.artnet_devices().is_empty() && config.dmx_devices().is_empty() {
                println!("No devices found in {}.", config_path);
                return Ok(());
            }

            println!(
                "Devices (count: {}):",
                config.artnet_devices().len() + config.dmx_devices().len()
            );
            for device in config.artnet_devices() {
                let target = format!("{}/{}", device.ip(), device.universe());
                print_device("ArtNet", &target, device);
            }
            for device in config.dmx_devices() {
                print_device("DMX", device.path(), device);
            }
        }
    }

    Ok(())
}
