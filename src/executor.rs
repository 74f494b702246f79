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
use std::fmt;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{error, info, span, warn, Level};

use crate::config::{ConfigError, UserConfig};
use crate::device::{self, signal::Notifier, Device, DeviceError, Kind, OpenError};

/// The number of commands that may queue up for a single device.
const COMMAND_QUEUE_SIZE: usize = 16;

/// A command for a single device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Selects a scene by alias.
    SelectScene(String),
    /// Overrides a channel of the current scene.
    SetChannel { channel: u16, value: u8 },
    /// Stores the live values in the current scene.
    SaveScene,
    /// Forces every channel to zero.
    Blackout,
    /// Resends the current universe.
    Retransmit,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SelectScene(scene) => write!(f, "select {}", scene),
            Command::SetChannel { channel, value } => write!(f, "set {} {}", channel, value),
            Command::SaveScene => write!(f, "save"),
            Command::Blackout => write!(f, "blackout"),
            Command::Retransmit => write!(f, "retransmit"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("unknown device '{0}'")]
    UnknownDevice(String),

    #[error("device alias '{0}' is used by several protocols, qualify it as artnet:{0} or dmx:{0}")]
    AmbiguousDevice(String),

    #[error("device loop for '{0}' is closed")]
    Closed(String),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Open(#[from] OpenError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

struct Request {
    command: Command,
    reply: oneshot::Sender<Result<(), DeviceError>>,
}

/// The command queue and loop of a single device.
struct DeviceHandle {
    alias: String,
    kind: Kind,
    sender: mpsc::Sender<Request>,
    join_handle: JoinHandle<()>,
}

/// Runs one command loop per device. Commands for the same device are applied
/// one at a time; different devices run independently.
pub struct Executor {
    devices: Vec<DeviceHandle>,
    shutdown_timeout: Duration,
}

impl Executor {
    /// Starts a command loop for each device. Must be called within a tokio runtime.
    pub fn new(devices: Vec<Box<dyn Device>>, shutdown_timeout: Duration) -> Executor {
        let devices = devices
            .into_iter()
            .map(|device| {
                let (sender, receiver) = mpsc::channel(COMMAND_QUEUE_SIZE);
                let alias = device.alias().to_string();
                let kind = device.kind();
                let join_handle = tokio::task::spawn_blocking(move || run(device, receiver));
                DeviceHandle {
                    alias,
                    kind,
                    sender,
                    join_handle,
                }
            })
            .collect();

        Executor {
            devices,
            shutdown_timeout,
        }
    }

    /// Builds every configured device and starts the executor.
    pub fn from_config(config: &UserConfig, notifier: Notifier) -> Result<Executor, ExecutorError> {
        let transmit_timeout = config.transmit_timeout()?;
        let mut devices: Vec<Box<dyn Device>> = Vec::new();
        for artnet in config.artnet_devices() {
            devices.push(device::artnet(artnet, transmit_timeout, notifier.clone())?);
        }
        for dmx in config.dmx_devices() {
            devices.push(device::dmx(dmx, transmit_timeout, notifier.clone())?);
        }
        for device in devices.iter() {
            info!(device = device.to_string(), "Device ready.");
        }

        Ok(Executor::new(devices, config.shutdown_timeout()?))
    }

    /// Lists the devices as (protocol, alias) pairs.
    pub fn devices(&self) -> impl Iterator<Item = (Kind, &str)> {
        self.devices
            .iter()
            .map(|handle| (handle.kind, handle.alias.as_str()))
    }

    /// Finds a device by alias. An alias may be qualified with its protocol
    /// ("artnet:wash", "dmx:wash") when it is used by both families.
    fn resolve(&self, name: &str) -> Result<&DeviceHandle, ExecutorError> {
        let (kind, alias) = match name.split_once(':') {
            Some(("artnet", alias)) => (Some(Kind::ArtNet), alias),
            Some(("dmx", alias)) => (Some(Kind::Dmx), alias),
            _ => (None, name),
        };

        let mut matches = self.devices.iter().filter(|handle| {
            handle.alias == alias && kind.map_or(true, |kind| handle.kind == kind)
        });
        match (matches.next(), matches.next()) {
            (Some(handle), None) => Ok(handle),
            (Some(_), Some(_)) => Err(ExecutorError::AmbiguousDevice(alias.to_string())),
            (None, _) => Err(ExecutorError::UnknownDevice(name.to_string())),
        }
    }

    /// Runs a command on a device and waits for its result.
    pub async fn execute(&self, device: &str, command: Command) -> Result<(), ExecutorError> {
        let handle = self.resolve(device)?;
        let (reply, result) = oneshot::channel();
        handle
            .sender
            .send(Request { command, reply })
            .await
            .map_err(|_| ExecutorError::Closed(handle.alias.clone()))?;

        result
            .await
            .map_err(|_| ExecutorError::Closed(handle.alias.clone()))??;
        Ok(())
    }

    /// Blacks out every device. All devices are attempted; the first error is returned.
    pub async fn blackout_all(&self) -> Result<(), ExecutorError> {
        let mut first_error = None;
        for handle in self.devices.iter() {
            let name = qualified_name(handle);
            if let Err(e) = self.execute(&name, Command::Blackout).await {
                error!(device = name, err = e.to_string(), "Blackout failed.");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Closes every command queue and waits for the device loops to finish.
    /// Loops still busy after the shutdown timeout are abandoned.
    pub async fn shutdown(self) {
        let deadline = Instant::now() + self.shutdown_timeout;
        // Every queue is closed up front so idle loops stop while busy ones are awaited.
        let loops: Vec<(String, JoinHandle<()>)> = self
            .devices
            .into_iter()
            .map(|handle| (handle.alias, handle.join_handle))
            .collect();

        for (alias, join_handle) in loops {
            match time::timeout_at(deadline, join_handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(device = alias, err = e.to_string(), "Device loop failed."),
                Err(_) => warn!(device = alias, "Device loop did not stop in time, abandoning."),
            }
        }
        info!("Executor stopped.");
    }
}

fn qualified_name(handle: &DeviceHandle) -> String {
    match handle.kind {
        Kind::ArtNet => format!("artnet:{}", handle.alias),
        Kind::Dmx => format!("dmx:{}", handle.alias),
    }
}

/// Applies commands to a device until its queue closes.
fn run(mut device: Box<dyn Device>, mut requests: mpsc::Receiver<Request>) {
    let span = span!(Level::INFO, "device", name = device.to_string());
    let _enter = span.enter();

    info!("Device loop started.");
    while let Some(Request { command, reply }) = requests.blocking_recv() {
        let result = match &command {
            Command::SelectScene(scene) => device.select_scene(scene),
            Command::SetChannel { channel, value } => device.set_channel(*channel, *value),
            Command::SaveScene => device.save_scene(),
            Command::Blackout => device.blackout(),
            Command::Retransmit => device.retransmit(),
        };
        if let Err(e) = &result {
            warn!(
                command = command.to_string(),
                err = e.to_string(),
                "Command failed."
            );
        }
        // The caller may have stopped waiting.
        let _ = reply.send(result);
    }
    info!("Device loop closing.");
}
