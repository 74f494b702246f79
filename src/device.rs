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

use crate::config::{self, DeviceConfig};
use crate::transport::{ArtNet, Enttec, Transport, TransportError};

use self::scene::SceneCatalog;
use self::signal::Notifier;
use self::universe::UNIVERSE_SIZE;

pub mod controller;
pub mod scene;
pub mod signal;
pub mod universe;

pub use self::controller::Controller;
pub use self::signal::Signal;

/// Errors returned by device operations. None of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("unknown scene '{0}'")]
    UnknownScene(String),

    #[error("channel {channel} doesn't belong to scene '{scene}'")]
    UnknownChannel { scene: String, channel: u16 },

    #[error("no scene is selected")]
    NoSceneSelected,

    #[error("channel number should be between 1 and 511, but got: {0}")]
    ChannelOutOfRange(u16),

    /// The local universe was updated but could not be sent, so the device may
    /// not reflect it. Retrying the transmit is enough to converge.
    #[error("transmit failed: {0}")]
    Transmit(#[from] TransportError),
}

/// Errors raised while building a device from its configuration.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("device '{alias}': unable to open transport: {source}")]
    Transport {
        alias: String,
        source: TransportError,
    },

    #[error("device '{alias}': {source}")]
    Scene { alias: String, source: DeviceError },
}

/// The protocol family of a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    ArtNet,
    Dmx,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::ArtNet => write!(f, "ArtNet"),
            Kind::Dmx => write!(f, "DMX"),
        }
    }
}

/// A lighting device that can switch scenes. Every protocol family shares the
/// same controller logic and differs only in how universes are transmitted.
pub trait Device: fmt::Display + Send {
    /// The unique name of this device within its family.
    fn alias(&self) -> &str;

    /// The protocol family of this device.
    fn kind(&self) -> Kind;

    /// Selects the scene with the given alias and transmits its values.
    fn select_scene(&mut self, alias: &str) -> Result<(), DeviceError>;

    /// Overrides a channel of the current scene without storing it.
    fn set_channel(&mut self, scene_channel_id: u16, value: u8) -> Result<(), DeviceError>;

    /// Stores the live values of the current scene's channels in the scene.
    fn save_scene(&mut self) -> Result<(), DeviceError>;

    /// Forces every channel to zero.
    fn blackout(&mut self) -> Result<(), DeviceError>;

    /// Resends the current universe, e.g. after a failed transmit.
    fn retransmit(&mut self) -> Result<(), DeviceError>;

    /// The alias of the current scene, if one is selected.
    fn current_scene(&self) -> Option<&str>;

    /// A copy of the live universe.
    fn universe(&self) -> [u8; UNIVERSE_SIZE];

    /// The scenes of this device.
    fn scenes(&self) -> &SceneCatalog;
}

/// Creates an ArtNet device from its configuration.
pub fn artnet(
    config: &config::ArtNetDevice,
    transmit_timeout: Duration,
    notifier: Notifier,
) -> Result<Box<dyn Device>, OpenError> {
    let transport = ArtNet::new(config.ip(), config.universe(), transmit_timeout)
        .map_err(|source| OpenError::Transport {
            alias: config.alias().to_string(),
            source,
        })?;
    open(Kind::ArtNet, config, transport, notifier)
}

/// Creates a serial DMX device from its configuration.
pub fn dmx(
    config: &config::DmxDevice,
    transmit_timeout: Duration,
    notifier: Notifier,
) -> Result<Box<dyn Device>, OpenError> {
    let transport = Enttec::new(config.path(), transmit_timeout).map_err(|source| {
        OpenError::Transport {
            alias: config.alias().to_string(),
            source,
        }
    })?;
    open(Kind::Dmx, config, transport, notifier)
}

fn open<D: DeviceConfig, T: Transport + 'static>(
    kind: Kind,
    config: &D,
    transport: T,
    notifier: Notifier,
) -> Result<Box<dyn Device>, OpenError> {
    let controller = Controller::from_config(kind, config, transport, notifier);
    let controller = controller.map_err(|source| OpenError::Scene {
        alias: config.alias().to_string(),
        source,
    })?;
    Ok(Box::new(controller))
}

/// Returns the scene a device starts with: the configured default or the first scene.
pub fn default_scene<D: DeviceConfig>(config: &D) -> Option<&str> {
    config
        .default_scene()
        .or_else(|| config.scenes().first().map(|scene| scene.alias()))
}
