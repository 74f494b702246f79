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
use std::net::IpAddr;

use serde::Deserialize;

/// Maps a scene-local channel number to a position in the device universe.
#[derive(Deserialize, Clone, Debug)]
pub struct ChannelMapping {
    /// The channel number operators use while the scene is active.
    scene_channel_id: u16,
    /// The position in the universe buffer.
    universe_channel_id: u16,
}

impl ChannelMapping {
    /// Creates a new channel mapping.
    pub fn new(scene_channel_id: u16, universe_channel_id: u16) -> ChannelMapping {
        ChannelMapping {
            scene_channel_id,
            universe_channel_id,
        }
    }

    /// Gets the scene-local channel number.
    pub fn scene_channel_id(&self) -> u16 {
        self.scene_channel_id
    }

    /// Gets the universe position.
    pub fn universe_channel_id(&self) -> u16 {
        self.universe_channel_id
    }
}

/// A YAML representation of a scene.
#[derive(Deserialize, Clone, Debug)]
pub struct Scene {
    #[serde(rename = "scene_alias")]
    alias: String,

    #[serde(default)]
    channel_map: Vec<ChannelMapping>,
}

impl Scene {
    /// Creates a new scene configuration.
    pub fn new(alias: &str, channel_map: Vec<ChannelMapping>) -> Scene {
        Scene {
            alias: alias.to_string(),
            channel_map,
        }
    }

    /// Gets the scene alias.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Gets the channel mappings in configuration order.
    pub fn channel_map(&self) -> &[ChannelMapping] {
        &self.channel_map
    }
}

/// Fields shared by every device family.
pub trait DeviceConfig {
    /// The unique name of the device within its family.
    fn alias(&self) -> &str;

    /// The scene to select at startup. Defaults to the first scene.
    fn default_scene(&self) -> Option<&str>;

    /// The configured scenes, in order.
    fn scenes(&self) -> &[Scene];
}

/// An ArtNet node reachable over UDP.
#[derive(Deserialize, Clone, Debug)]
pub struct ArtNetDevice {
    alias: String,

    /// The address of the node.
    ip: IpAddr,

    /// The ArtNet port-address to send to.
    #[serde(default)]
    universe: u16,

    default_scene: Option<String>,

    #[serde(default)]
    scenes: Vec<Scene>,
}

impl ArtNetDevice {
    /// Creates a new ArtNet device configuration.
    pub fn new(
        alias: &str,
        ip: IpAddr,
        universe: u16,
        default_scene: Option<String>,
        scenes: Vec<Scene>,
    ) -> ArtNetDevice {
        ArtNetDevice {
            alias: alias.to_string(),
            ip,
            universe,
            default_scene,
            scenes,
        }
    }

    /// Gets the node address.
    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    /// Gets the ArtNet port-address.
    pub fn universe(&self) -> u16 {
        self.universe
    }
}

impl DeviceConfig for ArtNetDevice {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn default_scene(&self) -> Option<&str> {
        self.default_scene.as_deref()
    }

    fn scenes(&self) -> &[Scene] {
        &self.scenes
    }
}

/// A DMX interface attached through a serial port (Enttec DMX USB Pro).
#[derive(Deserialize, Clone, Debug)]
pub struct DmxDevice {
    alias: String,

    /// Path to the serial device, e.g. /dev/ttyUSB0.
    path: String,

    default_scene: Option<String>,

    #[serde(default)]
    scenes: Vec<Scene>,
}

impl DmxDevice {
    /// Creates a new serial DMX device configuration.
    pub fn new(
        alias: &str,
        path: &str,
        default_scene: Option<String>,
        scenes: Vec<Scene>,
    ) -> DmxDevice {
        DmxDevice {
            alias: alias.to_string(),
            path: path.to_string(),
            default_scene,
            scenes,
        }
    }

    /// Gets the serial device path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl DeviceConfig for DmxDevice {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn default_scene(&self) -> Option<&str> {
        self.default_scene.as_deref()
    }

    fn scenes(&self) -> &[Scene] {
        &self.scenes
    }
}
