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

/// Typed error for config load and validation failures so callers can
/// distinguish e.g. file-not-found from a duplicate alias without string matching.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config load/parse error: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid duration: {0}")]
    Duration(#[from] duration_string::Error),

    #[error("device #{index}: valid {family} device alias must be provided")]
    EmptyDeviceAlias { family: &'static str, index: usize },

    #[error("found duplicate {family} device with alias '{alias}'")]
    DuplicateDevice { family: &'static str, alias: String },

    #[error("device '{device}': scene #{index} has no alias")]
    EmptySceneAlias { device: String, index: usize },

    #[error("device '{device}': duplicate scene '{scene}'")]
    DuplicateScene { device: String, scene: String },

    #[error("device '{device}', scene '{scene}': duplicate scene channel {channel}")]
    DuplicateChannel {
        device: String,
        scene: String,
        channel: u16,
    },

    #[error(
        "device '{device}', scene '{scene}': channel {channel} maps to universe position {position}, which is above 511"
    )]
    ChannelOutOfRange {
        device: String,
        scene: String,
        channel: u16,
        position: u16,
    },

    #[error("ArtNet device '{device}': universe {universe} is above the 15 bit port-address range")]
    UniverseOutOfRange { device: String, universe: u16 },

    #[error("device '{device}': default scene '{scene}' is not configured")]
    UnknownDefaultScene { device: String, scene: String },
}
