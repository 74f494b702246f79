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

use tracing::{debug, info, warn};

use crate::config::DeviceConfig;
use crate::transport::Transport;

use super::scene::SceneCatalog;
use super::signal::{Notifier, Signal};
use super::universe::{Universe, MAX_CHANNEL, UNIVERSE_SIZE};
use super::{Device, DeviceError, Kind};

/// The scene state machine of one device. It owns the universe, the scene
/// catalog and the transport, and is driven by a single caller at a time.
pub struct Controller<T: Transport> {
    alias: String,
    kind: Kind,
    universe: Universe,
    scenes: SceneCatalog,
    /// Key into `scenes`. None until a scene is selected.
    current_scene: Option<String>,
    transport: T,
    notifier: Notifier,
}

impl<T: Transport> Controller<T> {
    /// Creates a new controller with a dark universe. The default scene, if
    /// given, becomes the current scene without being transmitted.
    pub fn new(
        alias: &str,
        kind: Kind,
        scenes: SceneCatalog,
        default_scene: Option<&str>,
        transport: T,
        notifier: Notifier,
    ) -> Result<Controller<T>, DeviceError> {
        let current_scene = match default_scene {
            Some(default_scene) => Some(scenes.get(default_scene)?.alias().to_string()),
            None => None,
        };

        Ok(Controller {
            alias: alias.to_string(),
            kind,
            universe: Universe::new(),
            scenes,
            current_scene,
            transport,
            notifier,
        })
    }

    /// Creates a new controller from a device configuration.
    pub fn from_config<D: DeviceConfig>(
        kind: Kind,
        config: &D,
        transport: T,
        notifier: Notifier,
    ) -> Result<Controller<T>, DeviceError> {
        Controller::new(
            config.alias(),
            kind,
            SceneCatalog::from_config(config.scenes()),
            super::default_scene(config),
            transport,
            notifier,
        )
    }

    /// Sends the universe. The universe is left as is on failure.
    fn transmit(&mut self) -> Result<(), DeviceError> {
        if let Err(e) = self.transport.transmit(self.universe.as_slice()) {
            warn!(
                device = self.alias,
                address = self.transport.address(),
                err = e.to_string(),
                "Transmit failed, device state may have diverged"
            );
            return Err(e.into());
        }
        Ok(())
    }
}

impl<T: Transport> Device for Controller<T> {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn kind(&self) -> Kind {
        self.kind
    }

    fn select_scene(&mut self, alias: &str) -> Result<(), DeviceError> {
        let scene = self.scenes.get(alias)?;
        if let Some((_, channel)) = scene
            .channels()
            .find(|(_, channel)| channel.universe_channel_id > MAX_CHANNEL)
        {
            return Err(DeviceError::ChannelOutOfRange(channel.universe_channel_id));
        }

        // Channels are ordered by scene channel id, so the highest id wins on a shared position.
        for (_, channel) in scene.channels() {
            self.universe.set(channel.universe_channel_id, channel.value)?;
        }
        self.current_scene = Some(scene.alias().to_string());
        info!(device = self.alias, scene = alias, "Scene selected.");

        // The scene has changed even if the universe couldn't be sent.
        let result = self.transmit();
        self.notifier.publish(Signal::SceneChanged {
            device_alias: self.alias.clone(),
            scene_alias: alias.to_string(),
        });
        result
    }

    fn set_channel(&mut self, scene_channel_id: u16, value: u8) -> Result<(), DeviceError> {
        let scene_alias = self
            .current_scene
            .as_deref()
            .ok_or(DeviceError::NoSceneSelected)?;
        let position = self
            .scenes
            .get(scene_alias)?
            .channel(scene_channel_id)
            .ok_or_else(|| DeviceError::UnknownChannel {
                scene: scene_alias.to_string(),
                channel: scene_channel_id,
            })?
            .universe_channel_id;
        if !(1..=MAX_CHANNEL).contains(&position) {
            return Err(DeviceError::ChannelOutOfRange(position));
        }

        self.universe.set(position, value)?;
        debug!(
            device = self.alias,
            channel = scene_channel_id,
            position,
            value,
            "Channel set."
        );
        self.transmit()
    }

    fn save_scene(&mut self) -> Result<(), DeviceError> {
        let scene_alias = self
            .current_scene
            .clone()
            .ok_or(DeviceError::NoSceneSelected)?;
        let live: Vec<(u16, u8)> = self
            .scenes
            .get(&scene_alias)?
            .channels()
            .map(|(id, channel)| {
                let value = self.universe.get(channel.universe_channel_id);
                (id, value.unwrap_or(0))
            })
            .collect();
        for (scene_channel_id, value) in live {
            self.scenes.update_value(&scene_alias, scene_channel_id, value)?;
        }

        info!(device = self.alias, scene = scene_alias, "Scene saved.");
        self.notifier.publish(Signal::SceneSaved {
            device_alias: self.alias.clone(),
            scene_alias,
        });
        Ok(())
    }

    fn blackout(&mut self) -> Result<(), DeviceError> {
        self.universe.clear();
        info!(device = self.alias, "Blackout.");
        self.transmit()
    }

    fn retransmit(&mut self) -> Result<(), DeviceError> {
        self.transmit()
    }

    fn current_scene(&self) -> Option<&str> {
        self.current_scene.as_deref()
    }

    fn universe(&self) -> [u8; UNIVERSE_SIZE] {
        self.universe.snapshot()
    }

    fn scenes(&self) -> &SceneCatalog {
        &self.scenes
    }
}

impl<T: Transport> fmt::Display for Controller<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.alias,
            self.kind,
            self.transport.address()
        )
    }
}
