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
use std::collections::{BTreeMap, HashMap};

use crate::config;

use super::DeviceError;

/// A scene-local channel and the universe position it drives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelIndex {
    /// The position in the universe buffer.
    pub universe_channel_id: u16,
    /// The value written when the scene is selected.
    pub value: u8,
}

/// A named, partial assignment of values to universe positions.
#[derive(Clone, Debug)]
pub struct Scene {
    alias: String,
    /// Ordered by scene channel id. Selecting a scene writes channels in this
    /// order, so the highest id wins when two channels share a position.
    channels: BTreeMap<u16, ChannelIndex>,
}

impl Scene {
    /// Builds a scene from its configuration. Stored values start at zero.
    pub fn from_config(config: &config::Scene) -> Scene {
        Scene {
            alias: config.alias().to_string(),
            channels: config
                .channel_map()
                .iter()
                .map(|mapping| {
                    (
                        mapping.scene_channel_id(),
                        ChannelIndex {
                            universe_channel_id: mapping.universe_channel_id(),
                            value: 0,
                        },
                    )
                })
                .collect(),
        }
    }

    /// Gets the alias of the scene.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Gets a single channel by its scene channel id.
    pub fn channel(&self, scene_channel_id: u16) -> Option<&ChannelIndex> {
        self.channels.get(&scene_channel_id)
    }

    /// Iterates over the channels in ascending scene channel id order.
    pub fn channels(&self) -> impl Iterator<Item = (u16, &ChannelIndex)> {
        self.channels.iter().map(|(id, channel)| (*id, channel))
    }
}

/// The scenes of one device, keyed by alias.
#[derive(Clone, Debug, Default)]
pub struct SceneCatalog {
    scenes: HashMap<String, Scene>,
    /// Aliases in configuration order.
    order: Vec<String>,
}

impl SceneCatalog {
    /// Builds a catalog from the ordered scene configurations. Aliases are
    /// expected to be unique; config validation rejects duplicates.
    pub fn from_config(scenes: &[config::Scene]) -> SceneCatalog {
        let mut catalog = SceneCatalog::default();
        for scene in scenes.iter().map(Scene::from_config) {
            if !catalog.scenes.contains_key(scene.alias()) {
                catalog.order.push(scene.alias().to_string());
            }
            catalog.scenes.insert(scene.alias().to_string(), scene);
        }
        catalog
    }

    /// Looks up a scene by alias.
    pub fn get(&self, alias: &str) -> Result<&Scene, DeviceError> {
        self.scenes
            .get(alias)
            .ok_or_else(|| DeviceError::UnknownScene(alias.to_string()))
    }

    /// Overwrites the stored value of a single scene channel.
    pub fn update_value(
        &mut self,
        alias: &str,
        scene_channel_id: u16,
        value: u8,
    ) -> Result<(), DeviceError> {
        let scene = self
            .scenes
            .get_mut(alias)
            .ok_or_else(|| DeviceError::UnknownScene(alias.to_string()))?;
        let channel = scene
            .channels
            .get_mut(&scene_channel_id)
            .ok_or_else(|| DeviceError::UnknownChannel {
                scene: alias.to_string(),
                channel: scene_channel_id,
            })?;
        channel.value = value;
        Ok(())
    }

    /// Gets the scene aliases in configuration order.
    pub fn aliases(&self) -> &[String] {
        &self.order
    }

    /// Returns the first configured scene, if any.
    pub fn first(&self) -> Option<&Scene> {
        self.order.first().and_then(|alias| self.scenes.get(alias))
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

#[cfg(test)]
mod test {
    use crate::config::{ChannelMapping, Scene as SceneConfig};

    use super::*;

    fn catalog() -> SceneCatalog {
        SceneCatalog::from_config(&[
            SceneConfig::new(
                "warm",
                vec![ChannelMapping::new(2, 11), ChannelMapping::new(1, 10)],
            ),
            SceneConfig::new("cold", vec![ChannelMapping::new(1, 20)]),
        ])
    }

    #[test]
    fn test_from_config() -> Result<(), DeviceError> {
        let catalog = catalog();
        assert_eq!(2, catalog.len());
        assert_eq!(vec!["warm", "cold"], catalog.aliases());
        assert_eq!("warm", catalog.first().unwrap().alias());

        let warm = catalog.get("warm")?;
        assert_eq!(
            Some(&ChannelIndex {
                universe_channel_id: 10,
                value: 0
            }),
            warm.channel(1)
        );
        assert_eq!(None, warm.channel(3));

        // Iteration is ordered by scene channel id, not configuration order.
        let ids: Vec<u16> = warm.channels().map(|(id, _)| id).collect();
        assert_eq!(vec![1, 2], ids);
        Ok(())
    }

    #[test]
    fn test_unknown_scene() {
        let catalog = catalog();
        assert!(matches!(
            catalog.get("missing"),
            Err(DeviceError::UnknownScene(alias)) if alias == "missing"
        ));
    }

    #[test]
    fn test_update_value() -> Result<(), DeviceError> {
        let mut catalog = catalog();
        catalog.update_value("warm", 1, 75)?;
        assert_eq!(75, catalog.get("warm")?.channel(1).unwrap().value);
        assert_eq!(0, catalog.get("cold")?.channel(1).unwrap().value);

        assert!(matches!(
            catalog.update_value("warm", 9, 1),
            Err(DeviceError::UnknownChannel { channel: 9, .. })
        ));
        assert!(matches!(
            catalog.update_value("missing", 1, 1),
            Err(DeviceError::UnknownScene(_))
        ));
        Ok(())
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = SceneCatalog::from_config(&[]);
        assert!(catalog.is_empty());
        assert!(catalog.first().is_none());
    }
}
