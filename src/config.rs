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
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use ::config::{Config, File, FileFormat};
use duration_string::DurationString;
use serde::Deserialize;
use tracing::warn;

pub use self::device::{ArtNetDevice, ChannelMapping, DeviceConfig, DmxDevice, Scene};
pub use self::error::ConfigError;

pub mod device;
pub mod error;

/// The highest universe position a scene channel may map to.
const MAX_UNIVERSE_CHANNEL: u16 = 511;

/// The highest ArtNet port-address (net, sub-net and universe).
const MAX_ARTNET_UNIVERSE: u16 = 0x7fff;

/// The default time a single transmission may take.
pub const DEFAULT_TRANSMIT_TIMEOUT: Duration = Duration::from_millis(100);

/// The default time to wait for device loops to finish at shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// The user configuration: every device and its scenes.
#[derive(Deserialize, Clone, Debug)]
pub struct UserConfig {
    /// How long a single transmission may take, e.g. "100ms".
    transmit_timeout: Option<String>,

    /// How long to wait for device loops to finish at shutdown, e.g. "1s".
    shutdown_timeout: Option<String>,

    /// Serial DMX devices.
    #[serde(default)]
    dmx_devices: Vec<DmxDevice>,

    /// ArtNet devices.
    #[serde(default)]
    artnet_devices: Vec<ArtNetDevice>,
}

impl UserConfig {
    /// Creates a new user configuration.
    pub fn new(dmx_devices: Vec<DmxDevice>, artnet_devices: Vec<ArtNetDevice>) -> UserConfig {
        UserConfig {
            transmit_timeout: None,
            shutdown_timeout: None,
            dmx_devices,
            artnet_devices,
        }
    }

    /// Gets the serial DMX devices.
    pub fn dmx_devices(&self) -> &[DmxDevice] {
        &self.dmx_devices
    }

    /// Gets the ArtNet devices.
    pub fn artnet_devices(&self) -> &[ArtNetDevice] {
        &self.artnet_devices
    }

    /// Gets the transmit timeout.
    pub fn transmit_timeout(&self) -> Result<Duration, ConfigError> {
        parse_duration(self.transmit_timeout.as_ref(), DEFAULT_TRANSMIT_TIMEOUT)
    }

    /// Gets the shutdown timeout.
    pub fn shutdown_timeout(&self) -> Result<Duration, ConfigError> {
        parse_duration(self.shutdown_timeout.as_ref(), DEFAULT_SHUTDOWN_TIMEOUT)
    }

    /// Checks the configuration before any device is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dmx_devices.is_empty() && self.artnet_devices.is_empty() {
            warn!("DMX/ArtNet devices were not found in configuration");
        }

        validate_family("DMX", &self.dmx_devices)?;
        validate_family("ArtNet", &self.artnet_devices)?;
        for device in self.artnet_devices.iter() {
            if device.universe() > MAX_ARTNET_UNIVERSE {
                return Err(ConfigError::UniverseOutOfRange {
                    device: device.alias().to_string(),
                    universe: device.universe(),
                });
            }
        }
        self.transmit_timeout()?;
        self.shutdown_timeout()?;

        Ok(())
    }
}

fn parse_duration(value: Option<&String>, default: Duration) -> Result<Duration, ConfigError> {
    match value {
        Some(duration) => Ok(DurationString::from_string(duration.clone())?.into()),
        None => Ok(default),
    }
}

fn validate_family<D: DeviceConfig>(
    family: &'static str,
    devices: &[D],
) -> Result<(), ConfigError> {
    let mut aliases: HashSet<&str> = HashSet::new();
    for (index, device) in devices.iter().enumerate() {
        if device.alias().is_empty() {
            return Err(ConfigError::EmptyDeviceAlias { family, index });
        }
        if !aliases.insert(device.alias()) {
            return Err(ConfigError::DuplicateDevice {
                family,
                alias: device.alias().to_string(),
            });
        }
        validate_scenes(device)?;
    }
    Ok(())
}

fn validate_scenes<D: DeviceConfig>(device: &D) -> Result<(), ConfigError> {
    let mut scenes: HashSet<&str> = HashSet::new();
    for (index, scene) in device.scenes().iter().enumerate() {
        if scene.alias().is_empty() {
            return Err(ConfigError::EmptySceneAlias {
                device: device.alias().to_string(),
                index,
            });
        }
        if !scenes.insert(scene.alias()) {
            return Err(ConfigError::DuplicateScene {
                device: device.alias().to_string(),
                scene: scene.alias().to_string(),
            });
        }

        let mut channels: HashSet<u16> = HashSet::new();
        for mapping in scene.channel_map() {
            if !channels.insert(mapping.scene_channel_id()) {
                return Err(ConfigError::DuplicateChannel {
                    device: device.alias().to_string(),
                    scene: scene.alias().to_string(),
                    channel: mapping.scene_channel_id(),
                });
            }
            if mapping.universe_channel_id() > MAX_UNIVERSE_CHANNEL {
                return Err(ConfigError::ChannelOutOfRange {
                    device: device.alias().to_string(),
                    scene: scene.alias().to_string(),
                    channel: mapping.scene_channel_id(),
                    position: mapping.universe_channel_id(),
                });
            }
        }
    }

    if let Some(default_scene) = device.default_scene() {
        if !scenes.contains(default_scene) {
            return Err(ConfigError::UnknownDefaultScene {
                device: device.alias().to_string(),
                scene: default_scene.to_string(),
            });
        }
    }

    Ok(())
}

/// Loads and validates the configuration file at the given path. The format
/// (YAML or JSON) is inferred from the file extension.
pub fn load(path: &Path) -> Result<UserConfig, ConfigError> {
    let config: UserConfig = Config::builder()
        .add_source(File::from(path))
        .build()?
        .try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Parses and validates configuration text.
pub fn parse(text: &str, format: FileFormat) -> Result<UserConfig, ConfigError> {
    let config: UserConfig = Config::builder()
        .add_source(File::from_str(text, format))
        .build()?
        .try_deserialize()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod test {
    use std::{io::Write, net::IpAddr};

    use super::*;

    const VALID: &str = r#"
        transmit_timeout: 250ms
        artnet_devices:
          - alias: front-wash
            ip: 192.168.1.50
            universe: 3
            default_scene: cold
            scenes:
              - scene_alias: warm
                channel_map:
                  - scene_channel_id: 1
                    universe_channel_id: 10
                  - scene_channel_id: 2
                    universe_channel_id: 11
              - scene_alias: cold
                channel_map:
                  - scene_channel_id: 1
                    universe_channel_id: 12
        dmx_devices:
          - alias: back-truss
            path: /dev/ttyUSB0
            scenes:
              - scene_alias: warm
                channel_map:
                  - scene_channel_id: 5
                    universe_channel_id: 1
    "#;

    fn parse_yaml(yaml: &str) -> Result<UserConfig, ConfigError> {
        parse(yaml, FileFormat::Yaml)
    }

    #[test]
    fn test_parse_valid() -> Result<(), ConfigError> {
        let config = parse_yaml(VALID)?;

        assert_eq!(Duration::from_millis(250), config.transmit_timeout()?);
        assert_eq!(DEFAULT_SHUTDOWN_TIMEOUT, config.shutdown_timeout()?);

        let artnet = &config.artnet_devices()[0];
        assert_eq!("front-wash", artnet.alias());
        assert_eq!("192.168.1.50".parse::<IpAddr>().unwrap(), artnet.ip());
        assert_eq!(3, artnet.universe());
        assert_eq!(Some("cold"), artnet.default_scene());
        assert_eq!(2, artnet.scenes().len());
        assert_eq!("warm", artnet.scenes()[0].alias());
        assert_eq!(10, artnet.scenes()[0].channel_map()[0].universe_channel_id());
        assert_eq!(2, artnet.scenes()[0].channel_map()[1].scene_channel_id());

        let dmx = &config.dmx_devices()[0];
        assert_eq!("back-truss", dmx.alias());
        assert_eq!("/dev/ttyUSB0", dmx.path());
        assert_eq!(None, dmx.default_scene());
        Ok(())
    }

    #[test]
    fn test_empty_config() -> Result<(), ConfigError> {
        let config = parse_yaml("artnet_devices: []")?;
        assert!(config.artnet_devices().is_empty());
        assert!(config.dmx_devices().is_empty());
        assert_eq!(DEFAULT_TRANSMIT_TIMEOUT, config.transmit_timeout()?);
        Ok(())
    }

    #[test]
    fn test_artnet_requires_ip() {
        let result = parse_yaml(
            r#"
            artnet_devices:
              - alias: no-ip
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_empty_device_alias() {
        let result = parse_yaml(
            r#"
            dmx_devices:
              - alias: ""
                path: /dev/ttyUSB0
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::EmptyDeviceAlias {
                family: "DMX",
                index: 0
            })
        ));
    }

    #[test]
    fn test_duplicate_device() {
        let result = parse_yaml(
            r#"
            artnet_devices:
              - alias: wash
                ip: 10.0.0.1
              - alias: wash
                ip: 10.0.0.2
            "#,
        );
        match result {
            Err(ConfigError::DuplicateDevice { family, alias }) => {
                assert_eq!("ArtNet", family);
                assert_eq!("wash", alias);
            }
            _ => panic!("expected a duplicate device error"),
        }
    }

    #[test]
    fn test_same_alias_across_families() -> Result<(), ConfigError> {
        let config = parse_yaml(
            r#"
            artnet_devices:
              - alias: wash
                ip: 10.0.0.1
            dmx_devices:
              - alias: wash
                path: /dev/ttyUSB0
            "#,
        )?;
        assert_eq!(1, config.artnet_devices().len());
        assert_eq!(1, config.dmx_devices().len());
        Ok(())
    }

    #[test]
    fn test_duplicate_scene() {
        let result = parse_yaml(
            r#"
            dmx_devices:
              - alias: truss
                path: /dev/ttyUSB0
                scenes:
                  - scene_alias: warm
                  - scene_alias: warm
            "#,
        );
        assert!(matches!(result, Err(ConfigError::DuplicateScene { .. })));
    }

    #[test]
    fn test_duplicate_scene_channel() {
        let result = parse_yaml(
            r#"
            dmx_devices:
              - alias: truss
                path: /dev/ttyUSB0
                scenes:
                  - scene_alias: warm
                    channel_map:
                      - scene_channel_id: 1
                        universe_channel_id: 1
                      - scene_channel_id: 1
                        universe_channel_id: 2
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::DuplicateChannel { channel: 1, .. })
        ));
    }

    #[test]
    fn test_universe_channel_out_of_range() {
        let result = parse_yaml(
            r#"
            dmx_devices:
              - alias: truss
                path: /dev/ttyUSB0
                scenes:
                  - scene_alias: warm
                    channel_map:
                      - scene_channel_id: 1
                        universe_channel_id: 512
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::ChannelOutOfRange { position: 512, .. })
        ));
    }

    #[test]
    fn test_artnet_universe_out_of_range() -> Result<(), ConfigError> {
        let result = parse_yaml(
            r#"
            artnet_devices:
              - alias: wash
                ip: 10.0.0.1
                universe: 40000
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::UniverseOutOfRange { universe: 40000, .. })
        ));

        let config = parse_yaml(
            r#"
            artnet_devices:
              - alias: wash
                ip: 10.0.0.1
                universe: 32767
            "#,
        )?;
        assert_eq!(0x7fff, config.artnet_devices()[0].universe());
        Ok(())
    }

    #[test]
    fn test_unknown_default_scene() {
        let result = parse_yaml(
            r#"
            artnet_devices:
              - alias: wash
                ip: 10.0.0.1
                default_scene: missing
                scenes:
                  - scene_alias: warm
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::UnknownDefaultScene { .. })
        ));
    }

    #[test]
    fn test_invalid_duration() {
        let result = parse_yaml("transmit_timeout: soon");
        assert!(matches!(result, Err(ConfigError::Duration(_))));
    }

    #[test]
    fn test_load_from_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile()?;
        file.write_all(VALID.as_bytes())?;
        file.flush()?;

        let config = load(file.path())?;
        assert_eq!(1, config.artnet_devices().len());
        assert_eq!(1, config.dmx_devices().len());
        Ok(())
    }

    #[test]
    fn test_load_json() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
        file.write_all(
            br#"{"dmx_devices": [{"alias": "truss", "path": "/dev/ttyUSB0",
                 "scenes": [{"scene_alias": "warm",
                             "channel_map": [{"scene_channel_id": 1, "universe_channel_id": 7}]}]}]}"#,
        )?;
        file.flush()?;

        let config = load(file.path())?;
        assert_eq!(
            7,
            config.dmx_devices()[0].scenes()[0].channel_map()[0].universe_channel_id()
        );
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let result = load(Path::new("/definitely/not/here.yaml"));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
