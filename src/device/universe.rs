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

use super::DeviceError;

/// A DMX universe is 512 channels.
pub const UNIVERSE_SIZE: usize = 512;

/// The highest position an operator may write to. Position 0 is reserved.
pub const MAX_CHANNEL: u16 = (UNIVERSE_SIZE - 1) as u16;

/// The live state of every DMX channel of one device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Universe {
    data: [u8; UNIVERSE_SIZE],
}

impl Universe {
    /// Creates a new, fully dark universe.
    pub fn new() -> Universe {
        Universe {
            data: [0; UNIVERSE_SIZE],
        }
    }

    /// Writes a single position. The buffer itself is addressable from 0 to 511.
    pub fn set(&mut self, position: u16, value: u8) -> Result<(), DeviceError> {
        match self.data.get_mut(usize::from(position)) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(DeviceError::ChannelOutOfRange(position)),
        }
    }

    /// Reads a single position.
    pub fn get(&self, position: u16) -> Option<u8> {
        self.data.get(usize::from(position)).copied()
    }

    /// Resets every channel to zero at once.
    pub fn clear(&mut self) {
        self.data = [0; UNIVERSE_SIZE];
    }

    /// Returns an owned copy of the buffer for transmission.
    pub fn snapshot(&self) -> [u8; UNIVERSE_SIZE] {
        self.data
    }

    /// Borrows the buffer.
    pub fn as_slice(&self) -> &[u8; UNIVERSE_SIZE] {
        &self.data
    }
}

impl Default for Universe {
    fn default() -> Self {
        Universe::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_universe_is_dark() {
        let universe = Universe::new();
        assert!(universe.as_slice().iter().all(|value| *value == 0));
        assert_eq!(UNIVERSE_SIZE, universe.snapshot().len());
    }

    #[test]
    fn test_set_and_get() {
        let mut universe = Universe::new();
        assert!(universe.set(0, 1).is_ok());
        assert!(universe.set(10, 200).is_ok());
        assert!(universe.set(MAX_CHANNEL, 255).is_ok());

        assert_eq!(Some(1), universe.get(0));
        assert_eq!(Some(200), universe.get(10));
        assert_eq!(Some(255), universe.get(511));
        assert_eq!(None, universe.get(512));
    }

    #[test]
    fn test_set_out_of_bounds() {
        let mut universe = Universe::new();
        assert!(matches!(
            universe.set(512, 1),
            Err(DeviceError::ChannelOutOfRange(512))
        ));
        assert_eq!(Universe::new(), universe);
    }

    #[test]
    fn test_clear() {
        let mut universe = Universe::new();
        for position in 0..=MAX_CHANNEL {
            universe.set(position, 128).unwrap();
        }
        universe.clear();
        assert_eq!([0u8; UNIVERSE_SIZE], universe.snapshot());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut universe = Universe::new();
        universe.set(5, 50).unwrap();
        let snapshot = universe.snapshot();
        universe.set(5, 60).unwrap();
        assert_eq!(50, snapshot[5]);
        assert_eq!(Some(60), universe.get(5));
    }
}
