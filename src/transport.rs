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
use std::io;

use crate::device::universe::UNIVERSE_SIZE;

pub mod artnet;
pub mod enttec;
#[cfg(test)]
pub mod mock;

pub use self::artnet::ArtNet;
pub use self::enttec::Enttec;

/// Errors raised while sending a universe to a device.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transmit timed out")]
    Timeout,

    #[error("I/O error: {0}")]
    Io(io::Error),

    #[error("ArtNet port-address {0} doesn't fit in 15 bits")]
    PortAddress(u16),

    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportError::Timeout,
            _ => TransportError::Io(err),
        }
    }
}

/// Sends a full universe to one physical device.
pub trait Transport: Send {
    /// Transmits the universe. Implementations bound the time spent here by
    /// their configured timeout.
    fn transmit(&mut self, universe: &[u8; UNIVERSE_SIZE]) -> Result<(), TransportError>;

    /// A human readable address for diagnostics.
    fn address(&self) -> String;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_io_error_mapping() {
        assert!(matches!(
            TransportError::from(io::Error::from(io::ErrorKind::TimedOut)),
            TransportError::Timeout
        ));
        assert!(matches!(
            TransportError::from(io::Error::from(io::ErrorKind::WouldBlock)),
            TransportError::Timeout
        ));
        assert!(matches!(
            TransportError::from(io::Error::from(io::ErrorKind::BrokenPipe)),
            TransportError::Io(_)
        ));
    }
}
