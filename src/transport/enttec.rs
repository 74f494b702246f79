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
//! Enttec DMX USB Pro support.

use std::io::{self, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::{debug, trace};

use crate::device::universe::UNIVERSE_SIZE;

use super::{Transport, TransportError};

const BAUD_RATE: u32 = 57600;
const START_OF_MESSAGE: u8 = 0x7e;
const END_OF_MESSAGE: u8 = 0xe7;
/// "Output Only Send DMX Packet Request".
const SEND_DMX_LABEL: u8 = 6;
const DMX_START_CODE: u8 = 0;

/// Sends universes to an Enttec DMX USB Pro connected through its USB serial port.
pub struct Enttec {
    path: String,
    port: Box<dyn SerialPort>,
}

impl Enttec {
    /// Opens the serial device at the given path. Reads and writes are bounded by `timeout`.
    pub fn new(path: &str, timeout: Duration) -> Result<Enttec, TransportError> {
        debug!(path, "Opening Enttec DMX interface");
        let port = serialport::new(path, BAUD_RATE).timeout(timeout).open()?;
        Ok(Enttec {
            path: path.to_string(),
            port,
        })
    }
}

/// Writes one framed DMX packet: the Enttec header, the DMX start code, the
/// universe and the end-of-message marker.
fn write_frame<W: Write>(writer: &mut W, universe: &[u8; UNIVERSE_SIZE]) -> io::Result<()> {
    let length = (UNIVERSE_SIZE + 1) as u16;
    let [length_lsb, length_msb] = length.to_le_bytes();
    let mut writer = io::BufWriter::with_capacity(UNIVERSE_SIZE + 6, writer);
    writer.write_all(&[
        START_OF_MESSAGE,
        SEND_DMX_LABEL,
        length_lsb,
        length_msb,
        DMX_START_CODE,
    ])?;
    writer.write_all(universe)?;
    writer.write_all(&[END_OF_MESSAGE])?;
    writer.flush()
}

impl Transport for Enttec {
    fn transmit(&mut self, universe: &[u8; UNIVERSE_SIZE]) -> Result<(), TransportError> {
        write_frame(&mut self.port, universe)?;
        trace!(path = self.path.as_str(), "Wrote DMX controller payload");
        Ok(())
    }

    fn address(&self) -> String {
        format!("serial://{}", self.path)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_frame() -> io::Result<()> {
        let mut universe = [0u8; UNIVERSE_SIZE];
        universe[0] = 1;
        universe[511] = 2;

        let mut frame: Vec<u8> = Vec::new();
        write_frame(&mut frame, &universe)?;

        assert_eq!(UNIVERSE_SIZE + 6, frame.len());
        assert_eq!([0x7eu8, 6u8, 0x01u8, 0x02u8, 0u8], frame[0..5]);
        assert_eq!(1, frame[5]);
        assert_eq!(2, frame[5 + 511]);
        assert_eq!(Some(&0xe7), frame.last());
        Ok(())
    }

    #[test]
    fn test_missing_device() {
        assert!(Enttec::new("/dev/does-not-exist-dmx", Duration::from_millis(10)).is_err());
    }
}
