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
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::device::universe::UNIVERSE_SIZE;

use super::{Transport, TransportError};

/// Records every transmitted universe. Clones share the same record, so a test
/// can keep a handle after moving the transport into a device.
#[derive(Clone, Default)]
pub struct MockTransport {
    frames: Arc<Mutex<Vec<[u8; UNIVERSE_SIZE]>>>,
    should_fail: Arc<AtomicBool>,
    should_panic: Arc<AtomicBool>,
    delay: Arc<Mutex<Duration>>,
}

impl MockTransport {
    pub fn new() -> MockTransport {
        MockTransport::default()
    }

    /// Makes every following transmission fail (or succeed again).
    pub fn set_failing(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Makes the following transmissions panic, taking the device loop down.
    pub fn set_panicking(&self, should_panic: bool) {
        self.should_panic.store(should_panic, Ordering::SeqCst);
    }

    /// Makes every following transmission block for the given time first.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// Get the number of live clones, including the one held by a device.
    pub fn handles(&self) -> usize {
        Arc::strong_count(&self.frames)
    }

    /// Get the number of frames sent.
    pub fn frame_count(&self) -> usize {
        self.frames.lock().len()
    }

    /// Get the last sent frame.
    pub fn last_frame(&self) -> Option<[u8; UNIVERSE_SIZE]> {
        self.frames.lock().last().copied()
    }
}

impl Transport for MockTransport {
    fn transmit(&mut self, universe: &[u8; UNIVERSE_SIZE]) -> Result<(), TransportError> {
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        if self.should_panic.load(Ordering::SeqCst) {
            panic!("mock transport panic");
        }
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(TransportError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "mock transport failure",
            )));
        }
        self.frames.lock().push(*universe);
        Ok(())
    }

    fn address(&self) -> String {
        "mock://".to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mock_records_frames() {
        let mock = MockTransport::new();
        let mut transport = mock.clone();

        let mut universe = [0u8; UNIVERSE_SIZE];
        universe[3] = 30;
        assert!(transport.transmit(&universe).is_ok());
        assert_eq!(1, mock.frame_count());
        assert_eq!(Some(30), mock.last_frame().map(|frame| frame[3]));

        mock.set_failing(true);
        assert!(transport.transmit(&universe).is_err());
        assert_eq!(1, mock.frame_count());
        assert_eq!(2, mock.handles());
    }
}
