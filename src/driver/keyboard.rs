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

use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{info, span, warn, Level};

use crate::executor::Command;

use super::Event;

const SELECT: &str = "select";
const SET: &str = "set";
const SAVE: &str = "save";
const BLACKOUT: &str = "blackout";
const BLACKOUT_ALL: &str = "blackout-all";

/// A driver that reads operator commands from the keyboard, one per line.
pub struct Driver {}

impl Driver {
    pub fn new() -> Driver {
        Driver {}
    }

    /// Reads and forwards a single command. Returns false once the input is exhausted.
    fn monitor_io<R, W>(events_tx: &Sender<Event>, mut reader: R, mut writer: W) -> io::Result<bool>
    where
        R: io::BufRead,
        W: io::Write,
    {
        write!(
            writer,
            "Command ({SELECT} <device> <scene>, {SET} <device> <channel> <value>, \
             {SAVE} <device>, {BLACKOUT} <device>, {BLACKOUT_ALL}): ",
        )?;
        writer.flush()?;
        let mut input = String::default();
        if reader.read_line(&mut input)? == 0 {
            return Ok(false);
        }

        match parse(&input) {
            Some(event) => events_tx
                .blocking_send(event)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?,
            None => warn!(input = input.trim(), "Unrecognized input"),
        }
        Ok(true)
    }
}

impl Default for Driver {
    fn default() -> Self {
        Driver::new()
    }
}

/// Parses a single command line.
fn parse(input: &str) -> Option<Event> {
    let words: Vec<&str> = input.split_whitespace().collect();

    let (device, command) = match words.as_slice() {
        [SELECT, device, scene] => (device, Command::SelectScene(scene.to_string())),
        [SET, device, channel, value] => (
            device,
            Command::SetChannel {
                channel: channel.parse().ok()?,
                value: value.parse().ok()?,
            },
        ),
        [SAVE, device] => (device, Command::SaveScene),
        [BLACKOUT, device] => (device, Command::Blackout),
        [BLACKOUT_ALL] => return Some(Event::BlackoutAll),
        _ => return None,
    };
    Some(Event::Device {
        device: device.to_string(),
        command,
    })
}

impl super::Driver for Driver {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>> {
        tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "keyboard driver");
            let _enter = span.enter();

            info!("Keyboard driver started.");

            while Self::monitor_io(&events_tx, io::stdin().lock(), io::stdout())? {}

            info!("Keyboard input closed.");
            Ok(())
        })
    }
}
