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
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{SendTimeoutError, Sender};
use tracing::warn;

/// How long publishing may wait on a full signal channel before the signal is dropped.
pub const PUBLISH_TIMEOUT: Duration = Duration::from_millis(50);

/// Domain events published by devices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    /// A scene was selected and transmitted.
    SceneChanged {
        device_alias: String,
        scene_alias: String,
    },
    /// The live values of the current scene were stored in the scene.
    SceneSaved {
        device_alias: String,
        scene_alias: String,
    },
}

impl Signal {
    /// Gets the device that emitted the signal.
    pub fn device_alias(&self) -> &str {
        match self {
            Signal::SceneChanged { device_alias, .. } | Signal::SceneSaved { device_alias, .. } => {
                device_alias
            }
        }
    }

    /// Gets the scene the signal refers to.
    pub fn scene_alias(&self) -> &str {
        match self {
            Signal::SceneChanged { scene_alias, .. } | Signal::SceneSaved { scene_alias, .. } => {
                scene_alias
            }
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::SceneChanged {
                device_alias,
                scene_alias,
            } => write!(f, "scene changed: {}/{}", device_alias, scene_alias),
            Signal::SceneSaved {
                device_alias,
                scene_alias,
            } => write!(f, "scene saved: {}/{}", device_alias, scene_alias),
        }
    }
}

/// Publishes signals onto a channel owned by the subscriber. Publishing never
/// stalls a command for longer than the publish timeout; signals that cannot
/// be delivered are dropped and counted.
#[derive(Clone)]
pub struct Notifier {
    sender: Option<Sender<Signal>>,
    timeout: Duration,
    dropped: Arc<AtomicU64>,
}

impl Notifier {
    /// Creates a notifier that publishes to the given sender.
    pub fn new(sender: Sender<Signal>) -> Notifier {
        Notifier::with_timeout(sender, PUBLISH_TIMEOUT)
    }

    /// Creates a notifier with a custom publish timeout.
    pub fn with_timeout(sender: Sender<Signal>, timeout: Duration) -> Notifier {
        Notifier {
            sender: Some(sender),
            timeout,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a notifier without a subscriber. Every signal is discarded
    /// without being counted as dropped.
    pub fn disabled() -> Notifier {
        Notifier {
            sender: None,
            timeout: Duration::ZERO,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Publishes a signal.
    pub fn publish(&self, signal: Signal) {
        let Some(sender) = self.sender.as_ref() else {
            return;
        };

        match sender.send_timeout(signal, self.timeout) {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(signal)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(signal = signal.to_string(), "Signal channel full, dropping signal");
            }
            Err(SendTimeoutError::Disconnected(signal)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(signal = signal.to_string(), "Signal subscriber gone, dropping signal");
            }
        }
    }

    /// The number of signals that could not be delivered.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
