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
use std::sync::Arc;

use tokio::sync::mpsc::{self, Sender};
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, span, Level};

use crate::executor::{Command, Executor};

pub mod keyboard;

/// Operator events that will trigger commands on the devices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Runs a command on a single device.
    Device { device: String, command: Command },

    /// Blacks out every device.
    BlackoutAll,
}

pub trait Driver: Send + Sync + 'static {
    /// Watches the operator input and sends events until the input ends.
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>>;
}

/// Feeds the events of a driver to the executor.
pub struct Dispatcher {
    handle: JoinHandle<()>,
}

impl Dispatcher {
    /// Creates a new dispatcher with the given driver. The dispatcher owns the
    /// executor and shuts it down once the driver stops sending events.
    pub fn new(executor: Executor, driver: Arc<dyn Driver>) -> Dispatcher {
        Dispatcher {
            handle: tokio::spawn(async move { Dispatcher::dispatch(executor, driver).await }),
        }
    }

    /// Join will block until the dispatcher finishes.
    pub async fn join(&mut self) -> Result<(), JoinError> {
        (&mut self.handle).await
    }

    async fn dispatch(executor: Executor, driver: Arc<dyn Driver>) {
        let span = span!(Level::INFO, "dispatcher");
        let _enter = span.enter();

        let (events_tx, mut events_rx) = mpsc::channel(1);
        let join_handle = driver.monitor_events(events_tx);

        info!(
            devices = executor.devices().count(),
            "Dispatcher started."
        );

        while let Some(event) = events_rx.recv().await {
            info!(event = format!("{:?}", event), "Received event.");

            if let Err(e) = match event {
                Event::Device { device, command } => executor.execute(&device, command).await,
                Event::BlackoutAll => executor.blackout_all().await,
            } {
                error!("Error running command: {}", e);
            }
        }

        info!("Dispatcher closing.");
        match join_handle.await {
            Ok(Err(e)) => error!("Event monitor failed: {}", e),
            Err(e) => error!("Error waiting for event monitor to stop: {}", e),
            Ok(Ok(())) => {}
        }
        executor.shutdown().await;
    }
}
