// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

use std::time::Duration;

use futures_util::future::{AbortHandle, Abortable, Aborted};

use super::SharedDriver;
use crate::{app::Workstation, MidiOutputConnection};

/// Resolution of the timers that are polled by [`DriverThread`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Dedicated thread for polling the timers of a driver.
///
/// Each driver gets its own thread to avoid blocking other drivers.
#[derive(Debug)]
pub struct DriverThread {
    abort_handle: AbortHandle,
    os_thread: std::thread::JoinHandle<()>,
}

impl DriverThread {
    #[must_use]
    pub fn spawn<W, O>(driver: SharedDriver<W, O>, poll_interval: Duration) -> Self
    where
        W: Workstation + Send + 'static,
        O: MidiOutputConnection + Send + 'static,
    {
        let (abort_handle, abort_registration) = AbortHandle::new_pair();
        let poll_task = async move {
            let mut interval = tokio::time::interval(poll_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                driver.poll_timers();
            }
        };
        let abortable_task = Abortable::new(poll_task, abort_registration);
        let os_thread = std::thread::spawn(move || {
            log::info!("Entering driver thread");
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    log::error!("Failed to create Tokio runtime: {err}");
                    return;
                }
            };
            runtime.block_on(async move {
                log::info!("Polling driver timers every {poll_interval:?}");
                match abortable_task.await {
                    Ok(()) => {
                        log::info!("Driver task terminated");
                    }
                    Err(Aborted) => {
                        log::info!("Driver task aborted");
                    }
                }
            });
            log::info!("Exiting driver thread");
        });
        Self {
            abort_handle,
            os_thread,
        }
    }

    pub fn abort_and_join(self) -> anyhow::Result<()> {
        let Self {
            abort_handle,
            os_thread,
        } = self;
        abort_handle.abort();
        os_thread
            .join()
            .map_err(|err| anyhow::anyhow!("Driver thread panicked: {err:?}"))
    }
}
