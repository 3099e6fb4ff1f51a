//! Tokio driver for [`SessionManager`].
//!
//! The driver owns the manager, feeds it inputs from a channel plus periodic
//! ticks, and forwards every notice to the notice channel.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

use crate::{SessionError, SessionInput, SessionManager, SessionNotice};

const MIN_TICK: Duration = Duration::from_millis(10);

/// Cloneable sender of session inputs.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    inputs: mpsc::UnboundedSender<SessionInput>,
}

impl SessionHandle {
    /// Queue an input for the manager.
    pub fn send(&self, input: SessionInput) -> Result<(), SessionError> {
        self.inputs
            .send(input)
            .map_err(|_| SessionError::DriverStopped)
    }
}

/// Event loop around a [`SessionManager`].
#[derive(Debug)]
pub struct SessionDriver {
    manager: SessionManager,
    inputs: mpsc::UnboundedReceiver<SessionInput>,
    notices: mpsc::UnboundedSender<SessionNotice>,
}

impl SessionDriver {
    /// Wrap a manager. Returns the driver, an input handle and the notice stream.
    #[must_use]
    pub fn new(
        manager: SessionManager,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<SessionNotice>) {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let driver = Self {
            manager,
            inputs: input_rx,
            notices: notice_tx,
        };
        (driver, SessionHandle { inputs: input_tx }, notice_rx)
    }

    /// Run until every [`SessionHandle`] is dropped, then hand the manager back.
    pub async fn run(mut self) -> SessionManager {
        let period = self.manager.config().tick_interval.max(MIN_TICK);
        let mut ticks = tokio::time::interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let input = tokio::select! {
                input = self.inputs.recv() => match input {
                    Some(input) => input,
                    None => break,
                },
                _ = ticks.tick() => SessionInput::Tick,
            };
            let now = tokio::time::Instant::now().into_std();
            for notice in self.manager.handle(now, input) {
                if self.notices.send(notice).is_err() {
                    trace!("notice receiver dropped");
                }
            }
        }

        debug!(state = %self.manager.kind(), "session driver stopped");
        self.manager
    }
}
