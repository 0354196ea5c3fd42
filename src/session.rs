//! Runs a [`GameCore`] on its own thread.
//!
//! The worker is the only owner of the engine, so direction commands and timer
//! ticks are serialized through one channel. Readers never touch the engine;
//! they take the latest published [`Snapshot`] from a [`FrameSlot`].

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info};
use thiserror::Error;

use crate::engine::{GameCore, TickOutcome};
use crate::input::Direction;
use crate::snapshot::Snapshot;

/// Commands accepted by the session worker.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Command {
    Turn(Direction),
    Restart,
    Shutdown,
}

/// How the worker spaces ticks.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Pace {
    /// Follow the engine's advisory speed.
    Advisory,
    Fixed(Duration),
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum SessionError {
    #[error("session worker has stopped")]
    Stopped,
}

/// Single slot holding the most recent snapshot.
#[derive(Debug, Default)]
pub struct FrameSlot {
    latest: Mutex<Option<Arc<Snapshot>>>,
}

impl FrameSlot {
    /// Replaces the stored snapshot.
    pub fn publish(&self, snapshot: Snapshot) {
        let frame = Arc::new(snapshot);
        // A panicked writer cannot leave a half-written Arc behind.
        let mut slot = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(frame);
    }

    #[must_use]
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Handle to a running session worker.
#[derive(Debug)]
pub struct Session {
    commands: Sender<Command>,
    frames: Arc<FrameSlot>,
    worker: Option<JoinHandle<()>>,
}

impl Session {
    /// Starts a worker that ticks at the engine's advisory speed.
    #[must_use]
    pub fn spawn(core: GameCore) -> Self {
        Self::spawn_with_pace(core, Pace::Advisory)
    }

    /// Starts a worker with an explicit tick pace.
    ///
    /// The initial snapshot is published before this returns.
    #[must_use]
    pub fn spawn_with_pace(core: GameCore, pace: Pace) -> Self {
        Self::spawn_observed(core, pace, |_: &Snapshot| {})
    }

    /// Starts a worker that also hands every published snapshot to `observer`.
    ///
    /// The observer runs on the worker thread before the snapshot becomes
    /// visible to readers, so it sees every frame, including the last frame of
    /// a round that is restarted right after it ends.
    #[must_use]
    pub fn spawn_observed<F>(core: GameCore, pace: Pace, observer: F) -> Self
    where
        F: FnMut(&Snapshot) + Send + 'static,
    {
        let frames = Arc::new(FrameSlot::default());
        let mut publisher = Publisher {
            frames: Arc::clone(&frames),
            observer: Box::new(observer),
        };
        publisher.publish(core.snapshot());

        let (commands, inbox) = mpsc::channel();
        let worker = thread::spawn(move || run_worker(core, pace, &inbox, &mut publisher));

        Self {
            commands,
            frames,
            worker: Some(worker),
        }
    }

    /// Queues a command for the worker.
    pub fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .map_err(|_| SessionError::Stopped)
    }

    /// Returns the most recently published snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.frames.latest()
    }

    /// Returns a reader handle to the frame slot that outlives borrows of `self`.
    #[must_use]
    pub fn frames(&self) -> Arc<FrameSlot> {
        Arc::clone(&self.frames)
    }

    /// Stops the worker and waits for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Feeds the observer, then the shared slot.
struct Publisher {
    frames: Arc<FrameSlot>,
    observer: Box<dyn FnMut(&Snapshot) + Send>,
}

impl Publisher {
    fn publish(&mut self, snapshot: Snapshot) {
        (self.observer)(&snapshot);
        self.frames.publish(snapshot);
    }
}

fn run_worker(mut core: GameCore, pace: Pace, inbox: &Receiver<Command>, publisher: &mut Publisher) {
    let interval = |core: &GameCore| match pace {
        Pace::Advisory => core.tick_interval(),
        Pace::Fixed(interval) => interval,
    };
    let mut next_tick = Instant::now() + interval(&core);

    loop {
        let wait = next_tick.saturating_duration_since(Instant::now());
        match inbox.recv_timeout(wait) {
            Ok(Command::Turn(direction)) => {
                core.set_direction(direction);
                publisher.publish(core.snapshot());
            }
            Ok(Command::Restart) => {
                core.reset();
                debug!("session round restarted");
                publisher.publish(core.snapshot());
                next_tick = Instant::now() + interval(&core);
            }
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                if let TickOutcome::Ended(reason) = core.tick() {
                    info!("round ended ({reason:?}) with score {}", core.score());
                }
                publisher.publish(core.snapshot());
                next_tick = Instant::now() + interval(&core);
            }
        }
    }

    debug!("session worker stopped");
}
