//! Tokio driver for the typing queue
//!
//! The queue lives behind one mutex shared by the handle and the drain task.
//! The task takes the lock for each step, releases it while sleeping, and
//! checks the queue epoch after every wake-up so a reset turns any stale
//! continuation into a no-op.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::TyperConfig;
use crate::line::ProcessedLine;
use crate::queue::{Tick, TypingQueue};
use crate::scenario::LineSink;
use crate::snapshot::Snapshot;

struct State {
    queue: TypingQueue,
    emitted_revision: u64,
    latest: watch::Sender<Snapshot>,
    subscribers: Vec<mpsc::UnboundedSender<Snapshot>>,
    task: Option<JoinHandle<()>>,
}

impl State {
    fn emit_if_changed(&mut self) {
        if self.queue.revision() == self.emitted_revision {
            return;
        }
        self.emitted_revision = self.queue.revision();

        let snapshot = self.queue.snapshot();
        self.subscribers
            .retain(|subscriber| subscriber.send(snapshot.clone()).is_ok());
        self.latest.send_replace(snapshot);
    }
}

/// Handle to a typewriter. Clones share the same queue.
///
/// `enqueue` spawns the drain task, so it must be called from inside a tokio
/// runtime.
#[derive(Clone)]
pub struct Typewriter {
    state: Arc<Mutex<State>>,
}

impl Typewriter {
    pub fn new(config: TyperConfig) -> Self {
        let queue = TypingQueue::new(config);
        let (latest, _) = watch::channel(queue.snapshot());
        Typewriter {
            state: Arc::new(Mutex::new(State {
                emitted_revision: queue.revision(),
                queue,
                latest,
                subscribers: Vec::new(),
                task: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    /// Append lines; starts draining if idle
    pub fn enqueue(&self, lines: Vec<ProcessedLine>) {
        let mut state = self.lock();
        tracing::debug!(lines = lines.len(), "enqueue");

        if state.queue.enqueue(lines) {
            let epoch = state.queue.epoch();
            tracing::debug!(epoch, "drain started");
            state.task = Some(tokio::spawn(drain(Arc::clone(&self.state), epoch)));
        }
        state.emit_if_changed();
    }

    /// Clear everything and cancel the running drain, if any
    pub fn reset(&self) {
        let mut state = self.lock();
        state.queue.reset();
        if let Some(task) = state.task.take() {
            task.abort();
        }
        tracing::debug!(epoch = state.queue.epoch(), "reset");
        state.emit_if_changed();
    }

    pub fn set_skip_mode(&self, enabled: bool) {
        tracing::debug!(enabled, "skip mode");
        self.lock().queue.set_skip_mode(enabled);
    }

    pub fn skip_mode(&self) -> bool {
        self.lock().queue.skip_mode()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().queue.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.lock().queue.is_running()
    }

    /// Receive every snapshot emitted from now on
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Snapshot> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().subscribers.push(tx);
        rx
    }

    /// Watch the latest snapshot only
    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.lock().latest.subscribe()
    }

    /// Wait until the queue has drained (or was reset)
    pub async fn wait_idle(&self) {
        let mut rx = self.watch();
        // The sender lives as long as `self`, so this only ends on idle
        let _ = rx.wait_for(|snapshot| !snapshot.is_running).await;
    }
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::new(TyperConfig::default())
    }
}

impl LineSink for Typewriter {
    fn enqueue_lines(&mut self, lines: Vec<ProcessedLine>) {
        self.enqueue(lines);
    }

    fn reset(&mut self) {
        Typewriter::reset(self);
    }

    fn set_skip_mode(&mut self, enabled: bool) {
        Typewriter::set_skip_mode(self, enabled);
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn drain(state: Arc<Mutex<State>>, epoch: u64) {
    loop {
        let tick = {
            let mut state = lock(&state);
            if state.queue.epoch() != epoch {
                return;
            }
            let tick = state.queue.step_in(epoch);
            state.emit_if_changed();
            if tick == Tick::Idle {
                state.task = None;
            }
            tick
        };

        match tick {
            Tick::Continue => {}
            Tick::Sleep(delay) => tokio::time::sleep(delay).await,
            Tick::Idle => {
                tracing::debug!(epoch, "drain finished");
                return;
            }
        }
    }
}
