use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};

use crate::errors::*;

use super::promise::{self, Promise};

/// Number of tasks that can be queued before `Scheduler::schedule` blocks.
pub const CHANNEL_CAPACITY: usize = 16;

type Task<C> = Box<dyn FnOnce(&mut C) + Send>;

/// The submitting half of a worker. Clones share the same queue.
pub struct Scheduler<C> {
    tx: SyncSender<Task<C>>,
}

impl<C> Clone for Scheduler<C> {
    fn clone(&self) -> Self {
        Scheduler {
            tx: self.tx.clone(),
        }
    }
}

/// The executing half of a worker, kept on the thread that owns `C`.
pub struct Worker<C> {
    rx: Receiver<Task<C>>,
}

/// Creates a connected scheduler and worker over a channel bounded by
/// `CHANNEL_CAPACITY`.
pub fn worker<C>() -> (Scheduler<C>, Worker<C>) {
    let (tx, rx) = mpsc::sync_channel(CHANNEL_CAPACITY);
    (Scheduler { tx }, Worker { rx })
}

impl<C: 'static> Scheduler<C> {
    /// Queues `func` to run on the worker thread. If the worker is gone the
    /// returned promise resolves to `Error::WorkerDisconnected`.
    pub fn schedule<T, F>(&self, func: F) -> Promise<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut C) -> Result<T> + Send + 'static,
    {
        let (promise, fulfill) = promise::pair();
        let task: Task<C> = Box::new(move |ctx: &mut C| fulfill.set(func(ctx)));

        if self.tx.send(task).is_err() {
            warn!("Task scheduled after its worker was dropped.");
        }

        promise
    }
}

impl<C> Worker<C> {
    /// Runs every queued task without blocking. Returns the number of tasks
    /// executed.
    pub fn process_pending(&mut self, ctx: &mut C) -> usize {
        let mut n = 0;
        loop {
            match self.rx.try_recv() {
                Ok(task) => {
                    task(ctx);
                    n += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return n,
            }
        }
    }

    /// Runs tasks as they arrive until every scheduler has been dropped.
    pub fn run(&mut self, ctx: &mut C) {
        while let Ok(task) = self.rx.recv() {
            task(ctx);
        }

        debug!("Worker finished, all schedulers are gone.");
    }
}
