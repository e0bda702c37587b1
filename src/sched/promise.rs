use std::sync::{Arc, Condvar, Mutex};

use crate::errors::*;

enum PromiseState<T> {
    NotReady,
    Ready(Result<T>),
    Taken,
}

struct Shared<T> {
    m: Mutex<PromiseState<T>>,
    v: Condvar,
}

/// The pending result of a task scheduled onto a `Worker`.
pub struct Promise<T> {
    shared: Arc<Shared<T>>,
}

/// The producing half of a `Promise`, owned by the queued task.
pub(crate) struct Fulfill<T> {
    shared: Arc<Shared<T>>,
}

pub(crate) fn pair<T>() -> (Promise<T>, Fulfill<T>) {
    let shared = Arc::new(Shared {
        m: Mutex::new(PromiseState::NotReady),
        v: Condvar::new(),
    });

    (
        Promise {
            shared: shared.clone(),
        },
        Fulfill { shared },
    )
}

impl<T> Promise<T> {
    /// Returns true once the task has finished, successfully or not.
    pub fn is_done(&self) -> bool {
        match self.shared.m.lock() {
            Ok(guard) => match *guard {
                PromiseState::NotReady => false,
                _ => true,
            },
            Err(_) => true,
        }
    }

    /// Blocks until the task has finished and returns its result.
    pub fn wait(self) -> Result<T> {
        let mut guard = self
            .shared
            .m
            .lock()
            .map_err(|_| Error::WorkerDisconnected)?;

        while let PromiseState::NotReady = *guard {
            guard = self
                .shared
                .v
                .wait(guard)
                .map_err(|_| Error::WorkerDisconnected)?;
        }

        match ::std::mem::replace(&mut *guard, PromiseState::Taken) {
            PromiseState::Ready(v) => v,
            _ => Err(Error::WorkerDisconnected),
        }
    }
}

impl<T> Fulfill<T> {
    pub(crate) fn set(self, v: Result<T>) {
        if let Ok(mut guard) = self.shared.m.lock() {
            *guard = PromiseState::Ready(v);
        }

        self.shared.v.notify_all();
    }
}

impl<T> Drop for Fulfill<T> {
    fn drop(&mut self) {
        // A task dropped unexecuted leaves its promise waiting forever otherwise.
        if let Ok(mut guard) = self.shared.m.lock() {
            if let PromiseState::NotReady = *guard {
                *guard = PromiseState::Ready(Err(Error::WorkerDisconnected));
            }
        }

        self.shared.v.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn wait_across_threads() {
        let (promise, fulfill) = pair::<u32>();
        assert!(!promise.is_done());

        let t = thread::spawn(move || fulfill.set(Ok(42)));
        assert_eq!(promise.wait(), Ok(42));
        t.join().unwrap();
    }

    #[test]
    fn dropped_task_disconnects() {
        let (promise, fulfill) = pair::<u32>();
        drop(fulfill);

        assert!(promise.is_done());
        assert_eq!(promise.wait(), Err(Error::WorkerDisconnected));
    }
}
