//! Hands work to the GPU thread.
//!
//! Every video operation must run on the thread that owns the `Device`. Other
//! threads reach it through a `Scheduler`, which queues closures on a bounded
//! channel; the GPU thread drains them with its `Worker` and fulfills the
//! `Promise` returned to the submitter.
//!
//! ```
//! use prism::sched;
//!
//! let (scheduler, mut worker) = sched::worker::<Vec<u32>>();
//! let promise = scheduler.schedule(|v: &mut Vec<u32>| {
//!     v.push(7);
//!     Ok(v.len())
//! });
//!
//! let mut context = Vec::new();
//! worker.process_pending(&mut context);
//! assert_eq!(promise.wait().unwrap(), 1);
//! ```

pub mod promise;
pub mod worker;

pub use self::promise::Promise;
pub use self::worker::{worker, Scheduler, Worker, CHANNEL_CAPACITY};
