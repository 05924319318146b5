//! Single-worker background pipeline
//!
//! Tasks run on one dedicated thread in submission order, FIFO across
//! sessions. There is no cancellation: a submitted task always runs and
//! must tolerate a session that finished or was cancelled in the
//! meantime. Task errors surface in the log instead of disappearing.

use std::sync::mpsc::{channel, sync_channel, Receiver, Sender, SyncSender};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::Result;

type Task = Box<dyn FnOnce() -> Result<()> + Send>;

enum Job {
    Run(Task),
    Flush(SyncSender<()>),
}

pub(crate) struct SerialQueue {
    sender: Mutex<Option<Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SerialQueue {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        let worker = thread::Builder::new()
            .name("session-worker".to_string())
            .spawn(move || run_loop(receiver))
            .expect("cannot spawn background worker thread");

        Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        }
    }

    pub fn submit(&self, task: impl FnOnce() -> Result<()> + Send + 'static) {
        if let Some(sender) = self.sender.lock().as_ref() {
            if sender.send(Job::Run(Box::new(task))).is_err() {
                tracing::warn!("Background worker is gone; dropping task");
            }
        }
    }

    /// Block until every task submitted before this call has run.
    pub fn flush(&self) {
        let (ack, done) = sync_channel(0);
        let sent = match self.sender.lock().as_ref() {
            Some(sender) => sender.send(Job::Flush(ack)).is_ok(),
            None => false,
        };
        if sent {
            let _ = done.recv();
        }
    }
}

impl Default for SerialQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SerialQueue {
    fn drop(&mut self) {
        self.sender.lock().take();
        if let Some(worker) = self.worker.lock().take() {
            // Never join from the worker thread itself
            if worker.thread().id() != thread::current().id() {
                let _ = worker.join();
            }
        }
    }
}

fn run_loop(receiver: Receiver<Job>) {
    while let Ok(job) = receiver.recv() {
        match job {
            Job::Run(task) => {
                if let Err(e) = task() {
                    tracing::warn!(error = %e, "Background task failed");
                }
            }
            Job::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_tasks_run_in_submission_order() {
        let queue = SerialQueue::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..10 {
            let order = Arc::clone(&order);
            queue.submit(move || {
                order.lock().push(i);
                Ok(())
            });
        }
        queue.flush();

        assert_eq!(*order.lock(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_failed_task_does_not_stall_the_queue() {
        let queue = SerialQueue::new();
        let ran = Arc::new(Mutex::new(false));

        queue.submit(|| Err(crate::SessionError::NotStarted));
        let ran_in = Arc::clone(&ran);
        queue.submit(move || {
            *ran_in.lock() = true;
            Ok(())
        });
        queue.flush();

        assert!(*ran.lock());
    }
}
