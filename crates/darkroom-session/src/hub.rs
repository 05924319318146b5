//! Listener registration and ordered event delivery
//!
//! Events are fanned out on one dedicated delivery thread. The listener
//! set is snapshotted when an event is queued, so add/remove during an
//! in-flight dispatch only affects later events. Registration takes its
//! own lock and never waits on delivery.

use std::sync::mpsc::{channel, sync_channel, Receiver, Sender, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::events::{SessionEvent, SessionObserver};

enum Delivery {
    Event(SessionEvent, Vec<Arc<dyn SessionObserver>>),
    Flush(SyncSender<()>),
}

pub(crate) struct EventHub {
    listeners: Mutex<Vec<Arc<dyn SessionObserver>>>,
    sender: Mutex<Option<Sender<Delivery>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl EventHub {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        let worker = thread::Builder::new()
            .name("session-events".to_string())
            .spawn(move || deliver_loop(receiver))
            .expect("cannot spawn event delivery thread");

        Self {
            listeners: Mutex::new(Vec::new()),
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn SessionObserver>) {
        self.listeners.lock().push(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn SessionObserver>) {
        self.listeners.lock().retain(|l| !Arc::ptr_eq(l, listener));
    }

    /// Queue an event for delivery to the listeners registered right now.
    pub fn emit(&self, event: SessionEvent) {
        let targets = self.listeners.lock().clone();

        tracing::debug!(
            kind = event.kind(),
            session_id = event.id(),
            listeners = targets.len(),
            "Queueing session event"
        );

        if let Some(sender) = self.sender.lock().as_ref() {
            if sender.send(Delivery::Event(event, targets)).is_err() {
                tracing::warn!("Event delivery thread is gone; dropping event");
            }
        }
    }

    /// Block until everything queued before this call has been delivered.
    pub fn flush(&self) {
        let (ack, done) = sync_channel(0);
        let sent = match self.sender.lock().as_ref() {
            Some(sender) => sender.send(Delivery::Flush(ack)).is_ok(),
            None => false,
        };
        if sent {
            let _ = done.recv();
        }
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EventHub {
    fn drop(&mut self) {
        self.sender.lock().take();
        if let Some(worker) = self.worker.lock().take() {
            // Never join from the delivery thread itself
            if worker.thread().id() != thread::current().id() {
                let _ = worker.join();
            }
        }
    }
}

fn deliver_loop(receiver: Receiver<Delivery>) {
    while let Ok(delivery) = receiver.recv() {
        match delivery {
            Delivery::Event(event, targets) => {
                for listener in &targets {
                    dispatch(listener.as_ref(), &event);
                }
            }
            Delivery::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

fn dispatch(listener: &dyn SessionObserver, event: &SessionEvent) {
    match event {
        SessionEvent::Queued { id } => listener.on_queued(id),
        SessionEvent::Progress { id, percent } => listener.on_progress(id, *percent),
        SessionEvent::Done { id, final_location } => listener.on_done(id, final_location),
        SessionEvent::Failed { id, reason } => listener.on_failed(id, reason),
        SessionEvent::Updated { id } => listener.on_updated(id),
    }
}
