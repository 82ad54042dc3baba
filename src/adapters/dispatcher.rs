//! Background notification delivery.
//!
//! The cycle hands notifications to a `Dispatcher`, which queues them on an
//! mpsc channel for a dedicated worker thread. The worker sends each one to
//! every configured notifier in order; failures are logged and dropped.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::domain::error::TickwatchError;
use crate::domain::notification::Notification;
use crate::ports::notify_port::NotifyPort;

pub type BoxedNotifier = Box<dyn NotifyPort + Send>;

#[derive(Debug)]
enum DispatchCommand {
    Deliver(Notification),
    Shutdown,
}

pub struct Dispatcher {
    tx: Sender<DispatchCommand>,
    handle: Option<JoinHandle<()>>,
}

impl Dispatcher {
    pub fn spawn(notifiers: Vec<BoxedNotifier>) -> Result<Self, TickwatchError> {
        let (tx, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("tickwatch-notify".into())
            .spawn(move || worker_loop(rx, notifiers))?;
        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }
}

fn worker_loop(rx: Receiver<DispatchCommand>, notifiers: Vec<BoxedNotifier>) {
    loop {
        match rx.recv() {
            Ok(DispatchCommand::Shutdown) | Err(_) => break,
            Ok(DispatchCommand::Deliver(notification)) => {
                for notifier in &notifiers {
                    if let Err(err) = notifier.send(&notification) {
                        tracing::warn!(notifier = notifier.name(), error = %err, "delivery failed");
                    }
                }
            }
        }
    }
}

impl NotifyPort for Dispatcher {
    fn send(&self, notification: &Notification) -> Result<(), TickwatchError> {
        self.tx
            .send(DispatchCommand::Deliver(notification.clone()))
            .map_err(|_| TickwatchError::Delivery {
                notifier: self.name().to_string(),
                reason: "delivery worker has stopped".to_string(),
            })
    }

    fn name(&self) -> &str {
        "dispatcher"
    }
}

impl Drop for Dispatcher {
    /// Drains queued notifications before returning.
    fn drop(&mut self) {
        let _ = self.tx.send(DispatchCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("notification worker panicked");
            }
        }
    }
}
