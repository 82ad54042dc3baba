//! Notification delivery port trait.

use crate::domain::error::TickwatchError;
use crate::domain::notification::Notification;

pub trait NotifyPort {
    fn send(&self, notification: &Notification) -> Result<(), TickwatchError>;

    /// Name used in logs and delivery errors.
    fn name(&self) -> &str {
        "notifier"
    }
}
