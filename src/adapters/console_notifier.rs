//! Standard output notifier.

use std::io::Write;

use crate::domain::error::TickwatchError;
use crate::domain::notification::{MessageFormat, Notification};
use crate::ports::notify_port::NotifyPort;

pub struct ConsoleNotifier {
    format: MessageFormat,
}

impl ConsoleNotifier {
    pub fn new(format: MessageFormat) -> Self {
        Self { format }
    }

    pub fn render(&self, notification: &Notification) -> String {
        format!("{}---\n", notification.format(self.format))
    }
}

impl NotifyPort for ConsoleNotifier {
    fn send(&self, notification: &Notification) -> Result<(), TickwatchError> {
        let mut out = std::io::stdout().lock();
        out.write_all(self.render(notification).as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| TickwatchError::Delivery {
                notifier: self.name().to_string(),
                reason: e.to_string(),
            })
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rule::Rule;

    #[test]
    fn render_appends_separator() {
        let notifier = ConsoleNotifier::new(MessageFormat::Short);
        let n = Notification::new(&Rule::expression("dip", "close < 100"));
        assert_eq!(notifier.render(&n), "dip\n---\n");
    }
}
