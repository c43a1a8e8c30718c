//! Tracing layer that forwards WARN and ERROR events to the UI as toasts.

use tokio::sync::mpsc;
use tracing::Level;

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: Level,
    pub message: String,
}

pub struct ToastLayer {
    sender: mpsc::UnboundedSender<LogEvent>,
}

impl ToastLayer {
    pub fn new(sender: mpsc::UnboundedSender<LogEvent>) -> Self {
        Self { sender }
    }
}

impl<S> tracing_subscriber::Layer<S> for ToastLayer
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        // Only WARN and ERROR surface in the UI
        let level = *event.metadata().level();
        if !matches!(level, Level::WARN | Level::ERROR) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let message = format!(
            "{} {}{}",
            chrono::Local::now().format("%H:%M"),
            visitor.message,
            visitor.fields
        );

        // No receiver once the UI has shut down
        let _ = self.sender.send(LogEvent { level, message });
    }
}

/// Collects the message, then any structured fields after it.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message.push_str(&format!("{:?}", value));
        } else {
            self.fields.push_str(&format!(" {}={:?}", field.name(), value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_forwards_only_warnings_and_errors() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscriber = tracing_subscriber::registry().with(ToastLayer::new(tx));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("loaded 12 records");
            tracing::warn!("DISCOGS_TOKEN not set, using mock data");
            tracing::error!(page = 2, "Discogs API error");
        });

        let warn = rx.try_recv().unwrap();
        assert_eq!(warn.level, Level::WARN);
        assert!(warn.message.ends_with("DISCOGS_TOKEN not set, using mock data"));

        let error = rx.try_recv().unwrap();
        assert_eq!(error.level, Level::ERROR);
        assert!(error.message.ends_with("Discogs API error page=2"));

        assert!(rx.try_recv().is_err());
    }
}
