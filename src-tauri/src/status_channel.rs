use std::sync::{Arc, Mutex};

/// Receiver of startup status messages and raw backend log lines.
pub(crate) trait StatusListener: Send + Sync {
    fn on_status(&self, message: &str);
    fn on_log(&self, line: &str);
}

/// Best-effort fan-out to at most one attached listener.
///
/// Messages sent while nothing is attached are dropped.
#[derive(Default)]
pub(crate) struct StatusChannel {
    listener: Mutex<Option<Arc<dyn StatusListener>>>,
}

impl StatusChannel {
    pub(crate) fn attach(&self, listener: Arc<dyn StatusListener>) {
        let mut guard = match self.listener.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(listener);
    }

    pub(crate) fn detach(&self) {
        let mut guard = match self.listener.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.current().is_some()
    }

    pub(crate) fn send_status(&self, message: &str) {
        if let Some(listener) = self.current() {
            listener.on_status(message);
        }
    }

    pub(crate) fn send_log(&self, line: &str) {
        if let Some(listener) = self.current() {
            listener.on_log(line);
        }
    }

    // Cloned out so a slow listener never holds the lock.
    fn current(&self) -> Option<Arc<dyn StatusListener>> {
        match self.listener.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl std::fmt::Debug for StatusChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusChannel")
            .field("attached", &self.is_attached())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{
        recording::{Notification, RecordingListener},
        StatusChannel,
    };

    #[test]
    fn messages_without_listener_are_dropped() {
        let channel = StatusChannel::default();
        channel.send_status("Checking Microcks status...");
        channel.send_log("lost line");

        let listener = Arc::new(RecordingListener::default());
        channel.attach(listener.clone());
        channel.send_log("kept line");

        assert_eq!(
            listener.snapshot(),
            vec![Notification::Log("kept line".to_string())]
        );
    }

    #[test]
    fn detach_stops_delivery_and_attach_replaces_listener() {
        let channel = StatusChannel::default();
        let first = Arc::new(RecordingListener::default());
        let second = Arc::new(RecordingListener::default());

        channel.attach(first.clone());
        channel.send_status("one");
        channel.attach(second.clone());
        channel.send_status("two");
        channel.detach();
        channel.send_status("three");

        assert!(!channel.is_attached());
        assert_eq!(first.statuses(), vec!["one".to_string()]);
        assert_eq!(second.statuses(), vec!["two".to_string()]);
    }
}
