use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::str::FromStr;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Upload,
    Uploaded,
    Remove,
    Removed,
    Error,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Upload => "upload",
            EventKind::Uploaded => "uploaded",
            EventKind::Remove => "remove",
            EventKind::Removed => "removed",
            EventKind::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upload" => Ok(EventKind::Upload),
            "uploaded" => Ok(EventKind::Uploaded),
            "remove" => Ok(EventKind::Remove),
            "removed" => Ok(EventKind::Removed),
            "error" => Ok(EventKind::Error),
            other => Err(format!("unknown event '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An upload batch was opened; nothing has been sent yet.
    Upload,
    Uploaded { count: usize },
    Remove,
    Removed,
    Error { message: String },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Upload => EventKind::Upload,
            Event::Uploaded { .. } => EventKind::Uploaded,
            Event::Remove => EventKind::Remove,
            Event::Removed => EventKind::Removed,
            Event::Error { .. } => EventKind::Error,
        }
    }
}

type Handler = Arc<dyn Fn(&Event) -> anyhow::Result<()> + Send + Sync>;

/// Synchronous publish/subscribe for client events.
///
/// Handlers run in registration order on the emitting task. A handler that
/// returns an error or panics is logged and skipped; the remaining handlers
/// and the emitter carry on.
#[derive(Default)]
pub struct Notifier {
    handlers: RwLock<Vec<(EventKind, Handler)>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        handlers.push((kind, Arc::new(handler)));
    }

    pub fn emit(&self, event: Event) {
        let kind = event.kind();
        log::debug!("Emitting '{kind}'");
        // Snapshot so handlers may subscribe while being dispatched.
        let matching: Vec<Handler> = self
            .handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, h)| Arc::clone(h))
            .collect();

        for handler in matching {
            match catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log::error!("'{kind}' handler failed: {e:#}"),
                Err(_) => log::error!("'{kind}' handler panicked"),
            }
        }
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self
            .handlers
            .read()
            .map(|h| h.len())
            .unwrap_or_default();
        f.debug_struct("Notifier").field("handlers", &count).finish()
    }
}
