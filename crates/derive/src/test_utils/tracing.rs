//! A `tracing-subscriber` layer recording the level and message of every event, for asserting on
//! what the pipeline logs.

use spin::Mutex;
use std::{fmt, sync::Arc};
use tracing::{
    field::{Field, Visit},
    Event, Level, Subscriber,
};
use tracing_subscriber::{layer::Context, Layer};

/// The events recorded by a [CollectingLayer].
#[derive(Debug, Default, Clone)]
pub struct TraceStorage(pub Arc<Mutex<Vec<(Level, String)>>>);

impl TraceStorage {
    /// Returns the messages recorded at `level`, oldest first.
    pub fn get_by_level(&self, level: Level) -> Vec<String> {
        self.0.lock().iter().filter(|(l, _)| *l == level).map(|(_, msg)| msg.clone()).collect()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

/// A layer pushing every event into a [TraceStorage].
#[derive(Debug, Default)]
pub struct CollectingLayer {
    /// Where events are recorded.
    pub storage: TraceStorage,
}

impl CollectingLayer {
    /// Creates a new layer recording into `storage`.
    pub const fn new(storage: TraceStorage) -> Self {
        Self { storage }
    }
}

impl<S: Subscriber> Layer<S> for CollectingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.storage.0.lock().push((*event.metadata().level(), visitor.0));
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}
