//! Capture `tracing` events emitted while a closure runs.
//!
//! Proxy and reconciliation tests use this to check the structured fields of
//! the warnings and debug events the codec logs.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use tracing::{
    Dispatch,
    Event,
    Level,
    Metadata,
    Subscriber,
    field::{Field, Visit},
    span::{Attributes, Id, Record},
};

/// One event seen by the capture subscriber.
#[derive(Debug, Clone)]
pub(crate) struct CapturedEvent {
    pub(crate) level: Level,
    pub(crate) message: Option<String>,
    fields: HashMap<&'static str, String>,
}

impl CapturedEvent {
    /// Value of a structured field, formatted as the subscriber saw it.
    pub(crate) fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Default)]
struct Fields {
    message: Option<String>,
    values: HashMap<&'static str, String>,
}

impl Visit for Fields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_str(field, &format!("{value:?}"));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_str(field, &value.to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        } else {
            self.values.insert(field.name(), value.to_owned());
        }
    }
}

#[derive(Clone, Default)]
struct CaptureSubscriber {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl Subscriber for CaptureSubscriber {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool { true }

    fn new_span(&self, _attrs: &Attributes<'_>) -> Id { Id::from_u64(1) }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut fields = Fields::default();
        event.record(&mut fields);
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CapturedEvent {
                level: *event.metadata().level(),
                message: fields.message,
                fields: fields.values,
            });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Run `f` with a capturing subscriber installed on this thread and return
/// its result together with every event it emitted.
pub(crate) fn capture_events<T>(f: impl FnOnce() -> T) -> (T, Vec<CapturedEvent>) {
    let subscriber = CaptureSubscriber::default();
    let dispatch = Dispatch::new(subscriber.clone());
    let out = tracing::dispatcher::with_default(&dispatch, f);
    let events = std::mem::take(
        &mut *subscriber
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner),
    );
    (out, events)
}
