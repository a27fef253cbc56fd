mod common;
use common::*;

use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event as TraceEvent, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::Registry;

#[derive(Clone, Default)]
struct Capture {
    events: Arc<Mutex<Vec<(String, String, Vec<(String, String)>)>>>,
}

#[derive(Default)]
struct Fields(Vec<(String, String)>);

impl Visit for Fields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
}

impl<S: Subscriber> Layer<S> for Capture {
    fn on_event(&self, event: &TraceEvent<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        event.record(&mut fields);
        let meta = event.metadata();
        let message = fields
            .0
            .iter()
            .find(|(name, _)| name == "message")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        self.events
            .lock()
            .unwrap()
            .push((meta.target().to_string(), message, fields.0));
    }
}

#[test]
fn multiline_paste_logs_sizes_only() {
    let capture = Capture::default();
    let events = capture.events.clone();
    let dispatch = tracing::Dispatch::new(Registry::default().with(capture));

    tracing::dispatcher::with_default(&dispatch, || {
        let mut s = session(&["hunter2\nswordfish\n", "y"]);
        assert_eq!(s.read(), "hunter2");
        assert_eq!(s.read(), "swordfish");
    });

    let events = events.lock().unwrap();
    let complete = events
        .iter()
        .find(|(target, message, _)| target == "actions.multiline" && message == "paste_complete")
        .expect("missing paste_complete event");
    assert!(complete.2.iter().any(|(name, value)| name == "bytes" && value == "18"));

    for (target, _, fields) in events.iter().filter(|(t, _, _)| t.starts_with("actions.")) {
        for (_, value) in fields {
            assert!(!value.contains("hunter2"), "{target} leaked pasted text: {value}");
            assert!(!value.contains("swordfish"), "{target} leaked pasted text: {value}");
        }
    }
}
