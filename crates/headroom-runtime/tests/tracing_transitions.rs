#![forbid(unsafe_code)]

//! Log contract for chrome transitions.
//!
//! Every applied state change emits one DEBUG `chrome transition` event with
//! `element`, `from`, `to`, `position` and `at_ms`. Timer bookkeeping stays at
//! TRACE.
//!
//! Run:
//!   cargo test -p headroom-runtime --test tracing_transitions

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use core::time::Duration;

use headroom_core::{PageContext, ScrollObservation};
use headroom_runtime::{ChromeSequencer, ChromeTransition, SequencingPolicy};
use tracing_subscriber::layer::SubscriberExt;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: HashMap<String, String>,
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.get("message").cloned().unwrap_or_default();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields,
        });
    }
}

fn with_captured_events<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(EventCapture {
            events: Arc::clone(&events),
        });
    tracing::subscriber::with_default(subscriber, f);
    let out = events.lock().unwrap().clone();
    out
}

fn transitions(events: &[CapturedEvent]) -> Vec<&CapturedEvent> {
    events
        .iter()
        .filter(|e| e.message == "chrome transition")
        .collect()
}

#[test]
fn each_transition_logs_once_at_debug() {
    let mut applied: Vec<ChromeTransition> = Vec::new();
    let events = with_captured_events(|| {
        let mut seq =
            ChromeSequencer::new(SequencingPolicy::default(), PageContext::landing_desktop());
        applied.extend(seq.observe(&ScrollObservation::new(70, 0, Duration::ZERO)));
        applied.extend(seq.observe(&ScrollObservation::new(200, 70, Duration::from_millis(16))));
        applied.extend(seq.advance(Duration::from_millis(400)));
        applied.extend(seq.observe(&ScrollObservation::new(10, 200, Duration::from_millis(500))));
        applied.extend(seq.advance(Duration::from_millis(700)));
    });

    let logged = transitions(&events);
    assert_eq!(logged.len(), applied.len());
    assert!(logged.iter().all(|e| e.level == tracing::Level::DEBUG));

    let elements: Vec<&str> = logged.iter().map(|e| e.fields["element"].as_str()).collect();
    assert_eq!(elements, ["banner", "navbar", "navbar", "banner"]);

    let first = logged[0];
    assert_eq!(first.fields["from"], "shown");
    assert_eq!(first.fields["to"], "scroll_hidden");
    assert_eq!(first.fields["position"], "70");
    assert_eq!(first.fields["at_ms"], "0");
}

#[test]
fn timer_bookkeeping_is_trace_only() {
    let events = with_captured_events(|| {
        let mut seq =
            ChromeSequencer::new(SequencingPolicy::default(), PageContext::landing_desktop());
        seq.observe(&ScrollObservation::new(130, 0, Duration::ZERO));
        seq.observe(&ScrollObservation::new(100, 130, Duration::from_millis(20)));
        seq.teardown();
    });

    let armed: Vec<_> = events
        .iter()
        .filter(|e| e.message.contains("check armed") || e.message.contains("cancelled"))
        .collect();
    assert!(!armed.is_empty());
    assert!(armed.iter().all(|e| e.level == tracing::Level::TRACE));
    assert!(events.iter().any(|e| e.message == "sequencer torn down"));
}

#[test]
fn context_change_logs_eligibility() {
    let events = with_captured_events(|| {
        let mut seq =
            ChromeSequencer::new(SequencingPolicy::default(), PageContext::landing_desktop());
        seq.set_context(
            PageContext {
                is_landing_route: true,
                is_mobile_viewport: true,
            },
            Duration::ZERO,
        );
    });
    let change = events
        .iter()
        .find(|e| e.message == "page context changed")
        .expect("context event");
    assert_eq!(change.fields["banner_eligible"], "false");
    assert_eq!(change.fields["is_mobile_viewport"], "true");
}
