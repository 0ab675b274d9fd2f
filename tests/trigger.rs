use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use quickspace_lib::config::TriggerConfig;
use quickspace_lib::dom::memory::{ElementSpec, MemoryDocument, NodeId};
use quickspace_lib::rules::store::{MemoryRuleStore, RuleStore};
use quickspace_lib::trigger::event_bus::TriggerEvent;
use quickspace_lib::trigger::state::{KeyEvent, KeyOutcome, PassReason, TriggerState};
use quickspace_lib::{QuickSpaceResult, TriggerController};
use serde_json::{json, Value};
use tokio::sync::Notify;

/// Holds every `get` until the gate is opened, counting the calls.
struct GatedStore {
    gate: Rc<Notify>,
    gets: Cell<usize>,
    inner: MemoryRuleStore,
}

#[async_trait(?Send)]
impl RuleStore for GatedStore {
    async fn get(&self, keys: &[&str]) -> QuickSpaceResult<Value> {
        self.gets.set(self.gets.get() + 1);
        self.gate.notified().await;
        self.inner.get(keys).await
    }

    async fn set(&self, key: &str, value: Value) -> QuickSpaceResult<()> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, keys: &[&str]) -> QuickSpaceResult<()> {
        self.inner.remove(keys).await
    }
}

fn space(target: Option<NodeId>) -> KeyEvent<NodeId> {
    KeyEvent::new("Space", target)
}

fn lesson_page() -> (MemoryDocument, NodeId) {
    let doc = MemoryDocument::new("https://course.example.test/lesson/3");
    let next = doc.append(doc.body(), ElementSpec::new("button").class("continue-btn").text("Continue"));
    (doc, next)
}

#[tokio::test]
async fn second_key_during_fetch_is_dropped() {
    let (doc, next) = lesson_page();
    let gate = Rc::new(Notify::new());
    let store = GatedStore {
        gate: Rc::clone(&gate),
        gets: Cell::new(0),
        inner: MemoryRuleStore::new().with_entry("selectors", json!(["button.continue-btn"])),
    };
    let controller = TriggerController::new(doc, store, TriggerConfig::default());

    let (press, press_again) = (space(None), space(None));
    let first = controller.handle_key(&press);
    let second = async {
        let outcome = controller.handle_key(&press_again).await;
        gate.notify_one();
        outcome
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(second, KeyOutcome::Dropped);
    assert!(second.prevents_default());
    let KeyOutcome::Completed { report } = first else {
        panic!("first key should run the pipeline");
    };
    assert_eq!(report.outcome.activated_rule, Some(0));
    assert_eq!(controller.store().gets.get(), 1);
    assert_eq!(controller.document().activations(), vec![next]);
    assert_eq!(controller.state(), TriggerState::Idle);
}

#[tokio::test]
async fn next_key_after_completion_runs_again() {
    let (doc, next) = lesson_page();
    let store = MemoryRuleStore::new().with_entry("rules", json!([{"type": "text", "value": "Continue"}]));
    let controller = TriggerController::new(doc, store, TriggerConfig::default());

    controller.handle_key(&space(None)).await;
    controller.handle_key(&space(None)).await;
    assert_eq!(controller.document().activations(), vec![next, next]);
}

#[tokio::test]
async fn text_entry_keeps_native_space() {
    let (doc, _) = lesson_page();
    let form = doc.append(doc.body(), ElementSpec::new("form"));
    let input = doc.append(form, ElementSpec::new("input").attr("type", "text"));
    let notes = doc.append(doc.body(), ElementSpec::new("textarea"));
    let store = MemoryRuleStore::new().with_entry("selectors", json!(["button"]));
    let controller = TriggerController::new(doc, store, TriggerConfig::default());
    let mut events = controller.subscribe();

    for target in [input, notes] {
        let outcome = controller.handle_key(&space(Some(target))).await;
        assert_eq!(outcome, KeyOutcome::Passthrough { reason: PassReason::TextEntry });
        assert!(!outcome.prevents_default());
    }
    assert!(controller.document().activations().is_empty());
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn focus_on_a_button_still_triggers() {
    let (doc, next) = lesson_page();
    let store = MemoryRuleStore::new().with_entry("selectors", json!(["button.continue-btn"]));
    let controller = TriggerController::new(doc, store, TriggerConfig::default());

    let outcome = controller.handle_key(&space(Some(next))).await;
    assert!(outcome.prevents_default());
    let mut events = controller.subscribe();
    controller.handle_key(&KeyEvent::new("Enter", Some(next))).await;
    assert!(events.try_recv().is_err());
    assert!(matches!(outcome, KeyOutcome::Completed { .. }));
}

#[tokio::test]
async fn reports_cover_the_whole_trigger() {
    let (doc, _) = lesson_page();
    let store = MemoryRuleStore::new().with_entry("rules", json!([{"type": "selector", "value": "#absent"}]));
    let controller = TriggerController::new(doc, store, TriggerConfig::default());
    let mut events = controller.subscribe();

    let KeyOutcome::Completed { report } = controller.handle_key(&space(None)).await else {
        panic!("expected a completed trigger");
    };
    assert_eq!(report.rule_count, 1);
    assert_eq!(report.outcome.evaluated, 1);
    assert!(!report.outcome.activated());
    assert!(report.finished_at >= report.started_at);

    let TriggerEvent::Started { trigger_id } = events.try_recv().unwrap() else {
        panic!("expected start event");
    };
    assert_eq!(trigger_id, report.trigger_id);
}
