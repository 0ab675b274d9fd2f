use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::config::TriggerConfig;
use crate::dom::traits::Document;
use crate::dom::types::MutationRecord;
use crate::errors::{QuickSpaceError, QuickSpaceResult};
use crate::matching::pipeline;
use crate::rules::store::{fetch_rules, RuleStore};
use crate::rules::types::RuleList;
use crate::trigger::event_bus::{EventBus, TriggerEvent};
use crate::trigger::mutation::MutationWatcher;
use crate::trigger::state::{KeyEvent, KeyOutcome, PassReason, TriggerReport, TriggerState};

/// Tags whose focus keeps the trigger key's native behaviour.
pub const TEXT_ENTRY_TAGS: &[&str] = &["input", "textarea"];

struct Inner<D, S> {
    doc: D,
    store: S,
    config: TriggerConfig,
    state: Cell<TriggerState>,
    events: EventBus,
    watcher: MutationWatcher,
}

/// Binds the trigger key of one document to its rule pipeline.
///
/// Each controller owns its own Idle/Processing state, so frames with separate
/// controllers never block each other. Cloning shares the controller.
pub struct TriggerController<D, S> {
    inner: Rc<Inner<D, S>>,
}

impl<D, S> Clone for TriggerController<D, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// First, synchronous half of handling a key event.
pub enum Dispatch<D, S> {
    /// Leave the event alone.
    Passthrough(PassReason),
    /// Suppress the default action; a trigger is already processing.
    Dropped,
    /// Suppress the default action and run the returned trigger.
    Started(Trigger<D, S>),
}

impl<D, S> Dispatch<D, S> {
    pub fn prevents_default(&self) -> bool {
        !matches!(self, Self::Passthrough(_))
    }
}

/// Returns the controller to Idle when dropped, whatever happened in between.
struct ProcessingGuard<D, S> {
    inner: Rc<Inner<D, S>>,
}

impl<D, S> Drop for ProcessingGuard<D, S> {
    fn drop(&mut self) {
        self.inner.state.set(TriggerState::Idle);
    }
}

/// A trigger that holds the Processing state until it finishes or is dropped.
pub struct Trigger<D, S> {
    guard: ProcessingGuard<D, S>,
    id: String,
    started_at: chrono::DateTime<chrono::Utc>,
}

impl<D: Document, S: RuleStore> TriggerController<D, S> {
    pub fn new(doc: D, store: S, config: TriggerConfig) -> Self {
        let watcher = MutationWatcher::new(config.watch_mutations);
        Self {
            inner: Rc::new(Inner {
                doc,
                store,
                config,
                state: Cell::new(TriggerState::Idle),
                events: EventBus::new(),
                watcher,
            }),
        }
    }

    pub fn document(&self) -> &D {
        &self.inner.doc
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    pub fn state(&self) -> TriggerState {
        self.inner.state.get()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TriggerEvent> {
        self.inner.events.subscribe()
    }

    pub fn watcher(&self) -> &MutationWatcher {
        &self.inner.watcher
    }

    /// Classifies a key event and, when it should fire, enters Processing.
    ///
    /// Synchronous so the host can suppress the default action before awaiting.
    pub fn dispatch(&self, event: &KeyEvent<D::Element>) -> Dispatch<D, S> {
        if event.code != self.inner.config.key_code {
            return Dispatch::Passthrough(PassReason::OtherKey);
        }
        if event.repeat {
            return Dispatch::Passthrough(PassReason::Repeat);
        }
        if let Some(target) = &event.target {
            if self.is_text_entry(target) {
                tracing::trace!("trigger key inside text entry; leaving it to the page");
                return Dispatch::Passthrough(PassReason::TextEntry);
            }
        }

        if self.inner.state.get() == TriggerState::Processing {
            tracing::debug!("trigger already processing; dropping key event");
            self.inner.events.send(TriggerEvent::Dropped);
            return Dispatch::Dropped;
        }

        self.inner.state.set(TriggerState::Processing);
        let id = uuid::Uuid::new_v4().to_string();
        self.inner.events.send(TriggerEvent::Started {
            trigger_id: id.clone(),
        });
        Dispatch::Started(Trigger {
            guard: ProcessingGuard {
                inner: Rc::clone(&self.inner),
            },
            id,
            started_at: chrono::Utc::now(),
        })
    }

    /// Dispatches and, if started, runs the trigger to completion.
    pub async fn handle_key(&self, event: &KeyEvent<D::Element>) -> KeyOutcome {
        match self.dispatch(event) {
            Dispatch::Passthrough(reason) => KeyOutcome::Passthrough { reason },
            Dispatch::Dropped => KeyOutcome::Dropped,
            Dispatch::Started(trigger) => KeyOutcome::Completed {
                report: trigger.run().await,
            },
        }
    }

    /// Feeds a structural change to the passive watcher.
    pub fn observe_mutation(&self, record: &MutationRecord) {
        if self.inner.watcher.observe(record) {
            self.inner.events.send(TriggerEvent::MutationObserved {
                added_subtrees: record.added_subtrees,
                added_elements: record.added_elements,
            });
        }
    }

    fn is_text_entry(&self, target: &D::Element) -> bool {
        let tag = self.inner.doc.tag_name(target);
        TEXT_ENTRY_TAGS.contains(&tag.as_str()) || self.inner.doc.is_content_editable(target)
    }
}

impl<D: Document, S: RuleStore> Trigger<D, S> {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fetches a fresh rule list, runs the pipeline, and returns to Idle.
    pub async fn run(self) -> TriggerReport {
        let inner = Rc::clone(&self.guard.inner);

        let (rules, fetch_failed) = match fetch_with_timeout(&inner.store, &inner.config).await {
            Ok(rules) => (rules, false),
            Err(e) => {
                tracing::warn!(trigger_id = %self.id, error = %e, "rule list unavailable; treating as empty");
                (RuleList::default(), true)
            }
        };

        tracing::info!(
            trigger_id = %self.id,
            frame = %inner.doc.location(),
            rules = rules.len(),
            "searching frame"
        );
        let outcome = pipeline::run(&inner.doc, &rules);

        let report = TriggerReport {
            trigger_id: self.id,
            started_at: self.started_at,
            finished_at: chrono::Utc::now(),
            rule_count: rules.len(),
            fetch_failed,
            outcome,
        };
        drop(self.guard);

        tracing::debug!(
            trigger_id = %report.trigger_id,
            activated_rule = ?report.outcome.activated_rule,
            "trigger finished"
        );
        inner.events.send(TriggerEvent::Completed {
            report: report.clone(),
        });
        report
    }
}

async fn fetch_with_timeout<S: RuleStore>(
    store: &S,
    config: &TriggerConfig,
) -> QuickSpaceResult<RuleList> {
    match config.fetch_timeout_ms {
        Some(ms) => tokio::time::timeout(Duration::from_millis(ms), fetch_rules(store))
            .await
            .map_err(|_| QuickSpaceError::Timeout(ms))?,
        None => fetch_rules(store).await,
    }
}
