use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Element, KeyboardEvent, MutationObserver, MutationObserverInit};

use crate::config::EngineConfig;
use crate::dom::traits::Document;
use crate::dom::types::MutationRecord;
use crate::errors::{QuickSpaceError, QuickSpaceResult};
use crate::trigger::controller::{Dispatch, TriggerController};
use crate::trigger::state::KeyEvent;
use crate::web::document::{js_message, WebDocument};
use crate::web::storage::ChromeSyncStore;

pub type WebController = TriggerController<WebDocument, ChromeSyncStore>;

/// Content-script entry point: wires the default configuration into this frame.
#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    install(EngineConfig::default())
        .map(|_| ())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Registers the capture-phase key listener and, if enabled, the mutation watcher.
///
/// The listeners stay registered for the lifetime of the frame.
pub fn install(mut config: EngineConfig) -> QuickSpaceResult<WebController> {
    if let Some(ms) = config.trigger.fetch_timeout_ms.take() {
        // tokio has no timer driver on wasm32.
        tracing::warn!(timeout_ms = ms, "fetch timeout is not available in the browser; ignoring");
    }

    let document = WebDocument::current()?;
    let controller = TriggerController::new(document, ChromeSyncStore, config.trigger.clone());

    listen_for_trigger_key(&controller)?;
    if controller.watcher().enabled() {
        watch_mutations(&controller)?;
    }
    tracing::info!(frame = %controller.document().location(), "quickspace installed");
    Ok(controller)
}

fn listen_for_trigger_key(controller: &WebController) -> QuickSpaceResult<()> {
    let handler = controller.clone();
    let on_keydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
        let key = KeyEvent {
            code: event.code(),
            repeat: event.repeat(),
            target: event.target().and_then(|t| t.dyn_into::<Element>().ok()),
        };
        match handler.dispatch(&key) {
            Dispatch::Passthrough(_) => {}
            Dispatch::Dropped => event.prevent_default(),
            Dispatch::Started(trigger) => {
                event.prevent_default();
                wasm_bindgen_futures::spawn_local(async move {
                    trigger.run().await;
                });
            }
        }
    });

    let options = AddEventListenerOptions::new();
    options.set_capture(true);
    controller
        .document()
        .raw()
        .add_event_listener_with_callback_and_add_event_listener_options(
            "keydown",
            on_keydown.as_ref().unchecked_ref(),
            &options,
        )
        .map_err(|e| QuickSpaceError::Document(js_message(&e)))?;
    on_keydown.forget();
    Ok(())
}

fn watch_mutations(controller: &WebController) -> QuickSpaceResult<()> {
    let handler = controller.clone();
    let on_mutations = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
        move |records: js_sys::Array, _observer: MutationObserver| {
            let mut batch = MutationRecord::default();
            for record in records.iter() {
                let record: web_sys::MutationRecord = record.unchecked_into();
                let added = record.added_nodes();
                for node in (0..added.length()).filter_map(|i| added.item(i)) {
                    if let Some(element) = node.dyn_ref::<Element>() {
                        let descendants = element
                            .query_selector_all("*")
                            .map(|list| list.length() as usize)
                            .unwrap_or(0);
                        batch.added_subtrees += 1;
                        batch.added_elements += 1 + descendants;
                    }
                }
            }
            handler.observe_mutation(&batch);
        },
    );

    let observer = MutationObserver::new(on_mutations.as_ref().unchecked_ref())
        .map_err(|e| QuickSpaceError::Document(js_message(&e)))?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);

    let root = controller
        .document()
        .raw()
        .document_element()
        .ok_or_else(|| QuickSpaceError::Document("document has no root element".into()))?;
    observer
        .observe_with_options(&root, &init)
        .map_err(|e| QuickSpaceError::Document(js_message(&e)))?;
    on_mutations.forget();
    Ok(())
}
