use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::errors::{QuickSpaceError, QuickSpaceResult};
use crate::rules::store::RuleStore;
use crate::web::document::js_message;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "storage", "sync"], js_name = get, catch)]
    fn sync_get(keys: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "sync"], js_name = set, catch)]
    fn sync_set(items: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "sync"], js_name = remove, catch)]
    fn sync_remove(keys: &JsValue) -> Result<js_sys::Promise, JsValue>;
}

/// `chrome.storage.sync`, through its promise-returning API.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeSyncStore;

fn storage_error(e: JsValue) -> QuickSpaceError {
    QuickSpaceError::Storage(js_message(&e))
}

fn key_array(keys: &[&str]) -> JsValue {
    keys.iter()
        .map(|k| JsValue::from_str(k))
        .collect::<js_sys::Array>()
        .into()
}

async fn settle(promise: Result<js_sys::Promise, JsValue>) -> QuickSpaceResult<JsValue> {
    let promise = promise.map_err(storage_error)?;
    JsFuture::from(promise).await.map_err(storage_error)
}

#[async_trait(?Send)]
impl RuleStore for ChromeSyncStore {
    async fn get(&self, keys: &[&str]) -> QuickSpaceResult<Value> {
        let result = settle(sync_get(&key_array(keys))).await?;
        serde_wasm_bindgen::from_value(result)
            .map_err(|e| QuickSpaceError::Storage(format!("unreadable storage value: {e}")))
    }

    async fn set(&self, key: &str, value: Value) -> QuickSpaceResult<()> {
        let mut items = serde_json::Map::new();
        items.insert(key.to_string(), value);
        let items = Value::Object(items)
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| QuickSpaceError::Storage(e.to_string()))?;
        settle(sync_set(&items)).await?;
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> QuickSpaceResult<()> {
        settle(sync_remove(&key_array(keys))).await?;
        Ok(())
    }
}
