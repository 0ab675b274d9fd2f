//! Browser host: `web_sys` document, `chrome.storage.sync`, and the listeners
//! that drive a [`TriggerController`](crate::trigger::controller::TriggerController)
//! from a content script.
pub mod document;
pub mod install;
pub mod storage;
