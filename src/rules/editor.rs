//! Editor-side load and save of the rule list.
//!
//! The options page edits a [`RuleList`] in memory and persists it here. Saving
//! folds any legacy `selectors` entry into the new schema and drops the old key,
//! so a store is migrated the first time the user saves.
use serde_json::Value;

use crate::errors::QuickSpaceResult;
use crate::rules::normalize::{
    is_truthy, legacy_selectors, normalize, LEGACY_SELECTORS_KEY, RULES_KEY,
};
use crate::rules::store::RuleStore;
use crate::rules::types::{Rule, RuleList};

#[derive(Debug, Clone, PartialEq)]
pub struct SavePlan {
    pub rules: RuleList,
    /// Whether the legacy key must be deleted after writing `rules`.
    pub remove_legacy: bool,
}

/// The list to show in the editor. Falls back to [`RuleList::defaults`] when
/// neither key holds a truthy value.
pub async fn load_for_editing<S: RuleStore + ?Sized>(store: &S) -> QuickSpaceResult<RuleList> {
    let raw = store.get(&[RULES_KEY, LEGACY_SELECTORS_KEY]).await?;
    let nothing_stored = [RULES_KEY, LEGACY_SELECTORS_KEY]
        .iter()
        .all(|key| !raw.get(key).is_some_and(is_truthy));
    if nothing_stored {
        tracing::debug!("no stored rules; offering defaults");
        return Ok(RuleList::defaults());
    }
    Ok(normalize(&raw))
}

/// Decides what to write for the edited list.
///
/// Values are trimmed and blank rules dropped. Legacy selectors still present
/// in `stored` are appended after the edited rules.
pub fn prepare_save(edited: &RuleList, stored: &Value) -> SavePlan {
    let mut rules: RuleList = edited
        .iter()
        .filter_map(|rule| {
            let value = rule.value.trim();
            (!value.is_empty()).then(|| Rule {
                kind: rule.kind.clone(),
                value: value.to_string(),
            })
        })
        .collect();

    let legacy = legacy_selectors(stored);
    let remove_legacy = legacy.is_some();
    for selector in legacy.into_iter().flatten() {
        rules.push(Rule::selector(selector));
    }

    SavePlan {
        rules,
        remove_legacy,
    }
}

/// Persists the edited list and returns what was written.
pub async fn save<S: RuleStore + ?Sized>(store: &S, edited: &RuleList) -> QuickSpaceResult<RuleList> {
    let stored = store.get(&[LEGACY_SELECTORS_KEY]).await?;
    let plan = prepare_save(edited, &stored);

    store
        .set(RULES_KEY, serde_json::to_value(&plan.rules)?)
        .await?;
    if plan.remove_legacy {
        store.remove(&[LEGACY_SELECTORS_KEY]).await?;
        tracing::info!("legacy selectors migrated into rules");
    }
    tracing::info!(count = plan.rules.len(), "rules saved");
    Ok(plan.rules)
}
