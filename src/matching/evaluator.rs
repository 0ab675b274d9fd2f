use crate::dom::traits::Document;
use crate::matching::text_matcher::find_by_text;
use crate::matching::visibility::is_visible;
use crate::rules::types::{Rule, RuleKind};

/// Candidates for `rule`, in the order they should be tried.
///
/// Invalid selectors and unknown kinds yield no candidates.
pub fn candidates<D: Document>(doc: &D, rule: &Rule) -> Vec<D::Element> {
    match &rule.kind {
        RuleKind::Selector => match doc.query_selector_all(&rule.value) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(selector = %rule.value, error = %e, "invalid CSS selector");
                Vec::new()
            }
        },
        RuleKind::Text => find_by_text(doc, &rule.value),
        RuleKind::Unknown(kind) => {
            tracing::debug!(kind = %kind, value = %rule.value, "skipping rule of unknown kind");
            Vec::new()
        }
    }
}

/// Activates the first currently visible candidate of `rule`.
///
/// Returns whether an element was activated. At most one activation happens.
pub fn evaluate<D: Document>(doc: &D, rule: &Rule) -> bool {
    tracing::debug!(kind = %rule.kind, value = %rule.value, "processing rule");

    let matches = candidates(doc, rule);
    tracing::debug!(kind = %rule.kind, value = %rule.value, count = matches.len(), "rule matches");

    // Visibility is checked again: the page may have changed since the scan.
    match matches.iter().find(|element| is_visible(doc, *element)) {
        Some(element) => {
            tracing::info!(kind = %rule.kind, value = %rule.value, element = ?element, "activating element");
            doc.activate(element);
            true
        }
        None => false,
    }
}
