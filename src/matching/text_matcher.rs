use std::cmp::Ordering;

use crate::dom::traits::Document;
use crate::matching::clickability::is_clickable;
use crate::matching::visibility::is_visible;

/// Relevance given to a match on a label attribute.
pub const ATTRIBUTE_RELEVANCE: f64 = 1.0;

/// Relevance differences at or below this are ordered by text length instead.
pub const RELEVANCE_GAP: f64 = 0.1;

/// Attributes whose values count as a label for the element.
pub const LABEL_ATTRIBUTES: &[&str] = &["aria-label", "title", "alt"];

#[derive(Debug, Clone)]
struct Candidate<E> {
    element: E,
    relevance: f64,
    text_length: usize,
}

/// Visible, clickable elements whose text or label contains `query`, best first.
///
/// Matching is case-insensitive. Every element of the document is scanned.
/// An element may be listed twice when both its text and a label match.
/// A query that is empty or only whitespace matches nothing.
pub fn find_by_text<D: Document>(doc: &D, query: &str) -> Vec<D::Element> {
    find_by_text_within(doc, query, None)
}

/// [`find_by_text`] restricted to the descendants of `scope`.
pub fn find_by_text_within<D: Document>(
    doc: &D,
    query: &str,
    scope: Option<&D::Element>,
) -> Vec<D::Element> {
    let needle = query.to_lowercase();
    if needle.trim().is_empty() {
        return Vec::new();
    }
    let needle_len = needle.chars().count();

    let mut candidates = Vec::new();
    for element in doc.all_elements(scope) {
        if !is_visible(doc, &element) || !is_clickable(doc, &element) {
            continue;
        }

        let text = doc.text_content(&element);
        let text_length = text.chars().count();
        if text.to_lowercase().contains(&needle) {
            candidates.push(Candidate {
                element: element.clone(),
                relevance: needle_len as f64 / text_length as f64,
                text_length,
            });
        }

        let labelled = LABEL_ATTRIBUTES.iter().any(|name| {
            doc.attribute(&element, name)
                .is_some_and(|value| value.to_lowercase().contains(&needle))
        });
        if labelled {
            candidates.push(Candidate {
                element,
                relevance: ATTRIBUTE_RELEVANCE,
                text_length: text_length.max(1),
            });
        }
    }

    rank(&mut candidates);
    tracing::trace!(query = %query, matches = candidates.len(), "text scan finished");
    candidates.into_iter().map(|c| c.element).collect()
}

fn compare<E>(a: &Candidate<E>, b: &Candidate<E>) -> Ordering {
    if (a.relevance - b.relevance).abs() > RELEVANCE_GAP {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(Ordering::Equal)
    } else {
        a.text_length.cmp(&b.text_length)
    }
}

/// Stable insertion sort.
///
/// `compare` is not transitive across the gap threshold, which the standard
/// library sorts are allowed to reject at runtime.
fn rank<E>(candidates: &mut [Candidate<E>]) {
    for i in 1..candidates.len() {
        let mut j = i;
        while j > 0 && compare(&candidates[j - 1], &candidates[j]) == Ordering::Greater {
            candidates.swap(j - 1, j);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::{ElementSpec, MemoryDocument};
    use crate::dom::types::Display;

    fn candidate(id: u32, relevance: f64, text_length: usize) -> Candidate<u32> {
        Candidate {
            element: id,
            relevance,
            text_length,
        }
    }

    fn ranked(mut list: Vec<Candidate<u32>>) -> Vec<u32> {
        rank(&mut list);
        list.into_iter().map(|c| c.element).collect()
    }

    #[test]
    fn exact_label_outranks_long_passage() {
        let doc = MemoryDocument::new("about:blank");
        let long = doc.append(
            doc.body(),
            ElementSpec::new("button").text("Continue to next page with lots of extra context"),
        );
        let exact = doc.append(doc.body(), ElementSpec::new("button").text("Continue"));

        assert_eq!(find_by_text(&doc, "Continue"), vec![exact, long]);
    }

    #[test]
    fn match_is_case_insensitive() {
        let doc = MemoryDocument::new("about:blank");
        let button = doc.append(doc.body(), ElementSpec::new("button").text("CONTINUE »"));
        assert_eq!(find_by_text(&doc, "continue"), vec![button]);
    }

    #[test]
    fn skips_hidden_and_inert_elements() {
        let doc = MemoryDocument::new("about:blank");
        doc.append(doc.body(), ElementSpec::new("p").text("Continue"));
        doc.append(
            doc.body(),
            ElementSpec::new("button").text("Continue").display(Display::None),
        );
        assert!(find_by_text(&doc, "Continue").is_empty());
    }

    #[test]
    fn attribute_match_adds_a_second_candidate() {
        let doc = MemoryDocument::new("about:blank");
        let both = doc.append(
            doc.body(),
            ElementSpec::new("button")
                .attr("title", "Continue reading")
                .text("Continue reading the rest of this article"),
        );
        let icon = doc.append(
            doc.body(),
            ElementSpec::new("a").attr("aria-label", "Continue"),
        );

        // Label matches rank 1.0; the icon has no text so its length counts as 1.
        assert_eq!(find_by_text(&doc, "continue"), vec![icon, both, both]);
    }

    #[test]
    fn empty_query_matches_nothing() {
        let doc = MemoryDocument::new("about:blank");
        doc.append(doc.body(), ElementSpec::new("button").text("Continue"));
        assert!(find_by_text(&doc, "").is_empty());
        assert!(find_by_text(&doc, "   ").is_empty());
    }

    #[test]
    fn scope_limits_the_scan() {
        let doc = MemoryDocument::new("about:blank");
        let dialog = doc.append(doc.body(), ElementSpec::new("dialog"));
        let inside = doc.append(dialog, ElementSpec::new("button").text("Continue"));
        doc.append(doc.body(), ElementSpec::new("button").text("Continue"));

        assert_eq!(find_by_text_within(&doc, "Continue", Some(&dialog)), vec![inside]);
    }

    #[test]
    fn gap_above_threshold_orders_by_relevance() {
        assert_eq!(
            ranked(vec![candidate(1, 0.5, 4), candidate(2, 0.8, 40)]),
            vec![2, 1]
        );
    }

    #[test]
    fn gap_decides_which_key_orders() {
        // 0.75 - 0.7 = 0.05 is within the gap, 0.75 - 0.625 = 0.125 is not.
        assert_eq!(
            ranked(vec![candidate(1, 0.75, 20), candidate(2, 0.7, 10)]),
            vec![2, 1]
        );
        assert_eq!(
            ranked(vec![candidate(1, 0.625, 5), candidate(2, 0.75, 20)]),
            vec![2, 1]
        );
    }

    #[test]
    fn full_ties_keep_encounter_order() {
        assert_eq!(
            ranked(vec![
                candidate(1, 1.0, 8),
                candidate(2, 1.0, 8),
                candidate(3, 1.0, 8)
            ]),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn gap_of_exactly_a_tenth_orders_by_length() {
        // 0.6 - 0.5 lands just under RELEVANCE_GAP in floating point.
        assert!((0.6_f64 - 0.5).abs() <= RELEVANCE_GAP);
        assert_eq!(
            ranked(vec![candidate(1, 0.5, 1), candidate(2, 0.6, 9)]),
            vec![1, 2]
        );
        assert_eq!(
            ranked(vec![candidate(2, 0.6, 9), candidate(1, 0.5, 1)]),
            vec![1, 2]
        );
    }

    #[test]
    fn label_beats_near_exact_text_on_relevance() {
        let doc = MemoryDocument::new("about:blank");
        let text = doc.append(doc.body(), ElementSpec::new("button").text("Continue!"));
        let labelled = doc.append(
            doc.body(),
            ElementSpec::new("button")
                .attr("aria-label", "Continue")
                .text("Next step, please go on"),
        );

        // 8/9 is more than RELEVANCE_GAP below ATTRIBUTE_RELEVANCE, so the
        // longer labelled button still comes first.
        assert!(ATTRIBUTE_RELEVANCE - 8.0 / 9.0 > RELEVANCE_GAP);
        assert_eq!(find_by_text(&doc, "continue"), vec![labelled, text]);
    }
}
