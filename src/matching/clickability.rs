use crate::dom::traits::Document;
use crate::dom::types::Cursor;

/// Tags that are controls on their own.
pub const ACTIONABLE_TAGS: &[&str] = &["button", "a", "input"];

/// Tags that make their descendants clickable. `input` has no content, so it
/// is not listed.
pub const ACTIONABLE_ANCESTOR_TAGS: &[&str] = &["button", "a"];

/// How many ancestors are inspected before giving up.
pub const ANCESTOR_WALK_LIMIT: usize = 3;

/// Whether `element`, or one of its close ancestors, acts as a control.
pub fn is_clickable<D: Document>(doc: &D, element: &D::Element) -> bool {
    let Some(style) = doc.computed_style(element) else {
        return false;
    };

    let tag = doc.tag_name(element);
    if ACTIONABLE_TAGS.contains(&tag.as_str()) {
        return true;
    }
    if style.cursor == Cursor::Pointer {
        return true;
    }
    if has_click_affordance(doc, element) {
        return true;
    }

    // An icon or label nested inside a real button is what the user aims at.
    let mut parent = doc.parent(element);
    let mut level = 0;
    while let Some(ancestor) = parent {
        if level >= ANCESTOR_WALK_LIMIT {
            break;
        }
        let ancestor_tag = doc.tag_name(&ancestor);
        if ACTIONABLE_ANCESTOR_TAGS.contains(&ancestor_tag.as_str())
            || has_click_affordance(doc, &ancestor)
        {
            return true;
        }
        parent = doc.parent(&ancestor);
        level += 1;
    }

    false
}

/// Inline click handler or an explicit button role.
fn has_click_affordance<D: Document>(doc: &D, element: &D::Element) -> bool {
    doc.has_attribute(element, "onclick")
        || doc
            .attribute(element, "role")
            .is_some_and(|role| role == "button")
}
