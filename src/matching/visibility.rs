use crate::dom::traits::Document;
use crate::dom::types::{Display, Visibility};

/// Whether `element` is rendered with a non-empty box.
///
/// `opacity: 0` and `clip-path` are not considered; an element hidden only
/// through those still counts as visible.
pub fn is_visible<D: Document>(doc: &D, element: &D::Element) -> bool {
    let Some(style) = doc.computed_style(element) else {
        return false;
    };
    if style.display == Display::None || style.visibility == Visibility::Hidden {
        return false;
    }
    doc.rendered_size(element).has_area()
}
