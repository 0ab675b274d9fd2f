use crate::dom::types::{ComputedStyle, ElementSize};
use crate::errors::QuickSpaceResult;

/// Host seam over a live document.
///
/// Two implementations ship with the crate: [`MemoryDocument`] for tests and
/// native embedding, and `WebDocument` over `web_sys` on wasm32. Every call is
/// synchronous; the host may mutate the tree between calls, so handles can go
/// stale and implementations report that as a missing style or parent rather
/// than an error.
///
/// [`MemoryDocument`]: crate::dom::memory::MemoryDocument
pub trait Document {
    type Element: Clone + PartialEq + std::fmt::Debug;

    /// Every element in document order. With a scope, only its descendants.
    fn all_elements(&self, scope: Option<&Self::Element>) -> Vec<Self::Element>;

    /// Resolves a CSS selector list against the whole document, in document order.
    fn query_selector_all(&self, selector: &str) -> QuickSpaceResult<Vec<Self::Element>>;

    /// Lower-cased tag name.
    fn tag_name(&self, element: &Self::Element) -> String;

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    fn has_attribute(&self, element: &Self::Element, name: &str) -> bool {
        self.attribute(element, name).is_some()
    }

    fn parent(&self, element: &Self::Element) -> Option<Self::Element>;

    /// Concatenated text of all descendant text nodes.
    fn text_content(&self, element: &Self::Element) -> String;

    /// `None` when the element is no longer part of the document.
    fn computed_style(&self, element: &Self::Element) -> Option<ComputedStyle>;

    fn rendered_size(&self, element: &Self::Element) -> ElementSize;

    fn is_content_editable(&self, element: &Self::Element) -> bool;

    /// Synthesizes a user click on the element.
    fn activate(&self, element: &Self::Element);

    /// URL of the frame, for diagnostics.
    fn location(&self) -> String {
        String::new()
    }
}
