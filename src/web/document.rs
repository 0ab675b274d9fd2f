use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement, NodeList, Window};

use crate::dom::traits::Document;
use crate::dom::types::{ComputedStyle, Cursor, Display, ElementSize, Visibility};
use crate::errors::{QuickSpaceError, QuickSpaceResult};

/// The document of the frame this module runs in.
pub struct WebDocument {
    window: Window,
    document: web_sys::Document,
}

impl WebDocument {
    pub fn current() -> QuickSpaceResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| QuickSpaceError::Document("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| QuickSpaceError::Document("window has no document".into()))?;
        Ok(Self { window, document })
    }

    pub fn raw(&self) -> &web_sys::Document {
        &self.document
    }
}

pub(crate) fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl Document for WebDocument {
    type Element = Element;

    fn all_elements(&self, scope: Option<&Element>) -> Vec<Element> {
        let result = match scope {
            Some(scope) => scope.query_selector_all("*"),
            None => self.document.query_selector_all("*"),
        };
        match result {
            Ok(list) => elements(list),
            Err(e) => {
                tracing::warn!(error = %js_message(&e), "element scan failed");
                Vec::new()
            }
        }
    }

    fn query_selector_all(&self, selector: &str) -> QuickSpaceResult<Vec<Element>> {
        self.document
            .query_selector_all(selector)
            .map(elements)
            .map_err(|e| QuickSpaceError::selector(selector, js_message(&e)))
    }

    fn tag_name(&self, element: &Element) -> String {
        element.tag_name().to_ascii_lowercase()
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn has_attribute(&self, element: &Element, name: &str) -> bool {
        element.has_attribute(name)
    }

    fn parent(&self, element: &Element) -> Option<Element> {
        element.parent_element()
    }

    fn text_content(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn computed_style(&self, element: &Element) -> Option<ComputedStyle> {
        if !element.is_connected() {
            return None;
        }
        let style = self.window.get_computed_style(element).ok().flatten()?;
        let property = |name: &str| style.get_property_value(name).unwrap_or_default();
        Some(ComputedStyle {
            display: Display::parse(&property("display")),
            visibility: Visibility::parse(&property("visibility")),
            cursor: Cursor::parse(&property("cursor")),
        })
    }

    /// `offsetWidth` / `offsetHeight`. Non-HTML elements such as SVG have no
    /// offset box and report zero.
    fn rendered_size(&self, element: &Element) -> ElementSize {
        match element.dyn_ref::<HtmlElement>() {
            Some(html) => ElementSize::new(html.offset_width() as f64, html.offset_height() as f64),
            None => ElementSize::ZERO,
        }
    }

    fn is_content_editable(&self, element: &Element) -> bool {
        element
            .dyn_ref::<HtmlElement>()
            .is_some_and(HtmlElement::is_content_editable)
    }

    fn activate(&self, element: &Element) {
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            html.click();
            return;
        }
        let init = web_sys::EventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        match web_sys::Event::new_with_event_init_dict("click", &init) {
            Ok(event) => {
                if let Err(e) = element.dispatch_event(&event) {
                    tracing::warn!(error = %js_message(&e), "synthetic click failed");
                }
            }
            Err(e) => tracing::warn!(error = %js_message(&e), "could not build click event"),
        }
    }

    fn location(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }
}
