use serde::{Deserialize, Serialize};

/// Resolved `display` value. Only `none` and `contents` affect matching; the
/// remaining variants exist so callers can round-trip what the host reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    Block,
    Inline,
    InlineBlock,
    Flex,
    Grid,
    Contents,
    None,
    Other,
}

impl Display {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "block" => Self::Block,
            "inline" => Self::Inline,
            "inline-block" => Self::InlineBlock,
            "flex" | "inline-flex" => Self::Flex,
            "grid" | "inline-grid" => Self::Grid,
            "contents" => Self::Contents,
            "none" => Self::None,
            _ => Self::Other,
        }
    }

    /// User-agent default for a tag when no style sets one.
    pub fn default_for_tag(tag: &str) -> Self {
        match tag {
            "a" | "span" | "b" | "i" | "em" | "strong" | "img" | "label" | "code" | "small" => {
                Self::Inline
            }
            "button" | "input" | "select" | "textarea" => Self::InlineBlock,
            _ => Self::Block,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

impl Visibility {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "hidden" => Self::Hidden,
            "collapse" => Self::Collapse,
            _ => Self::Visible,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cursor {
    #[default]
    Auto,
    Default,
    Pointer,
    Text,
    Other,
}

impl Cursor {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Self::Auto,
            "default" => Self::Default,
            "pointer" => Self::Pointer,
            "text" => Self::Text,
            _ => Self::Other,
        }
    }
}

/// The subset of the resolved style the oracles consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
    pub cursor: Cursor,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            visibility: Visibility::Visible,
            cursor: Cursor::Auto,
        }
    }
}

/// Rendered box in CSS pixels (`offsetWidth` / `offsetHeight`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementSize {
    pub width: f64,
    pub height: f64,
}

impl ElementSize {
    pub const ZERO: ElementSize = ElementSize {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// One batch of structural changes reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MutationRecord {
    /// Element subtrees inserted into the document.
    pub added_subtrees: usize,
    /// Elements inside those subtrees, roots included.
    pub added_elements: usize,
}
