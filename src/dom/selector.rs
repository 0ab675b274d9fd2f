//! CSS selector parsing and matching for [`MemoryDocument`].
//!
//! Covers what rule authors write in practice: type and universal selectors,
//! `#id`, `.class`, attribute selectors (`[a]`, `=`, `~=`, `|=`, `^=`, `$=`,
//! `*=`, with an optional `i` flag), descendant and child combinators, and
//! comma-separated lists. Anything else, including pseudo-classes and sibling
//! combinators, is rejected with [`QuickSpaceError::Selector`].
//!
//! [`MemoryDocument`]: crate::dom::memory::MemoryDocument

use crate::errors::{QuickSpaceError, QuickSpaceResult};

/// Read access to one element while matching.
pub(crate) trait ElementView: Sized {
    fn tag(&self) -> &str;
    fn attr(&self, name: &str) -> Option<&str>;
    fn parent(&self) -> Option<Self>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

#[derive(Debug, Clone, PartialEq)]
struct ComplexSelector {
    /// Left to right. `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
}

#[derive(Debug, Clone, PartialEq)]
struct AttrSelector {
    name: String,
    test: Option<AttrTest>,
}

#[derive(Debug, Clone, PartialEq)]
struct AttrTest {
    op: AttrOp,
    value: String,
    case_insensitive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

impl SelectorList {
    pub fn parse(input: &str) -> QuickSpaceResult<Self> {
        Parser::new(input).parse_list()
    }

    pub(crate) fn matches<E: ElementView>(&self, element: &E) -> bool {
        self.selectors.iter().any(|s| s.matches(element))
    }
}

impl ComplexSelector {
    fn matches<E: ElementView>(&self, element: &E) -> bool {
        self.matches_at(self.compounds.len() - 1, element)
    }

    fn matches_at<E: ElementView>(&self, idx: usize, element: &E) -> bool {
        if !self.compounds[idx].matches(element) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => element
                .parent()
                .is_some_and(|parent| self.matches_at(idx - 1, &parent)),
            Combinator::Descendant => {
                let mut current = element.parent();
                while let Some(ancestor) = current {
                    if self.matches_at(idx - 1, &ancestor) {
                        return true;
                    }
                    current = ancestor.parent();
                }
                false
            }
        }
    }
}

impl Compound {
    fn matches<E: ElementView>(&self, element: &E) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if !self.ids.is_empty() {
            let Some(id) = element.attr("id") else {
                return false;
            };
            if self.ids.iter().any(|wanted| wanted != id) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let present: Vec<&str> = element
                .attr("class")
                .unwrap_or("")
                .split_ascii_whitespace()
                .collect();
            if !self.classes.iter().all(|wanted| present.contains(&wanted.as_str())) {
                return false;
            }
        }
        self.attrs.iter().all(|attr| attr.matches(element))
    }
}

impl AttrSelector {
    fn matches<E: ElementView>(&self, element: &E) -> bool {
        let Some(actual) = element.attr(&self.name) else {
            return false;
        };
        let Some(test) = &self.test else {
            return true;
        };
        let (actual, wanted) = if test.case_insensitive {
            (actual.to_lowercase(), test.value.to_lowercase())
        } else {
            (actual.to_string(), test.value.clone())
        };
        match test.op {
            AttrOp::Equals => actual == wanted,
            AttrOp::Includes => {
                !wanted.is_empty() && actual.split_ascii_whitespace().any(|w| w == wanted)
            }
            AttrOp::DashMatch => {
                actual == wanted
                    || actual
                        .strip_prefix(wanted.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            AttrOp::Prefix => !wanted.is_empty() && actual.starts_with(&wanted),
            AttrOp::Suffix => !wanted.is_empty() && actual.ends_with(&wanted),
            AttrOp::Substring => !wanted.is_empty() && actual.contains(&wanted),
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> QuickSpaceError {
        QuickSpaceError::selector(self.input, reason)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Returns whether any whitespace was consumed.
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn unexpected(&self) -> QuickSpaceError {
        match self.peek() {
            Some(c) => self.error(format!("unexpected '{c}' at offset {}", self.pos)),
            None => self.error("unexpected end of selector"),
        }
    }

    fn parse_list(mut self) -> QuickSpaceResult<SelectorList> {
        let mut selectors = Vec::new();
        loop {
            self.skip_ws();
            selectors.push(self.parse_complex()?);
            self.skip_ws();
            match self.peek() {
                None => break,
                Some(',') => {
                    self.pos += 1;
                }
                Some(_) => return Err(self.unexpected()),
            }
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> QuickSpaceResult<ComplexSelector> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    combinators.push(Combinator::Child);
                }
                Some(c @ ('+' | '~')) => {
                    return Err(self.error(format!("sibling combinator '{c}' is not supported")))
                }
                Some(_) if had_ws => combinators.push(Combinator::Descendant),
                Some(_) => return Err(self.unexpected()),
            }
            compounds.push(self.parse_compound()?);
        }
        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> QuickSpaceResult<Compound> {
        let mut compound = Compound::default();
        let mut any = false;

        match self.peek() {
            Some('*') => {
                self.pos += 1;
                any = true;
            }
            Some(c) if is_ident_start(c) => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
                any = true;
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    let id = self.ident()?;
                    compound.ids.push(id);
                }
                Some('.') => {
                    self.pos += 1;
                    let class = self.ident()?;
                    compound.classes.push(class);
                }
                Some('[') => {
                    self.pos += 1;
                    let attr = self.parse_attr()?;
                    compound.attrs.push(attr);
                }
                Some(':') => return Err(self.error("pseudo-classes are not supported")),
                _ => break,
            }
            any = true;
        }

        if any {
            Ok(compound)
        } else {
            Err(self.unexpected())
        }
    }

    fn parse_attr(&mut self) -> QuickSpaceResult<AttrSelector> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();

        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttrSelector { name, test: None });
            }
            Some('=') => {
                self.pos += 1;
                AttrOp::Equals
            }
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                self.pos += 1;
                if self.bump() != Some('=') {
                    return Err(self.error(format!("expected '=' after '{c}'")));
                }
                match c {
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Substring,
                }
            }
            _ => return Err(self.unexpected()),
        };

        self.skip_ws();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                self.quoted(quote)?
            }
            _ => self.ident()?,
        };
        self.skip_ws();

        let mut case_insensitive = false;
        if let Some(flag @ ('i' | 'I' | 's' | 'S')) = self.peek() {
            self.pos += 1;
            case_insensitive = flag.eq_ignore_ascii_case(&'i');
            self.skip_ws();
        }

        if self.bump() != Some(']') {
            return Err(self.error("unterminated attribute selector"));
        }
        Ok(AttrSelector {
            name,
            test: Some(AttrTest {
                op,
                value,
                case_insensitive,
            }),
        })
    }

    fn quoted(&mut self, quote: char) -> QuickSpaceResult<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some(escaped) => out.push(escaped),
                    None => return Err(self.error("unterminated string")),
                },
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn ident(&mut self) -> QuickSpaceResult<String> {
        let start = self.pos;
        match self.peek() {
            Some(c) if is_ident_start(c) => self.pos += 1,
            _ => return Err(self.error(format!("expected identifier at offset {start}"))),
        }
        if self.chars[start] == '-' && !self.peek().is_some_and(|c| is_ident_start(c) && c != '-') {
            return Err(self.error(format!("expected identifier at offset {start}")));
        }
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A flat chain of elements: index 0 is the root, each next one its child.
    struct Chain {
        nodes: Vec<(&'static str, Vec<(&'static str, &'static str)>)>,
    }

    #[derive(Clone, Copy)]
    struct View<'a> {
        chain: &'a Chain,
        idx: usize,
    }

    impl ElementView for View<'_> {
        fn tag(&self) -> &str {
            self.chain.nodes[self.idx].0
        }

        fn attr(&self, name: &str) -> Option<&str> {
            self.chain.nodes[self.idx]
                .1
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| *v)
        }

        fn parent(&self) -> Option<Self> {
            self.idx.checked_sub(1).map(|idx| View {
                chain: self.chain,
                idx,
            })
        }
    }

    fn chain() -> Chain {
        Chain {
            nodes: vec![
                ("html", vec![]),
                ("body", vec![("class", "page dark")]),
                ("form", vec![("id", "checkout"), ("data-step", "pay-now")]),
                (
                    "button",
                    vec![("class", "btn continue-btn"), ("lang", "en-US")],
                ),
            ],
        }
    }

    fn leaf(chain: &Chain) -> View<'_> {
        View {
            chain,
            idx: chain.nodes.len() - 1,
        }
    }

    fn matches(selector: &str) -> bool {
        let chain = chain();
        SelectorList::parse(selector).unwrap().matches(&leaf(&chain))
    }

    #[test]
    fn simple_and_compound_selectors() {
        assert!(matches("button"));
        assert!(matches("BUTTON"));
        assert!(matches("*"));
        assert!(matches("button.continue-btn"));
        assert!(matches(".btn.continue-btn"));
        assert!(!matches("button.primary"));
        assert!(!matches("a"));
    }

    #[test]
    fn combinators() {
        assert!(matches("#checkout button"));
        assert!(matches("form > button"));
        assert!(matches("body.dark form > .btn"));
        assert!(!matches("body > button"));
        assert!(matches("html button"));
    }

    #[test]
    fn attribute_operators() {
        assert!(matches("[lang]"));
        assert!(matches("[lang=en-US]"));
        assert!(matches("[lang|='en']"));
        assert!(matches("[class~=btn]"));
        assert!(matches("[class^=\"btn \"]"));
        assert!(matches("[class$=-btn]"));
        assert!(matches("[class*=continue]"));
        assert!(matches("[lang=EN-us i]"));
        assert!(!matches("[lang=EN-us]"));
        assert!(!matches("[class*='']"));
        assert!(matches("form[data-step^=pay] button"));
    }

    #[test]
    fn selector_lists_match_any_branch() {
        assert!(matches("a.missing, button.btn"));
        assert!(!matches("a, #nope"));
    }

    #[test]
    fn malformed_selectors_are_rejected() {
        for bad in [
            "", "##x", "#123", "button[", "[=x]", "a >", "> a", "a,", "a + b", "a:hover",
            "[x='y]", ".", "a)",
        ] {
            let err = SelectorList::parse(bad).unwrap_err();
            assert!(
                matches!(err, QuickSpaceError::Selector { .. }),
                "{bad:?} should be rejected"
            );
        }
    }
}
