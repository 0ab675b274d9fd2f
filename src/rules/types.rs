use serde::{Deserialize, Serialize};

/// How a rule's value is interpreted.
///
/// Stored as the string `"selector"` or `"text"`. Any other stored kind is kept
/// verbatim in `Unknown` so an editor can round-trip it, and matching skips it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleKind {
    Selector,
    Text,
    Unknown(String),
}

impl RuleKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Selector => "selector",
            Self::Text => "text",
            Self::Unknown(kind) => kind,
        }
    }
}

impl From<String> for RuleKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "selector" => Self::Selector,
            "text" => Self::Text,
            _ => Self::Unknown(kind),
        }
    }
}

impl From<RuleKind> for String {
    fn from(kind: RuleKind) -> Self {
        match kind {
            RuleKind::Unknown(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "type", alias = "kind")]
    pub kind: RuleKind,
    pub value: String,
}

impl Rule {
    pub fn selector(value: impl Into<String>) -> Self {
        Self {
            kind: RuleKind::Selector,
            value: value.into(),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: RuleKind::Text,
            value: value.into(),
        }
    }
}

/// Ordered rules. Position is priority: the first rule that activates wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleList {
    rules: Vec<Rule>,
}

impl RuleList {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Starter rules offered when nothing has been saved yet.
    pub fn defaults() -> Self {
        Self::new(vec![
            Rule::selector("button.continue-btn"),
            Rule::text("Continue"),
        ])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn remove(&mut self, index: usize) -> Option<Rule> {
        (index < self.rules.len()).then(|| self.rules.remove(index))
    }

    /// Drag-and-drop reorder: takes the rule out of `from` and inserts it at `to`.
    ///
    /// Returns false and leaves the list untouched when either index is out of range.
    pub fn move_rule(&mut self, from: usize, to: usize) -> bool {
        if from >= self.rules.len() || to >= self.rules.len() {
            return false;
        }
        let rule = self.rules.remove(from);
        self.rules.insert(to, rule);
        true
    }

    pub fn set_kind(&mut self, index: usize, kind: RuleKind) -> bool {
        match self.rules.get_mut(index) {
            Some(rule) => {
                rule.kind = kind;
                true
            }
            None => false,
        }
    }

    pub fn set_value(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.rules.get_mut(index) {
            Some(rule) => {
                rule.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }
}

impl From<Vec<Rule>> for RuleList {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}

impl FromIterator<Rule> for RuleList {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RuleList {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
