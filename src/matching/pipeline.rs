use serde::Serialize;

use crate::dom::traits::Document;
use crate::matching::evaluator::evaluate;
use crate::rules::types::RuleList;

/// Result of one pass over a rule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PipelineOutcome {
    /// Rules evaluated before the pass stopped.
    pub evaluated: usize,
    /// Index of the rule whose evaluation activated an element.
    pub activated_rule: Option<usize>,
}

impl PipelineOutcome {
    pub fn activated(&self) -> bool {
        self.activated_rule.is_some()
    }
}

/// Evaluates rules in order and stops at the first one that activates something.
pub fn run<D: Document>(doc: &D, rules: &RuleList) -> PipelineOutcome {
    let mut outcome = PipelineOutcome::default();
    for (index, rule) in rules.iter().enumerate() {
        outcome.evaluated += 1;
        if evaluate(doc, rule) {
            outcome.activated_rule = Some(index);
            break;
        }
    }
    outcome
}
