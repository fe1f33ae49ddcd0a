use crate::config::{EngineOptions, MissingContextPolicy, UnknownRulePolicy};
use crate::error::{AuditError, Result};
use crate::types::{RuleDeclaration, RuleKind};

use super::evaluators;

// Trace configuration for following evaluation rule by rule
#[derive(Debug, Clone, Default)]
pub struct TraceConfig {
    pub enabled: bool,
}

impl TraceConfig {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }
}

/// Trace one step of evaluation, indented by nesting depth
fn trace_step(trace: &TraceConfig, depth: usize, rule: &RuleDeclaration, outcome: &str) {
    if !trace.enabled {
        return;
    }

    let tag = rule.tag.as_deref().unwrap_or("-");
    println!(
        "{}🔍 [{}] <{}> {}",
        "   ".repeat(depth),
        rule.mode,
        tag,
        outcome
    );
}

/// Evaluates rule trees against a context.
///
/// Each call to `evaluate` is one scope. Leaf rules append one finding and
/// stay in the scope; a ConstrainContext rule opens a narrower scope for its
/// nested rules, splices their findings in its own place, and the remaining
/// siblings continue against the original context.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    options: EngineOptions,
    trace: TraceConfig,
}

impl RuleEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            trace: TraceConfig::disabled(),
        }
    }

    pub fn set_trace_config(&mut self, trace: TraceConfig) {
        self.trace = trace;
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Findings for `rules` over `context`, in pre-order of the rule tree.
    pub fn evaluate(&self, context: &str, rules: &[RuleDeclaration]) -> Result<Vec<String>> {
        self.evaluate_scope(context, rules, 0)
    }

    fn evaluate_scope(
        &self,
        context: &str,
        rules: &[RuleDeclaration],
        depth: usize,
    ) -> Result<Vec<String>> {
        let mut findings = Vec::new();

        for rule in rules {
            if !rule.enabled {
                trace_step(&self.trace, depth, rule, "⏭️  disabled, skipping");
                continue;
            }

            let Some(kind) = rule.kind() else {
                match self.options.on_unknown_rule {
                    UnknownRulePolicy::Skip => {
                        trace_step(&self.trace, depth, rule, "⚠️  unknown mode, skipping");
                        continue;
                    }
                    UnknownRulePolicy::Fail => {
                        return Err(AuditError::malformed(&rule.mode, "unknown rule mode"));
                    }
                }
            };

            match kind {
                RuleKind::ConstrainContext => {
                    let narrowed = self.narrow(context, rule)?;
                    trace_step(
                        &self.trace,
                        depth,
                        rule,
                        &format!("↘️  {} chars in scope", narrowed.len()),
                    );
                    let nested = self.evaluate_scope(&narrowed, &rule.rules, depth + 1)?;
                    findings.extend(nested);
                }
                leaf => {
                    let finding = apply_leaf_rule(leaf, context, rule)?;
                    trace_step(&self.trace, depth, rule, &finding);
                    findings.push(finding);
                }
            }
        }

        Ok(findings)
    }

    /// Inner content of the constraint tag, resolved through the
    /// missing-context policy when the tag is absent.
    fn narrow(&self, context: &str, rule: &RuleDeclaration) -> Result<String> {
        let tag = required(rule, "tag", rule.tag.as_deref())?;
        match evaluators::constrain_context(context, tag)? {
            Some(inner) => Ok(inner),
            None => match self.options.on_missing_context {
                MissingContextPolicy::Empty => Ok(String::new()),
                MissingContextPolicy::Fail => Err(AuditError::ConstraintNotSatisfied {
                    tag: tag.to_string(),
                }),
            },
        }
    }
}

fn apply_leaf_rule(kind: RuleKind, context: &str, rule: &RuleDeclaration) -> Result<String> {
    let tag = required(rule, "tag", rule.tag.as_deref())?;
    match kind {
        RuleKind::TagExists => evaluators::tag_exists(context, tag),
        RuleKind::HasNoAttr => {
            let attribute = required(rule, "attribute", rule.attribute.as_deref())?;
            evaluators::has_no_attr(context, tag, attribute)
        }
        RuleKind::HasNoAttrWithValue => {
            let attribute = required(rule, "attribute", rule.attribute.as_deref())?;
            let value = required(rule, "value", rule.value.as_deref())?;
            evaluators::has_no_attr_with_value(context, tag, attribute, value)
        }
        RuleKind::TagNumberGreaterThan => {
            let limit = rule
                .limit
                .ok_or_else(|| missing_parameter(rule, "limit"))?;
            evaluators::tag_number_greater_than(context, tag, limit)
        }
        RuleKind::ConstrainContext => Err(AuditError::malformed(
            &rule.mode,
            "constraint rules produce a context, not a finding",
        )),
    }
}

fn required<'r>(rule: &RuleDeclaration, field: &str, value: Option<&'r str>) -> Result<&'r str> {
    value.ok_or_else(|| missing_parameter(rule, field))
}

fn missing_parameter(rule: &RuleDeclaration, field: &str) -> AuditError {
    AuditError::malformed(&rule.mode, format!("missing required parameter '{field}'"))
}
