// tagaudit core library
//
// Evaluates declarative tag/attribute rules against HTML-like text.
// Main interface for auditing a document and delivering its findings.

pub mod auditor;
pub mod config;
pub mod error;
pub mod normalize;
mod patterns;
pub mod rules;
pub mod sink;
pub mod source;
pub mod types;

// Re-export main types and functions for easy use
pub use auditor::{audit_str, Auditor, StepProfiler};
pub use config::{AuditConfig, EngineOptions, MissingContextPolicy, UnknownRulePolicy};
pub use error::{AuditError, Result};
pub use normalize::normalize;
pub use rules::{RuleEngine, TraceConfig};
pub use sink::Sink;
pub use source::Source;
pub use types::*;

/// Evaluate `rules` against an already-normalized context with default options.
pub fn evaluate(context: &str, rules: &[RuleDeclaration]) -> Result<Vec<String>> {
    RuleEngine::default().evaluate(context, rules)
}
