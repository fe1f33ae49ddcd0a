use crate::error::{AuditError, Result};
use crate::types::{OutputFormat, RuleDeclaration, RuleKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// Default value functions for serde
fn default_line_separator() -> String {
    "\r\n".to_string()
}

/// What the engine does with a rule whose `mode` it does not recognize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownRulePolicy {
    /// Skip the rule silently; keeps configs written for newer versions usable
    #[default]
    Skip,
    /// Abort with `AuditError::MalformedRule`
    Fail,
}

/// What a ConstrainContext rule does when its tag is not in the context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingContextPolicy {
    /// Nested rules are evaluated against an empty document
    #[default]
    Empty,
    /// Abort with `AuditError::ConstraintNotSatisfied`
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineOptions {
    #[serde(default)]
    pub on_unknown_rule: UnknownRulePolicy,
    #[serde(default)]
    pub on_missing_context: MissingContextPolicy,
}

impl EngineOptions {
    /// Both policies set to fail
    pub fn strict() -> Self {
        Self {
            on_unknown_rule: UnknownRulePolicy::Fail,
            on_missing_context: MissingContextPolicy::Fail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Input document: a file path, or `-` for stdin
    #[serde(default)]
    pub input: Option<String>,
    /// Destination: a file path, or `-` / `console` for stdout
    #[serde(default)]
    pub output: Option<String>,
    /// Separator placed between findings in the text output
    #[serde(default = "default_line_separator")]
    pub line_separator: String,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub engine: EngineOptions,
    /// Rules evaluated in order against the whole document
    #[serde(default)]
    pub rules: Vec<RuleDeclaration>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            line_separator: default_line_separator(),
            output_format: OutputFormat::default(),
            engine: EngineOptions::default(),
            rules: Vec::new(),
        }
    }
}

impl AuditConfig {
    pub fn with_rules(rules: Vec<RuleDeclaration>) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Load config from a YAML file, or JSON when the extension is `.json`
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| AuditError::config(format!("cannot read config {path}: {e}")))?;

        let is_json = Path::new(path)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config: AuditConfig = if is_json {
            serde_json::from_str(&content)
                .map_err(|e| AuditError::config(format!("invalid JSON config {path}: {e}")))?
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| AuditError::config(format!("invalid YAML config {path}: {e}")))?
        };
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                eprintln!("⚠️  Failed to load config from {p} ({e}), using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Check the whole rule tree before anything is evaluated.
    ///
    /// Missing parameters are always an error. Unknown modes are an error
    /// only under `UnknownRulePolicy::Fail`.
    pub fn validate(&self) -> Result<()> {
        validate_rules(&self.rules, &self.engine)
    }
}

pub fn validate_rules(rules: &[RuleDeclaration], options: &EngineOptions) -> Result<()> {
    for rule in rules {
        validate_rule(rule, options)?;
    }
    Ok(())
}

fn validate_rule(rule: &RuleDeclaration, options: &EngineOptions) -> Result<()> {
    if !rule.enabled {
        return Ok(());
    }
    let Some(kind) = rule.kind() else {
        return match options.on_unknown_rule {
            UnknownRulePolicy::Skip => Ok(()),
            UnknownRulePolicy::Fail => Err(AuditError::malformed(&rule.mode, "unknown rule mode")),
        };
    };

    require(rule, "tag", rule.tag.is_some())?;
    match kind {
        RuleKind::TagExists => {}
        RuleKind::HasNoAttr => require(rule, "attribute", rule.attribute.is_some())?,
        RuleKind::HasNoAttrWithValue => {
            require(rule, "attribute", rule.attribute.is_some())?;
            require(rule, "value", rule.value.is_some())?;
        }
        RuleKind::TagNumberGreaterThan => require(rule, "limit", rule.limit.is_some())?,
        RuleKind::ConstrainContext => validate_rules(&rule.rules, options)?,
    }
    Ok(())
}

fn require(rule: &RuleDeclaration, field: &str, present: bool) -> Result<()> {
    if present {
        Ok(())
    } else {
        Err(AuditError::malformed(
            &rule.mode,
            format!("missing required parameter '{field}'"),
        ))
    }
}
