use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Default value functions for serde
fn default_true() -> bool {
    true
}

// ===== RULE KINDS =====

/// The closed set of rule modes the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    TagExists,
    HasNoAttr,
    HasNoAttrWithValue,
    TagNumberGreaterThan,
    ConstrainContext,
}

impl RuleKind {
    pub const ALL: [RuleKind; 5] = [
        RuleKind::TagExists,
        RuleKind::HasNoAttr,
        RuleKind::HasNoAttrWithValue,
        RuleKind::TagNumberGreaterThan,
        RuleKind::ConstrainContext,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::TagExists => "TagExists",
            RuleKind::HasNoAttr => "HasNoAttr",
            RuleKind::HasNoAttrWithValue => "HasNoAttrWithValue",
            RuleKind::TagNumberGreaterThan => "TagNumberGreaterThan",
            RuleKind::ConstrainContext => "ConstrainContext",
        }
    }

    /// One-line description used by `--show-rules`
    pub fn describe(&self) -> &'static str {
        match self {
            RuleKind::TagExists => "Report whether <tag> appears at all (tag)",
            RuleKind::HasNoAttr => "Count <tag> elements missing an attribute (tag, attribute)",
            RuleKind::HasNoAttrWithValue => {
                "Count <tag> elements without attribute=\"value\" (tag, attribute, value)"
            }
            RuleKind::TagNumberGreaterThan => {
                "Compare the number of <tag> elements to a limit (tag, limit)"
            }
            RuleKind::ConstrainContext => {
                "Run nested rules against the inner content of the first <tag> (tag, rules)"
            }
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized rule mode. Carries the offending name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRuleKind(pub String);

impl fmt::Display for UnknownRuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown rule mode '{}'", self.0)
    }
}

impl std::error::Error for UnknownRuleKind {}

impl FromStr for RuleKind {
    type Err = UnknownRuleKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownRuleKind(s.to_string()))
    }
}

// ===== RULE DECLARATIONS =====

/// A user-declared rule as it appears in a config file.
///
/// `mode` stays a plain string so that configs written for newer versions
/// (with modes this build does not know) still load; the engine decides what
/// to do with unknown modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDeclaration {
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Nested rules, only meaningful for `ConstrainContext`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleDeclaration>,
    /// Disabled rules are skipped and produce no finding
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl RuleDeclaration {
    pub fn new(mode: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            tag: None,
            attribute: None,
            value: None,
            limit: None,
            rules: Vec::new(),
            enabled: true,
        }
    }

    pub fn tag_exists(tag: &str) -> Self {
        Self::new(RuleKind::TagExists.as_str()).with_tag(tag)
    }

    pub fn has_no_attr(tag: &str, attribute: &str) -> Self {
        Self::new(RuleKind::HasNoAttr.as_str())
            .with_tag(tag)
            .with_attribute(attribute)
    }

    pub fn has_no_attr_with_value(tag: &str, attribute: &str, value: &str) -> Self {
        Self::new(RuleKind::HasNoAttrWithValue.as_str())
            .with_tag(tag)
            .with_attribute(attribute)
            .with_value(value)
    }

    pub fn tag_number_greater_than(tag: &str, limit: usize) -> Self {
        Self::new(RuleKind::TagNumberGreaterThan.as_str())
            .with_tag(tag)
            .with_limit(limit)
    }

    pub fn constrain_context(tag: &str, rules: Vec<RuleDeclaration>) -> Self {
        Self::new(RuleKind::ConstrainContext.as_str())
            .with_tag(tag)
            .with_rules(rules)
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    pub fn with_attribute(mut self, attribute: &str) -> Self {
        self.attribute = Some(attribute.to_string());
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_rules(mut self, rules: Vec<RuleDeclaration>) -> Self {
        self.rules = rules;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Resolved rule kind, or `None` for a mode this build does not know
    pub fn kind(&self) -> Option<RuleKind> {
        self.mode.parse().ok()
    }

    /// Number of declarations in this subtree, including itself
    pub fn count(&self) -> usize {
        1 + self.rules.iter().map(RuleDeclaration::count).sum::<usize>()
    }
}

// ===== REPORTS =====

/// How findings are rendered before they reach the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Findings joined by the configured line separator
    #[default]
    Text,
    /// Pretty-printed `AuditReport`
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}' (expected text or json)")),
        }
    }
}

/// Serialization-ready audit output for the `json` format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    /// Human-readable description of where the document came from
    pub source: String,
    /// Number of rule declarations in the config, nested ones included
    pub rule_count: usize,
    pub findings: Vec<String>,
}

impl AuditReport {
    pub fn new(source: String, rule_count: usize, findings: Vec<String>) -> Self {
        Self {
            generated_at: Utc::now(),
            source,
            rule_count,
            findings,
        }
    }
}

/// Number of declarations in a rule list, nested ones included
pub fn count_rules(rules: &[RuleDeclaration]) -> usize {
    rules.iter().map(RuleDeclaration::count).sum()
}
