use crate::config::{validate_rules, AuditConfig, EngineOptions};
use crate::error::{AuditError, Result};
use crate::normalize::normalize;
use crate::rules::{RuleEngine, TraceConfig};
use crate::sink::{self, Sink};
use crate::source::Source;
use crate::types::{count_rules, RuleDeclaration};
use std::time::{Duration, Instant};

/// Simple profiler that collects timings for audit steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        println!("⏱️  {}: {:.3}ms", step_name, elapsed.as_secs_f64() * 1000.0);

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn print_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        println!("\n📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();

        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            println!(
                "   {:.<35} {:.3}ms ({:.1}%)",
                step,
                duration.as_secs_f64() * 1000.0,
                percentage
            );
        }
        println!("   {:.<35} {:.3}ms", "Total", total.as_secs_f64() * 1000.0);
    }
}

/// Audit the given text directly: normalize, then evaluate. No I/O.
pub fn audit_str(
    text: &str,
    rules: &[RuleDeclaration],
    options: EngineOptions,
) -> Result<Vec<String>> {
    validate_rules(rules, &options)?;
    RuleEngine::new(options).evaluate(&normalize(text), rules)
}

/// Reads one document, evaluates the configured rules, and delivers the
/// findings. Input and output are resolved and checked up front, so a bad
/// setup fails in `new` before anything is read.
#[derive(Debug)]
pub struct Auditor {
    config: AuditConfig,
    source: Source,
    sink: Sink,
    rule_engine: RuleEngine,
}

impl Auditor {
    /// Explicit ends take precedence over `config.input` / `config.output`.
    pub fn new(config: AuditConfig, source: Option<Source>, sink: Option<Sink>) -> Result<Self> {
        let source = match source {
            Some(source) => source,
            None => match config.input.as_deref() {
                Some(spec) => Source::from_spec(spec)?,
                None => return Err(AuditError::config("Input source is not specified")),
            },
        };

        let sink = match sink {
            Some(sink) => sink,
            None => match config.output.as_deref() {
                Some(spec) => Sink::from_spec(spec)?,
                None => return Err(AuditError::config("Output destination is not specified")),
            },
        };

        config.validate()?;

        Ok(Self {
            rule_engine: RuleEngine::new(config.engine),
            config,
            source,
            sink,
        })
    }

    /// Build from config alone, resolving both ends from its strings
    pub fn from_config(config: AuditConfig) -> Result<Self> {
        Self::new(config, None, None)
    }

    pub fn set_trace_config(&mut self, trace: TraceConfig) {
        self.rule_engine.set_trace_config(trace);
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    /// Raw document text, before normalization
    pub fn read(&mut self) -> Result<String> {
        self.source.read()
    }

    /// Read, normalize and evaluate; returns the findings without delivering them
    pub fn detect(&mut self) -> Result<Vec<String>> {
        self.detect_with_profiler(&mut StepProfiler::new(false))
    }

    /// Full audit: detect, then deliver to the sink. Returns the findings.
    pub fn run(&mut self) -> Result<Vec<String>> {
        self.run_with_profiler(&mut StepProfiler::new(false))
    }

    pub fn run_with_profiler(&mut self, profiler: &mut StepProfiler) -> Result<Vec<String>> {
        let findings = self.detect_with_profiler(profiler)?;

        let message = sink::render(
            &findings,
            self.config.output_format,
            &self.config.line_separator,
            &self.source.describe(),
            count_rules(&self.config.rules),
        )?;
        profiler.time_step("4. Write", || self.sink.deliver(&message))?;

        Ok(findings)
    }

    fn detect_with_profiler(&mut self, profiler: &mut StepProfiler) -> Result<Vec<String>> {
        let raw = profiler.time_step("1. Read", || self.source.read())?;
        let context = profiler.time_step("2. Normalize", || normalize(&raw));
        profiler.time_step("3. Evaluate", || {
            self.rule_engine.evaluate(&context, &self.config.rules)
        })
    }
}
