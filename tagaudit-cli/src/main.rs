use anyhow::{Context, Result};
use clap::Parser;

// Import from tagaudit-core
use tagaudit_core::{
    AuditConfig, Auditor, EngineOptions, OutputFormat, RuleKind, Sink, Source, StepProfiler,
    TraceConfig,
};

#[derive(Parser)]
#[command(name = "tagaudit")]
#[command(about = "Audit an HTML document against declarative tag and attribute rules")]
struct Args {
    /// Path to the HTML file to audit, or `-` for stdin
    #[arg(short, long)]
    input: Option<String>,

    /// Path to the rules config file (YAML, or JSON with a .json extension)
    #[arg(short, long)]
    config: Option<String>,

    /// Output file path, or `-` / `console` for stdout (default: console)
    #[arg(short, long)]
    output: Option<String>,

    /// Output format: text or json
    #[arg(short = 'f', long)]
    output_format: Option<String>,

    /// Fail on unknown rule modes and on constraint tags that are not found
    #[arg(long)]
    strict: bool,

    /// Print each rule as it is evaluated
    #[arg(long)]
    trace: bool,

    /// Enable timing of each audit step
    #[arg(long)]
    profile: bool,

    /// Show the supported rule modes and exit
    #[arg(long)]
    show_rules: bool,

    /// Suppress status lines
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.show_rules {
        show_rules();
        return Ok(());
    }

    if let Err(e) = run(&args) {
        eprintln!("❌ Audit failed: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let status = |line: String| {
        if !args.quiet {
            eprintln!("{line}");
        }
    };

    status("🦀 tagaudit HTML auditor".to_string());

    // An explicitly named config that fails to load is fatal
    let mut config = match &args.config {
        Some(path) => {
            let config = AuditConfig::load_from_file(path)
                .with_context(|| format!("loading config from {path}"))?;
            status(format!("📋 Loaded config from: {path}"));
            config
        }
        None => {
            status("📋 No config given, no rules to evaluate".to_string());
            AuditConfig::default()
        }
    };

    // Apply CLI overrides to config
    if let Some(format) = &args.output_format {
        config.output_format = format
            .parse::<OutputFormat>()
            .map_err(anyhow::Error::msg)?;
    }
    if args.strict {
        config.engine = EngineOptions::strict();
    }

    let source = match args.input.as_deref().or(config.input.as_deref()) {
        Some(spec) => Source::from_spec(spec)?,
        None => anyhow::bail!("Input source is not specified (use --input or `input:` in the config)"),
    };
    let sink = match args.output.as_deref().or(config.output.as_deref()) {
        Some(spec) => Sink::from_spec(spec)?,
        None => Sink::Console,
    };

    status(format!("📄 Auditing: {}", source.describe()));

    let mut auditor = Auditor::new(config, Some(source), Some(sink))?;
    auditor.set_trace_config(TraceConfig::new(args.trace));

    let mut profiler = StepProfiler::new(args.profile);
    let findings = auditor.run_with_profiler(&mut profiler)?;
    profiler.print_summary();

    status(format!("✅ {} findings", findings.len()));
    if !auditor.sink().is_console() {
        status(format!("💾 Results saved to: {}", auditor.sink().describe()));
    }

    Ok(())
}

fn show_rules() {
    println!("\n📋 Supported rule modes:");
    for kind in RuleKind::ALL {
        println!("  {:<22} {}", kind.as_str(), kind.describe());
    }

    println!("\n📄 Output Formats:");
    println!("  text  - One finding per line, joined by the config's line_separator (default CRLF)");
    println!("  json  - Report with timestamp, source, rule count and findings");

    println!("\n📝 Example config (rules.yaml):");
    println!("  rules:");
    println!("    - mode: TagExists");
    println!("      tag: title");
    println!("    - mode: ConstrainContext");
    println!("      tag: head");
    println!("      rules:");
    println!("        - mode: TagNumberGreaterThan");
    println!("          tag: meta");
    println!("          limit: 3");

    println!("\n📝 Usage Examples:");
    println!("  tagaudit -i index.html -c rules.yaml");
    println!("  tagaudit -i index.html -c rules.yaml -o report.txt");
    println!("  cat index.html | tagaudit -i - -c rules.yaml -f json --strict");
}
