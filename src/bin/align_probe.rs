use std::env;
use std::time::Instant;

use serde::Serialize;
use spn_align::{
    AlignError, AlignerBuilder, AlignmentResult, AlternatingMethod, ExecutionVariant, Marking, PetriNet,
    ProcessModel, TerminationCriterion,
};
use sysinfo::{get_current_pid, ProcessRefreshKind, System};

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("align_probe: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    #[cfg(feature = "tracing")]
    init_tracing();

    eprintln!("\n{}", "=".repeat(80));
    eprintln!("Alignment Probe: scaling and correctness of the search variants");
    eprintln!("{}", "=".repeat(80));
    eprintln!();
    eprintln!("Variants: {}", options.variants.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "));
    eprintln!("Costs are checked against an edit-distance baseline up to trace length {}.", options.verify_limit);
    eprintln!();

    let mut sys = System::new();
    let mut measurements = Vec::new();

    eprintln!("[1/2] Sequential models with dropped and replaced events...");
    measurements.extend(run_sequences(&options, &mut sys));
    eprintln!();

    eprintln!("[2/2] Looping model with a silent redo transition...");
    measurements.extend(run_loops(&options, &mut sys));
    eprintln!();

    print_summary(&measurements, &options);

    if let Err(err) = options.format.write(&measurements) {
        eprintln!("align_probe output error: {err}");
        std::process::exit(1);
    }
}

#[cfg(feature = "tracing")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

struct Options {
    format: OutputFormat,
    verify_limit: usize,
    variants: Vec<ExecutionVariant>,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut format = OutputFormat::Csv;
        let mut verify_limit = 64usize;
        let mut variants: Vec<ExecutionVariant> = Vec::new();

        while let Some(arg) = args.next() {
            let arg = arg.into();
            if arg == "--help" || arg == "-h" {
                Options::print_help();
                std::process::exit(0);
            } else if let Some(value) = arg.strip_prefix("--format=") {
                format = OutputFormat::from_str(value)?;
            } else if arg == "--format" {
                let value = next_value(&mut args, "--format")?;
                format = OutputFormat::from_str(&value)?;
            } else if let Some(value) = arg.strip_prefix("--verify-limit=") {
                verify_limit = parse_limit(value)?;
            } else if arg == "--verify-limit" {
                verify_limit = parse_limit(&next_value(&mut args, "--verify-limit")?)?;
            } else if let Some(value) = arg.strip_prefix("--variant=") {
                variants.push(value.parse::<ExecutionVariant>().map_err(|err| format!("{err}"))?);
            } else if arg == "--variant" {
                let value = next_value(&mut args, "--variant")?;
                variants.push(value.parse::<ExecutionVariant>().map_err(|err| format!("{err}"))?);
            } else {
                return Err(format!("unrecognized argument '{arg}'"));
            }
        }

        if variants.is_empty() {
            variants = default_variants();
        }
        Ok(Self {
            format,
            verify_limit,
            variants,
        })
    }

    fn print_help() {
        println!(
            "\
Usage: cargo run --bin align_probe [-- <options>]

Options:
  --format <csv|table|json>     Output format (default: csv)
  --verify-limit <N>            Longest trace checked against the edit-distance baseline (default: 64)
  --variant <NAME>              Execution variant to run, repeatable (default: a representative set)
  -h, --help                    Print this help message

Examples:
  cargo run --bin align_probe
  cargo run --bin align_probe -- --format table --variant a_star_smaller_open_set_average_function
"
        );
    }
}

fn next_value<I, T>(args: &mut I, flag: &str) -> Result<String, String>
where
    I: Iterator<Item = T>,
    T: Into<String>,
{
    args.next()
        .map(Into::into)
        .ok_or_else(|| format!("missing value after {flag}"))
}

fn parse_limit(value: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| "verify limit must be a positive integer".to_string())
}

fn default_variants() -> Vec<ExecutionVariant> {
    vec![
        ExecutionVariant::dijkstra(),
        ExecutionVariant::a_star(),
        ExecutionVariant::dijkstra().bidirectional(
            AlternatingMethod::StrictlyAlternate,
            TerminationCriterion::SymmetricLowerBounding,
        ),
        ExecutionVariant::a_star().bidirectional(
            AlternatingMethod::LowestGCost,
            TerminationCriterion::AverageFunction,
        ),
    ]
}

#[derive(Copy, Clone)]
enum OutputFormat {
    Csv,
    Table,
    Json,
}

impl OutputFormat {
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "csv" => Ok(Self::Csv),
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}'")),
        }
    }

    fn write(self, measurements: &[Measurement]) -> Result<(), String> {
        match self {
            OutputFormat::Csv => write_csv(measurements),
            OutputFormat::Table => write_table(measurements),
            OutputFormat::Json => write_json(measurements),
        }
    }
}

#[derive(Clone, Serialize)]
struct Measurement {
    scenario: &'static str,
    variant: String,
    size: String,
    cost: Option<u64>,
    expanded: usize,
    wall_s: f64,
    rss_delta_kib: u64,
    status: VerificationStatus,
    detail: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum VerificationStatus {
    NotChecked,
    Passed,
    Failed,
}

impl VerificationStatus {
    fn label(&self) -> &'static str {
        match self {
            VerificationStatus::NotChecked => "not_checked",
            VerificationStatus::Passed => "passed",
            VerificationStatus::Failed => "failed",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            VerificationStatus::Passed => "✓",
            VerificationStatus::Failed => "✗",
            VerificationStatus::NotChecked => "○",
        }
    }
}

fn run_sequences(options: &Options, sys: &mut System) -> Vec<Measurement> {
    const SIZES: &[usize] = &[8, 16, 32, 64, 128];
    let mut out = Vec::new();
    for &len in SIZES {
        let model_labels = deterministic_labels(len);
        let trace = perturbed(&model_labels);
        let model = ProcessModel::sequence(&model_labels);
        let expected = (trace.len() <= options.verify_limit).then(|| edit_cost(&trace, &model_labels));
        for &variant in &options.variants {
            out.push(probe("sequence", variant, format!("len={len}"), sys, expected, || {
                align(variant, &trace, &model)
            }));
        }
    }
    out
}

fn run_loops(options: &Options, sys: &mut System) -> Vec<Measurement> {
    const ROUNDS: &[usize] = &[2, 4, 8, 16];
    let model = match redo_loop_model() {
        Ok(model) => model,
        Err(err) => {
            eprintln!("redo loop model rejected: {err}");
            return Vec::new();
        }
    };
    let mut out = Vec::new();
    for &rounds in ROUNDS {
        let mut trace = Vec::with_capacity(2 * rounds + 1);
        for _ in 0..rounds {
            trace.push("a".to_string());
            trace.push("b".to_string());
        }
        trace.push("c".to_string());
        // every round fits the loop exactly
        let expected = (trace.len() <= options.verify_limit).then_some(0);
        for &variant in &options.variants {
            out.push(probe("redo_loop", variant, format!("rounds={rounds}"), sys, expected, || {
                align(variant, &trace, &model)
            }));
        }
    }
    out
}

fn align(variant: ExecutionVariant, trace: &[String], model: &ProcessModel) -> Option<AlignmentResult> {
    AlignerBuilder::new()
        .with_variant(variant)
        .build()
        .align(trace, model)
        .ok()
}

fn probe<F>(
    scenario: &'static str,
    variant: ExecutionVariant,
    size: String,
    sys: &mut System,
    expected: Option<u64>,
    compute: F,
) -> Measurement
where
    F: FnOnce() -> Option<AlignmentResult>,
{
    eprint!("      {variant} {size}... ");
    let before = rss_kib(sys);
    let start = Instant::now();
    let result = compute();
    let duration = start.elapsed();
    let after = rss_kib(sys);

    let cost = result.as_ref().map(|r| r.cost);
    let (status, detail) = match (result.as_ref(), expected) {
        (None, _) => (VerificationStatus::Failed, Some("no alignment found".to_string())),
        (Some(_), None) => (VerificationStatus::NotChecked, None),
        (Some(r), Some(baseline)) if r.cost == baseline => (VerificationStatus::Passed, None),
        (Some(r), Some(baseline)) => (
            VerificationStatus::Failed,
            Some(format!("expected {baseline}, got {}", r.cost)),
        ),
    };
    let m = Measurement {
        scenario,
        variant: variant.to_string(),
        size,
        cost,
        expanded: result.as_ref().map_or(0, |r| r.stats.expanded),
        wall_s: duration.as_secs_f64(),
        rss_delta_kib: after.saturating_sub(before),
        status,
        detail,
    };
    eprintln!(
        "{} cost={}, expanded={}, time={:.3}s, status={}",
        m.status.icon(),
        cost.map_or_else(|| "-".to_string(), |c| c.to_string()),
        m.expanded,
        m.wall_s,
        m.status.label()
    );
    m
}

fn print_summary(measurements: &[Measurement], options: &Options) {
    eprintln!("\n{}", "=".repeat(80));
    eprintln!("Probe Summary");
    eprintln!("{}", "=".repeat(80));

    let count = |status: VerificationStatus| measurements.iter().filter(|m| m.status == status).count();
    let passed = count(VerificationStatus::Passed);
    let failed = count(VerificationStatus::Failed);
    let not_checked = count(VerificationStatus::NotChecked);
    let total = measurements.len().max(1) as f64;
    eprintln!("  ✓ Passed: {} ({:.1}%)", passed, 100.0 * passed as f64 / total);
    eprintln!("  ✗ Failed: {} ({:.1}%)", failed, 100.0 * failed as f64 / total);
    eprintln!(
        "  ○ Not checked (trace longer than {}): {}",
        options.verify_limit, not_checked
    );

    for m in measurements.iter().filter(|m| m.status == VerificationStatus::Failed) {
        eprintln!("  ✗ {} {} ({})", m.scenario, m.variant, m.size);
        if let Some(detail) = &m.detail {
            eprintln!("     Error: {detail}");
        }
    }

    eprintln!();
    eprintln!("Expansions by variant:");
    for variant in &options.variants {
        let name = variant.to_string();
        let expanded: usize = measurements
            .iter()
            .filter(|m| m.variant == name)
            .map(|m| m.expanded)
            .sum();
        let wall: f64 = measurements
            .iter()
            .filter(|m| m.variant == name)
            .map(|m| m.wall_s)
            .sum();
        eprintln!("  {name}: expanded={expanded}, wall={wall:.3}s");
    }
    eprintln!("{}", "=".repeat(80));
    eprintln!();
}

fn write_csv(measurements: &[Measurement]) -> Result<(), String> {
    println!("scenario,variant,size,cost,expanded,wall_s,rss_delta_kib,status,detail");
    for m in measurements {
        let detail = m.detail.as_ref().map(|s| s.replace('"', "'")).unwrap_or_default();
        println!(
            "{},{},{},{},{},{:.3},{},{},\"{}\"",
            m.scenario,
            m.variant,
            m.size,
            m.cost.map(|c| c.to_string()).unwrap_or_default(),
            m.expanded,
            m.wall_s,
            m.rss_delta_kib,
            m.status.label(),
            detail
        );
    }
    Ok(())
}

fn write_table(measurements: &[Measurement]) -> Result<(), String> {
    let col1 = measurements.iter().map(|m| m.scenario.len()).fold("scenario".len(), usize::max);
    let col2 = measurements.iter().map(|m| m.variant.len()).fold("variant".len(), usize::max);
    let col3 = measurements.iter().map(|m| m.size.len()).fold("size".len(), usize::max);

    println!(
        "{:<col1$}  {:<col2$}  {:<col3$}  {:>8}  {:>10}  {:>10}  {:>14}  {:>12}  detail",
        "scenario", "variant", "size", "cost", "expanded", "wall_s", "rss_delta_kib", "status"
    );
    println!(
        "{:-<col1$}  {:-<col2$}  {:-<col3$}  {:-<8}  {:-<10}  {:-<10}  {:-<14}  {:-<12}  {:-<6}",
        "", "", "", "", "", "", "", "", ""
    );
    for m in measurements {
        println!(
            "{:<col1$}  {:<col2$}  {:<col3$}  {:>8}  {:>10}  {:>10.3}  {:>14}  {:>12}  {}",
            m.scenario,
            m.variant,
            m.size,
            m.cost.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
            m.expanded,
            m.wall_s,
            m.rss_delta_kib,
            m.status.label(),
            m.detail.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn write_json(measurements: &[Measurement]) -> Result<(), String> {
    let text = serde_json::to_string_pretty(measurements).map_err(|err| err.to_string())?;
    println!("{text}");
    Ok(())
}

fn rss_kib(sys: &mut System) -> u64 {
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    if let Some(process) = get_current_pid().ok().and_then(|pid| sys.process(pid)) {
        process.memory() / 1024
    } else {
        0
    }
}

fn deterministic_labels(len: usize) -> Vec<String> {
    const ALPHABET: &[&str] = &["a", "b", "c", "d", "e", "f"];
    (0..len)
        .map(|i| ALPHABET[(i * 7 + i / 3) % ALPHABET.len()].to_string())
        .collect()
}

/// Drop every fifth event and replace every seventh by an unknown label.
fn perturbed(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 5 != 4)
        .map(|(i, label)| if i % 7 == 6 { "z".to_string() } else { label.clone() })
        .collect()
}

/// Cheapest alignment cost against a sequential model: every event and
/// activity outside a longest common subsequence costs one unit (10).
fn edit_cost(trace: &[String], model: &[String]) -> u64 {
    let mut prev = vec![0usize; model.len() + 1];
    let mut cur = vec![0usize; model.len() + 1];
    for event in trace {
        for (j, activity) in model.iter().enumerate() {
            cur[j + 1] = if event == activity {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    let lcs = prev[model.len()];
    10 * (trace.len() + model.len() - 2 * lcs) as u64
}

/// `p0 -a-> p1 -b-> p2`, then either a silent redo back to `p0` or `c` to `p3`.
fn redo_loop_model() -> Result<ProcessModel, AlignError> {
    let mut net = PetriNet::new();
    let p0 = net.add_place("p0");
    let p1 = net.add_place("p1");
    let p2 = net.add_place("p2");
    let p3 = net.add_place("p3");
    for (name, label, from, to) in [
        ("a", Some("a"), p0, p1),
        ("b", Some("b"), p1, p2),
        ("redo", None, p2, p0),
        ("c", Some("c"), p2, p3),
    ] {
        let t = net.add_transition(name, label);
        net.add_input(t, from, 1)?;
        net.add_output(t, to, 1)?;
    }
    let places = net.num_places();
    ProcessModel::new(
        net,
        Marking::from_places(places, &[p0]),
        Marking::from_places(places, &[p3]),
    )
}
