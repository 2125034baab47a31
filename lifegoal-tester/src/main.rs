mod logic;
mod scenarios;
mod util;

use anyhow::{Context, Result, ensure};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use lifegoal_game::user_seed;
use logic::reports::{generate_console_report, generate_json_report, generate_markdown_report};
use logic::{LogicTester, ScenarioResult};
use scenarios::{find_scenario, list_scenarios, scenario_keys};
use util::split_csv;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "lifegoal-tester", version)]
#[command(about = "Run deterministic reward-engine scenarios across seeds")]
struct Args {
    /// Comma-separated scenario keys, or `all`
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// Print the scenario catalog and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Comma-separated seeds; non-numeric values are hashed like user ids
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Print every iteration
    #[arg(short, long)]
    verbose: bool,

    /// Write the report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_scenarios {
        let mut sink = open_sink(args.output.as_deref())?;
        write_catalog(&mut sink)?;
        sink.flush()?;
        return Ok(());
    }

    println!("{}", "🎯 LifeGoal Scenario Tester".bright_cyan().bold());
    println!("{}", "=".repeat(28).cyan());

    let started = Instant::now();
    let keys = resolve_scenario_keys(&args.scenarios);
    let seeds = parse_seeds(&args.seeds)?;
    let results = run_all(&keys, &seeds, args.iterations, args.verbose);

    let mut sink = open_sink(args.output.as_deref())?;
    write_report(&mut sink, args.report, &results, started)?;
    sink.flush()?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}

fn open_sink(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let sink: Box<dyn Write> = match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot write report to {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    };
    Ok(sink)
}

fn write_catalog(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(out, "  {key:22} {description}")?;
    }
    Ok(())
}

/// Expand `all` in place, keeping explicitly named keys first and dropping
/// duplicates.
fn resolve_scenario_keys(raw: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for token in split_csv(raw) {
        if token == "all" {
            for key in scenario_keys() {
                if !keys.iter().any(|k| k == key) {
                    keys.push(key.to_string());
                }
            }
        } else if !keys.contains(&token) {
            keys.push(token);
        }
    }
    keys
}

fn parse_seeds(raw: &str) -> Result<Vec<u64>> {
    let seeds: Vec<u64> = split_csv(raw)
        .iter()
        .map(|token| token.parse().unwrap_or_else(|_| user_seed(token)))
        .collect();
    ensure!(!seeds.is_empty(), "at least one seed is required");
    Ok(seeds)
}

fn run_all(
    keys: &[String],
    seeds: &[u64],
    iterations: usize,
    verbose: bool,
) -> Vec<ScenarioResult> {
    let tester = LogicTester::new(verbose);
    keys.iter()
        .filter_map(|key| {
            let scenario = find_scenario(key);
            if scenario.is_none() {
                eprintln!("⚠️  Unknown scenario: {}", key.yellow());
            }
            scenario
        })
        .flat_map(|scenario| tester.run_scenario(&scenario, seeds, iterations))
        .collect()
}

fn write_report(
    out: &mut dyn Write,
    format: ReportFormat,
    results: &[ScenarioResult],
    started: Instant,
) -> Result<()> {
    match format {
        ReportFormat::Json => generate_json_report(out, results)?,
        ReportFormat::Markdown => generate_markdown_report(out, results)?,
        ReportFormat::Console => {
            if results.is_empty() {
                writeln!(out, "No scenarios executed.")?;
            } else {
                generate_console_report(out, results, started.elapsed())?;
            }
            writeln!(out, "\n🏁 Finished in {:?}", started.elapsed())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_expands_without_duplicates() {
        let keys = resolve_scenario_keys("wheel-weights, all, smoke");
        assert_eq!(keys.len(), scenario_keys().len());
        assert_eq!(keys[0], "wheel-weights");
        assert!(keys.iter().any(|k| k == "campaign-progression"));
    }

    #[test]
    fn unknown_keys_are_kept_for_reporting() {
        assert_eq!(resolve_scenario_keys("smoke,nope"), vec!["smoke", "nope"]);
        assert!(run_all(&["nope".to_string()], &[1], 1, false).is_empty());
    }

    #[test]
    fn seeds_accept_numbers_and_words() {
        assert_eq!(parse_seeds("42, alice").unwrap(), vec![42, user_seed("alice")]);
        assert!(parse_seeds(" , ").is_err());
    }

    #[test]
    fn clap_parses_report_and_output() {
        let args = Args::try_parse_from([
            "lifegoal-tester",
            "--scenarios",
            "all",
            "--report",
            "markdown",
            "--iterations",
            "3",
            "--output",
            "out.md",
        ])
        .unwrap();
        assert_eq!(args.report, ReportFormat::Markdown);
        assert_eq!(args.iterations, 3);
        assert_eq!(args.output, Some(PathBuf::from("out.md")));
        assert!(Args::try_parse_from(["lifegoal-tester", "--report", "csv"]).is_err());
    }

    #[test]
    fn json_report_lists_each_seed() {
        let results = run_all(&["smoke".to_string()], &[1, 2], 1, false);
        let mut buf = Vec::new();
        write_report(&mut buf, ReportFormat::Json, &results, Instant::now()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["scenario_name"], "Smoke Test");
        assert_eq!(value[1]["seed"], 2);
        assert_eq!(value[1]["passed"], true);
    }

    #[test]
    fn catalog_names_every_scenario() {
        let mut buf = Vec::new();
        write_catalog(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        for key in scenario_keys() {
            assert!(text.contains(key), "missing {key}");
        }
    }
}
