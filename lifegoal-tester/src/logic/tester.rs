use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::scenarios::{Scenario, ScenarioCtx};

/// Outcome of one scenario over one base seed.
///
/// Timings are kept in whole microseconds so reports stay plain JSON numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    pub iteration_micros: Vec<u64>,
}

impl ScenarioResult {
    pub fn average_duration(&self) -> Duration {
        let Some(count) = u64::try_from(self.iteration_micros.len())
            .ok()
            .filter(|count| *count > 0)
        else {
            return Duration::ZERO;
        };
        let total: u64 = self.iteration_micros.iter().copied().sum();
        Duration::from_micros(total / count)
    }
}

pub struct LogicTester {
    verbose: bool,
}

impl LogicTester {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Run `scenario` once per base seed; iteration `i` uses `seed + i`.
    pub fn run_scenario(
        &self,
        scenario: &Scenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.verbose {
                    println!("🧪 {} with seed {seed}", scenario.name.bright_white());
                }
                self.run_seed(scenario, seed, iterations)
            })
            .collect()
    }

    fn run_seed(&self, scenario: &Scenario, seed: u64, iterations: usize) -> ScenarioResult {
        let mut result = ScenarioResult {
            scenario_name: scenario.name.to_string(),
            seed,
            passed: true,
            iterations_run: iterations,
            successful_iterations: 0,
            failures: Vec::new(),
            iteration_micros: Vec::with_capacity(iterations),
        };

        for (i, offset) in (0..iterations).zip(0u64..) {
            let iteration_seed = seed.wrapping_add(offset);
            let ctx = ScenarioCtx {
                seed: iteration_seed,
                verbose: self.verbose,
            };
            let began = Instant::now();
            let outcome = (scenario.check)(&ctx);
            let elapsed = began.elapsed();
            result
                .iteration_micros
                .push(u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX));

            match outcome {
                Ok(()) => {
                    result.successful_iterations += 1;
                    if self.verbose {
                        println!("  ✅ #{} ok in {elapsed:?}", i + 1);
                    }
                }
                Err(err) => {
                    let message = format!("Iteration {} (seed {iteration_seed}): {err:#}", i + 1);
                    log::debug!("{} failed: {message}", scenario.key);
                    if self.verbose {
                        println!("  ❌ #{} {}", i + 1, format!("{err:#}").red());
                    }
                    result.failures.push(message);
                }
            }
        }

        result.passed = result.failures.is_empty();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    fn fails_on_even_seeds(ctx: &ScenarioCtx) -> anyhow::Result<()> {
        if ctx.seed % 2 == 0 {
            bail!("even seed {}", ctx.seed);
        }
        Ok(())
    }

    #[test]
    fn failures_are_recorded_per_iteration() {
        let scenario = Scenario {
            key: "odd-only",
            name: "Odd Only",
            description: "passes on odd seeds",
            check: fails_on_even_seeds,
        };
        let results = LogicTester::new(false).run_scenario(&scenario, &[10], 4);
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert!(!result.passed);
        assert_eq!(result.iterations_run, 4);
        assert_eq!(result.successful_iterations, 2);
        assert_eq!(result.failures.len(), 2);
        assert!(result.failures[0].contains("seed 10"));
        assert!(result.failures[1].contains("seed 12"));
        assert_eq!(result.iteration_micros.len(), 4);
    }

    #[test]
    fn average_duration_handles_empty_runs() {
        let mut result = ScenarioResult {
            scenario_name: "Smoke Test".to_string(),
            seed: 1,
            passed: true,
            iterations_run: 0,
            successful_iterations: 0,
            failures: Vec::new(),
            iteration_micros: Vec::new(),
        };
        assert_eq!(result.average_duration(), Duration::ZERO);

        result.iteration_micros = vec![1_000, 3_000];
        assert_eq!(result.average_duration(), Duration::from_millis(2));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["iteration_micros"][1], 3_000);
    }
}
