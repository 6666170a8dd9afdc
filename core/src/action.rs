pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};
}
use std::io::{self, Write as _};
use std::sync::Arc;
use std::time::Duration;

use error::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::BenchConfig;
use crate::report::{BenchReport, Reporter};
use crate::testing::{self, CaseEvaluator, Scheduler, TestRunner};

/// Discovers the cases, runs every one of them against the program and prints the report.
/// Case failures are part of the report; only configuration problems are errors.
pub async fn do_bench(cfg: &BenchConfig, out: &mut impl io::Write) -> Result<BenchReport> {
    let testcases = testing::discover(&cfg.cases_dir, &cfg.pattern)?;

    let runner = TestRunner::new(&cfg.program)
        .args(cfg.program_args.iter().cloned())
        .execution_time_limit(cfg.time_limit);
    log::info!(
        "Program: {} (time limit {}ms)",
        runner.get_program().to_string_lossy(),
        runner.get_exec_time_limit().as_millis()
    );

    let reporter = Reporter::new(testcases.iter().map(|t| t.name()));
    writeln!(out, "{}", reporter.header(testcases.len()))?;
    out.flush()?;

    let bar = if cfg.show_progress {
        ProgressBar::new(testcases.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner} [{bar:30}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(Duration::from_millis(100));

    let evaluator = Arc::new(CaseEvaluator::new(runner));
    let outcomes = Scheduler::new(cfg.jobs)
        .run_all(evaluator, testcases, |o| {
            bar.set_message(o.name.clone());
            bar.inc(1);
        })
        .await?;
    bar.finish_and_clear();

    let report = BenchReport::new(outcomes);
    reporter.write_lines(out, &report)?;

    if let Some(path) = &cfg.json_report {
        fsutil::write_json_with_mkdir(path, &report).context("Failed to write JSON report")?;
        log::info!("Wrote JSON report to {}", path.to_string_lossy());
    }

    Ok(report)
}
