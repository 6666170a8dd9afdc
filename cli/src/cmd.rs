use std::{io, path::PathBuf, time::Duration};

use cmpbench_core::{action, BenchConfig};

use crate::config;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    /// Path to the program under test
    #[arg(long = "bin", default_value = BenchConfig::DEFAULT_PROGRAM)]
    pub program: PathBuf,

    /// Directory holding the test case files
    #[arg(long, default_value = BenchConfig::DEFAULT_CASES_DIR)]
    pub cases_dir: PathBuf,

    /// File name glob of test case files inside the cases directory
    #[arg(long, default_value = BenchConfig::DEFAULT_PATTERN)]
    pub pattern: String,

    /// Time limit of each phase in seconds
    #[arg(long, value_name = "SECONDS", default_value = "2.0", value_parser = parse_seconds)]
    pub timeout: Duration,

    /// Number of cases run at the same time [default: available parallelism]
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Also write the results as JSON to this file
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Do not draw the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// -v: info, -vv: debug, -vvv: trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub type CmdResult = anyhow::Result<()>;

impl GlobalArgs {
    pub async fn exec(&self) -> CmdResult {
        let cfg = config::bench_config_from_args(self);
        let mut stdout = io::stdout().lock();
        action::do_bench(&cfg, &mut stdout).await?;
        Ok(())
    }
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if !(secs.is_finite() && secs > 0.0) {
        return Err(format!("must be a positive number of seconds: {}", s));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}
