use std::{ffi::OsString, path::PathBuf, time::Duration};

use crate::testing::{Scheduler, TestRunner};

/// Settings of one benchmark run, fixed at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    pub program: PathBuf,
    /// Extra arguments for the program. Empty when launched from the command line.
    pub program_args: Vec<OsString>,
    pub cases_dir: PathBuf,
    pub pattern: String,
    pub time_limit: Duration,
    pub jobs: usize,
    pub json_report: Option<PathBuf>,
    pub show_progress: bool,
}

impl BenchConfig {
    pub const DEFAULT_PROGRAM: &str = "../build/solution";
    pub const DEFAULT_CASES_DIR: &str = "cases";
    pub const DEFAULT_PATTERN: &str = "*.txt";
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            program: Self::DEFAULT_PROGRAM.into(),
            program_args: Vec::new(),
            cases_dir: Self::DEFAULT_CASES_DIR.into(),
            pattern: Self::DEFAULT_PATTERN.to_owned(),
            time_limit: TestRunner::DEFAULT_EXEC_TIME_LIMIT,
            jobs: Scheduler::host_parallelism(),
            json_report: None,
            show_progress: true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = BenchConfig::default();
        assert_eq!(cfg.program, PathBuf::from("../build/solution"));
        assert_eq!(cfg.cases_dir, PathBuf::from("cases"));
        assert_eq!(cfg.pattern, "*.txt");
        assert_eq!(cfg.time_limit, Duration::from_secs_f64(2.0));
        assert!(cfg.jobs >= 1);
        assert!(cfg.program_args.is_empty());
    }
}
