use cmpbench_core::BenchConfig;

use crate::cmd::GlobalArgs;

/// Everything comes from the command line; nothing is read from the environment.
pub fn bench_config_from_args(args: &GlobalArgs) -> BenchConfig {
    let GlobalArgs {
        program,
        cases_dir,
        pattern,
        timeout,
        jobs,
        json,
        no_progress,
        verbose: _,
    } = args;

    let mut cfg = BenchConfig {
        program: program.clone(),
        cases_dir: cases_dir.clone(),
        pattern: pattern.clone(),
        time_limit: *timeout,
        json_report: json.clone(),
        show_progress: !no_progress,
        ..Default::default()
    };
    if let Some(n) = jobs {
        cfg.jobs = *n;
    }
    cfg
}

#[cfg(test)]
mod test {
    use std::{path::PathBuf, time::Duration};

    use clap::Parser;

    use super::*;

    #[test]
    fn defaults_match_bench_config() {
        let args = GlobalArgs::try_parse_from(["cmpbench"]).unwrap();
        assert_eq!(bench_config_from_args(&args), BenchConfig::default());
    }

    #[test]
    fn args_override_defaults() {
        let args = GlobalArgs::try_parse_from([
            "cmpbench",
            "--bin",
            "/opt/solution",
            "--cases-dir",
            "data",
            "--pattern",
            "*.b64",
            "--timeout",
            "1.5",
            "--jobs",
            "2",
            "--json",
            "out.json",
            "--no-progress",
        ])
        .unwrap();
        let cfg = bench_config_from_args(&args);
        assert_eq!(cfg.program, PathBuf::from("/opt/solution"));
        assert_eq!(cfg.cases_dir, PathBuf::from("data"));
        assert_eq!(cfg.pattern, "*.b64");
        assert_eq!(cfg.time_limit, Duration::from_millis(1500));
        assert_eq!(cfg.jobs, 2);
        assert_eq!(cfg.json_report, Some(PathBuf::from("out.json")));
        assert!(!cfg.show_progress);
        assert!(cfg.program_args.is_empty());
    }
}
