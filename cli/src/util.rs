use cmpbench_core::testing::DiscoverError;

pub fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

/// 2 when there was nothing to run, 1 for any other fatal error.
pub fn exit_code_for(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<DiscoverError>() {
        Some(DiscoverError::NoTestcase { .. }) => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exit_codes() {
        let e = anyhow::Error::new(DiscoverError::NoTestcase {
            dir: "cases".into(),
            pattern: "*.txt".into(),
        });
        assert_eq!(exit_code_for(&e), 2);
        assert_eq!(exit_code_for(&anyhow::anyhow!("Cannot read dir")), 1);
    }

    #[test]
    fn missing_cases_dir_exits_with_2() {
        let dir = tempfile::tempdir().unwrap();
        let e = cmpbench_core::testing::discover(dir.path().join("cases"), "*.txt").unwrap_err();
        assert_eq!(exit_code_for(&e.into()), 2);
    }
}
