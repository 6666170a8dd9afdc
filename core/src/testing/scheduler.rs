use std::{num::NonZeroUsize, sync::Arc};

use anyhow::Context as _;
use tokio::{sync::Semaphore, task::JoinSet};

use super::{evaluator::CaseEvaluator, result::CaseOutcome, runner::Invoke, testcase::TestCase};

/// Runs every case on a bounded pool of workers and hands the outcomes back in
/// discovery order, whatever order they finished in.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    jobs: usize,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(Self::host_parallelism())
    }
}

impl Scheduler {
    pub fn new(jobs: usize) -> Self {
        Self { jobs: jobs.max(1) }
    }

    pub fn host_parallelism() -> usize {
        std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// `on_finish` is called in completion order; the returned vector is sorted by case index.
    pub async fn run_all<I>(
        &self,
        evaluator: Arc<CaseEvaluator<I>>,
        testcases: Vec<TestCase>,
        mut on_finish: impl FnMut(&CaseOutcome),
    ) -> anyhow::Result<Vec<CaseOutcome>>
    where
        I: Invoke + 'static,
    {
        log::info!(
            "Running {} testcases with {} workers",
            testcases.len(),
            self.jobs
        );

        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let mut workers = JoinSet::new();
        let num_cases = testcases.len();

        for (i, testcase) in testcases.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let evaluator = evaluator.clone();
            workers.spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .context("Worker pool was closed")?;
                anyhow::Ok(evaluator.evaluate(i + 1, &testcase).await)
            });
        }

        let mut outcomes = Vec::with_capacity(num_cases);
        while let Some(res) = workers.join_next().await {
            let outcome = res.context("Worker task panicked")??;
            on_finish(&outcome);
            outcomes.push(outcome);
        }

        outcomes.sort_by_key(|o| o.index);
        Ok(outcomes)
    }
}
