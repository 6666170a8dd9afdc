use std::time::Duration;

use crate::codec;

use super::{
    result::{score, CaseOutcome, Phase, PresentationReason, Stage, Verdict},
    runner::{ExecStatus, Invoke},
    testcase::{Payload, TestCase},
};

/// Drives one test case through compress, validation, decompress and comparison.
/// The first failing step decides the verdict; later phases are never started.
#[derive(Debug, Clone)]
pub struct CaseEvaluator<I> {
    invoker: I,
}

impl<I: Invoke> CaseEvaluator<I> {
    pub fn new(invoker: I) -> Self {
        Self { invoker }
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    pub async fn evaluate(&self, index: usize, testcase: &TestCase) -> CaseOutcome {
        let mut outcome = CaseOutcome {
            index,
            name: testcase.name().to_owned(),
            original_size: testcase.original_size(),
            compressed_size: None,
            verdict: Verdict::WrongAnswer,
            execution_time: Duration::ZERO,
        };

        let verdict = match testcase.payload() {
            Err(rejection) => Verdict::PresentationError {
                stage: Stage::Input,
                reason: rejection.reason.clone(),
            },
            Ok(payload) => match self.round_trip(payload, &mut outcome).await {
                Ok(v) | Err(v) => v,
            },
        };
        log::debug!("{}: {:?}", outcome.name, verdict);

        outcome.verdict = verdict;
        outcome
    }

    async fn round_trip(
        &self,
        payload: &Payload,
        outcome: &mut CaseOutcome,
    ) -> Result<Verdict, Verdict> {
        let compressed = self
            .run_phase(Phase::Compress, &payload.token, outcome)
            .await?;

        let compressed_size =
            codec::decode_size(&compressed).map_err(|_| Verdict::PresentationError {
                stage: Stage::Output(Phase::Compress),
                reason: PresentationReason::InvalidBase64,
            })?;
        outcome.compressed_size = Some(compressed_size);
        if !codec::within_limit(compressed_size) {
            return Err(Verdict::PresentationError {
                stage: Stage::Output(Phase::Compress),
                reason: PresentationReason::TooLarge(compressed_size),
            });
        }

        // The literal compressed text is fed back, not a re-encoding of its bytes.
        let decompressed = self
            .run_phase(Phase::Decompress, &compressed, outcome)
            .await?;

        // Literal text comparison: an equivalent but differently encoded token is wrong.
        if decompressed != payload.token {
            return Err(Verdict::WrongAnswer);
        }

        Ok(Verdict::Success {
            compressed_size,
            score: score(payload.original_size, compressed_size),
        })
    }

    /// Returns stdout with trailing whitespace removed.
    async fn run_phase(
        &self,
        phase: Phase,
        payload: &str,
        outcome: &mut CaseOutcome,
    ) -> Result<String, Verdict> {
        let res = self.invoker.invoke(phase, payload).await.map_err(|e| {
            log::error!("{} ({}): {:#}", outcome.name, phase, e);
            Verdict::RuntimeError {
                phase,
                exit_code: None,
            }
        })?;
        outcome.execution_time += res.execution_time;

        if !res.stderr.is_empty() {
            log::trace!("{} ({}) stderr: {}", outcome.name, phase, res.stderr.trim_end());
        }

        match res.status {
            ExecStatus::TimedOut => Err(Verdict::TimeLimitExceeded { phase }),
            ExecStatus::NonZero(code) => Err(Verdict::RuntimeError {
                phase,
                exit_code: Some(code),
            }),
            ExecStatus::Success => Ok(res.stdout.trim_end().to_owned()),
        }
    }
}
